use crate::document::game_object::JsonGameObject;
use crate::err::{Result, SnapshotError};
use crate::export_settings::{ExportLog, ExportSettings};
use crate::exporter::{ExportProgress, SceneInfo};
use crate::host::SceneHost;
use crate::identity_table::IdentityTable;
use crate::json_value::JsonValue;
use crate::json_writer::JsonWriter;
use crate::name_clash;
use crate::res_id::ResId;
use crate::resource_mapper::ResourceRegistry;
use crate::walker::gather_object_ids;

use log::{debug, info, warn};
use std::fs;
use std::path::Path;

/// The document tree: session metadata plus one [`JsonGameObject`] per exported node.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonScene {
    pub name: String,
    pub path: String,
    /// `-1` unless the export is of a whole scene.
    pub build_index: i32,
    pub objects: Vec<JsonGameObject>,
}

impl Default for JsonScene {
    fn default() -> Self {
        JsonScene {
            name: String::new(),
            path: String::new(),
            build_index: -1,
            objects: Vec::new(),
        }
    }
}

impl JsonScene {
    /// Exports `roots` and everything below them.
    ///
    /// Runs discovery over the whole hierarchy first, so every node has its id before any node
    /// is converted. `progress` is asked once per discovered node whether to go on.
    pub fn from_objects<H, R, I, P>(
        host: &H,
        roots: I,
        registry: &mut R,
        progress: &mut P,
        log: &mut ExportLog,
    ) -> Result<JsonScene>
    where
        H: SceneHost,
        R: ResourceRegistry<H>,
        I: IntoIterator<Item = H::Handle>,
        P: ExportProgress + ?Sized,
    {
        let mut objects = IdentityTable::new();
        let discovered = gather_object_ids(host, &mut objects, roots);
        info!("Discovered {} objects", discovered);

        for &node in objects.as_slice() {
            registry.gather_prefab_linkage(host, node);
        }

        let total = objects.len();
        let mut result = JsonScene::default();
        result.objects.reserve(total);

        for (idx, (id, &node)) in objects.iter().enumerate() {
            if !progress.report(idx, total) {
                info!("Export cancelled at object {}/{}", idx, total);
                return Err(SnapshotError::Cancelled {
                    processed: idx,
                    total,
                });
            }

            if !host.is_alive(node) {
                warn!("Object {} ({:?}) was destroyed before it could be converted", id, node);
                log.log_message(format!("Skipped object {}: destroyed during export", id));
                continue;
            }

            debug!("Converting object {}/{} ({:?})", idx, total, node);
            result
                .objects
                .push(JsonGameObject::new(host, node, &objects, registry));
        }

        registry.report_new_resources(log);
        result.fix_name_clashes();
        Ok(result)
    }

    pub fn from_object<H, R, P>(
        host: &H,
        root: H::Handle,
        registry: &mut R,
        progress: &mut P,
        log: &mut ExportLog,
    ) -> Result<JsonScene>
    where
        H: SceneHost,
        R: ResourceRegistry<H>,
        P: ExportProgress + ?Sized,
    {
        Self::from_objects(host, std::iter::once(root), registry, progress, log)
    }

    pub fn from_scene<H, R, P>(
        host: &H,
        scene: &SceneInfo<H::Handle>,
        registry: &mut R,
        progress: &mut P,
        log: &mut ExportLog,
    ) -> Result<JsonScene>
    where
        H: SceneHost,
        R: ResourceRegistry<H>,
        P: ExportProgress + ?Sized,
    {
        let roots = scene.roots.iter().copied();
        let mut result = Self::from_objects(host, roots, registry, progress, log)?;
        result.name = scene.name.clone();
        result.path = scene.path.clone();
        result.build_index = scene.build_index;
        Ok(result)
    }

    /// Gives every clashing sibling a unique alias. See [`name_clash`].
    pub fn fix_name_clashes(&mut self) {
        name_clash::fix_name_clashes(&mut self.objects);
    }

    pub fn find_object(&self, id: ResId) -> Option<&JsonGameObject> {
        if !id.is_valid() {
            return None;
        }
        self.objects.iter().find(|o| o.id == id)
    }

    /// Instance ids are not guaranteed unique; the last object carrying `instance_id` wins.
    pub fn find_object_by_instance_id(&self, instance_id: i32) -> Option<&JsonGameObject> {
        let mut found: Option<&JsonGameObject> = None;
        for obj in self.objects.iter().filter(|o| o.instance_id == instance_id) {
            if let Some(prev) = found {
                warn!(
                    "Duplicate instance id {} on objects {} and {}",
                    instance_id, prev.id, obj.id
                );
            }
            found = Some(obj);
        }
        found
    }

    pub fn write_json(&self, w: &mut JsonWriter) {
        self.write_json_value(w);
    }

    pub fn to_json_string(&self, settings: &ExportSettings) -> String {
        let mut w = JsonWriter::with_settings(settings);
        self.write_json(&mut w);
        w.into_text()
    }

    /// Serializes the whole document and writes it to `path`, creating missing parent
    /// directories.
    pub fn save_to_file(
        &self,
        path: impl AsRef<Path>,
        settings: &ExportSettings,
        log: &mut ExportLog,
    ) -> Result<()> {
        let path = path.as_ref();
        let text = self.to_json_string(settings);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, text.as_bytes())?;

        info!("Wrote {} bytes to {}", text.len(), path.display());
        log.log_message(format!(
            "Exported {} objects to {}",
            self.objects.len(),
            path.display()
        ));
        Ok(())
    }
}

impl JsonValue for JsonScene {
    fn write_json_value(&self, w: &mut JsonWriter) {
        w.object(|w| {
            w.write_key_val("name", &self.name);
            w.write_key_val("path", &self.path);
            w.write_key_val("buildIndex", &self.build_index);
            w.write_key_val("objects", &self.objects);
        });
    }
}
