//! One export run: host, registry, settings and the message log it accumulates.

use crate::document::JsonScene;
use crate::err::{Result, SnapshotError};
use crate::export_settings::{ExportLog, ExportSettings};
use crate::host::SceneHost;
use crate::resource_mapper::ResourceRegistry;

use log::{debug, info};
use std::path::Path;

/// What a whole-scene export needs to know about the scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneInfo<N> {
    pub name: String,
    pub path: String,
    pub build_index: i32,
    pub roots: Vec<N>,
}

/// Called once per discovered node while converting; `false` cancels the export.
pub trait ExportProgress {
    fn report(&mut self, current: usize, total: usize) -> bool;
}

impl<F> ExportProgress for F
where
    F: FnMut(usize, usize) -> bool,
{
    fn report(&mut self, current: usize, total: usize) -> bool {
        self(current, total)
    }
}

/// Never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ExportProgress for NoProgress {
    fn report(&mut self, _current: usize, _total: usize) -> bool {
        true
    }
}

/// Owns the state of a single export.
///
/// ```
/// # use scene_snapshot::{ExportSession, ExportSettings, MemoryScene, NoProgress, ResourceMapper};
/// let mut scene = MemoryScene::new("Demo");
/// let root = scene.add_root("root");
/// scene.add_child(root, "child");
///
/// let mut session = ExportSession::new(&scene, ResourceMapper::new())
///     .with_configuration(ExportSettings::new().indent(false));
/// let doc = session.export_object(root, &mut NoProgress).unwrap();
/// assert_eq!(doc.objects.len(), 2);
/// assert!(session.to_json_string(&doc).starts_with(r#"{"name":"#));
/// ```
#[derive(Debug)]
pub struct ExportSession<'h, H: SceneHost, R> {
    host: &'h H,
    registry: R,
    settings: ExportSettings,
    log: ExportLog,
}

impl<'h, H, R> ExportSession<'h, H, R>
where
    H: SceneHost,
    R: ResourceRegistry<H> + Clone,
{
    pub fn new(host: &'h H, registry: R) -> Self {
        ExportSession {
            host,
            registry,
            settings: ExportSettings::default(),
            log: ExportLog::new(),
        }
    }

    pub fn with_configuration(mut self, settings: ExportSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Exports `roots` and their subtrees. At least one root is required.
    pub fn export_objects<P>(&mut self, roots: &[H::Handle], progress: &mut P) -> Result<JsonScene>
    where
        P: ExportProgress + ?Sized,
    {
        if roots.is_empty() {
            return Err(SnapshotError::invalid_argument("no objects to export"));
        }
        info!("Exporting {} root object(s)", roots.len());
        self.commit_on_success(|host, registry, log| {
            JsonScene::from_objects(host, roots.iter().copied(), registry, progress, log)
        })
    }

    pub fn export_object<P>(&mut self, root: H::Handle, progress: &mut P) -> Result<JsonScene>
    where
        P: ExportProgress + ?Sized,
    {
        self.export_objects(&[root], progress)
    }

    /// Exports a whole scene. An empty scene is fine and yields no objects.
    pub fn export_scene<P>(
        &mut self,
        scene: &SceneInfo<H::Handle>,
        progress: &mut P,
    ) -> Result<JsonScene>
    where
        P: ExportProgress + ?Sized,
    {
        info!("Exporting scene `{}` ({})", scene.name, scene.path);
        self.commit_on_success(|host, registry, log| {
            JsonScene::from_scene(host, scene, registry, progress, log)
        })
    }

    /// Runs `export` against copies of the registry and log.
    ///
    /// The copies replace the session state only if the export succeeds, so a cancelled or
    /// failed export leaves no ids or messages behind.
    fn commit_on_success<F>(&mut self, export: F) -> Result<JsonScene>
    where
        F: FnOnce(&H, &mut R, &mut ExportLog) -> Result<JsonScene>,
    {
        let mut registry = self.registry.clone();
        let mut log = self.log.clone();

        match export(self.host, &mut registry, &mut log) {
            Ok(scene) => {
                self.registry = registry;
                self.log = log;
                Ok(scene)
            }
            Err(e) => {
                debug!("Discarding registry and log changes of failed export: {}", e);
                Err(e)
            }
        }
    }

    pub fn to_json_string(&self, scene: &JsonScene) -> String {
        scene.to_json_string(&self.settings)
    }

    pub fn save_to_file(&mut self, scene: &JsonScene, path: impl AsRef<Path>) -> Result<()> {
        scene.save_to_file(path, &self.settings, &mut self.log)
    }

    pub fn log(&self) -> &ExportLog {
        &self.log
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn into_registry(self) -> R {
        self.registry
    }
}
