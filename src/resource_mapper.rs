//! Interning of the sub-resources nodes reference: meshes, materials, terrain data and prefabs.

use crate::export_settings::ExportLog;
use crate::host::{AssetKey, SceneHost};
use crate::identity_table::{IdentityTable, StorageWatcher};
use crate::res_id::ResId;

use log::debug;

/// Registry of the assets a scene references.
///
/// The exporter asks it for ids while converting nodes; implementations are free to intern
/// lazily, so every `intern_*` call may grow the registry.
pub trait ResourceRegistry<H: SceneHost> {
    /// `None` means the node has no mesh and yields [`ResId::INVALID`].
    fn intern_mesh(&mut self, mesh: Option<AssetKey>) -> ResId;

    fn intern_material(&mut self, material: Option<AssetKey>) -> ResId;

    fn intern_terrain_data(&mut self, terrain_data: Option<AssetKey>) -> ResId;

    /// Id of the prefab asset root `node` was instantiated from.
    fn intern_prefab_root(&mut self, host: &H, node: H::Handle, create_if_missing: bool) -> ResId;

    /// Id of the prefab asset object `node` corresponds to.
    fn intern_prefab_object(&mut self, host: &H, node: H::Handle, create_if_missing: bool) -> ResId;

    /// Discovery hook, called once per discovered node before any node is converted.
    fn gather_prefab_linkage(&mut self, host: &H, node: H::Handle);

    /// Reports resources registered since the previous call.
    fn report_new_resources(&mut self, _log: &mut ExportLog) {}
}

/// Default [`ResourceRegistry`], one [`IdentityTable`] per resource kind.
#[derive(Debug, Clone, Default)]
pub struct ResourceMapper {
    meshes: IdentityTable<AssetKey>,
    materials: IdentityTable<AssetKey>,
    terrain_data: IdentityTable<AssetKey>,
    prefab_roots: IdentityTable<AssetKey>,
    prefab_objects: IdentityTable<AssetKey>,

    mesh_watcher: StorageWatcher,
    material_watcher: StorageWatcher,
    terrain_data_watcher: StorageWatcher,
    prefab_root_watcher: StorageWatcher,
    prefab_object_watcher: StorageWatcher,
}

impl ResourceMapper {
    pub fn new() -> Self {
        ResourceMapper::default()
    }

    pub fn meshes(&self) -> &IdentityTable<AssetKey> {
        &self.meshes
    }

    pub fn materials(&self) -> &IdentityTable<AssetKey> {
        &self.materials
    }

    pub fn terrain_data(&self) -> &IdentityTable<AssetKey> {
        &self.terrain_data
    }

    pub fn prefab_roots(&self) -> &IdentityTable<AssetKey> {
        &self.prefab_roots
    }

    pub fn prefab_objects(&self) -> &IdentityTable<AssetKey> {
        &self.prefab_objects
    }
}

fn report_new(
    kind: &str,
    watcher: &mut StorageWatcher,
    table: &IdentityTable<AssetKey>,
    log: &mut ExportLog,
) {
    if !watcher.has_new_objects(table) {
        return;
    }
    for (id, key) in watcher.new_objects(table) {
        debug!("New {} {:?} registered as {}", kind, key, id);
    }
    log.log_message(format!(
        "{} new {}(s) registered, {} total",
        watcher.num_new_objects(table),
        kind,
        table.len()
    ));
    watcher.update(table);
}

impl<H: SceneHost> ResourceRegistry<H> for ResourceMapper {
    fn intern_mesh(&mut self, mesh: Option<AssetKey>) -> ResId {
        self.meshes.get_id(mesh)
    }

    fn intern_material(&mut self, material: Option<AssetKey>) -> ResId {
        self.materials.get_id(material)
    }

    fn intern_terrain_data(&mut self, terrain_data: Option<AssetKey>) -> ResId {
        self.terrain_data.get_id(terrain_data)
    }

    fn intern_prefab_root(&mut self, host: &H, node: H::Handle, create_if_missing: bool) -> ResId {
        let root = host.live(node).and_then(|n| host.prefab_link(n)).map(|link| link.root);
        self.prefab_roots.id_of(root, create_if_missing)
    }

    fn intern_prefab_object(
        &mut self,
        host: &H,
        node: H::Handle,
        create_if_missing: bool,
    ) -> ResId {
        let object = host.live(node).and_then(|n| host.prefab_link(n)).map(|link| link.object);
        self.prefab_objects.id_of(object, create_if_missing)
    }

    fn gather_prefab_linkage(&mut self, host: &H, node: H::Handle) {
        let Some(link) = host.live(node).and_then(|n| host.prefab_link(n)) else {
            return;
        };
        self.prefab_roots.get_id(Some(link.root));
        self.prefab_objects.get_id(Some(link.object));
    }

    fn report_new_resources(&mut self, log: &mut ExportLog) {
        report_new("mesh", &mut self.mesh_watcher, &self.meshes, log);
        report_new("material", &mut self.material_watcher, &self.materials, log);
        report_new(
            "terrain data",
            &mut self.terrain_data_watcher,
            &self.terrain_data,
            log,
        );
        report_new(
            "prefab root",
            &mut self.prefab_root_watcher,
            &self.prefab_roots,
            log,
        );
        report_new(
            "prefab object",
            &mut self.prefab_object_watcher,
            &self.prefab_objects,
            log,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryScene, PrefabKind, PrefabLink};
    use pretty_assertions::assert_eq;

    fn linked_scene() -> (MemoryScene, Vec<crate::host::MemoryHandle>) {
        let mut scene = MemoryScene::new("prefabs");
        let a = scene.add_root("a");
        let b = scene.add_root("b");
        let plain = scene.add_root("plain");
        for (node, object) in [(a, 10), (b, 11)] {
            scene.set_prefab_link(
                node,
                Some(PrefabLink {
                    root: AssetKey(1),
                    object: AssetKey(object),
                    kind: PrefabKind::PrefabInstance,
                }),
            );
        }
        (scene, vec![a, b, plain])
    }

    #[test]
    fn test_shared_prefab_root_gets_one_id() {
        let (scene, nodes) = linked_scene();
        let mut mapper = ResourceMapper::new();
        for &node in &nodes {
            mapper.gather_prefab_linkage(&scene, node);
        }

        assert_eq!(mapper.prefab_roots().len(), 1);
        assert_eq!(mapper.prefab_objects().len(), 2);
        assert_eq!(mapper.intern_prefab_root(&scene, nodes[1], false), ResId::new(0));
        assert_eq!(mapper.intern_prefab_object(&scene, nodes[1], false), ResId::new(1));
        assert_eq!(mapper.intern_prefab_root(&scene, nodes[2], true), ResId::INVALID);
    }

    #[test]
    fn test_meshes_are_deduplicated_and_reported_once() {
        let mut mapper = ResourceMapper::new();
        let first = ResourceRegistry::<MemoryScene>::intern_mesh(&mut mapper, Some(AssetKey(5)));
        let again = ResourceRegistry::<MemoryScene>::intern_mesh(&mut mapper, Some(AssetKey(5)));
        let none = ResourceRegistry::<MemoryScene>::intern_mesh(&mut mapper, None);

        assert_eq!(first, again);
        assert_eq!(none, ResId::INVALID);

        let mut log = ExportLog::new();
        ResourceRegistry::<MemoryScene>::report_new_resources(&mut mapper, &mut log);
        assert_eq!(log.messages(), ["1 new mesh(s) registered, 1 total"]);

        ResourceRegistry::<MemoryScene>::report_new_resources(&mut mapper, &mut log);
        assert_eq!(log.messages().len(), 1);
    }

    #[test]
    fn test_every_resource_kind_is_reported() {
        let (scene, nodes) = linked_scene();
        let mut mapper = ResourceMapper::new();
        for &node in &nodes {
            mapper.gather_prefab_linkage(&scene, node);
        }
        ResourceRegistry::<MemoryScene>::intern_mesh(&mut mapper, Some(AssetKey(5)));
        ResourceRegistry::<MemoryScene>::intern_material(&mut mapper, Some(AssetKey(6)));
        ResourceRegistry::<MemoryScene>::intern_terrain_data(&mut mapper, Some(AssetKey(7)));

        let mut log = ExportLog::new();
        ResourceRegistry::<MemoryScene>::report_new_resources(&mut mapper, &mut log);
        assert_eq!(
            log.messages(),
            [
                "1 new mesh(s) registered, 1 total",
                "1 new material(s) registered, 1 total",
                "1 new terrain data(s) registered, 1 total",
                "1 new prefab root(s) registered, 1 total",
                "2 new prefab object(s) registered, 2 total",
            ]
        );

        ResourceRegistry::<MemoryScene>::intern_terrain_data(&mut mapper, Some(AssetKey(8)));
        log.clear();
        ResourceRegistry::<MemoryScene>::report_new_resources(&mut mapper, &mut log);
        assert_eq!(log.messages(), ["1 new terrain data(s) registered, 2 total"]);
    }
}
