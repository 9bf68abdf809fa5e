//! An owned, in-memory [`SceneHost`].
//!
//! Nodes live in a flat `Vec` and are addressed by index. Destroying a node only marks it (and
//! its subtree) dead; links stay in place so stale references behave like they do in a live
//! editor, where a destroyed object can still be reached from its former parent.

use crate::err::{Result, SnapshotError};
use crate::exporter::SceneInfo;
use crate::host::{
    AssetKey, Component, LocalTransform, PrefabLink, SceneHost, StaticEditorFlags,
};

use glam::{Mat4, Quat, Vec3};
use hashbrown::HashMap as FastMap;
use log::{trace, warn};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemoryHandle(u32);

impl MemoryHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct MemoryNode {
    name: String,
    parent: Option<MemoryHandle>,
    children: Vec<MemoryHandle>,
    alive: bool,
    instance_id: i32,
    local: LocalTransform,
    active: bool,
    is_static: bool,
    static_flags: StaticEditorFlags,
    mesh: Option<AssetKey>,
    prefab: Option<PrefabLink>,
    components: Vec<Option<Component<MemoryHandle>>>,
}

#[derive(Debug, Clone)]
pub struct MemoryScene {
    name: String,
    path: String,
    build_index: i32,
    nodes: Vec<MemoryNode>,
    roots: Vec<MemoryHandle>,
}

impl MemoryScene {
    pub fn new(name: impl Into<String>) -> Self {
        MemoryScene {
            name: name.into(),
            path: String::new(),
            build_index: -1,
            nodes: Vec::new(),
            roots: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>, build_index: i32) -> Self {
        self.path = path.into();
        self.build_index = build_index;
        self
    }

    fn push_node(&mut self, name: String, parent: Option<MemoryHandle>) -> MemoryHandle {
        let handle = MemoryHandle(self.nodes.len() as u32);
        self.nodes.push(MemoryNode {
            name,
            parent,
            children: Vec::new(),
            alive: true,
            instance_id: handle.0 as i32 + 1,
            local: LocalTransform::default(),
            active: true,
            is_static: false,
            static_flags: StaticEditorFlags::empty(),
            mesh: None,
            prefab: None,
            components: Vec::new(),
        });
        handle
    }

    pub fn add_root(&mut self, name: impl Into<String>) -> MemoryHandle {
        let handle = self.push_node(name.into(), None);
        self.roots.push(handle);
        handle
    }

    pub fn add_child(&mut self, parent: MemoryHandle, name: impl Into<String>) -> MemoryHandle {
        let handle = self.push_node(name.into(), Some(parent));
        self.node_mut(parent).children.push(handle);
        handle
    }

    /// Marks `node` and everything below it as destroyed.
    pub fn destroy(&mut self, node: MemoryHandle) {
        let mut pending = vec![node];
        while let Some(cur) = pending.pop() {
            let n = self.node_mut(cur);
            n.alive = false;
            pending.extend(n.children.iter().copied());
        }
    }

    pub fn set_name(&mut self, node: MemoryHandle, name: impl Into<String>) {
        self.node_mut(node).name = name.into();
    }

    pub fn set_instance_id(&mut self, node: MemoryHandle, instance_id: i32) {
        self.node_mut(node).instance_id = instance_id;
    }

    pub fn set_local_transform(
        &mut self,
        node: MemoryHandle,
        position: Vec3,
        rotation: Quat,
        scale: Vec3,
    ) {
        self.node_mut(node).local = LocalTransform {
            position,
            rotation,
            scale,
        };
    }

    pub fn set_active(&mut self, node: MemoryHandle, active: bool) {
        self.node_mut(node).active = active;
    }

    pub fn set_static(&mut self, node: MemoryHandle, is_static: bool, flags: StaticEditorFlags) {
        let n = self.node_mut(node);
        n.is_static = is_static;
        n.static_flags = flags;
    }

    pub fn set_mesh(&mut self, node: MemoryHandle, mesh: Option<AssetKey>) {
        self.node_mut(node).mesh = mesh;
    }

    pub fn set_prefab_link(&mut self, node: MemoryHandle, link: Option<PrefabLink>) {
        self.node_mut(node).prefab = link;
    }

    pub fn add_component(&mut self, node: MemoryHandle, component: Component<MemoryHandle>) {
        self.node_mut(node).components.push(Some(component));
    }

    /// Adds a component slot whose object has gone missing.
    pub fn add_missing_component(&mut self, node: MemoryHandle) {
        self.node_mut(node).components.push(None);
    }

    pub fn name_of_scene(&self) -> &str {
        &self.name
    }

    pub fn roots(&self) -> &[MemoryHandle] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Live root nodes whose name is `name`.
    pub fn find_roots_by_name<'s>(
        &'s self,
        name: &'s str,
    ) -> impl Iterator<Item = MemoryHandle> + 's {
        self.roots
            .iter()
            .copied()
            .filter(move |&h| self.is_alive(h) && self.node(h).name == name)
    }

    pub fn scene_info(&self) -> SceneInfo<MemoryHandle> {
        SceneInfo {
            name: self.name.clone(),
            path: self.path.clone(),
            build_index: self.build_index,
            roots: self.roots.clone(),
        }
    }

    fn node(&self, node: MemoryHandle) -> &MemoryNode {
        &self.nodes[node.index()]
    }

    fn node_mut(&mut self, node: MemoryHandle) -> &mut MemoryNode {
        &mut self.nodes[node.index()]
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let description: SceneDescription = serde_json::from_str(json)?;
        Self::from_description(description)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let description: SceneDescription = serde_json::from_reader(reader)?;
        Self::from_description(description)
    }

    pub fn from_description(description: SceneDescription) -> Result<Self> {
        let mut scene = MemoryScene::new(description.name)
            .with_path(description.path, description.build_index);
        let mut keys: FastMap<String, MemoryHandle, ahash::RandomState> =
            FastMap::with_hasher(ahash::RandomState::new());
        let mut pending_components = Vec::new();

        let mut queue: Vec<(Option<MemoryHandle>, NodeDescription)> =
            description.roots.into_iter().rev().map(|n| (None, n)).collect();

        while let Some((parent, desc)) = queue.pop() {
            let handle = match parent {
                Some(p) => scene.add_child(p, desc.name),
                None => scene.add_root(desc.name),
            };
            trace!("Loaded node {:?}", handle);

            if let Some(key) = desc.key {
                if keys.insert(key.clone(), handle).is_some() {
                    return Err(SnapshotError::invalid_argument(format!(
                        "duplicate node key `{}`",
                        key
                    )));
                }
            }

            let mut flags = StaticEditorFlags::empty();
            for flag_name in &desc.static_flags {
                let flag = StaticEditorFlags::from_name(flag_name).ok_or_else(|| {
                    SnapshotError::invalid_argument(format!("unknown static flag `{}`", flag_name))
                })?;
                flags |= flag;
            }

            {
                let node = scene.node_mut(handle);
                if let Some(instance_id) = desc.instance_id {
                    node.instance_id = instance_id;
                }
                node.local = LocalTransform {
                    position: desc.position.unwrap_or(Vec3::ZERO),
                    rotation: desc.rotation.unwrap_or(Quat::IDENTITY),
                    scale: desc.scale.unwrap_or(Vec3::ONE),
                };
                node.active = desc.active;
                node.is_static = desc.is_static;
                node.static_flags = flags;
                node.mesh = desc.mesh;
                node.prefab = desc.prefab;
            }

            pending_components.push((handle, desc.components));
            if desc.destroyed {
                scene.node_mut(handle).alive = false;
            }

            // Reverse so children pop in declaration order.
            queue.extend(desc.children.into_iter().rev().map(|c| (Some(handle), c)));
        }

        for (handle, components) in pending_components {
            for component in components {
                let resolved = component.map(|c| {
                    let kind = c.kind_name();
                    c.map_handles(|key: String| {
                        let found = keys.get(&key).copied();
                        if found.is_none() {
                            warn!(
                                "Unknown node key `{}` referenced from {} on {:?}",
                                key, kind, handle
                            );
                        }
                        found
                    })
                });
                scene.node_mut(handle).components.push(resolved);
            }
        }

        // A destroyed node takes its subtree with it.
        let dead: Vec<_> = (0..scene.nodes.len())
            .map(|idx| MemoryHandle(idx as u32))
            .filter(|&h| !scene.node(h).alive)
            .collect();
        for handle in dead {
            scene.destroy(handle);
        }

        Ok(scene)
    }
}

impl SceneHost for MemoryScene {
    type Handle = MemoryHandle;

    fn is_alive(&self, node: MemoryHandle) -> bool {
        self.nodes.get(node.index()).is_some_and(|n| n.alive)
    }

    fn name(&self, node: MemoryHandle) -> String {
        self.node(node).name.clone()
    }

    fn parent(&self, node: MemoryHandle) -> Option<MemoryHandle> {
        self.node(node).parent
    }

    fn children(&self, node: MemoryHandle) -> Vec<MemoryHandle> {
        self.node(node).children.clone()
    }

    fn instance_id(&self, node: MemoryHandle) -> i32 {
        self.node(node).instance_id
    }

    fn local_transform(&self, node: MemoryHandle) -> LocalTransform {
        self.node(node).local
    }

    fn world_matrix(&self, node: MemoryHandle) -> Mat4 {
        let mut world = self.node(node).local.to_matrix();
        let mut cur = self.node(node).parent;
        while let Some(parent) = cur {
            world = self.node(parent).local.to_matrix() * world;
            cur = self.node(parent).parent;
        }
        world
    }

    fn active_self(&self, node: MemoryHandle) -> bool {
        self.node(node).active
    }

    fn active_in_hierarchy(&self, node: MemoryHandle) -> bool {
        let mut cur = Some(node);
        while let Some(h) = cur {
            if !self.node(h).active {
                return false;
            }
            cur = self.node(h).parent;
        }
        true
    }

    fn is_static(&self, node: MemoryHandle) -> bool {
        self.node(node).is_static
    }

    fn static_flags(&self, node: MemoryHandle) -> StaticEditorFlags {
        self.node(node).static_flags
    }

    fn mesh(&self, node: MemoryHandle) -> Option<AssetKey> {
        self.node(node).mesh
    }

    fn prefab_link(&self, node: MemoryHandle) -> Option<PrefabLink> {
        self.node(node).prefab
    }

    fn components(&self, node: MemoryHandle) -> Vec<Option<Component<MemoryHandle>>> {
        self.node(node).components.clone()
    }
}

fn default_build_index() -> i32 {
    -1
}

fn default_true() -> bool {
    true
}

/// Serialized form of a [`MemoryScene`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDescription {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default = "default_build_index")]
    pub build_index: i32,
    #[serde(default)]
    pub roots: Vec<NodeDescription>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    pub name: String,
    /// Name other nodes use to reference this one (bones, joint bodies).
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub instance_id: Option<i32>,
    #[serde(default)]
    pub position: Option<Vec3>,
    #[serde(default)]
    pub rotation: Option<Quat>,
    #[serde(default)]
    pub scale: Option<Vec3>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub static_flags: Vec<String>,
    #[serde(default)]
    pub mesh: Option<AssetKey>,
    #[serde(default)]
    pub prefab: Option<PrefabLink>,
    /// `null` entries stand for missing components.
    #[serde(default)]
    pub components: Vec<Option<Component<String>>>,
    #[serde(default)]
    pub destroyed: bool,
    #[serde(default)]
    pub children: Vec<NodeDescription>,
}
