//! Read-only view over the host's live scene hierarchy.
//!
//! The exporter never owns or mutates host objects. Everything it needs is pulled through
//! [`SceneHost`], keyed by the host's own handle type.

pub mod components;
pub mod memory;

pub use components::*;
pub use memory::{MemoryHandle, MemoryScene};

use bitflags::bitflags;
use glam::{Mat4, Quat, Vec3};
use serde::Deserialize;
use std::fmt::Debug;
use std::hash::Hash;

/// Opaque key of a host asset (mesh, material, prefab asset, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct AssetKey(pub u64);

bitflags! {
    /// Editor-side static categories of a node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StaticEditorFlags: u32 {
        const CONTRIBUTE_GI = 0x01;
        const OCCLUDER_STATIC = 0x02;
        const BATCHING_STATIC = 0x04;
        const NAVIGATION_STATIC = 0x08;
        const OCCLUDEE_STATIC = 0x10;
        const OFF_MESH_LINK_GENERATION = 0x20;
        const REFLECTION_PROBE_STATIC = 0x40;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum PrefabKind {
    Prefab,
    ModelPrefab,
    PrefabInstance,
    ModelPrefabInstance,
}

impl PrefabKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PrefabKind::Prefab => "Prefab",
            PrefabKind::ModelPrefab => "ModelPrefab",
            PrefabKind::PrefabInstance => "PrefabInstance",
            PrefabKind::ModelPrefabInstance => "ModelPrefabInstance",
        }
    }

    pub fn is_instance(self) -> bool {
        matches!(
            self,
            PrefabKind::PrefabInstance | PrefabKind::ModelPrefabInstance
        )
    }
}

/// Link between a scene node and the prefab asset it was created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct PrefabLink {
    /// Root object of the prefab asset.
    pub root: AssetKey,
    /// The asset object this node corresponds to.
    pub object: AssetKey,
    pub kind: PrefabKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for LocalTransform {
    fn default() -> Self {
        LocalTransform {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl LocalTransform {
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// Accessors the exporter consumes from the host hierarchy.
///
/// Accessors are only called on handles for which [`SceneHost::is_alive`] returned true
/// moments earlier, but the host may still answer with defaults for a handle that died
/// in between.
pub trait SceneHost {
    type Handle: Copy + Eq + Hash + Debug;

    fn is_alive(&self, node: Self::Handle) -> bool;

    fn name(&self, node: Self::Handle) -> String;

    fn parent(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// Direct children in stable host order.
    fn children(&self, node: Self::Handle) -> Vec<Self::Handle>;

    fn instance_id(&self, node: Self::Handle) -> i32;

    fn local_transform(&self, node: Self::Handle) -> LocalTransform;

    fn world_matrix(&self, node: Self::Handle) -> Mat4;

    fn active_self(&self, node: Self::Handle) -> bool;

    fn active_in_hierarchy(&self, node: Self::Handle) -> bool;

    fn is_static(&self, node: Self::Handle) -> bool;

    fn static_flags(&self, node: Self::Handle) -> StaticEditorFlags;

    fn mesh(&self, node: Self::Handle) -> Option<AssetKey>;

    fn prefab_link(&self, node: Self::Handle) -> Option<PrefabLink>;

    /// Attached components; `None` marks a component slot whose object is gone.
    fn components(&self, node: Self::Handle) -> Vec<Option<Component<Self::Handle>>>;

    /// `Some(node)` while the node is alive, the form identity tables expect.
    fn live(&self, node: Self::Handle) -> Option<Self::Handle> {
        self.is_alive(node).then_some(node)
    }

    /// Live parent of `node`, if any.
    fn live_parent(&self, node: Self::Handle) -> Option<Self::Handle> {
        self.parent(node).and_then(|p| self.live(p))
    }

    /// Slash separated path from the hierarchy root down to `node`.
    fn scene_path(&self, node: Self::Handle) -> String {
        if !self.is_alive(node) {
            return "(null)".to_owned();
        }

        let mut names = vec![self.name(node)];
        let mut cur = self.live_parent(node);
        while let Some(parent) = cur {
            names.push(self.name(parent));
            cur = self.live_parent(parent);
        }
        names.reverse();
        names.join("/")
    }

    /// True if the node carries at least one component kind with a visual or lighting payload.
    fn has_supported_components(&self, node: Self::Handle) -> bool {
        self.components(node).iter().flatten().any(|c| {
            matches!(
                c,
                Component::MeshRenderer(_)
                    | Component::SkinnedMeshRenderer(_)
                    | Component::Light(_)
                    | Component::ReflectionProbe(_)
                    | Component::Terrain(_)
            )
        })
    }
}
