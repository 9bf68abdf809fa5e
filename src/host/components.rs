//! Host-side component payloads.
//!
//! Components that reference other scene nodes (bones, joint bodies) are generic over the
//! host handle type `H`, so the same shapes serve both a live host and a serialized scene
//! description that names nodes by key.

use crate::host::AssetKey;

use glam::{Vec3, Vec4};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum Component<H> {
    MeshRenderer(MeshRendererInfo),
    SkinnedMeshRenderer(SkinnedMeshRendererInfo<H>),
    Light(LightInfo),
    ReflectionProbe(ReflectionProbeInfo),
    Terrain(TerrainInfo),
    Collider(ColliderInfo),
    Rigidbody(RigidbodyInfo),
    Joint(JointInfo<H>),
    Animator(AnimatorInfo),
}

impl<H> Component<H> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Component::MeshRenderer(_) => "MeshRenderer",
            Component::SkinnedMeshRenderer(_) => "SkinnedMeshRenderer",
            Component::Light(_) => "Light",
            Component::ReflectionProbe(_) => "ReflectionProbe",
            Component::Terrain(_) => "Terrain",
            Component::Collider(_) => "Collider",
            Component::Rigidbody(_) => "Rigidbody",
            Component::Joint(_) => "Joint",
            Component::Animator(_) => "Animator",
        }
    }

    /// Rewrites every node reference, dropping references `f` cannot resolve.
    pub fn map_handles<T, F>(self, mut f: F) -> Component<T>
    where
        F: FnMut(H) -> Option<T>,
    {
        match self {
            Component::MeshRenderer(r) => Component::MeshRenderer(r),
            Component::SkinnedMeshRenderer(s) => {
                Component::SkinnedMeshRenderer(SkinnedMeshRendererInfo {
                    mesh: s.mesh,
                    materials: s.materials,
                    root_bone: s.root_bone.and_then(&mut f),
                    bones: s.bones.into_iter().filter_map(&mut f).collect(),
                    update_when_offscreen: s.update_when_offscreen,
                })
            }
            Component::Light(l) => Component::Light(l),
            Component::ReflectionProbe(p) => Component::ReflectionProbe(p),
            Component::Terrain(t) => Component::Terrain(t),
            Component::Collider(c) => Component::Collider(c),
            Component::Rigidbody(r) => Component::Rigidbody(r),
            Component::Joint(j) => Component::Joint(JointInfo {
                kind: j.kind,
                connected_body: j.connected_body.and_then(&mut f),
                anchor: j.anchor,
                connected_anchor: j.connected_anchor,
                axis: j.axis,
                break_force: j.break_force,
                break_torque: j.break_torque,
                enable_collision: j.enable_collision,
            }),
            Component::Animator(a) => Component::Animator(a),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_one() -> f32 {
    1.0
}

fn default_white() -> Vec4 {
    Vec4::ONE
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshRendererInfo {
    #[serde(default)]
    pub materials: Vec<AssetKey>,
    #[serde(default = "default_true")]
    pub cast_shadows: bool,
    #[serde(default = "default_true")]
    pub receive_shadows: bool,
    #[serde(default = "default_lightmap_index")]
    pub lightmap_index: i32,
    #[serde(default)]
    pub lightmap_scale_offset: Vec4,
}

fn default_lightmap_index() -> i32 {
    -1
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinnedMeshRendererInfo<H> {
    #[serde(default)]
    pub mesh: Option<AssetKey>,
    #[serde(default)]
    pub materials: Vec<AssetKey>,
    #[serde(default = "Option::default")]
    pub root_bone: Option<H>,
    #[serde(default = "Vec::new")]
    pub bones: Vec<H>,
    #[serde(default)]
    pub update_when_offscreen: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum LightKind {
    Spot,
    Directional,
    Point,
    Area,
}

impl LightKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LightKind::Spot => "spot",
            LightKind::Directional => "directional",
            LightKind::Point => "point",
            LightKind::Area => "area",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightInfo {
    pub kind: LightKind,
    #[serde(default = "default_white")]
    pub color: Vec4,
    #[serde(default = "default_one")]
    pub intensity: f32,
    #[serde(default = "default_range")]
    pub range: f32,
    #[serde(default = "default_spot_angle")]
    pub spot_angle: f32,
    #[serde(default = "default_one")]
    pub bounce_intensity: f32,
    #[serde(default)]
    pub cast_shadows: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_range() -> f32 {
    10.0
}

fn default_spot_angle() -> f32 {
    30.0
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionProbeInfo {
    #[serde(default)]
    pub center: Vec3,
    #[serde(default = "default_probe_size")]
    pub size: Vec3,
    #[serde(default = "default_one")]
    pub intensity: f32,
    #[serde(default)]
    pub box_projection: bool,
    #[serde(default = "default_importance")]
    pub importance: i32,
}

fn default_probe_size() -> Vec3 {
    Vec3::splat(10.0)
}

fn default_importance() -> i32 {
    1
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainInfo {
    pub terrain_data: AssetKey,
    #[serde(default)]
    pub material: Option<AssetKey>,
    #[serde(default = "default_true")]
    pub cast_shadows: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum ColliderShape {
    Box {
        size: Vec3,
    },
    Sphere {
        radius: f32,
    },
    Capsule {
        radius: f32,
        height: f32,
        /// Axis index, 0 = x, 1 = y, 2 = z.
        direction: i32,
    },
    Mesh {
        #[serde(default)]
        mesh: Option<AssetKey>,
        #[serde(default)]
        convex: bool,
    },
    Terrain {
        #[serde(rename = "terrainData")]
        terrain_data: AssetKey,
    },
    /// Shapes without a document form, e.g. wheel colliders.
    Unsupported {
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColliderInfo {
    #[serde(flatten)]
    pub shape: ColliderShape,
    #[serde(default)]
    pub center: Vec3,
    #[serde(default)]
    pub is_trigger: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RigidbodyInfo {
    #[serde(default = "default_one")]
    pub mass: f32,
    #[serde(default)]
    pub drag: f32,
    #[serde(default = "default_angular_drag")]
    pub angular_drag: f32,
    #[serde(default = "default_true")]
    pub use_gravity: bool,
    #[serde(default)]
    pub is_kinematic: bool,
    #[serde(default)]
    pub center_of_mass: Vec3,
}

fn default_angular_drag() -> f32 {
    0.05
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum JointKind {
    Fixed,
    Hinge,
    Spring,
    Character,
    Configurable,
}

impl JointKind {
    pub fn as_str(self) -> &'static str {
        match self {
            JointKind::Fixed => "fixed",
            JointKind::Hinge => "hinge",
            JointKind::Spring => "spring",
            JointKind::Character => "character",
            JointKind::Configurable => "configurable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JointInfo<H> {
    pub kind: JointKind,
    #[serde(default = "Option::default")]
    pub connected_body: Option<H>,
    #[serde(default)]
    pub anchor: Vec3,
    #[serde(default)]
    pub connected_anchor: Vec3,
    #[serde(default = "default_axis")]
    pub axis: Vec3,
    #[serde(default = "default_infinity")]
    pub break_force: f32,
    #[serde(default = "default_infinity")]
    pub break_torque: f32,
    #[serde(default)]
    pub enable_collision: bool,
}

fn default_axis() -> Vec3 {
    Vec3::X
}

fn default_infinity() -> f32 {
    f32::INFINITY
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimatorInfo {
    #[serde(default)]
    pub controller: Option<AssetKey>,
    #[serde(default)]
    pub has_avatar: bool,
    #[serde(default)]
    pub apply_root_motion: bool,
}
