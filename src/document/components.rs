//! Document forms of the per-kind node components.

use crate::host::{
    AnimatorInfo, AssetKey, ColliderInfo, ColliderShape, Component, JointInfo, LightInfo,
    MeshRendererInfo, ReflectionProbeInfo, RigidbodyInfo, SceneHost, SkinnedMeshRendererInfo,
    TerrainInfo,
};
use crate::identity_table::IdentityTable;
use crate::json_value::JsonValue;
use crate::json_writer::JsonWriter;
use crate::res_id::ResId;
use crate::resource_mapper::ResourceRegistry;

use glam::{Vec3, Vec4};

/// Everything a component needs to turn host references into ids.
///
/// The node table is only read; sub-resources go through the registry, which may intern.
pub(crate) struct ConvertContext<'a, H: SceneHost, R> {
    pub host: &'a H,
    pub objects: &'a IdentityTable<H::Handle>,
    pub registry: &'a mut R,
}

impl<H: SceneHost, R: ResourceRegistry<H>> ConvertContext<'_, H, R> {
    /// Id of an already discovered node; undiscovered or dead nodes yield [`ResId::INVALID`].
    pub fn node_id(&self, node: Option<H::Handle>) -> ResId {
        self.objects.find_id(node.and_then(|n| self.host.live(n)))
    }

    pub fn node_name(&self, node: Option<H::Handle>) -> String {
        node.and_then(|n| self.host.live(n))
            .map(|n| self.host.name(n))
            .unwrap_or_default()
    }

    fn materials(&mut self, keys: &[AssetKey]) -> Vec<ResId> {
        keys.iter()
            .map(|&key| self.registry.intern_material(Some(key)))
            .collect()
    }
}

/// A converted component, before it is sorted into the per-kind lists of its node.
pub(crate) enum JsonComponent {
    Renderer(JsonRendererData),
    SkinRenderer(JsonSkinRendererData),
    Light(JsonLight),
    ReflectionProbe(JsonReflectionProbe),
    Terrain(JsonTerrain),
    Collider(JsonCollider),
    Rigidbody(JsonRigidbody),
    Joint(JsonPhysicsJoint),
    Animator(JsonAnimator),
}

impl JsonComponent {
    /// `collider_index` counts every collider on the node, supported or not.
    pub fn convert<H, R>(
        component: Component<H::Handle>,
        collider_index: &mut usize,
        ctx: &mut ConvertContext<'_, H, R>,
    ) -> Self
    where
        H: SceneHost,
        R: ResourceRegistry<H>,
    {
        match component {
            Component::MeshRenderer(info) => {
                JsonComponent::Renderer(JsonRendererData::new(&info, ctx))
            }
            Component::SkinnedMeshRenderer(info) => {
                JsonComponent::SkinRenderer(JsonSkinRendererData::new(&info, ctx))
            }
            Component::Light(info) => JsonComponent::Light(JsonLight::from(&info)),
            Component::ReflectionProbe(info) => {
                JsonComponent::ReflectionProbe(JsonReflectionProbe::from(&info))
            }
            Component::Terrain(info) => JsonComponent::Terrain(JsonTerrain::new(&info, ctx)),
            Component::Collider(info) => {
                let index = *collider_index;
                *collider_index += 1;
                JsonComponent::Collider(JsonCollider::new(&info, index, ctx))
            }
            Component::Rigidbody(info) => JsonComponent::Rigidbody(JsonRigidbody::from(&info)),
            Component::Joint(info) => JsonComponent::Joint(JsonPhysicsJoint::new(&info, ctx)),
            Component::Animator(info) => JsonComponent::Animator(JsonAnimator::from(&info)),
        }
    }
}

/// Infinite limits mean "unbreakable" and have no JSON number form.
fn finite(value: f32) -> Option<f32> {
    value.is_finite().then_some(value)
}

struct Color(Vec4);

impl JsonValue for Color {
    fn write_json_value(&self, w: &mut JsonWriter) {
        w.inline_object(|w| {
            w.write_key_val("r", &self.0.x);
            w.write_key_val("g", &self.0.y);
            w.write_key_val("b", &self.0.z);
            w.write_key_val("a", &self.0.w);
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonRendererData {
    pub materials: Vec<ResId>,
    pub cast_shadows: bool,
    pub receive_shadows: bool,
    pub lightmap_index: i32,
    pub lightmap_scale_offset: Vec4,
}

impl JsonRendererData {
    pub(crate) fn new<H, R>(info: &MeshRendererInfo, ctx: &mut ConvertContext<'_, H, R>) -> Self
    where
        H: SceneHost,
        R: ResourceRegistry<H>,
    {
        JsonRendererData {
            materials: ctx.materials(&info.materials),
            cast_shadows: info.cast_shadows,
            receive_shadows: info.receive_shadows,
            lightmap_index: info.lightmap_index,
            lightmap_scale_offset: info.lightmap_scale_offset,
        }
    }
}

impl JsonValue for JsonRendererData {
    fn write_json_value(&self, w: &mut JsonWriter) {
        w.object(|w| {
            w.write_key_val("materials", &self.materials);
            w.write_key_val("castShadows", &self.cast_shadows);
            w.write_key_val("receiveShadows", &self.receive_shadows);
            w.write_key_val("lightmapIndex", &self.lightmap_index);
            w.write_key_val("lightmapScaleOffset", &self.lightmap_scale_offset);
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonSkinRendererData {
    pub mesh: ResId,
    pub materials: Vec<ResId>,
    pub root_bone: ResId,
    pub root_bone_name: String,
    pub bones: Vec<ResId>,
    pub bone_names: Vec<String>,
    pub update_when_offscreen: bool,
}

impl JsonSkinRendererData {
    pub(crate) fn new<H, R>(
        info: &SkinnedMeshRendererInfo<H::Handle>,
        ctx: &mut ConvertContext<'_, H, R>,
    ) -> Self
    where
        H: SceneHost,
        R: ResourceRegistry<H>,
    {
        JsonSkinRendererData {
            mesh: ctx.registry.intern_mesh(info.mesh),
            materials: ctx.materials(&info.materials),
            root_bone: ctx.node_id(info.root_bone),
            root_bone_name: ctx.node_name(info.root_bone),
            bones: info.bones.iter().map(|&b| ctx.node_id(Some(b))).collect(),
            bone_names: info.bones.iter().map(|&b| ctx.node_name(Some(b))).collect(),
            update_when_offscreen: info.update_when_offscreen,
        }
    }
}

impl JsonValue for JsonSkinRendererData {
    fn write_json_value(&self, w: &mut JsonWriter) {
        w.object(|w| {
            w.write_key_val("meshId", &self.mesh);
            w.write_key_val("materials", &self.materials);
            w.write_key_val("rootBone", &self.root_bone);
            w.write_key_val("rootBoneName", &self.root_bone_name);
            w.write_key_val("bones", &self.bones);
            w.write_key_val("boneNames", &self.bone_names);
            w.write_key_val("updateWhenOffscreen", &self.update_when_offscreen);
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonLight {
    pub light_type: &'static str,
    pub color: Vec4,
    pub intensity: f32,
    pub range: f32,
    pub spot_angle: f32,
    pub bounce_intensity: f32,
    pub cast_shadows: bool,
    pub enabled: bool,
}

impl From<&LightInfo> for JsonLight {
    fn from(info: &LightInfo) -> Self {
        JsonLight {
            light_type: info.kind.as_str(),
            color: info.color,
            intensity: info.intensity,
            range: info.range,
            spot_angle: info.spot_angle,
            bounce_intensity: info.bounce_intensity,
            cast_shadows: info.cast_shadows,
            enabled: info.enabled,
        }
    }
}

impl JsonValue for JsonLight {
    fn write_json_value(&self, w: &mut JsonWriter) {
        w.object(|w| {
            w.write_key_val("type", self.light_type);
            w.write_key_val("color", &Color(self.color));
            w.write_key_val("intensity", &self.intensity);
            w.write_key_val("range", &self.range);
            w.write_key_val("spotAngle", &self.spot_angle);
            w.write_key_val("bounceIntensity", &self.bounce_intensity);
            w.write_key_val("castsShadows", &self.cast_shadows);
            w.write_key_val("enabled", &self.enabled);
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonReflectionProbe {
    pub center: Vec3,
    pub size: Vec3,
    pub intensity: f32,
    pub box_projection: bool,
    pub importance: i32,
}

impl From<&ReflectionProbeInfo> for JsonReflectionProbe {
    fn from(info: &ReflectionProbeInfo) -> Self {
        JsonReflectionProbe {
            center: info.center,
            size: info.size,
            intensity: info.intensity,
            box_projection: info.box_projection,
            importance: info.importance,
        }
    }
}

impl JsonValue for JsonReflectionProbe {
    fn write_json_value(&self, w: &mut JsonWriter) {
        w.object(|w| {
            w.write_key_val("center", &self.center);
            w.write_key_val("size", &self.size);
            w.write_key_val("intensity", &self.intensity);
            w.write_key_val("boxProjection", &self.box_projection);
            w.write_key_val("importance", &self.importance);
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonTerrain {
    pub terrain_data: ResId,
    pub material: ResId,
    pub cast_shadows: bool,
}

impl JsonTerrain {
    pub(crate) fn new<H, R>(info: &TerrainInfo, ctx: &mut ConvertContext<'_, H, R>) -> Self
    where
        H: SceneHost,
        R: ResourceRegistry<H>,
    {
        JsonTerrain {
            terrain_data: ctx.registry.intern_terrain_data(Some(info.terrain_data)),
            material: ctx.registry.intern_material(info.material),
            cast_shadows: info.cast_shadows,
        }
    }
}

impl JsonValue for JsonTerrain {
    fn write_json_value(&self, w: &mut JsonWriter) {
        w.object(|w| {
            w.write_key_val("terrainDataId", &self.terrain_data);
            w.write_key_val("materialId", &self.material);
            w.write_key_val("castShadows", &self.cast_shadows);
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonCollider {
    /// Position among all colliders of the node, including unsupported ones.
    pub collider_index: usize,
    pub collider_type: String,
    pub supported: bool,
    pub center: Vec3,
    pub size: Vec3,
    pub radius: f32,
    pub height: f32,
    pub direction: i32,
    pub mesh: ResId,
    pub convex: bool,
    pub terrain_data: ResId,
    pub is_trigger: bool,
    pub enabled: bool,
}

impl JsonCollider {
    pub(crate) fn new<H, R>(
        info: &ColliderInfo,
        collider_index: usize,
        ctx: &mut ConvertContext<'_, H, R>,
    ) -> Self
    where
        H: SceneHost,
        R: ResourceRegistry<H>,
    {
        let mut collider = JsonCollider {
            collider_index,
            collider_type: String::new(),
            supported: true,
            center: info.center,
            size: Vec3::ZERO,
            radius: 0.0,
            height: 0.0,
            direction: 0,
            mesh: ResId::INVALID,
            convex: false,
            terrain_data: ResId::INVALID,
            is_trigger: info.is_trigger,
            enabled: info.enabled,
        };

        match &info.shape {
            ColliderShape::Box { size } => {
                collider.collider_type = "box".to_owned();
                collider.size = *size;
            }
            ColliderShape::Sphere { radius } => {
                collider.collider_type = "sphere".to_owned();
                collider.radius = *radius;
            }
            ColliderShape::Capsule {
                radius,
                height,
                direction,
            } => {
                collider.collider_type = "capsule".to_owned();
                collider.radius = *radius;
                collider.height = *height;
                collider.direction = *direction;
            }
            ColliderShape::Mesh { mesh, convex } => {
                collider.collider_type = "mesh".to_owned();
                collider.mesh = ctx.registry.intern_mesh(*mesh);
                collider.convex = *convex;
            }
            ColliderShape::Terrain { terrain_data } => {
                collider.collider_type = "terrain".to_owned();
                collider.terrain_data = ctx.registry.intern_terrain_data(Some(*terrain_data));
            }
            ColliderShape::Unsupported { name } => {
                collider.collider_type = name.clone();
                collider.supported = false;
            }
        }
        collider
    }

    pub fn is_supported_type(&self) -> bool {
        self.supported
    }
}

impl JsonValue for JsonCollider {
    fn write_json_value(&self, w: &mut JsonWriter) {
        w.object(|w| {
            w.write_key_val("colliderIndex", &self.collider_index);
            w.write_key_val("colliderType", &self.collider_type);
            w.write_key_val("center", &self.center);
            w.write_key_val("size", &self.size);
            w.write_key_val("radius", &self.radius);
            w.write_key_val("height", &self.height);
            w.write_key_val("direction", &self.direction);
            w.write_key_val("meshId", &self.mesh);
            w.write_key_val("convex", &self.convex);
            w.write_key_val("terrainDataId", &self.terrain_data);
            w.write_key_val("isTrigger", &self.is_trigger);
            w.write_key_val("enabled", &self.enabled);
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonRigidbody {
    pub mass: f32,
    pub drag: f32,
    pub angular_drag: f32,
    pub use_gravity: bool,
    pub is_kinematic: bool,
    pub center_of_mass: Vec3,
}

impl From<&RigidbodyInfo> for JsonRigidbody {
    fn from(info: &RigidbodyInfo) -> Self {
        JsonRigidbody {
            mass: info.mass,
            drag: info.drag,
            angular_drag: info.angular_drag,
            use_gravity: info.use_gravity,
            is_kinematic: info.is_kinematic,
            center_of_mass: info.center_of_mass,
        }
    }
}

impl JsonValue for JsonRigidbody {
    fn write_json_value(&self, w: &mut JsonWriter) {
        w.object(|w| {
            w.write_key_val("mass", &self.mass);
            w.write_key_val("drag", &self.drag);
            w.write_key_val("angularDrag", &self.angular_drag);
            w.write_key_val("useGravity", &self.use_gravity);
            w.write_key_val("isKinematic", &self.is_kinematic);
            w.write_key_val("centerOfMass", &self.center_of_mass);
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonPhysicsJoint {
    pub joint_type: &'static str,
    pub connected_body: ResId,
    pub connected_body_name: String,
    pub anchor: Vec3,
    pub connected_anchor: Vec3,
    pub axis: Vec3,
    /// `None` for unbreakable joints.
    pub break_force: Option<f32>,
    pub break_torque: Option<f32>,
    pub enable_collision: bool,
}

impl JsonPhysicsJoint {
    pub(crate) fn new<H, R>(info: &JointInfo<H::Handle>, ctx: &mut ConvertContext<'_, H, R>) -> Self
    where
        H: SceneHost,
        R: ResourceRegistry<H>,
    {
        JsonPhysicsJoint {
            joint_type: info.kind.as_str(),
            connected_body: ctx.node_id(info.connected_body),
            connected_body_name: ctx.node_name(info.connected_body),
            anchor: info.anchor,
            connected_anchor: info.connected_anchor,
            axis: info.axis,
            break_force: finite(info.break_force),
            break_torque: finite(info.break_torque),
            enable_collision: info.enable_collision,
        }
    }
}

impl JsonValue for JsonPhysicsJoint {
    fn write_json_value(&self, w: &mut JsonWriter) {
        w.object(|w| {
            w.write_key_val("jointType", self.joint_type);
            w.write_key_val("connectedBodyObjectId", &self.connected_body);
            w.write_key_val("connectedBodyName", &self.connected_body_name);
            w.write_key_val("anchor", &self.anchor);
            w.write_key_val("connectedAnchor", &self.connected_anchor);
            w.write_key_val("axis", &self.axis);
            w.write_key_val("breakForce", &self.break_force);
            w.write_key_val("breakTorque", &self.break_torque);
            w.write_key_val("enableCollision", &self.enable_collision);
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonAnimator {
    pub controller: Option<u64>,
    pub has_avatar: bool,
    pub apply_root_motion: bool,
}

impl From<&AnimatorInfo> for JsonAnimator {
    fn from(info: &AnimatorInfo) -> Self {
        JsonAnimator {
            controller: info.controller.map(|key| key.0),
            has_avatar: info.has_avatar,
            apply_root_motion: info.apply_root_motion,
        }
    }
}

impl JsonValue for JsonAnimator {
    fn write_json_value(&self, w: &mut JsonWriter) {
        w.object(|w| {
            w.write_key_val("controller", &self.controller);
            w.write_key_val("hasAvatar", &self.has_avatar);
            w.write_key_val("applyRootMotion", &self.apply_root_motion);
        });
    }
}
