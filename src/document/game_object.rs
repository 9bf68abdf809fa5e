use crate::document::components::{
    ConvertContext, JsonAnimator, JsonCollider, JsonComponent, JsonLight, JsonPhysicsJoint,
    JsonReflectionProbe, JsonRendererData, JsonRigidbody, JsonSkinRendererData, JsonTerrain,
};
use crate::document::convert_components;
use crate::document::transform::JsonTransform;
use crate::host::{PrefabKind, SceneHost, StaticEditorFlags};
use crate::identity_table::IdentityTable;
use crate::json_value::JsonValue;
use crate::json_writer::JsonWriter;
use crate::res_id::ResId;
use crate::resource_mapper::ResourceRegistry;

use glam::{Mat4, Quat, Vec3};

/// Snapshot of one scene node.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonGameObject {
    pub name: String,
    pub scene_path: String,
    pub instance_id: i32,
    pub id: ResId,

    pub local_position: Vec3,
    pub local_rotation: Quat,
    pub local_scale: Vec3,
    pub world_matrix: Mat4,
    /// `parent_world⁻¹ · world`, or `world` for nodes without a live parent.
    pub local_matrix: Mat4,

    pub children: Vec<ResId>,
    pub child_names: Vec<String>,
    pub parent: ResId,
    pub parent_name: String,
    pub mesh: ResId,

    pub is_static: bool,
    pub light_map_static: bool,
    pub navigation_static: bool,
    pub occluder_static: bool,
    pub occludee_static: bool,
    pub reflection_probe_static: bool,

    pub active_self: bool,
    pub active_in_hierarchy: bool,

    pub name_clash: bool,
    pub unique_name: String,

    pub prefab_root_id: ResId,
    pub prefab_object_id: ResId,
    pub prefab_instance: bool,
    pub prefab_model_instance: bool,
    pub prefab_type: String,

    pub renderer: Vec<JsonRendererData>,
    pub light: Vec<JsonLight>,
    pub reflection_probes: Vec<JsonReflectionProbe>,
    pub skin_renderers: Vec<JsonSkinRendererData>,
    pub animators: Vec<JsonAnimator>,
    pub terrains: Vec<JsonTerrain>,
    pub colliders: Vec<JsonCollider>,
    pub rigidbodies: Vec<JsonRigidbody>,
    pub joints: Vec<JsonPhysicsJoint>,
}

impl Default for JsonGameObject {
    fn default() -> Self {
        JsonGameObject {
            name: String::new(),
            scene_path: String::new(),
            instance_id: -1,
            id: ResId::INVALID,
            local_position: Vec3::ZERO,
            local_rotation: Quat::IDENTITY,
            local_scale: Vec3::ONE,
            world_matrix: Mat4::IDENTITY,
            local_matrix: Mat4::IDENTITY,
            children: Vec::new(),
            child_names: Vec::new(),
            parent: ResId::INVALID,
            parent_name: String::new(),
            mesh: ResId::INVALID,
            is_static: false,
            light_map_static: false,
            navigation_static: false,
            occluder_static: false,
            occludee_static: false,
            reflection_probe_static: false,
            active_self: true,
            active_in_hierarchy: true,
            name_clash: false,
            unique_name: String::new(),
            prefab_root_id: ResId::INVALID,
            prefab_object_id: ResId::INVALID,
            prefab_instance: false,
            prefab_model_instance: false,
            prefab_type: String::new(),
            renderer: Vec::new(),
            light: Vec::new(),
            reflection_probes: Vec::new(),
            skin_renderers: Vec::new(),
            animators: Vec::new(),
            terrains: Vec::new(),
            colliders: Vec::new(),
            rigidbodies: Vec::new(),
            joints: Vec::new(),
        }
    }
}

impl JsonGameObject {
    /// Converts a live node.
    ///
    /// `objects` must already hold every node of the export; references to nodes it does not
    /// know (a parent outside the exported roots, an undiscovered bone) become invalid ids.
    pub fn new<H, R>(
        host: &H,
        node: H::Handle,
        objects: &IdentityTable<H::Handle>,
        registry: &mut R,
    ) -> Self
    where
        H: SceneHost,
        R: ResourceRegistry<H>,
    {
        let name = host.name(node);
        let local = host.local_transform(node);
        let world_matrix = host.world_matrix(node);
        let parent = host.live_parent(node);
        let local_matrix = match parent {
            Some(p) => host.world_matrix(p).inverse() * world_matrix,
            None => world_matrix,
        };

        let flags = host.static_flags(node);
        let prefab = host.prefab_link(node);

        let mut result = JsonGameObject {
            scene_path: host.scene_path(node),
            instance_id: host.instance_id(node),
            id: objects.find_id(Some(node)),
            local_position: local.position,
            local_rotation: local.rotation,
            local_scale: local.scale,
            world_matrix,
            local_matrix,
            is_static: host.is_static(node),
            light_map_static: flags.contains(StaticEditorFlags::CONTRIBUTE_GI),
            navigation_static: flags.contains(StaticEditorFlags::NAVIGATION_STATIC),
            occluder_static: flags.contains(StaticEditorFlags::OCCLUDER_STATIC),
            occludee_static: flags.contains(StaticEditorFlags::OCCLUDEE_STATIC),
            reflection_probe_static: flags.contains(StaticEditorFlags::REFLECTION_PROBE_STATIC),
            active_self: host.active_self(node),
            active_in_hierarchy: host.active_in_hierarchy(node),
            prefab_root_id: registry.intern_prefab_root(host, node, true),
            prefab_object_id: registry.intern_prefab_object(host, node, true),
            prefab_instance: prefab.is_some_and(|p| p.kind.is_instance()),
            prefab_model_instance: prefab
                .is_some_and(|p| p.kind == PrefabKind::ModelPrefabInstance),
            prefab_type: prefab.map(|p| p.kind.as_str().to_owned()).unwrap_or_default(),
            mesh: registry.intern_mesh(host.mesh(node)),
            ..JsonGameObject::default()
        };

        for child in host.children(node).into_iter().filter(|&c| host.is_alive(c)) {
            result.children.push(objects.find_id(Some(child)));
            result.child_names.push(host.name(child));
        }
        if let Some(p) = parent {
            result.parent = objects.find_id(Some(p));
            result.parent_name = host.name(p);
        }

        let mut ctx = ConvertContext {
            host,
            objects,
            registry,
        };
        let mut collider_index = 0;
        let converted = convert_components(&result.scene_path, host.components(node), |c| {
            JsonComponent::convert(c, &mut collider_index, &mut ctx)
        });
        for component in converted {
            match component {
                JsonComponent::Renderer(r) => result.renderer.push(r),
                JsonComponent::SkinRenderer(s) => result.skin_renderers.push(s),
                JsonComponent::Light(l) => result.light.push(l),
                JsonComponent::ReflectionProbe(p) => result.reflection_probes.push(p),
                JsonComponent::Terrain(t) => result.terrains.push(t),
                JsonComponent::Collider(c) if c.is_supported_type() => result.colliders.push(c),
                JsonComponent::Collider(_) => {}
                JsonComponent::Rigidbody(r) => result.rigidbodies.push(r),
                JsonComponent::Joint(j) => result.joints.push(j),
                JsonComponent::Animator(a) => result.animators.push(a),
            }
        }

        result.name = name;
        result
    }

    pub fn local_transform(&self) -> JsonTransform {
        JsonTransform::from(&self.local_matrix)
    }

    pub fn global_transform(&self) -> JsonTransform {
        JsonTransform::from(&self.world_matrix)
    }

    /// The name the node goes by once clashes are resolved.
    pub fn effective_name(&self) -> &str {
        if self.name_clash {
            &self.unique_name
        } else {
            &self.name
        }
    }
}

impl JsonValue for JsonGameObject {
    fn write_json_value(&self, w: &mut JsonWriter) {
        w.object(|w| {
            w.write_key_val("name", &self.name);
            w.write_key_val("instanceId", &self.instance_id);
            w.write_key_val("id", &self.id);
            w.write_key_val("scenePath", &self.scene_path);

            w.write_key_val("localPosition", &self.local_position);
            w.write_key_val("localRotation", &self.local_rotation);
            w.write_key_val("localScale", &self.local_scale);
            w.write_key_val("worldMatrix", &self.world_matrix);
            w.write_key_val("localMatrix", &self.local_matrix);

            w.write_key_val("localTransform", &self.local_transform());
            w.write_key_val("globalTransform", &self.global_transform());

            w.write_key_val("children", &self.children);
            w.write_key_val("childNames", &self.child_names);
            w.write_key_val("parent", &self.parent);
            w.write_key_val("parentName", &self.parent_name);
            w.write_key_val("mesh", &self.mesh);

            w.write_key_val("isStatic", &self.is_static);
            w.write_key_val("lightMapStatic", &self.light_map_static);
            w.write_key_val("navigationStatic", &self.navigation_static);
            w.write_key_val("occluderStatic", &self.occluder_static);
            w.write_key_val("occludeeStatic", &self.occludee_static);
            w.write_key_val("reflectionProbeStatic", &self.reflection_probe_static);

            w.write_key_val("activeSelf", &self.active_self);
            w.write_key_val("activeInHierarchy", &self.active_in_hierarchy);

            w.write_key_val("nameClash", &self.name_clash);
            w.write_key_val("uniqueName", &self.unique_name);

            w.write_key_val("prefabRootId", &self.prefab_root_id);
            w.write_key_val("prefabObjectId", &self.prefab_object_id);
            w.write_key_val("prefabInstance", &self.prefab_instance);
            w.write_key_val("prefabModelInstance", &self.prefab_model_instance);
            w.write_key_val("prefabType", &self.prefab_type);

            w.write_key_array("renderer", &self.renderer);
            w.write_key_array("light", &self.light);
            w.write_key_array("reflectionProbes", &self.reflection_probes);
            w.write_key_array("skinRenderers", &self.skin_renderers);
            w.write_key_array("animators", &self.animators);
            w.write_key_array("terrains", &self.terrains);
            w.write_key_array("colliders", &self.colliders);
            w.write_key_array("rigidbodies", &self.rigidbodies);
            w.write_key_array("joints", &self.joints);
        });
    }
}
