mod fixtures;

use fixtures::*;

use glam::{Mat4, Quat, Vec3};
use pretty_assertions::assert_eq;
use scene_snapshot::host::{
    AssetKey, Component, LocalTransform, PrefabLink, StaticEditorFlags,
};
use scene_snapshot::{
    ExportSession, ExportSettings, MemoryHandle, MemoryScene, NoProgress, ResId, ResourceMapper,
    SceneHost, SnapshotError,
};
use std::cell::RefCell;
use std::collections::HashSet;

fn export_workshop(settings: ExportSettings) -> (scene_snapshot::JsonScene, String, Vec<String>) {
    let scene = load_workshop();
    let mut session =
        ExportSession::new(&scene, ResourceMapper::new()).with_configuration(settings);
    let doc = session
        .export_scene(&scene.scene_info(), &mut NoProgress)
        .unwrap();
    let text = session.to_json_string(&doc);
    let log = session.log().messages().to_vec();
    (doc, text, log)
}

#[test]
fn test_two_legs_under_one_root() {
    ensure_env_logger_initialized();

    let mut scene = MemoryScene::new("legs");
    let root = scene.add_root("root");
    let child = scene.add_child(root, "child");
    let child2 = scene.add_child(root, "Leg");
    scene.set_name(child, "Leg");

    let mut session = ExportSession::new(&scene, ResourceMapper::new());
    let doc = session.export_object(root, &mut NoProgress).unwrap();

    assert_eq!(doc.objects.len(), 3);

    let root_obj = &doc.objects[0];
    let child_id = doc.objects[1].id;
    let child2_id = doc.objects[2].id;
    assert_eq!(root_obj.children, vec![child_id, child2_id]);
    assert_eq!(root_obj.child_names, vec!["Leg", "Leg"]);

    let renamed: Vec<_> = doc.objects[1..]
        .iter()
        .filter(|o| o.unique_name == "Leg-#1")
        .collect();
    assert_eq!(renamed.len(), 1);
    assert!(renamed[0].name_clash);
    assert_eq!(renamed[0].id, child2_id);

    // Emitted text agrees with the in-memory tree.
    let json = parse_document(&session.to_json_string(&doc));
    let objects = json["objects"].as_array().unwrap();
    assert_eq!(objects.len(), 3);
    assert_eq!(objects[2]["uniqueName"], "Leg-#1");
    assert_eq!(objects[1]["nameClash"], false);
}

#[test]
fn test_workshop_ids_follow_breadth_first_order() {
    ensure_env_logger_initialized();
    let (doc, _, _) = export_workshop(ExportSettings::new());

    let names: Vec<&str> = doc.objects.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Robot", "Lamp", "Floor", "Body", "Leg", "Leg", "Arm"]
    );
    for (idx, obj) in doc.objects.iter().enumerate() {
        assert_eq!(obj.id, ResId::new(idx));
    }

    assert_eq!(doc.name, "Workshop");
    assert_eq!(doc.path, "Assets/Scenes/Workshop.unity");
    assert_eq!(doc.build_index, 1);

    let robot = &doc.objects[0];
    // The destroyed child is neither exported nor listed.
    assert_eq!(
        robot.children,
        vec![ResId::new(3), ResId::new(4), ResId::new(5), ResId::new(6)]
    );
    assert_eq!(robot.child_names, vec!["Body", "Leg", "Leg", "Arm"]);
    assert_eq!(robot.parent, ResId::INVALID);

    for obj in &doc.objects {
        assert_eq!(obj.children.len(), obj.child_names.len());
        for &child in &obj.children {
            assert_eq!(doc.find_object(child).unwrap().parent, obj.id);
        }
    }

    let right_leg = doc.find_object_by_instance_id(1003).unwrap();
    assert!(right_leg.name_clash);
    assert_eq!(right_leg.unique_name, "Leg-#1");
    assert!(!doc.find_object_by_instance_id(1002).unwrap().name_clash);
}

#[test]
fn test_workshop_local_matrices_match_parent_world() {
    let (doc, _, _) = export_workshop(ExportSettings::new());

    for obj in &doc.objects {
        let expected = match doc.find_object(obj.parent) {
            Some(parent) => parent.world_matrix.inverse() * obj.world_matrix,
            None => obj.world_matrix,
        };
        assert!(
            obj.local_matrix.abs_diff_eq(expected, 1e-5),
            "local matrix of {} does not match",
            obj.name
        );
    }

    let arm = doc.find_object_by_instance_id(1004).unwrap();
    let expected_rotation = Quat::from_xyzw(0.0, 0.707_106_8, 0.0, 0.707_106_8);
    assert!(arm.local_rotation.abs_diff_eq(expected_rotation, 1e-6));
    let rotated_x = arm.local_matrix.transform_vector3(Vec3::X);
    assert!(rotated_x.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
}

#[test]
fn test_workshop_resources_are_deduplicated() {
    let scene = load_workshop();
    let mut session = ExportSession::new(&scene, ResourceMapper::new());
    let doc = session
        .export_scene(&scene.scene_info(), &mut NoProgress)
        .unwrap();

    let registry = session.registry();
    // 100 (skin), 101 (body + floor), 102 (both legs).
    assert_eq!(registry.meshes().len(), 3);
    assert_eq!(registry.materials().len(), 2);
    assert_eq!(registry.prefab_roots().len(), 1);
    assert_eq!(registry.terrain_data().len(), 1);

    let floor = doc.find_object_by_instance_id(3000).unwrap();
    let body = doc.find_object_by_instance_id(1001).unwrap();
    assert_eq!(floor.mesh, body.mesh);
    assert_eq!(
        doc.find_object_by_instance_id(1002).unwrap().mesh,
        doc.find_object_by_instance_id(1003).unwrap().mesh
    );

    let robot = &doc.objects[0];
    assert_eq!(robot.prefab_root_id, ResId::new(0));
    assert_eq!(robot.prefab_object_id, ResId::new(0));
    assert!(robot.prefab_instance);
    assert!(!robot.prefab_model_instance);
    assert_eq!(robot.prefab_type, "PrefabInstance");
    assert_eq!(body.prefab_root_id, ResId::INVALID);

    let skin = &robot.skin_renderers[0];
    assert_eq!(skin.root_bone, body.id);
    assert_eq!(skin.bones, vec![ResId::new(3), ResId::new(4), ResId::new(5)]);
    assert_eq!(skin.bone_names, vec!["Body", "Leg", "Leg"]);
    assert_eq!(robot.animators.len(), 1);
    assert_eq!(robot.rigidbodies[0].mass, 80.0);

    // The unsupported wheel collider is dropped but still counted.
    let indices: Vec<usize> = body.colliders.iter().map(|c| c.collider_index).collect();
    assert_eq!(indices, vec![0, 2]);
    assert_eq!(body.renderer[0].materials, vec![ResId::new(0), ResId::new(1)]);

    let arm = doc.find_object_by_instance_id(1004).unwrap();
    assert_eq!(arm.joints[0].connected_body, body.id);
    assert_eq!(arm.joints[0].break_force, Some(500.0));
    assert_eq!(arm.joints[0].break_torque, None);

    let lamp = doc.find_object_by_instance_id(2000).unwrap();
    assert!(!lamp.active_self);
    assert!(!lamp.active_in_hierarchy);
    assert_eq!(lamp.light[0].light_type, "point");

    assert!(floor.is_static);
    assert!(floor.light_map_static);
    assert!(floor.occluder_static);
    assert!(floor.navigation_static);
    assert!(!floor.occludee_static);
    assert_eq!(floor.terrains.len(), 1);
    assert_eq!(floor.colliders[0].collider_type, "terrain");
    assert_eq!(floor.colliders[0].terrain_data, floor.terrains[0].terrain_data);
    assert_eq!(floor.reflection_probes.len(), 1);

    assert!(
        session
            .log()
            .messages()
            .iter()
            .any(|m| m.starts_with("3 new mesh(s)"))
    );
}

#[test]
fn test_workshop_document_shape() {
    let (_, text, _) = export_workshop(ExportSettings::new());
    let json = parse_document(&text);

    assert_eq!(json["name"], "Workshop");
    assert_eq!(json["buildIndex"], 1);

    let body = &json["objects"][3];
    assert_eq!(body["name"], "Body");
    assert_eq!(body["scenePath"], "Robot/Body");
    assert_eq!(body["parent"], 0);
    assert_eq!(body["parentName"], "Robot");
    assert_eq!(body["instanceId"], 1001);

    let world = body["worldMatrix"].as_array().unwrap();
    assert_eq!(world.len(), 16);
    // Row major: translation in the last column.
    assert_eq!(world[3], 0.0);
    assert_eq!(world[7], 1.0);
    assert_eq!(world[11], 5.0);
    assert_eq!(body["globalTransform"]["pos"], serde_json::json!([0.0, 1.0, 5.0]));
    assert_eq!(body["localPosition"], serde_json::json!({"x": 0.0, "y": 1.0, "z": 0.0}));

    // Empty component arrays are left out by default.
    let lamp = &json["objects"][1];
    assert!(lamp.get("colliders").is_none());
    assert_eq!(lamp["light"][0]["color"]["g"].as_f64().unwrap() as f32, 0.9);

    let keys: Vec<&str> = body.as_object().unwrap().keys().map(|k| k.as_str()).collect();
    assert_eq!(&keys[..4], &["name", "instanceId", "id", "scenePath"]);
}

#[test]
fn test_compact_and_pretty_output_agree() {
    let (_, pretty, _) = export_workshop(ExportSettings::new());
    let (_, compact, _) = export_workshop(ExportSettings::new().indent(false));

    assert!(!compact.contains('\n'));
    assert!(pretty.contains("\n\t\"objects\": [\n\t\t{"));
    assert_eq!(parse_document(&pretty), parse_document(&compact));
}

#[test]
fn test_keeping_empty_component_arrays() {
    let (_, text, _) = export_workshop(ExportSettings::new().skip_empty_components(false));
    let json = parse_document(&text);

    let lamp = &json["objects"][1];
    assert_eq!(lamp["colliders"], serde_json::json!([]));
    assert_eq!(lamp["joints"], serde_json::json!([]));
}

#[test]
fn test_cancelled_export_produces_nothing() {
    let scene = load_workshop();
    let mut session = ExportSession::new(&scene, ResourceMapper::new());

    let mut calls = 0;
    let result = session.export_scene(&scene.scene_info(), &mut |current: usize, _total: usize| {
        calls += 1;
        current < 4
    });

    match result {
        Err(SnapshotError::Cancelled { processed, total }) => {
            assert_eq!(processed, 4);
            assert_eq!(total, 7);
        }
        other => panic!("expected cancellation, got {:?}", other.map(|d| d.objects.len())),
    }
    assert_eq!(calls, 5);
}

/// Wraps a scene so nodes can be killed while an export is running.
struct MutatingScene {
    scene: MemoryScene,
    killed: RefCell<HashSet<MemoryHandle>>,
}

impl SceneHost for MutatingScene {
    type Handle = MemoryHandle;

    fn is_alive(&self, node: MemoryHandle) -> bool {
        !self.killed.borrow().contains(&node) && self.scene.is_alive(node)
    }

    fn name(&self, node: MemoryHandle) -> String {
        self.scene.name(node)
    }

    fn parent(&self, node: MemoryHandle) -> Option<MemoryHandle> {
        self.scene.parent(node)
    }

    fn children(&self, node: MemoryHandle) -> Vec<MemoryHandle> {
        self.scene.children(node)
    }

    fn instance_id(&self, node: MemoryHandle) -> i32 {
        self.scene.instance_id(node)
    }

    fn local_transform(&self, node: MemoryHandle) -> LocalTransform {
        self.scene.local_transform(node)
    }

    fn world_matrix(&self, node: MemoryHandle) -> Mat4 {
        self.scene.world_matrix(node)
    }

    fn active_self(&self, node: MemoryHandle) -> bool {
        self.scene.active_self(node)
    }

    fn active_in_hierarchy(&self, node: MemoryHandle) -> bool {
        self.scene.active_in_hierarchy(node)
    }

    fn is_static(&self, node: MemoryHandle) -> bool {
        self.scene.is_static(node)
    }

    fn static_flags(&self, node: MemoryHandle) -> StaticEditorFlags {
        self.scene.static_flags(node)
    }

    fn mesh(&self, node: MemoryHandle) -> Option<AssetKey> {
        self.scene.mesh(node)
    }

    fn prefab_link(&self, node: MemoryHandle) -> Option<PrefabLink> {
        self.scene.prefab_link(node)
    }

    fn components(&self, node: MemoryHandle) -> Vec<Option<Component<MemoryHandle>>> {
        self.scene.components(node)
    }
}

#[test]
fn test_node_destroyed_after_discovery_is_skipped() {
    ensure_env_logger_initialized();

    let mut scene = MemoryScene::new("mutating");
    let root = scene.add_root("root");
    scene.add_child(root, "X");
    let doomed = scene.add_child(root, "X");
    scene.add_child(root, "X");

    let host = MutatingScene {
        scene,
        killed: RefCell::new(HashSet::new()),
    };
    let mut session = ExportSession::new(&host, ResourceMapper::new());
    let mut kill_once = |current: usize, _total: usize| {
        if current == 0 {
            host.killed.borrow_mut().insert(doomed);
        }
        true
    };
    let doc = session.export_object(root, &mut kill_once).unwrap();

    // Ids were handed out before the node died; the gap stays.
    let ids: Vec<ResId> = doc.objects.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![ResId::new(0), ResId::new(1), ResId::new(3)]);
    assert!(doc.find_object(ResId::new(2)).is_none());

    let last = doc.find_object(ResId::new(3)).unwrap();
    assert!(last.name_clash);
    assert_eq!(last.unique_name, "X-#1");

    assert_eq!(doc.objects[0].children, vec![ResId::new(1), ResId::new(3)]);
    assert!(
        session
            .log()
            .messages()
            .iter()
            .any(|m| m.contains("Skipped object 2"))
    );
}

#[test]
fn test_export_of_subtree_leaves_outside_parent_unresolved() {
    let scene = load_workshop();
    let robot = scene.roots()[0];
    let arm = scene.children(robot)[3];

    let mut session = ExportSession::new(&scene, ResourceMapper::new());
    let doc = session.export_object(arm, &mut NoProgress).unwrap();

    assert_eq!(doc.objects.len(), 1);
    assert_eq!(doc.build_index, -1);
    let arm_obj = &doc.objects[0];
    assert_eq!(arm_obj.parent, ResId::INVALID);
    assert_eq!(arm_obj.parent_name, "Robot");
    // The joint's body was never discovered.
    assert_eq!(arm_obj.joints[0].connected_body, ResId::INVALID);
    assert_eq!(arm_obj.joints[0].connected_body_name, "Body");
}

#[test]
fn test_save_to_file_creates_parents() {
    let (doc, text, _) = export_workshop(ExportSettings::new());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("out").join("Workshop.json");

    let scene = MemoryScene::new("unused");
    let mut session = ExportSession::new(&scene, ResourceMapper::new());
    session.save_to_file(&doc, &path).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
    assert_eq!(session.log().messages().len(), 1);
}

#[test]
fn test_identical_empty_nodes_stay_distinct() {
    let mut scene = MemoryScene::new("twins");
    let a = scene.add_root("Empty");
    let b = scene.add_root("Empty");
    scene.set_mesh(a, Some(AssetKey(1)));
    scene.set_mesh(b, Some(AssetKey(1)));

    let mut session = ExportSession::new(&scene, ResourceMapper::new());
    let doc = session.export_objects(&[a, b], &mut NoProgress).unwrap();

    assert_eq!(doc.objects.len(), 2);
    assert_ne!(doc.objects[0].id, doc.objects[1].id);
    assert_eq!(doc.objects[0].mesh, doc.objects[1].mesh);
    // Roots share the invalid parent, so they clash as siblings too.
    assert_eq!(doc.objects[1].unique_name, "Empty-#1");
}

fn assert_sibling_names_unique(doc: &scene_snapshot::JsonScene) {
    let mut seen = HashSet::new();
    for obj in &doc.objects {
        assert!(
            seen.insert((obj.parent, obj.effective_name().to_owned())),
            "duplicate sibling name `{}` under parent {}",
            obj.effective_name(),
            obj.parent
        );
    }
}

#[test]
fn test_effective_names_are_unique_among_siblings() {
    ensure_env_logger_initialized();

    let (doc, _, _) = export_workshop(ExportSettings::new());
    assert_sibling_names_unique(&doc);
    let legs: Vec<&str> = doc
        .objects
        .iter()
        .filter(|o| o.name == "Leg")
        .map(|o| o.effective_name())
        .collect();
    assert_eq!(legs, vec!["Leg", "Leg-#1"]);

    // A sibling already carrying the first alias pushes the clash onto a token alias.
    let mut scene = MemoryScene::new("aliases");
    let root = scene.add_root("root");
    for name in ["X", "X-#1", "X", "X"] {
        scene.add_child(root, name);
    }
    let mut session = ExportSession::new(&scene, ResourceMapper::new());
    let doc = session.export_object(root, &mut NoProgress).unwrap();

    assert_sibling_names_unique(&doc);
    let renamed = doc.objects.iter().filter(|o| o.name_clash).count();
    assert_eq!(renamed, 2);
    assert!(doc.objects[3].effective_name().starts_with("X-#1("));
    assert_eq!(doc.objects[4].effective_name(), "X-#2");
}
