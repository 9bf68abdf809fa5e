#![forbid(unsafe_code)]
#![deny(unused_must_use)]
//! Snapshots a live scene hierarchy into a self-contained JSON document.
//!
//! Every node and shared resource gets exactly one integer id per export, handed out before any
//! reference to it is written. Sibling name clashes are resolved with deterministic aliases, and
//! the document is emitted through a streaming writer.
//!
//! ```
//! use scene_snapshot::{ExportSession, MemoryScene, NoProgress, ResourceMapper};
//!
//! let mut scene = MemoryScene::new("Level");
//! let root = scene.add_root("root");
//! scene.add_child(root, "Leg");
//! scene.add_child(root, "Leg");
//!
//! let mut session = ExportSession::new(&scene, ResourceMapper::new());
//! let doc = session.export_scene(&scene.scene_info(), &mut NoProgress).unwrap();
//! assert_eq!(doc.objects[2].unique_name, "Leg-#1");
//! ```

pub use document::{JsonGameObject, JsonScene, JsonTransform};
pub use err::{Result, SnapshotError};
pub use export_settings::{ExportLog, ExportSettings, ExportType, default_file_name};
pub use exporter::{ExportProgress, ExportSession, NoProgress, SceneInfo};
pub use host::{MemoryHandle, MemoryScene, SceneHost};
pub use identity_table::{IdentityTable, StorageWatcher};
pub use json_value::JsonValue;
pub use json_writer::JsonWriter;
pub use res_id::ResId;
pub use resource_mapper::{ResourceMapper, ResourceRegistry};

pub mod document;
pub mod err;
pub mod export_settings;
pub mod exporter;
pub mod host;
pub mod identity_table;
pub mod json_value;
pub mod json_writer;
pub mod name_clash;
mod res_id;
pub mod resource_mapper;
pub mod walker;
