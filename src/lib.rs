//! scene-ngin
//!
//! The orientation and scene-graph core of a small real-time 3D engine. This
//! crate exposes a quaternion rotation algebra and a scene graph whose nodes
//! can be exported to and imported from a serializable document. Meshes and
//! materials live in a shared resource table, so a resource referenced by
//! many nodes is written once and resolved once.
//!
//! High-level modules
//! - `camera`: minimal camera handed to nodes before they are drawn
//! - `context`: owns the resource table, import registry and configuration
//! - `data_structures`: transforms, the scene graph and drawable nodes
//! - `error`: export and import error types
//! - `export`: exporter trait and the deduplicating scene exporter
//! - `import`: importer trait, type registry and the deferred scene importer
//! - `math`: the quaternion type
//! - `record`: serializable documents, node and resource records
//! - `resources`: meshes, materials and the table that owns them
//!

pub mod camera;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod export;
pub mod import;
pub mod math;
pub mod record;
pub mod resources;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use cgmath::{Matrix3, Matrix4, Vector3};
pub use context::{Context, ExportConfig, ImportConfig, UnresolvedPolicy};
pub use data_structures::{
    drawable::Drawable,
    scene_graph::{ContainerNode, Renderable, SceneNode},
    transform::Transform,
};
pub use error::{ExportError, ImportError};
pub use math::Quaternion;
pub use resources::{MaterialHandle, MeshHandle, Resources};
