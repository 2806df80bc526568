//! Scene data structures: transforms, the scene graph and drawable nodes.
//!
//! - `transform` holds parent-relative position, rotation and scale
//! - `scene_graph` enables hierarchical scene organization
//! - `drawable` is the node that references a mesh and a material

pub mod drawable;
pub mod scene_graph;
pub mod transform;
