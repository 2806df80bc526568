//! Serializable records exchanged between nodes and the exporter/importer.
//!
//! A [`SceneDocument`] is a node tree plus a flat list of the resources it
//! references. Nodes refer to resources by name only, and every resource
//! appears in the list exactly once no matter how many nodes share it.
//! Node-specific payloads travel as `serde_json::Value` so each node type
//! owns its record layout.

use serde::{Deserialize, Serialize};

use crate::{data_structures::transform::TransformData, resources::ResourceKind};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    pub root: NodeRecord,
    #[serde(default)]
    pub resources: Vec<ResourceRecord>,
}

impl SceneDocument {
    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn resource(&self, name: &str) -> Option<&ResourceRecord> {
        self.resources.iter().find(|record| record.name == name)
    }
}

/// One node: its kind tag, its own export data and its children.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub kind: String,
    pub data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub name: String,
    pub kind: ResourceKind,
    /// Concrete type, e.g. `"BasicMaterial"`. Meshes only have one.
    #[serde(rename = "type")]
    pub type_name: String,
    pub data: serde_json::Value,
}

/// State every scene node exports: what the base node knows about itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneNodeData {
    pub name: String,
    pub transform: TransformData,
}

/// Export record of a [`Drawable`](crate::data_structures::drawable::Drawable).
///
/// `parent` is whatever the embedded base node exported, kept opaque so the
/// base record can grow without touching this one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrawableData {
    pub parent: serde_json::Value,
    pub mesh: Option<String>,
    pub material: String,
}
