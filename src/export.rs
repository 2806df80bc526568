//! Export side of the scene serialization protocol.
//!
//! Nodes describe themselves through [`SceneNode::get_export_data`] and hand
//! every resource they reference to [`Exporter::also_save`]. The exporter owns
//! the identity-to-name map: a resource registered twice gets the same name
//! back and is written to the document once.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use crate::{
    data_structures::scene_graph::SceneNode,
    error::ExportError,
    record::{NodeRecord, ResourceRecord, SceneDocument},
    resources::{ResourceKind, ResourceRef, Resources},
};

/// Type tag written for meshes. There is only one mesh type.
pub const MESH_TYPE: &str = "Mesh";

pub trait Exporter {
    /// Registers `resource` for the document and returns the name nodes should
    /// store for it. Idempotent per resource.
    fn also_save(&mut self, resource: ResourceRef) -> Result<String, ExportError>;

    /// Exports `node` and, recursively, its children.
    fn save_node(&mut self, node: &dyn SceneNode) -> Result<NodeRecord, ExportError>;
}

pub struct SceneExporter<'a> {
    resources: &'a Resources,
    names: HashMap<ResourceRef, String>,
    taken: HashSet<String>,
    records: Vec<ResourceRecord>,
}

impl<'a> SceneExporter<'a> {
    pub fn new(resources: &'a Resources) -> Self {
        Self {
            resources,
            names: HashMap::new(),
            taken: HashSet::new(),
            records: Vec::new(),
        }
    }

    /// Runs a whole export session rooted at `root`.
    pub fn export(mut self, root: &dyn SceneNode) -> Result<SceneDocument, ExportError> {
        let root = self.save_node(root)?;
        debug!(
            "Exported scene with {} distinct resource(s)",
            self.records.len()
        );
        Ok(SceneDocument {
            root,
            resources: self.records,
        })
    }

    /// Name already assigned to `resource` in this session.
    pub fn name_of(&self, resource: ResourceRef) -> Option<&str> {
        self.names.get(&resource).map(String::as_str)
    }

    pub fn saved_count(&self) -> usize {
        self.records.len()
    }

    fn ensure_unique_name(&self, desired_name: &str, kind: ResourceKind) -> String {
        let desired_name = if desired_name.is_empty() {
            kind.to_string()
        } else {
            desired_name.to_string()
        };
        let mut counter = 0;
        let mut test_name = desired_name.clone();

        while self.taken.contains(&test_name) {
            counter += 1;
            test_name = format!("{} ({})", desired_name, counter);
        }

        if counter > 0 {
            warn!(
                "Two distinct resources are named {}, exporting the second as {}",
                desired_name, test_name
            );
        }
        test_name
    }

    fn record_for(&self, resource: ResourceRef) -> Result<(String, ResourceRecord), ExportError> {
        let (desired_name, type_name, data) = match resource {
            ResourceRef::Mesh(handle) => {
                let mesh = self
                    .resources
                    .mesh(handle)
                    .ok_or(ExportError::UnknownMesh(handle))?;
                (
                    mesh.name.as_str(),
                    MESH_TYPE.to_string(),
                    serde_json::to_value(mesh)?,
                )
            }
            ResourceRef::Material(handle) => {
                let material = self
                    .resources
                    .material(handle)
                    .ok_or(ExportError::UnknownMaterial(handle))?;
                (
                    material.name(),
                    material.kind().to_string(),
                    material.export_data()?,
                )
            }
        };
        let name = self.ensure_unique_name(desired_name, resource.kind());
        let record = ResourceRecord {
            name: name.clone(),
            kind: resource.kind(),
            type_name,
            data,
        };
        Ok((name, record))
    }
}

impl Exporter for SceneExporter<'_> {
    fn also_save(&mut self, resource: ResourceRef) -> Result<String, ExportError> {
        if let Some(name) = self.names.get(&resource) {
            debug!("{} {} already saved, reusing its name", resource.kind(), name);
            return Ok(name.clone());
        }

        let (name, record) = self.record_for(resource)?;
        debug!("Saving {} {}", resource.kind(), name);
        self.taken.insert(name.clone());
        self.names.insert(resource, name.clone());
        self.records.push(record);
        Ok(name)
    }

    fn save_node(&mut self, node: &dyn SceneNode) -> Result<NodeRecord, ExportError> {
        let data = node.get_export_data(self)?;
        let children = node
            .get_children()
            .iter()
            .map(|child| self.save_node(child.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(NodeRecord {
            kind: node.kind().to_string(),
            data,
            children,
        })
    }
}
