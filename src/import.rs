//! Import side of the scene serialization protocol.
//!
//! Nodes are rebuilt top down from a [`SceneDocument`]. A node that
//! references a resource asks for it by name with [`Importer::load`] and
//! passes a callback that stores the resolved handle. Requests are only
//! queued while the tree is built; [`SceneImporter::finish`] is the barrier
//! that constructs each referenced resource once and fires every queued
//! callback. The session is complete when the barrier returns.

use std::collections::HashMap;

use log::{debug, warn};

use crate::{
    context::UnresolvedPolicy,
    data_structures::{
        drawable::Drawable,
        scene_graph::{ContainerNode, SceneNode, node_at_path, node_at_path_mut},
    },
    error::{ImportError, MissingReference},
    record::{NodeRecord, SceneDocument},
    resources::{BasicMaterial, Material, Mesh, ResourceKind, ResourceRef, Resources},
};

/// Completion callback for [`Importer::load`], called with the node that
/// asked and the resolved resource.
pub type OnLoad = Box<dyn FnOnce(&mut dyn SceneNode, ResourceRef)>;

pub type NodeConstructor = fn() -> Box<dyn SceneNode>;

pub type MaterialConstructor =
    fn(&str, &serde_json::Value) -> Result<Box<dyn Material>, ImportError>;

pub trait Importer {
    /// Queues a request for the resource exported as `name`. The same name may
    /// be requested any number of times and always resolves to one resource.
    fn load(&mut self, name: &str, kind: ResourceKind, on_load: OnLoad);

    /// Constructs the node described by `record`, imports it and its children.
    fn load_node(&mut self, record: &NodeRecord) -> Result<Box<dyn SceneNode>, ImportError>;
}

/// Maps the type tags found in documents to constructors.
pub struct ImportRegistry {
    nodes: HashMap<String, NodeConstructor>,
    materials: HashMap<String, MaterialConstructor>,
}

impl ImportRegistry {
    /// A registry that knows no types at all.
    pub fn empty() -> Self {
        Self {
            nodes: HashMap::new(),
            materials: HashMap::new(),
        }
    }

    pub fn register_node(&mut self, kind: &str, constructor: NodeConstructor) -> &mut Self {
        self.nodes.insert(kind.to_string(), constructor);
        self
    }

    pub fn register_material(
        &mut self,
        kind: &str,
        constructor: MaterialConstructor,
    ) -> &mut Self {
        self.materials.insert(kind.to_string(), constructor);
        self
    }

    pub fn construct_node(&self, kind: &str) -> Result<Box<dyn SceneNode>, ImportError> {
        let constructor = self
            .nodes
            .get(kind)
            .ok_or_else(|| ImportError::UnknownNodeKind(kind.to_string()))?;
        Ok(constructor())
    }

    pub fn construct_material(
        &self,
        kind: &str,
        name: &str,
        data: &serde_json::Value,
    ) -> Result<Box<dyn Material>, ImportError> {
        let constructor = self
            .materials
            .get(kind)
            .ok_or_else(|| ImportError::UnknownMaterialKind(kind.to_string()))?;
        constructor(name, data)
    }
}

impl Default for ImportRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register_node(ContainerNode::KIND, container_node)
            .register_node(Drawable::KIND, drawable)
            .register_material(BasicMaterial::KIND, basic_material);
        registry
    }
}

fn container_node() -> Box<dyn SceneNode> {
    Box::new(ContainerNode::default())
}

fn drawable() -> Box<dyn SceneNode> {
    Box::new(Drawable::default())
}

fn basic_material(name: &str, data: &serde_json::Value) -> Result<Box<dyn Material>, ImportError> {
    let material = BasicMaterial::from_export_data(name, data)?;
    Ok(Box::new(material))
}

/// What an import session did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Load requests made by nodes.
    pub requested: usize,
    pub callbacks_fired: usize,
    /// Distinct resources constructed.
    pub resolved: usize,
    pub missing: Vec<MissingReference>,
}

impl ImportReport {
    /// Every request was answered.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.callbacks_fired == self.requested
    }
}

pub struct ImportedScene {
    pub root: Box<dyn SceneNode>,
    pub report: ImportReport,
}

enum Staged {
    Mesh(Mesh),
    Material(Box<dyn Material>),
}

impl Staged {
    fn kind(&self) -> ResourceKind {
        match self {
            Staged::Mesh(_) => ResourceKind::Mesh,
            Staged::Material(_) => ResourceKind::Material,
        }
    }
}

/// Resources built during [`SceneImporter::finish`] that are not in the table yet.
#[derive(Default)]
struct Staging {
    by_name: HashMap<String, usize>,
    resources: Vec<(String, Staged)>,
}

/// Where a request's resource will come from once the session commits.
#[derive(Clone, Copy)]
enum Slot {
    Committed(ResourceRef),
    Staged(usize),
}

struct PendingLoad {
    name: String,
    kind: ResourceKind,
    node: Vec<usize>,
    on_load: OnLoad,
}

pub struct SceneImporter<'a> {
    document: &'a SceneDocument,
    registry: &'a ImportRegistry,
    resources: &'a mut Resources,
    policy: UnresolvedPolicy,
    /// Child indices from the root to the node currently being imported.
    path: Vec<usize>,
    pending: Vec<PendingLoad>,
    resolved: HashMap<String, ResourceRef>,
}

impl<'a> SceneImporter<'a> {
    pub fn new(
        document: &'a SceneDocument,
        registry: &'a ImportRegistry,
        resources: &'a mut Resources,
        policy: UnresolvedPolicy,
    ) -> Self {
        Self {
            document,
            registry,
            resources,
            policy,
            path: vec![],
            pending: vec![],
            resolved: HashMap::new(),
        }
    }

    /// Runs a whole session: builds the tree, then resolves every request.
    pub fn import(mut self) -> Result<ImportedScene, ImportError> {
        let document = self.document;
        let mut root = self.load_node(&document.root)?;
        let report = self.finish(root.as_mut())?;
        root.update_world_transform_all();
        Ok(ImportedScene { root, report })
    }

    /// Requests queued and not yet answered.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /**
     * Completion barrier. Resolves every queued request against the document,
     * then runs the callbacks in request order on the nodes below `root` that
     * made them.
     *
     * References the document does not provide either fail the session
     * ([`UnresolvedPolicy::Fail`]) before any callback runs, or are listed in
     * the report while every other request is still answered
     * ([`UnresolvedPolicy::Skip`]).
     *
     * Resources are built into a staging area first and only moved into the
     * resource table once the session can no longer fail, so a failed session
     * leaves the table as it found it.
     */
    pub fn finish(
        &mut self,
        root: &mut (dyn SceneNode + 'static),
    ) -> Result<ImportReport, ImportError> {
        let pending = std::mem::take(&mut self.pending);
        let mut report = ImportReport {
            requested: pending.len(),
            ..Default::default()
        };

        let mut staging = Staging::default();
        let mut ready = Vec::with_capacity(pending.len());
        for load in pending {
            match self.stage(&load.name, load.kind, &mut staging) {
                Ok(slot) => ready.push((load, slot)),
                Err(ImportError::MissingReference { name, kind }) => {
                    report.missing.push(MissingReference {
                        name,
                        kind,
                        node: load.node,
                    })
                }
                Err(e) => return Err(e),
            }
        }

        if !report.missing.is_empty() {
            match self.policy {
                UnresolvedPolicy::Fail => return Err(ImportError::Unresolved(report.missing)),
                UnresolvedPolicy::Skip => {
                    for missing in report.missing.iter() {
                        warn!(
                            "No {} named {} in the document, node {:?} keeps its current value",
                            missing.kind, missing.name, missing.node
                        );
                    }
                }
            }
        }

        if let Some((load, _)) = ready
            .iter()
            .find(|(load, _)| node_at_path(&*root, &load.node).is_none())
        {
            return Err(ImportError::DanglingNode(load.node.clone()));
        }

        let committed = self.commit(staging);
        for (load, slot) in ready {
            let resource = match slot {
                Slot::Committed(resource) => resource,
                Slot::Staged(index) => committed[index],
            };
            let PendingLoad { node, on_load, .. } = load;
            let target =
                node_at_path_mut(root, &node).ok_or_else(|| ImportError::DanglingNode(node.clone()))?;
            on_load(target, resource);
            report.callbacks_fired += 1;
        }
        report.resolved = self.resolved.len();

        debug!(
            "Import finished: {} request(s), {} resource(s), {} missing",
            report.requested,
            report.resolved,
            report.missing.len()
        );
        Ok(report)
    }

    /// Finds or builds the resource exported as `name` without touching the
    /// resource table. A resource keeps the name it has in the document, so a
    /// mesh exported as `"cube (1)"` is imported under that name.
    fn stage(
        &self,
        name: &str,
        kind: ResourceKind,
        staging: &mut Staging,
    ) -> Result<Slot, ImportError> {
        if let Some(&resource) = self.resolved.get(name) {
            return Self::check_kind(name, kind, resource.kind()).map(|_| Slot::Committed(resource));
        }
        if let Some(&index) = staging.by_name.get(name) {
            let found = staging.resources[index].1.kind();
            return Self::check_kind(name, kind, found).map(|_| Slot::Staged(index));
        }

        let record = self
            .document
            .resource(name)
            .ok_or_else(|| ImportError::MissingReference {
                name: name.to_string(),
                kind,
            })?;
        Self::check_kind(name, kind, record.kind)?;

        let resource = match kind {
            ResourceKind::Mesh => {
                let mut mesh: Mesh = serde_json::from_value(record.data.clone())?;
                mesh.name = name.to_string();
                Staged::Mesh(mesh)
            }
            ResourceKind::Material => Staged::Material(self.registry.construct_material(
                &record.type_name,
                name,
                &record.data,
            )?),
        };
        debug!("Constructed {} {}", kind, name);
        let index = staging.resources.len();
        staging.by_name.insert(name.to_string(), index);
        staging.resources.push((name.to_string(), resource));
        Ok(Slot::Staged(index))
    }

    /// Moves staged resources into the table, returning their handles in staging order.
    fn commit(&mut self, staging: Staging) -> Vec<ResourceRef> {
        let mut committed = Vec::with_capacity(staging.resources.len());
        for (name, resource) in staging.resources {
            let resource = match resource {
                Staged::Mesh(mesh) => ResourceRef::from(self.resources.add_mesh(mesh)),
                Staged::Material(material) => {
                    ResourceRef::from(self.resources.add_boxed_material(material))
                }
            };
            self.resolved.insert(name, resource);
            committed.push(resource);
        }
        committed
    }

    fn check_kind(
        name: &str,
        expected: ResourceKind,
        found: ResourceKind,
    ) -> Result<(), ImportError> {
        if expected == found {
            Ok(())
        } else {
            Err(ImportError::KindMismatch {
                name: name.to_string(),
                expected,
                found,
            })
        }
    }
}

impl Importer for SceneImporter<'_> {
    fn load(&mut self, name: &str, kind: ResourceKind, on_load: OnLoad) {
        debug!("Node {:?} requests {} {}", self.path, kind, name);
        self.pending.push(PendingLoad {
            name: name.to_string(),
            kind,
            node: self.path.clone(),
            on_load,
        });
    }

    fn load_node(&mut self, record: &NodeRecord) -> Result<Box<dyn SceneNode>, ImportError> {
        let mut node = self.registry.construct_node(&record.kind)?;
        node.set_import_data(self, &record.data)?;

        for child_record in record.children.iter() {
            self.path.push(node.get_children().len());
            let child = self.load_node(child_record);
            self.path.pop();
            node.add_child(child?);
        }
        Ok(node)
    }
}
