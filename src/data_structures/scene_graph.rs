//! Scene graph and hierarchical scene organization.
//!
//! Provides the traits and the base node for building a scene graph: a
//! hierarchical representation of the objects in a scene. Every node can
//! export itself into a [`NodeRecord`](crate::record::NodeRecord) and restore
//! itself from one; nodes that can be drawn additionally expose the
//! [`Renderable`] capability.

use log::debug;

use crate::{
    camera::Camera,
    data_structures::transform::Transform,
    error::{ExportError, ImportError},
    export::Exporter,
    import::Importer,
    record::SceneNodeData,
    resources::{MaterialHandle, MeshHandle},
};

pub trait SceneNode {
    /// Tag the import registry uses to construct this node again.
    fn kind(&self) -> &'static str;

    fn name(&self) -> &str;

    fn set_name(&mut self, name: &str);

    fn get_local_transform(&self) -> &Transform;

    fn set_local_transform(&mut self, transform: Transform);

    fn get_world_transform(&self) -> &Transform;

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    /// Appends `child`, so its index is the previous child count.
    fn add_child(&mut self, child: Box<dyn SceneNode>);

    /**
     * Recomputes this node's world transform as `parents_world_transform * local`
     * and passes the result down to every child.
     */
    fn update_world_transforms(&mut self, parents_world_transform: &Transform);

    fn update_world_transform_all(&mut self) {
        self.update_world_transforms(&Transform::default());
    }

    /// Called once per frame before draw submission.
    fn on_before_render(&mut self, _camera: &Camera) {}

    /// This node's own record. Children are walked by the exporter.
    fn get_export_data(
        &self,
        exporter: &mut dyn Exporter,
    ) -> Result<serde_json::Value, ExportError>;

    /// Restores this node from the record [`SceneNode::get_export_data`] produced.
    fn set_import_data(
        &mut self,
        importer: &mut dyn Importer,
        data: &serde_json::Value,
    ) -> Result<(), ImportError>;

    fn as_renderable(&self) -> Option<&dyn Renderable> {
        None
    }

    fn as_renderable_mut(&mut self) -> Option<&mut dyn Renderable> {
        None
    }
}

/// Nodes that reference geometry and a material in the resource table.
pub trait Renderable {
    fn mesh(&self) -> Option<MeshHandle>;

    fn set_mesh(&mut self, mesh: Option<MeshHandle>);

    fn material(&self) -> MaterialHandle;

    fn set_material(&mut self, material: MaterialHandle);
}

/// Plain node without anything to draw. Groups children under one transform.
pub struct ContainerNode {
    pub name: String,
    pub children: Vec<Box<dyn SceneNode>>,
    local: Transform,
    world: Transform,
}

impl ContainerNode {
    pub const KIND: &'static str = "SceneNode";

    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            children: vec![],
            local: Transform::default(),
            world: Transform::default(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.local = transform;
        self
    }

    pub fn export_data(&self) -> SceneNodeData {
        SceneNodeData {
            name: self.name.clone(),
            transform: (&self.local).into(),
        }
    }

    pub fn import_data(&mut self, data: SceneNodeData) {
        self.name = data.name;
        self.local = data.transform.into();
        self.world = self.local;
    }
}

impl Default for ContainerNode {
    fn default() -> Self {
        Self::new("")
    }
}

impl SceneNode for ContainerNode {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn get_local_transform(&self) -> &Transform {
        &self.local
    }

    fn set_local_transform(&mut self, transform: Transform) {
        self.local = transform;
    }

    fn get_world_transform(&self) -> &Transform {
        &self.world
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn update_world_transforms(&mut self, parents_world_transform: &Transform) {
        self.world = parents_world_transform * &self.local;
        let world = self.world;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&world);
        }
    }

    fn get_export_data(
        &self,
        _exporter: &mut dyn Exporter,
    ) -> Result<serde_json::Value, ExportError> {
        Ok(serde_json::to_value(self.export_data())?)
    }

    fn set_import_data(
        &mut self,
        _importer: &mut dyn Importer,
        data: &serde_json::Value,
    ) -> Result<(), ImportError> {
        let data: SceneNodeData = serde_json::from_value(data.clone())?;
        self.import_data(data);
        Ok(())
    }
}

/// Follows `path` (child indices from `root`) down the tree.
pub fn node_at_path<'a>(root: &'a dyn SceneNode, path: &[usize]) -> Option<&'a dyn SceneNode> {
    let mut node = root;
    for &idx in path {
        node = node.get_children().get(idx)?.as_ref();
    }
    Some(node)
}

pub fn node_at_path_mut<'a>(
    root: &'a mut (dyn SceneNode + 'static),
    path: &[usize],
) -> Option<&'a mut (dyn SceneNode + 'static)> {
    let mut node = root;
    for &idx in path {
        node = node.get_children_mut().get_mut(idx)?.as_mut();
    }
    Some(node)
}

/**
 * Gives every node its `on_before_render` call for this frame, depth first,
 * and returns the paths of the renderables that have a mesh to draw, in the
 * order they should be submitted.
 */
pub fn render_order(root: &mut dyn SceneNode, camera: &Camera) -> Vec<Vec<usize>> {
    let mut order = Vec::new();
    let mut path = Vec::new();
    visit_before_render(root, camera, &mut path, &mut order);
    debug!("{} renderable(s) staged for this frame", order.len());
    order
}

fn visit_before_render(
    node: &mut dyn SceneNode,
    camera: &Camera,
    path: &mut Vec<usize>,
    order: &mut Vec<Vec<usize>>,
) {
    node.on_before_render(camera);
    if node
        .as_renderable()
        .is_some_and(|renderable| renderable.mesh().is_some())
    {
        order.push(path.clone());
    }
    for (idx, child) in node.get_children_mut().iter_mut().enumerate() {
        path.push(idx);
        visit_before_render(child.as_mut(), camera, path, order);
        path.pop();
    }
}
