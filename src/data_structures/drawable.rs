use crate::{
    camera::Camera,
    data_structures::{
        scene_graph::{ContainerNode, Renderable, SceneNode},
        transform::Transform,
    },
    error::{ExportError, ImportError},
    export::Exporter,
    import::{Importer, OnLoad},
    record::DrawableData,
    resources::{MaterialHandle, MeshHandle, ResourceKind, ResourceRef},
};

/// A scene node that draws a mesh with a material.
///
/// Both are handles into the shared [`Resources`](crate::resources::Resources)
/// table, so many drawables can reference the same mesh or material. A new
/// drawable has no mesh and uses the table's default [`BasicMaterial`](crate::resources::BasicMaterial).
pub struct Drawable {
    pub node: ContainerNode,
    mesh: Option<MeshHandle>,
    material: MaterialHandle,
}

impl Drawable {
    pub const KIND: &'static str = "Drawable";

    pub fn new(name: &str) -> Self {
        Self {
            node: ContainerNode::new(name),
            mesh: None,
            material: MaterialHandle::DEFAULT,
        }
    }

    pub fn with_mesh(mut self, mesh: MeshHandle) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.node.set_local_transform(transform);
        self
    }

    pub fn mesh(&self) -> Option<MeshHandle> {
        self.mesh
    }

    pub fn material(&self) -> MaterialHandle {
        self.material
    }

    pub fn set_mesh(&mut self, mesh: Option<MeshHandle>) -> &mut Self {
        self.mesh = mesh;
        self
    }

    /// Replaces the material. The old one stays in the resource table.
    pub fn set_material(&mut self, material: MaterialHandle) -> &mut Self {
        self.material = material;
        self
    }
}

impl Default for Drawable {
    fn default() -> Self {
        Self::new("")
    }
}

impl Renderable for Drawable {
    fn mesh(&self) -> Option<MeshHandle> {
        self.mesh
    }

    fn set_mesh(&mut self, mesh: Option<MeshHandle>) {
        self.mesh = mesh;
    }

    fn material(&self) -> MaterialHandle {
        self.material
    }

    fn set_material(&mut self, material: MaterialHandle) {
        self.material = material;
    }
}

impl SceneNode for Drawable {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn name(&self) -> &str {
        self.node.name()
    }

    fn set_name(&mut self, name: &str) {
        self.node.set_name(name);
    }

    fn get_local_transform(&self) -> &Transform {
        self.node.get_local_transform()
    }

    fn set_local_transform(&mut self, transform: Transform) {
        self.node.set_local_transform(transform);
    }

    fn get_world_transform(&self) -> &Transform {
        self.node.get_world_transform()
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        self.node.get_children()
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        self.node.get_children_mut()
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.node.add_child(child);
    }

    fn update_world_transforms(&mut self, parents_world_transform: &Transform) {
        self.node.update_world_transforms(parents_world_transform);
    }

    fn on_before_render(&mut self, camera: &Camera) {
        self.node.on_before_render(camera);
    }

    fn get_export_data(
        &self,
        exporter: &mut dyn Exporter,
    ) -> Result<serde_json::Value, ExportError> {
        let parent = self.node.get_export_data(exporter)?;
        // every reference is registered, the exporter collapses duplicates
        let mesh = match self.mesh {
            Some(mesh) => Some(exporter.also_save(mesh.into())?),
            None => None,
        };
        let material = exporter.also_save(self.material.into())?;
        let data = DrawableData {
            parent,
            mesh,
            material,
        };
        Ok(serde_json::to_value(data)?)
    }

    fn set_import_data(
        &mut self,
        importer: &mut dyn Importer,
        data: &serde_json::Value,
    ) -> Result<(), ImportError> {
        let data: DrawableData = serde_json::from_value(data.clone())?;
        self.node.set_import_data(importer, &data.parent)?;

        self.mesh = None;
        if let Some(mesh) = data.mesh {
            importer.load(&mesh, ResourceKind::Mesh, assign_resource());
        }
        importer.load(&data.material, ResourceKind::Material, assign_resource());
        Ok(())
    }

    fn as_renderable(&self) -> Option<&dyn Renderable> {
        Some(self)
    }

    fn as_renderable_mut(&mut self) -> Option<&mut dyn Renderable> {
        Some(self)
    }
}

fn assign_resource() -> OnLoad {
    Box::new(|node: &mut dyn SceneNode, resource: ResourceRef| {
        let Some(renderable) = node.as_renderable_mut() else {
            log::warn!(
                "Node {} received a {} but cannot render, ignoring it.",
                node.name(),
                resource.kind()
            );
            return;
        };
        match resource {
            ResourceRef::Mesh(mesh) => renderable.set_mesh(Some(mesh)),
            ResourceRef::Material(material) => renderable.set_material(material),
        }
    })
}
