//! Shared resources and the table that owns them.
//!
//! Meshes and materials are owned by [`Resources`]. Scene nodes only hold
//! copyable handles into it, so any number of drawables can share one mesh or
//! material and the handle doubles as the resource's identity during export.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod material;
pub mod mesh;

pub use material::{BasicMaterial, Material};
pub use mesh::Mesh;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialHandle(pub(crate) usize);

impl MaterialHandle {
    /// The [`BasicMaterial`] every [`Resources`] table is created with.
    pub const DEFAULT: MaterialHandle = MaterialHandle(0);
}

/// Which table a resource lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Mesh,
    Material,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Mesh => f.write_str("mesh"),
            ResourceKind::Material => f.write_str("material"),
        }
    }
}

/// A handle to either kind of resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceRef {
    Mesh(MeshHandle),
    Material(MaterialHandle),
}

impl ResourceRef {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceRef::Mesh(_) => ResourceKind::Mesh,
            ResourceRef::Material(_) => ResourceKind::Material,
        }
    }
}

impl From<MeshHandle> for ResourceRef {
    fn from(handle: MeshHandle) -> Self {
        ResourceRef::Mesh(handle)
    }
}

impl From<MaterialHandle> for ResourceRef {
    fn from(handle: MaterialHandle) -> Self {
        ResourceRef::Material(handle)
    }
}

/// Owner of every mesh and material a scene references.
#[derive(Debug)]
pub struct Resources {
    meshes: Vec<Mesh>,
    materials: Vec<Box<dyn Material>>,
}

impl Resources {
    /// Creates an empty table holding only the default material.
    pub fn new() -> Self {
        Self {
            meshes: Vec::new(),
            materials: vec![Box::new(BasicMaterial::default())],
        }
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshHandle {
        self.meshes.push(mesh);
        MeshHandle(self.meshes.len() - 1)
    }

    pub fn add_material<M: Material + 'static>(&mut self, material: M) -> MaterialHandle {
        self.add_boxed_material(Box::new(material))
    }

    pub fn add_boxed_material(&mut self, material: Box<dyn Material>) -> MaterialHandle {
        self.materials.push(material);
        MaterialHandle(self.materials.len() - 1)
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(handle.0)
    }

    pub fn material(&self, handle: MaterialHandle) -> Option<&dyn Material> {
        self.materials.get(handle.0).map(|material| material.as_ref())
    }

    pub fn default_material(&self) -> &dyn Material {
        self.materials[MaterialHandle::DEFAULT.0].as_ref()
    }

    /// First mesh named `name`. Names are not unique, handles are.
    pub fn find_mesh(&self, name: &str) -> Option<MeshHandle> {
        self.meshes
            .iter()
            .position(|mesh| mesh.name == name)
            .map(MeshHandle)
    }

    /// First material named `name`. Names are not unique, handles are.
    pub fn find_material(&self, name: &str) -> Option<MaterialHandle> {
        self.materials
            .iter()
            .position(|material| material.name() == name)
            .map(MaterialHandle)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }
}

impl Default for Resources {
    fn default() -> Self {
        Self::new()
    }
}
