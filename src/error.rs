use thiserror::Error;

use crate::resources::{MaterialHandle, MeshHandle, ResourceKind};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Mesh handle {0:?} does not belong to the exported resource table")]
    UnknownMesh(MeshHandle),

    #[error("Material handle {0:?} does not belong to the exported resource table")]
    UnknownMaterial(MaterialHandle),

    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A named reference that no resource record in the document provides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingReference {
    pub name: String,
    pub kind: ResourceKind,
    /// Child indices from the root down to the node that asked for it.
    pub node: Vec<usize>,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("No {kind} named \"{name}\" was exported")]
    MissingReference { name: String, kind: ResourceKind },

    #[error("\"{name}\" was requested as {expected} but was exported as {found}")]
    KindMismatch {
        name: String,
        expected: ResourceKind,
        found: ResourceKind,
    },

    #[error("No node constructor registered for kind \"{0}\"")]
    UnknownNodeKind(String),

    #[error("No material constructor registered for type \"{0}\"")]
    UnknownMaterialKind(String),

    #[error("Failed to decode record: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Import session left {} reference(s) unresolved: {}", .0.len(), missing_names(.0))]
    Unresolved(Vec<MissingReference>),

    #[error("A load callback targets node {0:?}, which is not part of the imported tree")]
    DanglingNode(Vec<usize>),
}

fn missing_names(missing: &[MissingReference]) -> String {
    missing
        .iter()
        .map(|reference| format!("{} \"{}\"", reference.kind, reference.name))
        .collect::<Vec<_>>()
        .join(", ")
}
