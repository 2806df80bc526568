use log::debug;

use crate::{
    data_structures::scene_graph::SceneNode,
    error::{ExportError, ImportError},
    export::SceneExporter,
    import::{ImportRegistry, ImportedScene, SceneImporter},
    record::SceneDocument,
    resources::Resources,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportConfig {
    /// Pretty-print JSON produced by [`Context::export_json`].
    pub pretty: bool,
}

/// What to do with references a document does not provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedPolicy {
    /// Fail the whole session.
    #[default]
    Fail,
    /// Leave the affected fields as they are and report them.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportConfig {
    pub unresolved: UnresolvedPolicy,
}

/// Owns the resource table and everything needed to move scenes in and out of it.
pub struct Context {
    pub resources: Resources,
    pub registry: ImportRegistry,
    pub export: ExportConfig,
    pub import: ImportConfig,
}

impl Context {
    pub fn new() -> Self {
        Self {
            resources: Resources::new(),
            registry: ImportRegistry::default(),
            export: ExportConfig::default(),
            import: ImportConfig::default(),
        }
    }

    /// Builder pattern: adjust any part of the context in place.
    pub fn configure<F: FnOnce(&mut Context)>(mut self, f: F) -> Self {
        f(&mut self);
        self
    }

    pub fn export_scene(&self, root: &dyn SceneNode) -> Result<SceneDocument, ExportError> {
        debug!("Exporting scene rooted at {}", root.name());
        SceneExporter::new(&self.resources).export(root)
    }

    pub fn export_json(&self, root: &dyn SceneNode) -> Result<String, ExportError> {
        let document = self.export_scene(root)?;
        Ok(document.to_json(self.export.pretty)?)
    }

    /// Imports `document` into this context's resource table.
    pub fn import_scene(&mut self, document: &SceneDocument) -> Result<ImportedScene, ImportError> {
        SceneImporter::new(
            document,
            &self.registry,
            &mut self.resources,
            self.import.unresolved,
        )
        .import()
    }

    pub fn import_json(&mut self, json: &str) -> Result<ImportedScene, ImportError> {
        let document = SceneDocument::from_json(json)?;
        self.import_scene(&document)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
