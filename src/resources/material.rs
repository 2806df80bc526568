use std::fmt::Debug;

use serde::{Deserialize, Serialize};

/// Capability set every material has to provide.
///
/// Drawables only ever reference materials through a
/// [`MaterialHandle`](super::MaterialHandle) into the resource table, so a
/// value that does not implement this trait can never end up as a material.
pub trait Material: Debug {
    fn name(&self) -> &str;

    fn set_name(&mut self, name: String);

    /// Type tag written to exported documents and looked up in the import registry.
    fn kind(&self) -> &'static str;

    /// Serializable body of this material. The name is stored separately.
    fn export_data(&self) -> Result<serde_json::Value, serde_json::Error>;
}

/// Unlit single-color material, which is what every drawable starts out with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BasicMaterial {
    #[serde(skip)]
    pub name: String,
    pub color: [f32; 4],
}

impl BasicMaterial {
    pub const KIND: &'static str = "BasicMaterial";
    pub const DEFAULT_NAME: &'static str = "basic";

    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }

    /// Builder pattern: set the RGB color, keeping alpha.
    pub fn with_color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.color = [r, g, b, self.color[3]];
        self
    }

    /// Builder pattern: set alpha transparency
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.color[3] = alpha.clamp(0.0, 1.0);
        self
    }

    pub fn from_export_data(
        name: &str,
        data: &serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        let mut material: BasicMaterial = serde_json::from_value(data.clone())?;
        material.name = name.to_string();
        Ok(material)
    }
}

impl Default for BasicMaterial {
    fn default() -> Self {
        Self::new(Self::DEFAULT_NAME)
    }
}

impl Material for BasicMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn export_data(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
