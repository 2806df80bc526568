use serde::{Deserialize, Serialize};

/// Indexed triangle geometry, shared between drawables by handle.
///
/// The scene graph never looks inside a mesh. It only reads the name for
/// export and stores the handle it gets back on import.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    #[serde(skip)]
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub normals: Vec<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_geometry(mut self, positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        self.positions = positions;
        self.indices = indices;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Fill `normals` with averaged face normals when the source had none.
    pub fn compute_normals(&mut self) {
        let mut normals = vec![[0.0f32; 3]; self.positions.len()];

        for triangle in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
            if i0 >= normals.len() || i1 >= normals.len() || i2 >= normals.len() {
                log::warn!(
                    "Mesh {} has a triangle referencing a vertex out of bounds, skipping it.",
                    self.name
                );
                continue;
            }
            let (v0, v1, v2) = (self.positions[i0], self.positions[i1], self.positions[i2]);
            let edge1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
            let edge2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
            let face_normal = [
                edge1[1] * edge2[2] - edge1[2] * edge2[1],
                edge1[2] * edge2[0] - edge1[0] * edge2[2],
                edge1[0] * edge2[1] - edge1[1] * edge2[0],
            ];
            for idx in [i0, i1, i2] {
                for axis in 0..3 {
                    normals[idx][axis] += face_normal[axis];
                }
            }
        }

        for normal in normals.iter_mut() {
            let length = (normal[0].powi(2) + normal[1].powi(2) + normal[2].powi(2)).sqrt();
            if length > 0.0 {
                normal.iter_mut().for_each(|c| *c /= length);
            }
        }
        self.normals = normals;
    }
}
