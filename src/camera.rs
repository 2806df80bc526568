//! Minimal camera handed to [`SceneNode::on_before_render`](crate::data_structures::scene_graph::SceneNode::on_before_render).

use cgmath::{Matrix4, Vector3};

use crate::math::Quaternion;

/// Looks down its local -z axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vector3<f32>,
    pub orientation: Quaternion,
}

impl Camera {
    pub fn new(position: Vector3<f32>, orientation: Quaternion) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.orientation * Vector3::new(0.0, 0.0, -1.0)
    }

    /// World-to-camera matrix: inverse rotation after inverse translation.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        let mut inverse = self.orientation;
        inverse.inverse();
        inverse.to_matrix4() * Matrix4::from_translation(-self.position)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vector3::new(0.0, 0.0, 0.0), Quaternion::IDENTITY)
    }
}
