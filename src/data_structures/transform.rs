//! Parent-relative node transforms.
//!
//! A [`Transform`] is position, rotation and scale. The world transform of a
//! node is `parent_world * local`, composed with the `Mul` impls below.

use std::ops::Mul;

use cgmath::{Matrix4, SquareMatrix, Vector3};
use serde::{Deserialize, Serialize};

use crate::math::Quaternion;

/// Position, rotation (as quaternion) and scale of a scene node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Quaternion,
    pub scale: Vector3<f32>,
}

impl Transform {
    /// Identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::IDENTITY,
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * self.rotation.to_matrix4()
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn to_raw(&self) -> TransformRaw {
        let model = self.to_matrix();
        TransformRaw {
            model: model.into(),
            normal: self.rotation.to_matrix3().into(),
            handedness: model.determinant().signum(),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, 'b> Mul<&'b Transform> for &'a Transform {
    type Output = Transform;

    fn mul(self, rhs: &'b Transform) -> Self::Output {
        let scaled_rhs_pos = Vector3::new(
            self.scale.x * rhs.position.x,
            self.scale.y * rhs.position.y,
            self.scale.z * rhs.position.z,
        );

        Transform {
            position: self.position + self.rotation * scaled_rhs_pos,
            rotation: &self.rotation * &rhs.rotation,
            scale: Vector3::new(
                self.scale.x * rhs.scale.x,
                self.scale.y * rhs.scale.y,
                self.scale.z * rhs.scale.z,
            ),
        }
    }
}

impl Mul<Transform> for Transform {
    type Output = Self;

    fn mul(self, rhs: Transform) -> Self::Output {
        &self * &rhs
    }
}

impl From<Vector3<f32>> for Transform {
    fn from(position: Vector3<f32>) -> Self {
        Transform {
            position,
            ..Default::default()
        }
    }
}

/**
 * Plain-old-data copy of a transform in column-major layout, ready to be
 * handed to a renderer as bytes via `bytemuck::bytes_of`.
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformRaw {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 3]; 3],
    pub handedness: f32,
}

/// Serialized form of a [`Transform`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformData {
    pub position: [f32; 3],
    pub rotation: Quaternion,
    pub scale: [f32; 3],
}

impl From<&Transform> for TransformData {
    fn from(transform: &Transform) -> Self {
        Self {
            position: transform.position.into(),
            rotation: transform.rotation,
            scale: transform.scale.into(),
        }
    }
}

impl From<TransformData> for Transform {
    fn from(data: TransformData) -> Self {
        Self {
            position: data.position.into(),
            rotation: data.rotation,
            scale: data.scale.into(),
        }
    }
}
