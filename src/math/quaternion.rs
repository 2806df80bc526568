//! Orientation as a unit quaternion.
//!
//! Every mutating operation works in place on `self` and returns `&mut Self`
//! so calls can be chained:
//!
//! ```
//! use scene_ngin::{Quaternion, Vector3};
//!
//! let mut v = Vector3::new(1.0, 0.0, 0.0);
//! Quaternion::default()
//!     .set_axis_angle(Vector3::new(0.0, 0.0, 1.0), std::f32::consts::FRAC_PI_2)
//!     .multiply_vector3(&mut v);
//! assert!((v.y - 1.0).abs() < 1e-6);
//! ```
//!
//! Unit length is not enforced after each mutation. Callers that accumulate
//! many products should [`Quaternion::normalize`] before handing the value to
//! a renderer.

use std::{
    f32::consts::PI,
    fmt,
    ops::{Mul, MulAssign},
};

use cgmath::{InnerSpace, Matrix3, Matrix4, Vector3};
use serde::{Deserialize, Serialize};

/// Below this `1 - dot` two orientations are treated as the same and `slerp` is a no-op.
const SLERP_TOO_CLOSE: f32 = 0.001;
/// Above this `1 - dot` the trigonometric weights are used, below it plain linear weights.
const SLERP_LINEAR_LIMIT: f32 = 0.1;

/// Rotation stored as `(x, y, z, w)` where `w` is the scalar part.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn from_array(data: [f32; 4]) -> Self {
        bytemuck::cast(data)
    }

    /// The four components in storage order, e.g. for uploading to a uniform buffer.
    pub fn as_array(&self) -> &[f32; 4] {
        bytemuck::cast_ref(self)
    }

    /// Overwrite all components with those of `other`.
    pub fn set(&mut self, other: &Quaternion) -> &mut Self {
        *self = *other;
        self
    }

    /// Write all components into `dest` and return it.
    pub fn copy_to<'a>(&self, dest: &'a mut Quaternion) -> &'a mut Quaternion {
        *dest = *self;
        dest
    }

    /// Build from Euler angles in radians.
    ///
    /// The result equals `rot_y(yaw) * rot_x(pitch) * rot_z(roll)`, so roll is
    /// applied first and yaw last. Well-formed input yields a unit quaternion
    /// without normalizing.
    pub fn set_euler(&mut self, yaw: f32, pitch: f32, roll: f32) -> &mut Self {
        let (sin_yaw, cos_yaw) = (yaw * 0.5).sin_cos();
        let (sin_pitch, cos_pitch) = (pitch * 0.5).sin_cos();
        let (sin_roll, cos_roll) = (roll * 0.5).sin_cos();

        self.x = cos_roll * sin_pitch * cos_yaw + sin_roll * cos_pitch * sin_yaw;
        self.y = cos_roll * cos_pitch * sin_yaw - sin_roll * sin_pitch * cos_yaw;
        self.z = sin_roll * cos_pitch * cos_yaw - cos_roll * sin_pitch * sin_yaw;
        self.w = cos_roll * cos_pitch * cos_yaw + sin_roll * sin_pitch * sin_yaw;
        self
    }

    /// Rotation by `angle` radians around `axis`. The axis does not need to be normalized.
    pub fn set_axis_angle(&mut self, axis: Vector3<f32>, angle: f32) -> &mut Self {
        let (sin, cos) = (angle * 0.5).sin_cos();
        let axis = axis.normalize() * sin;
        self.x = axis.x;
        self.y = axis.y;
        self.z = axis.z;
        self.w = cos;
        self
    }

    /// Rotation angle in `[0, 2π]`.
    ///
    /// A zero vector part is the identity and reports 0. A scalar part pushed
    /// outside `[-1, 1]` by float drift saturates instead of producing NaN.
    pub fn angle(&self) -> f32 {
        if self.x == 0.0 && self.y == 0.0 && self.z == 0.0 {
            return 0.0;
        }
        if self.w < -1.0 {
            2.0 * PI
        } else if self.w > 1.0 {
            0.0
        } else {
            2.0 * self.w.acos()
        }
    }

    /// Normalized rotation axis, `(0, 0, 1)` for a zero vector part.
    pub fn axis(&self) -> Vector3<f32> {
        if self.x == 0.0 && self.y == 0.0 && self.z == 0.0 {
            return Vector3::unit_z();
        }
        Vector3::new(self.x, self.y, self.z).normalize()
    }

    /// Euler decomposition `(about x, about y, about z)` via atan2/asin.
    ///
    /// This is *not* an axis-angle decomposition, see [`Quaternion::axis`] and
    /// [`Quaternion::angle`] for that. It is also not the inverse of
    /// [`Quaternion::set_euler`] for compound rotations, only for rotations
    /// around a single axis.
    pub fn euler_angles(&self) -> Vector3<f32> {
        let Self { x, y, z, w } = *self;
        let sin_y = (2.0 * (w * y - z * x)).clamp(-1.0, 1.0);
        Vector3::new(
            (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y)),
            sin_y.asin(),
            (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z)),
        )
    }

    /// Negate the vector part.
    ///
    /// This is the conjugate, which is the inverse only for unit quaternions.
    pub fn inverse(&mut self) -> &mut Self {
        self.x = -self.x;
        self.y = -self.y;
        self.z = -self.z;
        self
    }

    /// `self = self * rhs`: `rhs` is applied first, then the old `self`.
    pub fn multiply(&mut self, rhs: &Quaternion) -> &mut Self {
        *self = hamilton(self, rhs);
        self
    }

    /// `self = lhs * self`: the old `self` is applied first, then `lhs`.
    pub fn pre_multiply(&mut self, lhs: &Quaternion) -> &mut Self {
        *self = hamilton(lhs, self);
        self
    }

    /// Rotate `vector` in place by the sandwich product `q v q⁻¹`.
    pub fn multiply_vector3<'a>(&self, vector: &'a mut Vector3<f32>) -> &'a mut Vector3<f32> {
        let Vector3 { x, y, z } = *vector;
        let Self {
            x: qx,
            y: qy,
            z: qz,
            w: qw,
        } = *self;

        // q * v
        let ix = qw * x + qy * z - qz * y;
        let iy = qw * y + qz * x - qx * z;
        let iz = qw * z + qx * y - qy * x;
        let iw = -qx * x - qy * y - qz * z;

        // (q * v) * q⁻¹
        vector.x = ix * qw + iw * -qx + iy * -qz - iz * -qy;
        vector.y = iy * qw + iw * -qy + iz * -qx - ix * -qz;
        vector.z = iz * qw + iw * -qz + ix * -qy - iy * -qx;
        vector
    }

    /// Extract the rotation of a 3x3 rotation matrix.
    ///
    /// Branches on the trace and then on the largest diagonal element so the
    /// divisor is always at least 1.
    pub fn from_matrix3(&mut self, m: &Matrix3<f32>) -> &mut Self {
        // m.c.r is column c, row r
        let trace = m.x.x + m.y.y + m.z.z;
        if trace >= 0.0 {
            let s = (trace + 1.0).sqrt();
            self.w = 0.5 * s;
            let s = 0.5 / s;
            self.x = (m.y.z - m.z.y) * s;
            self.y = (m.z.x - m.x.z) * s;
            self.z = (m.x.y - m.y.x) * s;
        } else if m.x.x > m.y.y && m.x.x > m.z.z {
            let s = (1.0 + m.x.x - m.y.y - m.z.z).sqrt();
            self.x = 0.5 * s;
            let s = 0.5 / s;
            self.y = (m.x.y + m.y.x) * s;
            self.z = (m.z.x + m.x.z) * s;
            self.w = (m.y.z - m.z.y) * s;
        } else if m.y.y > m.z.z {
            let s = (1.0 + m.y.y - m.x.x - m.z.z).sqrt();
            self.y = 0.5 * s;
            let s = 0.5 / s;
            self.x = (m.x.y + m.y.x) * s;
            self.z = (m.y.z + m.z.y) * s;
            self.w = (m.z.x - m.x.z) * s;
        } else {
            let s = (1.0 + m.z.z - m.x.x - m.y.y).sqrt();
            self.z = 0.5 * s;
            let s = 0.5 / s;
            self.x = (m.z.x + m.x.z) * s;
            self.y = (m.y.z + m.z.y) * s;
            self.w = (m.x.y - m.y.x) * s;
        }
        self
    }

    /// Same as [`Quaternion::from_matrix3`] on the upper-left 3x3 block.
    pub fn from_matrix4(&mut self, m: &Matrix4<f32>) -> &mut Self {
        let rotation = Matrix3::from_cols(m.x.truncate(), m.y.truncate(), m.z.truncate());
        self.from_matrix3(&rotation)
    }

    pub fn to_matrix3(&self) -> Matrix3<f32> {
        let m = self.to_matrix4();
        Matrix3::from_cols(m.x.truncate(), m.y.truncate(), m.z.truncate())
    }

    /// Homogeneous rotation matrix with an identity translation part.
    pub fn to_matrix4(&self) -> Matrix4<f32> {
        let Self { x, y, z, w } = *self;
        let (x2, y2, z2) = (x + x, y + y, z + z);
        let (xx, xy, xz) = (x * x2, x * y2, x * z2);
        let (yy, yz, zz) = (y * y2, y * z2, z * z2);
        let (wx, wy, wz) = (w * x2, w * y2, w * z2);

        #[rustfmt::skip]
        let m = Matrix4::new(
            1.0 - (yy + zz), xy + wz,         xz - wy,         0.0,
            xy - wz,         1.0 - (xx + zz), yz + wx,         0.0,
            xz + wy,         yz - wx,         1.0 - (xx + yy), 0.0,
            0.0,             0.0,             0.0,             1.0,
        );
        m
    }

    pub fn dot(&self, other: &Quaternion) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    pub fn length(&self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Scale to unit length. A zero quaternion becomes the identity.
    pub fn normalize(&mut self) -> &mut Self {
        let length = self.length();
        if length == 0.0 {
            *self = Self::IDENTITY;
        } else {
            let inv = 1.0 / length;
            self.x *= inv;
            self.y *= inv;
            self.z *= inv;
            self.w *= inv;
        }
        self
    }

    /// Spherical interpolation towards `to` by `by` in `[0, 1]` along the shorter arc.
    ///
    /// Orientations closer than `1 - dot < 0.001` leave `self` untouched.
    /// Between that and `1 - dot <= 0.1` the components are blended linearly,
    /// beyond it the exact trigonometric weights are used.
    pub fn slerp(&mut self, to: &Quaternion, by: f32) -> &mut Self {
        if *self == *to {
            return self;
        }

        let mut to = *to;
        let mut dot = self.dot(&to);
        if dot < 0.0 {
            to = Quaternion::new(-to.x, -to.y, -to.z, -to.w);
            dot = -dot;
        }

        if 1.0 - dot < SLERP_TOO_CLOSE {
            return self;
        }

        let (mut scale0, mut scale1) = (1.0 - by, by);
        if 1.0 - dot > SLERP_LINEAR_LIMIT {
            let theta = dot.acos();
            let inv_sin_theta = 1.0 / theta.sin();
            scale0 = ((1.0 - by) * theta).sin() * inv_sin_theta;
            scale1 = (by * theta).sin() * inv_sin_theta;
        }

        self.x = scale0 * self.x + scale1 * to.x;
        self.y = scale0 * self.y + scale1 * to.y;
        self.z = scale0 * self.z + scale1 * to.z;
        self.w = scale0 * self.w + scale1 * to.w;
        self
    }
}

fn hamilton(a: &Quaternion, b: &Quaternion) -> Quaternion {
    Quaternion {
        x: a.x * b.w + a.w * b.x + a.y * b.z - a.z * b.y,
        y: a.y * b.w + a.w * b.y + a.z * b.x - a.x * b.z,
        z: a.z * b.w + a.w * b.z + a.x * b.y - a.y * b.x,
        w: a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f32; 4]> for Quaternion {
    fn from(data: [f32; 4]) -> Self {
        Self::from_array(data)
    }
}

impl From<cgmath::Quaternion<f32>> for Quaternion {
    fn from(q: cgmath::Quaternion<f32>) -> Self {
        Self::new(q.v.x, q.v.y, q.v.z, q.s)
    }
}

impl From<Quaternion> for cgmath::Quaternion<f32> {
    fn from(q: Quaternion) -> Self {
        cgmath::Quaternion::new(q.w, q.x, q.y, q.z)
    }
}

impl Mul<Quaternion> for Quaternion {
    type Output = Quaternion;

    fn mul(self, rhs: Quaternion) -> Self::Output {
        hamilton(&self, &rhs)
    }
}

impl<'a, 'b> Mul<&'b Quaternion> for &'a Quaternion {
    type Output = Quaternion;

    fn mul(self, rhs: &'b Quaternion) -> Self::Output {
        hamilton(self, rhs)
    }
}

impl MulAssign<Quaternion> for Quaternion {
    fn mul_assign(&mut self, rhs: Quaternion) {
        self.multiply(&rhs);
    }
}

impl Mul<Vector3<f32>> for Quaternion {
    type Output = Vector3<f32>;

    fn mul(self, mut rhs: Vector3<f32>) -> Self::Output {
        self.multiply_vector3(&mut rhs);
        rhs
    }
}

impl fmt::Display for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{},{},{}]", self.x, self.y, self.z, self.w)
    }
}
