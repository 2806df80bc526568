//! Orientation math.
//!
//! - `quaternion` contains the [`Quaternion`] rotation type and its algebra

pub mod quaternion;

pub use quaternion::Quaternion;
