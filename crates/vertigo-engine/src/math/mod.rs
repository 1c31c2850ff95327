//! Matrix math for per-frame transforms.
//!
//! Conventions:
//! - matrices are 16 floats, column-major (`m[column * 4 + row]`)
//! - angles are degrees at the API boundary
//! - every function returns a fresh matrix, so products never alias inputs

mod mat4;

pub use mat4::{
    identity, multiply, orthographic, perspective, rotation_x, rotation_xyz, rotation_y,
    rotation_z, transform, Mat4,
};
