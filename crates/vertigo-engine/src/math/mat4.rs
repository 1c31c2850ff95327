use std::f32::consts::PI;

/// 4×4 column-major matrix.
pub type Mat4 = [f32; 16];

const DEG_TO_RAD: f32 = PI / 180.0;

#[inline]
fn radians(degrees: f32) -> f32 {
    degrees * DEG_TO_RAD
}

/// Returns the identity matrix.
#[inline]
pub const fn identity() -> Mat4 {
    [
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]
}

/// Builds an orthographic projection.
///
/// The horizontal half-extent is `half_height * aspect`. `near` may be
/// negative, which keeps geometry at `z = 0` away from the clip planes.
///
/// The depth terms sit at indices 10 and 11 (not 14); renderers rely on this
/// exact layout, and for the symmetric planes they use (`near = -far`) the
/// term at index 11 is zero.
///
/// Callers must ensure `far != near` and a finite, non-zero half extent.
pub fn orthographic(half_height: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let half_width = half_height * aspect;
    let depth = far - near;

    let mut m = [0.0; 16];
    m[0] = 1.0 / half_width;
    m[5] = 1.0 / half_height;
    m[10] = -2.0 / depth;
    m[11] = -(far + near) / depth;
    m[15] = 1.0;
    m
}

/// Builds a right-handed perspective projection with a vertical field of view.
pub fn perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let f = 1.0 / (radians(fov_y_degrees) / 2.0).tan();
    let range_inv = 1.0 / (near - far);

    let mut m = [0.0; 16];
    m[0] = f / aspect;
    m[5] = f;
    m[10] = (far + near) * range_inv;
    m[11] = -1.0;
    m[14] = 2.0 * far * near * range_inv;
    m
}

/// Rotation about the Z axis (counter-clockwise for positive angles).
pub fn rotation_z(degrees: f32) -> Mat4 {
    let (sin, cos) = radians(degrees).sin_cos();

    let mut m = [0.0; 16];
    m[0] = cos;
    m[1] = sin;
    m[4] = -sin;
    m[5] = cos;
    m[10] = 1.0;
    m[15] = 1.0;
    m
}

/// Rotation about the X axis, in the layout used by [`rotation_xyz`].
pub fn rotation_x(degrees: f32) -> Mat4 {
    let (sin, cos) = radians(degrees).sin_cos();
    [
        1.0, 0.0, 0.0, 0.0, //
        0.0, cos, -sin, 0.0, //
        0.0, sin, cos, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]
}

/// Rotation about the Y axis, in the layout used by [`rotation_xyz`].
pub fn rotation_y(degrees: f32) -> Mat4 {
    let (sin, cos) = radians(degrees).sin_cos();
    [
        cos, 0.0, sin, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        -sin, 0.0, cos, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]
}

/// Composite rotation `Y * X * Z`: Z is applied first, then X, then Y.
///
/// The order is fixed and not commutative. The Z factor here is
/// `rotation_z(-z)`, matching the X and Y layouts above.
pub fn rotation_xyz(x_degrees: f32, y_degrees: f32, z_degrees: f32) -> Mat4 {
    let x = rotation_x(x_degrees);
    let y = rotation_y(y_degrees);
    let z = rotation_z(-z_degrees);

    multiply(&multiply(&y, &x), &z)
}

/// Column-major product `a * b`.
pub fn multiply(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = [0.0; 16];
    for col in 0..4 {
        for row in 0..4 {
            let mut sum = 0.0;
            for k in 0..4 {
                sum += a[k * 4 + row] * b[col * 4 + k];
            }
            out[col * 4 + row] = sum;
        }
    }
    out
}

/// Applies `m` to the column vector `v`.
pub fn transform(m: &Mat4, v: [f32; 4]) -> [f32; 4] {
    let mut out = [0.0; 4];
    for (row, slot) in out.iter_mut().enumerate() {
        *slot = (0..4).map(|k| m[k * 4 + row] * v[k]).sum();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() <= EPS
    }

    fn approx_mat(a: &Mat4, b: &Mat4) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| approx(*x, *y))
    }

    // ── orthographic ──────────────────────────────────────────────────────

    #[test]
    fn orthographic_scales_match_half_extents() {
        for &(half_height, aspect) in &[(2.0, 16.0 / 9.0), (1.0, 1.0), (0.5, 0.75), (10.0, 3.0)] {
            let m = orthographic(half_height, aspect, -1.0, 1.0);
            assert!(approx(m[0] * half_height * aspect, 1.0));
            assert!(approx(m[5] * half_height, 1.0));
        }
    }

    #[test]
    fn orthographic_layout_is_exact() {
        let m = orthographic(2.0, 1.5, -3.0, 5.0);
        assert_eq!(m[10], -2.0 / 8.0);
        assert_eq!(m[11], -(2.0) / 8.0);
        assert_eq!(m[15], 1.0);
        for i in [1, 2, 3, 4, 6, 7, 8, 9, 12, 13, 14] {
            assert_eq!(m[i], 0.0, "index {i} should be zero");
        }
    }

    #[test]
    fn orthographic_maps_symmetric_planes_to_clip_range() {
        let (near, far) = (-1.0, 1.0);
        let m = orthographic(2.0, 1.0, near, far);

        // View space looks down -Z: the near plane sits at z = -near.
        let at_near = transform(&m, [0.0, 0.0, -near, 1.0]);
        let at_far = transform(&m, [0.0, 0.0, -far, 1.0]);

        assert!(approx(at_near[2] / at_near[3], -1.0));
        assert!(approx(at_far[2] / at_far[3], 1.0));
    }

    // ── rotations ─────────────────────────────────────────────────────────

    #[test]
    fn rotation_xyz_of_zero_is_identity() {
        assert_eq!(rotation_xyz(0.0, 0.0, 0.0), identity());
    }

    #[test]
    fn rotation_xyz_with_only_x_matches_rotation_x() {
        let composite = rotation_xyz(90.0, 0.0, 0.0);
        assert!(approx_mat(&composite, &rotation_x(90.0)));

        let v = transform(&composite, [0.0, 1.0, 0.0, 1.0]);
        assert!(approx(v[0], 0.0));
        assert!(approx(v[1], 0.0));
        assert!(approx(v[2], -1.0));
        assert!(approx(v[3], 1.0));
    }

    #[test]
    fn rotation_xyz_applies_z_before_x_before_y() {
        let (x, y, z) = (30.0, 45.0, 60.0);
        let expected = multiply(&multiply(&rotation_y(y), &rotation_x(x)), &rotation_z(-z));
        assert!(approx_mat(&rotation_xyz(x, y, z), &expected));

        let swapped = multiply(&multiply(&rotation_x(x), &rotation_y(y)), &rotation_z(-z));
        assert!(!approx_mat(&rotation_xyz(x, y, z), &swapped));
    }

    #[test]
    fn rotation_z_quarter_turn_maps_x_to_y() {
        let v = transform(&rotation_z(90.0), [1.0, 0.0, 0.0, 1.0]);
        assert!(approx(v[0], 0.0));
        assert!(approx(v[1], 1.0));
    }

    #[test]
    fn rotation_z_layout() {
        let m = rotation_z(30.0);
        let (s, c) = (30.0f32.to_radians().sin(), 30.0f32.to_radians().cos());
        assert!(approx(m[0], c) && approx(m[1], s) && approx(m[4], -s) && approx(m[5], c));
        assert_eq!((m[10], m[15]), (1.0, 1.0));
        for i in [2, 3, 6, 7, 8, 9, 11, 12, 13, 14] {
            assert_eq!(m[i], 0.0);
        }
    }

    // ── multiply / perspective ────────────────────────────────────────────

    #[test]
    fn multiply_by_identity_is_noop() {
        let m = rotation_xyz(12.0, 34.0, 56.0);
        assert_eq!(multiply(&m, &identity()), m);
        assert_eq!(multiply(&identity(), &m), m);
    }

    #[test]
    fn multiply_composes_right_to_left() {
        // Z rotation then X rotation applied to +X.
        let m = multiply(&rotation_x(90.0), &rotation_z(90.0));
        let v = transform(&m, [1.0, 0.0, 0.0, 1.0]);
        // +X -> +Y (z rotation) -> -Z (x rotation in this layout).
        assert!(approx(v[0], 0.0));
        assert!(approx(v[1], 0.0));
        assert!(approx(v[2], -1.0));
    }

    #[test]
    fn perspective_maps_near_and_far_planes() {
        let (near, far) = (0.1, 100.0);
        let m = perspective(60.0, 1.0, near, far);
        let a = transform(&m, [0.0, 0.0, -near, 1.0]);
        let b = transform(&m, [0.0, 0.0, -far, 1.0]);
        assert!((a[2] / a[3] + 1.0).abs() < 1e-4);
        assert!((b[2] / b[3] - 1.0).abs() < 1e-3);
    }
}
