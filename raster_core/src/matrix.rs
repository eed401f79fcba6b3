//! Column-vector linear algebra: `Mat4 * Vec4` applies the transform. Matrices are
//! stored column-major (`cols[i]` is the i-th column), mirroring the convention used
//! throughout the component design.

use crate::vector::{Vec3, Vec4};

/// A 3x3 matrix, used for transforming normals/directions (the upper-left block of a
/// `Mat4`, see [`Mat4::upper_left3`]).
#[derive(Clone, Copy, Debug)]
pub struct Mat3 {
    pub cols: [Vec3; 3],
}

impl Mat3 {
    pub fn from_cols(c0: Vec3, c1: Vec3, c2: Vec3) -> Mat3 {
        Mat3 { cols: [c0, c1, c2] }
    }

    pub fn identity() -> Mat3 {
        Mat3::from_cols(Vec3::unit_x(), Vec3::unit_y(), Vec3::unit_z())
    }

    pub fn mul_vec3(&self, v: Vec3) -> Vec3 {
        self.cols[0] * v.x + self.cols[1] * v.y + self.cols[2] * v.z
    }

    pub fn transpose(&self) -> Mat3 {
        Mat3::from_cols(
            Vec3::new(self.cols[0].x, self.cols[1].x, self.cols[2].x),
            Vec3::new(self.cols[0].y, self.cols[1].y, self.cols[2].y),
            Vec3::new(self.cols[0].z, self.cols[1].z, self.cols[2].z),
        )
    }

    fn determinant(&self) -> f32 {
        self.cols[0].dot(&self.cols[1].cross(&self.cols[2]))
    }

    /// Inverse via the adjugate/cofactor method. Used to build the normal-transform
    /// matrix (inverse-transpose of the upper-left 3x3), not called in any hot per-pixel
    /// path, so a straightforward cofactor expansion is preferred over a decomposition.
    pub fn inverse(&self) -> Mat3 {
        let det = self.determinant();
        debug_assert!(det != 0.0, "Mat3::inverse: singular matrix");
        let inv_det = 1.0 / det;
        let r0 = self.cols[1].cross(&self.cols[2]) * inv_det;
        let r1 = self.cols[2].cross(&self.cols[0]) * inv_det;
        let r2 = self.cols[0].cross(&self.cols[1]) * inv_det;
        // r0/r1/r2 are the *rows* of the inverse; assemble as columns of the transpose
        // and transpose back to get the true inverse.
        Mat3::from_cols(
            Vec3::new(r0.x, r1.x, r2.x),
            Vec3::new(r0.y, r1.y, r2.y),
            Vec3::new(r0.z, r1.z, r2.z),
        )
    }
}

/// A 4x4 matrix in column-vector convention.
#[derive(Clone, Copy, Debug)]
pub struct Mat4 {
    pub cols: [Vec4; 4],
}

impl Mat4 {
    pub fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Mat4 {
        Mat4 { cols: [c0, c1, c2, c3] }
    }

    pub fn identity() -> Mat4 {
        Mat4::from_cols(
            Vec4::new(1.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 1.0, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 1.0, 0.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        )
    }

    pub fn mul_vec4(&self, v: Vec4) -> Vec4 {
        self.cols[0] * v.x + self.cols[1] * v.y + self.cols[2] * v.z + self.cols[3] * v.w
    }

    /// Applies the matrix to a point (implicit w=1).
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.mul_vec4(Vec4::from_point(p)).xyz()
    }

    /// Applies the matrix to a direction (implicit w=0) — translation has no effect.
    pub fn transform_direction(&self, d: Vec3) -> Vec3 {
        self.mul_vec4(Vec4::from_direction(d)).xyz()
    }

    pub fn mul(&self, rhs: &Mat4) -> Mat4 {
        Mat4::from_cols(
            self.mul_vec4(rhs.cols[0]),
            self.mul_vec4(rhs.cols[1]),
            self.mul_vec4(rhs.cols[2]),
            self.mul_vec4(rhs.cols[3]),
        )
    }

    /// The upper-left 3x3 block, used to build the normal-transform matrix.
    pub fn upper_left3(&self) -> Mat3 {
        Mat3::from_cols(self.cols[0].xyz(), self.cols[1].xyz(), self.cols[2].xyz())
    }

    pub fn translation_column(&self) -> Vec3 {
        self.cols[3].xyz()
    }

    pub fn transpose(&self) -> Mat4 {
        let mut cols = [Vec4::default(); 4];
        for (row, col) in cols.iter_mut().enumerate() {
            *col = Vec4::new(
                self.cols[0].get(row),
                self.cols[1].get(row),
                self.cols[2].get(row),
                self.cols[3].get(row),
            );
        }
        Mat4::from_cols(cols[0], cols[1], cols[2], cols[3])
    }
}

impl Vec4 {
    fn get(&self, i: usize) -> f32 {
        match i {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            _ => self.w,
        }
    }
}

/// `T(v)`: identity with the last column replaced by `(v, 1)`.
pub fn translate(v: Vec3) -> Mat4 {
    Mat4::from_cols(
        Vec4::new(1.0, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 1.0, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec4::new(v.x, v.y, v.z, 1.0),
    )
}

/// Uniform or per-axis scale.
pub fn scale(v: Vec3) -> Mat4 {
    Mat4::from_cols(
        Vec4::new(v.x, 0.0, 0.0, 0.0),
        Vec4::new(0.0, v.y, 0.0, 0.0),
        Vec4::new(0.0, 0.0, v.z, 0.0),
        Vec4::new(0.0, 0.0, 0.0, 1.0),
    )
}

pub fn scale_uniform(s: f32) -> Mat4 {
    scale(Vec3::splat(s))
}

pub fn rotate_x(angle_deg: f32) -> Mat4 {
    let a = angle_deg.to_radians();
    let (s, c) = a.sin_cos();
    Mat4::from_cols(
        Vec4::new(1.0, 0.0, 0.0, 0.0),
        Vec4::new(0.0, c, s, 0.0),
        Vec4::new(0.0, -s, c, 0.0),
        Vec4::new(0.0, 0.0, 0.0, 1.0),
    )
}

pub fn rotate_y(angle_deg: f32) -> Mat4 {
    let a = angle_deg.to_radians();
    let (s, c) = a.sin_cos();
    Mat4::from_cols(
        Vec4::new(c, 0.0, -s, 0.0),
        Vec4::new(0.0, 1.0, 0.0, 0.0),
        Vec4::new(s, 0.0, c, 0.0),
        Vec4::new(0.0, 0.0, 0.0, 1.0),
    )
}

pub fn rotate_z(angle_deg: f32) -> Mat4 {
    let a = angle_deg.to_radians();
    let (s, c) = a.sin_cos();
    Mat4::from_cols(
        Vec4::new(c, s, 0.0, 0.0),
        Vec4::new(-s, c, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec4::new(0.0, 0.0, 0.0, 1.0),
    )
}

/// Rotation by `angle_rad` around an arbitrary unit `axis`, via Rodrigues' formula.
/// `axis` is normalized defensively; a zero axis yields the identity.
pub fn rotate_axis(angle_rad: f32, axis: Vec3) -> Mat4 {
    let axis = axis.normalized();
    let (s, c) = angle_rad.sin_cos();
    let one_minus_c = 1.0 - c;
    let (x, y, z) = (axis.x, axis.y, axis.z);

    Mat4::from_cols(
        Vec4::new(
            c + x * x * one_minus_c,
            x * y * one_minus_c + z * s,
            x * z * one_minus_c - y * s,
            0.0,
        ),
        Vec4::new(
            x * y * one_minus_c - z * s,
            c + y * y * one_minus_c,
            y * z * one_minus_c + x * s,
            0.0,
        ),
        Vec4::new(
            x * z * one_minus_c + y * s,
            y * z * one_minus_c - x * s,
            c + z * z * one_minus_c,
            0.0,
        ),
        Vec4::new(0.0, 0.0, 0.0, 1.0),
    )
}

/// Builds a `scene_to_camera` view matrix looking from `eye` toward `center`, with
/// world-up fixed at `(0, 0, 1)` (Z-up convention).
pub fn look_at(eye: Vec3, center: Vec3) -> Mat4 {
    let world_up = Vec3::unit_z();
    let forward = (center - eye).normalized();
    let mut right = forward.cross(&world_up);
    if right.length_squared() <= 0.0 {
        // `forward` is parallel to world-up; fall back to an arbitrary right axis.
        right = forward.cross(&Vec3::unit_x());
    }
    let right = right.normalized();
    let up = right.cross(&forward);

    // Rows of the rotation part are the basis axes (camera-space x/y/z expressed in
    // world space), since this is the inverse of an orthonormal rotation.
    let rotation = Mat4::from_cols(
        Vec4::new(right.x, up.x, -forward.x, 0.0),
        Vec4::new(right.y, up.y, -forward.y, 0.0),
        Vec4::new(right.z, up.z, -forward.z, 0.0),
        Vec4::new(0.0, 0.0, 0.0, 1.0),
    );
    rotation.mul(&translate(-eye))
}

/// Perspective projection with an infinite far plane: a point on the near plane at
/// `z = -near` maps to NDC `z = -1`; there is no far-plane clamp.
pub fn infinite_perspective(fov_y_rad: f32, aspect: f32, near: f32) -> Mat4 {
    let f = 1.0 / (fov_y_rad / 2.0).tan();
    Mat4::from_cols(
        Vec4::new(f / aspect, 0.0, 0.0, 0.0),
        Vec4::new(0.0, f, 0.0, 0.0),
        Vec4::new(0.0, 0.0, -1.0, -1.0),
        Vec4::new(0.0, 0.0, -2.0 * near, 0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn identity_leaves_point_unchanged() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Mat4::identity().transform_point(p), p);
    }

    #[test]
    fn translate_moves_point_but_not_direction() {
        let t = translate(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.transform_point(Vec3::zero()), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.transform_direction(Vec3::unit_x()), Vec3::unit_x());
    }

    #[test]
    fn rotate_z_90_degrees_maps_x_to_y() {
        let r = rotate_z(90.0);
        let out = r.transform_point(Vec3::unit_x());
        assert!(approx_eq(out.x, 0.0));
        assert!(approx_eq(out.y, 1.0));
    }

    #[test]
    fn rotate_axis_matches_rotate_z_for_z_axis() {
        let via_axis = rotate_axis(90f32.to_radians(), Vec3::unit_z());
        let via_named = rotate_z(90.0);
        let out_a = via_axis.transform_point(Vec3::unit_x());
        let out_b = via_named.transform_point(Vec3::unit_x());
        assert!(approx_eq(out_a.x, out_b.x));
        assert!(approx_eq(out_a.y, out_b.y));
    }

    #[test]
    fn look_at_places_center_on_negative_camera_z() {
        let view = look_at(Vec3::new(0.0, 0.0, 3.0), Vec3::zero());
        let center_in_camera = view.transform_point(Vec3::zero());
        assert!(center_in_camera.z < 0.0);
        assert!(approx_eq(center_in_camera.x, 0.0));
        assert!(approx_eq(center_in_camera.y, 0.0));
    }

    #[test]
    fn mat3_inverse_round_trips_identity() {
        let m = Mat3::from_cols(
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 3.0, 0.0),
            Vec3::new(0.0, 0.0, 4.0),
        );
        let inv = m.inverse();
        let v = inv.mul_vec3(m.mul_vec3(Vec3::new(1.0, 1.0, 1.0)));
        assert!(approx_eq(v.x, 1.0) && approx_eq(v.y, 1.0) && approx_eq(v.z, 1.0));
    }
}
