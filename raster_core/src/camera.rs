//! A pinhole camera: the `scene_to_camera` view matrix plus the two lens parameters that
//! drive the frustum clipper and projection matrix.

use crate::matrix::{self, Mat4};
use crate::vector::{Point3, Vec3};

const MIN_FOCAL_LENGTH: f32 = 0.1;
const MAX_FOCAL_LENGTH: f32 = 10.0;

#[derive(Clone, Debug)]
pub struct Camera {
    scene_to_camera: Mat4,
    fov_x_degrees: f32,
    focal_length: f32,
}

impl Camera {
    /// `fov_x_degrees` must lie strictly inside `(0, 360)`; `focal_length` must lie in
    /// `[0.1, 10]`. Both are precondition violations (§7) and panic at the boundary.
    pub fn new(scene_to_camera: Mat4, fov_x_degrees: f32, focal_length: f32) -> Camera {
        assert!(
            fov_x_degrees > 0.0 && fov_x_degrees < 360.0,
            "Camera::new: fov_x_degrees must be in (0, 360), got {fov_x_degrees}"
        );
        assert!(
            (MIN_FOCAL_LENGTH..=MAX_FOCAL_LENGTH).contains(&focal_length),
            "Camera::new: focal_length must be in [0.1, 10], got {focal_length}"
        );
        Camera { scene_to_camera, fov_x_degrees, focal_length }
    }

    /// Builds a camera at `eye` looking toward `center`, world-up = +Z.
    pub fn look_at(eye: Point3, center: Point3, fov_x_degrees: f32, focal_length: f32) -> Camera {
        Camera::new(matrix::look_at(eye, center), fov_x_degrees, focal_length)
    }

    /// Builds a camera at `position` facing the direction given by `yaw_degrees` (rotation
    /// around world-up, from +X toward +Y) and `pitch_degrees` (elevation above the XY
    /// plane), world-up = +Z. Implemented by deriving a look-at target one unit along the
    /// resulting forward vector, reusing `matrix::look_at`.
    pub fn from_yaw_pitch(
        position: Point3,
        yaw_degrees: f32,
        pitch_degrees: f32,
        fov_x_degrees: f32,
        focal_length: f32,
    ) -> Camera {
        let yaw = yaw_degrees.to_radians();
        let pitch = pitch_degrees.to_radians();
        let forward = Vec3::new(pitch.cos() * yaw.cos(), pitch.cos() * yaw.sin(), pitch.sin());
        Camera::look_at(position, position + forward, fov_x_degrees, focal_length)
    }

    pub fn scene_to_camera(&self) -> &Mat4 {
        &self.scene_to_camera
    }

    pub fn access_matrix(&mut self) -> &mut Mat4 {
        &mut self.scene_to_camera
    }

    pub fn fov_x_degrees(&self) -> f32 {
        self.fov_x_degrees
    }

    pub fn set_fov_x_degrees(&mut self, fov_x_degrees: f32) {
        assert!(
            fov_x_degrees > 0.0 && fov_x_degrees < 360.0,
            "set_fov_x_degrees: must be in (0, 360), got {fov_x_degrees}"
        );
        self.fov_x_degrees = fov_x_degrees;
    }

    pub fn focal_length(&self) -> f32 {
        self.focal_length
    }

    pub fn set_focal_length(&mut self, focal_length: f32) {
        assert!(
            (MIN_FOCAL_LENGTH..=MAX_FOCAL_LENGTH).contains(&focal_length),
            "set_focal_length: must be in [0.1, 10], got {focal_length}"
        );
        self.focal_length = focal_length;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "fov_x_degrees")]
    fn rejects_fov_out_of_range() {
        Camera::new(Mat4::identity(), 360.0, 1.0);
    }

    #[test]
    #[should_panic(expected = "focal_length")]
    fn rejects_focal_length_out_of_range() {
        Camera::new(Mat4::identity(), 90.0, 20.0);
    }

    #[test]
    fn look_at_builds_default_fov_and_focal() {
        let camera = Camera::look_at(Point3::new(0.0, 0.0, 3.0), Point3::new(0.0, 0.0, 0.0), 90.0, 1.0);
        assert_eq!(camera.fov_x_degrees(), 90.0);
        assert_eq!(camera.focal_length(), 1.0);
    }

    #[test]
    fn from_yaw_pitch_zero_faces_positive_x() {
        let camera = Camera::from_yaw_pitch(Point3::zero(), 0.0, 0.0, 90.0, 1.0);
        // A point one unit further along +X (straight ahead) must land in front of the
        // camera, i.e. at negative camera-space z.
        let ahead = camera.scene_to_camera().transform_point(Point3::new(1.0, 0.0, 0.0));
        assert!(ahead.z < 0.0);
    }

    #[test]
    fn from_yaw_pitch_90_degrees_faces_positive_y() {
        let camera = Camera::from_yaw_pitch(Point3::zero(), 90.0, 0.0, 90.0, 1.0);
        let ahead = camera.scene_to_camera().transform_point(Point3::new(0.0, 1.0, 0.0));
        assert!(ahead.z < 0.0);
    }
}
