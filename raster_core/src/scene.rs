//! The scene model (C3): a single flat facet storage, object instances holding immutable
//! slices into it, cameras, and lights — all addressed by dense IDs and exposed as plain
//! slices rather than custom iterator types (see `DESIGN NOTES` on iterator proxies).

use crate::camera::Camera;
use crate::light::Light;
use crate::matrix::{self, Mat4};
use crate::resources::MaterialId;
use crate::vector::{Point2, Point3, Vec3};

pub type ObjectId = usize;
pub type CameraId = usize;
pub type LightId = usize;

/// A mesh vertex: position plus shading attributes that get interpolated across a
/// rasterized triangle.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Vertex {
    pub point: Point3,
    pub normal: Vec3,
    pub uv: Point2,
}

impl Vertex {
    pub fn new(point: Point3, normal: Vec3, uv: Point2) -> Vertex {
        Vertex { point, normal, uv }
    }

    /// Componentwise linear interpolation, used by the clipper (no perspective
    /// correction — that happens later during rasterization using `1/w`).
    pub fn lerp(a: &Vertex, b: &Vertex, t: f32) -> Vertex {
        Vertex {
            point: Vec3::lerp(a.point, b.point, t),
            normal: Vec3::lerp(a.normal, b.normal, t),
            uv: Point2::lerp(a.uv, b.uv, t),
        }
    }
}

/// Outward face = vertices in counter-clockwise order as seen from outside.
#[derive(Clone, Copy, Debug)]
pub struct Triangle {
    // Kept Copy (not just Clone) so the clipper can stage triangles through a fixed-
    // size scratch array without allocation.
    pub vertices: [Vertex; 3],
    pub material_id: MaterialId,
}

impl Triangle {
    pub fn new(vertices: [Vertex; 3], material_id: MaterialId) -> Triangle {
        Triangle { vertices, material_id }
    }
}

/// An object instance: an immutable slice `[slice_begin, slice_begin + slice_size)`
/// into the scene's flat facet storage, plus a mutable pose. The pose is stored as
/// primitive fields (not a matrix) so mutating, say, `z_angle` never requires
/// decomposing a previously-composed matrix.
#[derive(Clone, Debug)]
pub struct SceneObject {
    slice_begin: usize,
    slice_size: usize,
    pub position: Point3,
    pub x_angle: f32,
    pub y_angle: f32,
    pub z_angle: f32,
    pub scale: f32,
}

impl SceneObject {
    fn new(slice_begin: usize, slice_size: usize) -> SceneObject {
        SceneObject {
            slice_begin,
            slice_size,
            position: Vec3::zero(),
            x_angle: 0.0,
            y_angle: 0.0,
            z_angle: 0.0,
            scale: 1.0,
        }
    }

    pub fn slice_begin(&self) -> usize {
        self.slice_begin
    }

    pub fn slice_size(&self) -> usize {
        self.slice_size
    }

    /// `object_to_scene = T(position) * Rx * Ry * Rz * S(scale)`, recomputed on demand
    /// from the stored pose.
    pub fn object_to_scene(&self) -> Mat4 {
        matrix::translate(self.position)
            .mul(&matrix::rotate_x(self.x_angle))
            .mul(&matrix::rotate_y(self.y_angle))
            .mul(&matrix::rotate_z(self.z_angle))
            .mul(&matrix::scale_uniform(self.scale))
    }
}

/// Owns the flat facet storage, object instances, cameras, and lights that make up a
/// renderable scene. Built once before rendering; object poses may be mutated between
/// render calls, but the facet storage and slice ranges never change after insertion.
#[derive(Default)]
pub struct Scene {
    facets: Vec<Triangle>,
    objects: Vec<SceneObject>,
    cameras: Vec<Camera>,
    lights: Vec<Light>,
}

impl Scene {
    pub fn new() -> Scene {
        Scene::default()
    }

    /// Copies `triangles` onto the tail of the flat facet storage and records a new
    /// object instance at the default pose (origin, zero rotation, unit scale).
    /// Previously pushed slice ranges are never mutated.
    pub fn push_object(&mut self, triangles: &[Triangle]) -> ObjectId {
        let begin = self.facets.len();
        self.facets.extend_from_slice(triangles);
        let id = self.objects.len();
        self.objects.push(SceneObject::new(begin, triangles.len()));
        id
    }

    pub fn push_camera(&mut self, camera: Camera) -> CameraId {
        let id = self.cameras.len();
        self.cameras.push(camera);
        id
    }

    pub fn push_light(&mut self, light: Light) -> LightId {
        let id = self.lights.len();
        self.lights.push(light);
        id
    }

    pub fn access_object(&mut self, id: ObjectId) -> &mut SceneObject {
        debug_assert!(self.has_object(id), "access_object: object must exist");
        &mut self.objects[id]
    }

    pub fn access_camera(&mut self, id: CameraId) -> &mut Camera {
        debug_assert!(self.has_camera(id), "access_camera: camera must exist");
        &mut self.cameras[id]
    }

    pub fn camera(&self, id: CameraId) -> &Camera {
        debug_assert!(self.has_camera(id), "camera: camera must exist");
        &self.cameras[id]
    }

    pub fn has_object(&self, id: ObjectId) -> bool {
        id < self.objects.len()
    }

    pub fn has_camera(&self, id: CameraId) -> bool {
        id < self.cameras.len()
    }

    pub fn has_light(&self, id: LightId) -> bool {
        id < self.lights.len()
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// The facets belonging to a given object instance's slice.
    pub fn object_facets(&self, object: &SceneObject) -> &[Triangle] {
        &self.facets[object.slice_begin()..object.slice_begin() + object.slice_size()]
    }
}
