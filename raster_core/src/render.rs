//! Top-level render entry point: owns the per-frame pipeline that ties the scene model,
//! frustum clipper, triangle drawer, and rasterizer together.

use bitflags::bitflags;

use crate::camera::Camera;
use crate::clip::{self, CLIP_SCRATCH_CAPACITY};
use crate::draw::{self, RenderTargets};
use crate::image::Image;
use crate::light::Light;
use crate::matrix::Mat4;
use crate::pool::Pool;
use crate::resources::ResourceStore;
use crate::scene::{CameraId, Scene, Triangle, Vertex};
use crate::vector::Vec4;

bitflags! {
    /// Toggles what a `render()` call draws. `DRAW_FACETS` alone (the default) is a
    /// plain filled, lit render; `DRAW_EDGES` overlays wireframe edges.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct RenderFlags: u32 {
        const DRAW_EDGES = 1 << 0;
        const DRAW_FACETS = 1 << 1;
        const DISABLE_BACKFACE_CULLING = 1 << 2;
        const ENABLE_LIGHT = 1 << 3;
    }
}

impl Default for RenderFlags {
    fn default() -> RenderFlags {
        RenderFlags::DRAW_FACETS
    }
}

/// Owns the resources registry and worker pool shared across every `render()` call for
/// a session — neither is a process-wide singleton (see `resources.rs`/`pool.rs`).
pub struct Context {
    pub resources: ResourceStore,
    pool: Pool,
}

impl Context {
    pub fn new() -> Context {
        Context { resources: ResourceStore::new(), pool: Pool::new() }
    }

    pub fn with_thread_count(thread_count: usize) -> Context {
        Context { resources: ResourceStore::new(), pool: Pool::with_thread_count(thread_count) }
    }
}

impl Default for Context {
    fn default() -> Context {
        Context::new()
    }
}

/// Camera-space lights for one frame: directions/positions have already been carried
/// through the normal matrix / view matrix so `raster::shade` never touches `scene_to_camera`.
fn lights_to_camera_space(lights: &[Light], scene_to_camera: &Mat4, normal_matrix: &Mat4) -> Vec<Light> {
    lights
        .iter()
        .map(|light| match light {
            Light::Ambient(l) => Light::Ambient(*l),
            Light::Directional(l) => {
                let direction = normal_matrix.mul_vec4(Vec4::from_direction(l.direction)).xyz().normalized();
                Light::Directional(crate::light::DirectionalLight { direction, ..*l })
            }
            Light::Point(l) => {
                let position = scene_to_camera.transform_point(l.position);
                Light::Point(crate::light::PointLight { position, ..*l })
            }
            Light::Spot(l) => {
                let position = scene_to_camera.transform_point(l.position);
                let direction = normal_matrix.mul_vec4(Vec4::from_direction(l.direction)).xyz().normalized();
                Light::Spot(crate::light::SpotLight { position, direction, ..*l })
            }
        })
        .collect()
}

/// The inverse-transpose of `m`'s upper-left 3x3, promoted back to a `Mat4` direction
/// transform (w row/column zeroed) — the standard normal-transform matrix, used both
/// for vertex normals and for scene-space light directions.
fn normal_matrix_for(m: &Mat4) -> Mat4 {
    let upper = m.upper_left3().inverse().transpose();
    Mat4::from_cols(
        Vec4::from_direction(upper.cols[0]),
        Vec4::from_direction(upper.cols[1]),
        Vec4::from_direction(upper.cols[2]),
        Vec4::new(0.0, 0.0, 0.0, 1.0),
    )
}

fn transform_vertex(vertex: &Vertex, to_camera: &Mat4, normal_matrix: &Mat4) -> Vertex {
    Vertex {
        point: to_camera.transform_point(vertex.point),
        normal: normal_matrix.mul_vec4(Vec4::from_direction(vertex.normal)).xyz().normalized(),
        uv: vertex.uv,
    }
}

/// Renders `scene` as seen by `scene.camera(camera_id)` into `image`, honoring `flags`.
///
/// Allocates a fresh z-buffer (initialized to `+inf`, see `raster.rs`) each call; there
/// is no persistent depth state between frames.
pub fn render(ctx: &mut Context, scene: &Scene, camera_id: CameraId, image: &mut Image, flags: RenderFlags) {
    assert!(scene.has_camera(camera_id), "render: camera {camera_id} does not exist");
    let camera: &Camera = scene.camera(camera_id);

    let aspect = image.width() as f32 / image.height() as f32;
    let fov_x_rad = camera.fov_x_degrees().to_radians();
    // tan(fov_y/2) = tan(fov_x/2) / aspect, since aspect = width/height = tan(fov_x/2)/tan(fov_y/2).
    let fov_y_rad = 2.0 * ((fov_x_rad / 2.0).tan() / aspect).atan();
    let camera_to_clip = crate::matrix::infinite_perspective(fov_y_rad, aspect, camera.focal_length());
    let planes = clip::frustum_planes(camera.focal_length(), fov_x_rad, aspect);

    let mut z_buffer = vec![f32::INFINITY; image.width() * image.height()];

    let want_lighting = flags.contains(RenderFlags::ENABLE_LIGHT) && flags.contains(RenderFlags::DRAW_FACETS);

    // Lights live in scene space and are shared by every object; transform them into
    // camera space exactly once per frame, through the camera's own view matrix alone
    // (never through a per-object matrix — each object would otherwise apply its own
    // pose to the one shared set of lights).
    let camera_normal_matrix = normal_matrix_for(camera.scene_to_camera());
    let camera_space_lights = want_lighting
        .then(|| lights_to_camera_space(scene.lights(), camera.scene_to_camera(), &camera_normal_matrix));

    for object in scene.objects() {
        let object_to_camera = camera.scene_to_camera().mul(&object.object_to_scene());
        let normal_matrix = normal_matrix_for(&object_to_camera);

        for triangle in scene.object_facets(object) {
            let camera_space_triangle = Triangle::new(
                [
                    transform_vertex(&triangle.vertices[0], &object_to_camera, &normal_matrix),
                    transform_vertex(&triangle.vertices[1], &object_to_camera, &normal_matrix),
                    transform_vertex(&triangle.vertices[2], &object_to_camera, &normal_matrix),
                ],
                triangle.material_id,
            );

            let mut scratch = [camera_space_triangle; CLIP_SCRATCH_CAPACITY];
            let (start, count) = clip::clip_triangle(&camera_space_triangle, &planes, &mut scratch);

            for clipped in &scratch[start..start + count] {
                let mut targets = RenderTargets { image, z_buffer: &mut z_buffer };
                draw::draw_triangle(
                    clipped,
                    &camera_to_clip,
                    &mut targets,
                    &ctx.pool,
                    &ctx.resources,
                    camera_space_lights.as_deref(),
                    flags,
                );
            }
        }
    }
}
