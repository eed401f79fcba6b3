//! The triangle drawer (C6): projects a clipped camera-space triangle to screen space,
//! applies back-face culling, and fans the fill out across the worker pool as one task
//! per horizontal row band.

use crate::image::Image;
use crate::light::Light;
use crate::matrix::Mat4;
use crate::pool::Pool;
use crate::raster::{self, DrawParams};
use crate::render::RenderFlags;
use crate::resources::ResourceStore;
use crate::scene::Triangle;
use crate::vector::{Point2, Vec3, Vec4};

/// Edges are nudged this much closer than facets so they win depth ties and remain
/// visible when `DRAW_EDGES | DRAW_FACETS` are both set.
const EDGE_DEPTH_BIAS: f32 = 10.0 * f32::EPSILON;

/// Raw pointers into the image/z-buffer backing storage, shared read-write across
/// worker-pool tasks.
///
/// Safety: every task spawned from one `draw_triangle` call is handed a disjoint row
/// range (`y0..y1`), so no two tasks ever touch the same pixel or z-buffer slot, and
/// `draw_triangle` calls `pool.wait_all()` before `targets` (and this wrapper) is
/// dropped, so no task outlives the buffers it points into.
#[derive(Clone, Copy)]
struct SharedTargets {
    image_pixels: *mut u8,
    image_len: usize,
    z_buffer: *mut f32,
    z_buffer_len: usize,
    image_width: usize,
}

unsafe impl Send for SharedTargets {}

impl SharedTargets {
    unsafe fn image_slice(&self) -> &'static mut [u8] {
        std::slice::from_raw_parts_mut(self.image_pixels, self.image_len)
    }

    unsafe fn z_buffer_slice(&self) -> &'static mut [f32] {
        std::slice::from_raw_parts_mut(self.z_buffer, self.z_buffer_len)
    }
}

/// Mutable render targets for one `render()` call: the output image and its z-buffer.
pub struct RenderTargets<'a> {
    pub image: &'a mut Image,
    pub z_buffer: &'a mut [f32],
}

impl RenderTargets<'_> {
    fn shared(&mut self) -> SharedTargets {
        SharedTargets {
            image_pixels: self.image.pixels_mut().as_mut_ptr(),
            image_len: self.image.pixels_mut().len(),
            z_buffer: self.z_buffer.as_mut_ptr(),
            z_buffer_len: self.z_buffer.len(),
            image_width: self.image.width(),
        }
    }
}

/// A light slice shared read-only across tasks, with the same lifetime contract as
/// [`SharedTargets`].
#[derive(Clone, Copy)]
struct SharedLights {
    ptr: *const Light,
    len: usize,
}

unsafe impl Send for SharedLights {}

impl SharedLights {
    unsafe fn as_slice(&self) -> &'static [Light] {
        std::slice::from_raw_parts(self.ptr, self.len)
    }
}

#[derive(Clone, Copy)]
struct SharedResources(*const ResourceStore);

unsafe impl Send for SharedResources {}

impl SharedResources {
    unsafe fn as_ref(&self) -> &'static ResourceStore {
        &*self.0
    }
}

/// Draws one already-clipped camera-space triangle. `camera_to_clip` is the frame's
/// projection matrix; `lights` is `Some` only when `ENABLE_LIGHT` and `DRAW_FACETS` are
/// both set (already expressed in camera space, see `render.rs`).
#[allow(clippy::too_many_arguments)]
pub fn draw_triangle(
    triangle: &Triangle,
    camera_to_clip: &Mat4,
    targets: &mut RenderTargets,
    pool: &Pool,
    resources: &ResourceStore,
    lights: Option<&[Light]>,
    flags: RenderFlags,
) {
    let v0 = triangle.vertices[0].point;
    let v1 = triangle.vertices[1].point;
    let v2 = triangle.vertices[2].point;
    let face_normal = (v1 - v0).cross(&(v2 - v0));
    let material = resources.access_material(triangle.material_id);
    if !flags.contains(RenderFlags::DISABLE_BACKFACE_CULLING)
        && !material.two_sided
        && face_normal.dot(&(-v0)) < 0.0
    {
        return;
    }

    let width = targets.image.width();
    let height = targets.image.height();
    let half_w = width as f32 / 2.0;
    let half_h = height as f32 / 2.0;

    let mut screen = [Point2::zero(); 3];
    let mut inv_w = [0.0f32; 3];
    let mut depth = [0.0f32; 3];
    for i in 0..3 {
        let clip = camera_to_clip.mul_vec4(Vec4::from_point(triangle.vertices[i].point));
        if clip.w.abs() < 1e-6 {
            log::debug!("draw_triangle: skipping triangle with near-zero w_clip");
            return;
        }
        inv_w[i] = 1.0 / clip.w;
        let ndc = clip.perspective_divide();
        screen[i] = Point2::new(ndc.x * half_w + half_w, half_h - ndc.y * half_h);
        depth[i] = -triangle.vertices[i].point.z;
    }

    if flags.contains(RenderFlags::DRAW_EDGES) {
        let ndc_of = |i: usize| {
            let clip = camera_to_clip.mul_vec4(Vec4::from_point(triangle.vertices[i].point));
            clip.perspective_divide()
        };
        let ndc = [ndc_of(0), ndc_of(1), ndc_of(2)];
        draw_line(targets, ndc[0], ndc[1]);
        draw_line(targets, ndc[1], ndc[2]);
        draw_line(targets, ndc[2], ndc[0]);
    }

    if !flags.contains(RenderFlags::DRAW_FACETS) {
        return;
    }

    let min_x = screen.iter().map(|p| p.x).fold(f32::INFINITY, f32::min).floor().max(0.0) as i64;
    let max_x = screen.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max).ceil().min(width as f32) as i64;
    let min_y = screen.iter().map(|p| p.y).fold(f32::INFINITY, f32::min).floor().max(0.0) as i64;
    let max_y = screen.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max).ceil().min(height as f32) as i64;
    if min_x >= max_x || min_y >= max_y {
        return;
    }
    let (y0, y1) = (min_y as usize, max_y as usize);

    let params = DrawParams {
        screen,
        inv_w,
        depth,
        camera_point: [triangle.vertices[0].point, triangle.vertices[1].point, triangle.vertices[2].point],
        normal: [triangle.vertices[0].normal, triangle.vertices[1].normal, triangle.vertices[2].normal],
        uv: [triangle.vertices[0].uv, triangle.vertices[1].uv, triangle.vertices[2].uv],
        material_id: triangle.material_id,
    };

    let row_count = y1 - y0;
    let band_count = pool.thread_count().min(row_count).max(1);
    let band_rows = row_count.div_ceil(band_count);

    let shared_targets = targets.shared();
    let shared_resources = SharedResources(resources as *const ResourceStore);
    let shared_lights = lights.map(|l| SharedLights { ptr: l.as_ptr(), len: l.len() });

    let mut band_start = y0;
    while band_start < y1 {
        let band_end = (band_start + band_rows).min(y1);
        let params = params;
        pool.enqueue(move || {
            // SAFETY: see `SharedTargets`/`SharedLights`/`SharedResources` — this
            // closure runs to completion before `draw_triangle`'s `pool.wait_all()`
            // returns, and its row range is disjoint from every other band's.
            let image_pixels = unsafe { shared_targets.image_slice() };
            let z_buffer = unsafe { shared_targets.z_buffer_slice() };
            let resources = unsafe { shared_resources.as_ref() };
            let lights = shared_lights.map(|l| unsafe { l.as_slice() });
            raster::rasterize_band(
                &params,
                band_start,
                band_end,
                shared_targets.image_width,
                image_pixels,
                z_buffer,
                resources,
                lights,
            );
        });
        band_start = band_end;
    }
    pool.wait_all();
}

/// DDA line draw for `DRAW_EDGES`, operating directly in NDC space and converting to
/// screen pixels per step; depth-biased so edges win ties against co-planar facets.
fn draw_line(targets: &mut RenderTargets, start: Vec3, end: Vec3) {
    let width = targets.image.width();
    let height = targets.image.height();
    let half_w = width as f32 / 2.0;
    let half_h = height as f32 / 2.0;

    let steps = ((end.x - start.x).abs().max((end.y - start.y).abs()) * half_w.max(half_h)).max(1.0) as u32;
    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        let x = start.x + (end.x - start.x) * t;
        let y = start.y + (end.y - start.y) * t;
        let z = start.z + (end.z - start.z) * t;
        if !(-1.0..=1.0).contains(&x) || !(-1.0..=1.0).contains(&y) || !(-1.0..=1.0).contains(&z) {
            continue;
        }
        let screen_x = (x * half_w + half_w).round();
        let screen_y = (half_h - y * half_h).round();
        if screen_x < 0.0 || screen_x >= width as f32 || screen_y < 0.0 || screen_y >= height as f32 {
            continue;
        }
        let (sx, sy) = (screen_x as usize, screen_y as usize);
        let depth = -z - EDGE_DEPTH_BIAS;
        let index = sx + sy * width;
        if targets.z_buffer[index] <= depth {
            continue;
        }
        targets.z_buffer[index] = depth;
        targets.image.set_pixel(sx, sy, [0, 255, 0]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Vertex;
    use crate::vector::Point2 as P2;

    fn front_facing_triangle(material_id: usize) -> Triangle {
        Triangle::new(
            [
                Vertex::new(Vec3::new(-0.5, -0.5, -3.0), Vec3::unit_z(), P2::zero()),
                Vertex::new(Vec3::new(0.5, -0.5, -3.0), Vec3::unit_z(), P2::new(1.0, 0.0)),
                Vertex::new(Vec3::new(0.0, 0.5, -3.0), Vec3::unit_z(), P2::new(0.0, 1.0)),
            ],
            material_id,
        )
    }

    fn projection() -> Mat4 {
        crate::matrix::infinite_perspective(90f32.to_radians(), 1.0, 1.0)
    }

    #[test]
    fn back_facing_triangle_writes_nothing() {
        let resources = ResourceStore::new();
        let mut image = Image::new(64, 64);
        let mut z_buffer = vec![f32::INFINITY; 64 * 64];
        let pool = Pool::with_thread_count(2);
        let mut reversed = front_facing_triangle(0);
        reversed.vertices.swap(1, 2);

        {
            let mut targets = RenderTargets { image: &mut image, z_buffer: &mut z_buffer };
            draw_triangle(&reversed, &projection(), &mut targets, &pool, &resources, None, RenderFlags::DRAW_FACETS);
        }

        assert!(z_buffer.iter().all(|&z| z == f32::INFINITY));
    }

    #[test]
    fn disabling_backface_culling_draws_the_reversed_triangle() {
        let resources = ResourceStore::new();
        let mut image = Image::new(64, 64);
        let mut z_buffer = vec![f32::INFINITY; 64 * 64];
        let pool = Pool::with_thread_count(2);
        let mut reversed = front_facing_triangle(0);
        reversed.vertices.swap(1, 2);
        let flags = RenderFlags::DRAW_FACETS | RenderFlags::DISABLE_BACKFACE_CULLING;

        {
            let mut targets = RenderTargets { image: &mut image, z_buffer: &mut z_buffer };
            draw_triangle(&reversed, &projection(), &mut targets, &pool, &resources, None, flags);
        }

        assert!(z_buffer.iter().any(|&z| z.is_finite()));
    }

    #[test]
    fn front_facing_triangle_fills_pixels_white() {
        let resources = ResourceStore::new();
        let mut image = Image::new(64, 64);
        let mut z_buffer = vec![f32::INFINITY; 64 * 64];
        let pool = Pool::with_thread_count(3);
        let triangle = front_facing_triangle(0);

        {
            let mut targets = RenderTargets { image: &mut image, z_buffer: &mut z_buffer };
            draw_triangle(&triangle, &projection(), &mut targets, &pool, &resources, None, RenderFlags::DRAW_FACETS);
        }

        assert_eq!(image.get_pixel(32, 32), [255, 255, 255]);
    }
}
