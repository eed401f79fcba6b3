//! The rasterizer + shader (C7): per-pixel barycentric fill, perspective-correct
//! attribute recovery, texture sampling, and Phong lighting. Runs inside one worker-pool
//! task per horizontal row band (see `draw.rs`), writing into the disjoint row range it
//! was handed.

use crate::color::Color;
use crate::light::Light;
use crate::resources::{Material, MaterialId, ResourceStore};
use crate::vector::{Point2, Vec3};

/// A loose inside-test threshold so shared edges between adjacent triangles don't leave
/// a visible seam of unwritten pixels.
const BARYCENTRIC_EPSILON: f32 = 2.0 * f32::EPSILON.max(1e-6);

/// Everything a tile task needs to shade its rows, computed once per triangle by the
/// triangle drawer and shared read-only across every band.
#[derive(Clone, Copy)]
pub struct DrawParams {
    /// Screen-space pixel coordinates of each vertex.
    pub screen: [Point2; 3],
    /// `1 / w_clip` recorded before the perspective divide, for perspective-correct
    /// interpolation.
    pub inv_w: [f32; 3],
    /// `-camera_space_z` per vertex: positive, increasing with distance from the
    /// camera, so the z-buffer test is a plain "smaller wins".
    pub depth: [f32; 3],
    /// Camera-space position per vertex, used for lighting.
    pub camera_point: [Vec3; 3],
    pub normal: [Vec3; 3],
    pub uv: [Point2; 3],
    pub material_id: MaterialId,
}

fn edge_function(a: Point2, b: Point2, p: Point2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Rasterizes the rows `y0..y1` (exclusive) of `params`'s triangle into `image_row_major`
/// (the full image pixel buffer, row-major RGB8, width `image_width`) and `z_buffer`
/// (length `image_width * image_height`). The caller guarantees no other task writes
/// these same rows concurrently.
#[allow(clippy::too_many_arguments)]
pub fn rasterize_band(
    params: &DrawParams,
    y0: usize,
    y1: usize,
    image_width: usize,
    image_pixels: &mut [u8],
    z_buffer: &mut [f32],
    resources: &ResourceStore,
    lights: Option<&[Light]>,
) {
    let material = resources.access_material(params.material_id);
    let total_area = edge_function(params.screen[0], params.screen[1], params.screen[2]);
    if total_area == 0.0 {
        // Degenerate (zero-area) triangle: skip, per the degenerate-geometry policy.
        return;
    }

    let min_x = params.screen.iter().map(|p| p.x).fold(f32::INFINITY, f32::min).floor().max(0.0) as usize;
    let max_x = params.screen.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max).ceil().min(image_width as f32) as usize;

    for y in y0..y1 {
        let py = y as f32 + 0.5;
        for x in min_x..max_x {
            let p = Point2::new(x as f32 + 0.5, py);
            let e0 = edge_function(params.screen[1], params.screen[2], p);
            let e1 = edge_function(params.screen[2], params.screen[0], p);
            let e2 = edge_function(params.screen[0], params.screen[1], p);

            let alpha = e0 / total_area;
            let beta = e1 / total_area;
            let gamma = e2 / total_area;
            if alpha < -BARYCENTRIC_EPSILON || beta < -BARYCENTRIC_EPSILON || gamma < -BARYCENTRIC_EPSILON {
                continue;
            }

            let z_screen = alpha * params.depth[0] + beta * params.depth[1] + gamma * params.depth[2];
            let pixel_index = x + y * image_width;
            if z_buffer[pixel_index] <= z_screen {
                continue;
            }
            z_buffer[pixel_index] = z_screen;

            let w_sum = alpha * params.inv_w[0] + beta * params.inv_w[1] + gamma * params.inv_w[2];
            let lambda = 1.0 / w_sum;
            let c0 = alpha * params.inv_w[0];
            let c1 = beta * params.inv_w[1];
            let c2 = gamma * params.inv_w[2];

            let uv = Point2::new(
                (c0 * params.uv[0].x + c1 * params.uv[1].x + c2 * params.uv[2].x) * lambda,
                (c0 * params.uv[0].y + c1 * params.uv[1].y + c2 * params.uv[2].y) * lambda,
            );
            let base_color = resources.pixel_at_uv(material.texture_id, uv);

            let color = match lights {
                Some(lights) => {
                    let camera_point = (params.camera_point[0] * c0
                        + params.camera_point[1] * c1
                        + params.camera_point[2] * c2)
                        * lambda;
                    let normal = ((params.normal[0] * c0 + params.normal[1] * c1 + params.normal[2] * c2)
                        * lambda)
                        .normalized();
                    base_color * shade(material, camera_point, normal, lights)
                }
                None => base_color,
            };

            let rgb = color.to_u8();
            let byte_index = pixel_index * 3;
            image_pixels[byte_index..byte_index + 3].copy_from_slice(&rgb);
        }
    }
}

/// Sums the Phong contribution of every light, all already expressed in camera space.
fn shade(material: &Material, camera_point: Vec3, normal: Vec3, lights: &[Light]) -> Color {
    let view = (-camera_point).normalized();
    let mut sum = Color::BLACK;
    for light in lights {
        sum += match light {
            Light::Ambient(l) => l.color * material.ambient * l.strength,
            Light::Directional(l) => {
                let light_dir = (-l.direction).normalized();
                phong(material, view, normal, light_dir, l.color, l.strength, 1.0)
            }
            Light::Point(l) => {
                let to_light = l.position - camera_point;
                let distance = to_light.length();
                let light_dir = to_light.normalized();
                let a = &l.attenuation;
                let falloff = 1.0 / (a.constant + a.linear * distance + a.quadratic * distance * distance);
                phong(material, view, normal, light_dir, l.color, l.strength, falloff)
            }
            Light::Spot(l) => {
                let to_light = l.position - camera_point;
                let distance = to_light.length();
                let light_dir = to_light.normalized();
                let a = &l.attenuation;
                let falloff = 1.0 / (a.constant + a.linear * distance + a.quadratic * distance * distance);
                let beam_cos = (-l.direction.normalized().dot(&light_dir)).max(0.0);
                let spot_factor = beam_cos.powi(l.exponent);
                phong(material, view, normal, light_dir, l.color, l.strength, falloff * spot_factor)
            }
        };
    }
    sum
}

#[allow(clippy::too_many_arguments)]
fn phong(
    material: &Material,
    view: Vec3,
    normal: Vec3,
    light_dir: Vec3,
    color: Color,
    strength: f32,
    scale: f32,
) -> Color {
    let diffuse_term = light_dir.dot(&normal).max(0.0);
    let half_vector = (view + light_dir).normalized();
    let specular_term = half_vector.dot(&normal).max(0.0).powf(material.shininess);
    (material.diffuse * diffuse_term + material.specular * specular_term) * color * strength * scale
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_params(material_id: MaterialId) -> DrawParams {
        DrawParams {
            screen: [Point2::new(10.0, 10.0), Point2::new(90.0, 10.0), Point2::new(50.0, 90.0)],
            inv_w: [1.0, 1.0, 1.0],
            depth: [1.0, 1.0, 1.0],
            camera_point: [Vec3::new(0.0, 0.0, -1.0); 3],
            normal: [Vec3::unit_z(); 3],
            uv: [Point2::zero(), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)],
            material_id,
        }
    }

    #[test]
    fn rasterize_band_writes_white_inside_default_material_triangle() {
        let resources = ResourceStore::new();
        let params = make_params(0);
        let mut pixels = vec![0u8; 100 * 100 * 3];
        let mut z_buffer = vec![f32::INFINITY; 100 * 100];
        rasterize_band(&params, 0, 100, 100, &mut pixels, &mut z_buffer, &resources, None);

        let center_index = (50 + 40 * 100) * 3;
        assert_eq!(&pixels[center_index..center_index + 3], &[255, 255, 255]);
    }

    #[test]
    fn rasterize_band_respects_z_buffer_pre_seeded_closer() {
        let resources = ResourceStore::new();
        let params = make_params(0);
        let mut pixels = vec![0u8; 100 * 100 * 3];
        let mut z_buffer = vec![0.0f32; 100 * 100]; // everything already closer than depth=1.0
        rasterize_band(&params, 0, 100, 100, &mut pixels, &mut z_buffer, &resources, None);

        let center_index = (50 + 40 * 100) * 3;
        assert_eq!(&pixels[center_index..center_index + 3], &[0, 0, 0]);
    }

    #[test]
    fn directional_light_aligned_with_normal_brightens_center_more_than_grazing_edge() {
        let mut resources = ResourceStore::new();
        let material_id = resources.push_material(Material {
            diffuse: Color::WHITE,
            specular: Color::WHITE,
            shininess: 32.0,
            ..Material::default()
        });
        let lights = [Light::Directional(crate::light::DirectionalLight {
            strength: 1.0,
            color: Color::WHITE,
            direction: Vec3::new(0.0, 0.0, -1.0),
        })];

        let front_on = shade(
            resources.access_material(material_id),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::unit_z(),
            &lights,
        );
        let grazing = shade(
            resources.access_material(material_id),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, 0.0),
            &lights,
        );
        assert!(front_on.r > grazing.r);
    }

    /// Vertex 2 carries a much larger `inv_w` than the other two, simulating a triangle
    /// viewed at a sharp angle. The sampled texel at a fixed screen point must match the
    /// perspective-correct (`1/w`-weighted) UV, not the naive screen-space-affine one —
    /// the two land in different texels of the probe texture below.
    #[test]
    fn rasterize_band_recovers_perspective_correct_uv_not_naive_affine() {
        let mut resources = ResourceStore::new();
        // 4x4 probe texture: green at (1, 2) is the perspective-correct answer; red at
        // (2, 2) is what plain screen-space (non-perspective) interpolation would give.
        let mut pixels = vec![0u8; 4 * 4 * 3];
        let set = |pixels: &mut [u8], x: usize, y: usize, rgb: [u8; 3]| {
            let i = (x + y * 4) * 3;
            pixels[i..i + 3].copy_from_slice(&rgb);
        };
        set(&mut pixels, 1, 2, [0, 255, 0]);
        set(&mut pixels, 2, 2, [255, 0, 0]);
        let texture_id = resources.push_texture_rgb(4, 4, pixels);
        let material_id = resources.push_material(Material { texture_id, ..Material::default() });

        // Vertices sit on pixel centers so the pixel at (50, 50) lands at barycentric
        // coordinates (alpha, beta, gamma) = (0, 0.5, 0.5) exactly.
        let params = DrawParams {
            screen: [Point2::new(0.5, 0.5), Point2::new(100.5, 0.5), Point2::new(0.5, 100.5)],
            inv_w: [1.0, 1.0, 2.0],
            depth: [1.0, 1.0, 1.0],
            camera_point: [Vec3::zero(); 3],
            normal: [Vec3::unit_z(); 3],
            uv: [Point2::zero(), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)],
            material_id,
        };

        let mut image_pixels = vec![0u8; 110 * 110 * 3];
        let mut z_buffer = vec![f32::INFINITY; 110 * 110];
        rasterize_band(&params, 0, 110, 110, &mut image_pixels, &mut z_buffer, &resources, None);

        let index = (50 + 50 * 110) * 3;
        assert_eq!(&image_pixels[index..index + 3], &[0, 255, 0]);
    }
}
