//! The frustum clipper (C5): clips one camera-space triangle against the five view
//! planes, writing results into a fixed 63-slot scratch buffer so the hot path never
//! allocates.

use crate::scene::{Triangle, Vertex};
use crate::vector::Vec3;

/// `dot(normal, p) + d >= 0` means `p` is inside the half-space.
#[derive(Clone, Copy, Debug)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    pub fn new(normal: Vec3, d: f32) -> Plane {
        Plane { normal, d }
    }

    fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(&p) + self.d
    }
}

/// Builds the five view-frustum planes (near, left, right, bottom, top) for a camera
/// with the given `focal_length`, horizontal `fov_x` (radians), and `aspect` ratio
/// (width / height).
pub fn frustum_planes(focal_length: f32, fov_x_rad: f32, aspect: f32) -> [Plane; 5] {
    let half_width = (fov_x_rad / 2.0).tan() * focal_length;
    let half_height = half_width / aspect;

    [
        Plane::new(Vec3::new(0.0, 0.0, -1.0), -focal_length),
        Plane::new(Vec3::new(half_width, 0.0, -focal_length).normalized(), 0.0),
        Plane::new(Vec3::new(-half_width, 0.0, -focal_length).normalized(), 0.0),
        Plane::new(Vec3::new(0.0, half_height, -focal_length).normalized(), 0.0),
        Plane::new(Vec3::new(0.0, -half_height, -focal_length).normalized(), 0.0),
    ]
}

/// Every clip result triangle fits within this many slots: each of the 5 planes at
/// most doubles the running triangle count, and a single cursor-advancing scratch
/// array big enough to hold every stage at once (`1+2+4+8+16+32`) needs exactly this
/// many slots.
pub const CLIP_SCRATCH_CAPACITY: usize = 63;

const EPSILON: f32 = 1e-6;

fn intersect(prev: &Vertex, cur: &Vertex, plane: &Plane) -> Vertex {
    let d_prev = plane.signed_distance(prev.point);
    let d_cur = plane.signed_distance(cur.point);
    let denom = d_prev - d_cur;
    if denom.abs() < EPSILON {
        // Degenerate: the edge runs parallel to the plane. Falling back to the
        // current vertex keeps the result well-formed without panicking (degenerate
        // geometry is a skip, not an abort, per the error-handling policy).
        debug_assert!(false, "clip::intersect: degenerate plane/edge denominator");
        return *cur;
    }
    Vertex::lerp(prev, cur, d_prev / denom)
}

/// Sutherland-Hodgman clip of a (at most 3-vertex) polygon against one plane, written
/// into `out` (capacity 4, since clipping a triangle against one half-space produces a
/// convex polygon of at most `3 + 1` vertices). Returns the vertex count (0, 3, or 4).
fn clip_polygon_against_plane(poly_in: &[Vertex], plane: &Plane, out: &mut [Vertex; 4]) -> usize {
    let n = poly_in.len();
    let mut count = 0;
    for i in 0..n {
        let cur = poly_in[i];
        let prev = poly_in[(i + n - 1) % n];
        let cur_inside = plane.signed_distance(cur.point) >= 0.0;
        let prev_inside = plane.signed_distance(prev.point) >= 0.0;
        if cur_inside {
            if !prev_inside {
                out[count] = intersect(&prev, &cur, plane);
                count += 1;
            }
            out[count] = cur;
            count += 1;
        } else if prev_inside {
            out[count] = intersect(&prev, &cur, plane);
            count += 1;
        }
    }
    count
}

/// Clips `triangle` against `plane`, fan-triangulating the resulting polygon and
/// writing 0, 1, or 2 triangles into `out` starting at `out_index`. Returns the number
/// written.
fn clip_triangle_against_plane(
    triangle: &Triangle,
    plane: &Plane,
    out: &mut [Triangle; CLIP_SCRATCH_CAPACITY],
    out_index: usize,
) -> usize {
    let mut poly = [Vertex::default(); 4];
    let count = clip_polygon_against_plane(&triangle.vertices, plane, &mut poly);
    match count {
        0 => 0,
        3 => {
            out[out_index] = Triangle::new([poly[0], poly[1], poly[2]], triangle.material_id);
            1
        }
        4 => {
            out[out_index] = Triangle::new([poly[0], poly[1], poly[2]], triangle.material_id);
            out[out_index + 1] = Triangle::new([poly[0], poly[2], poly[3]], triangle.material_id);
            2
        }
        _ => unreachable!("a triangle clipped by one plane yields 0, 3, or 4 vertices"),
    }
}

/// Clips `triangle` against all five `planes` in sequence, using `scratch` as the only
/// working memory (no allocation). Returns `(start, count)`: the surviving triangles
/// are `scratch[start..start + count]`.
pub fn clip_triangle(
    triangle: &Triangle,
    planes: &[Plane; 5],
    scratch: &mut [Triangle; CLIP_SCRATCH_CAPACITY],
) -> (usize, usize) {
    scratch[0] = *triangle;
    let mut read_start = 0;
    let mut read_count = 1;
    let mut write_cursor = 1;

    for plane in planes {
        if read_count == 0 {
            break;
        }
        let mut produced = 0;
        for i in 0..read_count {
            let tri = scratch[read_start + i];
            produced += clip_triangle_against_plane(&tri, plane, scratch, write_cursor + produced);
        }
        read_start = write_cursor;
        read_count = produced;
        write_cursor += produced;
    }

    (read_start, read_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Point2;

    fn vertex(point: Vec3) -> Vertex {
        Vertex::new(point, Vec3::unit_z(), Point2::zero())
    }

    fn triangle(a: Vec3, b: Vec3, c: Vec3) -> Triangle {
        Triangle::new([vertex(a), vertex(b), vertex(c)], 0)
    }

    fn new_scratch() -> [Triangle; CLIP_SCRATCH_CAPACITY] {
        [Triangle::new([Vertex::default(); 3], 0); CLIP_SCRATCH_CAPACITY]
    }

    #[test]
    fn triangle_fully_inside_all_planes_is_returned_unchanged() {
        let planes = frustum_planes(1.0, 90f32.to_radians(), 1.0);
        let tri = triangle(
            Vec3::new(-0.05, -0.05, -1.0),
            Vec3::new(0.05, -0.05, -1.0),
            Vec3::new(0.0, 0.05, -1.0),
        );
        let mut scratch = new_scratch();
        let (start, count) = clip_triangle(&tri, &planes, &mut scratch);
        assert_eq!(count, 1);
        assert_eq!(scratch[start].vertices, tri.vertices);
    }

    #[test]
    fn triangle_behind_near_plane_is_fully_clipped() {
        let planes = frustum_planes(1.0, 90f32.to_radians(), 1.0);
        let tri = triangle(
            Vec3::new(-0.1, -0.1, -0.1),
            Vec3::new(0.1, -0.1, -0.1),
            Vec3::new(0.0, 0.1, -0.1),
        );
        let mut scratch = new_scratch();
        let (_start, count) = clip_triangle(&tri, &planes, &mut scratch);
        assert_eq!(count, 0);
    }

    #[test]
    fn triangle_straddling_near_plane_produces_a_clipped_trapezoid() {
        // One vertex behind the near plane (z = -0.5, focal_length = 1.0), two in front.
        let near = Plane::new(Vec3::new(0.0, 0.0, -1.0), -1.0);
        let tri = triangle(
            Vec3::new(0.0, 0.0, -0.5),
            Vec3::new(1.0, 0.0, -2.0),
            Vec3::new(0.0, 1.0, -2.0),
        );
        let mut scratch = new_scratch();
        let mut out_count = 0;
        scratch[0] = tri;
        out_count += clip_triangle_against_plane(&tri, &near, &mut scratch, 1);
        assert_eq!(out_count, 2, "one inside + two outside vertices clip to a quad (two triangles)");
        for tri in &scratch[1..1 + out_count] {
            for vertex in &tri.vertices {
                assert!(near.signed_distance(vertex.point) >= -EPSILON);
            }
        }
    }

    #[test]
    fn clipping_never_exceeds_the_scratch_capacity() {
        let planes = frustum_planes(1.0, 170f32.to_radians(), 1.0);
        let tri = triangle(Vec3::new(-5.0, -5.0, -0.01), Vec3::new(5.0, -5.0, -50.0), Vec3::new(0.0, 5.0, -50.0));
        let mut scratch = new_scratch();
        let (start, count) = clip_triangle(&tri, &planes, &mut scratch);
        assert!(start + count <= CLIP_SCRATCH_CAPACITY);
    }
}
