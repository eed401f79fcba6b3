//! Minimal demo: builds a four-face pyramid, points a camera at it, and renders a BMP.

use raster_core::{Camera, Context, Image, Point2, Point3, RenderFlags, Scene, Triangle, Vec3, Vertex};

fn face(a: Point3, b: Point3, c: Point3) -> Triangle {
    let normal = (b - a).cross(&(c - a)).normalized();
    Triangle::new(
        [
            Vertex::new(a, normal, Point2::zero()),
            Vertex::new(b, normal, Point2::new(1.0, 0.0)),
            Vertex::new(c, normal, Point2::new(0.0, 1.0)),
        ],
        0,
    )
}

fn main() {
    env_logger::init();

    let a = Point3::new(0.0, 0.0, 0.0);
    let b = Point3::new(1.0, 0.0, 0.0);
    let c = Point3::new(0.0, 1.5, 0.0);
    let d = Point3::new(0.0, 0.0, 2.0);

    let faces = [face(a, c, b), face(b, c, d), face(a, b, d), face(a, d, c)];

    let mut scene = Scene::new();
    scene.push_object(&faces);

    let camera = Camera::look_at(Point3::new(2.0, 2.0, 2.0), Point3::zero(), 90.0, 1.0);
    let camera_id = scene.push_camera(camera);

    let mut ctx = Context::new();
    let mut image = Image::new(1280, 720);
    raster_core::render(&mut ctx, &scene, camera_id, &mut image, RenderFlags::DRAW_FACETS);

    let path = "pyramid.bmp";
    if let Err(err) = image.save_bmp(path) {
        log::error!("failed to write {path}: {err}");
        std::process::exit(1);
    }
    log::info!("wrote {path}");
}
