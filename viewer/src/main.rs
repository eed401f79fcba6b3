//! A small CLI front-end for `raster_core`: builds a three-cube scene lit by one of
//! each light variant and renders it to an image file.

use clap::{Parser, ValueEnum};
use raster_core::{
    AmbientLight, Camera, Color, Context, DirectionalLight, Image, Light, Point2, Point3,
    PointLight, RenderFlags, Scene, SpotLight, Triangle, Vec3, Vertex,
};

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Bmp,
    Png,
}

/// Renders a small multi-object, multi-light demo scene to an image file.
#[derive(Parser)]
struct Args {
    #[arg(long, default_value_t = 1280)]
    width: usize,
    #[arg(long, default_value_t = 720)]
    height: usize,
    #[arg(long, value_enum, default_value_t = OutputFormat::Bmp)]
    format: OutputFormat,
    #[arg(long, default_value = "scene")]
    out: String,
    #[arg(long)]
    edges: bool,
    #[arg(long)]
    no_lighting: bool,
    #[arg(long, default_value_t = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))]
    threads: usize,
}

fn cube_faces() -> Vec<Triangle> {
    let corners = [
        Point3::new(-1.0, -1.0, -1.0),
        Point3::new(1.0, -1.0, -1.0),
        Point3::new(1.0, 1.0, -1.0),
        Point3::new(-1.0, 1.0, -1.0),
        Point3::new(-1.0, -1.0, 1.0),
        Point3::new(1.0, -1.0, 1.0),
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(-1.0, 1.0, 1.0),
    ];
    // Each entry is one outward-facing quad, split into two triangles.
    let quads: [[usize; 4]; 6] = [
        [0, 1, 2, 3], // -z
        [5, 4, 7, 6], // +z
        [4, 0, 3, 7], // -x
        [1, 5, 6, 2], // +x
        [4, 5, 1, 0], // -y
        [3, 2, 6, 7], // +y
    ];

    let mut faces = Vec::with_capacity(12);
    for quad in quads {
        let uvs = [Point2::zero(), Point2::new(1.0, 0.0), Point2::new(1.0, 1.0), Point2::new(0.0, 1.0)];
        for &(i0, i1, i2) in &[(0, 1, 2), (0, 2, 3)] {
            let (a, b, c) = (corners[quad[i0]], corners[quad[i1]], corners[quad[i2]]);
            let normal = (b - a).cross(&(c - a)).normalized();
            faces.push(Triangle::new(
                [
                    Vertex::new(a, normal, uvs[i0]),
                    Vertex::new(b, normal, uvs[i1]),
                    Vertex::new(c, normal, uvs[i2]),
                ],
                0,
            ));
        }
    }
    faces
}

fn build_scene() -> (Scene, raster_core::scene::CameraId) {
    let cube = cube_faces();
    let mut scene = Scene::new();

    scene.push_object(&cube);

    let second = scene.push_object(&cube);
    scene.access_object(second).position = Point3::new(2.0, 2.0, 0.0);

    let third = scene.push_object(&cube);
    scene.access_object(third).position = Point3::new(-2.0, -2.0, 0.0);
    scene.access_object(third).z_angle = 45.0;

    let camera = Camera::look_at(Point3::new(4.0, -4.0, 3.0), Point3::zero(), 90.0, 1.0);
    let camera_id = scene.push_camera(camera);

    scene.push_light(Light::Ambient(AmbientLight::default()));
    scene.push_light(Light::Directional(DirectionalLight {
        strength: 0.3,
        color: Color::new(1.0, 0.0, 0.0),
        direction: Vec3::new(-1.0, -1.0, -1.0),
    }));
    scene.push_light(Light::Point(PointLight {
        strength: 5.0,
        color: Color::new(0.0, 0.0, 1.0),
        position: Point3::new(5.0, -2.0, 3.0),
        ..PointLight::default()
    }));
    scene.push_light(Light::Spot(SpotLight {
        strength: 5.0,
        position: Point3::new(4.0, -4.0, 3.0),
        exponent: 1,
        direction: Vec3::new(-4.0, 4.0, -3.0),
        ..SpotLight::default()
    }));

    (scene, camera_id)
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let (scene, camera_id) = build_scene();
    let mut ctx = Context::with_thread_count(args.threads.max(1));
    let mut image = Image::new(args.width, args.height);

    let mut flags = RenderFlags::DRAW_FACETS;
    if args.edges {
        flags |= RenderFlags::DRAW_EDGES;
    }
    if !args.no_lighting {
        flags |= RenderFlags::ENABLE_LIGHT;
    }

    raster_core::render(&mut ctx, &scene, camera_id, &mut image, flags);

    let result = match args.format {
        OutputFormat::Bmp => image.save_bmp(format!("{}.bmp", args.out)),
        OutputFormat::Png => image.save_png(format!("{}.png", args.out)),
    };
    if let Err(err) = result {
        log::error!("failed to write output image: {err}");
        std::process::exit(1);
    }
}
