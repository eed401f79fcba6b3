//! A multithreaded CPU software rasterizer: a small linear-algebra kernel, a scene
//! model of flat-stored triangles, a frustum clipper, and a row-banded rasterizer
//! dispatched across a fixed worker pool.

pub mod camera;
pub mod clip;
pub mod color;
pub mod draw;
pub mod image;
pub mod light;
pub mod matrix;
pub mod pool;
pub mod raster;
pub mod render;
pub mod resources;
pub mod scene;
pub mod vector;

pub use camera::Camera;
pub use color::Color;
pub use image::Image;
pub use light::{AmbientLight, Attenuation, DirectionalLight, Light, PointLight, SpotLight};
pub use matrix::{Mat3, Mat4};
pub use pool::Pool;
pub use render::{render, Context, RenderFlags};
pub use resources::{Material, ResourceStore, Texture, TextureLoadError};
pub use scene::{Scene, SceneObject, Triangle, Vertex};
pub use vector::{Point2, Point3, Vec3, Vec4};
