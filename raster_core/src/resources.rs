//! Registry of materials and textures, keyed by dense opaque IDs. Lives inside a
//! [`crate::Context`] rather than behind a process-wide singleton (see `render.rs`).

use std::path::Path;

use crate::color::Color;
use crate::vector::Point2;

pub type MaterialId = usize;
pub type TextureId = usize;

/// Surface properties for a triangle. `texture_id` defaults to the reserved id 0 (the
/// 1x1 white texture), so an untextured material still samples to white.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Material {
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub shininess: f32,
    pub two_sided: bool,
    pub texture_id: TextureId,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            ambient: Color::WHITE,
            diffuse: Color::WHITE,
            specular: Color::WHITE,
            shininess: 2.0,
            two_sided: false,
            texture_id: 0,
        }
    }
}

/// A decoded or directly-supplied RGB pixel grid. `path` is `Some` only for textures
/// loaded from a file path, which enables the load-path dedup in `push_texture_from_path`.
#[derive(Clone, Debug)]
pub struct Texture {
    path: Option<String>,
    width: usize,
    height: usize,
    /// Row-major, top row first, 3 bytes per pixel.
    pixels: Vec<u8>,
}

impl Texture {
    fn solid(width: usize, height: usize, rgb: [u8; 3]) -> Texture {
        let mut pixels = Vec::with_capacity(width * height * 3);
        for _ in 0..(width * height) {
            pixels.extend_from_slice(&rgb);
        }
        Texture { path: None, width, height, pixels }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn pixel(&self, x: usize, y: usize) -> Color {
        let index = (x + y * self.width) * 3;
        Color::from_u8(self.pixels[index], self.pixels[index + 1], self.pixels[index + 2])
    }
}

/// The only fallible surface in the crate: decoding a texture from bytes or a file path.
/// Public `push_texture_*` operations never propagate this outward — they log it and
/// fall back to texture id 0 (see `try_push_texture_from_bytes` for the raw `Result`).
#[derive(thiserror::Error, Debug)]
pub enum TextureLoadError {
    #[error("failed to read texture file {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },
    #[error("failed to decode texture: {0}")]
    Decode(#[from] image::ImageError),
}

/// Registry of materials and textures. Index 0 in each is a reserved default (white
/// material; 1x1 white texture), inserted at construction.
pub struct ResourceStore {
    materials: Vec<Material>,
    textures: Vec<Texture>,
}

impl Default for ResourceStore {
    fn default() -> ResourceStore {
        ResourceStore::new()
    }
}

impl ResourceStore {
    pub fn new() -> ResourceStore {
        ResourceStore {
            materials: vec![Material::default()],
            textures: vec![Texture::solid(1, 1, [255, 255, 255])],
        }
    }

    pub fn push_material(&mut self, material: Material) -> MaterialId {
        let id = self.materials.len();
        self.materials.push(material);
        id
    }

    /// Registers a texture from a raw RGB pixel grid (row-major, top row first), with
    /// no decoding. The external `SceneLoader` collaborator (out of scope) is expected
    /// to hand textures over in this shape once it has done any needed vertical flip.
    pub fn push_texture_rgb(&mut self, width: usize, height: usize, pixels: Vec<u8>) -> TextureId {
        debug_assert_eq!(pixels.len(), width * height * 3);
        let id = self.textures.len();
        self.textures.push(Texture { path: None, width, height, pixels });
        id
    }

    /// Decodes `bytes` (PNG/JPEG/BMP, auto-detected) into a texture. Returns the raw
    /// decode `Result` rather than silently falling back, for callers that want to
    /// surface the failure themselves.
    pub fn try_push_texture_from_bytes(&mut self, bytes: &[u8]) -> Result<TextureId, TextureLoadError> {
        let decoded = image::load_from_memory(bytes)?.into_rgb8();
        let (width, height) = (decoded.width() as usize, decoded.height() as usize);
        Ok(self.push_texture_rgb(width, height, decoded.into_raw()))
    }

    /// As [`Self::try_push_texture_from_bytes`], but never fails: a decode error is
    /// logged at `warn` and downgraded to the reserved default texture (id 0), matching
    /// the "asset load failure never aborts render" policy.
    pub fn push_texture_from_bytes(&mut self, bytes: &[u8]) -> TextureId {
        match self.try_push_texture_from_bytes(bytes) {
            Ok(id) => id,
            Err(err) => {
                log::warn!("texture decode failed, falling back to default texture: {err}");
                0
            }
        }
    }

    /// Loads a texture from a file path. Returns the existing id if the same path was
    /// already loaded (path-deduplication, matching the original asset cache); falls
    /// back to id 0 on any I/O or decode failure.
    pub fn push_texture_from_path(&mut self, path: impl AsRef<Path>) -> TextureId {
        let path = path.as_ref();
        let path_str = path.to_string_lossy().into_owned();
        if let Some(existing) = self.textures.iter().position(|t| t.path.as_deref() == Some(path_str.as_str())) {
            return existing;
        }
        let load = || -> Result<TextureId, TextureLoadError> {
            let bytes = std::fs::read(path).map_err(|source| TextureLoadError::Io {
                path: path_str.clone(),
                source,
            })?;
            let decoded = image::load_from_memory(&bytes)?.into_rgb8();
            let (width, height) = (decoded.width() as usize, decoded.height() as usize);
            let id = self.textures.len();
            self.textures.push(Texture { path: Some(path_str.clone()), width, height, pixels: decoded.into_raw() });
            Ok(id)
        };
        match load() {
            Ok(id) => id,
            Err(err) => {
                log::warn!("texture load failed, falling back to default texture: {err}");
                0
            }
        }
    }

    pub fn access_material(&self, id: MaterialId) -> &Material {
        debug_assert!(self.has_material(id), "access_material: material must exist");
        &self.materials[id]
    }

    pub fn access_material_mut(&mut self, id: MaterialId) -> &mut Material {
        debug_assert!(self.has_material(id), "access_material_mut: material must exist");
        &mut self.materials[id]
    }

    pub fn has_material(&self, id: MaterialId) -> bool {
        id < self.materials.len()
    }

    pub fn has_texture(&self, id: TextureId) -> bool {
        id < self.textures.len()
    }

    /// Samples `texture_id` at `uv`, wrapping periodically: `(u, v)` maps to integer
    /// pixel `(floor(u*W) mod W, floor(v*H) mod H)` with a positive remainder for
    /// negative inputs.
    pub fn pixel_at_uv(&self, texture_id: TextureId, uv: Point2) -> Color {
        debug_assert!(self.has_texture(texture_id), "pixel_at_uv: texture must exist");
        let texture = &self.textures[texture_id];
        let wrap = |coord: f32, extent: usize| -> usize {
            let scaled = (coord * extent as f32).floor() as i64;
            scaled.rem_euclid(extent as i64) as usize
        };
        let x = wrap(uv.x, texture.width);
        let y = wrap(uv.y, texture.height);
        texture.pixel(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_store_has_white_material_and_texture() {
        let store = ResourceStore::new();
        assert_eq!(*store.access_material(0), Material::default());
        assert_eq!(store.pixel_at_uv(0, Point2::new(0.5, 0.5)), Color::WHITE);
    }

    #[test]
    fn pixel_at_uv_wraps_periodically() {
        let mut store = ResourceStore::new();
        // 2x2 checker: (0,0) and (1,1) black, (1,0) and (0,1) white.
        let pixels = vec![
            0, 0, 0, 255, 255, 255, //
            255, 255, 255, 0, 0, 0,
        ];
        let id = store.push_texture_rgb(2, 2, pixels);
        let base = store.pixel_at_uv(id, Point2::new(0.25, 0.25));
        for k in -2..=2 {
            for l in -2..=2 {
                let shifted = store.pixel_at_uv(id, Point2::new(0.25 + k as f32, 0.25 + l as f32));
                assert_eq!(shifted, base, "k={k} l={l}");
            }
        }
    }

    #[test]
    fn push_texture_from_bytes_falls_back_on_garbage_input() {
        let mut store = ResourceStore::new();
        let id = store.push_texture_from_bytes(b"not an image");
        assert_eq!(id, 0);
    }

    #[test]
    fn push_texture_from_path_falls_back_on_missing_file() {
        let mut store = ResourceStore::new();
        assert_eq!(store.push_texture_from_path("/nonexistent/path.png"), 0);
    }

    #[test]
    fn push_texture_from_path_deduplicates_by_path() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("raster_core_test_{}.png", std::process::id()));
        image::save_buffer(&path, &[255u8, 0, 0, 0, 255, 0], 1, 2, image::ColorType::Rgb8)
            .expect("writing a tiny test PNG must succeed");

        let mut store = ResourceStore::new();
        let first = store.push_texture_from_path(&path);
        let second = store.push_texture_from_path(&path);
        assert_ne!(first, 0);
        assert_eq!(first, second);

        let _ = std::fs::remove_file(&path);
    }
}
