//! The output pixel buffer and its on-disk encoders. Encoding goes through the `image`
//! crate's `RgbImage`/`BmpEncoder` rather than hand-rolled header packing.

use std::path::Path;

/// A row-major, top-row-first 8-bit RGB pixel grid.
pub struct Image {
    width: usize,
    height: usize,
    /// 3 bytes per pixel, row-major, top row first.
    pixels: Vec<u8>,
}

impl Image {
    /// `width` and `height` must both be non-zero (a precondition violation otherwise —
    /// the original contract of "return unchanged on zero dimensions" is replaced here
    /// by failing fast at construction, since there is no meaningful `Image` value to
    /// return for a zero-sized buffer).
    pub fn new(width: usize, height: usize) -> Image {
        assert!(width > 0 && height > 0, "Image::new: width and height must be > 0");
        Image { width, height, pixels: vec![0u8; width * height * 3] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let index = (x + y * self.width) * 3;
        [self.pixels[index], self.pixels[index + 1], self.pixels[index + 2]]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let index = (x + y * self.width) * 3;
        self.pixels[index..index + 3].copy_from_slice(&rgb);
    }

    /// The raw row-major RGB8 pixel buffer, for the tiled rasterizer dispatch in
    /// `draw.rs` to write into directly.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    fn to_rgb_image(&self) -> image::RgbImage {
        image::RgbImage::from_raw(self.width as u32, self.height as u32, self.pixels.clone())
            .expect("Image::to_rgb_image: buffer length must match width*height*3")
    }

    /// Writes a 24-bit uncompressed BMP (bottom-left origin, rows bottom-to-top,
    /// 4-byte row padding) via the `image` crate's BMP encoder.
    pub fn save_bmp(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        self.to_rgb_image().save_with_format(path, image::ImageFormat::Bmp)
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        self.to_rgb_image().save_with_format(path, image::ImageFormat::Png)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "width and height")]
    fn rejects_zero_dimensions() {
        Image::new(0, 10);
    }

    #[test]
    fn new_image_starts_all_black() {
        let image = Image::new(4, 4);
        assert_eq!(image.get_pixel(2, 2), [0, 0, 0]);
    }

    #[test]
    fn set_pixel_then_get_pixel_round_trips() {
        let mut image = Image::new(4, 4);
        image.set_pixel(1, 2, [10, 20, 30]);
        assert_eq!(image.get_pixel(1, 2), [10, 20, 30]);
        // Neighboring pixels are untouched.
        assert_eq!(image.get_pixel(1, 1), [0, 0, 0]);
    }
}
