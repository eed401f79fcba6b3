//! Linear RGB color, used for materials, lights, and shaded pixel values (channels in
//! `[0, 1]` until the final 8-bit pixel write).

use std::ops;

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Color {
        Color { r, g, b }
    }

    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

    /// Builds a color from 8-bit channels (`[0, 255]`), used when sampling textures.
    pub fn from_u8(r: u8, g: u8, b: u8) -> Color {
        Color::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Clamps each channel to `[0, 1]` and scales to `[0, 255]`, the last step before a
    /// pixel is written into the output image.
    pub fn to_u8(self) -> [u8; 3] {
        let clamp = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [clamp(self.r), clamp(self.g), clamp(self.b)]
    }
}

impl ops::Add<Color> for Color {
    type Output = Color;
    fn add(self, rhs: Color) -> Color {
        Color::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl ops::AddAssign<Color> for Color {
    fn add_assign(&mut self, rhs: Color) {
        self.r += rhs.r;
        self.g += rhs.g;
        self.b += rhs.b;
    }
}

impl ops::Mul<Color> for Color {
    type Output = Color;
    fn mul(self, rhs: Color) -> Color {
        Color::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl ops::Mul<f32> for Color {
    type Output = Color;
    fn mul(self, s: f32) -> Color {
        Color::new(self.r * s, self.g * s, self.b * s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_u8_clamps_out_of_range_channels() {
        let c = Color::new(1.5, -0.5, 0.5);
        assert_eq!(c.to_u8(), [255, 0, 128]);
    }

    #[test]
    fn from_u8_round_trips_white() {
        assert_eq!(Color::from_u8(255, 255, 255), Color::WHITE);
    }
}
