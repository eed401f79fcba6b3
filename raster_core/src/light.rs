//! Light sources, kept as a tagged sum type (see `DESIGN NOTES` — shading is a match
//! across the four variants rather than a trait object).

use crate::color::Color;
use crate::vector::{Point3, Vec3};

/// Distance-based falloff shared by `Point` and `Spot` lights:
/// `falloff = 1 / (constant + linear*d + quadratic*d^2)`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Attenuation {
        Attenuation { constant: 1.0, linear: 0.35, quadratic: 0.44 }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct AmbientLight {
    pub strength: f32,
    pub color: Color,
}

impl Default for AmbientLight {
    fn default() -> AmbientLight {
        AmbientLight { strength: 0.1, color: Color::WHITE }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct DirectionalLight {
    pub strength: f32,
    pub color: Color,
    pub direction: Vec3,
}

impl Default for DirectionalLight {
    fn default() -> DirectionalLight {
        DirectionalLight { strength: 1.0, color: Color::WHITE, direction: Vec3::new(0.0, 0.0, -1.0) }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PointLight {
    pub strength: f32,
    pub color: Color,
    pub attenuation: Attenuation,
    pub position: Point3,
}

impl Default for PointLight {
    fn default() -> PointLight {
        PointLight {
            strength: 1.0,
            color: Color::WHITE,
            attenuation: Attenuation::default(),
            position: Vec3::zero(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SpotLight {
    pub strength: f32,
    pub color: Color,
    pub attenuation: Attenuation,
    pub position: Point3,
    pub exponent: i32,
    pub direction: Vec3,
}

impl Default for SpotLight {
    fn default() -> SpotLight {
        SpotLight {
            strength: 1.0,
            color: Color::WHITE,
            attenuation: Attenuation::default(),
            position: Vec3::zero(),
            exponent: 1,
            direction: Vec3::new(0.0, 0.0, -1.0),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Light {
    Ambient(AmbientLight),
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(SpotLight),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_and_spot_share_default_attenuation() {
        assert_eq!(PointLight::default().attenuation, SpotLight::default().attenuation);
        assert_eq!(Attenuation::default(), Attenuation { constant: 1.0, linear: 0.35, quadratic: 0.44 });
    }
}
