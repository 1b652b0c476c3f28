//! Per-light and material parameters of the fixed-function lighting model.

/// Number of light slots the recorder and the shader support.
pub const MAX_LIGHTS: usize = 2;

pub type Rgba = [f32; 4];

/// Distance attenuation `1 / (constant + linear·d + quadratic·d²)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.0,
            quadratic: 0.0,
        }
    }
}

/// A single parameter assignment for one light, mirroring `glLight`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightParameter {
    Ambient(Rgba),
    Diffuse(Rgba),
    Specular(Rgba),
    /// Object-space position; `w == 0` makes the light directional.
    Position([f32; 4]),
    ConstantAttenuation(f32),
    LinearAttenuation(f32),
    QuadraticAttenuation(f32),
}

/// Current state of one light slot.
///
/// `eye_position` is already transformed by the model-view matrix that was
/// current when the position was assigned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightParams {
    pub ambient: Rgba,
    pub diffuse: Rgba,
    pub specular: Rgba,
    pub eye_position: [f32; 4],
    pub attenuation: Attenuation,
}

impl LightParams {
    /// Defaults of a freshly created context. Slot 0 starts white, the others dark.
    pub fn for_slot(slot: usize) -> Self {
        let bright = if slot == 0 { [1.0; 4] } else { [0.0, 0.0, 0.0, 1.0] };
        Self {
            ambient: [0.0, 0.0, 0.0, 1.0],
            diffuse: bright,
            specular: bright,
            eye_position: [0.0, 0.0, 1.0, 0.0],
            attenuation: Attenuation::default(),
        }
    }
}

/// Material parameters for front and back faces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: Rgba,
    pub diffuse: Rgba,
    pub specular: Rgba,
    pub emission: Rgba,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: [0.2, 0.2, 0.2, 1.0],
            diffuse: [0.8, 0.8, 0.8, 1.0],
            specular: [0.0, 0.0, 0.0, 1.0],
            emission: [0.0, 0.0, 0.0, 1.0],
            shininess: 0.0,
        }
    }
}

/// A single parameter assignment for the material, mirroring `glMaterial`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialParameter {
    Ambient(Rgba),
    Diffuse(Rgba),
    Specular(Rgba),
    Emission(Rgba),
    Shininess(f32),
}

/// Converts 8-bit sRGB-style channel values to the `[0, 1]` floats the
/// recorder works with.
pub const fn rgb8(r: u8, g: u8, b: u8) -> Rgba {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}
