//! GPU-compatible uniform block for `preview.wgsl`.
//!
//! Everything is packed into `vec4<f32>` slots so the Rust and WGSL layouts
//! agree without manual padding.

use bytemuck::{Pod, Zeroable};
use glint_core::look::HueBand;
use glint_core::pipeline::StageInputs;

/// Mirror of `LookUniforms` in `preview.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LookUniforms {
    /// temperature, tint, exposure, contrast
    pub tone0: [f32; 4],
    /// highlights, shadows, whites, blacks
    pub tone1: [f32; 4],
    /// texture, clarity, dehaze, _
    pub presence: [f32; 4],
    /// saturation, vibrance, grading balance, grading blending
    pub color: [f32; 4],
    pub grading: [[f32; 4]; 3],
    pub hsl: [[f32; 4]; 8],
    /// Band center and half-width in degrees.
    pub bands: [[f32; 4]; 8],
    pub calibration: [[f32; 4]; 3],
    /// shadow tint, lut opacity, lut levels, lut tiles
    pub misc: [f32; 4],
    /// curve active, cinematic tone map, lut active, _
    pub flags: [f32; 4],
}

/// Per-frame texture state the shader needs to know about.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextureState {
    pub curve_active: bool,
    /// `(levels, tiles)` of the bound cube LUT, if any.
    pub cube: Option<(u32, u32)>,
}

fn flag(on: bool) -> f32 {
    if on { 1.0 } else { 0.0 }
}

impl LookUniforms {
    pub fn new(inputs: &StageInputs, textures: TextureState) -> Self {
        let (levels, tiles) = textures.cube.unwrap_or((0, 0));
        Self {
            tone0: [inputs.temperature, inputs.tint, inputs.exposure, inputs.contrast],
            tone1: [inputs.highlights, inputs.shadows, inputs.whites, inputs.blacks],
            presence: [inputs.texture, inputs.clarity, inputs.dehaze, 0.0],
            color: [
                inputs.saturation,
                inputs.vibrance,
                inputs.grading_balance,
                inputs.grading_blending,
            ],
            grading: inputs
                .grading
                .map(|z| [z.hue, z.saturation, z.luminance, 0.0]),
            hsl: inputs.hsl.map(|b| [b.hue, b.saturation, b.luminance, 0.0]),
            bands: HueBand::ALL.map(|b| [b.center_degrees(), b.half_width_degrees(), 0.0, 0.0]),
            calibration: inputs.calibration.map(|p| [p.hue, p.saturation, 0.0, 0.0]),
            misc: [
                inputs.shadow_tint,
                inputs.lut_opacity,
                levels as f32,
                tiles as f32,
            ],
            flags: [
                flag(textures.curve_active),
                flag(inputs.cinematic_tone_map),
                flag(textures.cube.is_some()),
                0.0,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::Look;

    #[test]
    fn test_uniform_size_is_vec4_aligned() {
        let size = std::mem::size_of::<LookUniforms>();
        assert_eq!(size % 16, 0);
        assert_eq!(size, 28 * 16);
    }

    #[test]
    fn test_neutral_look_packs_zero_controls() {
        let u = LookUniforms::new(&StageInputs::from_look(&Look::neutral()), TextureState::default());
        assert_eq!(u.tone0, [0.0; 4]);
        assert_eq!(u.tone1, [0.0; 4]);
        assert_eq!(u.color[3], 0.5, "blending is neutral at 0.5");
        assert_eq!(u.flags, [0.0; 4]);
        assert_eq!(u.bands[HueBand::Blue.index()][0], 240.0);
    }

    #[test]
    fn test_cube_state_packs_geometry() {
        let mut look = Look::neutral();
        look.rendering.lut_opacity = 0.8;
        let u = LookUniforms::new(
            &StageInputs::from_look(&look),
            TextureState {
                curve_active: true,
                cube: Some((64, 8)),
            },
        );
        assert_eq!(u.misc, [0.0, 0.8, 64.0, 8.0]);
        assert_eq!(u.flags, [1.0, 0.0, 1.0, 0.0]);
    }
}
