//! The per-pixel adjustment pipeline.
//!
//! [`Stage::ORDER`] is the single definition of stage order. The WGSL
//! fragment program in `glint-gpu` calls its `stage_*` functions in the same
//! order, and [`evaluate_pixel`] is the CPU reference the GPU output is
//! checked against.

pub mod color;
pub mod cube;
pub mod inputs;
pub mod stages;

use glam::Vec3;

use crate::curves::{CurveLut, build_curve_lut};
use crate::image::SourceImage;
use crate::look::Look;

pub use cube::TiledCubeLut;
pub use inputs::StageInputs;

/// Textures a stage may read besides the pixel itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageResources<'a> {
    /// Tone-curve LUT. `None` means identity.
    pub curve: Option<&'a CurveLut>,
    /// External 3-D LUT. `None` means the stage is skipped.
    pub cube: Option<&'a TiledCubeLut>,
}

/// One step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    WhiteBalance,
    Exposure,
    Contrast,
    Highlights,
    Shadows,
    WhitesBlacks,
    ToneCurve,
    HslBands,
    ColorGrading,
    Presence,
    SaturationVibrance,
    Calibration,
    ExternalLut,
    CinematicToneMap,
}

impl Stage {
    /// Execution order.
    pub const ORDER: [Stage; 14] = [
        Stage::WhiteBalance,
        Stage::Exposure,
        Stage::Contrast,
        Stage::Highlights,
        Stage::Shadows,
        Stage::WhitesBlacks,
        Stage::ToneCurve,
        Stage::HslBands,
        Stage::ColorGrading,
        Stage::Presence,
        Stage::SaturationVibrance,
        Stage::Calibration,
        Stage::ExternalLut,
        Stage::CinematicToneMap,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::WhiteBalance => "white balance",
            Self::Exposure => "exposure",
            Self::Contrast => "contrast",
            Self::Highlights => "highlights",
            Self::Shadows => "shadows",
            Self::WhitesBlacks => "whites/blacks",
            Self::ToneCurve => "tone curve",
            Self::HslBands => "hsl",
            Self::ColorGrading => "color grading",
            Self::Presence => "presence",
            Self::SaturationVibrance => "saturation/vibrance",
            Self::Calibration => "calibration",
            Self::ExternalLut => "external lut",
            Self::CinematicToneMap => "cinematic tone map",
        }
    }

    /// Name of the WGSL function implementing this stage.
    pub const fn shader_entry(self) -> &'static str {
        match self {
            Self::WhiteBalance => "stage_white_balance",
            Self::Exposure => "stage_exposure",
            Self::Contrast => "stage_contrast",
            Self::Highlights => "stage_highlights",
            Self::Shadows => "stage_shadows",
            Self::WhitesBlacks => "stage_whites_blacks",
            Self::ToneCurve => "stage_tone_curve",
            Self::HslBands => "stage_hsl",
            Self::ColorGrading => "stage_color_grading",
            Self::Presence => "stage_presence",
            Self::SaturationVibrance => "stage_saturation_vibrance",
            Self::Calibration => "stage_calibration",
            Self::ExternalLut => "stage_external_lut",
            Self::CinematicToneMap => "stage_cinematic_tone_map",
        }
    }

    /// Whether the stage would change any pixel. The shader uses the same
    /// gates, so skipping an inactive stage is exact.
    pub fn is_active(self, inputs: &StageInputs, resources: &StageResources<'_>) -> bool {
        match self {
            Self::WhiteBalance => inputs.temperature != 0.0 || inputs.tint != 0.0,
            Self::Exposure => inputs.exposure != 0.0,
            Self::Contrast => inputs.contrast != 0.0,
            Self::Highlights => inputs.highlights != 0.0,
            Self::Shadows => inputs.shadows != 0.0,
            Self::WhitesBlacks => inputs.whites != 0.0 || inputs.blacks != 0.0,
            Self::ToneCurve => resources.curve.is_some_and(|lut| !lut.is_identity()),
            Self::HslBands => inputs.hsl_active(),
            Self::ColorGrading => inputs.grading_active(),
            Self::Presence => {
                inputs.texture != 0.0 || inputs.clarity != 0.0 || inputs.dehaze != 0.0
            }
            Self::SaturationVibrance => inputs.saturation != 0.0 || inputs.vibrance != 0.0,
            Self::Calibration => inputs.calibration_active(),
            Self::ExternalLut => resources.cube.is_some() && inputs.lut_opacity > 0.0,
            Self::CinematicToneMap => inputs.cinematic_tone_map,
        }
    }

    /// CPU implementation of this stage. Callers check [`Stage::is_active`] first.
    pub fn apply(self, rgb: Vec3, inputs: &StageInputs, resources: &StageResources<'_>) -> Vec3 {
        match self {
            Self::WhiteBalance => stages::white_balance(rgb, inputs.temperature, inputs.tint),
            Self::Exposure => stages::exposure(rgb, inputs.exposure),
            Self::Contrast => stages::contrast(rgb, inputs.contrast),
            Self::Highlights => stages::highlights(rgb, inputs.highlights),
            Self::Shadows => stages::shadows(rgb, inputs.shadows),
            Self::WhitesBlacks => stages::whites_blacks(rgb, inputs.whites, inputs.blacks),
            Self::ToneCurve => match resources.curve {
                Some(lut) => stages::tone_curve(rgb, lut),
                None => rgb,
            },
            Self::HslBands => stages::hsl_bands(rgb, &inputs.hsl),
            Self::ColorGrading => stages::color_grading(
                rgb,
                &inputs.grading,
                inputs.grading_balance,
                inputs.grading_blending,
            ),
            Self::Presence => {
                stages::presence(rgb, inputs.texture, inputs.clarity, inputs.dehaze)
            }
            Self::SaturationVibrance => {
                stages::saturation_vibrance(rgb, inputs.saturation, inputs.vibrance)
            }
            Self::Calibration => {
                stages::calibration(rgb, &inputs.calibration, inputs.shadow_tint)
            }
            Self::ExternalLut => match resources.cube {
                Some(cube) => stages::external_lut(rgb, cube, inputs.lut_opacity),
                None => rgb,
            },
            Self::CinematicToneMap => stages::cinematic_tone_map(rgb),
        }
    }
}

/// Run `stages` in the given order, skipping inactive ones, then clamp to 0..1.
pub fn evaluate_stages(
    stages: &[Stage],
    rgb: Vec3,
    inputs: &StageInputs,
    resources: &StageResources<'_>,
) -> Vec3 {
    stages
        .iter()
        .filter(|stage| stage.is_active(inputs, resources))
        .fold(rgb, |acc, stage| stage.apply(acc, inputs, resources))
        .clamp(Vec3::ZERO, Vec3::ONE)
}

/// Run the full pipeline on one pixel.
pub fn evaluate_pixel(rgb: Vec3, inputs: &StageInputs, resources: &StageResources<'_>) -> Vec3 {
    evaluate_stages(&Stage::ORDER, rgb, inputs, resources)
}

/// Render a whole image with the CPU reference. Alpha passes through.
pub fn evaluate_image(
    source: &SourceImage,
    look: &Look,
    cube: Option<&TiledCubeLut>,
) -> SourceImage {
    let inputs = StageInputs::from_look(look);
    let curve = look.tone_curve.has_data().then(|| build_curve_lut(&look.tone_curve));
    let resources = StageResources {
        curve: curve.as_ref(),
        cube,
    };

    let pixels = source
        .pixels
        .iter()
        .map(|&[r, g, b, a]| {
            let rgb = Vec3::new(r as f32, g as f32, b as f32) / 255.0;
            let out = evaluate_pixel(rgb, &inputs, &resources) * 255.0;
            [
                out.x.round() as u8,
                out.y.round() as u8,
                out.z.round() as u8,
                a,
            ]
        })
        .collect();

    SourceImage {
        width: source.width,
        height: source.height,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::color::{luma, rgb_to_hsl, spread};
    use super::*;
    use crate::look::{CurvePoint, HueBand};

    const EPSILON: f32 = 1e-5;

    fn run(look: &Look, rgb: Vec3) -> Vec3 {
        let inputs = StageInputs::from_look(look);
        let curve = look.tone_curve.has_data().then(|| build_curve_lut(&look.tone_curve));
        let resources = StageResources {
            curve: curve.as_ref(),
            cube: None,
        };
        evaluate_pixel(rgb, &inputs, &resources)
    }

    fn hsv_saturation(rgb: Vec3) -> f32 {
        spread(rgb) / rgb.max_element().max(1e-6)
    }

    #[test]
    fn test_order_has_fourteen_distinct_stages() {
        assert_eq!(Stage::ORDER.len(), 14);
        assert_eq!(Stage::ORDER[0], Stage::WhiteBalance);
        assert_eq!(Stage::ORDER[6], Stage::ToneCurve);
        assert_eq!(Stage::ORDER[13], Stage::CinematicToneMap);
        for (i, a) in Stage::ORDER.iter().enumerate() {
            for b in &Stage::ORDER[i + 1..] {
                assert_ne!(a, b);
                assert_ne!(a.shader_entry(), b.shader_entry());
            }
        }
    }

    #[test]
    fn test_neutral_look_is_identity() {
        let look = Look::neutral();
        let inputs = StageInputs::from_look(&look);
        let resources = StageResources::default();
        assert!(
            Stage::ORDER
                .iter()
                .all(|s| !s.is_active(&inputs, &resources))
        );
        for rgb in [
            Vec3::ZERO,
            Vec3::ONE,
            Vec3::new(0.2, 0.5, 0.8),
            Vec3::new(0.96, 0.95, 0.93),
        ] {
            assert!((run(&look, rgb) - rgb).abs().max_element() < EPSILON);
        }
    }

    #[test]
    fn test_neutral_image_roundtrips_bytes() {
        let source = SourceImage {
            width: 2,
            height: 2,
            pixels: vec![[0, 0, 0, 255], [255, 255, 255, 128], [12, 200, 77, 0], [128, 128, 128, 255]],
        };
        let out = evaluate_image(&source, &Look::neutral(), None);
        assert_eq!(out, source);
    }

    #[test]
    fn test_identity_curve_is_identity() {
        let mut look = Look::neutral();
        look.tone_curve.composite = vec![CurvePoint::new(0.0, 0.0), CurvePoint::new(255.0, 255.0)];
        let rgb = Vec3::new(0.3, 0.6, 0.9);
        assert!((run(&look, rgb) - rgb).abs().max_element() < 1e-4);
    }

    #[test]
    fn test_contrast_pivot_invariance() {
        let source = SourceImage {
            width: 3,
            height: 1,
            pixels: vec![[128, 128, 128, 255]; 3],
        };
        let mut look = Look::neutral();
        for c in [-100.0, -50.0, -40.0, 35.0, 50.0, 100.0] {
            look.tone.contrast = c;
            assert_eq!(evaluate_image(&source, &look, None), source, "contrast {c}");
        }
    }

    #[test]
    fn test_highlight_recovery_on_clipped_white() {
        let mut look = Look::neutral();
        look.tone.highlights = -100.0;
        let out = run(&look, Vec3::ONE);
        assert!(luma(out) < 1.0, "luma = {}", luma(out));
    }

    #[test]
    fn test_highlight_recovery_preserves_near_white_hue() {
        let mut look = Look::neutral();
        look.tone.highlights = -100.0;
        let rgb = Vec3::new(0.96, 0.95, 0.93);
        let out = run(&look, rgb);
        let hue_in = rgb_to_hsl(rgb).x;
        let hue_out = rgb_to_hsl(out).x;
        assert!((hue_in - hue_out).abs() < 3.0, "hue {hue_in} -> {hue_out}");
        assert!(
            (hsv_saturation(rgb) - hsv_saturation(out)).abs() < 0.01,
            "saturation {} -> {}",
            hsv_saturation(rgb),
            hsv_saturation(out)
        );
    }

    #[test]
    fn test_hsl_band_isolation() {
        let mut look = Look::neutral();
        look.hsl.get_mut(HueBand::Red).saturation = 100.0;

        let green = Vec3::new(0.0, 1.0, 0.0);
        assert!((run(&look, green) - green).abs().max_element() < 1e-4);

        let muted_red = Vec3::new(0.7, 0.35, 0.35);
        let out = run(&look, muted_red);
        assert!(spread(out) > spread(muted_red));
    }

    #[test]
    fn test_reordering_changes_result() {
        let mut look = Look::neutral();
        look.tone.exposure = 1.0;
        look.tone.contrast = 60.0;
        let inputs = StageInputs::from_look(&look);
        let resources = StageResources::default();
        let rgb = Vec3::splat(0.3);

        let ordered = evaluate_stages(&Stage::ORDER, rgb, &inputs, &resources);
        let mut swapped = Stage::ORDER;
        swapped.swap(1, 2);
        let reordered = evaluate_stages(&swapped, rgb, &inputs, &resources);
        assert!((ordered - reordered).abs().max_element() > 0.01);
    }

    #[test]
    fn test_inserted_stage_runs_in_position() {
        let mut look = Look::neutral();
        look.rendering.cinematic_tone_map = true;
        let inputs = StageInputs::from_look(&look);
        let resources = StageResources::default();
        let once = evaluate_stages(&[Stage::CinematicToneMap], Vec3::splat(0.5), &inputs, &resources);
        let twice = evaluate_stages(
            &[Stage::CinematicToneMap, Stage::CinematicToneMap],
            Vec3::splat(0.5),
            &inputs,
            &resources,
        );
        assert!((once - twice).abs().max_element() > 0.01);
    }

    #[test]
    fn test_output_is_clamped() {
        let mut look = Look::neutral();
        look.tone.exposure = 5.0;
        let out = run(&look, Vec3::splat(0.8));
        assert_eq!(out, Vec3::ONE);
    }

    #[test]
    fn test_external_lut_opacity_mixes() {
        let mut look = Look::neutral();
        look.rendering.lut_opacity = 0.5;
        let inputs = StageInputs::from_look(&look);
        let cube = TiledCubeLut::identity(2);
        let resources = StageResources {
            curve: None,
            cube: Some(&cube),
        };
        assert!(Stage::ExternalLut.is_active(&inputs, &resources));
        let rgb = Vec3::new(0.25, 0.5, 0.75);
        let out = evaluate_pixel(rgb, &inputs, &resources);
        assert!((out - rgb).abs().max_element() < 2.0 / 255.0);
    }
}
