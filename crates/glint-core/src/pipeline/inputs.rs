//! Normalization of a [`Look`] into shader units.
//!
//! Sliders authored on −100..+100 become −1..+1, zone saturation becomes
//! 0..1, blending becomes 0..1. Non-finite values collapse to neutral so a
//! bad slider never poisons a frame with NaN.

use crate::look::{HueBand, Look};

/// One color-grading zone in shader units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ZoneInputs {
    /// Degrees, 0..360.
    pub hue: f32,
    /// 0..1.
    pub saturation: f32,
    /// −1..1.
    pub luminance: f32,
}

/// One HSL band in shader units (each −1..1).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BandInputs {
    pub hue: f32,
    pub saturation: f32,
    pub luminance: f32,
}

impl BandInputs {
    fn is_zero(&self) -> bool {
        self.hue == 0.0 && self.saturation == 0.0 && self.luminance == 0.0
    }
}

/// One calibration primary in shader units (each −1..1).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PrimaryInputs {
    pub hue: f32,
    pub saturation: f32,
}

/// Per-frame stage inputs. The GPU uniform block is packed from this.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageInputs {
    pub temperature: f32,
    pub tint: f32,
    /// EV, −5..5.
    pub exposure: f32,
    pub contrast: f32,
    pub highlights: f32,
    pub shadows: f32,
    pub whites: f32,
    pub blacks: f32,
    pub texture: f32,
    pub clarity: f32,
    pub dehaze: f32,
    pub saturation: f32,
    pub vibrance: f32,
    /// Shadows, midtones, highlights.
    pub grading: [ZoneInputs; 3],
    pub grading_balance: f32,
    /// 0..1, 0.5 = neutral.
    pub grading_blending: f32,
    pub hsl: [BandInputs; 8],
    /// Red, green, blue primaries.
    pub calibration: [PrimaryInputs; 3],
    pub shadow_tint: f32,
    pub cinematic_tone_map: bool,
    /// 0..1.
    pub lut_opacity: f32,
}

impl Default for StageInputs {
    fn default() -> Self {
        Self::from_look(&Look::neutral())
    }
}

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}

/// Map a −100..+100 slider to −1..+1.
fn slider(v: f32) -> f32 {
    (finite_or_zero(v) / 100.0).clamp(-1.0, 1.0)
}

/// Map a 0..100 amount to 0..1.
fn amount(v: f32) -> f32 {
    (finite_or_zero(v) / 100.0).clamp(0.0, 1.0)
}

impl StageInputs {
    pub fn from_look(look: &Look) -> Self {
        let grading = &look.color_grading;
        let zone = |z: &crate::look::GradeZone| ZoneInputs {
            hue: crate::pipeline::color::wrap_hue(finite_or_zero(z.hue)),
            saturation: amount(z.saturation),
            luminance: slider(z.luminance),
        };
        let blending = if grading.blending.is_finite() {
            amount(grading.blending)
        } else {
            0.5
        };

        let hsl = HueBand::ALL.map(|band| {
            let b = look.hsl.get(band);
            BandInputs {
                hue: slider(b.hue),
                saturation: slider(b.saturation),
                luminance: slider(b.luminance),
            }
        });

        let cal = &look.calibration;
        let primary = |p: &crate::look::PrimaryShift| PrimaryInputs {
            hue: slider(p.hue),
            saturation: slider(p.saturation),
        };

        Self {
            temperature: slider(look.white_balance.temperature),
            tint: slider(look.white_balance.tint),
            exposure: finite_or_zero(look.tone.exposure).clamp(-5.0, 5.0),
            contrast: slider(look.tone.contrast),
            highlights: slider(look.tone.highlights),
            shadows: slider(look.tone.shadows),
            whites: slider(look.tone.whites),
            blacks: slider(look.tone.blacks),
            texture: slider(look.presence.texture),
            clarity: slider(look.presence.clarity),
            dehaze: slider(look.presence.dehaze),
            saturation: slider(look.color.saturation),
            vibrance: slider(look.color.vibrance),
            grading: [
                zone(&grading.shadows),
                zone(&grading.midtones),
                zone(&grading.highlights),
            ],
            grading_balance: slider(grading.balance),
            grading_blending: blending,
            hsl,
            calibration: [primary(&cal.red), primary(&cal.green), primary(&cal.blue)],
            shadow_tint: slider(cal.shadow_tint),
            cinematic_tone_map: look.rendering.cinematic_tone_map,
            lut_opacity: finite_or_zero(look.rendering.lut_opacity).clamp(0.0, 1.0),
        }
    }

    /// Any HSL band carries a non-zero delta.
    pub fn hsl_active(&self) -> bool {
        self.hsl.iter().any(|b| !b.is_zero())
    }

    /// Any grading zone tints or offsets.
    pub fn grading_active(&self) -> bool {
        self.grading
            .iter()
            .any(|z| z.saturation != 0.0 || z.luminance != 0.0)
    }

    /// Any primary shift or a shadow tint.
    pub fn calibration_active(&self) -> bool {
        self.shadow_tint != 0.0
            || self
                .calibration
                .iter()
                .any(|p| p.hue != 0.0 || p.saturation != 0.0)
    }
}
