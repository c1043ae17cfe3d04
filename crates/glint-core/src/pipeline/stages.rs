//! Per-pixel stage implementations (CPU reference).
//!
//! Each function is the exact twin of a `stage_*` function in
//! `glint-gpu/shaders/preview.wgsl`. Every function returns its input
//! unchanged when its controls are neutral. All masks are smoothstep or
//! raised-cosine windows, never hard thresholds.

use glam::Vec3;

use super::color::{
    hsl_to_rgb, hue_color, hue_distance, luma, raised_cosine, rgb_to_hsl, scale_chroma,
    smoothstep, spread, wrap_hue,
};
use super::cube::TiledCubeLut;
use super::inputs::{BandInputs, PrimaryInputs, ZoneInputs};
use crate::curves::{CurveChannel, CurveLut};
use crate::look::HueBand;

/// Channels above this are knee-compressed by highlight recovery.
pub const HIGHLIGHT_KNEE: f32 = 0.75;
/// Luminance below which shadow lift is held back.
pub const SHADOW_TOE: f32 = 0.08;
/// Largest additive offset the blacks lift may apply.
pub const BLACKS_LIFT_MAX: f32 = 0.05;
/// Contrast pivot: the 8-bit mid-gray code value 128.
pub const MID_GRAY: f32 = 128.0 / 255.0;

const WHITES_WINDOW: (f32, f32) = (0.75, 1.0);
const BLACKS_WINDOW_END: f32 = 0.18;
const CALIBRATION_HALF_WIDTH: f32 = 60.0;
const CALIBRATION_CENTERS: [f32; 3] = [0.0, 120.0, 240.0];
/// Split-toning tint strength for shadows, midtones, highlights.
const GRADING_INTENSITY: [f32; 3] = [0.15, 0.12, 0.15];

fn per_channel(rgb: Vec3, f: impl Fn(f32) -> f32) -> Vec3 {
    Vec3::new(f(rgb.x), f(rgb.y), f(rgb.z))
}

/// 1. Temperature moves red against blue (green follows partially); tint
/// moves green against red and blue.
pub fn white_balance(rgb: Vec3, temperature: f32, tint: f32) -> Vec3 {
    let scale = Vec3::new(
        1.0 + 0.2 * temperature + 0.1 * tint,
        1.0 + 0.05 * temperature - 0.2 * tint,
        1.0 - 0.2 * temperature + 0.1 * tint,
    );
    rgb * scale
}

/// 2. Multiply by 2^EV.
pub fn exposure(rgb: Vec3, ev: f32) -> Vec3 {
    rgb * ev.exp2()
}

/// 3. Linear contrast pivoting at [`MID_GRAY`], so code value 128 is a
/// fixed point.
pub fn contrast(rgb: Vec3, amount: f32) -> Vec3 {
    let pivot = Vec3::splat(MID_GRAY);
    ((rgb - pivot) * (1.0 + amount) + pivot).max(Vec3::ZERO)
}

/// 4. Highlights. Negative recovers, positive boosts.
pub fn highlights(rgb: Vec3, amount: f32) -> Vec3 {
    if amount < 0.0 {
        recover_highlights(rgb, -amount)
    } else if amount > 0.0 {
        boost_highlights(rgb, amount)
    } else {
        rgb
    }
}

fn recover_highlights(rgb: Vec3, strength: f32) -> Vec3 {
    let k = strength * 4.0;
    let compressed = per_channel(rgb, |x| {
        if x > HIGHLIGHT_KNEE {
            let excess = x - HIGHLIGHT_KNEE;
            HIGHLIGHT_KNEE + excess / (1.0 + k * excess)
        } else {
            x
        }
    });

    // Re-expand detail inside the recovered band.
    let weight = smoothstep(0.5, 0.9, luma(compressed)) * strength;
    let knee = Vec3::splat(HIGHLIGHT_KNEE);
    let contrasted = (compressed - knee) * (1.0 + 0.15 * weight) + knee;

    // Give back the relative chroma the knee took away.
    let spread_in = spread(rgb) / luma(rgb).max(1e-4);
    let spread_out = spread(contrasted) / luma(contrasted).max(1e-4);
    if spread_out < 1e-5 {
        return contrasted.max(Vec3::ZERO);
    }
    let ratio = (spread_in / spread_out).clamp(1.0, 3.0);
    let restore = 1.0 + (ratio - 1.0) * strength;
    scale_chroma(contrasted, restore).max(Vec3::ZERO)
}

/// Soft limit for boosted channels. Identity up to 1, then a monotone
/// shoulder that approaches `1 + 1/k`.
pub fn highlight_shoulder(x: f32, k: f32) -> f32 {
    if x > 1.0 {
        let over = x - 1.0;
        1.0 + over / (1.0 + over * k)
    } else {
        x
    }
}

fn boost_highlights(rgb: Vec3, strength: f32) -> Vec3 {
    let lum_mask = smoothstep(0.4, 0.9, luma(rgb));
    let over_mask = smoothstep(HIGHLIGHT_KNEE, 1.0, rgb.max_element());
    let k = 1.0 + 2.0 * strength;
    let lifted = rgb * (1.0 + 0.6 * strength);
    let limited = per_channel(lifted, |x| highlight_shoulder(x, k));
    let weight = lum_mask * (1.0 - 0.5 * over_mask);
    rgb.lerp(limited, weight)
}

/// 5. Shadows. Negative crushes with a gamma above 1; positive lifts with a
/// gamma below 1, held back in the toe so true blacks barely move.
pub fn shadows(rgb: Vec3, amount: f32) -> Vec3 {
    if amount == 0.0 {
        return rgb;
    }
    let l = luma(rgb);
    let mask = 1.0 - smoothstep(0.0, 0.5, l);
    let base = rgb.max(Vec3::ZERO);

    if amount < 0.0 {
        let gamma = 1.0 - amount * 0.8;
        return rgb.lerp(base.powf(gamma), mask);
    }

    let gamma = 1.0 / (1.0 + amount * 0.8);
    let toe = smoothstep(0.0, SHADOW_TOE, l);
    let weight = mask * (0.25 + 0.75 * toe);
    let mut out = rgb.lerp(base.powf(gamma), weight);

    // Keep some local contrast in the lifted range.
    let pivot = Vec3::splat(0.25);
    out = (out - pivot) * (1.0 + 0.1 * amount * mask) + pivot;

    // Lifting washes out color; compensate in proportion to the lift.
    scale_chroma(out, 1.0 + 0.2 * amount * mask).max(Vec3::ZERO)
}

/// 6. Whites and blacks on narrow luminance windows.
pub fn whites_blacks(rgb: Vec3, whites: f32, blacks: f32) -> Vec3 {
    let mut out = rgb;

    if whites != 0.0 {
        let mask = smoothstep(WHITES_WINDOW.0, WHITES_WINDOW.1, luma(out));
        if whites > 0.0 {
            let k = 1.0 + 3.0 * whites;
            let norm = 1.0 - (-k).exp();
            let soft = per_channel(out.max(Vec3::ZERO), |x| (1.0 - (-k * x).exp()) / norm);
            out = out.lerp(soft, mask);
        } else {
            out *= 1.0 + 0.35 * whites * mask;
        }
    }

    if blacks != 0.0 {
        let mask = 1.0 - smoothstep(0.0, BLACKS_WINDOW_END, luma(out));
        if blacks > 0.0 {
            let offset = (blacks * 0.08).min(BLACKS_LIFT_MAX);
            out += Vec3::splat(offset * mask);
        } else {
            let gamma = 1.0 - blacks * 1.5;
            out = out.lerp(out.max(Vec3::ZERO).powf(gamma), mask);
        }
    }

    out
}

/// 7. Per-channel tone-curve lookup.
pub fn tone_curve(rgb: Vec3, lut: &CurveLut) -> Vec3 {
    Vec3::new(
        lut.sample(CurveChannel::Red, rgb.x),
        lut.sample(CurveChannel::Green, rgb.y),
        lut.sample(CurveChannel::Blue, rgb.z),
    )
}

/// 8. Eight-band HSL with raised-cosine band weights.
pub fn hsl_bands(rgb: Vec3, bands: &[BandInputs; 8]) -> Vec3 {
    let hsl = rgb_to_hsl(rgb.clamp(Vec3::ZERO, Vec3::ONE));
    // Near-gray pixels have no meaningful hue.
    let gate = smoothstep(0.0, 0.1, hsl.y);

    let mut hue_shift = 0.0;
    let mut sat_delta = 0.0;
    let mut lum_delta = 0.0;
    for band in HueBand::ALL {
        let adj = bands[band.index()];
        let w = raised_cosine(
            hue_distance(hsl.x, band.center_degrees()),
            band.half_width_degrees(),
        ) * gate;
        hue_shift += w * adj.hue * 30.0;
        sat_delta += w * adj.saturation;
        lum_delta += w * adj.luminance * 0.5;
    }

    let hue = wrap_hue(hsl.x + hue_shift);
    let sat = (hsl.y * (1.0 + sat_delta)).clamp(0.0, 1.0);
    let lum = (hsl.z * (1.0 + lum_delta)).clamp(0.0, 1.0);
    hsl_to_rgb(Vec3::new(hue, sat, lum))
}

/// Shadow, midtone and highlight weights for split toning.
///
/// The shadow/highlight crossover sits at `clamp(0.5 − balance × 0.45, 0.05, 0.95)`;
/// blending widens the transition.
pub fn grading_weights(l: f32, balance: f32, blending: f32) -> [f32; 3] {
    let crossover = (0.5 - balance * 0.45).clamp(0.05, 0.95);
    let width = 0.1 + 0.3 * blending;
    let t = smoothstep(crossover - width, crossover + width, l);
    let mid = 1.0 - (2.0 * t - 1.0).abs();
    [(1.0 - t) * (1.0 - mid), mid, t * (1.0 - mid)]
}

/// 9. Split toning: low-intensity tint plus a luminance offset per zone.
pub fn color_grading(rgb: Vec3, zones: &[ZoneInputs; 3], balance: f32, blending: f32) -> Vec3 {
    let weights = grading_weights(luma(rgb).clamp(0.0, 1.0), balance, blending);
    let mut out = rgb;
    for ((zone, w), intensity) in zones.iter().zip(weights).zip(GRADING_INTENSITY) {
        if zone.saturation > 0.0 {
            let tint = hue_color(zone.hue);
            out += (tint - Vec3::splat(luma(tint))) * zone.saturation * intensity * w;
        }
        out += Vec3::splat(zone.luminance * 0.2 * w);
    }
    out.max(Vec3::ZERO)
}

/// 10. Texture, clarity and dehaze.
pub fn presence(rgb: Vec3, texture: f32, clarity: f32, dehaze: f32) -> Vec3 {
    let mut out = rgb;
    let l = luma(out);
    let mid = smoothstep(0.0, 0.5, l) * (1.0 - smoothstep(0.5, 1.0, l));
    let gray = Vec3::splat(0.5);

    if texture != 0.0 {
        let fine = (out - gray) * (1.0 + 0.25 * texture) + gray;
        out = out.lerp(fine, mid * mid);
    }
    if clarity != 0.0 {
        let punched = (out - gray) * (1.0 + 0.5 * clarity) + gray;
        out = out.lerp(punched, mid);
    }
    if dehaze != 0.0 {
        out = (out - gray) * (1.0 + 0.3 * dehaze) + gray;
        let deep = 1.0 - smoothstep(0.0, 0.4, luma(out));
        out -= Vec3::splat(0.05 * dehaze * deep);
        // Haze removal first flattens color, then restores more than it took.
        out = out.lerp(Vec3::splat(luma(out)), 0.1 * dehaze.abs());
        out = scale_chroma(out, 1.0 + 0.25 * dehaze);
    }
    out.max(Vec3::ZERO)
}

/// 11. Saturation is uniform; vibrance favors muted pixels.
pub fn saturation_vibrance(rgb: Vec3, saturation: f32, vibrance: f32) -> Vec3 {
    let mut out = scale_chroma(rgb, 1.0 + saturation);
    if vibrance != 0.0 {
        let chroma = spread(out).clamp(0.0, 1.0);
        out = scale_chroma(out, 1.0 + vibrance * (1.0 - chroma));
    }
    out.max(Vec3::ZERO)
}

/// 12. Calibration: wide hue-weighted primary shifts plus a shadow tint.
pub fn calibration(rgb: Vec3, primaries: &[PrimaryInputs; 3], shadow_tint: f32) -> Vec3 {
    let mut out = rgb;

    if primaries.iter().any(|p| p.hue != 0.0 || p.saturation != 0.0) {
        let hsl = rgb_to_hsl(out.clamp(Vec3::ZERO, Vec3::ONE));
        let gate = smoothstep(0.0, 0.1, hsl.y);
        let mut hue_shift = 0.0;
        let mut sat_delta = 0.0;
        for (p, center) in primaries.iter().zip(CALIBRATION_CENTERS) {
            let w = raised_cosine(hue_distance(hsl.x, center), CALIBRATION_HALF_WIDTH) * gate;
            hue_shift += w * p.hue * 15.0;
            sat_delta += w * p.saturation * 0.3;
        }
        let sat = (hsl.y * (1.0 + sat_delta)).clamp(0.0, 1.0);
        out = hsl_to_rgb(Vec3::new(wrap_hue(hsl.x + hue_shift), sat, hsl.z));
    }

    if shadow_tint != 0.0 {
        let mask = 1.0 - smoothstep(0.0, 0.4, luma(out));
        out += Vec3::new(0.5, -1.0, 0.5) * (shadow_tint * 0.04 * mask);
    }

    out.max(Vec3::ZERO)
}

/// 13. Mix in the external tiled-cube LUT.
pub fn external_lut(rgb: Vec3, lut: &TiledCubeLut, opacity: f32) -> Vec3 {
    let graded = lut.sample(rgb.clamp(Vec3::ZERO, Vec3::ONE));
    rgb.lerp(graded, opacity)
}

/// 14. Filmic curve fit (Narkowicz ACES approximation), clamped to 0..1.
pub fn cinematic_tone_map(rgb: Vec3) -> Vec3 {
    const A: f32 = 2.51;
    const B: f32 = 0.03;
    const C: f32 = 2.43;
    const D: f32 = 0.59;
    const E: f32 = 0.14;
    let x = rgb.max(Vec3::ZERO);
    ((x * (A * x + B)) / (x * (C * x + D) + E)).clamp(Vec3::ZERO, Vec3::ONE)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn assert_close(a: Vec3, b: Vec3, tol: f32) {
        assert!(
            (a - b).abs().max_element() < tol,
            "{a:?} vs {b:?} (tolerance {tol})"
        );
    }

    #[test]
    fn test_neutral_controls_are_identity() {
        let rgb = Vec3::new(0.6, 0.3, 0.15);
        assert_close(white_balance(rgb, 0.0, 0.0), rgb, EPSILON);
        assert_close(exposure(rgb, 0.0), rgb, EPSILON);
        assert_close(contrast(rgb, 0.0), rgb, EPSILON);
        assert_close(highlights(rgb, 0.0), rgb, EPSILON);
        assert_close(shadows(rgb, 0.0), rgb, EPSILON);
        assert_close(whites_blacks(rgb, 0.0, 0.0), rgb, EPSILON);
        assert_close(presence(rgb, 0.0, 0.0, 0.0), rgb, EPSILON);
        assert_close(saturation_vibrance(rgb, 0.0, 0.0), rgb, EPSILON);
        assert_close(calibration(rgb, &[PrimaryInputs::default(); 3], 0.0), rgb, EPSILON);
        assert_close(
            color_grading(rgb, &[ZoneInputs::default(); 3], 0.0, 0.5),
            rgb,
            EPSILON,
        );
    }

    #[test]
    fn test_warm_temperature_raises_red_lowers_blue() {
        let out = white_balance(Vec3::splat(0.5), 1.0, 0.0);
        assert!(out.x > 0.5 && out.z < 0.5);
        assert!(out.y > 0.5 && out.y < out.x, "green follows only partially");
        let cool = white_balance(Vec3::splat(0.5), -1.0, 0.0);
        assert!(cool.x < 0.5 && cool.z > 0.5);
    }

    #[test]
    fn test_positive_tint_reduces_green() {
        let out = white_balance(Vec3::splat(0.5), 0.0, 1.0);
        assert!(out.y < 0.5 && out.x > 0.5 && out.z > 0.5);
    }

    #[test]
    fn test_exposure_one_stop_doubles() {
        assert_close(exposure(Vec3::splat(0.2), 1.0), Vec3::splat(0.4), EPSILON);
        assert_close(exposure(Vec3::splat(0.2), -1.0), Vec3::splat(0.1), EPSILON);
    }

    #[test]
    fn test_contrast_pivots_at_mid_gray() {
        let gray = Vec3::splat(MID_GRAY);
        for amount in [-1.0, -0.5, 0.3, 1.0] {
            assert_eq!(contrast(gray, amount), gray);
        }
        let out = contrast(Vec3::splat(MID_GRAY + 0.25), 1.0);
        assert_close(out, Vec3::splat(MID_GRAY + 0.5), EPSILON);
    }

    #[test]
    fn test_highlight_recovery_pulls_white_below_one() {
        let out = highlights(Vec3::ONE, -1.0);
        assert!(luma(out) < 1.0, "luma = {}", luma(out));
        assert!(spread(out) < EPSILON, "neutral input stays neutral");
    }

    #[test]
    fn test_highlight_recovery_leaves_darks_alone() {
        let rgb = Vec3::new(0.2, 0.15, 0.1);
        assert_close(highlights(rgb, -1.0), rgb, 1e-3);
    }

    #[test]
    fn test_highlight_boost_is_soft_limited() {
        let out = highlights(Vec3::splat(0.8), 1.0);
        assert!(out.x > 0.8);
        let over = highlights(Vec3::splat(1.2), 1.0);
        assert!(over.x < 1.2 * 1.6, "boost is limited above 1");
    }

    #[test]
    fn test_shadow_lift_protects_true_black() {
        let black = shadows(Vec3::ZERO, 1.0);
        assert!(black.max_element() < 1e-3, "black moved to {black:?}");
        let dark = Vec3::splat(0.15);
        assert!(shadows(dark, 1.0).x > 0.15);
        assert!(shadows(dark, -1.0).x < 0.15);
    }

    #[test]
    fn test_shadow_lift_ignores_highlights() {
        let bright = Vec3::splat(0.9);
        assert_close(shadows(bright, 1.0), bright, 1e-3);
    }

    #[test]
    fn test_highlight_shoulder_above_one() {
        assert_eq!(highlight_shoulder(0.6, 3.0), 0.6);
        assert_eq!(highlight_shoulder(1.0, 3.0), 1.0);
        let lifted = highlight_shoulder(1.44, 3.0);
        assert!((lifted - (1.0 + 0.44 / 2.32)).abs() < EPSILON, "{lifted}");

        // Monotone and bounded: a brighter input never comes out darker.
        let mut prev = 1.0;
        for i in 1..=40 {
            let y = highlight_shoulder(1.0 + i as f32 * 0.1, 3.0);
            assert!(y > prev, "shoulder must rise: {y} <= {prev}");
            assert!(y < 1.0 + 1.0 / 3.0);
            prev = y;
        }
    }

    #[test]
    fn test_highlight_boost_never_darkens() {
        for v in [0.5, 0.8, 0.95, 1.0] {
            let rgb = Vec3::splat(v);
            let out = highlights(rgb, 1.0);
            assert!(out.x >= v - EPSILON, "{v} -> {}", out.x);
        }
    }

    #[test]
    fn test_whites_soft_clip_never_exceeds_one() {
        for v in [0.7, 0.85, 0.95, 1.0] {
            let out = whites_blacks(Vec3::splat(v), 1.0, 0.0);
            assert!(out.x <= 1.0 + EPSILON, "{v} -> {}", out.x);
            assert!(out.x >= v - EPSILON);
        }
    }

    #[test]
    fn test_whites_window_starts_at_upper_quarter() {
        for amount in [-1.0, 1.0] {
            let below = Vec3::splat(0.7);
            assert_close(whites_blacks(below, amount, 0.0), below, EPSILON);
            let inside = Vec3::splat(0.9);
            assert!((whites_blacks(inside, amount, 0.0).x - 0.9).abs() > 0.01);
        }
    }

    #[test]
    fn test_blacks_lift_is_capped() {
        let out = whites_blacks(Vec3::ZERO, 0.0, 1.0);
        assert!((out.x - BLACKS_LIFT_MAX).abs() < EPSILON);
        let crushed = whites_blacks(Vec3::splat(0.1), 0.0, -1.0);
        assert!(crushed.x < 0.1);
    }

    #[test]
    fn test_hsl_red_band_isolation() {
        let mut bands = [BandInputs::default(); 8];
        bands[HueBand::Red.index()].saturation = 1.0;

        let green = Vec3::new(0.2, 0.6, 0.2);
        let out = hsl_bands(green, &bands);
        assert!((rgb_to_hsl(out).y - rgb_to_hsl(green).y).abs() < 1e-3);

        let red = Vec3::new(0.7, 0.35, 0.35);
        let boosted = hsl_bands(red, &bands);
        assert!(rgb_to_hsl(boosted).y > rgb_to_hsl(red).y + 0.2);
    }

    #[test]
    fn test_grading_crossover_moves_with_balance() {
        let w = grading_weights(0.5, 0.0, 0.5);
        assert!((w[1] - 1.0).abs() < EPSILON, "mid dominates at the crossover");
        // Positive balance favours highlights: mid-gray now reads as highlight.
        let w = grading_weights(0.5, 1.0, 0.5);
        assert!(w[2] > w[0]);
        let w = grading_weights(0.5, -1.0, 0.5);
        assert!(w[0] > w[2]);
    }

    #[test]
    fn test_grading_tints_shadows_toward_hue() {
        let mut zones = [ZoneInputs::default(); 3];
        zones[0] = ZoneInputs {
            hue: 240.0,
            saturation: 1.0,
            luminance: 0.0,
        };
        let out = color_grading(Vec3::splat(0.1), &zones, 0.0, 0.5);
        assert!(out.z > out.x, "shadows pushed toward blue: {out:?}");
        // Highlights are untouched by the shadow zone.
        assert_close(
            color_grading(Vec3::splat(0.95), &zones, 0.0, 0.5),
            Vec3::splat(0.95),
            1e-3,
        );
    }

    #[test]
    fn test_clarity_increases_midtone_spread() {
        let a = presence(Vec3::splat(0.4), 0.0, 1.0, 0.0);
        let b = presence(Vec3::splat(0.6), 0.0, 1.0, 0.0);
        assert!(b.x - a.x > 0.2);
    }

    #[test]
    fn test_dehaze_deepens_shadows() {
        let out = presence(Vec3::splat(0.2), 0.0, 0.0, 1.0);
        assert!(out.x < 0.2);
    }

    #[test]
    fn test_vibrance_protects_saturated_pixels() {
        let muted = Vec3::new(0.5, 0.45, 0.4);
        let vivid = Vec3::new(0.9, 0.1, 0.1);
        let muted_gain = spread(saturation_vibrance(muted, 0.0, 1.0)) / spread(muted);
        let vivid_gain = spread(saturation_vibrance(vivid, 0.0, 1.0)) / spread(vivid);
        assert!(muted_gain > vivid_gain);
    }

    #[test]
    fn test_saturation_minus_one_is_gray() {
        let out = saturation_vibrance(Vec3::new(0.8, 0.4, 0.2), -1.0, 0.0);
        assert!(spread(out) < EPSILON);
    }

    #[test]
    fn test_calibration_red_hue_leaves_blue_alone() {
        let mut primaries = [PrimaryInputs::default(); 3];
        primaries[0].hue = 1.0;
        let blue = Vec3::new(0.1, 0.2, 0.8);
        assert_close(calibration(blue, &primaries, 0.0), blue, 1e-3);
        let red = Vec3::new(0.8, 0.2, 0.2);
        let shifted = rgb_to_hsl(calibration(red, &primaries, 0.0)).x;
        assert!(shifted > 5.0 && shifted < 30.0, "hue {shifted}");
    }

    #[test]
    fn test_shadow_tint_shifts_green() {
        let out = calibration(Vec3::splat(0.1), &[PrimaryInputs::default(); 3], 1.0);
        assert!(out.y < out.x);
    }

    #[test]
    fn test_cinematic_tone_map_clamps() {
        assert_eq!(cinematic_tone_map(Vec3::splat(10.0)), Vec3::ONE);
        assert_eq!(cinematic_tone_map(Vec3::ZERO), Vec3::ZERO);
        let mid = cinematic_tone_map(Vec3::splat(0.5));
        assert!(mid.x > 0.5 && mid.x < 1.0);
    }
}
