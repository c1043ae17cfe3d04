//! Color helpers shared by the stage implementations.
//!
//! Every function here has a WGSL twin in `preview.wgsl` with the same name
//! and the same arithmetic.

use glam::Vec3;

/// Rec. 709 luminance weights.
pub const LUMA_REC709: Vec3 = Vec3::new(0.2126, 0.7152, 0.0722);

/// Rec. 709 luminance.
pub fn luma(rgb: Vec3) -> f32 {
    rgb.dot(LUMA_REC709)
}

/// Hermite smoothstep: `3t² − 2t³` of the clamped ramp. Requires `edge0 < edge1`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Shortest angular distance between two hues, in degrees (0..180).
pub fn hue_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).abs() % 360.0;
    d.min(360.0 - d)
}

/// Raised-cosine window: 1 at distance 0, 0 at and beyond `half_width`.
pub fn raised_cosine(distance: f32, half_width: f32) -> f32 {
    if distance >= half_width {
        return 0.0;
    }
    0.5 * (1.0 + (std::f32::consts::PI * distance / half_width).cos())
}

/// Wrap a hue into 0..360.
pub fn wrap_hue(hue: f32) -> f32 {
    let h = hue % 360.0;
    if h < 0.0 { h + 360.0 } else { h }
}

/// Scale chroma around the pixel's luminance.
pub fn scale_chroma(rgb: Vec3, factor: f32) -> Vec3 {
    let l = luma(rgb);
    Vec3::splat(l) + (rgb - Vec3::splat(l)) * factor
}

/// Channel spread (max − min).
pub fn spread(rgb: Vec3) -> f32 {
    rgb.max_element() - rgb.min_element()
}

/// Convert RGB to HSL (hue in degrees, saturation and lightness in 0..1).
pub fn rgb_to_hsl(rgb: Vec3) -> Vec3 {
    let max = rgb.max_element();
    let min = rgb.min_element();
    let lum = (max + min) * 0.5;
    let delta = max - min;

    if delta < 1e-6 {
        return Vec3::new(0.0, 0.0, lum);
    }

    let sat = if lum > 0.5 {
        delta / (2.0 - max - min)
    } else {
        delta / (max + min)
    };

    let hue = if max == rgb.x {
        (rgb.y - rgb.z) / delta
    } else if max == rgb.y {
        (rgb.z - rgb.x) / delta + 2.0
    } else {
        (rgb.x - rgb.y) / delta + 4.0
    };

    Vec3::new(wrap_hue(hue * 60.0), sat, lum)
}

/// Convert HSL (hue in degrees) to RGB.
pub fn hsl_to_rgb(hsl: Vec3) -> Vec3 {
    let (hue, sat, lum) = (hsl.x, hsl.y, hsl.z);
    if sat < 1e-6 {
        return Vec3::splat(lum);
    }

    let q = if lum < 0.5 {
        lum * (1.0 + sat)
    } else {
        lum + sat - lum * sat
    };
    let p = 2.0 * lum - q;
    let h = wrap_hue(hue) / 360.0;

    Vec3::new(
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_channel(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Fully saturated, mid-lightness color for a hue.
pub fn hue_color(hue: f32) -> Vec3 {
    hsl_to_rgb(Vec3::new(hue, 1.0, 0.5))
}
