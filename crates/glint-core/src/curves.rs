//! Tone-curve evaluation and 256-entry LUT building.
//!
//! Implements Catmull-Rom interpolation through user-authored control points
//! in the 0..255 domain. The composite curve runs first; each channel curve
//! (if authored) is then applied to the composite result.
//!
//! # Algorithm
//! For each segment between P1 and P2, with neighbors P0 and P3:
//! ```text
//! q(t) = 0.5 × ((2×P1) + (-P0 + P2)×t + (2×P0 - 5×P1 + 4×P2 - P3)×t² + (-P0 + 3×P1 - 3×P2 + P3)×t³)
//! ```
//! Missing neighbors at either end are reflected through the nearest point,
//! so two-point curves are exactly linear. Inputs outside the authored range
//! extrapolate the outermost segment; no endpoints are inserted.
//!
//! # Complexity
//! - Evaluate: O(log N) binary search + O(1) interpolation
//! - Build LUT: O(N + 256 × log N) per channel

use crate::look::{CurvePoint, ToneCurve};

/// Number of entries per channel.
pub const CURVE_LUT_SIZE: usize = 256;

/// Largest curve coordinate.
const CURVE_MAX: f32 = 255.0;

/// Evaluates a Catmull-Rom curve through sanitized control points.
///
/// Borrows its points so callers can evaluate without copying.
pub struct CurveEvaluator<'a> {
    /// Finite control points sorted by x.
    points: &'a [CurvePoint],
}

impl<'a> CurveEvaluator<'a> {
    /// Wrap already-sanitized points (see [`sanitize_points`]).
    pub fn new(points: &'a [CurvePoint]) -> Self {
        Self { points }
    }

    /// True when the curve has enough points to do anything.
    pub fn is_active(&self) -> bool {
        self.points.len() >= 2
    }

    /// Evaluate the curve at `x` (0..255). Returns `x` with fewer than two
    /// points. The result is clamped to 0..255.
    pub fn evaluate(&self, x: f32) -> f32 {
        if !self.is_active() {
            return x;
        }
        let pts = self.points;

        let last = pts.len() - 1;
        let (lo, hi) = if x <= pts[0].x {
            (0, 1)
        } else if x >= pts[last].x {
            (last - 1, last)
        } else {
            // Binary search for the bracketing segment
            let mut lo = 0;
            let mut hi = last;
            while hi - lo > 1 {
                let mid = (lo + hi) / 2;
                if pts[mid].x <= x {
                    lo = mid;
                } else {
                    hi = mid;
                }
            }
            (lo, hi)
        };

        let p1 = pts[lo];
        let p2 = pts[hi];
        let p0 = if lo > 0 {
            pts[lo - 1].y
        } else {
            2.0 * p1.y - p2.y
        };
        let p3 = if hi < last {
            pts[hi + 1].y
        } else {
            2.0 * p2.y - p1.y
        };

        let span = p2.x - p1.x;
        let t = if span.abs() < 1e-6 {
            0.5
        } else {
            (x - p1.x) / span
        };

        catmull_rom(p0, p1.y, p2.y, p3, t).clamp(0.0, CURVE_MAX)
    }
}

/// Catmull-Rom cubic between P1 and P2.
fn catmull_rom(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}

/// Drop non-finite points and sort by x.
///
/// Out-of-range coordinates are clamped to 0..255 rather than dropped; a
/// channel left with fewer than two points evaluates as identity.
pub fn sanitize_points(points: &[CurvePoint]) -> Vec<CurvePoint> {
    let mut clean: Vec<CurvePoint> = points
        .iter()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .map(|p| CurvePoint::new(p.x.clamp(0.0, CURVE_MAX), p.y.clamp(0.0, CURVE_MAX)))
        .collect();
    if clean.len() != points.len() {
        tracing::debug!(
            dropped = points.len() - clean.len(),
            "dropped non-finite curve points"
        );
    }
    clean.sort_by(|a, b| a.x.total_cmp(&b.x));
    clean
}

/// Output channel of a [`CurveLut`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveChannel {
    Red = 0,
    Green = 1,
    Blue = 2,
}

/// Sampled tone curve: 256 entries per RGB channel, values in 0..255.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveLut {
    pub channels: [[f32; CURVE_LUT_SIZE]; 3],
}

impl CurveLut {
    /// `lut[x] = x` on every channel.
    pub fn identity() -> Self {
        let ramp: [f32; CURVE_LUT_SIZE] = std::array::from_fn(|i| i as f32);
        Self {
            channels: [ramp; 3],
        }
    }

    /// True when every entry equals its index.
    pub fn is_identity(&self) -> bool {
        self.channels
            .iter()
            .all(|ch| ch.iter().enumerate().all(|(i, &v)| (v - i as f32).abs() < 1e-4))
    }

    /// Look up one channel at a normalized input (0..1), interpolating
    /// linearly between entries. Mirrors the shader's `sample_curve`.
    pub fn sample(&self, channel: CurveChannel, value: f32) -> f32 {
        let table = &self.channels[channel as usize];
        let pos = value.clamp(0.0, 1.0) * CURVE_MAX;
        let i0 = pos.floor() as usize;
        let i1 = (i0 + 1).min(CURVE_LUT_SIZE - 1);
        let frac = pos - i0 as f32;
        let v = table[i0] + (table[i1] - table[i0]) * frac;
        v / CURVE_MAX
    }

    /// Pack as 256 RGBA texels normalized to 0..1 (alpha = 1).
    pub fn to_texels(&self) -> Vec<[f32; 4]> {
        (0..CURVE_LUT_SIZE)
            .map(|i| {
                [
                    self.channels[0][i] / CURVE_MAX,
                    self.channels[1][i] / CURVE_MAX,
                    self.channels[2][i] / CURVE_MAX,
                    1.0,
                ]
            })
            .collect()
    }
}

impl Default for CurveLut {
    fn default() -> Self {
        Self::identity()
    }
}

/// Build the per-channel LUT for a tone curve.
///
/// Composite first, then the channel's own curve on the composite result.
/// Channels without a usable curve keep the composite result.
pub fn build_curve_lut(curve: &ToneCurve) -> CurveLut {
    let composite = sanitize_points(&curve.composite);
    let per_channel = [
        sanitize_points(&curve.red),
        sanitize_points(&curve.green),
        sanitize_points(&curve.blue),
    ];

    let composite_eval = CurveEvaluator::new(&composite);
    let mut lut = CurveLut::identity();

    for (ch, points) in per_channel.iter().enumerate() {
        let channel_eval = CurveEvaluator::new(points);
        for (i, entry) in lut.channels[ch].iter_mut().enumerate() {
            let mid = composite_eval.evaluate(i as f32);
            *entry = channel_eval.evaluate(mid);
        }
    }

    lut
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-3;

    fn pts(raw: &[(f32, f32)]) -> Vec<CurvePoint> {
        raw.iter().map(|&(x, y)| CurvePoint::new(x, y)).collect()
    }

    #[test]
    fn test_catmull_rom_endpoints() {
        let v = catmull_rom(0.0, 0.25, 0.75, 1.0, 0.0);
        assert!((v - 0.25).abs() < 1e-6);
        let v = catmull_rom(0.0, 0.25, 0.75, 1.0, 1.0);
        assert!((v - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_two_point_identity_curve() {
        let curve = ToneCurve {
            composite: pts(&[(0.0, 0.0), (255.0, 255.0)]),
            ..Default::default()
        };
        let lut = build_curve_lut(&curve);
        for ch in &lut.channels {
            for (x, &v) in ch.iter().enumerate() {
                assert!((v - x as f32).abs() < EPSILON, "lut[{x}] = {v}");
            }
        }
    }

    #[test]
    fn test_three_point_curve_hits_control_points() {
        let curve = ToneCurve {
            composite: pts(&[(0.0, 0.0), (128.0, 180.0), (255.0, 255.0)]),
            ..Default::default()
        };
        let lut = build_curve_lut(&curve);
        for ch in &lut.channels {
            assert!((ch[128] - 180.0).abs() < EPSILON, "lut[128] = {}", ch[128]);
            assert!(ch[0].abs() < EPSILON);
            assert!((ch[255] - 255.0).abs() < EPSILON);
            // Brightening curve lifts the midtones.
            assert!(ch[64] > 64.0);
        }
    }

    #[test]
    fn test_fewer_than_two_points_is_identity() {
        let curve = ToneCurve {
            composite: pts(&[(128.0, 200.0)]),
            ..Default::default()
        };
        assert!(build_curve_lut(&curve).is_identity());
        assert!(build_curve_lut(&ToneCurve::default()).is_identity());
    }

    #[test]
    fn test_missing_endpoints_extrapolate_without_reanchoring() {
        // Collinear points reproduce the line, including outside the range.
        let curve = ToneCurve {
            composite: pts(&[(64.0, 100.0), (192.0, 160.0)]),
            ..Default::default()
        };
        let lut = build_curve_lut(&curve);
        let expected_zero = 100.0 - 64.0 * (60.0 / 128.0);
        assert!(
            (lut.channels[0][0] - expected_zero).abs() < EPSILON,
            "lut[0] = {}",
            lut.channels[0][0]
        );
        assert!(lut.channels[0][255] < 255.0);
    }

    #[test]
    fn test_channel_curve_applies_after_composite() {
        // Composite inverts, red channel inverts again → red is identity.
        let invert = pts(&[(0.0, 255.0), (255.0, 0.0)]);
        let curve = ToneCurve {
            composite: invert.clone(),
            red: invert,
            ..Default::default()
        };
        let lut = build_curve_lut(&curve);
        for x in [0usize, 40, 128, 200, 255] {
            assert!((lut.channels[0][x] - x as f32).abs() < EPSILON);
            assert!((lut.channels[1][x] - (255.0 - x as f32)).abs() < EPSILON);
            assert!((lut.channels[2][x] - (255.0 - x as f32)).abs() < EPSILON);
        }
    }

    #[test]
    fn test_channel_curve_without_composite() {
        let curve = ToneCurve {
            blue: pts(&[(0.0, 0.0), (255.0, 128.0)]),
            ..Default::default()
        };
        let lut = build_curve_lut(&curve);
        assert!((lut.channels[2][255] - 128.0).abs() < EPSILON);
        assert!((lut.channels[0][255] - 255.0).abs() < EPSILON);
    }

    #[test]
    fn test_non_finite_points_are_filtered() {
        let curve = ToneCurve {
            composite: pts(&[(0.0, 0.0), (f32::NAN, 10.0), (128.0, f32::INFINITY)]),
            ..Default::default()
        };
        // Only one valid point remains → identity.
        assert!(build_curve_lut(&curve).is_identity());
    }

    #[test]
    fn test_unsorted_points_are_sorted() {
        let sorted = build_curve_lut(&ToneCurve {
            composite: pts(&[(0.0, 0.0), (128.0, 180.0), (255.0, 255.0)]),
            ..Default::default()
        });
        let shuffled = build_curve_lut(&ToneCurve {
            composite: pts(&[(255.0, 255.0), (0.0, 0.0), (128.0, 180.0)]),
            ..Default::default()
        });
        assert_eq!(sorted, shuffled);
    }

    #[test]
    fn test_output_is_clamped() {
        // Steep S-curve overshoots between points.
        let curve = ToneCurve {
            composite: pts(&[(0.0, 0.0), (100.0, 10.0), (150.0, 250.0), (255.0, 255.0)]),
            ..Default::default()
        };
        let lut = build_curve_lut(&curve);
        for &v in &lut.channels[0] {
            assert!((0.0..=255.0).contains(&v));
        }
    }

    #[test]
    fn test_sample_interpolates_between_entries() {
        let lut = CurveLut::identity();
        assert!((lut.sample(CurveChannel::Green, 0.5) - 0.5).abs() < 1e-6);
        assert!((lut.sample(CurveChannel::Red, 1.2) - 1.0).abs() < 1e-6);
        let texels = lut.to_texels();
        assert_eq!(texels.len(), CURVE_LUT_SIZE);
        assert_eq!(texels[255], [1.0, 1.0, 1.0, 1.0]);
    }
}
