//! Loose look payloads into a strict [`Look`].
//!
//! Recommendation services and presets spell the same slider many ways:
//! `exposure`, `Exposure2012`, `tone.exposure`, `crs:Exposure2012`. Every key
//! is canonicalized (namespace dropped, lowercased, punctuation and the
//! `2012` process-version suffix removed) and nested objects are flattened
//! by concatenating their canonical keys. The flattened key is then matched
//! against the known slots, retrying with common container prefixes
//! (`tone`, `whitebalance`, `rendering`, ...) stripped.
//!
//! Values are clamped to each slot's range. Keys that match nothing are
//! ignored.

use glint_core::Look;
use glint_core::look::{CurvePoint, HueBand};
use serde_json::{Map, Value};

/// Largest curve coordinate.
const CURVE_MAX: f32 = 255.0;

/// Prefixes that group sliders without changing their meaning.
const CONTAINERS: [&str; 15] = [
    "adjustments",
    "settings",
    "parameters",
    "params",
    "look",
    "basic",
    "light",
    "tone",
    "whitebalance",
    "wb",
    "presence",
    "color",
    "effects",
    "rendering",
    "crs",
];

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("look payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error("invalid look JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Normalize a loose payload into a [`Look`]. Fields the payload does not
/// name keep their neutral values.
pub fn normalize(value: &Value) -> Result<Look, PayloadError> {
    let Value::Object(map) = value else {
        return Err(PayloadError::NotAnObject(kind(value)));
    };
    let mut look = Look::neutral();
    let mut stats = Stats::default();
    visit(map, "", &mut look, &mut stats);
    tracing::debug!(
        applied = stats.applied,
        ignored = stats.ignored,
        dropped_points = stats.dropped_points,
        "normalized look payload"
    );
    Ok(look)
}

/// Parse JSON text and [`normalize`] it.
pub fn normalize_str(text: &str) -> Result<Look, PayloadError> {
    let value: Value = serde_json::from_str(text)?;
    normalize(&value)
}

#[derive(Default)]
struct Stats {
    applied: usize,
    ignored: usize,
    dropped_points: usize,
}

fn visit(map: &Map<String, Value>, prefix: &str, look: &mut Look, stats: &mut Stats) {
    for (key, value) in map {
        let path = format!("{prefix}{}", canonical_key(key));
        match value {
            Value::Null => {}
            Value::Object(inner) => visit(inner, &path, look, stats),
            _ => match lookup(&path) {
                Some(target) if target.apply(look, value, stats) => stats.applied += 1,
                _ => {
                    tracing::trace!(key = %key, path = %path, "ignored payload key");
                    stats.ignored += 1;
                }
            },
        }
    }
}

/// `crs:Exposure2012` → `exposure`, `split_toning_shadow_hue` →
/// `splittoningshadowhue`.
fn canonical_key(key: &str) -> String {
    let local = key.rsplit(':').next().unwrap_or(key);
    let flat: String = local
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    flat.replace("2012", "")
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ── Targets ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attr {
    Hue,
    Saturation,
    Luminance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    Shadows,
    Midtones,
    Highlights,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Primary {
    Red,
    Green,
    Blue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CurveSlot {
    Composite,
    Red,
    Green,
    Blue,
}

/// A single numeric slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Temperature,
    Tint,
    Exposure,
    Contrast,
    Highlights,
    Shadows,
    Whites,
    Blacks,
    Texture,
    Clarity,
    Dehaze,
    Saturation,
    Vibrance,
    Grade(Zone, Attr),
    GradeBalance,
    GradeBlending,
    Hsl(HueBand, Attr),
    Primary(Primary, Attr),
    ShadowTint,
    LutOpacity,
}

impl Slot {
    fn range(self) -> (f32, f32) {
        match self {
            Self::Exposure => (-5.0, 5.0),
            Self::Grade(_, Attr::Hue) => (0.0, 360.0),
            Self::Grade(_, Attr::Saturation) | Self::GradeBlending => (0.0, 100.0),
            Self::LutOpacity => (0.0, 1.0),
            _ => (-100.0, 100.0),
        }
    }

    fn field(self, look: &mut Look) -> &mut f32 {
        match self {
            Self::Temperature => &mut look.white_balance.temperature,
            Self::Tint => &mut look.white_balance.tint,
            Self::Exposure => &mut look.tone.exposure,
            Self::Contrast => &mut look.tone.contrast,
            Self::Highlights => &mut look.tone.highlights,
            Self::Shadows => &mut look.tone.shadows,
            Self::Whites => &mut look.tone.whites,
            Self::Blacks => &mut look.tone.blacks,
            Self::Texture => &mut look.presence.texture,
            Self::Clarity => &mut look.presence.clarity,
            Self::Dehaze => &mut look.presence.dehaze,
            Self::Saturation => &mut look.color.saturation,
            Self::Vibrance => &mut look.color.vibrance,
            Self::Grade(zone, attr) => {
                let grading = &mut look.color_grading;
                let zone = match zone {
                    Zone::Shadows => &mut grading.shadows,
                    Zone::Midtones => &mut grading.midtones,
                    Zone::Highlights => &mut grading.highlights,
                };
                match attr {
                    Attr::Hue => &mut zone.hue,
                    Attr::Saturation => &mut zone.saturation,
                    Attr::Luminance => &mut zone.luminance,
                }
            }
            Self::GradeBalance => &mut look.color_grading.balance,
            Self::GradeBlending => &mut look.color_grading.blending,
            Self::Hsl(band, attr) => {
                let band = look.hsl.get_mut(band);
                match attr {
                    Attr::Hue => &mut band.hue,
                    Attr::Saturation => &mut band.saturation,
                    Attr::Luminance => &mut band.luminance,
                }
            }
            Self::Primary(primary, attr) => {
                let shift = match primary {
                    Primary::Red => &mut look.calibration.red,
                    Primary::Green => &mut look.calibration.green,
                    Primary::Blue => &mut look.calibration.blue,
                };
                match attr {
                    Attr::Saturation => &mut shift.saturation,
                    _ => &mut shift.hue,
                }
            }
            Self::ShadowTint => &mut look.calibration.shadow_tint,
            Self::LutOpacity => &mut look.rendering.lut_opacity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Scalar(Slot),
    Curve(CurveSlot),
    CinematicToneMap,
    HslBands,
}

impl Target {
    /// Write `value` into `look`. Returns false when the value has the
    /// wrong shape for this target.
    fn apply(self, look: &mut Look, value: &Value, stats: &mut Stats) -> bool {
        match self {
            Self::Scalar(slot) => {
                let Some(v) = number(value) else {
                    return false;
                };
                let (lo, hi) = slot.range();
                *slot.field(look) = v.clamp(lo, hi);
                true
            }
            Self::Curve(slot) => {
                let Value::Array(items) = value else {
                    return false;
                };
                let points: Vec<CurvePoint> = items.iter().filter_map(curve_point).collect();
                stats.dropped_points += items.len() - points.len();
                let curve = &mut look.tone_curve;
                let channel = match slot {
                    CurveSlot::Composite => &mut curve.composite,
                    CurveSlot::Red => &mut curve.red,
                    CurveSlot::Green => &mut curve.green,
                    CurveSlot::Blue => &mut curve.blue,
                };
                *channel = points;
                true
            }
            Self::CinematicToneMap => {
                let enabled = match value {
                    Value::Bool(b) => *b,
                    Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                        "true" | "on" | "yes" => true,
                        "false" | "off" | "no" => false,
                        _ => return false,
                    },
                    other => match number(other) {
                        Some(n) => n != 0.0,
                        None => return false,
                    },
                };
                look.rendering.cinematic_tone_map = enabled;
                true
            }
            Self::HslBands => {
                let Value::Array(items) = value else {
                    return false;
                };
                for (band, item) in HueBand::ALL.into_iter().zip(items) {
                    let Value::Object(fields) = item else {
                        continue;
                    };
                    for (key, v) in fields {
                        if let (Some(a), Some(n)) = (attr(&canonical_key(key)), number(v)) {
                            *Slot::Hsl(band, a).field(look) = n.clamp(-100.0, 100.0);
                        }
                    }
                }
                true
            }
        }
    }
}

/// Numbers, or numeric strings such as `"+0.50"`.
fn number(value: &Value) -> Option<f32> {
    let n = match value {
        Value::Number(n) => n.as_f64()? as f32,
        Value::String(s) => s.trim().parse::<f32>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// `[x, y]`, `{"x": x, "y": y}` or `"x, y"`. Coordinates are clamped to
/// the curve domain.
fn curve_point(value: &Value) -> Option<CurvePoint> {
    let (x, y) = match value {
        Value::Array(pair) if pair.len() == 2 => (number(&pair[0])?, number(&pair[1])?),
        Value::Object(obj) => (number(obj.get("x")?)?, number(obj.get("y")?)?),
        Value::String(s) => {
            let (x, y) = s.split_once(',')?;
            (x.trim().parse::<f32>().ok()?, y.trim().parse::<f32>().ok()?)
        }
        _ => return None,
    };
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some(CurvePoint::new(x.clamp(0.0, CURVE_MAX), y.clamp(0.0, CURVE_MAX)))
}

// ── Key resolution ──────────────────────────────────────────────────

/// Resolve a flattened canonical key, stripping container prefixes until
/// something matches.
fn lookup(path: &str) -> Option<Target> {
    let mut key = path;
    loop {
        if let Some(target) = resolve(key) {
            return Some(target);
        }
        key = CONTAINERS
            .iter()
            .find_map(|c| key.strip_prefix(c).filter(|rest| !rest.is_empty()))?;
    }
}

fn resolve(key: &str) -> Option<Target> {
    let slot = match key {
        "temperature" | "temp" | "incrementaltemperature" => Slot::Temperature,
        "tint" | "incrementaltint" => Slot::Tint,
        "exposure" => Slot::Exposure,
        "contrast" => Slot::Contrast,
        "highlights" => Slot::Highlights,
        "shadows" => Slot::Shadows,
        "whites" => Slot::Whites,
        "blacks" => Slot::Blacks,
        "texture" => Slot::Texture,
        "clarity" => Slot::Clarity,
        "dehaze" => Slot::Dehaze,
        "saturation" => Slot::Saturation,
        "vibrance" => Slot::Vibrance,
        "shadowtint" | "shadowstint" | "calibrationshadowtint" | "calibrationshadowstint" => {
            Slot::ShadowTint
        }
        "lutopacity" | "lutintensity" | "lutamount" | "lutmix" => Slot::LutOpacity,
        "cinematictonemap" | "filmictonemap" | "tonemap" | "cinematic" => {
            return Some(Target::CinematicToneMap);
        }
        "hslbands" => return Some(Target::HslBands),
        _ => return resolve_compound(key),
    };
    Some(Target::Scalar(slot))
}

/// Keys built from a group prefix and one or more name parts.
fn resolve_compound(key: &str) -> Option<Target> {
    if let Some(slot) = curve_slot(key) {
        return Some(Target::Curve(slot));
    }
    grade_slot(key)
        .or_else(|| hsl_slot(key))
        .or_else(|| primary_slot(key))
        .map(Target::Scalar)
}

fn curve_slot(key: &str) -> Option<CurveSlot> {
    let rest = ["tonecurvepv", "tonecurves", "tonecurve", "curves", "curve"]
        .iter()
        .find_map(|p| key.strip_prefix(p))?;
    match rest {
        "" | "composite" | "luma" | "master" | "rgb" => Some(CurveSlot::Composite),
        "red" => Some(CurveSlot::Red),
        "green" => Some(CurveSlot::Green),
        "blue" => Some(CurveSlot::Blue),
        _ => None,
    }
}

fn grade_slot(key: &str) -> Option<Slot> {
    let rest = ["colorgrading", "colorgrade", "splittoning", "grading"]
        .iter()
        .find_map(|p| key.strip_prefix(p))?;
    match rest {
        "balance" => return Some(Slot::GradeBalance),
        "blending" | "blend" => return Some(Slot::GradeBlending),
        _ => {}
    }
    let (zone, rest) = [
        ("shadows", Zone::Shadows),
        ("shadow", Zone::Shadows),
        ("midtones", Zone::Midtones),
        ("midtone", Zone::Midtones),
        ("highlights", Zone::Highlights),
        ("highlight", Zone::Highlights),
    ]
    .iter()
    .find_map(|(name, zone)| Some((*zone, rest.strip_prefix(name)?)))?;
    attr(rest).map(|a| Slot::Grade(zone, a))
}

fn hsl_slot(key: &str) -> Option<Slot> {
    if let Some(rest) = key.strip_prefix("hsl") {
        return band_then_attr(rest)
            .or_else(|| attr_then_band(rest))
            .map(|(band, a)| Slot::Hsl(band, a));
    }
    // `HueAdjustmentRed`, `saturation_orange`.
    let (a, rest) = split_attr(key)?;
    let rest = rest.strip_prefix("adjustment").unwrap_or(rest);
    band_name(rest).map(|band| Slot::Hsl(band, a))
}

fn primary_slot(key: &str) -> Option<Slot> {
    let rest = key.strip_prefix("calibration").unwrap_or(key);
    let (primary, rest) = [
        ("red", Primary::Red),
        ("green", Primary::Green),
        ("blue", Primary::Blue),
    ]
    .iter()
    .find_map(|(name, p)| Some((*p, rest.strip_prefix(name)?)))?;
    let rest = rest.strip_prefix("primary").unwrap_or(rest);
    match attr(rest)? {
        Attr::Luminance => None,
        a => Some(Slot::Primary(primary, a)),
    }
}

fn attr(s: &str) -> Option<Attr> {
    match s {
        "hue" => Some(Attr::Hue),
        "saturation" | "sat" => Some(Attr::Saturation),
        "luminance" | "lum" | "lightness" => Some(Attr::Luminance),
        _ => None,
    }
}

fn split_attr(s: &str) -> Option<(Attr, &str)> {
    [
        ("hue", Attr::Hue),
        ("saturation", Attr::Saturation),
        ("sat", Attr::Saturation),
        ("luminance", Attr::Luminance),
        ("lum", Attr::Luminance),
        ("lightness", Attr::Luminance),
    ]
    .iter()
    .find_map(|(name, a)| Some((*a, s.strip_prefix(name)?)))
}

/// `red`, `reds`.
fn band_name(s: &str) -> Option<HueBand> {
    HueBand::ALL
        .into_iter()
        .find(|band| s == band.name() || s.strip_suffix('s') == Some(band.name()))
}

/// `redhue`, `orangessaturation`.
fn band_then_attr(s: &str) -> Option<(HueBand, Attr)> {
    HueBand::ALL.into_iter().find_map(|band| {
        let rest = s.strip_prefix(band.name())?;
        let a = attr(rest).or_else(|| attr(rest.strip_prefix('s')?))?;
        Some((band, a))
    })
}

/// `huered`, `saturationoranges`.
fn attr_then_band(s: &str) -> Option<(HueBand, Attr)> {
    let (a, rest) = split_attr(s)?;
    band_name(rest).map(|band| (band, a))
}
