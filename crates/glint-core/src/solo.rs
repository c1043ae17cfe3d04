//! Isolation ("solo") compositor.
//!
//! Reduces a full [`Look`] to the effect of a chosen subset of layers. An
//! empty set yields the neutral look. Otherwise every field starts neutral
//! and only the named layers are copied across. Grouped controls (a grading
//! zone, an HSL band) always move as a unit.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SoloError;
use crate::look::{HueBand, Look};

/// One soloable adjustment layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LayerId {
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
    GradingShadows,
    GradingMidtones,
    GradingHighlights,
    GradingBalance,
    GradingBlending,
    Hsl(HueBand),
    CalibrationRed,
    CalibrationGreen,
    CalibrationBlue,
    CalibrationShadowTint,
    ToneCurve,
    ExternalLut,
    CinematicToneMap,
}

const SIMPLE_LAYERS: [(LayerId, &str); 25] = [
    (LayerId::Temperature, "temperature"),
    (LayerId::Tint, "tint"),
    (LayerId::Exposure, "exposure"),
    (LayerId::Contrast, "contrast"),
    (LayerId::Highlights, "highlights"),
    (LayerId::Shadows, "shadows"),
    (LayerId::Whites, "whites"),
    (LayerId::Blacks, "blacks"),
    (LayerId::Texture, "texture"),
    (LayerId::Clarity, "clarity"),
    (LayerId::Dehaze, "dehaze"),
    (LayerId::Saturation, "saturation"),
    (LayerId::Vibrance, "vibrance"),
    (LayerId::GradingShadows, "grading_shadows"),
    (LayerId::GradingMidtones, "grading_midtones"),
    (LayerId::GradingHighlights, "grading_highlights"),
    (LayerId::GradingBalance, "grading_balance"),
    (LayerId::GradingBlending, "grading_blending"),
    (LayerId::CalibrationRed, "calibration_red"),
    (LayerId::CalibrationGreen, "calibration_green"),
    (LayerId::CalibrationBlue, "calibration_blue"),
    (LayerId::CalibrationShadowTint, "calibration_shadow_tint"),
    (LayerId::ToneCurve, "tone_curve"),
    (LayerId::ExternalLut, "external_lut"),
    (LayerId::CinematicToneMap, "cinematic_tone_map"),
];

const HSL_PREFIX: &str = "hsl_";

impl LayerId {
    /// Every layer, HSL bands in panel order.
    pub fn all() -> Vec<LayerId> {
        let mut layers: Vec<LayerId> = SIMPLE_LAYERS.iter().map(|(id, _)| *id).collect();
        layers.extend(HueBand::ALL.map(LayerId::Hsl));
        layers
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let LayerId::Hsl(band) = self {
            return write!(f, "{HSL_PREFIX}{}", band.name());
        }
        let name = SIMPLE_LAYERS
            .iter()
            .find(|(id, _)| id == self)
            .map_or("unknown", |(_, name)| name);
        f.write_str(name)
    }
}

impl FromStr for LayerId {
    type Err = SoloError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        if let Some(band) = key.strip_prefix(HSL_PREFIX) {
            return HueBand::ALL
                .into_iter()
                .find(|b| b.name() == band)
                .map(LayerId::Hsl)
                .ok_or_else(|| SoloError::UnknownLayer(s.to_string()));
        }
        SIMPLE_LAYERS
            .iter()
            .find(|(_, name)| *name == key)
            .map(|(id, _)| *id)
            .ok_or_else(|| SoloError::UnknownLayer(s.to_string()))
    }
}

impl TryFrom<String> for LayerId {
    type Error = SoloError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<LayerId> for String {
    fn from(id: LayerId) -> Self {
        id.to_string()
    }
}

pub type SoloSet = BTreeSet<LayerId>;

/// Parse a comma-separated layer list such as `"exposure, hsl_red"`.
/// Empty entries are skipped.
pub fn parse_layers(list: &str) -> Result<SoloSet, SoloError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

/// How the grading balance follows the selected zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BalancePolicy {
    /// Balance is copied only when [`LayerId::GradingBalance`] is named.
    /// Soloing a zone alone resets balance to neutral.
    #[default]
    Explicit,
    /// Any selected grading zone also carries the authored balance.
    FollowZones,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SoloOptions {
    pub balance: BalancePolicy,
}

/// Solo with the default options.
pub fn solo(look: &Look, layers: &SoloSet) -> Look {
    solo_with(look, layers, SoloOptions::default())
}

pub fn solo_with(look: &Look, layers: &SoloSet, options: SoloOptions) -> Look {
    let mut out = Look::neutral();
    if layers.is_empty() {
        return out;
    }

    let has_zone = [
        LayerId::GradingShadows,
        LayerId::GradingMidtones,
        LayerId::GradingHighlights,
    ]
    .iter()
    .any(|id| layers.contains(id));

    for layer in layers {
        match *layer {
            LayerId::Temperature => out.white_balance.temperature = look.white_balance.temperature,
            LayerId::Tint => out.white_balance.tint = look.white_balance.tint,
            LayerId::Exposure => out.tone.exposure = look.tone.exposure,
            LayerId::Contrast => out.tone.contrast = look.tone.contrast,
            LayerId::Highlights => out.tone.highlights = look.tone.highlights,
            LayerId::Shadows => out.tone.shadows = look.tone.shadows,
            LayerId::Whites => out.tone.whites = look.tone.whites,
            LayerId::Blacks => out.tone.blacks = look.tone.blacks,
            LayerId::Texture => out.presence.texture = look.presence.texture,
            LayerId::Clarity => out.presence.clarity = look.presence.clarity,
            LayerId::Dehaze => out.presence.dehaze = look.presence.dehaze,
            LayerId::Saturation => out.color.saturation = look.color.saturation,
            LayerId::Vibrance => out.color.vibrance = look.color.vibrance,
            LayerId::GradingShadows => out.color_grading.shadows = look.color_grading.shadows,
            LayerId::GradingMidtones => out.color_grading.midtones = look.color_grading.midtones,
            LayerId::GradingHighlights => {
                out.color_grading.highlights = look.color_grading.highlights;
            }
            LayerId::GradingBalance => out.color_grading.balance = look.color_grading.balance,
            LayerId::GradingBlending => out.color_grading.blending = look.color_grading.blending,
            LayerId::Hsl(band) => *out.hsl.get_mut(band) = *look.hsl.get(band),
            LayerId::CalibrationRed => out.calibration.red = look.calibration.red,
            LayerId::CalibrationGreen => out.calibration.green = look.calibration.green,
            LayerId::CalibrationBlue => out.calibration.blue = look.calibration.blue,
            LayerId::CalibrationShadowTint => {
                out.calibration.shadow_tint = look.calibration.shadow_tint;
            }
            LayerId::ToneCurve => out.tone_curve = look.tone_curve.clone(),
            LayerId::ExternalLut => out.rendering.lut_opacity = look.rendering.lut_opacity,
            LayerId::CinematicToneMap => {
                out.rendering.cinematic_tone_map = look.rendering.cinematic_tone_map;
            }
        }
    }

    if options.balance == BalancePolicy::FollowZones && has_zone {
        out.color_grading.balance = look.color_grading.balance;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::look::{CurvePoint, GradeZone};

    fn full_look() -> Look {
        let mut look = Look::neutral();
        look.white_balance.temperature = 12.0;
        look.tone.exposure = 0.7;
        look.tone.highlights = -40.0;
        look.presence.clarity = 15.0;
        look.color.vibrance = 20.0;
        look.color_grading.shadows = GradeZone {
            hue: 210.0,
            saturation: 25.0,
            luminance: -5.0,
        };
        look.color_grading.highlights.hue = 45.0;
        look.color_grading.balance = 30.0;
        look.color_grading.blending = 70.0;
        look.hsl.get_mut(HueBand::Orange).saturation = -10.0;
        look.hsl.get_mut(HueBand::Blue).luminance = 18.0;
        look.calibration.shadow_tint = 4.0;
        look.tone_curve.composite = vec![CurvePoint::new(0.0, 10.0), CurvePoint::new(255.0, 245.0)];
        look.rendering.cinematic_tone_map = true;
        look
    }

    fn set(ids: &[LayerId]) -> SoloSet {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_empty_set_is_neutral() {
        assert!(solo(&full_look(), &SoloSet::new()).is_neutral());
    }

    #[test]
    fn test_single_layer_isolation() {
        let look = full_look();
        let out = solo(&look, &set(&[LayerId::Exposure]));
        let mut expected = Look::neutral();
        expected.tone.exposure = 0.7;
        assert_eq!(out, expected);
    }

    #[test]
    fn test_zone_copied_atomically() {
        let look = full_look();
        let out = solo(&look, &set(&[LayerId::GradingShadows]));
        assert_eq!(out.color_grading.shadows, look.color_grading.shadows);
        assert_eq!(out.color_grading.highlights, GradeZone::default());
    }

    #[test]
    fn test_zone_without_balance_resets_balance() {
        let look = full_look();
        let out = solo(&look, &set(&[LayerId::GradingShadows]));
        assert_eq!(out.color_grading.balance, 0.0);
        let with = solo(&look, &set(&[LayerId::GradingShadows, LayerId::GradingBalance]));
        assert_eq!(with.color_grading.balance, 30.0);
    }

    #[test]
    fn test_follow_zones_policy_carries_balance() {
        let look = full_look();
        let options = SoloOptions {
            balance: BalancePolicy::FollowZones,
        };
        let out = solo_with(&look, &set(&[LayerId::GradingHighlights]), options);
        assert_eq!(out.color_grading.balance, 30.0);
        let unrelated = solo_with(&look, &set(&[LayerId::Exposure]), options);
        assert_eq!(unrelated.color_grading.balance, 0.0);
    }

    #[test]
    fn test_hsl_band_copied_whole() {
        let look = full_look();
        let out = solo(&look, &set(&[LayerId::Hsl(HueBand::Blue)]));
        assert_eq!(out.hsl.get(HueBand::Blue), look.hsl.get(HueBand::Blue));
        assert_eq!(out.hsl.get(HueBand::Orange).saturation, 0.0);
    }

    #[test]
    fn test_all_layers_reproduce_look() {
        let look = full_look();
        let everything: SoloSet = LayerId::all().into_iter().collect();
        assert_eq!(solo(&look, &everything), look);
    }

    #[test]
    fn test_layer_ids_roundtrip_strings() {
        for id in LayerId::all() {
            let text = id.to_string();
            assert_eq!(text.parse::<LayerId>(), Ok(id), "{text}");
        }
        assert_eq!(LayerId::Hsl(HueBand::Aqua).to_string(), "hsl_aqua");
        assert_eq!(
            "hsl_teal".parse::<LayerId>(),
            Err(SoloError::UnknownLayer("hsl_teal".into()))
        );
    }

    #[test]
    fn test_parse_layers_list() {
        let layers = parse_layers("exposure, hsl_red,,calibration_shadow_tint").unwrap();
        assert_eq!(layers.len(), 3);
        assert!(layers.contains(&LayerId::Hsl(HueBand::Red)));
        assert!(parse_layers("exposure,bogus").is_err());
        assert!(parse_layers("").unwrap().is_empty());
    }

    #[test]
    fn test_layer_id_serde() {
        let json = serde_json::to_string(&LayerId::GradingMidtones).unwrap();
        assert_eq!(json, "\"grading_midtones\"");
        let back: LayerId = serde_json::from_str("\"tone_curve\"").unwrap();
        assert_eq!(back, LayerId::ToneCurve);
    }
}
