//! Central parameter struct that defines a complete look.
//!
//! `Look` is the single source of truth for every adjustment channel. A
//! recommendation, a manual edit, or the solo compositor produces one; the
//! host engine normalizes it into shader units every frame.
//!
//! Values use the authoring scale of the raw engine being emulated: most
//! sliders run −100..+100, exposure is in EV, hues are in degrees.

use serde::{Deserialize, Serialize};

/// Neutral color-grading blend amount.
pub const NEUTRAL_BLENDING: f32 = 50.0;

/// Temperature and tint.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WhiteBalance {
    /// Warm (+) / cool (−) shift. −100..+100.
    pub temperature: f32,
    /// Magenta (+) / green (−) shift. −100..+100.
    pub tint: f32,
}

/// Global tone sliders.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tone {
    /// Exposure in EV. −5..+5.
    pub exposure: f32,
    pub contrast: f32,
    pub highlights: f32,
    pub shadows: f32,
    pub whites: f32,
    pub blacks: f32,
}

/// Texture, clarity and dehaze.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Presence {
    pub texture: f32,
    pub clarity: f32,
    pub dehaze: f32,
}

/// Global chroma sliders.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorAdjust {
    pub saturation: f32,
    pub vibrance: f32,
}

/// One split-toning zone. Hue, saturation and luminance travel together.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeZone {
    /// Tint hue in degrees, 0..360.
    pub hue: f32,
    /// Tint strength, 0..100.
    pub saturation: f32,
    /// Zone luminance offset, −100..+100.
    pub luminance: f32,
}

/// Three-way color grading (split toning).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorGrading {
    pub shadows: GradeZone,
    pub midtones: GradeZone,
    pub highlights: GradeZone,
    /// Moves the shadow/highlight crossover. −100..+100, 0 = neutral.
    pub balance: f32,
    /// Width of the zone transitions. 0..100, 50 = neutral.
    pub blending: f32,
}

impl Default for ColorGrading {
    fn default() -> Self {
        Self {
            shadows: GradeZone::default(),
            midtones: GradeZone::default(),
            highlights: GradeZone::default(),
            balance: 0.0,
            blending: NEUTRAL_BLENDING,
        }
    }
}

/// The eight named hue sectors of the HSL panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HueBand {
    Red,
    Orange,
    Yellow,
    Green,
    Aqua,
    Blue,
    Purple,
    Magenta,
}

impl HueBand {
    /// All bands in panel order (matches the index into [`HslBands`]).
    pub const ALL: [HueBand; 8] = [
        HueBand::Red,
        HueBand::Orange,
        HueBand::Yellow,
        HueBand::Green,
        HueBand::Aqua,
        HueBand::Blue,
        HueBand::Purple,
        HueBand::Magenta,
    ];

    /// Index into [`HslBands::bands`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Center of the band in degrees.
    pub const fn center_degrees(self) -> f32 {
        match self {
            Self::Red => 0.0,
            Self::Orange => 30.0,
            Self::Yellow => 60.0,
            Self::Green => 120.0,
            Self::Aqua => 180.0,
            Self::Blue => 240.0,
            Self::Purple => 270.0,
            Self::Magenta => 300.0,
        }
    }

    /// Raised-cosine half-width in degrees. Orange and yellow sit close
    /// together and get narrow windows; green through blue span wide gaps.
    pub const fn half_width_degrees(self) -> f32 {
        match self {
            Self::Red => 30.0,
            Self::Orange => 20.0,
            Self::Yellow => 25.0,
            Self::Green => 50.0,
            Self::Aqua => 50.0,
            Self::Blue => 45.0,
            Self::Purple => 30.0,
            Self::Magenta => 35.0,
        }
    }

    /// Lowercase name used in layer identifiers and payload keys.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Aqua => "aqua",
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Magenta => "magenta",
        }
    }
}

/// One HSL band adjustment. All three values are −100..+100.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HslBand {
    pub hue: f32,
    pub saturation: f32,
    pub luminance: f32,
}

/// The full 8-band HSL panel, indexed by [`HueBand::index`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HslBands {
    pub bands: [HslBand; 8],
}

impl HslBands {
    pub fn get(&self, band: HueBand) -> &HslBand {
        &self.bands[band.index()]
    }

    pub fn get_mut(&mut self, band: HueBand) -> &mut HslBand {
        &mut self.bands[band.index()]
    }
}

/// Hue and saturation offset for one camera primary. −100..+100.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimaryShift {
    pub hue: f32,
    pub saturation: f32,
}

/// Camera calibration panel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub red: PrimaryShift,
    pub green: PrimaryShift,
    pub blue: PrimaryShift,
    /// Shadow tint, magenta (+) / green (−). −100..+100.
    pub shadow_tint: f32,
}

/// One tone-curve control point in the 0..255 domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f32,
    pub y: f32,
}

impl CurvePoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Composite and per-channel tone curves.
///
/// An empty channel list means "no curve" for that channel. Lists with a
/// single point are kept as authored but evaluate as identity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneCurve {
    pub composite: Vec<CurvePoint>,
    pub red: Vec<CurvePoint>,
    pub green: Vec<CurvePoint>,
    pub blue: Vec<CurvePoint>,
}

impl ToneCurve {
    /// True when any channel carries control points.
    ///
    /// Point count is not checked here: a one-point curve still counts as
    /// curve data and causes the engine to rebuild (to identity).
    pub fn has_data(&self) -> bool {
        !self.composite.is_empty()
            || !self.red.is_empty()
            || !self.green.is_empty()
            || !self.blue.is_empty()
    }
}

/// Output-stage switches.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderFlags {
    /// Apply the filmic tone-map as the final stage.
    pub cinematic_tone_map: bool,
    /// Mix factor for the external 3-D LUT, 0..1.
    pub lut_opacity: f32,
}

/// Every adjustment in one value. `Look::default()` is the neutral look:
/// rendering it reproduces the source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Look {
    pub white_balance: WhiteBalance,
    pub tone: Tone,
    pub presence: Presence,
    pub color: ColorAdjust,
    pub color_grading: ColorGrading,
    pub hsl: HslBands,
    pub calibration: Calibration,
    pub tone_curve: ToneCurve,
    pub rendering: RenderFlags,
}

impl Look {
    /// The neutral (no-op) look.
    pub fn neutral() -> Self {
        Self::default()
    }

    /// True when this look equals the neutral look field for field.
    pub fn is_neutral(&self) -> bool {
        *self == Self::neutral()
    }
}
