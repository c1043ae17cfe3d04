//! RGB + luminance histogram.

use serde::{Deserialize, Serialize};

use crate::error::HistogramError;
use crate::image::SourceImage;
use crate::pipeline::color::LUMA_REC709;

/// Bins per channel.
pub const BINS: usize = 256;

/// Histogram channel index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red = 0,
    Green = 1,
    Blue = 2,
    Luma = 3,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Red, Channel::Green, Channel::Blue, Channel::Luma];
}

/// Four 256-bin channels `[R, G, B, Luma]`.
///
/// Values are counts or any non-negative weight; the predictor normalizes
/// its output to 0..100 per channel. Serialized as a bare `[[f32; 256]; 4]`
/// JSON array, which is shape-checked on the way in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f32>>", into = "Vec<Vec<f32>>")]
pub struct Histogram {
    channels: [Vec<f32>; 4],
}

impl Histogram {
    /// All-zero histogram.
    pub fn empty() -> Self {
        Self {
            channels: std::array::from_fn(|_| vec![0.0; BINS]),
        }
    }

    /// Shape-check external data: exactly 4 channels of 256 finite,
    /// non-negative values.
    pub fn from_channels(channels: Vec<Vec<f32>>) -> Result<Self, HistogramError> {
        let channels: [Vec<f32>; 4] = channels
            .try_into()
            .map_err(|v: Vec<Vec<f32>>| HistogramError::ChannelCount(v.len()))?;
        for (channel, bins) in channels.iter().enumerate() {
            if bins.len() != BINS {
                return Err(HistogramError::BinCount {
                    channel,
                    len: bins.len(),
                });
            }
            if let Some((bin, &value)) = bins
                .iter()
                .enumerate()
                .find(|(_, v)| !v.is_finite() || **v < 0.0)
            {
                return Err(HistogramError::BadValue {
                    channel,
                    bin,
                    value,
                });
            }
        }
        Ok(Self { channels })
    }

    pub fn channel(&self, channel: Channel) -> &[f32] {
        &self.channels[channel as usize]
    }

    pub(crate) fn channel_mut(&mut self, channel: Channel) -> &mut [f32] {
        &mut self.channels[channel as usize]
    }

    pub fn total(&self, channel: Channel) -> f32 {
        self.channel(channel).iter().sum()
    }

    /// Mean bin index weighted by bin value. `None` for an empty channel.
    pub fn weighted_mean(&self, channel: Channel) -> Option<f32> {
        let total = self.total(channel);
        if total <= 0.0 {
            return None;
        }
        let sum: f32 = self
            .channel(channel)
            .iter()
            .enumerate()
            .map(|(i, v)| i as f32 * v)
            .sum();
        Some(sum / total)
    }
}

impl TryFrom<Vec<Vec<f32>>> for Histogram {
    type Error = HistogramError;

    fn try_from(channels: Vec<Vec<f32>>) -> Result<Self, Self::Error> {
        Self::from_channels(channels)
    }
}

impl From<Histogram> for Vec<Vec<f32>> {
    fn from(h: Histogram) -> Self {
        h.channels.into()
    }
}

/// Count pixels of a display-encoded image into R, G, B and Rec. 709 luma bins.
pub fn compute(image: &SourceImage) -> Histogram {
    let mut hist = Histogram::empty();
    for &[r, g, b, _] in &image.pixels {
        let luma = (r as f32 * LUMA_REC709.x + g as f32 * LUMA_REC709.y + b as f32 * LUMA_REC709.z)
            .round()
            .clamp(0.0, 255.0) as usize;
        hist.channels[0][r as usize] += 1.0;
        hist.channels[1][g as usize] += 1.0;
        hist.channels[2][b as usize] += 1.0;
        hist.channels[3][luma] += 1.0;
    }
    hist
}
