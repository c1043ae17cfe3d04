//! Analytic histogram prediction.
//!
//! Estimates how the tone sliders reshape a base histogram without
//! re-rendering. This is a fast approximation for scope feedback; only
//! exposure, contrast, highlights and shadows are modelled.

use super::histogram::{BINS, Channel, Histogram};
use crate::look::Look;
use crate::pipeline::StageInputs;

/// Bins moved per EV of exposure.
pub const BINS_PER_EV: f32 = 25.0;
/// First bin re-weighted by the highlights slider.
pub const HIGHLIGHT_START: usize = 170;
/// Last bin re-weighted by the shadows slider.
pub const SHADOW_END: usize = 85;
/// Display scale of the predicted histogram.
pub const DISPLAY_MAX: f32 = 100.0;

const PIVOT: f32 = 128.0;
const LAST: usize = BINS - 1;

/// Predict the histogram of `look` applied to the image `base` came from.
/// Every channel is renormalized so its peak is [`DISPLAY_MAX`].
///
/// Sliders go through [`StageInputs::from_look`], so out-of-range or
/// non-finite values are clamped exactly as the renderer clamps them.
pub fn predict(base: &Histogram, look: &Look) -> Histogram {
    let inputs = StageInputs::from_look(look);

    let mut out = Histogram::empty();
    for channel in Channel::ALL {
        let mut bins = base.channel(channel).to_vec();
        if inputs.exposure != 0.0 {
            bins = shift(&bins, (inputs.exposure * BINS_PER_EV).round() as i64);
        }
        if inputs.contrast != 0.0 {
            bins = stretch(&bins, 1.0 + inputs.contrast / 2.0);
        }
        if inputs.highlights != 0.0 {
            reweight_highlights(&mut bins, inputs.highlights);
        }
        if inputs.shadows != 0.0 {
            reweight_shadows(&mut bins, inputs.shadows);
        }
        normalize(&mut bins);
        out.channel_mut(channel).copy_from_slice(&bins);
    }
    out
}

/// Move every bin by `offset`, accumulating into the clamped target so no
/// mass is lost at either end.
fn shift(bins: &[f32], offset: i64) -> Vec<f32> {
    let mut out = vec![0.0; BINS];
    for (i, &count) in bins.iter().enumerate() {
        let target = (i as i64).saturating_add(offset).clamp(0, LAST as i64) as usize;
        out[target] += count;
    }
    out
}

/// Scale bin positions around [`PIVOT`], accumulating into clamped targets.
fn stretch(bins: &[f32], factor: f32) -> Vec<f32> {
    let mut out = vec![0.0; BINS];
    for (i, &count) in bins.iter().enumerate() {
        let target = (PIVOT + (i as f32 - PIVOT) * factor)
            .round()
            .clamp(0.0, LAST as f32) as usize;
        out[target] += count;
    }
    out
}

/// `amount` is −1..1.
fn reweight_highlights(bins: &mut [f32], amount: f32) {
    let span = (LAST - HIGHLIGHT_START) as f32;
    for (i, count) in bins.iter_mut().enumerate().skip(HIGHLIGHT_START) {
        let dist = (i - HIGHLIGHT_START) as f32 / span;
        *count *= (1.0 + amount * dist * 0.5).max(0.0);
    }
}

/// `amount` is −1..1.
fn reweight_shadows(bins: &mut [f32], amount: f32) {
    let span = SHADOW_END as f32;
    for (i, count) in bins.iter_mut().enumerate().take(SHADOW_END + 1) {
        let dist = (SHADOW_END - i) as f32 / span;
        *count *= (1.0 - amount * dist * 0.5).max(0.0);
    }
}

fn normalize(bins: &mut [f32]) {
    let peak = bins.iter().copied().fold(0.0f32, f32::max);
    if peak > 0.0 {
        let scale = DISPLAY_MAX / peak;
        bins.iter_mut().for_each(|v| *v *= scale);
    }
}
