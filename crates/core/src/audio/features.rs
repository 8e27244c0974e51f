//! Signal-level features for pronunciation scoring: energy, framed
//! zero-crossing rate, an SNR estimate, and an autocorrelation pitch
//! track summarized over voiced frames.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Analysis frame length in samples.
const FRAME_LEN: usize = 2048;
/// Hop between frame starts in samples.
const HOP_LEN: usize = 512;
/// Reported SNR when the signal has no measurable noise component.
const SNR_CEILING_DB: f64 = 100.0;
/// Pitch search range, generous around human speech.
const F0_MIN_HZ: usize = 50;
const F0_MAX_HZ: usize = 600;
/// Frames quieter than this RMS are never voiced.
const VOICING_RMS_FLOOR: f64 = 1e-6;
/// Minimum normalized autocorrelation for a lag to count as periodic.
const PEAK_THRESHOLD: f64 = 0.3;

/// Unrounded feature set for one mono recording.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    /// Mean squared sample amplitude
    pub energy: f64,
    /// Mean per-frame zero-crossing rate
    pub zero_crossing_rate: f64,
    /// Signal-to-noise estimate in dB
    pub snr_db: f64,
    /// Mean F0 over voiced frames (Hz), 0 when none are voiced
    pub mean_pitch: f64,
    /// Population standard deviation of voiced-frame F0 (Hz)
    pub pitch_std: f64,
}

impl AudioFeatures {
    /// Extract the full feature set from a mono waveform.
    ///
    /// The waveform must be non-empty and `sample_rate` non-zero;
    /// anything else is `InvalidAudio`.
    pub fn extract(samples: &[f64], sample_rate: u32) -> Result<Self> {
        if samples.is_empty() {
            return Err(EngineError::InvalidAudio("empty waveform".into()));
        }
        if sample_rate == 0 {
            return Err(EngineError::InvalidAudio("sample rate is zero".into()));
        }

        let (mean_pitch, pitch_std) = pitch_stats(samples, sample_rate);

        Ok(AudioFeatures {
            energy: mean_square(samples),
            zero_crossing_rate: framed_zero_crossing_rate(samples),
            snr_db: estimate_snr_db(samples),
            mean_pitch,
            pitch_std,
        })
    }
}

fn mean_square(samples: &[f64]) -> f64 {
    samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64
}

/// Split into `FRAME_LEN` frames every `HOP_LEN` samples. A signal
/// shorter than one frame is analyzed as a single whole-signal frame.
fn frames(samples: &[f64]) -> Vec<&[f64]> {
    if samples.len() < FRAME_LEN {
        return vec![samples];
    }
    let n_frames = (samples.len() - FRAME_LEN) / HOP_LEN + 1;
    let mut out = Vec::with_capacity(n_frames);
    for i in 0..n_frames {
        let start = i * HOP_LEN;
        out.push(&samples[start..start + FRAME_LEN]);
    }
    out
}

/// Mean over frames of (sign flips / frame length). A sign flip is an
/// adjacent sample pair with a strictly negative product, so exact
/// zeros never count.
fn framed_zero_crossing_rate(samples: &[f64]) -> f64 {
    let frames = frames(samples);
    let total: f64 = frames.iter().map(|f| frame_zcr(f)).sum();
    total / frames.len() as f64
}

fn frame_zcr(frame: &[f64]) -> f64 {
    if frame.len() < 2 {
        return 0.0;
    }
    let flips = frame.windows(2).filter(|w| w[0] * w[1] < 0.0).count();
    flips as f64 / frame.len() as f64
}

/// SNR in dB: mean squared amplitude over the population variance of
/// the mean-removed signal. Zero variance (DC or silence) reports the
/// ceiling sentinel instead of a division by zero.
fn estimate_snr_db(samples: &[f64]) -> f64 {
    let signal_power = mean_square(samples);
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    let noise_power =
        samples.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / samples.len() as f64;

    if noise_power == 0.0 {
        return SNR_CEILING_DB;
    }
    10.0 * (signal_power / noise_power).log10()
}

/// Mean and population standard deviation of per-frame pitch estimates,
/// voiced frames only. `(0.0, 0.0)` when no frame is voiced.
fn pitch_stats(samples: &[f64], sample_rate: u32) -> (f64, f64) {
    let mut voiced = Vec::new();
    for frame in frames(samples) {
        if let Some(f0) = frame_pitch(frame, sample_rate) {
            voiced.push(f0);
        }
    }

    if voiced.is_empty() {
        return (0.0, 0.0);
    }

    let mean = voiced.iter().sum::<f64>() / voiced.len() as f64;
    let var = voiced.iter().map(|p| (p - mean) * (p - mean)).sum::<f64>() / voiced.len() as f64;
    (mean, var.sqrt())
}

/// Autocorrelation pitch estimate for one frame.
///
/// Scans from the shortest lag (highest frequency) and takes the first
/// normalized autocorrelation peak above the periodicity threshold,
/// avoiding octave-down errors. `None` for silence, noise, or weak
/// periodicity.
fn frame_pitch(frame: &[f64], sample_rate: u32) -> Option<f64> {
    if frame.len() < 2 {
        return None;
    }

    let rms = mean_square(frame).sqrt();
    if rms < VOICING_RMS_FLOOR {
        return None;
    }

    let lag_min = (sample_rate as usize / F0_MAX_HZ).max(1);
    let lag_max = (sample_rate as usize / F0_MIN_HZ).min(frame.len() - 1);
    if lag_min >= lag_max {
        return None;
    }

    // Remove DC offset before correlating
    let mean: f64 = frame.iter().sum::<f64>() / frame.len() as f64;
    let x: Vec<f64> = frame.iter().map(|s| s - mean).collect();

    let energy: f64 = x.iter().map(|v| v * v).sum();
    if energy < 1e-12 {
        return None;
    }

    let mut autocorr = Vec::with_capacity(lag_max - lag_min + 1);
    for lag in lag_min..=lag_max {
        let sum: f64 = x[..x.len() - lag]
            .iter()
            .zip(x[lag..].iter())
            .map(|(a, b)| a * b)
            .sum();
        autocorr.push(sum / energy);
    }

    // Left boundary counts as a peak if it dominates its neighbor
    if autocorr.len() >= 2 && autocorr[0] >= PEAK_THRESHOLD && autocorr[0] >= autocorr[1] {
        return Some(sample_rate as f64 / lag_min as f64);
    }

    for i in 1..autocorr.len().saturating_sub(1) {
        if autocorr[i] >= PEAK_THRESHOLD
            && autocorr[i] >= autocorr[i - 1]
            && autocorr[i] >= autocorr[i + 1]
        {
            return Some(sample_rate as f64 / (lag_min + i) as f64);
        }
    }

    None
}
