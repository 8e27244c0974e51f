//! WAV input for the scoring pipeline.

use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::error::{EngineError, Result};

/// Read a WAV file into a mono f64 waveform plus its sample rate.
///
/// Integer formats are normalized to [-1, 1]; float formats pass
/// through. Multi-channel files are downmixed by averaging channels.
pub fn read_wav(path: &Path) -> Result<(Vec<f64>, u32)> {
    let reader = WavReader::open(path)
        .map_err(|e| EngineError::InvalidAudio(format!("{}: {e}", path.display())))?;

    let spec = reader.spec();
    let sample_rate = spec.sample_rate;
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f64> = match spec.sample_format {
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f64;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f64 / max_val))
                .collect::<std::result::Result<_, _>>()
        }
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<_, _>>(),
    }
    .map_err(|e| EngineError::InvalidAudio(format!("{}: {e}", path.display())))?;

    if channels == 1 {
        return Ok((interleaved, sample_rate));
    }

    let mono = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f64>() / frame.len() as f64)
        .collect();
    Ok((mono, sample_rate))
}
