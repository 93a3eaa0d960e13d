//! Waveform loading, saving, and preprocessing.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::config::AudioConfig;
use crate::error::{Error, Result};

/// Mono waveform with its sample rate.
///
/// Samples are 32-bit floats in the `[-1.0, 1.0]` range.
///
/// # Example
///
/// ```rust,ignore
/// let wav = load_preprocess_wav("reference.wav", &config.audio)?;
/// println!("{:.2}s at {} Hz", wav.duration(), wav.sample_rate);
/// ```
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Mono samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Create a buffer from raw samples.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
    }

    /// Save as a 16-bit PCM wav file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_wav(path, &self.samples, self.sample_rate)
    }

    /// Load from a wav file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_wav(path)
    }
}

/// Load a wav file, downmixing multi-channel input to mono.
pub fn load_wav<P: AsRef<Path>>(path: P) -> Result<AudioBuffer> {
    let reader = WavReader::open(path.as_ref())?;

    let spec = reader.spec();
    let sample_rate = spec.sample_rate;
    let channels = spec.channels as usize;

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let mono = if channels > 1 {
        samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    } else {
        samples
    };

    Ok(AudioBuffer::new(mono, sample_rate))
}

/// Save samples as a 16-bit PCM wav file.
pub fn save_wav<P: AsRef<Path>>(path: P, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path.as_ref(), spec)?;
    for &sample in samples {
        let clamped = sample.clamp(-1.0, 1.0);
        writer.write_sample((clamped * 32767.0) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Load a waveform the way training-time preprocessing did.
///
/// The file must already be at the configured sample rate; a mismatch is a
/// precondition error rather than a silent resample. When `rescale` is set
/// the waveform is scaled so its peak sits at `rescaling_max` (silent input
/// is left untouched).
pub fn load_preprocess_wav<P: AsRef<Path>>(path: P, config: &AudioConfig) -> Result<AudioBuffer> {
    let mut wav = load_wav(path)?;
    if wav.sample_rate != config.sample_rate {
        return Err(Error::Precondition(format!(
            "waveform is {} Hz but the configuration expects {} Hz; resample it first",
            wav.sample_rate, config.sample_rate
        )));
    }
    if config.rescale {
        let peak = wav.peak();
        if peak > 0.0 {
            let scale = config.rescaling_max / peak;
            for sample in &mut wav.samples {
                *sample *= scale;
            }
        }
    }
    Ok(wav)
}
