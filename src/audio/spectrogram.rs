//! Spectrogram post-processing and the DSP collaborator seam.

use candle_core::Tensor;

use crate::config::AudioConfig;
use crate::error::{Error, Result};

use super::AudioBuffer;

/// External DSP collaborator converting between waveforms and
/// mel-spectrograms.
///
/// The synthesizer never computes spectrograms itself; filterbank
/// construction, STFT, and Griffin-Lim all belong to the implementor. The
/// passed [`AudioConfig`] carries the training-time parameters an
/// implementation is expected to honor.
pub trait SignalProcessor {
    /// Compute a mel-spectrogram, shape `(num_mels, frames)`, from a mono
    /// waveform.
    fn mel_spectrogram(&self, samples: &[f32], config: &AudioConfig) -> Result<Tensor>;

    /// Reconstruct a waveform from a mel-spectrogram.
    fn inverse_mel_spectrogram(&self, mel: &Tensor, config: &AudioConfig) -> Result<Vec<f32>>;
}

/// Compute the mel-spectrogram of `wav` through `processor`.
///
/// Parameters are passed through untouched; a buffer whose rate differs
/// from the configured one only earns a warning, since the collaborator may
/// be deliberately reinterpreting the audio.
pub fn mel_spectrogram<P: SignalProcessor>(
    wav: &AudioBuffer,
    config: &AudioConfig,
    processor: &P,
) -> Result<Tensor> {
    if wav.sample_rate != config.sample_rate {
        tracing::warn!(
            "computing a mel-spectrogram of {} Hz audio with {} Hz settings",
            wav.sample_rate,
            config.sample_rate
        );
    }
    processor.mel_spectrogram(&wav.samples, config)
}

/// Invert `mel` back to a waveform through `processor` (Griffin-Lim or
/// equivalent), at the configured sample rate.
pub fn inverse_mel_spectrogram<P: SignalProcessor>(
    mel: &Tensor,
    config: &AudioConfig,
    processor: &P,
) -> Result<AudioBuffer> {
    let samples = processor.inverse_mel_spectrogram(mel, config)?;
    Ok(AudioBuffer::new(samples, config.sample_rate))
}

/// Drop trailing silent frames from a `(num_mels, frames)` spectrogram.
///
/// A frame counts as silent when the maximum over its mel channels is below
/// `threshold`. At least one frame is always kept, so an all-silent input
/// trims to a single frame. A zero-frame input is a precondition error.
pub fn trim_trailing_silence(mel: &Tensor, threshold: f32) -> Result<Tensor> {
    let (_, frames) = mel.dims2()?;
    if frames == 0 {
        return Err(Error::Precondition(
            "cannot trim a spectrogram with no frames".into(),
        ));
    }
    let data = mel.to_vec2::<f32>()?;
    let mut keep = frames;
    while keep > 1 {
        let column_max = data
            .iter()
            .map(|row| row[keep - 1])
            .fold(f32::NEG_INFINITY, f32::max);
        if column_max < threshold {
            keep -= 1;
        } else {
            break;
        }
    }
    Ok(mel.narrow(1, 0, keep)?)
}
