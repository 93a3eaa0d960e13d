//! Immutable synthesizer configuration.
//!
//! One [`SynthesizerConfig`] is built at startup (from defaults or a JSON
//! file) and passed by reference into the tokenizer and orchestrator
//! constructors. Nothing in the crate reads configuration from globals.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Signal-processing parameters.
///
/// The crate itself only consumes `sample_rate`, `num_mels`, `rescale` and
/// `rescaling_max`; the rest is carried verbatim to the external DSP
/// collaborator so that spectrograms are computed with the same settings the
/// model was trained with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// FFT size used by the DSP collaborator.
    #[serde(default = "default_n_fft")]
    pub n_fft: usize,

    /// Mel channels per spectrogram frame.
    #[serde(default = "default_num_mels")]
    pub num_mels: usize,

    /// Samples between successive frames.
    #[serde(default = "default_hop_size")]
    pub hop_size: usize,

    /// Analysis window length in samples.
    #[serde(default = "default_win_size")]
    pub win_size: usize,

    /// Lower edge of the mel filterbank in Hz.
    #[serde(default = "default_fmin")]
    pub fmin: f32,

    /// Upper edge of the mel filterbank in Hz.
    #[serde(default = "default_fmax")]
    pub fmax: f32,

    /// Floor for log-magnitude normalization in dB.
    #[serde(default = "default_min_level_db")]
    pub min_level_db: f32,

    /// Reference level subtracted before normalization in dB.
    #[serde(default = "default_ref_level_db")]
    pub ref_level_db: f32,

    /// Magnitude of the normalized spectrogram range.
    #[serde(default = "default_max_abs_value")]
    pub max_abs_value: f32,

    /// Pre-emphasis filter coefficient.
    #[serde(default = "default_preemphasis")]
    pub preemphasis: f32,

    /// Whether the DSP collaborator applies pre-emphasis.
    #[serde(default = "default_preemphasize")]
    pub preemphasize: bool,

    /// Whether loaded waveforms are peak-rescaled.
    #[serde(default = "default_rescale")]
    pub rescale: bool,

    /// Target peak amplitude for rescaled waveforms.
    #[serde(default = "default_rescaling_max")]
    pub rescaling_max: f32,

    /// Griffin-Lim iterations used when inverting a spectrogram.
    #[serde(default = "default_griffin_lim_iters")]
    pub griffin_lim_iters: usize,

    /// Spectrogram magnitude exponent applied before inversion.
    #[serde(default = "default_power")]
    pub power: f32,
}

/// Architecture dimensions handed to the acoustic-model collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Character embedding size.
    #[serde(default = "default_embed_dims")]
    pub embed_dims: usize,

    /// Encoder channel width.
    #[serde(default = "default_encoder_dims")]
    pub encoder_dims: usize,

    /// Decoder channel width.
    #[serde(default = "default_decoder_dims")]
    pub decoder_dims: usize,

    /// Post-net channel width.
    #[serde(default = "default_postnet_dims")]
    pub postnet_dims: usize,

    /// Encoder convolution bank size.
    #[serde(default = "default_encoder_k")]
    pub encoder_k: usize,

    /// Post-net convolution bank size.
    #[serde(default = "default_postnet_k")]
    pub postnet_k: usize,

    /// Decoder LSTM width.
    #[serde(default = "default_lstm_dims")]
    pub lstm_dims: usize,

    /// Highway layers in the encoder.
    #[serde(default = "default_num_highways")]
    pub num_highways: usize,

    /// Dropout probability (training-time value, part of the checkpoint
    /// contract).
    #[serde(default = "default_dropout")]
    pub dropout: f32,

    /// Length of the speaker embedding vectors conditioned on.
    #[serde(default = "default_speaker_embed_dims")]
    pub speaker_embed_dims: usize,

    /// Mel value below which a frame counts as silence, both for the model's
    /// stop decision and for trailing-silence trimming.
    #[serde(default = "default_stop_threshold")]
    pub stop_threshold: f32,
}

/// Batching and text-normalization settings for synthesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Maximum utterances per model invocation.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Cleaner names applied, in order, to literal text runs.
    #[serde(default = "default_cleaner_names")]
    pub cleaner_names: Vec<String>,
}

/// Complete configuration for a [`Synthesizer`](crate::Synthesizer).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynthesizerConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
}

fn default_sample_rate() -> u32 {
    16000
}
fn default_n_fft() -> usize {
    800
}
fn default_num_mels() -> usize {
    80
}
fn default_hop_size() -> usize {
    200
}
fn default_win_size() -> usize {
    800
}
fn default_fmin() -> f32 {
    55.0
}
fn default_fmax() -> f32 {
    7600.0
}
fn default_min_level_db() -> f32 {
    -100.0
}
fn default_ref_level_db() -> f32 {
    20.0
}
fn default_max_abs_value() -> f32 {
    4.0
}
fn default_preemphasis() -> f32 {
    0.97
}
fn default_preemphasize() -> bool {
    true
}
fn default_rescale() -> bool {
    true
}
fn default_rescaling_max() -> f32 {
    0.9
}
fn default_griffin_lim_iters() -> usize {
    60
}
fn default_power() -> f32 {
    1.5
}

fn default_embed_dims() -> usize {
    512
}
fn default_encoder_dims() -> usize {
    256
}
fn default_decoder_dims() -> usize {
    128
}
fn default_postnet_dims() -> usize {
    512
}
fn default_encoder_k() -> usize {
    5
}
fn default_postnet_k() -> usize {
    5
}
fn default_lstm_dims() -> usize {
    1024
}
fn default_num_highways() -> usize {
    4
}
fn default_dropout() -> f32 {
    0.5
}
fn default_speaker_embed_dims() -> usize {
    256
}
fn default_stop_threshold() -> f32 {
    -3.4
}

fn default_batch_size() -> usize {
    16
}
fn default_cleaner_names() -> Vec<String> {
    vec!["basic_cleaners".to_string()]
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            n_fft: default_n_fft(),
            num_mels: default_num_mels(),
            hop_size: default_hop_size(),
            win_size: default_win_size(),
            fmin: default_fmin(),
            fmax: default_fmax(),
            min_level_db: default_min_level_db(),
            ref_level_db: default_ref_level_db(),
            max_abs_value: default_max_abs_value(),
            preemphasis: default_preemphasis(),
            preemphasize: default_preemphasize(),
            rescale: default_rescale(),
            rescaling_max: default_rescaling_max(),
            griffin_lim_iters: default_griffin_lim_iters(),
            power: default_power(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            embed_dims: default_embed_dims(),
            encoder_dims: default_encoder_dims(),
            decoder_dims: default_decoder_dims(),
            postnet_dims: default_postnet_dims(),
            encoder_k: default_encoder_k(),
            postnet_k: default_postnet_k(),
            lstm_dims: default_lstm_dims(),
            num_highways: default_num_highways(),
            dropout: default_dropout(),
            speaker_embed_dims: default_speaker_embed_dims(),
            stop_threshold: default_stop_threshold(),
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            cleaner_names: default_cleaner_names(),
        }
    }
}

impl SynthesizerConfig {
    /// Load configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults, so a partial file like
    /// `{"synthesis": {"batch_size": 4}}` is valid.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read '{}': {e}", path.display())))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("cannot parse '{}': {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the synthesis pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.synthesis.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".into()));
        }
        if self.audio.num_mels == 0 {
            return Err(Error::Config("num_mels must be at least 1".into()));
        }
        if self.audio.sample_rate == 0 {
            return Err(Error::Config("sample_rate must be positive".into()));
        }
        if self.model.speaker_embed_dims == 0 {
            return Err(Error::Config(
                "speaker_embed_dims must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
