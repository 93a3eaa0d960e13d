//! # tacotron-tts
//!
//! Lazy-loading inference wrapper around a Tacotron-style acoustic model,
//! built on [candle](https://github.com/huggingface/candle).
//!
//! The crate turns raw text plus speaker embeddings into mel-spectrograms.
//! It owns everything around the network: symbol-table tokenization,
//! batching and padding, device placement, checkpoint loading, and
//! trailing-silence trimming. The network itself sits behind the
//! [`AcousticModel`] trait, and waveform DSP behind
//! [`SignalProcessor`](audio::SignalProcessor).
//!
//! ## Features
//!
//! - **Lazy loading**: weights load on the first synthesis call
//! - **Batched inference** with right-padding to the longest entry per batch
//! - **ARPAbet escapes**: `{...}` spans tokenize as phonetic units
//! - **CUDA** and **Metal** support behind cargo features
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tacotron_tts::{CleanerRegistry, Synthesizer, SynthesizerConfig};
//!
//! let registry = CleanerRegistry::new();
//! let config = SynthesizerConfig::default();
//! let mut synthesizer: Synthesizer<MyModel> =
//!     Synthesizer::new("tacotron.bin", config, &registry)?;
//!
//! let embedding = vec![0.0f32; 256];
//! let spectrograms = synthesizer.synthesize(&["Hello, world!"], &[embedding])?;
//! println!("{:?}", spectrograms[0].dims());
//! ```
//!
//! ## Pipeline
//!
//! 1. **Tokenize**: each text is trimmed, run through the configured
//!    cleaners, and mapped to symbol ids, with `{...}` spans read as
//!    ARPAbet units and an end-of-sequence marker appended.
//! 2. **Batch**: inputs are grouped into fixed-size batches, and every
//!    batch is right-padded to its own longest sequence.
//! 3. **Generate**: the model maps token and embedding batches to
//!    mel-spectrograms.
//! 4. **Trim**: trailing frames quieter than the stop threshold are
//!    dropped, keeping at least one frame per spectrogram.

pub mod audio;
pub mod config;
pub mod error;
pub mod models;
pub mod text;

use std::path::{Path, PathBuf};

use candle_core::{Device, IndexOp, Tensor};

pub use audio::{AudioBuffer, SignalProcessor};
pub use config::{AudioConfig, ModelConfig, SynthesisConfig, SynthesizerConfig};
pub use error::{Error, Result};
pub use models::{AcousticModel, ModelOutput};
pub use text::{CleanerRegistry, SymbolTable, TextTokenizer};

enum ModelState<M> {
    Unloaded,
    Loaded(M),
}

/// Inference front-end for a Tacotron-style spectrogram generator.
///
/// Owns tokenization, batching, device placement, and checkpoint loading;
/// the network itself stays behind the [`AcousticModel`] parameter. Weights
/// load lazily, so construction is cheap and the first synthesis call pays
/// the load cost. All work runs on the calling thread.
pub struct Synthesizer<M: AcousticModel> {
    weights_path: PathBuf,
    config: SynthesizerConfig,
    device: Device,
    tokenizer: TextTokenizer,
    state: ModelState<M>,
}

impl<M: AcousticModel> Synthesizer<M> {
    /// Create a synthesizer on the best available device.
    ///
    /// The checkpoint at `weights_path` is not opened here; it loads on the
    /// first call that needs the model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the configuration fails validation or
    /// names a cleaner the registry does not know.
    pub fn new(
        weights_path: impl Into<PathBuf>,
        config: SynthesizerConfig,
        registry: &CleanerRegistry,
    ) -> Result<Self> {
        let device = auto_device();
        Self::with_device(weights_path, config, registry, device)
    }

    /// Create a synthesizer on an explicit device.
    pub fn with_device(
        weights_path: impl Into<PathBuf>,
        config: SynthesizerConfig,
        registry: &CleanerRegistry,
        device: Device,
    ) -> Result<Self> {
        config.validate()?;
        let tokenizer =
            TextTokenizer::new(SymbolTable::default(), &config.synthesis.cleaner_names, registry)?;
        Ok(Self {
            weights_path: weights_path.into(),
            config,
            device,
            tokenizer,
            state: ModelState::Unloaded,
        })
    }

    /// Configuration this synthesizer was built with.
    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    /// Device the model runs on.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Tokenizer used to map text to symbol ids.
    pub fn tokenizer(&self) -> &TextTokenizer {
        &self.tokenizer
    }

    /// Checkpoint path the model loads from.
    pub fn weights_path(&self) -> &Path {
        &self.weights_path
    }

    /// Whether the model weights are resident in memory.
    pub fn is_loaded(&self) -> bool {
        matches!(self.state, ModelState::Loaded(_))
    }

    /// Load the model weights now instead of on first use.
    ///
    /// Calling this on an already loaded synthesizer is a no-op.
    pub fn load(&mut self) -> Result<()> {
        if self.is_loaded() {
            tracing::debug!("model already loaded, skipping");
            return Ok(());
        }
        let mut model = M::build(&self.config, self.tokenizer.symbols().len(), &self.device)?;
        model.load(&self.weights_path)?;
        tracing::info!(
            "loaded '{}' trained to step {} (reduction factor {})",
            self.weights_path.display(),
            model.step(),
            model.reduction_factor()
        );
        self.state = ModelState::Loaded(model);
        Ok(())
    }

    /// Synthesize one mel-spectrogram per input text.
    ///
    /// `texts` and `embeddings` pair up index by index; every embedding must
    /// have the configured `speaker_embed_dims` width. Inputs are processed
    /// in batches of `batch_size`, and outputs come back in input order with
    /// trailing silence trimmed. Each spectrogram has shape
    /// `(num_mels, frames)` with at least one frame.
    ///
    /// Empty input is answered with an empty vector without touching the
    /// model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Precondition`] for mismatched input lengths,
    /// [`Error::Load`] when the checkpoint cannot be restored, and
    /// [`Error::Inference`] when the model fails mid-batch. A failed batch
    /// discards the whole call's output.
    pub fn synthesize(&mut self, texts: &[&str], embeddings: &[Vec<f32>]) -> Result<Vec<Tensor>> {
        let (spectrograms, _) = self.run(texts, embeddings)?;
        Ok(spectrograms)
    }

    /// Like [`synthesize`](Self::synthesize), also returning the attention
    /// alignments of the final batch.
    ///
    /// Only the last batch's alignments survive a multi-batch call, so the
    /// returned tensor covers at most `batch_size` of the inputs. Callers
    /// wanting per-input alignments should submit at most `batch_size`
    /// texts. Empty input is a precondition error here, since there is no
    /// batch to report alignments for.
    pub fn synthesize_with_alignments(
        &mut self,
        texts: &[&str],
        embeddings: &[Vec<f32>],
    ) -> Result<(Vec<Tensor>, Tensor)> {
        let (spectrograms, alignments) = self.run(texts, embeddings)?;
        let alignments = alignments.ok_or_else(|| {
            Error::Precondition("no batches were generated, so no alignments exist".into())
        })?;
        Ok((spectrograms, alignments))
    }

    fn run(
        &mut self,
        texts: &[&str],
        embeddings: &[Vec<f32>],
    ) -> Result<(Vec<Tensor>, Option<Tensor>)> {
        if texts.len() != embeddings.len() {
            return Err(Error::Precondition(format!(
                "got {} texts but {} speaker embeddings",
                texts.len(),
                embeddings.len()
            )));
        }
        let embed_dims = self.config.model.speaker_embed_dims;
        for (index, embedding) in embeddings.iter().enumerate() {
            if embedding.len() != embed_dims {
                return Err(Error::Precondition(format!(
                    "speaker embedding {} has {} dimensions, expected {}",
                    index,
                    embedding.len(),
                    embed_dims
                )));
            }
        }
        if texts.is_empty() {
            return Ok((Vec::new(), None));
        }

        self.load()?;

        let sequences: Vec<Vec<u32>> = texts
            .iter()
            .map(|text| self.tokenizer.tokenize(text.trim()))
            .collect();
        let batch_size = self.config.synthesis.batch_size;
        let stop_threshold = self.config.model.stop_threshold;
        let device = self.device.clone();
        let total_batches = sequences.len().div_ceil(batch_size);

        let ModelState::Loaded(model) = &mut self.state else {
            return Err(Error::load(&self.weights_path, "model unavailable after load"));
        };

        let mut spectrograms = Vec::with_capacity(texts.len());
        let mut alignments = None;
        for (batch_index, (sequence_chunk, embedding_chunk)) in sequences
            .chunks(batch_size)
            .zip(embeddings.chunks(batch_size))
            .enumerate()
        {
            let max_len = sequence_chunk.iter().map(|s| s.len()).max().unwrap_or(0);
            tracing::debug!(
                "generating batch {}/{} ({} items, padded to {})",
                batch_index + 1,
                total_batches,
                sequence_chunk.len(),
                max_len
            );
            let mut token_data = Vec::with_capacity(sequence_chunk.len() * max_len);
            for sequence in sequence_chunk {
                token_data.extend(pad_sequence(sequence, max_len)?);
            }
            let tokens =
                Tensor::from_vec(token_data, (sequence_chunk.len(), max_len), &device)?;

            let mut speaker_data = Vec::with_capacity(embedding_chunk.len() * embed_dims);
            for embedding in embedding_chunk {
                speaker_data.extend_from_slice(embedding);
            }
            let speakers =
                Tensor::from_vec(speaker_data, (embedding_chunk.len(), embed_dims), &device)?;

            let output = model.generate(&tokens, &speakers)?;
            for item in 0..sequence_chunk.len() {
                let mel = output.mel.i(item)?;
                spectrograms.push(audio::trim_trailing_silence(&mel, stop_threshold)?);
            }
            alignments = Some(output.alignments);
        }

        Ok((spectrograms, alignments))
    }
}

/// Right-pad a token sequence to `target_len` with the padding id.
///
/// # Errors
///
/// Returns [`Error::Precondition`] when `target_len` is shorter than the
/// sequence; padding never truncates.
pub fn pad_sequence(sequence: &[u32], target_len: usize) -> Result<Vec<u32>> {
    if target_len < sequence.len() {
        return Err(Error::Precondition(format!(
            "cannot pad a sequence of length {} down to {}",
            sequence.len(),
            target_len
        )));
    }
    let mut padded = Vec::with_capacity(target_len);
    padded.extend_from_slice(sequence);
    padded.resize(target_len, 0);
    Ok(padded)
}

/// Select the best available device.
///
/// Tries CUDA, then Metal, then falls back to CPU. GPU backends are only
/// probed when the matching cargo feature is compiled in.
pub fn auto_device() -> Device {
    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::cuda_if_available(0) {
            if device.is_cuda() {
                tracing::info!("Using CUDA device");
                return device;
            }
        }
        tracing::warn!("CUDA feature enabled but no usable CUDA device, falling back");
    }

    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                tracing::info!("Using Metal device");
                return device;
            }
            Err(err) => tracing::warn!("Metal init failed ({err}), falling back"),
        }
    }

    tracing::info!("Using CPU device");
    Device::Cpu
}

/// Parse a device string into a [`Device`].
///
/// Supported formats:
/// - `"auto"` — select best available via [`auto_device`]
/// - `"cpu"` — force CPU
/// - `"cuda"` or `"cuda:N"` — CUDA device N (0 when omitted)
/// - `"metal"` — Apple Silicon GPU
///
/// # Errors
///
/// Returns [`Error::Config`] when the string is unrecognized, the requested
/// backend wasn't compiled in, or hardware initialization fails.
pub fn parse_device(device_str: &str) -> Result<Device> {
    match device_str.to_lowercase().as_str() {
        "auto" => Ok(auto_device()),
        "cpu" => Ok(Device::Cpu),
        s if s.starts_with("cuda") => {
            #[cfg(feature = "cuda")]
            {
                let ordinal: usize = if let Some(index) = s.strip_prefix("cuda:") {
                    index
                        .parse()
                        .map_err(|e| Error::Config(format!("invalid CUDA device index: {e}")))?
                } else {
                    0
                };
                Device::cuda_if_available(ordinal).map_err(|e| {
                    Error::Config(format!("failed to init CUDA device {ordinal}: {e}"))
                })
            }
            #[cfg(not(feature = "cuda"))]
            Err(Error::Config(
                "CUDA support not compiled in, rebuild with the `cuda` feature".to_string(),
            ))
        }
        "metal" => {
            #[cfg(feature = "metal")]
            {
                Device::new_metal(0)
                    .map_err(|e| Error::Config(format!("failed to init Metal device: {e}")))
            }
            #[cfg(not(feature = "metal"))]
            Err(Error::Config(
                "Metal support not compiled in, rebuild with the `metal` feature".to_string(),
            ))
        }
        other => Err(Error::Config(format!(
            "unknown device '{other}', supported: auto, cpu, cuda, cuda:N, metal"
        ))),
    }
}

/// Human-readable label for a [`Device`].
pub fn device_info(device: &Device) -> String {
    match device {
        Device::Cpu => "CPU".to_string(),
        Device::Cuda(_) => "CUDA".to_string(),
        Device::Metal(_) => "Metal".to_string(),
    }
}
