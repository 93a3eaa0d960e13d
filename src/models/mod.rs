//! Acoustic-model collaborator contract.
//!
//! The network itself (encoder, attention, decoder, post-net) lives outside
//! this crate; the synthesizer only drives it through [`AcousticModel`].

use std::path::Path;

use candle_core::{Device, Tensor};

use crate::config::SynthesizerConfig;
use crate::error::Result;

/// One batched forward pass worth of model output.
#[derive(Debug)]
pub struct ModelOutput {
    /// Decoder output before post-net refinement, shape
    /// `(batch, num_mels, frames)`.
    pub decoder_out: Tensor,
    /// Refined mel predictions, shape `(batch, num_mels, frames)`.
    pub mel: Tensor,
    /// Attention weights, shape `(batch, decoder_steps, encoder_steps)`.
    pub alignments: Tensor,
}

/// Contract a pretrained sequence-to-sequence acoustic model is driven
/// through.
///
/// Implementations construct the network from configuration dimensions,
/// restore weights from a checkpoint, and run batched inference. There is no
/// training path in this crate, so `load` must leave the model in inference
/// mode.
pub trait AcousticModel: Sized {
    /// Construct the network on `device` with dimensions from `config`.
    ///
    /// `num_symbols` is the size of the symbol table the token ids index
    /// into.
    fn build(config: &SynthesizerConfig, num_symbols: usize, device: &Device) -> Result<Self>;

    /// Restore weights from a checkpoint file.
    fn load(&mut self, path: &Path) -> Result<()>;

    /// Training step recorded in the restored checkpoint.
    fn step(&self) -> usize;

    /// Mel frames the decoder emits per step.
    fn reduction_factor(&self) -> usize;

    /// Run one batched forward pass.
    ///
    /// `tokens` is a u32 tensor of shape `(batch, max_len)`, right-padded
    /// with the pad id; `speakers` is an f32 tensor of shape
    /// `(batch, speaker_embed_dims)` holding one embedding per row.
    fn generate(&mut self, tokens: &Tensor, speakers: &Tensor) -> Result<ModelOutput>;
}
