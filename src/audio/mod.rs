//! Audio utilities around the synthesizer.
//!
//! This module provides:
//! - WAV file I/O and reference-audio preprocessing
//! - The [`SignalProcessor`] seam to an external mel/Griffin-Lim collaborator
//! - Trailing-silence trimming of predicted spectrograms

mod io;
mod spectrogram;

pub use io::{load_preprocess_wav, load_wav, save_wav, AudioBuffer};
pub use spectrogram::{
    inverse_mel_spectrogram, mel_spectrogram, trim_trailing_silence, SignalProcessor,
};
