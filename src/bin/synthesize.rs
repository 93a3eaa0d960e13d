//! Interactive demo for the synthesizer front-end.
//!
//! Prompts for one line of text, synthesizes it with a fixed speaker
//! embedding, and prints the resulting spectrogram shape. The acoustic
//! network itself is out of scope for this crate, so a silent stand-in
//! model backs the pipeline.
//!
//! Usage:
//!     cargo run --features cli --bin synthesize -- path/to/tacotron.bin
//!     cargo run --features cli --bin synthesize -- tacotron.bin --dump-mel mel.bin

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use byteorder::{LittleEndian, WriteBytesExt};
use candle_core::{DType, Device, Tensor};
use clap::Parser;

use tacotron_tts::{
    device_info, parse_device, AcousticModel, CleanerRegistry, ModelOutput, Synthesizer,
    SynthesizerConfig,
};

/// Drive the synthesis pipeline end to end from a terminal prompt.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Checkpoint file the model weights load from
    weights: PathBuf,

    /// JSON configuration file (defaults to built-in hyperparameters)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Device for inference (auto, cpu, cuda, cuda:N, metal)
    #[arg(long, default_value = "auto")]
    device: String,

    /// Write the raw spectrogram as little-endian f32 values
    #[arg(long)]
    dump_mel: Option<PathBuf>,
}

const DEMO_REDUCTION: usize = 2;

/// Silent stand-in for a ported acoustic network.
///
/// Emits all-zero frames, one reduction group per input token, so the
/// surrounding pipeline can be exercised without real weights.
struct DemoModel {
    num_mels: usize,
}

impl AcousticModel for DemoModel {
    fn build(
        config: &SynthesizerConfig,
        _num_symbols: usize,
        _device: &Device,
    ) -> tacotron_tts::Result<Self> {
        Ok(Self {
            num_mels: config.audio.num_mels,
        })
    }

    fn load(&mut self, path: &Path) -> tacotron_tts::Result<()> {
        if path.exists() {
            Ok(())
        } else {
            Err(tacotron_tts::Error::load(path, "file not found"))
        }
    }

    fn step(&self) -> usize {
        0
    }

    fn reduction_factor(&self) -> usize {
        DEMO_REDUCTION
    }

    fn generate(
        &mut self,
        tokens: &Tensor,
        _speakers: &Tensor,
    ) -> tacotron_tts::Result<ModelOutput> {
        let (batch, max_len) = tokens.dims2()?;
        let width = max_len * DEMO_REDUCTION;
        let mel = Tensor::zeros((batch, self.num_mels, width), DType::F32, tokens.device())?;
        let alignments = Tensor::zeros((batch, width, max_len), DType::F32, tokens.device())?;
        Ok(ModelOutput {
            decoder_out: mel.clone(),
            mel,
            alignments,
        })
    }
}

/// Save a spectrogram as binary f32, row by mel row.
fn dump_mel(mel: &Tensor, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for row in mel.to_vec2::<f32>()? {
        for value in row {
            writer.write_f32::<LittleEndian>(value)?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SynthesizerConfig::from_file(path)?,
        None => SynthesizerConfig::default(),
    };
    let device = parse_device(&args.device)?;

    println!("=== Tacotron Synthesizer Demo ===");
    println!("Checkpoint: {}", args.weights.display());
    println!("Device: {}", device_info(&device));

    let registry = CleanerRegistry::new();
    let mut synthesizer: Synthesizer<DemoModel> =
        Synthesizer::with_device(&args.weights, config, &registry, device)?;
    synthesizer.load()?;

    // One fixed unit-norm embedding stands in for a real speaker encoder.
    let embed_dims = synthesizer.config().model.speaker_embed_dims;
    let embedding = vec![1.0 / (embed_dims as f32).sqrt(); embed_dims];

    print!("Text to synthesize: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let text = line.trim();
    if text.is_empty() {
        anyhow::bail!("no text provided");
    }

    let spectrograms = synthesizer.synthesize(&[text], &[embedding])?;
    let mel = &spectrograms[0];
    let (num_mels, frames) = mel.dims2()?;

    let audio = &synthesizer.config().audio;
    let seconds = frames as f64 * audio.hop_size as f64 / audio.sample_rate as f64;
    println!("Created a mel-spectrogram with shape ({num_mels}, {frames}) (~{seconds:.2}s of audio)");

    if let Some(path) = &args.dump_mel {
        dump_mel(mel, path)?;
        println!("Saved raw spectrogram to: {}", path.display());
    }

    Ok(())
}
