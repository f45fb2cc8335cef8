//! Lowpasses a WAV file at half its Nyquist frequency with olafft.
//!
//! Usage:
//! ```bash
//! cargo run --example lowpass_wav -- <INPUT_WAV> <OUTPUT_WAV> [--order P] [--block L]
//! ```
//!
//! The input should be a 16-bit WAV file with any number of channels. The
//! output has the same format, time-aligned with the input.

use std::env;
use std::error::Error;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use olafft::spectral::{half_band_lowpass, SpectralProcessor};
use olafft::{FrameConfig, OverlappingFft};

const USAGE: &str =
    "Usage: cargo run --example lowpass_wav -- <INPUT_WAV> <OUTPUT_WAV> [--order P] [--block L]";

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let mut input = None;
    let mut output = None;
    let mut order = 11u32;
    let mut block = 512usize;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--order" => {
                if let Some(v) = args.next() {
                    order = v.parse().unwrap_or(order);
                }
            }
            "--block" => {
                if let Some(v) = args.next() {
                    block = v.parse().unwrap_or(block);
                }
            }
            _ => {
                if input.is_none() {
                    input = Some(arg);
                } else if output.is_none() {
                    output = Some(arg);
                } else {
                    eprintln!("{}", USAGE);
                    std::process::exit(1);
                }
            }
        }
    }
    let (input, output) = match (input, output) {
        (Some(i), Some(o)) => (i, o),
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
    };

    let mut reader = WavReader::open(&input)?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    let interleaved: Vec<f32> = reader
        .samples::<i16>()
        .map(|s| s.map(|v| v as f32 / i16::MAX as f32))
        .collect::<Result<_, _>>()?;
    let frames = interleaved.len() / channels;

    // Deinterleave and pad with one latency's worth of silence to flush.
    let config = FrameConfig::new(order, 2).primed(true);
    let lowpass = SpectralProcessor::new(config.fft_size(), half_band_lowpass())?;
    let mut framer = OverlappingFft::with_config(config, lowpass)?;
    framer.prepare(spec.sample_rate as f64, block, channels, channels)?;
    let latency = framer.latency_samples();

    let mut planar = vec![vec![0.0f32; frames + latency]; channels];
    for (i, frame) in interleaved.chunks_exact(channels).enumerate() {
        for (ch, &x) in frame.iter().enumerate() {
            planar[ch][i] = x;
        }
    }

    let mut filtered = vec![Vec::with_capacity(frames + latency); channels];
    let mut out = vec![vec![0.0f32; block]; channels];
    for start in (0..frames + latency).step_by(block) {
        let len = block.min(frames + latency - start);
        let ins: Vec<&[f32]> = planar.iter().map(|ch| &ch[start..start + len]).collect();
        let mut outs: Vec<&mut [f32]> = out.iter_mut().map(|ch| &mut ch[..len]).collect();
        framer.process(&ins, &mut outs);
        for (acc, ch) in filtered.iter_mut().zip(&out) {
            acc.extend_from_slice(&ch[..len]);
        }
    }

    let out_spec = WavSpec {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(&output, out_spec)?;
    for i in latency..latency + frames {
        for ch in &filtered {
            let v = (ch[i].clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(v)?;
        }
    }
    writer.finalize()?;

    println!(
        "Wrote {} frames of {} channel(s) to {} (N = {}, H = {})",
        frames,
        channels,
        output,
        framer.fft_size(),
        framer.hop_size()
    );
    Ok(())
}
