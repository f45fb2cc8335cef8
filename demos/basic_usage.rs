//! Basic usage example for olafft
//!
//! Runs a test tone through an identity framer, a gain framer and a
//! hand-written windowing setup, printing what comes out.

use olafft::window::{hann, overlap_add_gain};
use olafft::{FrameConfig, OverlappingFft, Passthrough, ScratchFrame};

const BLOCK: usize = 256;

fn tone(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 48_000.0).sin())
        .collect()
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

fn main() {
    println!("=== olafft Basic Usage Example ===\n");
    let signal = tone(16 * BLOCK);

    // 1. Identity: output is the input, delayed
    println!("1. Identity framer (N = 1024, H = 256)");
    let mut framer = OverlappingFft::new(10, 2, Passthrough).unwrap();
    framer.prepare(48_000.0, BLOCK, 1, 1).unwrap();
    let mut out = Vec::with_capacity(signal.len());
    for block in signal.chunks(BLOCK) {
        let mut y = [0.0f32; BLOCK];
        framer.process(&[block], &mut [&mut y[..block.len()]]);
        out.extend_from_slice(&y[..block.len()]);
    }
    let latency = framer.latency_samples();
    let worst = signal[..signal.len() - latency]
        .iter()
        .zip(&out[latency..])
        .skip(framer.fft_size())
        .fold(0.0f32, |acc, (x, y)| acc.max((x - y).abs()));
    println!("   Latency: {} samples", latency);
    println!("   Max reconstruction error after warm-up: {:.2e}", worst);
    println!();

    // 2. A closure as frame callback
    println!("2. Gain of 0.5 applied per frame, blocks of varying size");
    let config = FrameConfig::new(9, 1).primed(true);
    let mut framer = OverlappingFft::with_config(
        config,
        |scratch: &mut ScratchFrame, channels: usize| {
            for ch in 0..channels {
                scratch.frame_mut(ch).iter_mut().for_each(|x| *x *= 0.5);
            }
        },
    )
    .unwrap();
    framer.prepare(48_000.0, BLOCK, 1, 1).unwrap();
    let mut out = Vec::with_capacity(signal.len());
    let mut pos = 0;
    for len in [BLOCK, 1, 100, 0, 37].iter().cycle().copied() {
        if pos == signal.len() {
            break;
        }
        let len = len.min(signal.len() - pos);
        let mut y = [0.0f32; BLOCK];
        framer.process(&[&signal[pos..pos + len]], &mut [&mut y[..len]]);
        out.extend_from_slice(&y[..len]);
        pos += len;
    }
    println!("   Input peak:  {:.3}", peak(&signal));
    println!("   Output peak: {:.3}", peak(&out[framer.latency_samples()..]));
    println!();

    // 3. Supplying a window directly
    println!("3. Explicit window");
    let mut window = hann(64);
    let (gain, _) = overlap_add_gain(&window, 16);
    window.iter_mut().for_each(|w| *w /= gain);
    println!("   Hann(64) at hop 16 overlap-adds to {:.2}, rescaled to 1", gain);
    let framer = OverlappingFft::with_window(FrameConfig::new(6, 2), Passthrough, window).unwrap();
    println!(
        "   Frame {} / hop {} / window peak {:.3}",
        framer.fft_size(),
        framer.hop_size(),
        peak(framer.window())
    );
}
