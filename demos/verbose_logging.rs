//! Demonstrates enabling verbose logging for olafft.
use olafft::{OverlappingFft, Passthrough};

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .init();

    let mut framer = OverlappingFft::new(11, 2, Passthrough).unwrap();
    framer.prepare(48_000.0, 512, 2, 2).unwrap();

    let input = vec![vec![0.0f32; 512]; 2];
    let mut output = vec![vec![0.0f32; 512]; 2];
    framer.process(&input, &mut output);
    framer.reset();
}
