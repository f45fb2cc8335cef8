// Output and frame timing must not depend on how the host slices the stream.
use olafft::{FrameConfig, FrameProcessor, OverlappingFft, ScratchFrame};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Counts dispatched frames and passes them through.
#[derive(Default)]
struct CountFrames(usize);

impl FrameProcessor for CountFrames {
    fn process_frame_in_buffer(&mut self, _scratch: &mut ScratchFrame, _num_channels: usize) {
        self.0 += 1;
    }
}

fn framer(config: FrameConfig, max_block: usize) -> OverlappingFft<CountFrames> {
    let mut framer = OverlappingFft::with_config(config, CountFrames::default()).unwrap();
    framer.prepare(48_000.0, max_block, 2, 2).unwrap();
    framer
}

/// Run a stereo signal through with the given block lengths, checking the
/// carry bound after every call.
fn run(
    framer: &mut OverlappingFft<CountFrames>,
    signal: &[Vec<f32>],
    blocks: &[usize],
) -> Vec<Vec<f32>> {
    let total = signal[0].len();
    let mut out = vec![Vec::with_capacity(total); signal.len()];
    let mut pos = 0;
    for &len in blocks.iter().cycle() {
        if pos == total {
            break;
        }
        let len = len.min(total - pos);
        let input: Vec<&[f32]> = signal.iter().map(|ch| &ch[pos..pos + len]).collect();
        let mut output = vec![vec![f32::NAN; len]; signal.len()];
        framer.process(&input, &mut output);
        assert!(framer.pending_input_samples() < framer.fft_size());
        for (acc, block) in out.iter_mut().zip(&output) {
            assert_eq!(block.len(), len);
            acc.extend_from_slice(block);
        }
        pos += len;
    }
    out
}

fn noise(seed: u64, channels: usize, len: usize) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..channels)
        .map(|_| (0..len).map(|_| rng.gen_range(-1.0f32..1.0)).collect())
        .collect()
}

/// Identical output, bit for bit, for a range of fixed and irregular
/// block patterns.
#[test]
fn output_is_bit_identical_across_block_sizes() {
    let signal = noise(5, 2, 3000);
    let config = FrameConfig::new(5, 2);
    let reference = run(&mut framer(config, 512), &signal, &[512]);

    let patterns: [&[usize]; 6] = [&[1], &[7], &[32], &[33, 1, 0, 200], &[0, 5, 0, 31], &[511, 2]];
    for blocks in patterns {
        let out = run(&mut framer(config, 512), &signal, blocks);
        assert_eq!(out, reference, "blocks {:?}", blocks);
    }

    let mut rng = StdRng::seed_from_u64(11);
    let random: Vec<usize> = (0..64).map(|_| rng.gen_range(0..=512)).collect();
    let out = run(&mut framer(config, 512), &signal, &random);
    assert_eq!(out, reference);
}

#[test]
fn primed_output_is_bit_identical_across_block_sizes() {
    let signal = noise(6, 2, 1500);
    let config = FrameConfig::new(6, 3).primed(true);
    let reference = run(&mut framer(config, 256), &signal, &[256]);
    for blocks in [&[1usize][..], &[8], &[63, 64, 65], &[0, 17]] {
        assert_eq!(run(&mut framer(config, 256), &signal, blocks), reference);
    }
}

/// Host blocks of up to 1024 samples, including a one-then-thousand
/// alternation, in both start modes.
#[test]
fn large_and_alternating_blocks_match_whole_blocks() {
    let signal = noise(12, 2, 6000);
    for primed in [false, true] {
        let config = FrameConfig::new(8, 2).primed(primed);
        let reference = run(&mut framer(config, 1024), &signal, &[1024]);
        for blocks in [&[1usize, 1000][..], &[1], &[17], &[64], &[256]] {
            let out = run(&mut framer(config, 1024), &signal, blocks);
            assert_eq!(out, reference, "primed {} blocks {:?}", primed, blocks);
        }
    }
}

/// `T` samples yield `floor((T - N) / H) + 1` frames, or `floor(T / H)`
/// with the carry primed.
#[test]
fn frame_count_follows_stream_length() {
    let signal = noise(9, 2, 1000);
    for blocks in [&[1000usize][..], &[1], &[7], &[64], &[100, 3, 17]] {
        let mut unprimed = framer(FrameConfig::new(6, 2), 1000);
        run(&mut unprimed, &signal, blocks);
        assert_eq!(unprimed.processor().0, 59, "blocks {:?}", blocks);

        let mut primed = framer(FrameConfig::new(6, 2).primed(true), 1000);
        run(&mut primed, &signal, blocks);
        assert_eq!(primed.processor().0, 62, "blocks {:?}", blocks);
    }
}

/// A block shorter than what the carry still needs produces no frame and no
/// audio, only zeros from the ring.
#[test]
fn short_blocks_only_accumulate() {
    let mut framer = framer(FrameConfig::new(4, 1), 4);
    let block = [1.0f32; 4];
    let mut out = [[9.0f32; 4], [9.0f32; 4]];
    for expected_pending in [4, 8, 12] {
        framer.process(&[&block[..], &block[..]], &mut out);
        assert_eq!(framer.pending_input_samples(), expected_pending);
        assert_eq!(framer.processor().0, 0);
        assert_eq!(out, [[0.0; 4]; 2]);
    }
    framer.process(&[&block[..], &block[..]], &mut out);
    assert_eq!(framer.processor().0, 1);
    assert_eq!(framer.pending_input_samples(), 8);
}

/// Zero-length blocks are a no-op.
#[test]
fn empty_block_changes_nothing() {
    let mut framer = framer(FrameConfig::new(4, 1), 16);
    let block = [0.5f32; 5];
    let mut out = [[0.0f32; 5], [0.0f32; 5]];
    framer.process(&[&block[..], &block[..]], &mut out);
    let pending = framer.pending_input_samples();

    let empty: [&[f32]; 2] = [&[], &[]];
    let mut none: [&mut [f32]; 2] = [&mut [], &mut []];
    framer.process(&empty, &mut none);
    assert_eq!(framer.pending_input_samples(), pending);
    assert_eq!(framer.processor().0, 0);
}

#[test]
#[should_panic(expected = "exceeds the prepared maximum")]
fn oversized_block_panics() {
    let mut framer = framer(FrameConfig::new(4, 1), 16);
    let block = [0.0f32; 17];
    let mut out = [[0.0f32; 17], [0.0f32; 17]];
    framer.process(&[&block[..], &block[..]], &mut out);
}
