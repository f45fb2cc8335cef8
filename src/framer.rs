//! Overlapping-FFT framer.
//!
//! Every `process` call runs four phases:
//!
//! 1. **drain** – while carried samples plus the new block complete a frame,
//!    window `carry ++ block` into the scratch frame and dispatch it;
//! 2. **store** – if carried samples remain, append the whole block to them;
//! 3. **frame** – otherwise cut every complete frame straight out of the
//!    block and carry the leftover tail;
//! 4. **emit** – copy `len` samples out of the output ring and shift it.
//!
//! Each dispatched frame goes through the [`FrameProcessor`] and is then
//! overlap-added into the ring at the write offset, which advances by one
//! hop. Emitting moves it back by `len`, so the offset drifts by zero over a
//! long run.

use alloc::vec::Vec;

use crate::buffer::ScratchFrame;
use crate::carry::InputCarry;
use crate::config::{FrameConfig, ProcessSpec};
use crate::error::FramerError;
use crate::processor::FrameProcessor;
use crate::ring::OutputRing;

/// Audio buffers for one [`OverlappingFft::process_context`] call.
pub enum ProcessContext<'a, 'b> {
    /// Output overwrites the input channels.
    Replacing(&'a mut [&'b mut [f32]]),
    /// Separate input and output channels of equal length.
    NonReplacing {
        input: &'a [&'b [f32]],
        output: &'a mut [&'b mut [f32]],
    },
}

/// Buffers, windows and overlap-adds a block stream for a [`FrameProcessor`].
///
/// Construct once, [`prepare`](Self::prepare) for the host's block size and
/// channel layout, then call [`process`](Self::process) from the audio
/// thread. Output lags input by [`latency_samples`](Self::latency_samples).
pub struct OverlappingFft<P> {
    config: FrameConfig,
    fft_size: usize,
    hop_size: usize,
    window: Vec<f32>,
    processor: P,

    scratch: ScratchFrame,
    carry: InputCarry,
    ring: OutputRing,

    sample_rate: f64,
    max_block_size: usize,
    num_input_channels: usize,
    num_output_channels: usize,
}

impl<P: FrameProcessor> OverlappingFft<P> {
    /// Frame size `2^order`, hop `2^order / 2^hop_divider`, unprimed.
    pub fn new(order: u32, hop_divider: u32, processor: P) -> Result<Self, FramerError> {
        Self::with_config(FrameConfig::new(order, hop_divider), processor)
    }

    /// Build with the window produced by [`FrameProcessor::create_window`].
    pub fn with_config(config: FrameConfig, mut processor: P) -> Result<Self, FramerError> {
        config.validate()?;
        let mut window = alloc::vec![0.0f32; config.fft_size()];
        processor.create_window(&mut window, config.hop_size());
        Self::build(config, processor, window)
    }

    /// Build with an explicit analysis window of `fft_size` samples.
    pub fn with_window(
        config: FrameConfig,
        processor: P,
        window: Vec<f32>,
    ) -> Result<Self, FramerError> {
        config.validate()?;
        if window.len() != config.fft_size() {
            return Err(FramerError::WindowLengthMismatch {
                expected: config.fft_size(),
                actual: window.len(),
            });
        }
        Self::build(config, processor, window)
    }

    fn build(config: FrameConfig, processor: P, window: Vec<f32>) -> Result<Self, FramerError> {
        if let Some(index) = window.iter().position(|w| !w.is_finite() || *w < 0.0) {
            return Err(FramerError::InvalidWindowValue { index });
        }
        let fft_size = config.fft_size();
        let hop_size = config.hop_size();
        processor.check_fft_size(fft_size)?;
        debug_log!(
            "overlapping fft created with fft size {} and hop size {}",
            fft_size,
            hop_size
        );
        let mut framer = Self {
            config,
            fft_size,
            hop_size,
            window,
            processor,
            scratch: ScratchFrame::new(fft_size),
            carry: InputCarry::new(),
            ring: OutputRing::new(fft_size, hop_size),
            sample_rate: 0.0,
            max_block_size: 0,
            num_input_channels: 0,
            num_output_channels: 0,
        };
        framer.reset();
        Ok(framer)
    }

    /// Size every buffer for blocks of up to `max_block_size` samples and
    /// clear all state. Must precede the first `process`; calling it again
    /// turns the next `process` into a cold start.
    pub fn prepare(
        &mut self,
        sample_rate: f64,
        max_block_size: usize,
        num_input_channels: usize,
        num_output_channels: usize,
    ) -> Result<(), FramerError> {
        self.prepare_with_spec(&ProcessSpec::new(
            sample_rate,
            max_block_size,
            num_input_channels,
            num_output_channels,
        ))
    }

    pub fn prepare_with_spec(&mut self, spec: &ProcessSpec) -> Result<(), FramerError> {
        spec.validate()?;
        let rows = spec.max_channels();
        self.carry.set_size(spec.num_input_channels, self.fft_size);
        self.scratch.set_num_channels(rows);
        self.ring.set_size(rows, spec.maximum_block_size);

        self.sample_rate = spec.sample_rate;
        self.max_block_size = spec.maximum_block_size;
        self.num_input_channels = spec.num_input_channels;
        self.num_output_channels = spec.num_output_channels;
        self.reset();

        debug_log!(
            "prepared for {} in / {} out channels, blocks up to {} samples, output ring {} samples",
            spec.num_input_channels,
            spec.num_output_channels,
            spec.maximum_block_size,
            self.ring.len()
        );
        Ok(())
    }

    /// Forget all buffered audio without reallocating.
    pub fn reset(&mut self) {
        let (silence, write_offset) = if self.config.primed {
            (self.fft_size - self.hop_size, self.hop_size - 1)
        } else {
            (0, self.fft_size - 1)
        };
        self.carry.reset(silence);
        self.ring.reset(write_offset);
        self.scratch.clear();
        debug_log!("overlapping fft reset");
    }

    /// Run one block with separate input and output buffers.
    ///
    /// The block length is taken from the first input channel, or from the
    /// first output channel when there is no input. Channels beyond the
    /// prepared counts are ignored on input and zero-filled on output.
    /// Prepared input channels the host leaves out are read as silence.
    ///
    /// # Panics
    /// If the block is longer than the prepared maximum block size.
    pub fn process<I, O>(&mut self, input: &[I], output: &mut [O])
    where
        I: AsRef<[f32]>,
        O: AsMut<[f32]>,
    {
        let len = match (input.first(), output.first_mut()) {
            (Some(ch), _) => ch.as_ref().len(),
            (None, Some(ch)) => ch.as_mut().len(),
            (None, None) => 0,
        };
        let frame_channels = self.frame_channels(input.len(), output.len());
        self.ingest(input, len, frame_channels);
        self.emit(output, len);
    }

    /// Run one block in place: `block` is read as input, then overwritten.
    pub fn process_replacing<B>(&mut self, block: &mut [B])
    where
        B: AsRef<[f32]> + AsMut<[f32]>,
    {
        let len = block.first().map_or(0, |ch| ch.as_ref().len());
        let frame_channels = self.frame_channels(block.len(), block.len());
        self.ingest(&*block, len, frame_channels);
        self.emit(block, len);
    }

    pub fn process_context(&mut self, context: ProcessContext<'_, '_>) {
        match context {
            ProcessContext::Replacing(block) => self.process_replacing(block),
            ProcessContext::NonReplacing { input, output } => self.process(input, output),
        }
    }

    /// Channel count handed to the frame callback: `max(inputs, outputs)`
    /// after clamping both to the prepared layout.
    fn frame_channels(&self, inputs: usize, outputs: usize) -> usize {
        inputs
            .min(self.num_input_channels)
            .max(outputs.min(self.num_output_channels))
    }

    fn ingest<I: AsRef<[f32]>>(&mut self, input: &[I], len: usize, frame_channels: usize) {
        assert!(
            len <= self.max_block_size,
            "block of {} samples exceeds the prepared maximum of {}",
            len,
            self.max_block_size
        );
        let n = self.fft_size;
        let h = self.hop_size;
        let input = &input[..input.len().min(self.num_input_channels)];

        // drain: carried samples first, topped up from the block
        let mut pending = self.carry.pending();
        let mut carry_offset = 0;
        let mut data_offset = 0;
        while pending > 0 && pending + len >= n {
            for ch in 0..self.num_input_channels {
                let carried = &self.carry.channel(ch)[carry_offset..carry_offset + pending];
                let frame = self.scratch.frame_mut(ch);
                apply_window(&mut frame[..pending], carried, &self.window[..pending]);
                match input.get(ch) {
                    Some(block) => apply_window(
                        &mut frame[pending..],
                        &block.as_ref()[..n - pending],
                        &self.window[pending..],
                    ),
                    None => frame[pending..].fill(0.0),
                }
            }
            self.dispatch_frame(frame_channels);

            carry_offset += h;
            if pending > h {
                pending -= h;
            } else {
                // next frame starts inside the block
                data_offset = h - pending;
                pending = 0;
            }
        }

        // store: not enough new input to finish the carried frame
        if pending > 0 {
            self.carry.compact_and_append(carry_offset, pending, input, len);
            return;
        }

        // frame: every complete frame inside the block
        let mut offset = data_offset;
        while len.saturating_sub(offset) >= n {
            for ch in 0..self.num_input_channels {
                let frame = self.scratch.frame_mut(ch);
                match input.get(ch) {
                    Some(block) => {
                        apply_window(frame, &block.as_ref()[offset..offset + n], &self.window)
                    }
                    None => frame.fill(0.0),
                }
            }
            self.dispatch_frame(frame_channels);
            offset += h;
        }
        self.carry.store_tail(offset, len - offset, input);
    }

    fn dispatch_frame(&mut self, frame_channels: usize) {
        self.processor.process_frame_in_buffer(&mut self.scratch, frame_channels);
        // rows the callback never saw are silent
        for ch in frame_channels..self.num_output_channels {
            self.scratch.frame_mut(ch).fill(0.0);
        }
        self.ring.add_frame(&self.scratch, self.num_output_channels);
    }

    fn emit<O: AsMut<[f32]>>(&mut self, output: &mut [O], len: usize) {
        let used = output.len().min(self.num_output_channels);
        let (live, extra) = output.split_at_mut(used);
        self.ring.emit(live, len);
        for ch in extra {
            ch.as_mut()[..len].fill(0.0);
        }
    }

    #[inline]
    pub fn num_input_channels(&self) -> usize {
        self.num_input_channels
    }

    #[inline]
    pub fn num_output_channels(&self) -> usize {
        self.num_output_channels
    }

    #[inline]
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    #[inline]
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Delay between a sample entering and the same sample leaving:
    /// `fft_size - 1`.
    #[inline]
    pub fn latency_samples(&self) -> usize {
        self.fft_size - 1
    }

    pub fn window(&self) -> &[f32] {
        &self.window
    }

    /// Input samples per channel carried over to the next call. Always less
    /// than `fft_size`.
    #[inline]
    pub fn pending_input_samples(&self) -> usize {
        self.carry.pending()
    }

    /// Maximum block size from the last `prepare`, zero before.
    #[inline]
    pub fn maximum_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Sample rate from the last `prepare`, zero before. Not used by the
    /// framer itself.
    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    pub fn processor_mut(&mut self) -> &mut P {
        &mut self.processor
    }

    pub fn into_processor(self) -> P {
        self.processor
    }
}

#[inline]
fn apply_window(dst: &mut [f32], src: &[f32], window: &[f32]) {
    for ((d, &s), &w) in dst.iter_mut().zip(src).zip(window) {
        *d = s * w;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::Passthrough;
    use proptest::prelude::*;

    fn run_mono(signal: &[f32], blocks: &[usize]) -> Vec<f32> {
        let mut framer = OverlappingFft::new(4, 2, Passthrough).unwrap();
        framer.prepare(48_000.0, 24, 1, 1).unwrap();
        let mut out = Vec::with_capacity(signal.len());
        let mut pos = 0;
        for &len in blocks.iter().cycle() {
            if pos == signal.len() {
                break;
            }
            let len = len.min(signal.len() - pos);
            let mut block = [0.0f32; 24];
            framer.process(&[&signal[pos..pos + len]], &mut [&mut block[..len]]);
            out.extend_from_slice(&block[..len]);
            pos += len;
        }
        out
    }

    #[test]
    fn write_offset_returns_after_each_hop_cycle() {
        let mut framer = OverlappingFft::new(3, 1, Passthrough).unwrap();
        framer.prepare(48_000.0, 4, 1, 1).unwrap();
        assert_eq!(framer.ring.write_offset(), 7);
        let input = [[0.5f32; 4]];
        let mut output = [[0.0f32; 4]];
        // blocks of exactly one hop: the offset settles and stays put
        for _ in 0..8 {
            framer.process(&input, &mut output);
        }
        let settled = framer.ring.write_offset();
        for _ in 0..8 {
            framer.process(&input, &mut output);
            assert_eq!(framer.ring.write_offset(), settled);
            assert!(framer.pending_input_samples() < framer.fft_size());
        }
    }

    #[test]
    fn primed_reset_preloads_silence() {
        let config = FrameConfig::new(3, 2).primed(true);
        let mut framer = OverlappingFft::with_config(config, Passthrough).unwrap();
        framer.prepare(48_000.0, 16, 1, 1).unwrap();
        assert_eq!(framer.pending_input_samples(), 6);
        assert_eq!(framer.ring.write_offset(), 1);
        assert_eq!(framer.latency_samples(), 7);
    }

    #[test]
    fn callback_sees_clamped_channel_count() {
        let mut seen = Vec::new();
        let mut framer = OverlappingFft::new(2, 1, |_: &mut ScratchFrame, channels: usize| {
            seen.push(channels)
        })
        .unwrap();
        framer.prepare(48_000.0, 8, 1, 2).unwrap();
        let input = [[1.0f32; 8], [1.0f32; 8], [1.0f32; 8]];
        let mut output = [[0.0f32; 8]];
        framer.process(&input, &mut output);
        drop(framer);
        // 1 input (clamped from 3), 1 output
        assert_eq!(seen, [1, 1, 1]);
    }

    #[test]
    fn omitted_output_rows_stay_aligned() {
        let mut framer = OverlappingFft::new(3, 1, Passthrough).unwrap();
        framer.prepare(48_000.0, 4, 2, 2).unwrap();
        let ramp: Vec<f32> = (0..64).map(|i| i as f32).collect();
        let mut right = Vec::new();
        for (i, block) in ramp.chunks(4).enumerate() {
            let mut l = [0.0f32; 4];
            let mut r = [0.0f32; 4];
            if i % 3 == 0 {
                framer.process(&[block, block], &mut [&mut l[..]]);
                r = [f32::NAN; 4];
            } else {
                framer.process(&[block, block], &mut [&mut l[..], &mut r[..]]);
            }
            right.extend_from_slice(&r);
        }
        // past warm-up, every delivered right block is the delayed input
        for i in 16..64 {
            if (i / 4) % 3 != 0 {
                assert!((right[i] - ramp[i - 7]).abs() < 1e-4, "{}: {}", i, right[i]);
            }
        }
    }

    proptest! {
        #[test]
        fn prop_output_ignores_block_partition(
            blocks in proptest::collection::vec(0usize..=24, 1..12),
            ref signal in proptest::collection::vec(-1.0f32..1.0, 200),
        ) {
            prop_assume!(blocks.iter().any(|&len| len > 0));
            let reference = run_mono(signal, &[24]);
            let split = run_mono(signal, &blocks);
            prop_assert_eq!(reference, split);
        }
    }
}
