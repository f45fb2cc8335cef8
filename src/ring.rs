//! Output Ring: the delay line that collects overlap-added frames until the
//! host asks for them.
//!
//! `write_offset` marks where the next frame starts summing. Everything at or
//! beyond `write_offset + (fft_size - hop_size)` is stale and gets
//! overwritten, not accumulated, by the next frame, so the ring never needs
//! clearing between blocks.

use crate::buffer::{ChannelBuffer, ScratchFrame};

#[derive(Debug, Clone)]
pub(crate) struct OutputRing {
    samples: ChannelBuffer,
    write_offset: usize,
    fft_size: usize,
    hop_size: usize,
}

impl OutputRing {
    pub(crate) fn new(fft_size: usize, hop_size: usize) -> Self {
        Self {
            samples: ChannelBuffer::default(),
            write_offset: 0,
            fft_size,
            hop_size,
        }
    }

    /// Ring length for blocks of up to `max_block` samples:
    /// `ceil(max_block / H) * H + (N - H) + max_block - 1`.
    pub(crate) fn required_len(fft_size: usize, hop_size: usize, max_block: usize) -> usize {
        let frames = max_block.div_ceil(hop_size);
        frames * hop_size + (fft_size - hop_size) + max_block - 1
    }

    pub(crate) fn set_size(&mut self, num_channels: usize, max_block: usize) {
        let len = Self::required_len(self.fft_size, self.hop_size, max_block);
        self.samples.set_size(num_channels, len);
    }

    pub(crate) fn reset(&mut self, write_offset: usize) {
        self.samples.clear();
        self.write_offset = write_offset;
    }

    #[cfg(any(test, feature = "verbose-logging"))]
    pub(crate) fn len(&self) -> usize {
        self.samples.len()
    }

    #[cfg(test)]
    pub(crate) fn write_offset(&self) -> usize {
        self.write_offset
    }

    /// Overlap-Add Writer: sum the first `N - H` samples of each processed
    /// frame onto the ring, copy the last `H` behind them, advance by `H`.
    pub(crate) fn add_frame(&mut self, scratch: &ScratchFrame, num_channels: usize) {
        let n = self.fft_size;
        let overlap = n - self.hop_size;
        let at = self.write_offset;
        debug_assert!(at + n <= self.samples.len());
        for ch in 0..num_channels {
            let frame = scratch.frame(ch);
            let row = &mut self.samples.channel_mut(ch)[at..at + n];
            for (acc, &x) in row[..overlap].iter_mut().zip(&frame[..overlap]) {
                *acc += x;
            }
            row[overlap..].copy_from_slice(&frame[overlap..]);
        }
        self.write_offset += self.hop_size;
    }

    /// Hand the oldest `len` samples of the first `output.len()` rows to the
    /// host and shift every row left by `len`.
    pub(crate) fn emit<O: AsMut<[f32]>>(&mut self, output: &mut [O], len: usize) {
        let ring_len = self.samples.len();
        let live = self.write_offset + (self.fft_size - self.hop_size);
        let shift = live.saturating_sub(len).min(ring_len.saturating_sub(len));

        for (ch, row) in self.samples.channels_mut().enumerate() {
            if let Some(out) = output.get_mut(ch) {
                out.as_mut()[..len].copy_from_slice(&row[..len]);
            }
            row.copy_within(len..len + shift, 0);
        }
        debug_assert!(self.write_offset >= len);
        self.write_offset -= len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ones_frame(fft_size: usize) -> ScratchFrame {
        let mut scratch = ScratchFrame::new(fft_size);
        scratch.set_num_channels(1);
        scratch.frame_mut(0).fill(1.0);
        scratch
    }

    #[test]
    fn required_len_covers_worst_case_block() {
        // N = 8, H = 4, L = 16: 4 frames * 4 + 4 + 15
        assert_eq!(OutputRing::required_len(8, 4, 16), 35);
        assert_eq!(OutputRing::required_len(8, 4, 1), 8);
        assert_eq!(OutputRing::required_len(2048, 512, 512), 2559);
    }

    #[test]
    fn frames_overlap_then_shift_out() {
        let mut ring = OutputRing::new(4, 2);
        ring.set_size(1, 4);
        assert_eq!(ring.len(), 9);
        ring.reset(3);
        let frame = ones_frame(4);

        ring.add_frame(&frame, 1);
        ring.add_frame(&frame, 1);
        assert_eq!(ring.write_offset(), 7);

        let mut out = [[9.0f32; 4]];
        ring.emit(&mut out, 4);
        assert_eq!(out[0], [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(ring.write_offset(), 3);

        ring.add_frame(&frame, 1);
        let mut out = [[9.0f32; 2]];
        ring.emit(&mut out, 2);
        assert_eq!(out[0], [1.0, 2.0]);
        ring.emit(&mut out, 2);
        assert_eq!(out[0], [2.0, 2.0]);
        assert_eq!(ring.write_offset(), 1);
    }

    #[test]
    fn rows_without_host_buffers_still_shift() {
        let mut ring = OutputRing::new(4, 2);
        ring.set_size(2, 4);
        ring.reset(3);
        let mut scratch = ScratchFrame::new(4);
        scratch.set_num_channels(2);
        scratch.frame_mut(1).fill(1.0);
        ring.add_frame(&scratch, 2);
        ring.add_frame(&scratch, 2);

        let mut first = [[0.0f32; 4]];
        ring.emit(&mut first, 4);
        let mut both = [[0.0f32; 4], [0.0f32; 4]];
        ring.add_frame(&scratch, 2);
        ring.emit(&mut both, 4);
        assert_eq!(both[1], [1.0, 2.0, 2.0, 2.0]);
    }
}
