//! Input Carry: the unconsumed tail of earlier blocks that has not yet
//! completed a frame.

use crate::buffer::ChannelBuffer;

#[derive(Debug, Clone)]
pub(crate) struct InputCarry {
    samples: ChannelBuffer,
    /// Meaningful samples per channel, stored at `[0, pending)`.
    pending: usize,
}

impl InputCarry {
    pub(crate) fn new() -> Self {
        Self {
            samples: ChannelBuffer::default(),
            pending: 0,
        }
    }

    /// Room for `fft_size - 1` samples per channel, the most that can be
    /// left over without completing a frame.
    pub(crate) fn set_size(&mut self, num_channels: usize, fft_size: usize) {
        self.samples.set_size(num_channels, fft_size - 1);
        self.pending = 0;
    }

    /// Drop all carried audio. With `silence > 0` the carry starts with that
    /// many zero samples.
    pub(crate) fn reset(&mut self, silence: usize) {
        debug_assert!(silence <= self.samples.len() || self.samples.is_empty());
        self.samples.clear();
        self.pending = silence;
    }

    #[inline]
    pub(crate) fn pending(&self) -> usize {
        self.pending
    }

    #[inline]
    pub(crate) fn channel(&self, ch: usize) -> &[f32] {
        self.samples.channel(ch)
    }

    /// Keep `remaining` samples starting at `consumed`, move them to the front
    /// and append the first `len` samples of each input block behind them.
    /// Rows without a host block get silence appended.
    pub(crate) fn compact_and_append<I: AsRef<[f32]>>(
        &mut self,
        consumed: usize,
        remaining: usize,
        input: &[I],
        len: usize,
    ) {
        for (ch, row) in self.samples.channels_mut().enumerate() {
            row.copy_within(consumed..consumed + remaining, 0);
            let dst = &mut row[remaining..remaining + len];
            match input.get(ch) {
                Some(block) => dst.copy_from_slice(&block.as_ref()[..len]),
                None => dst.fill(0.0),
            }
        }
        self.set_pending(remaining + len);
    }

    /// Replace the carry with `len` samples of each block starting at `from`.
    pub(crate) fn store_tail<I: AsRef<[f32]>>(&mut self, from: usize, len: usize, input: &[I]) {
        for (ch, row) in self.samples.channels_mut().enumerate() {
            let dst = &mut row[..len];
            match input.get(ch) {
                Some(block) => dst.copy_from_slice(&block.as_ref()[from..from + len]),
                None => dst.fill(0.0),
            }
        }
        self.set_pending(len);
    }

    #[inline]
    fn set_pending(&mut self, pending: usize) {
        debug_assert!(pending <= self.samples.len());
        self.pending = pending;
    }
}
