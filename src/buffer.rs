use alloc::vec::Vec;

/// Multi-channel sample storage: one contiguous allocation, one equally long
/// row per channel.
#[derive(Debug, Clone, Default)]
pub struct ChannelBuffer {
    data: Vec<f32>,
    num_channels: usize,
    len: usize,
}

impl ChannelBuffer {
    pub fn new(num_channels: usize, len: usize) -> Self {
        Self {
            data: alloc::vec![0.0; num_channels * len],
            num_channels,
            len,
        }
    }

    /// Resize to `num_channels` rows of `len` samples, all zero.
    ///
    /// This may reallocate and belongs in `prepare`, never on the audio thread.
    pub fn set_size(&mut self, num_channels: usize, len: usize) {
        self.data.clear();
        self.data.resize(num_channels * len, 0.0);
        self.num_channels = num_channels;
        self.len = len;
    }

    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Samples per channel.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0 || self.num_channels == 0
    }

    #[inline]
    pub fn channel(&self, ch: usize) -> &[f32] {
        &self.data[ch * self.len..(ch + 1) * self.len]
    }

    #[inline]
    pub fn channel_mut(&mut self, ch: usize) -> &mut [f32] {
        &mut self.data[ch * self.len..(ch + 1) * self.len]
    }

    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        // chunks_exact_mut panics on a zero chunk size
        let len = self.len.max(1);
        self.data.chunks_exact_mut(len).take(self.num_channels)
    }
}

/// The per-frame work buffer handed to a [`FrameProcessor`](crate::FrameProcessor).
///
/// Each row holds `2 * fft_size` samples. On entry to the callback the first
/// `fft_size` samples of every input row hold the windowed frame. The second
/// half is free workspace, wide enough for an interleaved complex spectrum.
/// On return the first `fft_size` samples of every output row are
/// overlap-added into the output stream.
#[derive(Debug, Clone, Default)]
pub struct ScratchFrame {
    rows: ChannelBuffer,
    fft_size: usize,
}

impl ScratchFrame {
    pub(crate) fn new(fft_size: usize) -> Self {
        Self {
            rows: ChannelBuffer::default(),
            fft_size,
        }
    }

    pub(crate) fn set_num_channels(&mut self, num_channels: usize) {
        self.rows.set_size(num_channels, 2 * self.fft_size);
    }

    pub(crate) fn clear(&mut self) {
        self.rows.clear();
    }

    #[inline]
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Rows allocated in `prepare`: `max(inputs, outputs)`.
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.rows.num_channels()
    }

    /// The windowed frame of channel `ch` (`fft_size` samples).
    #[inline]
    pub fn frame(&self, ch: usize) -> &[f32] {
        &self.rows.channel(ch)[..self.fft_size]
    }

    #[inline]
    pub fn frame_mut(&mut self, ch: usize) -> &mut [f32] {
        let n = self.fft_size;
        &mut self.rows.channel_mut(ch)[..n]
    }

    /// The whole `2 * fft_size` row of channel `ch`.
    #[inline]
    pub fn channel(&self, ch: usize) -> &[f32] {
        self.rows.channel(ch)
    }

    #[inline]
    pub fn channel_mut(&mut self, ch: usize) -> &mut [f32] {
        self.rows.channel_mut(ch)
    }

    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        self.rows.channels_mut()
    }
}
