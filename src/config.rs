use crate::error::FramerError;

/// Largest accepted FFT order.
///
/// Frame positions are mixed with `f32` window math; beyond `2^24` sample
/// indices are no longer exactly representable.
pub const MAX_FFT_ORDER: u32 = 24;

/// Frame geometry of an [`OverlappingFft`](crate::OverlappingFft).
///
/// `fft_size = 2^order` and `hop_size = fft_size / 2^hop_divider`. A hop
/// divider of 1 is 50% overlap, 2 is 75%, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    pub order: u32,
    pub hop_divider: u32,
    /// Start the input carry with `fft_size - hop_size` zeros.
    ///
    /// Unprimed, the first `fft_size - hop_size` input samples are covered by
    /// fewer than `fft_size / hop_size` frames and come out attenuated by the
    /// partial window sum. Primed, every sample is reconstructed in full. The
    /// latency is `fft_size - 1` either way.
    pub primed: bool,
}

impl FrameConfig {
    pub fn new(order: u32, hop_divider: u32) -> Self {
        Self {
            order,
            hop_divider,
            primed: false,
        }
    }

    pub fn primed(mut self, primed: bool) -> Self {
        self.primed = primed;
        self
    }

    pub fn validate(&self) -> Result<(), FramerError> {
        if self.order == 0 || self.order > MAX_FFT_ORDER {
            return Err(FramerError::InvalidOrder { order: self.order });
        }
        if self.hop_divider == 0 || self.hop_divider > self.order {
            return Err(FramerError::InvalidHopDivider {
                hop_divider: self.hop_divider,
                order: self.order,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn fft_size(&self) -> usize {
        1usize << self.order
    }

    #[inline]
    pub fn hop_size(&self) -> usize {
        self.fft_size() >> self.hop_divider
    }
}

/// Host-side stream description passed to `prepare`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
    pub sample_rate: f64,
    pub maximum_block_size: usize,
    pub num_input_channels: usize,
    pub num_output_channels: usize,
}

impl ProcessSpec {
    pub fn new(
        sample_rate: f64,
        maximum_block_size: usize,
        num_input_channels: usize,
        num_output_channels: usize,
    ) -> Self {
        Self {
            sample_rate,
            maximum_block_size,
            num_input_channels,
            num_output_channels,
        }
    }

    pub fn validate(&self) -> Result<(), FramerError> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(FramerError::InvalidSampleRate);
        }
        if self.maximum_block_size == 0 {
            return Err(FramerError::InvalidBlockSize);
        }
        if self.num_input_channels == 0 && self.num_output_channels == 0 {
            return Err(FramerError::InvalidChannels);
        }
        Ok(())
    }

    /// Rows needed by buffers shared between input and output channels.
    #[inline]
    pub fn max_channels(&self) -> usize {
        self.num_input_channels.max(self.num_output_channels)
    }
}
