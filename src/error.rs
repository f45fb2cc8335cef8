use core::fmt;

/// Errors raised while configuring an [`OverlappingFft`](crate::OverlappingFft).
///
/// These are programmer errors: a bad frame size, a bad hop divider, a bad
/// window, or an impossible host setup. `process` never returns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramerError {
    /// The FFT order was zero or larger than [`MAX_FFT_ORDER`](crate::MAX_FFT_ORDER).
    InvalidOrder { order: u32 },
    /// The hop divider was zero (less than 50% overlap) or larger than the
    /// order (hop shorter than one sample).
    InvalidHopDivider { hop_divider: u32, order: u32 },
    /// An explicit window did not have `fft_size` samples.
    WindowLengthMismatch { expected: usize, actual: usize },
    /// A window sample was negative or not finite.
    InvalidWindowValue { index: usize },
    /// `prepare` was called with a maximum block size of zero.
    InvalidBlockSize,
    /// `prepare` was called with a non-finite or non-positive sample rate.
    InvalidSampleRate,
    /// `prepare` was called with neither input nor output channels.
    InvalidChannels,
    /// The real FFT rejected its buffers.
    Fft,
    /// The frame processor transforms frames of a different size than the
    /// framer produces.
    FftSizeMismatch { expected: usize, actual: usize },
}

impl fmt::Display for FramerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramerError::InvalidOrder { order } => write!(
                f,
                "fft order {} outside 1..={}",
                order,
                crate::config::MAX_FFT_ORDER
            ),
            FramerError::InvalidHopDivider { hop_divider, order } => write!(
                f,
                "hop divider {} outside 1..={} (order {})",
                hop_divider, order, order
            ),
            FramerError::WindowLengthMismatch { expected, actual } => {
                write!(f, "window has {} samples, expected {}", actual, expected)
            }
            FramerError::InvalidWindowValue { index } => {
                write!(f, "window sample {} is negative or not finite", index)
            }
            FramerError::InvalidBlockSize => write!(f, "maximum block size must be at least 1"),
            FramerError::InvalidSampleRate => {
                write!(f, "sample rate must be finite and positive")
            }
            FramerError::InvalidChannels => {
                write!(f, "at least one input or output channel is required")
            }
            FramerError::Fft => write!(f, "real fft rejected the frame buffers"),
            FramerError::FftSizeMismatch { expected, actual } => write!(
                f,
                "frame processor expects fft size {}, framer uses {}",
                actual, expected
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FramerError {}
