use crate::buffer::ScratchFrame;
use crate::error::FramerError;
use crate::window;

/// The frame-domain transform run once per hop.
///
/// `process_frame_in_buffer` is called synchronously from
/// [`OverlappingFft::process`](crate::OverlappingFft::process), in temporal
/// order, once per complete frame. It runs on the audio thread: do not
/// allocate, block, or keep references into `scratch` after returning.
///
/// Any `FnMut(&mut ScratchFrame, usize)` closure is a `FrameProcessor` with
/// the default window:
///
/// ```
/// use olafft::{OverlappingFft, ScratchFrame};
///
/// let gain = 0.5f32;
/// let framer = OverlappingFft::new(9, 1, move |scratch: &mut ScratchFrame, channels: usize| {
///     for ch in 0..channels {
///         scratch.frame_mut(ch).iter_mut().for_each(|x| *x *= gain);
///     }
/// });
/// assert!(framer.is_ok());
/// ```
pub trait FrameProcessor {
    /// Transform the windowed frames in place.
    ///
    /// On entry the first `fft_size` samples of every input row hold the
    /// windowed input. Rows past the prepared input channels keep whatever
    /// the previous call left there. On return the first `fft_size` samples
    /// of rows `0..num_channels` are overlap-added into the output; output
    /// rows past `num_channels` contribute silence. The second half of every
    /// row is free workspace.
    fn process_frame_in_buffer(&mut self, scratch: &mut ScratchFrame, num_channels: usize);

    /// Fill the `fft_size` analysis window. Called once, at construction.
    ///
    /// The default is a periodic Hann window scaled by `2 * hop / fft_size`,
    /// which overlap-adds to exactly one. Overrides must keep that sum
    /// constant if the identity transform should reconstruct the input.
    fn create_window(&mut self, window: &mut [f32], hop_size: usize) {
        window::fill_compensated_hann(window, hop_size);
    }

    /// Reject a frame size this processor cannot handle. Called once, at
    /// construction, before any frame is dispatched.
    fn check_fft_size(&self, _fft_size: usize) -> Result<(), FramerError> {
        Ok(())
    }
}

impl<F> FrameProcessor for F
where
    F: FnMut(&mut ScratchFrame, usize),
{
    #[inline]
    fn process_frame_in_buffer(&mut self, scratch: &mut ScratchFrame, num_channels: usize) {
        self(scratch, num_channels)
    }
}

/// Identity transform: frames go back out untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Passthrough;

impl FrameProcessor for Passthrough {
    #[inline]
    fn process_frame_in_buffer(&mut self, _scratch: &mut ScratchFrame, _num_channels: usize) {}
}
