//! Real-FFT helpers for frame callbacks.
//!
//! [`RealFft`] wraps a planned forward/inverse pair from `realfft` with every
//! buffer preallocated, so transforms are safe to run on the audio thread.
//! [`SpectralProcessor`] turns a per-channel spectrum edit into a
//! [`FrameProcessor`].

use alloc::sync::Arc;
use alloc::vec::Vec;

use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};

use crate::buffer::ScratchFrame;
use crate::error::FramerError;
use crate::processor::FrameProcessor;

pub use realfft::num_complex::Complex32;

/// Forward and inverse real FFT of one fixed size.
pub struct RealFft {
    fft_size: usize,
    forward: Arc<dyn RealToComplex<f32>>,
    inverse: Arc<dyn ComplexToReal<f32>>,
    time: Vec<f32>,
    spectrum: Vec<Complex32>,
    forward_scratch: Vec<Complex32>,
    inverse_scratch: Vec<Complex32>,
}

impl RealFft {
    pub fn new(fft_size: usize) -> Result<Self, FramerError> {
        if fft_size < 2 || fft_size % 2 != 0 {
            return Err(FramerError::Fft);
        }
        let mut planner = RealFftPlanner::<f32>::new();
        let forward = planner.plan_fft_forward(fft_size);
        let inverse = planner.plan_fft_inverse(fft_size);
        let time = forward.make_input_vec();
        let spectrum = forward.make_output_vec();
        let forward_scratch = forward.make_scratch_vec();
        let inverse_scratch = inverse.make_scratch_vec();
        Ok(Self {
            fft_size,
            forward,
            inverse,
            time,
            spectrum,
            forward_scratch,
            inverse_scratch,
        })
    }

    #[inline]
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Non-negative frequency bins: `fft_size / 2 + 1`.
    #[inline]
    pub fn num_bins(&self) -> usize {
        self.spectrum.len()
    }

    pub fn spectrum(&self) -> &[Complex32] {
        &self.spectrum
    }

    pub fn spectrum_mut(&mut self) -> &mut [Complex32] {
        &mut self.spectrum
    }

    /// Transform `fft_size` real samples. The bins stay inside `self` until
    /// the next transform.
    pub fn forward(&mut self, frame: &[f32]) -> Result<&mut [Complex32], FramerError> {
        if frame.len() != self.fft_size {
            return Err(FramerError::Fft);
        }
        self.time.copy_from_slice(frame);
        self.forward
            .process_with_scratch(&mut self.time, &mut self.spectrum, &mut self.forward_scratch)
            .map_err(|_| FramerError::Fft)?;
        Ok(&mut self.spectrum)
    }

    /// Transform the current bins back into `frame`, scaled by `1 / fft_size`
    /// so that `forward` then `inverse` is the identity.
    ///
    /// The imaginary parts of the DC and Nyquist bins are dropped, as a real
    /// signal cannot carry them. The bins are consumed.
    pub fn inverse(&mut self, frame: &mut [f32]) -> Result<(), FramerError> {
        if frame.len() != self.fft_size {
            return Err(FramerError::Fft);
        }
        self.spectrum[0].im = 0.0;
        if let Some(nyquist) = self.spectrum.last_mut() {
            nyquist.im = 0.0;
        }
        self.inverse
            .process_with_scratch(&mut self.spectrum, &mut self.time, &mut self.inverse_scratch)
            .map_err(|_| FramerError::Fft)?;
        let scale = 1.0 / self.fft_size as f32;
        for (out, &x) in frame.iter_mut().zip(&self.time) {
            *out = x * scale;
        }
        Ok(())
    }

    /// Forward transform of `row[..fft_size]`, written back into the same row
    /// as interleaved `re, im` pairs for bins `0..=fft_size / 2`. Needs
    /// `fft_size + 2` samples of room, which every [`ScratchFrame`] row has.
    pub fn forward_packed(&mut self, row: &mut [f32]) -> Result<(), FramerError> {
        let n = self.fft_size;
        if row.len() < n + 2 {
            return Err(FramerError::Fft);
        }
        let bins = self.forward(&row[..n])?;
        for (pair, bin) in row.chunks_exact_mut(2).zip(bins.iter()) {
            pair[0] = bin.re;
            pair[1] = bin.im;
        }
        Ok(())
    }

    /// Inverse of [`forward_packed`](Self::forward_packed): reads interleaved
    /// bins from `row` and writes `fft_size` real samples to its front.
    pub fn inverse_packed(&mut self, row: &mut [f32]) -> Result<(), FramerError> {
        let n = self.fft_size;
        if row.len() < n + 2 {
            return Err(FramerError::Fft);
        }
        for (bin, pair) in self.spectrum.iter_mut().zip(row.chunks_exact(2)) {
            *bin = Complex32::new(pair[0], pair[1]);
        }
        self.inverse(&mut row[..n])
    }
}

/// A [`FrameProcessor`] running forward FFT, `edit(channel, bins)`, inverse
/// FFT on every channel of every frame.
///
/// ```
/// use olafft::spectral::{half_band_lowpass, SpectralProcessor};
/// use olafft::OverlappingFft;
///
/// let lowpass = SpectralProcessor::new(2048, half_band_lowpass()).unwrap();
/// let mut framer = OverlappingFft::new(11, 2, lowpass).unwrap();
/// framer.prepare(48_000.0, 512, 2, 2).unwrap();
/// ```
pub struct SpectralProcessor<F> {
    fft: RealFft,
    edit: F,
}

impl<F> SpectralProcessor<F>
where
    F: FnMut(usize, &mut [Complex32]),
{
    pub fn new(fft_size: usize, edit: F) -> Result<Self, FramerError> {
        Ok(Self {
            fft: RealFft::new(fft_size)?,
            edit,
        })
    }

    pub fn edit_mut(&mut self) -> &mut F {
        &mut self.edit
    }
}

impl<F> FrameProcessor for SpectralProcessor<F>
where
    F: FnMut(usize, &mut [Complex32]),
{
    fn process_frame_in_buffer(&mut self, scratch: &mut ScratchFrame, num_channels: usize) {
        for ch in 0..num_channels {
            let frame = scratch.frame_mut(ch);
            match self.fft.forward(frame) {
                Ok(bins) => (self.edit)(ch, bins),
                Err(_) => {
                    frame.fill(0.0);
                    continue;
                }
            }
            if self.fft.inverse(frame).is_err() {
                frame.fill(0.0);
            }
        }
    }

    fn check_fft_size(&self, fft_size: usize) -> Result<(), FramerError> {
        if self.fft.fft_size() != fft_size {
            return Err(FramerError::FftSizeMismatch {
                expected: fft_size,
                actual: self.fft.fft_size(),
            });
        }
        Ok(())
    }
}

/// Spectrum edit that clears bins `fft_size / 4` up to, but not including,
/// the Nyquist bin: a lowpass at half the Nyquist frequency. The Nyquist bin
/// itself passes through.
pub fn half_band_lowpass() -> impl FnMut(usize, &mut [Complex32]) {
    |_: usize, bins: &mut [Complex32]| {
        let nyquist = bins.len() - 1;
        bins[nyquist / 2..nyquist].fill(Complex32::new(0.0, 0.0));
    }
}
