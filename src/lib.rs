//! # olafft - overlapping-FFT stream framing for block-based audio
//!
//! Hosts hand audio over in blocks of arbitrary, varying length. Spectral
//! processing wants something else: contiguous frames of `N = 2^p` samples,
//! windowed, taken every `H = N / 2^d` samples. [`OverlappingFft`] sits
//! between the two. It buffers just enough history to cut every frame,
//! hands each windowed frame to a [`FrameProcessor`], and overlap-adds the
//! processed frames back into a block stream delayed by `N - 1` samples.
//!
//! With the default compensated Hann window and an identity callback the
//! output is the input, delayed by [`OverlappingFft::latency_samples`].
//!
//! ## Cargo Features
//!
//! - `std` (default): `std::error::Error` for [`FramerError`]
//! - `spectral` (default): [`spectral::RealFft`] and
//!   [`spectral::SpectralProcessor`] built on `realfft`
//! - `verbose-logging`: `log` records from construction, `prepare` and `reset`
//!
//! ## Realtime behaviour
//!
//! All buffers are sized in [`OverlappingFft::prepare`]. `process` does not
//! allocate, lock or log, and runs every frame callback synchronously in
//! temporal order.
//!
//! ## Example
//!
//! ```
//! use olafft::{OverlappingFft, ScratchFrame};
//!
//! // N = 1024, H = 256, identity callback
//! let mut framer = OverlappingFft::new(10, 2, |_: &mut ScratchFrame, _: usize| {}).unwrap();
//! framer.prepare(48_000.0, 512, 2, 2).unwrap();
//!
//! let input = vec![vec![0.25f32; 512]; 2];
//! let mut output = vec![vec![0.0f32; 512]; 2];
//! framer.process(&input, &mut output);
//! assert_eq!(framer.latency_samples(), 1023);
//! ```

#![no_std]
extern crate alloc;
#[cfg(any(feature = "std", test))]
extern crate std;

/// Debug record that compiles away unless `verbose-logging` is enabled.
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        log::debug!($($arg)*);
    };
}

/// Multi-channel sample storage and the scratch frame handed to callbacks.
pub mod buffer;

/// Frame and host configuration.
pub mod config;

/// Error type shared by construction and `prepare`.
pub mod error;

/// The overlapping-FFT framer.
pub mod framer;

/// Frame callback seam.
pub mod processor;

/// Window tables and overlap-add gain helpers.
pub mod window;

/// Real FFT helpers for frame callbacks.
#[cfg(feature = "spectral")]
pub mod spectral;

mod carry;
mod ring;

pub use buffer::{ChannelBuffer, ScratchFrame};
pub use config::{FrameConfig, ProcessSpec, MAX_FFT_ORDER};
pub use error::FramerError;
pub use framer::{OverlappingFft, ProcessContext};
pub use processor::{FrameProcessor, Passthrough};
