//! # vitalis-signals
//!
//! Biometric signal processing for Vitalis.
//!
//! This crate provides:
//! - **DSP primitives**: zero-phase Butterworth band-pass, analytic-signal
//!   envelope, Welch power spectral density, peak detection
//! - **Respiration estimation**: breaths/minute from a blood-volume-pulse
//!   (BVP) waveform using amplitude- and frequency-modulation proxies
//!
//! ## Example
//!
//! ```ignore
//! use ndarray::Array1;
//! use vitalis_signals::RrEstimator;
//!
//! let estimator = RrEstimator::new();
//! let bvp: Array1<f32> = collect_bvp_window();
//!
//! if let Some(brpm) = estimator.estimate(&bvp, 30.0) {
//!     println!("Respiration: {:.1} breaths/min", brpm);
//! }
//! ```

pub mod dsp;
pub mod physio;

pub use dsp::{bandpass, find_peaks, hilbert_envelope, welch, FilterError, WelchSpectrum};
pub use physio::{RrConfig, RrEstimator};
