//! DSP (Digital Signal Processing) module
//!
//! Signal-conditioning primitives shared by the physiological estimators:
//! - `bandpass` - zero-phase Butterworth band-pass filtering
//! - `hilbert_envelope` - analytic-signal magnitude via FFT
//! - `welch` - Welch power spectral density estimation
//! - `find_peaks` - local-maxima detection with a refractory distance

mod bandpass;
mod hilbert;
mod peaks;
mod welch;

pub use bandpass::{bandpass, FilterError};
pub use hilbert::hilbert_envelope;
pub use peaks::find_peaks;
pub use welch::{welch, WelchSpectrum};
