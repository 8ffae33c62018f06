//! Analytic-signal envelope via FFT
//!
//! The envelope is the magnitude of the analytic signal: forward FFT,
//! suppress negative frequencies (doubling the positive half), inverse FFT.

use ndarray::Array1;
use num_complex::Complex32;
use rustfft::FftPlanner;

/// Instantaneous amplitude envelope of a real signal.
///
/// Equivalent to `|hilbert(signal)|`: for an amplitude-modulated carrier
/// this recovers the modulation waveform.
pub fn hilbert_envelope(signal: &Array1<f32>) -> Array1<f32> {
    let n = signal.len();
    if n < 2 {
        return signal.clone();
    }

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n);
    let ifft = planner.plan_fft_inverse(n);

    let mut buf: Vec<Complex32> = signal.iter().map(|&s| Complex32::new(s, 0.0)).collect();
    fft.process(&mut buf);

    // Analytic-signal spectrum: keep DC (and Nyquist for even n), double the
    // positive frequencies, zero the negative ones.
    let half = n / 2;
    if n % 2 == 0 {
        for v in buf.iter_mut().take(half).skip(1) {
            *v = *v * 2.0;
        }
        for v in buf.iter_mut().skip(half + 1) {
            *v = Complex32::new(0.0, 0.0);
        }
    } else {
        for v in buf.iter_mut().take(half + 1).skip(1) {
            *v = *v * 2.0;
        }
        for v in buf.iter_mut().skip(half + 1) {
            *v = Complex32::new(0.0, 0.0);
        }
    }

    ifft.process(&mut buf);

    let scale = 1.0 / n as f32;
    buf.iter().map(|&c| (c * scale).norm()).collect()
}
