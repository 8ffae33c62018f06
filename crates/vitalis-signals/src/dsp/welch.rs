//! Welch power spectral density estimation
//!
//! Averages periodograms of overlapping, Hann-windowed, mean-detrended
//! segments (50% overlap, one-sided spectrum).

use num_complex::Complex32;
use rustfft::FftPlanner;
use std::f32::consts::PI;

/// One-sided PSD estimate
#[derive(Debug, Clone)]
pub struct WelchSpectrum {
    /// Bin center frequencies in Hz
    pub freqs: Vec<f32>,
    /// Power spectral density per bin
    pub power: Vec<f32>,
}

impl WelchSpectrum {
    /// Frequency of maximum power restricted to `[low, high]` Hz.
    ///
    /// First observed maximum wins on ties; bins with non-finite power are
    /// never selected, so a NaN frequency cannot propagate. `None` when no
    /// bin falls in band.
    pub fn peak_in_band(&self, low: f32, high: f32) -> Option<f32> {
        let mut best: Option<(f32, f32)> = None;
        for (&f, &p) in self.freqs.iter().zip(self.power.iter()) {
            if f < low || f > high || !p.is_finite() {
                continue;
            }
            match best {
                Some((_, bp)) if p <= bp => {}
                _ => best = Some((f, p)),
            }
        }
        best.map(|(f, _)| f)
    }
}

/// Estimate the PSD of `signal` by Welch's method.
///
/// `nperseg` is clamped to the signal length; segments overlap by half.
/// Returns `None` when the signal is too short to form a single segment.
pub fn welch(signal: &[f32], fs: f32, nperseg: usize) -> Option<WelchSpectrum> {
    let n = signal.len();
    if n < 2 || fs <= 0.0 {
        return None;
    }
    let nperseg = nperseg.clamp(2, n);
    let step = nperseg - nperseg / 2;

    // Periodic Hann window
    let window: Vec<f32> = (0..nperseg)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / nperseg as f32).cos())
        .collect();
    let win_sumsq: f32 = window.iter().map(|w| w * w).sum();

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(nperseg);

    let nbins = nperseg / 2 + 1;
    let mut acc = vec![0.0f32; nbins];
    let mut segments = 0usize;

    let mut start = 0usize;
    while start + nperseg <= n {
        let seg = &signal[start..start + nperseg];
        let mean = seg.iter().sum::<f32>() / nperseg as f32;

        let mut buf: Vec<Complex32> = seg
            .iter()
            .zip(window.iter())
            .map(|(&s, &w)| Complex32::new((s - mean) * w, 0.0))
            .collect();
        fft.process(&mut buf);

        for (k, slot) in acc.iter_mut().enumerate() {
            let mut p = buf[k].norm_sqr() / (fs * win_sumsq);
            // Fold negative frequencies into the one-sided spectrum
            let is_nyquist = nperseg % 2 == 0 && k == nbins - 1;
            if k != 0 && !is_nyquist {
                p *= 2.0;
            }
            *slot += p;
        }

        segments += 1;
        start += step;
    }

    if segments == 0 {
        return None;
    }

    let power: Vec<f32> = acc.iter().map(|p| p / segments as f32).collect();
    let freqs: Vec<f32> = (0..nbins).map(|k| k as f32 * fs / nperseg as f32).collect();
    Some(WelchSpectrum { freqs, power })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, fs: f32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / fs).sin())
            .collect()
    }

    #[test]
    fn peak_frequency_of_tone() {
        let fs = 30.0;
        let signal = sine(0.5, fs, 1200);
        let spectrum = welch(&signal, fs, 900).unwrap();

        let peak = spectrum.peak_in_band(0.1, 0.7).unwrap();
        let resolution = fs / 900.0;
        assert!(
            (peak - 0.5).abs() <= resolution,
            "peak {peak} off from 0.5 Hz"
        );
    }

    #[test]
    fn empty_band_yields_none() {
        let fs = 30.0;
        let signal = sine(0.5, fs, 1200);
        let spectrum = welch(&signal, fs, 900).unwrap();

        // Narrower than one bin and between bin centers
        assert!(spectrum.peak_in_band(0.011, 0.012).is_none());
    }

    #[test]
    fn too_short_signal_yields_none() {
        assert!(welch(&[1.0], 30.0, 256).is_none());
        assert!(welch(&[], 30.0, 256).is_none());
    }

    #[test]
    fn nperseg_clamped_to_signal() {
        let fs = 30.0;
        let signal = sine(0.5, fs, 300);
        let spectrum = welch(&signal, fs, 4096).unwrap();
        assert_eq!(spectrum.freqs.len(), 300 / 2 + 1);
    }

    #[test]
    fn overlapping_segments_average() {
        let fs = 30.0;
        let signal = sine(0.5, fs, 1200);
        // 300-sample segments: several overlapping periodograms get averaged
        let spectrum = welch(&signal, fs, 300).unwrap();
        let peak = spectrum.peak_in_band(0.1, 0.7).unwrap();
        assert!((peak - 0.5).abs() <= fs / 300.0);
    }
}
