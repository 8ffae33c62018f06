//! Peak detection with a minimum inter-peak distance
//!
//! Finds local maxima (plateau midpoints included) and then prunes peaks
//! closer than `distance` samples, keeping the taller of any conflicting
//! pair. The distance acts as a refractory period when applied to a pulse
//! waveform.

use ndarray::Array1;
use std::cmp::Ordering;

/// Indices of local maxima separated by at least `distance` samples.
pub fn find_peaks(signal: &Array1<f32>, distance: usize) -> Vec<usize> {
    let n = signal.len();
    let mut peaks: Vec<usize> = Vec::new();
    if n >= 3 {
        let mut i = 1usize;
        while i < n - 1 {
            if signal[i - 1] < signal[i] {
                // Walk across a flat top, if any
                let mut ahead = i + 1;
                while ahead < n - 1 && signal[ahead] == signal[i] {
                    ahead += 1;
                }
                if signal[ahead] < signal[i] {
                    peaks.push((i + ahead - 1) / 2);
                    i = ahead;
                    continue;
                }
            }
            i += 1;
        }
    }

    if distance <= 1 || peaks.len() < 2 {
        return peaks;
    }

    // Highest peaks claim their neighborhood first
    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by(|&x, &y| {
        signal[peaks[y]]
            .partial_cmp(&signal[peaks[x]])
            .unwrap_or(Ordering::Equal)
    });

    let mut keep = vec![true; peaks.len()];
    for &idx in &order {
        if !keep[idx] {
            continue;
        }
        let pos = peaks[idx];
        for j in (0..idx).rev() {
            if pos - peaks[j] >= distance {
                break;
            }
            keep[j] = false;
        }
        for j in idx + 1..peaks.len() {
            if peaks[j] - pos >= distance {
                break;
            }
            keep[j] = false;
        }
    }

    peaks
        .into_iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn counts_sine_peaks() {
        // 1 Hz sine at 30 Hz over 4 s: 4 full cycles
        let signal: Array1<f32> = (0..120)
            .map(|i| (2.0 * PI * i as f32 / 30.0).sin())
            .collect();
        let peaks = find_peaks(&signal, 1);
        assert_eq!(peaks.len(), 4);
    }

    #[test]
    fn distance_prunes_lower_peak() {
        let signal = Array1::from_vec(vec![0.0, 1.0, 0.5, 0.8, 0.0, 0.0, 0.0, 2.0, 0.0]);
        // Without distance both local maxima at 1 and 3 survive
        assert_eq!(find_peaks(&signal, 1), vec![1, 3, 7]);
        // With distance 4 the taller of the close pair wins
        assert_eq!(find_peaks(&signal, 4), vec![1, 7]);
    }

    #[test]
    fn plateau_reports_midpoint() {
        let signal = Array1::from_vec(vec![0.0, 1.0, 1.0, 1.0, 0.0]);
        assert_eq!(find_peaks(&signal, 1), vec![2]);
    }

    #[test]
    fn no_peaks_in_monotonic_signal() {
        let signal: Array1<f32> = (0..50).map(|i| i as f32).collect();
        assert!(find_peaks(&signal, 1).is_empty());
    }
}
