//! Zero-phase Butterworth band-pass filtering
//!
//! Designs an IIR Butterworth band-pass (analog prototype, low-pass to
//! band-pass transform, bilinear mapping) and applies it forward and
//! backward so the group delay of the two passes cancels. Downstream
//! peak/envelope timing therefore stays aligned with the input timeline.
//!
//! Coefficients and filter state are kept in f64: the respiration band sits
//! far below typical camera sample rates, which puts the poles close to the
//! unit circle.

use nalgebra::{DMatrix, DVector};
use ndarray::Array1;
use num_complex::Complex64;
use std::f64::consts::PI;
use thiserror::Error;

/// Errors from filter design or application
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid band: require 0 < {low} < {high} < {nyquist} (Nyquist)")]
    InvalidBand { low: f32, high: f32, nyquist: f32 },

    #[error("input too short for zero-phase padding: {len} samples, need at least {min}")]
    TooShort { len: usize, min: usize },
}

/// Band-pass a signal with zero net phase distortion.
///
/// Runs a Butterworth band-pass of the given `order` forward and backward
/// over the signal (odd-extension padding, steady-state initial conditions),
/// so the output has no group delay relative to the input.
///
/// # Errors
///
/// - [`FilterError::InvalidBand`] unless `0 < low < high < fs / 2`
/// - [`FilterError::TooShort`] if the signal cannot cover the edge padding
///   required by the forward-backward pass
pub fn bandpass(
    signal: &Array1<f32>,
    fs: f32,
    low: f32,
    high: f32,
    order: usize,
) -> Result<Array1<f32>, FilterError> {
    let (b, a) = design_bandpass(order, low, high, fs)?;

    let n = signal.len();
    let padlen = 3 * a.len().max(b.len());
    if n <= padlen {
        return Err(FilterError::TooShort {
            len: n,
            min: padlen + 1,
        });
    }

    let x: Vec<f64> = signal.iter().map(|&v| v as f64).collect();

    // Odd extension at both ends absorbs the startup transient.
    let mut ext = Vec::with_capacity(n + 2 * padlen);
    for i in (1..=padlen).rev() {
        ext.push(2.0 * x[0] - x[i]);
    }
    ext.extend_from_slice(&x);
    for i in ((n - 1 - padlen)..(n - 1)).rev() {
        ext.push(2.0 * x[n - 1] - x[i]);
    }

    let zi = steady_state_init(&b, &a);

    // Forward pass
    let z0: Vec<f64> = zi.iter().map(|v| v * ext[0]).collect();
    let fwd = lfilter(&b, &a, &ext, &z0);

    // Backward pass over the reversed forward output
    let rev: Vec<f64> = fwd.into_iter().rev().collect();
    let z1: Vec<f64> = zi.iter().map(|v| v * rev[0]).collect();
    let back = lfilter(&b, &a, &rev, &z1);

    let out: Array1<f32> = back
        .iter()
        .rev()
        .skip(padlen)
        .take(n)
        .map(|&v| v as f32)
        .collect();
    Ok(out)
}

/// Design digital Butterworth band-pass coefficients (b, a).
fn design_bandpass(
    order: usize,
    low: f32,
    high: f32,
    fs: f32,
) -> Result<(Vec<f64>, Vec<f64>), FilterError> {
    debug_assert!(order >= 1);
    if !(low > 0.0 && low < high && high < fs / 2.0) {
        return Err(FilterError::InvalidBand {
            low,
            high,
            nyquist: fs / 2.0,
        });
    }

    let fs = fs as f64;
    let n = order as f64;

    // Pre-warp corner frequencies for the bilinear transform
    let w1 = 2.0 * fs * (PI * low as f64 / fs).tan();
    let w2 = 2.0 * fs * (PI * high as f64 / fs).tan();
    let bw = w2 - w1;
    let wo = (w1 * w2).sqrt();

    // Analog low-pass prototype poles (unit cutoff, Butterworth circle)
    let mut proto = Vec::with_capacity(order);
    for k in 0..order {
        let m = (2 * k as i64 + 1) as f64 - n;
        let theta = PI * m / (2.0 * n);
        proto.push(-Complex64::from_polar(1.0, theta));
    }

    // Low-pass to band-pass: each prototype pole splits into a pair
    let mut poles = Vec::with_capacity(2 * order);
    for &p in &proto {
        let t = p * (bw / 2.0);
        let d = (t * t - wo * wo).sqrt();
        poles.push(t + d);
        poles.push(t - d);
    }
    let gain = bw.powi(order as i32);

    // Bilinear transform to the z-plane
    let fs2 = Complex64::new(2.0 * fs, 0.0);
    let mut num = Complex64::new(1.0, 0.0);
    for _ in 0..order {
        num *= fs2; // analog zeros all at s = 0
    }
    let mut den = Complex64::new(1.0, 0.0);
    let mut zpoles = Vec::with_capacity(2 * order);
    for &p in &poles {
        den *= fs2 - p;
        zpoles.push((fs2 + p) / (fs2 - p));
    }
    let gain_z = gain * (num / den).re;

    // Digital zeros: `order` at z = +1 (from s = 0) and `order` at z = -1
    let mut zzeros = vec![Complex64::new(1.0, 0.0); order];
    zzeros.extend(std::iter::repeat(Complex64::new(-1.0, 0.0)).take(order));

    let b: Vec<f64> = poly(&zzeros).iter().map(|c| c.re * gain_z).collect();
    let a: Vec<f64> = poly(&zpoles).iter().map(|c| c.re).collect();
    Ok((b, a))
}

/// Expand a monic polynomial from its roots.
fn poly(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for &r in roots {
        coeffs.push(Complex64::new(0.0, 0.0));
        for i in (1..coeffs.len()).rev() {
            let prev = coeffs[i - 1];
            coeffs[i] -= r * prev;
        }
    }
    coeffs
}

/// Initial filter state whose step response is already in steady state.
///
/// Solves `(I - A^T) zi = B` for the direct-form II transposed state, where
/// `A` is the companion matrix of `a`. Scaling this state by the first input
/// sample suppresses the edge transient of each filtering pass.
fn steady_state_init(b: &[f64], a: &[f64]) -> Vec<f64> {
    let m = a.len() - 1;
    let mtx = DMatrix::<f64>::from_fn(m, m, |i, j| {
        let mut v = if i == j { 1.0 } else { 0.0 };
        if j == 0 {
            v += a[i + 1];
        }
        if j == i + 1 {
            v -= 1.0;
        }
        v
    });
    let rhs = DVector::<f64>::from_fn(m, |i, _| b[i + 1] - a[i + 1] * b[0]);
    match mtx.lu().solve(&rhs) {
        Some(zi) => zi.iter().copied().collect(),
        None => vec![0.0; m],
    }
}

/// Direct-form II transposed IIR filter with explicit initial state.
fn lfilter(b: &[f64], a: &[f64], x: &[f64], zi: &[f64]) -> Vec<f64> {
    let mut z = zi.to_vec();
    let m = z.len();
    x.iter()
        .map(|&xi| {
            let y = b[0] * xi + z[0];
            for i in 0..m - 1 {
                z[i] = b[i + 1] * xi + z[i + 1] - a[i + 1] * y;
            }
            z[m - 1] = b[m] * xi - a[m] * y;
            y
        })
        .collect()
}
