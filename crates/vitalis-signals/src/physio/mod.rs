//! Physiological estimators built on the DSP primitives.

mod respiration;

pub use respiration::{RrConfig, RrEstimator};
