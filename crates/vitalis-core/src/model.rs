//! External biosignal model contract.
//!
//! The model that turns video frames into a pulse waveform, heart rate, and
//! signal quality is an opaque collaborator. The session only relies on the
//! operations below; face tracking, decoding, and inference details stay on
//! the other side of the trait.

use ndarray::Array1;

/// A decoded video frame with its capture timestamp.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Packed RGB888 pixels
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Capture timestamp in microseconds
    pub ts_us: i64,
}

/// Heart-rate estimate with an optional quality index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HrSample {
    /// Heart rate in beats/minute, absent if the model has no estimate
    pub hr: Option<f32>,
    /// Signal-quality index in [0, 1], absent if the model cannot report
    /// confidence
    pub sqi: Option<f32>,
}

/// Frame-to-biosignal model, scoped to one connection.
///
/// Implementations own the waveform buffer; the session only reads bounded
/// trailing windows of it.
pub trait BiosignalModel: Send {
    /// Feed one decoded frame into the model.
    fn update(&mut self, frame: &VideoFrame);

    /// Number of waveform samples accumulated so far.
    fn signal_count(&self) -> usize;

    /// Whether a face was visible on the most recent frames.
    fn has_face(&self) -> bool;

    /// Effective sampling rate of the waveform (frames/second).
    fn fps(&self) -> f32;

    /// Heart-rate estimate over the trailing `window_s` seconds.
    fn hr_estimate(&mut self, window_s: f32) -> HrSample;

    /// Trailing `window_s` seconds of the BVP waveform, if available.
    fn bvp_window(&mut self, window_s: f32) -> Option<Array1<f32>>;

    /// Release model resources. Called exactly once when the frame stream
    /// ends.
    fn stop(&mut self);
}
