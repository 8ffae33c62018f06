//! # vitalis-core
//!
//! Per-connection vitals reporting for Vitalis.
//!
//! A [`ConnectionSession`] owns everything one peer connection needs:
//! frames go in, the external biosignal model turns them into a pulse
//! waveform, and once per second the session decides whether enough good
//! signal exists to publish a `{hr, rr}` report.
//!
//! ```text
//! frames ──► BiosignalModel ──► BVP / HR / SQI
//!                 │
//!    1 Hz tick ───┤
//!                 ▼
//!   ReportGate ─► SQI gate ─► RrEstimator ─► RrHistory ─► ReportPayload
//! ```
//!
//! The model, the frame source, and the outbound channel are external
//! collaborators expressed as a trait ([`BiosignalModel`]), an mpsc
//! receiver, and a [`ReportSink`] respectively.

pub mod config;
pub mod error;
pub mod gate;
pub mod history;
pub mod model;
pub mod payload;
pub mod session;

pub use config::{ConfigError, ReportConfig};
pub use error::SinkError;
pub use gate::{GateDecision, GateState, ReportGate};
pub use history::RrHistory;
pub use model::{BiosignalModel, HrSample, VideoFrame};
pub use payload::ReportPayload;
pub use session::{ConnectionSession, ReportSink};
