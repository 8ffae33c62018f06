//! Per-connection reporting session.
//!
//! One session owns one connection's model, gate, smoothing history, and
//! outbound handle, and is driven by a single task: frame arrival is the
//! suspension point, and the 1 Hz cadence check runs inline after each
//! frame. No state is shared across connections, so no locking is needed.
//!
//! Failure policy: per-tick problems (not enough data, low quality, a full
//! or closed outbound channel) are local and non-fatal. The only externally
//! visible effect is a missing payload or a payload missing one field. A
//! failing frame source ends the loop, after which the model is released
//! unconditionally.

use crate::config::ReportConfig;
use crate::error::SinkError;
use crate::gate::ReportGate;
use crate::history::RrHistory;
use crate::model::{BiosignalModel, VideoFrame};
use crate::payload::ReportPayload;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use vitalis_signals::RrEstimator;

/// Outbound report channel, fire-and-forget.
///
/// Send failures are best-effort territory: the session logs and continues.
pub trait ReportSink: Send {
    fn send(&mut self, text: String) -> Result<(), SinkError>;
}

impl ReportSink for mpsc::UnboundedSender<String> {
    fn send(&mut self, text: String) -> Result<(), SinkError> {
        mpsc::UnboundedSender::send(self, text).map_err(|_| SinkError::Closed)
    }
}

/// Everything one peer connection needs to turn frames into vitals reports.
pub struct ConnectionSession {
    config: ReportConfig,
    model: Box<dyn BiosignalModel>,
    gate: ReportGate,
    history: RrHistory,
    estimator: RrEstimator,
    sink: Option<Box<dyn ReportSink>>,
    start_ts_us: Option<i64>,
    last_report_ts_us: Option<i64>,
    interval_us: i64,
}

impl ConnectionSession {
    pub fn new(config: ReportConfig, model: Box<dyn BiosignalModel>) -> Self {
        let gate = ReportGate::new(config.warmup_s, config.min_signal_s);
        let history = RrHistory::new(config.history_len);
        let estimator = RrEstimator::with_config(config.rr.clone());
        let interval_us = (config.report_interval_s * 1e6) as i64;
        Self {
            config,
            model,
            gate,
            history,
            estimator,
            sink: None,
            start_ts_us: None,
            last_report_ts_us: None,
            interval_us,
        }
    }

    /// Attach the outbound channel handle. Set exactly once; a second
    /// attempt is ignored.
    pub fn set_sink(&mut self, sink: Box<dyn ReportSink>) {
        if self.sink.is_some() {
            warn!("outbound channel already attached, ignoring replacement");
            return;
        }
        self.sink = Some(sink);
    }

    /// Drive the session until the frame source ends, then release the
    /// model.
    pub async fn run(mut self, mut frames: mpsc::Receiver<VideoFrame>) {
        while let Some(frame) = frames.recv().await {
            self.ingest(&frame);
        }
        debug!("frame stream ended, releasing model");
        self.history.clear();
        self.model.stop();
    }

    /// Feed one frame to the model and run the cadence check.
    fn ingest(&mut self, frame: &VideoFrame) {
        let ts_us = frame.ts_us;
        let start_ts_us = *self.start_ts_us.get_or_insert(ts_us);
        self.model.update(frame);

        let due = match self.last_report_ts_us {
            None => true,
            Some(last) => ts_us - last >= self.interval_us,
        };
        if due {
            self.tick(ts_us, start_ts_us);
        }
    }

    /// One cadence tick: gate, then conditionally estimate and report.
    ///
    /// `last_report_ts_us` advances whether or not the tick produces a
    /// payload, preserving the cadence.
    fn tick(&mut self, ts_us: i64, start_ts_us: i64) {
        self.last_report_ts_us = Some(ts_us);

        let decision = self.gate.evaluate(
            ts_us - start_ts_us,
            self.model.signal_count(),
            self.model.fps(),
            self.model.has_face(),
        );
        if !decision.is_pass() {
            debug!(?decision, "report tick skipped");
            return;
        }

        let sample = self.model.hr_estimate(self.config.hr_window_s);

        // RR is only recomputed on good-quality ticks; otherwise the
        // previously smoothed value (if any) still gets reported.
        let quality_ok = sample.sqi.map_or(false, |sqi| sqi >= self.config.min_sqi);
        if quality_ok {
            if let Some(bvp) = self.model.bvp_window(self.config.bvp_window_s) {
                if let Some(rr) = self.estimator.estimate(&bvp, self.model.fps()) {
                    self.history.push(rr);
                }
            }
        }

        let payload = ReportPayload::from_parts(sample.hr, self.history.median());
        if payload.is_empty() {
            return;
        }
        self.emit(&payload);
    }

    fn emit(&mut self, payload: &ReportPayload) {
        let Some(sink) = self.sink.as_mut() else {
            debug!("no outbound channel attached, dropping report");
            return;
        };
        let text = match serde_json::to_string(payload) {
            Ok(text) => text,
            Err(err) => {
                debug!(%err, "payload encoding failed, dropping report");
                return;
            }
        };
        match sink.send(text) {
            Ok(()) => info!(hr = ?payload.hr, rr = ?payload.rr, "vitals report"),
            Err(err) => debug!(%err, "report send failed, continuing"),
        }
    }
}
