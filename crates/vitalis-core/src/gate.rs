//! Report gating state machine.
//!
//! A connection moves through `Warmup → Accumulating → GatedOk` before any
//! report computation is attempted. On top of the latched state, face
//! visibility is an instantaneous per-tick gate: losing the face skips the
//! tick but does not regress the state.

/// Latched gate state, per connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Waiting out the initial settling period after connection start
    Warmup,
    /// Waiting for the model to accumulate enough waveform samples
    Accumulating,
    /// All latched gates passed; ticks proceed while a face is visible
    GatedOk,
}

/// Outcome of one gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Still inside the warm-up period
    Warmup,
    /// Not enough accumulated signal yet
    Accumulating,
    /// Gates latched open, but no face on this tick
    NoFace,
    /// Proceed with HR/RR computation
    Pass,
}

impl GateDecision {
    pub fn is_pass(self) -> bool {
        matches!(self, GateDecision::Pass)
    }
}

/// Per-connection report gate.
#[derive(Debug, Clone)]
pub struct ReportGate {
    state: GateState,
    warmup_us: i64,
    min_signal_s: f32,
}

impl ReportGate {
    /// `warmup_s`: seconds since connection start before any attempt.
    /// `min_signal_s`: seconds worth of samples (at the model's fps) that
    /// must be accumulated.
    pub fn new(warmup_s: f32, min_signal_s: f32) -> Self {
        Self {
            state: GateState::Warmup,
            warmup_us: (warmup_s * 1e6) as i64,
            min_signal_s,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Run the gate for one cadence tick.
    pub fn evaluate(
        &mut self,
        elapsed_us: i64,
        signal_count: usize,
        fps: f32,
        has_face: bool,
    ) -> GateDecision {
        if self.state == GateState::Warmup {
            if elapsed_us < self.warmup_us {
                return GateDecision::Warmup;
            }
            self.state = GateState::Accumulating;
        }

        if self.state == GateState::Accumulating {
            let min_samples = (fps * self.min_signal_s) as usize;
            if signal_count < min_samples {
                return GateDecision::Accumulating;
            }
            self.state = GateState::GatedOk;
        }

        if !has_face {
            return GateDecision::NoFace;
        }
        GateDecision::Pass
    }
}
