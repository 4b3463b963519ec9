//! Diabetes risk assessment: the metric form and its submit/reset lifecycle.
//!
//! ```text
//! Editing ──submit──▶ Submitting ──▶ Succeeded(Assessment)
//!    ▲                    │
//!    │                    └────────▶ Failed(message)
//!    └─────────reset──────────────────────┘
//! ```
//!
//! `Submitting` lasts exactly as long as the gateway call. It is entered and
//! left through [`SubmitGuard`], so every exit path (including a panic inside
//! the transport) leaves the flow in a terminal state.

pub mod form;
pub mod result;

pub use form::{Gender, Metric, MetricSpec, RiskMetrics};
pub use result::{
    Assessment, NEXT_STEPS, Prediction, PredictionResult, ResultSource, RiskLevel,
};

use crate::gateway::Gateway;

/// Message shown when the assessment call fails. The underlying error is
/// logged, never shown.
pub const GENERIC_ERROR: &str =
    "An error occurred while processing your request. Please try again.";

// ---------------------------------------------------------------------------
// Flow state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    Editing,
    Submitting,
    Succeeded(Assessment),
    Failed(String),
}

/// One user's risk form plus the outcome of its last submission.
#[derive(Debug, Clone)]
pub struct AssessmentFlow {
    metrics: RiskMetrics,
    state: FlowState,
}

impl Default for AssessmentFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl AssessmentFlow {
    pub fn new() -> Self {
        Self::with_metrics(RiskMetrics::default())
    }

    /// Start from existing values; every field is clamped.
    pub fn with_metrics(metrics: RiskMetrics) -> Self {
        Self {
            metrics: metrics.clamped(),
            state: FlowState::Editing,
        }
    }

    pub fn metrics(&self) -> &RiskMetrics {
        &self.metrics
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, FlowState::Submitting)
    }

    /// Latest assessment, if the last submission succeeded.
    pub fn assessment(&self) -> Option<&Assessment> {
        match &self.state {
            FlowState::Succeeded(assessment) => Some(assessment),
            _ => None,
        }
    }

    /// Update one numeric field. Returns the stored (clamped) value.
    pub fn set(&mut self, metric: Metric, value: f64) -> f64 {
        self.metrics.set(metric, value)
    }

    pub fn set_gender(&mut self, gender: Gender) {
        self.metrics.gender = gender;
    }

    /// Send the current metrics to the gateway and record the outcome.
    ///
    /// A call while a submission is in flight is ignored.
    pub fn submit(&mut self, gateway: &Gateway) -> &FlowState {
        if self.is_submitting() {
            return &self.state;
        }

        let metrics = self.metrics;
        {
            let mut guard = SubmitGuard::enter(&mut self.state);
            match gateway.assess_risk(&metrics) {
                Ok(assessment) => guard.finish(FlowState::Succeeded(assessment)),
                Err(e) => {
                    eprintln!("risk assessment failed: {e}");
                    guard.finish(FlowState::Failed(GENERIC_ERROR.to_string()));
                }
            }
        }
        &self.state
    }

    /// Discard the result and return to editing. Field values are kept.
    pub fn reset(&mut self) {
        self.state = FlowState::Editing;
    }
}

// ---------------------------------------------------------------------------
// Scoped submitting flag
// ---------------------------------------------------------------------------

/// Holds the flow in `Submitting` until dropped.
///
/// Dropping without [`SubmitGuard::finish`] lands in `Failed` with the
/// generic message.
struct SubmitGuard<'a> {
    state: &'a mut FlowState,
    outcome: Option<FlowState>,
}

impl<'a> SubmitGuard<'a> {
    fn enter(state: &'a mut FlowState) -> Self {
        *state = FlowState::Submitting;
        Self {
            state,
            outcome: None,
        }
    }

    fn finish(&mut self, outcome: FlowState) {
        self.outcome = Some(outcome);
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        *self.state = self
            .outcome
            .take()
            .unwrap_or_else(|| FlowState::Failed(GENERIC_ERROR.to_string()));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
