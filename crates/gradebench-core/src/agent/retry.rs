//! Fault handling policy for provider calls within a session

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::llm::{FaultKind, ProviderError};

/// How a session reacts to provider faults.
///
/// Every fault consumes a step and the loop moves on. Ending the session on a
/// terminal fault is opt-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// End the session on the first terminal fault
    #[serde(default = "default_abort_on_terminal")]
    pub abort_on_terminal: bool,

    /// Pause before the step following a fault
    #[serde(default, with = "humantime_serde")]
    pub backoff: Duration,
}

fn default_abort_on_terminal() -> bool {
    false
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            abort_on_terminal: default_abort_on_terminal(),
            backoff: Duration::ZERO,
        }
    }
}

/// What the session does after a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultAction {
    /// Move on to the next step
    Continue,
    /// Stop the session
    Abort,
}

impl RetryPolicy {
    /// Stop the session on the first terminal fault
    pub fn abort_on_terminal() -> Self {
        Self {
            abort_on_terminal: true,
            ..Default::default()
        }
    }

    /// Decide how to proceed after `error`
    pub fn on_fault(&self, error: &ProviderError) -> FaultAction {
        match error.kind() {
            FaultKind::Terminal if self.abort_on_terminal => FaultAction::Abort,
            _ => FaultAction::Continue,
        }
    }
}

/// A provider fault observed at a given step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepFault {
    /// 1-based step number
    pub step: usize,
    /// Classification
    pub kind: FaultKind,
    /// Sanitized message
    pub message: String,
}

impl StepFault {
    /// Record `error` as seen at `step`
    pub fn new(step: usize, error: &ProviderError) -> Self {
        Self {
            step,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_continues_through_every_fault() {
        let policy = RetryPolicy::default();
        assert!(!policy.abort_on_terminal);
        assert_eq!(policy.on_fault(&ProviderError::terminal("401")), FaultAction::Continue);
        assert_eq!(policy.on_fault(&ProviderError::transient("429")), FaultAction::Continue);
    }

    #[test]
    fn test_abort_on_terminal_only_stops_terminal_faults() {
        let policy = RetryPolicy::abort_on_terminal();
        assert_eq!(policy.on_fault(&ProviderError::terminal("401")), FaultAction::Abort);
        assert_eq!(policy.on_fault(&ProviderError::transient("429")), FaultAction::Continue);
    }

    #[test]
    fn test_deserialize_backoff() {
        let policy: RetryPolicy = serde_json::from_str(r#"{"backoff": "250ms"}"#).unwrap();
        assert!(!policy.abort_on_terminal);
        assert_eq!(policy.backoff, Duration::from_millis(250));
    }

    #[test]
    fn test_step_fault_records_kind() {
        let fault = StepFault::new(3, &ProviderError::http("Anthropic", 529, "overloaded"));
        assert_eq!(fault.step, 3);
        assert_eq!(fault.kind, FaultKind::Transient);
        assert!(fault.message.contains("529"));
    }
}
