//! Agent session: the tool-calling conversation loop

pub mod retry;
pub mod session;
pub mod transcript;

pub use retry::{FaultAction, RetryPolicy, StepFault};
pub use session::{
    AgentSession, DEFAULT_MAX_STEPS, SessionOptions, SessionOutcome, SessionReport,
};
pub use transcript::{Transcript, TurnDelta};
