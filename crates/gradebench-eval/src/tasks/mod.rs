//! Task definition: prompt, graded functions, oracle and hidden vectors

pub mod oracle;
pub mod task;
pub mod vectors;

pub use oracle::{DriftImpact, DriftOracle, DriftThresholds, DriftType, ResponseAction};
pub use task::{DEFAULT_PROMPT, FunctionKey, TaskPrompt};
pub use vectors::{CallArgs, Check, LabelCase, TestVector, VectorSet};
