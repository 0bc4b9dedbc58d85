//! Grading: runtimes, pass criteria and the engine

pub mod criteria;
pub mod engine;
pub mod native;
pub mod runtime;

pub use criteria::{AcceptanceBand, CalibrationBands, GradingMode};
pub use engine::{FunctionGrade, GradeReport, GradingEngine, REASON_GRADING_ERROR, REASON_NOT_FOUND};
pub use native::{NativeFn, NativeRuntime};
pub use runtime::{CallOutcome, Invocation, PythonRuntime, RuntimeFault, SubmissionRuntime};

/// Python source implementing all five functions to the default thresholds
pub const PYTHON_REFERENCE_SOLUTION: &str = include_str!("reference_solution.py");
