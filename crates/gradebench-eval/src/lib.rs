//! Gradebench evaluation harness
//!
//! Runs repeated agent trials against the drift-detection coding task, grades
//! each submission against hidden test vectors, and reports whether the pass
//! rate lands in the target calibration band.
//!
//! # Features
//!
//! - **Hidden vectors**: derived from a native oracle for the five graded functions
//! - **Grading runtimes**: an isolated Python runtime, or native closures for tests
//! - **Orchestration**: parallel or sequential trials with crash isolation
//! - **Report Generation**: table, Markdown, and JSON output formats
//!
//! # Example
//!
//! ```rust,ignore
//! use gradebench_eval::{EvalConfig, Orchestrator, PythonRuntime};
//!
//! let config = EvalConfig::load(None)?;
//! let orchestrator = Orchestrator::from_config(&config, provider, executor, runtime)?;
//! let report = orchestrator.run(config.trials, config.schedule).await;
//! ```

pub mod grading;
pub mod metrics;
pub mod report;
pub mod runner;
pub mod tasks;

// Re-exports for convenience
pub use grading::{
    FunctionGrade, GradeReport, GradingEngine, GradingMode, NativeRuntime, PYTHON_REFERENCE_SOLUTION,
    PythonRuntime, SubmissionRuntime,
};
pub use metrics::{CalibrationBand, EvaluationReport, RunResult, TrialOutcome, Verdict};
pub use report::{ReportFormat, generate_report, trial_summary};
pub use runner::{EvalConfig, Orchestrator, ProgressCallback, Schedule};
pub use tasks::{DriftOracle, FunctionKey, TaskPrompt, TestVector, VectorSet};
