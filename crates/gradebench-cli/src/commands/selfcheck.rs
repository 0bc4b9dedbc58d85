//! `gradebench selfcheck`

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use gradebench_core::PythonInterpreter;
use gradebench_eval::{
    DriftOracle, FunctionKey, GradingEngine, GradingMode, NativeRuntime,
    PYTHON_REFERENCE_SOLUTION, PythonRuntime, SubmissionRuntime,
};

use crate::console;

/// Grade the reference solution strictly; fails unless it scores 5
pub async fn execute(python: bool, config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path)?;

    let runtime: Arc<dyn SubmissionRuntime> = if python {
        let interpreter = PythonInterpreter::from_config(&config.python);
        if !interpreter.is_available().await {
            anyhow::bail!("Python interpreter '{}' not found", interpreter.program());
        }
        Arc::new(PythonRuntime::new(interpreter))
    } else {
        Arc::new(NativeRuntime::reference(DriftOracle::new(config.thresholds.clone())))
    };

    let engine = GradingEngine::new(runtime.clone(), config.vector_set(), GradingMode::Strict);
    let report = engine.grade(PYTHON_REFERENCE_SOLUTION).await;

    console::print_header(&format!(
        "Self-check: reference solution on the {} runtime ({} vectors)",
        runtime.name(),
        engine.vectors().total()
    ));
    for (key, grade) in &report.results {
        console::print_grade(*key, grade);
    }

    let total = FunctionKey::ALL.len();
    if report.score < total {
        if let Some(error) = &report.error {
            console::error(error);
        }
        anyhow::bail!("reference solution scored {}/{}", report.score, total);
    }
    console::success(&format!("reference solution scored {}/{}", report.score, total));
    Ok(())
}
