//! `gradebench grade <FILE>`

use std::sync::Arc;

use anyhow::{Context, Result};
use gradebench_core::PythonInterpreter;
use gradebench_eval::{GradingEngine, PythonRuntime};

use crate::args::GradeArgs;
use crate::console;

/// Grade a source file through the Python runtime and print per-function results
pub async fn execute(args: GradeArgs) -> Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let mode = match &args.mode {
        Some(mode) => super::parse_mode(mode)?,
        None => config.grading.clone(),
    };

    let source = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read source file: {}", args.file.display()))?;

    let interpreter = PythonInterpreter::from_config(&config.python);
    if !interpreter.is_available().await {
        anyhow::bail!("Python interpreter '{}' not found", interpreter.program());
    }

    let engine = GradingEngine::new(
        Arc::new(PythonRuntime::new(interpreter)),
        config.vector_set(),
        mode,
    );
    let report = engine.grade(&source).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    console::print_header(&format!("Grading {} ({})", args.file.display(), engine.mode().label()));
    for (key, grade) in &report.results {
        console::print_grade(*key, grade);
    }
    if let Some(error) = &report.error {
        console::error(error);
    }
    println!("\nScore: {}/{}", report.score, report.results.len());
    Ok(())
}
