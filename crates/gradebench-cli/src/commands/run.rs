//! `gradebench run`

use std::sync::Arc;

use anyhow::{Context, Result};
use gradebench_core::{AnthropicProvider, PythonInterpreter, ToolExecutor};
use gradebench_eval::{
    Orchestrator, PythonRuntime, ReportFormat, RunResult, Schedule, generate_report,
    trial_summary,
};
use tracing::info;

use crate::args::RunArgs;
use crate::console;

/// Run the evaluation and print the report. Exits 0 whatever the verdict.
pub async fn execute(args: RunArgs) -> Result<()> {
    let mut config = super::load_config(args.config.as_deref())?;

    if let Some(trials) = args.trials {
        config = config.with_trials(trials);
    }
    if args.sequential {
        config = config.with_schedule(Schedule::Sequential);
    }
    if let Some(mode) = &args.mode {
        config = config.with_grading(super::parse_mode(mode)?);
    }
    if let Some(max_steps) = args.max_steps {
        config = config.with_max_steps(max_steps);
    }
    if let Some(limit) = args.max_concurrency {
        config = config.with_max_concurrency(limit);
    }
    if let Some(model) = args.model {
        config = config.with_model(model);
    }

    let interpreter = PythonInterpreter::from_config(&config.python);
    if !interpreter.is_available().await {
        console::warn(&format!(
            "Python interpreter '{}' not found; every submission will fail to grade",
            interpreter.program()
        ));
    }

    let provider =
        AnthropicProvider::new(config.model.clone()).context("Failed to create model provider")?;
    let mut orchestrator = Orchestrator::from_config(
        &config,
        Arc::new(provider),
        ToolExecutor::python(interpreter.clone()),
        Arc::new(PythonRuntime::new(interpreter)),
    )?;
    let format = args.format;
    orchestrator.set_progress_callback(Box::new(move |result: &RunResult| {
        progress(format, &trial_summary(result));
    }));

    info!(trials = config.trials, schedule = %config.schedule, "running evaluation");
    progress(
        format,
        &format!(
            "Starting evaluation: {} trials ({}, {} grading)\n",
            config.trials,
            config.schedule,
            config.grading.label()
        ),
    );

    let report = orchestrator.run(config.trials, config.schedule).await;

    println!("{}", generate_report(&report, format)?);

    if format != ReportFormat::Json {
        console::print_verdict(report.verdict);
    }
    Ok(())
}

/// Progress lines stay off stdout when stdout carries a JSON report
fn progress_to_stderr(format: ReportFormat) -> bool {
    format == ReportFormat::Json
}

fn progress(format: ReportFormat, line: &str) {
    if progress_to_stderr(format) {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}
