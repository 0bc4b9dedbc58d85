//! CLI console utilities

use colored::*;
use gradebench_eval::{FunctionGrade, FunctionKey, Verdict};

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message.yellow());
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

/// Print a header
pub fn print_header(title: &str) {
    println!();
    println!("{}", title.bold().underline());
    println!("{}", "=".repeat(title.len()).dimmed());
}

/// One function's verdict, colored
pub fn print_grade(key: FunctionKey, grade: &FunctionGrade) {
    let status = if grade.passed {
        "PASSED".green().bold()
    } else {
        "FAILED".red().bold()
    };
    println!(
        "  {:<32} {} {}",
        key.symbol(),
        status,
        format!("({}/{}) {}", grade.vectors_passed, grade.vectors_total, grade.reason).dimmed()
    );
}

/// Final calibration line
pub fn print_verdict(verdict: Verdict) {
    let text = verdict.describe();
    if verdict.is_within_band() {
        success(text);
    } else {
        warn(text);
    }
}
