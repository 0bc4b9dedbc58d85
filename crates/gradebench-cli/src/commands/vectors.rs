//! `gradebench vectors`

use std::path::Path;

use anyhow::Result;
use colored::*;
use gradebench_eval::TestVector;

/// Print every hidden vector with its call and expected outcome
pub fn execute(config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path)?;
    let vectors = config.vector_set();

    for (key, cases) in vectors.iter() {
        println!("\n{} ({} vectors)", key.symbol().bold(), cases.len());
        println!("{:-<70}", "");
        for (index, vector) in cases.iter().enumerate() {
            println!("{}", vector_line(index, vector)?);
            println!("     expect {}", vector.check.describe());
        }
    }

    println!("\nTotal: {} vectors", vectors.total());
    Ok(())
}

/// Numbered from 1, matching the indices in grading reasons
fn vector_line(index: usize, vector: &TestVector) -> Result<String> {
    Ok(format!(
        "{:>3}. {:<24} {}",
        index + 1,
        vector.tag,
        serde_json::to_string(&vector.call)?.dimmed()
    ))
}
