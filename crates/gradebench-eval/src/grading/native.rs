//! In-process runtime backed by Rust closures
//!
//! Used for self-checks and tests where no interpreter is available. The
//! source text is not executed; the registered closures stand in for it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::runtime::{CallOutcome, Invocation, RuntimeFault, SubmissionRuntime};
use crate::tasks::{CallArgs, DriftOracle, FunctionKey};

/// A registered function body
pub type NativeFn = Arc<dyn Fn(&CallArgs) -> Result<Value, String> + Send + Sync>;

/// Runtime resolving symbols to Rust closures
#[derive(Clone, Default)]
pub struct NativeRuntime {
    functions: HashMap<String, NativeFn>,
    load_error: Option<String>,
}

impl std::fmt::Debug for NativeRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut symbols: Vec<&String> = self.functions.keys().collect();
        symbols.sort();
        f.debug_struct("NativeRuntime")
            .field("symbols", &symbols)
            .field("load_error", &self.load_error)
            .finish()
    }
}

fn missing(name: &str) -> String {
    format!("TypeError: missing argument '{}'", name)
}

impl NativeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function under `symbol`
    pub fn register<F>(mut self, symbol: impl Into<String>, body: F) -> Self
    where
        F: Fn(&CallArgs) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.functions.insert(symbol.into(), Arc::new(body));
        self
    }

    /// Make every load fail with `message`
    pub fn with_load_error(mut self, message: impl Into<String>) -> Self {
        self.load_error = Some(message.into());
        self
    }

    /// A runtime implementing all five functions exactly as `oracle` defines them
    pub fn reference(oracle: DriftOracle) -> Self {
        let oracle = Arc::new(oracle);

        let covariate = Arc::clone(&oracle);
        let concept = Arc::clone(&oracle);
        let classify = Arc::clone(&oracle);
        let impact = Arc::clone(&oracle);
        let action = oracle;

        Self::new()
            .register(FunctionKey::DetectCovariate.symbol(), move |call| {
                let (before, after, qb, qa) = detector_args(call)?;
                let detected = covariate.detect_covariate(&before, &after, qb, qa);
                Ok(json!({"detected": detected, "drift": detected.then_some("covariate")}))
            })
            .register(FunctionKey::DetectConcept.symbol(), move |call| {
                let (before, after, qb, qa) = detector_args(call)?;
                let detected = concept.detect_concept(&before, &after, qb, qa);
                Ok(json!({"detected": detected, "drift": detected.then_some("concept")}))
            })
            .register(FunctionKey::Classify.symbol(), move |call| {
                let shifted = call
                    .bool_arg(0, "input_shifted")
                    .ok_or_else(|| missing("input_shifted"))?;
                let dropped = call
                    .bool_arg(1, "quality_dropped")
                    .ok_or_else(|| missing("quality_dropped"))?;
                Ok(json!({"type": classify.classify(shifted, dropped).as_str()}))
            })
            .register(FunctionKey::Impact.symbol(), move |call| {
                let arg = |index: usize, name: &'static str| {
                    call.float_arg(index, name).ok_or_else(|| missing(name))
                };
                let result = impact.impact(
                    arg(0, "daily_predictions")?,
                    arg(1, "days_in_blind_period")?,
                    arg(2, "error_rate_increase")?,
                    arg(3, "cost_per_error")?,
                );
                Ok(json!({
                    "predictions_affected": result.predictions_affected,
                    "errors": result.errors,
                    "financial_impact": result.financial_impact,
                }))
            })
            .register(FunctionKey::Action.symbol(), move |call| {
                let severity = call.float_arg(1, "severity").ok_or_else(|| missing("severity"))?;
                Ok(json!({"action": action.action(severity).as_str()}))
            })
    }
}

fn detector_args(call: &CallArgs) -> Result<(Vec<f64>, Vec<f64>, f64, f64), String> {
    Ok((
        call.list_arg(0, "input_before").ok_or_else(|| missing("input_before"))?,
        call.list_arg(1, "input_after").ok_or_else(|| missing("input_after"))?,
        call.float_arg(2, "output_quality_before")
            .ok_or_else(|| missing("output_quality_before"))?,
        call.float_arg(3, "output_quality_after")
            .ok_or_else(|| missing("output_quality_after"))?,
    ))
}

#[async_trait]
impl SubmissionRuntime for NativeRuntime {
    fn name(&self) -> &str {
        "native"
    }

    async fn load(&self, _source: &str) -> Result<(), RuntimeFault> {
        match &self.load_error {
            Some(message) => Err(RuntimeFault::Load(message.clone())),
            None => Ok(()),
        }
    }

    async fn invoke(
        &self,
        source: &str,
        symbol: &str,
        calls: &[CallArgs],
    ) -> Result<Invocation, RuntimeFault> {
        self.load(source).await?;
        let Some(body) = self.functions.get(symbol) else {
            return Ok(Invocation::Missing);
        };
        let outcomes = calls
            .iter()
            .map(|call| match (**body)(call) {
                Ok(value) => CallOutcome::Ok(value),
                Err(message) => CallOutcome::Error(message),
            })
            .collect();
        Ok(Invocation::Completed(outcomes))
    }
}
