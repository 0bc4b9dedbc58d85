//! Hidden test vectors
//!
//! Inputs are fixed; expected results come from [`DriftOracle`] so the vectors
//! follow whatever thresholds are configured.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::oracle::{BOUNDARY_EPSILON, DriftOracle};
use super::task::FunctionKey;

/// Arguments for one call of a submitted function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallArgs {
    /// `f(*args)`
    Args(Vec<Value>),
    /// `f(**kwargs)`
    Kwargs(Map<String, Value>),
}

impl CallArgs {
    /// Positional argument `index` as a float
    pub fn float_arg(&self, index: usize, name: &str) -> Option<f64> {
        match self {
            CallArgs::Args(args) => args.get(index).and_then(Value::as_f64),
            CallArgs::Kwargs(kwargs) => kwargs.get(name).and_then(Value::as_f64),
        }
    }

    /// Positional argument `index` as a list of floats
    pub fn list_arg(&self, index: usize, name: &str) -> Option<Vec<f64>> {
        let value = match self {
            CallArgs::Args(args) => args.get(index),
            CallArgs::Kwargs(kwargs) => kwargs.get(name),
        }?;
        value.as_array()?.iter().map(Value::as_f64).collect()
    }

    /// Argument as a bool
    pub fn bool_arg(&self, index: usize, name: &str) -> Option<bool> {
        match self {
            CallArgs::Args(args) => args.get(index).and_then(Value::as_bool),
            CallArgs::Kwargs(kwargs) => kwargs.get(name).and_then(Value::as_bool),
        }
    }

    /// Argument as a string
    pub fn str_arg(&self, index: usize, name: &str) -> Option<&str> {
        match self {
            CallArgs::Args(args) => args.get(index).and_then(Value::as_str),
            CallArgs::Kwargs(kwargs) => kwargs.get(name).and_then(Value::as_str),
        }
    }
}

/// Letter case a label is normalized to before comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelCase {
    Lower,
    Upper,
}

/// Condition a returned value must satisfy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Check {
    /// `result[key]` equals a boolean
    Flag { key: String, expected: bool },
    /// `result[key]` (or the whole result) renders to a label
    Label {
        key: String,
        expected: String,
        case: LabelCase,
    },
    /// Each `result[key]` lies within a relative tolerance of its target
    Approx {
        targets: Vec<(String, f64)>,
        tolerance: f64,
    },
}

impl Check {
    /// Whether `value` satisfies the check
    pub fn holds(&self, value: &Value) -> bool {
        match self {
            Check::Flag { key, expected } => match value.get(key) {
                Some(Value::Bool(b)) => b == expected,
                Some(Value::Number(n)) => n.as_f64() == Some(if *expected { 1.0 } else { 0.0 }),
                _ => false,
            },
            Check::Label {
                key,
                expected,
                case,
            } => {
                let raw = value.get(key).unwrap_or(value);
                let rendered = python_str(raw);
                let normalized = match case {
                    LabelCase::Lower => rendered.to_lowercase(),
                    LabelCase::Upper => rendered.to_uppercase(),
                };
                normalized == *expected
            }
            Check::Approx { targets, tolerance } => targets.iter().all(|(key, target)| {
                value
                    .get(key)
                    .and_then(Value::as_f64)
                    .is_some_and(|actual| within_tolerance(actual, *target, *tolerance))
            }),
        }
    }

    /// Human-readable expectation
    pub fn describe(&self) -> String {
        match self {
            Check::Flag { key, expected } => format!("{} == {}", key, expected),
            Check::Label { key, expected, .. } => format!("{} == {}", key, expected),
            Check::Approx { targets, tolerance } => {
                let parts: Vec<String> = targets
                    .iter()
                    .map(|(key, target)| format!("{} ≈ {}", key, target))
                    .collect();
                format!("{} (±{}%)", parts.join(", "), tolerance * 100.0)
            }
        }
    }
}

fn within_tolerance(actual: f64, target: f64, tolerance: f64) -> bool {
    (actual - target).abs() <= tolerance * target.abs() + BOUNDARY_EPSILON
}

/// Render a JSON value the way Python's `str()` renders the equivalent object
fn python_str(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}

/// One hidden test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestVector {
    /// Short description of what the case exercises
    pub tag: String,
    pub call: CallArgs,
    pub check: Check,
}

impl TestVector {
    fn new(tag: &str, call: CallArgs, check: Check) -> Self {
        Self {
            tag: tag.to_string(),
            call,
            check,
        }
    }
}

/// Every function's vectors, in grading order
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSet {
    by_function: BTreeMap<FunctionKey, Vec<TestVector>>,
}

type DetectorRow = (&'static str, Vec<f64>, Vec<f64>, f64, f64);

fn flat(value: f64) -> Vec<f64> {
    vec![value; 5]
}

fn kwargs(pairs: &[(&str, Value)]) -> CallArgs {
    CallArgs::Kwargs(pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
}

impl VectorSet {
    /// Build the vectors, computing expectations from `oracle`
    pub fn build(oracle: &DriftOracle, impact_tolerance: f64) -> Self {
        let mut by_function = BTreeMap::new();
        by_function.insert(FunctionKey::DetectCovariate, covariate_vectors(oracle));
        by_function.insert(FunctionKey::DetectConcept, concept_vectors(oracle));
        by_function.insert(FunctionKey::Classify, classify_vectors(oracle));
        by_function.insert(FunctionKey::Impact, impact_vectors(oracle, impact_tolerance));
        by_function.insert(FunctionKey::Action, action_vectors(oracle));
        Self { by_function }
    }

    /// Vectors for one function
    pub fn for_function(&self, key: FunctionKey) -> &[TestVector] {
        self.by_function.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Total vector count
    pub fn total(&self) -> usize {
        self.by_function.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FunctionKey, &[TestVector])> {
        self.by_function.iter().map(|(k, v)| (*k, v.as_slice()))
    }
}

impl Default for VectorSet {
    fn default() -> Self {
        Self::build(&DriftOracle::default(), 0.02)
    }
}

fn detector_call(before: &[f64], after: &[f64], q_before: f64, q_after: f64) -> CallArgs {
    CallArgs::Args(vec![json!(before), json!(after), json!(q_before), json!(q_after)])
}

fn covariate_vectors(oracle: &DriftOracle) -> Vec<TestVector> {
    let rows: Vec<DetectorRow> = vec![
        ("strong shift, stable quality", flat(100.0), flat(140.0), 0.9, 0.89),
        ("small shift with quality drop", flat(100.0), flat(115.0), 0.9, 0.84),
        ("no change", flat(100.0), flat(100.0), 0.9, 0.9),
        ("shift exactly at threshold", flat(100.0), flat(120.0), 0.9, 0.89),
        ("quality improved beyond band", flat(100.0), flat(125.0), 0.8, 0.85),
        ("downward shift", flat(200.0), flat(150.0), 0.9, 0.91),
        ("shift with quality drop", flat(100.0), flat(130.0), 0.9, 0.83),
    ];
    rows.into_iter()
        .map(|(tag, b, a, qb, qa)| {
            let expected = oracle.detect_covariate(&b, &a, qb, qa);
            TestVector::new(
                tag,
                detector_call(&b, &a, qb, qa),
                Check::Flag {
                    key: "detected".to_string(),
                    expected,
                },
            )
        })
        .collect()
}

fn concept_vectors(oracle: &DriftOracle) -> Vec<TestVector> {
    let rows: Vec<DetectorRow> = vec![
        ("strong quality drop", flat(100.0), flat(100.0), 0.9, 0.74),
        ("drop under threshold", flat(100.0), flat(100.0), 0.9, 0.83),
        ("input drifted", flat(100.0), flat(105.0), 0.9, 0.8),
        ("quality improved", flat(100.0), flat(100.0), 0.7, 0.9),
        ("drop exactly at threshold", flat(100.0), flat(100.0), 0.9, 0.81),
        (
            "noisy stable input",
            vec![100.0, 101.0, 99.0, 100.0, 102.0],
            vec![100.0, 100.0, 101.0, 99.0, 100.0],
            0.8,
            0.82,
        ),
        ("catastrophic drop", flat(100.0), flat(100.0), 0.9, 0.45),
        ("micro drop", flat(100.0), flat(100.0), 0.8, 0.79),
    ];
    rows.into_iter()
        .map(|(tag, b, a, qb, qa)| {
            let expected = oracle.detect_concept(&b, &a, qb, qa);
            TestVector::new(
                tag,
                detector_call(&b, &a, qb, qa),
                Check::Flag {
                    key: "detected".to_string(),
                    expected,
                },
            )
        })
        .collect()
}

fn classify_vectors(oracle: &DriftOracle) -> Vec<TestVector> {
    let rows = [
        ("input only", true, false),
        ("quality only", false, true),
        ("both flags", true, true),
        ("neither flag", false, false),
        ("both flags again", true, true),
        ("quality only again", false, true),
        ("input only again", true, false),
    ];
    rows.into_iter()
        .map(|(tag, shifted, dropped)| {
            TestVector::new(
                tag,
                kwargs(&[
                    ("input_shifted", json!(shifted)),
                    ("quality_dropped", json!(dropped)),
                ]),
                Check::Label {
                    key: "type".to_string(),
                    expected: oracle.classify(shifted, dropped).as_str().to_string(),
                    case: LabelCase::Lower,
                },
            )
        })
        .collect()
}

fn impact_vectors(oracle: &DriftOracle, tolerance: f64) -> Vec<TestVector> {
    let rows: [(&str, Value, Value, f64, f64); 4] = [
        ("baseline", json!(10000), json!(5), 0.02, 50.0),
        ("small rate precision", json!(10000), json!(7), 0.0001, 50.0),
        ("fractional days", json!(10000), json!(2.5), 0.01, 100.0),
        ("large scale", json!(50000), json!(1), 0.05, 200.0),
    ];
    rows.into_iter()
        .enumerate()
        .map(|(index, (tag, daily, days, rate, cost))| {
            let impact = oracle.impact(
                daily.as_f64().unwrap_or_default(),
                days.as_f64().unwrap_or_default(),
                rate,
                cost,
            );
            let mut targets = vec![("financial_impact".to_string(), impact.financial_impact)];
            if index == 0 {
                targets.insert(0, ("predictions_affected".to_string(), impact.predictions_affected));
                targets.insert(1, ("errors".to_string(), impact.errors));
            }
            TestVector::new(
                tag,
                CallArgs::Args(vec![daily, days, json!(rate), json!(cost)]),
                Check::Approx { targets, tolerance },
            )
        })
        .collect()
}

fn action_vectors(oracle: &DriftOracle) -> Vec<TestVector> {
    let rows = [
        ("low severity", "covariate", 0.05),
        ("investigate band", "concept", 0.35),
        ("retrain band", "both", 0.6),
        ("escalate band", "concept", 0.92),
        ("investigate upper bound", "unknown", 0.5),
        ("just under retrain bound", "covariate", 0.89),
        ("just over monitor bound", "concept", 0.31),
        ("retrain upper bound", "both", 0.9),
        ("monitor upper bound", "unknown", 0.3),
    ];
    rows.into_iter()
        .map(|(tag, drift_type, severity)| {
            TestVector::new(
                tag,
                kwargs(&[("drift_type", json!(drift_type)), ("severity", json!(severity))]),
                Check::Label {
                    key: "action".to_string(),
                    expected: oracle.action(severity).as_str().to_string(),
                    case: LabelCase::Upper,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected_flags(set: &VectorSet, key: FunctionKey) -> Vec<bool> {
        set.for_function(key)
            .iter()
            .map(|v| match &v.check {
                Check::Flag { expected, .. } => *expected,
                other => panic!("unexpected check {:?}", other),
            })
            .collect()
    }

    fn expected_labels(set: &VectorSet, key: FunctionKey) -> Vec<String> {
        set.for_function(key)
            .iter()
            .map(|v| match &v.check {
                Check::Label { expected, .. } => expected.clone(),
                other => panic!("unexpected check {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_vector_counts() {
        let set = VectorSet::default();
        assert_eq!(set.for_function(FunctionKey::DetectCovariate).len(), 7);
        assert_eq!(set.for_function(FunctionKey::DetectConcept).len(), 8);
        assert_eq!(set.for_function(FunctionKey::Classify).len(), 7);
        assert_eq!(set.for_function(FunctionKey::Impact).len(), 4);
        assert_eq!(set.for_function(FunctionKey::Action).len(), 9);
        assert_eq!(set.total(), 35);
    }

    #[test]
    fn test_default_expectations() {
        let set = VectorSet::default();
        assert_eq!(
            expected_flags(&set, FunctionKey::DetectCovariate),
            vec![true, false, false, true, false, true, false]
        );
        assert_eq!(
            expected_flags(&set, FunctionKey::DetectConcept),
            vec![true, false, false, false, true, false, true, false]
        );
        assert_eq!(
            expected_labels(&set, FunctionKey::Classify),
            vec!["covariate", "concept", "both", "none", "both", "concept", "covariate"]
        );
        assert_eq!(
            expected_labels(&set, FunctionKey::Action),
            vec![
                "MONITOR",
                "INVESTIGATE",
                "RETRAIN",
                "ESCALATE",
                "INVESTIGATE",
                "RETRAIN",
                "INVESTIGATE",
                "RETRAIN",
                "MONITOR"
            ]
        );
    }

    #[test]
    fn test_impact_targets() {
        let set = VectorSet::default();
        let impact = set.for_function(FunctionKey::Impact);
        match &impact[0].check {
            Check::Approx { targets, tolerance } => {
                assert_eq!(targets.len(), 3);
                assert_eq!(*tolerance, 0.02);
                assert!((targets[0].1 - 50000.0).abs() < 1e-6);
                assert!((targets[1].1 - 1000.0).abs() < 1e-6);
                assert!((targets[2].1 - 50000.0).abs() < 1e-6);
            }
            other => panic!("unexpected check {:?}", other),
        }
        match &impact[1].check {
            Check::Approx { targets, .. } => assert!((targets[0].1 - 350.0).abs() < 1e-6),
            other => panic!("unexpected check {:?}", other),
        }
    }

    #[test]
    fn test_label_check_reads_key_or_whole_value() {
        let check = Check::Label {
            key: "type".to_string(),
            expected: "covariate".to_string(),
            case: LabelCase::Lower,
        };
        assert!(check.holds(&json!({"type": "Covariate"})));
        assert!(check.holds(&json!("COVARIATE")));
        assert!(!check.holds(&json!({"type": "concept"})));
        assert!(!check.holds(&json!(null)));
    }

    #[test]
    fn test_flag_check() {
        let check = Check::Flag {
            key: "detected".to_string(),
            expected: true,
        };
        assert!(check.holds(&json!({"detected": true, "drift": "covariate"})));
        assert!(check.holds(&json!({"detected": 1})));
        assert!(!check.holds(&json!({"detected": "yes"})));
        assert!(!check.holds(&json!({})));
    }

    #[test]
    fn test_approx_check_tolerance() {
        let check = Check::Approx {
            targets: vec![("financial_impact".to_string(), 50000.0)],
            tolerance: 0.02,
        };
        assert!(check.holds(&json!({"financial_impact": 51000.0})));
        assert!(check.holds(&json!({"financial_impact": 49000})));
        assert!(!check.holds(&json!({"financial_impact": 51001.0})));
        assert!(!check.holds(&json!({"financial_impact": "50000"})));
        assert!(!check.holds(&json!({})));
    }

    #[test]
    fn test_call_args_wire_shape() {
        let args = CallArgs::Args(vec![json!(1)]);
        assert_eq!(serde_json::to_value(&args).unwrap(), json!({"args": [1]}));
        let kw = kwargs(&[("severity", json!(0.5))]);
        assert_eq!(serde_json::to_value(&kw).unwrap(), json!({"kwargs": {"severity": 0.5}}));
    }
}
