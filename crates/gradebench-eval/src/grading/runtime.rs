//! Runtimes that execute submitted source for grading

use async_trait::async_trait;
use gradebench_core::{HarnessError, PythonInterpreter};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::tasks::CallArgs;

/// Result of one call into a submitted function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    /// The function returned a value
    Ok(Value),
    /// The function raised
    Error(String),
}

/// Result of resolving and calling one symbol
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// The symbol is absent or not callable
    Missing,
    /// One outcome per call, in order
    Completed(Vec<CallOutcome>),
}

/// Failure of the runtime itself rather than of a call
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RuntimeFault {
    /// The source failed to load
    #[error("{0}")]
    Load(String),
    /// The runtime could not run at all
    #[error("runtime unavailable: {0}")]
    Unavailable(String),
}

impl From<HarnessError> for RuntimeFault {
    fn from(err: HarnessError) -> Self {
        RuntimeFault::Unavailable(err.to_string())
    }
}

/// Executes submitted source. Each `invoke` runs in a fresh scope.
#[async_trait]
pub trait SubmissionRuntime: Send + Sync {
    /// Runtime name for logs
    fn name(&self) -> &str;

    /// Load the source once, surfacing syntax or top-level errors
    async fn load(&self, source: &str) -> Result<(), RuntimeFault>;

    /// Load the source in a fresh scope, resolve `symbol`, and run every call
    async fn invoke(
        &self,
        source: &str,
        symbol: &str,
        calls: &[CallArgs],
    ) -> Result<Invocation, RuntimeFault>;
}

pub(crate) const GRADING_DRIVER: &str = r#"
import contextlib, io, json, math, sys

def _plain(v):
    if v is not None and not isinstance(v, (bool, int, float, str, list, tuple, dict)) and callable(getattr(v, "item", None)):
        try:
            v = v.item()
        except Exception:
            return str(v)
    if v is None or isinstance(v, (bool, str, int)):
        return v
    if isinstance(v, float):
        return v if math.isfinite(v) else str(v)
    if isinstance(v, dict):
        return {str(k): _plain(x) for k, x in v.items()}
    if isinstance(v, (list, tuple)):
        return [_plain(x) for x in v]
    return str(v)

def _emit(payload):
    sys.__stdout__.write(json.dumps(payload))
    sys.__stdout__.flush()

req = json.loads(sys.stdin.read())
ns = {"__name__": "submission"}
try:
    with contextlib.redirect_stdout(io.StringIO()):
        exec(compile(req["source"], "<submission>", "exec"), ns)
    loaded = True
except BaseException as e:
    loaded = False
    _emit({"status": "load_error", "message": f"{type(e).__name__}: {e}"})

if loaded:
    symbol = req.get("symbol")
    fn = ns.get(symbol) if symbol else None
    if symbol is None:
        _emit({"status": "ok", "outcomes": []})
    elif not callable(fn):
        _emit({"status": "missing"})
    else:
        outcomes = []
        for call in req["calls"]:
            try:
                with contextlib.redirect_stdout(io.StringIO()):
                    if "kwargs" in call:
                        r = fn(**call["kwargs"])
                    else:
                        r = fn(*call["args"])
                outcomes.append({"ok": _plain(r)})
            except BaseException as e:
                outcomes.append({"error": f"{type(e).__name__}: {e}"})
        _emit({"status": "ok", "outcomes": outcomes})
"#;

#[derive(Serialize)]
struct DriverRequest<'a> {
    source: &'a str,
    symbol: Option<&'a str>,
    calls: &'a [CallArgs],
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum DriverReply {
    Ok { outcomes: Vec<CallOutcome> },
    Missing,
    LoadError { message: String },
}

/// Grades by running the driver in a fresh Python process per request
#[derive(Debug, Clone, Default)]
pub struct PythonRuntime {
    interpreter: PythonInterpreter,
}

impl PythonRuntime {
    pub fn new(interpreter: PythonInterpreter) -> Self {
        Self { interpreter }
    }

    async fn request(
        &self,
        source: &str,
        symbol: Option<&str>,
        calls: &[CallArgs],
    ) -> Result<DriverReply, RuntimeFault> {
        let input = serde_json::to_string(&DriverRequest {
            source,
            symbol,
            calls,
        })
        .map_err(|e| RuntimeFault::Unavailable(e.to_string()))?;

        let stdout = self.interpreter.run_driver(GRADING_DRIVER, &input).await?;
        serde_json::from_str(stdout.trim()).map_err(|e| {
            RuntimeFault::Unavailable(format!("unreadable driver output: {}", e))
        })
    }
}

#[async_trait]
impl SubmissionRuntime for PythonRuntime {
    fn name(&self) -> &str {
        "python"
    }

    async fn load(&self, source: &str) -> Result<(), RuntimeFault> {
        match self.request(source, None, &[]).await? {
            DriverReply::LoadError { message } => Err(RuntimeFault::Load(message)),
            DriverReply::Ok { .. } | DriverReply::Missing => Ok(()),
        }
    }

    async fn invoke(
        &self,
        source: &str,
        symbol: &str,
        calls: &[CallArgs],
    ) -> Result<Invocation, RuntimeFault> {
        match self.request(source, Some(symbol), calls).await? {
            DriverReply::Ok { outcomes } => Ok(Invocation::Completed(outcomes)),
            DriverReply::Missing => Ok(Invocation::Missing),
            DriverReply::LoadError { message } => Err(RuntimeFault::Load(message)),
        }
    }
}
