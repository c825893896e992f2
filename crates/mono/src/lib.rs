mod diagnostics;
mod lexer;
mod runtime;
mod surface;
mod typecheck;

use serde::Serialize;

pub use diagnostics::{
    render_diagnostic, render_diagnostics, Diagnostic, DiagnosticLabel, Position, Span,
    SyntaxError,
};
pub use lexer::{lex, Token, TokenKind};
pub use runtime::{format_value, run_program, RuntimeError, Value};
pub use surface::{expr_span, parse_expression, Expr};
pub use typecheck::{
    infer_with_trace, Context, InferOutcome, TraceRecord, TraceRecorder, TraceStep, Type,
    TypeError, TypeVarId, Typechecker,
};

#[derive(Debug)]
pub enum MonoError {
    Io(std::io::Error),
    Syntax(SyntaxError),
    Type(TypeError),
    Runtime(RuntimeError),
    InvalidCommand(String),
    Diagnostics,
}

impl std::fmt::Display for MonoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonoError::Io(err) => write!(f, "IO error: {err}"),
            MonoError::Syntax(err) => write!(f, "{err}"),
            MonoError::Type(err) => write!(f, "type error: {err}"),
            MonoError::Runtime(err) => write!(f, "runtime error: {err}"),
            MonoError::InvalidCommand(command) => write!(f, "invalid command: {command}"),
            MonoError::Diagnostics => write!(f, "errors reported"),
        }
    }
}

impl std::error::Error for MonoError {}

impl From<std::io::Error> for MonoError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// Result of the full pipeline for one source string: the resolved type and
/// final value of the whole program, plus the ordered inference trace.
#[derive(Debug, Serialize)]
pub struct CompileOutput {
    #[serde(rename = "type")]
    pub ty: String,
    pub value: String,
    pub steps: Vec<TraceStep>,
}

/// Parse and infer only; no evaluation.
pub fn check_source(source: &str) -> Result<InferOutcome, MonoError> {
    let expr = parse_expression(source).map_err(MonoError::Syntax)?;
    infer_with_trace(&expr).map_err(MonoError::Type)
}

/// Full pipeline: parse, infer, resolve the trace, evaluate. Each call is a
/// self-contained run with its own checker and recorder; concurrent callers
/// share nothing. Any stage failure aborts with no partial trace.
pub fn compile(source: &str) -> Result<CompileOutput, MonoError> {
    let expr = parse_expression(source).map_err(MonoError::Syntax)?;
    let outcome = infer_with_trace(&expr).map_err(MonoError::Type)?;
    let value = run_program(&expr).map_err(MonoError::Runtime)?;
    Ok(CompileOutput {
        ty: outcome.ty.to_string(),
        value: format_value(&value),
        steps: outcome.steps,
    })
}
