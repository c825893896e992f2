use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    /// Sentinel span for nodes without real source positions.
    pub fn unknown() -> Self {
        Self {
            start: Position { line: 0, column: 0 },
            end: Position { line: 0, column: 0 },
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.start.line == 0 && self.start.column == 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticLabel {
    pub message: String,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    pub span: Span,
    pub labels: Vec<DiagnosticLabel>,
}

/// A lexing or parsing failure. Carries the offending span so callers can
/// render it as a diagnostic.
#[derive(Debug, Clone)]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
}

impl SyntaxError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            code: "E1000".to_string(),
            message: self.message.clone(),
            span: self.span.clone(),
            labels: Vec::new(),
        }
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "syntax error: {} at {}:{}",
            self.message, self.span.start.line, self.span.start.column
        )
    }
}

pub fn render_diagnostics(path: &str, diagnostics: &[Diagnostic]) -> String {
    let mut output = String::new();
    for (index, diagnostic) in diagnostics.iter().enumerate() {
        if index > 0 {
            output.push('\n');
        }
        output.push_str(&render_diagnostic(path, diagnostic));
    }
    output
}

pub fn render_diagnostic(path: &str, diagnostic: &Diagnostic) -> String {
    let mut output = String::new();
    let start = &diagnostic.span.start;
    if diagnostic.span.is_unknown() {
        output.push_str(&format!(
            "error[{}] {}:?:? {}\n",
            diagnostic.code, path, diagnostic.message
        ));
    } else {
        output.push_str(&format!(
            "error[{}] {}:{}:{} {}\n",
            diagnostic.code, path, start.line, start.column, diagnostic.message
        ));
    }
    for label in &diagnostic.labels {
        let pos = &label.span.start;
        output.push_str(&format!(
            "  note: {} at {}:{}:{}\n",
            label.message, path, pos.line, pos.column
        ));
    }
    output.trim_end().to_string()
}
