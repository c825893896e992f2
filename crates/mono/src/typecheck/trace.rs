use std::collections::BTreeMap;

use serde::Serialize;

use crate::diagnostics::Span;
use crate::surface::{expr_span, Expr};

use super::types::{Context, Type};

/// One logged type assignment: the context and expression at the moment of
/// inference, the type produced locally (possibly still containing type
/// variables until the resolution pass), and the assignment order.
#[derive(Debug, Clone)]
pub struct TraceRecord {
    pub seq: usize,
    pub context: Context,
    pub expr: Expr,
    pub ty: Type,
}

/// Append-only log of trace records, keyed by strictly increasing sequence
/// numbers. Created fresh per inference run.
#[derive(Debug, Default)]
pub struct TraceRecorder {
    next_seq: usize,
    records: Vec<TraceRecord>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, context: &Context, expr: &Expr, ty: &Type) -> usize {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.records.push(TraceRecord {
            seq,
            context: context.clone(),
            expr: expr.clone(),
            ty: ty.clone(),
        });
        seq
    }

    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    pub(super) fn take_records(&mut self) -> Vec<TraceRecord> {
        std::mem::take(&mut self.records)
    }

    pub(super) fn put_records(&mut self, records: Vec<TraceRecord>) {
        self.records = records;
    }

    /// Serializable view of the trace, with types and expressions rendered
    /// in their display forms.
    pub fn steps(&self) -> Vec<TraceStep> {
        self.records
            .iter()
            .map(|record| TraceStep {
                seq: record.seq,
                expr: record.expr.to_string(),
                span: expr_span(&record.expr),
                ty: record.ty.to_string(),
                context: record
                    .context
                    .iter()
                    .map(|(name, ty)| (name.clone(), ty.to_string()))
                    .collect(),
            })
            .collect()
    }
}

/// One entry of the externally visible trace.
#[derive(Debug, Clone, Serialize)]
pub struct TraceStep {
    pub seq: usize,
    pub expr: String,
    pub span: Span,
    #[serde(rename = "type")]
    pub ty: String,
    pub context: BTreeMap<String, String>,
}
