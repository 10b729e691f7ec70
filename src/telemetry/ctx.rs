use anyhow::Result;
use serde::Serialize;
use std::marker::PhantomData;
use tracing::{info, debug, warn, Span};

use super::sink;
use crate::output::types::{Envelope, Meta};

pub trait PhaseSpan {
    fn name(&self) -> &'static str;
    fn span(&self) -> Span;
}

pub trait OpMarker {
    const NAME: &'static str;
    type Phase: PhaseSpan;
    fn root_span() -> Span;
}

/// Per-op logging context. Text logs stay human-friendly; JSON logs carry `op` and flattened details.
pub struct LogCtx<O: OpMarker> {
    pub(crate) json: bool,
    pub(crate) _marker: PhantomData<O>,
}

impl<O: OpMarker> LogCtx<O> {
    fn op_name(&self) -> &'static str { O::NAME }

    pub fn root_span(&self) -> Span { O::root_span() }

    pub fn root_span_kv<'a, T>(&self, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.root_span();
        let details = kv_to_string(fields);
        if details.is_empty() {
            info!(op = %self.op_name(), "start");
        } else {
            info!(op = %self.op_name(), details = %details, "start");
        }
        span
    }

    pub fn span(&self, ph: &O::Phase) -> Span { ph.span() }

    pub fn span_kv<'a, T>(&self, ph: &O::Phase, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.span(ph);
        let details = kv_to_string(fields);
        if self.json {
            info!(op = %self.op_name(), phase = ph.name(), details = %details, "span_start");
        } else {
            debug!(phase = ph.name(), "{}", details);
        }
        span
    }

    pub fn info(&self, msg: impl AsRef<str>) { if self.json { info!(op = %self.op_name(), "{}", msg.as_ref()); } else { info!("{}", msg.as_ref()); } }
    pub fn debug(&self, msg: impl AsRef<str>) { if self.json { debug!(op = %self.op_name(), "{}", msg.as_ref()); } else { debug!("{}", msg.as_ref()); } }

    pub fn warn_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        let details = kv_to_string(kv);
        if self.json { warn!(op = %self.op_name(), details = %details, "{}", msg); }
        else { warn!("{} {}", msg, details); }
    }

    pub fn plan<T: Serialize>(&self, plan: &T) -> Result<()> {
        let env = Envelope::plan(self.op_name(), plan, None)?;
        sink::current_sink().on_plan(&env)
    }

    pub fn result<T: Serialize>(&self, result: &T) -> Result<()> { self.result_with_meta(result, None) }

    pub fn result_with_meta<T: Serialize>(&self, result: &T, meta: Option<Meta>) -> Result<()> {
        let env = Envelope::result(self.op_name(), result, meta)?;
        sink::current_sink().on_result(&env)
    }
}

impl LogCtx<crate::telemetry::ops::collect::Collect> {
    pub fn source_summary(&self, run: &crate::store::RunRecord) {
        let (id, outcome) = (run.source_id.as_str(), run.outcome.as_str());
        let (fetched, new, updated, duplicate) = (run.items_fetched, run.items_new, run.items_updated, run.items_duplicate);
        let (stale, rejected, ms) = (run.items_stale, run.items_rejected, run.duration_ms);
        if self.json {
            info!(op = %self.op_name(), source_id = id, outcome, fetched, new, updated, duplicate, stale, rejected, duration_ms = ms, "source_summary");
        } else {
            let mark = match run.outcome {
                crate::store::RunOutcome::Success => "✅",
                crate::store::RunOutcome::Partial => "⚠️",
                crate::store::RunOutcome::Failure => "❌",
            };
            info!("{} {} {} — fetched={} new={} updated={} duplicate={} stale={} rejected={} ({} ms)", mark, id, outcome, fetched, new, updated, duplicate, stale, rejected, ms);
        }
        if let Some(detail) = &run.error_detail {
            if self.json { warn!(op = %self.op_name(), source_id = id, error = %detail, "source_error"); }
            else { warn!("   {} error: {}", id, detail); }
        }
    }

    pub fn totals(&self, sources: usize, new: i64, duplicate: i64, failed: usize) {
        if self.json { info!(op = %self.op_name(), sources, new, duplicate, failed, "collect_totals"); }
        else { info!("📊 Collect totals — sources={} new={} duplicate={} failed={}", sources, new, duplicate, failed); }
    }
}

fn kv_to_string<'a, T>(kv: T) -> String
where
    T: IntoIterator<Item = (&'a str, String)>,
{
    let mut parts: Vec<String> = Vec::new();
    for (k, v) in kv { parts.push(format!("{}={}", k, v)); }
    parts.join(" ")
}
