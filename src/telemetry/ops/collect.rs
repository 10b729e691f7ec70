use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Collect;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Plan, Source, Fetch, Store, Record }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Plan => "plan",
        Phase::Source => "source",
        Phase::Fetch => "fetch",
        Phase::Store => "store",
        Phase::Record => "record",
    }}
    fn span(&self) -> Span { match self {
        Phase::Plan => info_span!("plan"),
        Phase::Source => info_span!("source"),
        Phase::Fetch => info_span!("fetch"),
        Phase::Store => info_span!("store"),
        Phase::Record => info_span!("record"),
    }}
}

impl OpMarker for Collect {
    const NAME: &'static str = "collect";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("collect") }
}
