use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Status;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Summary, Source }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self { Phase::Summary => "summary", Phase::Source => "source" } }
    fn span(&self) -> Span { match self { Phase::Summary => info_span!("summary"), Phase::Source => info_span!("source") } }
}

impl OpMarker for Status {
    const NAME: &'static str = "status";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("status") }
}
