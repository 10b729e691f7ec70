use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Init;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Migrate, Sources }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self { Phase::Migrate => "migrate", Phase::Sources => "sources" } }
    fn span(&self) -> Span { match self { Phase::Migrate => info_span!("migrate"), Phase::Sources => info_span!("sources") } }
}

impl OpMarker for Init {
    const NAME: &'static str = "init";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("init") }
}
