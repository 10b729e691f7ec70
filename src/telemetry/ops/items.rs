use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Items;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Window, Lookup }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self { Phase::Window => "window", Phase::Lookup => "lookup" } }
    fn span(&self) -> Span { match self { Phase::Window => info_span!("window"), Phase::Lookup => info_span!("lookup") } }
}

impl OpMarker for Items {
    const NAME: &'static str = "items";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("items") }
}
