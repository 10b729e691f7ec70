use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use anyhow::Result;

use crate::output::config::OutputConfig;
use crate::output::Emitter;
use crate::output::types::Envelope;

/// Destination for plan/result envelopes. Stdout by default; tests swap in a capturing sink.
pub trait OutputSink: Send + Sync {
    fn on_plan(&self, env: &Envelope) -> Result<()>;
    fn on_result(&self, env: &Envelope) -> Result<()>;
}

#[derive(Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn on_plan(&self, env: &Envelope) -> Result<()> { emit_to_stdout(env) }
    fn on_result(&self, env: &Envelope) -> Result<()> { emit_to_stdout(env) }
}

fn emit_to_stdout(env: &Envelope) -> Result<()> {
    let cfg = OutputConfig::resolve(super::config::json_mode());
    let emitter = Emitter::new(cfg);
    emitter.emit(env).map_err(anyhow::Error::from)
}

type DynSink = Arc<dyn OutputSink>;

fn sink_slot() -> &'static Mutex<DynSink> {
    static SINK: OnceLock<Mutex<DynSink>> = OnceLock::new();
    SINK.get_or_init(|| Mutex::new(Arc::new(StdoutSink) as DynSink))
}

// a panic while swapping sinks leaves a valid Arc behind, so poisoning is ignored
fn lock_slot() -> MutexGuard<'static, DynSink> {
    sink_slot().lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn current_sink() -> DynSink {
    lock_slot().clone()
}

pub struct SinkGuard {
    previous: DynSink,
}

/// Route envelopes to `new_sink` until the guard drops.
pub fn install_sink(new_sink: DynSink) -> SinkGuard {
    let mut guard = lock_slot();
    let previous = std::mem::replace(&mut *guard, new_sink);
    SinkGuard { previous }
}

impl Drop for SinkGuard {
    fn drop(&mut self) {
        *lock_slot() = self.previous.clone();
    }
}
