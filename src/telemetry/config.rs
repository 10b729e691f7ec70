use std::sync::OnceLock;

static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Set once from `--json`; later calls are ignored.
pub fn set_json_mode(v: bool) {
    let _ = JSON_MODE.set(v);
}

pub fn json_mode() -> bool {
    scoped_json_mode().unwrap_or_else(|| JSON_MODE.get().copied().unwrap_or(false))
}

#[cfg(not(test))]
fn scoped_json_mode() -> Option<bool> { None }

#[cfg(test)]
thread_local! {
    static SCOPED_JSON: std::cell::Cell<Option<bool>> = const { std::cell::Cell::new(None) };
}

#[cfg(test)]
fn scoped_json_mode() -> Option<bool> { SCOPED_JSON.with(|c| c.get()) }

/// Turn JSON mode on for the current thread until the guard drops.
#[cfg(test)]
pub(crate) fn scoped_json() -> ScopedJson {
    SCOPED_JSON.with(|c| c.set(Some(true)));
    ScopedJson
}

#[cfg(test)]
pub(crate) struct ScopedJson;

#[cfg(test)]
impl Drop for ScopedJson {
    fn drop(&mut self) { SCOPED_JSON.with(|c| c.set(None)); }
}

pub fn logs_are_json() -> bool {
    matches!(std::env::var("BRIEF_LOG_FORMAT").as_deref(), Ok("json"))
}

/// Initialize tracing/logging according to RUST_LOG and BRIEF_LOG_FORMAT.
/// - Defaults to `info` if `RUST_LOG` is unset
/// - Supports `BRIEF_LOG_FORMAT=json` for JSON logs
/// Logs always go to stderr so stdout stays reserved for envelopes.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let builder = tracing_subscriber::registry().with(filter);

    if logs_are_json() {
        let _ = builder.with(fmt_layer.json().flatten_event(true)).try_init();
    } else {
        let _ = builder.with(fmt_layer.compact()).try_init();
    }
}
