use thiserror::Error;

/// Failure of a single adapter invocation. Recorded on the run, never propagated past the orchestrator.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("parse failed: {0}")]
    Parse(String),
}

impl AdapterError {
    pub fn kind(&self) -> &'static str {
        match self {
            AdapterError::Fetch(_) => "fetch",
            AdapterError::Parse(_) => "parse",
        }
    }
}

impl From<reqwest::Error> for AdapterError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AdapterError::Fetch(format!("timed out: {e}"))
        } else {
            AdapterError::Fetch(e.to_string())
        }
    }
}

/// Persistence unavailable or inconsistent. Fatal for the current invocation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("corrupt row {key}: {detail}")]
    Corrupt { key: String, detail: String },
}

/// Invalid or missing source definitions. Raised before any collection starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("source #{index} has an empty id")]
    EmptyId { index: usize },
    #[error("duplicate source id `{0}`")]
    DuplicateId(String),
    #[error("source `{id}` has an invalid url `{url}`")]
    InvalidUrl { id: String, url: String },
    #[error("unknown source `{0}`")]
    UnknownSource(String),
    #[error("invalid setting {key}={value}")]
    InvalidSetting { key: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum CollectError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("source `{0}` is neither configured nor in the run history")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
