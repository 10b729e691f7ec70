use serde::{Deserialize, Serialize};

/// Adapter family for a source. Selects the adapter at collection time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Rss,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Rss => "rss",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SourceType,
    pub url: String,
    pub category: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool { true }

#[derive(Debug, Deserialize)]
pub(crate) struct SourcesFile {
    pub sources: Vec<SourceConfig>,
}

// Listing envelope
#[derive(Serialize)]
pub struct SourceRow {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub category: String,
    pub url: String,
    pub enabled: bool,
    pub items_stored: i64,
}

#[derive(Serialize)]
pub struct SourceList { pub sources: Vec<SourceRow> }
