use std::env;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl OutputConfig {
    /// `--json` picks the default format; BRIEF_OUTPUT_FORMAT overrides it.
    pub fn resolve(json_flag: bool) -> Self {
        Self::from_values(env::var("BRIEF_OUTPUT_FORMAT").ok().as_deref(), env::var("BRIEF_OUTPUT_PRETTY").ok().as_deref(), json_flag)
    }

    fn from_values(format: Option<&str>, pretty: Option<&str>, json_flag: bool) -> Self {
        let format = match format {
            Some("json") => OutputFormat::Json,
            Some("text") => OutputFormat::Text,
            _ if json_flag => OutputFormat::Json,
            _ => OutputFormat::Text,
        };
        let pretty = matches!(pretty, Some(v) if v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"));
        OutputConfig { format, pretty }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_sets_default_and_env_overrides() {
        assert_eq!(OutputConfig::from_values(None, None, true).format, OutputFormat::Json);
        assert_eq!(OutputConfig::from_values(None, None, false).format, OutputFormat::Text);
        assert_eq!(OutputConfig::from_values(Some("text"), None, true).format, OutputFormat::Text);
        assert_eq!(OutputConfig::from_values(Some("json"), None, false).format, OutputFormat::Json);
    }

    #[test]
    fn pretty_accepts_truthy_values() {
        assert!(OutputConfig::from_values(None, Some("YES"), true).pretty);
        assert!(OutputConfig::from_values(None, Some("1"), true).pretty);
        assert!(!OutputConfig::from_values(None, Some("0"), true).pretty);
    }
}
