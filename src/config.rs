use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Range Message XML, or an already built cache file
    pub range_file: PathBuf,
    /// Where the parsed table is cached between runs
    pub cache_file: Option<PathBuf>,
    pub output: OutputFormat,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            range_file: var("ISBN_RANGE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("RangeMessage.xml")),
            cache_file: var("ISBN_RANGE_CACHE")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            output: var("ISBN_OUTPUT")
                .and_then(|s| OutputFormat::parse(&s))
                .unwrap_or(OutputFormat::Text),
        }
    }
}
