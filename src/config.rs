use crate::source::ReportSource;
use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_REPORT_URL: &str = "https://pomber.github.io/covid19/timeseries.json";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub source: ReportSource,
    pub default_country: String,
    pub ready_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// `REPORT_PATH` wins over `REPORT_URL`; unparseable numbers fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);

        let source = match lookup("REPORT_PATH") {
            Some(path) => ReportSource::File(PathBuf::from(path)),
            None => ReportSource::Url(
                lookup("REPORT_URL").unwrap_or_else(|| DEFAULT_REPORT_URL.to_string()),
            ),
        };

        let default_country = lookup("DEFAULT_COUNTRY")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "Poland".to_string());

        let ready_timeout = lookup("READY_TIMEOUT_MS")
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_secs(5));

        Self {
            port,
            source,
            default_country,
            ready_timeout,
        }
    }
}
