use crate::strategy::Strategy;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr};

/// One day of observations for one country, as delivered by the report feed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatRecord {
    pub date: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub confirmed: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub deaths: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub recovered: Option<u64>,
}

/// Anything other than a non-negative integer reads as a missing count.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| value.as_u64()))
}

impl StatRecord {
    pub fn new(date: impl Into<String>, confirmed: u64) -> Self {
        Self {
            date: date.into(),
            confirmed: Some(confirmed),
            deaths: None,
            recovered: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Confirmed,
    Deaths,
    Recovered,
}

impl Metric {
    pub fn value(self, record: &StatRecord) -> Option<u64> {
        match self {
            Metric::Confirmed => record.confirmed,
            Metric::Deaths => record.deaths,
            Metric::Recovered => record.recovered,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Confirmed => "confirmed",
            Metric::Deaths => "deaths",
            Metric::Recovered => "recovered",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "confirmed" => Ok(Metric::Confirmed),
            "deaths" => Ok(Metric::Deaths),
            "recovered" => Ok(Metric::Recovered),
            other => Err(format!("unknown metric '{other}'")),
        }
    }
}

/// Derived per-country figures, computed once when a report is ingested.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountrySummary {
    pub weekly_growth: i64,
    pub last_week_cases: i64,
    pub total_cases: u64,
    pub as_of: Option<NaiveDate>,
}

/// A country's raw metric values, index-aligned to its report dates.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub data: Vec<u64>,
}

impl Series {
    pub fn new(label: impl Into<String>, data: Vec<u64>) -> Self {
        Self {
            label: label.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<u64>,
    pub background_color: String,
    pub border_color: String,
    pub point_background_color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameMode {
    Create,
    Update,
}

/// What the browser chart receives: a full replacement of labels and datasets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartFrame {
    pub revision: u64,
    pub mode: FrameMode,
    #[serde(flatten)]
    pub chart: ChartData,
}

impl ChartFrame {
    pub fn empty() -> Self {
        Self {
            revision: 0,
            mode: FrameMode::Create,
            chart: ChartData::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CountryRequest {
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StrategyRequest {
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct MetricRequest {
    pub metric: String,
}

#[derive(Debug, Deserialize)]
pub struct ClickPointRequest {
    pub index: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct TableQuery {
    pub sort: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    pub revision: u64,
    pub ready: bool,
    pub selected_countries: Vec<String>,
    pub chips: Vec<Chip>,
    pub current_country: String,
    pub strategy: Strategy,
    pub metric: Metric,
}

/// A selected country as drawn in the chip list, in selection order.
#[derive(Debug, Serialize)]
pub struct Chip {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryRow {
    pub name: String,
    pub selected: bool,
    pub color: String,
    #[serde(flatten)]
    pub summary: CountrySummary,
}
