use crate::models::{CountrySummary, StatRecord};
use crate::stats::summarize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryReport {
    pub records: Vec<StatRecord>,
    pub summary: CountrySummary,
}

/// Daily statistics per country, keyed by country name.
///
/// A report is built once and then only read; summaries are attached while
/// building so views never recompute them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    countries: BTreeMap<String, CountryReport>,
}

impl Report {
    pub fn from_series<I, S>(series: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<StatRecord>)>,
        S: Into<String>,
    {
        let countries = series
            .into_iter()
            .map(|(name, records)| {
                let summary = summarize(&records);
                (name.into(), CountryReport { records, summary })
            })
            .collect();
        Self { countries }
    }

    /// Parses the feed payload. Only a payload that is not a JSON object is
    /// an error. Records without a usable date are dropped, and a country
    /// is skipped when its value is not a list or none of its records survive.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let raw: BTreeMap<String, Value> = serde_json::from_slice(bytes)?;
        let series = raw
            .into_iter()
            .filter_map(|(name, value)| parse_series(&name, value).map(|records| (name, records)));
        Ok(Self::from_series(series))
    }

    pub fn records(&self, name: &str) -> Option<&[StatRecord]> {
        self.countries.get(name).map(|entry| entry.records.as_slice())
    }

    pub fn summary(&self, name: &str) -> Option<&CountrySummary> {
        self.countries.get(name).map(|entry| &entry.summary)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.countries.contains_key(name)
    }

    /// Country names in sorted order.
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.countries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Dates of a country's series, in report order.
    pub fn dates(&self, name: &str) -> Vec<String> {
        self.records(name)
            .map(|records| records.iter().map(|stats| stats.date.clone()).collect())
            .unwrap_or_default()
    }
}

fn parse_series(name: &str, value: Value) -> Option<Vec<StatRecord>> {
    let Value::Array(items) = value else {
        warn!("skipping {name}: series is not a list");
        return None;
    };

    let total = items.len();
    let records: Vec<StatRecord> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();

    if records.len() < total {
        warn!("{name}: dropped {} records without a usable date", total - records.len());
    }
    if records.is_empty() && total > 0 {
        return None;
    }
    Some(records)
}
