use crate::color::string_to_hex;
use crate::models::{CountryRow, CountrySummary, StatRecord};
use crate::report::Report;
use chrono::NaiveDate;
use std::{cmp::Ordering, str::FromStr};

const WEEK: usize = 7;

pub fn summarize(records: &[StatRecord]) -> CountrySummary {
    let Some(latest) = records.last() else {
        return CountrySummary::default();
    };

    let total = latest.confirmed.unwrap_or(0);
    let week_ago_index = records.len().saturating_sub(WEEK + 1);
    let week_ago = records[week_ago_index].confirmed.unwrap_or(0);
    let last_week = total as i64 - week_ago as i64;

    let weekly_growth = if week_ago == 0 {
        0
    } else {
        (last_week as f64 / week_ago as f64 * 100.0).round() as i64
    };

    CountrySummary {
        weekly_growth,
        last_week_cases: last_week,
        total_cases: total,
        as_of: parse_report_date(&latest.date),
    }
}

/// Feed dates look like `2020-3-7`; chrono accepts unpadded fields.
pub fn parse_report_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Name,
    Total,
    LastWeek,
    Growth,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "name" => Ok(SortKey::Name),
            "total" => Ok(SortKey::Total),
            "last_week" => Ok(SortKey::LastWeek),
            "growth" => Ok(SortKey::Growth),
            other => Err(format!("unknown sort column '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{other}'")),
        }
    }
}

pub fn build_table(
    report: &Report,
    selected: &[String],
    key: SortKey,
    order: SortOrder,
) -> Vec<CountryRow> {
    let mut rows: Vec<CountryRow> = report
        .countries()
        .map(|name| CountryRow {
            name: name.to_string(),
            selected: selected.iter().any(|country| country == name),
            color: string_to_hex(name),
            summary: report.summary(name).cloned().unwrap_or_default(),
        })
        .collect();

    rows.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Name => Ordering::Equal,
            SortKey::Total => a.summary.total_cases.cmp(&b.summary.total_cases),
            SortKey::LastWeek => a.summary.last_week_cases.cmp(&b.summary.last_week_cases),
            SortKey::Growth => a.summary.weekly_growth.cmp(&b.summary.weekly_growth),
        }
        .then_with(|| a.name.cmp(&b.name));
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    rows
}
