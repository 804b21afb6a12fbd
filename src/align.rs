use crate::models::Series;
use crate::report::Report;
use crate::strategy::Strategy;

/// A shared label axis with the series trimmed to match it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aligned {
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

pub fn align(report: &Report, series: Vec<Series>, strategy: &Strategy) -> Aligned {
    match strategy {
        Strategy::ByDate(None) => from_first_case_date(report, series),
        Strategy::ByDate(Some(from)) => from_given_date(report, series, from),
        Strategy::ByDay(from) => from_first_case_day(series, *from),
    }
}

/// Dates of the first series, or nothing when that series has no points.
fn source_labels(report: &Report, series: &[Series]) -> Vec<String> {
    match series.first() {
        Some(first) if !first.data.is_empty() => report.dates(&first.label),
        _ => Vec::new(),
    }
}

fn tail<T: Clone>(values: &[T], len: usize) -> Vec<T> {
    values[values.len().saturating_sub(len)..].to_vec()
}

fn longest(series: &[Series]) -> usize {
    series.iter().map(|s| s.data.len()).max().unwrap_or(0)
}

/// First day on which any country reports a non-zero value. Series shorter
/// than the row have no value there and do not count.
fn first_case_row(series: &[Series]) -> Option<usize> {
    (0..longest(series)).find(|&row| {
        series
            .iter()
            .filter_map(|s| s.data.get(row))
            .any(|&value| value != 0)
    })
}

fn from_first_case_date(report: &Report, series: Vec<Series>) -> Aligned {
    let rows = longest(&series);
    let start = first_case_row(&series).unwrap_or(rows);
    let length = rows - start;

    let series: Vec<Series> = series
        .into_iter()
        .map(|mut s| {
            s.data = s.data.get(start..).map(<[u64]>::to_vec).unwrap_or_default();
            s
        })
        .collect();

    let labels = tail(&source_labels(report, &series), length);
    Aligned { labels, series }
}

fn from_given_date(report: &Report, series: Vec<Series>, from: &str) -> Aligned {
    let labels: Vec<String> = source_labels(report, &series)
        .into_iter()
        .skip_while(|label| label != from)
        .collect();
    let length = labels.len();

    // An unknown `from` keeps every series whole under an empty axis.
    let series = series
        .into_iter()
        .map(|mut s| {
            if length > 0 {
                s.data = tail(&s.data, length);
            }
            s
        })
        .collect();

    Aligned { labels, series }
}

fn from_first_case_day(series: Vec<Series>, from: Option<usize>) -> Aligned {
    let skip = from.map_or(0, |day| day.saturating_sub(1));

    let trimmed: Vec<Series> = series
        .into_iter()
        .map(|mut s| {
            let first_case = s.data.iter().position(|&value| value != 0).unwrap_or(s.data.len());
            s.data.drain(..first_case);
            s
        })
        .collect();

    let labels = (1..=longest(&trimmed))
        .skip(skip)
        .map(|day| day.to_string())
        .collect();

    let series = trimmed
        .into_iter()
        .map(|mut s| {
            s.data = s.data.get(skip..).map(<[u64]>::to_vec).unwrap_or_default();
            s
        })
        .collect();

    Aligned { labels, series }
}
