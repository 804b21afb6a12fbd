use crate::models::{Metric, Series};
use crate::report::Report;
use tracing::debug;

/// Picks the `metric` values of each listed country, in list order.
///
/// Countries missing from the report, and countries where no record carries
/// the metric, are left out. A day lacking the metric counts as zero so the
/// series stays index-aligned with the report dates.
pub fn select_series(report: &Report, countries: &[String], metric: Metric) -> Vec<Series> {
    countries
        .iter()
        .filter_map(|name| {
            let records = report.records(name)?;
            if !records.is_empty() && records.iter().all(|stats| metric.value(stats).is_none()) {
                debug!(country = %name, %metric, "no values for metric");
                return None;
            }
            let data = records
                .iter()
                .map(|stats| metric.value(stats).unwrap_or(0))
                .collect();
            Some(Series::new(name.as_str(), data))
        })
        .collect()
}
