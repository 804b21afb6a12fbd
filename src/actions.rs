use crate::chart::strategy_for_point;
use crate::models::Metric;
use crate::report::Report;
use crate::state::Snapshot;
use crate::strategy::{Strategy, StrategyKind};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub enum Action {
    GotReport(Report),
    SelectCountry(String),
    /// Adds the named country, or the highlighted one when no name is given.
    AddCountry(Option<String>),
    RemoveCountry(String),
    ToggleCountry(String),
    SetStrategyKind(StrategyKind),
    SetMetric(Metric),
    ClickPoint(usize),
}

/// Produces the next revision; the previous snapshot is left untouched.
pub fn reduce(snapshot: &Snapshot, action: Action) -> Snapshot {
    let mut next = snapshot.clone();
    next.revision = snapshot.revision + 1;
    let selection = &mut next.selection;

    match action {
        Action::GotReport(report) => {
            next.report = Arc::new(report);
        }
        Action::SelectCountry(name) => {
            selection.current_country = name;
        }
        Action::AddCountry(name) => {
            let name = name.unwrap_or_else(|| selection.current_country.clone());
            if !selection.is_selected(&name) {
                selection.selected_countries.push(name);
            }
        }
        Action::RemoveCountry(name) => {
            selection.selected_countries.retain(|country| *country != name);
        }
        Action::ToggleCountry(name) => {
            if selection.is_selected(&name) {
                selection.selected_countries.retain(|country| *country != name);
            } else {
                selection.selected_countries.push(name);
            }
        }
        Action::SetStrategyKind(kind) => {
            selection.strategy = Strategy::from(kind);
        }
        Action::SetMetric(metric) => {
            selection.metric = metric;
        }
        Action::ClickPoint(index) => match strategy_for_point(snapshot, index) {
            Some(strategy) => selection.strategy = strategy,
            None => debug!(index, "click outside the plotted labels"),
        },
    }

    next
}
