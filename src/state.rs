use crate::actions::{Action, reduce};
use crate::chart::{ChartHandle, FramePublisher, to_chart_data};
use crate::models::{ChartFrame, Metric};
use crate::report::Report;
use crate::strategy::Strategy;
use std::{sync::Arc, time::Duration};
use tokio::sync::{Mutex, watch};
use tracing::info;

/// What the user picked: countries in chart order, the highlighted dropdown
/// entry, the alignment and the plotted metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub selected_countries: Vec<String>,
    pub current_country: String,
    pub strategy: Strategy,
    pub metric: Metric,
}

impl Selection {
    pub fn new(default_country: impl Into<String>) -> Self {
        let country = default_country.into();
        Self {
            selected_countries: vec![country.clone()],
            current_country: country,
            strategy: Strategy::default(),
            metric: Metric::default(),
        }
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected_countries.iter().any(|country| country == name)
    }
}

/// One committed revision of the dashboard. Never mutated once built.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub revision: u64,
    pub report: Arc<Report>,
    pub selection: Selection,
}

impl Snapshot {
    pub fn initial(selection: Selection) -> Self {
        Self {
            revision: 0,
            report: Arc::new(Report::default()),
            selection,
        }
    }
}

pub struct Dashboard {
    snapshot: Arc<Snapshot>,
    chart: ChartHandle<FramePublisher>,
}

impl Dashboard {
    /// Commits the next snapshot and redraws the chart from it before
    /// returning, so frames leave in commit order.
    pub fn dispatch(&mut self, action: Action) -> ChartFrame {
        let next = reduce(&self.snapshot, action);
        self.snapshot = Arc::new(next);
        let data = to_chart_data(&self.snapshot);
        self.chart.render(self.snapshot.revision, &data);
        self.chart.widget().latest()
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }
}

/// Held by the report loader; firing it releases chart readers waiting on
/// the first report.
pub struct ReadySignal(watch::Sender<bool>);

impl ReadySignal {
    pub fn mark_ready(self) {
        self.0.send_replace(true);
        info!("report ready");
    }
}

#[derive(Clone)]
pub struct AppState {
    dashboard: Arc<Mutex<Dashboard>>,
    frames: watch::Receiver<ChartFrame>,
    ready: watch::Receiver<bool>,
    ready_timeout: Duration,
}

impl AppState {
    pub fn new(selection: Selection, ready_timeout: Duration) -> (Self, ReadySignal) {
        let (publisher, frames) = FramePublisher::new();
        let (ready_tx, ready) = watch::channel(false);
        let dashboard = Dashboard {
            snapshot: Arc::new(Snapshot::initial(selection)),
            chart: ChartHandle::new(publisher),
        };
        let state = Self {
            dashboard: Arc::new(Mutex::new(dashboard)),
            frames,
            ready,
            ready_timeout,
        };
        (state, ReadySignal(ready_tx))
    }

    pub async fn dispatch(&self, action: Action) -> ChartFrame {
        let mut dashboard = self.dashboard.lock().await;
        dashboard.dispatch(action)
    }

    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.dashboard.lock().await.snapshot()
    }

    pub fn latest_frame(&self) -> ChartFrame {
        self.frames.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Waits for the first report, giving up after the configured timeout.
    pub async fn wait_ready(&self) -> bool {
        let mut ready = self.ready.clone();
        let outcome = tokio::time::timeout(self.ready_timeout, ready.wait_for(|ready| *ready)).await;
        matches!(outcome, Ok(Ok(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FrameMode, StatRecord};

    fn report() -> Report {
        Report::from_series([(
            "Poland",
            vec![StatRecord::new("2020-3-3", 0), StatRecord::new("2020-3-4", 1)],
        )])
    }

    #[tokio::test]
    async fn dispatch_publishes_frames_in_commit_order() {
        let (state, _ready) = AppState::new(Selection::new("Poland"), Duration::from_millis(10));
        assert_eq!(state.latest_frame(), ChartFrame::empty());

        let first = state.dispatch(Action::GotReport(report())).await;
        assert_eq!(first.revision, 1);
        assert_eq!(first.mode, FrameMode::Create);
        assert_eq!(first.chart.labels, ["2020-3-4"]);

        let second = state.dispatch(Action::RemoveCountry("Poland".into())).await;
        assert_eq!(second.revision, 2);
        assert_eq!(second.mode, FrameMode::Update);
        assert!(second.chart.datasets.is_empty());
        assert_eq!(state.latest_frame(), second);
        assert_eq!(state.snapshot().await.revision, 2);
    }

    #[tokio::test]
    async fn wait_ready_times_out_until_signalled() {
        let (state, ready) = AppState::new(Selection::new("Poland"), Duration::from_millis(10));
        assert!(!state.wait_ready().await);
        assert!(!state.is_ready());

        ready.mark_ready();
        assert!(state.wait_ready().await);
        assert!(state.is_ready());
    }
}
