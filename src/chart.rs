use crate::align::{Aligned, align};
use crate::color::string_to_rgb;
use crate::models::{ChartData, ChartFrame, Dataset, FrameMode, Series};
use crate::selector::select_series;
use crate::state::Snapshot;
use crate::strategy::Strategy;
use tokio::sync::watch;
use tracing::debug;

/// Builds the chart payload for a snapshot. Always rebuilt from scratch.
pub fn to_chart_data(snapshot: &Snapshot) -> ChartData {
    let report = &snapshot.report;
    let selection = &snapshot.selection;

    let countries: Vec<String> = selection
        .selected_countries
        .iter()
        .filter(|name| report.contains(name))
        .cloned()
        .collect();

    let series = select_series(report, &countries, selection.metric);
    let Aligned { labels, series } = align(report, series, &selection.strategy);

    ChartData {
        labels,
        datasets: series.into_iter().map(to_dataset).collect(),
    }
}

fn to_dataset(series: Series) -> Dataset {
    let rgb = string_to_rgb(&series.label);
    Dataset {
        label: series.label,
        data: series.data,
        background_color: rgb.rgba(0.2),
        border_color: rgb.rgba(1.0),
        point_background_color: rgb.rgba(1.0),
    }
}

/// Strategy after the user clicks the plotted point at `index`: the label
/// under that point becomes `from`, the kind stays.
pub fn strategy_for_point(snapshot: &Snapshot, index: usize) -> Option<Strategy> {
    let chart = to_chart_data(snapshot);
    let label = chart.labels.get(index)?;
    snapshot.selection.strategy.with_from_label(label)
}

/// The drawing side of the chart. The first frame creates it, later frames
/// replace its labels and datasets.
pub trait ChartWidget {
    fn create(&mut self, revision: u64, data: &ChartData);
    fn update(&mut self, revision: u64, data: &ChartData);
}

pub struct ChartHandle<W> {
    widget: W,
    mounted: bool,
    last_revision: Option<u64>,
}

impl<W: ChartWidget> ChartHandle<W> {
    pub fn new(widget: W) -> Self {
        Self {
            widget,
            mounted: false,
            last_revision: None,
        }
    }

    /// Hands `data` to the widget unless a frame at least as new was already
    /// drawn. Returns whether the widget was touched.
    pub fn render(&mut self, revision: u64, data: &ChartData) -> bool {
        if self.last_revision.is_some_and(|last| revision <= last) {
            debug!(revision, "skipping stale chart frame");
            return false;
        }

        if self.mounted {
            self.widget.update(revision, data);
        } else {
            self.widget.create(revision, data);
            self.mounted = true;
        }
        self.last_revision = Some(revision);
        true
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }
}

/// Publishes frames to HTTP readers; the channel always holds the newest one.
pub struct FramePublisher {
    frames: watch::Sender<ChartFrame>,
}

impl FramePublisher {
    pub fn new() -> (Self, watch::Receiver<ChartFrame>) {
        let (frames, receiver) = watch::channel(ChartFrame::empty());
        (Self { frames }, receiver)
    }

    pub fn latest(&self) -> ChartFrame {
        self.frames.borrow().clone()
    }

    fn publish(&self, revision: u64, mode: FrameMode, data: &ChartData) {
        self.frames.send_replace(ChartFrame {
            revision,
            mode,
            chart: data.clone(),
        });
    }
}

impl ChartWidget for FramePublisher {
    fn create(&mut self, revision: u64, data: &ChartData) {
        self.publish(revision, FrameMode::Create, data);
    }

    fn update(&mut self, revision: u64, data: &ChartData) {
        self.publish(revision, FrameMode::Update, data);
    }
}
