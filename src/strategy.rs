use serde::Serialize;
use std::str::FromStr;

/// Time-alignment mode for comparing countries, plus an optional starting point.
///
/// `ByDate` carries a calendar label as it appears in the report, `ByDay` a
/// 1-based count of days since the country's first case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "from", rename_all = "camelCase")]
pub enum Strategy {
    ByDate(Option<String>),
    ByDay(Option<usize>),
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::ByDate(None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    ByDate,
    ByDay,
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "byDate" => Ok(StrategyKind::ByDate),
            "byDay" => Ok(StrategyKind::ByDay),
            other => Err(format!("unknown alignment '{other}'")),
        }
    }
}

/// A freshly selected mode starts without a `from` point: a date and a day
/// offset do not translate into each other.
impl From<StrategyKind> for Strategy {
    fn from(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::ByDate => Strategy::ByDate(None),
            StrategyKind::ByDay => Strategy::ByDay(None),
        }
    }
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::ByDate(_) => StrategyKind::ByDate,
            Strategy::ByDay(_) => StrategyKind::ByDay,
        }
    }

    /// Reinterprets a chart label as the new starting point under the current kind.
    ///
    /// Returns `None` when the label cannot be read as a day number in `ByDay` mode.
    pub fn with_from_label(&self, label: &str) -> Option<Strategy> {
        match self {
            Strategy::ByDate(_) => Some(Strategy::ByDate(Some(label.to_string()))),
            Strategy::ByDay(_) => label.parse().ok().map(|day| Strategy::ByDay(Some(day))),
        }
    }
}
