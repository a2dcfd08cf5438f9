mod chart;
mod dashboard;

pub use chart::{Chart, ChartKind, ChartPoint};
pub use dashboard::{AnalyticsPanel, AnalyticsReport, PanelOutcome, PanelView};
