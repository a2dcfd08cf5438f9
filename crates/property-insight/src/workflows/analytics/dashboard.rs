use csv::StringRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::warn;

use super::chart::{Chart, ChartKind, ChartPoint};
use crate::workflows::dataset::{self, DatasetError};

const YEAR_BUILT: &str = "Year_Built";
const PRICE: &str = "Price_in_Lakhs";
const CITY: &str = "City";
const BHK: &str = "BHK";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsPanel {
    PriceTrend,
    CityPrices,
    BhkDistribution,
    BhkPriceComparison,
}

impl AnalyticsPanel {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::PriceTrend,
            Self::CityPrices,
            Self::BhkDistribution,
            Self::BhkPriceComparison,
        ]
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::PriceTrend => "Price Trends Over Years",
            Self::CityPrices => "Location Heatmap",
            Self::BhkDistribution => "BHK Distribution",
            Self::BhkPriceComparison => "Price Comparison by BHK",
        }
    }

    const fn required_columns(self) -> &'static [&'static str] {
        match self {
            Self::PriceTrend => &[YEAR_BUILT, PRICE],
            Self::CityPrices => &[CITY, PRICE],
            Self::BhkDistribution => &[BHK],
            Self::BhkPriceComparison => &[BHK, PRICE],
        }
    }

    const fn missing_warning(self) -> &'static str {
        match self {
            Self::PriceTrend => "Missing year or price column.",
            Self::CityPrices => "Missing location column.",
            Self::BhkDistribution => "Missing bhk column.",
            Self::BhkPriceComparison => "Missing bhk or price columns.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PanelOutcome {
    Rendered { chart: Chart },
    Skipped { warning: &'static str },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelView {
    pub panel: AnalyticsPanel,
    pub title: &'static str,
    #[serde(flatten)]
    pub outcome: PanelOutcome,
}

impl PanelView {
    pub fn chart(&self) -> Option<&Chart> {
        match &self.outcome {
            PanelOutcome::Rendered { chart } => Some(chart),
            PanelOutcome::Skipped { .. } => None,
        }
    }
}

/// Summary charts over the cleaned listing dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub rows: usize,
    pub panels: Vec<PanelView>,
}

impl AnalyticsReport {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let file = dataset::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// A panel whose columns are absent is skipped with a warning; the
    /// remaining panels still render.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut csv_reader = dataset::csv_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let records = csv_reader
            .records()
            .collect::<Result<Vec<StringRecord>, csv::Error>>()?;

        let panels = AnalyticsPanel::ordered()
            .into_iter()
            .map(|panel| PanelView {
                panel,
                title: panel.title(),
                outcome: render_panel(panel, &headers, &records),
            })
            .collect();

        Ok(Self {
            rows: records.len(),
            panels,
        })
    }

    pub fn panel(&self, panel: AnalyticsPanel) -> Option<&PanelView> {
        self.panels.iter().find(|view| view.panel == panel)
    }

    pub fn warnings(&self) -> Vec<&'static str> {
        self.panels
            .iter()
            .filter_map(|view| match view.outcome {
                PanelOutcome::Skipped { warning } => Some(warning),
                PanelOutcome::Rendered { .. } => None,
            })
            .collect()
    }
}

fn render_panel(
    panel: AnalyticsPanel,
    headers: &StringRecord,
    records: &[StringRecord],
) -> PanelOutcome {
    let indices: Option<Vec<usize>> = panel
        .required_columns()
        .iter()
        .map(|column| dataset::column_index(headers, column))
        .collect();

    let Some(indices) = indices else {
        let warning = panel.missing_warning();
        warn!(panel = panel.title(), "{warning}");
        return PanelOutcome::Skipped { warning };
    };

    let chart = match panel {
        AnalyticsPanel::PriceTrend => Chart {
            title: panel.title(),
            kind: ChartKind::Line,
            x_label: YEAR_BUILT,
            y_label: PRICE,
            points: mean_by_integer(records, indices[0], indices[1]),
        },
        AnalyticsPanel::CityPrices => Chart {
            title: panel.title(),
            kind: ChartKind::Bar,
            x_label: CITY,
            y_label: PRICE,
            points: mean_by_label(records, indices[0], indices[1]),
        },
        AnalyticsPanel::BhkDistribution => Chart {
            title: panel.title(),
            kind: ChartKind::Bar,
            x_label: BHK,
            y_label: "Listings",
            points: count_by_integer(records, indices[0]),
        },
        AnalyticsPanel::BhkPriceComparison => Chart {
            title: panel.title(),
            kind: ChartKind::Line,
            x_label: BHK,
            y_label: PRICE,
            points: mean_by_integer(records, indices[0], indices[1]),
        },
    };

    PanelOutcome::Rendered { chart }
}

#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(self) -> f64 {
        self.sum / self.count as f64
    }
}

fn integer_cell(record: &StringRecord, index: usize) -> Option<i64> {
    dataset::numeric_cell(record, index)
        .filter(|value| value.fract() == 0.0)
        .map(|value| value as i64)
}

fn mean_by_integer(records: &[StringRecord], key: usize, value: usize) -> Vec<ChartPoint> {
    let mut groups: BTreeMap<i64, Mean> = BTreeMap::new();
    for record in records {
        if let (Some(group), Some(price)) = (
            integer_cell(record, key),
            dataset::numeric_cell(record, value),
        ) {
            groups.entry(group).or_default().push(price);
        }
    }

    groups
        .into_iter()
        .map(|(group, mean)| ChartPoint {
            label: group.to_string(),
            value: mean.value(),
        })
        .collect()
}

fn mean_by_label(records: &[StringRecord], key: usize, value: usize) -> Vec<ChartPoint> {
    let mut groups: BTreeMap<&str, Mean> = BTreeMap::new();
    for record in records {
        let label = record.get(key).filter(|label| !label.is_empty());
        if let (Some(label), Some(price)) = (label, dataset::numeric_cell(record, value)) {
            groups.entry(label).or_default().push(price);
        }
    }

    groups
        .into_iter()
        .map(|(label, mean)| ChartPoint {
            label: label.to_string(),
            value: mean.value(),
        })
        .collect()
}

fn count_by_integer(records: &[StringRecord], key: usize) -> Vec<ChartPoint> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for group in records.iter().filter_map(|record| integer_cell(record, key)) {
        *counts.entry(group).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(group, count)| ChartPoint {
            label: group.to_string(),
            value: count as f64,
        })
        .collect()
}
