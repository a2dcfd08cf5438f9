use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// A labelled series ready to hand to any charting front end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: &'static str,
    pub kind: ChartKind,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub points: Vec<ChartPoint>,
}

impl Chart {
    pub fn value_for(&self, label: &str) -> Option<f64> {
        self.points
            .iter()
            .find(|point| point.label == label)
            .map(|point| point.value)
    }

    /// Horizontal text bars scaled to the largest value, for terminal output.
    pub fn render_text(&self, width: usize) -> String {
        let label_width = self
            .points
            .iter()
            .map(|point| point.label.chars().count())
            .max()
            .unwrap_or(0);
        let peak = self
            .points
            .iter()
            .map(|point| point.value.abs())
            .fold(0.0_f64, f64::max);

        let mut out = String::new();
        for point in &self.points {
            let filled = if peak > 0.0 {
                ((point.value.abs() / peak) * width as f64).round() as usize
            } else {
                0
            };
            let _ = writeln!(
                out,
                "{:<label_width$} | {} {:.2}",
                point.label,
                "#".repeat(filled),
                point.value
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_text_scales_to_peak() {
        let chart = Chart {
            title: "BHK Distribution",
            kind: ChartKind::Bar,
            x_label: "BHK",
            y_label: "Listings",
            points: vec![
                ChartPoint {
                    label: "1".to_string(),
                    value: 2.0,
                },
                ChartPoint {
                    label: "10".to_string(),
                    value: 4.0,
                },
            ],
        };

        let rendered = chart.render_text(8);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines, vec!["1  | #### 2.00", "10 | ######## 4.00"]);
        assert_eq!(chart.value_for("10"), Some(4.0));
        assert_eq!(chart.value_for("3"), None);
    }
}
