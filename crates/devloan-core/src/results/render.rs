use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::results::aggregator::ScenarioResults;
use crate::scenarios::SeriesKind;
use crate::DevLoanResult;

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// `#RRGGBB`
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Line and band styling for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStyle {
    pub kind: SeriesKind,
    pub colour: Rgb,
    pub label: String,
    /// Opacity of the min/max band drawn behind the lines
    pub fill_alpha: f64,
}

/// Chart settings passed explicitly to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Figure size in inches (width, height)
    pub figure_size: (f64, f64),
    /// Months per x-axis unit; 12 puts the axis in years
    pub months_per_x_unit: u32,
    /// Colour of the reference line and legend text
    pub neutral_colour: Rgb,
    pub series: Vec<SeriesStyle>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: "Comparison of Different Scenarios".into(),
            x_label: "Years".into(),
            y_label: "$".into(),
            figure_size: (10.0, 8.0),
            months_per_x_unit: 12,
            neutral_colour: Rgb(85, 85, 85),
            series: vec![
                SeriesStyle {
                    kind: SeriesKind::AmountRepaid,
                    colour: Rgb(226, 74, 51),
                    label: "Cumulative Amount Repaid".into(),
                    fill_alpha: 0.4,
                },
                SeriesStyle {
                    kind: SeriesKind::AmountOwing,
                    colour: Rgb(166, 6, 40),
                    label: "Amount Owing on Loan".into(),
                    fill_alpha: 0.4,
                },
                SeriesStyle {
                    kind: SeriesKind::CumulativeRevenue,
                    colour: Rgb(52, 138, 189),
                    label: "Cumulative Revenue".into(),
                    fill_alpha: 0.4,
                },
                SeriesStyle {
                    kind: SeriesKind::CumulativeProfit,
                    colour: Rgb(70, 120, 33),
                    label: "Cumulative Profit".into(),
                    fill_alpha: 0.4,
                },
            ],
        }
    }
}

impl RenderConfig {
    pub fn style(&self, kind: SeriesKind) -> Option<&SeriesStyle> {
        self.series.iter().find(|s| s.kind == kind)
    }

    /// Legend label for a series, falling back to its short code.
    pub fn label_for(&self, kind: SeriesKind) -> &str {
        self.style(kind).map_or(kind.code(), |s| s.label.as_str())
    }

    /// X coordinate of each month index (month / months_per_x_unit).
    pub fn x_values(&self, n_months: usize) -> Vec<Decimal> {
        let unit = Decimal::from(self.months_per_x_unit.max(1));
        (0..n_months).map(|m| Decimal::from(m) / unit).collect()
    }

    /// Title prefixed with the collection name.
    pub fn title_for(&self, results: &ScenarioResults) -> String {
        if results.name.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", results.name, self.title)
        }
    }
}

/// Consumer of a results bundle (chart, export, …).
pub trait Renderer {
    fn render(&self, results: &ScenarioResults, config: &RenderConfig) -> DevLoanResult<()>;
}
