use std::path::PathBuf;
use tracing::debug;

use devloan_core::results::{RenderConfig, Renderer, ScenarioResults};
use devloan_core::scenarios::SeriesKind;
use devloan_core::{DevLoanError, DevLoanResult};

/// Writes every batched series to a long-format CSV:
/// `series,label,colour,scenario,month,x,value`.
pub struct CsvSeriesRenderer {
    path: PathBuf,
}

impl CsvSeriesRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Renderer for CsvSeriesRenderer {
    fn render(&self, results: &ScenarioResults, config: &RenderConfig) -> DevLoanResult<()> {
        let csv_err = |e: csv::Error| {
            DevLoanError::Csv(format!("Failed to write '{}': {e}", self.path.display()))
        };
        let mut wtr = csv::Writer::from_path(&self.path).map_err(csv_err)?;
        wtr.write_record(["series", "label", "colour", "scenario", "month", "x", "value"])
            .map_err(csv_err)?;

        for kind in SeriesKind::ALL {
            let series = results.series(kind);
            let xs = config.x_values(series.n_months());
            let colour = config
                .style(kind)
                .map(|s| s.colour.hex())
                .unwrap_or_else(|| config.neutral_colour.hex());
            let label = config.label_for(kind);

            for (scenario, row) in series.rows().iter().enumerate() {
                for (month, (value, x)) in row.iter().zip(xs.iter()).enumerate() {
                    wtr.write_record([
                        kind.code(),
                        label,
                        colour.as_str(),
                        &scenario.to_string(),
                        &month.to_string(),
                        &x.round_dp(6).normalize().to_string(),
                        &value.round_dp(2).to_string(),
                    ])
                    .map_err(csv_err)?;
                }
            }
        }

        wtr.flush().map_err(|e| {
            DevLoanError::Csv(format!("Failed to write '{}': {e}", self.path.display()))
        })?;
        debug!(
            title = %config.title_for(results),
            scenarios = results.n_scenarios(),
            "Rendered series to CSV"
        );
        Ok(())
    }
}
