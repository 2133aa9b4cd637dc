pub mod aggregator;
pub mod render;

pub use aggregator::{
    run_scenario_test, CaseDetail, CaseSelection, CaseSummary, ResultsAggregator,
    ScenarioResults, ScenarioSummary, ScenarioTestOutput,
};
pub use render::{RenderConfig, Renderer, Rgb, SeriesStyle};
