pub mod batch;
pub mod collection;

pub use batch::{BatchedSeries, ScenarioBatch, ScenarioBatchEvaluator, SeriesKind};
pub use collection::{ScenarioCollection, ScenarioRanges};
