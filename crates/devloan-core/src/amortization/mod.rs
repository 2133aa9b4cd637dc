pub mod model;
pub mod schedule;

pub use model::{total_interest, AmortizationModel, ScenarioLabel, ScenarioParameters};
pub use schedule::{build_schedule, SchedulePeriod, ScheduleOutput};
