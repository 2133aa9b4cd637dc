pub mod project_cost;
pub mod scenarios;
