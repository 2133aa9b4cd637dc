use clap::Args;
use serde_json::{json, Value};

use devloan_core::project_cost;

use crate::input;

/// Arguments for a project cost summary
#[derive(Args)]
pub struct ProjectCostArgs {
    /// CSV with header id,project,category,name,description,amount_min,amount_max
    #[arg(long)]
    pub csv: String,
}

pub fn run_project_cost(args: ProjectCostArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let path = input::file::resolve_path(&args.csv)?;
    let project = project_cost::project_from_csv_path(&path)?;
    let summary = project.summary();
    let lines = summary.lines();

    let mut result = serde_json::to_value(&summary)?;
    if let Value::Object(ref mut map) = result {
        map.insert("lines".into(), json!(lines));
    }
    Ok(json!({
        "result": result,
        "methodology": "Sum of [min, max] cost estimates by category",
        "warnings": [],
    }))
}
