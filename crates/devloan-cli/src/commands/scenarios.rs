use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::info;

use devloan_core::amortization::{self, ScenarioParameters};
use devloan_core::results::{run_scenario_test, RenderConfig, Renderer};
use devloan_core::scenarios::ScenarioRanges;

use crate::input;
use crate::render::CsvSeriesRenderer;

/// Arguments for a scenario comparison
#[derive(Args)]
pub struct ScenariosArgs {
    /// Path to a JSON or YAML file of parameter ranges (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Collection name used in the summary and chart titles
    #[arg(long)]
    pub name: Option<String>,

    /// Principal amounts (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub principal: Option<Vec<Decimal>>,

    /// Annual interest rates as decimals (comma-separated, e.g. "0.04,0.06")
    #[arg(long, value_delimiter = ',')]
    pub interest_rate: Option<Vec<Decimal>>,

    /// Interest-only flags to compare (comma-separated, e.g. "false,true")
    #[arg(long, value_delimiter = ',')]
    pub interest_only: Option<Vec<bool>>,

    /// Loan terms in years (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub loan_term: Option<Vec<u32>>,

    /// Lead times before revenue starts, in years (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub lead_time: Option<Vec<u32>>,

    /// Revenue units, e.g. nightly rates (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub revenue_unit: Option<Vec<Decimal>>,

    /// Multiplier from one revenue unit to annual revenue
    #[arg(long)]
    pub revenue_factor: Option<Decimal>,

    /// Also write every batched series to this CSV file
    #[arg(long)]
    pub series_out: Option<String>,

    /// JSON or YAML file overriding the default chart settings
    #[arg(long)]
    pub render_config: Option<String>,
}

pub fn run_scenarios(args: ScenariosArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let ranges: ScenarioRanges = if let Some(ref path) = args.input {
        input::file::read_structured(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        ScenarioRanges {
            name: args
                .name
                .clone()
                .unwrap_or_else(|| "Scenario comparison".to_string()),
            principals: args
                .principal
                .clone()
                .ok_or("--principal is required (or provide --input)")?,
            interest_rates: args
                .interest_rate
                .clone()
                .ok_or("--interest-rate is required (or provide --input)")?,
            interest_only: args.interest_only.clone().unwrap_or_else(|| vec![false]),
            loan_terms_years: args
                .loan_term
                .clone()
                .ok_or("--loan-term is required (or provide --input)")?,
            lead_times_years: args.lead_time.clone().unwrap_or_else(|| vec![0]),
            revenue_units: args
                .revenue_unit
                .clone()
                .ok_or("--revenue-unit is required (or provide --input)")?,
            revenue_factor: args.revenue_factor.unwrap_or(Decimal::ONE),
        }
    };

    let (result, aggregator) = run_scenario_test(&ranges)?;

    if let Some(ref path) = args.series_out {
        let config: RenderConfig = match args.render_config {
            Some(ref cfg) => input::file::read_structured(cfg)?,
            None => RenderConfig::default(),
        };
        CsvSeriesRenderer::new(path).render(aggregator.results(), &config)?;
        info!(path = %path, "Wrote batched series");
    }

    Ok(serde_json::to_value(result)?)
}

/// Arguments for a single-scenario schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to a JSON or YAML file with one scenario's parameters
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate as a decimal
    #[arg(long)]
    pub interest_rate: Option<Decimal>,

    /// Payments cover interest only
    #[arg(long, default_value_t = false)]
    pub interest_only: bool,

    /// Loan term in years
    #[arg(long)]
    pub loan_term: Option<u32>,

    /// Years before revenue starts
    #[arg(long, default_value_t = 0)]
    pub lead_time: u32,

    /// Revenue unit, e.g. a nightly rate
    #[arg(long)]
    pub revenue_unit: Option<Decimal>,

    /// Multiplier from one revenue unit to annual revenue
    #[arg(long, default_value_t = Decimal::ONE)]
    pub revenue_factor: Decimal,

    /// Horizon in years to pad the schedule to (defaults to the loan term)
    #[arg(long)]
    pub horizon: Option<u32>,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params: ScenarioParameters = if let Some(ref path) = args.input {
        input::file::read_structured(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let loan_term = args
            .loan_term
            .ok_or("--loan-term is required (or provide --input)")?;
        ScenarioParameters {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_interest_rate: args
                .interest_rate
                .ok_or("--interest-rate is required (or provide --input)")?,
            interest_only: args.interest_only,
            loan_term_years: loan_term,
            lead_time_years: args.lead_time,
            revenue_unit: args
                .revenue_unit
                .ok_or("--revenue-unit is required (or provide --input)")?,
            revenue_factor: args.revenue_factor,
            max_loan_term_years: args.horizon.unwrap_or(loan_term),
        }
    };

    let result = amortization::build_schedule(&params)?;
    Ok(serde_json::to_value(result)?)
}
