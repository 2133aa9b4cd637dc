#![cfg(feature = "project_cost")]

use devloan_core::project_cost::{project_from_csv_reader, Project, ProjectUnit};
use devloan_core::{DevLoanError, ValueRange};
use rust_decimal_macros::dec;

const BUILD_CSV: &str = "\
id,project,category,name,description,amount_min,amount_max
S1,Oh Cabins,Site works,Survey,,2500,3000
S2,Oh Cabins,Site works,Septic system,Two tanks,18000,24000
B1,Oh Cabins,Buildings,Cabin shell x3,Kit cabins,90000,120000
B2,Oh Cabins,Buildings,Fit-out,,30000,45000
F1,Oh Cabins,Fees,Consents,Council fees,6000,6000
";

#[test]
fn test_category_order_follows_first_appearance() {
    let project = project_from_csv_reader(BUILD_CSV.as_bytes()).unwrap();
    assert_eq!(project.categories(), &["Site works", "Buildings", "Fees"]);
    assert_eq!(project.in_category("Buildings").count(), 2);
}

#[test]
fn test_subtotals_and_total() {
    let project = project_from_csv_reader(BUILD_CSV.as_bytes()).unwrap();
    let summary = project.summary();
    assert_eq!(summary.categories[0].subtotal, ValueRange::new(dec!(20500), dec!(27000)).unwrap());
    assert_eq!(summary.categories[2].subtotal, ValueRange::point(dec!(6000)));
    assert_eq!(summary.total, ValueRange::new(dec!(146500), dec!(198000)).unwrap());
    assert_eq!(summary.lines().last().unwrap(), "Total: $146,500.0 - $198,000.0");
}

#[test]
fn test_fixed_cost_renders_single_value() {
    let project = project_from_csv_reader(BUILD_CSV.as_bytes()).unwrap();
    let lines = project.summary().lines();
    assert!(lines.contains(&"    - F1, Consents, $6,000.0".to_string()));
}

#[test]
fn test_units_from_two_projects_rejected() {
    let units = vec![
        ProjectUnit::new("1", "A", "Site", "Survey", None, dec!(1), dec!(2)).unwrap(),
        ProjectUnit::new("2", "B", "Site", "Survey", None, dec!(1), dec!(2)).unwrap(),
    ];
    assert!(matches!(Project::new(units), Err(DevLoanError::InvalidProject(_))));
}
