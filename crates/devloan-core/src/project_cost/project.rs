use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::error::DevLoanError;
use crate::types::ValueRange;
use crate::DevLoanResult;

const AMOUNT_DP: usize = 1;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One costed line item with a [min, max] estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectUnit {
    pub id: String,
    pub project: String,
    pub category: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub amount: ValueRange,
}

impl ProjectUnit {
    pub fn new(
        id: impl Into<String>,
        project: impl Into<String>,
        category: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        amount_min: Decimal,
        amount_max: Decimal,
    ) -> DevLoanResult<Self> {
        let unit = Self {
            id: id.into(),
            project: project.into(),
            category: category.into(),
            name: name.into(),
            description: description.filter(|d| !d.trim().is_empty()),
            amount: ValueRange::new(amount_min, amount_max).map_err(|_| {
                DevLoanError::InvalidProject(format!(
                    "Amount is not ordered [min, max]: [{amount_min}, {amount_max}]"
                ))
            })?,
        };
        for (field, value) in [
            ("id", &unit.id),
            ("project", &unit.project),
            ("category", &unit.category),
            ("name", &unit.name),
        ] {
            if value.trim().is_empty() {
                return Err(DevLoanError::InvalidProject(format!(
                    "Unit field '{field}' must not be empty"
                )));
            }
        }
        Ok(unit)
    }

    /// `id, name, $min - $max`
    pub fn summary_str(&self) -> String {
        format!("{}, {}, {:.*}", self.id, self.name, AMOUNT_DP, self.amount)
    }
}

/// All units of a single project, categories in order of first appearance.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    name: String,
    categories: Vec<String>,
    units: Vec<ProjectUnit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub units: Vec<ProjectUnit>,
    pub subtotal: ValueRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectCostSummary {
    pub project: String,
    pub categories: Vec<CategorySummary>,
    pub total: ValueRange,
}

impl ProjectCostSummary {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Project summary - {}:", self.project)];
        for cat in &self.categories {
            lines.push(format!("  Category summary - {}", cat.category));
            for unit in &cat.units {
                lines.push(format!("    - {}", unit.summary_str()));
            }
            lines.push(format!("    Subtotal: {:.*}", AMOUNT_DP, cat.subtotal));
        }
        lines.push(format!("Total: {:.*}", AMOUNT_DP, self.total));
        lines
    }
}

impl Project {
    pub fn new(units: Vec<ProjectUnit>) -> DevLoanResult<Self> {
        let names = unique(units.iter().map(|u| u.project.as_str()));
        if names.len() != 1 {
            return Err(DevLoanError::InvalidProject(format!(
                "Uncertain project name: {names:?}"
            )));
        }
        let name = names[0].to_string();
        let categories = unique(units.iter().map(|u| u.category.as_str()))
            .into_iter()
            .map(String::from)
            .collect();

        Ok(Self {
            name,
            categories,
            units,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn units(&self) -> &[ProjectUnit] {
        &self.units
    }

    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a ProjectUnit> + 'a {
        self.units.iter().filter(move |u| u.category == category)
    }

    pub fn total(&self) -> ValueRange {
        self.units.iter().map(|u| u.amount).sum()
    }

    pub fn category_total(&self, category: &str) -> ValueRange {
        self.in_category(category).map(|u| u.amount).sum()
    }

    pub fn summary(&self) -> ProjectCostSummary {
        let categories = self
            .categories
            .iter()
            .map(|cat| CategorySummary {
                category: cat.clone(),
                units: self.in_category(cat).cloned().collect(),
                subtotal: self.category_total(cat),
            })
            .collect();
        ProjectCostSummary {
            project: self.name.clone(),
            categories,
            total: self.total(),
        }
    }
}

fn unique<'a, I>(values: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: Vec<&str> = Vec::new();
    for v in values {
        if !seen.contains(&v) {
            seen.push(v);
        }
    }
    seen
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct UnitRecord {
    id: String,
    project: String,
    category: String,
    name: String,
    description: Option<String>,
    amount_min: String,
    amount_max: String,
}

fn parse_amount(field: &str, raw: &str, id: &str) -> DevLoanResult<Decimal> {
    Decimal::from_str(raw.trim()).map_err(|e| {
        DevLoanError::InvalidProject(format!("Unit '{id}': {field} '{raw}' is not a number ({e})"))
    })
}

/// Read a project from CSV with header
/// `id,project,category,name,description,amount_min,amount_max`.
pub fn project_from_csv_reader<R: Read>(reader: R) -> DevLoanResult<Project> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut units = Vec::new();
    for record in rdr.deserialize::<UnitRecord>() {
        let r = record?;
        let amount_min = parse_amount("amount_min", &r.amount_min, &r.id)?;
        let amount_max = parse_amount("amount_max", &r.amount_max, &r.id)?;
        units.push(ProjectUnit::new(
            r.id,
            r.project,
            r.category,
            r.name,
            r.description,
            amount_min,
            amount_max,
        )?);
    }
    debug!(units = units.len(), "Read project units");
    Project::new(units)
}

pub fn project_from_csv_path(path: impl AsRef<Path>) -> DevLoanResult<Project> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .map_err(|e| DevLoanError::Csv(format!("Failed to open '{}': {e}", path.display())))?;
    project_from_csv_reader(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    const CSV: &str = "\
id,project,category,name,description,amount_min,amount_max
1,Cabins,Site,Clearing,,5000,7500
2,Cabins,Build,Frame,Timber frame,40000,55000.5
3,Cabins,Site,Access road,Gravel,12000,12000
";

    #[test]
    fn test_project_from_csv() {
        let project = project_from_csv_reader(CSV.as_bytes()).unwrap();
        assert_eq!(project.name(), "Cabins");
        assert_eq!(project.categories(), &["Site".to_string(), "Build".to_string()]);
        assert_eq!(project.units().len(), 3);
        assert_eq!(project.units()[0].description, None);
        assert_eq!(project.units()[1].description.as_deref(), Some("Timber frame"));
    }

    #[test]
    fn test_totals() {
        let project = project_from_csv_reader(CSV.as_bytes()).unwrap();
        assert_eq!(
            project.category_total("Site"),
            ValueRange::new(dec!(17000), dec!(19500)).unwrap()
        );
        assert_eq!(
            project.total(),
            ValueRange::new(dec!(57000), dec!(74500.5)).unwrap()
        );
    }

    #[test]
    fn test_summary_lines() {
        let project = project_from_csv_reader(CSV.as_bytes()).unwrap();
        let lines = project.summary().lines();
        assert_eq!(
            lines,
            vec![
                "Project summary - Cabins:",
                "  Category summary - Site",
                "    - 1, Clearing, $5,000.0 - $7,500.0",
                "    - 3, Access road, $12,000.0",
                "    Subtotal: $17,000.0 - $19,500.0",
                "  Category summary - Build",
                "    - 2, Frame, $40,000.0 - $55,000.5",
                "    Subtotal: $40,000.0 - $55,000.5",
                "Total: $57,000.0 - $74,500.5",
            ]
        );
    }

    #[test]
    fn test_mixed_project_names_rejected() {
        let csv = "\
id,project,category,name,description,amount_min,amount_max
1,Cabins,Site,Clearing,,5000,7500
2,Barn,Build,Frame,,40000,55000
";
        let err = project_from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DevLoanError::InvalidProject(_)));
    }

    #[test]
    fn test_unordered_amount_rejected() {
        let err = ProjectUnit::new("1", "Cabins", "Site", "Clearing", None, dec!(10), dec!(5));
        assert!(err.is_err());
    }

    #[test]
    fn test_non_numeric_amount_rejected() {
        let csv = "\
id,project,category,name,description,amount_min,amount_max
1,Cabins,Site,Clearing,,lots,7500
";
        assert!(project_from_csv_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_empty_project_rejected() {
        assert!(Project::new(vec![]).is_err());
    }
}
