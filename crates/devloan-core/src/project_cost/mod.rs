pub mod project;

pub use project::{
    project_from_csv_path, project_from_csv_reader, CategorySummary, Project, ProjectCostSummary,
    ProjectUnit,
};
