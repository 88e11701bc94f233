// expectra-core/src/infrastructure/config/mod.rs

pub mod project;

pub use crate::domain::project::ProjectConfig;
pub use project::{derive_dataset_name, discover_datasets, load_project_config};
