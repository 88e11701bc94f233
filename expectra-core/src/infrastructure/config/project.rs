// expectra-core/src/infrastructure/config/project.rs

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use walkdir::WalkDir;

use crate::domain::project::configuration::{DatasetConfig, Engine, ProjectConfig};
use crate::infrastructure::error::InfrastructureError;

const CONFIG_CANDIDATES: [&str; 2] = ["expectra.yaml", "expectra_project.yaml"];
const SUPPORTED_EXTENSIONS: [&str; 1] = ["csv"];

#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    // 1. Locate the main file
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project configuration");

    // 2. Base YAML
    let content = fs::read_to_string(&config_path)?;
    let mut config: ProjectConfig = serde_yaml::from_str(&content)?;

    // 3. Datasets found on disk (declared ones win on name clashes)
    if let Some(data_path) = config.data_path.clone() {
        let discovered = discover_datasets(project_dir, &data_path)?;
        merge_datasets(&mut config, discovered);
    }

    // 4. Environment overrides (EXPECTRA_ENGINE=datafusion expectra run)
    apply_env_overrides(&mut config)?;

    Ok(config)
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    for filename in CONFIG_CANDIDATES {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, CONFIG_CANDIDATES
    )))
}

/// Every CSV under `project_dir/data_path`, named after its file stem.
pub fn discover_datasets(
    project_dir: &Path,
    data_path: &str,
) -> Result<Vec<DatasetConfig>, InfrastructureError> {
    let data_dir = project_dir.join(data_path);
    if !data_dir.is_dir() {
        return Err(InfrastructureError::ConfigError(format!(
            "data-path {:?} is not a directory",
            data_dir
        )));
    }

    let mut datasets = Vec::new();
    for entry in WalkDir::new(&data_dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file()
            && let Some(ext) = path.extension().and_then(|s| s.to_str())
            && SUPPORTED_EXTENSIONS.contains(&ext)
            && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
        {
            let rel_path = path
                .strip_prefix(project_dir)
                .unwrap_or(path)
                .to_string_lossy()
                .to_string();
            datasets.push(DatasetConfig {
                name: derive_dataset_name(stem),
                path: rel_path,
            });
        }
    }

    info!(count = datasets.len(), "Datasets discovered");
    Ok(datasets)
}

/// Table name for a data file stem: `Orders-2024` -> `orders_2024`, `2024` -> `_2024`.
pub fn derive_dataset_name(stem: &str) -> String {
    let mut name: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if name.chars().next().is_none_or(|c| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

fn merge_datasets(config: &mut ProjectConfig, discovered: Vec<DatasetConfig>) {
    let mut seen: HashSet<String> = config.datasets.iter().map(|d| d.name.clone()).collect();
    for dataset in discovered {
        if seen.insert(dataset.name.clone()) {
            config.datasets.push(dataset);
        } else {
            warn!(name = %dataset.name, path = %dataset.path, "Discovered dataset shadowed by a declared one");
        }
    }
}

fn apply_env_overrides(config: &mut ProjectConfig) -> Result<(), InfrastructureError> {
    if let Ok(val) = std::env::var("EXPECTRA_ENGINE") {
        let engine: Engine = val.parse().map_err(InfrastructureError::ConfigError)?;
        info!(old = %config.engine, new = %engine, "Overriding engine via ENV");
        config.engine = engine;
    }
    if let Ok(val) = std::env::var("EXPECTRA_TARGET_PATH") {
        info!(old = ?config.target_path, new = ?val, "Overriding target path via ENV");
        config.target_path = val;
    }
    Ok(())
}
