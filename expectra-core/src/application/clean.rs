// expectra-core/src/application/clean.rs

use std::fs;
use std::path::{Component, Path};
use tracing::info;

use crate::error::ExpectraError;
use crate::infrastructure::config::load_project_config;
use crate::infrastructure::error::InfrastructureError;

/// Removes the project's `target-path`. Returns whether anything was deleted.
pub fn clean_project(project_dir: &Path) -> Result<bool, ExpectraError> {
    info!("Initializing cleanup sequence...");

    let config = load_project_config(project_dir)?;
    let target_rel_path = config.target_path;

    // Path traversal guard: the target must stay inside the project
    let escapes = Path::new(&target_rel_path).components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes || target_rel_path.trim().is_empty() {
        return Err(ExpectraError::UnsafePath(target_rel_path));
    }

    let full_path = project_dir.join(&target_rel_path);
    if !full_path.exists() {
        return Ok(false);
    }

    if full_path.is_dir() {
        fs::remove_dir_all(&full_path).map_err(InfrastructureError::Io)?;
    } else {
        fs::remove_file(&full_path).map_err(InfrastructureError::Io)?;
    }
    info!(path = %target_rel_path, "Artifact removed");
    Ok(true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    fn write_project(dir: &Path, target: &str) -> Result<()> {
        fs::write(
            dir.join("expectra.yaml"),
            format!("name: demo\nversion: \"1.0\"\ntarget-path: {}\n", target),
        )?;
        Ok(())
    }

    #[test]
    fn test_clean_removes_target() -> Result<()> {
        let dir = tempdir()?;
        write_project(dir.path(), "target")?;
        fs::create_dir_all(dir.path().join("target"))?;
        fs::write(dir.path().join("target/validation_results.json"), "{}")?;

        assert!(clean_project(dir.path())?);
        assert!(!dir.path().join("target").exists());
        assert!(!clean_project(dir.path())?);
        Ok(())
    }

    #[test]
    fn test_clean_rejects_traversal() -> Result<()> {
        let dir = tempdir()?;
        write_project(dir.path(), "../outside")?;
        let res = clean_project(dir.path());
        assert!(matches!(res, Err(ExpectraError::UnsafePath(_))));
        Ok(())
    }
}
