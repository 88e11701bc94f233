// expectra-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Writes `content` through a temporary file renamed into place, so readers
/// never observe a half-written result file.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or_else(|| Path::new("."));

    // Same directory as the target so the rename stays on one filesystem
    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_ref())?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Pretty-printed JSON, written atomically. Creates missing parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), InfrastructureError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(value)?;
    atomic_write(path, content)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_overwrites_existing() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("results.json");

        atomic_write(&file_path, "Initial")?;
        atomic_write(&file_path, "Updated")?;

        assert_eq!(fs::read_to_string(file_path)?, "Updated");
        Ok(())
    }

    #[test]
    fn test_write_json_creates_parents() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("target").join("nested").join("results.json");

        write_json(&file_path, &serde_json::json!({"success": true}))?;

        let parsed: serde_json::Value = serde_json::from_str(&fs::read_to_string(file_path)?)?;
        assert_eq!(parsed["success"], true);
        Ok(())
    }
}
