//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::{debug, warn};

/// Ensure the parent directory of the data file exists.
pub async fn ensure_data_dir(data_file: &Path) -> anyhow::Result<()> {
    let Some(dir) = data_file.parent().filter(|d| !d.as_os_str().is_empty()) else {
        debug!(path = %data_file.display(), "data file has no parent directory; using cwd");
        return Ok(());
    };
    if tokio::fs::metadata(dir).await.is_err() {
        warn!(dir = %dir.display(), "data directory not found; creating it");
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", dir.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_parent() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let file = tmp.path().join("nested/data/students.json");
        ensure_data_dir(&file).await?;
        assert!(tmp.path().join("nested/data").is_dir());
        Ok(())
    }

    #[tokio::test]
    async fn bare_file_name_is_ok() -> anyhow::Result<()> {
        ensure_data_dir(Path::new("students.json")).await?;
        Ok(())
    }
}
