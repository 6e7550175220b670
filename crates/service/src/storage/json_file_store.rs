use std::{
    io,
    path::PathBuf,
};

use async_trait::async_trait;
use models::Student;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, error, warn};

use super::StudentRepository;
use crate::errors::ServiceError;

/// JSON file-backed student collection.
///
/// The file holds one pretty-printed JSON array. Writes go to a sibling
/// `.tmp` file that is renamed over the target, so readers never observe a
/// truncated collection.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    file_path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into() }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .file_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "students.json".into());
        name.push(".tmp");
        self.file_path.with_file_name(name)
    }

    async fn write_atomic(&self, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let tmp_path = self.tmp_path();
        {
            let mut file = fs::File::create(&tmp_path).await?;
            file.write_all(bytes).await?;
            file.write_all(b"\n").await?;
            file.sync_all().await?;
        }
        if let Err(e) = fs::rename(&tmp_path, &self.file_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e);
        }
        Ok(())
    }
}

#[async_trait]
impl StudentRepository for JsonFileStore {
    async fn load(&self) -> Result<Vec<Student>, ServiceError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.file_path.display(), "students file missing; starting empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                error!(path = %self.file_path.display(), error = %e, "cannot read students file");
                return Err(ServiceError::Storage(format!(
                    "cannot read {}: {e}",
                    self.file_path.display()
                )));
            }
        };
        match serde_json::from_slice::<Vec<Student>>(&bytes) {
            Ok(students) => Ok(students),
            Err(e) => {
                warn!(path = %self.file_path.display(), error = %e, "students file is not a valid record list; treating as empty");
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, students: &[Student]) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(students)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        self.write_atomic(&data).await.map_err(|e| {
            error!(path = %self.file_path.display(), error = %e, "cannot write students file");
            ServiceError::Storage(format!("cannot write {}: {e}", self.file_path.display()))
        })?;
        debug!(path = %self.file_path.display(), count = students.len(), "students file saved");
        Ok(())
    }
}
