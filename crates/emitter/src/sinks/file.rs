//! FileSink - appends records as newline-delimited JSON

use std::path::{Path, PathBuf};

use contracts::{ContractError, LineageRecord, LineageSink};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error, instrument};

/// Sink that appends one JSON document per line
pub struct FileSink {
    name: String,
    path: PathBuf,
    /// Serializes concurrent appends
    file: Mutex<File>,
}

impl FileSink {
    /// Open (or create) the target file in append mode
    pub fn new(name: impl Into<String>, path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;

        Ok(Self {
            name: name.into(),
            path,
            file: Mutex::new(File::from_std(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, e: impl std::fmt::Display) -> ContractError {
        error!(sink = %self.name, path = %self.path.display(), error = %e, "Write failed");
        ContractError::sink_write(&self.name, e.to_string())
    }
}

impl LineageSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_emit",
        skip(self, record),
        fields(sink = %self.name, job = %record.job_name())
    )]
    async fn emit(&self, record: &LineageRecord) -> Result<(), ContractError> {
        let mut line = serde_json::to_vec(record)
            .map_err(|e| ContractError::serialization(record.job_name(), e))?;
        line.push(b'\n');

        let mut file = self.file.lock().await;
        file.write_all(&line).await.map_err(|e| self.write_error(e))?;
        file.flush().await.map_err(|e| self.write_error(e))?;
        Ok(())
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&self) -> Result<(), ContractError> {
        let mut file = self.file.lock().await;
        file.flush().await?;
        file.sync_all().await?;
        debug!(sink = %self.name, path = %self.path.display(), "FileSink closed");
        Ok(())
    }
}
