use crate::domain::{LogType, Offset};
use std::future::Future;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

const CHECKPOINT_SUFFIX: &str = "checkpoint_data";

#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Corrupt checkpoint {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable key-value target for delivery progress.
///
/// `write` overwrites the previous offset for the (log type, account) pair and
/// must not return until the new value would survive a crash.
pub trait CheckpointStore: Send + Sync {
    fn write(
        &self,
        log_type: LogType,
        account_id: Option<&str>,
        offset: Offset,
    ) -> impl Future<Output = Result<(), CheckpointError>> + Send;
}

/// One small JSON file per (log type, account) under a directory.
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    directory: PathBuf,
}

impl FileCheckpointStore {
    pub async fn new(directory: impl Into<PathBuf>) -> Result<Self, CheckpointError> {
        let directory = directory.into();
        fs::create_dir_all(&directory)
            .await
            .map_err(|source| CheckpointError::Io {
                path: directory.clone(),
                source,
            })?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn checkpoint_path(&self, log_type: LogType, account_id: Option<&str>) -> PathBuf {
        let file_name = match account_id {
            Some(account) => format!(
                "{}_{CHECKPOINT_SUFFIX}_{}.txt",
                log_type.as_str(),
                sanitize(account)
            ),
            None => format!("{}_{CHECKPOINT_SUFFIX}.txt", log_type.as_str()),
        };
        self.directory.join(file_name)
    }

    /// Last persisted offset, or `None` when the stream has never checkpointed.
    pub async fn read(
        &self,
        log_type: LogType,
        account_id: Option<&str>,
    ) -> Result<Option<Offset>, CheckpointError> {
        let path = self.checkpoint_path(log_type, account_id);
        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CheckpointError::Io { path, source }),
        };

        serde_json::from_slice(&content)
            .map(Some)
            .map_err(|source| CheckpointError::Corrupt { path, source })
    }
}

impl CheckpointStore for FileCheckpointStore {
    async fn write(
        &self,
        log_type: LogType,
        account_id: Option<&str>,
        offset: Offset,
    ) -> Result<(), CheckpointError> {
        let path = self.checkpoint_path(log_type, account_id);
        let tmp_path = path.with_extension("txt.tmp");
        let data = serde_json::to_vec(&offset)?;

        let mut file = fs::File::create(&tmp_path).await.map_err(io_err(&tmp_path))?;
        file.write_all(&data).await.map_err(io_err(&tmp_path))?;
        file.sync_all().await.map_err(io_err(&tmp_path))?;
        drop(file);

        fs::rename(&tmp_path, &path).await.map_err(io_err(&path))?;

        // Persist the rename itself.
        #[cfg(unix)]
        {
            let dir = fs::File::open(&self.directory)
                .await
                .map_err(io_err(&self.directory))?;
            dir.sync_all().await.map_err(io_err(&self.directory))?;
        }

        tracing::debug!(
            log_type = %log_type,
            account_id = account_id.unwrap_or(""),
            "Checkpointed offset {} to {}",
            offset,
            path.display()
        );
        Ok(())
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> CheckpointError + use<> {
    let path = path.to_path_buf();
    move |source| CheckpointError::Io { path, source }
}

fn sanitize(account_id: &str) -> String {
    account_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
