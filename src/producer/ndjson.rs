use super::cursor::BatchCursor;
use crate::consumer::LogBatch;
use crate::domain::{LogRecord, LogType, Offset};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} queue closed by consumer")]
    QueueClosed(LogType),
}

#[derive(Debug, Clone)]
pub struct ProducerSettings {
    pub path: PathBuf,
    pub batch_size: usize,
    pub poll_interval: Duration,
}

/// Follows a newline-delimited JSON file and feeds its records, in batches,
/// to one consumer queue.
///
/// Records older than the resume offset are skipped. Only complete
/// (newline-terminated) lines are consumed; a trailing partial line is held
/// back until the rest of it is appended.
pub struct NdjsonProducer {
    log_type: LogType,
    settings: ProducerSettings,
    queue: mpsc::Sender<LogBatch>,
    cursor: BatchCursor,
    resume_from: Offset,
}

impl NdjsonProducer {
    pub fn new(
        log_type: LogType,
        settings: ProducerSettings,
        queue: mpsc::Sender<LogBatch>,
        cursor: BatchCursor,
        resume_from: Offset,
    ) -> Self {
        Self {
            log_type,
            settings,
            queue,
            cursor,
            resume_from,
        }
    }

    /// Read until cancelled. Returns the number of records enqueued.
    pub async fn run(self, cancel: CancellationToken) -> Result<u64, ProducerError> {
        let path = self.settings.path.clone();
        let file = File::open(&path)
            .await
            .map_err(|source| ProducerError::Open {
                path: path.clone(),
                source,
            })?;

        info!(
            "{} producer: reading {} from offset {}",
            self.log_type,
            path.display(),
            self.resume_from
        );

        let mut reader = BufReader::new(file);
        let mut line = String::new();
        let mut line_number = 0u64;
        let mut batch: LogBatch = Vec::with_capacity(self.settings.batch_size);
        let mut last_end = self.resume_from;
        let mut enqueued = 0u64;

        while !cancel.is_cancelled() {
            reader
                .read_line(&mut line)
                .await
                .map_err(|source| ProducerError::Read {
                    path: path.clone(),
                    source,
                })?;

            if !line.ends_with('\n') {
                // End of file for now, possibly mid-line.
                if !batch.is_empty() {
                    enqueued += self.enqueue(&mut batch, &mut last_end).await?;
                }
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(self.settings.poll_interval) => continue,
                }
            }

            line_number += 1;
            if let Some(record) = self.parse_line(&line, line_number) {
                batch.push(record);
                if batch.len() >= self.settings.batch_size {
                    enqueued += self.enqueue(&mut batch, &mut last_end).await?;
                }
            }
            line.clear();
        }

        if !batch.is_empty() {
            enqueued += self.enqueue(&mut batch, &mut last_end).await?;
        }
        info!(
            "{} producer: stopped after enqueuing {} logs",
            self.log_type, enqueued
        );
        Ok(enqueued)
    }

    fn parse_line(&self, line: &str, line_number: u64) -> Option<LogRecord> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        let record = match LogRecord::from_json(trimmed) {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    "{} producer: skipping unparseable line {}: {}",
                    self.log_type, line_number, e
                );
                return None;
            }
        };

        match self.cursor.record_offset(&record) {
            Some(at) if at < self.resume_from => {
                debug!(
                    "{} producer: skipping line {} already delivered",
                    self.log_type, line_number
                );
                None
            }
            _ => Some(record),
        }
    }

    async fn enqueue(
        &self,
        batch: &mut LogBatch,
        last_end: &mut Offset,
    ) -> Result<u64, ProducerError> {
        let records = std::mem::replace(batch, Vec::with_capacity(self.settings.batch_size));
        let count = records.len() as u64;

        let end = self.cursor.batch_end(&records, *last_end);
        *last_end = end;
        self.cursor.push_batch_end(end);

        debug!(
            "{} producer: enqueuing {} logs ending at offset {}",
            self.log_type, count, end
        );
        self.queue
            .send(records)
            .await
            .map_err(|_| ProducerError::QueueClosed(self.log_type))?;
        Ok(count)
    }
}
