use super::profile::ConsumerProfile;
use super::serializer::RecordSerializer;
use crate::domain::{LogRecord, Offset};
use crate::reliability::{CheckpointError, CheckpointStore};
use crate::sender::{Transport, TransportError};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Ordered group of records handed over by a producer in one queue slot.
pub type LogBatch = Vec<LogRecord>;

#[derive(Error, Debug)]
pub enum ConsumerError {
    #[error("Failed to write record {index} of batch to transport: {source}")]
    Transport {
        index: usize,
        #[source]
        source: TransportError,
    },
    #[error("Failed to persist checkpoint: {0}")]
    Checkpoint(#[from] CheckpointError),
}

/// Translates delivery progress into a durable resume offset.
///
/// Called once per batch. `None` means every record of the batch was
/// delivered; `Some(record)` is the record whose write failed, and the
/// returned offset must not be past it. `unattempted` holds the records that
/// followed it in the batch and were never written; the offset must not be
/// past any of them either.
pub trait OffsetResolver: Send + Sync {
    fn resumable_offset(
        &self,
        last_attempted: Option<&LogRecord>,
        unattempted: &[LogRecord],
    ) -> Offset;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    WaitingForBatch,
    Writing,
    Checkpointing,
    Fatal,
    Stopped,
}

/// Summary of one processed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub records_written: usize,
    pub offset: Offset,
}

/// Totals reported when a consumer stops because its queue was closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerExit {
    pub batches: u64,
    pub records: u64,
}

struct WriteOutcome {
    written: usize,
    failure: Option<(usize, TransportError)>,
}

/// Drains one queue of batches into a transport, checkpointing after each.
///
/// A write or drain failure stops the batch at the failing record, persists
/// an offset that still covers that record and then ends the consumer with
/// an error. There is no retry; recovery is a restart from the checkpoint.
pub struct Consumer<T, R, C> {
    profile: ConsumerProfile,
    serializer: RecordSerializer,
    queue: mpsc::Receiver<LogBatch>,
    transport: T,
    resolver: R,
    checkpoints: C,
    state: ConsumerState,
    totals: ConsumerExit,
}

impl<T, R, C> Consumer<T, R, C>
where
    T: Transport,
    R: OffsetResolver,
    C: CheckpointStore,
{
    pub fn new(
        profile: ConsumerProfile,
        serializer: RecordSerializer,
        queue: mpsc::Receiver<LogBatch>,
        transport: T,
        resolver: R,
        checkpoints: C,
    ) -> Self {
        Self {
            profile,
            serializer,
            queue,
            transport,
            resolver,
            checkpoints,
            state: ConsumerState::WaitingForBatch,
            totals: ConsumerExit::default(),
        }
    }

    pub fn profile(&self) -> &ConsumerProfile {
        &self.profile
    }

    pub fn state(&self) -> ConsumerState {
        self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run until the queue closes (clean exit) or delivery fails (error).
    pub async fn run(mut self) -> Result<ConsumerExit, ConsumerError> {
        loop {
            self.state = ConsumerState::WaitingForBatch;
            info!("{} consumer: waiting for logs from producer", self.profile);

            let Some(batch) = self.queue.recv().await else {
                self.state = ConsumerState::Stopped;
                info!(
                    "{} consumer: queue closed after {} batches ({} logs)",
                    self.profile, self.totals.batches, self.totals.records
                );
                return Ok(self.totals);
            };

            self.process_batch(batch).await?;
        }
    }

    /// Write one batch, then checkpoint whatever progress it made.
    pub async fn process_batch(&mut self, batch: LogBatch) -> Result<BatchReport, ConsumerError> {
        info!(
            "{} consumer: received {} logs from producer",
            self.profile,
            batch.len()
        );

        self.state = ConsumerState::Writing;
        let outcome = self.write_batch(&batch).await;

        self.state = ConsumerState::Checkpointing;
        let (last_attempted, unattempted) = match &outcome.failure {
            Some((index, _)) => (Some(&batch[*index]), &batch[index + 1..]),
            None => (None, &batch[batch.len()..]),
        };
        if last_attempted.is_none() {
            info!("{} consumer: successfully wrote all logs", self.profile);
        } else {
            warn!(
                "{} consumer: failed to write some logs ({} of {} written)",
                self.profile,
                outcome.written,
                batch.len()
            );
        }

        let offset = self.resolver.resumable_offset(last_attempted, unattempted);
        info!(
            "{} consumer: saving latest log offset {} to checkpoint",
            self.profile, offset
        );
        let checkpointed = self
            .checkpoints
            .write(self.profile.log_type(), self.profile.account_id(), offset)
            .await;

        self.totals.batches += 1;
        self.totals.records += outcome.written as u64;

        if let Some((index, source)) = outcome.failure {
            self.state = ConsumerState::Fatal;
            error!("Failed to write data to transport: {}", source);
            if let Err(e) = checkpointed {
                error!("{} consumer: checkpoint after failed write also failed: {}", self.profile, e);
                return Err(ConsumerError::Checkpoint(e));
            }
            return Err(ConsumerError::Transport { index, source });
        }

        if let Err(e) = checkpointed {
            self.state = ConsumerState::Fatal;
            error!("{} consumer: failed to persist checkpoint: {}", self.profile, e);
            return Err(ConsumerError::Checkpoint(e));
        }

        Ok(BatchReport {
            records_written: outcome.written,
            offset,
        })
    }

    async fn write_batch(&mut self, batch: &[LogRecord]) -> WriteOutcome {
        info!("{} consumer: writing logs", self.profile);

        for (index, record) in batch.iter().enumerate() {
            let bytes = self.serializer.serialize(record, self.profile.table());

            if let Err(e) = self.transport.write(&bytes) {
                return WriteOutcome {
                    written: index,
                    failure: Some((index, e)),
                };
            }
            if let Err(e) = self.transport.drain().await {
                return WriteOutcome {
                    written: index,
                    failure: Some((index, e)),
                };
            }
            debug!("{} consumer: wrote log {} ({} bytes)", self.profile, index, bytes.len());
        }

        WriteOutcome {
            written: batch.len(),
            failure: None,
        }
    }
}
