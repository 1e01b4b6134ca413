use super::Config;
use crate::cef::CefEncoder;
use crate::consumer::{Consumer, ConsumerError, ConsumerExit, ConsumerProfile, RecordSerializer};
use crate::domain::{Offset, SyncError};
use crate::producer::{BatchCursor, NdjsonProducer, ProducerError, ProducerSettings};
use crate::reliability::FileCheckpointStore;
use crate::sender::SyslogTransport;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// Totals across every consumer that finished cleanly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupervisorReport {
    pub consumers: usize,
    pub batches: u64,
    pub records: u64,
}

impl SupervisorReport {
    fn absorb(&mut self, exit: ConsumerExit) {
        self.consumers += 1;
        self.batches += exit.batches;
        self.records += exit.records;
    }
}

type ConsumerOutcome = (ConsumerProfile, Result<ConsumerExit, ConsumerError>);
type ProducerOutcome = (String, Result<u64, ProducerError>);

/// Starts one producer/consumer pair per configured source and owns their
/// lifetimes.
///
/// Cancelling the token stops the producers; each consumer then drains what
/// is already queued and exits when its queue closes. The first consumer
/// failure cancels everything and is returned once all tasks have stopped.
pub struct Supervisor {
    config: Config,
    cancel: CancellationToken,
}

impl Supervisor {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run(self) -> Result<SupervisorReport, SyncError> {
        let mut consumers: JoinSet<ConsumerOutcome> = JoinSet::new();
        let mut producers: JoinSet<ProducerOutcome> = JoinSet::new();

        if let Err(e) = self.spawn_sources(&mut consumers, &mut producers).await {
            self.cancel.cancel();
            consumers.abort_all();
            producers.abort_all();
            return Err(e);
        }

        self.supervise(consumers, producers).await
    }

    async fn spawn_sources(
        &self,
        consumers: &mut JoinSet<ConsumerOutcome>,
        producers: &mut JoinSet<ProducerOutcome>,
    ) -> Result<(), SyncError> {
        let store = FileCheckpointStore::new(&self.config.checkpoint.directory).await?;
        let serializer = RecordSerializer::new(self.config.logs.format, CefEncoder::for_local_host());

        for source in &self.config.sources {
            let log_type = source.log_type;
            let profile = ConsumerProfile::new(log_type, source.account_id.clone())?;
            let resume_from = store
                .read(log_type, source.account_id.as_deref())
                .await?
                .unwrap_or(Offset::START);
            info!("{}: resuming from offset {}", profile, resume_from);

            let transport = SyslogTransport::connect(&self.config.transport).await?;
            let cursor = BatchCursor::new(log_type, resume_from);
            let (tx, rx) = mpsc::channel(self.config.logs.queue_capacity);

            let consumer = Consumer::new(
                profile.clone(),
                serializer.clone(),
                rx,
                transport,
                cursor.clone(),
                store.clone(),
            );
            let producer = NdjsonProducer::new(
                log_type,
                ProducerSettings {
                    path: source.path.clone(),
                    batch_size: self.config.logs.batch_size,
                    poll_interval: self.config.logs.poll_interval,
                },
                tx,
                cursor,
                resume_from,
            );

            let span = info_span!(
                "source",
                log_type = %log_type,
                account_id = source.account_id.as_deref().unwrap_or("")
            );
            let label = profile.to_string();
            let cancel = self.cancel.clone();
            producers.spawn(
                async move { (label, producer.run(cancel).await) }.instrument(span.clone()),
            );
            consumers.spawn(
                async move {
                    let outcome = consumer.run().await;
                    (profile, outcome)
                }
                .instrument(span),
            );
        }

        info!(
            "Started {} consumer(s) forwarding to {}",
            self.config.sources.len(),
            self.config.transport.address()
        );
        Ok(())
    }

    async fn supervise(
        &self,
        mut consumers: JoinSet<ConsumerOutcome>,
        mut producers: JoinSet<ProducerOutcome>,
    ) -> Result<SupervisorReport, SyncError> {
        let mut report = SupervisorReport::default();
        let mut failure: Option<SyncError> = None;

        while !consumers.is_empty() || !producers.is_empty() {
            tokio::select! {
                Some(joined) = consumers.join_next(), if !consumers.is_empty() => {
                    match Self::consumer_result(joined) {
                        Ok(exit) => report.absorb(exit),
                        Err(e) => {
                            error!("{}", e);
                            self.cancel.cancel();
                            failure.get_or_insert(e);
                        }
                    }
                }
                Some(joined) = producers.join_next(), if !producers.is_empty() => {
                    if let Err(e) = Self::producer_result(joined) {
                        error!("{}", e);
                        self.cancel.cancel();
                        failure.get_or_insert(e);
                    }
                }
                else => break,
            }
        }

        match failure {
            Some(e) => Err(e),
            None => {
                info!(
                    "All consumers stopped: {} batches, {} logs delivered",
                    report.batches, report.records
                );
                Ok(report)
            }
        }
    }

    fn consumer_result(
        joined: Result<ConsumerOutcome, JoinError>,
    ) -> Result<ConsumerExit, SyncError> {
        match joined {
            Ok((profile, Ok(exit))) => {
                debug!("{} consumer exited cleanly", profile);
                Ok(exit)
            }
            Ok((profile, Err(source))) => Err(SyncError::ConsumerFailed {
                log_type: profile.log_type(),
                account_id: profile.account_id().map(str::to_string),
                source,
            }),
            Err(e) => Err(SyncError::Task("consumer".to_string(), e.to_string())),
        }
    }

    /// A closed queue only happens after its consumer stopped on its own
    /// error, which the consumer branch reports. It is never the root cause.
    fn producer_result(joined: Result<ProducerOutcome, JoinError>) -> Result<(), SyncError> {
        match joined {
            Ok((label, Ok(enqueued))) => {
                debug!("{} producer finished after {} logs", label, enqueued);
                Ok(())
            }
            Ok((label, Err(ProducerError::QueueClosed(log_type)))) => {
                warn!("{} producer stopped: {} queue closed", label, log_type);
                Ok(())
            }
            Ok((_, Err(e))) => Err(e.into()),
            Err(e) => Err(SyncError::Task("producer".to_string(), e.to_string())),
        }
    }
}
