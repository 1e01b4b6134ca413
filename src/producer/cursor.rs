use crate::consumer::OffsetResolver;
use crate::domain::{LogRecord, LogType, Offset, event_time_millis};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug)]
struct CursorState {
    committed: Offset,
    pending: VecDeque<Offset>,
}

/// Offset bookkeeping shared by one producer and its consumer.
///
/// The producer records where each batch ends as it enqueues it; the consumer
/// resolves exactly once per batch, in the same order, so the front of the
/// pending queue always belongs to the batch being checkpointed.
#[derive(Debug, Clone)]
pub struct BatchCursor {
    log_type: LogType,
    state: Arc<Mutex<CursorState>>,
}

impl BatchCursor {
    pub fn new(log_type: LogType, start: Offset) -> Self {
        Self {
            log_type,
            state: Arc::new(Mutex::new(CursorState {
                committed: start,
                pending: VecDeque::new(),
            })),
        }
    }

    /// Event time of `record` as an offset, if it carries one.
    pub fn record_offset(&self, record: &LogRecord) -> Option<Offset> {
        record
            .lookup(self.log_type.timestamp_path())
            .value()
            .and_then(event_time_millis)
            .map(Offset::from_millis)
    }

    /// Offset just past the newest record of `batch`, or `fallback` when no
    /// record carries an event time.
    pub fn batch_end(&self, batch: &[LogRecord], fallback: Offset) -> Offset {
        batch
            .iter()
            .filter_map(|record| self.record_offset(record))
            .max()
            .map(|newest| newest.successor().max(fallback))
            .unwrap_or(fallback)
    }

    pub fn push_batch_end(&self, end: Offset) {
        self.state.lock().pending.push_back(end);
    }

    pub fn committed(&self) -> Offset {
        self.state.lock().committed
    }

    pub fn pending_batches(&self) -> usize {
        self.state.lock().pending.len()
    }
}

impl OffsetResolver for BatchCursor {
    fn resumable_offset(
        &self,
        last_attempted: Option<&LogRecord>,
        unattempted: &[LogRecord],
    ) -> Offset {
        let failed_at = last_attempted.and_then(|record| self.record_offset(record));
        // Input is not guaranteed to be time-ordered, so a record after the
        // failing one may be older than it.
        let oldest_unattempted = unattempted
            .iter()
            .filter_map(|record| self.record_offset(record))
            .min();

        let mut state = self.state.lock();
        let batch_end = state.pending.pop_front();

        match last_attempted {
            None => {
                if let Some(end) = batch_end {
                    state.committed = state.committed.max(end);
                }
            }
            Some(_) => {
                // A failing record without an event time resumes from the last
                // good offset.
                let resume = failed_at.unwrap_or(state.committed);
                state.committed = oldest_unattempted.map_or(resume, |oldest| oldest.min(resume));
            }
        }
        state.committed
    }
}
