#![allow(dead_code)]

use duo_log_sync::consumer::OffsetResolver;
use duo_log_sync::domain::{LogRecord, LogType, Offset};
use duo_log_sync::reliability::{CheckpointError, CheckpointStore};
use duo_log_sync::sender::{Transport, TransportError};
use parking_lot::Mutex;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// In-memory transport that fails the n-th `write` call (0-based) when told to.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    pub delivered: Arc<Mutex<Vec<Vec<u8>>>>,
    pending: Vec<Vec<u8>>,
    writes: usize,
    fail_write_at: Option<usize>,
    fail_drain_at: Option<usize>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_write_at(index: usize) -> Self {
        Self {
            fail_write_at: Some(index),
            ..Self::default()
        }
    }

    pub fn failing_drain_at(index: usize) -> Self {
        Self {
            fail_drain_at: Some(index),
            ..Self::default()
        }
    }

    pub fn delivered_lines(&self) -> Vec<String> {
        self.delivered
            .lock()
            .iter()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .collect()
    }
}

impl Transport for ScriptedTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let call = self.writes;
        self.writes += 1;
        if self.fail_write_at == Some(call) {
            return Err(TransportError::Closed);
        }
        self.pending.push(bytes.to_vec());
        Ok(())
    }

    async fn drain(&mut self) -> Result<(), TransportError> {
        if self.fail_drain_at.is_some() && self.fail_drain_at == self.writes.checked_sub(1) {
            self.pending.clear();
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "peer went away",
            )));
        }
        self.delivered.lock().append(&mut self.pending);
        Ok(())
    }
}

/// Checkpoint store that remembers every write.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub writes: Arc<Mutex<Vec<(LogType, Option<String>, Offset)>>>,
    fail: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn offsets(&self) -> Vec<Offset> {
        self.writes.lock().iter().map(|(_, _, o)| *o).collect()
    }
}

impl CheckpointStore for MemoryStore {
    async fn write(
        &self,
        log_type: LogType,
        account_id: Option<&str>,
        offset: Offset,
    ) -> Result<(), CheckpointError> {
        if self.fail {
            return Err(CheckpointError::Io {
                path: PathBuf::from("/nonexistent/checkpoint"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.writes
            .lock()
            .push((log_type, account_id.map(str::to_string), offset));
        Ok(())
    }
}

/// Resolver that records the marker and unattempted count it was handed and derives the offset from
/// the record's `seq` field (or 1000 for a full batch).
#[derive(Clone, Default)]
pub struct RecordingResolver {
    pub markers: Arc<Mutex<Vec<Option<Value>>>>,
    pub unattempted: Arc<Mutex<Vec<usize>>>,
}

impl OffsetResolver for RecordingResolver {
    fn resumable_offset(
        &self,
        last_attempted: Option<&LogRecord>,
        unattempted: &[LogRecord],
    ) -> Offset {
        self.unattempted.lock().push(unattempted.len());
        self.markers
            .lock()
            .push(last_attempted.map(|r| r.as_value().clone()));
        match last_attempted.and_then(|r| r.lookup(&["seq"]).value().and_then(Value::as_i64)) {
            Some(seq) => Offset::from_millis(seq),
            None => Offset::from_millis(1000),
        }
    }
}

pub fn record(seq: i64) -> LogRecord {
    LogRecord::new(serde_json::json!({ "seq": seq, "timestamp": 1_690_000_000 + seq }))
}
