//! Audit Sink: append-only record of every command attempt (spec §4.6).
//!
//! Writes are offloaded to a dedicated task over a small bounded channel so
//! a slow downstream sink never blocks command completion. On overflow the
//! command's true result is still returned to the client; only the audit
//! record for that attempt is marked `Internal` (degraded) and the drop is
//! logged at `warn`.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::model::AuditRecord;

const QUEUE_CAPACITY: usize = 256;

/// The append-only destination. The default `LoggingSink` just logs via
/// `tracing`; a real deployment would plug in a file or remote sink here —
/// that plumbing is out of scope (spec §1), so only the trait boundary and
/// a structured-logging default are provided.
#[async_trait]
pub trait AuditDestination: Send + Sync {
    async fn write(&self, record: AuditRecord);
}

pub struct LoggingSink;

#[async_trait]
impl AuditDestination for LoggingSink {
    async fn write(&self, record: AuditRecord) {
        tracing::info!(
            radio_id = %record.radio_id,
            action = %record.action,
            outcome = ?record.outcome,
            latency_ms = record.latency_ms,
            user = %record.user,
            "audit"
        );
    }
}

pub struct AuditSink {
    tx: mpsc::Sender<AuditRecord>,
}

impl AuditSink {
    pub fn new(destination: Arc<dyn AuditDestination>) -> Self {
        let (tx, mut rx) = mpsc::channel::<AuditRecord>(QUEUE_CAPACITY);
        tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                destination.write(record).await;
            }
        });
        Self { tx }
    }

    /// Append `record`, degrading its outcome to `Internal` and logging a
    /// warning if the bounded queue is full rather than blocking the caller.
    pub fn append(&self, mut record: AuditRecord) {
        match self.tx.try_send(record.clone()) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(
                    radio_id = %record.radio_id,
                    action = %record.action,
                    "audit queue full, degrading outcome to INTERNAL for this record"
                );
                record.outcome = crate::model::Outcome::Internal;
                // Best-effort: if even this degraded send can't land
                // immediately, the record is dropped (spec §9: audit
                // durability is best-effort with bounded loss on crash).
                let _ = self.tx.try_send(record);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::error!("audit sink writer task is gone; dropping record");
            }
        }
    }
}
