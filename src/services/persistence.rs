//! Ordered, non-blocking persistence of timer writes

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::KeyValueStore;

/// A single store mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Set { key: &'static str, value: String },
    Remove { key: &'static str },
}

impl WriteOp {
    pub fn set(key: &'static str, value: impl Into<String>) -> Self {
        Self::Set {
            key,
            value: value.into(),
        }
    }

    pub fn remove(key: &'static str) -> Self {
        Self::Remove { key }
    }

    pub fn key(&self) -> &'static str {
        match self {
            WriteOp::Set { key, .. } | WriteOp::Remove { key } => key,
        }
    }
}

enum Command {
    Write(WriteOp),
    Flush(oneshot::Sender<()>),
}

/// Queue feeding a single writer task.
///
/// Callers enqueue without waiting; the writer applies operations strictly
/// in submission order, so two writes to the same key can never land out of
/// order. Failed writes are logged and skipped.
#[derive(Debug, Clone)]
pub struct PersistenceQueue {
    tx: mpsc::UnboundedSender<Command>,
}

impl PersistenceQueue {
    /// Spawn the writer task. It exits once every queue handle is dropped
    /// and the pending writes have been applied.
    pub fn spawn(store: Arc<dyn KeyValueStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(writer_task(store, rx));
        Self { tx }
    }

    pub fn enqueue(&self, op: WriteOp) {
        if self.tx.send(Command::Write(op)).is_err() {
            warn!("Persistence writer has stopped, dropping write");
        }
    }

    pub fn enqueue_all(&self, ops: impl IntoIterator<Item = WriteOp>) {
        for op in ops {
            self.enqueue(op);
        }
    }

    /// Wait until every write enqueued before this call has been attempted
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(done_tx)).is_err() {
            return;
        }
        let _ = done_rx.await;
    }
}

async fn writer_task(store: Arc<dyn KeyValueStore>, mut rx: mpsc::UnboundedReceiver<Command>) {
    debug!("Starting persistence writer");

    while let Some(command) = rx.recv().await {
        match command {
            Command::Write(op) => {
                let result = match &op {
                    WriteOp::Set { key, value } => store.set(key, value).await,
                    WriteOp::Remove { key } => store.remove(key).await,
                };
                match result {
                    Ok(()) => debug!("Persisted {:?}", op),
                    Err(e) => warn!("Failed to persist `{}`: {}", op.key(), e),
                }
            }
            Command::Flush(done) => {
                let _ = done.send(());
            }
        }
    }

    debug!("Persistence writer stopped");
}
