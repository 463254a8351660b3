//! Replication worker: a thread with its own block caches.
//!
//! Block lookup caches are built per execution context, so registrations made
//! on the control thread are replayed here from captured snapshots. The
//! worker applies tasks one at a time, records in submission order.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::thread;
use std::time::Duration;

use registrar_core::{Namespace, RuntimeId};
use registrar_registry::BlockCaches;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::snapshot::{decode_block, CaptureRecord};

/// Errors surfaced to the submitter of replication work.
#[derive(Debug, Error)]
pub enum ReplicationError {
    /// The worker thread could not be started.
    #[error("failed to spawn replication worker: {0}")]
    Spawn(#[from] std::io::Error),
    /// The worker exited before answering.
    #[error("replication worker is no longer running")]
    WorkerGone,
    /// No answer arrived within the allotted time.
    #[error("timed out after {0:?} waiting for replication")]
    Timeout(Duration),
}

/// A batch of captured block registrations. Consumed on submission.
#[derive(Debug, Default)]
pub struct ReplicationTask {
    records: Vec<CaptureRecord>,
}

impl ReplicationTask {
    /// Wrap an ordered batch.
    pub fn new(records: Vec<CaptureRecord>) -> Self {
        Self { records }
    }

    /// Number of captured registrations.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A record the worker could not apply.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
    /// Position of the record in its batch.
    pub index: usize,
    /// Namespace the record targeted.
    pub namespace: Namespace,
    /// Why it failed.
    pub reason: String,
}

/// Outcome of one task.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReplicationReport {
    /// Records applied successfully.
    pub applied: usize,
    /// Records skipped, in batch order.
    pub failures: Vec<RecordFailure>,
}

impl ReplicationReport {
    /// Whether every record was applied.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Counters describing a worker's caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplicaStats {
    /// Blocks in the replica definition store.
    pub blocks: usize,
    /// Namespaces in the replica state dictionary.
    pub namespaces: usize,
    /// Tasks processed so far.
    pub tasks: usize,
}

/// Completion signal for a submitted task.
///
/// Dropping the handle is fire-and-forget; the task still runs.
#[derive(Debug)]
pub struct ReplicationHandle {
    rx: Receiver<ReplicationReport>,
    records: usize,
}

impl ReplicationHandle {
    /// Number of records submitted.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Block until the worker finishes the task.
    pub fn wait(self) -> Result<ReplicationReport, ReplicationError> {
        self.rx.recv().map_err(|_| ReplicationError::WorkerGone)
    }

    /// Block for at most `timeout`.
    pub fn wait_timeout(self, timeout: Duration) -> Result<ReplicationReport, ReplicationError> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => ReplicationError::Timeout(timeout),
            RecvTimeoutError::Disconnected => ReplicationError::WorkerGone,
        })
    }
}

enum WorkerMsg {
    Apply {
        task: ReplicationTask,
        done: SyncSender<ReplicationReport>,
    },
    Lookup {
        namespace: Namespace,
        reply: SyncSender<Option<RuntimeId>>,
    },
    Stats {
        reply: SyncSender<ReplicaStats>,
    },
}

/// Handle to a running replication worker thread.
///
/// Dropping it closes the queue and joins the thread after pending work
/// drains.
pub struct ReplicationWorker {
    tx: Option<SyncSender<WorkerMsg>>,
    join: Option<thread::JoinHandle<()>>,
    name: String,
}

impl ReplicationWorker {
    /// Start a worker named `name` with a queue of `queue_capacity` tasks.
    pub fn spawn(name: impl Into<String>, queue_capacity: usize) -> Result<Self, ReplicationError> {
        let name = name.into();
        let (tx, rx) = mpsc::sync_channel::<WorkerMsg>(queue_capacity.max(1));

        let thread_name = name.clone();
        let join = thread::Builder::new()
            .name(name.clone())
            .spawn(move || run_worker(&thread_name, rx))?;

        Ok(Self {
            tx: Some(tx),
            join: Some(join),
            name,
        })
    }

    /// Worker thread name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queue `task` for replay.
    ///
    /// If the worker is gone the returned handle reports
    /// [`ReplicationError::WorkerGone`] when awaited.
    pub fn submit(&self, task: ReplicationTask) -> ReplicationHandle {
        let (done, rx) = mpsc::sync_channel(1);
        let records = task.len();
        if self.send(WorkerMsg::Apply { task, done }).is_err() {
            warn!(worker = %self.name, records, "Replication worker unavailable; task dropped");
        }
        ReplicationHandle { rx, records }
    }

    /// Runtime id the replica has bound to `namespace`.
    pub fn lookup(&self, namespace: &Namespace) -> Result<Option<RuntimeId>, ReplicationError> {
        let (reply, rx) = mpsc::sync_channel(1);
        self.send(WorkerMsg::Lookup {
            namespace: namespace.clone(),
            reply,
        })?;
        rx.recv().map_err(|_| ReplicationError::WorkerGone)
    }

    /// Counters for the replica caches.
    pub fn stats(&self) -> Result<ReplicaStats, ReplicationError> {
        let (reply, rx) = mpsc::sync_channel(1);
        self.send(WorkerMsg::Stats { reply })?;
        rx.recv().map_err(|_| ReplicationError::WorkerGone)
    }

    /// Close the queue and wait for the thread to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn send(&self, msg: WorkerMsg) -> Result<(), ReplicationError> {
        let tx = self.tx.as_ref().ok_or(ReplicationError::WorkerGone)?;
        tx.send(msg).map_err(|_| ReplicationError::WorkerGone)
    }

    fn stop(&mut self) {
        self.tx.take();
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                warn!(worker = %self.name, "Replication worker panicked");
            }
        }
    }
}

impl Drop for ReplicationWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker(name: &str, rx: Receiver<WorkerMsg>) {
    info!(worker = name, "Replication worker started");
    let mut caches = BlockCaches::new();
    let mut tasks = 0usize;

    for msg in rx {
        match msg {
            WorkerMsg::Apply { task, done } => {
                let report = apply_task(&mut caches, task);
                tasks += 1;
                if !report.is_complete() {
                    warn!(
                        worker = name,
                        applied = report.applied,
                        failed = report.failures.len(),
                        "Replication task finished with failures"
                    );
                }
                // The submitter may have dropped its handle.
                let _ = done.send(report);
            }
            WorkerMsg::Lookup { namespace, reply } => {
                let _ = reply.send(caches.states.runtime_id(&namespace));
            }
            WorkerMsg::Stats { reply } => {
                let _ = reply.send(ReplicaStats {
                    blocks: caches.store.len(),
                    namespaces: caches.states.len(),
                    tasks,
                });
            }
        }
    }

    info!(worker = name, tasks, "Replication worker stopped");
}

/// Replay every record of `task` into `caches`, in order.
///
/// Failing records are skipped and reported; the rest still apply.
pub fn apply_task(caches: &mut BlockCaches, task: ReplicationTask) -> ReplicationReport {
    let mut report = ReplicationReport::default();

    for (index, record) in task.records.into_iter().enumerate() {
        let CaptureRecord {
            serialized_block,
            namespace,
            serialize,
            deserialize,
        } = record;

        let outcome = decode_block(&serialized_block)
            .map_err(|err| err.to_string())
            .and_then(|block| {
                caches
                    .apply(block, namespace.clone(), serialize, deserialize)
                    .map_err(|err| err.to_string())
            });

        match outcome {
            Ok(()) => {
                debug!(index, %namespace, "Replicated block");
                report.applied += 1;
            }
            Err(reason) => {
                warn!(index, %namespace, %reason, "Failed to replicate block");
                report.failures.push(RecordFailure {
                    index,
                    namespace,
                    reason,
                });
            }
        }
    }

    report
}
