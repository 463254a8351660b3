#![warn(missing_docs)]
//! Replays captured block registrations into a worker thread's caches.

mod snapshot;
mod worker;

pub use snapshot::{decode_block, encode_block, CaptureRecord, SnapshotError, SNAPSHOT_MAGIC};
pub use worker::{
    apply_task, RecordFailure, ReplicaStats, ReplicationError, ReplicationHandle,
    ReplicationReport, ReplicationTask, ReplicationWorker,
};
