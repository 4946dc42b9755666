//! Archive task queue
//!
//! Every archive is known up front, so the queue is seeded once and then
//! closed. Workers drain it until the channel reports disconnection.

use crate::error::WorkerError;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::path::PathBuf;

/// A single archive to extract
#[derive(Debug, Clone)]
pub struct ArchiveTask {
    /// Path to the archive
    pub path: PathBuf,
}

impl ArchiveTask {
    /// Create a new archive task
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

/// Fan-out queue of archive tasks
pub struct ArchiveQueue {
    /// Sender, dropped on close so workers see disconnection
    sender: Option<Sender<ArchiveTask>>,

    /// Receiver shared by all workers
    receiver: Receiver<ArchiveTask>,
}

impl ArchiveQueue {
    /// Create a queue able to hold `capacity` tasks without blocking
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));

        Self {
            sender: Some(sender),
            receiver,
        }
    }

    /// Enqueue every archive
    pub fn seed(&self, archives: &[PathBuf]) -> Result<(), WorkerError> {
        let sender = self.sender.as_ref().ok_or(WorkerError::QueueSendFailed)?;

        for path in archives {
            sender
                .send(ArchiveTask::new(path.clone()))
                .map_err(|_| WorkerError::QueueSendFailed)?;
        }

        Ok(())
    }

    /// Stop accepting tasks; workers exit once the queue drains
    pub fn close(&mut self) {
        self.sender = None;
    }

    /// Get a receiver for this queue (clone for each worker)
    pub fn receiver(&self) -> ArchiveQueueReceiver {
        ArchiveQueueReceiver {
            receiver: self.receiver.clone(),
        }
    }
}

/// Worker side of the archive queue
#[derive(Clone)]
pub struct ArchiveQueueReceiver {
    receiver: Receiver<ArchiveTask>,
}

impl ArchiveQueueReceiver {
    /// Block for the next task; `None` once the queue is closed and drained
    pub fn recv(&self) -> Option<ArchiveTask> {
        self.receiver.recv().ok()
    }
}
