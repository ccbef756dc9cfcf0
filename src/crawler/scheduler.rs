//! Scheduler for the mirror frontier and the concurrency budget
//!
//! This module handles:
//! - The frontier queue of claimed resources waiting to be fetched
//! - Global concurrency limiting via a semaphore
//! - Completion detection through an in-flight counter
//!
//! A task counts as pending from the moment it is pushed until the worker that
//! processed it drops its [`ScheduledFetch`], which happens after the worker
//! has pushed every child it discovered. The run is finished exactly when the
//! counter returns to zero.

use crate::state::ResourceTask;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify, OwnedSemaphorePermit, Semaphore};

/// Producer side of the frontier, shared with every worker
#[derive(Debug)]
pub struct Frontier {
    sender: mpsc::UnboundedSender<ResourceTask>,
    pending: AtomicUsize,
    idle: Notify,
}

impl Frontier {
    /// Queues a claimed resource
    ///
    /// Returns false if the scheduler has already shut down.
    pub fn push(&self, task: ResourceTask) -> bool {
        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.sender.send(task).is_err() {
            self.finish_one();
            return false;
        }
        true
    }

    /// Number of resources queued or being processed
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    fn finish_one(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_one();
        }
    }
}

/// Marks one resource as done when dropped
#[derive(Debug)]
struct PendingGuard {
    frontier: Arc<Frontier>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.frontier.finish_one();
    }
}

/// A resource ready to fetch together with its concurrency permit
///
/// Dropping it releases the permit and marks the resource as done, including
/// when the worker fails or panics.
#[derive(Debug)]
pub struct ScheduledFetch {
    /// The resource to fetch
    pub task: ResourceTask,

    /// The semaphore permit for this fetch
    pub _permit: OwnedSemaphorePermit,

    _pending: PendingGuard,
}

/// Scheduler hands out frontier entries within the concurrency budget
pub struct Scheduler {
    /// Global semaphore for limiting concurrent fetches
    semaphore: Arc<Semaphore>,

    /// Consumer side of the frontier queue
    receiver: mpsc::UnboundedReceiver<ResourceTask>,

    /// Shared producer side and in-flight counter
    frontier: Arc<Frontier>,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `max_concurrent` - Maximum number of fetches in flight at once
    ///
    /// # Returns
    ///
    /// The scheduler and the frontier handle workers push discoveries into
    pub fn new(max_concurrent: usize) -> (Self, Arc<Frontier>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let frontier = Arc::new(Frontier {
            sender,
            pending: AtomicUsize::new(0),
            idle: Notify::new(),
        });

        let scheduler = Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            receiver,
            frontier: Arc::clone(&frontier),
        };

        (scheduler, frontier)
    }

    /// Gets the next resource to fetch
    ///
    /// This method:
    /// 1. Acquires a concurrency permit (waits while the budget is spent)
    /// 2. Takes the next queued resource, waiting for one if work is in flight
    /// 3. Returns None once nothing is queued and nothing is in flight
    ///
    /// # Returns
    ///
    /// * `Some(ScheduledFetch)` - A resource that's ready to fetch
    /// * `None` - The run is complete
    pub async fn next(&mut self) -> Option<ScheduledFetch> {
        let permit = Arc::clone(&self.semaphore).acquire_owned().await.ok()?;

        loop {
            if let Ok(task) = self.receiver.try_recv() {
                return Some(self.schedule(task, permit));
            }

            if self.frontier.pending() == 0 {
                tracing::debug!("Frontier is empty and no fetch is in flight");
                return None;
            }

            tokio::select! {
                task = self.receiver.recv() => {
                    return task.map(|task| self.schedule(task, permit));
                }
                _ = self.frontier.idle.notified() => {}
            }
        }
    }

    /// Returns the number of resources queued or in flight
    pub fn pending(&self) -> usize {
        self.frontier.pending()
    }

    /// Returns the number of permits currently free
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    fn schedule(&self, task: ResourceTask, permit: OwnedSemaphorePermit) -> ScheduledFetch {
        tracing::trace!("Scheduling {} at depth {}", task.url, task.depth);
        ScheduledFetch {
            task,
            _permit: permit,
            _pending: PendingGuard {
                frontier: Arc::clone(&self.frontier),
            },
        }
    }
}
