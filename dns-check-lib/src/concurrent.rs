//! Concurrent processing utilities for resolver probing.
//!
//! This module provides the pieces the dispatcher coordinates through:
//! a semaphore-backed limiter that bounds probes in flight, a completion
//! tracker that counts outstanding probe tasks, and the results stream
//! that closes once every task has finished.

use crate::error::DnsCheckError;
use crate::types::MAX_CONCURRENCY;
use futures::Stream;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tracing::{debug, trace};

/// Bounds how many probes run their network section at the same time.
///
/// Cloning is cheap and every clone shares the same slots.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// A held limiter slot. The slot is released when this value is dropped,
/// which covers early returns and panics as well as normal completion.
#[derive(Debug)]
pub struct ProbeSlot {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyLimiter {
    /// Create a limiter with `capacity` slots, clamped to 1..=1000.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_CONCURRENCY);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait for a free slot.
    pub async fn acquire(&self) -> Result<ProbeSlot, DnsCheckError> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| DnsCheckError::internal("concurrency limiter closed"))?;

        Ok(ProbeSlot { _permit: permit })
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently held.
    pub fn in_flight(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }
}

/// Counts outstanding probe tasks and owns the producer side of the
/// results stream.
///
/// The stream closes when the tracker has been sealed and the last
/// [`TaskHandle`] has been dropped: each of them holds a sender, and the
/// channel ends once no sender is left. The outstanding count is kept for
/// diagnostics only and never decides when the stream closes.
#[derive(Debug)]
pub struct CompletionTracker {
    outstanding: Arc<AtomicUsize>,
    sender: mpsc::UnboundedSender<String>,
}

/// One registered probe task.
///
/// Dropping the handle is the task's `Finished` transition: the
/// outstanding count goes down first, then the handle's producer end is
/// released. Anything published before that is visible to the consumer
/// before it can observe the stream closing.
#[derive(Debug)]
pub struct TaskHandle {
    outstanding: Arc<AtomicUsize>,
    sender: mpsc::UnboundedSender<String>,
}

impl CompletionTracker {
    /// Create a tracker together with the stream it feeds.
    pub fn channel() -> (Self, ProbeStream) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let tracker = Self {
            outstanding: Arc::new(AtomicUsize::new(0)),
            sender,
        };
        (tracker, ProbeStream { receiver })
    }

    /// Register a new task. Must be called before the task is spawned.
    pub fn register(&self) -> TaskHandle {
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        TaskHandle {
            outstanding: Arc::clone(&self.outstanding),
            sender: self.sender.clone(),
        }
    }

    /// Number of registered tasks that have not finished yet.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Stop accepting registrations. The stream closes as soon as no
    /// registered task is left.
    pub fn seal(self) {
        debug!(
            outstanding = self.outstanding(),
            "all probe tasks dispatched"
        );
    }
}

impl TaskHandle {
    /// Push a successful candidate onto the results stream.
    pub fn publish(&self, server: String) {
        if self.sender.send(server).is_err() {
            // consumer went away; nothing left to deliver to
            trace!("results stream consumer dropped");
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        let previous = self.outstanding.fetch_sub(1, Ordering::AcqRel);
        if previous == 1 {
            trace!("no probe tasks outstanding");
        }
    }
}

/// Successful candidates, in completion order.
///
/// Single consumer. Ends once every dispatched probe has finished.
#[derive(Debug)]
pub struct ProbeStream {
    receiver: mpsc::UnboundedReceiver<String>,
}

impl ProbeStream {
    /// Wait for the next usable resolver, or `None` once the run is over.
    pub async fn next_server(&mut self) -> Option<String> {
        self.receiver.recv().await
    }

    /// Drain the stream to completion.
    pub async fn collect_all(mut self) -> Vec<String> {
        let mut servers = Vec::new();
        while let Some(server) = self.next_server().await {
            servers.push(server);
        }
        servers
    }
}

impl Stream for ProbeStream {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<String>> {
        self.receiver.poll_recv(cx)
    }
}
