//! Background save queue
//!
//! Holds at most one pending document. A request made while a save is in
//! flight replaces the pending slot, so rapid mutations collapse into one
//! write of the newest state. Writes happen in request order and never
//! overlap.

use crate::error::PersistenceError;
use crate::gateway::PersistenceGateway;
use crate::types::{Notification, UserId};
use ladder_store::Store;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Result of the most recent completed save
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Generation of the request that was written
    pub generation: u64,
    /// Failure message, `None` on success
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
struct Pending {
    generation: u64,
    store: Store,
}

/// Single-slot coalescing save queue owned by a session
#[derive(Debug)]
pub struct SaveQueue {
    desired: watch::Sender<Option<Pending>>,
    acked: watch::Receiver<SaveOutcome>,
    generation: u64,
    worker: JoinHandle<()>,
}

impl SaveQueue {
    /// Spawn the worker for `user`
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        gateway: Arc<dyn PersistenceGateway>,
        user: UserId,
        notices: broadcast::Sender<Notification>,
    ) -> Self {
        let (desired, desired_rx) = watch::channel(None);
        let (acked_tx, acked) = watch::channel(SaveOutcome::default());
        let worker = tokio::spawn(run(gateway, user, desired_rx, acked_tx, notices));

        Self {
            desired,
            acked,
            generation: 0,
            worker,
        }
    }

    /// Schedule a save of `store`, replacing any pending request
    pub fn request(&mut self, store: &Store) {
        self.generation += 1;
        self.desired.send_replace(Some(Pending {
            generation: self.generation,
            store: store.clone(),
        }));
    }

    /// Generation of the latest request
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Outcome of the last completed save
    #[must_use]
    pub fn last_outcome(&self) -> SaveOutcome {
        self.acked.borrow().clone()
    }

    /// Wait until the latest request has been written
    ///
    /// # Errors
    /// Returns the failure of that write, or an error if the worker is gone
    pub async fn flush(&self) -> Result<(), PersistenceError> {
        let target = self.generation;
        if target == 0 {
            return Ok(());
        }

        let mut acked = self.acked.clone();
        let outcome = acked
            .wait_for(|outcome| outcome.generation >= target)
            .await
            .map_err(|_| PersistenceError::unavailable("save worker stopped"))?
            .clone();

        match outcome.error {
            None => Ok(()),
            Some(message) => Err(PersistenceError::Unavailable(message)),
        }
    }

    /// Write what is pending, then stop the worker
    ///
    /// # Errors
    /// Returns the failure of the final write
    pub async fn shutdown(self) -> Result<(), PersistenceError> {
        let result = self.flush().await;
        let Self { desired, worker, .. } = self;
        drop(desired);
        if let Err(e) = worker.await {
            warn!(error = %e, "Save worker ended abnormally");
        }
        result
    }
}

async fn run(
    gateway: Arc<dyn PersistenceGateway>,
    user: UserId,
    mut desired: watch::Receiver<Option<Pending>>,
    acked: watch::Sender<SaveOutcome>,
    notices: broadcast::Sender<Notification>,
) {
    while desired.changed().await.is_ok() {
        let pending = desired.borrow_and_update().clone();
        let Some(pending) = pending else {
            continue;
        };

        let result = match pending.store.to_document() {
            Ok(document) => gateway.save(&user, &document).await,
            Err(e) => Err(PersistenceError::Serialization(e.to_string())),
        };

        let error = match result {
            Ok(()) => {
                debug!(user = %user, generation = pending.generation, "Store saved");
                None
            }
            Err(e) => {
                warn!(user = %user, generation = pending.generation, error = %e, "Store save failed");
                // no receivers is fine
                let _ = notices.send(Notification::warning("Failed to save data"));
                Some(e.to_string())
            }
        };

        acked.send_replace(SaveOutcome {
            generation: pending.generation,
            error,
        });
    }
    debug!(user = %user, "Save worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use ladder_store::{Category, TierId};

    fn queue(gateway: &Arc<MemoryGateway>) -> (SaveQueue, broadcast::Receiver<Notification>) {
        let (tx, rx) = broadcast::channel(8);
        let shared: Arc<dyn PersistenceGateway> = gateway.clone();
        (SaveQueue::spawn(shared, UserId::new("u"), tx), rx)
    }

    #[tokio::test]
    async fn flush_without_requests_is_immediate() {
        let gateway = Arc::new(MemoryGateway::new());
        let (queue, _rx) = queue(&gateway);
        queue.flush().await.unwrap();
        assert_eq!(gateway.save_count(), 0);
    }

    #[tokio::test]
    async fn rapid_requests_coalesce_to_latest() {
        let gateway = Arc::new(MemoryGateway::new());
        let (mut queue, _rx) = queue(&gateway);
        let mut store = Store::default();

        for text in ["a", "b", "c", "d"] {
            store.add_item(TierId::FIRST, Category::Privileges, text).unwrap();
            queue.request(&store);
        }
        queue.flush().await.unwrap();

        // the worker never ran between requests on this runtime
        assert_eq!(gateway.save_count(), 1);
        let saved = Store::from_document(gateway.document(&UserId::new("u")).unwrap()).unwrap();
        assert_eq!(saved, store);
        assert_eq!(queue.last_outcome().generation, 4);
    }

    #[tokio::test]
    async fn failures_are_reported_and_later_saves_recover() {
        let gateway = Arc::new(MemoryGateway::new());
        let (mut queue, mut rx) = queue(&gateway);
        let store = Store::default();

        gateway.set_fail_saves(true);
        queue.request(&store);
        assert!(queue.flush().await.is_err());
        assert_eq!(rx.recv().await.unwrap(), Notification::warning("Failed to save data"));

        gateway.set_fail_saves(false);
        queue.request(&store);
        queue.flush().await.unwrap();
        assert_eq!(gateway.save_count(), 1);
    }

    #[tokio::test]
    async fn shutdown_writes_pending() {
        let gateway = Arc::new(MemoryGateway::new());
        let (mut queue, _rx) = queue(&gateway);
        queue.request(&Store::default());
        queue.shutdown().await.unwrap();
        assert_eq!(gateway.save_count(), 1);
    }
}
