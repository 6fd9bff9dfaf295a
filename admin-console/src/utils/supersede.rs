//! Latest-wins execution for list and search requests.
//!
//! When a newer request for the same view starts, the older one is aborted and
//! its result is reported as [`Outcome::Superseded`] so it can never overwrite
//! the newer state.

use std::future::Future;
use std::sync::Mutex;
use tokio::task::AbortHandle;

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    Completed(T),
    Superseded,
}

impl<T> Outcome<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Outcome::Superseded)
    }
}

#[derive(Default)]
struct Slot {
    generation: u64,
    current: Option<AbortHandle>,
}

#[derive(Default)]
pub struct LatestOnly {
    slot: Mutex<Slot>,
}

impl LatestOnly {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `future` as the newest request, aborting any older one still running.
    pub async fn run<F, T>(&self, future: F) -> Outcome<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let handle = tokio::spawn(future);

        let generation = {
            let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
            slot.generation += 1;
            if let Some(previous) = slot.current.replace(handle.abort_handle()) {
                previous.abort();
            }
            slot.generation
        };

        let result = handle.await;

        let is_latest = {
            let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
            let latest = slot.generation == generation;
            if latest {
                slot.current = None;
            }
            latest
        };

        match result {
            Ok(value) if is_latest => Outcome::Completed(value),
            Ok(_) => Outcome::Superseded,
            Err(e) if e.is_cancelled() => {
                tracing::debug!(generation, "Stale request aborted");
                Outcome::Superseded
            }
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_single_request_completes() {
        let latest = LatestOnly::new();
        let outcome = latest.run(async { 7 }).await;
        assert_eq!(outcome, Outcome::Completed(7));
    }

    #[tokio::test]
    async fn test_newer_request_supersedes_older() {
        let latest = Arc::new(LatestOnly::new());

        let slow = {
            let latest = Arc::clone(&latest);
            tokio::spawn(async move {
                latest
                    .run(async {
                        tokio::time::sleep(Duration::from_millis(200)).await;
                        "stale"
                    })
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        let fresh = latest.run(async { "fresh" }).await;

        assert_eq!(fresh, Outcome::Completed("fresh"));
        assert!(slow.await.unwrap().is_superseded());
    }

    #[tokio::test]
    async fn test_sequential_requests_both_complete() {
        let latest = LatestOnly::new();
        assert_eq!(latest.run(async { 1 }).await.into_option(), Some(1));
        assert_eq!(latest.run(async { 2 }).await.into_option(), Some(2));
    }
}
