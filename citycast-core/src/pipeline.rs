//! Attempt plumbing shared by both coordinators.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::classify::{ErrorCategory, classify};
use crate::fault::Fault;

/// Holds the task running the live attempt.
#[derive(Debug, Default)]
pub(crate) struct TaskSlot {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TaskSlot {
    /// Install `handle` as the live attempt, aborting the one it replaces.
    pub(crate) fn replace(&self, handle: JoinHandle<()>) {
        let previous = self.handle.lock().unwrap_or_else(PoisonError::into_inner).replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    pub(crate) fn cancel(&self) {
        if let Some(previous) = self.handle.lock().unwrap_or_else(PoisonError::into_inner).take() {
            previous.abort();
        }
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Run a remote call under `limit`. Elapsed time counts as lost connectivity.
pub(crate) async fn bounded<T, F>(limit: Duration, fallback: &str, call: F) -> Result<T, ErrorCategory>
where
    F: Future<Output = Result<T, Fault>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(fault)) => {
            tracing::warn!(error = %fault, "remote call failed");
            Err(classify(&fault, fallback))
        }
        Err(_) => {
            tracing::warn!(limit_ms = limit.as_millis() as u64, "remote call timed out");
            Err(ErrorCategory::NoConnectivity)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn slow_call_times_out_as_no_connectivity() {
        let call = async {
            tokio::time::sleep(Duration::from_millis(2_500)).await;
            Ok::<_, Fault>(1)
        };
        let result = bounded(Duration::from_millis(2_000), "x", call).await;
        assert_eq!(result, Err(ErrorCategory::NoConnectivity));
    }

    #[tokio::test(start_paused = true)]
    async fn fault_is_classified() {
        let call = async { Err::<u8, _>(Fault::Transport("broken pipe".into())) };
        let result = bounded(Duration::from_millis(2_000), "x", call).await;
        assert_eq!(result, Err(ErrorCategory::ConnectionError));
    }

    #[tokio::test]
    async fn replacing_a_task_aborts_the_previous_one() {
        let slot = TaskSlot::default();
        let (guard, dropped) = tokio::sync::oneshot::channel::<()>();
        slot.replace(tokio::spawn(async move {
            let _guard = guard;
            std::future::pending::<()>().await;
        }));
        slot.replace(tokio::spawn(async {}));

        // The guard is dropped without sending once the task is aborted.
        assert!(dropped.await.is_err());
    }
}
