//! Sliding-Window Scheduling
//!
//! One control loop drives a pool of at most `window` in-flight workers:
//! prime the pool from the front of the input, then refill one-for-one as
//! completions arrive. Completions are observed in completion order, not
//! index order; callers that care about order reconcile through the slot
//! table. The first failure cancels the shared token, stops admissions, and
//! the loop drains the stragglers before surfacing that one error.

use std::future::Future;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Run `work` over every `(index, item)` pair with at most `window` in
/// flight at once.
///
/// Launch order follows input order. On success every item has been
/// visited; on failure the first observed error comes back, and only after
/// every launched worker has unwound, so no orphaned work survives the call.
pub(crate) async fn run<T, E, F, Fut>(
    items: Vec<T>,
    window: usize,
    token: &CancellationToken,
    work: F,
) -> Result<(), E>
where
    F: Fn(usize, T) -> Fut,
    Fut: Future<Output = std::result::Result<(), E>>,
{
    debug_assert!(window >= 1, "window must be resolved before scheduling");

    let mut queue = items.into_iter().enumerate();
    let mut in_flight = FuturesUnordered::new();

    // Prime the pool; take() guards the N < window case.
    for (index, item) in queue.by_ref().take(window) {
        in_flight.push(attend(index, item, &work, token));
    }

    let mut first_failure = None;
    while let Some(outcome) = in_flight.next().await {
        match outcome {
            Ok(()) => {
                if first_failure.is_none() {
                    if let Some((index, item)) = queue.next() {
                        in_flight.push(attend(index, item, &work, token));
                    }
                }
            }
            Err(error) => {
                if first_failure.is_none() {
                    log::debug!("worker failed, canceling remaining in-flight work");
                    token.cancel();
                    first_failure = Some(error);
                }
                // Later failures lost the race and are dropped.
            }
        }
    }

    match first_failure {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

/// One worker: race the unit of work against cancellation.
async fn attend<T, E, F, Fut>(
    index: usize,
    item: T,
    work: &F,
    token: &CancellationToken,
) -> Result<(), E>
where
    F: Fn(usize, T) -> Fut,
    Fut: Future<Output = std::result::Result<(), E>>,
{
    if token.is_cancelled() {
        return Err(Error::Canceled);
    }
    tokio::select! {
        _ = token.cancelled() => Err(Error::Canceled),
        outcome = work(index, item) => outcome.map_err(Error::Task),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::Mutex;
    use tokio::time::sleep;

    use super::*;

    #[tokio::test]
    async fn visits_every_item_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let items: Vec<u32> = (0..20).collect();

        let seen_handle = Arc::clone(&seen);
        run(items, 4, &CancellationToken::new(), |index, item| {
            let seen = Arc::clone(&seen_handle);
            async move {
                seen.lock().await.push((index, item));
                Ok::<_, String>(())
            }
        })
        .await
        .unwrap();

        let mut seen = seen.lock().await.clone();
        seen.sort();
        let expected: Vec<(usize, u32)> = (0..20).map(|n| (n as usize, n)).collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn offers_items_in_input_order() {
        let launched = Arc::new(Mutex::new(Vec::new()));
        let items: Vec<usize> = (0..30).collect();

        let launched_handle = Arc::clone(&launched);
        run(items, 3, &CancellationToken::new(), |index, item| {
            let launched = Arc::clone(&launched_handle);
            async move {
                launched.lock().await.push(index);
                // Uneven delays so completion order scrambles.
                sleep(Duration::from_millis((item as u64 * 7) % 5)).await;
                Ok::<_, String>(())
            }
        })
        .await
        .unwrap();

        let launched = launched.lock().await.clone();
        assert_eq!(launched, (0..30).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn empty_input_completes_without_launching() {
        let calls = Arc::new(AtomicUsize::new(0));

        let calls_handle = Arc::clone(&calls);
        run(Vec::<u32>::new(), 8, &CancellationToken::new(), |_, _| {
            let calls = Arc::clone(&calls_handle);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(())
            }
        })
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    /// Decrements on drop, so canceled workers are counted out too.
    struct ActiveGuard(Arc<AtomicUsize>);

    impl ActiveGuard {
        fn enter(counter: &Arc<AtomicUsize>) -> Self {
            counter.fetch_add(1, Ordering::SeqCst);
            Self(Arc::clone(counter))
        }
    }

    impl Drop for ActiveGuard {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn first_failure_stops_admissions_and_drains() {
        let active = Arc::new(AtomicUsize::new(0));
        let launched = Arc::new(AtomicUsize::new(0));
        let items: Vec<u32> = (0..100).collect();

        let active_handle = Arc::clone(&active);
        let launched_handle = Arc::clone(&launched);
        let err = run(items, 4, &CancellationToken::new(), |_, item| {
            let active = Arc::clone(&active_handle);
            let launched = Arc::clone(&launched_handle);
            async move {
                launched.fetch_add(1, Ordering::SeqCst);
                let _guard = ActiveGuard::enter(&active);
                if item == 2 {
                    Err(format!("item {item} went bad"))
                } else {
                    sleep(Duration::from_millis(20)).await;
                    Ok(())
                }
            }
        })
        .await
        .unwrap_err();

        assert_eq!(err, Error::Task("item 2 went bad".to_string()));
        // Everything launched has unwound by the time run() returns.
        assert_eq!(active.load(Ordering::SeqCst), 0);
        // Admissions stopped well short of the full input.
        assert!(launched.load(Ordering::SeqCst) < 100);
    }

    #[tokio::test]
    async fn precanceled_token_yields_canceled() {
        let token = CancellationToken::new();
        token.cancel();

        let err = run(vec![1, 2, 3], 2, &token, |_, _| async move {
            Ok::<_, String>(())
        })
        .await
        .unwrap_err();

        assert!(err.is_canceled());
    }
}
