//! Public Operations
//!
//! Thin façades over the scheduler: resolve the window, wire the transform
//! to a slot table where output is wanted, shape the result. Every
//! concurrent operation shares the same contract: output in input order,
//! first failure wins, nothing in flight survives the call.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::results::SlotTable;
use crate::{scheduler, window};

/// Slot writes only fail on an indexing bug; fail loudly, never drop data.
async fn record<T>(slots: &SlotTable<T>, index: usize, value: Option<T>) {
    if let Err(error) = slots.set(index, value).await {
        panic!("result table rejected write: {error}");
    }
}

/* ------------ concurrent operations ------------ */

/// Run `task` on every item with bounded concurrency; keep no output.
///
/// The first failing item aborts the run: remaining in-flight tasks are
/// canceled cooperatively and that first error is returned.
pub async fn concurrent_for_each<T, E, F, Fut>(
    items: Vec<T>,
    window: Option<usize>,
    task: F,
) -> Result<(), E>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = std::result::Result<(), E>>,
{
    concurrent_for_each_with_token(items, window, &CancellationToken::new(), task).await
}

/// `concurrent_for_each` that also honors a caller-supplied token.
pub async fn concurrent_for_each_with_token<T, E, F, Fut>(
    items: Vec<T>,
    window: Option<usize>,
    token: &CancellationToken,
    task: F,
) -> Result<(), E>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = std::result::Result<(), E>>,
{
    let width = window::resolve(window);
    // Child token: a failing item must not cancel the caller's own tree.
    let run_token = token.child_token();
    scheduler::run(items, width, &run_token, |_index, item| task(item)).await
}

/// Transform every item with bounded concurrency; results in input order.
///
/// On success the output length always equals the input length.
pub async fn concurrent_map<T, O, E, F, Fut>(
    items: Vec<T>,
    window: Option<usize>,
    transform: F,
) -> Result<Vec<O>, E>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = std::result::Result<O, E>>,
{
    concurrent_map_with_token(items, window, &CancellationToken::new(), transform).await
}

/// `concurrent_map` that also honors a caller-supplied token.
pub async fn concurrent_map_with_token<T, O, E, F, Fut>(
    items: Vec<T>,
    window: Option<usize>,
    token: &CancellationToken,
    transform: F,
) -> Result<Vec<O>, E>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = std::result::Result<O, E>>,
{
    let len = items.len();
    let width = window::resolve(window);
    let run_token = token.child_token();

    let table = SlotTable::new(len);
    {
        let slots = &table;
        let transform = &transform;
        scheduler::run(items, width, &run_token, move |index, item| async move {
            let value = transform(item).await?;
            record(slots, index, Some(value)).await;
            Ok(())
        })
        .await?;
    }

    let values = table.into_values();
    assert_eq!(
        values.len(),
        len,
        "result table length diverged from input length"
    );
    let mut out = Vec::with_capacity(len);
    for (index, value) in values.into_iter().enumerate() {
        match value {
            Some(value) => out.push(value),
            // Every slot is written on the success path; a hole here means
            // corrupted output, which must never be returned.
            None => panic!("no result recorded for item {index}"),
        }
    }
    Ok(out)
}

/// Transform every item with bounded concurrency, dropping the items the
/// transform declines (`None`); survivors keep input order.
pub async fn concurrent_compact_map<T, O, E, F, Fut>(
    items: Vec<T>,
    window: Option<usize>,
    transform: F,
) -> Result<Vec<O>, E>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = std::result::Result<Option<O>, E>>,
{
    concurrent_compact_map_with_token(items, window, &CancellationToken::new(), transform).await
}

/// `concurrent_compact_map` that also honors a caller-supplied token.
pub async fn concurrent_compact_map_with_token<T, O, E, F, Fut>(
    items: Vec<T>,
    window: Option<usize>,
    token: &CancellationToken,
    transform: F,
) -> Result<Vec<O>, E>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = std::result::Result<Option<O>, E>>,
{
    let len = items.len();
    let width = window::resolve(window);
    let run_token = token.child_token();

    let table = SlotTable::new(len);
    {
        let slots = &table;
        let transform = &transform;
        scheduler::run(items, width, &run_token, move |index, item| async move {
            let value = transform(item).await?;
            record(slots, index, value).await;
            Ok(())
        })
        .await?;
    }

    Ok(table.into_present())
}

/* ------------ serial variants ------------ */

/// `concurrent_for_each` with the window pinned to 1: strictly sequential,
/// in input order. The safe default, and a correctness oracle for the
/// concurrent version.
pub async fn serial_for_each<T, E, F, Fut>(items: Vec<T>, task: F) -> Result<(), E>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = std::result::Result<(), E>>,
{
    concurrent_for_each(items, Some(1), task).await
}

/// `concurrent_map` with the window pinned to 1.
pub async fn serial_map<T, O, E, F, Fut>(items: Vec<T>, transform: F) -> Result<Vec<O>, E>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = std::result::Result<O, E>>,
{
    concurrent_map(items, Some(1), transform).await
}

/// `concurrent_compact_map` with the window pinned to 1.
pub async fn serial_compact_map<T, O, E, F, Fut>(items: Vec<T>, transform: F) -> Result<Vec<O>, E>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = std::result::Result<Option<O>, E>>,
{
    concurrent_compact_map(items, Some(1), transform).await
}

/* ------------ sequential fold ------------ */

/// Left-to-right fold, stopping at the first error.
///
/// No scheduling machinery; this shares only the fail-fast contract with
/// the concurrent operations.
pub async fn reduce<T, A, E, F, Fut>(items: Vec<T>, seed: A, combine: F) -> Result<A, E>
where
    F: Fn(A, T) -> Fut,
    Fut: Future<Output = std::result::Result<A, E>>,
{
    let mut acc = seed;
    for item in items {
        acc = combine(acc, item).await?;
    }
    Ok(acc)
}
