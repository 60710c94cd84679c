//! Blocking Entry Points
//!
//! Synchronous versions of the concurrent operations for callers that
//! aren't already inside an async runtime. Each call runs to completion on
//! a shared multi-thread runtime.
//!
//! Do not call these from async code; use the `api` functions directly.

use std::future::Future;

use crate::error::Result;
use crate::{api, runtime};

/// Blocking [`concurrent_for_each`](crate::concurrent_for_each).
pub fn for_each<T, E, F, Fut>(items: Vec<T>, window: Option<usize>, task: F) -> Result<(), E>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = std::result::Result<(), E>>,
{
    runtime::block_on(api::concurrent_for_each(items, window, task))
}

/// Blocking [`concurrent_map`](crate::concurrent_map).
pub fn map<T, O, E, F, Fut>(items: Vec<T>, window: Option<usize>, transform: F) -> Result<Vec<O>, E>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = std::result::Result<O, E>>,
{
    runtime::block_on(api::concurrent_map(items, window, transform))
}

/// Blocking [`concurrent_compact_map`](crate::concurrent_compact_map).
pub fn compact_map<T, O, E, F, Fut>(
    items: Vec<T>,
    window: Option<usize>,
    transform: F,
) -> Result<Vec<O>, E>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = std::result::Result<Option<O>, E>>,
{
    runtime::block_on(api::concurrent_compact_map(items, window, transform))
}
