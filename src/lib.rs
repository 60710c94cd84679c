#![doc = include_str!("../README.md")]

pub mod api;
pub mod blocking;
pub mod error;
pub mod results;
pub mod window;

mod runtime;
mod scheduler;


pub use api::*;
pub use error::{Error, Result};
pub use window::default_window;

// Re-exported so callers of the `_with_token` operations don't need a direct
// tokio-util dependency.
pub use tokio_util::sync::CancellationToken;
