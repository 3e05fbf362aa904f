//! Synchronization primitives.
//!
//! Async-aware channels and notification types from Tokio, plus the
//! [`CancellationToken`] used to stop periodic tasks without tearing down the
//! runtime.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::CancellationToken;
//!
//! let token = CancellationToken::new();
//! let child = token.child_token();
//! token.cancel();
//! assert!(child.is_cancelled());
//! ```

pub use tokio::sync::{broadcast, mpsc, oneshot, watch, Mutex, MutexGuard, Notify};
pub use tokio_util::sync::CancellationToken;
