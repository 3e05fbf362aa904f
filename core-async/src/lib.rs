//! Runtime abstraction layer for the player core.
//!
//! Every other crate in the workspace reaches the async runtime through this
//! crate instead of depending on Tokio directly. Timers, task spawning and
//! synchronization primitives are re-exported here so the engine can be
//! driven by a paused clock in tests (see the `test-util` feature).
//!
//! # Modules
//!
//! - `task`: Task spawning
//! - `time`: Intervals, sleeps and timeouts
//! - `sync`: Channels, notification and cancellation
//! - `runtime`: Blocking entry points used by the attribute macros
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//! use core_async::time::{sleep, Duration};
//!
//! async fn example() {
//!     let handle = task::spawn(async {
//!         sleep(Duration::from_millis(10)).await;
//!         42
//!     });
//!     assert_eq!(handle.await.unwrap(), 42);
//! }
//! ```

// Re-export the async entry-point/test macros so downstream crates never need
// direct Tokio dependencies.
pub use core_async_macros::{main, test};

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, Duration, Instant};
