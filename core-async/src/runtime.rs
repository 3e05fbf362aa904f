//! Runtime utilities that abstract over the underlying async executor.
//!
//! The attribute macros in `core-async-macros` expand to calls into this
//! module, so test and binary entry points never name Tokio themselves.

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Runs the provided future to completion on a fresh current-thread runtime.
pub fn block_on<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("core_async::runtime::block_on: failed to build Tokio runtime")
        .block_on(future)
}

/// Runs the provided future on a current-thread runtime whose clock starts
/// paused.
///
/// Timers only fire when the runtime is idle or when the clock is advanced
/// explicitly with [`crate::time::advance`], which makes fixed-cadence loops
/// deterministic under test.
#[cfg(feature = "test-util")]
pub fn block_on_paused<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .expect("core_async::runtime::block_on_paused: failed to build Tokio runtime")
        .block_on(future)
}

/// Returns `true` when called from inside a runtime context.
///
/// Spawning requires a runtime; callers use this to fail with a descriptive
/// error instead of panicking.
pub fn in_runtime() -> bool {
    Handle::try_current().is_ok()
}
