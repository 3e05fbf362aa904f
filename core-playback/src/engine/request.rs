//! Awaitable handle returned by `play`.

use core_async::task::JoinHandle;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::{PlaybackError, Result};

/// How a play request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The requested track is now rendering.
    Started,
    /// A newer `play` or a `stop` superseded this request before it could
    /// start. A buffer it loaded is still cached.
    Stale,
}

enum RequestState {
    Ready(Option<Result<PlayOutcome>>),
    Pending(JoinHandle<Result<PlayOutcome>>),
}

/// Result of a `play` call.
///
/// Resolves immediately on a cache hit and after the load otherwise.
/// Dropping the request does not cancel the load; the track still starts
/// when it arrives unless it has been superseded.
pub struct PlayRequest {
    generation: u64,
    state: RequestState,
}

impl PlayRequest {
    pub(crate) fn ready(generation: u64, result: Result<PlayOutcome>) -> Self {
        Self {
            generation,
            state: RequestState::Ready(Some(result)),
        }
    }

    pub(crate) fn pending(generation: u64, handle: JoinHandle<Result<PlayOutcome>>) -> Self {
        Self {
            generation,
            state: RequestState::Pending(handle),
        }
    }

    /// Generation assigned to this request.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `true` when the outcome was known without loading (cache hit).
    pub fn is_immediate(&self) -> bool {
        matches!(self.state, RequestState::Ready(_))
    }
}

impl Future for PlayRequest {
    type Output = Result<PlayOutcome>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            RequestState::Ready(result) => Poll::Ready(result.take().unwrap_or_else(|| {
                Err(PlaybackError::Internal(
                    "PlayRequest polled after completion".to_string(),
                ))
            })),
            RequestState::Pending(handle) => Pin::new(handle).poll(cx).map(|joined| {
                joined.unwrap_or_else(|err| {
                    Err(PlaybackError::Internal(format!("load task failed: {}", err)))
                })
            }),
        }
    }
}

impl std::fmt::Debug for PlayRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayRequest")
            .field("generation", &self.generation)
            .field("immediate", &self.is_immediate())
            .finish()
    }
}
