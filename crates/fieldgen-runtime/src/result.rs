use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::error::ResolverError;
use crate::value::Value;

/// The uniform outcome of a dispatch function.
///
/// Synchronous resolvers produce an already-completed result without
/// allocating a future; asynchronous ones carry a boxed future. Both are
/// awaited the same way.
pub struct AsyncResult {
    state: State,
}

enum State {
    Ready(Option<Result<Value, ResolverError>>),
    Pending(BoxFuture<'static, Result<Value, ResolverError>>),
}

impl AsyncResult {
    pub fn completed(value: Value) -> Self {
        Self::from_result(Ok(value))
    }

    pub fn failed(error: ResolverError) -> Self {
        Self::from_result(Err(error))
    }

    pub fn from_result(result: Result<Value, ResolverError>) -> Self {
        Self {
            state: State::Ready(Some(result)),
        }
    }

    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Result<Value, ResolverError>> + Send + 'static,
    {
        Self {
            state: State::Pending(future.boxed()),
        }
    }

    /// Suspend on `future`, failing with `Cancelled` if `token` fires first
    /// or fired while the future was running.
    pub fn cancellable<F>(future: F, token: CancellationToken) -> Self
    where
        F: Future<Output = Result<Value, ResolverError>> + Send + 'static,
    {
        Self::pending(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(ResolverError::Cancelled),
                result = future => {
                    if token.is_cancelled() {
                        Err(ResolverError::Cancelled)
                    } else {
                        result
                    }
                }
            }
        })
    }

    /// Whether the result is available without suspending.
    pub fn is_completed(&self) -> bool {
        matches!(self.state, State::Ready(Some(_)))
    }

    /// Take the result if it is already available.
    pub fn into_completed(self) -> Option<Result<Value, ResolverError>> {
        match self.state {
            State::Ready(result) => result,
            State::Pending(_) => None,
        }
    }
}

impl Future for AsyncResult {
    type Output = Result<Value, ResolverError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            State::Ready(result) => {
                Poll::Ready(result.take().expect("AsyncResult polled after completion"))
            }
            State::Pending(future) => future.as_mut().poll(cx),
        }
    }
}

impl From<Result<Value, ResolverError>> for AsyncResult {
    fn from(result: Result<Value, ResolverError>) -> Self {
        Self::from_result(result)
    }
}

impl fmt::Debug for AsyncResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            State::Ready(Some(result)) => {
                f.debug_tuple("AsyncResult::Ready").field(result).finish()
            }
            State::Ready(None) => f.write_str("AsyncResult::Consumed"),
            State::Pending(_) => f.write_str("AsyncResult::Pending(..)"),
        }
    }
}
