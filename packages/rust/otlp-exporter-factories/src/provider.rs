//! Deferred producers: "given a context, build a `T`, possibly failing".
//!
//! Any async closure taking a [`BuildContext`] and returning `Result<T, E>` is a
//! [`Provider<T>`], so callers rarely need to implement the trait by hand:
//!
//! ```
//! use otlp_exporter_factories::{resolve_or_abort, BuildContext, Provider};
//! use std::convert::Infallible;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let port = |_cx: BuildContext| async { Ok::<_, Infallible>(4317u16) };
//!
//! let cx = BuildContext::new();
//! assert_eq!(resolve_or_abort(&cx, "port", &port).await?, 4317);
//! # Ok(())
//! # }
//! ```
//!
//! A provider runs its computation each time it is resolved. Nothing here memoizes results
//! unless the caller opts in with [`shared`].

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::OnceCell;

use crate::context::BuildContext;
use crate::error::{Abort, BoxError};

/// A value of type `T` produced on demand from a [`BuildContext`].
pub trait Provider<T>: Send + Sync {
    type Error: Into<BoxError>;

    fn provide<'a>(&'a self, cx: &'a BuildContext) -> BoxFuture<'a, Result<T, Self::Error>>;
}

impl<T, F, Fut, E> Provider<T> for F
where
    F: Fn(BuildContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    E: Into<BoxError>,
    T: Send + 'static,
{
    type Error = E;

    fn provide<'a>(&'a self, cx: &'a BuildContext) -> BoxFuture<'a, Result<T, E>> {
        Box::pin((self)(cx.clone()))
    }
}

/// Resolves `provider`, turning any failure into an [`Abort`].
///
/// A context that is already done aborts without invoking the provider. Otherwise the
/// caller's context is passed through as-is.
pub async fn resolve_or_abort<T, P>(
    cx: &BuildContext,
    dependency: &'static str,
    provider: &P,
) -> Result<T, Abort>
where
    P: Provider<T> + ?Sized,
{
    if let Err(e) = cx.check() {
        tracing::warn!(dependency, error = %e, "context done before resolving dependency");
        return Err(Abort::new(dependency, e));
    }
    match provider.provide(cx).await {
        Ok(value) => Ok(value),
        Err(e) => {
            let abort = Abort::new(dependency, e);
            tracing::warn!(dependency, error = %abort.cause(), "dependency failed to resolve");
            Err(abort)
        }
    }
}

/// A provider that always yields a clone of the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value<T>(T);

/// Wraps a ready value as a [`Provider`] (and a [`ConfigReader`](crate::ConfigReader)).
pub fn value<T>(value: T) -> Value<T> {
    Value(value)
}

impl<T> Value<T> {
    pub fn get(&self) -> &T {
        &self.0
    }
}

impl<T> Provider<T> for Value<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Error = Infallible;

    fn provide<'a>(&'a self, _cx: &'a BuildContext) -> BoxFuture<'a, Result<T, Infallible>> {
        let value = self.0.clone();
        Box::pin(async move { Ok(value) })
    }
}

/// A cloneable provider that resolves its inner provider once and hands out clones.
///
/// Created by [`shared`]. Failures are not cached: the next resolution retries.
pub struct Shared<P, T> {
    inner: Arc<SharedInner<P, T>>,
}

struct SharedInner<P, T> {
    provider: P,
    cell: OnceCell<T>,
}

/// Memoizes `provider` so one gRPC channel or HTTP client can back several exporters.
///
/// ```
/// use otlp_exporter_factories::{resolve_or_abort, shared, BuildContext};
/// use std::convert::Infallible;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
/// let dials = Arc::new(AtomicUsize::new(0));
/// let counter = dials.clone();
/// let channel = shared(move |_cx: BuildContext| {
///     let n = counter.fetch_add(1, Ordering::SeqCst);
///     async move { Ok::<_, Infallible>(format!("channel-{n}")) }
/// });
///
/// let cx = BuildContext::new();
/// let a: String = resolve_or_abort(&cx, "channel", &channel).await?;
/// let b: String = resolve_or_abort(&cx, "channel", &channel.clone()).await?;
/// assert_eq!(a, b);
/// assert_eq!(dials.load(Ordering::SeqCst), 1);
/// # Ok(())
/// # }
/// ```
pub fn shared<P, T>(provider: P) -> Shared<P, T>
where
    P: Provider<T>,
{
    Shared {
        inner: Arc::new(SharedInner {
            provider,
            cell: OnceCell::new(),
        }),
    }
}

impl<P, T> Shared<P, T> {
    /// Whether a value has been produced already.
    pub fn is_resolved(&self) -> bool {
        self.inner.cell.initialized()
    }
}

impl<P, T> Clone for Shared<P, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P, T> fmt::Debug for Shared<P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

impl<P, T> Provider<T> for Shared<P, T>
where
    P: Provider<T>,
    T: Clone + Send + Sync + 'static,
{
    type Error = P::Error;

    fn provide<'a>(&'a self, cx: &'a BuildContext) -> BoxFuture<'a, Result<T, P::Error>> {
        Box::pin(async move {
            let value = self
                .inner
                .cell
                .get_or_try_init(|| self.inner.provider.provide(cx))
                .await?;
            Ok(value.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContextError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, thiserror::Error)]
    #[error("dial failed")]
    struct DialError;

    #[tokio::test]
    async fn test_closure_is_a_provider() {
        let provider = |_cx: BuildContext| async { Ok::<_, DialError>(7u32) };
        let cx = BuildContext::new();
        assert_eq!(provider.provide(&cx).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_closure_receives_callers_context() {
        let provider = |cx: BuildContext| async move { Ok::<_, DialError>(cx.is_cancelled()) };
        let parent = BuildContext::new();
        let child = parent.child();
        let observed = provider.provide(&child).await.unwrap();
        assert!(!observed);

        // The provider must see the very token the caller holds.
        let seen_token = |cx: BuildContext| async move { Ok::<_, DialError>(cx) };
        let received = seen_token.provide(&child).await.unwrap();
        child.cancel();
        assert!(received.is_cancelled());
    }

    #[tokio::test]
    async fn test_resolve_or_abort_success() {
        let cx = BuildContext::new();
        let v: u32 = resolve_or_abort(&cx, "n", &value(3u32)).await.unwrap();
        assert_eq!(v, 3);
    }

    #[tokio::test]
    async fn test_resolve_or_abort_wraps_error() {
        let cx = BuildContext::new();
        let failing = |_cx: BuildContext| async { Err::<u32, _>(DialError) };
        let abort = resolve_or_abort(&cx, "channel", &failing).await.unwrap_err();
        assert_eq!(abort.dependency(), "channel");
        assert!(abort.cause().downcast_ref::<DialError>().is_some());
    }

    #[tokio::test]
    async fn test_resolve_or_abort_skips_provider_on_cancelled_context() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let provider = move |_cx: BuildContext| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, DialError>(1u32) }
        };

        let cx = BuildContext::new();
        cx.cancel();
        let abort = resolve_or_abort(&cx, "n", &provider).await.unwrap_err();
        assert_eq!(
            abort.cause().downcast_ref::<ContextError>(),
            Some(&ContextError::Cancelled)
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_provider_runs_on_every_resolution() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let provider = move |_cx: BuildContext| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, DialError>(n) }
        };
        let cx = BuildContext::new();
        assert_eq!(provider.provide(&cx).await.unwrap(), 0);
        assert_eq!(provider.provide(&cx).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_shared_memoizes_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let provider = shared(move |_cx: BuildContext| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, DialError>(n) }
        });
        let clone = provider.clone();
        let cx = BuildContext::new();

        assert!(!provider.is_resolved());
        assert_eq!(provider.provide(&cx).await.unwrap(), 0);
        assert_eq!(clone.provide(&cx).await.unwrap(), 0);
        assert!(clone.is_resolved());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shared_retries_after_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let provider = shared(move |_cx: BuildContext| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(DialError)
                } else {
                    Ok(n)
                }
            }
        });
        let cx = BuildContext::new();

        assert!(provider.provide(&cx).await.is_err());
        assert!(!provider.is_resolved());
        assert_eq!(provider.provide(&cx).await.unwrap(), 1);
        assert_eq!(provider.provide(&cx).await.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
