//! The capability interface a backend implements to be pooled.
//!
//! The pool never looks inside a resource. It only asks the factory to
//! create one, to check one for liveness, and to close one for good.

use std::future::Future;

use crate::error::Result;

/// Backend-specific provider of pooled resources.
///
/// Implementations may use `async fn` for the three lifecycle methods; the
/// returned futures must be `Send` because the pool drives them from
/// background tasks.
///
/// ```rust,ignore
/// struct Counter(AtomicU64);
///
/// impl Factory for Counter {
///     type Resource = u64;
///
///     fn id(&self) -> &str {
///         "counter"
///     }
///
///     async fn create(&self) -> Result<u64> {
///         Ok(self.0.fetch_add(1, Ordering::SeqCst))
///     }
/// }
/// ```
pub trait Factory: Send + Sync + 'static {
    /// The resource handed out to callers.
    type Resource: Send + 'static;

    /// Label for this kind of resource (e.g. "mysql", "redis"), used in
    /// logs, events and errors.
    fn id(&self) -> &str;

    /// Create a new, independent resource.
    fn create(&self) -> impl Future<Output = Result<Self::Resource>> + Send;

    /// Check a resource for liveness. Returning `false` evicts it.
    ///
    /// The pool drops this future unfinished when a caller starts waiting for
    /// a resource; the resource then goes back to the pool unchecked.
    fn health_check(
        &self,
        _resource: &mut Self::Resource,
    ) -> impl Future<Output = bool> + Send {
        async { true }
    }

    /// Release whatever the resource holds. Called exactly once per resource.
    fn close(&self, resource: Self::Resource) -> impl Future<Output = ()> + Send {
        async move { drop(resource) }
    }
}
