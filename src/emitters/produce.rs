//! # Producer abstraction.
//!
//! A [`Produce`] implementation drives one unbounded emitter. The runtime calls
//! [`Produce::produce`] once per connection, on a dedicated task, handing it an
//! [`Emit`] to push values through and a [`CancellationToken`] to observe.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::emitters::Emit;
use crate::error::StreamError;
use crate::stream::Item;

/// # Asynchronous, cancelable value source.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use rxflow::{Emit, Produce, StreamError};
///
/// struct Letters;
///
/// #[async_trait]
/// impl Produce<char> for Letters {
///     fn name(&self) -> &str { "letters" }
///
///     async fn produce(&self, out: Emit<char>, ctx: CancellationToken) -> Result<(), StreamError> {
///         for c in ['a', 'b', 'c'] {
///             if ctx.is_cancelled() {
///                 return Err(StreamError::Canceled);
///             }
///             out.emit(c)?;
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Produce<T: Item>: Send + Sync + 'static {
    /// Returns a stable, human-readable producer name (used in events).
    fn name(&self) -> &str;

    /// Pushes values until done, failed or cancelled.
    ///
    /// Returning `Ok(())` completes the emitter. Returning an error terminates it;
    /// the error is reported on the event bus, never to subscribers.
    async fn produce(&self, out: Emit<T>, ctx: CancellationToken) -> Result<(), StreamError>;
}

/// Shared handle to a producer.
pub type ProducerRef<T> = Arc<dyn Produce<T>>;
