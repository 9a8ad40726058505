//! # Function-backed producer (`ProduceFn`)
//!
//! [`ProduceFn`] wraps a closure `F: Fn(Emit<T>, CancellationToken) -> Fut`,
//! producing a fresh future per connection. No state is shared between
//! connections unless the closure captures an `Arc` explicitly.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use rxflow::{Emit, Emitter, ProduceFn, StreamError};
//!
//! let ticks = ProduceFn::arc("ticks", |out: Emit<u32>, _ctx: CancellationToken| async move {
//!     for i in 0..3 {
//!         out.emit(i)?;
//!     }
//!     Ok::<_, StreamError>(())
//! });
//! let emitter = Emitter::<u32>::unbounded(ticks);
//! assert!(!emitter.is_finite());
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::emitters::{Emit, Produce};
use crate::error::StreamError;
use crate::stream::Item;

/// Function-backed producer.
#[derive(Debug)]
pub struct ProduceFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ProduceFn<F> {
    /// Creates a new function-backed producer.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the producer and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<T, F, Fut> Produce<T> for ProduceFn<F>
where
    T: Item,
    F: Fn(Emit<T>, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), StreamError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn produce(&self, out: Emit<T>, ctx: CancellationToken) -> Result<(), StreamError> {
        (self.f)(out, ctx).await
    }
}
