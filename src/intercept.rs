//! The generic "around" interceptor registry.
//!
//! A [`Capability`] is a named operation (e.g. `"fetch"`, `"url-rewrite"`)
//! with a default innermost implementation and an ordered chain of
//! [`Interceptor`]s wrapped around it. Cross-cutting concerns (caching,
//! protocol rewriting, local file overrides) compose independently and are
//! registered in an order the application controls at bootstrap.
//!
//! Control flow is the classic middleware onion: the FIRST interceptor
//! registered is the OUTERMOST wrapper (first to see the raw call, last to see
//! the final result). Each interceptor receives the arguments plus a [`Next`]
//! continuation and may:
//!
//! * delegate unchanged (`next.run(args)`),
//! * delegate with modified arguments,
//! * return without delegating at all (short-circuit), or
//! * post-process the delegated result before returning it.
//!
//! Errors propagate unmodified through all outer layers; there is no implicit
//! catch or retry here.
//!
//! Capabilities are built once at startup and then shared immutably behind an
//! `Arc`. Registration is a `&mut self` operation, so the type system itself
//! enforces the freeze-then-build lifecycle (no interceptor can be appended
//! once the capability is shared).

use crate::errors::Result;
use futures::future::BoxFuture;
use std::sync::Arc;

/// The innermost implementation a capability falls back to when every
/// interceptor has delegated.
pub type Fallback<A, R> = dyn Fn(A) -> BoxFuture<'static, Result<R>> + Send + Sync;

/// A transformation step wrapping an invocation of a capability.
pub trait Interceptor<A, R>: Send + Sync {
    /// Runs this interceptor's pre-processing, optionally delegates to the
    /// remainder of the chain via `next`, and returns the (possibly
    /// post-processed) result.
    ///
    /// Omitting the `next.run(..)` call short-circuits the rest of the chain
    /// and the default implementation.
    fn around<'a>(&'a self, args: A, next: Next<'a, A, R>) -> BoxFuture<'a, Result<R>>;
}

/// The continuation representing the remainder of an interceptor chain.
///
/// Consumed by value: an interceptor can delegate at most once, which keeps
/// the strict pre/`next`/post nesting honest even across suspension points.
pub struct Next<'a, A, R> {
    chain: &'a [Arc<dyn Interceptor<A, R>>],
    fallback: &'a Fallback<A, R>,
}

impl<'a, A, R> Next<'a, A, R> {
    /// Delegates to the remainder of the chain with the given arguments.
    pub fn run(self, args: A) -> BoxFuture<'a, Result<R>> {
        match self.chain.split_first() {
            Some((head, rest)) => head.around(
                args,
                Next {
                    chain: rest,
                    fallback: self.fallback,
                },
            ),
            None => (self.fallback)(args),
        }
    }
}

/// A named, registrable operation with a default implementation and an
/// ordered interceptor chain.
pub struct Capability<A, R> {
    name: &'static str,
    chain: Vec<Arc<dyn Interceptor<A, R>>>,
    fallback: Box<Fallback<A, R>>,
}

impl<A: Send, R> Capability<A, R> {
    /// Creates a capability with the given default (innermost) implementation
    /// and an empty interceptor chain.
    pub fn new<F>(name: &'static str, fallback: F) -> Self
    where
        F: Fn(A) -> BoxFuture<'static, Result<R>> + Send + Sync + 'static,
    {
        Self {
            name,
            chain: Vec::new(),
            fallback: Box::new(fallback),
        }
    }

    /// The capability's name (used for logging only).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Appends an interceptor to the END of the chain.
    ///
    /// The first interceptor registered becomes the outermost wrapper.
    /// Registration order is preserved across independent setup routines
    /// because appending is the only mutation.
    pub fn register(&mut self, interceptor: impl Interceptor<A, R> + 'static) {
        self.chain.push(Arc::new(interceptor));
    }

    /// Number of registered interceptors.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Whether no interceptors are registered.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Runs the full interceptor chain ending in the default implementation.
    pub async fn invoke(&self, args: A) -> Result<R> {
        log::trace!(
            "invoking capability '{}' ({} interceptors)",
            self.name,
            self.chain.len()
        );
        Next {
            chain: &self.chain,
            fallback: self.fallback.as_ref(),
        }
        .run(args)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Logs pre/post events, increments the argument on the way in, and
    /// doubles the result on the way out.
    struct Tracing {
        tag: &'static str,
        events: Arc<Mutex<Vec<String>>>,
    }

    impl Interceptor<u32, u32> for Tracing {
        fn around<'a>(&'a self, args: u32, next: Next<'a, u32, u32>) -> BoxFuture<'a, Result<u32>> {
            Box::pin(async move {
                self.events.lock().unwrap().push(format!("{}:pre", self.tag));
                let result = next.run(args + 1).await?;
                self.events
                    .lock()
                    .unwrap()
                    .push(format!("{}:post", self.tag));
                Ok(result * 2)
            })
        }
    }

    /// Returns a constant without ever calling `next`.
    struct ShortCircuit;

    impl Interceptor<u32, u32> for ShortCircuit {
        fn around<'a>(&'a self, _args: u32, _next: Next<'a, u32, u32>) -> BoxFuture<'a, Result<u32>> {
            Box::pin(async move { Ok(99) })
        }
    }

    fn counting_capability(calls: Arc<AtomicUsize>) -> Capability<u32, u32> {
        Capability::new("test", move |args: u32| {
            let calls = calls.clone();
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(args)
            })
        })
    }

    #[tokio::test]
    async fn test_registration_order_is_outermost_first() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let calls = Arc::new(AtomicUsize::new(0));
        let mut capability = counting_capability(calls.clone());
        capability.register(Tracing {
            tag: "a",
            events: events.clone(),
        });
        capability.register(Tracing {
            tag: "b",
            events: events.clone(),
        });

        // a sees 0 first, default sees 2, b doubles to 4, a doubles to 8.
        let result = capability.invoke(0).await.unwrap();
        assert_eq!(result, 8);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Pre/post nesting is preserved across the awaits.
        let events = events.lock().unwrap();
        assert_eq!(*events, vec!["a:pre", "b:pre", "b:post", "a:post"]);
    }

    #[tokio::test]
    async fn test_short_circuit_skips_inner_layers_and_default() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let calls = Arc::new(AtomicUsize::new(0));
        let mut capability = counting_capability(calls.clone());
        capability.register(Tracing {
            tag: "outer",
            events: events.clone(),
        });
        capability.register(ShortCircuit);
        capability.register(Tracing {
            tag: "never",
            events: events.clone(),
        });

        let result = capability.invoke(0).await.unwrap();
        // outer post-processes the short-circuited 99.
        assert_eq!(result, 198);
        // Neither the inner interceptor nor the default implementation ran.
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let events = events.lock().unwrap();
        assert_eq!(*events, vec!["outer:pre", "outer:post"]);
    }

    #[tokio::test]
    async fn test_empty_chain_runs_default() {
        let calls = Arc::new(AtomicUsize::new(0));
        let capability = counting_capability(calls.clone());
        assert!(capability.is_empty());
        assert_eq!(capability.invoke(7).await.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_propagate_unmodified() {
        let mut capability: Capability<u32, u32> = Capability::new("failing", |_| {
            Box::pin(async { Err(Error::Interrupted) })
        });
        let events = Arc::new(Mutex::new(Vec::new()));
        capability.register(Tracing {
            tag: "outer",
            events: events.clone(),
        });

        let err = capability.invoke(0).await.unwrap_err();
        assert!(matches!(err, Error::Interrupted));
        // The interceptor's post-processing never ran.
        let events = events.lock().unwrap();
        assert_eq!(*events, vec!["outer:pre"]);
    }
}
