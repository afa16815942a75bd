//! Request handler abstraction shared by the gate, the exporter and the server.

use bytes::Bytes;
use futures::future::BoxFuture;
use http_body_util::Full;
use hyper::{Request, Response};
use std::future::Future;
use std::sync::Arc;

/// Response type produced by every handler in this crate.
pub type HttpResponse = Response<Full<Bytes>>;

/// An HTTP request handler.
///
/// The returned future owns everything it needs, so handlers can be shared
/// behind an `Arc` and called from any connection task.
pub trait HttpHandler<B>: Send + Sync {
    fn call(&self, req: Request<B>) -> BoxFuture<'static, HttpResponse>;
}

/// Shared, type-erased handler.
pub type SharedHandler<B> = Arc<dyn HttpHandler<B>>;

/// Handler built from a closure. See [`handler_fn`].
#[derive(Clone, Copy)]
pub struct HandlerFn<F> {
    f: F,
}

/// Wrap a closure returning a response future as an [`HttpHandler`].
pub fn handler_fn<F>(f: F) -> HandlerFn<F> {
    HandlerFn { f }
}

impl<B, F, Fut> HttpHandler<B> for HandlerFn<F>
where
    F: Fn(Request<B>) -> Fut + Send + Sync,
    Fut: Future<Output = HttpResponse> + Send + 'static,
{
    fn call(&self, req: Request<B>) -> BoxFuture<'static, HttpResponse> {
        Box::pin((self.f)(req))
    }
}

impl<F> std::fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerFn").finish_non_exhaustive()
    }
}
