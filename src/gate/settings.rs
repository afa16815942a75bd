//! Replaceable gate collaborators: the reject handler and the log sink.
//!
//! Both are swapped atomically and may change while requests are in
//! flight. A request sees either the old or the new value, never a mix.

use crate::gate::{HttpResponse, RejectReason};
use arc_swap::{ArcSwap, ArcSwapOption};
use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use hyper::http::request::Parts;
use hyper::{Response, StatusCode};
use std::sync::Arc;
use tracing::warn;

/// Builds the response for a rejected request.
pub type RejectFn = dyn Fn(&Parts) -> HttpResponse + Send + Sync;

/// Destination for gate warnings.
pub trait LogSink: Send + Sync {
    /// Access control was disabled for a handler.
    fn access_bypassed(&self);

    /// A request was rejected.
    fn access_rejected(&self, addr: &str, reason: &RejectReason);
}

impl<T: LogSink + ?Sized> LogSink for Arc<T> {
    fn access_bypassed(&self) {
        (**self).access_bypassed();
    }

    fn access_rejected(&self, addr: &str, reason: &RejectReason) {
        (**self).access_rejected(addr, reason);
    }
}

/// Log sink that emits `tracing` warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn access_bypassed(&self) {
        warn!("metrics endpoint access control is bypassed");
    }

    fn access_rejected(&self, addr: &str, reason: &RejectReason) {
        warn!(addr = %addr, reason = %reason, "rejecting access to metrics handler");
    }
}

/// Default reject handler: `403 forbidden` as plain text.
pub fn default_reject_handler(_parts: &Parts) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::from_static(b"forbidden\n")));
    *response.status_mut() = StatusCode::FORBIDDEN;
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    response
}

/// Gate-wide reject handler and log sink.
///
/// Shared by every handler built from the same [`AccessGate`](crate::gate::AccessGate).
pub struct GateSettings {
    reject: ArcSwap<Box<RejectFn>>,
    logger: ArcSwapOption<Box<dyn LogSink>>,
}

impl GateSettings {
    /// Default reject handler, warnings through `tracing`.
    pub fn new() -> Self {
        let settings = Self::silent();
        settings.set_logger(Some(Box::new(TracingSink)));
        settings
    }

    /// Default reject handler, no logging.
    pub fn silent() -> Self {
        let reject: Box<RejectFn> = Box::new(default_reject_handler);
        Self {
            reject: ArcSwap::from_pointee(reject),
            logger: ArcSwapOption::new(None),
        }
    }

    /// Replace the reject handler. `None` keeps the current one.
    pub fn set_reject_handler(&self, handler: Option<Box<RejectFn>>) {
        if let Some(handler) = handler {
            self.reject.store(Arc::new(handler));
        }
    }

    /// Replace the log sink. `None` disables gate logging.
    pub fn set_logger(&self, logger: Option<Box<dyn LogSink>>) {
        self.logger.store(logger.map(Arc::new));
    }

    /// Whether a log sink is installed.
    pub fn has_logger(&self) -> bool {
        self.logger.load().is_some()
    }

    /// Run the current reject handler.
    pub fn reject(&self, parts: &Parts) -> HttpResponse {
        let handler = self.reject.load();
        handler(parts)
    }

    pub(crate) fn log_bypassed(&self) {
        if let Some(logger) = self.logger.load().as_ref() {
            logger.access_bypassed();
        }
    }

    pub(crate) fn log_rejected(&self, addr: &str, reason: &RejectReason) {
        if let Some(logger) = self.logger.load().as_ref() {
            logger.access_rejected(addr, reason);
        }
    }
}

impl Default for GateSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GateSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateSettings")
            .field("has_logger", &self.has_logger())
            .finish_non_exhaustive()
    }
}
