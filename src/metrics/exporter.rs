//! Prometheus exposition handler.
//!
//! This is the delegate the access gate protects.

use crate::gate::{handler_fn, HttpResponse, SharedHandler};
use crate::metrics::MetricsCollector;
use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Request, Response, StatusCode};
use prometheus_client::encoding::text::encode;
use std::future;
use std::sync::Arc;
use tracing::error;

/// Content type of the text exposition produced by `prometheus-client`.
pub const OPENMETRICS_CONTENT_TYPE: &str =
    "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// Encode the collector's registry into a response.
pub fn render_metrics(collector: &MetricsCollector) -> HttpResponse {
    let mut buffer = String::new();
    if let Err(e) = encode(&mut buffer, collector.registry()) {
        error!(error = %e, "failed to encode metrics");
        let mut response = Response::new(Full::new(Bytes::from_static(
            b"Failed to encode metrics\n",
        )));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        return response;
    }

    let mut response = Response::new(Full::new(Bytes::from(buffer)));
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static(OPENMETRICS_CONTENT_TYPE),
    );
    response
}

/// Handler serving the collector's registry.
pub fn exporter_handler<B>(collector: MetricsCollector) -> SharedHandler<B>
where
    B: Send + 'static,
{
    Arc::new(handler_fn(move |_req: Request<B>| {
        future::ready(render_metrics(&collector))
    }))
}
