//! HTTP server for the gated metrics endpoint.
//!
//! Every request is tagged with its peer address before routing so the
//! access gate can check it.

use crate::gate::{HttpResponse, RemoteAddr, SharedHandler};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::header::{HeaderValue, ALLOW};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{debug, error, info};

/// Metrics HTTP server.
pub struct ExporterServer {
    /// Bound listener.
    listener: TcpListener,
    /// Path served by the gated handler.
    path: Arc<str>,
    /// Gated metrics handler.
    handler: SharedHandler<Incoming>,
}

impl ExporterServer {
    /// Bind the server.
    pub async fn bind(
        address: SocketAddr,
        path: &str,
        handler: SharedHandler<Incoming>,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind(address).await?;

        Ok(Self {
            listener,
            path: Arc::from(path),
            handler,
        })
    }

    /// Address the server is listening on.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the server until shutdown.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        match self.listener.local_addr() {
            Ok(address) => info!(address = %address, path = %self.path, "metrics server started"),
            Err(e) => error!(error = %e, "failed to read metrics server address"),
        }

        loop {
            tokio::select! {
                accept_result = self.listener.accept() => {
                    match accept_result {
                        Ok((stream, addr)) => {
                            self.handle_connection(stream, addr);
                        }
                        Err(e) => {
                            error!(error = %e, "failed to accept metrics connection");
                        }
                    }
                }

                _ = shutdown.recv() => {
                    info!("metrics server shutting down");
                    break;
                }
            }
        }
    }

    fn handle_connection(&self, stream: TcpStream, peer: SocketAddr) {
        let handler = Arc::clone(&self.handler);
        let path = Arc::clone(&self.path);

        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            let service = service_fn(move |mut req: Request<Incoming>| {
                req.extensions_mut().insert(RemoteAddr::from(peer));
                let handler = Arc::clone(&handler);
                let path = Arc::clone(&path);
                async move { Ok::<_, Infallible>(route(req, &handler, &path).await) }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                debug!(error = %e, peer = %peer, "metrics connection error");
            }
        });
    }
}

/// Route a request to the gated handler or the built-in endpoints.
pub async fn route<B>(req: Request<B>, handler: &SharedHandler<B>, metrics_path: &str) -> HttpResponse {
    let path = req.uri().path();
    debug!(path = %path, method = %req.method(), "metrics request");

    if path == metrics_path {
        if req.method() != Method::GET && req.method() != Method::HEAD {
            let mut response = text_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed\n");
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
            return response;
        }
        return handler.call(req).await;
    }

    match path {
        "/health" | "/healthz" => text_response(StatusCode::OK, "OK\n"),
        _ => text_response(StatusCode::NOT_FOUND, "Not found\n"),
    }
}

fn text_response(status: StatusCode, body: &'static str) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::handler_fn;

    fn ok_handler() -> SharedHandler<()> {
        Arc::new(handler_fn(|_req: Request<()>| async {
            text_response(StatusCode::OK, "metrics\n")
        }))
    }

    fn request(method: Method, path: &str) -> Request<()> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(())
            .unwrap()
    }

    #[tokio::test]
    async fn test_route_metrics_path() {
        let response = route(request(Method::GET, "/metrics"), &ok_handler(), "/metrics").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_route_rejects_post() {
        let response = route(request(Method::POST, "/metrics"), &ok_handler(), "/metrics").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "GET, HEAD");
    }

    #[tokio::test]
    async fn test_route_health_and_unknown() {
        let health = route(request(Method::GET, "/healthz"), &ok_handler(), "/metrics").await;
        assert_eq!(health.status(), StatusCode::OK);

        let missing = route(request(Method::GET, "/nope"), &ok_handler(), "/metrics").await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let handler: SharedHandler<Incoming> = Arc::new(handler_fn(|_req: Request<Incoming>| async {
            text_response(StatusCode::OK, "metrics\n")
        }));
        let server = ExporterServer::bind("127.0.0.1:0".parse().unwrap(), "/metrics", handler)
            .await
            .unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);
    }
}
