//! Integration tests for swarmgate.
//!
//! These tests run the real server on an ephemeral port and talk to it
//! over TCP.

use futures::future::BoxFuture;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use swarmgate::config::parse_config;
use swarmgate::gate::{AccessGate, GateSettings};
use swarmgate::metrics::{exporter_handler, GateOutcome, MetricsCollector};
use swarmgate::resolver::{HostLookup, MembershipResolver};
use swarmgate::server::ExporterServer;
use swarmgate::util::ShutdownSignal;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Lookup answering `tasks.<service>` with fixed addresses until switched off.
struct SwitchableLookup {
    host: String,
    addrs: Vec<String>,
    available: AtomicBool,
}

impl SwitchableLookup {
    fn new(service: &str, addrs: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            host: format!("tasks.{service}"),
            addrs: addrs.iter().map(|a| a.to_string()).collect(),
            available: AtomicBool::new(true),
        })
    }
}

impl HostLookup for SwitchableLookup {
    fn lookup_host<'a>(&'a self, host: &'a str) -> BoxFuture<'a, io::Result<Vec<String>>> {
        Box::pin(async move {
            if host == self.host && self.available.load(Ordering::SeqCst) {
                Ok(self.addrs.clone())
            } else {
                Err(io::Error::new(io::ErrorKind::NotFound, "no such host"))
            }
        })
    }
}

struct RunningServer {
    addr: SocketAddr,
    shutdown: ShutdownSignal,
    collector: MetricsCollector,
}

async fn start_server(service: &str, lookup: Arc<SwitchableLookup>) -> RunningServer {
    let collector = MetricsCollector::new();
    let resolver = MembershipResolver::new(lookup).with_metrics(collector.clone());
    let gate = AccessGate::new(Arc::new(resolver), Arc::new(GateSettings::silent()))
        .with_metrics(collector.clone());
    let handler = gate.handler(service, exporter_handler(collector.clone()));

    let server = ExporterServer::bind("127.0.0.1:0".parse().unwrap(), "/metrics", handler)
        .await
        .expect("failed to bind");
    let addr = server.local_addr().unwrap();

    let shutdown = ShutdownSignal::new();
    tokio::spawn(server.run(shutdown.subscribe()));

    RunningServer {
        addr,
        shutdown,
        collector,
    }
}

async fn http_get(addr: SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("failed to connect");
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.expect("failed to write");

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.expect("failed to read");
    String::from_utf8(response).expect("response is not utf-8")
}

#[tokio::test]
async fn test_member_can_scrape() {
    let server = start_server("prometheus", SwitchableLookup::new("prometheus", &["127.0.0.1"])).await;

    let response = http_get(server.addr, "/metrics").await;

    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains("swarmgate_lookups_total"));
    assert_eq!(server.collector.request_count("prometheus", GateOutcome::Allowed), 1);

    server.shutdown.shutdown();
}

#[tokio::test]
async fn test_non_member_is_forbidden() {
    let server = start_server("prometheus", SwitchableLookup::new("prometheus", &["10.0.0.1"])).await;

    let response = http_get(server.addr, "/metrics").await;

    assert!(response.starts_with("HTTP/1.1 403"));
    assert!(response.ends_with("forbidden\n"));
    assert_eq!(server.collector.request_count("prometheus", GateOutcome::NotMember), 1);

    server.shutdown.shutdown();
}

#[tokio::test]
async fn test_unresolvable_service_is_forbidden() {
    let lookup = SwitchableLookup::new("prometheus", &["127.0.0.1"]);
    lookup.available.store(false, Ordering::SeqCst);
    let server = start_server("prometheus", lookup).await;

    let response = http_get(server.addr, "/metrics").await;

    assert!(response.starts_with("HTTP/1.1 403"));
    assert_eq!(
        server.collector.request_count("prometheus", GateOutcome::ResolutionFailed),
        1
    );

    server.shutdown.shutdown();
}

#[tokio::test]
async fn test_stale_members_survive_dns_outage() {
    let lookup = SwitchableLookup::new("prometheus", &["127.0.0.1"]);
    let server = start_server("prometheus", Arc::clone(&lookup)).await;

    assert!(http_get(server.addr, "/metrics").await.starts_with("HTTP/1.1 200"));

    lookup.available.store(false, Ordering::SeqCst);
    assert!(http_get(server.addr, "/metrics").await.starts_with("HTTP/1.1 200"));
    assert_eq!(server.collector.request_count("prometheus", GateOutcome::Allowed), 2);

    server.shutdown.shutdown();
}

#[tokio::test]
async fn test_empty_service_bypasses_gate() {
    let lookup = SwitchableLookup::new("prometheus", &["10.0.0.1"]);
    lookup.available.store(false, Ordering::SeqCst);
    let server = start_server("", lookup).await;

    let response = http_get(server.addr, "/metrics").await;

    assert!(response.starts_with("HTTP/1.1 200"));

    server.shutdown.shutdown();
}

#[tokio::test]
async fn test_health_is_not_gated() {
    let server = start_server("prometheus", SwitchableLookup::new("prometheus", &["10.0.0.1"])).await;

    let response = http_get(server.addr, "/health").await;

    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.ends_with("OK\n"));

    server.shutdown.shutdown();
}

#[test]
fn test_config_parsing() {
    let config = parse_config(
        r#"
global:
  log_level: warn

server:
  address: "0.0.0.0:9323"

access:
  service: monitoring_prometheus
"#,
    )
    .expect("failed to parse config");

    assert_eq!(config.global.log_level, "warn");
    assert_eq!(config.server.address.port(), 9323);
    assert_eq!(config.access.service, "monitoring_prometheus");
    assert_eq!(config.access.lookup_prefix, "tasks.");
}

#[test]
fn test_config_validation_rejects_bad_service() {
    let result = parse_config("access:\n  service: \"bad name\"\n");
    assert!(result.is_err());
}
