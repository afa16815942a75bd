//! Name resolution backends.
//!
//! The resolver only cares whether a lookup produced a list of address
//! strings or failed, so the backend is a small object-safe trait.

use futures::future::BoxFuture;
use std::io;
use tracing::trace;

/// Resolves a hostname to the textual addresses it currently points at.
pub trait HostLookup: Send + Sync {
    /// Look up `host`, returning every address in the answer.
    fn lookup_host<'a>(&'a self, host: &'a str) -> BoxFuture<'a, io::Result<Vec<String>>>;
}

/// Lookup backed by the system resolver through tokio.
///
/// Timeouts are whatever the platform resolver enforces.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLookup;

impl HostLookup for SystemLookup {
    fn lookup_host<'a>(&'a self, host: &'a str) -> BoxFuture<'a, io::Result<Vec<String>>> {
        Box::pin(async move {
            // Port is required by the API and discarded afterwards.
            let addrs = tokio::net::lookup_host((host, 0)).await?;
            let ips: Vec<String> = addrs.map(|addr| addr.ip().to_string()).collect();
            trace!(host = %host, count = ips.len(), "system lookup finished");
            Ok(ips)
        })
    }
}
