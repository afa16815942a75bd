//! Caller address extraction.

use hyper::Request;
use std::net::SocketAddr;

/// Transport-level peer address of a request, as `host:port`.
///
/// Inserted into the request extensions by the accepting server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAddr(pub String);

impl From<SocketAddr> for RemoteAddr {
    fn from(addr: SocketAddr) -> Self {
        Self(addr.to_string())
    }
}

/// Address used for the membership test.
///
/// The port is stripped when the remote address parses as `host:port`;
/// otherwise the raw value is used. Requests without a [`RemoteAddr`]
/// yield an empty string.
pub fn caller_address<B>(req: &Request<B>) -> String {
    let remote = req
        .extensions()
        .get::<RemoteAddr>()
        .map(|addr| addr.0.as_str())
        .unwrap_or("");

    strip_port(remote).to_string()
}

/// Host part of `remote`, or `remote` itself when it has no valid port.
pub fn strip_port(remote: &str) -> &str {
    split_host_port(remote).map(|(host, _)| host).unwrap_or(remote)
}

/// Split `host:port` or `[host]:port`.
///
/// Returns `None` for a missing port, unbalanced brackets, or an
/// unbracketed host containing colons.
pub fn split_host_port(addr: &str) -> Option<(&str, &str)> {
    if let Some(rest) = addr.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        let port = tail.strip_prefix(':')?;
        if host.contains('[') || port.contains([':', '[', ']']) {
            return None;
        }
        return Some((host, port));
    }

    let (host, port) = addr.rsplit_once(':')?;
    if host.contains([':', '[', ']']) || port.contains(['[', ']']) {
        return None;
    }
    Some((host, port))
}
