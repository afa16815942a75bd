//! Membership-based access control for HTTP handlers.
//!
//! [`AccessGate::handler`] wraps a delegate so that only callers whose
//! address is among the resolved members of a swarm service reach it.
//! Everyone else gets the reject handler's response.

mod access;
mod address;
mod handler;
mod settings;
mod verdict;

pub use access::AccessGate;
pub use address::{caller_address, split_host_port, strip_port, RemoteAddr};
pub use handler::{handler_fn, HandlerFn, HttpHandler, HttpResponse, SharedHandler};
pub use settings::{default_reject_handler, GateSettings, LogSink, RejectFn, TracingSink};
pub use verdict::{evaluate, RejectReason, Verdict};
