//! swarmgate - Prometheus endpoint access control for swarm services
//!
//! Only callers whose address belongs to a running task of a configured
//! swarm service may reach the wrapped handler:
//! - Task addresses are resolved through `tasks.<service>` lookups
//! - The last good answer is served when a lookup fails
//! - Rejected callers get a replaceable reject response (403 by default)
//! - An empty service name disables the check

pub mod config;
pub mod gate;
pub mod metrics;
pub mod resolver;
pub mod server;
pub mod util;

pub use config::Config;
pub use gate::{AccessGate, GateSettings};
pub use resolver::MembershipResolver;
