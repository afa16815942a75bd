//! Swarm service membership resolution.

mod lookup;
mod membership;

pub use lookup::{HostLookup, SystemLookup};
pub use membership::{AddressList, MembershipResolver, ResolveError, DEFAULT_LOOKUP_PREFIX};
