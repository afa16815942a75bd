//! Membership decision for a single request.

use crate::metrics::GateOutcome;
use crate::resolver::{AddressList, ResolveError};
use thiserror::Error;

/// Why a request was rejected.
#[derive(Debug, Clone, Error)]
pub enum RejectReason {
    /// Members could not be resolved and nothing was cached.
    #[error(transparent)]
    Resolution(#[from] ResolveError),

    /// The caller is not one of the resolved members.
    #[error("not on swarm service list")]
    NotMember,
}

impl RejectReason {
    /// Metric outcome for this rejection.
    pub fn outcome(&self) -> GateOutcome {
        match self {
            RejectReason::Resolution(_) => GateOutcome::ResolutionFailed,
            RejectReason::NotMember => GateOutcome::NotMember,
        }
    }
}

/// Result of checking a caller against a service.
#[derive(Debug, Clone)]
pub enum Verdict {
    Authorized,
    Rejected(RejectReason),
}

impl Verdict {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Verdict::Authorized)
    }
}

/// Decide whether `caller` may pass given the resolved members.
///
/// Matching is exact on the literal address string.
pub fn evaluate(members: Result<AddressList, ResolveError>, caller: &str) -> Verdict {
    match members {
        Ok(list) if list.contains(caller) => Verdict::Authorized,
        Ok(_) => Verdict::Rejected(RejectReason::NotMember),
        Err(e) => Verdict::Rejected(e.into()),
    }
}
