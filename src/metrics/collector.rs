//! Metrics collector using prometheus-client.
//!
//! Counts gate decisions and membership lookups. The registry it owns is
//! the one the exporter serves, so callers can register their own metrics
//! next to these before the collector is built.

use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;
use std::sync::Arc;

/// Labels for gate decision metrics.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RequestLabels {
    pub service: String,
    pub outcome: String,
}

/// Labels for lookup metrics.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct LookupLabels {
    pub service: String,
    pub result: String,
}

/// How a gated request was decided.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum GateOutcome {
    Allowed,
    NotMember,
    ResolutionFailed,
}

impl GateOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateOutcome::Allowed => "allowed",
            GateOutcome::NotMember => "not_member",
            GateOutcome::ResolutionFailed => "resolution_failed",
        }
    }
}

/// Where a membership answer came from.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum LookupResult {
    /// Fresh lookup succeeded.
    Fresh,
    /// Lookup failed, cached answer served.
    Stale,
    /// Lookup failed and nothing was cached.
    Failed,
}

impl LookupResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupResult::Fresh => "fresh",
            LookupResult::Stale => "stale",
            LookupResult::Failed => "failed",
        }
    }
}

/// Collects and stores all metrics.
#[derive(Clone, Debug)]
pub struct MetricsCollector {
    inner: Arc<MetricsCollectorInner>,
}

#[derive(Debug)]
struct MetricsCollectorInner {
    /// Gate decisions counter.
    requests_total: Family<RequestLabels, Counter>,
    /// Membership lookups counter.
    lookups_total: Family<LookupLabels, Counter>,
    /// The prometheus registry.
    registry: Registry,
}

impl MetricsCollector {
    /// Create a new metrics collector with an empty registry.
    pub fn new() -> Self {
        Self::with_registry(Registry::default())
    }

    /// Register the gate metrics into an existing registry.
    pub fn with_registry(mut registry: Registry) -> Self {
        let requests_total = Family::<RequestLabels, Counter>::default();
        let lookups_total = Family::<LookupLabels, Counter>::default();

        registry.register(
            "swarmgate_requests",
            "Requests seen by the access gate, by decision",
            requests_total.clone(),
        );
        registry.register(
            "swarmgate_lookups",
            "Service membership lookups, by answer source",
            lookups_total.clone(),
        );

        Self {
            inner: Arc::new(MetricsCollectorInner {
                requests_total,
                lookups_total,
                registry,
            }),
        }
    }

    /// Get the prometheus registry for encoding.
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// Record a gate decision.
    pub fn record_request(&self, service: &str, outcome: GateOutcome) {
        let labels = RequestLabels {
            service: service.to_string(),
            outcome: outcome.as_str().to_string(),
        };
        self.inner.requests_total.get_or_create(&labels).inc();
    }

    /// Record a membership lookup.
    pub fn record_lookup(&self, service: &str, result: LookupResult) {
        let labels = LookupLabels {
            service: service.to_string(),
            result: result.as_str().to_string(),
        };
        self.inner.lookups_total.get_or_create(&labels).inc();
    }

    /// Current count of gate decisions with the given outcome.
    pub fn request_count(&self, service: &str, outcome: GateOutcome) -> u64 {
        let labels = RequestLabels {
            service: service.to_string(),
            outcome: outcome.as_str().to_string(),
        };
        self.inner.requests_total.get_or_create(&labels).get()
    }

    /// Current count of lookups with the given result.
    pub fn lookup_count(&self, service: &str, result: LookupResult) -> u64 {
        let labels = LookupLabels {
            service: service.to_string(),
            result: result.as_str().to_string(),
        };
        self.inner.lookups_total.get_or_create(&labels).get()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
