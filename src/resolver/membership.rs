//! Service membership resolution with stale-cache fallback.

use crate::metrics::{LookupResult, MetricsCollector};
use crate::resolver::{HostLookup, SystemLookup};
use dashmap::DashMap;
use std::io;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Default prefix that turns a service name into its task enumeration name.
pub const DEFAULT_LOOKUP_PREFIX: &str = "tasks.";

/// Errors returned by [`MembershipResolver::get_service_ips`].
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("service name must not be empty")]
    EmptyService,

    #[error("lookup {host} failed: {source}")]
    Lookup {
        host: String,
        #[source]
        source: Arc<io::Error>,
    },

    #[error("lookup {host} returned no addresses")]
    NoAddresses { host: String },
}

/// Addresses returned by a single resolution.
///
/// Cheap to clone; the cache and every caller share the same allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressList(Arc<[String]>);

impl AddressList {
    /// Exact, case-sensitive membership test.
    pub fn contains(&self, addr: &str) -> bool {
        self.0.iter().any(|candidate| candidate == addr)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for AddressList {
    fn from(addrs: Vec<String>) -> Self {
        Self(addrs.into())
    }
}

/// Resolves the member addresses of swarm services.
///
/// Every call performs a fresh lookup. Successful answers overwrite the
/// cached list for the service; failed lookups fall back to the last good
/// answer when there is one.
pub struct MembershipResolver {
    /// Backend used for fresh lookups.
    lookup: Arc<dyn HostLookup>,
    /// Prepended to the service name to form the lookup name.
    prefix: String,
    /// Last successful answer per service. Never evicted.
    cache: DashMap<String, AddressList>,
    /// Optional lookup counters.
    metrics: Option<MetricsCollector>,
}

impl MembershipResolver {
    /// Create a resolver over the given lookup backend.
    pub fn new(lookup: Arc<dyn HostLookup>) -> Self {
        Self {
            lookup,
            prefix: DEFAULT_LOOKUP_PREFIX.to_string(),
            cache: DashMap::new(),
            metrics: None,
        }
    }

    /// Create a resolver using the system resolver.
    pub fn system() -> Self {
        Self::new(Arc::new(SystemLookup))
    }

    /// Replace the lookup name prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Count lookup results into the given collector.
    pub fn with_metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Name that is looked up for `service`.
    pub fn resolution_name(&self, service: &str) -> String {
        format!("{}{}", self.prefix, service)
    }

    /// Return the current member addresses of `service`.
    ///
    /// A failed lookup is hidden when a previous answer is cached. An `Ok`
    /// result always holds at least one address.
    pub async fn get_service_ips(&self, service: &str) -> Result<AddressList, ResolveError> {
        if service.is_empty() {
            return Err(ResolveError::EmptyService);
        }

        let host = self.resolution_name(service);

        // No cache guard may be held across this await.
        let error = match self.lookup.lookup_host(&host).await {
            Ok(addrs) if !addrs.is_empty() => {
                let list = AddressList::from(addrs);
                self.cache.insert(service.to_string(), list.clone());
                self.record(service, LookupResult::Fresh);
                return Ok(list);
            }
            Ok(_) => ResolveError::NoAddresses { host },
            Err(e) => ResolveError::Lookup {
                host,
                source: Arc::new(e),
            },
        };

        match self.cached(service) {
            Some(list) => {
                debug!(
                    service = %service,
                    error = %error,
                    members = list.len(),
                    "lookup failed, serving cached members"
                );
                self.record(service, LookupResult::Stale);
                Ok(list)
            }
            None => {
                self.record(service, LookupResult::Failed);
                Err(error)
            }
        }
    }

    /// Last successful answer for `service`, if any.
    pub fn cached(&self, service: &str) -> Option<AddressList> {
        self.cache.get(service).map(|entry| entry.value().clone())
    }

    /// Number of services with a cached answer.
    pub fn cached_services(&self) -> usize {
        self.cache.len()
    }

    fn record(&self, service: &str, result: LookupResult) {
        if let Some(ref metrics) = self.metrics {
            metrics.record_lookup(service, result);
        }
    }
}

impl std::fmt::Debug for MembershipResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipResolver")
            .field("prefix", &self.prefix)
            .field("cached_services", &self.cache.len())
            .finish()
    }
}
