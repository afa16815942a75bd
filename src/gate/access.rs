//! Access-gated handler construction.

use crate::gate::{
    caller_address, evaluate, GateSettings, HttpHandler, HttpResponse, SharedHandler, Verdict,
};
use crate::metrics::{GateOutcome, MetricsCollector};
use crate::resolver::MembershipResolver;
use futures::future::BoxFuture;
use hyper::Request;
use std::sync::Arc;
use tracing::debug;

/// Builds handlers that only admit members of a swarm service.
#[derive(Clone, Debug)]
pub struct AccessGate {
    resolver: Arc<MembershipResolver>,
    settings: Arc<GateSettings>,
    metrics: Option<MetricsCollector>,
}

impl AccessGate {
    /// Create a gate over a resolver and its shared settings.
    pub fn new(resolver: Arc<MembershipResolver>, settings: Arc<GateSettings>) -> Self {
        Self {
            resolver,
            settings,
            metrics: None,
        }
    }

    /// Count decisions into the given collector.
    pub fn with_metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn settings(&self) -> &Arc<GateSettings> {
        &self.settings
    }

    pub fn resolver(&self) -> &Arc<MembershipResolver> {
        &self.resolver
    }

    /// Wrap `delegate` so only members of `service` reach it.
    ///
    /// An empty service name disables access control: `delegate` is
    /// returned as is and a bypass warning is logged once, here.
    pub fn handler<B>(&self, service: &str, delegate: SharedHandler<B>) -> SharedHandler<B>
    where
        B: Send + 'static,
    {
        if service.is_empty() {
            self.settings.log_bypassed();
            return delegate;
        }

        Arc::new(GatedHandler {
            service: Arc::from(service),
            delegate,
            gate: self.clone(),
        })
    }

    /// Decide whether `caller` currently belongs to `service`.
    pub async fn check(&self, service: &str, caller: &str) -> Verdict {
        evaluate(self.resolver.get_service_ips(service).await, caller)
    }

    fn record(&self, service: &str, outcome: GateOutcome) {
        if let Some(ref metrics) = self.metrics {
            metrics.record_request(service, outcome);
        }
    }
}

/// Handler returned by [`AccessGate::handler`] for a non-empty service.
struct GatedHandler<B> {
    service: Arc<str>,
    delegate: SharedHandler<B>,
    gate: AccessGate,
}

impl<B> HttpHandler<B> for GatedHandler<B>
where
    B: Send + 'static,
{
    fn call(&self, req: Request<B>) -> BoxFuture<'static, HttpResponse> {
        let service = Arc::clone(&self.service);
        let delegate = Arc::clone(&self.delegate);
        let gate = self.gate.clone();

        Box::pin(async move {
            let caller = caller_address(&req);

            match gate.check(&service, &caller).await {
                Verdict::Authorized => {
                    debug!(service = %service, addr = %caller, "access granted");
                    gate.record(&service, GateOutcome::Allowed);
                    delegate.call(req).await
                }
                Verdict::Rejected(reason) => {
                    let (parts, _body) = req.into_parts();
                    let response = gate.settings.reject(&parts);
                    gate.settings.log_rejected(&caller, &reason);
                    gate.record(&service, reason.outcome());
                    response
                }
            }
        })
    }
}
