//! The resolver probe.
//!
//! [`Probe`] is the seam between the dispatcher and the network: the
//! dispatcher only ever asks a probe for a verdict on one candidate.
//! [`SystemProbe`] is the implementation used in production.

use crate::protocols::reachability::check_reachable;
use crate::protocols::resolution::resolve_hostname;
use crate::types::{ProbeConfig, ProbeOutcome};
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// Decides whether one candidate resolver is usable.
///
/// Implementations must never fail the caller: every error is folded into
/// the returned [`ProbeOutcome`].
pub trait Probe: Send + Sync + 'static {
    /// Probe a single, already trimmed candidate address.
    fn probe(&self, server: &str) -> impl Future<Output = ProbeOutcome> + Send;
}

/// Production probe: UDP reachability on the DNS port, then a hostname
/// lookup through the system resolver.
///
/// The lookup does not go through the candidate itself, so a success only
/// says that the candidate was reachable and that name resolution worked
/// on this host at the time of the probe.
#[derive(Debug, Clone)]
pub struct SystemProbe {
    hostname: String,
    port: u16,
    timeout: Duration,
    resolve_timeout: Duration,
}

impl SystemProbe {
    /// Build a probe from the run configuration.
    pub fn from_config(config: &ProbeConfig) -> Self {
        Self {
            hostname: config.hostname.clone(),
            port: config.port,
            timeout: config.timeout,
            resolve_timeout: config.resolve_timeout,
        }
    }

    /// The hostname this probe resolves.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::from_config(&ProbeConfig::default())
    }
}

impl Probe for SystemProbe {
    async fn probe(&self, server: &str) -> ProbeOutcome {
        if let Err(e) = check_reachable(server, self.port, self.timeout).await {
            let outcome = ProbeOutcome::ConnectFailure {
                server: server.to_string(),
                reason: e.to_string(),
            };
            warn!(server, "{}", outcome);
            return outcome;
        }

        if let Err(e) = resolve_hostname(&self.hostname, self.resolve_timeout).await {
            let outcome = ProbeOutcome::ResolveFailure {
                server: server.to_string(),
                hostname: self.hostname.clone(),
                reason: e.to_string(),
            };
            warn!(server, hostname = %self.hostname, "{}", outcome);
            return outcome;
        }

        let outcome = ProbeOutcome::Success {
            server: server.to_string(),
        };
        info!(server, hostname = %self.hostname, "{}", outcome);
        outcome
    }
}
