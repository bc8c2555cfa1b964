//! Main resolver checker implementation.
//!
//! This module provides the `DnsChecker` struct that dispatches one probe
//! task per candidate, bounds the probes in flight and streams back the
//! candidates that turned out to be usable.

use crate::concurrent::{CompletionTracker, ConcurrencyLimiter, ProbeStream, TaskHandle};
use crate::protocols::{Probe, SystemProbe};
use crate::types::{ProbeConfig, ProbeOutcome};
use crate::utils::prepare_candidates;
use std::sync::Arc;
use tracing::{debug, error};

/// Dispatcher that probes candidate resolvers concurrently.
///
/// The checker owns the run configuration and a [`Probe`]. By default the
/// probe is a [`SystemProbe`]; tests and embedders can plug in their own.
///
/// # Example
///
/// ```rust,no_run
/// use dns_check_lib::{DnsChecker, ProbeConfig};
///
/// #[tokio::main]
/// async fn main() {
///     let checker = DnsChecker::with_config(ProbeConfig::default().with_concurrency(20));
///     let usable = checker.check_servers(&["8.8.8.8", "1.1.1.1"]).await;
///     println!("usable resolvers: {:?}", usable);
/// }
/// ```
pub struct DnsChecker<P: Probe = SystemProbe> {
    /// Configuration settings for this checker instance
    config: ProbeConfig,
    /// Probe shared by every task of a run
    probe: Arc<P>,
}

impl DnsChecker<SystemProbe> {
    /// Create a new checker with default configuration.
    ///
    /// Default settings:
    /// - Hostname: google.com
    /// - Concurrency: 10
    /// - Timeout: 5 seconds
    pub fn new() -> Self {
        Self::with_config(ProbeConfig::default())
    }

    /// Create a new checker with custom configuration.
    pub fn with_config(config: ProbeConfig) -> Self {
        let probe = SystemProbe::from_config(&config);
        Self::with_probe(config, probe)
    }
}

impl Default for DnsChecker<SystemProbe> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Probe> Clone for DnsChecker<P> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            probe: Arc::clone(&self.probe),
        }
    }
}

impl<P: Probe> DnsChecker<P> {
    /// Create a checker around a custom probe.
    ///
    /// Only the concurrency budget of `config` is used by the dispatcher;
    /// the probe carries its own hostname and timeouts.
    pub fn with_probe(config: ProbeConfig, probe: P) -> Self {
        Self {
            config,
            probe: Arc::new(probe),
        }
    }

    /// Get the current configuration for this checker.
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Probe a single candidate, outside of any concurrency limit.
    pub async fn check_server(&self, server: &str) -> ProbeOutcome {
        self.probe.probe(server.trim()).await
    }

    /// Dispatch one probe task per candidate and stream back the usable ones.
    ///
    /// Candidates are trimmed and blank entries are skipped without being
    /// probed. Every other entry, duplicates included, gets its own task.
    /// Each task waits for a limiter slot before probing, so at most
    /// `concurrency` probes are on the network at once no matter how many
    /// tasks are queued.
    ///
    /// Returns immediately; results arrive in completion order and the
    /// stream ends once every task has finished. Must be called from within
    /// a tokio runtime.
    pub fn check_servers_stream<S: AsRef<str>>(&self, candidates: &[S]) -> ProbeStream {
        let (tracker, stream) = CompletionTracker::channel();
        let limiter = ConcurrencyLimiter::new(self.config.concurrency);

        for server in prepare_candidates(candidates) {
            let handle = tracker.register();
            tokio::spawn(run_probe_task(
                server,
                Arc::clone(&self.probe),
                limiter.clone(),
                handle,
            ));
        }

        debug!(
            tasks = tracker.outstanding(),
            concurrency = limiter.capacity(),
            "dispatched probe tasks"
        );
        tracker.seal();

        stream
    }

    /// Probe every candidate and collect the usable ones.
    ///
    /// Order follows completion, not input order.
    pub async fn check_servers<S: AsRef<str>>(&self, candidates: &[S]) -> Vec<String> {
        self.check_servers_stream(candidates).collect_all().await
    }
}

/// Body of one probe task: `Acquiring-Slot -> Probing -> Published | Discarded`.
///
/// `handle` is dropped when this future completes or unwinds, which is the
/// task's `Finished` transition.
async fn run_probe_task<P: Probe>(
    server: String,
    probe: Arc<P>,
    limiter: ConcurrencyLimiter,
    handle: TaskHandle,
) {
    let outcome = {
        let _slot = match limiter.acquire().await {
            Ok(slot) => slot,
            Err(e) => {
                error!(server = %server, "{}", e);
                return;
            }
        };
        probe.probe(&server).await
    };

    if let Some(server) = outcome.into_success() {
        handle.publish(server);
    }
}
