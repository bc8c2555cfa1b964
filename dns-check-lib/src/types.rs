//! Core data types for resolver probing.
//!
//! This module defines the probe configuration, the per-candidate outcome
//! and the description of where candidate lists come from.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Hostname resolved by every probe unless configured otherwise.
pub const DEFAULT_HOSTNAME: &str = "google.com";

/// Default number of probes allowed in flight.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Upper bound accepted for the concurrency budget.
pub const MAX_CONCURRENCY: usize = 1000;

/// Default bound on the reachability step.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Port used for the reachability check.
pub const DEFAULT_DNS_PORT: u16 = 53;

/// Public resolver list used when no file or URL is given.
pub const DEFAULT_LIST_URL: &str = "https://public-dns.info/nameservers.txt";

/// Configuration for a probing run.
///
/// The hostname is shared read-only by every probe task; the concurrency
/// budget bounds how many probes run their network section at once.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Hostname every probe tries to resolve
    /// Default: "google.com"
    pub hostname: String,

    /// Maximum number of probes in flight
    /// Default: 10, Range: 1-1000
    pub concurrency: usize,

    /// Bound on the UDP reachability step
    /// Default: 5 seconds
    pub timeout: Duration,

    /// Bound on the hostname resolution step
    /// Default: 5 seconds
    pub resolve_timeout: Duration,

    /// Port the reachability step connects to
    /// Default: 53
    pub port: u16,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_HOSTNAME.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            resolve_timeout: DEFAULT_TIMEOUT,
            port: DEFAULT_DNS_PORT,
        }
    }
}

impl ProbeConfig {
    /// Set the hostname to resolve.
    pub fn with_hostname<H: Into<String>>(mut self, hostname: H) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// Set the concurrency budget, clamped to 1..=1000.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, MAX_CONCURRENCY);
        self
    }

    /// Set the reachability timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the resolution timeout.
    pub fn with_resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    /// Set the port used for the reachability check.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

/// Verdict of probing a single candidate.
///
/// Outcomes are transient: only `Success` values are forwarded to the
/// results stream, failures are logged and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Reachable and the hostname resolved
    Success { server: String },

    /// The reachability step failed
    ConnectFailure { server: String, reason: String },

    /// Reachable, but the hostname did not resolve
    ResolveFailure {
        server: String,
        hostname: String,
        reason: String,
    },
}

impl ProbeOutcome {
    /// The candidate this outcome belongs to.
    pub fn server(&self) -> &str {
        match self {
            Self::Success { server }
            | Self::ConnectFailure { server, .. }
            | Self::ResolveFailure { server, .. } => server,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Consume the outcome, keeping the address only on success.
    pub fn into_success(self) -> Option<String> {
        match self {
            Self::Success { server } => Some(server),
            _ => None,
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { server } => write!(f, "resolver {} is usable", server),
            Self::ConnectFailure { server, reason } => {
                write!(f, "cannot connect to resolver {}: {}", server, reason)
            }
            Self::ResolveFailure {
                server,
                hostname,
                reason,
            } => write!(
                f,
                "resolver {} cannot resolve {}: {}",
                server, hostname, reason
            ),
        }
    }
}

/// Where the candidate list is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSource {
    /// A local file, one candidate per line
    File(PathBuf),

    /// The body of an HTTP GET, one candidate per line
    Url(String),
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateSource::File(path) => write!(f, "file {}", path.display()),
            CandidateSource::Url(url) => write!(f, "{}", url),
        }
    }
}
