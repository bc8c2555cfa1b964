//! # DNS Check Library
//!
//! Probes a list of candidate DNS resolvers and reports the ones that are
//! usable, under a caller-bounded concurrency limit.
//!
//! Each candidate gets its own task. A task waits for a limiter slot,
//! runs a UDP reachability check against the candidate's DNS port,
//! resolves a target hostname through the host's resolver, releases the
//! slot, and publishes the candidate on success. The results stream ends
//! once every task has finished.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dns_check_lib::{DnsChecker, ProbeConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let checker = DnsChecker::with_config(ProbeConfig::default().with_concurrency(5));
//!     let mut stream = checker.check_servers_stream(&["8.8.8.8", "", "1.1.1.1"]);
//!
//!     while let Some(server) = stream.next_server().await {
//!         println!("{}", server);
//!     }
//! }
//! ```

// Re-export main public API types and functions
pub use checker::DnsChecker;
pub use concurrent::{CompletionTracker, ConcurrencyLimiter, ProbeSlot, ProbeStream, TaskHandle};
pub use config::{
    load_env_config, parse_duration_string, ConfigManager, DefaultsConfig, EnvConfig, FileConfig,
};
pub use error::DnsCheckError;
pub use protocols::{check_reachable, resolve_hostname, Probe, SystemProbe};
pub use source::{
    download_candidates, parse_candidate_list, read_candidates_from_file,
    DEFAULT_DOWNLOAD_TIMEOUT,
};
pub use types::{
    CandidateSource, ProbeConfig, ProbeOutcome, DEFAULT_CONCURRENCY, DEFAULT_DNS_PORT,
    DEFAULT_HOSTNAME, DEFAULT_LIST_URL, DEFAULT_TIMEOUT, MAX_CONCURRENCY,
};
pub use utils::prepare_candidates;

// Internal modules - these are not part of the public API
mod checker;
mod concurrent;
mod config;
mod error;
mod protocols;
mod source;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DnsCheckError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");

/// Get library information for debugging or display purposes.
pub fn info() -> LibraryInfo {
    LibraryInfo {
        version: VERSION,
        author: AUTHOR,
    }
}

/// Information about the library build
#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub version: &'static str,
    pub author: &'static str,
}
