//! Probe implementations for resolver checking.
//!
//! A probe runs two steps against one candidate: a UDP reachability check
//! on the candidate's DNS port, then a hostname resolution through the
//! host's standard resolver.

/// UDP reachability check
pub mod reachability;

/// Hostname resolution through the system resolver
pub mod resolution;

/// The `Probe` seam and the production probe
pub mod probe;

pub use probe::{Probe, SystemProbe};
pub use reachability::check_reachable;
pub use resolution::resolve_hostname;
