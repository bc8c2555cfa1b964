//! Hostname resolution through the host's standard resolver.

use crate::error::DnsCheckError;
use crate::Result;
use std::net::IpAddr;
use std::time::Duration;

/// Resolve `hostname` with the system resolver, bounded by `timeout`.
///
/// The lookup is not routed through any particular candidate; it only
/// shows that some resolution path works on this machine right now.
/// An answer with no addresses counts as a failure.
pub async fn resolve_hostname(
    hostname: &str,
    timeout: Duration,
) -> Result<Vec<IpAddr>> {
    let lookup = tokio::net::lookup_host((hostname, 0));

    match tokio::time::timeout(timeout, lookup).await {
        Ok(Ok(addrs)) => {
            let ips: Vec<IpAddr> = addrs.map(|addr| addr.ip()).collect();
            if ips.is_empty() {
                Err(DnsCheckError::resolve(hostname, "no addresses returned"))
            } else {
                Ok(ips)
            }
        }
        Ok(Err(e)) => Err(DnsCheckError::resolve(hostname, e.to_string())),
        Err(_) => Err(DnsCheckError::timeout(
            format!("resolving {}", hostname),
            timeout,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_localhost() {
        let ips = resolve_hostname("localhost", Duration::from_secs(5))
            .await
            .unwrap();
        assert!(!ips.is_empty());
        assert!(ips.iter().all(|ip| ip.is_loopback()));
    }

    #[tokio::test]
    async fn test_resolve_ip_literal_needs_no_lookup() {
        let ips = resolve_hostname("192.0.2.7", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(ips, vec![IpAddr::from([192, 0, 2, 7])]);
    }

    #[tokio::test]
    async fn test_resolve_failure_is_probe_failure() {
        let result = resolve_hostname("bad host name", Duration::from_secs(2)).await;
        assert!(result.unwrap_err().is_probe_failure());
    }
}
