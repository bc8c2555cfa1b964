//! UDP reachability check against a candidate resolver.
//!
//! UDP is connectionless, so "connecting" only binds a local socket and
//! fixes its peer. It fails fast when the candidate cannot be turned into
//! an address or when the host has no route to it; it does not prove that
//! anything answers on the other side.

use crate::error::DnsCheckError;
use crate::utils::strip_brackets;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;

/// Check that `server:port` is reachable over UDP within `timeout`.
///
/// The candidate may be an IPv4 literal, an IPv6 literal (bare or in
/// brackets) or a host name. The socket opened for the check is dropped
/// before this function returns, whatever the outcome.
///
/// # Returns
///
/// The socket address that was connected to.
///
/// # Errors
///
/// - `InvalidCandidate` if the candidate does not resolve to an address
/// - `ConnectFailed` if binding or connecting the socket fails
/// - `Timeout` if the whole step takes longer than `timeout`
pub async fn check_reachable(
    server: &str,
    port: u16,
    timeout: Duration,
) -> Result<SocketAddr, DnsCheckError> {
    match tokio::time::timeout(timeout, connect_udp(server, port)).await {
        Ok(result) => result,
        Err(_) => Err(DnsCheckError::timeout(
            format!("UDP connect to {}:{}", server, port),
            timeout,
        )),
    }
}

async fn connect_udp(server: &str, port: u16) -> Result<SocketAddr, DnsCheckError> {
    let target = target_addr(server, port).await?;

    let local: SocketAddr = if target.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };

    let socket = UdpSocket::bind(local)
        .await
        .map_err(|e| DnsCheckError::connect(server, format!("bind failed: {}", e)))?;

    socket
        .connect(target)
        .await
        .map_err(|e| DnsCheckError::connect(server, e.to_string()))?;

    Ok(target)
}

/// Turn a candidate into the socket address to probe.
///
/// IP literals are used as-is; anything else goes through the system
/// resolver and the first address wins.
pub(crate) async fn target_addr(server: &str, port: u16) -> Result<SocketAddr, DnsCheckError> {
    let host = strip_brackets(server);

    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }

    let mut addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| DnsCheckError::invalid_candidate(server, e.to_string()))?;

    addrs
        .next()
        .ok_or_else(|| DnsCheckError::invalid_candidate(server, "no addresses found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_target_addr_ip_literals() {
        let v4 = target_addr("8.8.8.8", 53).await.unwrap();
        assert_eq!(v4, "8.8.8.8:53".parse::<SocketAddr>().unwrap());

        let v6 = target_addr("2001:4860:4860::8888", 53).await.unwrap();
        assert_eq!(v6.port(), 53);
        assert!(v6.is_ipv6());

        let bracketed = target_addr("[::1]", 5353).await.unwrap();
        assert_eq!(bracketed, "[::1]:5353".parse::<SocketAddr>().unwrap());
    }

    #[tokio::test]
    async fn test_loopback_is_reachable() {
        let addr = check_reachable("127.0.0.1", 53, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(addr.ip(), IpAddr::from([127, 0, 0, 1]));
    }

    #[tokio::test]
    async fn test_garbage_candidate_fails() {
        let result = check_reachable("not a resolver!", 53, Duration::from_secs(2)).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().is_probe_failure());
    }
}
