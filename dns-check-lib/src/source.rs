//! Candidate list acquisition.
//!
//! Candidate resolvers come from a local file or from the body of an HTTP
//! GET. Both are newline separated; blank lines and `#` comment lines
//! are skipped. Any failure here is fatal for the run and happens before a
//! single probe is dispatched.

use crate::error::DnsCheckError;
use crate::types::CandidateSource;
use crate::Result;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Default bound on downloading a resolver list.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Split a resolver list into candidates.
///
/// Lines are trimmed; empty lines and lines starting with `#` are dropped.
/// A `#` later in a line is kept, so `1.1.1.1#53` survives as written.
/// Order and duplicates are preserved.
pub fn parse_candidate_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Read candidates from a local file.
///
/// # Errors
///
/// Returns `FileError` if the file does not exist or cannot be read.
pub async fn read_candidates_from_file<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<String>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(DnsCheckError::file_error(
            path.to_string_lossy(),
            "File not found",
        ));
    }

    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        DnsCheckError::file_error(
            path.to_string_lossy(),
            format!("Failed to read resolver list: {}", e),
        )
    })?;

    let candidates = parse_candidate_list(&content);
    debug!(path = %path.display(), count = candidates.len(), "read resolver list");
    Ok(candidates)
}

/// Download candidates from `url`.
///
/// # Errors
///
/// Returns `SourceError` if the request fails, times out, returns a
/// non-success status, or the body cannot be read.
pub async fn download_candidates(
    url: &str,
    timeout: Duration,
) -> Result<Vec<String>> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| DnsCheckError::source_error(url, DnsCheckError::from(e).to_string()))?;

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| DnsCheckError::source_error(url, DnsCheckError::from(e).to_string()))?;

    let body = response.text().await.map_err(|e| {
        DnsCheckError::source_error(url, format!("Failed to read response body: {}", e))
    })?;

    let candidates = parse_candidate_list(&body);
    debug!(url, count = candidates.len(), "downloaded resolver list");
    Ok(candidates)
}

impl CandidateSource {
    /// Load the candidate list from this source.
    ///
    /// `timeout` bounds URL downloads; file reads are not bounded.
    pub async fn load(&self, timeout: Duration) -> Result<Vec<String>> {
        match self {
            CandidateSource::File(path) => read_candidates_from_file(path).await,
            CandidateSource::Url(url) => download_candidates(url, timeout).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single HTTP response on a loopback port and return its URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        format!("http://{}/nameservers.txt", addr)
    }

    #[test]
    fn test_parse_candidate_list() {
        let text = "8.8.8.8\n\n   \n# public resolvers\n  # indented comment\n1.1.1.1\r\n9.9.9.9\n8.8.8.8";
        assert_eq!(
            parse_candidate_list(text),
            vec!["8.8.8.8", "1.1.1.1", "9.9.9.9", "8.8.8.8"]
        );
    }

    #[test]
    fn test_parse_keeps_port_suffix_notation() {
        let text = "1.1.1.1#53\n9.9.9.9#9953\n";
        assert_eq!(parse_candidate_list(text), vec!["1.1.1.1#53", "9.9.9.9#9953"]);
    }

    #[test]
    fn test_parse_empty_list() {
        assert!(parse_candidate_list("").is_empty());
        assert!(parse_candidate_list("\n\n  \n").is_empty());
    }

    #[tokio::test]
    async fn test_read_candidates_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "8.8.8.8").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  1.1.1.1  ").unwrap();
        file.flush().unwrap();

        let candidates = read_candidates_from_file(file.path()).await.unwrap();
        assert_eq!(candidates, vec!["8.8.8.8", "1.1.1.1"]);
    }

    #[tokio::test]
    async fn test_missing_file_is_fatal() {
        let err = read_candidates_from_file("/definitely/not/here/resolvers.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, DnsCheckError::FileError { .. }));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_download_candidates() {
        let url = serve_once("200 OK", "8.8.8.8\n1.1.1.1\n\n").await;
        let candidates = download_candidates(&url, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(candidates, vec!["8.8.8.8", "1.1.1.1"]);
    }

    #[tokio::test]
    async fn test_download_error_status_is_fatal() {
        let url = serve_once("404 Not Found", "gone").await;
        let err = download_candidates(&url, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, DnsCheckError::SourceError { .. }));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_download_connection_refused() {
        // bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{}/list", addr);
        let err = CandidateSource::Url(url)
            .load(Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_load_from_file_source() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "208.67.222.222").unwrap();
        file.flush().unwrap();

        let source = CandidateSource::File(file.path().to_path_buf());
        let candidates = source.load(DEFAULT_DOWNLOAD_TIMEOUT).await.unwrap();
        assert_eq!(candidates, vec!["208.67.222.222"]);
    }
}
