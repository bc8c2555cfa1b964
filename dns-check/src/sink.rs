//! Output sink for usable resolvers.
//!
//! Results are written one per line as they arrive and flushed right away,
//! so a partially finished run still leaves everything found so far.

use dns_check_lib::DnsCheckError;
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Where usable resolvers are written: a file or standard output.
pub struct ResultSink {
    writer: Box<dyn AsyncWrite + Unpin + Send>,
    target: String,
    written: usize,
}

impl ResultSink {
    /// Open the sink. `None` writes to standard output; a path is created
    /// (or truncated) before any probe runs.
    pub async fn open(path: Option<&str>) -> Result<Self, DnsCheckError> {
        match path {
            Some(path) => {
                let file = tokio::fs::File::create(Path::new(path)).await.map_err(|e| {
                    DnsCheckError::file_error(path, format!("Failed to create output file: {}", e))
                })?;
                Ok(Self::from_writer(Box::new(file), path))
            }
            None => Ok(Self::from_writer(Box::new(tokio::io::stdout()), "stdout")),
        }
    }

    fn from_writer(writer: Box<dyn AsyncWrite + Unpin + Send>, target: &str) -> Self {
        Self {
            writer,
            target: target.to_string(),
            written: 0,
        }
    }

    /// Write one resolver followed by a newline.
    pub async fn write_server(&mut self, server: &str) -> Result<(), DnsCheckError> {
        let line = format!("{}\n", server);
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| DnsCheckError::sink(&self.target, e.to_string()))?;
        self.writer
            .flush()
            .await
            .map_err(|e| DnsCheckError::sink(&self.target, e.to_string()))?;
        self.written += 1;
        Ok(())
    }

    /// Flush and close the sink, returning how many lines were written.
    pub async fn finish(mut self) -> Result<usize, DnsCheckError> {
        self.writer
            .shutdown()
            .await
            .map_err(|e| DnsCheckError::sink(&self.target, e.to_string()))?;
        Ok(self.written)
    }

    /// Human readable name of the target ("stdout" or the file path).
    pub fn target(&self) -> &str {
        &self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_sink_writes_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usable.txt");
        let path_str = path.to_str().unwrap();

        let mut sink = ResultSink::open(Some(path_str)).await.unwrap();
        assert_eq!(sink.target(), path_str);
        sink.write_server("8.8.8.8").await.unwrap();
        sink.write_server("1.1.1.1").await.unwrap();
        assert_eq!(sink.finish().await.unwrap(), 2);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "8.8.8.8\n1.1.1.1\n");
    }

    #[tokio::test]
    async fn test_unwritable_output_is_fatal() {
        let err = ResultSink::open(Some("/no/such/dir/usable.txt"))
            .await
            .err()
            .unwrap();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_write_error_maps_to_sink_error() {
        struct BrokenPipe;

        impl AsyncWrite for BrokenPipe {
            fn poll_write(
                self: std::pin::Pin<&mut Self>,
                _cx: &mut std::task::Context<'_>,
                _buf: &[u8],
            ) -> std::task::Poll<std::io::Result<usize>> {
                std::task::Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()))
            }

            fn poll_flush(
                self: std::pin::Pin<&mut Self>,
                _cx: &mut std::task::Context<'_>,
            ) -> std::task::Poll<std::io::Result<()>> {
                std::task::Poll::Ready(Ok(()))
            }

            fn poll_shutdown(
                self: std::pin::Pin<&mut Self>,
                _cx: &mut std::task::Context<'_>,
            ) -> std::task::Poll<std::io::Result<()>> {
                std::task::Poll::Ready(Ok(()))
            }
        }

        let mut sink = ResultSink::from_writer(Box::new(BrokenPipe), "pipe");
        let err = sink.write_server("9.9.9.9").await.unwrap_err();
        assert!(matches!(err, DnsCheckError::SinkError { .. }));
    }
}
