//! Single-use TCP session for one request/response exchange.

use std::net::ToSocketAddrs;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::debug;

use super::{framing, map_io_error};
use crate::protocol::error::{CameleonError, Result};

/// TCP transport for the Cameleon protocol.
///
/// Every [`execute`](Self::execute) opens a fresh connection, performs
/// exactly one framed request/response exchange, and closes the connection.
/// Nothing is shared between calls, so one transport value can serve any
/// number of concurrent calls.
#[derive(Debug, Default)]
pub struct TcpTransport;

impl TcpTransport {
    /// Creates a new TCP transport instance.
    pub fn new() -> Self {
        Self
    }

    /// Connects to a remote endpoint.
    ///
    /// Resolves the address (which may resolve to multiple addresses) and
    /// attempts to connect to each until one succeeds.
    pub async fn connect(&self, addr: &str) -> Result<TcpStream> {
        let socket_addrs = addr
            .to_socket_addrs()
            .map_err(|e| CameleonError::Connection(format!("invalid address '{addr}': {e}")))?;

        let mut last_err = None;
        for socket_addr in socket_addrs {
            match TcpStream::connect(&socket_addr).await {
                Ok(stream) => {
                    debug!(%socket_addr, "connected");
                    return Ok(stream);
                }
                Err(e) => last_err = Some(e),
            }
        }

        Err(CameleonError::Connection(format!(
            "failed to connect to {addr}: {}",
            last_err
                .map(|e| e.to_string())
                .unwrap_or_else(|| "address resolved to nothing".to_string())
        )))
    }

    /// Perform one request/response exchange.
    ///
    /// Connects, sends the framed request in full, reads exactly one framed
    /// response, and returns its body. The connection is a local of this
    /// call: it is dropped, and thereby closed, on every exit path
    /// (success, frame error, I/O failure, or cancellation by an enclosing
    /// timeout).
    pub async fn execute(&self, addr: &str, request: &[u8]) -> Result<Vec<u8>> {
        let framed = framing::frame(request)?;
        let mut stream = self.connect(addr).await?;

        stream
            .write_all(&framed)
            .await
            .map_err(|e| map_io_error(e, "writing request"))?;
        stream
            .flush()
            .await
            .map_err(|e| map_io_error(e, "flushing request"))?;
        debug!(bytes = framed.len(), "request sent");

        let body_len = framing::read_header(&mut stream).await?;
        let body = framing::read_body(&mut stream, body_len).await?;
        debug!(bytes = body.len(), "response received");
        Ok(body)
    }
}
