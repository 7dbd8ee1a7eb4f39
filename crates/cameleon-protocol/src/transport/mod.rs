//! Cameleon Transport Layer
//!
//! One request/response exchange per connection, framed with a 10-digit
//! ASCII decimal length header.
//!
//! # Components
//!
//! - [`framing`] - frame/read the length-prefixed packets
//! - [`tcp`] / [`TcpTransport`] - the single-use connect/send/receive/close session
//!
//! # Example
//!
//! ```no_run
//! use cameleon_protocol::transport::TcpTransport;
//!
//! # #[tokio::main]
//! # async fn main() -> cameleon_protocol::Result<()> {
//! let transport = TcpTransport::new();
//! let response = transport.execute("10.0.0.5:1403", b"<methodCall/>").await?;
//! # Ok(())
//! # }
//! ```

pub mod framing;
pub mod tcp;

pub use tcp::TcpTransport;

#[cfg(test)]
mod tests;

use crate::protocol::error::CameleonError;

/// Map IO errors to appropriate error variants.
///
/// Connection-level failures get the `Connection` variant so callers can
/// recognize (and choose to retry) them; anything else stays `Io`.
pub(crate) fn map_io_error(err: std::io::Error, context: &str) -> CameleonError {
    use std::io::ErrorKind;

    match err.kind() {
        ErrorKind::ConnectionRefused
        | ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted
        | ErrorKind::NotConnected
        | ErrorKind::BrokenPipe => CameleonError::Connection(format!("{context}: {err}")),
        _ => CameleonError::Io(err),
    }
}
