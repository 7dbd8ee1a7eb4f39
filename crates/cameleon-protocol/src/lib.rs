//! Cameleon Protocol Types and Transport
//!
//! This crate provides the protocol definitions, XML-RPC codec, framing and
//! TCP transport for talking to a Cameleon sign controller.
//!
//! # Overview
//!
//! Cameleon accepts commands (set/schedule/cancel messages, query sign
//! state) over a framed TCP transport carrying XML-RPC payloads. This crate
//! contains everything below the typed call surface:
//!
//! - **Protocol Layer**: message DTOs, the schedule model, error handling
//! - **Codec Layer**: the XML-RPC value model and encoder/decoder
//! - **Transport Layer**: length-prefixed framing and the one-shot TCP session
//!
//! # Wire format
//!
//! Every message on the stream is `[10 ASCII decimal digits] + [XML-RPC
//! payload]`, where the zero-padded digits encode the total packet length
//! *including* the 10-digit header itself. One request triggers exactly one
//! response on the same connection; the connection is then closed.
//!
//! # Example
//!
//! ```no_run
//! use cameleon_protocol::transport::TcpTransport;
//! use cameleon_protocol::xmlrpc::XmlRpcCodec;
//!
//! # #[tokio::main]
//! # async fn main() -> cameleon_protocol::Result<()> {
//! let transport = TcpTransport::new();
//! let request = XmlRpcCodec::encode_request("GetSignIDs", &[])?;
//! let response = transport.execute("10.0.0.5:1403", &request).await?;
//! let value = XmlRpcCodec::decode_response(&response)?;
//! # Ok(())
//! # }
//! ```

pub mod protocol;
pub mod transport;
pub mod xmlrpc;

pub use protocol::*;
