//! Typed client for the Cameleon sign controller.
//!
//! One public async method per remote operation. Each call opens a fresh
//! TCP connection, performs a single framed XML-RPC exchange, and closes
//! the connection; calls are independent and may run concurrently.
//!
//! # Example
//!
//! ```no_run
//! use cameleon_client::CameleonClient;
//!
//! # #[tokio::main]
//! # async fn main() -> cameleon_protocol::Result<()> {
//! let client = CameleonClient::new("10.0.0.5", 1403);
//! for sign in client.get_sign_ids().await? {
//!     println!("{:?} at {:?}", sign.id, sign.location);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;

pub use client::CameleonClient;
