//! XML-RPC codec for the Cameleon wire payload.
//!
//! The codec is the seam between typed calls and bytes: the dispatcher
//! hands it a method name plus an ordered [`Value`] list and gets request
//! bytes; response bytes come back as a single decoded [`Value`], with
//! XML-RPC `<fault>` replies surfaced as
//! [`CameleonError::Fault`](crate::protocol::CameleonError::Fault).
//!
//! # Wire shape
//!
//! Requests reproduce the serializer settings the controller expects: no XML
//! declaration, explicit `<int>` (never `<i4>`), explicit `<string>`, and
//! the `<params>` element omitted entirely when the argument list is empty.
//! `dateTime.iso8601` uses the compact `yyyyMMddTHH:mm:ss` form; the
//! hyphenated form is accepted on decode.
//!
//! # Example
//!
//! ```
//! use cameleon_protocol::xmlrpc::{Value, XmlRpcCodec};
//!
//! let request = XmlRpcCodec::encode_request(
//!     "GetCurrentMessage",
//!     &[Value::Int(12)],
//! ).unwrap();
//! assert!(request.starts_with(b"<methodCall>"));
//! ```

mod decode;
mod encode;
mod value;

pub use value::{optional, required, FromValue, ToValue, Value};

use crate::protocol::error::Result;

pub(crate) const DATETIME_WIRE_FORMAT: &str = "%Y%m%dT%H:%M:%S";
pub(crate) const DATETIME_WIRE_FORMAT_HYPHENATED: &str = "%Y-%m-%dT%H:%M:%S";

/// XML-RPC codec with static encode/decode methods.
pub struct XmlRpcCodec;

impl XmlRpcCodec {
    /// Encode a method call into request payload bytes.
    pub fn encode_request(method: &str, params: &[Value]) -> Result<Vec<u8>> {
        encode::encode_request(method, params)
    }

    /// Decode response payload bytes into the reply value.
    ///
    /// A `<fault>` reply decodes to `Err(CameleonError::Fault { .. })`.
    pub fn decode_response(data: &[u8]) -> Result<Value> {
        decode::decode_response(data)
    }
}
