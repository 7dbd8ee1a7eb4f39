use thiserror::Error;

/// Error taxonomy for Cameleon calls.
///
/// Transport and decode failures propagate to the caller unmodified. The one
/// exception is the protocol's mixed-result convention: a plain-string reply
/// in a mixed slot is a legitimate business outcome and surfaces as
/// [`MixedResult::ErrorMessage`](crate::protocol::MixedResult::ErrorMessage),
/// never as an error.
#[derive(Error, Debug)]
pub enum CameleonError {
    /// Local precondition failure; no network I/O was attempted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Connection refused, reset, or otherwise lost.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The framed packet would not fit the 10-digit length header.
    #[error("Frame of {total} bytes exceeds the {max}-byte protocol limit")]
    FrameTooLarge { total: u64, max: u64 },

    /// The peer sent a length header that is short, non-numeric, or encodes
    /// a negative body length.
    #[error("Malformed frame header: {0}")]
    MalformedHeader(String),

    /// The stream closed before the full response body arrived.
    #[error("Truncated frame body: expected {expected} bytes, received {received}")]
    TruncatedBody { expected: usize, received: usize },

    /// The header announced a body larger than this client will buffer.
    #[error("Response body of {length} bytes exceeds the {max}-byte cap")]
    OversizeResponse { length: u64, max: u64 },

    /// The response payload did not match the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The server answered with an XML-RPC fault.
    #[error("Server fault {code}: {message}")]
    Fault { code: i32, message: String },

    /// The caller-supplied deadline for the whole call expired.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Residual I/O error not mapped to a more specific variant.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A quick-xml writer error (serializing into an in-memory buffer) is
/// fundamentally an I/O failure — route it into the residual [`Io`] bucket so
/// `?` propagation in the encoder type-checks without widening the taxonomy.
///
/// [`Io`]: CameleonError::Io
impl From<quick_xml::Error> for CameleonError {
    fn from(e: quick_xml::Error) -> Self {
        CameleonError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
    }
}

/// Result type alias using [`CameleonError`].
pub type Result<T> = std::result::Result<T, CameleonError>;
