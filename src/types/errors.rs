//! Gateway error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context.

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the gateway.
///
/// Every variant except `Config` is recovered at the boundary closest to where
/// it occurs and converted into a failure response; none may terminate a
/// serving loop.
#[derive(Error, Debug)]
pub enum Error {
    /// Tool name does not match the `<resource>_get_<one|page>` convention.
    #[error("invalid tool name format: {0}")]
    NameFormat(String),

    /// Tool name is well-formed but names a resource with no backend capability.
    #[error("unknown resource: {0}")]
    UnknownResource(String),

    /// Resource exists but does not support the requested operation.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Call arguments fail shape requirements.
    #[error("validation error: {0}")]
    Validation(String),

    /// The backend capability call itself failed (network, auth, upstream).
    #[error("backend error: {0}")]
    Backend(String),

    /// Inbound transport message could not be parsed into a request.
    #[error("transport decode error: {0}")]
    TransportDecode(String),

    /// Startup-time configuration problems. The only fatal class: the process
    /// exits before any transport binding is opened.
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Convert to a JSON-RPC error code for transport-level error responses.
    pub fn rpc_code(&self) -> i32 {
        match self {
            Error::TransportDecode(_) => crate::rpc::PARSE_ERROR,
            Error::NameFormat(_) | Error::Validation(_) => crate::rpc::INVALID_PARAMS,
            Error::UnknownResource(_) | Error::UnsupportedOperation(_) => {
                crate::rpc::METHOD_NOT_FOUND
            }
            _ => crate::rpc::INTERNAL_ERROR,
        }
    }
}

// Convenience constructors
impl Error {
    pub fn name_format(msg: impl Into<String>) -> Self {
        Self::NameFormat(msg.into())
    }

    pub fn unknown_resource(msg: impl Into<String>) -> Self {
        Self::UnknownResource(msg.into())
    }

    pub fn unsupported_operation(msg: impl Into<String>) -> Self {
        Self::UnsupportedOperation(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn transport_decode(msg: impl Into<String>) -> Self {
        Self::TransportDecode(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
