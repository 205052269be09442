//! Error types for the ImageFeed network core.

use thiserror::Error;

/// Classified failures of the typed HTTP pipeline and the services built
/// on top of it.
///
/// Variants carry owned strings rather than source errors so a single
/// terminal result can be cloned and fanned out to every coalesced
/// waiter of an in-flight request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Transport-level failure (connection refused, timeout, TLS).
    #[error("Network error: {0}")]
    Transport(String),

    /// The response was not a well-formed HTTP response.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// HTTP status outside [200, 300). The raw body is kept for
    /// diagnostics.
    #[error("HTTP error ({status}): {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The server returned an empty body where data was required.
    #[error("Empty response body")]
    EmptyBody,

    /// The body could not be decoded into the expected shape. The raw
    /// body is kept for diagnostics.
    #[error("Decoding error: {message}")]
    Decoding {
        /// Decoder error message.
        message: String,
        /// Raw response body.
        body: String,
    },

    /// An authenticated call was attempted without a stored token.
    #[error("Authorization token missing")]
    MissingAuthorization,

    /// The request could not be constructed (bad URL, bad header).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The request was superseded by a newer one before it finished.
    ///
    /// This is cooperative cancellation, not a server failure: the
    /// waiter simply never receives an HTTP result. Callers typically
    /// ignore it rather than surfacing it to the user.
    #[error("Request superseded before completion")]
    Cancelled,
}

/// Result type alias for ImageFeed network operations.
pub type ApiResult<T> = Result<T, ApiError>;
