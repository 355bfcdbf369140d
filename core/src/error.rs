//! Error types for the snippet API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because `get_snippet_by_id` and
//! `update_snippet_by_id` treat a missing snippet as a normal outcome. All
//! other non-2xx responses land in `HttpError` with the raw status code and
//! body. Failures that never produced a response (token, transport,
//! multipart encoding) have their own variants so logs say where it broke.

use thiserror::Error;

/// Errors produced while building, executing or parsing backend calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The server answered 2xx with nothing in the body.
    #[error("empty response body")]
    EmptyBody,

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A multipart form could not be encoded by the transport.
    #[error("multipart encoding failed: {0}")]
    Encoding(String),

    /// The request never completed (connection refused, DNS, TLS...).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The token provider could not supply a credential.
    #[error("token unavailable: {0}")]
    Token(String),
}
