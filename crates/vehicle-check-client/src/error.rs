//! Error side of the result envelope.

use std::error::Error as _;
use thiserror::Error;

/// Why an upstream lookup did not produce data. The display text is shown to the user as is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The service answered but reported failure; carries its message (or a generic fallback).
    #[error("{0}")]
    Upstream(String),

    /// Timeout, connection failure or non-2xx status.
    #[error("Request failed: {0}")]
    Request(String),

    /// The body was not valid JSON of the expected shape.
    #[error("Failed to decode API response.")]
    Decode,
}

/// Result envelope returned by every [`crate::VehicleCheckApi`] operation.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Builds a [`ApiError::Request`] from a reqwest error, without the request URL (it carries the API key)
    /// and with the full source chain so the cause (e.g. "connection refused") is visible.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        let err = err.without_url();
        let mut description = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            let cause_text = cause.to_string();
            if !description.contains(&cause_text) {
                description.push_str(": ");
                description.push_str(&cause_text);
            }
            source = cause.source();
        }
        ApiError::Request(description)
    }
}
