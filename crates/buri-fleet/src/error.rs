use std::io;

use thiserror::Error;

/// Transport-level failures of the HTTP collaborator.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("{url} returned HTTP {code}: {body}")]
    Status { url: String, code: u16, body: String },

    #[error("Cannot reach {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Failed reading response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: io::Error,
    },
}

/// Errors raised while driving runner registrations.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("Found {count} runners with a page size of {limit}; listing may be truncated, this automation should be updated")]
    PageLimitExceeded { count: usize, limit: usize },

    #[error("Could not resolve machine address `{host}`: {reason}")]
    AddressResolution { host: String, reason: String },

    #[error("Unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Http(#[from] HttpError),
}
