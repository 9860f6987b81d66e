//! Client-side error type.
//!
//! Storage and serialization failures are handled where they occur (the
//! caches are best-effort), so only transport and API failures surface.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {0}")]
    Api(String),
    #[error("Cart is empty")]
    EmptyCart,
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
