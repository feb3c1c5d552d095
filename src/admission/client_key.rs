//! Client key extraction.
//!
//! The key comes from a forwarded-client-address header and is taken at face
//! value; nothing here authenticates it.

use axum::http::HeaderMap;

/// Bucket name shared by every request without a usable client header.
pub const UNKNOWN_CLIENT_KEY: &str = "unknown";

/// Identity of the caller as far as admission is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientKey {
    Identified(String),
    Unknown,
}

impl ClientKey {
    pub fn as_str(&self) -> &str {
        match self {
            ClientKey::Identified(key) => key,
            ClientKey::Unknown => UNKNOWN_CLIENT_KEY,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ClientKey::Unknown)
    }
}

/// Derive the client key from `header_name`.
///
/// For list-valued headers such as `X-Forwarded-For` the first hop wins.
/// A header that is present but empty yields an empty key, which is still
/// its own bucket.
pub fn extract_client_key(headers: &HeaderMap, header_name: &str) -> ClientKey {
    headers
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            let first = value.split(',').next().unwrap_or_default();
            ClientKey::Identified(first.trim().to_string())
        })
        .unwrap_or(ClientKey::Unknown)
}
