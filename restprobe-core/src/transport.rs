use std::collections::BTreeMap;

use crate::types::{AnyValue, HttpMethod};

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_OCTET_STREAM: &str = "application/octet-stream";

/// The injected HTTP capability a method call runs through. Synchronous by
/// contract: the request is the sole blocking boundary of a call, and any
/// timeout or retry policy lives behind this trait, not in the core.
pub trait Transport {
    fn request(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&[u8]>,
        content_type: &str,
    ) -> Result<TransportResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Result<AnyValue, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("timeout")]
    Timeout,
    #[error("connect/dns/tls error: {0}")]
    Network(String),
    #[error("http error: {0}")]
    Other(String),
}
