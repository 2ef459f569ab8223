use std::collections::BTreeMap;

use crate::transport::TransportResponse;
use crate::types::{AnyValue, HttpMethod};

/// The record of one method invocation, built in two phases: the request
/// triple is captured before the transport fires, the response is attached
/// once received. The record therefore always reflects what was attempted,
/// even when the response is malformed or never extracted from.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CallResult {
    pub name: String,
    pub http_method: HttpMethod,
    pub url: String,
    pub request_body: Option<String>,
    pub status: Option<u16>,
    pub response_body: Option<String>,
    /// Extracted outputs; every present entry is a non-empty list.
    pub outputs: BTreeMap<String, Vec<AnyValue>>,
}

impl CallResult {
    pub(crate) fn new(
        name: &str,
        http_method: HttpMethod,
        url: &str,
        request_body: Option<&[u8]>,
    ) -> Self {
        Self {
            name: name.to_string(),
            http_method,
            url: url.to_string(),
            request_body: request_body.map(|b| String::from_utf8_lossy(b).into_owned()),
            status: None,
            response_body: None,
            outputs: BTreeMap::new(),
        }
    }

    pub(crate) fn set_response(&mut self, response: &TransportResponse) {
        self.status = Some(response.status);
        self.response_body = Some(response.body.clone());
    }

    pub fn is_success(&self) -> bool {
        self.status.is_some_and(|s| (200..300).contains(&s))
    }
}
