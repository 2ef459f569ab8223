use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;

use restprobe_core::{HttpMethod, Transport, TransportError, TransportResponse};

/// `Transport` over a blocking `reqwest` client. Redirects are not
/// followed: an exerciser wants to see the 3xx itself, not whatever lies
/// behind it.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::with_timeout(None)
    }
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a transport with a per-request timeout, or none at all. The
    /// core owns no timeout contract, so whatever is chosen here is the
    /// only one a call runs under.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        let mut builder = reqwest::blocking::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("restprobe-exec/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().unwrap_or_else(|e| {
            panic!("failed to create reqwest HTTP client: {e}. This is a bug - please report it.");
        });
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn request(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&[u8]>,
        content_type: &str,
    ) -> Result<TransportResponse, TransportError> {
        let mut rb = self
            .client
            .request(to_reqwest_method(method), url)
            .header(CONTENT_TYPE, content_type);
        if let Some(body) = body {
            rb = rb.body(body.to_vec());
        }

        let resp = rb.send().map_err(map_reqwest_error)?;
        let status = resp.status().as_u16();

        let mut headers = BTreeMap::new();
        for (k, v) in resp.headers().iter() {
            if let Ok(s) = v.to_str() {
                headers.insert(k.to_string(), s.to_string());
            }
        }

        let body = resp.text().map_err(map_reqwest_error)?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Head => reqwest::Method::HEAD,
        HttpMethod::Options => reqwest::Method::OPTIONS,
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        return TransportError::Timeout;
    }
    if e.is_connect() || e.is_request() {
        return TransportError::Network(e.to_string());
    }
    TransportError::Other(e.to_string())
}
