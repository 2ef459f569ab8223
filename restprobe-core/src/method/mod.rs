use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::SchemaError;
use crate::event::CallResult;
use crate::expressions::{ExtractExpr, RenderedUrl, UrlTemplate};
use crate::schema::SchemaNode;
use crate::transport::{Transport, TransportError, CONTENT_TYPE_JSON, CONTENT_TYPE_OCTET_STREAM};
use crate::types::{AnyValue, Extensions, HttpMethod, MethodDef};

/// Reserved parameter key holding URL-template substitution values.
pub const URL_INPUT_KEY: &str = "url_input";
/// Reserved parameter key holding an opaque request body.
pub const RAW_DATA_KEY: &str = "raw_data";

pub type Params = serde_json::Map<String, AnyValue>;

/// An executable description of one API method, built once from a schema
/// document and immutable afterwards except for the `enabled` toggle.
#[derive(Debug, Clone)]
pub struct Method {
    name: String,
    http_method: HttpMethod,
    base_url: String,
    url: String,
    template: UrlTemplate,
    inputs: SchemaNode,
    outputs: BTreeMap<String, Output>,
    requires: BTreeSet<String>,
    produces: BTreeSet<String>,
    enabled: bool,
}

/// A declared output: its compiled extraction expression plus whatever
/// other metadata the document attached to it.
#[derive(Debug, Clone)]
pub struct Output {
    pub extract: ExtractExpr,
    pub metadata: Extensions,
}

impl Method {
    pub fn from_def(def: MethodDef, base_url: &str) -> Result<Self, SchemaError> {
        let MethodDef {
            name,
            url: (verb, path),
            inputs,
            outputs,
        } = def;

        let http_method: HttpMethod = verb.parse()?;
        let path = path.strip_prefix('/').map(str::to_string).unwrap_or(path);
        let base_url = base_url.trim_end_matches('/').to_string();
        let template = UrlTemplate::parse(&format!("{base_url}/{path}"));

        let inputs = match &inputs {
            Some(value) => SchemaNode::from_value(value)?,
            None => SchemaNode::empty(),
        };

        let mut compiled = BTreeMap::new();
        for (output_name, output_def) in outputs.unwrap_or_default() {
            let extract = ExtractExpr::parse(&output_def.json_extract).map_err(|source| {
                SchemaError::InvalidExtraction {
                    output: output_name.clone(),
                    source,
                }
            })?;
            compiled.insert(
                output_name,
                Output {
                    extract,
                    metadata: output_def.extensions,
                },
            );
        }

        // Resource-typed input leaves are this method's preconditions; the
        // declared resource name wins over the field name holding it.
        let mut requires = BTreeSet::new();
        for (leaf_name, leaf) in inputs.leaves() {
            if leaf.kind.is_resource_ref() {
                requires.insert(
                    leaf.resource_name
                        .clone()
                        .unwrap_or_else(|| leaf_name.to_string()),
                );
            }
        }
        let produces = compiled.keys().cloned().collect();

        Ok(Self {
            name,
            http_method,
            base_url,
            url: path,
            template,
            inputs,
            outputs: compiled,
            requires,
            produces,
            enabled: true,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn http_method(&self) -> HttpMethod {
        self.http_method
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The path template with its leading slash stripped, as written in the
    /// document.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn url_template(&self) -> &UrlTemplate {
        &self.template
    }

    pub fn inputs(&self) -> &SchemaNode {
        &self.inputs
    }

    pub fn outputs(&self) -> &BTreeMap<String, Output> {
        &self.outputs
    }

    pub fn requires(&self) -> &BTreeSet<String> {
        &self.requires
    }

    pub fn produces(&self) -> &BTreeSet<String> {
        &self.produces
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// True when at least one required resource is currently available.
    ///
    /// Deliberately any-overlap, not all-overlap: a method with
    /// `requires = {user, token}` passes as soon as either name is present.
    /// A driver that needs every prerequisite satisfied must walk
    /// `requires()` itself.
    pub fn check_requirements(&self, resources: &BTreeSet<String>) -> bool {
        self.requires.iter().any(|name| resources.contains(name))
    }

    /// Execute the method through the given transport.
    ///
    /// A transport-level failure is the one error this returns; everything
    /// else about a call degrades quietly. URL templating falls back to the
    /// literal template, body encoding falls back to no body, a non-2xx or
    /// empty response just leaves `outputs` empty, and a body that fails
    /// JSON decoding abandons extraction while still returning the record.
    pub fn call(
        &self,
        transport: &dyn Transport,
        params: Option<Params>,
    ) -> Result<CallResult, TransportError> {
        let mut params = params.unwrap_or_default();

        let url = match params.remove(URL_INPUT_KEY) {
            Some(values) => match self.template.render(&values) {
                RenderedUrl::Substituted(url) => url,
                RenderedUrl::Template(raw) => {
                    debug!(method = %self.name, "url substitution failed, using literal template");
                    raw
                }
            },
            None => self.template.raw().to_string(),
        };

        let body = BodyEncoding::encode(&params);

        let mut result = CallResult::new(&self.name, self.http_method, &url, body.bytes());
        let response =
            transport.request(self.http_method, &url, body.bytes(), body.content_type())?;
        result.set_response(&response);

        if response.is_success() && !response.body.is_empty() {
            match response.json() {
                Ok(doc) => {
                    for (name, output) in &self.outputs {
                        let values = output.extract.extract(&doc);
                        if values.is_empty() {
                            debug!(method = %self.name, output = %name, expr = %output.extract.as_str(),
                                "extraction yielded nothing");
                        } else {
                            result.outputs.insert(name.clone(), values);
                        }
                    }
                }
                Err(e) => {
                    debug!(method = %self.name, error = %e, "response body is not JSON, skipping extraction");
                }
            }
        }

        Ok(result)
    }
}

/// The body-encoding branch taken for one call, decided from whatever is
/// left of the parameters after the URL key is removed. Each fallback is a
/// branch of its own so they can be exercised directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyEncoding {
    /// No remaining parameters, or a fallback from a failed encoding.
    Empty,
    /// A string `raw_data` value, sent verbatim as opaque bytes.
    Raw(Vec<u8>),
    /// The remaining parameters serialized as a JSON document.
    Json(Vec<u8>),
}

impl BodyEncoding {
    pub fn encode(params: &Params) -> Self {
        if params.is_empty() {
            return BodyEncoding::Empty;
        }
        if let Some(raw) = params.get(RAW_DATA_KEY) {
            return match raw {
                AnyValue::String(text) => BodyEncoding::Raw(text.clone().into_bytes()),
                _ => {
                    debug!("raw_data is not a string, sending no body");
                    BodyEncoding::Empty
                }
            };
        }
        match serde_json::to_vec(params) {
            Ok(bytes) => BodyEncoding::Json(bytes),
            Err(e) => {
                debug!(error = %e, "params failed to serialize, sending no body");
                BodyEncoding::Empty
            }
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            BodyEncoding::Empty => None,
            BodyEncoding::Raw(bytes) | BodyEncoding::Json(bytes) => Some(bytes),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            BodyEncoding::Raw(_) => CONTENT_TYPE_OCTET_STREAM,
            BodyEncoding::Empty | BodyEncoding::Json(_) => CONTENT_TYPE_JSON,
        }
    }
}
