use std::collections::BTreeMap;

use crate::types::{AnyValue, Extensions};

/// A parsed schema document: a base URL plus the method definitions that
/// share it. `base_url` may be absent when the caller supplies an override
/// at load time.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub base_url: Option<String>,

    pub methods: Vec<MethodDef>,
}

/// One method definition as written in a schema document. `url` is the
/// two-element `[verb, path-template]` pair; `inputs` is the raw schema
/// tree, interpreted when the descriptor is built.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct MethodDef {
    pub name: String,

    pub url: (String, String),

    #[serde(default)]
    pub inputs: Option<AnyValue>,

    #[serde(default)]
    pub outputs: Option<BTreeMap<String, OutputDef>>,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct OutputDef {
    pub json_extract: String,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}
