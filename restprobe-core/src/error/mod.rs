use std::path::PathBuf;

use thiserror::Error;

use crate::expressions::ExtractExprError;
use crate::types::UnknownHttpVerb;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse as JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unable to auto-detect document format (neither valid JSON nor valid YAML)")]
    UnknownFormat,
}

/// Structural problems in a single method definition. These are loud: they
/// fail the whole document they appear in.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error(transparent)]
    UnknownHttpVerb(#[from] UnknownHttpVerb),

    #[error("input node `{path}` is not a mapping")]
    NotAMapping { path: String },

    #[error("input leaf `{path}` has a non-string `_type` tag")]
    InvalidTypeTag { path: String },

    #[error("input leaf `{path}` has a non-string `resource_name`")]
    InvalidResourceName { path: String },

    #[error("output `{output}` has an invalid extraction expression: {source}")]
    InvalidExtraction {
        output: String,
        #[source]
        source: ExtractExprError,
    },
}

/// Why one schema document could not be loaded. Fatal for that document
/// only; a multi-file load records it and moves on.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("method `{name}`: {source}")]
    Method {
        name: String,
        #[source]
        source: SchemaError,
    },

    #[error("missing base_url (none in document and no override supplied)")]
    MissingBaseUrl,

    #[error("invalid base_url `{url}`: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no schema files (*.yaml) found at {}", path.display())]
    NoSchemaFiles { path: PathBuf },

    #[error("failed to list {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
