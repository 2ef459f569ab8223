#![forbid(unsafe_code)]

pub mod error;
pub mod event;
pub mod expressions;
pub mod method;
pub mod parser;
pub mod registry;
pub mod schema;
pub mod transport;
pub mod types;

pub use crate::error::{DocumentError, LoadError, ParseError, SchemaError};
pub use crate::event::CallResult;
pub use crate::expressions::{ExtractExpr, ExtractExprError, RenderedUrl, UrlTemplate};
pub use crate::method::{BodyEncoding, Method, Params, RAW_DATA_KEY, URL_INPUT_KEY};
pub use crate::parser::{parse_schema_str, DocumentFormat, ParsedSchema};
pub use crate::registry::{
    load_methods, load_schema_str, LoadDiagnostic, LoadReport, Registry,
};
pub use crate::schema::{InputLeaf, LeafKind, SchemaNode};
pub use crate::transport::{
    Transport, TransportError, TransportResponse, CONTENT_TYPE_JSON, CONTENT_TYPE_OCTET_STREAM,
};
pub use crate::types::{HttpMethod, MethodDef, OutputDef, SchemaDocument};
