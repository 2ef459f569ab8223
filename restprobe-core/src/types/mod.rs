mod common;
mod document;
mod http;

pub use common::{AnyValue, Extensions};
pub use document::{MethodDef, OutputDef, SchemaDocument};
pub use http::{HttpMethod, UnknownHttpVerb};
