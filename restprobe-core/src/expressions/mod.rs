mod extract;
mod url;

pub use extract::{ExtractExpr, ExtractExprError};
pub use url::{RenderedUrl, UrlTemplate};
