use crate::types::AnyValue;

/// A compiled `json_extract` selector.
///
/// Syntax is pointer-flavored: the empty string selects the whole document,
/// otherwise `/`-separated segments with the RFC 6901 escapes `~0` (for
/// `~`) and `~1` (for `/`). A bare `*` segment maps over every element of
/// an array. Compiled once at load time so malformed text fails the
/// document instead of failing quietly at call time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractExpr {
    raw: String,
    steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Key(String),
    Each,
}

impl ExtractExpr {
    pub fn parse(expr: &str) -> Result<Self, ExtractExprError> {
        if expr.is_empty() {
            return Ok(Self {
                raw: String::new(),
                steps: Vec::new(),
            });
        }
        let Some(rest) = expr.strip_prefix('/') else {
            return Err(ExtractExprError::InvalidPrefix);
        };
        let mut steps = Vec::new();
        for token in rest.split('/') {
            if token == "*" {
                steps.push(Step::Each);
            } else {
                steps.push(Step::Key(unescape(token)?));
            }
        }
        Ok(Self {
            raw: expr.to_string(),
            steps,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Evaluate against a decoded response body. The result is always in
    /// list shape: a `*` segment collects one entry per array element, a
    /// plain selection of an array splats into its elements, and a scalar
    /// becomes a one-element list. `null` values and misses drop out, so an
    /// empty result means "nothing extracted".
    pub fn extract(&self, doc: &AnyValue) -> Vec<AnyValue> {
        let mut matched: Vec<&AnyValue> = vec![doc];
        let mut mapped = false;
        for step in &self.steps {
            match step {
                Step::Key(key) => {
                    matched = matched.into_iter().filter_map(|v| descend(v, key)).collect();
                }
                Step::Each => {
                    mapped = true;
                    matched = matched
                        .into_iter()
                        .filter_map(|v| v.as_array())
                        .flatten()
                        .collect();
                }
            }
            if matched.is_empty() {
                return Vec::new();
            }
        }

        if !mapped {
            if let [single] = matched.as_slice() {
                if let Some(items) = single.as_array() {
                    return items.iter().filter(|v| !v.is_null()).cloned().collect();
                }
            }
        }
        matched
            .into_iter()
            .filter(|v| !v.is_null())
            .cloned()
            .collect()
    }
}

fn descend<'a>(value: &'a AnyValue, key: &str) -> Option<&'a AnyValue> {
    match value {
        AnyValue::Object(map) => map.get(key),
        AnyValue::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn unescape(token: &str) -> Result<String, ExtractExprError> {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(ch) = chars.next() {
        if ch != '~' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => return Err(ExtractExprError::InvalidEscape),
        }
    }
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractExprError {
    #[error("extraction expression must be empty or start with '/'")]
    InvalidPrefix,
    #[error("extraction expression contains invalid escape (only ~0 and ~1 are allowed)")]
    InvalidEscape,
}
