use std::sync::LazyLock;

use regex::Regex;

use crate::types::AnyValue;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("valid regex"));

/// A URL with `{name}` placeholders, split into segments when the method
/// descriptor is built. Parsing is total: an unclosed `{` or a brace pair
/// that does not hold a well-formed name stays literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    raw: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// The two ways a URL can come out of templating. Substitution never fails
/// the call: any miss renders the `Template` branch, the unformatted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedUrl {
    Substituted(String),
    Template(String),
}

impl RenderedUrl {
    pub fn into_string(self) -> String {
        match self {
            RenderedUrl::Substituted(url) | RenderedUrl::Template(url) => url,
        }
    }
}

impl UrlTemplate {
    pub fn parse(input: &str) -> Self {
        let mut segments = Vec::new();
        let mut buf = String::new();
        let mut chars = input.chars();

        while let Some(ch) = chars.next() {
            if ch != '{' {
                buf.push(ch);
                continue;
            }

            // Scan ahead for the closing brace; only commit when the inner
            // text is a well-formed placeholder name.
            let mut lookahead = chars.clone();
            let mut inner = String::new();
            let mut closed = false;
            for next in lookahead.by_ref() {
                if next == '}' {
                    closed = true;
                    break;
                }
                inner.push(next);
            }

            if closed && PLACEHOLDER_RE.is_match(&inner) {
                if !buf.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut buf)));
                }
                segments.push(Segment::Placeholder(inner));
                chars = lookahead;
            } else {
                buf.push('{');
            }
        }

        if !buf.is_empty() {
            segments.push(Segment::Literal(buf));
        }

        Self {
            raw: input.to_string(),
            segments,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn has_placeholders(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Placeholder(_)))
    }

    /// Substitute placeholder values from a `url_input` mapping. String
    /// values are percent-encoded; numbers and booleans are formatted as-is.
    /// A non-mapping argument, a missing key, or a non-scalar value renders
    /// the literal template instead.
    pub fn render(&self, values: &AnyValue) -> RenderedUrl {
        let Some(map) = values.as_object() else {
            return RenderedUrl::Template(self.raw.clone());
        };
        let mut out = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => match map.get(name) {
                    Some(AnyValue::String(s)) => out.push_str(&urlencoding::encode(s)),
                    Some(AnyValue::Number(n)) => out.push_str(&n.to_string()),
                    Some(AnyValue::Bool(b)) => out.push_str(if *b { "true" } else { "false" }),
                    _ => return RenderedUrl::Template(self.raw.clone()),
                },
            }
        }
        RenderedUrl::Substituted(out)
    }
}
