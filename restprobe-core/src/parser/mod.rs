use crate::error::ParseError;
use crate::types::SchemaDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Auto,
}

#[derive(Debug, Clone)]
pub struct ParsedSchema {
    pub document: SchemaDocument,
    pub format: DocumentFormat,
}

pub fn parse_schema_str(input: &str, format: DocumentFormat) -> Result<ParsedSchema, ParseError> {
    match format {
        DocumentFormat::Json => Ok(ParsedSchema {
            document: serde_json::from_str::<SchemaDocument>(input)?,
            format,
        }),
        DocumentFormat::Yaml => Ok(ParsedSchema {
            document: serde_yaml::from_str::<SchemaDocument>(input)?,
            format,
        }),
        DocumentFormat::Auto => parse_schema_auto(input),
    }
}

fn parse_schema_auto(input: &str) -> Result<ParsedSchema, ParseError> {
    // Heuristic: JSON always starts with `{` or `[` after trimming.
    let trimmed = input.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return match serde_json::from_str::<SchemaDocument>(input) {
            Ok(document) => Ok(ParsedSchema {
                document,
                format: DocumentFormat::Json,
            }),
            Err(e) => match serde_yaml::from_str::<SchemaDocument>(input) {
                Ok(document) => Ok(ParsedSchema {
                    document,
                    format: DocumentFormat::Yaml,
                }),
                // Report the JSON error since JSON was tried first.
                Err(_) => Err(ParseError::Json(e)),
            },
        };
    }

    match serde_yaml::from_str::<SchemaDocument>(input) {
        Ok(document) => Ok(ParsedSchema {
            document,
            format: DocumentFormat::Yaml,
        }),
        Err(e) => {
            if let Ok(document) = serde_json::from_str::<SchemaDocument>(input) {
                return Ok(ParsedSchema {
                    document,
                    format: DocumentFormat::Json,
                });
            }
            Err(ParseError::Yaml(e))
        }
    }
}
