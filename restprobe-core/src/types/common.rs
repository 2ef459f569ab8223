use std::collections::BTreeMap;

pub type AnyValue = serde_json::Value;

/// Leaf metadata the engine does not interpret (fuzz hints, value ranges, ...)
/// carried through verbatim for the external driver.
pub type Extensions = BTreeMap<String, serde_json::Value>;
