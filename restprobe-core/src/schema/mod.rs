use std::collections::{btree_map, BTreeMap};

use crate::error::SchemaError;
use crate::types::{AnyValue, Extensions};

/// One node of an input description tree: either a grouping mapping or a
/// typed leaf parameter. The variant is decided once when the document is
/// parsed; the presence of a `_type` key marks a leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Group(BTreeMap<String, SchemaNode>),
    Leaf(InputLeaf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputLeaf {
    pub kind: LeafKind,
    pub resource_name: Option<String>,
    pub metadata: Extensions,
}

/// The `_type` tag of a leaf. Only the resource-reference kinds matter to
/// dependency extraction; every other tag is carried through for the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafKind {
    Resource,
    ListResource,
    Other(String),
}

impl LeafKind {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "resource" => LeafKind::Resource,
            "list_resource" => LeafKind::ListResource,
            other => LeafKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LeafKind::Resource => "resource",
            LeafKind::ListResource => "list_resource",
            LeafKind::Other(tag) => tag,
        }
    }

    pub fn is_resource_ref(&self) -> bool {
        matches!(self, LeafKind::Resource | LeafKind::ListResource)
    }
}

impl SchemaNode {
    pub fn empty() -> Self {
        SchemaNode::Group(BTreeMap::new())
    }

    /// Build the tree from a parsed document value. The root is always a
    /// mapping of named fields; any node below it that is neither a mapping
    /// nor a tagged leaf is a structural error.
    pub fn from_value(value: &AnyValue) -> Result<Self, SchemaError> {
        let Some(map) = value.as_object() else {
            return Err(SchemaError::NotAMapping {
                path: "inputs".to_string(),
            });
        };
        Ok(SchemaNode::Group(Self::children(map, "inputs")?))
    }

    fn node(value: &AnyValue, path: &str) -> Result<Self, SchemaError> {
        let Some(map) = value.as_object() else {
            return Err(SchemaError::NotAMapping {
                path: path.to_string(),
            });
        };
        if map.contains_key("_type") {
            return Ok(SchemaNode::Leaf(InputLeaf::from_map(map, path)?));
        }
        Ok(SchemaNode::Group(Self::children(map, path)?))
    }

    fn children(
        map: &serde_json::Map<String, AnyValue>,
        path: &str,
    ) -> Result<BTreeMap<String, SchemaNode>, SchemaError> {
        let mut children = BTreeMap::new();
        for (name, child) in map {
            let child_path = format!("{path}.{name}");
            children.insert(name.clone(), Self::node(child, &child_path)?);
        }
        Ok(children)
    }

    /// Depth-first iterator over every leaf reachable from this node, with
    /// the field name that holds it. Groups are recursed into and never
    /// yielded; a `Leaf` root has no field name and yields nothing. The
    /// traversal is stateless and may be restarted at will.
    pub fn leaves(&self) -> Leaves<'_> {
        let stack = match self {
            SchemaNode::Group(children) => vec![children.iter()],
            SchemaNode::Leaf(_) => Vec::new(),
        };
        Leaves { stack }
    }
}

pub struct Leaves<'a> {
    stack: Vec<btree_map::Iter<'a, String, SchemaNode>>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = (&'a str, &'a InputLeaf);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some((name, SchemaNode::Leaf(leaf))) => return Some((name.as_str(), leaf)),
                Some((_, SchemaNode::Group(children))) => self.stack.push(children.iter()),
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

impl InputLeaf {
    fn from_map(map: &serde_json::Map<String, AnyValue>, path: &str) -> Result<Self, SchemaError> {
        let kind = match map.get("_type") {
            Some(AnyValue::String(tag)) => LeafKind::from_tag(tag),
            _ => {
                return Err(SchemaError::InvalidTypeTag {
                    path: path.to_string(),
                })
            }
        };
        let resource_name = match map.get("resource_name") {
            None => None,
            Some(AnyValue::String(name)) => Some(name.clone()),
            Some(_) => {
                return Err(SchemaError::InvalidResourceName {
                    path: path.to_string(),
                })
            }
        };
        let metadata = map
            .iter()
            .filter(|(key, _)| key.as_str() != "_type" && key.as_str() != "resource_name")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Ok(InputLeaf {
            kind,
            resource_name,
            metadata,
        })
    }
}
