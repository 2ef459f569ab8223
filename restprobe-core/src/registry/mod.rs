use std::collections::{btree_map, BTreeMap};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{DocumentError, LoadError};
use crate::method::Method;
use crate::parser::{parse_schema_str, DocumentFormat};

/// File extension a schema file must carry to be picked up from a directory.
pub const SCHEMA_EXTENSION: &str = "yaml";

/// Deduplicated mapping of method name to descriptor. Names are unique: on
/// collision the first definition survives unchanged and the later one is
/// dropped with a diagnostic.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    methods: BTreeMap<String, Method>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    /// Mutable lookup, for drivers toggling `enabled`.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Method> {
        self.methods.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Method> {
        self.methods.iter()
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.values()
    }

    /// First-wins insert: returns false and leaves the registry untouched
    /// when a method of the same name is already present.
    pub fn insert(&mut self, method: Method) -> bool {
        match self.methods.entry(method.name().to_string()) {
            btree_map::Entry::Occupied(_) => false,
            btree_map::Entry::Vacant(slot) => {
                slot.insert(method);
                true
            }
        }
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = (&'a String, &'a Method);
    type IntoIter = btree_map::Iter<'a, String, Method>;

    fn into_iter(self) -> Self::IntoIter {
        self.methods.iter()
    }
}

/// Non-fatal irregularities recorded while loading. Each is also logged as
/// a warning as it happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadDiagnostic {
    DocumentSkipped { source: String, reason: String },
    DuplicateMethod { source: String, name: String },
}

impl fmt::Display for LoadDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadDiagnostic::DocumentSkipped { source, reason } => {
                write!(f, "{source}: document skipped: {reason}")
            }
            LoadDiagnostic::DuplicateMethod { source, name } => {
                write!(f, "{source}: duplicate method name `{name}`, first definition wins")
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub registry: Registry,
    pub diagnostics: Vec<LoadDiagnostic>,
}

/// Build the methods of a single schema document. Loud: any structural
/// problem fails the whole document, and none of its methods are returned.
///
/// A caller-supplied `base_url` override wins over the document's own
/// `base_url` for every method built by this call.
pub fn load_schema_str(
    input: &str,
    format: DocumentFormat,
    base_url: Option<&str>,
) -> Result<Vec<Method>, DocumentError> {
    let parsed = parse_schema_str(input, format)?;
    let document = parsed.document;

    let base = match base_url.or(document.base_url.as_deref()) {
        Some(base) => base,
        None => return Err(DocumentError::MissingBaseUrl),
    };
    url::Url::parse(base).map_err(|source| DocumentError::InvalidBaseUrl {
        url: base.to_string(),
        source,
    })?;

    let mut methods = Vec::with_capacity(document.methods.len());
    for def in document.methods {
        let name = def.name.clone();
        let method =
            Method::from_def(def, base).map_err(|source| DocumentError::Method { name, source })?;
        methods.push(method);
    }
    Ok(methods)
}

/// Load a schema file, or every `*.yaml` file in a directory, into a
/// registry. Per-document failures and duplicate names are recorded and
/// loading continues; an empty file set is the one fatal outcome.
pub fn load_methods(path: &Path, base_url: Option<&str>) -> Result<LoadReport, LoadError> {
    let files = schema_files(path)?;

    let mut report = LoadReport::default();
    for file in files {
        let source = file.display().to_string();
        let text = match fs::read_to_string(&file) {
            Ok(text) => text,
            Err(e) => {
                warn!(file = %source, error = %e, "could not read schema file");
                report.diagnostics.push(LoadDiagnostic::DocumentSkipped {
                    source,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        match load_schema_str(&text, DocumentFormat::Auto, base_url) {
            Ok(methods) => {
                for method in methods {
                    let name = method.name().to_string();
                    if !report.registry.insert(method) {
                        warn!(file = %source, method = %name, "skipping duplicate method name");
                        report.diagnostics.push(LoadDiagnostic::DuplicateMethod {
                            source: source.clone(),
                            name,
                        });
                    }
                }
            }
            Err(e) => {
                warn!(file = %source, error = %e, "could not load schema document");
                report.diagnostics.push(LoadDiagnostic::DocumentSkipped {
                    source,
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok(report)
}

fn schema_files(path: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let mut files = Vec::new();
    if path.is_dir() {
        let entries = fs::read_dir(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        // Host order, not sorted: method identity, not file order, drives
        // correctness.
        for entry in entries {
            let entry = entry.map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let candidate = entry.path();
            if candidate.is_file()
                && candidate.extension().is_some_and(|ext| ext == SCHEMA_EXTENSION)
            {
                files.push(candidate);
            }
        }
    } else if path.is_file() && path.extension().is_some_and(|ext| ext == SCHEMA_EXTENSION) {
        files.push(path.to_path_buf());
    }

    if files.is_empty() {
        return Err(LoadError::NoSchemaFiles {
            path: path.to_path_buf(),
        });
    }
    Ok(files)
}
