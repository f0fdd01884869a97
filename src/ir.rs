use serde::{Deserialize, Serialize};

/// One wrapper to generate: the constructor name and the Go type it wraps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub type_expr: String,
}

impl TypeEntry {
    pub fn new(name: impl Into<String>, type_expr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_expr: type_expr.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    Explicit,
    Catalog,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub package: String,
    pub entries: Vec<TypeEntry>,
    pub source: EntrySource,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub package: String,
    pub entries: usize,
    pub source: EntrySource,
    pub formatter: String,
    pub output: String,
    pub bytes_written: usize,
    pub test_output: Option<String>,
}
