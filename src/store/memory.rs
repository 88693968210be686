//! In-memory document for tests and offline exports.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::RawLayer;
use super::DocumentSource;

/// Library entry with its own timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibrarySymbol {
    /// Layers of the symbol timeline.
    pub layers: Vec<RawLayer>,
}

/// Document held entirely in memory.
///
/// Uses a BTreeMap for the library so serialized documents are stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InMemoryDocument {
    /// Root timeline layers.
    #[serde(default)]
    pub layers: Vec<RawLayer>,
    /// Library symbols by name.
    #[serde(default)]
    pub library: BTreeMap<String, LibrarySymbol>,
}

impl InMemoryDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Append a root layer.
    pub fn with_layer(mut self, layer: RawLayer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Add (or replace) a library symbol.
    pub fn with_symbol(mut self, name: impl Into<String>, layers: Vec<RawLayer>) -> Self {
        self.library.insert(name.into(), LibrarySymbol { layers });
        self
    }

    /// Number of library symbols.
    pub fn num_symbols(&self) -> usize {
        self.library.len()
    }
}

impl DocumentSource for InMemoryDocument {
    fn document_timeline(&self) -> &[RawLayer] {
        &self.layers
    }

    fn symbol_timeline(&self, library_item: &str) -> Option<&[RawLayer]> {
        self.library
            .get(library_item)
            .map(|symbol| symbol.layers.as_slice())
    }
}
