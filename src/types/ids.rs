//! Identifier types for the timeline graph.
//!
//! Two families live here:
//!
//! - **Stable ids** (`SymbolId`, `ShapeId`, `LayerId`) are human-readable
//!   names that survive across runs and appear in exported artifacts.
//! - **Arena refs** (`SymbolRef`, `ShapeRef`, `LayerRef`) are dense indices
//!   into the arenas owned by one [`TimelineGraph`](crate::TimelineGraph).
//!   They are only meaningful inside the run that produced them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned by the authoring tool to an element.
///
/// GUIDs are transient: they are stable within one document but carry no
/// meaning for downstream consumers, so they are only ever used as registry
/// keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guid(String);

impl Guid {
    /// Create a GUID from its string form.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the GUID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! stable_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an id from its string form.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

stable_id!(
    /// Stable identity of a symbol (library definition).
    SymbolId
);

stable_id!(
    /// Stable identity of a shape.
    ShapeId
);

stable_id!(
    /// Stable identity of a layer: `L{i}` at the root, `{symbol}_L{i}` inside
    /// a symbol timeline.
    LayerId
);

impl LayerId {
    /// Build the id of a layer from its owner and index.
    pub fn for_owner(owner: Option<&SymbolId>, index: usize) -> Self {
        match owner {
            Some(symbol) => Self(format!("{}_L{}", symbol, index)),
            None => Self(format!("L{}", index)),
        }
    }
}

/// Memoization key for layers: owning symbol (root when `None`) and index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerKey {
    /// Owning symbol, `None` for document root layers.
    pub owner: Option<SymbolId>,
    /// Index of the layer inside its timeline.
    pub index: usize,
}

macro_rules! arena_ref {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub(crate) usize);

        impl $name {
            /// Position of the entry in its arena.
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

arena_ref!(
    /// Handle to a symbol in a [`TimelineGraph`](crate::TimelineGraph).
    SymbolRef
);

arena_ref!(
    /// Handle to a shape in a [`TimelineGraph`](crate::TimelineGraph).
    ShapeRef
);

arena_ref!(
    /// Handle to a layer in a [`TimelineGraph`](crate::TimelineGraph).
    LayerRef
);
