//! # symbol-atlas
//!
//! Deterministic symbol, sequence and shape extraction from layered
//! animation timelines, with texture-atlas packing.
//!
//! The crate answers two questions about an animation document:
//!
//! > Which reusable symbols and shapes does it contain, and in which runs of
//! > frames is each symbol on screen?
//!
//! > Where does every extracted image go on a set of fixed-size pages?
//!
//! ## Architecture
//!
//! ```text
//! DocumentSource → TimelineGraph → SequenceGenerator → ExportSet
//!                       ↓                                  ↓
//!              display-index resolver            ImagePacker → SpriteManifest
//! ```
//!
//! Host automation (entering edit contexts, converting shapes, writing page
//! files) sits behind the [`EditScopeHost`] and [`SpritesheetHost`] traits.
//!
//! ## Determinism Guarantees
//!
//! - Same document + same config → identical `ExportSet::fingerprint`
//! - First identity proposed for a key wins for the whole run
//! - Packing output depends only on the input order

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod store;
pub mod registry;
pub mod display;
pub mod timeline;
pub mod sequence;
pub mod exporter;
pub mod packer;
pub mod manifest;
pub mod config;
pub mod canonical;
pub mod filename;
pub mod scope;
pub mod spritesheet;
pub mod diagnostics;

// Re-exports
pub use types::{
    Bounds, ElementKind, Guid, InstanceInfo, InstanceType, LayerId, LoopMode, RawElement,
    RawFrame, RawLayer, ShapeId, SymbolId, SymbolType,
};
pub use store::{DocumentSource, InMemoryDocument};
pub use registry::IdentityRegistry;
pub use display::resolve_display_index;
pub use timeline::{GraphError, SymbolFrame, TimelineGraph, UnresolvedOccurrence};
pub use sequence::{Sequence, SequenceGenerator};
pub use exporter::{
    build_export_set, ExportError, ExportSet, ExportedSequence, ExportedShape, ExportedSymbol,
    SymbolExporter, SymbolSample,
};
pub use packer::{
    pack_images, FailureReason, ImagePacker, PackError, PackFailure, PackImage, PackOutcome,
    Page, Placement, Rect,
};
pub use manifest::{ManifestBuilder, SpriteEntry, SpriteManifest};
pub use config::{ConfigError, ExportConfig};
pub use canonical::{canonical_hash, canonical_hash_hex, to_canonical_bytes, CanonicalError};
pub use filename::{frame_filename, from_valid_filename, to_valid_filename, FilenameError};
pub use scope::{EditScopeHost, ElementTarget, HostError, ScopeSession};
pub use spritesheet::{
    dump_shape_spritesheet, layout_shape_bounds, ConvertedShape, SpritesheetError,
    SpritesheetHost,
};
pub use diagnostics::{run_pass, ExportIssue, ExportReport, IssueLog, PassStatus, Severity};

/// Schema version of the spritemap manifest.
/// Increment on breaking changes to the manifest layout.
pub const ATLAS_SCHEMA_VERSION: &str = "1.0.0";

/// Default export config version identifier.
pub const DEFAULT_CONFIG_VERSION: &str = "export_config_v1";
