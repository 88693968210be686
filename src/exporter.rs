//! Symbol export: flatten a document into distinct symbols, shapes and
//! sequences.
//!
//! ## Algorithm
//!
//! For each root layer:
//!
//! 1. Scan the layer into root sequences.
//! 2. For every frame of every root sequence, expand it with
//!    `all_symbol_frames` and place each component occurrence into one
//!    generator, then advance the generator by one frame.
//! 3. Advance once more between root sequences so runs never bridge two of
//!    them.
//! 4. Finalize and file the resulting sequences under their symbol.
//!
//! The resulting [`ExportSet`] is owned, serializable and fingerprinted:
//! exporting the same document twice yields the same `fingerprint`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::canonical::{canonical_hash_hex, CanonicalError};
use crate::config::ExportConfig;
use crate::diagnostics::ExportIssue;
use crate::filename::{frame_filename, from_valid_filename, symbol_sample_path, FilenameError};
use crate::sequence::{Sequence, SequenceGenerator};
use crate::store::DocumentSource;
use crate::timeline::{GraphError, SymbolFrame, TimelineGraph};
use crate::types::{Bounds, LayerId, LayerRef, ShapeId, SymbolId, SymbolRef, SymbolType};

/// Error type for exports.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Graph traversal failed.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Fingerprinting failed.
    #[error(transparent)]
    Canonical(#[from] CanonicalError),
}

/// A distinct symbol in the export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedSymbol {
    /// Stable id.
    pub id: SymbolId,
    /// Library item name.
    pub library_item: String,
    /// Library type.
    pub symbol_type: SymbolType,
    /// Layer names the symbol was found under.
    pub names: BTreeSet<String>,
    /// Frame count of the symbol's timeline.
    pub frame_count: u32,
    /// Local frames shown anywhere in the export.
    pub frames: BTreeSet<u32>,
}

/// A distinct shape in the export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedShape {
    /// Stable id.
    pub id: ShapeId,
    /// Layer the shape was first met on.
    pub layer: LayerId,
    /// Frame it was first met at.
    pub frame_index: u32,
    /// Slot within that frame.
    pub slot: usize,
    /// Symbol owning the layer, `None` at the root.
    pub owner: Option<SymbolId>,
    /// Host-reported bounds.
    pub bounds: Option<Bounds>,
}

/// One frame of an exported sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedFrame {
    /// Local frame index.
    pub frame_index: u32,
    /// Frame index on the layer the occurrence was read from.
    pub source_frame: u32,
    /// Whether a layer of the symbol was short at `frame_index`.
    pub has_invalid_frames: bool,
}

/// A maximal run of one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedSequence {
    /// Symbol of the run.
    pub symbol: SymbolId,
    /// Frames in order.
    pub frames: Vec<ExportedFrame>,
}

impl ExportedSequence {
    /// Local frame indices of the run.
    pub fn frame_indices(&self) -> Vec<u32> {
        self.frames.iter().map(|frame| frame.frame_index).collect()
    }
}

/// Sample image to render for a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSample {
    /// Symbol to render.
    pub symbol: SymbolId,
    /// Local frame to render (the median shown frame).
    pub frame_index: u32,
    /// Path handed to the renderer.
    pub path: String,
    /// File the renderer writes for that frame.
    pub rendered_file: String,
}

/// Everything a document exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSet {
    /// Symbols in discovery order.
    pub symbols: Vec<ExportedSymbol>,
    /// Shapes in discovery order.
    pub shapes: Vec<ExportedShape>,
    /// Sequences, root layer by root layer, in closing order.
    pub sequences: Vec<ExportedSequence>,
    /// Issues met while exporting.
    pub issues: Vec<ExportIssue>,
    /// Content hash of symbols, shapes and sequences.
    pub fingerprint: String,
}

impl ExportSet {
    /// Look up a symbol.
    pub fn symbol(&self, id: &SymbolId) -> Option<&ExportedSymbol> {
        self.symbols.iter().find(|symbol| &symbol.id == id)
    }

    /// Symbols found under the layer name `name`.
    pub fn symbols_by_name(&self, name: &str) -> Vec<&ExportedSymbol> {
        self.symbols
            .iter()
            .filter(|symbol| symbol.names.contains(name))
            .collect()
    }

    /// Every provenance name, sorted and deduplicated.
    pub fn all_symbol_names(&self) -> BTreeSet<&str> {
        self.symbols
            .iter()
            .flat_map(|symbol| symbol.names.iter().map(String::as_str))
            .collect()
    }

    /// Median shown frame of a symbol.
    pub fn median_frame(&self, id: &SymbolId) -> Option<u32> {
        let frames = &self.symbol(id)?.frames;
        frames.iter().nth(frames.len() / 2).copied()
    }

    /// Shown frames of a symbol grouped into contiguous runs.
    pub fn compact_frame_runs(&self, id: &SymbolId) -> Vec<Vec<u32>> {
        let mut runs: Vec<Vec<u32>> = Vec::new();
        let Some(symbol) = self.symbol(id) else {
            return runs;
        };
        for &frame in &symbol.frames {
            let contiguous = runs
                .last()
                .and_then(|run| run.last())
                .map_or(false, |&last| last + 1 == frame);
            if !contiguous {
                runs.push(Vec::new());
            }
            if let Some(run) = runs.last_mut() {
                run.push(frame);
            }
        }
        runs
    }

    /// Local frame indices of every sequence of a symbol.
    pub fn frames_for_symbol(&self, id: &SymbolId) -> Vec<Vec<u32>> {
        self.sequences
            .iter()
            .filter(|sequence| &sequence.symbol == id)
            .map(ExportedSequence::frame_indices)
            .collect()
    }

    /// [`frames_for_symbol`](Self::frames_for_symbol) by file-safe name.
    pub fn frames_for_file_safe_name(&self, name: &str) -> Result<Vec<Vec<u32>>, FilenameError> {
        let id = SymbolId::new(from_valid_filename(name)?);
        Ok(self.frames_for_symbol(&id))
    }

    /// One sample per symbol that was shown at least once.
    pub fn sample_plan(&self, folder: &Path, source_name: &str) -> Vec<SymbolSample> {
        self.symbols
            .iter()
            .filter_map(|symbol| {
                let frame_index = self.median_frame(&symbol.id)?;
                let path = symbol_sample_path(folder, source_name, symbol.id.as_str());
                // Renderers number frames from one.
                let rendered_file = frame_filename(&path, frame_index + 1);
                Some(SymbolSample {
                    symbol: symbol.id.clone(),
                    frame_index,
                    path,
                    rendered_file,
                })
            })
            .collect()
    }
}

/// Internal struct for computing the export fingerprint.
#[derive(Serialize)]
struct FingerprintInput<'a> {
    symbols: &'a [ExportedSymbol],
    shapes: Vec<&'a ShapeId>,
    sequences: &'a [ExportedSequence],
}

/// Walks a document and accumulates its export.
pub struct SymbolExporter<'d, S: DocumentSource + ?Sized> {
    graph: TimelineGraph<'d, S>,
    discovered: Vec<SymbolRef>,
    frames_by_symbol: BTreeMap<SymbolRef, BTreeSet<u32>>,
    sequences: Vec<Sequence>,
    issues: Vec<ExportIssue>,
    missing_frames: BTreeSet<(SymbolRef, u32)>,
}

impl<'d, S: DocumentSource + ?Sized> SymbolExporter<'d, S> {
    /// Create an exporter over `source`.
    pub fn new(source: &'d S, config: &ExportConfig) -> Self {
        Self {
            graph: TimelineGraph::new(source).with_max_depth(config.max_nesting_depth),
            discovered: Vec::new(),
            frames_by_symbol: BTreeMap::new(),
            sequences: Vec::new(),
            issues: Vec::new(),
            missing_frames: BTreeSet::new(),
        }
    }

    /// The underlying graph.
    pub fn graph(&self) -> &TimelineGraph<'d, S> {
        &self.graph
    }

    /// Export every root layer.
    pub fn add_document(&mut self) -> Result<(), GraphError> {
        let root_layers = self.graph.root_layers().to_vec();
        for layer in root_layers {
            self.add_root_layer(layer)?;
        }
        Ok(())
    }

    fn add_root_layer(&mut self, layer: LayerRef) -> Result<(), GraphError> {
        let root_sequences = self.graph.layer_sequences(layer);
        let mut generator = SequenceGenerator::new();

        for root_sequence in &root_sequences {
            for symbol_frame in root_sequence.frames() {
                for component in self.graph.all_symbol_frames(symbol_frame)? {
                    self.note_component(&component);
                    generator.place(component);
                }
                generator.advance_frame();
            }
            generator.advance_frame();
        }

        let sequences = generator.finalize();
        tracing::debug!(
            layer = %self.graph.layer(layer).id,
            root_sequences = root_sequences.len(),
            sequences = sequences.len(),
            "Exported root layer"
        );
        self.sequences.extend(sequences);
        Ok(())
    }

    fn note_component(&mut self, component: &SymbolFrame) {
        if !self.frames_by_symbol.contains_key(&component.symbol) {
            self.discovered.push(component.symbol);
        }
        self.frames_by_symbol
            .entry(component.symbol)
            .or_default()
            .insert(component.frame_index);

        // One issue per (symbol, frame), however often the frame is shown.
        if component.has_invalid_frames
            && self
                .missing_frames
                .insert((component.symbol, component.frame_index))
        {
            self.issues.push(ExportIssue::MissingFrame {
                symbol: self.graph.symbol(component.symbol).id.clone(),
                frame_index: component.frame_index,
            });
        }
    }

    /// Snapshot the export accumulated so far.
    pub fn export_set(&self) -> Result<ExportSet, ExportError> {
        let symbols: Vec<ExportedSymbol> = self
            .discovered
            .iter()
            .map(|&symbol| {
                let definition = self.graph.symbol(symbol);
                ExportedSymbol {
                    id: definition.id.clone(),
                    library_item: definition.library_item.clone(),
                    symbol_type: definition.symbol_type,
                    names: definition.names().clone(),
                    frame_count: definition.frame_count(),
                    frames: self.frames_by_symbol.get(&symbol).cloned().unwrap_or_default(),
                }
            })
            .collect();

        let shapes: Vec<ExportedShape> = self
            .graph
            .shapes()
            .map(|(_, shape)| ExportedShape {
                id: shape.id.clone(),
                layer: self.graph.layer(shape.site.layer).id.clone(),
                frame_index: shape.site.frame_index,
                slot: shape.site.slot,
                owner: self
                    .graph
                    .parent_symbol(shape.site.layer)
                    .map(|owner| self.graph.symbol(owner).id.clone()),
                bounds: shape.bounds,
            })
            .collect();

        let sequences: Vec<ExportedSequence> = self
            .sequences
            .iter()
            .map(|sequence| ExportedSequence {
                symbol: self.graph.symbol(sequence.symbol()).id.clone(),
                frames: sequence
                    .frames()
                    .iter()
                    .map(|frame| ExportedFrame {
                        frame_index: frame.frame_index,
                        source_frame: frame.source.frame_index,
                        has_invalid_frames: frame.has_invalid_frames,
                    })
                    .collect(),
            })
            .collect();

        let fingerprint = canonical_hash_hex(&FingerprintInput {
            symbols: &symbols,
            shapes: shapes.iter().map(|shape| &shape.id).collect(),
            sequences: &sequences,
        })?;

        let mut issues = self.issues.clone();
        issues.extend(self.graph.unresolved().iter().map(ExportIssue::from));

        Ok(ExportSet {
            symbols,
            shapes,
            sequences,
            issues,
            fingerprint,
        })
    }
}

/// Export every symbol, shape and sequence of `source`.
pub fn build_export_set<S: DocumentSource + ?Sized>(
    source: &S,
    config: &ExportConfig,
) -> Result<ExportSet, ExportError> {
    let mut exporter = SymbolExporter::new(source, config);
    exporter.add_document()?;
    let export = exporter.export_set()?;
    tracing::info!(
        symbols = export.symbols.len(),
        shapes = export.shapes.len(),
        sequences = export.sequences.len(),
        fingerprint = %export.fingerprint,
        "Built export set"
    );
    Ok(export)
}
