//! Timeline graph: layers, symbols and shapes materialized on demand.
//!
//! The graph wraps a [`DocumentSource`] and memoizes everything it derives
//! from it in arenas owned by one export run:
//!
//! - layers, keyed by (owning symbol, layer index)
//! - symbols, keyed by the stable id the symbol registry hands out
//! - shapes, keyed by the stable id the shape registry hands out
//!
//! Repeated traversals of the same timeline return the same handles, so the
//! provenance names and frame registrations accumulated on a symbol cover
//! every place it was met.
//!
//! ## Traversal
//!
//! ```text
//! root layer ──frame_occurrences──▶ SymbolFrame ──all_symbol_frames──▶ nested SymbolFrames
//!                  │                                    │
//!                  └── shapes memoized on the way ──────┘
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::display::resolve_display_index;
use crate::registry::IdentityRegistry;
use crate::sequence::{Sequence, SequenceGenerator};
use crate::store::DocumentSource;
use crate::types::{
    timeline_frame_count, Bounds, ElementKind, Guid, InstanceInfo, LayerId, LayerKey, LayerRef,
    RawElement, RawLayer, ShapeId, ShapeRef, SymbolId, SymbolRef, SymbolType,
};

/// Default limit on symbol nesting during recursive descent.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;

/// Error type for graph traversal.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GraphError {
    /// Nested symbols went deeper than the configured limit, which only
    /// happens for self-referencing timelines.
    #[error("Symbol nesting exceeds {limit} levels at {symbol}")]
    NestingTooDeep {
        /// Symbol being expanded when the limit was hit.
        symbol: SymbolId,
        /// Configured limit.
        limit: usize,
    },
}

/// Position of an element: layer, global frame on that layer, slot in frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementSite {
    /// Layer holding the element.
    pub layer: LayerRef,
    /// Frame index on that layer.
    pub frame_index: u32,
    /// Slot within the frame's element list.
    pub slot: usize,
}

/// Back-reference from a symbol occurrence to the raw frame it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameSource {
    /// Layer the occurrence was found on.
    pub layer: LayerRef,
    /// Frame index queried on that layer.
    pub frame_index: u32,
    /// Start of the keyframe that covered the query.
    pub start_frame: u32,
}

/// One symbol displayed at one local frame of its own timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolFrame {
    /// Symbol on display.
    pub symbol: SymbolRef,
    /// Local frame index into the symbol's timeline.
    pub frame_index: u32,
    /// Raw frame this occurrence was read from.
    pub source: FrameSource,
    /// Set by [`TimelineGraph::all_symbol_frames`] when one of the symbol's
    /// layers has no frame at `frame_index`.
    pub has_invalid_frames: bool,
}

/// An instance whose display index could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedOccurrence {
    /// Layer the instance sits on.
    pub layer: LayerId,
    /// Frame index queried.
    pub frame_index: u32,
    /// Slot within the frame.
    pub slot: usize,
    /// Referenced library item.
    pub library_item: String,
    /// Instance type label.
    pub instance_type: String,
    /// Symbol type label.
    pub symbol_type: String,
    /// Raw loop label, if any.
    pub loop_mode: Option<String>,
}

/// A layer of the document root or of a symbol timeline.
#[derive(Debug, Clone)]
pub struct AnimationLayer<'d> {
    /// Stable layer id.
    pub id: LayerId,
    /// Owning symbol, `None` at the document root.
    pub owner: Option<SymbolRef>,
    /// Index inside the owning timeline.
    pub index: usize,
    /// Layer name.
    pub name: String,
    raw: &'d RawLayer,
}

impl<'d> AnimationLayer<'d> {
    /// Number of frames on the layer.
    pub fn frame_count(&self) -> u32 {
        self.raw.frame_count()
    }

    /// Underlying raw layer.
    pub fn raw(&self) -> &'d RawLayer {
        self.raw
    }
}

/// A reusable symbol definition met during traversal.
#[derive(Debug, Clone)]
pub struct AnimationSymbol<'d> {
    /// Stable symbol id.
    pub id: SymbolId,
    /// Library item the symbol was instantiated from.
    pub library_item: String,
    /// Library type.
    pub symbol_type: SymbolType,
    /// Where the symbol was first met.
    pub origin: ElementSite,
    timeline: &'d [RawLayer],
    frame_count: u32,
    names: BTreeSet<String>,
    frames: BTreeMap<u32, SymbolFrame>,
}

impl<'d> AnimationSymbol<'d> {
    /// Record a layer name under which an instance of this symbol was found.
    pub fn attach_name(&mut self, name: &str) {
        if !self.names.contains(name) {
            self.names.insert(name.to_string());
        }
    }

    /// Provenance names.
    pub fn names(&self) -> &BTreeSet<String> {
        &self.names
    }

    /// Provenance names joined with commas.
    pub fn joined_names(&self) -> String {
        self.names.iter().cloned().collect::<Vec<_>>().join(",")
    }

    /// Register an occurrence at its local frame (last registration wins).
    pub fn register_frame(&mut self, symbol_frame: SymbolFrame) {
        self.frames.insert(symbol_frame.frame_index, symbol_frame);
    }

    /// Registered occurrences by local frame index.
    pub fn frame_registrations(&self) -> &BTreeMap<u32, SymbolFrame> {
        &self.frames
    }

    /// Frame count of the symbol's own timeline.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Number of layers in the symbol's timeline.
    pub fn layer_count(&self) -> usize {
        self.timeline.len()
    }
}

/// A leaf shape met during traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationShape {
    /// Stable shape id.
    pub id: ShapeId,
    /// Where the shape was first met.
    pub site: ElementSite,
    /// Host-reported bounds.
    pub bounds: Option<Bounds>,
}

/// Memoized graph over one document, scoped to one export run.
pub struct TimelineGraph<'d, S: DocumentSource + ?Sized> {
    source: &'d S,
    max_depth: usize,

    symbol_ids: IdentityRegistry<SymbolId>,
    movie_ids: IdentityRegistry<SymbolId>,
    shape_ids: IdentityRegistry<ShapeId>,

    layers: Vec<AnimationLayer<'d>>,
    layer_index: BTreeMap<LayerKey, LayerRef>,
    symbols: Vec<AnimationSymbol<'d>>,
    symbol_index: BTreeMap<SymbolId, SymbolRef>,
    shapes: Vec<AnimationShape>,
    shape_index: BTreeMap<ShapeId, ShapeRef>,

    root_layers: Vec<LayerRef>,
    unresolved: Vec<UnresolvedOccurrence>,
}

impl<'d, S: DocumentSource + ?Sized> TimelineGraph<'d, S> {
    /// Create a graph over `source`, materializing its root layers.
    pub fn new(source: &'d S) -> Self {
        let mut graph = Self {
            source,
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
            symbol_ids: IdentityRegistry::new(),
            movie_ids: IdentityRegistry::new(),
            shape_ids: IdentityRegistry::new(),
            layers: Vec::new(),
            layer_index: BTreeMap::new(),
            symbols: Vec::new(),
            symbol_index: BTreeMap::new(),
            shapes: Vec::new(),
            shape_index: BTreeMap::new(),
            root_layers: Vec::new(),
            unresolved: Vec::new(),
        };

        let root = source.document_timeline();
        graph.root_layers = root
            .iter()
            .enumerate()
            .map(|(index, raw)| graph.layer_for(None, index, raw))
            .collect();
        graph
    }

    /// Set the nesting limit for [`all_symbol_frames`](Self::all_symbol_frames).
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Root layers in timeline order.
    pub fn root_layers(&self) -> &[LayerRef] {
        &self.root_layers
    }

    /// Get a layer.
    pub fn layer(&self, layer: LayerRef) -> &AnimationLayer<'d> {
        &self.layers[layer.0]
    }

    /// Get a symbol.
    pub fn symbol(&self, symbol: SymbolRef) -> &AnimationSymbol<'d> {
        &self.symbols[symbol.0]
    }

    /// Get a shape.
    pub fn shape(&self, shape: ShapeRef) -> &AnimationShape {
        &self.shapes[shape.0]
    }

    /// Look up a symbol by stable id.
    pub fn symbol_by_id(&self, id: &SymbolId) -> Option<SymbolRef> {
        self.symbol_index.get(id).copied()
    }

    /// Look up a shape by stable id.
    pub fn shape_by_id(&self, id: &ShapeId) -> Option<ShapeRef> {
        self.shape_index.get(id).copied()
    }

    /// All symbols met so far, in discovery order.
    pub fn symbols(&self) -> impl Iterator<Item = (SymbolRef, &AnimationSymbol<'d>)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, symbol)| (SymbolRef(i), symbol))
    }

    /// All shapes met so far, in discovery order.
    pub fn shapes(&self) -> impl Iterator<Item = (ShapeRef, &AnimationShape)> {
        self.shapes
            .iter()
            .enumerate()
            .map(|(i, shape)| (ShapeRef(i), shape))
    }

    /// Number of memoized symbols.
    pub fn num_symbols(&self) -> usize {
        self.symbols.len()
    }

    /// Number of memoized layers.
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Instances whose display index could not be resolved.
    pub fn unresolved(&self) -> &[UnresolvedOccurrence] {
        &self.unresolved
    }

    /// Symbol that owns the timeline `layer` belongs to.
    pub fn parent_symbol(&self, layer: LayerRef) -> Option<SymbolRef> {
        self.layers[layer.0].owner
    }

    /// Layers of a symbol's timeline, memoized.
    pub fn symbol_layers(&mut self, symbol: SymbolRef) -> Vec<LayerRef> {
        let timeline = self.symbols[symbol.0].timeline;
        timeline
            .iter()
            .enumerate()
            .map(|(index, raw)| self.layer_for(Some(symbol), index, raw))
            .collect()
    }

    /// Symbol occurrences on `layer` at `frame_index`.
    ///
    /// Returns `None` when the layer has no frame at that index. Shapes met
    /// on the way are memoized but not returned; external references are
    /// skipped entirely.
    pub fn frame_occurrences(
        &mut self,
        layer: LayerRef,
        frame_index: u32,
    ) -> Option<Vec<SymbolFrame>> {
        let source = self.source;
        let raw_layer = self.layers[layer.0].raw;
        let raw_frame = source.frame_at(raw_layer, frame_index)?;
        let mut result = Vec::new();

        for (slot, element) in raw_frame.elements.iter().enumerate() {
            let site = ElementSite {
                layer,
                frame_index,
                slot,
            };

            let info = match &element.kind {
                ElementKind::External => continue,
                ElementKind::Shape => {
                    self.shape_for(site, element);
                    continue;
                }
                ElementKind::Instance(info) => info,
            };

            let Some(timeline) = source.symbol_timeline(&info.library_item) else {
                // Instances without a timeline behave like plain shapes.
                self.shape_for(site, element);
                continue;
            };

            let symbol = self.symbol_for(site, element, info, timeline);
            let layer_name = self.layers[layer.0].name.clone();
            self.symbols[symbol.0].attach_name(&layer_name);

            let frame_count = self.symbols[symbol.0].frame_count;
            let Some(display_index) =
                resolve_display_index(raw_frame, frame_index, info, frame_count)
            else {
                self.record_unresolved(site, info);
                continue;
            };

            let symbol_frame = SymbolFrame {
                symbol,
                frame_index: display_index,
                source: FrameSource {
                    layer,
                    frame_index,
                    start_frame: raw_frame.start_frame,
                },
                has_invalid_frames: false,
            };
            self.symbols[symbol.0].register_frame(symbol_frame.clone());
            result.push(symbol_frame);
        }

        Some(result)
    }

    /// Scan a layer frame by frame and group its occurrences into sequences.
    pub fn layer_sequences(&mut self, layer: LayerRef) -> Vec<Sequence> {
        let frame_count = self.layers[layer.0].frame_count();
        let mut generator = SequenceGenerator::new();

        for frame_index in 0..frame_count {
            for symbol_frame in self.frame_occurrences(layer, frame_index).unwrap_or_default() {
                generator.place(symbol_frame);
            }
            generator.advance_frame();
        }

        let sequences = generator.finalize();
        tracing::debug!(
            layer = %self.layers[layer.0].id,
            frame_count,
            sequence_count = sequences.len(),
            "Scanned layer"
        );
        sequences
    }

    /// Every symbol occurrence reachable from `root`, in visitation order.
    ///
    /// Depth-first with an explicit stack. Each visited occurrence queries
    /// the layers of its symbol at its own local frame index. A layer without
    /// a frame there marks the occurrence `has_invalid_frames` and contributes
    /// nothing; the other layers keep descending.
    pub fn all_symbol_frames(&mut self, root: &SymbolFrame) -> Result<Vec<SymbolFrame>, GraphError> {
        let mut result = Vec::new();
        let mut pending = vec![(root.clone(), 0usize)];

        while let Some((mut current, depth)) = pending.pop() {
            if depth > self.max_depth {
                return Err(GraphError::NestingTooDeep {
                    symbol: self.symbols[current.symbol.0].id.clone(),
                    limit: self.max_depth,
                });
            }

            let mut children = Vec::new();
            let mut invalid = false;
            for child_layer in self.symbol_layers(current.symbol) {
                match self.frame_occurrences(child_layer, current.frame_index) {
                    Some(frames) => children.extend(frames),
                    None => invalid = true,
                }
            }

            current.has_invalid_frames = invalid;
            result.push(current);
            pending.extend(children.into_iter().map(|child| (child, depth + 1)));
        }

        Ok(result)
    }

    fn layer_for(&mut self, owner: Option<SymbolRef>, index: usize, raw: &'d RawLayer) -> LayerRef {
        let owner_id = owner.map(|symbol| self.symbols[symbol.0].id.clone());
        let key = LayerKey {
            owner: owner_id.clone(),
            index,
        };
        if let Some(&existing) = self.layer_index.get(&key) {
            return existing;
        }

        let layer = LayerRef(self.layers.len());
        self.layers.push(AnimationLayer {
            id: LayerId::for_owner(owner_id.as_ref(), index),
            owner,
            index,
            name: raw.name.clone(),
            raw,
        });
        self.layer_index.insert(key, layer);
        layer
    }

    fn symbol_for(
        &mut self,
        site: ElementSite,
        element: &RawElement,
        info: &InstanceInfo,
        timeline: &'d [RawLayer],
    ) -> SymbolRef {
        let key = element
            .guid
            .clone()
            .unwrap_or_else(|| Guid::new(info.library_item.clone()));
        let registry = if info.is_movie_clip() {
            &mut self.movie_ids
        } else {
            &mut self.symbol_ids
        };
        let id = registry.resolve(info.library_item.as_str(), &key);

        if let Some(&existing) = self.symbol_index.get(&id) {
            return existing;
        }

        let symbol = SymbolRef(self.symbols.len());
        self.symbols.push(AnimationSymbol {
            id: id.clone(),
            library_item: info.library_item.clone(),
            symbol_type: info.symbol_type,
            origin: site,
            timeline,
            frame_count: timeline_frame_count(timeline),
            names: BTreeSet::new(),
            frames: BTreeMap::new(),
        });
        self.symbol_index.insert(id, symbol);
        symbol
    }

    fn shape_for(&mut self, site: ElementSite, element: &RawElement) -> ShapeRef {
        let proposal = format!(
            "{}_F{}_E{}",
            self.layers[site.layer.0].id, site.frame_index, site.slot
        );
        let key = element
            .guid
            .clone()
            .unwrap_or_else(|| Guid::new(proposal.clone()));
        let id = self.shape_ids.resolve(proposal, &key);

        if let Some(&existing) = self.shape_index.get(&id) {
            return existing;
        }

        let shape = ShapeRef(self.shapes.len());
        self.shapes.push(AnimationShape {
            id: id.clone(),
            site,
            bounds: element.bounds,
        });
        self.shape_index.insert(id, shape);
        shape
    }

    fn record_unresolved(&mut self, site: ElementSite, info: &InstanceInfo) {
        self.unresolved.push(UnresolvedOccurrence {
            layer: self.layers[site.layer.0].id.clone(),
            frame_index: site.frame_index,
            slot: site.slot,
            library_item: info.library_item.clone(),
            instance_type: info.instance_type.to_string(),
            symbol_type: info.symbol_type.to_string(),
            loop_mode: info.loop_mode.as_ref().map(|mode| mode.to_string()),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryDocument;
    use crate::types::{LoopMode, RawElement};

    fn looping(name: &str, last: Option<u32>) -> RawElement {
        RawElement::instance(
            InstanceInfo::graphic(name)
                .with_loop(LoopMode::Loop)
                .with_window(0, last),
        )
    }

    fn walk_document() -> InMemoryDocument {
        InMemoryDocument::new()
            .with_layer(RawLayer::new("Twilight").keyframe(10, vec![looping("Walk", Some(5))]))
            .with_symbol(
                "Walk",
                vec![RawLayer::new("legs").keyframe(5, vec![RawElement::shape().with_guid("leg")])],
            )
    }

    #[test]
    fn test_missing_frame_returns_none() {
        let doc = walk_document();
        let mut graph = TimelineGraph::new(&doc);
        let root = graph.root_layers()[0];

        assert!(graph.frame_occurrences(root, 9).is_some());
        assert!(graph.frame_occurrences(root, 10).is_none());
    }

    #[test]
    fn test_layers_are_memoized() {
        let doc = walk_document();
        let mut graph = TimelineGraph::new(&doc);
        let root = graph.root_layers()[0];
        let occurrence = graph.frame_occurrences(root, 0).unwrap().remove(0);

        let first = graph.symbol_layers(occurrence.symbol);
        let second = graph.symbol_layers(occurrence.symbol);
        assert_eq!(first, second);
        assert_eq!(graph.layer(first[0]).id.as_str(), "Walk_L0");
        assert_eq!(graph.num_layers(), 2);
    }

    #[test]
    fn test_symbol_registration_and_provenance() {
        let doc = walk_document();
        let mut graph = TimelineGraph::new(&doc);
        let root = graph.root_layers()[0];

        let sequences = graph.layer_sequences(root);
        assert_eq!(sequences.len(), 1);

        let locals: Vec<u32> = sequences[0].frames().iter().map(|f| f.frame_index).collect();
        assert_eq!(locals, vec![0, 1, 2, 3, 4, 0, 1, 2, 3, 4]);

        let symbol = graph.symbol(sequences[0].symbol());
        assert_eq!(symbol.id.as_str(), "Walk");
        assert!(symbol.names().contains("Twilight"));
        let registered: Vec<u32> = symbol.frame_registrations().keys().copied().collect();
        assert_eq!(registered, vec![0, 1, 2, 3, 4]);
        // Last registration per index wins.
        assert_eq!(symbol.frame_registrations()[&0].source.frame_index, 5);
    }

    #[test]
    fn test_shapes_are_memoized_not_returned() {
        let doc = InMemoryDocument::new().with_layer(RawLayer::new("bg").keyframe(
            2,
            vec![
                RawElement::shape(),
                RawElement::shape().with_guid("tree"),
                RawElement::external(),
            ],
        ));
        let mut graph = TimelineGraph::new(&doc);
        let root = graph.root_layers()[0];

        assert!(graph.frame_occurrences(root, 0).unwrap().is_empty());
        assert!(graph.frame_occurrences(root, 1).unwrap().is_empty());

        let ids: Vec<String> = graph.shapes().map(|(_, s)| s.id.to_string()).collect();
        // GUID-less shape gets one id per frame, the GUID shape collapses.
        assert_eq!(ids, vec!["L0_F0_E0", "L0_F0_E1", "L0_F1_E0"]);
    }

    #[test]
    fn test_instance_without_timeline_is_a_shape() {
        let doc = InMemoryDocument::new().with_layer(
            RawLayer::new("bg").keyframe(1, vec![RawElement::instance(InstanceInfo::graphic("Bitmap 1"))]),
        );
        let mut graph = TimelineGraph::new(&doc);
        let root = graph.root_layers()[0];

        assert!(graph.frame_occurrences(root, 0).unwrap().is_empty());
        assert_eq!(graph.shapes().count(), 1);
        assert_eq!(graph.symbols().count(), 0);
    }

    #[test]
    fn test_unknown_loop_is_recorded_not_placed() {
        let doc = InMemoryDocument::new()
            .with_layer(RawLayer::new("root").keyframe(
                1,
                vec![RawElement::instance(
                    InstanceInfo::graphic("Blink").with_loop(LoopMode::parse("reverse")),
                )],
            ))
            .with_symbol("Blink", vec![RawLayer::new("lid").blank(3)]);
        let mut graph = TimelineGraph::new(&doc);
        let root = graph.root_layers()[0];

        assert!(graph.frame_occurrences(root, 0).unwrap().is_empty());
        assert_eq!(graph.unresolved().len(), 1);
        assert_eq!(graph.unresolved()[0].loop_mode.as_deref(), Some("reverse"));

        let (_, symbol) = graph.symbols().next().unwrap();
        assert!(symbol.frame_registrations().is_empty());
    }

    #[test]
    fn test_movie_registry_is_separate() {
        let doc = InMemoryDocument::new()
            .with_layer(RawLayer::new("root").keyframe(
                1,
                vec![
                    RawElement::instance(InstanceInfo::graphic("Tail")).with_guid("shared"),
                    RawElement::instance(InstanceInfo::movie_clip("Sparkle")).with_guid("shared"),
                ],
            ))
            .with_symbol("Tail", vec![RawLayer::new("t").blank(1)])
            .with_symbol("Sparkle", vec![RawLayer::new("s").blank(4)]);
        let mut graph = TimelineGraph::new(&doc);
        let root = graph.root_layers()[0];

        let occurrences = graph.frame_occurrences(root, 0).unwrap();
        let ids: Vec<&str> = occurrences
            .iter()
            .map(|o| graph.symbol(o.symbol).id.as_str())
            .collect();
        assert_eq!(ids, vec!["Tail", "Sparkle"]);
    }

    #[test]
    fn test_invalid_frames_stop_one_branch_only() {
        // "Head" has a long layer holding "Eye" and a short layer of one frame.
        let doc = InMemoryDocument::new()
            .with_layer(RawLayer::new("root").keyframe(
                3,
                vec![RawElement::instance(
                    InstanceInfo::graphic("Head").with_loop(LoopMode::Loop),
                )],
            ))
            .with_symbol(
                "Head",
                vec![
                    RawLayer::new("eyes").keyframe(
                        3,
                        vec![RawElement::instance(
                            InstanceInfo::graphic("Eye").with_loop(LoopMode::SingleFrame),
                        )],
                    ),
                    RawLayer::new("short").blank(1),
                ],
            )
            .with_symbol("Eye", vec![RawLayer::new("iris").blank(1)]);
        let mut graph = TimelineGraph::new(&doc);
        let root = graph.root_layers()[0];

        let head_at_2 = graph.frame_occurrences(root, 2).unwrap().remove(0);
        assert_eq!(head_at_2.frame_index, 2);

        let all = graph.all_symbol_frames(&head_at_2).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].has_invalid_frames);
        assert_eq!(graph.symbol(all[1].symbol).id.as_str(), "Eye");
        assert!(!all[1].has_invalid_frames);

        let head_at_0 = graph.frame_occurrences(root, 0).unwrap().remove(0);
        let all = graph.all_symbol_frames(&head_at_0).unwrap();
        assert!(!all[0].has_invalid_frames);
    }

    #[test]
    fn test_self_nesting_hits_depth_limit() {
        let doc = InMemoryDocument::new()
            .with_layer(RawLayer::new("root").keyframe(
                1,
                vec![RawElement::instance(InstanceInfo::graphic("Mirror"))],
            ))
            .with_symbol(
                "Mirror",
                vec![RawLayer::new("inner").keyframe(
                    1,
                    vec![RawElement::instance(InstanceInfo::graphic("Mirror"))],
                )],
            );
        let mut graph = TimelineGraph::new(&doc).with_max_depth(8);
        let root = graph.root_layers()[0];
        let mirror = graph.frame_occurrences(root, 0).unwrap().remove(0);

        let err = graph.all_symbol_frames(&mirror).unwrap_err();
        assert!(matches!(err, GraphError::NestingTooDeep { limit: 8, .. }));
    }
}
