//! Core types for the timeline graph.

pub mod ids;
pub mod element;
pub mod frame;

pub use ids::{Guid, SymbolId, ShapeId, LayerId, LayerKey, SymbolRef, ShapeRef, LayerRef};
pub use element::{
    Bounds, ElementKind, InstanceInfo, InstanceType, LoopMode, RawElement, SymbolType,
};
pub use frame::{RawFrame, RawLayer, timeline_frame_count};
