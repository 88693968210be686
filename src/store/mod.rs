//! Document sources: the read side of the authoring-tool collaborator.

pub mod memory;

use crate::types::{RawFrame, RawLayer};

/// Read-only view of an open animation document.
///
/// Implementations must return layers in timeline order and must keep
/// returning the same data for the lifetime of the borrow, so the graph can
/// memoize what it derives from them.
pub trait DocumentSource {
    /// Root layers of the document timeline.
    fn document_timeline(&self) -> &[RawLayer];

    /// Layers of a library symbol's timeline, or `None` when the library item
    /// has no timeline (bitmaps, missing items).
    fn symbol_timeline(&self, library_item: &str) -> Option<&[RawLayer]>;

    /// Keyframe covering `frame_index` on `layer`, or `None` when the layer is
    /// shorter than that.
    fn frame_at<'a>(&'a self, layer: &'a RawLayer, frame_index: u32) -> Option<&'a RawFrame> {
        layer.frame_at(frame_index)
    }
}

pub use memory::InMemoryDocument;
