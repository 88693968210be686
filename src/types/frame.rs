//! Raw layer and frame data as exposed by the authoring tool.
//!
//! A layer is stored as a list of keyframes. Every global frame index inside
//! `[start_frame, start_frame + duration)` resolves to the same keyframe, the
//! way the host returns the same frame object for every index it spans.

use serde::{Deserialize, Serialize};

use super::element::RawElement;

/// A keyframe and the frames it spans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFrame {
    /// First global frame index covered by this keyframe.
    pub start_frame: u32,
    /// Number of frames covered.
    pub duration: u32,
    /// Elements in slot order.
    #[serde(default)]
    pub elements: Vec<RawElement>,
}

impl RawFrame {
    /// Create a keyframe.
    pub fn new(start_frame: u32, duration: u32, elements: Vec<RawElement>) -> Self {
        Self {
            start_frame,
            duration,
            elements,
        }
    }

    /// One past the last frame index covered.
    pub fn end_frame(&self) -> u32 {
        self.start_frame.saturating_add(self.duration)
    }

    /// Whether `frame_index` falls inside this keyframe.
    pub fn covers(&self, frame_index: u32) -> bool {
        frame_index >= self.start_frame && frame_index < self.end_frame()
    }
}

/// A named track of keyframes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLayer {
    /// Layer name, used as provenance for symbols found on it.
    pub name: String,
    /// Keyframes ordered by `start_frame`.
    #[serde(default)]
    pub frames: Vec<RawFrame>,
}

impl RawLayer {
    /// Create an empty layer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frames: Vec::new(),
        }
    }

    /// Append a keyframe starting where the previous one ended.
    pub fn keyframe(mut self, duration: u32, elements: Vec<RawElement>) -> Self {
        let start = self.frame_count();
        self.frames.push(RawFrame::new(start, duration, elements));
        self
    }

    /// Append an empty keyframe (a gap with no elements).
    pub fn blank(self, duration: u32) -> Self {
        self.keyframe(duration, Vec::new())
    }

    /// Number of frames on this layer.
    pub fn frame_count(&self) -> u32 {
        self.frames.iter().map(RawFrame::end_frame).max().unwrap_or(0)
    }

    /// Keyframe covering `frame_index`, or `None` past the end of the layer.
    pub fn frame_at(&self, frame_index: u32) -> Option<&RawFrame> {
        let pos = self
            .frames
            .partition_point(|frame| frame.end_frame() <= frame_index);
        self.frames.get(pos).filter(|frame| frame.covers(frame_index))
    }
}

/// Number of frames of a timeline: the longest of its layers.
pub fn timeline_frame_count(layers: &[RawLayer]) -> u32 {
    layers.iter().map(RawLayer::frame_count).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_at_spans_keyframes() {
        let layer = RawLayer::new("body")
            .keyframe(3, vec![RawElement::shape()])
            .blank(2)
            .keyframe(1, vec![RawElement::shape(), RawElement::shape()]);

        assert_eq!(layer.frame_count(), 6);
        assert_eq!(layer.frame_at(0).unwrap().start_frame, 0);
        assert_eq!(layer.frame_at(2).unwrap().start_frame, 0);
        assert_eq!(layer.frame_at(3).unwrap().start_frame, 3);
        assert!(layer.frame_at(4).unwrap().elements.is_empty());
        assert_eq!(layer.frame_at(5).unwrap().elements.len(), 2);
        assert!(layer.frame_at(6).is_none());
    }

    #[test]
    fn test_timeline_frame_count_is_longest_layer() {
        let layers = vec![RawLayer::new("a").blank(4), RawLayer::new("b").blank(9)];
        assert_eq!(timeline_frame_count(&layers), 9);
        assert_eq!(timeline_frame_count(&[]), 0);
    }
}
