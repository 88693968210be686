//! Sequence generation: run-length grouping of symbol occurrences.
//!
//! The generator is fed one frame at a time. Each `place` extends (or opens)
//! the run of the occurrence's symbol; each `advance_frame` closes every run
//! that was not extended during the frame just finished.
//!
//! ## Invariants
//!
//! - A symbol has at most one open sequence at a time.
//! - A gap of one frame closes a sequence. It never pauses it.
//! - Completed sequences are reported in the order they were closed; runs
//!   closing on the same frame keep the order in which they were opened.

use std::collections::BTreeSet;

use crate::timeline::SymbolFrame;
use crate::types::SymbolRef;

/// Something that can be grouped into sequences.
pub trait Placeable {
    /// Key the runs are grouped by.
    type Key: Ord + Copy + std::fmt::Debug;

    /// Sequence key of this occurrence.
    fn sequence_key(&self) -> Self::Key;
}

impl Placeable for SymbolFrame {
    type Key = SymbolRef;

    fn sequence_key(&self) -> SymbolRef {
        self.symbol
    }
}

/// A maximal run of occurrences of one symbol.
#[derive(Debug, Clone)]
pub struct Sequence<T: Placeable = SymbolFrame> {
    key: T::Key,
    frames: Vec<T>,
}

impl<T: Placeable> Sequence<T> {
    fn open(key: T::Key) -> Self {
        Self {
            key,
            frames: Vec::new(),
        }
    }

    /// Key shared by every occurrence in the run.
    pub fn key(&self) -> T::Key {
        self.key
    }

    /// Occurrences in placement order.
    pub fn frames(&self) -> &[T] {
        &self.frames
    }

    /// Consume the sequence, returning its occurrences.
    pub fn into_frames(self) -> Vec<T> {
        self.frames
    }

    /// Number of occurrences.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the run holds no occurrence.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl Sequence<SymbolFrame> {
    /// Symbol this run belongs to.
    pub fn symbol(&self) -> SymbolRef {
        self.key
    }
}

/// Streaming run-length encoder over per-frame occurrences.
#[derive(Debug)]
pub struct SequenceGenerator<T: Placeable = SymbolFrame> {
    open: Vec<Sequence<T>>,
    touched: BTreeSet<T::Key>,
    completed: Vec<Sequence<T>>,
}

impl<T: Placeable> SequenceGenerator<T> {
    /// Create an idle generator.
    pub fn new() -> Self {
        Self {
            open: Vec::new(),
            touched: BTreeSet::new(),
            completed: Vec::new(),
        }
    }

    /// Record an occurrence in the current frame.
    pub fn place(&mut self, occurrence: T) {
        let key = occurrence.sequence_key();
        let position = match self.open.iter().position(|seq| seq.key == key) {
            Some(position) => position,
            None => {
                self.open.push(Sequence::open(key));
                self.open.len() - 1
            }
        };

        self.open[position].frames.push(occurrence);
        self.touched.insert(key);
    }

    /// Finish the current frame, closing every run that was not touched.
    pub fn advance_frame(&mut self) {
        let touched = std::mem::take(&mut self.touched);
        let (still_open, broken): (Vec<_>, Vec<_>) = std::mem::take(&mut self.open)
            .into_iter()
            .partition(|seq| touched.contains(&seq.key));

        self.open = still_open;
        self.completed.extend(broken);
    }

    /// Number of currently open runs.
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Flush and return all completed sequences in closing order.
    pub fn finalize(mut self) -> Vec<Sequence<T>> {
        // The first flush closes runs broken by the last processed frame; the
        // second, with nothing touched, closes whatever is still open.
        self.advance_frame();
        self.advance_frame();
        self.completed
    }
}

impl<T: Placeable> Default for SequenceGenerator<T> {
    fn default() -> Self {
        Self::new()
    }
}
