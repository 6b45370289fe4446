//! Rope-backed attributed document state.
//!
//! A [`Document`] keeps the text in a [`ropey::Rope`] for O(log n) edits and
//! keeps attributes in a run-length list held in lockstep with the rope: the
//! run lengths always sum to the rope's character count. Applying a
//! [`Delta`] mutates both sides together and then re-coalesces adjacent runs
//! with equal attributes.

use crate::delta::{AttributeValue, Attributes, Delta, DeltaOp};
use crate::engine::EngineError;
use ropey::Rope;
use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;

/// A run of consecutive characters sharing one attribute set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrRun {
    /// Run length in characters (always > 0 after coalescing).
    pub len: usize,
    /// Attributes shared by every character in the run.
    pub attrs: Attributes,
}

/// Attributed document content.
#[derive(Debug, Clone, Default)]
pub struct Document {
    text: Rope,
    runs: Vec<AttrRun>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total character count.
    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    /// Returns `true` if the document holds no text.
    pub fn is_empty(&self) -> bool {
        self.text.len_chars() == 0
    }

    /// The full text without attributes.
    pub fn text(&self) -> String {
        self.text.to_string()
    }

    /// Text of a character range, clamped to the document bounds.
    pub fn slice(&self, range: Range<usize>) -> String {
        let start = range.start.min(self.len_chars());
        let end = range.end.min(self.len_chars()).max(start);
        self.text.slice(start..end).to_string()
    }

    /// The attribute runs, in document order.
    pub fn runs(&self) -> &[AttrRun] {
        &self.runs
    }

    /// The full content as an insert-only delta.
    pub fn contents(&self) -> Delta {
        let mut delta = Delta::new();
        let mut offset = 0;
        for run in &self.runs {
            let text = self.text.slice(offset..offset + run.len).to_string();
            delta = delta.insert_with(text, run.attrs.clone());
            offset += run.len;
        }
        delta
    }

    /// Attributes of the character at `offset`, if any character is there.
    pub fn attributes_at(&self, offset: usize) -> Option<&Attributes> {
        let mut pos = 0;
        for run in &self.runs {
            if offset < pos + run.len {
                return Some(&run.attrs);
            }
            pos += run.len;
        }
        None
    }

    /// Character ranges of every maximal span whose attributes contain `key`,
    /// in document order. Adjacent runs carrying the same value merge.
    pub fn spans_with(&self, key: &str) -> Vec<(Range<usize>, AttributeValue)> {
        let mut spans: Vec<(Range<usize>, AttributeValue)> = Vec::new();
        let mut pos = 0;
        for run in &self.runs {
            if let Some(value) = run.attrs.get(key) {
                match spans.last_mut() {
                    Some((range, last)) if range.end == pos && last == value => {
                        range.end = pos + run.len;
                    }
                    _ => spans.push((pos..pos + run.len, value.clone())),
                }
            }
            pos += run.len;
        }
        spans
    }

    /// Apply a delta to this document.
    ///
    /// The delta's base length (retains + deletes) is validated against the
    /// current character count before any mutation.
    pub fn apply(&mut self, delta: &Delta) -> Result<(), EngineError> {
        let needed = delta.base_len();
        if needed > self.len_chars() {
            return Err(EngineError::DeltaOutOfBounds {
                needed,
                len: self.len_chars(),
            });
        }

        let mut cursor = 0usize;
        for op in &delta.ops {
            match op {
                DeltaOp::Retain { retain } => cursor += retain,
                DeltaOp::Insert { insert, attributes } => {
                    let len = insert.chars().count();
                    self.text.insert(cursor, insert);
                    self.insert_run(cursor, len, attributes.clone());
                    cursor += len;
                }
                DeltaOp::Delete { delete } => {
                    self.text.remove(cursor..cursor + *delete);
                    self.remove_run_range(cursor, *delete);
                }
            }
        }
        self.coalesce();
        Ok(())
    }

    /// Start offset of the grapheme cluster ending at `offset`.
    ///
    /// Used for backward deletion so multi-scalar clusters (emoji sequences,
    /// combining marks) are removed whole.
    pub fn prev_grapheme_start(&self, offset: usize) -> usize {
        let end = offset.min(self.len_chars());
        if end == 0 {
            return 0;
        }
        let prefix = self.text.slice(..end).to_string();
        match prefix.graphemes(true).last() {
            Some(cluster) => end - cluster.chars().count(),
            None => 0,
        }
    }

    fn insert_run(&mut self, offset: usize, len: usize, attrs: Attributes) {
        if len == 0 {
            return;
        }
        let mut pos = 0;
        let mut idx = 0;
        while idx < self.runs.len() {
            if offset <= pos {
                break;
            }
            let run_len = self.runs[idx].len;
            if offset < pos + run_len {
                // Split the run the insertion lands inside.
                let head_len = offset - pos;
                let tail = AttrRun {
                    len: run_len - head_len,
                    attrs: self.runs[idx].attrs.clone(),
                };
                self.runs[idx].len = head_len;
                self.runs.insert(idx + 1, tail);
                idx += 1;
                break;
            }
            pos += run_len;
            idx += 1;
        }
        self.runs.insert(idx, AttrRun { len, attrs });
    }

    fn remove_run_range(&mut self, offset: usize, len: usize) {
        let mut remaining = len;
        while remaining > 0 {
            let mut pos = 0;
            let mut found = None;
            for (i, run) in self.runs.iter().enumerate() {
                if offset < pos + run.len {
                    found = Some((i, pos));
                    break;
                }
                pos += run.len;
            }
            let Some((i, run_start)) = found else { break };
            let start_in_run = offset - run_start;
            let take = (self.runs[i].len - start_in_run).min(remaining);
            if take == self.runs[i].len {
                self.runs.remove(i);
            } else {
                self.runs[i].len -= take;
            }
            remaining -= take;
        }
    }

    fn coalesce(&mut self) {
        self.runs.retain(|run| run.len > 0);
        let mut i = 1;
        while i < self.runs.len() {
            if self.runs[i].attrs == self.runs[i - 1].attrs {
                self.runs[i - 1].len += self.runs[i].len;
                self.runs.remove(i);
            } else {
                i += 1;
            }
        }
    }
}
