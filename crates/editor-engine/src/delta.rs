//! Attributed content deltas.
//!
//! The engine's content representation and its change representation share one
//! format: an ordered list of operations expressed in **character offsets**
//! (Unicode scalar values). A delta describing a full document contains only
//! `Insert` operations; a delta describing a change may also `Retain` and
//! `Delete`.
//!
//! The serialized form follows the conventional rich-text JSON shape, e.g.
//! `{"ops":[{"retain":5},{"insert":"[1]","attributes":{"footnote-ref":1}}]}`,
//! so content can cross a process boundary without a bespoke codec.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute map attached to inserted text (formatting, capability markers).
pub type Attributes = BTreeMap<String, AttributeValue>;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Boolean flag (e.g. `"bold": true`).
    Bool(bool),
    /// Numeric value (e.g. a capability-assigned id).
    Number(u64),
    /// Free-form string value.
    Text(String),
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u64> for AttributeValue {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// One delta operation.
///
/// Semantics when applying a delta to a document:
/// - `Retain` advances the application cursor without changing content.
/// - `Insert` inserts text (with attributes) at the cursor.
/// - `Delete` removes characters starting at the cursor.
///
/// Operations must be applied **in order**; offsets are relative to the
/// document as it exists at the moment each operation is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeltaOp {
    /// Keep the next `retain` characters unchanged.
    Retain {
        /// Character count to skip over.
        retain: usize,
    },
    /// Insert text at the cursor.
    Insert {
        /// The inserted text (non-empty).
        insert: String,
        /// Attributes attached to the inserted text.
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attributes: Attributes,
    },
    /// Delete the next `delete` characters.
    Delete {
        /// Character count to remove.
        delete: usize,
    },
}

/// An ordered list of operations describing content or a content change.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Delta {
    /// The operations, in application order.
    pub ops: Vec<DeltaOp>,
}

impl Delta {
    /// Create an empty delta.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a `Retain` operation. Zero-length retains are dropped.
    pub fn retain(mut self, len: usize) -> Self {
        if len > 0 {
            self.ops.push(DeltaOp::Retain { retain: len });
        }
        self
    }

    /// Append an unattributed `Insert` operation. Empty inserts are dropped.
    pub fn insert(self, text: impl Into<String>) -> Self {
        self.insert_with(text, Attributes::new())
    }

    /// Append an attributed `Insert` operation. Empty inserts are dropped.
    pub fn insert_with(mut self, text: impl Into<String>, attributes: Attributes) -> Self {
        let text = text.into();
        if !text.is_empty() {
            self.ops.push(DeltaOp::Insert {
                insert: text,
                attributes,
            });
        }
        self
    }

    /// Append a `Delete` operation. Zero-length deletes are dropped.
    pub fn delete(mut self, len: usize) -> Self {
        if len > 0 {
            self.ops.push(DeltaOp::Delete { delete: len });
        }
        self
    }

    /// Returns `true` if this delta contains no operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Character count this delta consumes from the document it is applied to
    /// (the sum of retains and deletes).
    pub fn base_len(&self) -> usize {
        self.ops
            .iter()
            .map(|op| match op {
                DeltaOp::Retain { retain } => *retain,
                DeltaOp::Delete { delete } => *delete,
                DeltaOp::Insert { .. } => 0,
            })
            .sum()
    }

    /// Character count inserted by this delta.
    pub fn inserted_len(&self) -> usize {
        self.ops
            .iter()
            .map(|op| match op {
                DeltaOp::Insert { insert, .. } => insert.chars().count(),
                _ => 0,
            })
            .sum()
    }
}
