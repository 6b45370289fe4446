//! The footnote module implementation.

use crate::{DIVIDER_ATTRIBUTE, FootnoteError, NOTE_ATTRIBUTE, REF_ATTRIBUTE};
use editor_engine::module::{EngineModule, ModuleContext};
use editor_engine::{
    AttributeValue, Attributes, Delta, Document, EngineError, EngineOptions,
};
use std::any::Any;
use std::ops::Range;

/// One footnote tracked by the module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FootnoteEntry {
    /// Process-assigned id, stable across renumbering.
    pub id: u64,
    /// Current display number (1-based, dense).
    pub number: usize,
    /// Entry content as supplied to the `add` command.
    pub content: String,
}

/// Footnote capability module.
///
/// State is the entry list plus an id allocator; all content mutation is
/// expressed as deltas returned to the engine.
#[derive(Debug)]
pub struct FootnoteModule {
    next_id: u64,
    entries: Vec<FootnoteEntry>,
}

impl Default for FootnoteModule {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry constructor for [`FootnoteModule`].
pub(crate) fn footnote_module(_options: &EngineOptions) -> Box<dyn EngineModule> {
    Box::new(FootnoteModule::new())
}

impl FootnoteModule {
    /// Create an empty module.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            entries: Vec::new(),
        }
    }

    /// The tracked footnotes, in display-number order.
    pub fn footnotes(&self) -> &[FootnoteEntry] {
        &self.entries
    }

    /// Look up a footnote by id.
    pub fn footnote(&self, id: u64) -> Option<&FootnoteEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    fn ref_attrs(id: u64) -> Attributes {
        Attributes::from([(REF_ATTRIBUTE.to_string(), AttributeValue::Number(id))])
    }

    fn note_attrs(id: u64) -> Attributes {
        Attributes::from([(NOTE_ATTRIBUTE.to_string(), AttributeValue::Number(id))])
    }

    fn divider_attrs() -> Attributes {
        Attributes::from([(DIVIDER_ATTRIBUTE.to_string(), AttributeValue::Bool(true))])
    }

    /// First character offset of the footnote section (divider included), or
    /// the document end when no footnotes exist yet.
    fn body_end(document: &Document) -> usize {
        if let Some((range, _)) = document.spans_with(DIVIDER_ATTRIBUTE).first() {
            return range.start;
        }
        if let Some((range, _)) = document.spans_with(NOTE_ATTRIBUTE).first() {
            return range.start;
        }
        document.len_chars()
    }

    fn spans_by_id(document: &Document, key: &str) -> Vec<(u64, Range<usize>)> {
        document
            .spans_with(key)
            .into_iter()
            .filter_map(|(range, value)| match value {
                AttributeValue::Number(id) => Some((id, range)),
                _ => None,
            })
            .collect()
    }

    fn build_add(&mut self, document: &Document, caret: Option<usize>, content: &str) -> Delta {
        let body_end = Self::body_end(document);
        let caret = caret.unwrap_or(body_end).min(body_end);

        let id = self.next_id;
        let number = self.entries.len() + 1;
        let marker = format!("[{number}]");

        let mut delta = Delta::new()
            .retain(caret)
            .insert_with(marker, Self::ref_attrs(id))
            .retain(document.len_chars() - caret);
        if self.entries.is_empty() {
            delta = delta.insert_with("\n", Self::divider_attrs());
        }
        delta = delta.insert_with(format!("{number}. {content}\n"), Self::note_attrs(id));

        self.next_id += 1;
        self.entries.push(FootnoteEntry {
            id,
            number,
            content: content.to_string(),
        });
        delta
    }

    fn build_remove(&mut self, document: &Document, id: u64) -> Result<Delta, FootnoteError> {
        let position = self
            .entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(FootnoteError::UnknownId(id))?;
        let removed_number = self.entries[position].number;

        let markers = Self::spans_by_id(document, REF_ATTRIBUTE);
        let notes = Self::spans_by_id(document, NOTE_ATTRIBUTE);
        let marker_of = |id: u64| markers.iter().find(|(i, _)| *i == id).map(|(_, r)| r.clone());
        let note_of = |id: u64| notes.iter().find(|(i, _)| *i == id).map(|(_, r)| r.clone());

        // Each edit is (range, replacement); `None` deletes outright.
        let mut edits: Vec<(Range<usize>, Option<(String, Attributes)>)> = Vec::new();
        if let Some(range) = marker_of(id) {
            edits.push((range, None));
        }
        if let Some(range) = note_of(id) {
            edits.push((range, None));
        }
        if self.entries.len() == 1 {
            for (range, _) in document.spans_with(DIVIDER_ATTRIBUTE) {
                edits.push((range, None));
            }
        }
        for entry in &self.entries {
            if entry.number <= removed_number {
                continue;
            }
            let new_number = entry.number - 1;
            if let Some(range) = marker_of(entry.id) {
                edits.push((range, Some((format!("[{new_number}]"), Self::ref_attrs(entry.id)))));
            }
            if let Some(range) = note_of(entry.id) {
                edits.push((
                    range,
                    Some((
                        format!("{new_number}. {}\n", entry.content),
                        Self::note_attrs(entry.id),
                    )),
                ));
            }
        }
        edits.sort_by_key(|(range, _)| range.start);

        let mut delta = Delta::new();
        let mut pos = 0;
        for (range, replacement) in edits {
            delta = delta.retain(range.start - pos).delete(range.end - range.start);
            if let Some((text, attrs)) = replacement {
                delta = delta.insert_with(text, attrs);
            }
            pos = range.end;
        }

        self.entries.remove(position);
        for entry in &mut self.entries {
            if entry.number > removed_number {
                entry.number -= 1;
            }
        }
        Ok(delta)
    }

    fn remove_behind(&mut self, ctx: &ModuleContext<'_>) -> Result<Option<Delta>, FootnoteError> {
        let Some(selection) = ctx.selection else {
            return Ok(None);
        };
        if !selection.is_caret() || selection.index == 0 {
            return Ok(None);
        }
        let Some(attrs) = ctx.document.attributes_at(selection.index - 1) else {
            return Ok(None);
        };
        let Some(AttributeValue::Number(id)) = attrs.get(REF_ATTRIBUTE) else {
            return Ok(None);
        };
        let id = *id;
        Ok(Some(self.build_remove(ctx.document, id)?))
    }
}

impl EngineModule for FootnoteModule {
    fn name(&self) -> &'static str {
        crate::FOOTNOTE_MODULE
    }

    fn command(
        &mut self,
        ctx: ModuleContext<'_>,
        command: &str,
        payload: &str,
    ) -> Result<Option<Delta>, EngineError> {
        match command {
            "add" => {
                let caret = ctx.selection.map(|range| range.index);
                Ok(Some(self.build_add(ctx.document, caret, payload)))
            }
            "remove" => {
                let id: u64 = payload
                    .trim()
                    .parse()
                    .map_err(|_| FootnoteError::InvalidId(payload.to_string()))?;
                Ok(Some(self.build_remove(ctx.document, id)?))
            }
            "remove-behind" => Ok(self.remove_behind(&ctx)?),
            other => Err(FootnoteError::UnknownCommand(other.to_string()).into()),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
