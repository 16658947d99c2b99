// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use core::ops::Range;

use crate::spans::SpanList;
use crate::{
    Attachment, AttachmentAlignment, Attribute, AttributeDelta, AttributeKind, Error, ErrorKind,
    FontMetrics, RunDelegate, TextRange,
};
use peniko::kurbo::Size;

/// The object replacement character used as the anchor of an attachment.
pub const ATTACHMENT_CHARACTER: char = '\u{FFFC}';

/// A string with attributes applied to byte ranges.
///
/// Each [`AttributeKind`] has its own interval map, so at most one value of a kind applies to
/// any byte. Setting a value over a range replaces whatever was there.
///
/// ```
/// use velum_text::{Attribute, AttributeKind, RichText};
///
/// let mut text = RichText::new("Hello world");
/// text.set_kern(Some(1.5), Some(0..5)).unwrap();
/// assert_eq!(text.kern_at(2), Some(&1.5));
/// assert_eq!(text.attribute_at(AttributeKind::Kern, 6), None);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RichText {
    text: String,
    spans: [SpanList; AttributeKind::COUNT],
}

impl Default for RichText {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl RichText {
    /// Creates a text with no attributes.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spans: core::array::from_fn(|ix| {
                SpanList::new(!AttributeKind::ALL[ix].is_discontinuous())
            }),
        }
    }

    /// The placeholder string for an inline attachment.
    ///
    /// The result is one [`ATTACHMENT_CHARACTER`] carrying `attachment` and a [`RunDelegate`]
    /// that reserves `size`, positioned against a font with `metrics`.
    pub fn attachment_string(
        attachment: Attachment,
        size: Size,
        metrics: FontMetrics,
        alignment: AttachmentAlignment,
    ) -> Self {
        let mut text = Self::new(String::from(ATTACHMENT_CHARACTER));
        let range = 0..text.len();
        let delegate = RunDelegate::for_box(size, metrics, alignment);
        text.spans[AttributeKind::Attachment.index()]
            .set(range.clone(), Attribute::Attachment(attachment));
        text.spans[AttributeKind::RunDelegate.index()]
            .set(range, Attribute::RunDelegate(delegate));
        text
    }

    /// The underlying string.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns `true` if the text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Sets or clears one kind of attribute over `range`.
    ///
    /// `None` for `range` covers the whole text. Fails with [`ErrorKind::KindMismatch`] if
    /// `value` belongs to another kind.
    pub fn set_attribute(
        &mut self,
        kind: AttributeKind,
        value: Option<Attribute>,
        range: Option<Range<usize>>,
    ) -> Result<(), Error> {
        let range = TextRange::resolve(&self.text, range)?.as_range();
        let spans = &mut self.spans[kind.index()];
        match value {
            Some(value) if value.kind() != kind => {
                Err(Error::new(ErrorKind::KindMismatch, range, self.text.len()))
            }
            Some(value) => {
                spans.set(range, value);
                Ok(())
            }
            None => {
                spans.clear(range);
                Ok(())
            }
        }
    }

    /// Sets `value` over `range`, keyed by its own kind.
    pub fn set(&mut self, value: Attribute, range: Option<Range<usize>>) -> Result<(), Error> {
        self.set_attribute(value.kind(), Some(value), range)
    }

    /// Removes every attribute over `range`.
    pub fn clear_attributes(&mut self, range: Option<Range<usize>>) -> Result<(), Error> {
        let range = TextRange::resolve(&self.text, range)?.as_range();
        for spans in &mut self.spans {
            spans.clear(range.clone());
        }
        Ok(())
    }

    /// The value of `kind` covering byte `index`.
    pub fn attribute_at(&self, kind: AttributeKind, index: usize) -> Option<&Attribute> {
        self.spans[kind.index()].get(index).map(|(_, attr)| attr)
    }

    /// The value of `kind` covering byte `index`, with the full extent of its span.
    pub fn attribute_span_at(
        &self,
        kind: AttributeKind,
        index: usize,
    ) -> Option<(Range<usize>, &Attribute)> {
        self.spans[kind.index()]
            .get(index)
            .map(|(range, attr)| (range.clone(), attr))
    }

    /// All spans of `kind`, in text order.
    pub fn spans(&self, kind: AttributeKind) -> impl Iterator<Item = (Range<usize>, &Attribute)> {
        self.spans[kind.index()]
            .as_slice()
            .iter()
            .map(|(range, attr)| (range.clone(), attr))
    }

    /// Spans of `kind` intersecting `range`, unclipped, in text order.
    pub fn spans_in(
        &self,
        kind: AttributeKind,
        range: Range<usize>,
    ) -> impl Iterator<Item = (Range<usize>, &Attribute)> {
        self.spans[kind.index()]
            .overlapping(range)
            .map(|(range, attr)| (range.clone(), attr))
    }

    /// Returns `true` if any span of `kind` intersects `range`.
    ///
    /// `None` checks the whole text.
    pub fn has_attribute(&self, kind: AttributeKind, range: Option<Range<usize>>) -> bool {
        match range {
            Some(range) => self.spans[kind.index()].overlapping(range).next().is_some(),
            None => !self.spans[kind.index()].is_empty(),
        }
    }

    /// Inserts `string` at byte `index`.
    ///
    /// Inserted bytes inherit continuous attributes from the preceding character; discontinuous
    /// attributes and backed strings never extend into them. An index strictly inside a binding
    /// moves to the end of the binding. Returns the range the string now occupies.
    pub fn insert_str(&mut self, index: usize, string: &str) -> Result<Range<usize>, Error> {
        TextRange::new(&self.text, index..index)?;
        let index = self.snap_out_of_binding(index);
        self.text.insert_str(index, string);
        for kind in AttributeKind::ALL {
            self.spans[kind.index()].replace(index..index, string.len(), kind.inherits_on_insert());
        }
        Ok(index..index + string.len())
    }

    /// Appends `string`, inheriting continuous attributes from the last character.
    pub fn push_str(&mut self, string: &str) {
        let index = self.text.len();
        self.text.push_str(string);
        for kind in AttributeKind::ALL {
            self.spans[kind.index()].replace(index..index, string.len(), kind.inherits_on_insert());
        }
    }

    /// Inserts another rich text at byte `index`, keeping its attributes as they are.
    pub fn insert_rich(&mut self, index: usize, other: &Self) -> Result<Range<usize>, Error> {
        TextRange::new(&self.text, index..index)?;
        let index = self.snap_out_of_binding(index);
        self.splice_rich(index, other);
        Ok(index..index + other.len())
    }

    /// Appends another rich text, keeping its attributes as they are.
    pub fn push_rich(&mut self, other: &Self) {
        self.splice_rich(self.text.len(), other);
    }

    /// Replaces `range` with `string`.
    ///
    /// The range first grows to cover every binding it touches, so bound ranges are only ever
    /// replaced whole. Returns the range that was actually replaced, in the old text.
    pub fn replace_range(
        &mut self,
        range: Range<usize>,
        string: &str,
    ) -> Result<Range<usize>, Error> {
        let range = TextRange::new(&self.text, range)?.as_range();
        let range = self.expand_to_bindings(range);
        self.text.replace_range(range.clone(), string);
        for kind in AttributeKind::ALL {
            self.spans[kind.index()].replace(
                range.clone(),
                string.len(),
                kind.inherits_on_insert(),
            );
        }
        Ok(range)
    }

    /// Removes `range`, growing it to cover any binding it touches.
    pub fn remove_range(&mut self, range: Range<usize>) -> Result<Range<usize>, Error> {
        self.replace_range(range, "")
    }

    /// A copy of `range` with its attributes, rebased to start at zero.
    pub fn substring(&self, range: Range<usize>) -> Result<Self, Error> {
        let range = TextRange::new(&self.text, range)?.as_range();
        Ok(Self {
            text: String::from(&self.text[range.clone()]),
            spans: core::array::from_fn(|ix| self.spans[ix].slice(range.clone())),
        })
    }

    /// Removes attachments, run delegates, bindings, ruby and superscripts from `range`.
    pub fn remove_discontinuous_attributes(
        &mut self,
        range: Option<Range<usize>>,
    ) -> Result<(), Error> {
        let range = TextRange::resolve(&self.text, range)?.as_range();
        for kind in AttributeKind::ALL {
            if kind.is_discontinuous() {
                self.spans[kind.index()].clear(range.clone());
            }
        }
        Ok(())
    }

    /// The text of `range` with every backed string substituted for the content it backs.
    ///
    /// Attachments usually carry the text they replaced, so copying a range containing an
    /// emoji image yields the emoji.
    pub fn plain_text_for_range(&self, range: Option<Range<usize>>) -> Result<String, Error> {
        let range = TextRange::resolve(&self.text, range)?.as_range();
        let mut out = String::with_capacity(range.len());
        let mut cursor = range.start;
        for (span, attr) in self.spans[AttributeKind::BackedString.index()].overlapping(range.clone())
        {
            let Attribute::BackedString(backed) = attr else {
                continue;
            };
            let start = span.start.max(range.start);
            out.push_str(&self.text[cursor..start]);
            out.push_str(&backed.string);
            cursor = span.end.min(range.end);
        }
        out.push_str(&self.text[cursor..range.end]);
        Ok(out)
    }

    /// Applies a list of set and remove operations to `range`.
    pub fn apply_deltas(
        &mut self,
        range: Range<usize>,
        deltas: &[AttributeDelta],
    ) -> Result<(), Error> {
        let range = TextRange::new(&self.text, range)?.as_range();
        for delta in deltas {
            match delta {
                AttributeDelta::Set(value) => {
                    self.spans[value.kind().index()].set(range.clone(), value.clone());
                }
                AttributeDelta::Remove(kind) => self.spans[kind.index()].clear(range.clone()),
            }
        }
        Ok(())
    }

    /// Range of the binding strictly enclosing `index`, if any.
    pub fn binding_range_at(&self, index: usize) -> Option<Range<usize>> {
        let (range, _) = self.spans[AttributeKind::Binding.index()].get(index)?;
        (range.start < index).then(|| range.clone())
    }

    pub(crate) fn spans_for_kind(&self, kind: AttributeKind) -> &SpanList {
        &self.spans[kind.index()]
    }

    pub(crate) fn spans_for_kind_mut(&mut self, kind: AttributeKind) -> &mut SpanList {
        &mut self.spans[kind.index()]
    }

    fn snap_out_of_binding(&self, index: usize) -> usize {
        self.binding_range_at(index)
            .map_or(index, |binding| binding.end)
    }

    fn expand_to_bindings(&self, range: Range<usize>) -> Range<usize> {
        let bindings = &self.spans[AttributeKind::Binding.index()];
        let mut expanded = range.clone();
        if range.is_empty() {
            if let Some(binding) = self.binding_range_at(range.start) {
                expanded = binding;
            }
            return expanded;
        }
        for (binding, _) in bindings.overlapping(range) {
            expanded.start = expanded.start.min(binding.start);
            expanded.end = expanded.end.max(binding.end);
        }
        expanded
    }

    fn splice_rich(&mut self, index: usize, other: &Self) {
        self.text.insert_str(index, &other.text);
        for (ix, spans) in self.spans.iter_mut().enumerate() {
            spans.replace(index..index, other.len(), false);
            spans.splice_from(&other.spans[ix], index);
        }
    }
}
