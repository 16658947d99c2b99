// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout types.
//!
//! A [`Layout`] is an immutable snapshot of a [`RichText`] laid out in a [`Container`]. It is
//! built once by [`LayoutContext::layout`] and only read afterwards: hit testing, drawing and
//! size queries never mutate it, so it can be shared between threads freely.

mod build;
mod hit;
mod line;
mod truncate;
mod vertical;

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::ops::Range;
use std::sync::OnceLock;

use hashbrown::HashSet;
use peniko::kurbo::{Point, Rect, Size};
use velum_text::{Attachment, AttachmentContent, RichText};

use crate::shape::{LineMetrics, MonospaceShaper, RunSource, ShapedRun, Shaper};
use crate::{Container, TruncationType};

pub use line::{GlyphRect, Line, LineAttachment};
pub use vertical::{GlyphDrawMode, RotateRange, RunRotateRanges, VerticalGlyphTable};

/// Shared services used to build layouts.
///
/// Cheap to clone; clones share the shaper and the vertical glyph table.
#[derive(Clone, Debug)]
pub struct LayoutContext {
    shaper: Arc<dyn Shaper>,
    vertical_table: Arc<VerticalGlyphTable>,
}

impl Default for LayoutContext {
    fn default() -> Self {
        Self::new(Arc::new(MonospaceShaper::default()))
    }
}

impl LayoutContext {
    /// Creates a context around a shaper.
    pub fn new(shaper: Arc<dyn Shaper>) -> Self {
        Self {
            shaper,
            vertical_table: Arc::new(VerticalGlyphTable::default()),
        }
    }

    /// Replaces the vertical form rotation table.
    #[must_use]
    pub fn with_vertical_table(mut self, table: VerticalGlyphTable) -> Self {
        self.vertical_table = Arc::new(table);
        self
    }

    /// The shaper.
    pub fn shaper(&self) -> &Arc<dyn Shaper> {
        &self.shaper
    }

    /// The vertical form rotation table.
    pub fn vertical_table(&self) -> &VerticalGlyphTable {
        &self.vertical_table
    }

    /// Lays out `text` in `container`.
    ///
    /// Returns `None` for empty text. A container without usable area gives a layout with no
    /// lines.
    pub fn layout(&self, text: impl Into<Arc<RichText>>, container: &Container) -> Option<Layout> {
        build::build(self, text.into(), container)
    }
}

/// How a truncated line was shortened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Truncation {
    /// Where the token was placed.
    pub kind: TruncationType,
    /// Source text that is no longer shown.
    pub elided: Range<usize>,
}

/// An attachment of the layout's text that is visible in the layout.
#[derive(Clone, Debug, PartialEq)]
pub struct AttachmentRecord {
    /// The attachment.
    pub attachment: Attachment,
    /// Its placeholder range.
    pub range: Range<usize>,
    /// Index of the line showing it.
    pub line: usize,
}

/// Which drawing passes a layout needs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DrawNeeds {
    /// Glyphs.
    pub text: bool,
    /// Background fills.
    pub background: bool,
    /// Shadows.
    pub shadow: bool,
    /// Underlines.
    pub underline: bool,
    /// Strikethroughs.
    pub strikethrough: bool,
    /// Run borders.
    pub border: bool,
    /// Block borders.
    pub block_border: bool,
    /// Attachments.
    pub attachment: bool,
    /// Inner shadows.
    pub inner_shadow: bool,
}

#[derive(Debug)]
pub(crate) struct LineData {
    pub(crate) index: usize,
    pub(crate) row: usize,
    pub(crate) text_range: Range<usize>,
    pub(crate) origin: Point,
    pub(crate) metrics: LineMetrics,
    pub(crate) runs: Vec<ShapedRun>,
    /// One entry per run.
    pub(crate) rotate_ranges: Vec<RunRotateRanges>,
    pub(crate) first_glyph_offset: f64,
    pub(crate) max_advance: f64,
    pub(crate) vertical: bool,
    pub(crate) truncation: Option<Truncation>,
    pub(crate) attachments: OnceLock<Vec<LineAttachment>>,
}

impl LineData {
    pub(crate) fn bounding_box(&self) -> Rect {
        let Point { x, y } = self.origin;
        let m = &self.metrics;
        if self.vertical {
            Rect::from_origin_size(
                (x - m.descent, y + self.first_glyph_offset),
                (m.ascent + m.descent, m.width),
            )
        } else {
            Rect::from_origin_size(
                (x + self.first_glyph_offset, y - m.ascent),
                (m.width, m.ascent + m.descent),
            )
        }
    }

    /// Rectangle of a run, oriented like the line.
    pub(crate) fn run_rect(&self, run: &ShapedRun) -> Rect {
        let Point { x, y } = self.origin;
        if self.vertical {
            Rect::from_origin_size(
                (x - run.descent, y + run.offset),
                (run.ascent + run.descent, run.width),
            )
        } else {
            Rect::from_origin_size(
                (x + run.offset, y - run.ascent),
                (run.width, run.ascent + run.descent),
            )
        }
    }
}

/// Text laid out in a container.
#[derive(Debug)]
pub struct Layout {
    pub(crate) text: Arc<RichText>,
    pub(crate) container: Container,
    pub(crate) lines: Vec<LineData>,
    pub(crate) row_count: usize,
    pub(crate) visible_range: Range<usize>,
    pub(crate) truncated: bool,
    pub(crate) truncated_line: Option<usize>,
    pub(crate) truncation_token: Option<Arc<RichText>>,
    pub(crate) text_bounding_rect: Rect,
    pub(crate) text_bounding_size: Size,
    pub(crate) attachments: Vec<AttachmentRecord>,
    pub(crate) attachment_contents: HashSet<AttachmentContent>,
    pub(crate) contains_highlight: bool,
    pub(crate) needs: DrawNeeds,
}

impl Layout {
    /// The text that was laid out.
    pub fn text(&self) -> &Arc<RichText> {
        &self.text
    }

    /// The container, as captured when the layout was built.
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Returns `true` for vertical form layouts.
    pub fn is_vertical(&self) -> bool {
        self.container.vertical_form
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of rows the lines occupy.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns the line at `index`.
    pub fn line(&self, index: usize) -> Option<Line<'_>> {
        Some(Line {
            layout: self,
            index,
            data: self.lines.get(index)?,
        })
    }

    /// Iterates the lines in order.
    pub fn lines(&self) -> impl ExactSizeIterator<Item = Line<'_>> + Clone {
        self.lines.iter().enumerate().map(move |(index, data)| Line {
            layout: self,
            index,
            data,
        })
    }

    /// Range of the text the lines cover.
    pub fn visible_range(&self) -> Range<usize> {
        self.visible_range.clone()
    }

    /// Returns `true` when the lines stop before the end of the text.
    ///
    /// This holds even without a truncation token, for example when dropping lines with
    /// [`TruncationType::None`] or when the container has no room for a single line.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// The line that carries the truncation token, if any.
    pub fn truncated_line(&self) -> Option<Line<'_>> {
        self.line(self.truncated_line?)
    }

    /// The truncation token in use, if the layout was truncated.
    pub fn truncation_token(&self) -> Option<&Arc<RichText>> {
        self.truncation_token.as_ref()
    }

    /// Union of the line bounding boxes, grown by the container insets.
    pub fn text_bounding_rect(&self) -> Rect {
        self.text_bounding_rect
    }

    /// Size needed to show the text, measured from the container origin and rounded up.
    ///
    /// Independent of the container size; use it for intrinsic size queries.
    pub fn text_bounding_size(&self) -> Size {
        self.text_bounding_size
    }

    /// Visible attachments of the text, in text order.
    pub fn attachments(&self) -> &[AttachmentRecord] {
        &self.attachments
    }

    /// Returns `true` if `content` is shown by this layout, including in the truncation token.
    pub fn contains_attachment(&self, content: &AttachmentContent) -> bool {
        self.attachment_contents.contains(content)
    }

    /// Returns `true` if any visible text carries a highlight.
    pub fn contains_highlight(&self) -> bool {
        self.contains_highlight
    }

    /// Drawing passes this layout needs.
    pub fn needs(&self) -> DrawNeeds {
        self.needs
    }

    /// The text a run indexes into.
    pub fn source_text(&self, source: RunSource) -> &RichText {
        match (source, &self.truncation_token) {
            (RunSource::Token, Some(token)) => token,
            _ => &self.text,
        }
    }
}
