// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;
use core::ops::Range;

use peniko::kurbo::{Point, Rect};
use velum_text::{Attachment, AttributeKind};

use super::{Layout, LineData, RunRotateRanges, Truncation};
use crate::shape::{LineMetrics, RunSource, ShapedRun};

/// An attachment placed on a line.
#[derive(Clone, Debug, PartialEq)]
pub struct LineAttachment {
    /// The attachment.
    pub attachment: Attachment,
    /// Placeholder range in the run's source text.
    pub range: Range<usize>,
    /// Which text `range` indexes into.
    pub source: RunSource,
    /// Rectangle reserved for the attachment, in container coordinates.
    pub rect: Rect,
}

/// The rectangle of one glyph.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GlyphRect {
    /// Which text the glyph's cluster indexes into.
    pub source: RunSource,
    /// Byte offset of the glyph's cluster.
    pub cluster: usize,
    /// Glyph cell in container coordinates.
    pub rect: Rect,
}

/// One visual line of a [`Layout`].
#[derive(Copy, Clone, Debug)]
pub struct Line<'a> {
    pub(crate) layout: &'a Layout,
    pub(crate) index: usize,
    pub(crate) data: &'a LineData,
}

impl<'a> Line<'a> {
    /// The layout this line belongs to.
    pub fn layout(&self) -> &'a Layout {
        self.layout
    }

    /// Index of the line in its layout.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Row of the line. Lines split by an exclusion share a row.
    pub fn row(&self) -> usize {
        self.data.row
    }

    /// Source range of the line, including trailing whitespace.
    pub fn text_range(&self) -> Range<usize> {
        self.data.text_range.clone()
    }

    /// Metrics as reported by the shaper.
    pub fn metrics(&self) -> &'a LineMetrics {
        &self.data.metrics
    }

    /// Baseline origin in container coordinates.
    pub fn origin(&self) -> Point {
        self.data.origin
    }

    /// Offset of the first glyph along the line axis.
    pub fn first_glyph_offset(&self) -> f64 {
        self.data.first_glyph_offset
    }

    /// Space the line could use along its axis.
    pub fn max_advance(&self) -> f64 {
        self.data.max_advance
    }

    /// Returns `true` in vertical form.
    pub fn is_vertical(&self) -> bool {
        self.data.vertical
    }

    /// The truncation marker, on the truncated line only.
    pub fn truncation(&self) -> Option<&'a Truncation> {
        self.data.truncation.as_ref()
    }

    /// The runs in logical order.
    pub fn runs(&self) -> &'a [ShapedRun] {
        &self.data.runs
    }

    /// Glyph rotation ranges, one entry per run; only populated in vertical form.
    pub fn vertical_rotate_ranges(&self) -> &'a [RunRotateRanges] {
        &self.data.rotate_ranges
    }

    /// Number of glyphs.
    pub fn glyph_count(&self) -> usize {
        self.data.runs.iter().map(|run| run.glyphs.len()).sum()
    }

    /// The line's box in container coordinates.
    ///
    /// Horizontal lines span `ascent + descent` around the baseline and `width` from the first
    /// glyph. Vertical lines are the same box rotated: `ascent + descent` across the column and
    /// `width` down from the first glyph. A line without glyphs keeps the height of its font.
    pub fn bounding_box(&self) -> Rect {
        self.data.bounding_box()
    }

    /// Rectangle of `run`, oriented like the line.
    pub fn run_rect(&self, run: &ShapedRun) -> Rect {
        self.data.run_rect(run)
    }

    /// Attachments shown on this line, with their rectangles.
    ///
    /// Computed on first use and cached.
    pub fn attachments(&self) -> &'a [LineAttachment] {
        self.data.attachments.get_or_init(|| {
            let mut found = Vec::new();
            for run in &self.data.runs {
                let text = self.layout.source_text(run.source);
                let Some((range, attr)) =
                    text.attribute_span_at(AttributeKind::Attachment, run.text_range.start)
                else {
                    continue;
                };
                let velum_text::Attribute::Attachment(attachment) = attr else {
                    continue;
                };
                found.push(LineAttachment {
                    attachment: attachment.clone(),
                    range,
                    source: run.source,
                    rect: self.data.run_rect(run),
                });
            }
            found
        })
    }

    /// Cells of every glyph, in run order.
    pub fn glyph_rects(&self) -> impl Iterator<Item = GlyphRect> + 'a {
        let data = self.data;
        data.runs.iter().flat_map(move |run| {
            let rect = data.run_rect(run);
            run.glyphs.iter().map(move |glyph| {
                let start = run.offset + glyph.offset;
                let cell = if data.vertical {
                    Rect::new(
                        rect.x0,
                        data.origin.y + start,
                        rect.x1,
                        data.origin.y + start + glyph.advance,
                    )
                } else {
                    Rect::new(
                        data.origin.x + start,
                        rect.y0,
                        data.origin.x + start + glyph.advance,
                        rect.y1,
                    )
                };
                GlyphRect {
                    source: run.source,
                    cluster: glyph.cluster,
                    rect: cell,
                }
            })
        })
    }
}
