// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit testing.
//!
//! Points are in container coordinates. Callers that work in view coordinates convert first,
//! see [`crate::coords`].

use core::ops::Range;

use peniko::kurbo::{Point, Rect};
use velum_text::{Attribute, AttributeKind, Highlight};

use super::{GlyphRect, Layout, Line, LineAttachment};
use crate::shape::RunSource;

impl Layout {
    /// Index of the line whose box contains `point`.
    pub fn line_index_for_point(&self, point: Point) -> Option<usize> {
        self.lines()
            .position(|line| line.bounding_box().contains(point))
    }

    /// Index of the line nearest to `point`.
    ///
    /// Distance across lines wins over distance along them, so a point beside a line picks
    /// that line rather than a closer line of another row.
    pub fn closest_line_index_for_point(&self, point: Point) -> Option<usize> {
        let vertical = self.is_vertical();
        let mut best: Option<(f64, f64, usize)> = None;
        for line in self.lines() {
            let rect = line.bounding_box();
            let (cross, along) = if vertical {
                (gap(point.x, rect.x0, rect.x1), gap(point.y, rect.y0, rect.y1))
            } else {
                (gap(point.y, rect.y0, rect.y1), gap(point.x, rect.x0, rect.x1))
            };
            let better = best.is_none_or(|(c, a, _)| cross < c || (cross == c && along < a));
            if better {
                best = Some((cross, along, line.index()));
            }
        }
        best.map(|(_, _, index)| index)
    }

    /// The text position closest to `point`, as a byte offset between characters.
    pub fn text_index_at_point(&self, point: Point) -> Option<usize> {
        let line = self.line(self.closest_line_index_for_point(point)?)?;
        let vertical = line.is_vertical();
        let axis = |p: Point| if vertical { p.y } else { p.x };
        let text = self.text.as_str();
        let mut best: Option<(f64, usize)> = None;
        for glyph in line.glyph_rects() {
            if glyph.source != RunSource::Text {
                continue;
            }
            let (start, end) = if vertical {
                (glyph.rect.y0, glyph.rect.y1)
            } else {
                (glyph.rect.x0, glyph.rect.x1)
            };
            let char_len = text[glyph.cluster..].chars().next().map_or(0, char::len_utf8);
            let at = axis(point);
            for (edge, index) in [(start, glyph.cluster), (end, glyph.cluster + char_len)] {
                let distance = (at - edge).abs();
                if best.is_none_or(|(d, _)| distance < d) {
                    best = Some((distance, index));
                }
            }
        }
        Some(best.map_or(line.text_range().start, |(_, index)| index))
    }

    /// The highlight under `point` and the range it covers.
    ///
    /// Returns immediately when the layout shows no highlight.
    pub fn highlight_at_point(&self, point: Point) -> Option<(Range<usize>, &Highlight)> {
        if !self.contains_highlight {
            return None;
        }
        let glyph = self.glyph_at_point(point)?;
        if glyph.source != RunSource::Text {
            return None;
        }
        match self
            .text
            .attribute_span_at(AttributeKind::Highlight, glyph.cluster)?
        {
            (range, Attribute::Highlight(highlight)) => Some((range, highlight)),
            _ => None,
        }
    }

    /// The attachment whose rectangle contains `point`.
    pub fn attachment_at_point(&self, point: Point) -> Option<&LineAttachment> {
        let line = self.line(self.line_index_for_point(point)?)?;
        line.attachments()
            .iter()
            .find(|attachment| attachment.rect.contains(point))
    }

    /// Union of the glyph cells of `range`, or `None` when no glyph of it is shown.
    pub fn rect_for_range(&self, range: Range<usize>) -> Option<Rect> {
        let mut union: Option<Rect> = None;
        for line in self.lines() {
            let line_range = line.text_range();
            if line_range.end <= range.start || line_range.start >= range.end {
                continue;
            }
            for glyph in line.glyph_rects() {
                if glyph.source == RunSource::Text && range.contains(&glyph.cluster) {
                    union = Some(union.map_or(glyph.rect, |u| u.union(glyph.rect)));
                }
            }
        }
        union
    }

    /// Index of the first line in `row`.
    pub fn line_index_for_row(&self, row: usize) -> Option<usize> {
        let index = self.lines.partition_point(|line| line.row < row);
        self.lines
            .get(index)
            .filter(|line| line.row == row)
            .map(|_| index)
    }

    /// Number of lines in `row`.
    pub fn line_count_for_row(&self, row: usize) -> usize {
        let start = self.lines.partition_point(|line| line.row < row);
        let end = self.lines.partition_point(|line| line.row <= row);
        end - start
    }

    /// Row of the line at `index`.
    pub fn row_index_for_line(&self, index: usize) -> Option<usize> {
        self.lines.get(index).map(|line| line.row)
    }

    fn glyph_at_point(&self, point: Point) -> Option<GlyphRect> {
        let line: Line<'_> = self.line(self.line_index_for_point(point)?)?;
        line.glyph_rects().find(|glyph| glyph.rect.contains(point))
    }
}

/// Distance from `x` to the interval `lo..hi`.
fn gap(x: f64, lo: f64, hi: f64) -> f64 {
    if x < lo {
        lo - x
    } else if x > hi {
        x - hi
    } else {
        0.0
    }
}
