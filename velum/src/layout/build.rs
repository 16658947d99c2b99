// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout construction.

use alloc::sync::Arc;
use alloc::vec::Vec;
use std::sync::OnceLock;

use hashbrown::HashSet;
use log::{debug, warn};
use peniko::kurbo::{Rect, Size};
use velum_text::{Attribute, AttributeKind, RichText};

use super::truncate::Truncator;
use super::{AttachmentRecord, DrawNeeds, Layout, LayoutContext, LineData, Truncation};
use crate::shape::{FrameRequest, RunSource, ShapedLine};
use crate::{Container, LinePosition, TruncationType};

const ELLIPSIS: &str = "\u{2026}";

pub(super) fn build(
    cx: &LayoutContext,
    text: Arc<RichText>,
    container: &Container,
) -> Option<Layout> {
    if text.is_empty() {
        return None;
    }
    let container = container.clone();
    let vertical = container.vertical_form;

    let mut shaped = if container.is_degenerate() {
        debug!("container has no usable area, laying out zero lines");
        Vec::new()
    } else {
        let request = FrameRequest {
            content_rect: container.content_rect(),
            exclusions: &container.exclusions,
            vertical,
        };
        let frame = cx.shaper.shape_frame(&text, &request);
        if frame.lines.is_empty() {
            warn!(
                "shaper produced no lines for {} bytes of text in {:?}",
                text.len(),
                request.content_rect
            );
        }
        frame.lines
    };

    let mut rows = assign_rows(&shaped, vertical, !container.exclusions.is_empty());
    // A frame that stops before the end of the text, including one with no
    // lines at all, counts as truncated.
    let mut truncated = shaped.last().map_or(0, |line| line.text_range.end) < text.len();
    if container.maximum_rows > 0 {
        let keep = rows.partition_point(|&row| row < container.maximum_rows);
        if keep < shaped.len() {
            shaped.truncate(keep);
            rows.truncate(keep);
            truncated = true;
        }
    }

    let mut truncation = None;
    let mut truncation_token = None;
    if truncated && container.truncation_type != TruncationType::None {
        if let Some(last) = shaped.last_mut() {
            let token = container
                .truncation_token
                .clone()
                .unwrap_or_else(|| Arc::new(default_token(&text, last)));
            let truncator = Truncator {
                shaper: cx.shaper.as_ref(),
                text: &text,
                token: &token,
                vertical,
            };
            let (rebuilt, marker) = truncator.truncate(last, container.truncation_type);
            *last = rebuilt;
            debug!(
                "truncated line {} ({:?}), eliding {:?}",
                shaped.len() - 1,
                marker.kind,
                marker.elided
            );
            truncation = Some(marker);
            truncation_token = Some(token);
        }
    } else if truncated {
        debug!("dropped lines past row {}", container.maximum_rows);
    }

    if let Some(modifier) = &container.line_position_modifier {
        let mut positions: Vec<LinePosition> = shaped
            .iter()
            .zip(&rows)
            .enumerate()
            .map(|(index, (line, &row))| LinePosition {
                index,
                row,
                origin: line.origin,
                ascent: line.metrics.ascent,
                descent: line.metrics.descent,
            })
            .collect();
        modifier.modify_lines(&mut positions, &text, &container);
        for (line, position) in shaped.iter_mut().zip(&positions) {
            line.origin = position.origin;
        }
    }

    let truncated_line = truncation.as_ref().map(|_| shaped.len() - 1);
    let line_count = shaped.len();
    let mut lines = Vec::with_capacity(line_count);
    for (index, (line, row)) in shaped.into_iter().zip(rows).enumerate() {
        let marker = if Some(index) == truncated_line {
            truncation.take()
        } else {
            None
        };
        lines.push(line_data(
            cx,
            &text,
            truncation_token.as_deref(),
            line,
            index,
            row,
            vertical,
            marker,
        ));
    }
    let row_count = lines.last().map_or(0, |line: &LineData| line.row + 1);
    let visible_range = 0..lines.last().map_or(0, |line| line.text_range.end);

    let mut bounds: Option<Rect> = None;
    for line in &lines {
        let rect = line.bounding_box();
        bounds = Some(bounds.map_or(rect, |b| b.union(rect)));
    }
    let (text_bounding_rect, text_bounding_size) = match bounds {
        Some(rect) => bounding(rect, row_count, &container),
        None => (Rect::ZERO, Size::ZERO),
    };

    let mut layout = Layout {
        text,
        container,
        lines,
        row_count,
        visible_range,
        truncated,
        truncated_line,
        truncation_token,
        text_bounding_rect,
        text_bounding_size,
        attachments: Vec::new(),
        attachment_contents: HashSet::new(),
        contains_highlight: false,
        needs: DrawNeeds::default(),
    };
    index_content(&mut layout);
    debug!(
        "laid out {} lines in {} rows, size {:?}",
        layout.lines.len(),
        layout.row_count,
        layout.text_bounding_size
    );
    Some(layout)
}

/// Assigns a row to every line.
///
/// Lines only share a row when an exclusion split them: the next line's baseline then lies
/// within the cross axis extent of the previous one.
fn assign_rows(lines: &[ShapedLine], vertical: bool, may_split: bool) -> Vec<usize> {
    let mut rows = Vec::with_capacity(lines.len());
    let mut row = 0;
    for (ix, line) in lines.iter().enumerate() {
        if ix > 0 {
            let prev = &lines[ix - 1];
            let same_row = may_split && {
                if vertical {
                    let (lo, hi) = (
                        prev.origin.x - prev.metrics.descent,
                        prev.origin.x + prev.metrics.ascent,
                    );
                    line.origin.x > lo && line.origin.x < hi
                } else {
                    let (lo, hi) = (
                        prev.origin.y - prev.metrics.ascent,
                        prev.origin.y + prev.metrics.descent,
                    );
                    line.origin.y > lo && line.origin.y < hi
                }
            };
            if !same_row {
                row += 1;
            }
        }
        rows.push(row);
    }
    rows
}

/// An ellipsis styled like the last visible character, without anchored attributes.
fn default_token(text: &RichText, last: &ShapedLine) -> RichText {
    let end = last.text_range.end.min(text.len());
    let source = &text.as_str()[..end];
    let index = source
        .trim_end()
        .char_indices()
        .next_back()
        .or_else(|| source.char_indices().next_back())
        .map_or(0, |(ix, _)| ix);
    RichText::styled(ELLIPSIS, &text.style_at(index), |kind| {
        !kind.is_discontinuous()
            && !matches!(
                kind,
                AttributeKind::BackedString | AttributeKind::Highlight | AttributeKind::Paragraph
            )
    })
}

fn line_data(
    cx: &LayoutContext,
    text: &RichText,
    token: Option<&RichText>,
    line: ShapedLine,
    index: usize,
    row: usize,
    vertical: bool,
    truncation: Option<Truncation>,
) -> LineData {
    let rotate_ranges = if vertical {
        line.runs
            .iter()
            .map(|run| {
                let source = match (run.source, token) {
                    (RunSource::Token, Some(token)) => token,
                    _ => text,
                };
                let has_transform = source
                    .attribute_at(AttributeKind::GlyphTransform, run.text_range.start)
                    .is_some();
                cx.vertical_table
                    .rotate_ranges(source.as_str(), run, has_transform)
            })
            .collect()
    } else {
        Vec::new()
    };
    let mut metrics = line.metrics;
    let glyph_count = line.glyph_count();
    if glyph_count == 0 && metrics.ascent + metrics.descent <= 0.0 {
        let font = text
            .font_at(line.text_range.start)
            .cloned()
            .unwrap_or_default();
        let nominal = cx.shaper.font_metrics(&font);
        metrics.ascent = nominal.ascent;
        metrics.descent = nominal.descent;
        metrics.leading = nominal.leading;
        metrics.width = 0.0;
    }
    let first_glyph_offset = if glyph_count == 0 {
        0.0
    } else {
        line.first_glyph_offset()
    };
    LineData {
        index,
        row,
        text_range: line.text_range,
        origin: line.origin,
        metrics,
        runs: line.runs,
        rotate_ranges,
        first_glyph_offset,
        max_advance: line.max_advance,
        vertical,
        truncation,
        attachments: OnceLock::new(),
    }
}

/// Grows the union of line boxes by the insets and measures it from the container origin.
fn bounding(union: Rect, row_count: usize, container: &Container) -> (Rect, Size) {
    let insets = container.insets;
    let mut rect = union + insets;
    if let Some(modifier) = &container.line_position_modifier {
        let grid = modifier.height_for_line_count(row_count);
        // The grid is measured from the leading edge of the container.
        if container.vertical_form {
            let left = container.size.width - (grid + insets.x0 + insets.x1);
            rect.x0 = rect.x0.min(left);
        } else {
            rect.y1 = rect.y1.max(grid + insets.y0 + insets.y1);
        }
    }
    let size = if container.vertical_form {
        Size::new(
            (container.size.width - rect.x0).max(0.0).ceil(),
            rect.y1.max(0.0).ceil(),
        )
    } else {
        Size::new(rect.x1.max(0.0).ceil(), rect.y1.max(0.0).ceil())
    };
    (rect, size)
}

/// Fills the attachment index, the highlight flag and the draw needs.
fn index_content(layout: &mut Layout) {
    let text = Arc::clone(&layout.text);
    let visible = layout.visible_range.clone();
    let mut attachments = Vec::new();
    let mut contents = HashSet::new();
    for (index, line) in layout.lines.iter().enumerate() {
        for run in &line.runs {
            let source = match (run.source, &layout.truncation_token) {
                (RunSource::Token, Some(token)) => token.as_ref(),
                _ => text.as_ref(),
            };
            let spans = source.spans_in(AttributeKind::Attachment, run.text_range.clone());
            for (range, attr) in spans {
                let Attribute::Attachment(attachment) = attr else {
                    continue;
                };
                contents.insert(attachment.content);
                if run.source == RunSource::Text
                    && !attachments
                        .last()
                        .is_some_and(|a: &AttachmentRecord| a.range == range)
                {
                    attachments.push(AttachmentRecord {
                        attachment: attachment.clone(),
                        range,
                        line: index,
                    });
                }
            }
        }
    }

    let has = |kind: AttributeKind| {
        text.has_attribute(kind, Some(visible.clone()))
            || layout
                .truncation_token
                .as_ref()
                .is_some_and(|token| token.has_attribute(kind, None))
    };
    let needs = DrawNeeds {
        text: layout.lines.iter().any(|line| !line.runs.is_empty()),
        background: has(AttributeKind::BackgroundColor),
        shadow: has(AttributeKind::Shadow),
        underline: has(AttributeKind::Underline),
        strikethrough: has(AttributeKind::Strikethrough),
        border: has(AttributeKind::Border),
        block_border: has(AttributeKind::BlockBorder),
        attachment: !contents.is_empty(),
        inner_shadow: has(AttributeKind::InnerShadow),
    };
    let contains_highlight =
        !visible.is_empty() && text.has_attribute(AttributeKind::Highlight, Some(visible));

    layout.attachments = attachments;
    layout.attachment_contents = contents;
    layout.needs = needs;
    layout.contains_highlight = contains_highlight;
}

#[cfg(test)]
mod tests {
    use super::*;
    use peniko::kurbo::Point;

    fn line_at(y: f64) -> ShapedLine {
        ShapedLine {
            origin: Point::new(0.0, y),
            metrics: crate::shape::LineMetrics {
                ascent: 12.0,
                descent: 4.0,
                ..Default::default()
            },
            ..ShapedLine::default()
        }
    }

    #[test]
    fn rows_follow_baselines() {
        let lines = [line_at(12.0), line_at(12.0), line_at(28.0)];
        assert_eq!(assign_rows(&lines, false, true), [0, 0, 1]);
        assert_eq!(assign_rows(&lines, false, false), [0, 1, 2]);
    }
}
