// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A deterministic shaper with fixed-ratio advances.

use alloc::vec::Vec;
use core::ops::Range;

use icu_segmenter::options::LineBreakOptions;
use icu_segmenter::LineSegmenter;
use peniko::kurbo::Point;
use smallvec::SmallVec;
use unicode_width::UnicodeWidthChar;
use velum_text::{Font, FontMetrics, RichText, TextAlignment};

use super::{FrameRequest, LineMetrics, ShapedFrame, ShapedGlyph, ShapedLine, ShapedRun, Shaper};
use crate::Exclusion;

const EPSILON: f64 = 1e-6;

/// A shaper that gives every character an advance proportional to its font size.
///
/// East Asian wide characters take [`wide_advance`](Self::wide_advance) ems, everything else
/// [`advance`](Self::advance) ems. Run delegates replace the metrics of the characters they
/// cover, kerning is added after every character, and line break opportunities come from the
/// Unicode line breaking algorithm.
#[derive(Clone, Debug, PartialEq)]
pub struct MonospaceShaper {
    /// Font used where the text sets none.
    pub default_font: Font,
    /// Ascent in ems.
    pub ascent: f64,
    /// Descent in ems.
    pub descent: f64,
    /// Leading in ems.
    pub leading: f64,
    /// Advance of narrow characters in ems.
    pub advance: f64,
    /// Advance of wide characters in ems.
    pub wide_advance: f64,
}

impl Default for MonospaceShaper {
    fn default() -> Self {
        Self {
            default_font: Font::default(),
            ascent: 0.75,
            descent: 0.25,
            leading: 0.0,
            advance: 0.5,
            wide_advance: 1.0,
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct Cluster {
    start: usize,
    end: usize,
    ch: char,
    advance: f64,
    ascent: f64,
    descent: f64,
    leading: f64,
    whitespace: bool,
    hard_break: bool,
}

/// Where a line goes along its axis.
#[derive(Copy, Clone, Debug)]
struct Placement {
    start: f64,
    available: f64,
    alignment: TextAlignment,
    rtl: bool,
    justify: bool,
}

fn is_hard_break(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

impl MonospaceShaper {
    fn clusters(&self, text: &RichText, range: Range<usize>) -> Vec<Cluster> {
        let source = text.as_str();
        let mut clusters = Vec::with_capacity(range.len());
        for run in text.style_runs(Some(range)) {
            let font = run.style.font().unwrap_or(&self.default_font);
            let metrics = self.font_metrics(font);
            let size = f64::from(font.size);
            let kern = run.style.kern().copied().unwrap_or(0.0);
            let delegate = run.style.run_delegate();
            for (offset, ch) in source[run.range.clone()].char_indices() {
                let start = run.range.start + offset;
                let hard_break = is_hard_break(ch);
                let (advance, ascent, descent) = match delegate {
                    Some(d) => (d.width + kern, d.ascent, d.descent),
                    None if hard_break => (0.0, metrics.ascent, metrics.descent),
                    None => {
                        let wide = ch.width() == Some(2);
                        let em = if wide { self.wide_advance } else { self.advance };
                        (em * size + kern, metrics.ascent, metrics.descent)
                    }
                };
                clusters.push(Cluster {
                    start,
                    end: start + ch.len_utf8(),
                    ch,
                    advance,
                    ascent,
                    descent,
                    leading: metrics.leading,
                    whitespace: !hard_break && ch.is_whitespace(),
                    hard_break,
                });
            }
        }
        clusters
    }

    /// Marks clusters that may start a new line.
    fn break_opportunities(text: &str, clusters: &[Cluster]) -> Vec<bool> {
        let segmenter = LineSegmenter::new_auto(LineBreakOptions::default());
        let mut breaks = segmenter.segment_str(text).peekable();
        clusters
            .iter()
            .map(|cluster| {
                while breaks.next_if(|&b| b < cluster.start).is_some() {}
                breaks.peek() == Some(&cluster.start)
            })
            .collect()
    }

    /// Returns the end of the line starting at cluster `start`.
    ///
    /// Returns `start` when nothing fits and `force` is unset.
    fn fill(
        clusters: &[Cluster],
        can_break: &[bool],
        start: usize,
        end: usize,
        max_advance: f64,
        force: bool,
    ) -> usize {
        let mut x = 0.0;
        let mut last_break = None;
        for ix in start..end {
            let cluster = &clusters[ix];
            if ix > start && can_break[ix] {
                last_break = Some(ix);
            }
            if cluster.hard_break {
                return ix + 1;
            }
            if cluster.whitespace {
                // Trailing whitespace hangs past the edge.
                x += cluster.advance;
                continue;
            }
            if x + cluster.advance > max_advance + EPSILON {
                return match last_break {
                    Some(b) => b,
                    None if ix > start => ix,
                    None if force => ix + 1,
                    None => start,
                };
            }
            x += cluster.advance;
        }
        end
    }

    fn build_line(
        text: &RichText,
        clusters: &[Cluster],
        placement: Placement,
        origin: Point,
    ) -> ShapedLine {
        let text_range = clusters[0].start..clusters[clusters.len() - 1].end;
        let visible_end = clusters
            .iter()
            .rposition(|c| !c.whitespace && !c.hard_break)
            .map_or(0, |ix| ix + 1);
        let width: f64 = clusters[..visible_end].iter().map(|c| c.advance).sum();
        let trailing_whitespace: f64 = clusters[visible_end..]
            .iter()
            .filter(|c| !c.hard_break)
            .map(|c| c.advance)
            .sum();

        let slack = (placement.available - width).max(0.0);
        let mut shift = match placement.alignment {
            TextAlignment::Center => slack * 0.5,
            TextAlignment::Right => slack,
            TextAlignment::Natural if placement.rtl => slack,
            _ => 0.0,
        };
        if !placement.available.is_finite() {
            shift = 0.0;
        }
        let spaces = clusters[..visible_end]
            .iter()
            .filter(|c| c.whitespace)
            .count();
        let stretch = if placement.justify
            && placement.alignment == TextAlignment::Justified
            && placement.available.is_finite()
            && spaces > 0
        {
            slack / spaces as f64
        } else {
            0.0
        };

        // Logical positions, then mirrored for right to left paragraphs.
        let mut positions = Vec::with_capacity(clusters.len());
        let mut x = 0.0;
        for (ix, cluster) in clusters.iter().enumerate() {
            positions.push(x);
            x += cluster.advance;
            if cluster.whitespace && ix < visible_end {
                x += stretch;
            }
        }
        let line_width = if stretch > 0.0 { placement.available } else { width };
        let visual = |ix: usize| {
            let pos = positions[ix];
            if placement.rtl {
                placement.start + shift + line_width - pos - clusters[ix].advance
            } else {
                placement.start + shift + pos
            }
        };

        let mut metrics = LineMetrics {
            width: line_width,
            trailing_whitespace,
            ..LineMetrics::default()
        };
        for cluster in clusters {
            metrics.ascent = metrics.ascent.max(cluster.ascent);
            metrics.descent = metrics.descent.max(cluster.descent);
            metrics.leading = metrics.leading.max(cluster.leading);
        }

        let mut runs = Vec::new();
        for style_run in text.style_runs(Some(text_range.clone())) {
            let first = clusters.partition_point(|c| c.start < style_run.range.start);
            let last = clusters.partition_point(|c| c.start < style_run.range.end);
            let members: SmallVec<[usize; 32]> =
                (first..last).filter(|&ix| !clusters[ix].hard_break).collect();
            if members.is_empty() {
                continue;
            }
            let offset = members
                .iter()
                .map(|&ix| visual(ix))
                .fold(f64::INFINITY, f64::min);
            let mut run = ShapedRun {
                text_range: style_run.range.clone(),
                offset,
                ..ShapedRun::default()
            };
            for &ix in &members {
                let cluster = &clusters[ix];
                run.glyphs.push(ShapedGlyph {
                    id: u32::from(cluster.ch),
                    cluster: cluster.start,
                    offset: visual(ix) - offset,
                    advance: cluster.advance,
                });
                run.width += cluster.advance;
                run.ascent = run.ascent.max(cluster.ascent);
                run.descent = run.descent.max(cluster.descent);
                run.leading = run.leading.max(cluster.leading);
            }
            if placement.rtl {
                run.glyphs.reverse();
            }
            runs.push(run);
        }

        ShapedLine {
            text_range,
            origin,
            metrics,
            runs,
            max_advance: placement.available,
        }
    }
}

/// Splits `line_start..line_end` around the exclusions crossing the band.
fn free_fragments(
    line_start: f64,
    line_end: f64,
    band: (f64, f64),
    exclusions: &[Exclusion],
    vertical: bool,
) -> SmallVec<[(f64, f64); 2]> {
    let mut blocked: SmallVec<[(f64, f64); 4]> = exclusions
        .iter()
        .filter_map(|e| e.blocked_interval(band.0, band.1, vertical))
        .collect();
    blocked.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut fragments = SmallVec::new();
    let mut cursor = line_start;
    for (start, end) in blocked {
        if start > cursor {
            fragments.push((cursor, start.min(line_end)));
        }
        cursor = cursor.max(end);
        if cursor >= line_end {
            break;
        }
    }
    if cursor < line_end {
        fragments.push((cursor, line_end));
    }
    fragments.retain(|(a, b)| *b - *a > EPSILON);
    fragments
}

impl Shaper for MonospaceShaper {
    fn shape_frame(&self, text: &RichText, request: &FrameRequest<'_>) -> ShapedFrame {
        let mut frame = ShapedFrame::default();
        let rect = request.content_rect;
        if text.is_empty() || !(rect.width() > 0.0 && rect.height() > 0.0) {
            return frame;
        }
        let vertical = request.vertical;
        let clusters = self.clusters(text, 0..text.len());
        let can_break = Self::break_opportunities(text.as_str(), &clusters);
        let (axis_start, axis_extent, cross_extent) = if vertical {
            (rect.y0, rect.height(), rect.width())
        } else {
            (rect.x0, rect.width(), rect.height())
        };
        // Cross axis distance consumed so far, from the top (or the right in vertical form).
        let mut cursor = 0.0;
        let mut ix = 0;
        while ix < clusters.len() {
            let paragraph_end = clusters[ix..]
                .iter()
                .position(|c| c.hard_break)
                .map_or(clusters.len(), |p| ix + p + 1);
            let style = text
                .paragraph_style_at(clusters[ix].start)
                .cloned()
                .unwrap_or_default();
            let mut first_line = true;
            while ix < paragraph_end {
                let nominal = style.clamp_line_height(
                    clusters[ix].ascent + clusters[ix].descent + clusters[ix].leading,
                );
                if cursor + nominal > cross_extent + EPSILON {
                    return frame;
                }
                let head = if first_line {
                    style.first_line_head_indent
                } else {
                    style.head_indent
                };
                let (lead, trail) = if style.is_rtl() {
                    (style.tail_indent, head)
                } else {
                    (head, style.tail_indent)
                };
                let line_start = axis_start + lead;
                let line_end = axis_start + axis_extent - trail;
                let band = if vertical {
                    (rect.x1 - cursor - nominal, rect.x1 - cursor)
                } else {
                    (rect.y0 + cursor, rect.y0 + cursor + nominal)
                };
                let fragments =
                    free_fragments(line_start, line_end, band, request.exclusions, vertical);
                let unobstructed = fragments.len() == 1
                    && (fragments[0].0 - line_start).abs() < EPSILON
                    && (fragments[0].1 - line_end).abs() < EPSILON;

                let mut pieces: SmallVec<[(Range<usize>, (f64, f64)); 2]> = SmallVec::new();
                let mut next = ix;
                for &(start, end) in &fragments {
                    if next >= paragraph_end {
                        break;
                    }
                    let stop = Self::fill(
                        &clusters,
                        &can_break,
                        next,
                        paragraph_end,
                        end - start,
                        unobstructed,
                    );
                    if stop > next {
                        pieces.push((next..stop, (start, end)));
                        next = stop;
                    }
                }
                if pieces.is_empty() {
                    let mut blockers = request
                        .exclusions
                        .iter()
                        .filter(|e| e.blocked_interval(band.0, band.1, vertical).is_some())
                        .peekable();
                    if blockers.peek().is_none() {
                        // Indents leave no room and nothing below will be wider, so
                        // place at least one cluster past the head indent.
                        let stop = Self::fill(
                            &clusters,
                            &can_break,
                            ix,
                            paragraph_end,
                            (line_end - line_start).max(0.0),
                            true,
                        );
                        pieces.push((ix..stop, (line_start, line_start.max(line_end))));
                        next = stop;
                    } else if blockers.any(|e| !e.bounds().is_finite()) {
                        return frame;
                    } else {
                        // The band is too obstructed; try further down.
                        cursor += nominal.max(1.0);
                        continue;
                    }
                }

                let (mut ascent, mut descent, mut leading) = (0.0_f64, 0.0_f64, 0.0_f64);
                for cluster in &clusters[ix..next] {
                    ascent = ascent.max(cluster.ascent);
                    descent = descent.max(cluster.descent);
                    leading = leading.max(cluster.leading);
                }
                let height = style.clamp_line_height(ascent + descent + leading);
                if cursor + height > cross_extent + EPSILON {
                    return frame;
                }
                let baseline = cursor + height - descent - leading;
                for (range, (start, end)) in pieces {
                    let last_in_paragraph = range.end >= paragraph_end;
                    let placement = Placement {
                        start: 0.0,
                        available: end - start,
                        alignment: style.resolved_alignment(),
                        rtl: style.is_rtl(),
                        justify: !last_in_paragraph,
                    };
                    let origin = if vertical {
                        Point::new(rect.x1 - baseline, start)
                    } else {
                        Point::new(start, rect.y0 + baseline)
                    };
                    frame.lines.push(Self::build_line(
                        text,
                        &clusters[range],
                        placement,
                        origin,
                    ));
                }
                ix = next;
                cursor += height + style.line_spacing;
                first_line = false;
            }
            cursor += style.paragraph_spacing;
        }
        frame
    }

    fn shape_line(
        &self,
        text: &RichText,
        range: Range<usize>,
        _vertical: bool,
    ) -> Option<ShapedLine> {
        if range.is_empty() {
            return None;
        }
        let clusters = self.clusters(text, range);
        if clusters.is_empty() {
            return None;
        }
        let placement = Placement {
            start: 0.0,
            available: f64::INFINITY,
            alignment: TextAlignment::Left,
            rtl: false,
            justify: false,
        };
        Some(Self::build_line(text, &clusters, placement, Point::ZERO))
    }

    fn font_metrics(&self, font: &Font) -> FontMetrics {
        let size = f64::from(font.size);
        FontMetrics {
            ascent: self.ascent * size,
            descent: self.descent * size,
            leading: self.leading * size,
        }
    }
}
