// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rebuilding the last visible line around a truncation token.

use alloc::vec::Vec;
use core::ops::Range;

use velum_text::{RichText, TextAlignment};

use super::Truncation;
use crate::shape::{LineMetrics, RunSource, ShapedLine, Shaper};
use crate::TruncationType;

/// Everything needed to shorten one line.
pub(crate) struct Truncator<'a> {
    pub(crate) shaper: &'a dyn Shaper,
    pub(crate) text: &'a RichText,
    pub(crate) token: &'a RichText,
    pub(crate) vertical: bool,
}

impl Truncator<'_> {
    fn width(&self, range: Range<usize>) -> f64 {
        self.shaper
            .shape_line(self.text, range, self.vertical)
            .map_or(0.0, |line| line.metrics.width)
    }

    /// Rebuilds `line` so that the kept text plus the token fits its available advance.
    ///
    /// The returned line keeps the original text range and origin; the [`Truncation`] records
    /// which part of the text is hidden.
    pub(crate) fn truncate(
        &self,
        line: &ShapedLine,
        kind: TruncationType,
    ) -> (ShapedLine, Truncation) {
        let token_line = self
            .shaper
            .shape_line(self.token, 0..self.token.len(), self.vertical);
        let token_width = token_line
            .as_ref()
            .map_or(0.0, |l| l.metrics.width + l.metrics.trailing_whitespace);
        let available = if line.max_advance.is_finite() {
            line.max_advance
        } else {
            line.metrics.width
        };
        let budget = available - token_width;
        let source = self.text.as_str();
        let range = line.text_range.clone();
        let boundaries: Vec<usize> = source[range.clone()]
            .char_indices()
            .map(|(ix, _)| range.start + ix)
            .chain(core::iter::once(range.end))
            .collect();

        let (head, tail, elided) = match kind {
            TruncationType::Start => {
                // Smallest start whose tail fits.
                let first = boundaries.partition_point(|&start| {
                    self.width(trim_start(source, start..range.end)) > budget
                });
                let start = boundaries.get(first).copied().unwrap_or(range.end);
                let tail = trim_start(source, start..range.end);
                let tail = trim_end(source, tail);
                let elided = range.start..tail.start;
                (range.start..range.start, tail, elided)
            }
            TruncationType::Middle => {
                let count = boundaries.len() - 1;
                let split = |removed: usize| {
                    let kept = count - removed;
                    let head_end = boundaries[kept.div_ceil(2)];
                    let tail_start = boundaries[count - kept / 2];
                    (
                        trim_end(source, range.start..head_end),
                        trim_start(source, tail_start..range.end),
                    )
                };
                let removed = (0..=count)
                    .find(|&removed| {
                        let (head, tail) = split(removed);
                        self.width(head) + self.width(trim_end(source, tail)) <= budget
                    })
                    .unwrap_or(count);
                let (head, tail) = split(removed);
                let tail = trim_end(source, tail);
                let elided = head.end..tail.start.max(head.end);
                (head, tail, elided)
            }
            TruncationType::End | TruncationType::None => {
                // Number of boundaries whose head fits, minus one, is the last fitting end.
                let fitting = boundaries.partition_point(|&end| {
                    self.width(trim_end(source, range.start..end)) <= budget
                });
                let end = boundaries[fitting.saturating_sub(1)];
                let head = trim_end(source, range.start..end);
                let elided = head.end..source.len();
                (head, range.end..range.end, elided)
            }
        };

        let mut pieces: Vec<(RunSource, ShapedLine)> = Vec::with_capacity(3);
        let mut push_text = |range: Range<usize>| {
            if let Some(shaped) = self.shaper.shape_line(self.text, range, self.vertical) {
                pieces.push((RunSource::Text, shaped));
            }
        };
        match kind {
            TruncationType::Start => {}
            _ => push_text(head),
        }
        if let Some(token_line) = token_line {
            pieces.push((RunSource::Token, token_line));
        }
        if kind != TruncationType::End && !tail.is_empty() {
            if let Some(shaped) = self.shaper.shape_line(self.text, tail, self.vertical) {
                pieces.push((RunSource::Text, shaped));
            }
        }

        let mut rebuilt = assemble(line, pieces);
        let shift = alignment_shift(self.text, line, &rebuilt);
        for run in &mut rebuilt.runs {
            run.offset += shift;
        }
        let truncation = Truncation { kind, elided };
        (rebuilt, truncation)
    }
}

/// Lays `pieces` out one after another along the line axis.
fn assemble(original: &ShapedLine, pieces: Vec<(RunSource, ShapedLine)>) -> ShapedLine {
    let mut metrics = LineMetrics::default();
    let mut runs = Vec::new();
    let mut x = 0.0;
    let count = pieces.len();
    for (ix, (source, piece)) in pieces.into_iter().enumerate() {
        metrics.ascent = metrics.ascent.max(piece.metrics.ascent);
        metrics.descent = metrics.descent.max(piece.metrics.descent);
        metrics.leading = metrics.leading.max(piece.metrics.leading);
        for mut run in piece.runs {
            run.source = source;
            run.offset += x;
            runs.push(run);
        }
        x += piece.metrics.width;
        if ix + 1 < count {
            x += piece.metrics.trailing_whitespace;
        } else {
            metrics.trailing_whitespace = piece.metrics.trailing_whitespace;
        }
    }
    metrics.width = x;
    if runs.is_empty() {
        metrics.ascent = original.metrics.ascent;
        metrics.descent = original.metrics.descent;
        metrics.leading = original.metrics.leading;
    }
    ShapedLine {
        text_range: original.text_range.clone(),
        origin: original.origin,
        metrics,
        runs,
        max_advance: original.max_advance,
    }
}

/// Offset that keeps the rebuilt line aligned the way the original was.
fn alignment_shift(text: &RichText, original: &ShapedLine, rebuilt: &ShapedLine) -> f64 {
    let alignment = text
        .paragraph_style_at(original.text_range.start)
        .map_or(TextAlignment::Left, |style| style.resolved_alignment());
    let base = if original.runs.is_empty() {
        0.0
    } else {
        original.first_glyph_offset()
    };
    let slack = original.metrics.width - rebuilt.metrics.width;
    match alignment {
        TextAlignment::Right => base + slack,
        TextAlignment::Center => base + slack * 0.5,
        _ => base,
    }
}

fn trim_end(source: &str, range: Range<usize>) -> Range<usize> {
    let kept = source[range.clone()].trim_end();
    range.start..range.start + kept.len()
}

fn trim_start(source: &str, range: Range<usize>) -> Range<usize> {
    let kept = source[range.clone()].trim_start();
    range.end - kept.len()..range.end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{FrameRequest, MonospaceShaper};
    use peniko::kurbo::Rect;

    fn first_line(shaper: &MonospaceShaper, text: &RichText, width: f64) -> ShapedLine {
        let request = FrameRequest {
            content_rect: Rect::new(0.0, 0.0, width, 1000.0),
            exclusions: &[],
            vertical: false,
        };
        shaper.shape_frame(text, &request).lines.remove(0)
    }

    fn visible(text: &RichText, token: &RichText, line: &ShapedLine) -> alloc::string::String {
        line.runs
            .iter()
            .map(|run| match run.source {
                RunSource::Text => &text.as_str()[run.text_range.clone()],
                RunSource::Token => &token.as_str()[run.text_range.clone()],
            })
            .collect()
    }

    #[test]
    fn end_keeps_head() {
        let shaper = MonospaceShaper::default();
        let text = RichText::new("abcdefghijklmnopqrstuvwxyz");
        let line = first_line(&shaper, &text, 80.0);
        let token = RichText::new("\u{2026}");
        let truncator = Truncator {
            shaper: &shaper,
            text: &text,
            token: &token,
            vertical: false,
        };
        let (rebuilt, truncation) = truncator.truncate(&line, TruncationType::End);
        assert_eq!(visible(&text, &token, &rebuilt), "abcdefghi\u{2026}");
        assert_eq!(rebuilt.metrics.width, 80.0);
        assert_eq!(truncation.elided, 9..26);
        assert_eq!(rebuilt.text_range, line.text_range);
    }

    #[test]
    fn start_keeps_tail() {
        let shaper = MonospaceShaper::default();
        let text = RichText::new("abcdefghij");
        let line = shaper.shape_line(&text, 0..10, false).unwrap();
        let line = ShapedLine {
            max_advance: 48.0,
            ..line
        };
        let token = RichText::new("\u{2026}");
        let truncator = Truncator {
            shaper: &shaper,
            text: &text,
            token: &token,
            vertical: false,
        };
        let (rebuilt, truncation) = truncator.truncate(&line, TruncationType::Start);
        assert_eq!(visible(&text, &token, &rebuilt), "\u{2026}fghij");
        assert_eq!(truncation.elided, 0..5);
    }

    #[test]
    fn middle_keeps_both_ends() {
        let shaper = MonospaceShaper::default();
        let text = RichText::new("abcdefghij");
        let line = shaper.shape_line(&text, 0..10, false).unwrap();
        let line = ShapedLine {
            max_advance: 56.0,
            ..line
        };
        let token = RichText::new("\u{2026}");
        let truncator = Truncator {
            shaper: &shaper,
            text: &text,
            token: &token,
            vertical: false,
        };
        let (rebuilt, truncation) = truncator.truncate(&line, TruncationType::Middle);
        assert_eq!(visible(&text, &token, &rebuilt), "abc\u{2026}hij");
        assert_eq!(truncation.elided, 3..7);
        assert!(rebuilt.metrics.width <= 56.0);
    }

    #[test]
    fn whitespace_next_to_token_is_dropped() {
        let shaper = MonospaceShaper::default();
        let text = RichText::new("abcd efghij");
        let line = shaper.shape_line(&text, 0..11, false).unwrap();
        let line = ShapedLine {
            max_advance: 48.0,
            ..line
        };
        let token = RichText::new("\u{2026}");
        let truncator = Truncator {
            shaper: &shaper,
            text: &text,
            token: &token,
            vertical: false,
        };
        let (rebuilt, _) = truncator.truncate(&line, TruncationType::End);
        assert_eq!(visible(&text, &token, &rebuilt), "abcd\u{2026}");
    }
}
