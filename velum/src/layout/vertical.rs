// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph rotation rules for vertical form.

use alloc::vec::Vec;
use core::ops::{Range, RangeInclusive};

use smallvec::SmallVec;

use crate::shape::ShapedRun;

/// How a glyph is drawn in a vertical line.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum GlyphDrawMode {
    /// Drawn as laid out, sideways along the column.
    #[default]
    Horizontal,
    /// Rotated upright.
    VerticalRotate,
    /// Rotated upright and moved into the corner of its cell.
    ///
    /// Used for punctuation that would otherwise leave the wrong side of its cell empty.
    VerticalRotateMove,
}

/// A span of glyphs within one run that share a [`GlyphDrawMode`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RotateRange {
    /// Glyph indices within the run.
    pub glyphs: Range<usize>,
    /// How the glyphs are drawn.
    pub mode: GlyphDrawMode,
}

/// Rotate ranges of one run; empty for runs drawn without rotation.
pub type RunRotateRanges = SmallVec<[RotateRange; 2]>;

/// Classifies characters for vertical form.
///
/// Characters in [`rotate`](Self::rotate) stand upright in a vertical line; characters in
/// [`rotate_move`](Self::rotate_move) additionally shift within their cell. Everything else is
/// drawn sideways. The default table covers CJK scripts, kana, Hangul, fullwidth forms and
/// emoji.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerticalGlyphTable {
    /// Codepoint ranges drawn upright.
    pub rotate: Vec<RangeInclusive<u32>>,
    /// Characters drawn upright and moved.
    pub rotate_move: Vec<char>,
}

impl Default for VerticalGlyphTable {
    fn default() -> Self {
        Self {
            rotate: alloc::vec![
                0x1100..=0x11FF, // Hangul Jamo
                0x2460..=0x24FF, // Enclosed Alphanumerics
                0x2E80..=0x2EFF, // CJK Radicals Supplement
                0x2F00..=0x2FDF, // Kangxi Radicals
                0x2FF0..=0x2FFF, // Ideographic Description Characters
                0x3000..=0x303F, // CJK Symbols and Punctuation
                0x3040..=0x309F, // Hiragana
                0x30A0..=0x30FF, // Katakana
                0x3100..=0x312F, // Bopomofo
                0x3130..=0x318F, // Hangul Compatibility Jamo
                0x3190..=0x319F, // Kanbun
                0x31A0..=0x31BF, // Bopomofo Extended
                0x31C0..=0x31EF, // CJK Strokes
                0x31F0..=0x31FF, // Katakana Phonetic Extensions
                0x3200..=0x32FF, // Enclosed CJK Letters and Months
                0x3300..=0x33FF, // CJK Compatibility
                0x3400..=0x4DBF, // CJK Unified Ideographs Extension A
                0x4DC0..=0x4DFF, // Yijing Hexagram Symbols
                0x4E00..=0x9FFF, // CJK Unified Ideographs
                0xA960..=0xA97F, // Hangul Jamo Extended-A
                0xAC00..=0xD7AF, // Hangul Syllables
                0xD7B0..=0xD7FF, // Hangul Jamo Extended-B
                0xF900..=0xFAFF, // CJK Compatibility Ideographs
                0xFE10..=0xFE1F, // Vertical Forms
                0xFE30..=0xFE4F, // CJK Compatibility Forms
                0xFF00..=0xFFEF, // Halfwidth and Fullwidth Forms
                0x1F200..=0x1F2FF, // Enclosed Ideographic Supplement
                0x1F300..=0x1F64F, // Pictographs and Emoticons
                0x1F680..=0x1F6FF, // Transport and Map Symbols
                0x1F900..=0x1F9FF, // Supplemental Symbols and Pictographs
                0x20000..=0x2FA1F, // CJK Unified Ideographs Extension B to F
            ],
            rotate_move: alloc::vec!['\u{3001}', '\u{3002}', '\u{FF0C}', '\u{FF0E}'],
        }
    }
}

impl VerticalGlyphTable {
    /// The draw mode of `ch`.
    pub fn classify(&self, ch: char) -> GlyphDrawMode {
        if self.rotate_move.contains(&ch) {
            return GlyphDrawMode::VerticalRotateMove;
        }
        let cp = u32::from(ch);
        if self.rotate.iter().any(|range| range.contains(&cp)) {
            GlyphDrawMode::VerticalRotate
        } else {
            GlyphDrawMode::Horizontal
        }
    }

    /// Splits the glyphs of `run` into ranges of equal draw mode.
    ///
    /// `source` is the text the run's clusters index into. Runs with a glyph transform are
    /// drawn as the transform says and get no ranges.
    pub(crate) fn rotate_ranges(
        &self,
        source: &str,
        run: &ShapedRun,
        has_transform: bool,
    ) -> RunRotateRanges {
        let mut ranges = RunRotateRanges::new();
        if has_transform {
            return ranges;
        }
        for (ix, glyph) in run.glyphs.iter().enumerate() {
            let mode = source
                .get(glyph.cluster..)
                .and_then(|s| s.chars().next())
                .map_or(GlyphDrawMode::Horizontal, |ch| self.classify(ch));
            match ranges.last_mut() {
                Some(last) if last.mode == mode && last.glyphs.end == ix => last.glyphs.end += 1,
                _ => ranges.push(RotateRange {
                    glyphs: ix..ix + 1,
                    mode,
                }),
            }
        }
        if ranges.iter().all(|r| r.mode == GlyphDrawMode::Horizontal) {
            ranges.clear();
        }
        ranges
    }
}
