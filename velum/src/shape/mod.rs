// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The shaping service seam.
//!
//! Layout treats shaping as a black box: a [`Shaper`] turns styled text and frame constraints
//! into positioned glyph runs grouped into lines. [`MonospaceShaper`] is a deterministic
//! implementation used when no platform shaper is available, and by tests.

mod monospace;

use alloc::vec::Vec;
use core::fmt;
use core::ops::Range;

use peniko::kurbo::{Point, Rect};
use velum_text::{Font, FontMetrics, RichText};

use crate::Exclusion;

pub use monospace::MonospaceShaper;

/// Metrics of one shaped line.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LineMetrics {
    /// Largest ascent of the line's runs.
    pub ascent: f64,
    /// Largest descent of the line's runs.
    pub descent: f64,
    /// Largest leading of the line's runs.
    pub leading: f64,
    /// Advance of the line, excluding trailing whitespace.
    pub width: f64,
    /// Advance of trailing whitespace.
    pub trailing_whitespace: f64,
}

/// One glyph of a run.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShapedGlyph {
    /// Glyph identifier understood by the renderer.
    pub id: u32,
    /// Byte offset of the cluster in the source text.
    pub cluster: usize,
    /// Offset along the line axis from the start of the run.
    pub offset: f64,
    /// Advance along the line axis.
    pub advance: f64,
}

/// The text a run was shaped from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum RunSource {
    /// The layout's text.
    #[default]
    Text,
    /// The truncation token.
    Token,
}

/// A sequence of glyphs with uniform style.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapedRun {
    /// Which text `text_range` indexes into.
    pub source: RunSource,
    /// Source range of the run.
    pub text_range: Range<usize>,
    /// Glyphs in visual order.
    pub glyphs: Vec<ShapedGlyph>,
    /// Height above the baseline.
    pub ascent: f64,
    /// Depth below the baseline.
    pub descent: f64,
    /// Leading.
    pub leading: f64,
    /// Offset along the line axis from the line origin.
    pub offset: f64,
    /// Advance of the run.
    pub width: f64,
}

/// One line produced by a [`Shaper`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapedLine {
    /// Source range, including trailing whitespace and line break.
    pub text_range: Range<usize>,
    /// Baseline origin in container coordinates.
    ///
    /// In vertical form `origin.x` is the baseline of the column and `origin.y` the start of
    /// the line axis.
    pub origin: Point,
    /// Line metrics.
    pub metrics: LineMetrics,
    /// Runs in logical order.
    pub runs: Vec<ShapedRun>,
    /// Space available along the line axis, measured from `origin`.
    pub max_advance: f64,
}

impl ShapedLine {
    /// Offset of the first glyph along the line axis.
    pub fn first_glyph_offset(&self) -> f64 {
        self.runs
            .iter()
            .filter_map(|run| run.glyphs.first().map(|g| run.offset + g.offset))
            .fold(None, |min: Option<f64>, x| Some(min.map_or(x, |m| m.min(x))))
            .unwrap_or(0.0)
    }

    /// Number of glyphs in the line.
    pub fn glyph_count(&self) -> usize {
        self.runs.iter().map(|run| run.glyphs.len()).sum()
    }
}

/// Constraints for [`Shaper::shape_frame`].
#[derive(Copy, Clone, Debug)]
pub struct FrameRequest<'a> {
    /// Rectangle lines are placed in.
    pub content_rect: Rect,
    /// Regions lines must avoid.
    pub exclusions: &'a [Exclusion],
    /// Lay out in vertical columns.
    pub vertical: bool,
}

/// Lines produced by [`Shaper::shape_frame`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapedFrame {
    /// Lines in reading order.
    pub lines: Vec<ShapedLine>,
}

impl ShapedFrame {
    /// End of the text the frame covers.
    pub fn visible_end(&self) -> usize {
        self.lines.last().map_or(0, |line| line.text_range.end)
    }
}

/// A glyph shaping service.
///
/// Implementations must be deterministic: the same inputs give the same output. A shaper may
/// stop before the end of the text, for example when the frame is full; layout treats that as
/// truncation.
pub trait Shaper: Send + Sync + fmt::Debug {
    /// Shapes `text` into lines filling `request`.
    fn shape_frame(&self, text: &RichText, request: &FrameRequest<'_>) -> ShapedFrame;

    /// Shapes `range` of `text` as one unbroken line at the origin.
    ///
    /// Returns `None` for an empty range.
    fn shape_line(&self, text: &RichText, range: Range<usize>, vertical: bool)
        -> Option<ShapedLine>;

    /// Vertical metrics of `font`.
    fn font_metrics(&self, font: &Font) -> FontMetrics;
}
