// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style-run segmentation for [`RichText`].
//!
//! Splits the text into maximal contiguous ranges over which no attribute changes, and
//! exposes the attributes active over each one.

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

use peniko::kurbo::Affine;
use peniko::Color;

use crate::{
    Attachment, Attribute, AttributeKind, Border, Decoration, Font, Highlight, ParagraphStyle,
    RichText, RubyAnnotation, RunDelegate, Shadow,
};

/// The attributes active over one [`StyleRun`].
#[derive(Copy, Clone, Debug, Default)]
pub struct RunStyle<'a> {
    values: [Option<&'a Attribute>; AttributeKind::COUNT],
}

macro_rules! run_style_accessors {
    ($($kind:ident($ty:ty) => $getter:ident;)*) => {
        impl<'a> RunStyle<'a> {
            $(
                #[doc = concat!("The `", stringify!($kind), "` value of the run.")]
                pub fn $getter(&self) -> Option<&'a $ty> {
                    match self.values[AttributeKind::$kind.index()]? {
                        Attribute::$kind(value) => Some(value),
                        _ => None,
                    }
                }
            )*
        }
    };
}

run_style_accessors! {
    Font(Font) => font;
    ForegroundColor(Color) => color;
    BackgroundColor(Color) => background_color;
    Kern(f64) => kern;
    Shadow(Shadow) => shadow;
    InnerShadow(Shadow) => inner_shadow;
    Underline(Decoration) => underline;
    Strikethrough(Decoration) => strikethrough;
    Border(Border) => border;
    BlockBorder(Border) => block_border;
    Attachment(Attachment) => attachment;
    Highlight(Highlight) => highlight;
    GlyphTransform(Affine) => glyph_transform;
    RunDelegate(RunDelegate) => run_delegate;
    Ruby(RubyAnnotation) => ruby;
    Superscript(i8) => superscript;
    Paragraph(ParagraphStyle) => paragraph;
}

impl<'a> RunStyle<'a> {
    /// The value of `kind`, if any.
    pub fn get(&self, kind: AttributeKind) -> Option<&'a Attribute> {
        self.values[kind.index()]
    }
}

/// A maximal range with uniform attributes.
#[derive(Clone, Debug)]
pub struct StyleRun<'a> {
    /// Byte range of the run.
    pub range: Range<usize>,
    /// Attributes active over the whole run.
    pub style: RunStyle<'a>,
}

/// Iterator over the [`StyleRun`]s of a range.
#[derive(Clone, Debug)]
pub struct StyleRuns<'a> {
    text: &'a RichText,
    boundaries: Vec<usize>,
    next: usize,
    /// Index of the first span of each kind that may still be active.
    cursors: [usize; AttributeKind::COUNT],
}

impl<'a> Iterator for StyleRuns<'a> {
    type Item = StyleRun<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = *self.boundaries.get(self.next)?;
        let end = *self.boundaries.get(self.next + 1)?;
        self.next += 1;
        let mut style = RunStyle::default();
        for kind in AttributeKind::ALL {
            let spans = self.text.span_slice(kind);
            let cursor = &mut self.cursors[kind.index()];
            while spans.get(*cursor).is_some_and(|(r, _)| r.end <= start) {
                *cursor += 1;
            }
            if let Some((r, attr)) = spans.get(*cursor) {
                if r.start <= start {
                    style.values[kind.index()] = Some(attr);
                }
            }
        }
        Some(StyleRun {
            range: start..end,
            style,
        })
    }
}

impl RichText {
    /// Segments `range` (or the whole text) into runs of uniform style.
    ///
    /// ```
    /// use velum_text::RichText;
    ///
    /// let mut text = RichText::new("Hello world");
    /// text.set_kern(Some(1.0), Some(0..5)).unwrap();
    /// let runs: Vec<_> = text.style_runs(None).map(|run| run.range).collect();
    /// assert_eq!(runs, [0..5, 5..11]);
    /// ```
    pub fn style_runs(&self, range: Option<Range<usize>>) -> StyleRuns<'_> {
        let range = range.unwrap_or(0..self.len());
        let range = range.start.min(self.len())..range.end.min(self.len());
        let mut boundaries = Vec::new();
        if !range.is_empty() {
            boundaries.push(range.start);
            boundaries.push(range.end);
            for kind in AttributeKind::ALL {
                for (span, _) in self.span_slice(kind) {
                    for edge in [span.start, span.end] {
                        if range.start < edge && edge < range.end {
                            boundaries.push(edge);
                        }
                    }
                }
            }
            boundaries.sort_unstable();
            boundaries.dedup();
        }
        StyleRuns {
            text: self,
            boundaries,
            next: 0,
            cursors: [0; AttributeKind::COUNT],
        }
    }

    /// The attributes active at byte `index`.
    pub fn style_at(&self, index: usize) -> RunStyle<'_> {
        let mut style = RunStyle::default();
        for kind in AttributeKind::ALL {
            style.values[kind.index()] = self.attribute_at(kind, index);
        }
        style
    }

    /// A text whose whole extent carries the attributes of `style` accepted by `keep`.
    ///
    /// ```
    /// use velum_text::RichText;
    ///
    /// let mut text = RichText::new("abc");
    /// text.set_kern(Some(1.0), None).unwrap();
    /// let copy = RichText::styled("\u{2026}", &text.style_at(2), |_| true);
    /// assert_eq!(copy.kern_at(0), Some(&1.0));
    /// ```
    pub fn styled(
        string: impl Into<String>,
        style: &RunStyle<'_>,
        keep: impl Fn(AttributeKind) -> bool,
    ) -> Self {
        let mut text = Self::new(string);
        let range = 0..text.len();
        for kind in AttributeKind::ALL {
            if let Some(value) = style.get(kind).filter(|_| keep(kind)) {
                text.spans_for_kind_mut(kind).set(range.clone(), value.clone());
            }
        }
        text
    }

    pub(crate) fn span_slice(&self, kind: AttributeKind) -> &[(Range<usize>, Attribute)] {
        self.spans_for_kind(kind).as_slice()
    }
}
