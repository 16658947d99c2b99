// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed setters and getters over [`RichText`].

use alloc::vec::Vec;
use core::ops::Range;

use peniko::kurbo::Affine;
use peniko::Color;

use crate::{
    Attachment, Attribute, AttributeKind, BackedString, BaseDirection, Binding, Border,
    Decoration, Error, Font, Highlight, ParagraphStyle, RichText, RubyAnnotation, RunDelegate,
    Shadow, TextAlignment, TextRange,
};

macro_rules! typed_attributes {
    ($($kind:ident($ty:ty) => $setter:ident, $getter:ident, $name:literal;)*) => {
        impl RichText {
            $(
                #[doc = concat!("Sets the ", $name, " over `range`, or clears it when `value` is `None`.")]
                ///
                /// A `range` of `None` covers the whole text.
                pub fn $setter(
                    &mut self,
                    value: Option<$ty>,
                    range: Option<Range<usize>>,
                ) -> Result<(), Error> {
                    self.set_attribute(AttributeKind::$kind, value.map(Attribute::$kind), range)
                }

                #[doc = concat!("The ", $name, " at byte `index`.")]
                pub fn $getter(&self, index: usize) -> Option<&$ty> {
                    match self.attribute_at(AttributeKind::$kind, index)? {
                        Attribute::$kind(value) => Some(value),
                        _ => None,
                    }
                }
            )*
        }
    };
}

typed_attributes! {
    Font(Font) => set_font, font_at, "font";
    ForegroundColor(Color) => set_color, color_at, "foreground color";
    BackgroundColor(Color) => set_background_color, background_color_at, "background color";
    Kern(f64) => set_kern, kern_at, "kerning";
    Shadow(Shadow) => set_shadow, shadow_at, "shadow";
    InnerShadow(Shadow) => set_inner_shadow, inner_shadow_at, "inner shadow";
    Underline(Decoration) => set_underline, underline_at, "underline";
    Strikethrough(Decoration) => set_strikethrough, strikethrough_at, "strikethrough";
    Border(Border) => set_border, border_at, "run border";
    BlockBorder(Border) => set_block_border, block_border_at, "block border";
    Attachment(Attachment) => set_attachment, attachment_at, "attachment";
    Highlight(Highlight) => set_highlight, highlight_at, "highlight";
    GlyphTransform(Affine) => set_glyph_transform, glyph_transform_at, "glyph transform";
    Binding(Binding) => set_binding, binding_at, "binding";
    BackedString(BackedString) => set_backed_string, backed_string_at, "backed string";
    RunDelegate(RunDelegate) => set_run_delegate, run_delegate_at, "run delegate";
    Ruby(RubyAnnotation) => set_ruby, ruby_at, "ruby annotation";
    Superscript(i8) => set_superscript, superscript_at, "superscript level";
    Paragraph(ParagraphStyle) => set_paragraph_style, paragraph_style_at, "paragraph style";
}

macro_rules! paragraph_fields {
    ($($field:ident: $ty:ty => $setter:ident;)*) => {
        impl RichText {
            $(
                #[doc = concat!("Sets `", stringify!($field), "` on every paragraph style over `range`.")]
                ///
                /// Other paragraph properties are kept. Bytes without a paragraph style get the
                /// default style with this one property changed.
                pub fn $setter(
                    &mut self,
                    value: $ty,
                    range: Option<Range<usize>>,
                ) -> Result<(), Error> {
                    self.update_paragraph(range, |style| style.$field = value)
                }
            )*
        }
    };
}

paragraph_fields! {
    alignment: TextAlignment => set_alignment;
    line_spacing: f64 => set_line_spacing;
    paragraph_spacing: f64 => set_paragraph_spacing;
    first_line_head_indent: f64 => set_first_line_head_indent;
    head_indent: f64 => set_head_indent;
    tail_indent: f64 => set_tail_indent;
    minimum_line_height: f64 => set_minimum_line_height;
    maximum_line_height: f64 => set_maximum_line_height;
    base_direction: BaseDirection => set_base_direction;
}

impl RichText {
    fn update_paragraph(
        &mut self,
        range: Option<Range<usize>>,
        update: impl Fn(&mut ParagraphStyle),
    ) -> Result<(), Error> {
        let range = TextRange::resolve(self.as_str(), range)?.as_range();
        let mut pieces: Vec<(Range<usize>, ParagraphStyle)> = Vec::new();
        let mut cursor = range.start;
        for (span, attr) in self.spans_in(AttributeKind::Paragraph, range.clone()) {
            let Attribute::Paragraph(existing) = attr else {
                continue;
            };
            let start = span.start.max(range.start);
            if cursor < start {
                pieces.push((cursor..start, ParagraphStyle::default()));
            }
            let end = span.end.min(range.end);
            pieces.push((start..end, existing.clone()));
            cursor = end;
        }
        if cursor < range.end {
            pieces.push((cursor..range.end, ParagraphStyle::default()));
        }
        for (piece, mut style) in pieces {
            update(&mut style);
            self.set_paragraph_style(Some(style), Some(piece))?;
        }
        Ok(())
    }
}
