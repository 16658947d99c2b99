// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Horizontal alignment of lines within a paragraph.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextAlignment {
    /// Left for left-to-right paragraphs, right for right-to-left.
    #[default]
    Natural,
    /// Align to the left edge.
    Left,
    /// Center within the line's available space.
    Center,
    /// Align to the right edge.
    Right,
    /// Spread spaces so both edges align, except on the last line.
    Justified,
}

/// Base writing direction of a paragraph.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BaseDirection {
    /// Determined by the text.
    #[default]
    Natural,
    /// Left to right.
    LeftToRight,
    /// Right to left.
    RightToLeft,
}

/// Paragraph level properties.
///
/// Setters on [`RichText`](crate::RichText) change one field at a time and keep the others, so
/// this type is merged, never replaced wholesale, when a single property changes.
#[derive(Clone, Debug, PartialEq)]
pub struct ParagraphStyle {
    /// Line alignment.
    pub alignment: TextAlignment,
    /// Extra space between lines of the paragraph.
    pub line_spacing: f64,
    /// Extra space after the paragraph.
    pub paragraph_spacing: f64,
    /// Indent of the first line.
    pub first_line_head_indent: f64,
    /// Indent of the other lines.
    pub head_indent: f64,
    /// Distance kept clear at the trailing edge.
    pub tail_indent: f64,
    /// Lower bound of a line's height; ignored when zero.
    pub minimum_line_height: f64,
    /// Upper bound of a line's height; ignored when zero.
    pub maximum_line_height: f64,
    /// Base writing direction.
    pub base_direction: BaseDirection,
}

impl Default for ParagraphStyle {
    fn default() -> Self {
        Self {
            alignment: TextAlignment::Natural,
            line_spacing: 0.0,
            paragraph_spacing: 0.0,
            first_line_head_indent: 0.0,
            head_indent: 0.0,
            tail_indent: 0.0,
            minimum_line_height: 0.0,
            maximum_line_height: 0.0,
            base_direction: BaseDirection::Natural,
        }
    }
}

impl ParagraphStyle {
    /// Returns `true` when lines should start at the right edge.
    pub fn is_rtl(&self) -> bool {
        self.base_direction == BaseDirection::RightToLeft
    }

    /// Resolves [`TextAlignment::Natural`] against the base direction.
    pub fn resolved_alignment(&self) -> TextAlignment {
        match (self.alignment, self.is_rtl()) {
            (TextAlignment::Natural, true) => TextAlignment::Right,
            (TextAlignment::Natural, false) => TextAlignment::Left,
            (alignment, _) => alignment,
        }
    }

    /// Clamps a natural line height to the configured bounds.
    pub fn clamp_line_height(&self, height: f64) -> f64 {
        let mut height = height;
        if self.minimum_line_height > 0.0 {
            height = height.max(self.minimum_line_height);
        }
        if self.maximum_line_height > 0.0 {
            height = height.min(self.maximum_line_height);
        }
        height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_alignment_follows_direction() {
        let mut style = ParagraphStyle::default();
        assert_eq!(style.resolved_alignment(), TextAlignment::Left);
        style.base_direction = BaseDirection::RightToLeft;
        assert_eq!(style.resolved_alignment(), TextAlignment::Right);
        style.alignment = TextAlignment::Center;
        assert_eq!(style.resolved_alignment(), TextAlignment::Center);
    }

    #[test]
    fn line_height_bounds() {
        let style = ParagraphStyle {
            minimum_line_height: 20.0,
            maximum_line_height: 30.0,
            ..ParagraphStyle::default()
        };
        assert_eq!(style.clamp_line_height(16.0), 20.0);
        assert_eq!(style.clamp_line_height(40.0), 30.0);
        assert_eq!(ParagraphStyle::default().clamp_line_height(16.0), 16.0);
    }
}
