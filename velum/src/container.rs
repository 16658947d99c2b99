// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout constraints.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use peniko::kurbo::{Insets, Point, Rect, Size};
use velum_text::RichText;

/// Where truncated content is removed from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TruncationType {
    /// Lines past the limit are dropped without a token.
    None,
    /// Remove from the start of the last visible line.
    Start,
    /// Remove from the middle of the last visible line.
    Middle,
    /// Remove from the end of the last visible line.
    #[default]
    End,
}

/// A region that text flows around.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Exclusion {
    /// An axis aligned rectangle.
    Rect(Rect),
    /// The ellipse inscribed in a rectangle.
    Ellipse(Rect),
}

impl Exclusion {
    /// The bounding rectangle.
    pub fn bounds(&self) -> Rect {
        match *self {
            Self::Rect(rect) | Self::Ellipse(rect) => rect,
        }
    }

    /// The interval of `axis_start..axis_end` this exclusion blocks within the band
    /// `band_start..band_end` on the cross axis.
    ///
    /// In horizontal form the line axis is x; in vertical form it is y.
    pub(crate) fn blocked_interval(
        &self,
        band_start: f64,
        band_end: f64,
        vertical: bool,
    ) -> Option<(f64, f64)> {
        let bounds = self.bounds();
        let (cross0, cross1, line0, line1) = if vertical {
            (bounds.x0, bounds.x1, bounds.y0, bounds.y1)
        } else {
            (bounds.y0, bounds.y1, bounds.x0, bounds.x1)
        };
        if band_end <= cross0 || band_start >= cross1 {
            return None;
        }
        match self {
            Self::Rect(_) => Some((line0, line1)),
            Self::Ellipse(_) => {
                let center_cross = (cross0 + cross1) * 0.5;
                let radius_cross = (cross1 - cross0) * 0.5;
                let center_line = (line0 + line1) * 0.5;
                let radius_line = (line1 - line0) * 0.5;
                if radius_cross <= 0.0 || radius_line <= 0.0 {
                    return None;
                }
                // The widest chord inside the band is the one closest to the center.
                let nearest = center_cross.clamp(band_start, band_end);
                let t = (nearest - center_cross) / radius_cross;
                let half = radius_line * (1.0 - t * t).max(0.0).sqrt();
                (half > 0.0).then_some((center_line - half, center_line + half))
            }
        }
    }
}

/// Baseline placement of one line, as seen by a [`LinePositionModifier`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LinePosition {
    /// Index of the line in the layout.
    pub index: usize,
    /// Row of the line.
    pub row: usize,
    /// Baseline origin in container coordinates.
    pub origin: Point,
    /// Ascent of the line.
    pub ascent: f64,
    /// Descent of the line.
    pub descent: f64,
}

/// A hook that moves lines after they have been shaped.
///
/// The layout calls [`modify_lines`](Self::modify_lines) once, after truncation, and then
/// recomputes all derived geometry from the modified positions.
pub trait LinePositionModifier: Send + Sync + fmt::Debug {
    /// Adjusts line origins in place.
    fn modify_lines(&self, lines: &mut [LinePosition], text: &RichText, container: &Container);

    /// The cross axis extent `line_count` lines take.
    fn height_for_line_count(&self, line_count: usize) -> f64;
}

/// Places every line on a fixed grid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SimpleLinePositionModifier {
    /// Distance between consecutive baselines.
    pub fixed_line_height: f64,
}

impl LinePositionModifier for SimpleLinePositionModifier {
    fn modify_lines(&self, lines: &mut [LinePosition], _text: &RichText, container: &Container) {
        let h = self.fixed_line_height;
        let content = container.content_rect();
        for line in lines {
            let offset = line.row as f64 * h + h * 0.9;
            if container.vertical_form {
                line.origin.x = content.x1 - offset;
            } else {
                line.origin.y = content.y0 + offset;
            }
        }
    }

    fn height_for_line_count(&self, line_count: usize) -> f64 {
        if line_count == 0 {
            return 0.0;
        }
        line_count as f64 * self.fixed_line_height
    }
}

/// The space text is laid out in.
///
/// A value type: a [`Layout`](crate::Layout) keeps its own copy, so changing a container after
/// layout never affects an existing layout.
#[derive(Clone, Debug)]
pub struct Container {
    /// Outer size.
    pub size: Size,
    /// Space kept clear inside `size`.
    pub insets: Insets,
    /// Maximum number of rows; 0 means unlimited.
    pub maximum_rows: usize,
    /// What happens to text that does not fit.
    pub truncation_type: TruncationType,
    /// Replaces truncated content; an ellipsis styled like the text when `None`.
    pub truncation_token: Option<Arc<RichText>>,
    /// Regions text flows around.
    pub exclusions: Vec<Exclusion>,
    /// Lay out top to bottom in columns running right to left.
    pub vertical_form: bool,
    /// Moves lines after shaping.
    pub line_position_modifier: Option<Arc<dyn LinePositionModifier>>,
}

impl Default for Container {
    fn default() -> Self {
        Self::new(Size::ZERO)
    }
}

impl Container {
    /// Maximum layout extent, used for unbounded dimensions.
    pub const MAX_EXTENT: f64 = 0x100000 as f64;

    /// Creates a container of `size` with default settings.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            insets: Insets::ZERO,
            maximum_rows: 0,
            truncation_type: TruncationType::End,
            truncation_token: None,
            exclusions: Vec::new(),
            vertical_form: false,
            line_position_modifier: None,
        }
    }

    /// A container with a fixed width and unbounded height.
    pub fn with_width(width: f64) -> Self {
        Self::new(Size::new(width, Self::MAX_EXTENT))
    }

    /// The rectangle text is placed in: `size` less `insets`.
    pub fn content_rect(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.size) - self.insets
    }

    /// Returns `true` when the content rectangle has no area.
    pub fn is_degenerate(&self) -> bool {
        let rect = self.content_rect();
        !(rect.width() > 0.0 && rect.height() > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_rect_subtracts_insets() {
        let mut container = Container::new(Size::new(100.0, 50.0));
        container.insets = Insets::new(5.0, 10.0, 5.0, 10.0);
        assert_eq!(container.content_rect(), Rect::new(5.0, 10.0, 95.0, 40.0));
        container.insets = Insets::uniform(30.0);
        assert!(container.is_degenerate());
    }

    #[test]
    fn clone_does_not_alias_exclusions() {
        let mut container = Container::new(Size::new(100.0, 100.0));
        container
            .exclusions
            .push(Exclusion::Rect(Rect::new(0.0, 0.0, 10.0, 10.0)));
        let copy = container.clone();
        container.exclusions.clear();
        assert_eq!(copy.exclusions.len(), 1);
    }

    #[test]
    fn ellipse_blocks_chord() {
        let ellipse = Exclusion::Ellipse(Rect::new(0.0, 0.0, 20.0, 20.0));
        let (a, b) = ellipse.blocked_interval(8.0, 12.0, false).unwrap();
        assert_eq!((a, b), (0.0, 20.0));
        let (a, b) = ellipse.blocked_interval(0.0, 2.0, false).unwrap();
        assert!(a > 0.0 && b < 20.0);
        assert!(ellipse.blocked_interval(25.0, 30.0, false).is_none());
    }

    #[test]
    fn simple_modifier_places_rows_on_grid() {
        let container = Container::new(Size::new(100.0, 100.0));
        let modifier = SimpleLinePositionModifier {
            fixed_line_height: 20.0,
        };
        let mut lines = [
            LinePosition {
                index: 0,
                row: 0,
                origin: Point::new(0.0, 12.0),
                ascent: 12.0,
                descent: 4.0,
            },
            LinePosition {
                index: 1,
                row: 1,
                origin: Point::new(0.0, 28.0),
                ascent: 12.0,
                descent: 4.0,
            },
        ];
        modifier.modify_lines(&mut lines, &RichText::new("a\nb"), &container);
        assert_eq!(lines[0].origin.y, 18.0);
        assert_eq!(lines[1].origin.y, 38.0);
        assert_eq!(modifier.height_for_line_count(2), 40.0);
    }
}
