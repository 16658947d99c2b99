// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Explicit coordinate transforms.
//!
//! Geometry moves between spaces (layout, view, surface) only through these functions; nothing
//! walks a view hierarchy to find out where it is.

use peniko::kurbo::{Affine, Point, Rect, Size, Vec2};
use velum_text::ContentMode;

/// Direction of the y axis of a coordinate space.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// y grows downwards.
    #[default]
    YDown,
    /// y grows upwards.
    YUp,
}

/// Describes one coordinate space relative to a shared reference space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CoordinateSpace {
    /// Position of this space's origin in the reference space.
    pub origin: Point,
    /// Units of the reference space per unit of this space.
    pub scale: f64,
    /// Direction of the y axis.
    pub orientation: Orientation,
    /// Height of the space, needed to flip [`Orientation::YUp`] spaces.
    pub extent: f64,
}

impl Default for CoordinateSpace {
    fn default() -> Self {
        Self {
            origin: Point::ZERO,
            scale: 1.0,
            orientation: Orientation::YDown,
            extent: 0.0,
        }
    }
}

impl CoordinateSpace {
    /// A y-down space at `origin` with unit scale.
    pub fn at(origin: Point) -> Self {
        Self {
            origin,
            ..Self::default()
        }
    }

    /// The transform from this space to the reference space.
    pub fn to_reference(&self) -> Affine {
        let flip = match self.orientation {
            Orientation::YDown => Affine::IDENTITY,
            Orientation::YUp => Affine::new([1.0, 0.0, 0.0, -1.0, 0.0, self.extent]),
        };
        Affine::translate(self.origin.to_vec2()) * Affine::scale(self.scale) * flip
    }
}

/// Converts a point from `from` to `to`.
pub fn convert_point(point: Point, from: &CoordinateSpace, to: &CoordinateSpace) -> Point {
    to.to_reference().inverse() * (from.to_reference() * point)
}

/// Converts a rectangle from `from` to `to`, returning the bounding box of the result.
pub fn convert_rect(rect: Rect, from: &CoordinateSpace, to: &CoordinateSpace) -> Rect {
    let transform = to.to_reference().inverse() * from.to_reference();
    transform.transform_rect_bbox(rect)
}

/// Fits content of `content_size` into `rect` according to `mode`.
pub fn fit_rect(rect: Rect, content_size: Size, mode: ContentMode) -> Rect {
    if rect.is_zero_area() || content_size.is_zero_area() {
        return rect;
    }
    let center = rect.center();
    let sized = |size: Size| Rect::from_center_size(center, size);
    match mode {
        ContentMode::ScaleToFill => rect,
        ContentMode::ScaleAspectFit | ContentMode::ScaleAspectFill => {
            let sx = rect.width() / content_size.width;
            let sy = rect.height() / content_size.height;
            let scale = if mode == ContentMode::ScaleAspectFit {
                sx.min(sy)
            } else {
                sx.max(sy)
            };
            sized(content_size * scale)
        }
        ContentMode::Center => sized(content_size),
        _ => {
            let (w, h) = (content_size.width, content_size.height);
            let x = match mode {
                ContentMode::Left | ContentMode::TopLeft | ContentMode::BottomLeft => rect.x0,
                ContentMode::Right | ContentMode::TopRight | ContentMode::BottomRight => {
                    rect.x1 - w
                }
                _ => center.x - w * 0.5,
            };
            let y = match mode {
                ContentMode::Top | ContentMode::TopLeft | ContentMode::TopRight => rect.y0,
                ContentMode::Bottom | ContentMode::BottomLeft | ContentMode::BottomRight => {
                    rect.y1 - h
                }
                _ => center.y - h * 0.5,
            };
            Rect::from_origin_size((x, y), content_size)
        }
    }
}

/// Offset that places content of `content` size inside `bounds` with the given alignment.
pub(crate) fn alignment_offset(
    bounds: Size,
    content: Size,
    alignment: crate::VerticalAlignment,
    vertical_form: bool,
) -> Vec2 {
    use crate::VerticalAlignment;
    let slack = if vertical_form {
        bounds.width - content.width
    } else {
        bounds.height - content.height
    };
    if slack <= 0.0 {
        return Vec2::ZERO;
    }
    let amount = match alignment {
        VerticalAlignment::Top => 0.0,
        VerticalAlignment::Center => slack * 0.5,
        VerticalAlignment::Bottom => slack,
    };
    if vertical_form {
        // Vertical text hugs the right edge, so alignment pushes it left.
        Vec2::new(-amount, 0.0)
    } else {
        Vec2::new(0.0, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VerticalAlignment;

    #[test]
    fn convert_between_offset_spaces() {
        let view = CoordinateSpace::at(Point::new(10.0, 20.0));
        let window = CoordinateSpace::default();
        let p = convert_point(Point::new(1.0, 2.0), &view, &window);
        assert_eq!(p, Point::new(11.0, 22.0));
        let back = convert_point(p, &window, &view);
        assert_eq!(back, Point::new(1.0, 2.0));
    }

    #[test]
    fn convert_into_flipped_space() {
        let surface = CoordinateSpace {
            orientation: Orientation::YUp,
            extent: 100.0,
            ..CoordinateSpace::default()
        };
        let view = CoordinateSpace::default();
        let p = convert_point(Point::new(5.0, 10.0), &view, &surface);
        assert_eq!(p, Point::new(5.0, 90.0));
        let r = convert_rect(Rect::new(0.0, 0.0, 10.0, 10.0), &view, &surface);
        assert_eq!(r, Rect::new(0.0, 90.0, 10.0, 100.0));
    }

    #[test]
    fn aspect_fit_keeps_ratio() {
        let r = fit_rect(
            Rect::new(0.0, 0.0, 100.0, 50.0),
            Size::new(20.0, 20.0),
            ContentMode::ScaleAspectFit,
        );
        assert_eq!(r, Rect::new(25.0, 0.0, 75.0, 50.0));
        let r = fit_rect(
            Rect::new(0.0, 0.0, 100.0, 50.0),
            Size::new(20.0, 10.0),
            ContentMode::BottomRight,
        );
        assert_eq!(r, Rect::new(80.0, 40.0, 100.0, 50.0));
    }

    #[test]
    fn vertical_alignment_offsets() {
        let bounds = Size::new(100.0, 100.0);
        let content = Size::new(40.0, 40.0);
        assert_eq!(
            alignment_offset(bounds, content, VerticalAlignment::Center, false),
            Vec2::new(0.0, 30.0)
        );
        assert_eq!(
            alignment_offset(bounds, content, VerticalAlignment::Bottom, true),
            Vec2::new(-60.0, 0.0)
        );
        assert_eq!(
            alignment_offset(Size::new(10.0, 10.0), content, VerticalAlignment::Bottom, false),
            Vec2::ZERO
        );
    }
}
