// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::kurbo::{Affine, Point, Size};
use velum_text::RichText;

use crate::{
    draw_layout, testenv, Container, DrawRequest, GlyphDrawMode, LayoutContext, RotateRange,
    VerticalGlyphTable,
};

fn vertical(size: Size) -> Container {
    let mut container = Container::new(size);
    container.vertical_form = true;
    container
}

#[test]
fn columns_start_at_the_right_edge() {
    let env = testenv!();
    let layout = env.layout(
        RichText::new("\u{6f22}\u{5b57}a\u{3002}"),
        &vertical(Size::new(100.0, 100.0)),
    );
    assert!(layout.is_vertical());
    assert_eq!(layout.line_count(), 1);
    let line = layout.line(0).unwrap();
    assert_eq!(line.origin(), Point::new(88.0, 0.0));
    let bounds = line.bounding_box();
    assert_eq!((bounds.x0, bounds.x1), (84.0, 100.0));
    assert_eq!((bounds.y0, bounds.y1), (0.0, 56.0));
    // Width is measured from the right edge of the container.
    assert_eq!(layout.text_bounding_size(), Size::new(16.0, 56.0));
}

#[test]
fn rotation_follows_the_glyph_table() {
    let env = testenv!();
    let layout = env.layout(
        RichText::new("\u{6f22}\u{5b57}a\u{3002}"),
        &vertical(Size::new(100.0, 100.0)),
    );
    let line = layout.line(0).unwrap();
    let ranges = line.vertical_rotate_ranges();
    assert_eq!(ranges.len(), line.runs().len());
    assert_eq!(
        ranges[0].as_slice(),
        [
            RotateRange {
                glyphs: 0..2,
                mode: GlyphDrawMode::VerticalRotate,
            },
            RotateRange {
                glyphs: 2..3,
                mode: GlyphDrawMode::Horizontal,
            },
            RotateRange {
                glyphs: 3..4,
                mode: GlyphDrawMode::VerticalRotateMove,
            },
        ]
    );

    let list = draw_layout(&layout, &DrawRequest::new(Size::new(100.0, 100.0))).unwrap();
    let modes: Vec<_> = list
        .glyph_runs()
        .flat_map(|run| run.glyphs.iter().map(|g| g.mode))
        .collect();
    assert_eq!(
        modes,
        [
            GlyphDrawMode::VerticalRotate,
            GlyphDrawMode::VerticalRotate,
            GlyphDrawMode::Horizontal,
            GlyphDrawMode::VerticalRotateMove,
        ]
    );
}

#[test]
fn latin_columns_have_no_rotation() {
    let env = testenv!();
    let layout = env.layout(RichText::new("abc"), &vertical(Size::new(100.0, 100.0)));
    let line = layout.line(0).unwrap();
    assert!(line.vertical_rotate_ranges().iter().all(|r| r.is_empty()));
}

#[test]
fn glyph_transform_disables_rotation() {
    let env = testenv!();
    let mut text = RichText::new("\u{6f22}\u{5b57}");
    text.set_glyph_transform(Some(Affine::skew(0.2, 0.0)), None)
        .unwrap();
    let layout = env.layout(text, &vertical(Size::new(100.0, 100.0)));
    assert!(layout.line(0).unwrap().vertical_rotate_ranges()[0].is_empty());
}

#[test]
fn custom_table_changes_classification() {
    let table = VerticalGlyphTable {
        rotate: vec![u32::from('a')..=u32::from('z')],
        rotate_move: vec![],
    };
    let cx = LayoutContext::default().with_vertical_table(table);
    let layout = cx
        .layout(RichText::new("ab"), &vertical(Size::new(100.0, 100.0)))
        .unwrap();
    let ranges = &layout.line(0).unwrap().vertical_rotate_ranges()[0];
    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0].mode, GlyphDrawMode::VerticalRotate);
}

#[test]
fn columns_wrap_leftwards() {
    let env = testenv!();
    // Five wide characters need 80 along the column; only 48 are available.
    let layout = env.layout(
        RichText::new("\u{4e00}\u{4e8c}\u{4e09}\u{56db}\u{4e94}"),
        &vertical(Size::new(100.0, 48.0)),
    );
    assert_eq!(layout.line_count(), 2);
    let first = layout.line(0).unwrap();
    let second = layout.line(1).unwrap();
    assert_eq!(first.origin().x - second.origin().x, 16.0);
    assert_eq!(layout.text_bounding_size().width, 32.0);
}

#[test]
fn hit_testing_runs_along_the_column() {
    let env = testenv!();
    let layout = env.layout(
        RichText::new("\u{4e00}\u{4e8c}\u{4e09}"),
        &vertical(Size::new(100.0, 100.0)),
    );
    // The second character occupies y 16..32 of the column.
    assert_eq!(layout.text_index_at_point(Point::new(92.0, 18.0)), Some(3));
    assert_eq!(layout.text_index_at_point(Point::new(92.0, 30.0)), Some(6));
}
