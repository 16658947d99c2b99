// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::kurbo::{Point, Rect, Size};
use velum_text::{AttachmentContent, Highlight, ViewId};

use super::utils::{ADVANCE, LINE_HEIGHT};
use crate::{testenv, Container};

#[test]
fn points_map_to_nearest_character_edge() {
    let env = testenv!();
    let layout = env.layout_width("hello world", 400.0);
    assert_eq!(layout.text_index_at_point(Point::new(0.0, 8.0)), Some(0));
    assert_eq!(layout.text_index_at_point(Point::new(13.0, 8.0)), Some(2));
    assert_eq!(layout.text_index_at_point(Point::new(19.0, 8.0)), Some(2));
    // Far to the right snaps to the end of the last glyph.
    assert_eq!(layout.text_index_at_point(Point::new(900.0, 8.0)), Some(11));
}

#[test]
fn points_between_lines_pick_the_nearest_line() {
    let env = testenv!();
    let layout = env.layout_width("aaaa\nbbbb\ncccc", 400.0);
    assert_eq!(layout.line_index_for_point(Point::new(4.0, 20.0)), Some(1));
    assert_eq!(layout.line_index_for_point(Point::new(300.0, 20.0)), None);
    assert_eq!(
        layout.closest_line_index_for_point(Point::new(300.0, 20.0)),
        Some(1)
    );
    assert_eq!(
        layout.closest_line_index_for_point(Point::new(4.0, 500.0)),
        Some(2)
    );
    assert_eq!(
        layout.closest_line_index_for_point(Point::new(4.0, -50.0)),
        Some(0)
    );
}

#[test]
fn rect_for_range_spans_lines() {
    let env = testenv!();
    let layout = env.layout_width("aaaa\nbbbb", 400.0);
    assert_eq!(
        layout.rect_for_range(1..3),
        Some(Rect::new(ADVANCE, 0.0, 3.0 * ADVANCE, LINE_HEIGHT))
    );
    assert_eq!(
        layout.rect_for_range(2..7),
        Some(Rect::new(0.0, 0.0, 4.0 * ADVANCE, 2.0 * LINE_HEIGHT))
    );
    assert_eq!(layout.rect_for_range(4..5), None, "line breaks have no glyph");
}

#[test]
fn highlights_are_found_under_their_glyphs() {
    let env = testenv!();
    let text = env.with_highlight("tap here please", "here", Highlight::default());
    let layout = env.layout(text, &Container::with_width(400.0));
    assert!(layout.contains_highlight());
    let (range, _) = layout
        .highlight_at_point(Point::new(4.5 * ADVANCE, 8.0))
        .unwrap();
    assert_eq!(range, 4..8);
    assert!(layout
        .highlight_at_point(Point::new(1.5 * ADVANCE, 8.0))
        .is_none());
    assert!(layout
        .highlight_at_point(Point::new(4.5 * ADVANCE, 40.0))
        .is_none());
}

#[test]
fn layouts_without_highlights_skip_the_search() {
    let env = testenv!();
    let layout = env.layout_width("nothing to see", 400.0);
    assert!(!layout.contains_highlight());
    assert!(layout.highlight_at_point(Point::new(4.0, 8.0)).is_none());
}

#[test]
fn highlights_past_the_visible_range_do_not_count() {
    let env = testenv!();
    let mut container = Container::with_width(4.0 * ADVANCE);
    container.maximum_rows = 1;
    let text = env.with_highlight("abcd efgh", "efgh", Highlight::default());
    let layout = env.layout(text, &container);
    assert_eq!(layout.visible_range(), 0..5);
    assert!(!layout.contains_highlight());
}

#[test]
fn attachments_are_hit_by_their_box() {
    let env = testenv!();
    let text = env.with_attachment(
        "ab",
        AttachmentContent::View(ViewId(9)),
        Size::new(20.0, 20.0),
        "cd",
    );
    let layout = env.layout(text, &Container::with_width(400.0));
    let hit = layout
        .attachment_at_point(Point::new(2.0 * ADVANCE + 10.0, 10.0))
        .unwrap();
    assert_eq!(hit.attachment.content, AttachmentContent::View(ViewId(9)));
    assert!(layout.attachment_at_point(Point::new(4.0, 10.0)).is_none());
}
