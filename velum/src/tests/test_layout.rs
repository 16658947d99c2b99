// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use peniko::kurbo::{Insets, Size};
use velum_text::{AttachmentContent, ImageHandle, RichText, TextAlignment, ATTACHMENT_CHARACTER};

use super::utils::{assert_rect_within, assert_same_geometry, line_string, ADVANCE, LINE_HEIGHT};
use crate::{testenv, Container, SimpleLinePositionModifier};

const SIXTY: &str = "abcdefghijabcdefghijabcdefghijabcdefghijabcdefghijabcdefghij";

#[test]
fn empty_text_has_no_layout() {
    let env = testenv!();
    assert!(env
        .cx()
        .layout(RichText::new(""), &Container::with_width(100.0))
        .is_none());
}

#[test]
fn degenerate_container_has_no_lines() {
    let env = testenv!();
    let mut container = Container::new(Size::new(20.0, 20.0));
    container.insets = Insets::uniform(10.0);
    let layout = env.layout(RichText::new("hello"), &container);
    assert_eq!(layout.line_count(), 0);
    assert_eq!(layout.text_bounding_size(), Size::ZERO);
    assert!(layout.visible_range().is_empty());
}

#[test]
fn layout_is_idempotent() {
    let env = testenv!();
    let mut text = RichText::new("The quick brown fox jumps over the lazy dog.\nAgain!");
    text.set_alignment(TextAlignment::Center, Some(0..10)).unwrap();
    let container = Container::new(Size::new(120.0, 400.0));
    let first = env.layout(text.clone(), &container);
    let second = env.layout(text, &container);
    assert_same_geometry(&first, &second, "relayout");
}

#[test]
fn single_line_with_attachment() {
    let env = testenv!();
    let text = env.with_attachment(
        "AB",
        AttachmentContent::Image(ImageHandle(1)),
        Size::new(20.0, 20.0),
        "CD",
    );
    let layout = env.layout(text, &Container::new(Size::new(10_000.0, 1_000.0)));
    assert_eq!(layout.line_count(), 1);

    let records = layout.attachments();
    assert_eq!(records.len(), 1);
    let start = "AB".len();
    assert_eq!(records[0].range, start..start + ATTACHMENT_CHARACTER.len_utf8());
    assert_eq!(records[0].line, 0);
    assert!(layout.contains_attachment(&AttachmentContent::Image(ImageHandle(1))));
}

#[test]
fn attachment_lies_within_its_line() {
    let env = testenv!();
    let text = env.with_attachment(
        "AB",
        AttachmentContent::Image(ImageHandle(1)),
        Size::new(20.0, 30.0),
        "CD",
    );
    let layout = env.layout(text, &Container::with_width(400.0));
    let line = layout.line(0).unwrap();
    let placed = line.attachments();
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].rect.width(), 20.0);
    assert_eq!(placed[0].rect.height(), 30.0);
    assert_eq!(placed[0].rect.x0, 2.0 * ADVANCE);
    assert_rect_within(placed[0].rect, line.bounding_box(), "attachment");
}

#[test]
fn sixty_characters_wrap_into_three_lines() {
    let env = testenv!();
    let layout = env.layout_width(SIXTY, 20.0 * ADVANCE);
    assert_eq!(layout.line_count(), 3);
    assert!(layout.truncated_line().is_none());
    assert!(layout.truncation_token().is_none());
    assert_eq!(layout.text_bounding_size().height, 3.0 * LINE_HEIGHT);
    assert_eq!(layout.visible_range(), 0..60);
    for line in layout.lines() {
        assert_eq!(line.text_range().len(), 20, "line {}", line.index());
        assert_eq!(line.row(), line.index());
    }
}

#[test]
fn two_rows_end_with_the_token() {
    let env = testenv!();
    let mut container = Container::with_width(20.0 * ADVANCE);
    container.maximum_rows = 2;
    let layout = env.layout(RichText::new(SIXTY), &container);
    assert_eq!(layout.line_count(), 2);
    assert_eq!(layout.text_bounding_size().height, 2.0 * LINE_HEIGHT);

    let last = layout.truncated_line().unwrap();
    assert_eq!(last.index(), 1);
    let shown = line_string(last);
    assert!(shown.ends_with('\u{2026}'), "{shown:?}");
    assert_eq!(shown.chars().count(), 20);
    // The line still owns its source range; the elided part is recorded separately.
    assert_eq!(last.text_range(), 20..40);
    assert_eq!(last.truncation().unwrap().elided, 39..60);
}

#[test]
fn more_rows_never_shrink_the_layout() {
    let env = testenv!();
    let width = 20.0 * ADVANCE;
    let full = env.layout_width(SIXTY, width);
    let mut previous = 0.0;
    for rows in 1..=4 {
        let mut container = Container::with_width(width);
        container.maximum_rows = rows;
        let layout = env.layout(RichText::new(SIXTY), &container);
        let height = layout.text_bounding_size().height;
        assert!(height >= previous, "{rows} rows: {height} < {previous}");
        previous = height;
        // Lines before the last visible row are laid out as without a limit.
        for line in layout.lines().take(rows.saturating_sub(1)) {
            let reference = full.line(line.index()).unwrap();
            assert_eq!(line.text_range(), reference.text_range());
            assert_eq!(line_string(line), line_string(reference));
        }
    }
}

#[test]
fn hard_breaks_start_new_lines() {
    let env = testenv!();
    let layout = env.layout_width("one\ntwo\n\nfour", 400.0);
    assert_eq!(layout.line_count(), 4);
    let empty = layout.line(2).unwrap();
    assert_eq!(empty.glyph_count(), 0);
    // Empty lines still take a line of height.
    assert_eq!(empty.bounding_box().height(), LINE_HEIGHT);
    assert_eq!(layout.text_bounding_size().height, 4.0 * LINE_HEIGHT);
}

#[test]
fn insets_offset_the_text() {
    let env = testenv!();
    let mut container = Container::with_width(200.0);
    container.insets = Insets::new(10.0, 5.0, 10.0, 5.0);
    let layout = env.layout(RichText::new("abc"), &container);
    let line = layout.line(0).unwrap();
    assert_eq!(line.bounding_box().x0, 10.0);
    assert_eq!(line.bounding_box().y0, 5.0);
    assert_eq!(
        layout.text_bounding_size(),
        Size::new(10.0 + 3.0 * ADVANCE + 10.0, 5.0 + LINE_HEIGHT + 5.0)
    );
}

#[test]
fn position_modifier_places_lines_on_a_grid() {
    let env = testenv!();
    let mut container = Container::with_width(20.0 * ADVANCE);
    container.line_position_modifier = Some(Arc::new(SimpleLinePositionModifier {
        fixed_line_height: 30.0,
    }));
    let layout = env.layout(RichText::new(SIXTY), &container);
    let baselines: Vec<f64> = layout.lines().map(|line| line.origin().y).collect();
    assert_eq!(baselines, [27.0, 57.0, 87.0]);
    // The grid is 90 high; the last descent hangs below it.
    assert_eq!(layout.text_bounding_size().height, 87.0 + 4.0);

    // A grid taller than the text wins.
    container.line_position_modifier = Some(Arc::new(SimpleLinePositionModifier {
        fixed_line_height: 100.0,
    }));
    let single = env.layout(RichText::new("ab"), &container);
    assert_eq!(single.line(0).unwrap().origin().y, 90.0);
    assert_eq!(single.text_bounding_size().height, 100.0);
}

#[test]
fn layout_keeps_its_own_container() {
    let env = testenv!();
    let mut container = Container::with_width(100.0);
    let layout = env.layout(RichText::new("abc"), &container);
    container.size.width = 5.0;
    assert_eq!(layout.container().size.width, 100.0);
}

#[test]
fn draw_needs_follow_attributes() {
    let env = testenv!();
    let mut text = RichText::new("plain underlined");
    let plain = env.layout(text.clone(), &Container::with_width(400.0)).needs();
    assert!(plain.text);
    assert!(!plain.underline && !plain.background && !plain.attachment);

    text.set_underline(Some(velum_text::Decoration::single(None)), Some(6..16))
        .unwrap();
    let needs = env.layout(text, &Container::with_width(400.0)).needs();
    assert!(needs.underline);
    assert!(!needs.strikethrough);
}
