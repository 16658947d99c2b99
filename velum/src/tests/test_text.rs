// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rich text editing as seen by layout.

use peniko::kurbo::Size;
use peniko::Color;
use velum_text::{AttachmentContent, AttributeKind, Binding, Font, RichText, ViewId};

use crate::{testenv, Container};

#[test]
fn attribute_round_trip_over_subrange() {
    let red = Color::from_rgb8(255, 0, 0);
    let blue = Color::from_rgb8(0, 0, 255);
    let mut text = RichText::new("0123456789");
    text.set_color(Some(blue), None).unwrap();
    text.set_color(Some(red), Some(3..7)).unwrap();
    for index in 3..7 {
        assert_eq!(text.color_at(index), Some(&red), "inside at {index}");
    }
    assert_eq!(text.color_at(2), Some(&blue));
    assert_eq!(text.color_at(7), Some(&blue));

    text.set_color(None, Some(3..7)).unwrap();
    assert_eq!(text.color_at(4), None);
    assert_eq!(text.color_at(7), Some(&blue));
}

#[test]
fn typing_next_to_an_attachment_does_not_copy_it() {
    let env = testenv!();
    let mut text = env.with_attachment(
        "a",
        AttachmentContent::View(ViewId(3)),
        Size::new(10.0, 10.0),
        "",
    );
    let end = text.len();
    text.push_str("xyz");
    text.insert_str(1, "pre").unwrap();

    assert_eq!(text.spans(AttributeKind::Attachment).count(), 1);
    assert!(!text.has_attribute(AttributeKind::Attachment, Some(0..4)));
    let tail = end + "pre".len()..text.len();
    assert!(!text.has_attribute(AttributeKind::Attachment, Some(tail.clone())));
    assert!(!text.has_attribute(AttributeKind::RunDelegate, Some(tail)));

    // Layout sees a single attachment.
    let layout = env.layout(text, &Container::with_width(500.0));
    assert_eq!(layout.attachments().len(), 1);
}

#[test]
fn insertion_never_splits_a_binding() {
    let mut text = RichText::new("say @alice hi");
    text.set_binding(Some(Binding::default()), Some(4..10)).unwrap();
    let inserted = text.insert_str(7, "X").unwrap();
    // Inserting strictly inside moves to the end of the binding.
    assert_eq!(inserted, 10..11);
    assert_eq!(text.as_str(), "say @aliceX hi");
    let spans: Vec<_> = text.spans(AttributeKind::Binding).map(|(r, _)| r).collect();
    assert_eq!(spans, [4..10]);
}

#[test]
fn continuous_attributes_extend_into_typed_text() {
    let mut text = RichText::new("ab");
    text.set_font(Some(Font::new("serif", 20.0)), None).unwrap();
    text.push_str("c");
    assert_eq!(text.font_at(2).map(|f| f.size), Some(20.0));
}

#[test]
fn invalid_ranges_are_rejected() {
    let mut text = RichText::new("h\u{e9}llo");
    assert!(text.set_kern(Some(1.0), Some(0..2)).is_err());
    assert!(text.set_kern(Some(1.0), Some(0..99)).is_err());
    assert!(text.set_kern(Some(1.0), Some(0..3)).is_ok());
}

#[test]
fn font_changes_line_metrics() {
    let env = testenv!();
    let mut text = RichText::new("small BIG");
    text.set_font(Some(Font::new("serif", 32.0)), Some(6..9)).unwrap();
    let layout = env.layout(text, &Container::with_width(500.0));
    let line = layout.line(0).unwrap();
    assert_eq!(line.metrics().ascent, 24.0);
    assert_eq!(line.metrics().descent, 8.0);
    assert_eq!(line.metrics().width, 6.0 * 8.0 + 3.0 * 16.0);
}
