// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use peniko::kurbo::{Affine, Size, Vec2};
use peniko::Color;
use velum_text::{
    AttachmentContent, Decoration, ImageHandle, RichText, Shadow, ViewId,
};

use super::utils::paint_items;
use crate::debug::DebugOptions;
use crate::{
    draw_layout, testenv, CancelToken, Cancelled, Container, DebugItem, DecorationKind,
    DisplayItem, DrawRequest, GlyphPass, VerticalAlignment,
};

fn label(item: &DisplayItem) -> &'static str {
    match item {
        DisplayItem::Fill { .. } => "fill",
        DisplayItem::Border { .. } => "border",
        DisplayItem::GlyphRun(run) => match run.pass {
            GlyphPass::Fill => "glyphs",
            GlyphPass::Shadow { .. } => "shadow",
            GlyphPass::InnerShadow { .. } => "inner shadow",
        },
        DisplayItem::Decoration(d) => match d.kind {
            DecorationKind::Underline => "underline",
            DecorationKind::Strikethrough => "strikethrough",
        },
        DisplayItem::Image { .. } => "image",
        DisplayItem::Debug(_) => "debug",
    }
}

#[test]
fn passes_follow_paint_order() {
    let env = testenv!();
    let mut text = RichText::new("shadowed");
    let grey = Color::from_rgb8(128, 128, 128);
    text.set_underline(Some(Decoration::single(None)), None)
        .unwrap();
    text.set_inner_shadow(Some(Shadow::new(grey, Vec2::new(0.0, 1.0), 0.0)), None)
        .unwrap();
    text.set_shadow(Some(Shadow::new(grey, Vec2::new(1.0, 1.0), 2.0)), None)
        .unwrap();
    text.set_background_color(Some(Color::WHITE), None).unwrap();
    let layout = env.layout(text, &Container::with_width(200.0));

    let list = draw_layout(&layout, &DrawRequest::new(Size::new(200.0, 100.0))).unwrap();
    let labels: Vec<_> = paint_items(&list).into_iter().map(label).collect();
    assert_eq!(
        labels,
        ["fill", "shadow", "glyphs", "underline", "inner shadow"]
    );
}

#[test]
fn shadow_chains_paint_every_level() {
    let env = testenv!();
    let grey = Color::from_rgb8(128, 128, 128);
    let mut shadow = Shadow::new(grey, Vec2::new(1.0, 1.0), 0.0);
    shadow.sub_shadow = Some(Box::new(Shadow::new(grey, Vec2::new(3.0, 3.0), 1.0)));
    let mut text = RichText::new("deep");
    text.set_shadow(Some(shadow), None).unwrap();
    let layout = env.layout(text, &Container::with_width(200.0));

    let list = draw_layout(&layout, &DrawRequest::new(Size::new(200.0, 100.0))).unwrap();
    let offsets: Vec<_> = list
        .glyph_runs()
        .filter_map(|run| match run.pass {
            GlyphPass::Shadow { offset, .. } => Some(offset),
            _ => None,
        })
        .collect();
    assert_eq!(offsets, [Vec2::new(1.0, 1.0), Vec2::new(3.0, 3.0)]);
}

#[test]
fn cancelled_requests_produce_nothing() {
    let env = testenv!();
    let layout = env.layout_width("never drawn", 200.0);
    let counter = Arc::new(AtomicU64::new(2));
    let request = DrawRequest {
        cancel: CancelToken::new(counter, 1),
        ..DrawRequest::new(Size::new(200.0, 100.0))
    };
    assert_eq!(draw_layout(&layout, &request), Err(Cancelled));
}

#[test]
fn alignment_moves_the_text_box() {
    let env = testenv!();
    let layout = env.layout_width("hello", 200.0);
    let mut request = DrawRequest::new(Size::new(200.0, 100.0));
    for (alignment, dy) in [
        (VerticalAlignment::Top, 0.0),
        (VerticalAlignment::Center, 42.0),
        (VerticalAlignment::Bottom, 84.0),
    ] {
        request.vertical_alignment = alignment;
        let list = draw_layout(&layout, &request).unwrap();
        assert_eq!(
            list.transform,
            Affine::translate((0.0, dy)),
            "{alignment:?}"
        );
    }
}

#[test]
fn images_are_drawn_in_their_slot() {
    let env = testenv!();
    let text = env.with_attachment(
        "a",
        AttachmentContent::Image(ImageHandle(7)),
        Size::new(20.0, 20.0),
        "b",
    );
    let layout = env.layout(text, &Container::with_width(200.0));
    let slot = layout.line(0).unwrap().attachments()[0].rect;

    let list = draw_layout(&layout, &DrawRequest::new(Size::new(200.0, 100.0))).unwrap();
    let images: Vec<_> = list
        .items
        .iter()
        .filter_map(|item| match item {
            DisplayItem::Image { image, rect } => Some((*image, *rect)),
            _ => None,
        })
        .collect();
    assert_eq!(images, [(ImageHandle(7), slot)]);
    // The placeholder character is never painted as a glyph.
    let ids: Vec<_> = list
        .glyph_runs()
        .flat_map(|run| run.glyphs.iter().map(|g| g.id))
        .collect();
    assert_eq!(ids, [u32::from('a'), u32::from('b')]);
}

#[test]
fn views_are_left_to_the_host() {
    let env = testenv!();
    let text = env.with_attachment(
        "a",
        AttachmentContent::View(ViewId(1)),
        Size::new(20.0, 20.0),
        "",
    );
    let layout = env.layout(text, &Container::with_width(200.0));
    let list = draw_layout(&layout, &DrawRequest::new(Size::new(200.0, 100.0))).unwrap();
    assert!(!list
        .items
        .iter()
        .any(|item| matches!(item, DisplayItem::Image { .. })));
}

#[test]
fn strikethrough_takes_the_text_color() {
    let env = testenv!();
    let red = Color::from_rgb8(255, 0, 0);
    let mut text = RichText::new("struck");
    text.set_color(Some(red), None).unwrap();
    text.set_strikethrough(Some(Decoration::single(None)), None)
        .unwrap();
    let layout = env.layout(text, &Container::with_width(200.0));
    let list = draw_layout(&layout, &DrawRequest::new(Size::new(200.0, 100.0))).unwrap();
    let DisplayItem::Decoration(decoration) = paint_items(&list).last().copied().unwrap() else {
        panic!("expected a decoration last");
    };
    assert_eq!(decoration.kind, DecorationKind::Strikethrough);
    assert_eq!(decoration.color, red);
    assert_eq!(decoration.width, 1.0);
    let y = 12.0 - 12.0 * 0.35;
    assert!((decoration.segment.p0.y - y).abs() < 1e-9);
    assert_eq!(decoration.segment.p0.x, 0.0);
    assert_eq!(decoration.segment.p1.x, 48.0);
}

#[test]
fn superscript_lifts_glyphs() {
    let env = testenv!();
    let mut text = RichText::new("x2");
    text.set_superscript(Some(1), Some(1..2)).unwrap();
    let layout = env.layout(text, &Container::with_width(200.0));
    let list = draw_layout(&layout, &DrawRequest::new(Size::new(200.0, 100.0))).unwrap();
    let ys: Vec<_> = list
        .glyph_runs()
        .flat_map(|run| run.glyphs.iter().map(|g| g.position.y))
        .collect();
    assert_eq!(ys.len(), 2);
    assert_eq!(ys[0], 12.0);
    assert!((ys[1] - (12.0 - 12.0 * 0.4)).abs() < 1e-9);
}

#[test]
fn debug_overlay_comes_last() {
    let env = testenv!();
    let layout = env.layout_width("one\ntwo", 200.0);
    let blue = Color::from_rgb8(0, 0, 255);
    let request = DrawRequest {
        debug: Some(DebugOptions {
            baseline: Some(blue),
            ..DebugOptions::default()
        }),
        ..DrawRequest::new(Size::new(200.0, 100.0))
    };
    let list = draw_layout(&layout, &request).unwrap();
    let baselines: Vec<_> = list
        .items
        .iter()
        .filter_map(|item| match item {
            DisplayItem::Debug(DebugItem::Baseline { segment, .. }) => Some(segment.p0.y),
            _ => None,
        })
        .collect();
    assert_eq!(baselines, [12.0, 28.0]);
    assert!(matches!(list.items.last(), Some(DisplayItem::Debug(_))));

    // Options that show nothing add nothing.
    let quiet = DrawRequest {
        debug: Some(DebugOptions::default()),
        ..DrawRequest::new(Size::new(200.0, 100.0))
    };
    let list = draw_layout(&layout, &quiet).unwrap();
    assert!(!list
        .items
        .iter()
        .any(|item| matches!(item, DisplayItem::Debug(_))));
}
