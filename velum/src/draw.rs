// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing a [`Layout`] into a [`DisplayList`].
//!
//! Drawing does not rasterize anything. It walks the layout once per pass and records what
//! to paint, in paint order, so that the list can be built off the owning thread and handed to
//! whatever renderer the host uses.
//!
//! Passes run in this order: block borders, backgrounds and borders, shadows, glyphs,
//! underlines, strikethroughs, inner shadows, image attachments and finally the debug overlay.

use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Range;
use core::sync::atomic::{AtomicU64, Ordering};

use peniko::kurbo::{Affine, Line as Segment, Point, Rect, Size, Vec2};
use peniko::Color;
use velum_text::{
    AttachmentContent, Attribute, AttributeKind, Border, Decoration, Font, ImageHandle,
    LinePattern, LineStyle, RunStyle, Shadow,
};

use crate::coords::{alignment_offset, fit_rect};
use crate::debug::DebugOptions;
use crate::layout::{GlyphDrawMode, Layout, Line};
use crate::shape::{RunSource, ShapedRun};

/// Placement of the text box along the cross axis of a view.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum VerticalAlignment {
    /// Top edge, or right edge in vertical form.
    Top,
    /// Centered.
    #[default]
    Center,
    /// Bottom edge, or left edge in vertical form.
    Bottom,
}

/// A display request was superseded.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("display request cancelled")
    }
}

impl core::error::Error for Cancelled {}

/// Cooperative cancellation flag.
///
/// A token is live while the shared counter still holds the generation it was created for.
/// Bumping the counter cancels every token of older generations at once.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    current: Option<Arc<AtomicU64>>,
    generation: u64,
}

impl CancelToken {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        Self::default()
    }

    /// A token for `generation` of `current`.
    pub fn new(current: Arc<AtomicU64>, generation: u64) -> Self {
        Self {
            current: Some(current),
            generation,
        }
    }

    /// Generation this token belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` once a newer generation has started.
    pub fn is_cancelled(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|current| current.load(Ordering::Acquire) != self.generation)
    }

    /// Returns `Err(Cancelled)` once a newer generation has started.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Parameters of one drawing.
#[derive(Clone, Debug, Default)]
pub struct DrawRequest {
    /// Size of the target surface.
    pub size: Size,
    /// Placement of the text box on the surface.
    pub vertical_alignment: VerticalAlignment,
    /// Debug overlay; nothing is drawn for `None`.
    pub debug: Option<DebugOptions>,
    /// Polled between lines.
    pub cancel: CancelToken,
}

impl DrawRequest {
    /// A request for a surface of `size`.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }
}

/// Which glyph pass a [`GlyphRunItem`] belongs to.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GlyphPass {
    /// The glyphs themselves.
    Fill,
    /// A drop shadow under the glyphs.
    Shadow {
        /// Shadow color.
        color: Color,
        /// Offset from the glyphs.
        offset: Vec2,
        /// Blur radius.
        radius: f64,
    },
    /// A shadow clipped to the inside of the glyphs.
    InnerShadow {
        /// Shadow color.
        color: Color,
        /// Offset from the glyph edges.
        offset: Vec2,
        /// Blur radius.
        radius: f64,
    },
}

impl GlyphPass {
    fn shadow(shadow: &Shadow, inner: bool) -> Self {
        if inner {
            Self::InnerShadow {
                color: shadow.color,
                offset: shadow.offset,
                radius: shadow.radius,
            }
        } else {
            Self::Shadow {
                color: shadow.color,
                offset: shadow.offset,
                radius: shadow.radius,
            }
        }
    }
}

/// One glyph ready to paint.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PositionedGlyph {
    /// Glyph identifier from the shaper.
    pub id: u32,
    /// Baseline position in container coordinates.
    pub position: Point,
    /// Advance along the line axis.
    pub advance: f64,
    /// Rotation in vertical form.
    pub mode: GlyphDrawMode,
}

/// A run of glyphs sharing font and paint.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphRunItem {
    /// What is painted.
    pub pass: GlyphPass,
    /// Font of the run.
    pub font: Font,
    /// Fill color of the glyphs.
    pub color: Color,
    /// The glyphs.
    pub glyphs: Vec<PositionedGlyph>,
    /// Vertical form.
    pub vertical: bool,
    /// Transform applied to every glyph around its origin.
    pub glyph_transform: Option<Affine>,
}

/// Underline or strikethrough.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DecorationKind {
    /// Below the baseline.
    Underline,
    /// Through the middle of the glyphs.
    Strikethrough,
}

/// A decoration stroke.
#[derive(Clone, Debug, PartialEq)]
pub struct DecorationItem {
    /// Underline or strikethrough.
    pub kind: DecorationKind,
    /// Center line of the stroke.
    pub segment: Segment,
    /// Stroke width.
    pub width: f64,
    /// Stroke color.
    pub color: Color,
    /// Line weight.
    pub style: LineStyle,
    /// Dash pattern.
    pub pattern: LinePattern,
    /// Shadow under the stroke.
    pub shadow: Option<Shadow>,
}

/// Debug overlay primitives.
#[derive(Clone, Debug, PartialEq)]
pub enum DebugItem {
    /// A filled and/or outlined rectangle.
    Rect {
        /// The rectangle.
        rect: Rect,
        /// Fill color.
        fill: Option<Color>,
        /// Outline color.
        stroke: Option<Color>,
    },
    /// A line baseline.
    Baseline {
        /// The baseline.
        segment: Segment,
        /// Color.
        color: Color,
    },
    /// A small text label.
    Label {
        /// Top left corner.
        position: Point,
        /// Label text.
        text: String,
        /// Color.
        color: Color,
    },
}

/// One paint operation.
#[derive(Clone, Debug, PartialEq)]
pub enum DisplayItem {
    /// A solid background.
    Fill {
        /// Area to fill.
        rect: Rect,
        /// Fill color.
        color: Color,
    },
    /// A run or block border, including its fill and shadow.
    Border {
        /// Box of the border.
        rect: Rect,
        /// Border style.
        border: Border,
    },
    /// Glyphs.
    GlyphRun(GlyphRunItem),
    /// An underline or strikethrough.
    Decoration(DecorationItem),
    /// An image attachment.
    Image {
        /// The image.
        image: ImageHandle,
        /// Where to draw it.
        rect: Rect,
    },
    /// Debug overlay.
    Debug(DebugItem),
}

/// The recorded drawing of a layout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayList {
    /// Size of the target surface.
    pub size: Size,
    /// Maps container coordinates to surface coordinates.
    pub transform: Affine,
    /// Items in paint order.
    pub items: Vec<DisplayItem>,
}

impl DisplayList {
    /// A list for `size` that paints nothing.
    pub fn empty(size: Size) -> Self {
        Self {
            size,
            transform: Affine::IDENTITY,
            items: Vec::new(),
        }
    }

    /// Returns `true` if nothing is painted.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The glyph runs, in paint order.
    pub fn glyph_runs(&self) -> impl Iterator<Item = &GlyphRunItem> {
        self.items.iter().filter_map(|item| match item {
            DisplayItem::GlyphRun(run) => Some(run),
            _ => None,
        })
    }
}

/// Records the drawing of `layout` for a surface described by `request`.
///
/// Returns [`Cancelled`] as soon as the request's token is cancelled.
pub fn draw_layout(layout: &Layout, request: &DrawRequest) -> Result<DisplayList, Cancelled> {
    request.cancel.check()?;
    let offset = alignment_offset(
        request.size,
        layout.text_bounding_size(),
        request.vertical_alignment,
        layout.is_vertical(),
    );
    let mut painter = Painter {
        layout,
        cancel: &request.cancel,
        items: Vec::new(),
    };
    let needs = layout.needs();
    if needs.block_border {
        painter.block_borders()?;
    }
    if needs.background || needs.border {
        painter.boxes(needs.background, needs.border)?;
    }
    if needs.shadow {
        painter.shadows(false)?;
    }
    if needs.text {
        painter.glyphs()?;
    }
    if needs.underline {
        painter.decorations(DecorationKind::Underline)?;
    }
    if needs.strikethrough {
        painter.decorations(DecorationKind::Strikethrough)?;
    }
    if needs.inner_shadow {
        painter.shadows(true)?;
    }
    if needs.attachment {
        painter.images()?;
    }
    if let Some(debug) = request.debug.as_ref().filter(|d| d.needs_draw()) {
        painter.debug(debug)?;
    }
    Ok(DisplayList {
        size: request.size,
        transform: Affine::translate(offset),
        items: painter.items,
    })
}

struct Painter<'a> {
    layout: &'a Layout,
    cancel: &'a CancelToken,
    items: Vec<DisplayItem>,
}

impl<'a> Painter<'a> {
    fn style(&self, run: &ShapedRun) -> RunStyle<'a> {
        self.layout
            .source_text(run.source)
            .style_at(run.text_range.start)
    }

    /// Each line's run rectangles merged by the span of `kind` they belong to.
    fn grouped(&self, line: Line<'a>, kind: AttributeKind) -> Vec<(Rect, &'a Attribute)> {
        let mut groups: Vec<(Range<usize>, bool, Rect, &'a Attribute)> = Vec::new();
        for run in line.runs() {
            let source = self.layout.source_text(run.source);
            let Some((span, attr)) = source.attribute_span_at(kind, run.text_range.start) else {
                continue;
            };
            let rect = line.run_rect(run);
            let is_token = run.source != RunSource::Text;
            match groups.last_mut() {
                Some((range, token, union, _)) if *range == span && *token == is_token => {
                    *union = union.union(rect);
                }
                _ => groups.push((span, is_token, rect, attr)),
            }
        }
        groups
            .into_iter()
            .map(|(_, _, rect, attr)| (rect, attr))
            .collect()
    }

    fn block_borders(&mut self) -> Result<(), Cancelled> {
        let layout = self.layout;
        let content = layout.container().content_rect();
        for (span, attr) in layout
            .text()
            .spans_in(AttributeKind::BlockBorder, layout.visible_range())
        {
            self.cancel.check()?;
            let Attribute::BlockBorder(border) = attr else {
                continue;
            };
            let mut union: Option<Rect> = None;
            for line in layout.lines() {
                let range = line.text_range();
                if range.end <= span.start || range.start >= span.end {
                    continue;
                }
                let rect = line.bounding_box();
                union = Some(union.map_or(rect, |u| u.union(rect)));
            }
            let Some(mut rect) = union else {
                continue;
            };
            if layout.is_vertical() {
                rect.y0 = content.y0;
                rect.y1 = content.y1;
            } else {
                rect.x0 = content.x0;
                rect.x1 = content.x1;
            }
            self.items.push(DisplayItem::Border {
                rect: rect - border.insets,
                border: border.clone(),
            });
        }
        Ok(())
    }

    fn boxes(&mut self, background: bool, border: bool) -> Result<(), Cancelled> {
        for line in self.layout.lines() {
            self.cancel.check()?;
            if background {
                for (rect, attr) in self.grouped(line, AttributeKind::BackgroundColor) {
                    if let Attribute::BackgroundColor(color) = attr {
                        self.items.push(DisplayItem::Fill {
                            rect,
                            color: *color,
                        });
                    }
                }
            }
            if border {
                for (rect, attr) in self.grouped(line, AttributeKind::Border) {
                    if let Attribute::Border(border) = attr {
                        self.items.push(DisplayItem::Border {
                            rect: rect - border.insets,
                            border: border.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn positioned(
        line: &Line<'_>,
        run_index: usize,
        run: &ShapedRun,
        style: &RunStyle<'_>,
    ) -> Vec<PositionedGlyph> {
        let origin = line.origin();
        let vertical = line.is_vertical();
        let ranges = line.vertical_rotate_ranges().get(run_index);
        let lift = style
            .superscript()
            .map_or(0.0, |&level| f64::from(level) * run.ascent * 0.4);
        run.glyphs
            .iter()
            .enumerate()
            .map(|(ix, glyph)| {
                let along = run.offset + glyph.offset;
                let position = if vertical {
                    Point::new(origin.x + lift, origin.y + along)
                } else {
                    Point::new(origin.x + along, origin.y - lift)
                };
                let mode = ranges
                    .and_then(|ranges| ranges.iter().find(|r| r.glyphs.contains(&ix)))
                    .map_or(GlyphDrawMode::Horizontal, |r| r.mode);
                PositionedGlyph {
                    id: glyph.id,
                    position,
                    advance: glyph.advance,
                    mode,
                }
            })
            .collect()
    }

    fn glyph_runs(
        &mut self,
        passes_for: impl Fn(&RunStyle<'a>) -> Vec<GlyphPass>,
    ) -> Result<(), Cancelled> {
        for line in self.layout.lines() {
            self.cancel.check()?;
            for (run_index, run) in line.runs().iter().enumerate() {
                if run.glyphs.is_empty() {
                    continue;
                }
                let style = self.style(run);
                if style.attachment().is_some() {
                    continue;
                }
                let passes = passes_for(&style);
                if passes.is_empty() {
                    continue;
                }
                let glyphs = Self::positioned(&line, run_index, run, &style);
                let font = style.font().cloned().unwrap_or_default();
                let color = style.color().copied().unwrap_or(Color::BLACK);
                let glyph_transform = style.glyph_transform().copied();
                for pass in passes {
                    self.items.push(DisplayItem::GlyphRun(GlyphRunItem {
                        pass,
                        font: font.clone(),
                        color,
                        glyphs: glyphs.clone(),
                        vertical: line.is_vertical(),
                        glyph_transform,
                    }));
                }
            }
        }
        Ok(())
    }

    fn glyphs(&mut self) -> Result<(), Cancelled> {
        self.glyph_runs(|_| alloc::vec![GlyphPass::Fill])
    }

    fn shadows(&mut self, inner: bool) -> Result<(), Cancelled> {
        self.glyph_runs(|style| {
            let shadow = if inner {
                style.inner_shadow()
            } else {
                style.shadow()
            };
            shadow
                .into_iter()
                .flat_map(Shadow::chain)
                .map(|shadow| GlyphPass::shadow(shadow, inner))
                .collect()
        })
    }

    fn decorations(&mut self, kind: DecorationKind) -> Result<(), Cancelled> {
        for line in self.layout.lines() {
            self.cancel.check()?;
            let origin = line.origin();
            for run in line.runs() {
                let style = self.style(run);
                let decoration: Option<&Decoration> = match kind {
                    DecorationKind::Underline => style.underline(),
                    DecorationKind::Strikethrough => style.strikethrough(),
                };
                let Some(decoration) = decoration else {
                    continue;
                };
                let font_size = style.font().map_or(Font::default().size, |f| f.size);
                let mut width = decoration
                    .width
                    .unwrap_or_else(|| (f64::from(font_size) / 16.0).max(1.0));
                if decoration.style == LineStyle::Thick {
                    width *= 2.0;
                }
                // Distance from the baseline towards the ascent side.
                let rise = match kind {
                    DecorationKind::Underline => -(run.descent * 0.5).max(width),
                    DecorationKind::Strikethrough => run.ascent * 0.35,
                };
                let (start, end) = (run.offset, run.offset + run.width);
                let segment = if line.is_vertical() {
                    let x = origin.x + rise;
                    Segment::new((x, origin.y + start), (x, origin.y + end))
                } else {
                    let y = origin.y - rise;
                    Segment::new((origin.x + start, y), (origin.x + end, y))
                };
                let color = decoration
                    .color
                    .or_else(|| style.color().copied())
                    .unwrap_or(Color::BLACK);
                self.items.push(DisplayItem::Decoration(DecorationItem {
                    kind,
                    segment,
                    width,
                    color,
                    style: decoration.style,
                    pattern: decoration.pattern,
                    shadow: decoration.shadow.clone(),
                }));
            }
        }
        Ok(())
    }

    fn images(&mut self) -> Result<(), Cancelled> {
        for line in self.layout.lines() {
            self.cancel.check()?;
            for placed in line.attachments() {
                let AttachmentContent::Image(image) = placed.attachment.content else {
                    continue;
                };
                let attachment = &placed.attachment;
                let rect = fit_rect(
                    placed.rect - attachment.content_insets,
                    attachment.content_size,
                    attachment.content_mode,
                );
                self.items.push(DisplayItem::Image { image, rect });
            }
        }
        Ok(())
    }

    fn debug(&mut self, options: &DebugOptions) -> Result<(), Cancelled> {
        let layout = self.layout;
        let mut push = |item: DebugItem| self.items.push(DisplayItem::Debug(item));
        if options.frame_fill.is_some() || options.frame_border.is_some() {
            push(DebugItem::Rect {
                rect: layout.text_bounding_rect(),
                fill: options.frame_fill,
                stroke: options.frame_border,
            });
        }
        for line in layout.lines() {
            self.cancel.check()?;
            let mut push = |item: DebugItem| self.items.push(DisplayItem::Debug(item));
            let bounds = line.bounding_box();
            if options.line_fill.is_some() || options.line_border.is_some() {
                push(DebugItem::Rect {
                    rect: bounds,
                    fill: options.line_fill,
                    stroke: options.line_border,
                });
            }
            if let Some(color) = options.baseline {
                let origin = line.origin();
                let start = line.first_glyph_offset();
                let end = start + line.metrics().width;
                let segment = if line.is_vertical() {
                    Segment::new((origin.x, origin.y + start), (origin.x, origin.y + end))
                } else {
                    Segment::new((origin.x + start, origin.y), (origin.x + end, origin.y))
                };
                push(DebugItem::Baseline { segment, color });
            }
            if let Some(color) = options.line_number {
                push(DebugItem::Label {
                    position: bounds.origin(),
                    text: format!("{}", line.index()),
                    color,
                });
            }
            for (run_index, run) in line.runs().iter().enumerate() {
                let rect = line.run_rect(run);
                if options.run_fill.is_some() || options.run_border.is_some() {
                    push(DebugItem::Rect {
                        rect,
                        fill: options.run_fill,
                        stroke: options.run_border,
                    });
                }
                if let Some(color) = options.run_number {
                    push(DebugItem::Label {
                        position: Point::new(rect.x0, rect.y1),
                        text: format!("{run_index}"),
                        color,
                    });
                }
            }
            if options.glyph_fill.is_some() || options.glyph_border.is_some() {
                for glyph in line.glyph_rects() {
                    push(DebugItem::Rect {
                        rect: glyph.rect,
                        fill: options.glyph_fill,
                        stroke: options.glyph_border,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_cancel_on_new_generation() {
        let counter = Arc::new(AtomicU64::new(3));
        let token = CancelToken::new(Arc::clone(&counter), 3);
        assert_eq!(token.check(), Ok(()));
        counter.store(4, Ordering::Release);
        assert!(token.is_cancelled());
        assert_eq!(token.check(), Err(Cancelled));
        assert!(!CancelToken::never().is_cancelled());
    }
}
