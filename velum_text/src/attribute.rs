// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The closed attribute vocabulary.
//!
//! Every style that can be attached to a range of a [`RichText`] is one variant of
//! [`Attribute`], keyed by the matching [`AttributeKind`].

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use core::ops::Range;

use peniko::kurbo::{Affine, Insets, Rect, Size, Vec2};
use peniko::Color;

use crate::{ParagraphStyle, RichText};

/// Identifies one slot of the attribute vocabulary.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum AttributeKind {
    /// [`Font`] used to shape the range.
    Font,
    /// Fill color of glyphs.
    ForegroundColor,
    /// Fill color behind glyphs.
    BackgroundColor,
    /// Extra advance added after each character.
    Kern,
    /// Drop shadow drawn under glyphs.
    Shadow,
    /// Shadow drawn inside glyph outlines.
    InnerShadow,
    /// Line under the glyphs.
    Underline,
    /// Line through the glyphs.
    Strikethrough,
    /// Border around each run, merged per line.
    Border,
    /// Border around the whole block of lines the range occupies.
    BlockBorder,
    /// Inline attachment anchored on a placeholder character.
    Attachment,
    /// Interactive highlight.
    Highlight,
    /// Affine transform applied to each glyph.
    GlyphTransform,
    /// Marks a range that editing must treat as one unit.
    Binding,
    /// Original text replaced by this range (usually by an attachment).
    BackedString,
    /// Explicit run metrics, used to size attachment placeholders.
    RunDelegate,
    /// Ruby annotation.
    Ruby,
    /// Superscript (positive) or subscript (negative) level.
    Superscript,
    /// Paragraph level properties.
    Paragraph,
}

impl AttributeKind {
    /// Number of kinds.
    pub const COUNT: usize = 19;

    /// Every kind, in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Font,
        Self::ForegroundColor,
        Self::BackgroundColor,
        Self::Kern,
        Self::Shadow,
        Self::InnerShadow,
        Self::Underline,
        Self::Strikethrough,
        Self::Border,
        Self::BlockBorder,
        Self::Attachment,
        Self::Highlight,
        Self::GlyphTransform,
        Self::Binding,
        Self::BackedString,
        Self::RunDelegate,
        Self::Ruby,
        Self::Superscript,
        Self::Paragraph,
    ];

    /// Position of this kind in [`AttributeKind::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Discontinuous attributes never extend into freshly inserted text and
    /// adjacent equal spans are never merged.
    pub const fn is_discontinuous(self) -> bool {
        matches!(
            self,
            Self::Attachment | Self::RunDelegate | Self::Binding | Self::Ruby | Self::Superscript
        )
    }

    /// Returns `true` when text inserted next to this attribute takes it on.
    ///
    /// Backed strings merge like continuous attributes but stay anchored to the text they
    /// stand in for.
    pub const fn inherits_on_insert(self) -> bool {
        !self.is_discontinuous() && !matches!(self, Self::BackedString)
    }
}

/// A single attribute value.
#[derive(Clone, Debug, PartialEq)]
pub enum Attribute {
    /// See [`AttributeKind::Font`].
    Font(Font),
    /// See [`AttributeKind::ForegroundColor`].
    ForegroundColor(Color),
    /// See [`AttributeKind::BackgroundColor`].
    BackgroundColor(Color),
    /// See [`AttributeKind::Kern`].
    Kern(f64),
    /// See [`AttributeKind::Shadow`].
    Shadow(Shadow),
    /// See [`AttributeKind::InnerShadow`].
    InnerShadow(Shadow),
    /// See [`AttributeKind::Underline`].
    Underline(Decoration),
    /// See [`AttributeKind::Strikethrough`].
    Strikethrough(Decoration),
    /// See [`AttributeKind::Border`].
    Border(Border),
    /// See [`AttributeKind::BlockBorder`].
    BlockBorder(Border),
    /// See [`AttributeKind::Attachment`].
    Attachment(Attachment),
    /// See [`AttributeKind::Highlight`].
    Highlight(Highlight),
    /// See [`AttributeKind::GlyphTransform`].
    GlyphTransform(Affine),
    /// See [`AttributeKind::Binding`].
    Binding(Binding),
    /// See [`AttributeKind::BackedString`].
    BackedString(BackedString),
    /// See [`AttributeKind::RunDelegate`].
    RunDelegate(RunDelegate),
    /// See [`AttributeKind::Ruby`].
    Ruby(RubyAnnotation),
    /// See [`AttributeKind::Superscript`].
    Superscript(i8),
    /// See [`AttributeKind::Paragraph`].
    Paragraph(ParagraphStyle),
}

impl Attribute {
    /// The slot this value belongs to.
    pub fn kind(&self) -> AttributeKind {
        match self {
            Self::Font(_) => AttributeKind::Font,
            Self::ForegroundColor(_) => AttributeKind::ForegroundColor,
            Self::BackgroundColor(_) => AttributeKind::BackgroundColor,
            Self::Kern(_) => AttributeKind::Kern,
            Self::Shadow(_) => AttributeKind::Shadow,
            Self::InnerShadow(_) => AttributeKind::InnerShadow,
            Self::Underline(_) => AttributeKind::Underline,
            Self::Strikethrough(_) => AttributeKind::Strikethrough,
            Self::Border(_) => AttributeKind::Border,
            Self::BlockBorder(_) => AttributeKind::BlockBorder,
            Self::Attachment(_) => AttributeKind::Attachment,
            Self::Highlight(_) => AttributeKind::Highlight,
            Self::GlyphTransform(_) => AttributeKind::GlyphTransform,
            Self::Binding(_) => AttributeKind::Binding,
            Self::BackedString(_) => AttributeKind::BackedString,
            Self::RunDelegate(_) => AttributeKind::RunDelegate,
            Self::Ruby(_) => AttributeKind::Ruby,
            Self::Superscript(_) => AttributeKind::Superscript,
            Self::Paragraph(_) => AttributeKind::Paragraph,
        }
    }
}

/// Font selection for a run. Metrics come from the shaper.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    /// Family name.
    pub family: Arc<str>,
    /// Size in layout units.
    pub size: f32,
    /// CSS style weight, 100 to 900.
    pub weight: u16,
    /// Whether an italic face is requested.
    pub italic: bool,
}

impl Font {
    /// Creates a regular weight upright font.
    pub fn new(family: impl Into<Arc<str>>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            weight: 400,
            italic: false,
        }
    }

    /// Returns a copy of this font with a different size.
    #[must_use]
    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    /// Returns a copy of this font with a different weight.
    #[must_use]
    pub fn with_weight(mut self, weight: u16) -> Self {
        self.weight = weight;
        self
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new("system-ui", 16.0)
    }
}

/// Vertical font metrics reported by the shaper.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FontMetrics {
    /// Distance from baseline to the top of the em box.
    pub ascent: f64,
    /// Distance from baseline to the bottom of the em box, positive downwards.
    pub descent: f64,
    /// Extra space between lines.
    pub leading: f64,
}

/// A shadow, optionally chained with a second shadow drawn beneath it.
#[derive(Clone, Debug, PartialEq)]
pub struct Shadow {
    /// Shadow color.
    pub color: Color,
    /// Offset from the glyphs.
    pub offset: Vec2,
    /// Blur radius.
    pub radius: f64,
    /// Another shadow drawn under this one.
    pub sub_shadow: Option<Box<Shadow>>,
}

impl Shadow {
    /// Creates a shadow without a sub shadow.
    pub fn new(color: Color, offset: Vec2, radius: f64) -> Self {
        Self {
            color,
            offset,
            radius,
            sub_shadow: None,
        }
    }

    /// Iterates this shadow and every chained sub shadow, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &Self> {
        core::iter::successors(Some(self), |shadow| shadow.sub_shadow.as_deref())
    }
}

/// Line weight of a decoration or border.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineStyle {
    /// One hairline stroke.
    #[default]
    Single,
    /// One stroke twice as wide.
    Thick,
    /// Two parallel strokes.
    Double,
}

/// Dash pattern of a decoration or border.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LinePattern {
    /// Continuous line.
    #[default]
    Solid,
    /// Dotted line.
    Dot,
    /// Dashed line.
    Dash,
    /// Alternating dashes and dots.
    DashDot,
}

/// Underline or strikethrough.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Decoration {
    /// Line weight.
    pub style: LineStyle,
    /// Dash pattern.
    pub pattern: LinePattern,
    /// Stroke width; the font's default when `None`.
    pub width: Option<f64>,
    /// Stroke color; the text color when `None`.
    pub color: Option<Color>,
    /// Shadow drawn under the stroke.
    pub shadow: Option<Shadow>,
}

impl Decoration {
    /// A single solid line in the given color.
    pub fn single(color: Option<Color>) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }
}

/// Border drawn around a run or block of text.
#[derive(Clone, Debug, PartialEq)]
pub struct Border {
    /// Line weight.
    pub line_style: LineStyle,
    /// Dash pattern.
    pub pattern: LinePattern,
    /// Stroke width.
    pub stroke_width: f64,
    /// Stroke color; no stroke when `None`.
    pub stroke_color: Option<Color>,
    /// Insets applied to the glyph bounds before drawing; negative values grow the box.
    pub insets: Insets,
    /// Corner radius.
    pub corner_radius: f64,
    /// Fill color; no fill when `None`.
    pub fill_color: Option<Color>,
    /// Shadow drawn under the border.
    pub shadow: Option<Shadow>,
}

impl Border {
    /// A filled rounded box, the usual look of a pressed link.
    pub fn filled(fill_color: Color, corner_radius: f64) -> Self {
        Self {
            fill_color: Some(fill_color),
            corner_radius,
            ..Self::default()
        }
    }
}

impl Default for Border {
    fn default() -> Self {
        Self {
            line_style: LineStyle::Single,
            pattern: LinePattern::Solid,
            stroke_width: 0.0,
            stroke_color: None,
            insets: Insets::ZERO,
            corner_radius: 0.0,
            fill_color: None,
            shadow: None,
        }
    }
}

/// Identifier of an image the host knows how to draw.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub u64);

/// Identifier of a host view that can be placed inside text.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ViewId(pub u64);

/// Identifier of a host layer that can be placed inside text.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

/// The content of an attachment.
///
/// Images are drawn with the text. Views and layers are shared with the host: the layout only
/// records where they go, and the display pipeline attaches and detaches them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AttachmentContent {
    /// Image drawn into the text surface.
    Image(ImageHandle),
    /// Host view positioned over the text.
    View(ViewId),
    /// Host layer positioned over the text.
    Layer(LayerId),
}

/// How attachment content fills the rectangle reserved for it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContentMode {
    /// Stretch to fill, ignoring aspect ratio.
    #[default]
    ScaleToFill,
    /// Scale to fit inside, preserving aspect ratio.
    ScaleAspectFit,
    /// Scale to cover, preserving aspect ratio.
    ScaleAspectFill,
    /// Keep size, center.
    Center,
    /// Keep size, align top center.
    Top,
    /// Keep size, align bottom center.
    Bottom,
    /// Keep size, align left center.
    Left,
    /// Keep size, align right center.
    Right,
    /// Keep size, align top left.
    TopLeft,
    /// Keep size, align top right.
    TopRight,
    /// Keep size, align bottom left.
    BottomLeft,
    /// Keep size, align bottom right.
    BottomRight,
}

/// Opaque user data carried by attachments and highlights.
///
/// Compared by identity.
#[derive(Clone)]
pub struct UserData(pub Arc<dyn Any + Send + Sync>);

impl UserData {
    /// Wraps a value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Borrows the value if it has type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl PartialEq for UserData {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl fmt::Debug for UserData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserData").finish_non_exhaustive()
    }
}

/// Inline non-text content anchored on a placeholder character.
#[derive(Clone, Debug, PartialEq)]
pub struct Attachment {
    /// What to show.
    pub content: AttachmentContent,
    /// Natural size of the content.
    pub content_size: Size,
    /// How the content fills its rectangle.
    pub content_mode: ContentMode,
    /// Insets applied to the run rectangle before fitting the content.
    pub content_insets: Insets,
    /// Opaque user data.
    pub user_data: Option<UserData>,
}

impl Attachment {
    /// Creates an attachment that fills its rectangle.
    pub fn new(content: AttachmentContent, content_size: Size) -> Self {
        Self {
            content,
            content_size,
            content_mode: ContentMode::ScaleToFill,
            content_insets: Insets::ZERO,
            user_data: None,
        }
    }

    /// Returns a copy with a different content mode.
    #[must_use]
    pub fn with_content_mode(mut self, content_mode: ContentMode) -> Self {
        self.content_mode = content_mode;
        self
    }
}

/// How an attachment placeholder sits relative to the surrounding font.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum AttachmentAlignment {
    /// Top of the attachment at the font's ascent.
    Top,
    /// Attachment centered on the font's em box.
    #[default]
    Center,
    /// Bottom of the attachment at the font's descent.
    Bottom,
}

/// Payload of a tap or long press on text.
#[derive(Clone, Debug)]
pub struct TextActionEvent {
    /// The text that was displayed.
    pub text: Arc<RichText>,
    /// The range that was hit; for highlights, the highlight's whole range.
    pub range: Option<Range<usize>>,
    /// Bounds of `range` in view coordinates.
    pub rect: Option<Rect>,
}

/// Callback for taps and long presses.
pub type TextAction = Arc<dyn Fn(&TextActionEvent) + Send + Sync>;

/// A change applied over a highlight's range while it is pressed.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeDelta {
    /// Overlay this value.
    Set(Attribute),
    /// Remove every value of this kind.
    Remove(AttributeKind),
}

/// Interactive style bound to a text range.
#[derive(Clone, Default)]
pub struct Highlight {
    /// Attribute changes shown while the highlight is active.
    pub attributes: Vec<AttributeDelta>,
    /// Called on tap.
    pub tap_action: Option<TextAction>,
    /// Called on long press.
    pub long_press_action: Option<TextAction>,
    /// Opaque user data.
    pub user_data: Option<UserData>,
}

impl Highlight {
    /// A highlight that recolors its text while pressed.
    pub fn with_color(color: Color) -> Self {
        Self {
            attributes: alloc::vec![AttributeDelta::Set(Attribute::ForegroundColor(color))],
            ..Self::default()
        }
    }

    /// Adds a background box shown while pressed.
    #[must_use]
    pub fn with_background_border(mut self, border: Border) -> Self {
        self.attributes
            .push(AttributeDelta::Set(Attribute::Border(border)));
        self
    }

    /// Sets the tap callback.
    #[must_use]
    pub fn on_tap(mut self, action: impl Fn(&TextActionEvent) + Send + Sync + 'static) -> Self {
        self.tap_action = Some(Arc::new(action));
        self
    }

    /// Sets the long press callback.
    #[must_use]
    pub fn on_long_press(
        mut self,
        action: impl Fn(&TextActionEvent) + Send + Sync + 'static,
    ) -> Self {
        self.long_press_action = Some(Arc::new(action));
        self
    }
}

fn same_action(a: &Option<TextAction>, b: &Option<TextAction>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => core::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
        _ => false,
    }
}

impl PartialEq for Highlight {
    fn eq(&self, other: &Self) -> bool {
        self.attributes == other.attributes
            && same_action(&self.tap_action, &other.tap_action)
            && same_action(&self.long_press_action, &other.long_press_action)
            && self.user_data == other.user_data
    }
}

impl fmt::Debug for Highlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Highlight")
            .field("attributes", &self.attributes)
            .field("tap_action", &self.tap_action.is_some())
            .field("long_press_action", &self.long_press_action.is_some())
            .field("user_data", &self.user_data)
            .finish()
    }
}

/// Marks a range that selection and editing treat as one unit.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Binding {
    /// Whether deletion should ask for confirmation first.
    pub delete_confirm: bool,
}

/// The original text of a range, kept when it was replaced by other content.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BackedString {
    /// Original text.
    pub string: Arc<str>,
}

impl BackedString {
    /// Wraps the original text.
    pub fn new(string: impl Into<Arc<str>>) -> Self {
        Self {
            string: string.into(),
        }
    }
}

/// Explicit run metrics, overriding the font for the range.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RunDelegate {
    /// Height above the baseline.
    pub ascent: f64,
    /// Depth below the baseline.
    pub descent: f64,
    /// Advance of the run.
    pub width: f64,
}

impl RunDelegate {
    /// Metrics that place a box of `size` relative to a font with `metrics`.
    pub fn for_box(size: Size, metrics: FontMetrics, alignment: AttachmentAlignment) -> Self {
        let (mut ascent, mut descent);
        match alignment {
            AttachmentAlignment::Top => {
                ascent = metrics.ascent;
                descent = size.height - ascent;
            }
            AttachmentAlignment::Center => {
                let font_height = metrics.ascent + metrics.descent;
                let y_offset = metrics.ascent - font_height * 0.5;
                ascent = size.height * 0.5 + y_offset;
                descent = size.height - ascent;
            }
            AttachmentAlignment::Bottom => {
                descent = metrics.descent;
                ascent = size.height - descent;
            }
        }
        if descent < 0.0 {
            descent = 0.0;
            ascent = size.height;
        }
        if ascent < 0.0 {
            ascent = 0.0;
            descent = size.height;
        }
        Self {
            ascent,
            descent,
            width: size.width,
        }
    }
}

/// Placement of ruby text relative to its base.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum RubyAlignment {
    /// Centered over the base.
    #[default]
    Center,
    /// Aligned to the base's start.
    Start,
    /// Aligned to the base's end.
    End,
    /// Spread across the base.
    DistributeSpace,
}

/// Ruby annotation over a base range.
#[derive(Clone, Debug, PartialEq)]
pub struct RubyAnnotation {
    /// Annotation text.
    pub text: Arc<str>,
    /// Placement over the base.
    pub alignment: RubyAlignment,
    /// Annotation size relative to the base font.
    pub size_factor: f32,
}

impl RubyAnnotation {
    /// A centered annotation at half the base size.
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self {
            text: text.into(),
            alignment: RubyAlignment::Center,
            size_factor: 0.5,
        }
    }
}
