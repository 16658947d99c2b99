// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glue between a host view and the engine.
//!
//! A [`TextView`] owns the staged text and container, the committed layout, the display
//! pipeline and the highlight tracker. All of its methods must be called on the thread that
//! created it; only layout and drawing run elsewhere.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Range;
use core::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, ThreadId};
use std::time::Instant;

use log::{trace, warn};
use peniko::kurbo::{Point, Rect, Size, Vec2};
use velum_text::{
    AttachmentContent, Highlight, LayerId, RichText, TextAction, TextActionEvent, ViewId,
};

use crate::coords::alignment_offset;
use crate::debug::{self, ListenerHandle};
use crate::display::{
    reconcile, Completed, DisplayOutcome, DisplayPipeline, DisplayTask, LayoutSource,
    Transition, ASYNC_FADE, HIGHLIGHT_FADE,
};
use crate::draw::{DisplayList, DrawRequest, VerticalAlignment};
use crate::interaction::{
    ActionTarget, Effects, Gesture, Handlers, HighlightTracker, InteractionEffect, TrackerConfig,
};
use crate::{Container, Layout, LayoutContext};

/// The host side of a [`TextView`].
///
/// Rectangles are in view coordinates.
pub trait ViewHost {
    /// Shows a finished drawing.
    fn present(&mut self, list: &DisplayList, transition: Option<Transition>);

    /// Removes the current drawing.
    fn clear_contents(&mut self);

    /// Adds a sub-view, or moves it if it is already attached.
    fn attach_view(&mut self, view: ViewId, rect: Rect);

    /// Removes a sub-view.
    fn detach_view(&mut self, view: ViewId);

    /// Adds a sub-layer, or moves it if it is already attached.
    fn attach_layer(&mut self, layer: LayerId, rect: Rect);

    /// Removes a sub-layer.
    fn detach_layer(&mut self, layer: LayerId);

    /// The natural size of the view may have changed.
    fn intrinsic_size_changed(&mut self) {}
}

/// Display behavior of a [`TextView`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DisplayOptions {
    /// Lay out and draw on the worker pool.
    pub displays_asynchronously: bool,
    /// Fade in content drawn asynchronously.
    pub fade_on_async_display: bool,
    /// Fade when a highlight's pressed state goes away.
    pub fade_on_highlight: bool,
    /// Clear the surface while asynchronous drawing of changed text is underway.
    pub clear_contents_before_async_display: bool,
    /// Placement of the text inside the view.
    pub vertical_alignment: VerticalAlignment,
    /// Width used for the intrinsic size; 0 means unbounded.
    pub preferred_max_layout_width: f64,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            displays_asynchronously: false,
            fade_on_async_display: true,
            fade_on_highlight: true,
            clear_contents_before_async_display: true,
            vertical_alignment: VerticalAlignment::Center,
            preferred_max_layout_width: 0.0,
        }
    }
}

/// View-wide gesture handlers.
#[derive(Clone, Default)]
pub struct ViewActions {
    /// Tap anywhere on the text.
    pub text_tap: Option<TextAction>,
    /// Long press anywhere on the text.
    pub text_long_press: Option<TextAction>,
    /// Tap on a highlight without its own tap action.
    pub highlight_tap: Option<TextAction>,
    /// Long press on a highlight without its own long press action.
    pub highlight_long_press: Option<TextAction>,
}

impl ViewActions {
    fn handlers(&self) -> Handlers {
        Handlers {
            text_tap: self.text_tap.is_some(),
            text_long_press: self.text_long_press.is_some(),
            highlight_tap: self.highlight_tap.is_some(),
            highlight_long_press: self.highlight_long_press.is_some(),
        }
    }
}

impl fmt::Debug for ViewActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewActions")
            .field("handlers", &self.handlers())
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct Overlay {
    range: Range<usize>,
    highlight: Highlight,
    layout: Option<Arc<Layout>>,
    visible: bool,
}

/// A rich text view.
pub struct TextView<H> {
    host: H,
    context: LayoutContext,
    text: Arc<RichText>,
    container: Container,
    options: DisplayOptions,
    actions: ViewActions,
    layout: Option<Arc<Layout>>,
    layout_stale: bool,
    needs_display: bool,
    pipeline: DisplayPipeline,
    attached: Vec<AttachmentContent>,
    tracker: HighlightTracker,
    overlay: Option<Overlay>,
    debug_dirty: Arc<AtomicBool>,
    debug_listener: ListenerHandle,
    owner: ThreadId,
}

impl<H: fmt::Debug> fmt::Debug for TextView<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextView")
            .field("host", &self.host)
            .field("text", &self.text.as_str())
            .field("container", &self.container)
            .field("options", &self.options)
            .field("layout_stale", &self.layout_stale)
            .field("needs_display", &self.needs_display)
            .field("attached", &self.attached)
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}

impl<H: ViewHost> TextView<H> {
    /// Creates an empty view using the bundled shaper.
    pub fn new(host: H) -> Self {
        Self::with_context(host, LayoutContext::default())
    }

    /// Creates an empty view using `context` for layout.
    pub fn with_context(host: H, context: LayoutContext) -> Self {
        let debug_dirty = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&debug_dirty);
        let debug_listener = debug::add_listener(move |_| flag.store(true, Ordering::Release));
        Self {
            host,
            context,
            text: Arc::new(RichText::default()),
            container: Container::default(),
            options: DisplayOptions::default(),
            actions: ViewActions::default(),
            layout: None,
            layout_stale: false,
            needs_display: true,
            pipeline: DisplayPipeline::new(),
            attached: Vec::new(),
            tracker: HighlightTracker::default(),
            overlay: None,
            debug_dirty,
            debug_listener,
            owner: thread::current().id(),
        }
    }

    /// Runs display work on `pipeline` instead of the global pool.
    #[must_use]
    pub fn with_pipeline(mut self, pipeline: DisplayPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The staged text.
    pub fn text(&self) -> &Arc<RichText> {
        &self.text
    }

    /// Replaces the text.
    pub fn set_text(&mut self, text: impl Into<Arc<RichText>>) {
        self.assert_owner();
        self.text = text.into();
        self.invalidate();
    }

    /// The staged container.
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Replaces the container.
    pub fn set_container(&mut self, container: Container) {
        self.assert_owner();
        self.container = container;
        self.invalidate();
    }

    /// Resizes the container to the view's bounds.
    pub fn set_size(&mut self, size: Size) {
        self.assert_owner();
        if self.container.size != size {
            self.container.size = size;
            self.invalidate();
        }
    }

    /// Display behavior.
    pub fn options(&self) -> &DisplayOptions {
        &self.options
    }

    /// Changes display behavior.
    pub fn set_options(&mut self, options: DisplayOptions) {
        self.assert_owner();
        let relayout = options.preferred_max_layout_width
            != self.options.preferred_max_layout_width;
        self.options = options;
        self.needs_display = true;
        if relayout {
            self.host.intrinsic_size_changed();
        }
    }

    /// Gesture handlers.
    pub fn actions(&self) -> &ViewActions {
        &self.actions
    }

    /// Gesture handlers, mutably.
    pub fn actions_mut(&mut self) -> &mut ViewActions {
        &mut self.actions
    }

    /// The tracker configuration.
    pub fn set_tracker_config(&mut self, config: TrackerConfig) {
        self.tracker = HighlightTracker::new(config);
    }

    /// The committed layout.
    pub fn layout(&self) -> Option<&Arc<Layout>> {
        self.layout.as_ref()
    }

    /// Returns `true` when the committed layout no longer matches the staged text.
    pub fn is_layout_stale(&self) -> bool {
        self.layout_stale
    }

    /// Returns `true` while a display request is running on the pool.
    pub fn is_display_pending(&self) -> bool {
        self.pipeline.is_pending()
    }

    /// View and layer contents currently attached to the host.
    pub fn attached(&self) -> &[AttachmentContent] {
        &self.attached
    }

    /// Returns `true` while a highlight's pressed state is shown.
    pub fn is_showing_highlight(&self) -> bool {
        self.overlay.as_ref().is_some_and(|overlay| overlay.visible)
    }

    /// Marks the surface for redrawing.
    pub fn set_needs_display(&mut self) {
        self.needs_display = true;
    }

    /// Starts a display request if anything changed since the last one.
    pub fn display_if_needed(&mut self) {
        self.assert_owner();
        if self.debug_dirty.swap(false, Ordering::AcqRel) {
            self.needs_display = true;
        }
        if self.needs_display {
            self.display(self.options.displays_asynchronously);
        }
    }

    /// Commits the result of an asynchronous request if it has finished.
    ///
    /// Returns `true` if something was committed.
    pub fn process_completions(&mut self) -> bool {
        self.assert_owner();
        match self.pipeline.drain() {
            Some(done) => {
                self.commit(done);
                true
            }
            None => false,
        }
    }

    /// Blocks until the pending asynchronous request is committed or `timeout` passes.
    pub fn wait_for_display(&mut self, timeout: core::time::Duration) -> bool {
        self.assert_owner();
        match self.pipeline.wait(timeout) {
            Some(done) => {
                self.commit(done);
                true
            }
            None => false,
        }
    }

    /// Size of the text laid out without a height limit.
    ///
    /// Uses [`DisplayOptions::preferred_max_layout_width`] as the width limit.
    pub fn intrinsic_size(&self) -> Size {
        let preferred = self.options.preferred_max_layout_width;
        if self.container.vertical_form {
            self.size_that_fits(Size::new(0.0, preferred))
        } else {
            self.size_that_fits(Size::new(preferred, 0.0))
        }
    }

    /// Size the text needs when limited to `size`. Zero dimensions are unbounded.
    pub fn size_that_fits(&self, size: Size) -> Size {
        let mut container = self.container.clone();
        container.size = Size::new(
            if size.width > 0.0 {
                size.width
            } else {
                Container::MAX_EXTENT
            },
            if size.height > 0.0 {
                size.height
            } else {
                Container::MAX_EXTENT
            },
        );
        self.context
            .layout(Arc::clone(&self.text), &container)
            .map_or(Size::ZERO, |layout| layout.text_bounding_size())
    }

    /// Touch down at `point` in view coordinates.
    ///
    /// Returns `true` if the view consumed the touch.
    pub fn touch_began(&mut self, point: Point, now: Instant) -> bool {
        self.assert_owner();
        self.ensure_layout();
        let local = point - self.content_offset();
        let layout = self.layout.clone();
        let result =
            self.tracker
                .touch_began(layout.as_deref(), local, now, self.actions.handlers());
        self.apply(result.effects);
        result.handled
    }

    /// Touch moved to `point` in view coordinates.
    pub fn touch_moved(&mut self, point: Point) -> bool {
        self.assert_owner();
        let local = point - self.content_offset();
        let layout = self.layout.clone();
        let result = self.tracker.touch_moved(layout.as_deref(), local);
        self.apply(result.effects);
        result.handled
    }

    /// Touch lifted at `point` in view coordinates.
    pub fn touch_ended(&mut self, point: Point) -> bool {
        self.assert_owner();
        let local = point - self.content_offset();
        let layout = self.layout.clone();
        let result = self.tracker.touch_ended(layout.as_deref(), local);
        self.apply(result.effects);
        result.handled
    }

    /// Touch cancelled by the system.
    pub fn touch_cancelled(&mut self) -> bool {
        self.assert_owner();
        let result = self.tracker.touch_cancelled();
        self.apply(result.effects);
        result.handled
    }

    /// When [`poll_long_press`](Self::poll_long_press) should next be called.
    pub fn long_press_deadline(&self) -> Option<Instant> {
        self.tracker.long_press_deadline()
    }

    /// Fires a pending long press whose deadline has passed.
    pub fn poll_long_press(&mut self, now: Instant) {
        self.assert_owner();
        let layout = self.layout.clone();
        let effects = self.tracker.poll_long_press(layout.as_deref(), now);
        self.apply(effects);
    }

    fn assert_owner(&self) {
        debug_assert_eq!(
            thread::current().id(),
            self.owner,
            "TextView used off its owning thread"
        );
    }

    fn invalidate(&mut self) {
        self.pipeline.cancel();
        self.layout_stale = true;
        self.needs_display = true;
        // The tracked highlight refers to the old text; the next display shows the new one.
        let _ = self.tracker.touch_cancelled();
        self.overlay = None;
        self.host.intrinsic_size_changed();
    }

    /// Offset of the layout inside the view.
    fn content_offset(&self) -> Vec2 {
        let Some(layout) = &self.layout else {
            return Vec2::ZERO;
        };
        alignment_offset(
            self.container.size,
            layout.text_bounding_size(),
            self.options.vertical_alignment,
            layout.is_vertical(),
        )
    }

    /// Rebuilds and presents synchronously if the committed layout is stale.
    fn ensure_layout(&mut self) {
        if self.layout_stale {
            trace!("touch on stale layout; rebuilding synchronously");
            self.display(false);
        }
    }

    fn request(&self) -> DrawRequest {
        DrawRequest {
            size: self.container.size,
            vertical_alignment: self.options.vertical_alignment,
            debug: debug::shared_options().filter(|options| options.needs_draw()),
            ..DrawRequest::default()
        }
    }

    fn display(&mut self, asynchronous: bool) {
        self.needs_display = false;
        let shown_overlay = self
            .overlay
            .as_ref()
            .filter(|overlay| overlay.visible)
            .map(|overlay| overlay.layout.clone());
        let (layout, asynchronous) = match shown_overlay {
            Some(layout) => (LayoutSource::Cached(layout), false),
            None if self.layout_stale => (
                LayoutSource::Build {
                    text: (!self.text.is_empty()).then(|| Arc::clone(&self.text)),
                    container: self.container.clone(),
                    context: self.context.clone(),
                },
                asynchronous,
            ),
            None => (LayoutSource::Cached(self.layout.clone()), asynchronous),
        };
        let transition = (asynchronous && self.options.fade_on_async_display)
            .then_some(Transition::Fade(ASYNC_FADE));
        if asynchronous
            && self.layout_stale
            && self.options.clear_contents_before_async_display
        {
            self.host.clear_contents();
        }
        let task = DisplayTask {
            layout,
            draw: self.request(),
            transition,
        };
        if let Some(DisplayOutcome::Completed(done)) = self.pipeline.submit(task, asynchronous) {
            self.commit(done);
        }
    }

    fn commit(&mut self, done: Completed) {
        trace!("committing display request {}", done.generation);
        if done.rebuilt {
            self.layout = done.layout.clone();
            self.layout_stale = false;
        }
        let changes = reconcile(&self.attached, done.layout.as_deref(), done.list.transform);
        for content in &changes.detach {
            match *content {
                AttachmentContent::View(view) => self.host.detach_view(view),
                AttachmentContent::Layer(layer) => self.host.detach_layer(layer),
                AttachmentContent::Image(_) => {}
            }
        }
        self.attached.clear();
        for &(content, rect) in &changes.place {
            match content {
                AttachmentContent::View(view) => self.host.attach_view(view, rect),
                AttachmentContent::Layer(layer) => self.host.attach_layer(layer, rect),
                AttachmentContent::Image(_) => continue,
            }
            self.attached.push(content);
        }
        self.host.present(&done.list, done.transition);
    }

    fn apply(&mut self, effects: Effects) {
        for effect in effects {
            match effect {
                InteractionEffect::ShowHighlight { range, highlight } => {
                    self.show_highlight(range, highlight);
                }
                InteractionEffect::HideHighlight { animated } => {
                    if let Some(overlay) = &mut self.overlay {
                        overlay.visible = false;
                        self.redisplay_after_highlight(animated);
                    }
                }
                InteractionEffect::RemoveHighlight { animated } => {
                    if self.overlay.take().is_some_and(|overlay| overlay.visible) {
                        self.redisplay_after_highlight(animated);
                    }
                }
                InteractionEffect::Dispatch { gesture, target } => self.dispatch(gesture, target),
            }
        }
    }

    fn show_highlight(&mut self, range: Range<usize>, highlight: Highlight) {
        let reusable = self
            .overlay
            .as_ref()
            .is_some_and(|overlay| overlay.range == range && overlay.highlight == highlight);
        if !reusable {
            let mut text = RichText::clone(&self.text);
            let layout = match text.apply_deltas(range.clone(), &highlight.attributes) {
                Ok(()) => self.context.layout(text, &self.container).map(Arc::new),
                Err(err) => {
                    warn!("highlight range {range:?} does not fit the text: {err}");
                    self.layout.clone()
                }
            };
            self.overlay = Some(Overlay {
                range,
                highlight,
                layout,
                visible: false,
            });
        }
        let Some(overlay) = &mut self.overlay else {
            return;
        };
        overlay.visible = true;
        let layout = overlay.layout.clone();
        let task = DisplayTask {
            layout: LayoutSource::Cached(layout),
            draw: self.request(),
            transition: None,
        };
        if let Some(DisplayOutcome::Completed(done)) = self.pipeline.submit(task, false) {
            self.commit(done);
        }
    }

    fn redisplay_after_highlight(&mut self, animated: bool) {
        let transition = (animated && self.options.fade_on_highlight)
            .then_some(Transition::Fade(HIGHLIGHT_FADE));
        let task = DisplayTask {
            layout: LayoutSource::Cached(self.layout.clone()),
            draw: self.request(),
            transition,
        };
        if let Some(DisplayOutcome::Completed(done)) = self.pipeline.submit(task, false) {
            self.commit(done);
        }
    }

    fn dispatch(&mut self, gesture: Gesture, target: ActionTarget) {
        let (action, range) = match (&target, gesture) {
            (ActionTarget::Highlight { range, highlight }, Gesture::Tap) => (
                highlight
                    .tap_action
                    .clone()
                    .or_else(|| self.actions.highlight_tap.clone()),
                Some(range.clone()),
            ),
            (ActionTarget::Highlight { range, highlight }, Gesture::LongPress) => (
                highlight
                    .long_press_action
                    .clone()
                    .or_else(|| self.actions.highlight_long_press.clone()),
                Some(range.clone()),
            ),
            (ActionTarget::Text { range }, Gesture::Tap) => {
                (self.actions.text_tap.clone(), range.clone())
            }
            (ActionTarget::Text { range }, Gesture::LongPress) => {
                (self.actions.text_long_press.clone(), range.clone())
            }
        };
        let Some(action) = action else {
            return;
        };
        let offset = self.content_offset();
        let rect = range.clone().and_then(|range| {
            let rect = self.layout.as_ref()?.rect_for_range(range)?;
            Some(rect + offset)
        });
        trace!("dispatching {gesture:?} for {range:?}");
        action(&TextActionEvent {
            text: Arc::clone(&self.text),
            range,
            rect,
        });
    }
}

impl<H> Drop for TextView<H> {
    fn drop(&mut self) {
        debug::remove_listener(self.debug_listener);
    }
}
