// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Velum lays out, draws and hit tests rich text for interactive text views.
//!
//! The engine is built in layers:
//!
//! - A [`RichText`](velum_text::RichText) (from [`velum_text`]) is placed in a [`Container`]
//!   by a [`LayoutContext`], producing an immutable [`Layout`] made of [`Line`]s.
//! - [`draw_layout`] records a layout as a [`DisplayList`] for the host to paint.
//! - [`HighlightTracker`] turns touches into highlight feedback and gesture dispatches.
//! - [`DisplayPipeline`] runs layout and drawing on a [`WorkerPool`], discarding superseded
//!   requests, and [`TextView`] commits the results to a [`ViewHost`].
//!
//! Shaping is a seam: [`shape::Shaper`] is implemented by the bundled
//! [`MonospaceShaper`](shape::MonospaceShaper) and can be backed by a platform shaper.
//!
//! ```
//! use std::sync::Arc;
//! use velum::{Container, LayoutContext};
//! use velum::velum_text::RichText;
//!
//! let cx = LayoutContext::default();
//! let text = Arc::new(RichText::new("Hello, world"));
//! let layout = cx.layout(text, &Container::with_width(400.0)).unwrap();
//! assert_eq!(layout.line_count(), 1);
//! ```

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

pub use peniko;
pub use velum_text;

mod container;
mod display;
mod draw;
mod interaction;
mod layout;
mod view;

pub mod coords;
pub mod debug;
pub mod shape;

#[cfg(test)]
mod tests;

pub use container::{
    Container, Exclusion, LinePosition, LinePositionModifier, SimpleLinePositionModifier,
    TruncationType,
};
pub use display::{
    reconcile, Completed, DisplayOutcome, DisplayPipeline, DisplayTask, LayoutSource,
    Reconciliation, Transition, WorkerPool, ASYNC_FADE, HIGHLIGHT_FADE, MAX_WORKERS,
};
pub use draw::{
    draw_layout, CancelToken, Cancelled, DebugItem, DecorationItem, DecorationKind, DisplayItem,
    DisplayList, DrawRequest, GlyphPass, GlyphRunItem, PositionedGlyph, VerticalAlignment,
};
pub use interaction::{
    ActionTarget, Effects, Gesture, Handlers, HighlightTracker, InteractionEffect, TouchResult,
    TrackerConfig,
};
pub use layout::{
    AttachmentRecord, DrawNeeds, GlyphDrawMode, GlyphRect, Layout, LayoutContext, Line,
    LineAttachment, RotateRange, RunRotateRanges, Truncation, VerticalGlyphTable,
};
pub use view::{DisplayOptions, TextView, ViewActions, ViewHost};
