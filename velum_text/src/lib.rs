// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Velum Text is the rich text model of the Velum layout engine.
//!
//! A [`RichText`] is a string plus one interval map per [`AttributeKind`]. Ranges are UTF-8
//! byte offsets and are validated on entry; invalid ranges are reported as an [`Error`].
//!
//! Attributes come in two flavours. Continuous attributes (fonts, colors, decorations, ...)
//! extend into text inserted next to them and merge with equal neighbours. Discontinuous
//! attributes ([`AttributeKind::is_discontinuous`]) describe a single object anchored on a
//! range, such as an inline [`Attachment`], and never do either.
//!
//! ## Features
//!
//! - `std` (enabled by default): Use the standard library for floating point math.
//! - `libm`: Use `libm` for floating point math when `std` is disabled.
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
#![no_std]

extern crate alloc;

mod attribute;
mod error;
mod paragraph;
mod rich_text;
mod segments;
mod setters;
mod spans;
mod text_range;

pub use crate::attribute::{
    Attachment, AttachmentAlignment, AttachmentContent, Attribute, AttributeDelta, AttributeKind,
    BackedString, Binding, Border, ContentMode, Decoration, Font, FontMetrics, Highlight,
    ImageHandle, LayerId, LinePattern, LineStyle, RubyAlignment, RubyAnnotation, RunDelegate,
    Shadow, TextAction, TextActionEvent, UserData, ViewId,
};
pub use crate::error::{BoundaryInfo, Endpoint, Error, ErrorKind};
pub use crate::paragraph::{BaseDirection, ParagraphStyle, TextAlignment};
pub use crate::rich_text::{RichText, ATTACHMENT_CHARACTER};
pub use crate::segments::{RunStyle, StyleRun, StyleRuns};
pub use crate::text_range::TextRange;
