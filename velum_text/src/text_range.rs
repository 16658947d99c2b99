// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use crate::{Endpoint, Error, ErrorKind};

/// A validated byte range into the string of a [`RichText`].
///
/// Invariants:
///
/// - `start <= end`
/// - both endpoints are within the text
/// - both endpoints lie on UTF-8 codepoint boundaries
///
/// A `TextRange` does not remember which text it was validated against; reuse it only with
/// the same content.
///
/// ```
/// use velum_text::{RichText, TextRange};
///
/// let text = RichText::new("Hello!");
/// let range = TextRange::new(text.as_str(), 0..5).unwrap();
/// assert_eq!(range.as_range(), 0..5);
/// ```
///
/// [`RichText`]: crate::RichText
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextRange {
    start: usize,
    end: usize,
}

impl TextRange {
    /// Validates `range` against `text`.
    pub fn new(text: &str, range: Range<usize>) -> Result<Self, Error> {
        let len = text.len();
        if range.start > range.end {
            return Err(Error::new(ErrorKind::InvalidRange, range, len));
        }
        if range.end > len {
            return Err(Error::new(ErrorKind::InvalidBounds, range, len));
        }
        if !text.is_char_boundary(range.start) {
            let index = range.start;
            return Err(Error::not_on_char_boundary(
                text,
                range,
                Endpoint::Start,
                index,
            ));
        }
        if !text.is_char_boundary(range.end) {
            let index = range.end;
            return Err(Error::not_on_char_boundary(text, range, Endpoint::End, index));
        }
        Ok(Self {
            start: range.start,
            end: range.end,
        })
    }

    /// The range covering all of `text`.
    #[must_use]
    pub fn whole(text: &str) -> Self {
        Self {
            start: 0,
            end: text.len(),
        }
    }

    /// Validates `range`, or covers the whole of `text` when `range` is `None`.
    pub fn resolve(text: &str, range: Option<Range<usize>>) -> Result<Self, Error> {
        match range {
            Some(range) => Self::new(text, range),
            None => Ok(Self::whole(text)),
        }
    }

    /// The start byte offset.
    #[must_use]
    #[inline]
    pub const fn start(self) -> usize {
        self.start
    }

    /// The end byte offset (exclusive).
    #[must_use]
    #[inline]
    pub const fn end(self) -> usize {
        self.end
    }

    /// Returns `true` if the range covers no bytes.
    #[must_use]
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Returns this range as a `Range<usize>`.
    #[must_use]
    #[inline]
    pub fn as_range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<TextRange> for Range<usize> {
    #[inline]
    fn from(value: TextRange) -> Self {
        value.as_range()
    }
}
