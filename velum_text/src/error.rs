// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

/// Error returned when a caller-provided range can't be used with a [`RichText`].
///
/// Carries a non-exhaustive [`ErrorKind`] plus the attempted range and, for
/// boundary failures, the UTF-8 character that the offending index falls into.
///
/// [`RichText`]: crate::RichText
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    range: Range<usize>,
    len: usize,
    boundary: Option<BoundaryInfo>,
}

#[expect(
    clippy::len_without_is_empty,
    reason = "`Error::len` reports the text length at the time of failure, not a collection size."
)]
impl Error {
    /// The machine-readable category for this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The range that was rejected.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// The length in bytes of the text the range was checked against.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Extra details for [`ErrorKind::NotOnCharBoundary`].
    pub fn boundary(&self) -> Option<BoundaryInfo> {
        self.boundary
    }

    pub(crate) fn new(kind: ErrorKind, range: Range<usize>, len: usize) -> Self {
        Self {
            kind,
            range,
            len,
            boundary: None,
        }
    }

    pub(crate) fn not_on_char_boundary(
        text: &str,
        range: Range<usize>,
        which: Endpoint,
        index: usize,
    ) -> Self {
        let (char_start, char_end) = enclosing_char(text, index);
        Self {
            kind: ErrorKind::NotOnCharBoundary,
            len: text.len(),
            range,
            boundary: Some(BoundaryInfo {
                which,
                index,
                char_start,
                char_end,
            }),
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let Range { start, end } = self.range;
        match self.kind {
            ErrorKind::InvalidBounds => {
                write!(f, "range {start}..{end} out of bounds for len {}", self.len)
            }
            ErrorKind::InvalidRange => write!(f, "invalid range {start}..{end}: start > end"),
            ErrorKind::NotOnCharBoundary => match self.boundary {
                Some(b) => write!(
                    f,
                    "range {start}..{end}: {} index {} not on UTF-8 boundary (char {}..{})",
                    b.which.as_str(),
                    b.index,
                    b.char_start,
                    b.char_end
                ),
                None => write!(f, "range {start}..{end} not on UTF-8 boundary"),
            },
            ErrorKind::KindMismatch => write!(
                f,
                "attribute value does not match the requested kind for range {start}..{end}"
            ),
        }
    }
}

impl core::error::Error for Error {}

/// The non-exhaustive category of an [`Error`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The range reaches past the end of the text.
    InvalidBounds,

    /// The range had `start > end`.
    InvalidRange,

    /// Either endpoint was not aligned to a UTF-8 character boundary.
    NotOnCharBoundary,

    /// An attribute value was supplied for a different [`AttributeKind`].
    ///
    /// [`AttributeKind`]: crate::AttributeKind
    KindMismatch,
}

/// Which endpoint of a range failed boundary validation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    /// The `start` endpoint.
    Start,

    /// The `end` endpoint.
    End,
}

impl Endpoint {
    fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

/// Details about an index that was not on a UTF-8 character boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BoundaryInfo {
    /// Which endpoint was invalid.
    pub which: Endpoint,

    /// The offending byte index.
    pub index: usize,

    /// The start byte index of the enclosing codepoint.
    pub char_start: usize,

    /// The end byte index (exclusive) of the enclosing codepoint.
    pub char_end: usize,
}

fn enclosing_char(text: &str, index: usize) -> (usize, usize) {
    if index > text.len() || text.is_char_boundary(index) {
        return (index, index);
    }
    // A codepoint is at most 4 bytes, so both searches terminate quickly.
    let start = (0..index)
        .rev()
        .find(|&i| text.is_char_boundary(i))
        .unwrap_or(0);
    let end = (index + 1..=text.len())
        .find(|&i| text.is_char_boundary(i))
        .unwrap_or(text.len());
    (start, end)
}
