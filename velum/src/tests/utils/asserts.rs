// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Various helper functions to assert truths during testing.

use std::string::String;
use std::vec::Vec;

use peniko::kurbo::Rect;

use crate::{DisplayItem, DisplayList, Layout, Line};

const EPSILON: f64 = 1e-6;

/// Assert that `inner` lies within `outer`, edges included.
pub(crate) fn assert_rect_within(inner: Rect, outer: Rect, case: &str) {
    assert!(
        inner.x0 >= outer.x0 - EPSILON
            && inner.y0 >= outer.y0 - EPSILON
            && inner.x1 <= outer.x1 + EPSILON
            && inner.y1 <= outer.y1 + EPSILON,
        "{case}: {inner:?} is not within {outer:?}"
    );
}

/// Assert that two layouts have the same lines and bounds.
pub(crate) fn assert_same_geometry(a: &Layout, b: &Layout, case: &str) {
    assert_eq!(a.line_count(), b.line_count(), "{case} line count mismatch");
    assert_eq!(a.row_count(), b.row_count(), "{case} row count mismatch");
    for (la, lb) in a.lines().zip(b.lines()) {
        assert_eq!(
            la.text_range(),
            lb.text_range(),
            "{case} line {} range mismatch",
            la.index()
        );
        assert_eq!(
            la.bounding_box(),
            lb.bounding_box(),
            "{case} line {} bounds mismatch",
            la.index()
        );
    }
    assert_eq!(
        a.text_bounding_size(),
        b.text_bounding_size(),
        "{case} bounding size mismatch"
    );
    assert_eq!(
        a.text_bounding_rect(),
        b.text_bounding_rect(),
        "{case} bounding rect mismatch"
    );
}

/// The characters a line shows, token included.
///
/// Relies on the bundled shaper using code points as glyph identifiers.
pub(crate) fn line_string(line: Line<'_>) -> String {
    line.runs()
        .iter()
        .flat_map(|run| run.glyphs.iter())
        .filter_map(|glyph| char::from_u32(glyph.id))
        .collect()
}

/// Items of a display list without the debug overlay.
///
/// Debug options are process wide, so another test may have turned them on.
pub(crate) fn paint_items(list: &DisplayList) -> Vec<&DisplayItem> {
    list.items
        .iter()
        .filter(|item| !matches!(item, DisplayItem::Debug(_)))
        .collect()
}
