// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interval storage for one attribute kind.

use alloc::vec::Vec;
use core::ops::Range;

use crate::Attribute;

/// Sorted, non-overlapping spans of one attribute kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct SpanList {
    spans: Vec<(Range<usize>, Attribute)>,
    /// Whether equal neighbours merge into one span.
    coalesce: bool,
}

impl SpanList {
    pub(crate) fn new(coalesce: bool) -> Self {
        Self {
            spans: Vec::new(),
            coalesce,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub(crate) fn as_slice(&self) -> &[(Range<usize>, Attribute)] {
        &self.spans
    }

    /// Index of the span containing `index`.
    fn position(&self, index: usize) -> Option<usize> {
        let ix = self.spans.partition_point(|(range, _)| range.end <= index);
        let (range, _) = self.spans.get(ix)?;
        range.contains(&index).then_some(ix)
    }

    pub(crate) fn get(&self, index: usize) -> Option<(&Range<usize>, &Attribute)> {
        let ix = self.position(index)?;
        let (range, attr) = &self.spans[ix];
        Some((range, attr))
    }

    /// Spans intersecting `range`, in order.
    pub(crate) fn overlapping(
        &self,
        range: Range<usize>,
    ) -> impl Iterator<Item = (&Range<usize>, &Attribute)> + '_ {
        let first = self.spans.partition_point(|(r, _)| r.end <= range.start);
        self.spans[first..]
            .iter()
            .take_while(move |(r, _)| r.start < range.end)
            .map(|(r, a)| (r, a))
    }

    /// Removes all coverage of `range`, splitting spans that straddle its ends.
    pub(crate) fn clear(&mut self, range: Range<usize>) {
        if range.is_empty() || self.spans.is_empty() {
            return;
        }
        let first = self.spans.partition_point(|(r, _)| r.end <= range.start);
        let last = self.spans.partition_point(|(r, _)| r.start < range.end);
        if first >= last {
            return;
        }
        let mut kept = Vec::new();
        for (r, attr) in self.spans.drain(first..last) {
            if r.start < range.start {
                kept.push((r.start..range.start, attr.clone()));
            }
            if r.end > range.end {
                kept.push((range.end..r.end, attr));
            }
        }
        let tail = self.spans.split_off(first);
        self.spans.extend(kept);
        self.spans.extend(tail);
    }

    /// Sets `attr` over `range`, replacing whatever was there.
    pub(crate) fn set(&mut self, range: Range<usize>, attr: Attribute) {
        if range.is_empty() {
            return;
        }
        self.clear(range.clone());
        let mut ix = self.spans.partition_point(|(r, _)| r.start < range.start);
        self.spans.insert(ix, (range, attr));
        if !self.coalesce {
            return;
        }
        if ix > 0 && self.touches(ix - 1) {
            self.spans[ix - 1].0.end = self.spans[ix].0.end;
            self.spans.remove(ix);
            ix -= 1;
        }
        if ix + 1 < self.spans.len() && self.touches(ix) {
            self.spans[ix].0.end = self.spans[ix + 1].0.end;
            self.spans.remove(ix + 1);
        }
    }

    /// Whether span `ix` abuts span `ix + 1` with an equal value.
    fn touches(&self, ix: usize) -> bool {
        let (a, a_attr) = &self.spans[ix];
        let (b, b_attr) = &self.spans[ix + 1];
        a.end == b.start && a_attr == b_attr
    }

    /// Adjusts spans for the replacement of `edit` by `inserted` bytes.
    ///
    /// When `inherit` is set, the inserted bytes take the value found at the first replaced
    /// byte, or at the byte before a pure insertion (the byte after when inserting at 0).
    /// Otherwise they are left uncovered.
    pub(crate) fn replace(&mut self, edit: Range<usize>, inserted: usize, inherit: bool) {
        let source = if !edit.is_empty() {
            Some(edit.start)
        } else if edit.start > 0 {
            Some(edit.start - 1)
        } else if inherit {
            Some(0)
        } else {
            None
        };
        let inherited = source
            .filter(|_| inherit)
            .and_then(|ix| self.get(ix))
            .map(|(_, attr)| attr.clone());

        // Collapse the replaced bytes.
        let removed = edit.len();
        let at = edit.start;
        let map = |p: usize| {
            if p <= edit.start {
                p
            } else if p >= edit.end {
                p - removed
            } else {
                edit.start
            }
        };
        let mut spans = core::mem::take(&mut self.spans);
        for (r, _) in &mut spans {
            *r = map(r.start)..map(r.end);
        }
        spans.retain(|(r, _)| !r.is_empty());

        // Open a gap of `inserted` bytes at `at`.
        for (r, _) in &mut spans {
            if r.start >= at {
                r.start += inserted;
                r.end += inserted;
            } else if r.end > at {
                r.end += inserted;
            }
        }
        self.spans = spans;
        if self.coalesce {
            self.merge_neighbours();
        }

        let gap = at..at + inserted;
        match inherited {
            Some(attr) => self.set(gap, attr),
            None => self.clear(gap),
        }
    }

    /// Copies the spans of `other` into this list, shifted by `offset`.
    ///
    /// The destination range must already be uncovered.
    pub(crate) fn splice_from(&mut self, other: &Self, offset: usize) {
        for (r, attr) in &other.spans {
            self.set(r.start + offset..r.end + offset, attr.clone());
        }
    }

    /// A copy of the spans clipped to `range`, rebased to start at zero.
    pub(crate) fn slice(&self, range: Range<usize>) -> Self {
        let spans = self
            .overlapping(range.clone())
            .map(|(r, attr)| {
                let start = r.start.max(range.start) - range.start;
                let end = r.end.min(range.end) - range.start;
                (start..end, attr.clone())
            })
            .collect();
        Self {
            spans,
            coalesce: self.coalesce,
        }
    }

    fn merge_neighbours(&mut self) {
        let mut merged: Vec<(Range<usize>, Attribute)> = Vec::with_capacity(self.spans.len());
        for (r, attr) in self.spans.drain(..) {
            if let Some((prev, prev_attr)) = merged.last_mut() {
                if prev.end == r.start && *prev_attr == attr {
                    prev.end = r.end;
                    continue;
                }
            }
            merged.push((r, attr));
        }
        self.spans = merged;
    }
}

#[cfg(test)]
mod tests {
    use super::SpanList;
    use crate::Attribute;
    use alloc::vec;
    use alloc::vec::Vec;

    fn ranges(list: &SpanList) -> Vec<(core::ops::Range<usize>, f64)> {
        list.as_slice()
            .iter()
            .map(|(r, a)| match a {
                Attribute::Kern(k) => (r.clone(), *k),
                _ => unreachable!(),
            })
            .collect()
    }

    #[test]
    fn set_splits_existing() {
        let mut list = SpanList::new(true);
        list.set(0..10, Attribute::Kern(1.0));
        list.set(3..5, Attribute::Kern(2.0));
        assert_eq!(ranges(&list), vec![(0..3, 1.0), (3..5, 2.0), (5..10, 1.0)]);
    }

    #[test]
    fn set_coalesces_equal_neighbours() {
        let mut list = SpanList::new(true);
        list.set(0..3, Attribute::Kern(1.0));
        list.set(5..8, Attribute::Kern(1.0));
        list.set(3..5, Attribute::Kern(1.0));
        assert_eq!(ranges(&list), vec![(0..8, 1.0)]);
    }

    #[test]
    fn discontinuous_lists_keep_neighbours_apart() {
        let mut list = SpanList::new(false);
        list.set(0..3, Attribute::Kern(1.0));
        list.set(3..6, Attribute::Kern(1.0));
        assert_eq!(ranges(&list), vec![(0..3, 1.0), (3..6, 1.0)]);
    }

    #[test]
    fn insertion_inherits_preceding_value() {
        let mut list = SpanList::new(true);
        list.set(0..3, Attribute::Kern(1.0));
        list.replace(3..3, 2, true);
        assert_eq!(ranges(&list), vec![(0..5, 1.0)]);
    }

    #[test]
    fn insertion_without_inheritance_splits() {
        let mut list = SpanList::new(true);
        list.set(0..6, Attribute::Kern(1.0));
        list.replace(3..3, 2, false);
        assert_eq!(ranges(&list), vec![(0..3, 1.0), (5..8, 1.0)]);
    }

    #[test]
    fn deletion_shrinks_and_drops() {
        let mut list = SpanList::new(true);
        list.set(0..2, Attribute::Kern(1.0));
        list.set(2..4, Attribute::Kern(2.0));
        list.set(4..8, Attribute::Kern(3.0));
        list.replace(1..5, 0, true);
        assert_eq!(ranges(&list), vec![(0..1, 1.0), (1..4, 3.0)]);
    }

    #[test]
    fn replacement_takes_first_replaced_value() {
        let mut list = SpanList::new(true);
        list.set(2..4, Attribute::Kern(2.0));
        list.replace(2..6, 1, true);
        assert_eq!(ranges(&list), vec![(2..3, 2.0)]);
    }
}
