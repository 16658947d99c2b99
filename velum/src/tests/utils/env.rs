// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::string::String;
use std::sync::Arc;

use peniko::kurbo::Size;
use velum_text::{
    Attachment, AttachmentAlignment, AttachmentContent, FontMetrics, Highlight, RichText,
};

use crate::{Container, Layout, LayoutContext};

/// Advance of a narrow character in the default font.
pub(crate) const ADVANCE: f64 = 8.0;
/// Height of a line in the default font.
pub(crate) const LINE_HEIGHT: f64 = 16.0;

// Creates a new instance of TestEnv named after the calling function.
#[macro_export]
macro_rules! testenv {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        let name = &name[..name.len() - 3];
        let name = &name[name.rfind(':').map(|x| x + 1).unwrap_or(0)..];

        $crate::tests::utils::TestEnv::new(name)
    }};
}

pub(crate) struct TestEnv {
    test_name: String,
    cx: LayoutContext,
}

impl TestEnv {
    pub(crate) fn new(test_name: &str) -> Self {
        Self {
            test_name: test_name.into(),
            cx: LayoutContext::default(),
        }
    }

    pub(crate) fn cx(&self) -> &LayoutContext {
        &self.cx
    }

    /// Lays out `text`, failing the test when no layout is produced.
    pub(crate) fn layout(&self, text: RichText, container: &Container) -> Layout {
        self.cx
            .layout(Arc::new(text), container)
            .unwrap_or_else(|| panic!("{}: text produced no layout", self.test_name))
    }

    /// Lays out `text` at `width` with unbounded height.
    pub(crate) fn layout_width(&self, text: &str, width: f64) -> Layout {
        self.layout(RichText::new(text), &Container::with_width(width))
    }

    /// `prefix`, then a `size` placeholder for `content`, then `suffix`.
    pub(crate) fn with_attachment(
        &self,
        prefix: &str,
        content: AttachmentContent,
        size: Size,
        suffix: &str,
    ) -> RichText {
        let mut text = RichText::new(prefix);
        text.push_rich(&RichText::attachment_string(
            Attachment::new(content, size),
            size,
            FontMetrics {
                ascent: 12.0,
                descent: 4.0,
                leading: 0.0,
            },
            AttachmentAlignment::Center,
        ));
        text.push_str(suffix);
        text
    }

    /// `text` with `highlight` over the first occurrence of `word`.
    pub(crate) fn with_highlight(&self, text: &str, word: &str, highlight: Highlight) -> RichText {
        let start = text
            .find(word)
            .unwrap_or_else(|| panic!("{}: {word:?} not in {text:?}", self.test_name));
        let mut rich = RichText::new(text);
        rich.set_highlight(Some(highlight), Some(start..start + word.len()))
            .unwrap();
        rich
    }
}
