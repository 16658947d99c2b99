// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::vec::Vec;

use peniko::kurbo::Rect;
use velum_text::{LayerId, ViewId};

use crate::{DisplayList, Transition, ViewHost};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum HostEvent {
    Present {
        list: DisplayList,
        transition: Option<Transition>,
    },
    Clear,
    AttachView(ViewId, Rect),
    DetachView(ViewId),
    AttachLayer(LayerId, Rect),
    DetachLayer(LayerId),
    IntrinsicSizeChanged,
}

/// A host that records every call.
#[derive(Debug, Default)]
pub(crate) struct RecordingHost {
    pub(crate) events: Vec<HostEvent>,
}

impl RecordingHost {
    /// The most recent presented list and its transition.
    pub(crate) fn last_present(&self) -> Option<(&DisplayList, Option<Transition>)> {
        self.events.iter().rev().find_map(|event| match event {
            HostEvent::Present { list, transition } => Some((list, *transition)),
            _ => None,
        })
    }

    pub(crate) fn present_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, HostEvent::Present { .. }))
            .count()
    }

    pub(crate) fn take(&mut self) -> Vec<HostEvent> {
        core::mem::take(&mut self.events)
    }
}

impl ViewHost for RecordingHost {
    fn present(&mut self, list: &DisplayList, transition: Option<Transition>) {
        self.events.push(HostEvent::Present {
            list: list.clone(),
            transition,
        });
    }

    fn clear_contents(&mut self) {
        self.events.push(HostEvent::Clear);
    }

    fn attach_view(&mut self, view: ViewId, rect: Rect) {
        self.events.push(HostEvent::AttachView(view, rect));
    }

    fn detach_view(&mut self, view: ViewId) {
        self.events.push(HostEvent::DetachView(view));
    }

    fn attach_layer(&mut self, layer: LayerId, rect: Rect) {
        self.events.push(HostEvent::AttachLayer(layer, rect));
    }

    fn detach_layer(&mut self, layer: LayerId) {
        self.events.push(HostEvent::DetachLayer(layer));
    }

    fn intrinsic_size_changed(&mut self) {
        self.events.push(HostEvent::IntrinsicSizeChanged);
    }
}
