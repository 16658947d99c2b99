// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Process wide debug overlay settings.
//!
//! Any number of components can listen for changes. Listeners are stored in an arena and
//! addressed by a [`ListenerHandle`]; a handle whose slot has since been reused no longer
//! matches, so stale handles are harmless. Listeners must be removed explicitly.
//!
//! ```
//! use velum::debug::{self, DebugOptions};
//!
//! let handle = debug::add_listener(|options| {
//!     let _ = options.map(DebugOptions::needs_draw);
//! });
//! assert!(debug::remove_listener(handle));
//! assert!(!debug::remove_listener(handle));
//! ```

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use parking_lot::Mutex;
use peniko::Color;

/// Colors of the debug overlay. `None` hides an element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DebugOptions {
    /// Line baselines.
    pub baseline: Option<Color>,
    /// Outline of the text bounds.
    pub frame_border: Option<Color>,
    /// Fill of the text bounds.
    pub frame_fill: Option<Color>,
    /// Outline of each line.
    pub line_border: Option<Color>,
    /// Fill of each line.
    pub line_fill: Option<Color>,
    /// Line index labels.
    pub line_number: Option<Color>,
    /// Outline of each run.
    pub run_border: Option<Color>,
    /// Fill of each run.
    pub run_fill: Option<Color>,
    /// Run index labels.
    pub run_number: Option<Color>,
    /// Outline of each glyph.
    pub glyph_border: Option<Color>,
    /// Fill of each glyph.
    pub glyph_fill: Option<Color>,
}

impl DebugOptions {
    /// Returns `true` if any element is shown.
    pub fn needs_draw(&self) -> bool {
        [
            self.baseline,
            self.frame_border,
            self.frame_fill,
            self.line_border,
            self.line_fill,
            self.line_number,
            self.run_border,
            self.run_fill,
            self.run_number,
            self.glyph_border,
            self.glyph_fill,
        ]
        .iter()
        .any(Option::is_some)
    }
}

/// Identifies a registered listener.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerHandle {
    index: u32,
    generation: u32,
}

impl ListenerHandle {
    /// Slot of the listener.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when the listener was added.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

type Listener = Arc<dyn Fn(Option<&DebugOptions>) + Send + Sync>;

struct Slot {
    generation: u32,
    listener: Option<Listener>,
}

struct Registry {
    options: Option<DebugOptions>,
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("options", &self.options)
            .field("slots", &self.slots.len())
            .field("free", &self.free)
            .finish()
    }
}

static REGISTRY: Mutex<Registry> = Mutex::new(Registry {
    options: None,
    slots: Vec::new(),
    free: Vec::new(),
});

/// Replaces the shared options and notifies every listener.
///
/// Listeners run on the calling thread, after the registry lock is released, so they may
/// call back into this module.
pub fn set_shared_options(options: Option<DebugOptions>) {
    let listeners: Vec<Listener> = {
        let mut registry = REGISTRY.lock();
        registry.options.clone_from(&options);
        registry
            .slots
            .iter()
            .filter_map(|slot| slot.listener.clone())
            .collect()
    };
    log::trace!("broadcasting debug options to {} listeners", listeners.len());
    for listener in listeners {
        listener(options.as_ref());
    }
}

/// The current shared options.
pub fn shared_options() -> Option<DebugOptions> {
    REGISTRY.lock().options.clone()
}

/// Registers a listener for option changes.
pub fn add_listener(
    listener: impl Fn(Option<&DebugOptions>) + Send + Sync + 'static,
) -> ListenerHandle {
    let mut registry = REGISTRY.lock();
    let listener: Listener = Arc::new(listener);
    if let Some(index) = registry.free.pop() {
        let slot = &mut registry.slots[index as usize];
        slot.listener = Some(listener);
        return ListenerHandle {
            index,
            generation: slot.generation,
        };
    }
    let index = u32::try_from(registry.slots.len()).unwrap_or(u32::MAX);
    registry.slots.push(Slot {
        generation: 0,
        listener: Some(listener),
    });
    ListenerHandle {
        index,
        generation: 0,
    }
}

/// Removes a listener. Returns `false` if the handle is stale.
pub fn remove_listener(handle: ListenerHandle) -> bool {
    let mut registry = REGISTRY.lock();
    let Some(slot) = registry.slots.get_mut(handle.index as usize) else {
        return false;
    };
    if slot.generation != handle.generation || slot.listener.is_none() {
        return false;
    }
    slot.listener = None;
    slot.generation = slot.generation.wrapping_add(1);
    registry.free.push(handle.index);
    true
}

/// Clears the shared options and drops every listener without notifying it.
///
/// Outstanding handles become stale.
pub fn reset() {
    let mut registry = REGISTRY.lock();
    registry.options = None;
    let mut freed = Vec::new();
    for (index, slot) in registry.slots.iter_mut().enumerate() {
        if slot.listener.take().is_some() {
            slot.generation = slot.generation.wrapping_add(1);
            freed.extend(u32::try_from(index).ok());
        }
    }
    registry.free.extend(freed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn handles_go_stale_when_slots_are_reused() {
        let first = add_listener(|_| {});
        assert!(remove_listener(first));
        let second = add_listener(|_| {});
        assert!(!remove_listener(first));
        assert!(remove_listener(second));
    }

    #[test]
    fn listeners_see_broadcasts() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let handle = add_listener(move |options| {
            if options.is_some_and(|o| o.baseline == Some(Color::WHITE)) {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });
        set_shared_options(Some(DebugOptions {
            baseline: Some(Color::WHITE),
            ..DebugOptions::default()
        }));
        assert!(calls.load(Ordering::SeqCst) >= 1, "listener was not called");
        assert!(remove_listener(handle));
        set_shared_options(None);
    }

    #[test]
    fn empty_options_draw_nothing() {
        assert!(!DebugOptions::default().needs_draw());
        let options = DebugOptions {
            glyph_fill: Some(Color::BLACK),
            ..DebugOptions::default()
        };
        assert!(options.needs_draw());
    }
}
