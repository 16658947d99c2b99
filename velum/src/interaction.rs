// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Touch tracking and highlight activation.
//!
//! [`HighlightTracker`] is a pure state machine: it is fed touch events in layout coordinates
//! and returns the [`InteractionEffect`]s the view should apply. It never calls callbacks or
//! touches view state itself, which keeps it testable without a host.
//!
//! ```text
//! Idle --began (highlight or handler)--> Tracking --ended/cancelled/long press--> Idle
//! ```

use core::ops::Range;
use std::time::{Duration, Instant};

use peniko::kurbo::{Point, Vec2};
use smallvec::SmallVec;
use velum_text::Highlight;

use crate::Layout;

/// Tuning of the tracker.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrackerConfig {
    /// How long a touch must be held to count as a long press.
    pub long_press_duration: Duration,
    /// Movement along each axis that turns a touch into a drag.
    pub move_threshold: Vec2,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            long_press_duration: Duration::from_millis(500),
            move_threshold: Vec2::new(9.0, 9.0),
        }
    }
}

/// Which view-wide handlers are registered.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Handlers {
    /// Tap anywhere on the text.
    pub text_tap: bool,
    /// Long press anywhere on the text.
    pub text_long_press: bool,
    /// Tap on a highlight without its own tap action.
    pub highlight_tap: bool,
    /// Long press on a highlight without its own long press action.
    pub highlight_long_press: bool,
}

/// Kind of gesture that was recognized.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Gesture {
    /// Touch down and up without moving.
    Tap,
    /// Touch held in place.
    LongPress,
}

/// What a gesture applies to.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionTarget {
    /// A highlight and its full range.
    Highlight {
        /// Range the highlight covers.
        range: Range<usize>,
        /// The highlight.
        highlight: Highlight,
    },
    /// The text as a whole, with the character under the touch if there is one.
    Text {
        /// Range of the touched character.
        range: Option<Range<usize>>,
    },
}

/// An instruction for the view.
#[derive(Clone, Debug, PartialEq)]
pub enum InteractionEffect {
    /// Show the pressed state of a highlight, without animation.
    ShowHighlight {
        /// Range of the highlight.
        range: Range<usize>,
        /// The highlight.
        highlight: Highlight,
    },
    /// Hide the pressed state but keep tracking the highlight.
    HideHighlight {
        /// Fade out if fading is enabled.
        animated: bool,
    },
    /// Forget the highlight and drop its pressed state.
    RemoveHighlight {
        /// Fade out if fading is enabled.
        animated: bool,
    },
    /// Call the handler of a gesture.
    Dispatch {
        /// Recognized gesture.
        gesture: Gesture,
        /// What it applies to.
        target: ActionTarget,
    },
}

/// Effects of one event.
pub type Effects = SmallVec<[InteractionEffect; 2]>;

/// Result of feeding one touch event.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TouchResult {
    /// The tracker consumed the event; it must not be forwarded.
    pub handled: bool,
    /// What the view should do.
    pub effects: Effects,
}

impl TouchResult {
    fn ignored() -> Self {
        Self::default()
    }

    fn handled(effects: Effects) -> Self {
        Self {
            handled: true,
            effects,
        }
    }
}

#[derive(Clone, Debug)]
struct Tracking {
    start: Point,
    began_at: Instant,
    moved: bool,
    long_press_armed: bool,
    handlers: Handlers,
    highlight: Option<(Range<usize>, Highlight)>,
    highlight_shown: bool,
}

/// Turns touches into highlight effects and gesture dispatches.
#[derive(Clone, Debug, Default)]
pub struct HighlightTracker {
    config: TrackerConfig,
    tracking: Option<Tracking>,
}

impl HighlightTracker {
    /// Creates a tracker.
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            tracking: None,
        }
    }

    /// The configuration.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Returns `true` between a handled touch down and the end of the gesture.
    pub fn is_tracking(&self) -> bool {
        self.tracking.is_some()
    }

    /// Returns `true` while a highlight's pressed state is shown.
    pub fn is_showing_highlight(&self) -> bool {
        self.tracking.as_ref().is_some_and(|t| t.highlight_shown)
    }

    /// The highlight being tracked, if any.
    pub fn highlight(&self) -> Option<(&Range<usize>, &Highlight)> {
        let (range, highlight) = self.tracking.as_ref()?.highlight.as_ref()?;
        Some((range, highlight))
    }

    /// Touch down at `point` in layout coordinates.
    ///
    /// Without a highlight under the point and without view-wide handlers the touch is not
    /// handled and should be forwarded.
    pub fn touch_began(
        &mut self,
        layout: Option<&Layout>,
        point: Point,
        now: Instant,
        handlers: Handlers,
    ) -> TouchResult {
        self.tracking = None;
        let highlight = highlight_at(layout, point);
        if highlight.is_none() && !handlers.text_tap && !handlers.text_long_press {
            return TouchResult::ignored();
        }
        let mut effects = Effects::new();
        if let Some((range, highlight)) = &highlight {
            effects.push(InteractionEffect::ShowHighlight {
                range: range.clone(),
                highlight: highlight.clone(),
            });
        }
        log::trace!("tracking touch at {point:?}, highlight: {}", highlight.is_some());
        self.tracking = Some(Tracking {
            start: point,
            began_at: now,
            moved: false,
            long_press_armed: true,
            handlers,
            highlight_shown: highlight.is_some(),
            highlight,
        });
        TouchResult::handled(effects)
    }

    /// Touch moved to `point`.
    pub fn touch_moved(&mut self, layout: Option<&Layout>, point: Point) -> TouchResult {
        let threshold = self.config.move_threshold;
        let Some(tracking) = self.tracking.as_mut() else {
            return TouchResult::ignored();
        };
        let mut effects = Effects::new();
        if !tracking.moved {
            let delta = point - tracking.start;
            let (dx, dy) = (delta.x.abs(), delta.y.abs());
            let exceeded = if dx > dy {
                dx > threshold.x
            } else {
                dy > threshold.y
            };
            if exceeded {
                tracking.moved = true;
                tracking.long_press_armed = false;
            }
        }
        if tracking.moved {
            if let Some((range, highlight)) = &tracking.highlight {
                let still_over = highlight_at(layout, point)
                    .is_some_and(|(hit, found)| hit == *range && found == *highlight);
                if still_over && !tracking.highlight_shown {
                    tracking.highlight_shown = true;
                    effects.push(InteractionEffect::ShowHighlight {
                        range: range.clone(),
                        highlight: highlight.clone(),
                    });
                } else if !still_over && tracking.highlight_shown {
                    tracking.highlight_shown = false;
                    effects.push(InteractionEffect::HideHighlight { animated: true });
                }
            }
        }
        TouchResult::handled(effects)
    }

    /// Touch lifted at `point`.
    pub fn touch_ended(&mut self, layout: Option<&Layout>, point: Point) -> TouchResult {
        let Some(tracking) = self.tracking.take() else {
            return TouchResult::ignored();
        };
        let mut effects = Effects::new();
        if !tracking.moved && tracking.handlers.text_tap {
            effects.push(InteractionEffect::Dispatch {
                gesture: Gesture::Tap,
                target: ActionTarget::Text {
                    range: character_at(layout, tracking.start),
                },
            });
        }
        if let Some((range, highlight)) = tracking.highlight {
            let still_over = !tracking.moved
                || highlight_at(layout, point)
                    .is_some_and(|(hit, found)| hit == range && found == highlight);
            let has_action = highlight.tap_action.is_some() || tracking.handlers.highlight_tap;
            if still_over && has_action {
                effects.push(InteractionEffect::Dispatch {
                    gesture: Gesture::Tap,
                    target: ActionTarget::Highlight { range, highlight },
                });
            }
            effects.push(InteractionEffect::RemoveHighlight { animated: true });
        }
        TouchResult::handled(effects)
    }

    /// Touch cancelled by the system. Nothing is dispatched.
    pub fn touch_cancelled(&mut self) -> TouchResult {
        let Some(tracking) = self.tracking.take() else {
            return TouchResult::ignored();
        };
        let mut effects = Effects::new();
        if tracking.highlight.is_some() {
            effects.push(InteractionEffect::RemoveHighlight { animated: true });
        }
        TouchResult::handled(effects)
    }

    /// When the next long press check is due, if one is armed.
    pub fn long_press_deadline(&self) -> Option<Instant> {
        let tracking = self.tracking.as_ref()?;
        tracking
            .long_press_armed
            .then(|| tracking.began_at + self.config.long_press_duration)
    }

    /// Fires the long press once its deadline has passed.
    ///
    /// A long press consumes the gesture: tracking ends when it is dispatched.
    pub fn poll_long_press(&mut self, layout: Option<&Layout>, now: Instant) -> Effects {
        let mut effects = Effects::new();
        let Some(deadline) = self.long_press_deadline() else {
            return effects;
        };
        let Some(tracking) = self.tracking.as_mut() else {
            return effects;
        };
        if now < deadline || tracking.moved {
            return effects;
        }
        tracking.long_press_armed = false;
        let handlers = tracking.handlers;
        if let Some((range, highlight)) = &tracking.highlight {
            if highlight.long_press_action.is_some() || handlers.highlight_long_press {
                effects.push(InteractionEffect::Dispatch {
                    gesture: Gesture::LongPress,
                    target: ActionTarget::Highlight {
                        range: range.clone(),
                        highlight: highlight.clone(),
                    },
                });
                effects.push(InteractionEffect::RemoveHighlight { animated: true });
                self.tracking = None;
            }
        } else if handlers.text_long_press {
            effects.push(InteractionEffect::Dispatch {
                gesture: Gesture::LongPress,
                target: ActionTarget::Text {
                    range: character_at(layout, tracking.start),
                },
            });
            self.tracking = None;
        }
        effects
    }
}

fn highlight_at(layout: Option<&Layout>, point: Point) -> Option<(Range<usize>, Highlight)> {
    let (range, highlight) = layout?.highlight_at_point(point)?;
    Some((range, highlight.clone()))
}

/// Range of the character nearest to `point`.
fn character_at(layout: Option<&Layout>, point: Point) -> Option<Range<usize>> {
    let layout = layout?;
    let index = layout.text_index_at_point(point)?;
    let text = layout.text().as_str();
    let len = text.get(index..)?.chars().next().map(char::len_utf8)?;
    Some(index..index + len)
}
