// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The asynchronous display pipeline.
//!
//! A display request is a [`DisplayTask`]: everything needed to produce a [`DisplayList`],
//! captured by value. Tasks run on a [`WorkerPool`] (or inline when drawing synchronously)
//! and report back through a channel as [`DisplayOutcome`]s, which the owning thread drains
//! with [`DisplayPipeline::drain`].
//!
//! Every request bumps a generation counter. Work of an older generation stops at its next
//! check and its outcome is discarded when drained, so the latest request always wins.

mod pool;

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};
use core::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use hashbrown::HashSet;
use log::trace;
use peniko::kurbo::{Affine, Rect};
use velum_text::{AttachmentContent, RichText};

use crate::draw::{draw_layout, CancelToken, Cancelled, DisplayList, DrawRequest};
use crate::{Container, Layout, LayoutContext};

pub use pool::{WorkerPool, MAX_WORKERS};

/// Fade used when asynchronously drawn content replaces what was shown.
pub const ASYNC_FADE: Duration = Duration::from_millis(80);

/// Fade used when a highlight's pressed state is shown or removed.
pub const HIGHLIGHT_FADE: Duration = Duration::from_millis(150);

/// How the surface changes to new content.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Cross fade over the given time.
    Fade(Duration),
}

/// Where a task gets its layout from.
#[derive(Clone, Debug)]
pub enum LayoutSource {
    /// Reuse a layout that is still valid.
    Cached(Option<Arc<Layout>>),
    /// Build a new layout.
    Build {
        /// Text to lay out; `None` for empty text.
        text: Option<Arc<RichText>>,
        /// Container to lay out in.
        container: Container,
        /// Shaper and tables.
        context: LayoutContext,
    },
}

/// One display request, captured by value.
#[derive(Clone, Debug)]
pub struct DisplayTask {
    /// Layout to draw.
    pub layout: LayoutSource,
    /// Drawing parameters. The pipeline sets the cancel token.
    pub draw: DrawRequest,
    /// Transition to use when the result is presented.
    pub transition: Option<Transition>,
}

/// A finished display request.
#[derive(Clone, Debug)]
pub struct Completed {
    /// Generation of the request.
    pub generation: u64,
    /// The layout that was drawn.
    pub layout: Option<Arc<Layout>>,
    /// Whether `layout` was built by this request.
    pub rebuilt: bool,
    /// The drawing.
    pub list: DisplayList,
    /// Transition to present with.
    pub transition: Option<Transition>,
}

/// What became of a display request.
#[derive(Clone, Debug)]
pub enum DisplayOutcome {
    /// The request finished.
    Completed(Completed),
    /// The request was superseded.
    Cancelled {
        /// Generation of the request.
        generation: u64,
    },
}

/// Runs display tasks for one view.
#[derive(Debug)]
pub struct DisplayPipeline {
    sentinel: Arc<AtomicU64>,
    sender: Sender<DisplayOutcome>,
    receiver: Receiver<DisplayOutcome>,
    pool: Option<Arc<WorkerPool>>,
    pending: Option<u64>,
}

impl Default for DisplayPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayPipeline {
    /// A pipeline running on [`WorkerPool::global`].
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sentinel: Arc::new(AtomicU64::new(0)),
            sender,
            receiver,
            pool: None,
            pending: None,
        }
    }

    /// A pipeline running on its own pool.
    pub fn with_pool(pool: Arc<WorkerPool>) -> Self {
        Self {
            pool: Some(pool),
            ..Self::new()
        }
    }

    /// Generation of the latest request.
    pub fn generation(&self) -> u64 {
        self.sentinel.load(Ordering::Acquire)
    }

    /// Returns `true` while an asynchronous request has not been drained.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Cancels the request in flight, if any.
    pub fn cancel(&mut self) {
        let generation = self.sentinel.fetch_add(1, Ordering::AcqRel) + 1;
        if let Some(pending) = self.pending.take() {
            trace!("cancelled display request {pending} (now {generation})");
        }
    }

    /// Starts a request, superseding the one in flight.
    ///
    /// Synchronous requests run on the calling thread and their outcome is returned at once.
    /// Asynchronous requests return `None`; their outcome arrives through
    /// [`drain`](Self::drain).
    pub fn submit(&mut self, mut task: DisplayTask, asynchronous: bool) -> Option<DisplayOutcome> {
        self.cancel();
        let generation = self.generation();
        task.draw.cancel = CancelToken::new(Arc::clone(&self.sentinel), generation);
        if !asynchronous {
            trace!("running display request {generation} inline");
            return Some(run(task, generation));
        }
        trace!("scheduling display request {generation}");
        self.pending = Some(generation);
        let sender = self.sender.clone();
        let job = move || {
            let outcome = run(task, generation);
            // The pipeline may be gone; nobody is waiting for the result then.
            let _ = sender.send(outcome);
        };
        match &self.pool {
            Some(pool) => pool.spawn(job),
            None => WorkerPool::global().spawn(job),
        }
        None
    }

    /// Takes the outcome of the latest request if it has finished.
    ///
    /// Outcomes of superseded requests are dropped.
    pub fn drain(&mut self) -> Option<Completed> {
        let current = self.generation();
        let mut latest = None;
        for outcome in self.receiver.try_iter() {
            match outcome {
                DisplayOutcome::Completed(done) if done.generation == current => {
                    latest = Some(done);
                }
                DisplayOutcome::Completed(done) => {
                    trace!("dropping stale display result {}", done.generation);
                }
                DisplayOutcome::Cancelled { generation } => {
                    trace!("display request {generation} was cancelled");
                }
            }
        }
        if latest.is_some() {
            self.pending = None;
        }
        latest
    }

    /// Blocks until the latest asynchronous request finishes or `timeout` passes.
    pub fn wait(&mut self, timeout: Duration) -> Option<Completed> {
        let deadline = std::time::Instant::now() + timeout;
        while self.pending.is_some() {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.receiver.recv_timeout(remaining) {
                Ok(DisplayOutcome::Completed(done)) if done.generation == self.generation() => {
                    self.pending = None;
                    return Some(done);
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
        None
    }
}

fn run(task: DisplayTask, generation: u64) -> DisplayOutcome {
    match render(task, generation) {
        Ok(done) => DisplayOutcome::Completed(done),
        Err(Cancelled) => DisplayOutcome::Cancelled { generation },
    }
}

fn render(task: DisplayTask, generation: u64) -> Result<Completed, Cancelled> {
    let DisplayTask {
        layout,
        draw,
        transition,
    } = task;
    draw.cancel.check()?;
    let (layout, rebuilt) = match layout {
        LayoutSource::Cached(layout) => (layout, false),
        LayoutSource::Build {
            text,
            container,
            context,
        } => {
            let layout = text.and_then(|text| context.layout(text, &container));
            (layout.map(Arc::new), true)
        }
    };
    draw.cancel.check()?;
    let list = match &layout {
        Some(layout) => draw_layout(layout, &draw)?,
        None => DisplayList::empty(draw.size),
    };
    draw.cancel.check()?;
    Ok(Completed {
        generation,
        layout,
        rebuilt,
        list,
        transition,
    })
}

/// Attachment changes needed to show a new layout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reconciliation {
    /// Contents shown before that the new layout no longer has.
    pub detach: Vec<AttachmentContent>,
    /// Contents of the new layout with their rectangles in view coordinates.
    pub place: Vec<(AttachmentContent, Rect)>,
}

/// Compares attached view and layer contents against the attachments of `layout`.
///
/// Images are drawn with the text and never attached.
pub fn reconcile(
    attached: &[AttachmentContent],
    layout: Option<&Layout>,
    transform: Affine,
) -> Reconciliation {
    let mut place = Vec::new();
    let mut wanted = HashSet::new();
    if let Some(layout) = layout {
        for line in layout.lines() {
            for placed in line.attachments() {
                let content = placed.attachment.content;
                if matches!(content, AttachmentContent::Image(_)) {
                    continue;
                }
                if wanted.insert(content) {
                    place.push((content, transform.transform_rect_bbox(placed.rect)));
                }
            }
        }
    }
    let detach = attached
        .iter()
        .filter(|content| !wanted.contains(*content))
        .copied()
        .collect();
    Reconciliation { detach, place }
}
