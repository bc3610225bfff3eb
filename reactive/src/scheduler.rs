//! The batch-flush driver.
//!
//! A [`Scheduler`] keeps the set of subjects that currently have listeners and
//! drains them once per frame. Frames come from a [`FrameHost`], which is the
//! host's per-frame callback facility; the bundled [`FrameQueue`] is a host that
//! the embedding application pumps from its own loop.
//!
//! The tick loop only runs while at least one subject is active. It starts when
//! the first subject becomes active and stops when the last one leaves. The
//! running flag is checked after a drain and before rescheduling, so a tick
//! that was already requested when the loop stopped still drains once.

use std::{
    cell::{Cell, RefCell},
    cmp::Reverse,
    collections::VecDeque,
    rc::{Rc, Weak},
};

use crate::{FxIndexMap, error::ListenerError, id::Id};

/// A unit of work run by a [`FrameHost`] on its next frame.
pub type Frame = Box<dyn FnOnce()>;

/// The host facility that runs a callback on the next frame.
pub trait FrameHost {
    fn request_frame(&self, frame: Frame);
}

/// A [`FrameHost`] the application drives by calling [`FrameQueue::run_frame`].
#[derive(Default)]
pub struct FrameQueue {
    pending: RefCell<VecDeque<Frame>>,
}

impl FrameQueue {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Runs the frames requested before this call. Frames requested while they
    /// run are left for the next call. Returns how many frames ran.
    pub fn run_frame(&self) -> usize {
        let frames = self.pending.take();
        let count = frames.len();
        for frame in frames {
            frame();
        }
        count
    }

    pub fn pending_frames(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl FrameHost for FrameQueue {
    fn request_frame(&self, frame: Frame) {
        self.pending.borrow_mut().push_back(frame);
    }
}

/// Something the scheduler can flush. Implemented by model nodes.
pub(crate) trait Flush {
    fn id(&self) -> Id;
    /// Distance from the topmost ancestor. Deeper subjects flush first.
    fn depth(&self) -> usize;
    /// Prunes dead listeners; `false` means the subject should leave the
    /// active set.
    fn is_listened(&self) -> bool;
    /// Delivers the pending batch. `Ok(false)` if nothing was pending.
    fn flush(&self) -> Result<bool, ListenerError>;
}

/// Outcome of one drain.
#[derive(Debug, Default)]
pub struct DrainReport {
    /// Subjects that had pending records and delivered them.
    pub flushed: usize,
    /// Errors returned by listeners during delivery.
    pub failures: Vec<ListenerError>,
}

struct SchedulerState {
    host: Rc<dyn FrameHost>,
    active: RefCell<FxIndexMap<Id, Rc<dyn Flush>>>,
    running: Cell<bool>,
    tick_requested: Cell<bool>,
}

/// Process-wide (per UI thread) batching driver, shared by handle.
#[derive(Clone)]
pub struct Scheduler(Rc<SchedulerState>);

thread_local! {
    static DEFAULT_FRAMES: Rc<FrameQueue> = FrameQueue::new();
    static CURRENT: RefCell<Option<Scheduler>> = const { RefCell::new(None) };
}

/// Pumps the frame queue behind the default scheduler of this thread.
pub fn run_frame() -> usize {
    DEFAULT_FRAMES.with(|frames| frames.run_frame())
}

impl Scheduler {
    pub fn new(host: Rc<dyn FrameHost>) -> Self {
        Self(Rc::new(SchedulerState {
            host,
            active: RefCell::new(FxIndexMap::default()),
            running: Cell::new(false),
            tick_requested: Cell::new(false),
        }))
    }

    /// A scheduler driven by a fresh [`FrameQueue`], returned alongside it.
    pub fn manual() -> (Self, Rc<FrameQueue>) {
        let frames = FrameQueue::new();
        (Self::new(frames.clone()), frames)
    }

    /// The scheduler new nodes on this thread attach to.
    ///
    /// Unless replaced with [`Scheduler::set_current`], this is a scheduler
    /// driven by the frame queue pumped with [`run_frame`].
    pub fn current() -> Scheduler {
        CURRENT.with(|current| {
            current
                .borrow_mut()
                .get_or_insert_with(|| {
                    Scheduler::new(DEFAULT_FRAMES.with(|frames| frames.clone()))
                })
                .clone()
        })
    }

    /// Replaces the scheduler returned by [`Scheduler::current`] and returns the
    /// previous one. Nodes already defined keep the scheduler they were
    /// defined with.
    pub fn set_current(scheduler: Scheduler) -> Option<Scheduler> {
        CURRENT.with(|current| current.borrow_mut().replace(scheduler))
    }

    pub fn is_running(&self) -> bool {
        self.0.running.get()
    }

    pub fn active_count(&self) -> usize {
        self.0.active.borrow().len()
    }

    pub fn ptr_eq(&self, other: &Scheduler) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn is_active(&self, id: Id) -> bool {
        self.0.active.borrow().contains_key(&id)
    }

    /// Adds a subject to the active set, starting the tick loop if needed.
    pub(crate) fn watch(&self, subject: Rc<dyn Flush>) {
        self.0.active.borrow_mut().insert(subject.id(), subject);
        if !self.0.running.replace(true) {
            tracing::debug!("scheduler started");
            self.request_tick();
        }
    }

    /// Removes a subject; the loop stops once the active set is empty.
    pub(crate) fn unwatch(&self, id: Id) {
        let mut active = self.0.active.borrow_mut();
        active.shift_remove(&id);
        if active.is_empty() && self.0.running.replace(false) {
            tracing::debug!("scheduler stopped");
        }
    }

    /// Flushes every active subject that has pending records.
    ///
    /// Subjects are visited deepest first so that records a child bubbles into
    /// its ancestors are delivered by those ancestors in the same drain.
    /// Records written while listeners run are left for the next drain.
    pub fn drain(&self) -> DrainReport {
        let snapshot: Vec<Rc<dyn Flush>> = self.0.active.borrow().values().cloned().collect();

        let mut subjects = Vec::with_capacity(snapshot.len());
        for subject in snapshot {
            if subject.is_listened() {
                subjects.push(subject);
            } else {
                self.unwatch(subject.id());
            }
        }
        subjects.sort_by_key(|subject| Reverse(subject.depth()));

        let mut report = DrainReport::default();
        for subject in subjects {
            match subject.flush() {
                Ok(true) => report.flushed += 1,
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(subject = %subject.id(), error = %err, "listener failed");
                    report.failures.push(err);
                }
            }
        }
        tracing::trace!(flushed = report.flushed, "drain");
        report
    }

    fn request_tick(&self) {
        if self.0.tick_requested.replace(true) {
            return;
        }
        let state: Weak<SchedulerState> = Rc::downgrade(&self.0);
        self.0.host.request_frame(Box::new(move || {
            if let Some(state) = state.upgrade() {
                Scheduler(state).tick();
            }
        }));
    }

    fn tick(&self) {
        self.0.tick_requested.set(false);
        self.drain();
        if self.0.running.get() {
            self.request_tick();
        }
    }
}
