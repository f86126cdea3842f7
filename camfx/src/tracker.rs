use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::RefCell;
use core::fmt;

use crate::{
    InputEvent, InputPhase, InputSource, Modality, Point, PressState, ScrollSample, Scheduler,
    ScrollTrackerOptions, Subscription, TimerId, TrackerState,
};

/// Anything the [`ScrollTracker`] can sample once per poll tick.
pub trait ScrollProbe {
    fn sample(&self) -> ScrollSample;
}

/// Observers notified by a [`ScrollTracker`].
#[derive(Clone, Default)]
pub struct ScrollTrackerCallbacks {
    pub on_scroll_started: Option<Rc<dyn Fn()>>,
    pub on_scroll_ended: Option<Rc<dyn Fn()>>,
}

impl ScrollTrackerCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_scroll_started(mut self, f: impl Fn() + 'static) -> Self {
        self.on_scroll_started = Some(Rc::new(f));
        self
    }

    pub fn on_scroll_ended(mut self, f: impl Fn() + 'static) -> Self {
        self.on_scroll_ended = Some(Rc::new(f));
        self
    }
}

impl fmt::Debug for ScrollTrackerCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollTrackerCallbacks")
            .field("on_scroll_started", &self.on_scroll_started.is_some())
            .field("on_scroll_ended", &self.on_scroll_ended.is_some())
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Transition {
    Started,
    Ended,
}

#[derive(Default)]
struct TrackerInner {
    scrolling: bool,
    start: Point,
    last: Point,
    pressed: PressState,
    poll: Option<TimerId>,
    grace: Option<TimerId>,
    input: Option<Subscription>,
}

struct TrackerShared {
    probe: Rc<dyn ScrollProbe>,
    scheduler: Rc<dyn Scheduler>,
    options: ScrollTrackerOptions,
    callbacks: ScrollTrackerCallbacks,
    state: RefCell<TrackerInner>,
}

/// Infers scroll start/end by polling a [`ScrollProbe`] together with pointer press state.
///
/// States are *idle* and *scrolling*. A tick observes a change when the position differs from the
/// previous sample or the probe reports an animation. A change while idle starts a scroll; a
/// stable tick while scrolling ends it, but only once neither mouse nor touch is pressed.
///
/// Some platforms drop the touch release while a native scroll animation runs. When touch is
/// pressed and a tick is stable, a grace timer is armed; if it expires before another change is
/// observed, touch is treated as released and the scroll is ended.
///
/// The tracker is a cheap-to-clone handle. Its timers and input subscription are released when
/// the last handle is dropped.
#[derive(Clone)]
pub struct ScrollTracker {
    shared: Rc<TrackerShared>,
}

impl ScrollTracker {
    pub fn new(
        probe: Rc<dyn ScrollProbe>,
        scheduler: Rc<dyn Scheduler>,
        options: ScrollTrackerOptions,
        callbacks: ScrollTrackerCallbacks,
    ) -> Self {
        let last = probe.sample().position;
        Self {
            shared: Rc::new(TrackerShared {
                probe,
                scheduler,
                options,
                callbacks,
                state: RefCell::new(TrackerInner {
                    start: last,
                    last,
                    ..TrackerInner::default()
                }),
            }),
        }
    }

    pub fn options(&self) -> &ScrollTrackerOptions {
        &self.shared.options
    }

    pub fn is_scrolling(&self) -> bool {
        self.shared.state.borrow().scrolling
    }

    /// Distance covered by the current (or most recent) scroll: start position minus the last
    /// sample. Scrolling forward yields negative components.
    pub fn delta(&self) -> Point {
        let s = self.shared.state.borrow();
        s.start - s.last
    }

    pub fn pressed(&self) -> PressState {
        self.shared.state.borrow().pressed
    }

    pub fn state(&self) -> TrackerState {
        let s = self.shared.state.borrow();
        TrackerState {
            scrolling: s.scrolling,
            start: s.start,
            last: s.last,
            pressed: s.pressed,
            touch_grace_armed: s.grace.is_some(),
            polling: s.poll.is_some(),
        }
    }

    /// Starts polling. Calling it while already polling does nothing.
    pub fn start(&self) {
        if self.shared.state.borrow().poll.is_some() {
            return;
        }
        let last = self.shared.probe.sample().position;
        self.shared.state.borrow_mut().last = last;

        let weak = Rc::downgrade(&self.shared);
        let id = self.shared.scheduler.set_interval(
            self.shared.options.poll_interval_ms,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.tick();
                }
            }),
        );
        self.shared.state.borrow_mut().poll = Some(id);
        fx_debug!(
            interval_ms = self.shared.options.poll_interval_ms,
            "ScrollTracker started"
        );
    }

    /// Stops polling and disarms the touch grace timer. State is kept.
    pub fn stop(&self) {
        let (poll, grace) = {
            let mut s = self.shared.state.borrow_mut();
            (s.poll.take(), s.grace.take())
        };
        for id in poll.into_iter().chain(grace) {
            self.shared.scheduler.clear(id);
        }
        fx_debug!("ScrollTracker stopped");
    }

    /// Runs one poll tick immediately.
    ///
    /// Hosts with native "scroll changed" notifications can call this from them to cut the poll
    /// latency.
    pub fn probe(&self) {
        self.shared.tick();
    }

    pub fn press(&self, modality: Modality) {
        self.shared.state.borrow_mut().pressed.set(modality, true);
    }

    pub fn release(&self, modality: Modality) {
        let grace = {
            let mut s = self.shared.state.borrow_mut();
            s.pressed.set(modality, false);
            match modality {
                Modality::Touch => s.grace.take(),
                Modality::Mouse => None,
            }
        };
        if let Some(id) = grace {
            self.shared.scheduler.clear(id);
        }
    }

    /// Follows press/release notifications from `source`, replacing any previous source.
    pub fn attach_input(&self, source: &dyn InputSource) {
        self.detach_input();
        let weak: Weak<TrackerShared> = Rc::downgrade(&self.shared);
        let subscription = source.subscribe(Box::new(move |event: &InputEvent| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let tracker = ScrollTracker { shared };
            match event.phase {
                InputPhase::Press => tracker.press(event.modality),
                InputPhase::Release => tracker.release(event.modality),
                InputPhase::Move => {}
            }
        }));
        self.shared.state.borrow_mut().input = Some(subscription);
    }

    pub fn detach_input(&self) {
        let input = self.shared.state.borrow_mut().input.take();
        if let Some(input) = input {
            input.unsubscribe();
        }
    }
}

impl TrackerShared {
    fn tick(self: &Rc<Self>) {
        let sample = self.probe.sample();

        let (transition, arm_grace, disarm) = {
            let mut s = self.state.borrow_mut();
            let changed = sample.position != s.last || sample.animating;

            let mut transition = None;
            if changed {
                if !s.scrolling {
                    s.start = s.last;
                    s.scrolling = true;
                    transition = Some(Transition::Started);
                }
            } else if s.scrolling && !s.pressed.any() {
                s.scrolling = false;
                transition = Some(Transition::Ended);
            }
            s.last = sample.position;

            if s.pressed.touch && !changed {
                (transition, s.grace.is_none(), None)
            } else {
                (transition, false, s.grace.take())
            }
        };

        if let Some(id) = disarm {
            self.scheduler.clear(id);
        }
        if arm_grace {
            let weak = Rc::downgrade(self);
            let id = self.scheduler.set_timeout(
                self.options.touch_grace_ms,
                Box::new(move || {
                    if let Some(shared) = weak.upgrade() {
                        shared.touch_grace_expired();
                    }
                }),
            );
            self.state.borrow_mut().grace = Some(id);
            fx_trace!(grace_ms = self.options.touch_grace_ms, "ScrollTracker: touch grace armed");
        }

        if let Some(transition) = transition {
            self.emit(transition);
        }
    }

    fn touch_grace_expired(&self) {
        let ended = {
            let mut s = self.state.borrow_mut();
            s.grace = None;
            s.pressed.touch = false;
            if s.scrolling && !s.pressed.mouse {
                s.scrolling = false;
                true
            } else {
                false
            }
        };
        fx_debug!(ended, "ScrollTracker: touch release assumed");
        if ended {
            self.emit(Transition::Ended);
        }
    }

    fn emit(&self, transition: Transition) {
        fx_debug!(?transition, "ScrollTracker transition");
        let callback = match transition {
            Transition::Started => self.callbacks.on_scroll_started.clone(),
            Transition::Ended => self.callbacks.on_scroll_ended.clone(),
        };
        if let Some(callback) = callback {
            callback();
        }
    }
}

impl Drop for TrackerShared {
    fn drop(&mut self) {
        let s = self.state.get_mut();
        for id in s.poll.take().into_iter().chain(s.grace.take()) {
            self.scheduler.clear(id);
        }
        if let Some(input) = s.input.take() {
            input.unsubscribe();
        }
    }
}

impl fmt::Debug for ScrollTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollTracker")
            .field("options", &self.shared.options)
            .field("state", &self.state())
            .finish()
    }
}
