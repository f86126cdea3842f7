use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use crate::{Scheduler, Subscription, SurfaceId, TimerId, TransitionEvents};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WaitOutcome {
    /// The surface reported its transition as finished.
    Finished,
    /// The timeout elapsed first.
    TimedOut,
}

struct WaitSlot {
    on_done: Option<Box<dyn FnOnce(WaitOutcome)>>,
    listener: Option<Subscription>,
    timer: Option<TimerId>,
}

impl WaitSlot {
    /// Takes the callback and disarms whatever did not fire.
    fn settle(&mut self, scheduler: &dyn Scheduler) -> Option<Box<dyn FnOnce(WaitOutcome)>> {
        let on_done = self.on_done.take()?;
        if let Some(listener) = self.listener.take() {
            listener.unsubscribe();
        }
        if let Some(timer) = self.timer.take() {
            scheduler.clear(timer);
        }
        Some(on_done)
    }
}

/// Waits for a single "transition finished" notification on one surface, optionally bounded by
/// a timeout.
#[derive(Clone)]
pub struct CompletionWaiter {
    events: Rc<dyn TransitionEvents>,
    scheduler: Rc<dyn Scheduler>,
}

impl CompletionWaiter {
    pub fn new(events: Rc<dyn TransitionEvents>, scheduler: Rc<dyn Scheduler>) -> Self {
        Self { events, scheduler }
    }

    /// Calls `on_done` exactly once: when `surface` finishes a transition, or when `timeout_ms`
    /// elapses, whichever happens first.
    pub fn wait(
        &self,
        surface: SurfaceId,
        timeout_ms: Option<u64>,
        on_done: impl FnOnce(WaitOutcome) + 'static,
    ) -> WaitHandle {
        let slot = Rc::new(RefCell::new(WaitSlot {
            on_done: Some(Box::new(on_done)),
            listener: None,
            timer: None,
        }));

        let listener = {
            let slot = Rc::clone(&slot);
            let scheduler = Rc::clone(&self.scheduler);
            self.events.on_transition_end(
                surface,
                Box::new(move || resolve(&slot, &*scheduler, WaitOutcome::Finished)),
            )
        };

        let timer = timeout_ms.map(|delay| {
            let slot = Rc::clone(&slot);
            let scheduler = Rc::clone(&self.scheduler);
            self.scheduler.set_timeout(
                delay,
                Box::new(move || {
                    // The timer has fired; there is nothing left to clear.
                    slot.borrow_mut().timer = None;
                    resolve(&slot, &*scheduler, WaitOutcome::TimedOut);
                }),
            )
        });

        {
            let mut s = slot.borrow_mut();
            if s.on_done.is_some() {
                s.listener = Some(listener);
                s.timer = timer;
            } else {
                // Resolved synchronously during registration.
                drop(s);
                listener.unsubscribe();
                if let Some(timer) = timer {
                    self.scheduler.clear(timer);
                }
            }
        }

        WaitHandle {
            slot,
            scheduler: Rc::clone(&self.scheduler),
        }
    }
}

impl fmt::Debug for CompletionWaiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionWaiter").finish_non_exhaustive()
    }
}

fn resolve(slot: &Rc<RefCell<WaitSlot>>, scheduler: &dyn Scheduler, outcome: WaitOutcome) {
    let on_done = slot.borrow_mut().settle(scheduler);
    if let Some(on_done) = on_done {
        fx_trace!(?outcome, "CompletionWaiter resolved");
        on_done(outcome);
    }
}

/// A pending [`CompletionWaiter::wait`].
pub struct WaitHandle {
    slot: Rc<RefCell<WaitSlot>>,
    scheduler: Rc<dyn Scheduler>,
}

impl WaitHandle {
    pub fn is_pending(&self) -> bool {
        self.slot.borrow().on_done.is_some()
    }

    /// Abandons the wait without calling its callback.
    pub fn cancel(self) {
        let on_done = self.slot.borrow_mut().settle(&*self.scheduler);
        drop(on_done);
    }
}

impl fmt::Debug for WaitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitHandle")
            .field("pending", &self.is_pending())
            .finish()
    }
}
