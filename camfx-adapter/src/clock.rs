use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::fmt;

use camfx::{Scheduler, TimerId};

enum Task {
    Once(Box<dyn FnOnce()>),
    Every {
        period_ms: u64,
        f: Rc<RefCell<Box<dyn FnMut()>>>,
    },
}

/// A manual millisecond clock with a timer queue.
///
/// Nothing happens until [`SimClock::advance`] is called; timers then fire in `(due, id)` order
/// and the clock reads each timer's due time while it runs. Timers scheduled while advancing
/// fire in the same call when they fall due before its end.
#[derive(Default)]
pub struct SimClock {
    now: Cell<u64>,
    next_id: Cell<u64>,
    timers: RefCell<BTreeMap<(u64, u64), Task>>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.now.get()
    }

    /// Number of armed timeouts and intervals.
    pub fn pending(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Runs every timer due within the next `ms` milliseconds.
    pub fn advance(&self, ms: u64) {
        let end = self.now.get().saturating_add(ms);
        loop {
            let next = {
                let mut timers = self.timers.borrow_mut();
                let due = timers.first_key_value().map(|(&(due, _), _)| due);
                match due {
                    Some(due) if due <= end => timers.pop_first(),
                    _ => None,
                }
            };
            let Some(((due, id), task)) = next else {
                break;
            };
            self.now.set(due);
            match task {
                Task::Once(f) => f(),
                Task::Every { period_ms, f } => {
                    // Re-armed before running so the callback can clear itself.
                    self.timers.borrow_mut().insert(
                        (due + period_ms, id),
                        Task::Every {
                            period_ms,
                            f: Rc::clone(&f),
                        },
                    );
                    let mut f = f.borrow_mut();
                    (&mut *f)();
                }
            }
        }
        self.now.set(end);
    }

    fn insert(&self, due: u64, task: Task) -> TimerId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.timers.borrow_mut().insert((due, id), task);
        TimerId(id)
    }
}

impl Scheduler for SimClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn set_timeout(&self, delay_ms: u64, f: Box<dyn FnOnce()>) -> TimerId {
        self.insert(self.now.get().saturating_add(delay_ms), Task::Once(f))
    }

    fn set_interval(&self, period_ms: u64, f: Box<dyn FnMut()>) -> TimerId {
        let period_ms = period_ms.max(1);
        self.insert(
            self.now.get().saturating_add(period_ms),
            Task::Every {
                period_ms,
                f: Rc::new(RefCell::new(f)),
            },
        )
    }

    fn clear(&self, id: TimerId) {
        self.timers.borrow_mut().retain(|&(_, timer), _| timer != id.0);
    }
}

impl fmt::Debug for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimClock")
            .field("now", &self.now.get())
            .field("pending", &self.pending())
            .finish()
    }
}
