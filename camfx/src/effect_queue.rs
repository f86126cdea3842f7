use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

/// Completion signal handed to an effect.
///
/// Consuming `self` in [`EffectDone::finish`] rules out duplicate signals. Dropping the handle
/// without finishing is a contract violation: whatever waits on it (an [`EffectQueue`], a
/// [`crate::StyleEffect`]) never hears back.
#[must_use = "an effect must signal completion exactly once"]
pub struct EffectDone {
    on_finish: Option<Box<dyn FnOnce()>>,
}

impl EffectDone {
    pub fn new(on_finish: impl FnOnce() + 'static) -> Self {
        Self {
            on_finish: Some(Box::new(on_finish)),
        }
    }

    pub fn finish(mut self) {
        if let Some(f) = self.on_finish.take() {
            f();
        }
    }
}

impl Drop for EffectDone {
    fn drop(&mut self) {
        if self.on_finish.is_some() {
            fx_warn!("EffectDone dropped without signaling completion");
        }
    }
}

impl fmt::Debug for EffectDone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectDone")
            .field("finished", &self.on_finish.is_none())
            .finish()
    }
}

type EffectRequest = Box<dyn FnOnce(EffectDone)>;

#[derive(Default)]
struct QueueInner {
    pending: VecDeque<EffectRequest>,
    running: bool,
    draining: bool,
}

/// Serializes effect closures so that at most one runs at a time.
///
/// Closures run in submission order. Each one receives an [`EffectDone`] and the next closure
/// starts only after it is finished, which may happen synchronously or from a later callback.
///
/// The queue is a cheap-to-clone handle over single-threaded shared state.
#[derive(Clone, Default)]
pub struct EffectQueue {
    inner: Rc<RefCell<QueueInner>>,
}

impl EffectQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `request`, starting it immediately when nothing is running.
    pub fn enqueue(&self, request: impl FnOnce(EffectDone) + 'static) {
        {
            let mut q = self.inner.borrow_mut();
            q.pending.push_back(Box::new(request));
            fx_trace!(
                pending = q.pending.len(),
                running = q.running,
                "EffectQueue::enqueue"
            );
        }
        drain(&self.inner);
    }

    pub fn is_running(&self) -> bool {
        self.inner.borrow().running
    }

    /// Number of closures waiting behind the running one.
    pub fn pending_len(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    pub fn is_idle(&self) -> bool {
        let q = self.inner.borrow();
        !q.running && q.pending.is_empty()
    }
}

impl fmt::Debug for EffectQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = self.inner.borrow();
        f.debug_struct("EffectQueue")
            .field("pending", &q.pending.len())
            .field("running", &q.running)
            .finish()
    }
}

// Iterative so that closures finishing synchronously do not grow the stack.
fn drain(inner: &Rc<RefCell<QueueInner>>) {
    {
        let mut q = inner.borrow_mut();
        if q.draining {
            return;
        }
        q.draining = true;
    }

    loop {
        let request = {
            let mut q = inner.borrow_mut();
            if q.running {
                None
            } else {
                let next = q.pending.pop_front();
                q.running = next.is_some();
                next
            }
        };
        let Some(request) = request else {
            break;
        };

        let queue = Rc::clone(inner);
        request(EffectDone::new(move || {
            queue.borrow_mut().running = false;
            drain(&queue);
        }));
    }

    inner.borrow_mut().draining = false;
}
