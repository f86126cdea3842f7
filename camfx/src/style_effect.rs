use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use crate::EffectDone;

#[derive(Default)]
struct StyleInner {
    generation: u64,
    pending: Option<(u64, Box<dyn FnOnce()>)>,
}

/// Wraps a parameterized, asynchronously completing effect on a single target.
///
/// Only the callback of the most recent [`StyleEffect::invoke`] ever fires. Earlier invocations
/// still run to completion, but their completions are recognized by generation and dropped.
pub struct StyleEffect<S> {
    effect: Rc<dyn Fn(S, EffectDone)>,
    inner: Rc<RefCell<StyleInner>>,
}

impl<S: 'static> StyleEffect<S> {
    pub fn new(effect: impl Fn(S, EffectDone) + 'static) -> Self {
        Self {
            effect: Rc::new(effect),
            inner: Rc::new(RefCell::new(StyleInner::default())),
        }
    }

    /// Runs the effect with `state`; `callback` fires once it completes, unless a later `invoke`
    /// supersedes it first.
    pub fn invoke(&self, state: S, callback: impl FnOnce() + 'static) {
        let generation = {
            let mut inner = self.inner.borrow_mut();
            inner.generation = inner.generation.wrapping_add(1);
            let generation = inner.generation;
            if inner.pending.is_some() {
                fx_trace!(generation, "StyleEffect::invoke supersedes a pending callback");
            }
            inner.pending = Some((generation, Box::new(callback)));
            generation
        };

        let inner = Rc::clone(&self.inner);
        let effect = Rc::clone(&self.effect);
        effect(
            state,
            EffectDone::new(move || {
                let callback = {
                    let mut inner = inner.borrow_mut();
                    let current = inner.pending.as_ref().map(|(g, _)| *g);
                    if current == Some(generation) {
                        inner.pending.take().map(|(_, cb)| cb)
                    } else {
                        None
                    }
                };
                match callback {
                    Some(cb) => cb(),
                    None => {
                        fx_trace!(generation, "StyleEffect: superseded completion dropped");
                    }
                }
            }),
        );
    }

    /// Whether a callback is waiting for its effect to complete.
    pub fn is_active(&self) -> bool {
        self.inner.borrow().pending.is_some()
    }
}

impl<S> Clone for StyleEffect<S> {
    fn clone(&self) -> Self {
        Self {
            effect: Rc::clone(&self.effect),
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S> fmt::Debug for StyleEffect<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("StyleEffect")
            .field("generation", &inner.generation)
            .field("active", &inner.pending.is_some())
            .finish()
    }
}
