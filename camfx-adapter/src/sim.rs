use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use camfx::{
    InputEvent, InputPhase, InputSource, Point, Scheduler, ScrollSurface, Size, Subscription,
    SurfaceId, TransitionEvents,
};

use crate::{Easing, SimClock, Tween};

type TransitionListener = (u64, SurfaceId, Box<dyn FnOnce()>);

/// Dispatches "transition finished" notifications to one-shot listeners.
#[derive(Default)]
pub struct SimTransitions {
    next_id: Cell<u64>,
    listeners: Rc<RefCell<Vec<TransitionListener>>>,
}

impl SimTransitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifies (and detaches) every listener registered for `surface`.
    pub fn fire(&self, surface: SurfaceId) {
        let hit = {
            let mut listeners = self.listeners.borrow_mut();
            let all = core::mem::take(&mut *listeners);
            let (hit, keep): (Vec<_>, Vec<_>) =
                all.into_iter().partition(|(_, s, _)| *s == surface);
            *listeners = keep;
            hit
        };
        for (_, _, f) in hit {
            f();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl TransitionEvents for SimTransitions {
    fn on_transition_end(&self, surface: SurfaceId, f: Box<dyn FnOnce()>) -> Subscription {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.listeners.borrow_mut().push((id, surface, f));
        let listeners = Rc::clone(&self.listeners);
        Subscription::new(move || listeners.borrow_mut().retain(|(i, _, _)| *i != id))
    }
}

impl fmt::Debug for SimTransitions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimTransitions")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[derive(Debug)]
struct SurfaceState {
    scroll: Point,
    content: Size,
    client: Size,
    resting: Point,
    tween: Option<Tween>,
    /// Bumped whenever the transform changes; a transition only reports completion if it is
    /// still the latest one.
    generation: u64,
}

/// An in-memory scroll surface.
///
/// Like a browser element, it clamps its raw offset to the scrollable range, animates transform
/// changes with an ease-out tween, and reports a finished transition only for the transform that
/// was last applied. Retargeting an in-flight transition cancels the old one silently; applying
/// the transform already rendered starts no transition at all.
pub struct SimSurface {
    id: SurfaceId,
    clock: Rc<SimClock>,
    transitions: Rc<SimTransitions>,
    easing: Easing,
    state: Rc<RefCell<SurfaceState>>,
}

impl SimSurface {
    pub fn new(
        id: SurfaceId,
        content: Size,
        client: Size,
        clock: Rc<SimClock>,
        transitions: Rc<SimTransitions>,
    ) -> Self {
        Self {
            id,
            clock,
            transitions,
            easing: Easing::EaseOutCubic,
            state: Rc::new(RefCell::new(SurfaceState {
                scroll: Point::ZERO,
                content,
                client,
                resting: Point::ZERO,
                tween: None,
                generation: 0,
            })),
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Resizes the content, e.g. after items were added. The offset is re-clamped.
    pub fn set_content_size(&self, content: Size) {
        let mut s = self.state.borrow_mut();
        s.content = content;
        s.scroll = clamp_scroll(s.scroll, s.content, s.client);
    }

    pub fn set_client_size(&self, client: Size) {
        let mut s = self.state.borrow_mut();
        s.client = client;
        s.scroll = clamp_scroll(s.scroll, s.content, s.client);
    }

    pub fn is_transitioning(&self) -> bool {
        self.state
            .borrow()
            .tween
            .is_some_and(|t| !t.is_done(self.clock.now()))
    }

    /// Where the content currently appears: raw offset minus rendered transform.
    pub fn visual_position(&self) -> Point {
        self.scroll_position() - self.rendered_transform()
    }
}

fn clamp_scroll(p: Point, content: Size, client: Size) -> Point {
    let max_x = (content.width - client.width).max(0.0);
    let max_y = (content.height - client.height).max(0.0);
    Point::new(p.x.max(0.0).min(max_x), p.y.max(0.0).min(max_y))
}

impl ScrollSurface for SimSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn scroll_position(&self) -> Point {
        self.state.borrow().scroll
    }

    fn set_scroll_position(&self, position: Point) {
        let mut s = self.state.borrow_mut();
        s.scroll = clamp_scroll(position, s.content, s.client);
    }

    fn scroll_size(&self) -> Size {
        self.state.borrow().content
    }

    fn client_size(&self) -> Size {
        self.state.borrow().client
    }

    fn rendered_transform(&self) -> Point {
        let s = self.state.borrow();
        match s.tween {
            Some(tween) => tween.sample(self.clock.now()),
            None => s.resting,
        }
    }

    fn set_transform(&self, offset: Point, duration_ms: u64) {
        let from = self.rendered_transform();
        let now = self.clock.now();
        let generation = {
            let mut s = self.state.borrow_mut();
            s.generation += 1;
            s.resting = offset;
            s.tween = match s.tween {
                _ if duration_ms == 0 || from == offset => None,
                Some(mut tween) if !tween.is_done(now) => {
                    tween.retarget(now, offset, duration_ms);
                    Some(tween)
                }
                _ => Some(Tween::new(from, offset, now, duration_ms, self.easing)),
            };
            if s.tween.is_none() {
                return;
            }
            s.generation
        };

        let state = Rc::clone(&self.state);
        let transitions = Rc::clone(&self.transitions);
        let id = self.id;
        self.clock.set_timeout(
            duration_ms,
            Box::new(move || {
                {
                    let mut s = state.borrow_mut();
                    if s.generation != generation {
                        return;
                    }
                    s.tween = None;
                }
                transitions.fire(id);
            }),
        );
    }
}

impl fmt::Debug for SimSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimSurface")
            .field("id", &self.id)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

type InputListener = (u64, Rc<RefCell<Box<dyn FnMut(&InputEvent)>>>);

/// An input-event bus with helpers for common gestures.
#[derive(Default)]
pub struct SimInput {
    next_id: Cell<u64>,
    listeners: Rc<RefCell<Vec<InputListener>>>,
}

impl SimInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: InputEvent) {
        let listeners: Vec<_> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, f)| Rc::clone(f))
            .collect();
        for f in listeners {
            let mut f = f.borrow_mut();
            (&mut *f)(&event);
        }
    }

    pub fn mouse_down(&self, at: Point) {
        self.emit(InputEvent::mouse(InputPhase::Press, at));
    }

    pub fn mouse_move(&self, at: Point) {
        self.emit(InputEvent::mouse(InputPhase::Move, at));
    }

    pub fn mouse_up(&self, at: Point) {
        self.emit(InputEvent::mouse(InputPhase::Release, at));
    }

    pub fn touch_start(&self) {
        self.emit(InputEvent::touch(InputPhase::Press));
    }

    pub fn touch_move(&self) {
        self.emit(InputEvent::touch(InputPhase::Move));
    }

    pub fn touch_end(&self) {
        self.emit(InputEvent::touch(InputPhase::Release));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl InputSource for SimInput {
    fn subscribe(&self, f: Box<dyn FnMut(&InputEvent)>) -> Subscription {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.listeners
            .borrow_mut()
            .push((id, Rc::new(RefCell::new(f))));
        let listeners = Rc::clone(&self.listeners);
        Subscription::new(move || listeners.borrow_mut().retain(|(i, _)| *i != id))
    }
}

impl fmt::Debug for SimInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimInput")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
