use alloc::rc::{Rc, Weak};
use core::cell::RefCell;
use core::fmt;

use crate::types::round;
use crate::{
    AnimationToken, CompletionWaiter, Point, ScrollMode, ScrollProbe, ScrollSample, ScrollSurface,
    Scheduler, ScrollerOptions, ScrollerState, TransitionEvents, WaitOutcome,
};

#[derive(Debug, Default)]
struct ScrollerInner {
    animating: bool,
    token: AnimationToken,
    /// Transform the surface is transitioning toward.
    in_flight: Option<Point>,
}

struct ScrollerShared {
    surface: Rc<dyn ScrollSurface>,
    waiter: CompletionWaiter,
    options: ScrollerOptions,
    state: RefCell<ScrollerInner>,
}

/// Maintains the logical scroll position of a viewport, animating changes with a transform.
///
/// A smooth scroll moves the content with a transitioned translation while the raw scroll offset
/// stays put. When the transition finishes, the translation is folded back into the raw offset
/// ("flushed"). Every request mints a new [`AnimationToken`]; a completion only flushes if its
/// token is still current, so a superseded animation can never commit its position.
///
/// The scroller is a cheap-to-clone handle.
#[derive(Clone)]
pub struct SmoothScroller {
    shared: Rc<ScrollerShared>,
}

impl SmoothScroller {
    pub fn new(
        surface: Rc<dyn ScrollSurface>,
        events: Rc<dyn TransitionEvents>,
        scheduler: Rc<dyn Scheduler>,
        options: ScrollerOptions,
    ) -> Self {
        fx_debug!(
            duration_ms = options.duration_ms,
            timeout_ms = ?options.completion_timeout_ms,
            "SmoothScroller::new"
        );
        Self {
            shared: Rc::new(ScrollerShared {
                surface,
                waiter: CompletionWaiter::new(events, scheduler),
                options,
                state: RefCell::new(ScrollerInner::default()),
            }),
        }
    }

    pub fn surface(&self) -> &Rc<dyn ScrollSurface> {
        &self.shared.surface
    }

    pub fn options(&self) -> &ScrollerOptions {
        &self.shared.options
    }

    pub fn is_animating(&self) -> bool {
        self.shared.state.borrow().animating
    }

    pub fn token(&self) -> AnimationToken {
        self.shared.state.borrow().token
    }

    /// Upper bound of the logical position; never negative.
    pub fn max_scroll(&self) -> Point {
        self.shared.max_scroll()
    }

    /// Logical position, including the progress of an in-flight animation.
    pub fn position(&self) -> Point {
        self.shared.position()
    }

    pub fn scroll_left(&self) -> f32 {
        self.position().x
    }

    pub fn scroll_top(&self) -> f32 {
        self.position().y
    }

    pub fn state(&self) -> ScrollerState {
        let inner = self.shared.state.borrow();
        ScrollerState {
            position: self.shared.position_with(inner.animating),
            max_scroll: self.shared.max_scroll(),
            animating: inner.animating,
            token: inner.token,
        }
    }

    /// Scrolls to `(x, y)`, clamped into `[0, max_scroll]`.
    pub fn scroll_to(&self, x: f32, y: f32, mode: ScrollMode) {
        let target = self.shared.clamp(Point::new(x, y));
        fx_trace!(x, y, ?mode, tx = target.x, ty = target.y, "SmoothScroller::scroll_to");
        match mode {
            ScrollMode::Instant => {
                if self.is_animating() {
                    self.shared.flush();
                }
                self.shared.surface.set_scroll_position(target);
            }
            ScrollMode::Smooth => self.animate_to(target),
        }
    }

    /// Resolves an in-flight animation at its current rendered value.
    ///
    /// The pending completion of that animation becomes stale.
    pub fn flush(&self) {
        self.shared.flush();
    }

    fn animate_to(&self, target: Point) {
        let shared = &self.shared;
        let raw = shared.surface.scroll_position();
        let dx = round(target.x - raw.x);
        let dy = round(target.y - raw.y);
        let transform = Point::new(-dx, -dy);

        let token = {
            let mut inner = shared.state.borrow_mut();
            let unchanged = match inner.in_flight {
                Some(current) => current == transform,
                None => dx == 0.0 && dy == 0.0,
            };
            if unchanged {
                fx_trace!(dx, dy, "SmoothScroller: target already reached or in flight");
                return;
            }
            inner.token = inner.token.next();
            inner.animating = true;
            inner.in_flight = Some(transform);
            inner.token
        };

        fx_debug!(token = token.0, dx, dy, "SmoothScroller: animation started");
        shared
            .surface
            .set_transform(transform, shared.options.duration_ms);

        let weak: Weak<ScrollerShared> = Rc::downgrade(shared);
        // Superseded waits are never cancelled; their completions are filtered by token.
        let _pending = shared.waiter.wait(
            shared.surface.id(),
            shared.options.completion_timeout_ms,
            move |outcome| {
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                let current = shared.state.borrow().token;
                if current != token {
                    fx_trace!(
                        token = token.0,
                        current = current.0,
                        "SmoothScroller: stale completion ignored"
                    );
                    return;
                }
                match outcome {
                    WaitOutcome::Finished => shared.flush(),
                    // The host may still be rendering the last frames; commit where it was headed.
                    WaitOutcome::TimedOut => shared.commit_target(),
                }
            },
        );
    }
}

impl ScrollerShared {
    fn max_scroll(&self) -> Point {
        let content = self.surface.scroll_size();
        let client = self.surface.client_size();
        Point::new(
            (content.width - client.width).max(0.0),
            (content.height - client.height).max(0.0),
        )
    }

    fn clamp(&self, p: Point) -> Point {
        let max = self.max_scroll();
        // `max(0.0)` first so NaN collapses to zero.
        Point::new(p.x.max(0.0).min(max.x), p.y.max(0.0).min(max.y))
    }

    fn position(&self) -> Point {
        let animating = self.state.borrow().animating;
        self.position_with(animating)
    }

    fn position_with(&self, animating: bool) -> Point {
        let raw = self.surface.scroll_position();
        if animating {
            raw - self.surface.rendered_transform()
        } else {
            raw
        }
    }

    fn flush(&self) {
        self.settle_at(self.clamp(self.position()));
    }

    /// Resolves the in-flight animation at its destination rather than its rendered value.
    fn commit_target(&self) {
        let in_flight = self.state.borrow().in_flight;
        match in_flight {
            Some(transform) => {
                let target = self.surface.scroll_position() - transform;
                self.settle_at(self.clamp(target));
            }
            None => self.flush(),
        }
    }

    fn settle_at(&self, logical: Point) {
        self.surface.set_transform(Point::ZERO, 0);
        self.surface.set_scroll_position(logical);

        let mut inner = self.state.borrow_mut();
        inner.token = inner.token.next();
        inner.animating = false;
        inner.in_flight = None;
        fx_debug!(
            token = inner.token.0,
            x = logical.x,
            y = logical.y,
            "SmoothScroller: flushed"
        );
    }
}

impl ScrollProbe for SmoothScroller {
    fn sample(&self) -> ScrollSample {
        let animating = self.is_animating();
        ScrollSample {
            position: self.shared.position_with(animating),
            animating,
        }
    }
}

impl fmt::Debug for SmoothScroller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmoothScroller")
            .field("options", &self.shared.options)
            .field("state", &*self.shared.state.borrow())
            .finish()
    }
}
