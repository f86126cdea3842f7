use crate::*;

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

enum Task {
    Once(Box<dyn FnOnce()>),
    Every(u64, Rc<RefCell<Box<dyn FnMut()>>>),
}

struct Timer {
    id: u64,
    due: u64,
    task: Task,
}

/// Deterministic timers driven by `advance`.
#[derive(Default)]
struct ManualScheduler {
    now: Cell<u64>,
    next_id: Cell<u64>,
    timers: RefCell<Vec<Timer>>,
}

impl ManualScheduler {
    fn push(&self, due: u64, task: Task) -> TimerId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.timers.borrow_mut().push(Timer { id, due, task });
        TimerId(id)
    }

    fn pending(&self) -> usize {
        self.timers.borrow().len()
    }

    fn advance(&self, ms: u64) {
        let end = self.now.get() + ms;
        loop {
            let next = {
                let mut timers = self.timers.borrow_mut();
                let idx = timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= end)
                    .min_by_key(|(_, t)| (t.due, t.id))
                    .map(|(i, _)| i);
                idx.map(|i| timers.remove(i))
            };
            let Some(timer) = next else {
                break;
            };
            self.now.set(timer.due);
            match timer.task {
                Task::Once(f) => f(),
                Task::Every(period, f) => {
                    self.timers.borrow_mut().push(Timer {
                        id: timer.id,
                        due: timer.due + period,
                        task: Task::Every(period, Rc::clone(&f)),
                    });
                    let mut task = f.borrow_mut();
                    (&mut *task)();
                }
            }
        }
        self.now.set(end);
    }
}

impl Scheduler for ManualScheduler {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn set_timeout(&self, delay_ms: u64, f: Box<dyn FnOnce()>) -> TimerId {
        self.push(self.now.get() + delay_ms, Task::Once(f))
    }

    fn set_interval(&self, period_ms: u64, f: Box<dyn FnMut()>) -> TimerId {
        let period = period_ms.max(1);
        self.push(
            self.now.get() + period,
            Task::Every(period, Rc::new(RefCell::new(f))),
        )
    }

    fn clear(&self, id: TimerId) {
        self.timers.borrow_mut().retain(|t| t.id != id.0);
    }
}

/// A surface whose rendered transform only moves when the test says so.
struct FakeSurface {
    scroll: Cell<Point>,
    content: Cell<Size>,
    client: Cell<Size>,
    rendered: Cell<Point>,
    target: Cell<Point>,
    transitions: Cell<u32>,
}

impl FakeSurface {
    fn new(content: Size, client: Size) -> Self {
        Self {
            scroll: Cell::new(Point::ZERO),
            content: Cell::new(content),
            client: Cell::new(client),
            rendered: Cell::new(Point::ZERO),
            target: Cell::new(Point::ZERO),
            transitions: Cell::new(0),
        }
    }

    /// Jumps the rendered transform to its transition target.
    fn settle(&self) {
        self.rendered.set(self.target.get());
    }
}

impl ScrollSurface for FakeSurface {
    fn id(&self) -> SurfaceId {
        SurfaceId(7)
    }

    fn scroll_position(&self) -> Point {
        self.scroll.get()
    }

    fn set_scroll_position(&self, position: Point) {
        self.scroll.set(position);
    }

    fn scroll_size(&self) -> Size {
        self.content.get()
    }

    fn client_size(&self) -> Size {
        self.client.get()
    }

    fn rendered_transform(&self) -> Point {
        self.rendered.get()
    }

    fn set_transform(&self, offset: Point, duration_ms: u64) {
        self.target.set(offset);
        if duration_ms == 0 {
            self.rendered.set(offset);
        } else {
            self.transitions.set(self.transitions.get() + 1);
        }
    }
}

type TransitionListener = (u64, SurfaceId, Box<dyn FnOnce()>);

#[derive(Default)]
struct FakeEvents {
    next_id: Cell<u64>,
    listeners: Rc<RefCell<Vec<TransitionListener>>>,
}

impl FakeEvents {
    fn fire(&self, surface: SurfaceId) {
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

    fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl TransitionEvents for FakeEvents {
    fn on_transition_end(&self, surface: SurfaceId, f: Box<dyn FnOnce()>) -> Subscription {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.listeners.borrow_mut().push((id, surface, f));
        let listeners = Rc::clone(&self.listeners);
        Subscription::new(move || listeners.borrow_mut().retain(|(i, _, _)| *i != id))
    }
}

type InputListener = (u64, Rc<RefCell<Box<dyn FnMut(&InputEvent)>>>);

#[derive(Default)]
struct FakeInput {
    next_id: Cell<u64>,
    listeners: Rc<RefCell<Vec<InputListener>>>,
}

impl FakeInput {
    fn emit(&self, event: InputEvent) {
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

    fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl InputSource for FakeInput {
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

fn scroller_fixture() -> (
    Rc<ManualScheduler>,
    Rc<FakeSurface>,
    Rc<FakeEvents>,
    SmoothScroller,
) {
    let sched = Rc::new(ManualScheduler::default());
    let surface = Rc::new(FakeSurface::new(
        Size::new(1000.0, 2000.0),
        Size::new(100.0, 200.0),
    ));
    let events = Rc::new(FakeEvents::default());
    let scroller = SmoothScroller::new(
        surface.clone(),
        events.clone(),
        sched.clone(),
        ScrollerOptions::default(),
    );
    (sched, surface, events, scroller)
}

#[test]
fn effect_queue_runs_closures_in_fifo_order_without_overlap() {
    let queue = EffectQueue::new();
    let log = Rc::new(RefCell::new(Vec::<u32>::new()));
    let dones = Rc::new(RefCell::new(Vec::<EffectDone>::new()));

    for i in 1..=3u32 {
        let log = log.clone();
        let dones = dones.clone();
        queue.enqueue(move |done| {
            log.borrow_mut().push(i);
            dones.borrow_mut().push(done);
        });
    }

    assert_eq!(*log.borrow(), vec![1]);
    assert!(queue.is_running());
    assert_eq!(queue.pending_len(), 2);

    let first = dones.borrow_mut().remove(0);
    first.finish();
    assert_eq!(*log.borrow(), vec![1, 2]);

    let second = dones.borrow_mut().remove(0);
    second.finish();
    assert_eq!(*log.borrow(), vec![1, 2, 3]);
    assert_eq!(queue.pending_len(), 0);

    let third = dones.borrow_mut().remove(0);
    third.finish();
    assert!(queue.is_idle());
}

#[test]
fn effect_queue_drains_synchronous_completions_iteratively() {
    let queue = EffectQueue::new();
    let count = Rc::new(Cell::new(0u32));
    for _ in 0..10_000 {
        let count = count.clone();
        queue.enqueue(move |done| {
            count.set(count.get() + 1);
            done.finish();
        });
    }
    assert_eq!(count.get(), 10_000);
    assert!(queue.is_idle());
}

#[test]
fn effect_queue_accepts_enqueue_from_a_running_effect() {
    let queue = EffectQueue::new();
    let log = Rc::new(RefCell::new(Vec::<&'static str>::new()));

    let inner_queue = queue.clone();
    let inner_log = log.clone();
    queue.enqueue(move |done| {
        inner_log.borrow_mut().push("outer");
        let nested_log = inner_log.clone();
        inner_queue.enqueue(move |done| {
            nested_log.borrow_mut().push("nested");
            done.finish();
        });
        inner_log.borrow_mut().push("outer-done");
        done.finish();
    });

    assert_eq!(*log.borrow(), vec!["outer", "outer-done", "nested"]);
    assert!(queue.is_idle());
}

#[test]
fn effect_queue_stalls_when_an_effect_never_finishes() {
    let queue = EffectQueue::new();
    let ran = Rc::new(Cell::new(false));
    queue.enqueue(|done| drop(done));
    let ran2 = ran.clone();
    queue.enqueue(move |done| {
        ran2.set(true);
        done.finish();
    });
    assert!(!ran.get());
    assert!(queue.is_running());
    assert_eq!(queue.pending_len(), 1);
}

#[test]
fn style_effect_only_fires_the_latest_callback() {
    let dones = Rc::new(RefCell::new(Vec::<EffectDone>::new()));
    let states = Rc::new(RefCell::new(Vec::<u32>::new()));
    let effect = {
        let dones = dones.clone();
        let states = states.clone();
        StyleEffect::new(move |state: u32, done| {
            states.borrow_mut().push(state);
            dones.borrow_mut().push(done);
        })
    };

    let fired = Rc::new(RefCell::new(Vec::<&'static str>::new()));
    let f1 = fired.clone();
    effect.invoke(1, move || f1.borrow_mut().push("cb1"));
    let f2 = fired.clone();
    effect.invoke(2, move || f2.borrow_mut().push("cb2"));
    assert_eq!(*states.borrow(), vec![1, 2]);
    assert!(effect.is_active());

    let first = dones.borrow_mut().remove(0);
    first.finish();
    assert!(fired.borrow().is_empty());
    assert!(effect.is_active());

    let second = dones.borrow_mut().remove(0);
    second.finish();
    assert_eq!(*fired.borrow(), vec!["cb2"]);
    assert!(!effect.is_active());
}

#[test]
fn style_effect_ignores_completions_arriving_out_of_order() {
    let dones = Rc::new(RefCell::new(Vec::<EffectDone>::new()));
    let effect = {
        let dones = dones.clone();
        StyleEffect::new(move |_: (), done| dones.borrow_mut().push(done))
    };
    let count1 = Rc::new(Cell::new(0));
    let count2 = Rc::new(Cell::new(0));
    let c1 = count1.clone();
    effect.invoke((), move || c1.set(c1.get() + 1));
    let c2 = count2.clone();
    effect.invoke((), move || c2.set(c2.get() + 1));

    let second = dones.borrow_mut().pop().unwrap();
    second.finish();
    let first = dones.borrow_mut().pop().unwrap();
    first.finish();

    assert_eq!(count1.get(), 0);
    assert_eq!(count2.get(), 1);
}

#[test]
fn style_effect_supports_synchronous_effects() {
    let effect = StyleEffect::new(|_: &'static str, done: EffectDone| done.finish());
    let fired = Rc::new(Cell::new(false));
    let f = fired.clone();
    effect.invoke("visible", move || f.set(true));
    assert!(fired.get());
    assert!(!effect.is_active());
}

#[test]
fn waiter_resolves_on_transition_end_and_clears_its_timeout() {
    let sched = Rc::new(ManualScheduler::default());
    let events = Rc::new(FakeEvents::default());
    let waiter = CompletionWaiter::new(events.clone(), sched.clone());
    let outcomes = Rc::new(RefCell::new(Vec::new()));

    let o = outcomes.clone();
    let handle = waiter.wait(SurfaceId(1), Some(500), move |out| o.borrow_mut().push(out));
    assert!(handle.is_pending());
    assert_eq!(sched.pending(), 1);

    events.fire(SurfaceId(2));
    assert!(outcomes.borrow().is_empty());

    events.fire(SurfaceId(1));
    assert_eq!(*outcomes.borrow(), vec![WaitOutcome::Finished]);
    assert!(!handle.is_pending());
    assert_eq!(sched.pending(), 0);

    sched.advance(1_000);
    assert_eq!(outcomes.borrow().len(), 1);
}

#[test]
fn waiter_times_out_and_detaches_its_listener() {
    let sched = Rc::new(ManualScheduler::default());
    let events = Rc::new(FakeEvents::default());
    let waiter = CompletionWaiter::new(events.clone(), sched.clone());
    let outcomes = Rc::new(RefCell::new(Vec::new()));

    let o = outcomes.clone();
    let _handle = waiter.wait(SurfaceId(1), Some(300), move |out| o.borrow_mut().push(out));
    sched.advance(299);
    assert!(outcomes.borrow().is_empty());
    sched.advance(1);
    assert_eq!(*outcomes.borrow(), vec![WaitOutcome::TimedOut]);
    assert_eq!(events.listener_count(), 0);

    events.fire(SurfaceId(1));
    assert_eq!(outcomes.borrow().len(), 1);
}

#[test]
fn cancelled_wait_never_calls_back() {
    let sched = Rc::new(ManualScheduler::default());
    let events = Rc::new(FakeEvents::default());
    let waiter = CompletionWaiter::new(events.clone(), sched.clone());
    let called = Rc::new(Cell::new(false));

    let c = called.clone();
    let handle = waiter.wait(SurfaceId(1), Some(100), move |_| c.set(true));
    handle.cancel();
    assert_eq!(events.listener_count(), 0);
    assert_eq!(sched.pending(), 0);

    events.fire(SurfaceId(1));
    sched.advance(200);
    assert!(!called.get());
}

#[test]
fn instant_scroll_clamps_out_of_range_targets() {
    let (_sched, surface, _events, scroller) = scroller_fixture();
    assert_eq!(scroller.max_scroll(), Point::new(900.0, 1800.0));

    scroller.scroll_to(-50.0, 5_000.0, ScrollMode::Instant);
    assert_eq!(surface.scroll_position(), Point::new(0.0, 1800.0));

    scroller.scroll_to(f32::NAN, 20.0, ScrollMode::Instant);
    assert_eq!(scroller.position(), Point::new(0.0, 20.0));
}

#[test]
fn smooth_scroll_commits_the_target_on_completion() {
    let (_sched, surface, events, scroller) = scroller_fixture();

    scroller.scroll_to(50.0, 300.0, ScrollMode::Smooth);
    assert!(scroller.is_animating());
    assert_eq!(scroller.token(), AnimationToken(1));
    assert_eq!(surface.target.get(), Point::new(-50.0, -300.0));
    // The raw offset stays put while the transform animates.
    assert_eq!(surface.scroll_position(), Point::ZERO);

    surface.rendered.set(Point::new(-25.0, -150.0));
    assert_eq!(scroller.position(), Point::new(25.0, 150.0));

    surface.settle();
    events.fire(surface.id());

    assert!(!scroller.is_animating());
    assert_eq!(surface.scroll_position(), Point::new(50.0, 300.0));
    assert_eq!(surface.rendered_transform(), Point::ZERO);
    assert_eq!(scroller.position(), Point::new(50.0, 300.0));
    assert_eq!(scroller.token(), AnimationToken(2));
}

#[test]
fn smooth_scroll_clamps_and_resolves_on_timeout() {
    let (sched, surface, _events, scroller) = scroller_fixture();

    scroller.scroll_to(5_000.0, -3.0, ScrollMode::Smooth);
    surface.settle();
    sched.advance(SMOOTH_SCROLL_DURATION_MS);

    assert!(!scroller.is_animating());
    assert_eq!(scroller.position(), Point::new(900.0, 0.0));
}

#[test]
fn timeout_racing_the_last_frame_commits_the_destination() {
    let (sched, surface, events, scroller) = scroller_fixture();

    scroller.scroll_to(300.0, 0.0, ScrollMode::Smooth);
    sched.advance(490);
    surface.rendered.set(Point::new(-290.0, 0.0));

    // The host is still rendering the final frame when the timeout fires.
    sched.advance(10);
    assert!(!scroller.is_animating());
    assert_eq!(scroller.position(), Point::new(300.0, 0.0));
    assert_eq!(surface.scroll_position(), Point::new(300.0, 0.0));
    assert_eq!(surface.rendered_transform(), Point::ZERO);

    // The late notification finds nothing left to resolve.
    surface.settle();
    events.fire(surface.id());
    assert_eq!(scroller.position(), Point::new(300.0, 0.0));
    assert_eq!(events.listener_count(), 0);
}

#[test]
fn repeated_smooth_request_does_not_restart_the_animation() {
    let (_sched, surface, events, scroller) = scroller_fixture();

    scroller.scroll_to(40.0, 60.0, ScrollMode::Smooth);
    scroller.scroll_to(40.0, 60.0, ScrollMode::Smooth);
    scroller.scroll_to(40.2, 59.8, ScrollMode::Smooth);

    assert_eq!(surface.transitions.get(), 1);
    assert_eq!(scroller.token(), AnimationToken(1));
    assert_eq!(events.listener_count(), 1);

    surface.settle();
    events.fire(surface.id());
    assert_eq!(scroller.position(), Point::new(40.0, 60.0));
}

#[test]
fn smooth_request_for_the_current_position_is_a_noop() {
    let (_sched, surface, _events, scroller) = scroller_fixture();
    scroller.scroll_to(0.0, 0.0, ScrollMode::Smooth);
    assert!(!scroller.is_animating());
    assert_eq!(surface.transitions.get(), 0);
    assert_eq!(scroller.token(), AnimationToken(0));
}

#[test]
fn superseded_completion_never_commits() {
    let (sched, surface, events, scroller) = scroller_fixture();

    scroller.scroll_to(100.0, 100.0, ScrollMode::Smooth);
    scroller.scroll_to(400.0, 500.0, ScrollMode::Smooth);
    assert_eq!(scroller.token(), AnimationToken(2));
    assert_eq!(events.listener_count(), 2);

    surface.settle();
    // Both waits hear the same notification; only the live token may flush.
    events.fire(surface.id());
    assert_eq!(scroller.position(), Point::new(400.0, 500.0));
    assert_eq!(scroller.token(), AnimationToken(3));

    sched.advance(2_000);
    assert_eq!(scroller.position(), Point::new(400.0, 500.0));
    assert_eq!(scroller.token(), AnimationToken(3));
}

#[test]
fn late_stale_timeout_after_newer_request_is_ignored() {
    let (sched, surface, _events, scroller) = scroller_fixture();

    scroller.scroll_to(100.0, 0.0, ScrollMode::Smooth);
    sched.advance(250);
    scroller.scroll_to(300.0, 0.0, ScrollMode::Smooth);
    surface.rendered.set(Point::new(-150.0, 0.0));

    // The first request's timeout fires mid-way through the second animation.
    sched.advance(250);
    assert!(scroller.is_animating());
    assert_eq!(surface.scroll_position(), Point::ZERO);

    surface.settle();
    sched.advance(250);
    assert!(!scroller.is_animating());
    assert_eq!(scroller.position(), Point::new(300.0, 0.0));
}

#[test]
fn instant_scroll_during_animation_flushes_then_teleports() {
    let (_sched, surface, events, scroller) = scroller_fixture();

    scroller.scroll_to(200.0, 200.0, ScrollMode::Smooth);
    surface.rendered.set(Point::new(-100.0, -100.0));

    scroller.scroll_to(10.0, 10.0, ScrollMode::Instant);
    assert!(!scroller.is_animating());
    assert_eq!(surface.rendered_transform(), Point::ZERO);
    assert_eq!(scroller.position(), Point::new(10.0, 10.0));
    assert_eq!(scroller.token(), AnimationToken(2));

    events.fire(surface.id());
    assert_eq!(scroller.position(), Point::new(10.0, 10.0));
}

#[test]
fn zero_sized_content_pins_the_scroller_at_origin() {
    let sched = Rc::new(ManualScheduler::default());
    let surface = Rc::new(FakeSurface::new(Size::default(), Size::new(100.0, 100.0)));
    let events = Rc::new(FakeEvents::default());
    let scroller =
        SmoothScroller::new(surface.clone(), events, sched, ScrollerOptions::default());

    assert_eq!(scroller.max_scroll(), Point::ZERO);
    scroller.scroll_to(30.0, 40.0, ScrollMode::Smooth);
    assert!(!scroller.is_animating());
    scroller.scroll_to(30.0, 40.0, ScrollMode::Instant);
    assert_eq!(scroller.position(), Point::ZERO);
}

#[test]
fn scroller_state_snapshot_reports_progress() {
    let (_sched, surface, _events, scroller) = scroller_fixture();
    scroller.scroll_to(80.0, 0.0, ScrollMode::Smooth);
    surface.rendered.set(Point::new(-20.0, 0.0));

    let state = scroller.state();
    assert!(state.animating);
    assert_eq!(state.position, Point::new(20.0, 0.0));
    assert_eq!(state.max_scroll, Point::new(900.0, 1800.0));
    assert_eq!(state.token, AnimationToken(1));

    let sample = scroller.sample();
    assert!(sample.animating);
    assert_eq!(sample.position, Point::new(20.0, 0.0));
}

struct FakeProbe {
    sample: Cell<ScrollSample>,
}

impl FakeProbe {
    fn at(x: f32, y: f32) -> Rc<Self> {
        Rc::new(Self {
            sample: Cell::new(ScrollSample {
                position: Point::new(x, y),
                animating: false,
            }),
        })
    }

    fn set(&self, x: f32, y: f32) {
        self.sample.set(ScrollSample {
            position: Point::new(x, y),
            animating: self.sample.get().animating,
        });
    }

    fn set_animating(&self, animating: bool) {
        let mut s = self.sample.get();
        s.animating = animating;
        self.sample.set(s);
    }
}

impl ScrollProbe for FakeProbe {
    fn sample(&self) -> ScrollSample {
        self.sample.get()
    }
}

fn tracker_fixture(
    probe: &Rc<FakeProbe>,
) -> (
    Rc<ManualScheduler>,
    ScrollTracker,
    Rc<RefCell<Vec<&'static str>>>,
) {
    let sched = Rc::new(ManualScheduler::default());
    let log = Rc::new(RefCell::new(Vec::new()));
    let started = log.clone();
    let ended = log.clone();
    let tracker = ScrollTracker::new(
        probe.clone(),
        sched.clone(),
        ScrollTrackerOptions::default(),
        ScrollTrackerCallbacks::new()
            .on_scroll_started(move || started.borrow_mut().push("started"))
            .on_scroll_ended(move || ended.borrow_mut().push("ended")),
    );
    (sched, tracker, log)
}

#[test]
fn tracker_reports_start_and_end_of_a_scroll() {
    let probe = FakeProbe::at(0.0, 0.0);
    let (_sched, tracker, log) = tracker_fixture(&probe);

    tracker.probe();
    assert!(log.borrow().is_empty());

    probe.set(5.0, 0.0);
    tracker.probe();
    assert_eq!(*log.borrow(), vec!["started"]);
    assert!(tracker.is_scrolling());

    tracker.probe();
    tracker.probe();
    assert_eq!(*log.borrow(), vec!["started", "ended"]);
    assert!(!tracker.is_scrolling());
    // delta = start - last
    assert_eq!(tracker.delta(), Point::new(-5.0, 0.0));
}

#[test]
fn tracker_polls_on_the_configured_interval() {
    let probe = FakeProbe::at(0.0, 0.0);
    let (sched, tracker, log) = tracker_fixture(&probe);
    tracker.start();
    tracker.start();
    assert_eq!(sched.pending(), 1);
    assert!(tracker.state().polling);

    probe.set(0.0, 30.0);
    sched.advance(SCROLL_POLL_INTERVAL_MS - 1);
    assert!(log.borrow().is_empty());
    sched.advance(1);
    assert_eq!(*log.borrow(), vec!["started"]);

    probe.set(0.0, 60.0);
    sched.advance(SCROLL_POLL_INTERVAL_MS);
    assert_eq!(*log.borrow(), vec!["started"]);

    sched.advance(SCROLL_POLL_INTERVAL_MS);
    assert_eq!(*log.borrow(), vec!["started", "ended"]);
    assert_eq!(tracker.delta(), Point::new(0.0, -60.0));

    tracker.stop();
    assert_eq!(sched.pending(), 0);
    assert!(!tracker.state().polling);
}

#[test]
fn tracker_treats_animation_as_movement() {
    let probe = FakeProbe::at(10.0, 10.0);
    let (_sched, tracker, log) = tracker_fixture(&probe);

    probe.set_animating(true);
    tracker.probe();
    assert_eq!(*log.borrow(), vec!["started"]);
    tracker.probe();
    assert!(tracker.is_scrolling());

    probe.set_animating(false);
    tracker.probe();
    assert_eq!(*log.borrow(), vec!["started", "ended"]);
}

#[test]
fn held_mouse_defers_scroll_end_until_release() {
    let probe = FakeProbe::at(0.0, 0.0);
    let (_sched, tracker, log) = tracker_fixture(&probe);
    let input = FakeInput::default();
    tracker.attach_input(&input);

    input.emit(InputEvent::mouse(InputPhase::Press, Point::new(3.0, 3.0)));
    assert!(tracker.pressed().mouse);
    probe.set(0.0, 12.0);
    tracker.probe();
    tracker.probe();
    tracker.probe();
    assert_eq!(*log.borrow(), vec!["started"]);

    input.emit(InputEvent::mouse(InputPhase::Release, Point::new(3.0, 3.0)));
    assert_eq!(*log.borrow(), vec!["started"]);
    tracker.probe();
    assert_eq!(*log.borrow(), vec!["started", "ended"]);

    tracker.detach_input();
    assert_eq!(input.listener_count(), 0);
}

#[test]
fn missing_touch_release_is_assumed_after_the_grace_period() {
    let probe = FakeProbe::at(0.0, 0.0);
    let (sched, tracker, log) = tracker_fixture(&probe);
    tracker.start();
    tracker.press(Modality::Touch);

    probe.set(0.0, 40.0);
    sched.advance(100);
    assert_eq!(*log.borrow(), vec!["started"]);

    sched.advance(100);
    assert!(tracker.state().touch_grace_armed);
    assert!(tracker.is_scrolling());

    sched.advance(TOUCH_RELEASE_GRACE_MS);
    assert_eq!(*log.borrow(), vec!["started", "ended"]);
    assert!(!tracker.pressed().touch);
    assert!(!tracker.state().touch_grace_armed);
}

#[test]
fn movement_disarms_the_touch_grace_timer() {
    let probe = FakeProbe::at(0.0, 0.0);
    let (sched, tracker, log) = tracker_fixture(&probe);
    tracker.press(Modality::Touch);

    probe.set(0.0, 40.0);
    tracker.probe();
    tracker.probe();
    assert!(tracker.state().touch_grace_armed);
    assert_eq!(sched.pending(), 1);

    probe.set(0.0, 80.0);
    tracker.probe();
    assert!(!tracker.state().touch_grace_armed);
    assert_eq!(sched.pending(), 0);

    sched.advance(1_000);
    assert_eq!(*log.borrow(), vec!["started"]);
    assert!(tracker.pressed().touch);
}

#[test]
fn touch_grace_without_a_scroll_only_clears_the_press() {
    let probe = FakeProbe::at(0.0, 0.0);
    let (sched, tracker, log) = tracker_fixture(&probe);
    tracker.press(Modality::Touch);
    tracker.probe();
    sched.advance(TOUCH_RELEASE_GRACE_MS);
    assert!(log.borrow().is_empty());
    assert!(!tracker.pressed().touch);
}

#[test]
fn dropping_the_tracker_clears_its_timers() {
    let probe = FakeProbe::at(0.0, 0.0);
    let (sched, tracker, _log) = tracker_fixture(&probe);
    tracker.start();
    assert_eq!(sched.pending(), 1);
    drop(tracker);
    assert_eq!(sched.pending(), 0);
}

#[test]
fn tracker_follows_a_smooth_scroller() {
    let (sched, surface, _events, scroller) = scroller_fixture();
    let log = Rc::new(RefCell::new(Vec::new()));
    let started = log.clone();
    let ended = log.clone();
    let tracker = ScrollTracker::new(
        Rc::new(scroller.clone()),
        sched.clone(),
        ScrollTrackerOptions::default(),
        ScrollTrackerCallbacks::new()
            .on_scroll_started(move || started.borrow_mut().push("started"))
            .on_scroll_ended(move || ended.borrow_mut().push("ended")),
    );
    tracker.start();

    scroller.scroll_to(0.0, 100.0, ScrollMode::Smooth);
    sched.advance(100);
    assert_eq!(*log.borrow(), vec!["started"]);

    surface.settle();
    sched.advance(400);
    assert!(!scroller.is_animating());
    sched.advance(100);
    assert_eq!(*log.borrow(), vec!["started", "ended"]);
    assert_eq!(tracker.delta(), Point::new(0.0, -100.0));
}

#[test]
fn pointer_tracker_suppresses_moves_without_displacement() {
    let count = Rc::new(Cell::new(0));
    let c = count.clone();
    let pointer = PointerTracker::new(move || c.set(c.get() + 1));

    let at = Point::new(12.0, 34.0);
    assert!(pointer.handle(&InputEvent::mouse(InputPhase::Move, at)));
    assert!(!pointer.handle(&InputEvent::mouse(InputPhase::Move, at)));
    assert_eq!(count.get(), 1);
    assert_eq!(pointer.last_mouse(), Some(at));

    assert!(pointer.handle(&InputEvent::mouse(InputPhase::Move, Point::new(13.0, 34.0))));
    assert_eq!(count.get(), 2);
}

#[test]
fn pointer_tracker_always_signals_presses_and_touch_moves() {
    let count = Rc::new(Cell::new(0));
    let c = count.clone();
    let pointer = PointerTracker::new(move || c.set(c.get() + 1));
    let input = FakeInput::default();
    pointer.attach(&input);

    let at = Point::new(1.0, 1.0);
    input.emit(InputEvent::mouse(InputPhase::Press, at));
    input.emit(InputEvent::mouse(InputPhase::Press, at));
    input.emit(InputEvent::mouse(InputPhase::Move, at));
    input.emit(InputEvent::mouse(InputPhase::Release, at));
    input.emit(InputEvent::touch(InputPhase::Press));
    input.emit(InputEvent::touch(InputPhase::Move));
    input.emit(InputEvent::touch(InputPhase::Move));
    input.emit(InputEvent::touch(InputPhase::Release));
    assert_eq!(count.get(), 5);

    pointer.detach();
    assert_eq!(input.listener_count(), 0);
    input.emit(InputEvent::touch(InputPhase::Press));
    assert_eq!(count.get(), 5);
}

#[test]
fn tooltip_is_centered_above_its_target() {
    let options = TooltipOptions::default();
    let pos = tooltip_position(
        Rect::new(100.0, 200.0, 40.0, 20.0),
        Size::new(60.0, 24.0),
        Size::new(800.0, 600.0),
        &options,
    );
    assert_eq!(pos, Point::new(90.0, 168.0));
}

#[test]
fn tooltip_position_is_clamped_to_every_edge() {
    let options = TooltipOptions::default();
    let viewport = Size::new(300.0, 200.0);
    let tip = Size::new(80.0, 20.0);

    let top_left = tooltip_position(Rect::new(0.0, 0.0, 10.0, 10.0), tip, viewport, &options);
    assert_eq!(top_left, Point::new(5.0, 5.0));

    let right = tooltip_position(Rect::new(290.0, 100.0, 10.0, 10.0), tip, viewport, &options);
    assert_eq!(right.x, 300.0 - 80.0 - 5.0);

    let bottom = tooltip_position(Rect::new(100.0, 400.0, 10.0, 10.0), tip, viewport, &options);
    assert_eq!(bottom.y, 200.0 - 20.0 - 5.0);
}

#[test]
fn tooltip_larger_than_viewport_sticks_to_the_margin() {
    let options = TooltipOptions::default();
    let pos = tooltip_position(
        Rect::new(50.0, 50.0, 10.0, 10.0),
        Size::new(500.0, 500.0),
        Size::new(100.0, 100.0),
        &options,
    );
    assert_eq!(pos, Point::new(5.0, 5.0));
}

type HoverListener = (u64, ElementId, Rc<RefCell<Box<dyn FnMut()>>>);
type ExitListener = (u64, ElementId, Box<dyn FnOnce()>);

#[derive(Default)]
struct FakeDocument {
    elements: Vec<(ElementId, Option<String>, Rect)>,
    log: RefCell<Vec<String>>,
    position: Cell<Point>,
    next_id: Cell<u64>,
    hovers: Rc<RefCell<Vec<HoverListener>>>,
    exits: Rc<RefCell<Vec<ExitListener>>>,
}

impl FakeDocument {
    fn new() -> Self {
        Self {
            elements: vec![
                (
                    ElementId(1),
                    Some("Shutter".to_string()),
                    Rect::new(100.0, 300.0, 40.0, 40.0),
                ),
                (
                    ElementId(2),
                    Some("Timer".to_string()),
                    Rect::new(200.0, 300.0, 40.0, 40.0),
                ),
                (ElementId(3), None, Rect::new(0.0, 0.0, 10.0, 10.0)),
            ],
            ..Self::default()
        }
    }

    fn id(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn hover(&self, element: ElementId) {
        let hit: Vec<_> = self
            .hovers
            .borrow()
            .iter()
            .filter(|(_, e, _)| *e == element)
            .map(|(_, _, f)| Rc::clone(f))
            .collect();
        for f in hit {
            let mut f = f.borrow_mut();
            (&mut *f)();
        }
    }

    fn leave(&self, element: ElementId) {
        let hit = {
            let mut exits = self.exits.borrow_mut();
            let all = core::mem::take(&mut *exits);
            let (hit, keep): (Vec<_>, Vec<_>) =
                all.into_iter().partition(|(_, e, _)| *e == element);
            *exits = keep;
            hit
        };
        for (_, _, f) in hit {
            f();
        }
    }

    fn log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

impl TooltipHost for FakeDocument {
    fn labeled_elements(&self) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|(_, label, _)| label.is_some())
            .map(|(e, _, _)| *e)
            .collect()
    }

    fn label(&self, element: ElementId) -> Option<String> {
        self.elements
            .iter()
            .find(|(e, _, _)| *e == element)
            .and_then(|(_, label, _)| label.clone())
    }

    fn bounds(&self, element: ElementId) -> Rect {
        self.elements
            .iter()
            .find(|(e, _, _)| *e == element)
            .map(|(_, _, r)| *r)
            .unwrap_or_default()
    }

    fn viewport_size(&self) -> Size {
        Size::new(800.0, 600.0)
    }

    fn set_tooltip_text(&self, text: &str) {
        self.log.borrow_mut().push(alloc::format!("text:{text}"));
    }

    fn tooltip_size(&self) -> Size {
        Size::new(60.0, 20.0)
    }

    fn set_tooltip_position(&self, position: Point) {
        self.position.set(position);
    }

    fn set_tooltip_visible(&self, visible: bool) {
        let entry = if visible { "show" } else { "hide" };
        self.log.borrow_mut().push(entry.to_string());
    }

    fn on_hover(&self, element: ElementId, f: Box<dyn FnMut()>) -> Subscription {
        let id = self.id();
        self.hovers
            .borrow_mut()
            .push((id, element, Rc::new(RefCell::new(f))));
        let hovers = Rc::clone(&self.hovers);
        Subscription::new(move || hovers.borrow_mut().retain(|(i, _, _)| *i != id))
    }

    fn on_hover_exit(&self, element: ElementId, f: Box<dyn FnOnce()>) -> Subscription {
        let id = self.id();
        self.exits.borrow_mut().push((id, element, f));
        let exits = Rc::clone(&self.exits);
        Subscription::new(move || exits.borrow_mut().retain(|(i, _, _)| *i != id))
    }
}

fn tooltip_fixture() -> (Rc<ManualScheduler>, Rc<FakeDocument>, TooltipManager) {
    let sched = Rc::new(ManualScheduler::default());
    let doc = Rc::new(FakeDocument::new());
    let manager = TooltipManager::new(doc.clone(), sched.clone(), TooltipOptions::default());
    manager.initialize();
    (sched, doc, manager)
}

#[test]
fn tooltip_initialize_tracks_labeled_elements_once() {
    let (_sched, doc, manager) = tooltip_fixture();
    manager.initialize();
    assert_eq!(doc.hovers.borrow().len(), 2);
    assert!(manager.is_tracked(ElementId(1)));
    assert!(!manager.is_tracked(ElementId(3)));
}

#[test]
fn tooltip_reveals_after_layout_settles() {
    let (sched, doc, manager) = tooltip_fixture();

    doc.hover(ElementId(1));
    assert_eq!(doc.log(), vec!["text:Shutter"]);
    assert!(!manager.is_visible());

    sched.advance(0);
    assert_eq!(doc.log(), vec!["text:Shutter", "show"]);
    assert_eq!(manager.current(), Some(ElementId(1)));
    assert_eq!(doc.position.get(), Point::new(90.0, 272.0));
    assert!(!manager.is_busy());

    doc.leave(ElementId(1));
    assert!(!manager.is_visible());
    assert_eq!(doc.log().last().map(String::as_str), Some("hide"));
    assert!(doc.exits.borrow().is_empty());
}

#[test]
fn tooltip_shows_are_serialized_across_elements() {
    let (sched, doc, manager) = tooltip_fixture();

    doc.hover(ElementId(1));
    doc.hover(ElementId(2));
    assert!(manager.is_busy());
    assert_eq!(doc.log(), vec!["text:Shutter"]);

    sched.advance(0);
    assert_eq!(
        doc.log(),
        vec!["text:Shutter", "show", "hide", "text:Timer", "show"]
    );
    assert_eq!(manager.current(), Some(ElementId(2)));
    assert_eq!(doc.exits.borrow().len(), 1);
}

#[test]
fn leaving_before_reveal_cancels_the_show() {
    let (sched, doc, manager) = tooltip_fixture();

    doc.hover(ElementId(1));
    doc.leave(ElementId(1));
    sched.advance(0);

    assert_eq!(doc.log(), vec!["text:Shutter"]);
    assert!(!manager.is_visible());
    assert!(!manager.is_busy());
}

#[test]
fn tooltip_dispose_detaches_every_trigger() {
    let (sched, doc, manager) = tooltip_fixture();
    doc.hover(ElementId(2));
    sched.advance(0);
    assert!(manager.is_visible());

    manager.dispose();
    assert!(doc.hovers.borrow().is_empty());
    assert!(doc.exits.borrow().is_empty());
    assert!(!manager.is_visible());

    doc.hover(ElementId(1));
    sched.advance(0);
    assert!(!manager.is_visible());
}

#[test]
fn tooltip_untrack_and_track_follow_document_changes() {
    let (sched, doc, manager) = tooltip_fixture();
    manager.untrack(ElementId(1));
    assert_eq!(doc.hovers.borrow().len(), 1);

    doc.hover(ElementId(1));
    sched.advance(0);
    assert!(!manager.is_visible());

    manager.track(ElementId(1));
    doc.hover(ElementId(1));
    sched.advance(0);
    assert_eq!(manager.current(), Some(ElementId(1)));
}
