use camfx::{ScrollMode, ScrollTrackerCallbacks, Size};
use camfx_adapter::{ControllerOptions, ScrollController, SimHost};

fn main() {
    // Example: a mode strip scrolled programmatically while a tracker watches it.
    //
    // A real adapter would implement the host traits over its UI toolkit; the simulated host
    // stands in for the browser and is driven by `advance(ms)`.
    let host = SimHost::new(Size::new(800.0, 600.0));
    let strip = host.create_surface(Size::new(2400.0, 80.0), Size::new(800.0, 80.0));

    let callbacks = ScrollTrackerCallbacks::new()
        .on_scroll_started(|| println!("  scroll started"))
        .on_scroll_ended(|| println!("  scroll ended"));
    let c = ScrollController::new(
        strip.clone(),
        host.events(),
        host.scheduler(),
        &**host.input(),
        ControllerOptions::default(),
        callbacks,
        || println!("  user interaction"),
    );

    c.scroll_to(900.0, 0.0, ScrollMode::Smooth);
    // Retarget halfway through; only the second animation commits.
    host.advance(250);
    println!("t={} visual={:?}", host.now(), strip.visual_position());
    c.scroll_to(1200.0, 0.0, ScrollMode::Smooth);

    while c.is_animating() || c.is_scrolling() {
        host.advance(100);
        println!(
            "t={} position={:?} animating={}",
            host.now(),
            c.position(),
            c.is_animating()
        );
    }
    println!("done: position={:?} delta={:?}", c.position(), c.delta());

    host.input().touch_start();
    host.input().touch_end();
    c.dispose();
    println!("pending timers after dispose: {}", host.clock().pending());
}
