use camfx::{Rect, Size, TooltipManager, TooltipOptions};
use camfx_adapter::SimHost;

fn main() {
    // Example: hovering quickly across buttons never interleaves tooltip updates.
    let host = SimHost::new(Size::new(360.0, 640.0));
    let doc = host.document();
    let shutter = doc.add_element(Some("Take photo"), Rect::new(150.0, 560.0, 60.0, 60.0));
    let gallery = doc.add_element(Some("Open gallery"), Rect::new(20.0, 570.0, 40.0, 40.0));
    let switch = doc.add_element(Some("Switch camera"), Rect::new(300.0, 570.0, 40.0, 40.0));

    let tooltips =
        TooltipManager::new(host.tooltip_host(), host.scheduler(), TooltipOptions::default());
    tooltips.initialize();

    for element in [gallery, shutter, switch] {
        doc.hover(element);
    }
    println!("queued: busy={} tooltip={:?}", tooltips.is_busy(), doc.tooltip());

    host.advance(0);
    println!("settled: current={:?} tooltip={:?}", tooltips.current(), doc.tooltip());

    doc.leave(switch);
    println!("after leave: visible={}", doc.tooltip().visible);

    tooltips.dispose();
    println!("hover listeners left: {}", doc.hover_listener_count());
}
