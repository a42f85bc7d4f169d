//! Dispatch of queued UI events to a carousel.
//!
//! The UI layer emits events on the [`EventBus`](crate::core::EventBus)
//! (clicks, key presses, timer fires, animation ends); the update loop drains
//! the queue with `poll()` and hands each event to [`handle_carousel_event`].
//!
//! State-change events the carousel itself emits
//! (`CurrentIndexChangedEvent`, `LightboxChangedEvent`) are for renderers and
//! are not handled here.

use log::trace;

use crate::core::carousel::Carousel;
use crate::core::carousel_events::*;
use crate::core::event_bus::{BoxedEvent, downcast_event};

/// Apply one event. Returns true if the event was meant for the carousel.
pub fn handle_carousel_event(event: &BoxedEvent, carousel: &mut Carousel) -> bool {
    // === Navigation ===
    if downcast_event::<NextEvent>(event).is_some() {
        carousel.next();
        return true;
    }
    if downcast_event::<PreviousEvent>(event).is_some() {
        carousel.previous();
        return true;
    }
    if let Some(GotoEvent(index)) = downcast_event::<GotoEvent>(event) {
        carousel.goto(*index);
        return true;
    }
    if downcast_event::<TogglePauseEvent>(event).is_some() {
        carousel.toggle_pause();
        return true;
    }
    if let Some(SetPausedEvent(paused)) = downcast_event::<SetPausedEvent>(event) {
        carousel.set_paused(*paused);
        return true;
    }
    if let Some(TimerFiredEvent(id)) = downcast_event::<TimerFiredEvent>(event) {
        carousel.on_timer(*id);
        return true;
    }
    if let Some(TransitionEndEvent(id)) = downcast_event::<TransitionEndEvent>(event) {
        carousel.complete_transition(*id);
        return true;
    }

    // === Lightbox ===
    if let Some(e) = downcast_event::<OpenLightboxEvent>(event) {
        let images = e.images.clone().unwrap_or_else(|| carousel.images().clone());
        carousel.open_lightbox(images, e.start);
        return true;
    }
    if downcast_event::<CloseLightboxEvent>(event).is_some() {
        carousel.close_lightbox();
        return true;
    }
    if let Some(KeyPressedEvent(key)) = downcast_event::<KeyPressedEvent>(event) {
        if !carousel.handle_key(key) {
            trace!("Unbound key: {}", key);
        }
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event_bus::EventBus;
    use crate::core::scroll_lock::PageScroll;
    use crate::core::timers::IntervalTimers;
    use crate::core::{CarouselProps, TimerHost};
    use crate::entities::MediaSequence;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn carousel(timers: Arc<IntervalTimers>, page: Arc<PageScroll>) -> Carousel {
        let props = CarouselProps {
            interval_ms: 1000,
            ..Default::default()
        };
        Carousel::new(MediaSequence::from_sources(["a", "b", "c"]), props, timers, page).unwrap()
    }

    fn drain(bus: &EventBus, carousel: &mut Carousel) -> usize {
        bus.poll()
            .iter()
            .filter(|e| handle_carousel_event(e, carousel))
            .count()
    }

    #[test]
    fn test_dispatch_navigation_and_lightbox() {
        let timers = Arc::new(IntervalTimers::new());
        let page = Arc::new(PageScroll::default());
        let bus = EventBus::new();
        let mut c = carousel(timers, page.clone());

        bus.emit(NextEvent);
        bus.emit(NextEvent);
        bus.emit(PreviousEvent);
        bus.emit(GotoEvent(2));
        bus.emit(OpenLightboxEvent { images: None, start: 0 });
        bus.emit(KeyPressedEvent("ArrowLeft".into()));
        bus.emit(KeyPressedEvent("q".into()));
        assert_eq!(drain(&bus, &mut c), 7);

        assert_eq!(c.current_index(), 2);
        assert_eq!(c.lightbox().index(), Some(2));
        assert!(page.is_locked());

        bus.emit(KeyPressedEvent("Escape".into()));
        drain(&bus, &mut c);
        assert!(!c.lightbox().is_open());
        assert!(!page.is_locked());
    }

    #[test]
    fn test_timer_events_through_bus() {
        let timers = Arc::new(IntervalTimers::new());
        let bus = EventBus::new();
        let mut c = carousel(timers.clone(), Arc::new(PageScroll::default()));
        c.on_mount();

        for id in timers.advance(Duration::from_millis(2000)) {
            bus.emit(TimerFiredEvent(id));
        }
        drain(&bus, &mut c);
        assert_eq!(c.current_index(), 2);

        bus.emit(SetPausedEvent(true));
        drain(&bus, &mut c);
        assert!(timers.advance(Duration::from_millis(5000)).is_empty());
    }

    #[test]
    fn test_state_events_reach_renderer() {
        let timers: Arc<dyn TimerHost> = Arc::new(IntervalTimers::new());
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        bus.subscribe::<CurrentIndexChangedEvent, _>(move |e| s.lock().unwrap().push(e.index));

        let mut c = Carousel::new(
            MediaSequence::from_sources(["a", "b"]),
            CarouselProps::default(),
            timers,
            Arc::new(PageScroll::default()),
        )
        .unwrap();
        c.set_emitter(bus.emitter());

        bus.emit(NextEvent);
        bus.emit(NextEvent);
        // State events are queued too but not handled as input
        let events = bus.poll();
        for e in &events {
            handle_carousel_event(e, &mut c);
        }
        assert_eq!(*seen.lock().unwrap(), vec![1, 0]);
        assert_eq!(bus.poll().len(), 2);
    }
}
