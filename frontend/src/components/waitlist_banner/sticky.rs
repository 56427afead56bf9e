//! Sticky positioning for the banner.
//!
//! The banner is `Floating` in normal document flow until its original
//! position scrolls under the fixed site header, then `Stuck` below the header
//! until the user scrolls back. Two drivers feed the same state machine:
//!
//! * [`ObserverStrategy`] watches a zero-size sentinel left at the banner's
//!   original spot with an `IntersectionObserver` whose top margin is the
//!   negative header height. No layout reads, no per-frame work.
//! * [`PollingStrategy`] compares `scrollY` against a reference offset captured
//!   once after layout, with scroll handling coalesced to one run per
//!   animation frame.
//!
//! While stuck, a placeholder of the banner's measured height holds its place
//! in the flow so the page does not jump.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::{Array, Function};
use web_sys::{Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, Window};
use yew::functional::hook;
use yew::prelude::*;

use crate::config;
use crate::env::{BrowserWindow, EnvError, ScrollPosition, ViewportMetrics, WindowListener};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StickyState {
    #[default]
    Floating,
    Stuck,
}

impl StickyState {
    pub fn is_stuck(self) -> bool {
        self == StickyState::Stuck
    }

    fn from_should_stick(should_stick: bool) -> Self {
        if should_stick {
            StickyState::Stuck
        } else {
            StickyState::Floating
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StickyStrategy {
    #[default]
    Observer,
    Polling,
}

pub fn header_height_for_width(width: f64) -> f64 {
    if width <= config::MOBILE_BREAKPOINT_PX {
        config::MOBILE_HEADER_HEIGHT_PX
    } else {
        config::DESKTOP_HEADER_HEIGHT_PX
    }
}

pub fn header_height(viewport: &impl ViewportMetrics) -> f64 {
    header_height_for_width(viewport.viewport_width())
}

/// Height the placeholder should reserve, if one should be rendered.
pub fn placeholder_height(state: StickyState, measured: f64) -> Option<f64> {
    if state.is_stuck() && measured > 0.0 {
        Some(measured)
    } else {
        None
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StickyController {
    state: StickyState,
}

impl StickyController {
    pub fn starting_from(state: StickyState) -> Self {
        Self { state }
    }

    #[cfg(test)]
    pub fn state(&self) -> StickyState {
        self.state
    }

    /// Returns the new state when `should_stick` changes it.
    pub fn apply(&mut self, should_stick: bool) -> Option<StickyState> {
        let next = StickyState::from_should_stick(should_stick);
        if next == self.state {
            return None;
        }
        debug!("Waitlist banner {:?} -> {:?}", self.state, next);
        self.state = next;
        Some(next)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PollingStrategy {
    reference_offset: Option<f64>,
    controller: StickyController,
}

impl PollingStrategy {
    pub fn starting_from(state: StickyState) -> Self {
        Self {
            reference_offset: None,
            controller: StickyController::starting_from(state),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> StickyState {
        self.controller.state()
    }

    pub fn reference_offset(&self) -> Option<f64> {
        self.reference_offset
    }

    /// Records the scroll offset at which the banner meets the header.
    /// Only the first capture counts.
    pub fn capture(&mut self, element_document_top: f64, header_height: f64) -> bool {
        if self.reference_offset.is_some() {
            return false;
        }
        let offset = element_document_top - header_height;
        debug!("Captured sticky reference offset {}px", offset);
        self.reference_offset = Some(offset);
        true
    }

    /// Stays floating until a reference offset exists.
    pub fn on_scroll(&mut self, scroll_y: f64) -> Option<StickyState> {
        let reference = self.reference_offset?;
        self.controller.apply(scroll_y >= reference)
    }

    pub fn on_scroll_with(&mut self, scroll: &impl ScrollPosition) -> Option<StickyState> {
        self.on_scroll(scroll.scroll_y())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObserverStrategy {
    controller: StickyController,
}

impl ObserverStrategy {
    pub fn starting_from(state: StickyState) -> Self {
        Self {
            controller: StickyController::starting_from(state),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> StickyState {
        self.controller.state()
    }

    /// Shrinks the observer root by the header so crossings line up with its bottom edge.
    pub fn root_margin(header_height: f64) -> String {
        format!("-{}px 0px 0px 0px", header_height)
    }

    pub fn on_intersection(&mut self, sentinel_is_intersecting: bool) -> Option<StickyState> {
        self.controller.apply(!sentinel_is_intersecting)
    }
}

/// "Already scheduled" guard for coalescing scroll events into animation frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameThrottle {
    scheduled: bool,
}

impl FrameThrottle {
    pub fn try_schedule(&mut self) -> bool {
        if self.scheduled {
            return false;
        }
        self.scheduled = true;
        true
    }

    pub fn frame_ran(&mut self) {
        self.scheduled = false;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    pub header_height: f64,
    pub banner_height: f64,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            header_height: config::DESKTOP_HEADER_HEIGHT_PX,
            banner_height: 0.0,
        }
    }
}

/// Banner height to reserve after a measurement. The stuck banner is compacted
/// by CSS, so a measurement taken while stuck keeps the floating height.
pub fn next_banner_height(state: StickyState, previous: f64, measured: f64) -> f64 {
    if state.is_stuck() && previous > 0.0 {
        previous
    } else {
        measured
    }
}

fn measure_layout(browser: &BrowserWindow, banner: &NodeRef, state: StickyState, previous: f64) -> Layout {
    let measured = banner
        .cast::<HtmlElement>()
        .map(|element| f64::from(element.offset_height()))
        .unwrap_or(0.0);

    Layout {
        header_height: header_height(browser),
        banner_height: next_banner_height(state, previous, measured),
    }
}

/// Header height and banner height, re-measured on resize while `active`.
/// `sticky` holds the state from the latest render.
#[hook]
pub fn use_layout(banner: NodeRef, active: bool, sticky: Rc<RefCell<StickyState>>) -> Layout {
    let layout = use_state_eq(|| {
        BrowserWindow::current()
            .map(|browser| Layout {
                header_height: header_height(&browser),
                banner_height: 0.0,
            })
            .unwrap_or_default()
    });

    {
        let layout = layout.clone();
        use_effect_with_deps(
            move |active| {
                let mut resize = None;

                if *active {
                    match BrowserWindow::current() {
                        Ok(browser) => {
                            let first = measure_layout(&browser, &banner, *sticky.borrow(), 0.0);
                            let last_height = Rc::new(Cell::new(first.banner_height));
                            layout.set(first);

                            let window = browser.raw().clone();
                            let listener = WindowListener::passive(&window, "resize", false, move || {
                                let next = measure_layout(&browser, &banner, *sticky.borrow(), last_height.get());
                                last_height.set(next.banner_height);
                                layout.set(next);
                            });
                            match listener {
                                Ok(listener) => resize = Some(listener),
                                Err(err) => warn!("{}", err),
                            }
                        }
                        Err(err) => warn!("Skipping banner measurement: {}", err),
                    }
                }

                move || drop(resize)
            },
            active,
        );
    }

    *layout
}

struct ObserverSubscription {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array)>,
}

impl ObserverSubscription {
    fn observe(
        sentinel: &Element,
        header_height: f64,
        initial: StickyState,
        on_change: Callback<StickyState>,
    ) -> Result<Self, EnvError> {
        let mut strategy = ObserverStrategy::starting_from(initial);

        let callback = Closure::wrap(Box::new(move |entries: Array| {
            // Entries arrive oldest first; only the latest crossing matters.
            let latest = entries
                .iter()
                .last()
                .map(|entry| entry.unchecked_into::<IntersectionObserverEntry>());

            if let Some(entry) = latest {
                if let Some(next) = strategy.on_intersection(entry.is_intersecting()) {
                    on_change.emit(next);
                }
            }
        }) as Box<dyn FnMut(Array)>);

        let options = IntersectionObserverInit::new();
        options.set_root_margin(&ObserverStrategy::root_margin(header_height));
        options.set_threshold(&JsValue::from_f64(0.0));

        let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
            .map_err(|err| EnvError::Observer(EnvError::js_message(&err)))?;
        observer.observe(sentinel);

        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for ObserverSubscription {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Sticky state from an intersection observer on `sentinel`. Re-subscribes
/// whenever the header height changes.
#[hook]
pub fn use_sticky_observer(sentinel: NodeRef, active: bool, header_height: f64) -> StickyState {
    let state = use_state_eq(StickyState::default);

    {
        let state = state.clone();
        use_effect_with_deps(
            move |&(active, header_height)| {
                let mut subscription = None;

                if active {
                    if let Some(element) = sentinel.cast::<Element>() {
                        let current = *state;
                        let on_change = Callback::from(move |next| state.set(next));
                        match ObserverSubscription::observe(&element, header_height, current, on_change) {
                            Ok(observing) => subscription = Some(observing),
                            Err(err) => warn!("Waitlist banner will not stick: {}", err),
                        }
                    }
                }

                move || drop(subscription)
            },
            (active, header_height),
        );
    }

    *state
}

fn capture_reference(strategy: &RefCell<PollingStrategy>, browser: &BrowserWindow, anchor: &NodeRef) {
    if strategy.borrow().reference_offset().is_some() {
        return;
    }
    let Some(element) = anchor.cast::<Element>() else {
        return;
    };

    let document_top = element.get_bounding_client_rect().top() + browser.scroll_y();
    strategy.borrow_mut().capture(document_top, header_height(browser));
}

fn evaluate(strategy: &RefCell<PollingStrategy>, browser: &BrowserWindow, on_change: &Callback<StickyState>) {
    let next = strategy.borrow_mut().on_scroll_with(browser);
    if let Some(next) = next {
        on_change.emit(next);
    }
}

struct PollingSubscription {
    window: Window,
    pending_frame: Rc<Cell<Option<i32>>>,
    _scroll: WindowListener,
    _capture: Timeout,
    _frame: Closure<dyn FnMut()>,
}

impl PollingSubscription {
    fn start(
        browser: BrowserWindow,
        anchor: NodeRef,
        initial: StickyState,
        on_change: Callback<StickyState>,
    ) -> Result<Self, EnvError> {
        let strategy = Rc::new(RefCell::new(PollingStrategy::starting_from(initial)));
        let throttle = Rc::new(RefCell::new(FrameThrottle::default()));
        let pending_frame = Rc::new(Cell::new(None));

        let capture = {
            let strategy = strategy.clone();
            let browser = browser.clone();
            let anchor = anchor.clone();
            let on_change = on_change.clone();
            Timeout::new(config::REFERENCE_CAPTURE_DELAY_MS, move || {
                capture_reference(&strategy, &browser, &anchor);
                evaluate(&strategy, &browser, &on_change);
            })
        };

        let frame = {
            let browser = browser.clone();
            let throttle = throttle.clone();
            let pending_frame = pending_frame.clone();
            Closure::wrap(Box::new(move || {
                pending_frame.set(None);
                throttle.borrow_mut().frame_ran();
                // A scroll can beat the deferred capture; take the offset now.
                capture_reference(&strategy, &browser, &anchor);
                evaluate(&strategy, &browser, &on_change);
            }) as Box<dyn FnMut()>)
        };

        let scroll = {
            let window = browser.raw().clone();
            let frame_fn: Function = frame.as_ref().unchecked_ref::<Function>().clone();
            let pending_frame = pending_frame.clone();
            WindowListener::passive(browser.raw(), "scroll", false, move || {
                if !throttle.borrow_mut().try_schedule() {
                    return;
                }
                match window.request_animation_frame(&frame_fn) {
                    Ok(id) => pending_frame.set(Some(id)),
                    Err(_) => throttle.borrow_mut().frame_ran(),
                }
            })?
        };

        Ok(Self {
            window: browser.raw().clone(),
            pending_frame,
            _scroll: scroll,
            _capture: capture,
            _frame: frame,
        })
    }
}

impl Drop for PollingSubscription {
    fn drop(&mut self) {
        if let Some(id) = self.pending_frame.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
    }
}

/// Sticky state from polling `scrollY` against a lazily captured offset of `anchor`.
#[hook]
pub fn use_sticky_polling(anchor: NodeRef, active: bool) -> StickyState {
    let state = use_state_eq(StickyState::default);

    {
        let state = state.clone();
        use_effect_with_deps(
            move |active| {
                let mut subscription = None;

                if *active {
                    let current = *state;
                    let on_change = Callback::from(move |next| state.set(next));
                    let started = BrowserWindow::current()
                        .and_then(|browser| PollingSubscription::start(browser, anchor, current, on_change));
                    match started {
                        Ok(polling) => subscription = Some(polling),
                        Err(err) => warn!("Waitlist banner will not stick: {}", err),
                    }
                }

                move || drop(subscription)
            },
            active,
        );
    }

    *state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockViewportMetrics;

    const SENTINEL_TOP: f64 = 400.0;
    const HEADER: f64 = 72.0;

    // Scroll offsets around the 328px threshold, up and back down.
    const TRACE: [f64; 9] = [0.0, 100.0, 327.0, 328.0, 500.0, 1_200.0, 328.0, 327.5, 0.0];

    struct FixedScroll(f64);

    impl ScrollPosition for FixedScroll {
        fn scroll_y(&self) -> f64 {
            self.0
        }
    }

    // What an observer with a `-HEADER` top margin reports for a zero-size
    // sentinel; touching the header edge counts as crossed.
    fn sentinel_intersecting(scroll_y: f64) -> bool {
        SENTINEL_TOP - scroll_y > HEADER
    }

    fn expected(scroll_y: f64) -> StickyState {
        StickyState::from_should_stick(scroll_y >= SENTINEL_TOP - HEADER)
    }

    #[test]
    fn header_height_follows_breakpoint() {
        assert_eq!(header_height_for_width(500.0), 56.0);
        assert_eq!(header_height_for_width(768.0), 56.0);
        assert_eq!(header_height_for_width(769.0), 72.0);
        assert_eq!(header_height_for_width(1200.0), 72.0);
    }

    #[test]
    fn header_height_reads_the_viewport() {
        let mut narrow = MockViewportMetrics::new();
        narrow.expect_viewport_width().return_const(500.0);
        assert_eq!(header_height(&narrow), 56.0);

        let mut wide = MockViewportMetrics::new();
        wide.expect_viewport_width().times(1).return_const(1200.0);
        assert_eq!(header_height(&wide), 72.0);
    }

    #[test]
    fn controller_reports_only_changes() {
        let mut controller = StickyController::default();
        assert_eq!(controller.apply(false), None);
        assert_eq!(controller.apply(true), Some(StickyState::Stuck));
        assert_eq!(controller.apply(true), None);
        assert_eq!(controller.apply(false), Some(StickyState::Floating));
        assert_eq!(controller.state(), StickyState::Floating);
    }

    #[test]
    fn polling_sticks_at_and_above_threshold() {
        let mut polling = PollingStrategy::default();
        assert!(polling.capture(SENTINEL_TOP, HEADER));
        assert_eq!(polling.reference_offset(), Some(328.0));

        for scroll_y in TRACE {
            polling.on_scroll(scroll_y);
            assert_eq!(polling.state(), expected(scroll_y), "scrollY {}", scroll_y);
        }
    }

    #[test]
    fn observer_sticks_at_and_above_threshold() {
        let mut observer = ObserverStrategy::default();

        for scroll_y in TRACE {
            observer.on_intersection(sentinel_intersecting(scroll_y));
            assert_eq!(observer.state(), expected(scroll_y), "scrollY {}", scroll_y);
        }
    }

    #[test]
    fn strategies_agree_on_the_same_trace() {
        let mut polling = PollingStrategy::default();
        polling.capture(SENTINEL_TOP, HEADER);
        let mut observer = ObserverStrategy::default();

        let polled: Vec<_> = TRACE
            .iter()
            .map(|&scroll_y| polling.on_scroll_with(&FixedScroll(scroll_y)))
            .collect();
        let observed: Vec<_> = TRACE
            .iter()
            .map(|&scroll_y| observer.on_intersection(sentinel_intersecting(scroll_y)))
            .collect();

        assert_eq!(polled, observed);
        assert_eq!(
            polled.iter().flatten().copied().collect::<Vec<_>>(),
            [StickyState::Stuck, StickyState::Floating]
        );
    }

    #[test]
    fn polling_waits_for_a_reference() {
        let mut polling = PollingStrategy::default();
        assert_eq!(polling.on_scroll(10_000.0), None);
        assert_eq!(polling.state(), StickyState::Floating);
    }

    #[test]
    fn reference_is_captured_once() {
        let mut polling = PollingStrategy::default();
        assert!(polling.capture(400.0, 56.0));
        assert!(!polling.capture(900.0, 72.0));
        assert_eq!(polling.reference_offset(), Some(344.0));
    }

    #[test]
    fn resubscribed_observer_keeps_current_state() {
        let mut observer = ObserverStrategy::starting_from(StickyState::Stuck);
        assert_eq!(observer.on_intersection(false), None);
        assert_eq!(observer.on_intersection(true), Some(StickyState::Floating));
    }

    #[test]
    fn root_margin_pulls_in_the_top_edge() {
        assert_eq!(ObserverStrategy::root_margin(56.0), "-56px 0px 0px 0px");
        assert_eq!(ObserverStrategy::root_margin(72.0), "-72px 0px 0px 0px");
    }

    #[test]
    fn throttle_coalesces_until_the_frame_runs() {
        let mut throttle = FrameThrottle::default();
        assert!(throttle.try_schedule());
        assert!(!throttle.try_schedule());
        assert!(!throttle.try_schedule());

        throttle.frame_ran();
        assert!(throttle.try_schedule());
    }

    #[test]
    fn resize_while_stuck_keeps_the_floating_height() {
        // floating banner is 48px; the compact stuck banner measures 36px
        let floating = next_banner_height(StickyState::Floating, 0.0, 48.0);
        let resized = next_banner_height(StickyState::Stuck, floating, 36.0);

        assert_eq!(resized, 48.0);
        assert_eq!(placeholder_height(StickyState::Stuck, resized), Some(48.0));
    }

    #[test]
    fn resize_while_floating_takes_the_new_height() {
        assert_eq!(next_banner_height(StickyState::Floating, 48.0, 64.0), 64.0);
        assert_eq!(next_banner_height(StickyState::Stuck, 0.0, 36.0), 36.0);
    }

    #[test]
    fn placeholder_only_while_stuck() {
        assert_eq!(placeholder_height(StickyState::Floating, 48.0), None);
        assert_eq!(placeholder_height(StickyState::Stuck, 48.0), Some(48.0));
        assert_eq!(placeholder_height(StickyState::Stuck, 0.0), None);
    }
}
