//! Browser capabilities the banner reads from.
//!
//! Wall-clock time, viewport size and scroll offset sit behind small traits so
//! the banner's state machines can be driven by fakes in tests. The
//! `BrowserWindow` and `SystemClock` types are the real implementations.

use std::cell::Cell;

use log::debug;
use thiserror::Error;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{AddEventListenerOptions, Window};

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("no global window available")]
    NoWindow,
    #[error("failed to register `{event}` listener: {message}")]
    Listener { event: &'static str, message: String },
    #[error("failed to remove `{event}` listener: {message}")]
    Removal { event: &'static str, message: String },
    #[error("intersection observer unavailable: {0}")]
    Observer(String),
}

impl EnvError {
    pub fn js_message(value: &JsValue) -> String {
        value.as_string().unwrap_or_else(|| format!("{:?}", value))
    }
}

pub trait Clock {
    fn now_millis(&self) -> i64;
}

#[cfg_attr(test, mockall::automock)]
pub trait ViewportMetrics {
    fn viewport_width(&self) -> f64;
}

pub trait ScrollPosition {
    fn scroll_y(&self) -> f64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[derive(Clone, Debug)]
pub struct BrowserWindow {
    window: Window,
}

impl BrowserWindow {
    pub fn current() -> Result<Self, EnvError> {
        web_sys::window()
            .map(|window| Self { window })
            .ok_or(EnvError::NoWindow)
    }

    pub fn raw(&self) -> &Window {
        &self.window
    }
}

impl ViewportMetrics for BrowserWindow {
    fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|width| width.as_f64())
            .unwrap_or(0.0)
    }
}

impl ScrollPosition for BrowserWindow {
    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }
}

/// A passive window listener that is removed when dropped.
///
/// `detach` removes the listener early while keeping the closure alive, which
/// lets a handler unregister itself (and its siblings) from inside a call.
pub struct WindowListener {
    window: Window,
    event: &'static str,
    callback: Closure<dyn FnMut()>,
    attached: Cell<bool>,
}

impl WindowListener {
    pub fn passive(
        window: &Window,
        event: &'static str,
        once: bool,
        callback: impl FnMut() + 'static,
    ) -> Result<Self, EnvError> {
        let callback = Closure::wrap(Box::new(callback) as Box<dyn FnMut()>);

        let options = AddEventListenerOptions::new();
        options.set_passive(true);
        options.set_once(once);

        window
            .add_event_listener_with_callback_and_add_event_listener_options(
                event,
                callback.as_ref().unchecked_ref(),
                &options,
            )
            .map_err(|err| EnvError::Listener {
                event,
                message: EnvError::js_message(&err),
            })?;

        Ok(Self {
            window: window.clone(),
            event,
            callback,
            attached: Cell::new(true),
        })
    }

    pub fn detach(&self) {
        if self.attached.replace(false) {
            if let Err(err) = self
                .window
                .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref())
            {
                let err = EnvError::Removal {
                    event: self.event,
                    message: EnvError::js_message(&err),
                };
                debug!("{}", err);
            }
        }
    }
}

impl Drop for WindowListener {
    fn drop(&mut self) {
        self.detach();
    }
}
