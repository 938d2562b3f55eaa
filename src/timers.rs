//! Scheduled Tasks
//!
//! Browser timeouts for the engine's debounced work. Each channel holds at
//! most one armed timeout; arming again drops (and so cancels) the previous
//! one. The engine's task ids still decide whether a firing is current.

use gloo_timers::callback::Timeout;

#[derive(Default)]
pub struct Timers {
    search: Option<Timeout>,
    scroll: Option<Timeout>,
}

impl Timers {
    pub fn arm_search(&mut self, delay_ms: u32, callback: impl FnOnce() + 'static) {
        self.search = Some(Timeout::new(delay_ms, callback));
    }

    pub fn arm_scroll(&mut self, delay_ms: u32, callback: impl FnOnce() + 'static) {
        self.scroll = Some(Timeout::new(delay_ms, callback));
    }

    pub fn cancel_all(&mut self) {
        if let Some(timeout) = self.search.take() {
            timeout.cancel();
        }
        if let Some(timeout) = self.scroll.take() {
            timeout.cancel();
        }
    }
}
