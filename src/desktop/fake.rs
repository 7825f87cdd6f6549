//! In-memory window manager that records every mutation, for tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use super::{ExStyle, SendOutcome, WindowId, WindowManager, ZOrder};
use crate::error::PlatformError;
use crate::overlay::geometry::{Point, Rect, Size};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Send(WindowId, u32),
    SetExStyle(WindowId, ExStyle),
    SetBorderless(WindowId),
    SetPosition(WindowId, ZOrder, Option<Rect>),
    SetParent(WindowId, WindowId),
    HideAsync(WindowId),
    ExtendFrame(WindowId),
}

#[derive(Default)]
struct State {
    top_level: Vec<(WindowId, String)>,
    children: Vec<(WindowId, WindowId, String)>,
    ex_styles: HashMap<WindowId, ExStyle>,
    calls: Vec<Call>,
    host_delay: Option<Duration>,
    failing: HashSet<&'static str>,
    display: Option<Rect>,
    cursor: Option<Point>,
    client: Option<Size>,
}

#[derive(Clone, Default)]
pub struct FakeWindowManager {
    state: Arc<Mutex<State>>,
    enumerated: Arc<AtomicUsize>,
}

impl FakeWindowManager {
    pub fn new() -> Self {
        let fake = Self::default();
        fake.lock().display = Some(Rect::new(0, 0, 1920, 1080));
        fake
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn top_level(self, id: isize, class: &str) -> Self {
        self.lock().top_level.push((WindowId(id), class.to_string()));
        self
    }

    pub fn child(self, parent: isize, id: isize, class: &str) -> Self {
        self.lock()
            .children
            .push((WindowId(parent), WindowId(id), class.to_string()));
        self
    }

    pub fn ex_style_of(self, id: isize, style: ExStyle) -> Self {
        self.lock().ex_styles.insert(WindowId(id), style);
        self
    }

    /// Host takes this long to answer any sent message, ignoring the timeout.
    pub fn host_delay(self, delay: Duration) -> Self {
        self.lock().host_delay = Some(delay);
        self
    }

    pub fn failing(self, op: &'static str) -> Self {
        self.lock().failing.insert(op);
        self
    }

    pub fn display(self, bounds: Option<Rect>) -> Self {
        self.lock().display = bounds;
        self
    }

    pub fn cursor(&self, at: Option<Point>) {
        self.lock().cursor = at;
    }

    pub fn client(self, size: Size) -> Self {
        self.lock().client = Some(size);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn current_ex_style(&self, id: isize) -> ExStyle {
        self.lock()
            .ex_styles
            .get(&WindowId(id))
            .copied()
            .unwrap_or_default()
    }

    /// Number of top-level windows pulled from the enumeration so far.
    pub fn enumerated(&self) -> usize {
        self.enumerated.load(Ordering::SeqCst)
    }

    fn record(&self, op: &'static str, call: Call) -> Result<(), PlatformError> {
        let mut state = self.lock();
        state.calls.push(call);
        if state.failing.contains(op) {
            return Err(PlatformError::call(op, "injected failure"));
        }
        Ok(())
    }
}

impl WindowManager for FakeWindowManager {
    fn find_window(&self, class: &str) -> Option<WindowId> {
        self.lock()
            .top_level
            .iter()
            .find(|(_, c)| c == class)
            .map(|(id, _)| *id)
    }

    fn find_window_ex(
        &self,
        parent: Option<WindowId>,
        after: Option<WindowId>,
        class: &str,
    ) -> Option<WindowId> {
        let state = self.lock();
        let siblings: Vec<(WindowId, &str)> = match parent {
            Some(p) => state
                .children
                .iter()
                .filter(|(owner, _, _)| *owner == p)
                .map(|(_, id, c)| (*id, c.as_str()))
                .collect(),
            None => state
                .top_level
                .iter()
                .map(|(id, c)| (*id, c.as_str()))
                .collect(),
        };
        let start = match after {
            Some(a) => siblings.iter().position(|(id, _)| *id == a)? + 1,
            None => 0,
        };
        siblings[start..]
            .iter()
            .find(|(_, c)| *c == class)
            .map(|(id, _)| *id)
    }

    fn top_level_windows(&self) -> Box<dyn Iterator<Item = WindowId> + '_> {
        let ids: Vec<WindowId> = self.lock().top_level.iter().map(|(id, _)| *id).collect();
        let counter = self.enumerated.clone();
        Box::new(ids.into_iter().inspect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
    }

    fn send_message_timeout(&self, target: WindowId, msg: u32, _timeout: Duration) -> SendOutcome {
        let delay = {
            let mut state = self.lock();
            state.calls.push(Call::Send(target, msg));
            state.host_delay
        };
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
        SendOutcome::Delivered
    }

    fn ex_style(&self, window: WindowId) -> Result<ExStyle, PlatformError> {
        if self.lock().failing.contains("ex_style") {
            return Err(PlatformError::call("ex_style", "injected failure"));
        }
        Ok(self.current_ex_style(window.0))
    }

    fn set_ex_style(&self, window: WindowId, style: ExStyle) -> Result<(), PlatformError> {
        self.record("set_ex_style", Call::SetExStyle(window, style))?;
        self.lock().ex_styles.insert(window, style);
        Ok(())
    }

    fn set_borderless(&self, window: WindowId) -> Result<(), PlatformError> {
        self.record("set_borderless", Call::SetBorderless(window))
    }

    fn set_position(
        &self,
        window: WindowId,
        order: ZOrder,
        bounds: Option<Rect>,
    ) -> Result<(), PlatformError> {
        self.record("set_position", Call::SetPosition(window, order, bounds))
    }

    fn set_parent(&self, child: WindowId, parent: WindowId) -> Result<(), PlatformError> {
        self.record("set_parent", Call::SetParent(child, parent))
    }

    fn hide_async(&self, window: WindowId) -> Result<(), PlatformError> {
        self.record("hide_async", Call::HideAsync(window))
    }

    fn extend_frame_into_client_area(&self, window: WindowId) -> Result<(), PlatformError> {
        self.record("extend_frame", Call::ExtendFrame(window))
    }

    fn primary_display_bounds(&self) -> Option<Rect> {
        self.lock().display
    }

    fn cursor_position(&self, _window: WindowId) -> Option<Point> {
        self.lock().cursor
    }

    fn client_size(&self, _window: WindowId) -> Option<Size> {
        self.lock().client
    }
}
