use std::time::{Duration, Instant};

use tracing::trace;

use super::geometry::{Point, Size};
use super::hud::{self, HudFrame};
use crate::config::HudConfig;
use crate::desktop::{WindowId, WindowManager};
use crate::error::RenderError;
use crate::render::Canvas;
use crate::telemetry::SharedSnapshot;

/// Time since the previous tick.
#[derive(Debug)]
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    pub fn new(now: Instant) -> Self {
        Self { last: now }
    }

    /// Advance to `now` and return the elapsed frame time.
    pub fn tick(&mut self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        elapsed
    }
}

/// What a frame result means for logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameReport {
    Rendered,
    /// First failure after a good frame (or at startup).
    FirstDrop,
    /// Another failure in the same run; carries the run length so far.
    RepeatDrop(u64),
    /// A good frame ending a run of this many failures.
    Recovered(u64),
}

/// Counts consecutive failed frames so a persistent failure is reported
/// once rather than every tick.
#[derive(Debug, Default)]
pub struct FrameDrops {
    run: u64,
}

impl FrameDrops {
    pub fn record(&mut self, ok: bool) -> FrameReport {
        match (ok, self.run) {
            (true, 0) => FrameReport::Rendered,
            (true, run) => {
                self.run = 0;
                FrameReport::Recovered(run)
            }
            (false, _) => {
                self.run += 1;
                if self.run == 1 {
                    FrameReport::FirstDrop
                } else {
                    FrameReport::RepeatDrop(self.run)
                }
            }
        }
    }
}

/// Draws the HUD for the attached overlay window once per tick.
pub struct RenderLoop<W, C> {
    wm: W,
    window: WindowId,
    canvas: C,
    telemetry: SharedSnapshot,
    config: HudConfig,
    clock: FrameClock,
    fallback_size: Size,
    cursor: Point,
}

impl<W: WindowManager, C: Canvas> RenderLoop<W, C> {
    pub fn new(
        wm: W,
        window: WindowId,
        canvas: C,
        telemetry: SharedSnapshot,
        config: HudConfig,
        fallback_size: Size,
        now: Instant,
    ) -> Self {
        Self {
            wm,
            window,
            canvas,
            telemetry,
            config,
            clock: FrameClock::new(now),
            fallback_size,
            cursor: Point::default(),
        }
    }

    /// Sample inputs and draw one frame.
    ///
    /// The telemetry read may be up to one sampling interval old. A cursor
    /// that cannot be read keeps its last known position.
    pub fn tick(&mut self, now: Instant) -> Result<(), RenderError> {
        let frame_time = self.clock.tick(now);
        if let Some(cursor) = self.wm.cursor_position(self.window) {
            self.cursor = cursor;
        }
        let size = self
            .wm
            .client_size(self.window)
            .filter(|s| s.width > 0 && s.height > 0)
            .unwrap_or(self.fallback_size);
        let telemetry = self.telemetry.load();

        trace!(cursor = ?self.cursor, ?frame_time, "render tick");
        hud::draw(
            &mut self.canvas,
            &HudFrame {
                cursor: self.cursor,
                size,
                frame_time,
                telemetry: &telemetry,
            },
            &self.config,
        )
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }
}
