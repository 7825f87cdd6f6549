use std::time::Duration;

use sysinfo_wallpaper::config::HudConfig;
use sysinfo_wallpaper::error::RenderError;
use sysinfo_wallpaper::overlay::HudFrame;
use sysinfo_wallpaper::overlay::geometry::{Point, Rect, Size};
use sysinfo_wallpaper::overlay::hud;
use sysinfo_wallpaper::render::{Canvas, Present, Rgba, SkiaCanvas};
use sysinfo_wallpaper::telemetry::TelemetrySnapshot;

#[derive(Debug, Clone, PartialEq)]
enum DrawCall {
    Begin,
    Clear(Rgba),
    Rect(Rect),
    Text(String, Point),
    End,
}

#[derive(Default)]
struct Recorder {
    calls: Vec<DrawCall>,
}

impl Canvas for Recorder {
    fn begin_frame(&mut self) {
        self.calls.push(DrawCall::Begin);
    }

    fn clear(&mut self, color: Rgba) {
        self.calls.push(DrawCall::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, _color: Rgba) {
        self.calls.push(DrawCall::Rect(rect));
    }

    fn draw_text(&mut self, text: &str, origin: Point, _color: Rgba) {
        self.calls.push(DrawCall::Text(text.to_string(), origin));
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        self.calls.push(DrawCall::End);
        Ok(())
    }
}

fn scenario_telemetry() -> TelemetrySnapshot {
    TelemetrySnapshot {
        cpu: "12.34%".into(),
        ram: "56.78%".into(),
    }
}

#[test]
fn cursor_at_400_300_on_1080p() {
    let telemetry = scenario_telemetry();
    let frame = HudFrame {
        cursor: Point::new(400, 300),
        size: Size::new(1920, 1080),
        frame_time: Duration::from_secs(1) / 60,
        telemetry: &telemetry,
    };
    let config = HudConfig::default();
    let mut canvas = Recorder::default();

    hud::draw(&mut canvas, &frame, &config).unwrap();

    let anchor = hud::text_anchor(frame.cursor, &config);
    let line = |i: i32| Point::new(anchor.x, anchor.y + 40 * i);
    assert_eq!(
        canvas.calls,
        vec![
            DrawCall::Begin,
            DrawCall::Clear(Rgba::TRANSPARENT),
            DrawCall::Rect(Rect::new(0, 295, 1920, 10)),
            DrawCall::Rect(Rect::new(395, 0, 10, 1080)),
            DrawCall::Text("mouse x - 400".into(), line(0)),
            DrawCall::Text("mouse y - 300".into(), line(1)),
            DrawCall::Text("fps - 60.00".into(), line(2)),
            DrawCall::Text("cpu - 12.34%".into(), line(3)),
            DrawCall::Text("ram - 56.78%".into(), line(4)),
            DrawCall::End,
        ]
    );
}

#[test]
fn text_offsets_are_an_arithmetic_sequence() {
    let telemetry = scenario_telemetry();
    let frame = HudFrame {
        cursor: Point::new(17, 911),
        size: Size::new(640, 480),
        frame_time: Duration::from_millis(8),
        telemetry: &telemetry,
    };
    let config = HudConfig::default();
    let mut canvas = Recorder::default();
    hud::draw(&mut canvas, &frame, &config).unwrap();

    let anchor = hud::text_anchor(frame.cursor, &config);
    let offsets: Vec<i32> = canvas
        .calls
        .iter()
        .filter_map(|c| match c {
            DrawCall::Text(_, origin) => {
                assert_eq!(origin.x, anchor.x);
                Some(origin.y - anchor.y)
            }
            _ => None,
        })
        .collect();
    assert_eq!(offsets, vec![0, 40, 80, 120, 160]);
}

#[derive(Default)]
struct Sink {
    frames: u32,
}

impl Present for Sink {
    fn present(&mut self, _rgba: &[u8], _width: u32, _height: u32) -> Result<(), RenderError> {
        self.frames += 1;
        Ok(())
    }
}

#[test]
fn software_canvas_paints_crosshair_pixels() {
    let telemetry = TelemetrySnapshot::default();
    let frame = HudFrame {
        cursor: Point::new(40, 30),
        size: Size::new(100, 80),
        frame_time: Duration::from_millis(16),
        telemetry: &telemetry,
    };
    let mut canvas = SkiaCanvas::new(100, 80, Sink::default()).unwrap();

    hud::draw(&mut canvas, &frame, &HudConfig::default()).unwrap();

    let white = Some([255, 255, 255, 255]);
    let clear = Some([0, 0, 0, 0]);
    // horizontal strip covers rows 25..35, vertical strip columns 35..45
    assert_eq!(canvas.pixel(0, 25), white);
    assert_eq!(canvas.pixel(99, 34), white);
    assert_eq!(canvas.pixel(35, 0), white);
    assert_eq!(canvas.pixel(44, 79), white);
    assert_eq!(canvas.pixel(0, 24), clear);
    assert_eq!(canvas.pixel(0, 35), clear);
    assert_eq!(canvas.pixel(34, 79), clear);
    assert_eq!(canvas.pixel(45, 0), clear);
    assert_eq!(canvas.presenter().frames, 1);
}
