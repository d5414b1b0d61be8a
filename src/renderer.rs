//! Frame driver
//!
//! Scans the viewport one pixel at a time, traces a primary ray through each and
//! writes the shaded color to the canvas. Between frames it blocks on a line of
//! input; each line triggers another frame.

use crate::color::ConsoleColor;
use crate::error::RenderError;
use crate::scene::{Camera, Scene};
use crate::shader;
use crate::terminal::Canvas;
use crate::viewport::Viewport;
use std::io::BufRead;
use std::time::{Duration, Instant};

const PROMPT_TEXT: &str = "press Enter to render again";

/// What the driver is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Rendering,
    AwaitingInput,
}

/// Counters for one rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub pixels: usize,
    pub hits: usize,
    pub failed_writes: usize,
    pub elapsed: Duration,
}

pub struct FrameDriver<C: Canvas> {
    scene: Scene,
    viewport: Viewport,
    camera: Camera,
    canvas: C,
    state: DriverState,
    frame_count: u32,
    show_prompt: bool,
}

impl<C: Canvas> FrameDriver<C> {
    pub fn new(scene: Scene, viewport: Viewport, camera: Camera, canvas: C) -> Self {
        Self {
            scene,
            viewport,
            camera,
            canvas,
            state: DriverState::Rendering,
            frame_count: 0,
            show_prompt: false,
        }
    }

    /// Draw a prompt line under the image while waiting for input
    pub fn with_prompt(mut self, show_prompt: bool) -> Self {
        self.show_prompt = show_prompt;
        self
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Frames rendered so far
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    /// Release the canvas, ending the driver
    pub fn into_canvas(self) -> C {
        self.canvas
    }

    /// Color of pixel `(x, y)` without touching the canvas
    pub fn trace_pixel(&self, x: u16, y: u16) -> Result<ConsoleColor, RenderError> {
        let view_point = self.viewport.project(x, y)?;
        let ray = self.camera.ray_through(view_point);
        Ok(shader::trace(&self.scene, &ray))
    }

    /// Render one full frame
    ///
    /// Clearing and flushing the canvas must succeed. A pixel that cannot be
    /// written is logged and counted, and the scan carries on.
    pub fn render_frame(&mut self) -> Result<FrameStats, RenderError> {
        self.state = DriverState::Rendering;
        let start = Instant::now();
        let mut stats = FrameStats::default();

        self.canvas.clear()?;

        for y in 0..self.viewport.height() {
            for x in 0..self.viewport.width() {
                let view_point = self.viewport.project(x, y)?;
                let ray = self.camera.ray_through(view_point);
                let hit = self.scene.intersect(&ray);
                if hit.is_some() {
                    stats.hits += 1;
                }
                let color = shader::shade(&self.scene, &ray, hit);

                if let Err(e) = self.canvas.put_pixel(x, y, color) {
                    if stats.failed_writes == 0 {
                        tracing::warn!(x, y, error = %e, "Failed to write pixel");
                    }
                    stats.failed_writes += 1;
                }
                stats.pixels += 1;
            }
        }

        self.canvas.flush()?;
        self.frame_count += 1;
        stats.elapsed = start.elapsed();

        if stats.failed_writes > 0 {
            tracing::warn!(
                frame = self.frame_count,
                failed_writes = stats.failed_writes,
                "Frame finished with failed pixel writes"
            );
        }
        tracing::debug!(
            frame = self.frame_count,
            pixels = stats.pixels,
            hits = stats.hits,
            elapsed_ms = stats.elapsed.as_secs_f64() * 1000.0,
            "Frame rendered"
        );

        Ok(stats)
    }

    /// Status line below the image, when the canvas has a spare row
    fn draw_prompt(&mut self) -> Result<(), RenderError> {
        if !self.show_prompt {
            return Ok(());
        }
        let (_, rows) = self.canvas.size()?;
        let row = self.viewport.height();
        if row >= rows {
            return Ok(());
        }

        self.canvas
            .set_cursor_color(0, row, ConsoleColor::White, ConsoleColor::Black)?;
        self.canvas
            .write_text(&format!("frame {} - {}", self.frame_count, PROMPT_TEXT))?;
        self.canvas.flush()
    }

    /// Render frames until the input ends or `max_frames` have been drawn
    ///
    /// Each line read from `input` (an empty one included) renders another
    /// frame. Returns the number of frames rendered by this call.
    pub fn run<R: BufRead>(&mut self, mut input: R, max_frames: Option<u32>) -> Result<u32, RenderError> {
        let mut rendered = 0u32;
        let mut line = String::new();

        while max_frames.map_or(true, |limit| rendered < limit) {
            self.render_frame()?;
            rendered += 1;

            self.state = DriverState::AwaitingInput;
            if max_frames.is_some_and(|limit| rendered >= limit) {
                break;
            }
            self.draw_prompt()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                tracing::debug!(frames = rendered, "Input closed");
                break;
            }
        }

        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ray::Projection;
    use crate::terminal::FrameBuffer;
    use std::io::Cursor;

    fn demo_driver() -> FrameDriver<FrameBuffer> {
        let viewport = Viewport::new(48, 27, 2.0, 3.0).unwrap();
        let canvas = FrameBuffer::for_viewport(&viewport);
        FrameDriver::new(Scene::demo(), viewport, Camera::default(), canvas)
    }

    fn frame_colors(driver: &FrameDriver<FrameBuffer>) -> Vec<ConsoleColor> {
        let viewport = *driver.viewport();
        (0..viewport.height())
            .flat_map(|y| (0..viewport.width()).map(move |x| (x, y)))
            .filter_map(|(x, y)| driver.canvas().pixel(x, y))
            .collect()
    }

    #[test]
    fn test_render_frame_stats() {
        let mut driver = demo_driver();
        let stats = driver.render_frame().unwrap();
        assert_eq!(stats.pixels, 48 * 27);
        assert!(stats.hits > 0);
        assert!(stats.hits < stats.pixels);
        assert_eq!(stats.failed_writes, 0);
        assert_eq!(driver.frame_count(), 1);
    }

    #[test]
    fn test_render_frame_clears_canvas() {
        let viewport = Viewport::new(48, 27, 2.0, 3.0).unwrap();
        // One spare row below the image
        let mut canvas = FrameBuffer::new(96, 28);
        canvas.set_cursor(0, 27).unwrap();
        canvas.write_text("stale").unwrap();
        let mut driver = FrameDriver::new(Scene::demo(), viewport, Camera::default(), canvas);

        driver.render_frame().unwrap();
        let canvas = driver.into_canvas();
        let spare_row = canvas.to_text().lines().nth(27).unwrap().to_string();
        assert_eq!(spare_row.trim(), "");
        assert_eq!(canvas.pixel(24, 13), Some(ConsoleColor::DarkGrey));
    }

    #[test]
    fn test_center_pixel_is_background() {
        let mut driver = demo_driver();
        driver.render_frame().unwrap();
        assert_eq!(driver.canvas().pixel(24, 13), Some(ConsoleColor::DarkGrey));
        assert_eq!(driver.trace_pixel(24, 13).unwrap(), ConsoleColor::DarkGrey);
    }

    #[test]
    fn test_frame_shows_both_tones() {
        let mut driver = demo_driver();
        driver.render_frame().unwrap();
        let colors = frame_colors(&driver);
        assert_eq!(colors.len(), 48 * 27);
        assert!(colors.contains(&ConsoleColor::Blue));
        assert!(colors.contains(&ConsoleColor::DarkBlue));
    }

    #[test]
    fn test_frames_are_identical() {
        let mut driver = demo_driver();
        driver.render_frame().unwrap();
        let first = driver.canvas().clone();
        driver.render_frame().unwrap();
        assert_eq!(driver.canvas(), &first);
    }

    #[test]
    fn test_canvas_matches_trace_pixel() {
        let mut driver = demo_driver();
        driver.render_frame().unwrap();
        for (x, y) in [(0, 0), (4, 13), (30, 13), (47, 26)] {
            assert_eq!(driver.canvas().pixel(x, y), Some(driver.trace_pixel(x, y).unwrap()));
        }
    }

    #[test]
    fn test_failed_writes_do_not_abort() {
        let viewport = Viewport::new(48, 27, 2.0, 3.0).unwrap();
        // Room for the first five pixels of each row only
        let canvas = FrameBuffer::new(10, 27);
        let mut driver = FrameDriver::new(Scene::demo(), viewport, Camera::default(), canvas);

        let stats = driver.render_frame().unwrap();
        assert_eq!(stats.pixels, 48 * 27);
        assert_eq!(stats.failed_writes, (48 - 5) * 27);
        assert_eq!(driver.canvas().pixel(4, 26), Some(driver.trace_pixel(4, 26).unwrap()));
    }

    #[test]
    fn test_orthographic_projection() {
        let viewport = Viewport::new(48, 27, 2.0, 3.0).unwrap();
        let camera = Camera::new(nalgebra::Point3::origin(), Projection::Orthographic);
        let canvas = FrameBuffer::for_viewport(&viewport);
        let mut ortho = FrameDriver::new(Scene::demo(), viewport, camera, canvas);
        ortho.render_frame().unwrap();

        // Straight down -z onto the front of the blue sphere
        assert_eq!(ortho.canvas().pixel(4, 13), Some(ConsoleColor::Blue));
        assert_eq!(ortho.canvas().pixel(24, 13), Some(ConsoleColor::DarkGrey));

        let mut perspective = demo_driver();
        perspective.render_frame().unwrap();
        assert_ne!(frame_colors(&ortho), frame_colors(&perspective));
    }

    #[test]
    fn test_run_until_end_of_input() {
        let mut driver = demo_driver();
        let frames = driver.run(Cursor::new("\nagain\n"), None).unwrap();
        assert_eq!(frames, 3);
        assert_eq!(driver.frame_count(), 3);
        assert_eq!(driver.state(), DriverState::AwaitingInput);
    }

    #[test]
    fn test_run_respects_frame_limit() {
        let mut driver = demo_driver();
        let frames = driver.run(Cursor::new("\n\n\n\n\n"), Some(2)).unwrap();
        assert_eq!(frames, 2);

        let frames = driver.run(Cursor::new("\n"), Some(0)).unwrap();
        assert_eq!(frames, 0);
        assert_eq!(driver.frame_count(), 2);
    }

    #[test]
    fn test_run_draws_prompt_in_spare_row() {
        let viewport = Viewport::new(8, 4, 2.0, 3.0).unwrap();
        let canvas = FrameBuffer::new(64, 5);
        let mut driver =
            FrameDriver::new(Scene::demo(), viewport, Camera::default(), canvas).with_prompt(true);

        driver.run(Cursor::new(""), None).unwrap();
        let text = driver.canvas().to_text();
        let last_row = text.lines().nth(4).unwrap();
        assert!(last_row.starts_with("frame 1 - press Enter"));
        // Image rows untouched by the prompt
        assert_eq!(driver.canvas().pixel(0, 3), Some(driver.trace_pixel(0, 3).unwrap()));
    }

    #[test]
    fn test_prompt_skipped_without_spare_row() {
        let mut driver = demo_driver().with_prompt(true);
        driver.run(Cursor::new(""), None).unwrap();
        assert_eq!(driver.canvas().pixel(24, 13), Some(ConsoleColor::DarkGrey));
    }
}
