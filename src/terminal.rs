//! Console output: the canvas seam used by the frame driver, the crossterm-backed
//! terminal display, and an in-memory frame buffer

use crate::color::{CellAttribute, ConsoleColor};
use crate::error::{RenderError, Status};
use crate::viewport::Viewport;
use crate::COLUMNS_PER_PIXEL;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, SetSize},
};
use std::io::{stdout, BufWriter, Stdout, Write};

/// Text written into each console cell that makes up a pixel
const PIXEL_TEXT: &str = "  ";

/// Character-cell output device
///
/// Coordinates are console cells, origin at the top-left. `put_pixel` addresses
/// pixels, each `COLUMNS_PER_PIXEL` cells wide.
pub trait Canvas {
    /// Size in columns and rows
    fn size(&self) -> Result<(u16, u16), RenderError>;

    fn set_size(&mut self, columns: u16, rows: u16) -> Result<Status, RenderError>;

    /// Blank every cell with the current colors and home the cursor
    fn clear(&mut self) -> Result<(), RenderError>;

    fn set_cursor(&mut self, x: u16, y: u16) -> Result<(), RenderError>;

    /// Cursor position as columns and rows
    fn cursor(&self) -> Result<(u16, u16), RenderError>;

    fn set_cursor_visible(&mut self, visible: bool) -> Result<(), RenderError>;

    fn set_color(&mut self, fg: ConsoleColor, bg: ConsoleColor) -> Result<(), RenderError>;

    /// Current foreground and background
    fn color(&self) -> Result<(ConsoleColor, ConsoleColor), RenderError>;

    /// Write text at the cursor and advance it
    fn write_text(&mut self, text: &str) -> Result<(), RenderError>;

    fn flush(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn set_cursor_color(
        &mut self,
        x: u16,
        y: u16,
        fg: ConsoleColor,
        bg: ConsoleColor,
    ) -> Result<(), RenderError> {
        self.set_cursor(x, y)?;
        self.set_color(fg, bg)
    }

    /// White on black
    fn reset_color(&mut self) -> Result<(), RenderError> {
        let default = CellAttribute::default();
        self.set_color(default.fg, default.bg)
    }

    /// Paint pixel `(x, y)` solid
    fn put_pixel(&mut self, x: u16, y: u16, color: ConsoleColor) -> Result<(), RenderError> {
        let column = x.checked_mul(COLUMNS_PER_PIXEL).ok_or_else(|| {
            RenderError::invalid(format!("pixel column {} overflows the console", x))
        })?;
        self.set_cursor_color(column, y, color, color)?;
        self.write_text(PIXEL_TEXT)
    }
}

/// Terminal display handler with buffered output
///
/// Cursor and colors are tracked on this side; the terminal is never queried
/// for them.
pub struct TerminalDisplay {
    buffer: BufWriter<Stdout>,
    active: bool,
    cursor: (u16, u16),
    attribute: CellAttribute,
}

impl TerminalDisplay {
    /// Take over the terminal: alternate screen, hidden cursor
    pub fn new() -> Result<Self, RenderError> {
        let mut display = Self {
            buffer: BufWriter::new(stdout()),
            active: false,
            cursor: (0, 0),
            attribute: CellAttribute::default(),
        };
        display.open()?;
        Ok(display)
    }

    pub fn open(&mut self) -> Result<Status, RenderError> {
        if self.active {
            return Ok(Status::AlreadyActive);
        }
        execute!(self.buffer, EnterAlternateScreen, Hide)?;
        self.active = true;
        tracing::debug!("Entered alternate screen");
        Ok(Status::Done)
    }

    /// Restore the terminal to its normal screen
    pub fn close(&mut self) -> Result<Status, RenderError> {
        if !self.active {
            return Ok(Status::NotActive);
        }
        execute!(self.buffer, ResetColor, Show, LeaveAlternateScreen)?;
        self.active = false;
        self.attribute = CellAttribute::default();
        tracing::debug!("Left alternate screen");
        Ok(Status::Done)
    }
}

impl Canvas for TerminalDisplay {
    fn size(&self) -> Result<(u16, u16), RenderError> {
        Ok(terminal::size()?)
    }

    fn set_size(&mut self, columns: u16, rows: u16) -> Result<Status, RenderError> {
        if columns == 0 || rows == 0 {
            return Err(RenderError::invalid(format!(
                "console size must be non-zero, got {}x{}",
                columns, rows
            )));
        }
        if terminal::size()? == (columns, rows) {
            return Ok(Status::Done);
        }
        execute!(self.buffer, SetSize(columns, rows))?;
        Ok(Status::Done)
    }

    fn clear(&mut self) -> Result<(), RenderError> {
        queue!(self.buffer, Clear(ClearType::All), MoveTo(0, 0))?;
        self.cursor = (0, 0);
        Ok(())
    }

    fn set_cursor(&mut self, x: u16, y: u16) -> Result<(), RenderError> {
        queue!(self.buffer, MoveTo(x, y))?;
        self.cursor = (x, y);
        Ok(())
    }

    fn cursor(&self) -> Result<(u16, u16), RenderError> {
        Ok(self.cursor)
    }

    fn set_cursor_visible(&mut self, visible: bool) -> Result<(), RenderError> {
        if visible {
            queue!(self.buffer, Show)?;
        } else {
            queue!(self.buffer, Hide)?;
        }
        Ok(())
    }

    fn set_color(&mut self, fg: ConsoleColor, bg: ConsoleColor) -> Result<(), RenderError> {
        queue!(
            self.buffer,
            SetForegroundColor(fg.into()),
            SetBackgroundColor(bg.into())
        )?;
        self.attribute = CellAttribute::new(fg, bg);
        Ok(())
    }

    fn color(&self) -> Result<(ConsoleColor, ConsoleColor), RenderError> {
        Ok((self.attribute.fg, self.attribute.bg))
    }

    fn write_text(&mut self, text: &str) -> Result<(), RenderError> {
        queue!(self.buffer, Print(text))?;
        let advance = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
        self.cursor.0 = self.cursor.0.saturating_add(advance);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        self.buffer.flush()?;
        Ok(())
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        let _ = self.buffer.flush();
        let _ = self.close();
    }
}

/// One console cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub attribute: CellAttribute,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            attribute: CellAttribute::default(),
        }
    }
}

/// In-memory canvas; used for headless rendering and tests
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    columns: u16,
    rows: u16,
    cells: Vec<Cell>,
    cursor: (u16, u16),
    cursor_visible: bool,
    attribute: CellAttribute,
}

impl FrameBuffer {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            columns,
            rows,
            cells: vec![Cell::default(); columns as usize * rows as usize],
            cursor: (0, 0),
            cursor_visible: true,
            attribute: CellAttribute::default(),
        }
    }

    /// Buffer with exactly one cell pair per viewport pixel
    pub fn for_viewport(viewport: &Viewport) -> Self {
        // Viewport widths are capped at MAX_VIEWPORT_WIDTH, so this cannot overflow
        Self::new(viewport.width() * COLUMNS_PER_PIXEL, viewport.height())
    }

    pub fn cell(&self, x: u16, y: u16) -> Option<Cell> {
        if x >= self.columns || y >= self.rows {
            return None;
        }
        self.cells.get(y as usize * self.columns as usize + x as usize).copied()
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn attribute(&self) -> CellAttribute {
        self.attribute
    }

    /// Color of pixel `(x, y)` as painted by `put_pixel`
    pub fn pixel(&self, x: u16, y: u16) -> Option<ConsoleColor> {
        let column = x.checked_mul(COLUMNS_PER_PIXEL)?;
        self.cell(column, y).map(|cell| cell.attribute.bg)
    }

    pub fn pixel_columns(&self) -> u16 {
        self.columns / COLUMNS_PER_PIXEL
    }

    /// Rows of pixel colors as palette hex digits
    pub fn to_hex_string(&self) -> String {
        let width = self.pixel_columns();
        let mut result = String::with_capacity((width as usize + 1) * self.rows as usize);
        for y in 0..self.rows {
            for x in 0..width {
                result.push(self.pixel(x, y).map_or('?', ConsoleColor::hex_digit));
            }
            result.push('\n');
        }
        result
    }

    /// Characters of each row, ignoring colors
    pub fn to_text(&self) -> String {
        let mut result = String::with_capacity((self.columns as usize + 1) * self.rows as usize);
        for row in self.cells.chunks(self.columns.max(1) as usize) {
            result.extend(row.iter().map(|cell| cell.ch));
            result.push('\n');
        }
        result
    }
}

impl Canvas for FrameBuffer {
    fn size(&self) -> Result<(u16, u16), RenderError> {
        Ok((self.columns, self.rows))
    }

    fn set_size(&mut self, columns: u16, rows: u16) -> Result<Status, RenderError> {
        if columns == 0 || rows == 0 {
            return Err(RenderError::invalid(format!(
                "console size must be non-zero, got {}x{}",
                columns, rows
            )));
        }
        if (columns, rows) == (self.columns, self.rows) {
            return Ok(Status::Done);
        }
        *self = Self {
            attribute: self.attribute,
            cursor_visible: self.cursor_visible,
            ..Self::new(columns, rows)
        };
        Ok(Status::Done)
    }

    fn clear(&mut self) -> Result<(), RenderError> {
        let blank = Cell {
            ch: ' ',
            attribute: self.attribute,
        };
        self.cells.fill(blank);
        self.cursor = (0, 0);
        Ok(())
    }

    fn set_cursor(&mut self, x: u16, y: u16) -> Result<(), RenderError> {
        if x >= self.columns || y >= self.rows {
            return Err(RenderError::invalid(format!(
                "cursor ({}, {}) outside {}x{} console",
                x, y, self.columns, self.rows
            )));
        }
        self.cursor = (x, y);
        Ok(())
    }

    fn cursor(&self) -> Result<(u16, u16), RenderError> {
        Ok(self.cursor)
    }

    fn set_cursor_visible(&mut self, visible: bool) -> Result<(), RenderError> {
        self.cursor_visible = visible;
        Ok(())
    }

    fn set_color(&mut self, fg: ConsoleColor, bg: ConsoleColor) -> Result<(), RenderError> {
        self.attribute = CellAttribute::new(fg, bg);
        Ok(())
    }

    fn color(&self) -> Result<(ConsoleColor, ConsoleColor), RenderError> {
        Ok((self.attribute.fg, self.attribute.bg))
    }

    /// Text past the right edge is clipped
    fn write_text(&mut self, text: &str) -> Result<(), RenderError> {
        let (mut x, y) = self.cursor;
        for ch in text.chars() {
            if x >= self.columns || y >= self.rows {
                break;
            }
            self.cells[y as usize * self.columns as usize + x as usize] = Cell {
                ch,
                attribute: self.attribute,
            };
            x += 1;
        }
        self.cursor = (x.min(self.columns.saturating_sub(1)), y);
        Ok(())
    }
}

/// Every foreground/background pair: column pair `x` uses background `x`, row `y`
/// uses foreground `y`, and each pair shows the hex digits of both.
pub fn draw_test_patch(canvas: &mut impl Canvas) -> Result<(), RenderError> {
    let (columns, rows) = canvas.size()?;
    if columns < 32 || rows < 17 {
        return Err(RenderError::invalid(format!(
            "test patch needs a 32x17 console, got {}x{}",
            columns, rows
        )));
    }

    for y in 0..16u16 {
        for x in 0..16u16 {
            let fg = ConsoleColor::from_bits(y as u8);
            let bg = ConsoleColor::from_bits(x as u8);
            canvas.set_cursor_color(x * 2, y, fg, bg)?;
            canvas.write_text(&bg.hex_digit().to_string())?;
            canvas.set_cursor_color(x * 2 + 1, y, fg, bg)?;
            canvas.write_text(&fg.hex_digit().to_string())?;
        }
    }

    // Read back where the last cell left the cursor and colors
    let (x, y) = canvas.cursor()?;
    let (fg, bg) = canvas.color()?;
    tracing::debug!(x, y, ?fg, ?bg, "Test patch drawn");

    canvas.reset_color()?;
    canvas.set_cursor(0, 16)?;
    canvas.write_text(&format!("[]=({}, {})", x, y))?;
    canvas.flush()
}
