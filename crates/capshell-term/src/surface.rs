//! Cursor and screen primitives over a [`TerminalBackend`].
//!
//! Operations write escape sequences straight into the backend, which may
//! buffer them; [`Surface::flush`] pushes whatever is buffered to the
//! device. A failed write or flush is returned as
//! [`CapshellError::TerminalIo`] and is not retried.

use std::ops::Range;

use crossterm::cursor::{Hide, MoveDown, MoveLeft, MoveRight, MoveTo, MoveUp, Show};
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};

use capshell_types::error::{CapshellError, Result};

use crate::backend::{FALLBACK_SIZE, TerminalBackend};
use crate::border::Border;
use crate::progress::ProgressBar;

/// The terminal device as seen by the shell.
///
/// Remembers which modes it switched on so that [`Surface::release`] can
/// undo exactly those, and is safe to call more than once.
pub struct Surface<B: TerminalBackend> {
    backend: B,
    raw: bool,
    alternate: bool,
    cursor_hidden: bool,
}

impl<B: TerminalBackend> Surface<B> {
    /// Wrap a backend without touching any terminal mode.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            raw: false,
            alternate: false,
            cursor_hidden: false,
        }
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The wrapped backend, mutably.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Columns and rows, falling back to 80x24 when the size is unknown.
    pub fn size(&self) -> (u16, u16) {
        match self.backend.size() {
            Ok((cols, rows)) if cols > 0 && rows > 0 => (cols, rows),
            Ok(_) | Err(_) => FALLBACK_SIZE,
        }
    }

    /// Whether the backend is an interactive terminal.
    pub fn is_tty(&self) -> bool {
        self.backend.is_tty()
    }

    /// Whether raw mode was switched on through this surface.
    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// Whether the alternate screen was entered through this surface.
    pub fn in_alternate_screen(&self) -> bool {
        self.alternate
    }

    // -- Cursor --

    /// Move to an absolute zero-based column and row.
    pub fn move_to(&mut self, col: u16, row: u16) -> Result<()> {
        queue!(self.backend, MoveTo(col, row))?;
        Ok(())
    }

    /// Move relative to the current position.
    pub fn move_by(&mut self, cols: i16, rows: i16) -> Result<()> {
        if cols > 0 {
            queue!(self.backend, MoveRight(cols.unsigned_abs()))?;
        } else if cols < 0 {
            queue!(self.backend, MoveLeft(cols.unsigned_abs()))?;
        }
        if rows > 0 {
            queue!(self.backend, MoveDown(rows.unsigned_abs()))?;
        } else if rows < 0 {
            queue!(self.backend, MoveUp(rows.unsigned_abs()))?;
        }
        Ok(())
    }

    /// Make the cursor visible again.
    pub fn show_cursor(&mut self) -> Result<()> {
        queue!(self.backend, Show)?;
        self.cursor_hidden = false;
        Ok(())
    }

    /// Hide the cursor until [`Surface::show_cursor`] or release.
    pub fn hide_cursor(&mut self) -> Result<()> {
        queue!(self.backend, Hide)?;
        self.cursor_hidden = true;
        Ok(())
    }

    // -- Clearing --

    /// Clear one whole row and leave the cursor at its start.
    pub fn clear_line(&mut self, row: u16) -> Result<()> {
        queue!(self.backend, MoveTo(0, row), Clear(ClearType::CurrentLine))?;
        Ok(())
    }

    /// Clear every row in `rows`.
    pub fn clear_rows(&mut self, rows: Range<u16>) -> Result<()> {
        for row in rows {
            self.clear_line(row)?;
        }
        Ok(())
    }

    /// Clear everything and home the cursor.
    pub fn clear_screen(&mut self) -> Result<()> {
        queue!(self.backend, Clear(ClearType::All), MoveTo(0, 0))?;
        Ok(())
    }

    // -- Modes --

    /// Switch raw input mode on or off. A backend that is not a terminal
    /// may treat this as a no-op.
    pub fn set_raw_mode(&mut self, enabled: bool) -> Result<()> {
        self.backend.set_raw_mode(enabled)?;
        self.raw = enabled;
        Ok(())
    }

    /// Switch to the alternate screen buffer.
    pub fn enter_alternate_screen(&mut self) -> Result<()> {
        queue!(self.backend, EnterAlternateScreen)?;
        self.alternate = true;
        Ok(())
    }

    /// Return to the main screen buffer.
    pub fn leave_alternate_screen(&mut self) -> Result<()> {
        queue!(self.backend, LeaveAlternateScreen)?;
        self.alternate = false;
        Ok(())
    }

    /// Take over the terminal: raw mode, alternate screen, blank page.
    pub fn acquire(&mut self) -> Result<()> {
        self.set_raw_mode(true)?;
        self.enter_alternate_screen()?;
        self.clear_screen()?;
        self.flush()
    }

    /// Give the terminal back: cursor shown, alternate screen left, raw mode
    /// off. Every step is attempted even if an earlier one fails; the first
    /// error is returned.
    pub fn release(&mut self) -> Result<()> {
        let mut first_err: Option<CapshellError> = None;
        let mut keep = |r: Result<()>| {
            if let Err(e) = r
                && first_err.is_none()
            {
                first_err = Some(e);
            }
        };

        keep(queue!(self.backend, ResetColor, Show).map_err(CapshellError::from));
        self.cursor_hidden = false;
        if self.alternate {
            keep(queue!(self.backend, LeaveAlternateScreen).map_err(CapshellError::from));
            self.alternate = false;
        }
        keep(self.backend.flush().map_err(CapshellError::from));
        if self.raw {
            keep(self.backend.set_raw_mode(false).map_err(CapshellError::from));
            self.raw = false;
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    // -- Text --

    /// Print at the current cursor position.
    pub fn print(&mut self, text: &str) -> Result<()> {
        queue!(self.backend, Print(text))?;
        Ok(())
    }

    /// Print in `color`, then reset the colour.
    pub fn print_styled(&mut self, text: &str, color: Color) -> Result<()> {
        queue!(self.backend, SetForegroundColor(color), Print(text), ResetColor)?;
        Ok(())
    }

    /// Move, then print.
    pub fn print_at(&mut self, col: u16, row: u16, text: &str) -> Result<()> {
        queue!(self.backend, MoveTo(col, row), Print(text))?;
        Ok(())
    }

    // -- Widgets --

    /// Draw a border with its top-left corner at (`col`, `row`).
    pub fn draw_border(&mut self, col: u16, row: u16, border: &Border, color: Color) -> Result<()> {
        queue!(self.backend, SetForegroundColor(color))?;
        for (i, line) in border.lines().iter().enumerate() {
            let y = row.saturating_add(i as u16);
            queue!(self.backend, MoveTo(col, y), Print(line))?;
        }
        queue!(self.backend, ResetColor)?;
        Ok(())
    }

    /// Draw a progress bar at (`col`, `row`).
    pub fn draw_progress(&mut self, col: u16, row: u16, bar: &ProgressBar, color: Color) -> Result<()> {
        queue!(
            self.backend,
            MoveTo(col, row),
            SetForegroundColor(color),
            Print(bar.render()),
            ResetColor
        )?;
        Ok(())
    }

    /// Push buffered output to the device.
    pub fn flush(&mut self) -> Result<()> {
        self.backend.flush()?;
        Ok(())
    }
}

impl<B: TerminalBackend> Drop for Surface<B> {
    fn drop(&mut self) {
        if (self.raw || self.alternate || self.cursor_hidden)
            && let Err(e) = self.release()
        {
            log::warn!("failed to restore terminal: {e}");
        }
    }
}
