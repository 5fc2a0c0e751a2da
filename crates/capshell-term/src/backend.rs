//! Terminal backends.

use std::io::{self, IsTerminal, Write};

/// Default size reported when the real size cannot be queried.
pub const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// A byte sink that also knows its size and can toggle raw mode.
pub trait TerminalBackend: Write {
    /// Columns and rows.
    fn size(&self) -> io::Result<(u16, u16)>;

    /// Switch raw input mode on or off.
    fn set_raw_mode(&mut self, enabled: bool) -> io::Result<()>;

    /// Whether the backend is attached to an interactive terminal.
    fn is_tty(&self) -> bool;
}

/// Backend writing to the process's standard output.
pub struct StdoutBackend {
    out: io::Stdout,
}

impl StdoutBackend {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for StdoutBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for StdoutBackend {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl TerminalBackend for StdoutBackend {
    fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    fn set_raw_mode(&mut self, enabled: bool) -> io::Result<()> {
        if !self.is_tty() {
            log::debug!("stdout is not a terminal, raw mode unchanged");
            return Ok(());
        }
        if enabled {
            crossterm::terminal::enable_raw_mode()
        } else {
            crossterm::terminal::disable_raw_mode()
        }
    }

    fn is_tty(&self) -> bool {
        self.out.is_terminal()
    }
}
