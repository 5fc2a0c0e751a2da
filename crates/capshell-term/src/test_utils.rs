//! In-memory terminal for tests.
//!
//! [`MockTerminal`] records every byte written to it and replays the escape
//! sequences the surface emits onto a character grid, so tests can assert
//! on what a user would see.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use crate::backend::TerminalBackend;

/// Shared view of everything written to a [`MockTerminal`].
///
/// Cloning is cheap and every clone sees the same bytes, so a test can keep
/// one after handing the terminal to a surface.
#[derive(Debug, Clone, Default)]
pub struct Transcript(Rc<RefCell<Vec<u8>>>);

impl Transcript {
    /// Raw output, escape sequences included.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    /// Output with escape sequences removed.
    pub fn visible_text(&self) -> String {
        let raw = self.contents();
        let mut out = String::new();
        let mut chars = raw.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '\x1b' {
                out.push(c);
                continue;
            }
            if chars.peek() == Some(&'[') {
                chars.next();
                for c in chars.by_ref() {
                    if ('\x40'..='\x7e').contains(&c) {
                        break;
                    }
                }
            } else {
                chars.next();
            }
        }
        out
    }

    /// Replay the output onto a `cols` x `rows` grid and return each row with
    /// trailing blanks trimmed.
    pub fn screen(&self, cols: u16, rows: u16) -> Vec<String> {
        let mut grid = Grid::new(usize::from(cols), usize::from(rows));
        grid.replay(&self.contents());
        grid.rows()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// A fake terminal device.
#[derive(Debug)]
pub struct MockTerminal {
    transcript: Transcript,
    pub cols: u16,
    pub rows: u16,
    /// Current raw-mode state as set through the backend.
    pub raw: bool,
    /// Make every write and flush fail with a broken pipe.
    pub fail_writes: bool,
    /// Report as an interactive terminal. When off, raw mode is left alone.
    pub tty: bool,
}

impl MockTerminal {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            transcript: Transcript::default(),
            cols,
            rows,
            raw: false,
            fail_writes: false,
            tty: true,
        }
    }

    pub fn transcript(&self) -> Transcript {
        self.transcript.clone()
    }

    pub fn contents(&self) -> String {
        self.transcript.contents()
    }

    pub fn visible_text(&self) -> String {
        self.transcript.visible_text()
    }

    /// Current screen as a user would see it.
    pub fn screen(&self) -> Vec<String> {
        self.transcript.screen(self.cols, self.rows)
    }

    fn broken_pipe() -> io::Error {
        io::Error::new(io::ErrorKind::BrokenPipe, "mock terminal closed")
    }
}

impl Write for MockTerminal {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(Self::broken_pipe());
        }
        self.transcript.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.fail_writes {
            return Err(Self::broken_pipe());
        }
        Ok(())
    }
}

impl TerminalBackend for MockTerminal {
    fn size(&self) -> io::Result<(u16, u16)> {
        Ok((self.cols, self.rows))
    }

    fn set_raw_mode(&mut self, enabled: bool) -> io::Result<()> {
        if self.tty {
            self.raw = enabled;
        }
        Ok(())
    }

    fn is_tty(&self) -> bool {
        self.tty
    }
}

/// Minimal interpreter for the escape sequences the surface emits.
struct Grid {
    cols: usize,
    cells: Vec<Vec<char>>,
    col: usize,
    row: usize,
}

impl Grid {
    fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            cells: vec![vec![' '; cols]; rows],
            col: 0,
            row: 0,
        }
    }

    fn replay(&mut self, raw: &str) {
        let mut chars = raw.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\x1b' => {
                    if chars.peek() != Some(&'[') {
                        chars.next();
                        continue;
                    }
                    chars.next();
                    let mut params = String::new();
                    let mut action = None;
                    for c in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&c) {
                            action = Some(c);
                            break;
                        }
                        params.push(c);
                    }
                    if let Some(action) = action {
                        self.apply(&params, action);
                    }
                },
                '\r' => self.col = 0,
                '\n' => self.row = (self.row + 1).min(self.cells.len().saturating_sub(1)),
                c => self.put(c),
            }
        }
    }

    fn apply(&mut self, params: &str, action: char) {
        // Private modes (cursor visibility, alternate screen) do not touch cells.
        if params.starts_with('?') {
            return;
        }
        let nums: Vec<usize> = params.split(';').filter_map(|p| p.parse().ok()).collect();
        let n = nums.first().copied().unwrap_or(1).max(1);
        let last_row = self.cells.len().saturating_sub(1);
        match action {
            'H' => {
                self.row = nums.first().copied().unwrap_or(1).saturating_sub(1).min(last_row);
                self.col = nums.get(1).copied().unwrap_or(1).saturating_sub(1);
            },
            'A' => self.row = self.row.saturating_sub(n),
            'B' => self.row = (self.row + n).min(last_row),
            'C' => self.col += n,
            'D' => self.col = self.col.saturating_sub(n),
            'G' => self.col = n - 1,
            'K' => {
                if let Some(line) = self.cells.get_mut(self.row) {
                    line.iter_mut().for_each(|c| *c = ' ');
                }
            },
            'J' => {
                for line in &mut self.cells {
                    line.iter_mut().for_each(|c| *c = ' ');
                }
            },
            _ => {},
        }
    }

    fn put(&mut self, c: char) {
        if self.col < self.cols
            && let Some(line) = self.cells.get_mut(self.row)
        {
            line[self.col] = c;
        }
        self.col += 1;
    }

    fn rows(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|line| line.iter().collect::<String>().trim_end().to_string())
            .collect()
    }
}
