//! Screen regions and the scrolling content pane.
//!
//! ```text
//! row 0          ╔══ capshell ══╗   header
//! row 1          ║ summary      ║
//! row 2          ╚══════════════╝
//! rows 3..p      content (scrolls in batches)
//! row p = h-2    prompt
//! row h-1        hint
//! ```

use capshell_term::{Color, Surface, TerminalBackend};
use capshell_types::error::Result;

/// Rows taken by the header box.
pub const HEADER_ROWS: u16 = 3;

/// Smallest height that still leaves one content row.
const MIN_ROWS: u16 = HEADER_ROWS + 3;

/// Fixed screen regions for a terminal size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub cols: u16,
    pub rows: u16,
}

impl ScreenLayout {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols: cols.max(1),
            rows: rows.max(MIN_ROWS),
        }
    }

    pub fn content_top(&self) -> u16 {
        HEADER_ROWS
    }

    /// Rows available for output.
    pub fn content_height(&self) -> u16 {
        self.prompt_row() - self.content_top()
    }

    pub fn prompt_row(&self) -> u16 {
        self.rows - 2
    }

    pub fn hint_row(&self) -> u16 {
        self.rows - 1
    }
}

/// Output lines currently visible in the content region.
///
/// Lines are written at an advancing row. When the next line would reach the
/// prompt row, the oldest `batch` lines are dropped, the rest are redrawn at
/// the top and writing resumes below them.
#[derive(Debug, Clone)]
pub struct ContentPane {
    lines: Vec<(String, Color)>,
    top: u16,
    height: u16,
    width: u16,
    batch: u16,
}

impl ContentPane {
    pub fn new(layout: &ScreenLayout, batch: u16) -> Self {
        Self {
            lines: Vec::new(),
            top: layout.content_top(),
            height: layout.content_height(),
            width: layout.cols,
            batch,
        }
    }

    /// Rows dropped per scroll, clamped to the region height.
    pub fn batch(&self) -> u16 {
        self.batch.clamp(1, self.height.max(1))
    }

    pub fn set_batch(&mut self, batch: u16) {
        self.batch = batch;
    }

    /// Row the next line will be written to.
    pub fn row(&self) -> u16 {
        self.top + self.lines.len() as u16
    }

    pub fn visible_lines(&self) -> Vec<&str> {
        self.lines.iter().map(|(text, _)| text.as_str()).collect()
    }

    /// Write one line, scrolling first if the region is full.
    pub fn write_line<B: TerminalBackend>(
        &mut self,
        surface: &mut Surface<B>,
        text: &str,
        color: Color,
    ) -> Result<()> {
        if self.lines.len() >= usize::from(self.height) {
            self.scroll(surface)?;
        }
        let text = self.fit(text);
        let row = self.row();
        surface.clear_line(row)?;
        surface.print_styled(&text, color)?;
        self.lines.push((text, color));
        Ok(())
    }

    /// Drop the oldest batch and redraw what is left.
    pub fn scroll<B: TerminalBackend>(&mut self, surface: &mut Surface<B>) -> Result<()> {
        let drop = usize::from(self.batch()).min(self.lines.len());
        self.lines.drain(..drop);
        log::trace!("content scrolled by {drop} rows");
        self.redraw(surface)
    }

    /// Forget every line and blank the region.
    pub fn clear<B: TerminalBackend>(&mut self, surface: &mut Surface<B>) -> Result<()> {
        self.lines.clear();
        surface.clear_rows(self.top..self.top + self.height)
    }

    /// Repaint the region from the kept lines.
    pub fn redraw<B: TerminalBackend>(&self, surface: &mut Surface<B>) -> Result<()> {
        for (i, (text, color)) in self.lines.iter().enumerate() {
            surface.clear_line(self.top + i as u16)?;
            surface.print_styled(text, *color)?;
        }
        surface.clear_rows(self.row()..self.top + self.height)
    }

    /// Adopt a new layout, keeping the newest lines that still fit.
    pub fn resize(&mut self, layout: &ScreenLayout) {
        self.top = layout.content_top();
        self.height = layout.content_height();
        self.width = layout.cols;
        let excess = self.lines.len().saturating_sub(usize::from(self.height));
        self.lines.drain(..excess);
        let width = usize::from(self.width);
        for (text, _) in &mut self.lines {
            if let Some((cut, _)) = text.char_indices().nth(width) {
                text.truncate(cut);
            }
        }
    }

    fn fit(&self, text: &str) -> String {
        text.chars().take(usize::from(self.width)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capshell_term::test_utils::MockTerminal;

    fn setup(rows: u16, batch: u16) -> (Surface<MockTerminal>, ContentPane) {
        let layout = ScreenLayout::new(20, rows);
        let pane = ContentPane::new(&layout, batch);
        (Surface::new(MockTerminal::new(20, rows)), pane)
    }

    fn write(pane: &mut ContentPane, surface: &mut Surface<MockTerminal>, n: usize) {
        for i in 0..n {
            pane.write_line(surface, &format!("line {i}"), Color::Reset).unwrap();
        }
        surface.flush().unwrap();
    }

    #[test]
    fn regions() {
        let l = ScreenLayout::new(80, 24);
        assert_eq!(l.content_top(), 3);
        assert_eq!(l.prompt_row(), 22);
        assert_eq!(l.hint_row(), 23);
        assert_eq!(l.content_height(), 19);
    }

    #[test]
    fn tiny_terminal_keeps_one_content_row() {
        let l = ScreenLayout::new(10, 2);
        assert_eq!(l.content_height(), 1);
    }

    #[test]
    fn rows_advance() {
        let (mut s, mut pane) = setup(24, 10);
        write(&mut pane, &mut s, 3);
        assert_eq!(pane.row(), 6);
        let screen = s.backend().screen();
        assert_eq!(screen[3], "line 0");
        assert_eq!(screen[5], "line 2");
    }

    #[test]
    fn full_region_scrolls_by_batch() {
        // 16 rows: content is rows 3..14, 11 rows tall.
        let (mut s, mut pane) = setup(16, 4);
        write(&mut pane, &mut s, 11);
        assert_eq!(pane.row(), 14);

        write_one(&mut pane, &mut s, "next");
        // Four oldest dropped, seven survivors redrawn, then the new line.
        assert_eq!(pane.visible_lines().len(), 8);
        assert_eq!(pane.visible_lines()[0], "line 4");
        assert_eq!(pane.row(), 3 + 8);

        let screen = s.backend().screen();
        assert_eq!(screen[3], "line 4");
        assert_eq!(screen[9], "line 10");
        assert_eq!(screen[10], "next");
        // Vacated rows are blank and the prompt row is untouched.
        assert_eq!(screen[11], "");
        assert_eq!(screen[13], "");
        assert_eq!(screen[14], "");
    }

    fn write_one(pane: &mut ContentPane, s: &mut Surface<MockTerminal>, text: &str) {
        pane.write_line(s, text, Color::Reset).unwrap();
        s.flush().unwrap();
    }

    #[test]
    fn batch_clamped_to_region() {
        let (mut s, mut pane) = setup(8, 50);
        // Content is rows 3..6, three rows tall.
        assert_eq!(pane.batch(), 3);
        write(&mut pane, &mut s, 4);
        assert_eq!(pane.visible_lines(), ["line 3"]);
    }

    #[test]
    fn content_never_reaches_prompt_row() {
        let (mut s, mut pane) = setup(12, 10);
        write(&mut pane, &mut s, 100);
        let l = ScreenLayout::new(20, 12);
        assert!(pane.row() <= l.prompt_row());
        assert!(pane.visible_lines().len() <= usize::from(l.content_height()));
    }

    #[test]
    fn long_lines_are_cut_to_width() {
        let (mut s, mut pane) = setup(10, 10);
        write_one(&mut pane, &mut s, &"x".repeat(50));
        assert_eq!(pane.visible_lines()[0].len(), 20);
    }

    #[test]
    fn clear_blanks_region() {
        let (mut s, mut pane) = setup(10, 10);
        write(&mut pane, &mut s, 3);
        pane.clear(&mut s).unwrap();
        s.flush().unwrap();
        assert_eq!(pane.row(), 3);
        assert!(s.backend().screen().iter().all(String::is_empty));
    }

    #[test]
    fn resize_keeps_newest_lines() {
        let (mut s, mut pane) = setup(24, 10);
        write(&mut pane, &mut s, 10);
        pane.resize(&ScreenLayout::new(4, 8));
        assert_eq!(pane.visible_lines(), ["line", "line", "line"]);
        assert_eq!(pane.row(), 6);
    }
}
