//! Terminal surface for capshell.
//!
//! Everything here is a thin, stateless layer over escape sequences: cursor
//! movement, clearing, raw mode, the alternate screen, and two text widgets
//! (borders and progress bars). Drawing goes through a [`TerminalBackend`] so
//! the shell can be driven against an in-memory terminal in tests.

pub mod backend;
pub mod border;
pub mod input;
pub mod progress;
pub mod surface;
pub mod theme;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use backend::{StdoutBackend, TerminalBackend};
pub use border::{Border, BorderStyle};
pub use crossterm::style::Color;
pub use progress::{ProgressBar, ProgressStyle};
pub use surface::Surface;
pub use theme::Theme;
