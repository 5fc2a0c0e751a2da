//! Platform-agnostic input event types.
//!
//! The terminal backend maps native key events to these enums. The shell
//! state machine never sees raw terminal input, which keeps it testable
//! without an attached terminal.

/// A logical key as understood by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Printable character.
    Char(char),
    /// Delete the character left of the cursor.
    Backspace,
    /// Submit the current line.
    Enter,
    /// Request completion of the current token.
    Tab,
    /// Previous history entry (arrow up).
    HistoryPrev,
    /// Next history entry (arrow down).
    HistoryNext,
    /// Bare escape key.
    Escape,
    /// Interrupt request (Ctrl+C or SIGINT).
    Interrupt,
    /// End of input (Ctrl+D on an empty line, or the input stream closed).
    EndOfInput,
    /// Any other control key the shell does not act on.
    Other,
}

impl Key {
    /// Whether the key produces a printable character.
    pub fn is_printable(self) -> bool {
        matches!(self, Self::Char(c) if !c.is_control())
    }
}

/// A platform-agnostic input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A key was pressed.
    Key(Key),
    /// Terminal resized to the given columns and rows.
    Resize { cols: u16, rows: u16 },
    /// Termination signal (SIGTERM, SIGHUP) delivered to the process.
    Hangup,
}

impl From<Key> for InputEvent {
    fn from(key: Key) -> Self {
        Self::Key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_chars() {
        assert!(Key::Char('a').is_printable());
        assert!(Key::Char(' ').is_printable());
        assert!(!Key::Char('\u{7}').is_printable());
    }

    #[test]
    fn control_keys_not_printable() {
        for key in [
            Key::Backspace,
            Key::Enter,
            Key::Tab,
            Key::HistoryPrev,
            Key::HistoryNext,
            Key::Escape,
            Key::Interrupt,
            Key::EndOfInput,
            Key::Other,
        ] {
            assert!(!key.is_printable(), "{key:?}");
        }
    }

    #[test]
    fn key_into_event() {
        let e: InputEvent = Key::Enter.into();
        assert_eq!(e, InputEvent::Key(Key::Enter));
    }

    #[test]
    fn resize_event_equality() {
        let a = InputEvent::Resize { cols: 80, rows: 24 };
        assert_eq!(a, InputEvent::Resize { cols: 80, rows: 24 });
        assert_ne!(a, InputEvent::Resize { cols: 81, rows: 24 });
    }
}
