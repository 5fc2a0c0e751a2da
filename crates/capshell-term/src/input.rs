//! Keyboard input: crossterm events mapped to shell keys.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use capshell_types::input::{InputEvent, Key};

/// Map one crossterm key event to a shell key.
pub fn map_key(key: KeyEvent) -> Key {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('C') if ctrl => Key::Interrupt,
        KeyCode::Char('d') | KeyCode::Char('D') if ctrl => Key::EndOfInput,
        KeyCode::Char('p') if ctrl => Key::HistoryPrev,
        KeyCode::Char('n') if ctrl => Key::HistoryNext,
        KeyCode::Char(_) if ctrl => Key::Other,
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Tab => Key::Tab,
        KeyCode::Up => Key::HistoryPrev,
        KeyCode::Down => Key::HistoryNext,
        KeyCode::Esc => Key::Escape,
        _ => Key::Other,
    }
}

/// Map a crossterm event. Key releases and mouse/focus events are dropped.
pub fn map_event(event: Event) -> Option<InputEvent> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => Some(InputEvent::Key(map_key(key))),
        Event::Resize(cols, rows) => Some(InputEvent::Resize { cols, rows }),
        _ => None,
    }
}

/// Spawn a thread that reads terminal events and hands them to `sink`.
///
/// The thread stops when `sink` returns `false`. A read error is reported
/// as end of input before the thread exits.
pub fn spawn_input_thread<F>(mut sink: F) -> std::thread::JoinHandle<()>
where
    F: FnMut(InputEvent) -> bool + Send + 'static,
{
    std::thread::spawn(move || {
        loop {
            match event::read() {
                Ok(ev) => {
                    if let Some(mapped) = map_event(ev)
                        && !sink(mapped)
                    {
                        break;
                    }
                },
                Err(e) => {
                    log::warn!("terminal input closed: {e}");
                    sink(InputEvent::Key(Key::EndOfInput));
                    break;
                },
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn control_chords() {
        assert_eq!(map_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL)), Key::Interrupt);
        assert_eq!(map_key(key(KeyCode::Char('d'), KeyModifiers::CONTROL)), Key::EndOfInput);
        assert_eq!(map_key(key(KeyCode::Char('x'), KeyModifiers::CONTROL)), Key::Other);
    }

    #[test]
    fn plain_chars_and_shift() {
        assert_eq!(map_key(key(KeyCode::Char('c'), KeyModifiers::NONE)), Key::Char('c'));
        assert_eq!(map_key(key(KeyCode::Char('C'), KeyModifiers::SHIFT)), Key::Char('C'));
    }

    #[test]
    fn navigation_keys() {
        assert_eq!(map_key(key(KeyCode::Up, KeyModifiers::NONE)), Key::HistoryPrev);
        assert_eq!(map_key(key(KeyCode::Down, KeyModifiers::NONE)), Key::HistoryNext);
        assert_eq!(map_key(key(KeyCode::Tab, KeyModifiers::NONE)), Key::Tab);
        assert_eq!(map_key(key(KeyCode::Esc, KeyModifiers::NONE)), Key::Escape);
        assert_eq!(map_key(key(KeyCode::F(5), KeyModifiers::NONE)), Key::Other);
    }

    #[test]
    fn resize_event() {
        assert_eq!(
            map_event(Event::Resize(100, 30)),
            Some(InputEvent::Resize { cols: 100, rows: 30 })
        );
    }

    #[test]
    fn focus_events_dropped() {
        assert_eq!(map_event(Event::FocusGained), None);
    }
}
