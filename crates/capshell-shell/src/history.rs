//! Submitted-line history with a browsing cursor.

/// Ordered, append-only history of submitted lines.
///
/// The cursor sits one past the newest entry unless the user is browsing.
/// The line being typed when browsing starts is kept as a draft and comes
/// back when the user moves past the newest entry again.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<String>,
    cursor: usize,
    draft: Option<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submitted line. Blank lines are not recorded. The cursor
    /// resets either way.
    pub fn push(&mut self, line: &str) {
        if !line.trim().is_empty() {
            self.entries.push(line.to_string());
        }
        self.cursor = self.entries.len();
        self.draft = None;
    }

    /// Step to the previous entry. `current` is the text on the prompt,
    /// saved as the draft when browsing starts. Stays on the oldest entry.
    pub fn older(&mut self, current: &str) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        if self.cursor == self.entries.len() {
            self.draft = Some(current.to_string());
        }
        self.cursor = self.cursor.saturating_sub(1);
        self.entries.get(self.cursor).cloned()
    }

    /// Step to the next entry, or back to the draft after the newest one.
    /// `None` when not browsing.
    pub fn newer(&mut self) -> Option<String> {
        if self.cursor >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        match self.entries.get(self.cursor) {
            Some(entry) => Some(entry.clone()),
            None => Some(self.draft.take().unwrap_or_default()),
        }
    }

    pub fn is_browsing(&self) -> bool {
        self.cursor < self.entries.len()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xyz() -> History {
        let mut h = History::new();
        for line in ["x", "y", "z"] {
            h.push(line);
        }
        h
    }

    #[test]
    fn three_back_one_forward() {
        let mut h = xyz();
        assert_eq!(h.older("").as_deref(), Some("z"));
        assert_eq!(h.older("").as_deref(), Some("y"));
        assert_eq!(h.older("").as_deref(), Some("x"));
        assert_eq!(h.newer().as_deref(), Some("y"));
    }

    #[test]
    fn previous_stops_at_oldest() {
        let mut h = xyz();
        for _ in 0..5 {
            h.older("");
        }
        assert_eq!(h.older("").as_deref(), Some("x"));
    }

    #[test]
    fn next_past_newest_restores_draft() {
        let mut h = xyz();
        assert_eq!(h.older("half typed").as_deref(), Some("z"));
        assert_eq!(h.newer().as_deref(), Some("half typed"));
        assert!(!h.is_browsing());
        assert_eq!(h.newer(), None);
    }

    #[test]
    fn draft_is_taken_once_browsing_starts() {
        let mut h = xyz();
        h.older("draft");
        // Text passed while already browsing does not replace the draft.
        h.older("y-edited");
        h.newer();
        assert_eq!(h.newer().as_deref(), Some("draft"));
    }

    #[test]
    fn push_resets_cursor() {
        let mut h = xyz();
        h.older("");
        h.older("");
        h.push("w");
        assert!(!h.is_browsing());
        assert_eq!(h.older("").as_deref(), Some("w"));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let mut h = History::new();
        h.push("   ");
        h.push("");
        assert!(h.is_empty());
        assert_eq!(h.older("abc"), None);
    }

    #[test]
    fn duplicates_are_kept() {
        let mut h = History::new();
        h.push("status");
        h.push("status");
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn next_without_browsing() {
        let mut h = xyz();
        assert_eq!(h.newer(), None);
    }
}
