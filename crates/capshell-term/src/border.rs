//! Box borders drawn with line glyphs.

/// Glyph set for a border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    #[default]
    Single,
    Double,
    Rounded,
    Thick,
}

struct Glyphs {
    top_left: char,
    top_right: char,
    bottom_left: char,
    bottom_right: char,
    horizontal: char,
    vertical: char,
}

impl BorderStyle {
    fn glyphs(self) -> Glyphs {
        let (top_left, top_right, bottom_left, bottom_right, horizontal, vertical) = match self {
            Self::Single => ('┌', '┐', '└', '┘', '─', '│'),
            Self::Double => ('╔', '╗', '╚', '╝', '═', '║'),
            Self::Rounded => ('╭', '╮', '╰', '╯', '─', '│'),
            Self::Thick => ('┏', '┓', '┗', '┛', '━', '┃'),
        };
        Glyphs {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
            horizontal,
            vertical,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "single" => Some(Self::Single),
            "double" => Some(Self::Double),
            "rounded" => Some(Self::Rounded),
            "thick" => Some(Self::Thick),
            _ => None,
        }
    }
}

/// A rectangle outline with an optional title in the top edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Border {
    pub width: u16,
    pub height: u16,
    pub style: BorderStyle,
    pub title: Option<String>,
}

impl Border {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            style: BorderStyle::default(),
            title: None,
        }
    }

    pub fn style(mut self, style: BorderStyle) -> Self {
        self.style = style;
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// The title is drawn only when two corners, two padding spaces and the
    /// whole title fit in the width. It is never truncated.
    pub fn title_fits(&self) -> bool {
        match &self.title {
            Some(t) => t.chars().count() + 4 <= usize::from(self.width),
            None => false,
        }
    }

    /// Rows of the border, top to bottom. Empty when the box is smaller than
    /// 2x2. Inner cells are spaces.
    pub fn lines(&self) -> Vec<String> {
        if self.width < 2 || self.height < 2 {
            return Vec::new();
        }
        let g = self.style.glyphs();
        let inner = usize::from(self.width) - 2;
        let mut out = Vec::with_capacity(usize::from(self.height));

        let mut top = String::new();
        top.push(g.top_left);
        match self.title.as_deref().filter(|_| self.title_fits()) {
            Some(title) => {
                let segment = title.chars().count() + 2;
                let left = (inner - segment) / 2;
                let right = inner - segment - left;
                top.extend(std::iter::repeat_n(g.horizontal, left));
                top.push(' ');
                top.push_str(title);
                top.push(' ');
                top.extend(std::iter::repeat_n(g.horizontal, right));
            },
            None => top.extend(std::iter::repeat_n(g.horizontal, inner)),
        }
        top.push(g.top_right);
        out.push(top);

        let mut middle = String::new();
        middle.push(g.vertical);
        middle.extend(std::iter::repeat_n(' ', inner));
        middle.push(g.vertical);
        for _ in 0..self.height - 2 {
            out.push(middle.clone());
        }

        let mut bottom = String::new();
        bottom.push(g.bottom_left);
        bottom.extend(std::iter::repeat_n(g.horizontal, inner));
        bottom.push(g.bottom_right);
        out.push(bottom);

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn width_of(s: &str) -> usize {
        s.chars().count()
    }

    #[test]
    fn plain_single_box() {
        let lines = Border::new(4, 3).lines();
        assert_eq!(lines, vec!["┌──┐", "│  │", "└──┘"]);
    }

    #[test]
    fn title_centered() {
        let lines = Border::new(12, 2).title("hi").lines();
        assert_eq!(lines[0], "┌─── hi ───┐");
        assert_eq!(width_of(&lines[0]), 12);
    }

    #[test]
    fn title_exact_fit() {
        // 2 corners + 2 spaces + 4 chars = 8.
        let border = Border::new(8, 2).title("abcd");
        assert!(border.title_fits());
        assert_eq!(border.lines()[0], "┌ abcd ┐");
    }

    #[test]
    fn long_title_dropped() {
        let border = Border::new(8, 3).title("abcde");
        assert!(!border.title_fits());
        let lines = border.lines();
        assert_eq!(lines[0], "┌──────┐");
        assert!(lines.iter().all(|l| !l.contains('a')));
    }

    #[test]
    fn styles_use_their_corners() {
        assert!(Border::new(3, 2).style(BorderStyle::Double).lines()[0].starts_with('╔'));
        assert!(Border::new(3, 2).style(BorderStyle::Rounded).lines()[1].ends_with('╯'));
        assert!(Border::new(3, 2).style(BorderStyle::Thick).lines()[0].contains('━'));
    }

    #[test]
    fn degenerate_sizes_draw_nothing() {
        assert!(Border::new(1, 5).lines().is_empty());
        assert!(Border::new(5, 1).lines().is_empty());
    }

    #[test]
    fn style_names() {
        assert_eq!(BorderStyle::from_name("rounded"), Some(BorderStyle::Rounded));
        assert_eq!(BorderStyle::from_name("dotted"), None);
    }

    proptest! {
        #[test]
        fn rows_never_exceed_width(w in 2u16..60, h in 2u16..10, title in "[a-z ]{0,70}") {
            let border = Border::new(w, h).title(&title);
            let lines = border.lines();
            prop_assert_eq!(lines.len(), usize::from(h));
            for line in &lines {
                prop_assert_eq!(width_of(line), usize::from(w));
            }
            if title.chars().count() > usize::from(w).saturating_sub(4) {
                prop_assert!(!border.title_fits());
            }
        }
    }
}
