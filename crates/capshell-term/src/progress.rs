//! Text progress bars.

/// Partial-cell glyphs for the smooth style, indexed by eighths filled.
const EIGHTHS: [char; 8] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉'];

/// Progress bar visual style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressStyle {
    /// Run of full blocks over a shaded track.
    #[default]
    Block,
    /// Full blocks plus one eighth-block glyph for the partial cell.
    Smooth,
    /// Filled and hollow dots.
    Dots,
    /// Heavy and light horizontal lines.
    Bar,
}

impl ProgressStyle {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "block" => Some(Self::Block),
            "smooth" => Some(Self::Smooth),
            "dots" => Some(Self::Dots),
            "bar" => Some(Self::Bar),
            _ => None,
        }
    }

    fn glyphs(self) -> (char, char) {
        match self {
            Self::Block => ('█', '░'),
            Self::Smooth => ('█', ' '),
            Self::Dots => ('●', '○'),
            Self::Bar => ('━', '─'),
        }
    }
}

/// A progress indicator rendered as a run of glyphs.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressBar {
    /// Progress value (0.0 to 1.0).
    pub value: f32,
    /// Bar width in cells, label excluded.
    pub width: usize,
    /// Visual style variant.
    pub style: ProgressStyle,
    /// Whether to append a percentage label.
    pub show_label: bool,
}

impl ProgressBar {
    /// Create a new progress bar (value clamped to 0.0-1.0, NaN treated as 0).
    pub fn new(value: f32, width: usize) -> Self {
        let value = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 1.0)
        };
        Self {
            value,
            width,
            style: ProgressStyle::default(),
            show_label: false,
        }
    }

    pub fn style(mut self, style: ProgressStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_label(mut self) -> Self {
        self.show_label = true;
        self
    }

    /// Percentage shown in the label.
    pub fn percent(&self) -> u32 {
        (self.value * 100.0).round() as u32
    }

    /// Render the bar, with the label appended when enabled.
    pub fn render(&self) -> String {
        let (fill, empty) = self.style.glyphs();
        let mut out = String::with_capacity(self.width * 3 + 6);

        if self.style == ProgressStyle::Smooth {
            let eighths = (self.value * self.width as f32 * 8.0).round() as usize;
            let full = (eighths / 8).min(self.width);
            let rem = eighths % 8;
            out.extend(std::iter::repeat_n(fill, full));
            let mut used = full;
            if rem > 0 && used < self.width {
                out.push(EIGHTHS[rem]);
                used += 1;
            }
            out.extend(std::iter::repeat_n(empty, self.width - used));
        } else {
            let filled = ((self.value * self.width as f32).round() as usize).min(self.width);
            out.extend(std::iter::repeat_n(fill, filled));
            out.extend(std::iter::repeat_n(empty, self.width - filled));
        }

        if self.show_label {
            out.push_str(&format!(" {:>3}%", self.percent()));
        }
        out
    }
}
