//! Named colour palettes for the shell.

use crossterm::style::Color;

use crate::border::BorderStyle;
use crate::progress::ProgressStyle;

const BUILTIN_NAMES: [&str; 4] = ["default", "mono", "ocean", "amber"];

/// Visual theme: a handful of roles plus the widget styles to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    /// Header border, prompt and highlights.
    pub accent: Color,
    /// Regular output text.
    pub text: Color,
    /// Hints and secondary text.
    pub muted: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    /// Border style of the header box.
    pub border: BorderStyle,
    /// Style used by progress bars.
    pub progress: ProgressStyle,
}

impl Theme {
    /// Names of every built-in theme.
    pub fn builtin_names() -> &'static [&'static str] {
        &BUILTIN_NAMES
    }

    /// Look up a built-in theme by name.
    pub fn named(name: &str) -> Option<Self> {
        let theme = match name {
            "default" => Self::default(),
            "mono" => Self {
                name: "mono",
                accent: Color::White,
                text: Color::Reset,
                muted: Color::Grey,
                success: Color::White,
                warning: Color::White,
                error: Color::White,
                border: BorderStyle::Single,
                progress: ProgressStyle::Bar,
            },
            "ocean" => Self {
                name: "ocean",
                accent: Color::Rgb { r: 64, g: 164, b: 223 },
                text: Color::Rgb { r: 220, g: 232, b: 240 },
                muted: Color::Rgb { r: 110, g: 140, b: 160 },
                success: Color::Rgb { r: 80, g: 200, b: 170 },
                warning: Color::Rgb { r: 240, g: 200, b: 90 },
                error: Color::Rgb { r: 240, g: 100, b: 100 },
                border: BorderStyle::Rounded,
                progress: ProgressStyle::Smooth,
            },
            "amber" => Self {
                name: "amber",
                accent: Color::Rgb { r: 255, g: 176, b: 0 },
                text: Color::Rgb { r: 255, g: 204, b: 102 },
                muted: Color::Rgb { r: 170, g: 120, b: 20 },
                success: Color::Rgb { r: 255, g: 204, b: 102 },
                warning: Color::Rgb { r: 255, g: 140, b: 0 },
                error: Color::Rgb { r: 255, g: 80, b: 40 },
                border: BorderStyle::Thick,
                progress: ProgressStyle::Dots,
            },
            _ => return None,
        };
        Some(theme)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "default",
            accent: Color::Cyan,
            text: Color::Reset,
            muted: Color::DarkGrey,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            border: BorderStyle::Double,
            progress: ProgressStyle::Block,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_resolves_to_itself() {
        for name in Theme::builtin_names() {
            let theme = Theme::named(name).unwrap();
            assert_eq!(theme.name, *name);
        }
    }

    #[test]
    fn unknown_theme() {
        assert!(Theme::named("solarized").is_none());
    }

    #[test]
    fn default_matches_named_default() {
        assert_eq!(Theme::named("default"), Some(Theme::default()));
    }
}
