//! Line parsing.
//!
//! Tokens are split on whitespace. The first token names the command; each
//! `--name` token is a flag that takes the next token as its value unless
//! that token is itself a flag. Everything else is positional.

use capshell_types::flags::{FlagValue, Flags};

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// First token.
    pub command: String,
    /// Flags and remaining positional tokens.
    pub flags: Flags,
}

/// Parse a line. Returns `None` for a blank line.
pub fn parse_line(line: &str) -> Option<ParsedLine> {
    let mut tokens = line.split_whitespace().peekable();
    let command = tokens.next()?.to_string();
    let mut flags = Flags::new();

    while let Some(token) = tokens.next() {
        let Some(name) = flag_name(token) else {
            flags.push_positional(token);
            continue;
        };

        if let Some((name, value)) = name.split_once('=') {
            if name.is_empty() {
                flags.push_positional(token);
            } else {
                flags.insert(name, FlagValue::Text(value.to_string()));
            }
            continue;
        }

        match tokens.next_if(|next| flag_name(next).is_none() && *next != "--") {
            Some(value) => flags.insert(name, FlagValue::Text(value.to_string())),
            None => flags.insert(name, FlagValue::Switch(true)),
        }
    }

    Some(ParsedLine { command, flags })
}

/// `--name` -> `name`. A bare `--` is not a flag.
fn flag_name(token: &str) -> Option<&str> {
    token.strip_prefix("--").filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parse(line: &str) -> ParsedLine {
        parse_line(line).unwrap()
    }

    #[test]
    fn blank_lines() {
        assert!(parse_line("").is_none());
        assert!(parse_line("   \t ").is_none());
    }

    #[test]
    fn command_and_positionals() {
        let p = parse("demo  echo   hello world");
        assert_eq!(p.command, "demo");
        assert_eq!(p.flags.positional(), ["echo", "hello", "world"]);
        assert!(p.flags.is_empty());
    }

    #[test]
    fn adjacent_flags_are_switches() {
        let p = parse("cmd --a --b");
        assert_eq!(p.flags.get("a"), Some(&FlagValue::Switch(true)));
        assert_eq!(p.flags.get("b"), Some(&FlagValue::Switch(true)));
        assert_eq!(p.flags.len(), 2);
    }

    #[test]
    fn flag_takes_following_value() {
        let p = parse("cmd --name value");
        assert_eq!(p.flags.text("name"), Some("value"));
        assert!(p.flags.positional().is_empty());
    }

    #[test]
    fn trailing_flag_is_switch() {
        let p = parse("cmd run --verbose");
        assert!(p.flags.switch("verbose"));
        assert_eq!(p.flags.positional(), ["run"]);
    }

    #[test]
    fn inline_value() {
        let p = parse("cmd --city=Oslo --empty=");
        assert_eq!(p.flags.text("city"), Some("Oslo"));
        assert_eq!(p.flags.text("empty"), Some(""));
    }

    #[test]
    fn bare_double_dash_is_positional() {
        let p = parse("cmd --x -- y");
        assert!(p.flags.switch("x"));
        assert_eq!(p.flags.positional(), ["--", "y"]);
    }

    #[test]
    fn single_dash_is_positional() {
        let p = parse("cmd -v --n -3");
        assert_eq!(p.flags.positional(), ["-v"]);
        assert_eq!(p.flags.text("n"), Some("-3"));
    }

    #[test]
    fn last_value_wins() {
        let p = parse("cmd --n 1 --n 2");
        assert_eq!(p.flags.text("n"), Some("2"));
    }

    proptest! {
        #[test]
        fn flag_values_never_start_with_double_dash(
            tokens in proptest::collection::vec("(--)?[a-z]{1,4}", 0..8)
        ) {
            let line = format!("cmd {}", tokens.join(" "));
            let p = parse(&line);
            for (_, value) in p.flags.iter() {
                if let FlagValue::Text(text) = value {
                    prop_assert!(!text.starts_with("--"));
                }
            }
        }
    }
}
