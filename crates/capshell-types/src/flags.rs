//! Flag maps handed to command handlers.
//!
//! A [`Flags`] value carries the `--name value` / `--switch` pairs parsed from
//! an input line plus any positional arguments that followed the command name.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Value of a single flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FlagValue {
    /// `--name value` or `--name=value`.
    Text(String),
    /// `--name` with no value.
    Switch(bool),
}

impl FlagValue {
    /// The text value, if this is a text flag.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Switch(_) => None,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Switch(b) => write!(f, "{b}"),
        }
    }
}

/// Flags and positional arguments for one command invocation.
///
/// Besides the values, a flag map remembers the order flags were given in
/// and how many positionals preceded each one, so a value can later be put
/// back where it was typed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Flags {
    values: BTreeMap<String, FlagValue>,
    positional: Vec<String>,
    #[serde(skip)]
    order: Vec<(String, usize)>,
}

impl PartialEq for Flags {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values && self.positional == other.positional
    }
}

impl Eq for Flags {}

impl Flags {
    /// Create an empty flag map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a flag, replacing any earlier value (last one wins). The flag is
    /// anchored after the positionals pushed so far.
    pub fn insert(&mut self, name: impl Into<String>, value: FlagValue) {
        let name = name.into();
        self.order.retain(|(n, _)| *n != name);
        self.order.push((name.clone(), self.positional.len()));
        self.values.insert(name, value);
    }

    /// Append a positional argument.
    pub fn push_positional(&mut self, arg: impl Into<String>) {
        self.positional.push(arg.into());
    }

    /// Builder-style [`Flags::insert`] for a text value.
    pub fn with_text(mut self, name: &str, value: &str) -> Self {
        self.insert(name, FlagValue::Text(value.to_string()));
        self
    }

    /// Builder-style [`Flags::insert`] for a switch.
    pub fn with_switch(mut self, name: &str) -> Self {
        self.insert(name, FlagValue::Switch(true));
        self
    }

    /// Raw flag lookup.
    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.values.get(name)
    }

    /// Text value of a flag, `None` if absent or a switch.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(FlagValue::as_text)
    }

    /// Whether a switch is on. Text values `"true"`, `"yes"` and `"1"` count
    /// as on so that `--verbose true` behaves like `--verbose`.
    pub fn switch(&self, name: &str) -> bool {
        match self.values.get(name) {
            Some(FlagValue::Switch(b)) => *b,
            Some(FlagValue::Text(s)) => matches!(s.as_str(), "true" | "yes" | "1"),
            None => false,
        }
    }

    /// Whether a flag was given at all.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Remove a flag and return its value.
    pub fn remove(&mut self, name: &str) -> Option<FlagValue> {
        self.order.retain(|(n, _)| n != name);
        self.values.remove(name)
    }

    /// Positional arguments in order.
    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    /// Drop the first `n` positional arguments (used to strip the command name).
    pub fn shift_positional(&mut self, n: usize) {
        let n = n.min(self.positional.len());
        self.positional.drain(..n);
        for (_, slot) in &mut self.order {
            *slot = slot.saturating_sub(n);
        }
    }

    /// Iterate flags in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlagValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Flags in the order they were given, each with the number of
    /// positionals that came before it.
    pub fn typed(&self) -> impl Iterator<Item = (&str, &FlagValue, usize)> {
        self.order.iter().filter_map(|(name, slot)| {
            self.values
                .get(name)
                .map(|value| (name.as_str(), value, *slot))
        })
    }

    /// Flag names in name order.
    pub fn names(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }

    /// Number of flags (positionals excluded).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no flags were given (positionals excluded).
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
