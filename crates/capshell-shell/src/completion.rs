//! Tab completion.
//!
//! The first word completes against built-in and module names. The second
//! word completes against the commands of the module (or the actions of the
//! built-in) named by the first. Anything further completes to nothing.

use capshell_registry::{CapabilityModule, ModuleRegistry};

use crate::builtins;

/// Result of completing a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The line after completion.
    pub line: String,
    /// Every candidate that matched, sorted. Shown when there is more than one.
    pub candidates: Vec<String>,
}

/// Complete the last word of `line`.
///
/// One candidate replaces the word and adds a trailing space. Several
/// candidates extend the word to their longest common prefix.
pub fn complete(line: &str, builtin_names: &[&str], registry: &ModuleRegistry) -> Completion {
    let mut words: Vec<&str> = line.split_whitespace().collect();
    let fresh_word = line.ends_with(char::is_whitespace) && !words.is_empty();
    if fresh_word {
        words.push("");
    }

    let mut candidates: Vec<String> = match words.as_slice() {
        [prefix] => builtin_names
            .iter()
            .map(|s| s.to_string())
            .chain(registry.list())
            .filter(|name| name.starts_with(prefix))
            .collect(),
        [first, prefix] => second_words(first, registry)
            .into_iter()
            .filter(|name| name.starts_with(prefix))
            .collect(),
        _ => Vec::new(),
    };
    candidates.sort();
    candidates.dedup();

    let Some(prefix) = words.last() else {
        return Completion {
            line: line.to_string(),
            candidates,
        };
    };
    let head = &line[..line.len() - prefix.len()];

    let line = match candidates.as_slice() {
        [] => line.to_string(),
        [only] => format!("{head}{only} "),
        many => format!("{head}{}", common_prefix(many)),
    };
    Completion { line, candidates }
}

fn second_words(first: &str, registry: &ModuleRegistry) -> Vec<String> {
    if let Some(module) = registry.get(first) {
        return module.commands().iter().map(|c| c.name.clone()).collect();
    }
    builtins::sub_actions(first)
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn common_prefix(words: &[String]) -> String {
    let Some(first) = words.first() else {
        return String::new();
    };
    let mut len = first.len();
    for word in &words[1..] {
        len = first
            .char_indices()
            .zip(word.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map_or(0, |((i, a), _)| i + a.len_utf8())
            .min(len);
    }
    first[..len].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use capshell_registry::{Category, CommandOutput, CommandSpec, SimpleModule, handler_fn};

    const BUILTINS: &[&str] = &["clear", "config", "exit", "help", "quit", "status", "theme"];

    fn registry() -> ModuleRegistry {
        let mut reg = ModuleRegistry::new();
        let cmd = |name: &str| {
            CommandSpec::new(name, "test")
                .usage(name)
                .handler(handler_fn(|_| async { Ok(CommandOutput::None) }))
        };
        reg.add(
            SimpleModule::new("weather", "Weather", "1.0")
                .with_command(cmd("current"))
                .with_command(cmd("forecast"))
                .with_command(cmd("forecast-hourly"))
                .with_category(Category::new("general", 3)),
        )
        .unwrap();
        reg.add(
            SimpleModule::new("web", "Web", "1.0")
                .with_command(cmd("get"))
                .with_category(Category::new("general", 1)),
        )
        .unwrap();
        reg
    }

    fn run(line: &str) -> Completion {
        complete(line, BUILTINS, &registry())
    }

    #[test]
    fn single_candidate_replaces_word() {
        let c = run("sta");
        assert_eq!(c.line, "status ");
        assert_eq!(c.candidates, ["status"]);
    }

    #[test]
    fn several_candidates_extend_to_common_prefix() {
        let c = run("w");
        assert_eq!(c.candidates, ["weather", "web"]);
        assert_eq!(c.line, "we");
    }

    #[test]
    fn builtins_and_modules_share_first_word() {
        let c = run("c");
        assert_eq!(c.candidates, ["clear", "config"]);
        assert_eq!(c.line, "c");
    }

    #[test]
    fn second_word_completes_module_commands() {
        let c = run("weather fo");
        assert_eq!(c.candidates, ["forecast", "forecast-hourly"]);
        assert_eq!(c.line, "weather forecast");
    }

    #[test]
    fn trailing_space_starts_new_word() {
        let c = run("weather ");
        assert_eq!(c.candidates, ["current", "forecast", "forecast-hourly"]);
        assert_eq!(c.line, "weather ");
    }

    #[test]
    fn builtin_sub_actions() {
        assert_eq!(run("theme s").line, "theme set ");
        assert_eq!(run("config ").candidates, ["set", "show"]);
    }

    #[test]
    fn unknown_first_word_completes_nothing() {
        let c = run("nope x");
        assert!(c.candidates.is_empty());
        assert_eq!(c.line, "nope x");
    }

    #[test]
    fn third_word_completes_nothing() {
        let c = run("weather current now");
        assert!(c.candidates.is_empty());
        assert_eq!(run("weather current ").line, "weather current ");
    }

    #[test]
    fn empty_line() {
        let c = run("");
        assert!(c.candidates.is_empty());
        assert_eq!(c.line, "");
    }

    #[test]
    fn prefix_helper() {
        let words = ["forecast".to_string(), "forest".to_string()];
        assert_eq!(common_prefix(&words), "fore");
        assert_eq!(common_prefix(&["a".to_string(), "b".to_string()]), "");
    }
}
