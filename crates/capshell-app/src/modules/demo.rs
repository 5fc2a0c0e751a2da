//! `demo`: small commands that exercise flags, async handlers and failure.

use std::time::Duration;

use capshell_registry::{Category, CommandOutput, CommandSpec, FlagSpec, SimpleModule, handler_fn};
use capshell_term::{ProgressBar, ProgressStyle};
use capshell_types::error::{CapshellError, Result};
use capshell_types::flags::Flags;

const BAR_WIDTH: usize = 24;
const MAX_WAIT_MS: u64 = 60_000;

pub fn module() -> SimpleModule {
    let echo = CommandSpec::new("echo", "Print the arguments back")
        .usage("demo echo <text>... [--loud]")
        .category("text")
        .alias("say")
        .example("demo echo hello world")
        .example("demo say hi --loud")
        .flag(FlagSpec::switch("loud", "Upper-case the output"))
        .handler(handler_fn(|flags| async move { echo_text(&flags) }));

    let progress = CommandSpec::new("progress", "Draw progress bars")
        .usage("demo progress [--value <0-100>] [--style block|smooth|dots|bar]")
        .category("text")
        .example("demo progress --value 40 --style smooth")
        .flag(FlagSpec::text("value", "Percent complete"))
        .flag(FlagSpec::text("style", "Bar style"))
        .handler(handler_fn(|flags| async move { render_progress(&flags) }));

    let wait = CommandSpec::new("wait", "Sleep, then report how long it took")
        .usage("demo wait [--ms <n>]")
        .category("async")
        .example("demo wait --ms 3000")
        .flag(FlagSpec::text("ms", "Milliseconds to sleep (default 1000)"))
        .handler(handler_fn(|flags| async move {
            let ms = parse_number(&flags, "ms", 1000)?;
            if ms > MAX_WAIT_MS {
                return Err(CapshellError::handler(format!(
                    "--ms is capped at {MAX_WAIT_MS}"
                )));
            }
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(CommandOutput::text(format!("waited {ms} ms")))
        }));

    let fail = CommandSpec::new("fail", "Always fail")
        .usage("demo fail [--message <text>]")
        .category("async")
        .flag(FlagSpec::text("message", "Error to report"))
        .handler(handler_fn(|flags| async move {
            let message = flags.text("message").unwrap_or("demo failure requested");
            Err(CapshellError::handler(message))
        }));

    SimpleModule::new("demo", "Demonstration commands", env!("CARGO_PKG_VERSION"))
        .with_command(echo)
        .with_command(progress)
        .with_command(wait)
        .with_command(fail)
        .with_category(Category::new("text", 2))
        .with_category(Category::new("async", 2))
}

fn echo_text(flags: &Flags) -> Result<CommandOutput> {
    let text = flags.positional().join(" ");
    if flags.switch("loud") {
        return Ok(CommandOutput::Text(text.to_uppercase()));
    }
    Ok(CommandOutput::Text(text))
}

fn render_progress(flags: &Flags) -> Result<CommandOutput> {
    let style = match flags.text("style") {
        Some(name) => ProgressStyle::from_name(name)
            .ok_or_else(|| CapshellError::handler(format!("unknown style: {name}")))?,
        None => ProgressStyle::default(),
    };
    let values: Vec<u64> = if flags.contains("value") {
        vec![parse_number(flags, "value", 0)?.min(100)]
    } else {
        vec![0, 25, 50, 75, 100]
    };
    let lines: Vec<String> = values
        .into_iter()
        .map(|pct| {
            ProgressBar::new(pct as f32 / 100.0, BAR_WIDTH)
                .style(style)
                .with_label()
                .render()
        })
        .collect();
    Ok(CommandOutput::Text(lines.join("\n")))
}

fn parse_number(flags: &Flags, name: &str, default: u64) -> Result<u64> {
    match flags.text(name) {
        Some(raw) => raw
            .parse()
            .map_err(|_| CapshellError::handler(format!("--{name} expects a number, got '{raw}'"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capshell_registry::CapabilityModule;

    use crate::modules::build_registry;
    use crate::modules::tests::run;

    #[test]
    fn declares_every_category_it_uses() {
        let m = module();
        for cmd in m.commands() {
            assert!(m.categories().iter().any(|c| c.name == cmd.category));
        }
    }

    #[tokio::test]
    async fn echo_and_alias() {
        let registry = build_registry().unwrap();
        let out = run(&registry, "demo say hello there --loud").await.unwrap();
        assert_eq!(out, CommandOutput::text("HELLO THERE"));
    }

    #[tokio::test]
    async fn loud_before_text_keeps_word_order() {
        let registry = build_registry().unwrap();
        let out = run(&registry, "demo echo --loud hello world").await.unwrap();
        assert_eq!(out, CommandOutput::text("HELLO WORLD"));
    }

    #[tokio::test]
    async fn progress_single_value() {
        let registry = build_registry().unwrap();
        let out = run(&registry, "demo progress --value 50").await.unwrap();
        let lines = out.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("50%"));
    }

    #[tokio::test]
    async fn progress_rejects_unknown_style() {
        let registry = build_registry().unwrap();
        let err = run(&registry, "demo progress --style neon").await.unwrap_err();
        assert_eq!(err.to_string(), "unknown style: neon");
    }

    #[tokio::test]
    async fn wait_sleeps() {
        let registry = build_registry().unwrap();
        let out = run(&registry, "demo wait --ms 5").await.unwrap();
        assert_eq!(out, CommandOutput::text("waited 5 ms"));
    }

    #[tokio::test]
    async fn wait_rejects_garbage() {
        let registry = build_registry().unwrap();
        let err = run(&registry, "demo wait --ms soon").await.unwrap_err();
        assert!(err.to_string().contains("expects a number"));
    }

    #[tokio::test]
    async fn fail_reports_message() {
        let registry = build_registry().unwrap();
        let err = run(&registry, "demo fail --message nope").await.unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }
}
