//! `system`: facts about the running process and its modules.

use std::cell::OnceCell;
use std::fmt::Write as _;
use std::rc::Rc;

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};

use capshell_registry::{
    CapabilityModule, Category, CommandOutput, CommandSpec, FlagSpec, ModuleRegistry, handler_fn,
};
use capshell_types::error::{CapshellError, Result};

use super::RegistryHandle;

pub struct SystemModule {
    commands: Vec<CommandSpec>,
    categories: Vec<Category>,
    started: Rc<OnceCell<DateTime<Local>>>,
}

impl SystemModule {
    pub fn new(registry: RegistryHandle) -> Self {
        let started: Rc<OnceCell<DateTime<Local>>> = Rc::default();

        let info = {
            let started = Rc::clone(&started);
            CommandSpec::new("info", "Show version, platform and uptime")
                .usage("system info")
                .handler(handler_fn(move |_| {
                    let started = Rc::clone(&started);
                    async move { Ok(info(started.get())) }
                }))
        };

        let modules = CommandSpec::new("modules", "List registered modules and their state")
            .usage("system modules [--active]")
            .alias("ls")
            .flag(FlagSpec::switch("active", "Only show active modules"))
            .handler(handler_fn(move |flags| {
                let registry = Rc::clone(&registry);
                async move {
                    let registry = registry
                        .get()
                        .and_then(|weak| weak.upgrade())
                        .ok_or_else(|| CapshellError::handler("registry is gone"))?;
                    Ok(modules(&registry, flags.switch("active")))
                }
            }));

        let time = CommandSpec::new("time", "Show the current time")
            .usage("system time [--utc] [--format <strftime>]")
            .example("system time --utc")
            .example("system time --format %H:%M")
            .flag(FlagSpec::switch("utc", "Use UTC instead of local time"))
            .flag(FlagSpec::text("format", "strftime pattern"))
            .handler(handler_fn(|flags| async move {
                let pattern = flags.text("format").unwrap_or("%Y-%m-%d %H:%M:%S %Z");
                let text = if flags.switch("utc") {
                    format_time(&Utc::now(), pattern)?
                } else {
                    format_time(&Local::now(), pattern)?
                };
                Ok(CommandOutput::Text(text))
            }));

        Self {
            commands: vec![info, modules, time],
            categories: vec![Category::new("general", 3)],
            started,
        }
    }
}

#[async_trait(?Send)]
impl CapabilityModule for SystemModule {
    fn name(&self) -> &str {
        "system"
    }

    fn description(&self) -> &str {
        "Process and module information"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    fn categories(&self) -> &[Category] {
        &self.categories
    }

    async fn initialize(&self) -> Result<()> {
        if self.started.set(Local::now()).is_err() {
            log::debug!("system module initialized twice");
        }
        Ok(())
    }
}

fn info(started: Option<&DateTime<Local>>) -> CommandOutput {
    let uptime = match started {
        Some(at) => {
            let secs = (Local::now() - *at).num_seconds().max(0);
            format!("{}h {:02}m {:02}s", secs / 3600, secs / 60 % 60, secs % 60)
        },
        None => "not initialized".to_string(),
    };
    let rows = [
        ("version", env!("CARGO_PKG_VERSION").to_string()),
        ("os", std::env::consts::OS.to_string()),
        ("arch", std::env::consts::ARCH.to_string()),
        ("pid", std::process::id().to_string()),
        ("uptime", uptime),
    ];
    CommandOutput::Table {
        headers: vec!["KEY".to_string(), "VALUE".to_string()],
        rows: rows
            .into_iter()
            .map(|(k, v)| vec![k.to_string(), v])
            .collect(),
    }
}

fn modules(registry: &ModuleRegistry, active_only: bool) -> CommandOutput {
    let rows: Vec<Vec<String>> = registry
        .get_all()
        .into_iter()
        .filter(|(name, _)| !active_only || registry.is_active(name))
        .map(|(name, module)| {
            let state = if registry.is_active(&name) { "active" } else { "error" };
            vec![
                name,
                module.version().to_string(),
                state.to_string(),
                module.commands().len().to_string(),
                module.description().to_string(),
            ]
        })
        .collect();
    if rows.is_empty() {
        return CommandOutput::text("No modules match.");
    }
    CommandOutput::Table {
        headers: ["MODULE", "VERSION", "STATUS", "COMMANDS", "DESCRIPTION"]
            .iter()
            .map(|h| h.to_string())
            .collect(),
        rows,
    }
}

/// Format with a user pattern. Bad specifiers are an error, not a panic.
fn format_time<Tz>(at: &DateTime<Tz>, pattern: &str) -> Result<String>
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    write!(out, "{}", at.format(pattern))
        .map_err(|_| CapshellError::handler(format!("invalid time format: {pattern}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::modules::build_registry;
    use crate::modules::tests::run;

    #[test]
    fn time_formats() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        assert_eq!(format_time(&at, "%H:%M").unwrap(), "14:05");
        assert!(format_time(&at, "%Q").is_err());
    }

    #[tokio::test]
    async fn bad_pattern_is_a_handler_error() {
        let registry = build_registry().unwrap();
        let err = run(&registry, "system time --format %Q").await.unwrap_err();
        assert!(err.to_string().contains("invalid time format"));
    }

    #[tokio::test]
    async fn info_reports_uptime_after_initialize() {
        let registry = build_registry().unwrap();
        let before = run(&registry, "system info").await.unwrap().lines().join("\n");
        assert!(before.contains("not initialized"));

        registry.initialize_all().await.unwrap();
        let after = run(&registry, "system info").await.unwrap().lines().join("\n");
        assert!(after.contains("0h 00m"));
        assert!(after.contains(std::env::consts::OS));
    }

    #[tokio::test]
    async fn modules_alias_and_filter() {
        let registry = build_registry().unwrap();
        let out = run(&registry, "system ls --active").await.unwrap();
        assert_eq!(out.lines().len(), 2 + 2);
    }
}
