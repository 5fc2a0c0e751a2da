//! Shell built-in commands.
//!
//! Built-ins run synchronously against the registry and the session's
//! config. They never touch the terminal; the session renders whatever they
//! return.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use capshell_registry::{CapabilityModule, CommandOutput, CommandSpec, FlagKind, ModuleRegistry, StatusRecord};
use capshell_term::Theme;
use capshell_types::config::ShellConfig;
use capshell_types::error::{CapshellError, Result};
use capshell_types::flags::Flags;

/// State a built-in may read or change.
pub struct BuiltinContext<'a> {
    pub registry: &'a ModuleRegistry,
    pub config: &'a mut ShellConfig,
    pub theme: &'a Theme,
}

/// What the session should do after a built-in ran.
#[derive(Debug, Clone, PartialEq)]
pub enum BuiltinOutcome {
    /// Render this output.
    Output(CommandOutput),
    /// Switch to this theme and redraw.
    SetTheme(Theme),
    /// Leave the session.
    Exit,
}

/// Signature shared by every built-in.
pub type BuiltinFn = fn(&mut BuiltinContext<'_>, &Flags) -> Result<BuiltinOutcome>;

struct Builtin {
    name: &'static str,
    usage: &'static str,
    description: &'static str,
    sub_actions: &'static [&'static str],
    run: BuiltinFn,
}

const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "help",
        usage: "help [<module> [<command>]]",
        description: "List commands, or describe a module or command",
        sub_actions: &[],
        run: help,
    },
    Builtin {
        name: "status",
        usage: "status",
        description: "Show the status of every registered module",
        sub_actions: &[],
        run: status,
    },
    Builtin {
        name: "clear",
        usage: "clear",
        description: "Clear the output area",
        sub_actions: &[],
        run: clear,
    },
    Builtin {
        name: "theme",
        usage: "theme [set <name>]",
        description: "List themes or switch to one",
        sub_actions: &["set"],
        run: theme,
    },
    Builtin {
        name: "config",
        usage: "config [show | set <key> <value>]",
        description: "Show or change settings for this session",
        sub_actions: &["set", "show"],
        run: config,
    },
    Builtin {
        name: "exit",
        usage: "exit",
        description: "Leave the shell",
        sub_actions: &[],
        run: exit,
    },
    Builtin {
        name: "quit",
        usage: "quit",
        description: "Leave the shell",
        sub_actions: &[],
        run: exit,
    },
];

fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.name == name)
}

/// Name to handler table used by the router.
pub fn table() -> BTreeMap<&'static str, BuiltinFn> {
    BUILTINS.iter().map(|b| (b.name, b.run)).collect()
}

/// Second-word actions a built-in accepts, for completion.
pub fn sub_actions(name: &str) -> &'static [&'static str] {
    lookup(name).map_or(&[], |b| b.sub_actions)
}

fn help(ctx: &mut BuiltinContext<'_>, args: &Flags) -> Result<BuiltinOutcome> {
    let text = match args.positional() {
        [] => overview(ctx.registry),
        [name] => match lookup(name) {
            Some(b) => format!("{} - {}\n  usage: {}", b.name, b.description, b.usage),
            None => module_detail(ctx.registry, name)?,
        },
        [module, command, ..] => command_detail(ctx.registry, module, command)?,
    };
    Ok(BuiltinOutcome::Output(CommandOutput::Text(text)))
}

fn overview(registry: &ModuleRegistry) -> String {
    let mut out = String::from("Built-in commands:\n");
    for b in BUILTINS {
        let _ = writeln!(out, "  {:<10} {}", b.name, b.description);
    }

    let modules = registry.list();
    if modules.is_empty() {
        out.push_str("\nNo modules registered.\n");
    } else {
        out.push_str("\nModules:\n");
        for name in &modules {
            let Some(module) = registry.get(name) else {
                continue;
            };
            let state = if registry.is_active(name) { "" } else { " (inactive)" };
            let _ = writeln!(
                out,
                "  {:<10} {:<8} {}{state}",
                name,
                format!("v{}", module.version()),
                module.description()
            );
        }
    }
    out.push_str("\nType 'help <module>' for a module's commands.");
    out
}

/// Commands of one module grouped by category. Also shown when a module
/// name is typed on its own.
pub fn module_detail(registry: &ModuleRegistry, name: &str) -> Result<String> {
    let module = registry
        .get(name)
        .ok_or_else(|| CapshellError::NotFound(name.to_string()))?;

    let mut out = format!("{name} v{} - {}", module.version(), module.description());
    if !registry.is_active(name) {
        out.push_str(" (inactive)");
    }
    out.push('\n');

    let mut groups: Vec<&str> = module.categories().iter().map(|c| c.name.as_str()).collect();
    for cmd in module.commands() {
        if !groups.contains(&cmd.category.as_str()) {
            groups.push(&cmd.category);
        }
    }

    for group in groups {
        let cmds: Vec<&CommandSpec> = module
            .commands()
            .iter()
            .filter(|c| c.category == group)
            .collect();
        if cmds.is_empty() {
            continue;
        }
        let _ = writeln!(out, "  [{group}]");
        for cmd in cmds {
            let _ = write!(out, "    {:<12} {}", cmd.name, cmd.description);
            if !cmd.aliases.is_empty() {
                let _ = write!(out, " (aliases: {})", cmd.aliases.join(", "));
            }
            out.push('\n');
        }
    }
    let _ = write!(out, "Type 'help {name} <command>' for details.");
    Ok(out)
}

fn command_detail(registry: &ModuleRegistry, module_name: &str, command: &str) -> Result<String> {
    let module = registry
        .get(module_name)
        .ok_or_else(|| CapshellError::NotFound(module_name.to_string()))?;
    let cmd = module
        .command(command)
        .ok_or_else(|| CapshellError::NotFound(format!("{module_name} {command}")))?;

    let mut out = format!("{module_name} {} - {}\n", cmd.name, cmd.description);
    let usage = if cmd.usage.is_empty() {
        format!("{module_name} {}", cmd.name)
    } else {
        cmd.usage.clone()
    };
    let _ = writeln!(out, "  usage: {usage}");
    let _ = writeln!(out, "  category: {}", cmd.category);
    if !cmd.aliases.is_empty() {
        let _ = writeln!(out, "  aliases: {}", cmd.aliases.join(", "));
    }
    if !cmd.flags.is_empty() {
        out.push_str("  flags:\n");
        for flag in &cmd.flags {
            let spelled = match flag.kind {
                FlagKind::Text => format!("--{} <value>", flag.name),
                FlagKind::Switch => format!("--{}", flag.name),
            };
            let required = if flag.required { " (required)" } else { "" };
            let _ = writeln!(out, "    {spelled:<18} {}{required}", flag.description);
        }
    }
    if !cmd.examples.is_empty() {
        out.push_str("  examples:\n");
        for example in &cmd.examples {
            let _ = writeln!(out, "    {example}");
        }
    }
    Ok(out.trim_end().to_string())
}

fn status(ctx: &mut BuiltinContext<'_>, _args: &Flags) -> Result<BuiltinOutcome> {
    let records = ctx.registry.get_all_statuses();
    if records.is_empty() {
        return Ok(BuiltinOutcome::Output(CommandOutput::text("No modules registered.")));
    }
    Ok(BuiltinOutcome::Output(CommandOutput::Table {
        headers: StatusRecord::headers(),
        rows: records.values().map(StatusRecord::row).collect(),
    }))
}

fn clear(_ctx: &mut BuiltinContext<'_>, _args: &Flags) -> Result<BuiltinOutcome> {
    Ok(BuiltinOutcome::Output(CommandOutput::Clear))
}

fn named_theme(name: &str) -> Result<Theme> {
    Theme::named(name).ok_or_else(|| {
        CapshellError::Config(format!(
            "unknown theme '{name}' (available: {})",
            Theme::builtin_names().join(", ")
        ))
    })
}

fn theme(ctx: &mut BuiltinContext<'_>, args: &Flags) -> Result<BuiltinOutcome> {
    match args.positional() {
        [] => {
            let mut out = String::from("Themes:");
            for name in Theme::builtin_names() {
                let marker = if *name == ctx.theme.name { '*' } else { ' ' };
                let _ = write!(out, "\n  {marker} {name}");
            }
            Ok(BuiltinOutcome::Output(CommandOutput::Text(out)))
        },
        [action, name] if action == "set" => {
            let theme = named_theme(name)?;
            ctx.config.theme = theme.name.to_string();
            Ok(BuiltinOutcome::SetTheme(theme))
        },
        _ => Err(CapshellError::handler("usage: theme [set <name>]")),
    }
}

fn config(ctx: &mut BuiltinContext<'_>, args: &Flags) -> Result<BuiltinOutcome> {
    match args.positional() {
        [] => show_config(ctx.config),
        [action] if action == "show" => show_config(ctx.config),
        [action, key, value @ ..] if action == "set" && !value.is_empty() => {
            let value = value.join(" ");
            if key == "theme" {
                let theme = named_theme(&value)?;
                ctx.config.set(key, theme.name)?;
                return Ok(BuiltinOutcome::SetTheme(theme));
            }
            ctx.config.set(key, &value)?;
            log::debug!("config {key} set to '{value}'");
            Ok(BuiltinOutcome::Output(CommandOutput::Text(format!("{key} = {value}"))))
        },
        _ => Err(CapshellError::handler("usage: config [show | set <key> <value>]")),
    }
}

fn show_config(config: &ShellConfig) -> Result<BuiltinOutcome> {
    Ok(BuiltinOutcome::Output(CommandOutput::Table {
        headers: vec!["KEY".to_string(), "VALUE".to_string()],
        rows: config
            .entries()
            .into_iter()
            .map(|(k, v)| vec![k, v])
            .collect(),
    }))
}

fn exit(_ctx: &mut BuiltinContext<'_>, _args: &Flags) -> Result<BuiltinOutcome> {
    Ok(BuiltinOutcome::Exit)
}
