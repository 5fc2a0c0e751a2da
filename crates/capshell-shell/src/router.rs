//! Line routing: built-ins first, then modules.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use capshell_registry::{CapabilityModule, CommandHandler, ModuleRegistry};
use capshell_types::flags::Flags;

use crate::builtins::{self, BuiltinFn};
use crate::parse::parse_line;

const HELP_HINT: &str = "run 'help' to see available commands";

/// Where a typed line goes.
pub enum Route {
    /// Blank line.
    Empty,
    /// A built-in with its arguments.
    Builtin {
        name: &'static str,
        run: BuiltinFn,
        args: Flags,
    },
    /// A module command with flags already bound to its schema.
    Module {
        /// `module command`, for display.
        label: String,
        handler: Rc<dyn CommandHandler>,
        flags: Flags,
    },
    /// A module name on its own: list its commands.
    ModuleHelp(String),
    /// Nothing to run. Shown inline with the hint.
    Error { message: String, hint: String },
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Builtin { name, args, .. } => f
                .debug_struct("Builtin")
                .field("name", name)
                .field("args", args)
                .finish_non_exhaustive(),
            Self::Module { label, flags, .. } => f
                .debug_struct("Module")
                .field("label", label)
                .field("flags", flags)
                .finish_non_exhaustive(),
            Self::ModuleHelp(name) => f.debug_tuple("ModuleHelp").field(name).finish(),
            Self::Error { message, hint } => f
                .debug_struct("Error")
                .field("message", message)
                .field("hint", hint)
                .finish(),
        }
    }
}

/// Resolves lines to [`Route`]s. Holds no terminal state.
pub struct CommandRouter {
    builtins: BTreeMap<&'static str, BuiltinFn>,
}

impl CommandRouter {
    pub fn new() -> Self {
        Self {
            builtins: builtins::table(),
        }
    }

    /// Built-in names, sorted.
    pub fn builtin_names(&self) -> Vec<&'static str> {
        self.builtins.keys().copied().collect()
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtins.contains_key(name)
    }

    /// Resolve a line against the built-in table and `registry`.
    pub fn route(&self, line: &str, registry: &ModuleRegistry) -> Route {
        let Some(parsed) = parse_line(line) else {
            return Route::Empty;
        };

        if let Some((&name, &run)) = self.builtins.get_key_value(parsed.command.as_str()) {
            return Route::Builtin {
                name,
                run,
                args: parsed.flags,
            };
        }

        let module_name = parsed.command;
        if registry.get(&module_name).is_none() {
            return Route::Error {
                message: format!("unknown command: {module_name}"),
                hint: HELP_HINT.to_string(),
            };
        }
        let module = match registry.resolve(&module_name) {
            Ok(module) => module,
            Err(e) => {
                return Route::Error {
                    message: e.to_string(),
                    hint: "run 'status' to see why".to_string(),
                };
            },
        };

        let mut flags = parsed.flags;
        let Some(command_name) = flags.positional().first().cloned() else {
            return Route::ModuleHelp(module_name);
        };
        let Some(spec) = module.command(&command_name) else {
            return Route::Error {
                message: format!("unknown command '{command_name}' for module '{module_name}'"),
                hint: format!("run 'help {module_name}' to see its commands"),
            };
        };

        flags.shift_positional(1);
        let label = format!("{module_name} {}", spec.name);
        let flags = match spec.bind(flags) {
            Ok(flags) => flags,
            Err(e) => {
                return Route::Error {
                    message: e.to_string(),
                    hint: format!("run 'help {label}' for usage"),
                };
            },
        };
        match &spec.handler {
            Some(handler) => Route::Module {
                label,
                handler: Rc::clone(handler),
                flags,
            },
            None => Route::Error {
                message: format!("'{label}' has no handler"),
                hint: HELP_HINT.to_string(),
            },
        }
    }
}

impl Default for CommandRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capshell_registry::{Category, CommandOutput, CommandSpec, FlagSpec, SimpleModule, UnknownFlags, handler_fn};
    use capshell_types::error::{CapshellError, Result};
    use capshell_types::flags::FlagValue;

    /// Registers fine, then fails every health check.
    struct Sick {
        commands: Vec<CommandSpec>,
        categories: Vec<Category>,
    }

    impl Sick {
        fn new() -> Self {
            Self {
                commands: vec![
                    CommandSpec::new("ping", "Ping")
                        .usage("sick ping")
                        .handler(handler_fn(|_| async { Ok(CommandOutput::None) })),
                ],
                categories: vec![Category::new("general", 1)],
            }
        }
    }

    #[async_trait::async_trait(?Send)]
    impl CapabilityModule for Sick {
        fn name(&self) -> &str {
            "sick"
        }
        fn description(&self) -> &str {
            "always unhealthy"
        }
        fn version(&self) -> &str {
            "0.1"
        }
        fn commands(&self) -> &[CommandSpec] {
            &self.commands
        }
        fn categories(&self) -> &[Category] {
            &self.categories
        }
        async fn validate(&self) -> Result<()> {
            Err(CapshellError::handler("upstream unreachable"))
        }
    }

    fn registry() -> ModuleRegistry {
        let mut reg = ModuleRegistry::new();
        let echo = CommandSpec::new("echo", "Echo")
            .usage("demo echo <text>")
            .alias("say")
            .flag(FlagSpec::switch("loud", "Shout"))
            .flag(FlagSpec::text("name", "Who"))
            .handler(handler_fn(|flags| async move {
                Ok(CommandOutput::Text(flags.positional().join(" ")))
            }));
        let loose = CommandSpec::new("loose", "Takes anything")
            .usage("demo loose")
            .unknown_flags(UnknownFlags::Ignore)
            .handler(handler_fn(|_| async { Ok(CommandOutput::None) }));
        reg.add(
            SimpleModule::new("demo", "Demo", "1.0")
                .with_command(echo)
                .with_command(loose)
                .with_category(Category::new("general", 2)),
        )
        .unwrap();
        reg
    }

    fn route(line: &str) -> Route {
        CommandRouter::new().route(line, &registry())
    }

    #[test]
    fn blank_line_is_empty() {
        assert!(matches!(route("   "), Route::Empty));
    }

    #[test]
    fn builtins_match_first() {
        match route("theme set ocean") {
            Route::Builtin { name, args, .. } => {
                assert_eq!(name, "theme");
                assert_eq!(args.positional(), ["set", "ocean"]);
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn module_command_with_bound_flags() {
        match route("demo echo hello --loud --name Ada") {
            Route::Module { label, flags, .. } => {
                assert_eq!(label, "demo echo");
                assert_eq!(flags.positional(), ["hello"]);
                assert_eq!(flags.get("loud"), Some(&FlagValue::Switch(true)));
                assert_eq!(flags.text("name"), Some("Ada"));
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn alias_resolves_to_command() {
        assert!(matches!(route("demo say hi"), Route::Module { ref label, .. } if label == "demo echo"));
    }

    #[tokio::test]
    async fn routed_handler_runs() {
        let Route::Module { handler, flags, .. } = route("demo echo a b") else {
            panic!("expected module route");
        };
        let out: Result<CommandOutput> = handler.run(&flags).await;
        assert_eq!(out.unwrap(), CommandOutput::text("a b"));
    }

    #[test]
    fn module_alone_lists_commands() {
        assert!(matches!(route("demo"), Route::ModuleHelp(ref m) if m == "demo"));
    }

    #[test]
    fn unknown_module() {
        match route("nosuch thing") {
            Route::Error { message, hint } => {
                assert_eq!(message, "unknown command: nosuch");
                assert!(hint.contains("help"));
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_command_in_module() {
        match route("demo dance") {
            Route::Error { message, hint } => {
                assert!(message.contains("'dance'"));
                assert!(hint.contains("help demo"));
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn undeclared_flag_rejected() {
        match route("demo echo --color red") {
            Route::Error { message, .. } => assert!(message.contains("unknown flag --color")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn undeclared_flag_ignored_by_policy() {
        match route("demo loose --anything 1") {
            Route::Module { flags, .. } => assert!(flags.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn text_flag_without_value() {
        match route("demo echo --name") {
            Route::Error { message, .. } => assert!(message.contains("--name requires a value")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn inactive_module_is_an_error() {
        let mut reg = registry();
        reg.add(Sick::new()).unwrap();
        assert!(matches!(CommandRouter::new().route("sick ping", &reg), Route::Module { .. }));

        reg.health_check().await;
        match CommandRouter::new().route("sick ping", &reg) {
            Route::Error { message, hint } => {
                assert!(message.contains("sick (inactive)"));
                assert!(hint.contains("status"));
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn builtin_names_sorted() {
        let names = CommandRouter::new().builtin_names();
        assert_eq!(names.first(), Some(&"clear"));
        assert!(names.contains(&"quit"));
    }
}
