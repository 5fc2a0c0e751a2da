//! The capability module contract.
//!
//! A module exposes metadata, a list of [`CommandSpec`]s, its categories, and
//! two optional lifecycle hooks. Handlers are `!Send`: everything runs on one
//! cooperative thread.

use std::fmt;
use std::future::Future;
use std::rc::Rc;

use async_trait::async_trait;
use capshell_types::error::{CapshellError, Result};
use capshell_types::flags::{FlagValue, Flags};

use crate::output::CommandOutput;

/// The async function behind a command.
#[async_trait(?Send)]
pub trait CommandHandler {
    /// Run the command with its bound flags.
    async fn run(&self, flags: &Flags) -> Result<CommandOutput>;
}

struct FnHandler<F>(F);

#[async_trait(?Send)]
impl<F, Fut> CommandHandler for FnHandler<F>
where
    F: Fn(Flags) -> Fut + 'static,
    Fut: Future<Output = Result<CommandOutput>> + 'static,
{
    async fn run(&self, flags: &Flags) -> Result<CommandOutput> {
        (self.0)(flags.clone()).await
    }
}

/// Wrap an async closure taking owned flags as a handler.
pub fn handler_fn<F, Fut>(f: F) -> Rc<dyn CommandHandler>
where
    F: Fn(Flags) -> Fut + 'static,
    Fut: Future<Output = Result<CommandOutput>> + 'static,
{
    Rc::new(FnHandler(f))
}

/// Type of a declared flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    /// Takes a value: `--city Oslo`.
    Text,
    /// Takes no value: `--metric`.
    Switch,
}

/// One flag in a command's schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    pub name: String,
    pub kind: FlagKind,
    pub description: String,
    pub required: bool,
}

impl FlagSpec {
    /// A flag that takes a value.
    pub fn text(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FlagKind::Text,
            description: description.to_string(),
            required: false,
        }
    }

    /// A boolean switch.
    pub fn switch(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FlagKind::Switch,
            description: description.to_string(),
            required: false,
        }
    }

    /// Mark the flag as mandatory.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// What to do with flags a command does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownFlags {
    /// Fail the invocation with a flag error.
    #[default]
    Reject,
    /// Drop them before the handler sees the map.
    Ignore,
}

/// A command declared by a module.
#[derive(Clone)]
pub struct CommandSpec {
    pub name: String,
    pub description: String,
    pub usage: String,
    pub category: String,
    pub handler: Option<Rc<dyn CommandHandler>>,
    pub examples: Vec<String>,
    pub aliases: Vec<String>,
    pub flags: Vec<FlagSpec>,
    pub unknown_flags: UnknownFlags,
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("has_handler", &self.handler.is_some())
            .field("aliases", &self.aliases)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

impl CommandSpec {
    /// A command in the `general` category with no handler yet.
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            usage: String::new(),
            category: "general".to_string(),
            handler: None,
            examples: Vec::new(),
            aliases: Vec::new(),
            flags: Vec::new(),
            unknown_flags: UnknownFlags::default(),
        }
    }

    /// One-line usage shown by `help`.
    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    /// Category label; defaults to `general`.
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    /// Handler that runs the command. Without one, routing reports that the
    /// command has no handler.
    pub fn handler(mut self, handler: Rc<dyn CommandHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Append an example invocation.
    pub fn example(mut self, example: &str) -> Self {
        self.examples.push(example.to_string());
        self
    }

    /// Append another name the command answers to.
    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Declare a flag for [`CommandSpec::bind`].
    pub fn flag(mut self, flag: FlagSpec) -> Self {
        self.flags.push(flag);
        self
    }

    /// What `bind` does with undeclared flags.
    pub fn unknown_flags(mut self, policy: UnknownFlags) -> Self {
        self.unknown_flags = policy;
        self
    }

    /// Whether `name` is this command's name or one of its aliases.
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }

    /// Check a parsed flag map against the declared schema.
    ///
    /// A switch that was handed a non-boolean value (`--loud hello`) keeps
    /// the switch on and returns the value to the positional list, at the
    /// spot it was typed.
    pub fn bind(&self, raw: Flags) -> Result<Flags> {
        let mut bound = Flags::new();
        let mut positional = raw.positional().to_vec();
        let mut returned = 0;

        for (name, value, slot) in raw.typed() {
            let Some(spec) = self.flags.iter().find(|f| f.name == name) else {
                match self.unknown_flags {
                    UnknownFlags::Reject => {
                        return Err(CapshellError::Flag(format!(
                            "unknown flag --{name} for '{}'",
                            self.name
                        )));
                    },
                    UnknownFlags::Ignore => {
                        log::debug!("ignoring undeclared flag --{name} for '{}'", self.name);
                        continue;
                    },
                }
            };

            match (spec.kind, value) {
                (FlagKind::Text, FlagValue::Text(_)) => bound.insert(name, value.clone()),
                (FlagKind::Text, FlagValue::Switch(_)) => {
                    return Err(CapshellError::Flag(format!("--{name} requires a value")));
                },
                (FlagKind::Switch, FlagValue::Switch(b)) => {
                    bound.insert(name, FlagValue::Switch(*b));
                },
                (FlagKind::Switch, FlagValue::Text(text)) => match text.as_str() {
                    "true" | "yes" | "on" => bound.insert(name, FlagValue::Switch(true)),
                    "false" | "no" | "off" => bound.insert(name, FlagValue::Switch(false)),
                    other => {
                        bound.insert(name, FlagValue::Switch(true));
                        let at = (slot + returned).min(positional.len());
                        positional.insert(at, other.to_string());
                        returned += 1;
                    },
                },
            }
        }
        for arg in positional {
            bound.push_positional(arg);
        }

        if let Some(missing) = self
            .flags
            .iter()
            .find(|f| f.required && !bound.contains(&f.name))
        {
            return Err(CapshellError::Flag(format!(
                "missing required flag --{}",
                missing.name
            )));
        }

        Ok(bound)
    }
}

/// Category label with the number of commands the module says it contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub declared_commands: usize,
}

impl Category {
    pub fn new(name: &str, declared_commands: usize) -> Self {
        Self {
            name: name.to_string(),
            declared_commands,
        }
    }
}

/// A pluggable capability module.
#[async_trait(?Send)]
pub trait CapabilityModule {
    /// Unique module name (what the user types first).
    fn name(&self) -> &str;

    /// One-line description for `help`.
    fn description(&self) -> &str;

    /// Module version string.
    fn version(&self) -> &str;

    /// Declared commands, in display order.
    fn commands(&self) -> &[CommandSpec];

    /// Declared categories.
    fn categories(&self) -> &[Category];

    /// Optional UI component bound to this module.
    fn ui_component(&self) -> Option<&str> {
        None
    }

    /// One-time setup. The default does nothing.
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Health probe. The default reports healthy.
    async fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Find a command by name or alias.
    fn command(&self, name: &str) -> Option<&CommandSpec> {
        self.commands().iter().find(|c| c.matches(name))
    }
}

/// A module assembled from parts, without lifecycle hooks.
#[derive(Debug, Clone)]
pub struct SimpleModule {
    name: String,
    description: String,
    version: String,
    commands: Vec<CommandSpec>,
    categories: Vec<Category>,
    ui_component: Option<String>,
}

impl SimpleModule {
    pub fn new(name: &str, description: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            version: version.to_string(),
            commands: Vec::new(),
            categories: Vec::new(),
            ui_component: None,
        }
    }

    pub fn with_command(mut self, command: CommandSpec) -> Self {
        self.commands.push(command);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }

    pub fn with_ui_component(mut self, component: &str) -> Self {
        self.ui_component = Some(component.to_string());
        self
    }
}

#[async_trait(?Send)]
impl CapabilityModule for SimpleModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    fn categories(&self) -> &[Category] {
        &self.categories
    }

    fn ui_component(&self) -> Option<&str> {
        self.ui_component.as_deref()
    }
}
