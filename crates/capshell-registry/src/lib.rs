//! Capability modules and the module registry.
//!
//! A capability module is a named, versioned bundle of commands. Modules are
//! validated when they are registered; the registry keeps one status record
//! per module and runs the optional `initialize`/`validate` hooks of all
//! modules side by side.

mod module;
mod output;
mod registry;
mod status;

/// Category label with its declared command count.
pub use module::Category;
/// The capability module contract.
pub use module::CapabilityModule;
/// Async handler behind a command.
pub use module::CommandHandler;
/// Declared command: metadata, flag schema and handler.
pub use module::CommandSpec;
/// Flag type in a command's schema.
pub use module::FlagKind;
/// One declared flag.
pub use module::FlagSpec;
/// Declarative module built from parts.
pub use module::SimpleModule;
/// Policy for flags missing from a command's schema.
pub use module::UnknownFlags;
/// Wrap an async closure as a handler.
pub use module::handler_fn;
/// Output produced by a command.
pub use output::CommandOutput;
/// Registry of capability modules.
pub use registry::ModuleRegistry;
/// Per-module outcome of the latest lifecycle operation.
pub use status::{ModuleState, StatusRecord};
