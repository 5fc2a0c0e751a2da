//! The interactive capshell session.
//!
//! [`CommandRouter`] turns a typed line into something to run: a built-in,
//! a module command with bound flags, a module listing, or an inline error.
//! [`ShellSession`] is the WELCOME/PROMPT/EXECUTING/TERMINATED state machine
//! that owns the terminal surface, and [`run_session`] drives it from an
//! input channel on a single-threaded runtime.

pub mod builtins;
pub mod completion;
pub mod driver;
pub mod history;
pub mod interrupt;
pub mod layout;
pub mod parse;
pub mod router;
pub mod session;

pub use builtins::{BuiltinContext, BuiltinOutcome};
pub use driver::run_session;
pub use router::{CommandRouter, Route};
pub use session::{ExitKind, Mode, PendingCommand, ShellSession, Step};
