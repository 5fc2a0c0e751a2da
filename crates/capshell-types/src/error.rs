//! Error types for capshell.

use std::fmt;
use std::io;

/// Machine-readable reason a module was rejected at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationCode {
    /// Name, description or version is empty.
    MissingMetadata,
    /// The module declares no commands.
    NoCommands,
    /// A command was declared without a handler.
    MissingHandler,
    /// Two commands (or aliases) share a name.
    DuplicateCommand,
    /// A command references a category the module does not declare.
    UnknownCategory,
}

impl RegistrationCode {
    /// Stable upper-case identifier, e.g. `DUPLICATE_COMMAND`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingMetadata => "MISSING_METADATA",
            Self::NoCommands => "NO_COMMANDS",
            Self::MissingHandler => "MISSING_HANDLER",
            Self::DuplicateCommand => "DUPLICATE_COMMAND",
            Self::UnknownCategory => "UNKNOWN_CATEGORY",
        }
    }
}

impl fmt::Display for RegistrationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Details of a rejected module registration.
#[derive(Debug, Clone)]
pub struct RegistrationFailure {
    /// Name the module was registered under.
    pub module: String,
    /// Code of the first validation error.
    pub code: RegistrationCode,
    /// Every validation error found.
    pub errors: Vec<String>,
    /// Non-fatal findings collected alongside the errors.
    pub warnings: Vec<String>,
}

impl RegistrationFailure {
    /// One-line summary of all errors, used for the module's status record.
    pub fn summary(&self) -> String {
        self.errors.join("; ")
    }
}

impl fmt::Display for RegistrationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "module '{}' rejected ({}): {}",
            self.module,
            self.code,
            self.summary()
        )
    }
}

/// Errors produced by capshell.
#[derive(Debug, thiserror::Error)]
pub enum CapshellError {
    #[error("{0}")]
    Registration(Box<RegistrationFailure>),

    #[error("module not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Handler(String),

    #[error("flag error: {0}")]
    Flag(String),

    #[error("initialization failed for {}", format_failures(.0))]
    Initialization(Vec<(String, String)>),

    #[error("config error: {0}")]
    Config(String),

    #[error("terminal I/O error: {0}")]
    TerminalIo(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CapshellError {
    /// Shorthand for a handler failure with a plain message.
    pub fn handler(msg: impl Into<String>) -> Self {
        Self::Handler(msg.into())
    }

    /// Names of the modules that failed, for aggregate initialization errors.
    pub fn failed_modules(&self) -> Vec<&str> {
        match self {
            Self::Initialization(failures) => failures.iter().map(|(m, _)| m.as_str()).collect(),
            Self::Registration(failure) => vec![failure.module.as_str()],
            _ => Vec::new(),
        }
    }
}

fn format_failures(failures: &[(String, String)]) -> String {
    failures
        .iter()
        .map(|(module, detail)| format!("{module} ({detail})"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, CapshellError>;
