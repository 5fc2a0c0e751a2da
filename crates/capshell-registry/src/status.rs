//! Per-module status records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::module::CapabilityModule;

/// Whether a module can currently be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleState {
    Active,
    Error,
}

impl ModuleState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Error => "error",
        }
    }
}

/// Outcome of the latest registration, validation or initialization of a
/// module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusRecord {
    pub module: String,
    pub status: ModuleState,
    pub version: String,
    pub last_check: DateTime<Utc>,
    pub command_count: usize,
    pub category_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusRecord {
    pub(crate) fn active(name: &str, module: &dyn CapabilityModule) -> Self {
        Self {
            module: name.to_string(),
            status: ModuleState::Active,
            version: module.version().to_string(),
            last_check: Utc::now(),
            command_count: module.commands().len(),
            category_count: module.categories().len(),
            error: None,
        }
    }

    pub(crate) fn failed(name: &str, module: &dyn CapabilityModule, error: String) -> Self {
        Self {
            status: ModuleState::Error,
            error: Some(error),
            ..Self::active(name, module)
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ModuleState::Active
    }

    /// Short row for status tables: name, state, version, counts, error.
    pub fn row(&self) -> Vec<String> {
        vec![
            self.module.clone(),
            self.status.as_str().to_string(),
            self.version.clone(),
            self.command_count.to_string(),
            self.last_check.format("%H:%M:%S").to_string(),
            self.error.clone().unwrap_or_default(),
        ]
    }

    /// Headers matching [`StatusRecord::row`].
    pub fn headers() -> Vec<String> {
        ["MODULE", "STATUS", "VERSION", "COMMANDS", "CHECKED", "ERROR"]
            .iter()
            .map(|h| h.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{Category, CommandSpec, SimpleModule};

    fn module() -> SimpleModule {
        SimpleModule::new("notes", "Notes", "2.1.0")
            .with_command(CommandSpec::new("add", "Add a note"))
            .with_command(CommandSpec::new("list", "List notes"))
            .with_category(Category::new("general", 2))
    }

    #[test]
    fn active_record_counts() {
        let rec = StatusRecord::active("notes", &module());
        assert!(rec.is_active());
        assert_eq!(rec.version, "2.1.0");
        assert_eq!(rec.command_count, 2);
        assert_eq!(rec.category_count, 1);
        assert!(rec.error.is_none());
    }

    #[test]
    fn failed_record_keeps_metadata() {
        let rec = StatusRecord::failed("notes", &module(), "boom".into());
        assert!(!rec.is_active());
        assert_eq!(rec.error.as_deref(), Some("boom"));
        assert_eq!(rec.command_count, 2);
    }

    #[test]
    fn row_matches_headers() {
        let rec = StatusRecord::active("notes", &module());
        assert_eq!(rec.row().len(), StatusRecord::headers().len());
        assert_eq!(rec.row()[1], "active");
    }

    #[test]
    fn serializes_lowercase_state() {
        let rec = StatusRecord::failed("notes", &module(), "x".into());
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "x");
    }
}
