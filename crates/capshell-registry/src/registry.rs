//! Module registry: validation at registration, status tracking, and
//! side-by-side lifecycle hooks.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

use capshell_types::error::{CapshellError, RegistrationCode, RegistrationFailure, Result};
use futures_util::future::join_all;

use crate::module::CapabilityModule;
use crate::status::StatusRecord;

/// Registry of capability modules.
///
/// Modules and UI bindings change only through `register`/`unregister`.
/// Status records sit behind a `RefCell` so that health checks and
/// initialization can update them through a shared reference while other
/// parts of the program hold the registry.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, Rc<dyn CapabilityModule>>,
    ui_bindings: BTreeMap<String, String>,
    statuses: RefCell<BTreeMap<String, StatusRecord>>,
}

/// Findings of a structural check.
#[derive(Debug, Default)]
struct Report {
    errors: Vec<(RegistrationCode, String)>,
    warnings: Vec<String>,
}

impl Report {
    fn error(&mut self, code: RegistrationCode, msg: String) {
        self.errors.push((code, msg));
    }
}

fn check_module(name: &str, module: &dyn CapabilityModule) -> Report {
    let mut report = Report::default();

    if module.name().trim().is_empty() {
        report.error(RegistrationCode::MissingMetadata, "missing name".to_string());
    } else if module.name() != name {
        report.warnings.push(format!(
            "registered as '{name}' but module calls itself '{}'",
            module.name()
        ));
    }
    if module.description().trim().is_empty() {
        report.error(
            RegistrationCode::MissingMetadata,
            "missing description".to_string(),
        );
    }
    if module.version().trim().is_empty() {
        report.error(RegistrationCode::MissingMetadata, "missing version".to_string());
    }

    let commands = module.commands();
    if commands.is_empty() {
        report.error(RegistrationCode::NoCommands, "no commands declared".to_string());
    }

    let categories: HashSet<&str> = module.categories().iter().map(|c| c.name.as_str()).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    for cmd in commands {
        if cmd.handler.is_none() {
            report.error(
                RegistrationCode::MissingHandler,
                format!("command '{}' has no handler", cmd.name),
            );
        }
        for name in std::iter::once(&cmd.name).chain(cmd.aliases.iter()) {
            if !seen.insert(name.as_str()) {
                report.error(
                    RegistrationCode::DuplicateCommand,
                    format!("duplicate command name: {name}"),
                );
            }
        }
        if !categories.contains(cmd.category.as_str()) {
            report.error(
                RegistrationCode::UnknownCategory,
                format!(
                    "command '{}' uses undeclared category '{}'",
                    cmd.name, cmd.category
                ),
            );
        }
        if cmd.usage.is_empty() {
            report
                .warnings
                .push(format!("command '{}' has no usage string", cmd.name));
        }
    }

    for category in module.categories() {
        let actual = commands.iter().filter(|c| c.category == category.name).count();
        if actual != category.declared_commands {
            report.warnings.push(format!(
                "category '{}' declares {} commands but has {actual}",
                category.name, category.declared_commands
            ));
        }
    }

    report
}

impl ModuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a module under `name`.
    ///
    /// On failure the module is not resolvable (any earlier module of the
    /// same name is dropped too), an error status record is written, and a
    /// [`CapshellError::Registration`] carrying every finding is returned.
    pub fn register(&mut self, name: &str, module: Rc<dyn CapabilityModule>) -> Result<()> {
        let report = check_module(name, module.as_ref());
        for warning in &report.warnings {
            log::warn!("module {name}: {warning}");
        }

        if let Some((code, _)) = report.errors.first() {
            let failure = RegistrationFailure {
                module: name.to_string(),
                code: *code,
                errors: report.errors.iter().map(|(_, msg)| msg.clone()).collect(),
                warnings: report.warnings,
            };
            log::warn!("{failure}");
            self.modules.remove(name);
            self.ui_bindings.remove(name);
            self.statuses.borrow_mut().insert(
                name.to_string(),
                StatusRecord::failed(name, module.as_ref(), failure.summary()),
            );
            return Err(CapshellError::Registration(Box::new(failure)));
        }

        if self.modules.contains_key(name) {
            log::info!("replacing module {name}");
        }
        log::info!(
            "registered module {name} v{} ({} commands)",
            module.version(),
            module.commands().len()
        );
        match module.ui_component() {
            Some(component) => {
                self.ui_bindings
                    .insert(name.to_string(), component.to_string());
            },
            None => {
                self.ui_bindings.remove(name);
            },
        }
        self.statuses.borrow_mut().insert(
            name.to_string(),
            StatusRecord::active(name, module.as_ref()),
        );
        self.modules.insert(name.to_string(), module);
        Ok(())
    }

    /// Register a module under its own name.
    pub fn add(&mut self, module: impl CapabilityModule + 'static) -> Result<()> {
        let name = module.name().to_string();
        self.register(&name, Rc::new(module))
    }

    /// Remove a module, its UI binding and its status record.
    pub fn unregister(&mut self, name: &str) -> Option<Rc<dyn CapabilityModule>> {
        self.ui_bindings.remove(name);
        self.statuses.borrow_mut().remove(name);
        let removed = self.modules.remove(name);
        if removed.is_some() {
            log::info!("unregistered module {name}");
        }
        removed
    }

    /// Look up a module regardless of its status.
    pub fn get(&self, name: &str) -> Option<Rc<dyn CapabilityModule>> {
        self.modules.get(name).map(Rc::clone)
    }

    /// Copy of the module map.
    pub fn get_all(&self) -> BTreeMap<String, Rc<dyn CapabilityModule>> {
        self.modules
            .iter()
            .map(|(k, v)| (k.clone(), Rc::clone(v)))
            .collect()
    }

    /// Registered module names, sorted.
    pub fn list(&self) -> Vec<String> {
        self.modules.keys().cloned().collect()
    }

    /// UI component bound to a module, if any.
    pub fn ui_binding(&self, name: &str) -> Option<String> {
        self.ui_bindings.get(name).cloned()
    }

    /// Status record of one module (also for modules that failed
    /// registration).
    pub fn get_status(&self, name: &str) -> Option<StatusRecord> {
        self.statuses.borrow().get(name).cloned()
    }

    /// All status records keyed by module name.
    pub fn get_all_statuses(&self) -> BTreeMap<String, StatusRecord> {
        self.statuses.borrow().clone()
    }

    /// True iff the latest status record for `name` is active.
    pub fn is_active(&self, name: &str) -> bool {
        self.statuses
            .borrow()
            .get(name)
            .is_some_and(StatusRecord::is_active)
    }

    /// Resolve a module that is registered and active.
    pub fn resolve(&self, name: &str) -> Result<Rc<dyn CapabilityModule>> {
        let module = self
            .get(name)
            .ok_or_else(|| CapshellError::NotFound(name.to_string()))?;
        if !self.is_active(name) {
            return Err(CapshellError::NotFound(format!("{name} (inactive)")));
        }
        Ok(module)
    }

    fn record(&self, name: &str, module: &dyn CapabilityModule, outcome: &Result<()>, hook: &str) {
        let record = match outcome {
            Ok(()) => StatusRecord::active(name, module),
            Err(e) => {
                log::warn!("module {name}: {hook} failed: {e}");
                StatusRecord::failed(name, module, e.to_string())
            },
        };
        self.statuses.borrow_mut().insert(name.to_string(), record);
    }

    /// Run every module's `validate` hook side by side.
    ///
    /// Each check updates only its own module's record; a failing module
    /// never stops the others. Returns the full status map afterwards.
    pub async fn health_check(&self) -> BTreeMap<String, StatusRecord> {
        let checks = self.modules.iter().map(|(name, module)| async move {
            let outcome = module.validate().await;
            self.record(name, module.as_ref(), &outcome, "validate");
        });
        join_all(checks).await;
        self.get_all_statuses()
    }

    /// Run every module's `initialize` hook side by side.
    ///
    /// All modules finish their own initialization; if any failed, the
    /// returned error names each failing module with its reason.
    pub async fn initialize_all(&self) -> Result<()> {
        let inits = self.modules.iter().map(|(name, module)| async move {
            let outcome = module.initialize().await;
            self.record(name, module.as_ref(), &outcome, "initialize");
            outcome.err().map(|e| (name.clone(), e.to_string()))
        });
        let failures: Vec<(String, String)> =
            join_all(inits).await.into_iter().flatten().collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(CapshellError::Initialization(failures))
        }
    }
}
