//! Modules compiled into the binary.

mod demo;
mod system;

use std::cell::OnceCell;
use std::rc::{Rc, Weak};

use capshell_registry::ModuleRegistry;
use capshell_types::error::Result;

/// Late-bound link back to the registry, for modules that report on it.
pub type RegistryHandle = Rc<OnceCell<Weak<ModuleRegistry>>>;

/// Build the registry with every bundled module registered.
pub fn build_registry() -> Result<Rc<ModuleRegistry>> {
    let handle: RegistryHandle = Rc::default();
    let mut registry = ModuleRegistry::new();
    registry.add(system::SystemModule::new(Rc::clone(&handle)))?;
    registry.add(demo::module())?;

    let registry = Rc::new(registry);
    if handle.set(Rc::downgrade(&registry)).is_err() {
        log::warn!("registry handle was already bound");
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use capshell_registry::CommandOutput;
    use capshell_shell::{CommandRouter, Route};
    use capshell_types::error::CapshellError;

    pub(crate) async fn run(registry: &ModuleRegistry, line: &str) -> capshell_types::error::Result<CommandOutput> {
        match CommandRouter::new().route(line, registry) {
            Route::Module { handler, flags, .. } => handler.run(&flags).await,
            Route::Error { message, .. } => Err(CapshellError::Flag(message)),
            other => panic!("'{line}' did not route to a module: {other:?}"),
        }
    }

    #[tokio::test]
    async fn bundled_modules_register_and_initialize() {
        let registry = build_registry().unwrap();
        assert_eq!(registry.list(), ["demo", "system"]);
        registry.initialize_all().await.unwrap();
        assert!(registry.is_active("demo"));
        assert!(registry.is_active("system"));
    }

    #[tokio::test]
    async fn system_modules_sees_registry() {
        let registry = build_registry().unwrap();
        let out = run(&registry, "system modules").await.unwrap();
        let lines = out.lines();
        assert!(lines.iter().any(|l| l.starts_with("demo")));
        assert!(lines.iter().any(|l| l.starts_with("system")));
    }
}
