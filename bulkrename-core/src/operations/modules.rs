use crate::output::ModulesResult;
use crate::registry::ModuleRegistry;

/// The module catalog, default module first.
pub fn list_modules_operation() -> ModulesResult {
    ModulesResult::from_registry(ModuleRegistry::global())
}
