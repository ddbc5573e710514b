//! Maps a task type to its verifier plugin.

use std::collections::HashMap;
use std::sync::Arc;

use shared_types::entities::TaskType;
use shared_types::errors::PocwError;

use crate::port::VerifierPlugin;

#[derive(Default)]
pub struct VerifierRegistry {
    plugins: HashMap<TaskType, Arc<dyn VerifierPlugin>>,
}

impl VerifierRegistry {
    pub fn new() -> Self {
        Self {
            plugins: HashMap::new(),
        }
    }

    pub fn register(&mut self, task_type: TaskType, plugin: Arc<dyn VerifierPlugin>) {
        self.plugins.insert(task_type, plugin);
    }

    /// Resolves the verifier for `task_type`, failing fast on an unknown type.
    pub fn resolve(&self, task_type: TaskType) -> Result<Arc<dyn VerifierPlugin>, PocwError> {
        self.plugins
            .get(&task_type)
            .cloned()
            .ok_or_else(|| PocwError::validation(format!("no verifier registered for {:?}", task_type)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creation::CreationVerifier;

    #[test]
    fn unregistered_type_fails_fast() {
        let registry = VerifierRegistry::new();
        assert!(registry.resolve(TaskType::Creation).is_err());
    }

    #[test]
    fn registered_type_resolves() {
        let mut registry = VerifierRegistry::new();
        registry.register(TaskType::Creation, Arc::new(CreationVerifier::new()));
        assert!(registry.resolve(TaskType::Creation).is_ok());
    }
}
