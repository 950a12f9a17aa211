//! Provider registry: the injectable list of evidence sources.

use std::sync::Arc;

use super::EvidenceProvider;

/// An ordered collection of evidence providers.
///
/// The orchestrator queries every registered provider for every
/// candidate. Order is preserved so runs with the same registry are
/// reproducible.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn EvidenceProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. Later registrations are queried later.
    pub fn register(&mut self, provider: Arc<dyn EvidenceProvider>) -> &mut Self {
        self.providers.push(provider);
        self
    }

    /// Builder-style registration.
    pub fn with(mut self, provider: Arc<dyn EvidenceProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn providers(&self) -> &[Arc<dyn EvidenceProvider>] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderError;
    use async_trait::async_trait;
    use vetter_core::{Candidate, EvidenceBundle, RequirementSet};

    struct Named(&'static str);

    #[async_trait]
    impl EvidenceProvider for Named {
        fn name(&self) -> &str {
            self.0
        }

        async fn fetch(
            &self,
            _candidate: &Candidate,
            _requirements: &RequirementSet,
        ) -> Result<EvidenceBundle, ProviderError> {
            Ok(EvidenceBundle::empty(self.0))
        }
    }

    #[test]
    fn test_registration_preserves_order() {
        let registry = ProviderRegistry::new()
            .with(Arc::new(Named("awards_db")))
            .with(Arc::new(Named("patents")));
        let names: Vec<&str> = registry.providers().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["awards_db", "patents"]);
        assert_eq!(registry.len(), 2);
    }
}
