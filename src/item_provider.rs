use std::collections::HashMap;
use std::sync::Arc;

/// An external plugin/system that can resolve items by id.
///
/// The engine only needs the existence check; actual item realization
/// happens outside this crate.
pub trait ItemProvider: Send + Sync {
    fn exists(&self, id: &str) -> bool;
}

/// Prefix-keyed lookup of external item providers.
///
/// Prefixes are matched case-insensitively; registration happens at
/// startup, lookups at preset-load time.
#[derive(Default)]
pub struct ItemProviderRegistry {
    providers: HashMap<String, Arc<dyn ItemProvider>>,
}

impl ItemProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, prefix: impl Into<String>, provider: Arc<dyn ItemProvider>) -> &mut Self {
        self.providers.insert(prefix.into().to_lowercase(), provider);
        self
    }

    pub fn get_provider(&self, prefix: &str) -> Option<&Arc<dyn ItemProvider>> {
        self.providers.get(&prefix.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedItems(Vec<&'static str>);

    impl ItemProvider for FixedItems {
        fn exists(&self, id: &str) -> bool {
            self.0.contains(&id)
        }
    }

    #[test]
    fn test_prefix_lookup_is_case_insensitive() {
        let mut registry = ItemProviderRegistry::new();
        registry.register("Econ", Arc::new(FixedItems(vec!["gold-coin"])));

        assert!(registry.get_provider("econ").is_some());
        assert!(registry.get_provider("ECON").is_some());
        assert!(registry.get_provider("other").is_none());

        let provider = registry.get_provider("econ").unwrap();
        assert!(provider.exists("gold-coin"));
        assert!(!provider.exists("silver-coin"));
    }
}
