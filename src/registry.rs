use std::collections::HashMap;
use std::sync::Arc;

use crate::conditions::{Condition, ConditionProvider, ConditionRelation, Conditions, ContextExtender};
use crate::error::{ParseError, ParseResult};
use crate::node::{ConfigNode, NodeKind};

/// One registered condition kind: the provider plus the node shape it
/// expects and the relation used when its node is itself a collection.
#[derive(Clone)]
pub struct ProviderEntry {
    provider: Arc<dyn ConditionProvider>,
    expected_kind: NodeKind,
    relation: ConditionRelation,
}

impl ProviderEntry {
    pub fn of(provider: Arc<dyn ConditionProvider>) -> Self {
        Self {
            provider,
            expected_kind: NodeKind::Any,
            relation: ConditionRelation::Or,
        }
    }

    pub fn expecting(mut self, kind: NodeKind) -> Self {
        self.expected_kind = kind;
        self
    }

    pub fn relation(mut self, relation: ConditionRelation) -> Self {
        self.relation = relation;
        self
    }

    pub fn expected_kind(&self) -> NodeKind {
        self.expected_kind
    }
}

/// A keyed registry of condition providers, itself usable as a provider.
///
/// Built once at configuration-load time and read-only while evaluation is
/// running; `add_provider` is only valid before evaluation begins.
#[derive(Default)]
pub struct ConditionRegistry {
    providers: HashMap<String, ProviderEntry>,
    extender: Option<Arc<dyn ContextExtender>>,
}

impl ConditionRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single_node(key: impl Into<String>, entry: ProviderEntry) -> Self {
        let mut registry = Self::empty();
        registry.add_provider(key, entry);
        registry
    }

    /// Inserts or overwrites the entry for `key`.
    pub fn add_provider(&mut self, key: impl Into<String>, entry: ProviderEntry) -> &mut Self {
        self.providers.insert(key.into(), entry);
        self
    }

    /// Sets the single context extender applied to every condition this
    /// registry builds.
    pub fn extender(&mut self, extender: Arc<dyn ContextExtender>) -> &mut Self {
        self.extender = Some(extender);
        self
    }

    pub fn providers(&self) -> &HashMap<String, ProviderEntry> {
        &self.providers
    }
}

impl ConditionProvider for ConditionRegistry {
    fn load(&self, key: Option<&str>, node: &ConfigNode) -> ParseResult<Condition> {
        let key = key.unwrap_or("");

        let entry = self.providers.get(key).ok_or_else(|| ParseError::UnknownKey {
            key: key.to_string(),
        })?;

        if !entry.expected_kind.matches(node.kind()) {
            return Err(ParseError::WrongNodeKind {
                key: key.to_string(),
                expected: entry.expected_kind,
                found: node.kind(),
            });
        }

        let condition = Conditions::from_node(node, entry.relation, entry.provider.as_ref())
            .map(|condition| {
                // Leaves get the key as their debug alias; composed results
                // stay unaliased so traces can unwind into them.
                if condition.is_composed() {
                    condition
                } else {
                    condition.alias(key)
                }
            })
            .map_err(|err| err.under(key))?;

        Ok(match &self.extender {
            Some(extender) => Conditions::wrap(condition, Arc::clone(extender)),
            None => condition,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::ConditionContext;

    /// Scalar provider that matches when the context holds the named tool.
    struct ToolProvider;

    impl ConditionProvider for ToolProvider {
        fn load(&self, _key: Option<&str>, node: &ConfigNode) -> ParseResult<Condition> {
            let tool = node
                .as_str()
                .ok_or_else(|| ParseError::InvalidValue {
                    value: node.to_string(),
                    details: "expected a tool name".to_string(),
                })?
                .to_string();
            Ok(Condition::leaf("tool", move |ctx: &ConditionContext| {
                ctx.get_str("tool") == Some(tool.as_str())
            }))
        }
    }

    fn registry() -> ConditionRegistry {
        let mut registry = ConditionRegistry::empty();
        registry.add_provider(
            "require-tool",
            ProviderEntry::of(Arc::new(ToolProvider)).relation(ConditionRelation::Or),
        );
        registry
    }

    fn node(value: serde_json::Value) -> ConfigNode {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_unknown_key_fails() {
        let err = registry()
            .load(Some("no-such-kind"), &node(serde_json::json!("X")))
            .unwrap_err();
        assert_eq!(err, ParseError::UnknownKey { key: "no-such-kind".to_string() });
    }

    #[test]
    fn test_wrong_node_kind_fails() {
        let mut registry = ConditionRegistry::empty();
        registry.add_provider(
            "require-tool",
            ProviderEntry::of(Arc::new(ToolProvider)).expecting(NodeKind::Scalar),
        );

        let err = registry
            .load(Some("require-tool"), &node(serde_json::json!({ "nested": 1 })))
            .unwrap_err();
        assert!(matches!(err, ParseError::WrongNodeKind { found: NodeKind::Map, .. }));
    }

    #[test]
    fn test_single_scalar_becomes_aliased_leaf() {
        let condition = registry()
            .load(Some("require-tool"), &node(serde_json::json!("DIAMOND_PICKAXE")))
            .unwrap();

        assert_eq!(condition.to_string(), "require-tool");
        assert!(condition.matches(&ConditionContext::new().with("tool", "DIAMOND_PICKAXE")));
        assert!(!condition.matches(&ConditionContext::new().with("tool", "STICK")));
    }

    #[test]
    fn test_list_composes_with_entry_relation() {
        let condition = registry()
            .load(
                Some("require-tool"),
                &node(serde_json::json!(["DIAMOND_PICKAXE", "IRON_PICKAXE"])),
            )
            .unwrap();

        // Composed conditions keep their structure in trace output.
        assert_eq!(condition.to_string(), "(tool or tool)");
        assert!(condition.matches(&ConditionContext::new().with("tool", "IRON_PICKAXE")));
        assert!(!condition.matches(&ConditionContext::new().with("tool", "STICK")));
    }

    #[test]
    fn test_inner_failure_is_prefixed_with_key() {
        let err = registry()
            .load(Some("require-tool"), &node(serde_json::json!([42])))
            .unwrap_err();

        assert!(matches!(err, ParseError::Failed { ref key, .. } if key == "require-tool"));
        assert!(err.to_string().starts_with("Failed to parse 'require-tool':"));
    }
}
