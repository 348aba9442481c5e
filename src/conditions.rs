use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use evalexpr::{ContextWithMutableVariables, HashMapContext, Value};

use crate::error::ParseResult;
use crate::node::ConfigNode;

/// How child conditions of a composed node combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionRelation {
    And,
    Or,
}

/// A scalar carried in a [`ConditionContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        ContextValue::Bool(value)
    }
}

impl From<f64> for ContextValue {
    fn from(value: f64) -> Self {
        ContextValue::Number(value)
    }
}

impl From<i64> for ContextValue {
    fn from(value: i64) -> Self {
        ContextValue::Number(value as f64)
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::String(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::String(value)
    }
}

/// The runtime inputs a condition tree is evaluated against.
///
/// A string-keyed bag of scalars; providers read whatever keys they care
/// about. Context extenders derive a richer context from this one before the
/// wrapped condition runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionContext {
    values: HashMap<String, ContextValue>,
}

impl ConditionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(ContextValue::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        match self.values.get(key) {
            Some(ContextValue::Number(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(ContextValue::String(value)) => Some(value),
            _ => None,
        }
    }

    /// Lowers this context into an evalexpr context so formula-bearing
    /// providers and `NumberValue::Formula` fields can read it.
    pub fn to_eval_context(&self) -> HashMapContext {
        let mut context = HashMapContext::new();
        for (key, value) in &self.values {
            let value = match value {
                ContextValue::Bool(value) => Value::Boolean(*value),
                ContextValue::Number(value) => Value::Float(*value),
                ContextValue::String(value) => Value::String(value.clone()),
            };
            let _ = context.set_value(key.clone(), value);
        }
        context
    }
}

/// Derives an augmented evaluation context before an inner condition runs.
///
/// At most one extender is associated with a registry; composing several is
/// out of scope.
pub trait ContextExtender: Send + Sync {
    fn extend(&self, context: &ConditionContext) -> ConditionContext;
}

/// A named, pluggable source of conditions.
///
/// `key` is the map key the node was authored under, if any; leaf providers
/// typically ignore it, while keyed registries dispatch on it.
pub trait ConditionProvider: Send + Sync {
    fn load(&self, key: Option<&str>, node: &ConfigNode) -> ParseResult<Condition>;
}

pub type Predicate = Arc<dyn Fn(&ConditionContext) -> bool + Send + Sync>;

/// A boolean predicate tree, immutable once built.
///
/// Evaluation is a pure synchronous walk: `And` returns false on the first
/// false child, `Or` returns true on the first true child, and children run
/// in source order (order is observable through short-circuiting).
#[derive(Clone)]
pub enum Condition {
    /// Always true; the default guard when no `conditions` node is authored.
    True,
    /// Delegates to a provider-built predicate, carrying a debug alias.
    Leaf { alias: String, predicate: Predicate },
    /// AND/OR aggregation of child conditions.
    Composed {
        relation: ConditionRelation,
        children: Vec<Condition>,
    },
    /// Wraps an inner condition with a context derivation step.
    Extended {
        extender: Arc<dyn ContextExtender>,
        inner: Box<Condition>,
    },
}

impl Condition {
    pub fn leaf(
        alias: impl Into<String>,
        predicate: impl Fn(&ConditionContext) -> bool + Send + Sync + 'static,
    ) -> Self {
        Condition::Leaf {
            alias: alias.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Renames a leaf for diagnostics. Composed conditions stay unaliased so
    /// their nested structure remains visible in trace output.
    pub fn alias(self, alias: &str) -> Self {
        match self {
            Condition::Leaf { predicate, .. } => Condition::Leaf {
                alias: alias.to_string(),
                predicate,
            },
            other => other,
        }
    }

    pub fn is_composed(&self) -> bool {
        matches!(self, Condition::Composed { .. })
    }

    pub fn matches(&self, context: &ConditionContext) -> bool {
        match self {
            Condition::True => true,
            Condition::Leaf { predicate, .. } => predicate(context),
            Condition::Composed { relation, children } => match relation {
                ConditionRelation::And => children.iter().all(|child| child.matches(context)),
                ConditionRelation::Or => children.iter().any(|child| child.matches(context)),
            },
            Condition::Extended { extender, inner } => {
                let derived = extender.extend(context);
                inner.matches(&derived)
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::True => write!(f, "true"),
            Condition::Leaf { alias, .. } => write!(f, "{}", alias),
            Condition::Composed { relation, children } => {
                let separator = match relation {
                    ConditionRelation::And => " and ",
                    ConditionRelation::Or => " or ",
                };
                write!(f, "(")?;
                for (index, child) in children.iter().enumerate() {
                    if index > 0 {
                        write!(f, "{}", separator)?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
            Condition::Extended { inner, .. } => write!(f, "{}", inner),
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Condition({})", self)
    }
}

/// Builders that turn heterogeneous configuration shapes into condition trees.
pub struct Conditions;

impl Conditions {
    /// Builds a condition tree from a node of any shape.
    ///
    /// A map dispatches each key to the provider, a list recurses per
    /// element, a scalar goes to the provider directly. Multi-child results
    /// compose under `relation` in source order; single children collapse.
    /// Construction is all-or-nothing: the first failure aborts the subtree.
    pub fn from_node(
        node: &ConfigNode,
        relation: ConditionRelation,
        provider: &dyn ConditionProvider,
    ) -> ParseResult<Condition> {
        match node {
            ConfigNode::Map(entries) => {
                let mut children = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    children.push(provider.load(Some(key), value)?);
                }
                Ok(Self::compose(relation, children))
            }
            ConfigNode::List(items) => {
                let mut children = Vec::with_capacity(items.len());
                for item in items {
                    children.push(Self::from_node(item, relation, provider)?);
                }
                Ok(Self::compose(relation, children))
            }
            ConfigNode::Scalar(_) => provider.load(None, node),
        }
    }

    /// Wraps a built condition so evaluation first derives an augmented
    /// context, then delegates.
    pub fn wrap(condition: Condition, extender: Arc<dyn ContextExtender>) -> Condition {
        Condition::Extended {
            extender,
            inner: Box::new(condition),
        }
    }

    fn compose(relation: ConditionRelation, mut children: Vec<Condition>) -> Condition {
        match children.len() {
            0 => Condition::True,
            1 => children.remove(0),
            _ => Condition::Composed { relation, children },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counted(result: bool, calls: &Arc<AtomicUsize>) -> Condition {
        let calls = Arc::clone(calls);
        Condition::leaf("counted", move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            result
        })
    }

    #[test]
    fn test_and_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let tree = Condition::Composed {
            relation: ConditionRelation::And,
            children: vec![
                counted(true, &calls),
                counted(false, &calls),
                counted(true, &calls),
            ],
        };

        assert!(!tree.matches(&ConditionContext::new()));
        // The third child must never run.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_or_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let tree = Condition::Composed {
            relation: ConditionRelation::Or,
            children: vec![
                counted(false, &calls),
                counted(true, &calls),
                counted(false, &calls),
            ],
        };

        assert!(tree.matches(&ConditionContext::new()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_extender_derives_context() {
        struct SessionExtender;

        impl ContextExtender for SessionExtender {
            fn extend(&self, context: &ConditionContext) -> ConditionContext {
                context.clone().with("session-active", true)
            }
        }

        let inner = Condition::leaf("session", |ctx: &ConditionContext| {
            ctx.get_bool("session-active").unwrap_or(false)
        });

        assert!(!inner.matches(&ConditionContext::new()));

        let wrapped = Conditions::wrap(inner, Arc::new(SessionExtender));
        assert!(wrapped.matches(&ConditionContext::new()));
    }

    #[test]
    fn test_display_keeps_composed_structure_visible() {
        let tree = Condition::Composed {
            relation: ConditionRelation::And,
            children: vec![
                Condition::leaf("require-tool", |_| true),
                Condition::Composed {
                    relation: ConditionRelation::Or,
                    children: vec![
                        Condition::leaf("day", |_| true),
                        Condition::leaf("night", |_| false),
                    ],
                },
            ],
        };
        assert_eq!(tree.to_string(), "(require-tool and (day or night))");
    }

    #[test]
    fn test_alias_only_renames_leaves() {
        let leaf = Condition::leaf("old", |_| true).alias("new");
        assert_eq!(leaf.to_string(), "new");

        let composed = Condition::Composed {
            relation: ConditionRelation::Or,
            children: vec![Condition::leaf("a", |_| true), Condition::leaf("b", |_| true)],
        };
        assert_eq!(composed.alias("renamed").to_string(), "(a or b)");
    }
}
