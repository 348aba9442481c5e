use evalexpr::{
    Context, ContextWithMutableVariables, DefaultNumericTypes, HashMapContext, Node, Value,
};

use crate::error::{ParseError, ParseResult};
use crate::node::{ConfigNode, Scalar};

/// A mathematical expression compiled from a configuration string.
///
/// Expressions are compiled once at load time and evaluated per use so that
/// context-dependent identifiers (e.g. a player level supplied at block-break
/// time) pick up the current value. Identifiers missing from the evaluation
/// context default to `0.0`.
#[derive(Debug, Clone)]
pub struct Expression {
    definition: String,
    compiled: Node<DefaultNumericTypes>,
}

impl Expression {
    pub fn new(expression: &str) -> ParseResult<Self> {
        let compiled =
            evalexpr::build_operator_tree(expression).map_err(|err| ParseError::Expression {
                expression: expression.to_string(),
                details: err.to_string(),
            })?;

        Ok(Self {
            definition: expression.to_string(),
            compiled,
        })
    }

    pub fn definition(&self) -> &str {
        &self.definition
    }

    pub fn evaluate(&self, base_context: &HashMapContext) -> f64 {
        let mut context = base_context.clone();

        // Ensure all identifiers referenced by this expression are present.
        for var_name in self.compiled.iter_variable_identifiers() {
            if context.get_value(var_name).is_none() {
                let _ = context.set_value(var_name.to_string(), Value::Float(0.0));
            }
        }

        self.compiled
            .eval_with_context(&context)
            .ok()
            .and_then(|value| value.as_number().ok())
            .unwrap_or(0.0)
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.definition == other.definition
    }
}

/// A numeric configuration field that may be fixed, a range, or a formula.
///
/// Constructed once at load time, immutable thereafter. Ranges sample
/// uniformly per call; formulas are re-evaluated per call and never cached.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberValue {
    Fixed(f64),
    Range { min: f64, max: f64 },
    Formula(Expression),
}

impl NumberValue {
    pub fn fixed(value: f64) -> Self {
        NumberValue::Fixed(value)
    }

    /// Interprets a configuration node as a number value.
    ///
    /// Recognizes a plain number, a `"min-max"` range string, or a formula
    /// string. Malformed input is always reported as an error, never a panic;
    /// the fallback decision stays with the caller.
    pub fn load(node: &ConfigNode) -> ParseResult<Self> {
        match node {
            ConfigNode::Scalar(Scalar::Int(value)) => Ok(NumberValue::Fixed(*value as f64)),
            ConfigNode::Scalar(Scalar::Float(value)) => Ok(NumberValue::Fixed(*value)),
            ConfigNode::Scalar(Scalar::String(text)) => Self::parse(text),
            other => Err(ParseError::InvalidValue {
                value: other.to_string(),
                details: "expected a number or a string".to_string(),
            }),
        }
    }

    fn parse(input: &str) -> ParseResult<Self> {
        let text = input.trim();

        if let Ok(value) = text.parse::<f64>() {
            return Ok(NumberValue::Fixed(value));
        }

        if let Some(result) = Self::parse_range(text) {
            return result;
        }

        // A bare word is a typo, not a formula. Formulas that read a single
        // context variable can be written with an explicit operator.
        if text.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(ParseError::InvalidValue {
                value: input.to_string(),
                details: "not a number, a range, or a formula".to_string(),
            });
        }

        Expression::new(text).map(NumberValue::Formula)
    }

    /// Attempts the `"min-max"` shape. Returns `None` if the text does not
    /// look like a range at all, so formula parsing can still run.
    fn parse_range(text: &str) -> Option<ParseResult<Self>> {
        // Skip index 0 so a leading minus sign stays part of the min.
        let split = text.char_indices().skip(1).find(|(_, c)| *c == '-')?.0;

        let min = text[..split].trim().parse::<f64>().ok()?;
        let max = text[split + 1..].trim().parse::<f64>().ok()?;

        // f64::parse accepts "nan" and "inf"; neither is a samplable bound.
        if !min.is_finite() || !max.is_finite() {
            return Some(Err(ParseError::InvalidValue {
                value: text.to_string(),
                details: "range bounds must be finite numbers".to_string(),
            }));
        }

        if min > max {
            return Some(Err(ParseError::InvalidValue {
                value: text.to_string(),
                details: format!("range minimum {} is above maximum {}", min, max),
            }));
        }

        Some(Ok(NumberValue::Range { min, max }))
    }

    pub fn get_double(&self) -> f64 {
        self.get_double_with(&HashMapContext::new())
    }

    pub fn get_double_with(&self, context: &HashMapContext) -> f64 {
        match self {
            NumberValue::Fixed(value) => *value,
            NumberValue::Range { min, max } => {
                use rand::Rng;
                rand::rng().random_range(*min..=*max)
            }
            NumberValue::Formula(expression) => expression.evaluate(context),
        }
    }

    pub fn get_int(&self) -> i64 {
        self.get_double().round() as i64
    }

    pub fn get_int_with(&self, context: &HashMapContext) -> i64 {
        self.get_double_with(context).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_result::LoadResult;

    fn node(value: serde_json::Value) -> ConfigNode {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_fixed_from_number_and_string() {
        assert_eq!(NumberValue::load(&node(serde_json::json!(5))), Ok(NumberValue::Fixed(5.0)));
        assert_eq!(NumberValue::load(&node(serde_json::json!(2.5))), Ok(NumberValue::Fixed(2.5)));
        assert_eq!(NumberValue::load(&node(serde_json::json!("5"))), Ok(NumberValue::Fixed(5.0)));
        assert_eq!(NumberValue::load(&node(serde_json::json!("-4"))), Ok(NumberValue::Fixed(-4.0)));
    }

    #[test]
    fn test_range_parse() {
        assert_eq!(
            NumberValue::load(&node(serde_json::json!("3-7"))),
            Ok(NumberValue::Range { min: 3.0, max: 7.0 })
        );
        assert_eq!(
            NumberValue::load(&node(serde_json::json!("-5-5"))),
            Ok(NumberValue::Range { min: -5.0, max: 5.0 })
        );
        // Inverted ranges are malformed, not silently swapped.
        assert!(NumberValue::load(&node(serde_json::json!("7-3"))).is_err());
    }

    #[test]
    fn test_non_finite_range_bounds_are_invalid() {
        // NaN bounds dodge the min/max ordering check and would panic
        // inside the sampler if they ever reached get_double.
        assert!(NumberValue::load(&node(serde_json::json!("nan-nan"))).is_err());
        assert!(NumberValue::load(&node(serde_json::json!("inf-inf"))).is_err());
        assert!(NumberValue::load(&node(serde_json::json!("1-inf"))).is_err());
    }

    #[test]
    fn test_malformed_input_is_invalid() {
        assert!(NumberValue::load(&node(serde_json::json!("abc"))).is_err());
        assert!(NumberValue::load(&node(serde_json::json!([1, 2]))).is_err());
    }

    #[test]
    fn test_absent_vs_invalid_through_try_load() {
        let section = node(serde_json::json!({ "amount": "abc" }));
        assert_eq!(
            LoadResult::try_load(&section, "missing", NumberValue::load),
            LoadResult::Absent
        );
        assert!(LoadResult::try_load(&section, "amount", NumberValue::load).is_invalid());
    }

    #[test]
    fn test_range_samples_within_bounds() {
        let value = NumberValue::Range { min: 3.0, max: 7.0 };
        for _ in 0..100 {
            let sample = value.get_double();
            assert!((3.0..=7.0).contains(&sample));
        }
    }

    #[test]
    fn test_formula_reads_context() {
        let value = NumberValue::load(&node(serde_json::json!("level * 2"))).unwrap();
        assert!(matches!(value, NumberValue::Formula(_)));

        let mut context = HashMapContext::new();
        context.set_value("level".to_string(), Value::Float(4.0)).unwrap();
        assert_eq!(value.get_double_with(&context), 8.0);

        // Missing identifiers default to zero rather than erroring.
        assert_eq!(value.get_double(), 0.0);
    }
}
