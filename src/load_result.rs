use crate::error::{ParseError, ParseResult};
use crate::node::ConfigNode;

/// Outcome of loading one optional configuration field.
///
/// Distinguishes "field not authored" from "field authored but malformed" so
/// callers can pick a fallback policy per field: `if_empty` defaults only the
/// missing case, `if_not_full` degrades both to the default.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadResult<T> {
    /// The field path does not exist.
    Absent,
    /// The field parsed successfully.
    Full(T),
    /// The field exists but none of the accepted shapes parsed.
    Invalid(ParseError),
}

impl<T> LoadResult<T> {
    /// Attempts to parse the field at `path` under `node`.
    pub fn try_load(
        node: &ConfigNode,
        path: &str,
        parse: impl FnOnce(&ConfigNode) -> ParseResult<T>,
    ) -> Self {
        match node.get(path) {
            None => LoadResult::Absent,
            Some(child) => match parse(child) {
                Ok(value) => LoadResult::Full(value),
                Err(err) => LoadResult::Invalid(err),
            },
        }
    }

    /// Substitutes `default` only for `Absent`. An `Invalid` result passes
    /// through untouched and must still be handled.
    pub fn if_empty(self, default: T) -> Self {
        match self {
            LoadResult::Absent => LoadResult::Full(default),
            other => other,
        }
    }

    /// Substitutes `default` for both `Absent` and `Invalid`.
    pub fn if_not_full(self, default: T) -> Self {
        match self {
            LoadResult::Full(value) => LoadResult::Full(value),
            LoadResult::Absent => LoadResult::Full(default),
            LoadResult::Invalid(_) => LoadResult::Full(default),
        }
    }

    /// Logs an `Invalid` result under the given field name and passes the
    /// result through unchanged.
    pub fn warn_invalid(self, field: &str) -> Self {
        if let LoadResult::Invalid(err) = &self {
            log::warn!("Malformed value for '{}': {}", field, err);
        }
        self
    }

    /// Hands the resolved value to `sink` if and only if resolution
    /// succeeded (post-default). `Absent` and `Invalid` are dropped here;
    /// default them first if they should not be.
    pub fn apply(self, sink: impl FnOnce(T)) {
        if let LoadResult::Full(value) = self {
            sink(value);
        }
    }

    pub fn full(self) -> Option<T> {
        match self {
            LoadResult::Full(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, LoadResult::Invalid(_))
    }

    /// Converts to a `ParseResult`, treating `Absent` as `None`.
    pub fn into_result(self) -> ParseResult<Option<T>> {
        match self {
            LoadResult::Absent => Ok(None),
            LoadResult::Full(value) => Ok(Some(value)),
            LoadResult::Invalid(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::NumberValue;

    fn node(value: serde_json::Value) -> ConfigNode {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_if_empty_defaults_only_absent() {
        let section = node(serde_json::json!({ "money": "abc" }));

        let absent = LoadResult::try_load(&section, "missing", NumberValue::load)
            .if_empty(NumberValue::fixed(5.0));
        assert_eq!(absent.full(), Some(NumberValue::fixed(5.0)));

        // Invalid stays Invalid, not silently defaulted.
        let invalid = LoadResult::try_load(&section, "money", NumberValue::load)
            .if_empty(NumberValue::fixed(5.0));
        assert!(invalid.is_invalid());
    }

    #[test]
    fn test_if_not_full_defaults_both() {
        let section = node(serde_json::json!({ "money": "abc" }));

        let absent = LoadResult::try_load(&section, "missing", NumberValue::load)
            .if_not_full(NumberValue::fixed(1.0));
        assert_eq!(absent.full(), Some(NumberValue::fixed(1.0)));

        let invalid = LoadResult::try_load(&section, "money", NumberValue::load)
            .if_not_full(NumberValue::fixed(1.0));
        assert_eq!(invalid.full(), Some(NumberValue::fixed(1.0)));
    }

    #[test]
    fn test_apply_runs_only_on_full() {
        let section = node(serde_json::json!({ "chance": 25 }));
        let mut seen = None;

        LoadResult::try_load(&section, "chance", NumberValue::load)
            .apply(|value| seen = Some(value));
        assert_eq!(seen, Some(NumberValue::fixed(25.0)));

        let mut touched = false;
        LoadResult::<NumberValue>::Absent.apply(|_| touched = true);
        assert!(!touched);
    }
}
