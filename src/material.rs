use std::collections::HashSet;

use crate::error::{ParseError, ParseResult};

/// The block selector a preset applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetMaterial(String);

impl TargetMaterial {
    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, material: &str) -> bool {
        self.0.eq_ignore_ascii_case(material)
    }
}

/// A material placed back into the world (replace-block, regenerate-into)
/// or attached to an intrinsic drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementMaterial(String);

impl PlacementMaterial {
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Resolves material names against whatever game-side material set the
/// caller runs on. The engine only needs validated newtypes back.
pub trait MaterialParser: Send + Sync {
    fn parse_target(&self, input: &str) -> ParseResult<TargetMaterial>;
    fn parse_placement(&self, input: &str) -> ParseResult<PlacementMaterial>;
}

/// Name-based parser backed by an explicit material list, or accepting any
/// well-formed name when constructed with `any()`.
pub struct NameMaterialParser {
    known: Option<HashSet<String>>,
}

impl NameMaterialParser {
    /// Accepts any non-empty `WORD_LIKE` or `namespaced:word` name.
    pub fn any() -> Self {
        Self { known: None }
    }

    pub fn of<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            known: Some(names.into_iter().map(|name| name.to_uppercase()).collect()),
        }
    }

    fn validate(&self, input: &str) -> ParseResult<String> {
        let name = input.trim();

        let well_formed = !name.is_empty()
            && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == ':');
        if !well_formed {
            return Err(ParseError::InvalidValue {
                value: input.to_string(),
                details: "not a material name".to_string(),
            });
        }

        if let Some(known) = &self.known {
            if !known.contains(&name.to_uppercase()) {
                return Err(ParseError::InvalidValue {
                    value: input.to_string(),
                    details: "unknown material".to_string(),
                });
            }
        }

        Ok(name.to_uppercase())
    }
}

impl MaterialParser for NameMaterialParser {
    fn parse_target(&self, input: &str) -> ParseResult<TargetMaterial> {
        self.validate(input).map(TargetMaterial)
    }

    fn parse_placement(&self, input: &str) -> ParseResult<PlacementMaterial> {
        self.validate(input).map(PlacementMaterial)
    }
}
