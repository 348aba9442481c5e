//! A configuration-driven preset engine.
//!
//! Parses human-authored configuration into rule-bearing presets: a target
//! selector, a composable boolean condition tree evaluated against a runtime
//! context, and a set of drop descriptors with independently rolled chances
//! and amounts. Value fields may be fixed numbers, `"min-max"` ranges, or
//! formulas re-evaluated per use.
//!
//! The configuration source, the concrete condition providers, and the
//! external item systems are collaborators supplied by the caller; this
//! crate defines the contracts they plug into and the loading pipeline
//! that assembles everything.

pub mod conditions;
pub mod drop;
pub mod error;
pub mod event;
pub mod item_provider;
pub mod load_result;
pub mod material;
pub mod node;
pub mod prelude;
pub mod preset;
pub mod preset_manager;
pub mod registry;
pub mod value;
