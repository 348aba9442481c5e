pub use crate::conditions::{
    Condition, ConditionContext, ConditionProvider, ConditionRelation, Conditions,
    ContextExtender, ContextValue,
};
pub use crate::drop::{DropItem, DropItemKind, Enchant, ExperienceDrop, ItemDrop, PresetRewards};
pub use crate::error::{ParseError, ParseResult};
pub use crate::event::{EventBossBar, PresetEvent};
pub use crate::item_provider::{ItemProvider, ItemProviderRegistry};
pub use crate::load_result::LoadResult;
pub use crate::material::{MaterialParser, NameMaterialParser, PlacementMaterial, TargetMaterial};
pub use crate::node::{ConfigNode, NodeKind, Scalar};
pub use crate::preset::{JobRequirement, Preset, PresetConditions};
pub use crate::preset_manager::PresetManager;
pub use crate::registry::{ConditionRegistry, ProviderEntry};
pub use crate::value::{Expression, NumberValue};
