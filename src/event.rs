use crate::drop::{DropItem, PresetRewards};
use crate::node::ConfigNode;
use crate::value::NumberValue;

/// Boss-bar styling for a derived event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventBossBar {
    pub text: String,
    pub color: String,
}

impl EventBossBar {
    /// Loads the optional `bossbar` subsection, falling back to defaults
    /// field by field.
    pub fn load(node: Option<&ConfigNode>, default_text: &str) -> EventBossBar {
        let text = node
            .and_then(|node| node.get_string("name"))
            .unwrap_or(default_text)
            .to_string();
        let color = node
            .and_then(|node| node.get_string("color"))
            .unwrap_or("GREEN")
            .to_string();

        EventBossBar { text, color }
    }
}

/// An event derived from a preset's `event` subsection.
///
/// Owned by the engine's event collection, keyed by the preset name; rebuilt
/// wholesale on reload together with the presets.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetEvent {
    /// Name of the preset the event was derived from.
    pub name: String,
    pub display_name: String,
    pub double_drops: bool,
    pub double_experience: bool,
    pub boss_bar: Option<EventBossBar>,
    /// Legacy custom item handed out while the event runs.
    pub item: Option<DropItem>,
    pub item_rarity: NumberValue,
    pub rewards: PresetRewards,
}

impl PresetEvent {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            double_drops: false,
            double_experience: false,
            boss_bar: None,
            item: None,
            item_rarity: NumberValue::fixed(1.0),
            rewards: PresetRewards::default(),
        }
    }
}
