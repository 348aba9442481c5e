use std::collections::HashMap;
use std::sync::Arc;

use crate::conditions::{Condition, ConditionRelation, Conditions};
use crate::drop::{DropItem, DropItemKind, Enchant, ExperienceDrop, ItemDrop, PresetRewards};
use crate::error::{ParseError, ParseResult};
use crate::event::{EventBossBar, PresetEvent};
use crate::item_provider::ItemProviderRegistry;
use crate::load_result::LoadResult;
use crate::material::MaterialParser;
use crate::node::ConfigNode;
use crate::preset::{Preset, PresetConditions};
use crate::registry::ConditionRegistry;
use crate::value::NumberValue;

/// Builds and owns the preset collection.
///
/// All loading runs synchronously on the caller's thread; a reload clears
/// and rebuilds the whole collection. The finished presets and their
/// condition trees are immutable snapshots, safe to read concurrently as
/// long as the caller serializes reloads against evaluation.
pub struct PresetManager {
    presets: HashMap<String, Preset>,
    events: HashMap<String, PresetEvent>,
    conditions: ConditionRegistry,
    materials: Arc<dyn MaterialParser>,
    items: Arc<ItemProviderRegistry>,
}

impl PresetManager {
    pub fn new(materials: Arc<dyn MaterialParser>, items: Arc<ItemProviderRegistry>) -> Self {
        Self {
            presets: HashMap::new(),
            events: HashMap::new(),
            conditions: ConditionRegistry::empty(),
            materials,
            items,
        }
    }

    pub fn conditions(&self) -> &ConditionRegistry {
        &self.conditions
    }

    /// Provider registration happens here, before the first load.
    pub fn conditions_mut(&mut self) -> &mut ConditionRegistry {
        &mut self.conditions
    }

    pub fn get_preset(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    /// Finds the first preset whose target selector matches a material.
    pub fn preset_for(&self, material: &str) -> Option<&Preset> {
        self.presets
            .values()
            .find(|preset| preset.target_material.matches(material))
    }

    pub fn presets(&self) -> &HashMap<String, Preset> {
        &self.presets
    }

    pub fn events(&self) -> &HashMap<String, PresetEvent> {
        &self.events
    }

    /// Clears and rebuilds the whole preset collection from a configuration
    /// root whose keys are preset names.
    ///
    /// A failed preset is logged and skipped; it never aborts its siblings.
    pub fn load_all(&mut self, root: &ConfigNode) {
        self.presets.clear();
        self.events.clear();

        for (name, section) in root.entries() {
            if let Err(err) = self.load_preset(name, section) {
                log::warn!("Could not load preset '{}': {}", name, err);
            }
        }

        log::info!("Loaded {} block preset(s)...", self.presets.len());
        log::info!("Added {} event(s)...", self.events.len());
    }

    /// Loads a single preset subsection and commits it on success.
    pub fn load_preset(&mut self, name: &str, section: &ConfigNode) -> ParseResult<()> {
        // Target material is structurally required; it defaults to the
        // preset name and aborts the preset when invalid.
        let target_input = section.get_string("target-material").unwrap_or(name);
        let target_material = self
            .materials
            .parse_target(target_input)
            .map_err(|err| err.under("target-material"))?;

        let mut preset = Preset::new(name, target_material);

        // Placement materials are best-effort.
        if let Some(input) = section.get_string("replace-block") {
            match self.materials.parse_placement(input) {
                Ok(material) => preset.replace_material = Some(material),
                Err(err) => log::warn!(
                    "Material '{}' in 'replace-block' for {} is invalid: {}",
                    input, name, err
                ),
            }
        }

        if let Some(input) = section.get_string("regenerate-into") {
            match self.materials.parse_placement(input) {
                Ok(material) => preset.regen_material = Some(material),
                Err(err) => log::warn!(
                    "Material '{}' in 'regenerate-into' for {} is invalid: {}",
                    input, name, err
                ),
            }
        }

        LoadResult::try_load(section, "regen-delay", NumberValue::load)
            .warn_invalid("regen-delay")
            .if_empty(NumberValue::fixed(3.0))
            .apply(|value| preset.delay = value);

        preset.natural_break = section.get_bool("natural-break", true);
        preset.disable_physics = section.get_bool("disable-physics", false);
        preset.apply_fortune = section.get_bool("apply-fortune", true);
        preset.drop_naturally = section.get_bool("drop-naturally", true);
        preset.handle_crops = section.get_bool("handle-crops", true);
        preset.check_solid_ground = section.get_bool("check-solid-ground", true);
        preset.regenerate_whole = section.get_bool("regenerate-whole", false);

        preset.sound = section.get_string("sound").map(str::to_string);
        preset.particle = section.get_string("particles").map(str::to_string);
        preset.regeneration_particle = section
            .get_string("regeneration-particles")
            .map(str::to_string);

        let mut conditions = PresetConditions::default();
        if let Some(tools) = section.get_string("tool-required") {
            conditions.set_tools_required(tools);
        }
        if let Some(enchants) = section.get_string("enchant-required") {
            conditions.set_enchants_required(enchants);
        }
        if let Some(jobs) = section.get_string("jobs-check") {
            conditions.set_jobs_required(jobs);
        }
        preset.conditions = conditions;

        preset.condition = self.load_conditions(section, "conditions")?;

        preset.rewards = self.load_rewards(section, preset.drop_naturally);

        if let Some(event_section) = section.get("event") {
            match self.load_event(event_section, &preset) {
                Ok(event) => {
                    self.events.insert(name.to_string(), event);
                }
                Err(err) => {
                    log::warn!("Failed to load event for preset {}: {}", name, err);
                }
            }
        }

        self.presets.insert(name.to_string(), preset);
        log::debug!("Loaded preset '{}'", name);
        Ok(())
    }

    /// Builds the guard condition tree; absent means always-true.
    fn load_conditions(&self, root: &ConfigNode, key: &str) -> ParseResult<Condition> {
        let Some(node) = root.get(key) else {
            return Ok(Condition::True);
        };
        Conditions::from_node(node, ConditionRelation::And, &self.conditions)
            .map_err(|err| err.under(key))
    }

    /// Parses a rewards subsection. Individual drop failures are logged and
    /// skipped; they never abort the remaining reward list.
    fn load_rewards(&self, section: &ConfigNode, drop_naturally_default: bool) -> PresetRewards {
        let mut rewards = PresetRewards {
            console_commands: section.string_or_list(&[
                "console-commands",
                "console-command",
                "commands",
                "command",
            ]),
            player_commands: section.string_or_list(&["player-commands", "player-command"]),
            ..PresetRewards::default()
        };

        LoadResult::try_load(section, "money", NumberValue::load)
            .warn_invalid("money")
            .if_not_full(NumberValue::fixed(0.0))
            .apply(|value| rewards.money = value);

        let Some(drop_section) = section.get("drop-item") else {
            return rewards;
        };

        if drop_section.contains("material") || drop_section.contains("item") {
            // Single-descriptor shape.
            match self.load_drop(drop_section, drop_naturally_default) {
                Ok(drop) => rewards.drops.push(drop),
                Err(err) => log::warn!("Failed to load drop item: {}", err),
            }
        } else {
            // One descriptor per child key.
            for (drop_name, drop_node) in drop_section.entries() {
                match self.load_drop(drop_node, drop_naturally_default) {
                    Ok(drop) => rewards.drops.push(drop),
                    Err(err) => {
                        log::warn!("Failed to load drop item '{}': {}", drop_name, err);
                    }
                }
            }
        }

        rewards
    }

    /// Parses one drop descriptor, either an external `prefix:id` reference
    /// or an intrinsic item description.
    fn load_drop(&self, section: &ConfigNode, drop_naturally_default: bool) -> ParseResult<DropItem> {
        let drop_naturally = section.get_bool("drop-naturally", drop_naturally_default);

        let kind = if let Some(item_node) = section.get("item") {
            let reference = item_node.as_str().ok_or_else(|| ParseError::InvalidValue {
                value: item_node.to_string(),
                details: "expected an external item reference".to_string(),
            })?;

            let (prefix, id) = reference.split_once(':').ok_or_else(|| {
                ParseError::InvalidValue {
                    value: reference.to_string(),
                    details: "expected 'prefix:id'".to_string(),
                }
            })?;

            let provider = self
                .items
                .get_provider(prefix)
                .ok_or_else(|| ParseError::InvalidPrefix {
                    prefix: prefix.to_string(),
                })?;

            if !provider.exists(id) {
                return Err(ParseError::UnknownExternalItem {
                    prefix: prefix.to_string(),
                    id: id.to_string(),
                });
            }

            DropItemKind::External {
                prefix: prefix.to_lowercase(),
                id: id.to_string(),
            }
        } else {
            let material_input = section
                .get_string("material")
                .ok_or_else(|| ParseError::MissingField {
                    field: "material".to_string(),
                })?;
            let material = self.materials.parse_placement(material_input)?;

            let mut item = ItemDrop::new(material);
            item.display_name = section.get_string("name").map(str::to_string);
            item.lore = section.get_string_list("lores");
            item.enchants = Enchant::load(&section.get_string_list("enchants"));
            item.flags = section.get_string_list("flags");
            item.item_model = section.get_string("item-model").map(str::to_string);

            if let Some(model_node) = section.get("custom-model-data") {
                item.custom_model_data = model_node
                    .as_i64()
                    .or_else(|| model_node.as_str().and_then(|text| text.parse().ok()));
                if item.custom_model_data.is_none() {
                    log::warn!("Could not parse custom-model-data from '{}'", model_node);
                }
            }

            item.experience = ExperienceDrop::load(section.get("exp"), drop_naturally);

            DropItemKind::Item(item)
        };

        let mut drop = DropItem::new(kind);
        drop.drop_naturally = drop_naturally;

        LoadResult::try_load(section, "chance", NumberValue::load)
            .warn_invalid("chance")
            .if_not_full(NumberValue::fixed(100.0))
            .apply(|value| drop.chance = value);

        LoadResult::try_load(section, "amount", NumberValue::load)
            .warn_invalid("amount")
            .if_not_full(NumberValue::fixed(1.0))
            .apply(|value| drop.amount = value);

        Ok(drop)
    }

    /// Builds a derived event; requires a display name. A failed event
    /// skips the event only, never the preset.
    fn load_event(&self, section: &ConfigNode, preset: &Preset) -> ParseResult<PresetEvent> {
        let display_name =
            section
                .get_string("event-name")
                .ok_or_else(|| ParseError::MissingField {
                    field: "event-name".to_string(),
                })?;

        let mut event = PresetEvent::new(&preset.name, display_name);
        event.double_drops = section.get_bool("double-drops", false);
        event.double_experience = section.get_bool("double-exp", false);
        event.boss_bar = Some(EventBossBar::load(
            section.get("bossbar"),
            &format!("Event {} is active!", display_name),
        ));

        if let Some(item_section) = section.get("custom-item") {
            event.item = Some(self.load_drop(item_section, preset.drop_naturally)?);
        }

        LoadResult::try_load(section, "custom-item.rarity", NumberValue::load)
            .warn_invalid("custom-item.rarity")
            .if_not_full(NumberValue::fixed(1.0))
            .apply(|value| event.item_rarity = value);

        event.rewards = self.load_rewards(section, preset.drop_naturally);

        Ok(event)
    }
}
