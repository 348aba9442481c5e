use evalexpr::HashMapContext;

use crate::load_result::LoadResult;
use crate::material::PlacementMaterial;
use crate::node::ConfigNode;
use crate::value::NumberValue;

/// A parsed enchantment requirement or drop enchantment, `NAME` or `NAME;level`.
#[derive(Debug, Clone, PartialEq)]
pub struct Enchant {
    pub name: String,
    pub level: i32,
}

impl Enchant {
    pub fn parse(input: &str) -> Option<Enchant> {
        let (name, level) = match input.split_once(';') {
            Some((name, level)) => (name.trim(), level.trim().parse::<i32>().ok()?),
            None => (input.trim(), 1),
        };

        if name.is_empty() {
            return None;
        }

        Some(Enchant {
            name: name.to_lowercase(),
            level,
        })
    }

    /// Parses a list of enchantment strings best-effort: malformed entries
    /// are logged and skipped, never failing the surrounding drop.
    pub fn load(values: &[String]) -> Vec<Enchant> {
        values
            .iter()
            .filter_map(|value| {
                let enchant = Enchant::parse(value);
                if enchant.is_none() {
                    log::warn!("Could not parse enchantment from '{}'", value);
                }
                enchant
            })
            .collect()
    }
}

/// An experience amount dropped alongside an item.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperienceDrop {
    pub amount: NumberValue,
    pub drop_naturally: bool,
}

impl ExperienceDrop {
    pub fn load(node: Option<&ConfigNode>, drop_naturally_default: bool) -> Option<ExperienceDrop> {
        let node = node?;
        let amount = LoadResult::try_load(node, "amount", NumberValue::load)
            .warn_invalid("exp.amount")
            .if_not_full(NumberValue::fixed(0.0))
            .full()?;

        Some(ExperienceDrop {
            amount,
            drop_naturally: node.get_bool("drop-naturally", drop_naturally_default),
        })
    }
}

/// An intrinsic item description, realized by the caller's item system.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDrop {
    pub material: PlacementMaterial,
    pub display_name: Option<String>,
    pub lore: Vec<String>,
    pub enchants: Vec<Enchant>,
    pub flags: Vec<String>,
    pub custom_model_data: Option<i64>,
    pub item_model: Option<String>,
    pub experience: Option<ExperienceDrop>,
}

impl ItemDrop {
    pub fn new(material: PlacementMaterial) -> Self {
        Self {
            material,
            display_name: None,
            lore: Vec::new(),
            enchants: Vec::new(),
            flags: Vec::new(),
            custom_model_data: None,
            item_model: None,
            experience: None,
        }
    }
}

/// The two concrete drop shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum DropItemKind {
    /// Described inline in the preset.
    Item(ItemDrop),
    /// Delegated to an external item provider, existence-checked at load.
    External { prefix: String, id: String },
}

/// One rewarded item entry with an independent chance and amount.
#[derive(Debug, Clone, PartialEq)]
pub struct DropItem {
    pub kind: DropItemKind,
    /// Trigger probability in percent, rolled independently per descriptor.
    pub chance: NumberValue,
    pub amount: NumberValue,
    pub drop_naturally: bool,
}

impl DropItem {
    pub fn new(kind: DropItemKind) -> Self {
        Self {
            kind,
            chance: NumberValue::fixed(100.0),
            amount: NumberValue::fixed(1.0),
            drop_naturally: true,
        }
    }

    pub fn should_drop(&self) -> bool {
        self.should_drop_with(&HashMapContext::new())
    }

    pub fn should_drop_with(&self, context: &HashMapContext) -> bool {
        use rand::Rng;
        let chance = self.chance.get_double_with(context).clamp(0.0, 100.0);
        rand::rng().random_bool(chance / 100.0)
    }

    pub fn pick_amount(&self) -> i64 {
        self.pick_amount_with(&HashMapContext::new())
    }

    pub fn pick_amount_with(&self, context: &HashMapContext) -> i64 {
        self.amount.get_int_with(context).max(0)
    }
}

/// Everything a preset hands out on a successful break.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetRewards {
    pub drops: Vec<DropItem>,
    /// Raw command templates, expanded by the caller.
    pub console_commands: Vec<String>,
    pub player_commands: Vec<String>,
    pub money: NumberValue,
}

impl Default for PresetRewards {
    fn default() -> Self {
        Self {
            drops: Vec::new(),
            console_commands: Vec::new(),
            player_commands: Vec::new(),
            money: NumberValue::fixed(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enchant_parse_shapes() {
        assert_eq!(
            Enchant::parse("FORTUNE;2"),
            Some(Enchant { name: "fortune".to_string(), level: 2 })
        );
        assert_eq!(
            Enchant::parse("silk_touch"),
            Some(Enchant { name: "silk_touch".to_string(), level: 1 })
        );
        assert_eq!(Enchant::parse("fortune;abc"), None);
        assert_eq!(Enchant::parse(";3"), None);
    }

    #[test]
    fn test_enchant_load_skips_malformed_entries() {
        let parsed = Enchant::load(&[
            "FORTUNE;2".to_string(),
            "bogus;x".to_string(),
            "MENDING".to_string(),
        ]);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name, "fortune");
        assert_eq!(parsed[1].name, "mending");
    }

    #[test]
    fn test_chance_extremes() {
        let mut always = DropItem::new(DropItemKind::External {
            prefix: "econ".to_string(),
            id: "coin".to_string(),
        });
        always.chance = NumberValue::fixed(100.0);
        let mut never = always.clone();
        never.chance = NumberValue::fixed(0.0);

        for _ in 0..50 {
            assert!(always.should_drop());
            assert!(!never.should_drop());
        }
    }

    #[test]
    fn test_amount_never_negative() {
        let mut drop = DropItem::new(DropItemKind::External {
            prefix: "econ".to_string(),
            id: "coin".to_string(),
        });
        drop.amount = NumberValue::fixed(-3.0);
        assert_eq!(drop.pick_amount(), 0);
    }
}
