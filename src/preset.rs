use crate::conditions::Condition;
use crate::drop::{Enchant, PresetRewards};
use crate::material::{PlacementMaterial, TargetMaterial};
use crate::value::NumberValue;

/// An external-plugin job gate, `job` or `job;level`.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRequirement {
    pub job: String,
    pub level: i32,
}

impl JobRequirement {
    pub fn parse(input: &str) -> Option<JobRequirement> {
        let (job, level) = match input.split_once(';') {
            Some((job, level)) => (job.trim(), level.trim().parse::<i32>().ok()?),
            None => (input.trim(), 1),
        };

        if job.is_empty() {
            return None;
        }

        Some(JobRequirement {
            job: job.to_lowercase(),
            level,
        })
    }
}

/// Legacy shorthand gates carried on a preset, each independently optional.
///
/// These predate the generic `conditions` tree and are authored as
/// comma-separated strings; evaluation is up to the caller's providers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetConditions {
    pub tools_required: Vec<String>,
    pub enchants_required: Vec<Enchant>,
    pub jobs_required: Vec<JobRequirement>,
}

impl PresetConditions {
    pub fn set_tools_required(&mut self, input: &str) {
        self.tools_required = split_comma_list(input)
            .map(|tool| tool.to_uppercase())
            .collect();
    }

    pub fn set_enchants_required(&mut self, input: &str) {
        self.enchants_required = split_comma_list(input)
            .filter_map(|entry| {
                let enchant = Enchant::parse(entry);
                if enchant.is_none() {
                    log::warn!("Could not parse enchantment requirement from '{}'", entry);
                }
                enchant
            })
            .collect();
    }

    pub fn set_jobs_required(&mut self, input: &str) {
        self.jobs_required = split_comma_list(input)
            .filter_map(|entry| {
                let job = JobRequirement::parse(entry);
                if job.is_none() {
                    log::warn!("Could not parse job requirement from '{}'", entry);
                }
                job
            })
            .collect();
    }
}

fn split_comma_list(input: &str) -> impl Iterator<Item = &str> {
    input.split(',').map(str::trim).filter(|part| !part.is_empty())
}

/// A named, fully-configured rule entity: target selector, guard condition,
/// rewards, and regeneration behavior.
///
/// Built by the preset manager from one configuration subsection; immutable
/// once committed, replaced wholesale on reload.
#[derive(Debug, Clone)]
pub struct Preset {
    pub name: String,
    pub target_material: TargetMaterial,
    pub replace_material: Option<PlacementMaterial>,
    pub regen_material: Option<PlacementMaterial>,
    pub delay: NumberValue,

    pub natural_break: bool,
    pub disable_physics: bool,
    pub apply_fortune: bool,
    pub drop_naturally: bool,
    pub handle_crops: bool,
    pub check_solid_ground: bool,
    pub regenerate_whole: bool,

    pub sound: Option<String>,
    pub particle: Option<String>,
    pub regeneration_particle: Option<String>,

    pub conditions: PresetConditions,
    /// Guard condition; `Condition::True` when no `conditions` node is authored.
    pub condition: Condition,
    pub rewards: PresetRewards,
}

impl Preset {
    pub fn new(name: impl Into<String>, target_material: TargetMaterial) -> Self {
        Self {
            name: name.into(),
            target_material,
            replace_material: None,
            regen_material: None,
            delay: NumberValue::fixed(3.0),
            natural_break: true,
            disable_physics: false,
            apply_fortune: true,
            drop_naturally: true,
            handle_crops: true,
            check_solid_ground: true,
            regenerate_whole: false,
            sound: None,
            particle: None,
            regeneration_particle: None,
            conditions: PresetConditions::default(),
            condition: Condition::True,
            rewards: PresetRewards::default(),
        }
    }
}
