use anyhow::Result;
use gw2rando_game::{Profession, Race, Storyline, WeaponSlot};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub const MAX_LOCATION_WEIGHT: u32 = 1000;
pub const MAX_QUESTS: usize = 100;
pub const MIN_MIST_FRAGMENTS: usize = 1;
pub const MAX_MIST_FRAGMENTS: usize = 100;
pub const MAX_EXTRA_MIST_FRAGMENT_PERCENT: usize = 100;

// Which storylines contribute storyline-tagged items (elite specializations and their skills).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorylineItems {
    All,
    Core,
    Storyline,
    StorylinePlus,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GroupContent {
    None,
    FiveMan,
    TenMan,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealSkillPolicy {
    Pool,
    Early,
    Starting,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GearSlotsPolicy {
    Pool,
    Early,
    Starting,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StartingMainhandWeapon {
    None,
    Axe,
    Dagger,
    Mace,
    Pistol,
    Sword,
    Scepter,
    Greatsword,
    Hammer,
    Longbow,
    Rifle,
    ShortBow,
    Staff,
    #[serde(alias = "random")]
    RandomProficient,
    RandomProficientOneHanded,
    RandomProficientTwoHanded,
}

impl StartingMainhandWeapon {
    // Item name for an explicitly chosen weapon.
    pub fn item_name(self) -> Option<String> {
        let (slot, weapon) = match self {
            StartingMainhandWeapon::Axe => (WeaponSlot::Mainhand, "Axe"),
            StartingMainhandWeapon::Dagger => (WeaponSlot::Mainhand, "Dagger"),
            StartingMainhandWeapon::Mace => (WeaponSlot::Mainhand, "Mace"),
            StartingMainhandWeapon::Pistol => (WeaponSlot::Mainhand, "Pistol"),
            StartingMainhandWeapon::Sword => (WeaponSlot::Mainhand, "Sword"),
            StartingMainhandWeapon::Scepter => (WeaponSlot::Mainhand, "Scepter"),
            StartingMainhandWeapon::Greatsword => (WeaponSlot::TwoHanded, "Greatsword"),
            StartingMainhandWeapon::Hammer => (WeaponSlot::TwoHanded, "Hammer"),
            StartingMainhandWeapon::Longbow => (WeaponSlot::TwoHanded, "Longbow"),
            StartingMainhandWeapon::Rifle => (WeaponSlot::TwoHanded, "Rifle"),
            StartingMainhandWeapon::ShortBow => (WeaponSlot::TwoHanded, "Short Bow"),
            StartingMainhandWeapon::Staff => (WeaponSlot::TwoHanded, "Staff"),
            _ => return None,
        };
        Some(slot.item_name(weapon))
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StartingOffhandWeapon {
    None,
    Axe,
    Dagger,
    Focus,
    Mace,
    Pistol,
    Shield,
    Sword,
    Torch,
    Warhorn,
    #[serde(alias = "random")]
    RandomProficient,
}

impl StartingOffhandWeapon {
    pub fn item_name(self) -> Option<String> {
        let weapon = match self {
            StartingOffhandWeapon::Axe => "Axe",
            StartingOffhandWeapon::Dagger => "Dagger",
            StartingOffhandWeapon::Focus => "Focus",
            StartingOffhandWeapon::Mace => "Mace",
            StartingOffhandWeapon::Pistol => "Pistol",
            StartingOffhandWeapon::Shield => "Shield",
            StartingOffhandWeapon::Sword => "Sword",
            StartingOffhandWeapon::Torch => "Torch",
            StartingOffhandWeapon::Warhorn => "Warhorn",
            StartingOffhandWeapon::None | StartingOffhandWeapon::RandomProficient => return None,
        };
        Some(WeaponSlot::Offhand.item_name(weapon))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationSettings {
    pub character_profession: Profession,
    pub character_race: Race,
    pub storyline: Storyline,
    #[serde(alias = "storyline_items_policy")]
    pub storyline_items: StorylineItems,
    #[serde(alias = "group_content_tier")]
    pub group_content: GroupContent,
    pub include_competitive: bool,
    pub achievement_weight: u32,
    pub quest_weight: u32,
    pub min_quests: usize,
    pub max_quests: usize,
    pub training_weight: u32,
    pub world_boss_weight: u32,
    pub unique_item_weight: u32,
    pub poi_weight: u32,
    pub mist_fragments_required: usize,
    pub extra_mist_fragment_percent: usize,
    #[serde(alias = "heal_skill_policy")]
    pub heal_skill: HealSkillPolicy,
    pub heal_skill_name: Option<String>, // e.g. "Med Kit"; random when absent
    #[serde(alias = "gear_slots_policy")]
    pub gear_slots: GearSlotsPolicy,
    pub starting_mainhand_weapon: StartingMainhandWeapon,
    pub starting_offhand_weapon: StartingOffhandWeapon,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        GenerationSettings {
            character_profession: Profession::Engineer,
            character_race: Race::Charr,
            storyline: Storyline::Core,
            storyline_items: StorylineItems::Storyline,
            group_content: GroupContent::None,
            include_competitive: false,
            achievement_weight: 500,
            quest_weight: 100,
            min_quests: 0,
            max_quests: 0,
            training_weight: 0,
            world_boss_weight: 250,
            unique_item_weight: 100,
            poi_weight: 100,
            mist_fragments_required: 10,
            extra_mist_fragment_percent: 20,
            heal_skill: HealSkillPolicy::Pool,
            heal_skill_name: None,
            gear_slots: GearSlotsPolicy::Pool,
            starting_mainhand_weapon: StartingMainhandWeapon::RandomProficient,
            starting_offhand_weapon: StartingOffhandWeapon::RandomProficient,
        }
    }
}

fn clamp_option<T: PartialOrd + Copy + Debug>(
    name: &str,
    value: &mut T,
    min: T,
    max: T,
    warnings: &mut Vec<String>,
) {
    let clamped = if *value < min {
        min
    } else if *value > max {
        max
    } else {
        return;
    };
    let msg = format!(
        "{} = {:?} is outside [{:?}, {:?}]; using {:?}",
        name, value, min, max, clamped
    );
    warn!("{}", msg);
    warnings.push(msg);
    *value = clamped;
}

impl GenerationSettings {
    // Fixes option values that can be corrected without failing the generation,
    // returning a description of each change.
    pub fn normalize(&mut self) -> Vec<String> {
        let mut warnings = vec![];
        for (name, weight) in [
            ("achievement_weight", &mut self.achievement_weight),
            ("quest_weight", &mut self.quest_weight),
            ("training_weight", &mut self.training_weight),
            ("world_boss_weight", &mut self.world_boss_weight),
            ("unique_item_weight", &mut self.unique_item_weight),
            ("poi_weight", &mut self.poi_weight),
        ] {
            clamp_option(name, weight, 0, MAX_LOCATION_WEIGHT, &mut warnings);
        }
        clamp_option("min_quests", &mut self.min_quests, 0, MAX_QUESTS, &mut warnings);
        clamp_option("max_quests", &mut self.max_quests, 0, MAX_QUESTS, &mut warnings);
        clamp_option(
            "mist_fragments_required",
            &mut self.mist_fragments_required,
            MIN_MIST_FRAGMENTS,
            MAX_MIST_FRAGMENTS,
            &mut warnings,
        );
        clamp_option(
            "extra_mist_fragment_percent",
            &mut self.extra_mist_fragment_percent,
            0,
            MAX_EXTRA_MIST_FRAGMENT_PERCENT,
            &mut warnings,
        );
        if self.min_quests > self.max_quests {
            let msg = format!(
                "min_quests ({}) is greater than max_quests ({}); raising max_quests to {}",
                self.min_quests, self.max_quests, self.min_quests
            );
            warn!("{}", msg);
            warnings.push(msg);
            self.max_quests = self.min_quests;
        }
        if self.heal_skill_name.is_some() && self.heal_skill == HealSkillPolicy::Pool {
            let msg = "heal_skill_name is ignored when heal_skill is 'pool'".to_string();
            warn!("{}", msg);
            warnings.push(msg);
        }
        warnings
    }
}

pub fn parse_generation_settings(settings_json: &str) -> Result<GenerationSettings> {
    let mut des = serde_json::Deserializer::from_str(settings_json);
    let settings = serde_path_to_error::deserialize(&mut des)?;
    Ok(settings)
}
