pub mod catalog;
pub mod util;

use anyhow::{bail, Context, Result};
use hashbrown::HashMap;
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use std::borrow::ToOwned;
use std::hash::Hash;
use std::str::FromStr;
use strum_macros::{EnumIter, EnumString, VariantNames};

pub use catalog::Catalog;

pub type ItemId = u64; // Numeric id exposed to the multiworld host
pub type LocationId = u64; // Numeric id exposed to the multiworld host
pub type ItemIdx = usize; // Index into Catalog.items
pub type MapIdx = usize; // Index into Catalog.maps
pub type LocationIdx = usize; // Index into Catalog.locations
pub type PlayerId = usize;

pub const BASE_ID: u64 = 3_828_179_903_462_517;
pub const MINIMUM_LOCATION_COUNT: usize = 150;
pub const TRAITS_PER_SPECIALIZATION: usize = 9;
pub const MIST_FRAGMENT: &str = "Mist Fragment";

#[derive(Default, Clone, Debug)]
pub struct IndexedVec<T: Hash + Eq> {
    pub keys: Vec<T>,
    pub index_by_key: HashMap<T, usize>,
}

impl<T: Hash + Eq> IndexedVec<T> {
    pub fn add<U: ToOwned<Owned = T> + ?Sized>(&mut self, name: &U) -> usize {
        if !self.index_by_key.contains_key(&name.to_owned()) {
            let idx = self.keys.len();
            self.index_by_key.insert(name.to_owned(), self.keys.len());
            self.keys.push(name.to_owned());
            idx
        } else {
            self.index_by_key[&name.to_owned()]
        }
    }
}

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    EnumIter,
    VariantNames,
    TryFromPrimitive,
    Serialize,
    Deserialize,
    PartialOrd,
    Ord,
)]
#[repr(usize)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Profession {
    Warrior,
    Guardian,
    Revenant,
    Thief,
    Engineer,
    Ranger,
    Mesmer,
    Elementalist,
    Necromancer,
}

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    EnumIter,
    VariantNames,
    TryFromPrimitive,
    Serialize,
    Deserialize,
    PartialOrd,
    Ord,
)]
#[repr(usize)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Race {
    Asura,
    Charr,
    Human,
    Norn,
    Sylvari,
}

// Note: the ordering of these variants is significant; "storyline_plus" includes
// every storyline that sorts at or before the selected one.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    VariantNames,
    TryFromPrimitive,
    Serialize,
    Deserialize,
    PartialOrd,
    Ord,
)]
#[repr(usize)]
#[serde(rename_all = "snake_case")]
pub enum Storyline {
    Core,
    #[serde(alias = "season_1")]
    Season1,
    #[serde(alias = "season_2")]
    Season2,
    HeartOfThorns,
    #[serde(alias = "season_3")]
    Season3,
    PathOfFire,
    #[serde(alias = "season_4")]
    Season4,
    IcebroodSaga,
    EndOfDragons,
    SecretsOfTheObscure,
    JanthirWilds,
    VisionsOfEternity,
}

impl Storyline {
    pub fn from_text(text: &str) -> Option<Storyline> {
        let key: String = text
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "core" => Some(Storyline::Core),
            "season1" | "s1" => Some(Storyline::Season1),
            "season2" | "s2" => Some(Storyline::Season2),
            "heartofthorns" | "hot" => Some(Storyline::HeartOfThorns),
            "season3" | "s3" => Some(Storyline::Season3),
            "pathoffire" | "pof" => Some(Storyline::PathOfFire),
            "season4" | "s4" => Some(Storyline::Season4),
            "icebroodsaga" | "ibs" => Some(Storyline::IcebroodSaga),
            "endofdragons" | "eod" => Some(Storyline::EndOfDragons),
            "secretsoftheobscure" | "soto" => Some(Storyline::SecretsOfTheObscure),
            "janthirwilds" | "jw" => Some(Storyline::JanthirWilds),
            "visionsofeternity" | "voe" => Some(Storyline::VisionsOfEternity),
            _ => None,
        }
    }

    // Living World seasons are played from inside the expansion that precedes them.
    pub fn prerequisite(self) -> Option<Storyline> {
        match self {
            Storyline::Season3 => Some(Storyline::HeartOfThorns),
            Storyline::Season4 | Storyline::IcebroodSaga => Some(Storyline::PathOfFire),
            _ => None,
        }
    }

    pub fn owned(self) -> Vec<Storyline> {
        let mut out = vec![Storyline::Core, self];
        out.extend(self.prerequisite());
        out.sort();
        out.dedup();
        out
    }
}

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    VariantNames,
    Serialize,
    Deserialize,
    PartialOrd,
    Ord,
)]
#[serde(rename_all = "snake_case")]
pub enum MapType {
    OpenWorld,
    Story,
    Fractal,
    StrikeMission,
    Dungeon,
    Raid,
    Wvw,
    Pvp,
}

impl MapType {
    pub fn from_text(text: &str) -> Result<MapType> {
        Ok(match text {
            "Open World" | "City" | "Convergence" => MapType::OpenWorld,
            "Story" | "Dragon Response Mission" => MapType::Story,
            "Fractal" => MapType::Fractal,
            "Strike Mission" => MapType::StrikeMission,
            "Dungeon" => MapType::Dungeon,
            "Raid" => MapType::Raid,
            "WvW" => MapType::Wvw,
            "PvP" => MapType::Pvp,
            _ => bail!("unrecognized map type '{}'", text),
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            MapType::OpenWorld => "Open World",
            MapType::Story => "Story",
            MapType::Fractal => "Fractal",
            MapType::StrikeMission => "Strike Mission",
            MapType::Dungeon => "Dungeon",
            MapType::Raid => "Raid",
            MapType::Wvw => "WvW",
            MapType::Pvp => "PvP",
        }
    }

    pub fn is_group_content(self) -> bool {
        matches!(
            self,
            MapType::Fractal
                | MapType::Dungeon
                | MapType::StrikeMission
                | MapType::Raid
                | MapType::Pvp
        )
    }

    pub fn is_ten_man(self) -> bool {
        matches!(self, MapType::StrikeMission | MapType::Raid)
    }

    pub fn is_competitive(self) -> bool {
        matches!(self, MapType::Pvp | MapType::Wvw)
    }
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize, PartialOrd, Ord,
)]
pub enum WeaponSlot {
    Mainhand,
    Offhand,
    TwoHanded,
}

impl WeaponSlot {
    pub fn from_text(text: &str) -> Result<WeaponSlot> {
        Ok(match text {
            "Mainhand" => WeaponSlot::Mainhand,
            "Offhand" => WeaponSlot::Offhand,
            "TwoHanded" => WeaponSlot::TwoHanded,
            _ => bail!("unrecognized weapon slot '{}'", text),
        })
    }

    pub fn item_name(self, weapon: &str) -> String {
        let prefix = match self {
            WeaponSlot::Mainhand => "Mainhand",
            WeaponSlot::Offhand => "Offhand",
            WeaponSlot::TwoHanded => "TwoHanded",
        };
        format!("{} {}", prefix, weapon)
    }
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize, PartialOrd, Ord,
)]
pub enum SkillType {
    Healing,
    Utility,
    Elite,
    Legend,
}

impl SkillType {
    pub fn item_name(self, skill: &str) -> String {
        format!("{} {:?} Skill", skill, self)
    }
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize, PartialOrd, Ord,
)]
pub enum TraitTier {
    Adept,
    Master,
    Grandmaster,
}

impl TraitTier {
    // Trait lists are authored three per tier, in tier order.
    pub fn from_index(idx: usize) -> TraitTier {
        match idx / 3 {
            0 => TraitTier::Adept,
            1 => TraitTier::Master,
            _ => TraitTier::Grandmaster,
        }
    }
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize, PartialOrd, Ord,
)]
pub enum GearSlot {
    Head,
    Shoulders,
    Chest,
    Gloves,
    Legs,
    Boots,
    Back,
    Ring1,
    Ring2,
    Amulet,
    Accessory1,
    Accessory2,
    Relic,
    AquaBreather,
}

impl GearSlot {
    pub fn name(self) -> &'static str {
        match self {
            GearSlot::Head => "Head",
            GearSlot::Shoulders => "Shoulders",
            GearSlot::Chest => "Chest",
            GearSlot::Gloves => "Gloves",
            GearSlot::Legs => "Legs",
            GearSlot::Boots => "Boots",
            GearSlot::Back => "Back",
            GearSlot::Ring1 => "Ring 1",
            GearSlot::Ring2 => "Ring 2",
            GearSlot::Amulet => "Amulet",
            GearSlot::Accessory1 => "Accessory 1",
            GearSlot::Accessory2 => "Accessory 2",
            GearSlot::Relic => "Relic",
            GearSlot::AquaBreather => "Aqua Breather",
        }
    }
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize, PartialOrd, Ord,
)]
pub enum LocationKind {
    Achievement,
    Quest,
    Training,
    WorldBoss,
    UniqueItem,
    PointOfInterest,
}

impl LocationKind {
    pub fn name(self) -> &'static str {
        match self {
            LocationKind::Achievement => "Achievement",
            LocationKind::Quest => "Quest",
            LocationKind::Training => "Training",
            LocationKind::WorldBoss => "World Boss",
            LocationKind::UniqueItem => "Unique Item",
            LocationKind::PointOfInterest => "Point of Interest",
        }
    }

    // Categories in which generic locations of this kind are stamped out. Unique
    // items and points of interest are authored per map instead.
    pub fn valid_map_types(self) -> &'static [MapType] {
        match self {
            LocationKind::Achievement => &[
                MapType::OpenWorld,
                MapType::Story,
                MapType::Fractal,
                MapType::StrikeMission,
                MapType::Dungeon,
                MapType::Raid,
                MapType::Wvw,
                MapType::Pvp,
            ],
            LocationKind::Quest => &[MapType::Story],
            LocationKind::Training | LocationKind::WorldBoss => &[MapType::OpenWorld],
            LocationKind::UniqueItem | LocationKind::PointOfInterest => &[],
        }
    }

    pub fn is_generic(self) -> bool {
        !self.valid_map_types().is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Spec {
    pub profession: Profession,
    pub elite_spec: Option<String>,
}

// Accepts "Engineer" or "Engineer/Mechanist".
impl FromStr for Spec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Spec> {
        let (profession_str, elite_spec) = match s.split_once('/') {
            Some((p, e)) => (p, Some(e.trim().to_string())),
            None => (s, None),
        };
        let profession = Profession::from_str(profession_str.trim())
            .with_context(|| format!("unrecognized profession in spec '{}'", s))?;
        Ok(Spec {
            profession,
            elite_spec,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Weapon {
        slot: WeaponSlot,
    },
    Skill {
        skill_type: SkillType,
    },
    Trait {
        tier: TraitTier,
        specialization: String,
    },
    Gear {
        slot: GearSlot,
    },
    Map {
        map_idx: MapIdx,
    },
    MistFragment,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemData {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    pub quantity: usize,
    pub specs: Vec<Spec>,
    pub race: Option<Race>,
    pub storyline: Option<Storyline>,
}

impl ItemData {
    pub fn elite_specs_for(&self, profession: Profession) -> impl Iterator<Item = &str> {
        self.specs
            .iter()
            .filter(move |s| s.profession == profession)
            .filter_map(|s| s.elite_spec.as_deref())
    }

    pub fn has_core_spec(&self, profession: Profession) -> bool {
        self.specs
            .iter()
            .any(|s| s.profession == profession && s.elite_spec.is_none())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartRace {
    Any,
    Race(Race),
}

impl StartRace {
    pub fn from_text(text: &str) -> Result<StartRace> {
        if text.eq_ignore_ascii_case("any") {
            return Ok(StartRace::Any);
        }
        let race = Race::from_str(text)
            .with_context(|| format!("unrecognized start race '{}'", text))?;
        Ok(StartRace::Race(race))
    }

    pub fn matches(&self, race: Race) -> bool {
        match self {
            StartRace::Any => true,
            StartRace::Race(r) => *r == race,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapData {
    pub id: usize,
    pub name: String,
    pub map_type: MapType,
    pub entrances: Vec<String>,
    pub storylines: Vec<Storyline>,
    pub start: Vec<(Storyline, StartRace)>,
    pub item_idx: ItemIdx,
}

impl MapData {
    pub fn is_start_for(&self, storyline: Storyline, race: Race) -> bool {
        self.start
            .iter()
            .any(|(s, r)| *s == storyline && r.matches(race))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocationData {
    pub id: LocationId,
    pub name: String,
    pub kind: LocationKind,
    pub map_type: Option<MapType>, // Category region for generic locations
    pub map_idx: Option<MapIdx>,   // Authored map for pooled locations
    pub storyline: Option<Storyline>,
}
