use crate::{
    IndexedVec, ItemData, ItemIdx, ItemKind, LocationData, LocationIdx, LocationKind, MapData,
    MapIdx, MapType, Profession, Race, SkillType, Spec, StartRace, Storyline, TraitTier,
    WeaponSlot, BASE_ID, MINIMUM_LOCATION_COUNT, MIST_FRAGMENT, TRAITS_PER_SPECIALIZATION,
};
use anyhow::{bail, Context, Result};
use hashbrown::HashMap;
use log::info;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use strum::IntoEnumIterator;

#[derive(Deserialize)]
struct WeaponEntry {
    name: String,
    slot: String,
    specs: Vec<String>,
}

#[derive(Deserialize)]
struct SpecializationEntry {
    profession: String,
    name: String,
    #[serde(default)]
    storyline: Option<String>,
    #[serde(default)]
    traits: Vec<String>,
}

#[derive(Deserialize)]
struct SkillGroupEntry {
    #[serde(default)]
    profession: Option<String>,
    #[serde(default)]
    elite_spec: Option<String>,
    #[serde(default)]
    race: Option<String>,
    #[serde(default)]
    healing: Vec<String>,
    #[serde(default)]
    utility: Vec<String>,
    #[serde(default)]
    elite: Vec<String>,
    #[serde(default)]
    legend: Vec<String>,
}

#[derive(Deserialize)]
struct MapEntry {
    id: usize,
    name: String,
    #[serde(rename = "type")]
    map_type: String,
    #[serde(default)]
    entrances: Vec<String>,
    storylines: Vec<String>,
    #[serde(default)]
    start: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct PooledLocationEntry {
    name: String,
    map: String,
}

#[derive(Deserialize)]
struct StorylineLocationsEntry {
    storyline: String,
    #[serde(default)]
    unique_items: Vec<PooledLocationEntry>,
    #[serde(default)]
    points_of_interest: Vec<PooledLocationEntry>,
}

// Raw JSON text of each content table.
#[derive(Clone, Copy)]
pub struct CatalogSources<'a> {
    pub weapons: &'a str,
    pub specializations: &'a str,
    pub skills: &'a str,
    pub maps: &'a str,
    pub locations: &'a str,
}

impl CatalogSources<'static> {
    pub fn embedded() -> CatalogSources<'static> {
        CatalogSources {
            weapons: include_str!("../data/weapons.json"),
            specializations: include_str!("../data/specializations.json"),
            skills: include_str!("../data/skills.json"),
            maps: include_str!("../data/maps.json"),
            locations: include_str!("../data/locations.json"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Specialization {
    pub profession: Profession,
    pub name: String,
    pub storyline: Option<Storyline>, // None for core specializations
    pub traits: Vec<ItemIdx>,
}

impl Specialization {
    pub fn is_elite(&self) -> bool {
        self.storyline.is_some()
    }
}

// Immutable table of every item, map and location the generator can use.
#[derive(Default, Clone)]
pub struct Catalog {
    pub items: Vec<ItemData>,
    pub item_isv: IndexedVec<String>,
    pub specializations: Vec<Specialization>,
    pub elite_spec_storylines: HashMap<String, Storyline>,
    pub maps: Vec<MapData>,
    pub map_isv: IndexedVec<String>,
    pub locations: Vec<LocationData>,
    pub location_isv: IndexedVec<String>,
    pub generic_locations: HashMap<(LocationKind, MapType), Vec<LocationIdx>>,
    pub unique_item_pools: HashMap<Storyline, Vec<LocationIdx>>,
    pub poi_pools: HashMap<Storyline, Vec<LocationIdx>>,
    pub mist_fragment_idx: ItemIdx,
}

fn read_table(base_path: &Path, filename: &str) -> Result<String> {
    let path = base_path.join(filename);
    std::fs::read_to_string(&path).with_context(|| format!("unable to read {}", path.display()))
}

fn parse_table<'a, T: Deserialize<'a>>(json_str: &'a str, table: &str) -> Result<T> {
    serde_json::from_str(json_str).with_context(|| format!("unable to parse {} table", table))
}

fn parse_storyline(text: &str) -> Result<Storyline> {
    match Storyline::from_text(text) {
        Some(s) => Ok(s),
        None => bail!("unrecognized storyline '{}'", text),
    }
}

fn parse_profession(text: &str) -> Result<Profession> {
    Profession::from_str(text).with_context(|| format!("unrecognized profession '{}'", text))
}

impl Catalog {
    pub fn load(base_path: &Path) -> Result<Catalog> {
        let weapons = read_table(base_path, "weapons.json")?;
        let specializations = read_table(base_path, "specializations.json")?;
        let skills = read_table(base_path, "skills.json")?;
        let maps = read_table(base_path, "maps.json")?;
        let locations = read_table(base_path, "locations.json")?;
        Catalog::from_sources(&CatalogSources {
            weapons: &weapons,
            specializations: &specializations,
            skills: &skills,
            maps: &maps,
            locations: &locations,
        })
    }

    pub fn load_embedded() -> Result<Catalog> {
        Catalog::from_sources(&CatalogSources::embedded())
    }

    pub fn from_sources(sources: &CatalogSources) -> Result<Catalog> {
        let mut catalog = Catalog::default();

        // Elite specializations must be known before weapons and skills can reference them.
        let spec_entries: Vec<SpecializationEntry> =
            parse_table(sources.specializations, "specializations")?;
        catalog.register_specializations(&spec_entries)?;

        // Item ids are assigned in this order:
        catalog.load_weapons(sources.weapons)?;
        catalog.load_traits(&spec_entries)?;
        catalog.load_skills(sources.skills)?;
        catalog.load_gear()?;
        catalog.load_maps(sources.maps)?;
        catalog.mist_fragment_idx = catalog.add_item(
            MIST_FRAGMENT,
            ItemKind::MistFragment,
            vec![],
            None,
            None,
        )?;

        catalog.create_generic_locations()?;
        catalog.load_storyline_locations(sources.locations)?;

        info!(
            "Loaded catalog: {} items, {} maps, {} locations",
            catalog.items.len(),
            catalog.maps.len(),
            catalog.locations.len()
        );
        Ok(catalog)
    }

    pub fn item_idx(&self, name: &str) -> Option<ItemIdx> {
        self.item_isv.index_by_key.get(name).copied()
    }

    pub fn map_idx(&self, name: &str) -> Option<MapIdx> {
        self.map_isv.index_by_key.get(name).copied()
    }

    pub fn specialization(&self, name: &str) -> Option<&Specialization> {
        self.specializations.iter().find(|s| s.name == name)
    }

    fn add_item(
        &mut self,
        name: &str,
        kind: ItemKind,
        specs: Vec<Spec>,
        race: Option<Race>,
        storyline: Option<Storyline>,
    ) -> Result<ItemIdx> {
        if self.item_isv.index_by_key.contains_key(name) {
            bail!("duplicate item name '{}'", name);
        }
        let idx = self.item_isv.add(name);
        self.items.push(ItemData {
            id: BASE_ID + idx as u64,
            name: name.to_string(),
            kind,
            quantity: 1,
            specs,
            race,
            storyline,
        });
        Ok(idx)
    }

    fn add_location(&mut self, location: LocationData) -> Result<LocationIdx> {
        if self.location_isv.index_by_key.contains_key(&location.name) {
            bail!("duplicate location name '{}'", location.name);
        }
        let idx = self.location_isv.add(&location.name);
        self.locations.push(LocationData {
            id: BASE_ID + idx as u64,
            ..location
        });
        Ok(idx)
    }

    fn register_specializations(&mut self, entries: &[SpecializationEntry]) -> Result<()> {
        for entry in entries {
            if let Some(storyline_str) = &entry.storyline {
                let storyline = parse_storyline(storyline_str)
                    .with_context(|| format!("in specialization '{}'", entry.name))?;
                if self
                    .elite_spec_storylines
                    .insert(entry.name.clone(), storyline)
                    .is_some()
                {
                    bail!("duplicate elite specialization '{}'", entry.name);
                }
            }
        }
        Ok(())
    }

    fn parse_item_spec(&self, text: &str) -> Result<Spec> {
        let spec = Spec::from_str(text)?;
        if let Some(elite_spec) = &spec.elite_spec {
            if !self.elite_spec_storylines.contains_key(elite_spec) {
                bail!("unknown elite specialization '{}'", elite_spec);
            }
        }
        Ok(spec)
    }

    fn load_weapons(&mut self, json_str: &str) -> Result<()> {
        let entries: Vec<WeaponEntry> = parse_table(json_str, "weapons")?;
        for entry in entries {
            let slot = WeaponSlot::from_text(&entry.slot)
                .with_context(|| format!("in weapon '{}'", entry.name))?;
            let specs = entry
                .specs
                .iter()
                .map(|s| self.parse_item_spec(s))
                .collect::<Result<Vec<Spec>>>()
                .with_context(|| format!("in weapon '{}'", entry.name))?;
            self.add_item(
                &slot.item_name(&entry.name),
                ItemKind::Weapon { slot },
                specs,
                None,
                None,
            )?;
        }
        Ok(())
    }

    fn load_traits(&mut self, entries: &[SpecializationEntry]) -> Result<()> {
        for entry in entries {
            let profession = parse_profession(&entry.profession)?;
            let storyline = self.elite_spec_storylines.get(&entry.name).copied();
            let trait_names: Vec<String> = if entry.traits.is_empty() {
                (0..TRAITS_PER_SPECIALIZATION)
                    .map(|i| format!("{:?} {}", TraitTier::from_index(i), i % 3 + 1))
                    .collect()
            } else if entry.traits.len() == TRAITS_PER_SPECIALIZATION {
                entry.traits.clone()
            } else {
                bail!(
                    "specialization '{}' lists {} traits, expected {}",
                    entry.name,
                    entry.traits.len(),
                    TRAITS_PER_SPECIALIZATION
                );
            };

            let mut traits = vec![];
            for (i, trait_name) in trait_names.iter().enumerate() {
                let idx = self.add_item(
                    &format!("{} {} Trait", trait_name, entry.name),
                    ItemKind::Trait {
                        tier: TraitTier::from_index(i),
                        specialization: entry.name.clone(),
                    },
                    vec![Spec {
                        profession,
                        elite_spec: None,
                    }],
                    None,
                    storyline,
                )?;
                traits.push(idx);
            }
            self.specializations.push(Specialization {
                profession,
                name: entry.name.clone(),
                storyline,
                traits,
            });
        }
        Ok(())
    }

    fn load_skills(&mut self, json_str: &str) -> Result<()> {
        let entries: Vec<SkillGroupEntry> = parse_table(json_str, "skills")?;
        for entry in entries {
            let (specs, race, storyline) = match (&entry.profession, &entry.race) {
                (Some(p), None) => {
                    let profession = parse_profession(p)?;
                    let storyline = match &entry.elite_spec {
                        Some(e) => match self.elite_spec_storylines.get(e) {
                            Some(s) => Some(*s),
                            None => bail!("unknown elite specialization '{}' in skills", e),
                        },
                        None => None,
                    };
                    let spec = Spec {
                        profession,
                        elite_spec: entry.elite_spec.clone(),
                    };
                    (vec![spec], None, storyline)
                }
                (None, Some(r)) => {
                    let race =
                        Race::from_str(r).with_context(|| format!("unrecognized race '{}'", r))?;
                    (vec![], Some(race), None)
                }
                _ => bail!("skill group must name exactly one of profession or race"),
            };
            let groups = [
                (SkillType::Healing, &entry.healing),
                (SkillType::Utility, &entry.utility),
                (SkillType::Elite, &entry.elite),
                (SkillType::Legend, &entry.legend),
            ];
            for (skill_type, names) in groups {
                for name in names {
                    self.add_item(
                        &skill_type.item_name(name),
                        ItemKind::Skill { skill_type },
                        specs.clone(),
                        race,
                        storyline,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn load_gear(&mut self) -> Result<()> {
        for slot in crate::GearSlot::iter() {
            self.add_item(slot.name(), ItemKind::Gear { slot }, vec![], None, None)?;
        }
        Ok(())
    }

    fn load_maps(&mut self, json_str: &str) -> Result<()> {
        let entries: Vec<MapEntry> = parse_table(json_str, "maps")?;
        for entry in &entries {
            if self.map_isv.index_by_key.contains_key(&entry.name) {
                bail!("duplicate map name '{}'", entry.name);
            }
            let map_type = MapType::from_text(&entry.map_type)
                .with_context(|| format!("in map '{}'", entry.name))?;
            let storylines = entry
                .storylines
                .iter()
                .map(|s| parse_storyline(s))
                .collect::<Result<Vec<Storyline>>>()
                .with_context(|| format!("in map '{}'", entry.name))?;
            let mut start = vec![];
            for (storyline_str, race_str) in &entry.start {
                start.push((parse_storyline(storyline_str)?, StartRace::from_text(race_str)?));
            }
            let map_idx = self.map_isv.add(&entry.name);
            let item_idx = self.add_item(&entry.name, ItemKind::Map { map_idx }, vec![], None, None)?;
            self.maps.push(MapData {
                id: entry.id,
                name: entry.name.clone(),
                map_type,
                entrances: entry.entrances.clone(),
                storylines,
                start,
                item_idx,
            });
        }
        for map in &self.maps {
            for entrance in &map.entrances {
                if !self.map_isv.index_by_key.contains_key(entrance) {
                    bail!("map '{}' has unknown entrance '{}'", map.name, entrance);
                }
            }
        }
        Ok(())
    }

    fn create_generic_locations(&mut self) -> Result<()> {
        for kind in LocationKind::iter().filter(|k| k.is_generic()) {
            for &map_type in kind.valid_map_types() {
                let mut idxs = vec![];
                for i in 1..=MINIMUM_LOCATION_COUNT {
                    let idx = self.add_location(LocationData {
                        id: 0,
                        name: format!("{} {} {}", map_type.name(), kind.name(), i),
                        kind,
                        map_type: Some(map_type),
                        map_idx: None,
                        storyline: None,
                    })?;
                    idxs.push(idx);
                }
                self.generic_locations.insert((kind, map_type), idxs);
            }
        }
        Ok(())
    }

    fn load_storyline_locations(&mut self, json_str: &str) -> Result<()> {
        let entries: Vec<StorylineLocationsEntry> = parse_table(json_str, "locations")?;
        for entry in &entries {
            let storyline = parse_storyline(&entry.storyline)?;
            let pools = [
                (LocationKind::UniqueItem, &entry.unique_items),
                (LocationKind::PointOfInterest, &entry.points_of_interest),
            ];
            for (kind, pooled) in pools {
                for loc in pooled {
                    let Some(map_idx) = self.map_idx(&loc.map) else {
                        bail!("location '{}' references unknown map '{}'", loc.name, loc.map);
                    };
                    let idx = self.add_location(LocationData {
                        id: 0,
                        name: loc.name.clone(),
                        kind,
                        map_type: None,
                        map_idx: Some(map_idx),
                        storyline: Some(storyline),
                    })?;
                    let pool = match kind {
                        LocationKind::UniqueItem => &mut self.unique_item_pools,
                        _ => &mut self.poi_pools,
                    };
                    pool.entry(storyline).or_default().push(idx);
                }
            }
        }
        Ok(())
    }
}
