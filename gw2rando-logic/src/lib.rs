pub mod helpers;
pub mod rules;

use gw2rando_game::{
    Catalog, ItemData, ItemKind, MapType, PlayerId, Profession, SkillType, Storyline, WeaponSlot,
};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

pub use rules::{Logic, Rule};

// Read-only view of the items a player has collected so far. The multiworld
// host owns the real state; `Inventory` is the in-crate implementation.
pub trait CollectionState {
    fn count(&self, item: &str, player: PlayerId) -> usize;

    fn has(&self, item: &str, player: PlayerId, count: usize) -> bool {
        self.count(item, player) >= count
    }

    fn has_all(&self, items: &[String], player: PlayerId) -> bool {
        items.iter().all(|x| self.has(x, player, 1))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Inventory {
    counts: HashMap<PlayerId, HashMap<String, usize>>,
}

impl Inventory {
    pub fn collect(&mut self, item: &str, player: PlayerId, count: usize) {
        *self
            .counts
            .entry(player)
            .or_default()
            .entry(item.to_string())
            .or_insert(0) += count;
    }
}

impl CollectionState for Inventory {
    fn count(&self, item: &str, player: PlayerId) -> usize {
        self.counts
            .get(&player)
            .and_then(|m| m.get(item))
            .copied()
            .unwrap_or(0)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LoadoutWeapon {
    pub name: String,
    pub core: bool, // Usable without any elite specialization
    pub elite_specs: Vec<String>,
}

impl LoadoutWeapon {
    pub fn usable_with(&self, elite_spec: Option<&str>) -> bool {
        self.core || elite_spec.is_some_and(|e| self.elite_specs.iter().any(|x| x == e))
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WeaponLoadout {
    pub mainhand: Vec<LoadoutWeapon>,
    pub offhand: Vec<LoadoutWeapon>,
    pub two_handed: Vec<LoadoutWeapon>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LoadoutSkill {
    pub name: String,
    pub elite_spec: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SkillLoadout {
    pub healing: Vec<LoadoutSkill>,
    pub utility: Vec<LoadoutSkill>,
    pub elite: Vec<LoadoutSkill>,
    pub legend: Vec<LoadoutSkill>,
}

impl SkillLoadout {
    pub fn group(&self, skill_type: SkillType) -> &[LoadoutSkill] {
        match skill_type {
            SkillType::Healing => &self.healing,
            SkillType::Utility => &self.utility,
            SkillType::Elite => &self.elite,
            SkillType::Legend => &self.legend,
        }
    }

    fn group_mut(&mut self, skill_type: SkillType) -> &mut Vec<LoadoutSkill> {
        match skill_type {
            SkillType::Healing => &mut self.healing,
            SkillType::Utility => &mut self.utility,
            SkillType::Elite => &mut self.elite,
            SkillType::Legend => &mut self.legend,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SpecLoadout {
    pub name: String,
    pub tiers: [Vec<String>; 3], // Trait item names, indexed by TraitTier
}

impl SpecLoadout {
    pub fn traits(&self) -> impl Iterator<Item = &String> {
        self.tiers.iter().flatten()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoadoutMap {
    pub name: String,
    pub map_type: MapType,
    pub storylines: Vec<Storyline>,
}

// Everything a single player could ever use, grouped the way the build rules ask for it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Loadout {
    pub profession: Profession,
    pub weapons: WeaponLoadout,
    pub skills: SkillLoadout,
    pub core_specs: Vec<SpecLoadout>,
    pub elite_specs: Vec<SpecLoadout>,
    pub gear: Vec<String>,
    pub maps: Vec<LoadoutMap>,
}

impl Loadout {
    pub fn new(
        catalog: &Catalog,
        profession: Profession,
        is_usable: impl Fn(&ItemData) -> bool,
    ) -> Loadout {
        let mut loadout = Loadout {
            profession,
            weapons: WeaponLoadout::default(),
            skills: SkillLoadout::default(),
            core_specs: vec![],
            elite_specs: vec![],
            gear: vec![],
            maps: vec![],
        };
        for item in catalog.items.iter().filter(|x| is_usable(*x)) {
            match &item.kind {
                ItemKind::Weapon { slot } => {
                    let weapon = LoadoutWeapon {
                        name: item.name.clone(),
                        core: item.has_core_spec(profession),
                        elite_specs: item
                            .elite_specs_for(profession)
                            .map(|x| x.to_string())
                            .collect(),
                    };
                    match slot {
                        WeaponSlot::Mainhand => loadout.weapons.mainhand.push(weapon),
                        WeaponSlot::Offhand => loadout.weapons.offhand.push(weapon),
                        WeaponSlot::TwoHanded => loadout.weapons.two_handed.push(weapon),
                    }
                }
                ItemKind::Skill { skill_type } => {
                    let elite_spec = item.elite_specs_for(profession).next().map(|x| x.to_string());
                    loadout.skills.group_mut(*skill_type).push(LoadoutSkill {
                        name: item.name.clone(),
                        elite_spec,
                    });
                }
                ItemKind::Trait {
                    tier,
                    specialization,
                } => {
                    let is_elite = catalog.elite_spec_storylines.contains_key(specialization);
                    let specs = if is_elite {
                        &mut loadout.elite_specs
                    } else {
                        &mut loadout.core_specs
                    };
                    let spec_idx = match specs.iter().position(|s| &s.name == specialization) {
                        Some(i) => i,
                        None => {
                            specs.push(SpecLoadout {
                                name: specialization.clone(),
                                tiers: Default::default(),
                            });
                            specs.len() - 1
                        }
                    };
                    specs[spec_idx].tiers[*tier as usize].push(item.name.clone());
                }
                ItemKind::Gear { .. } => loadout.gear.push(item.name.clone()),
                ItemKind::Map { map_idx } => {
                    let map = &catalog.maps[*map_idx];
                    loadout.maps.push(LoadoutMap {
                        name: map.name.clone(),
                        map_type: map.map_type,
                        storylines: map.storylines.clone(),
                    });
                }
                ItemKind::MistFragment => {}
            }
        }
        loadout
    }

    pub fn elite_spec(&self, name: &str) -> Option<&SpecLoadout> {
        self.elite_specs.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_counts() {
        let mut inventory = Inventory::default();
        inventory.collect("Mist Fragment", 1, 2);
        inventory.collect("Mist Fragment", 1, 1);
        inventory.collect("Queensdale", 2, 1);
        assert_eq!(inventory.count("Mist Fragment", 1), 3);
        assert!(inventory.has("Mist Fragment", 1, 3));
        assert!(!inventory.has("Mist Fragment", 1, 4));
        assert!(!inventory.has("Queensdale", 1, 1));
        assert!(inventory.has_all(&["Queensdale".to_string()], 2));
    }

    #[test]
    fn test_loadout_from_catalog() {
        let catalog = Catalog::load_embedded().unwrap();
        let loadout = Loadout::new(&catalog, Profession::Engineer, |item| {
            item.specs.is_empty() || item.specs.iter().any(|s| s.profession == Profession::Engineer)
        });
        assert_eq!(loadout.core_specs.len(), 5);
        assert_eq!(loadout.elite_specs.len(), 3);
        assert!(loadout.core_specs.iter().all(|s| s.tiers.iter().all(|t| t.len() == 3)));
        assert_eq!(loadout.gear.len(), 14);
        let rifle = loadout
            .weapons
            .two_handed
            .iter()
            .find(|w| w.name == "TwoHanded Rifle")
            .unwrap();
        assert!(rifle.core);
        let hammer = loadout
            .weapons
            .two_handed
            .iter()
            .find(|w| w.name == "TwoHanded Hammer")
            .unwrap();
        assert!(!hammer.core);
        assert_eq!(hammer.elite_specs, vec!["Scrapper".to_string()]);
        let medic_gyro = loadout
            .skills
            .healing
            .iter()
            .find(|s| s.name == "Medic Gyro Healing Skill")
            .unwrap();
        assert_eq!(medic_gyro.elite_spec.as_deref(), Some("Scrapper"));
    }
}
