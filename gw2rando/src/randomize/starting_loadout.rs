use crate::eligibility::Eligibility;
use crate::settings::{
    GearSlotsPolicy, HealSkillPolicy, StartingMainhandWeapon, StartingOffhandWeapon,
};
use anyhow::{bail, Result};
use gw2rando_game::{ItemIdx, ItemKind, Profession, SkillType, WeaponSlot};
use log::info;
use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Clone, Debug, Default)]
pub struct StartingLoadout {
    pub mainhand: Option<ItemIdx>, // Mainhand or two-handed
    pub offhand: Option<ItemIdx>,
    pub heal_skill: Option<ItemIdx>,
    pub gear: Vec<ItemIdx>,
}

impl StartingLoadout {
    pub fn precollected(&self, eligibility: &Eligibility) -> Vec<ItemIdx> {
        let settings = eligibility.settings;
        let mut out: Vec<ItemIdx> = vec![];
        out.extend(self.mainhand);
        out.extend(self.offhand);
        if settings.heal_skill == HealSkillPolicy::Starting {
            out.extend(self.heal_skill);
        }
        if settings.gear_slots == GearSlotsPolicy::Starting {
            out.extend(self.gear.iter().copied());
        }
        out
    }

    pub fn early(&self, eligibility: &Eligibility) -> Vec<ItemIdx> {
        let settings = eligibility.settings;
        let mut out: Vec<ItemIdx> = vec![];
        if settings.heal_skill == HealSkillPolicy::Early {
            out.extend(self.heal_skill);
        }
        if settings.gear_slots == GearSlotsPolicy::Early {
            out.extend(self.gear.iter().copied());
        }
        out
    }
}

// Starting equipment never depends on an elite specialization.
fn proficient_weapons(eligibility: &Eligibility, slot: WeaponSlot) -> Vec<ItemIdx> {
    eligibility
        .catalog
        .items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.kind == ItemKind::Weapon { slot })
        .filter(|(_, item)| eligibility.is_usable(item, false))
        .map(|(idx, _)| idx)
        .collect()
}

fn resolve_explicit(eligibility: &Eligibility, name: &str) -> Result<ItemIdx> {
    let Some(idx) = eligibility.catalog.item_idx(name) else {
        bail!("Unknown starting item '{}'", name);
    };
    if !eligibility.is_usable(&eligibility.catalog.items[idx], false) {
        bail!(
            "Starting item '{}' is not usable by {:?}",
            name,
            eligibility.settings.character_profession
        );
    }
    Ok(idx)
}

fn choose_weapon<R: Rng + ?Sized>(
    eligibility: &Eligibility,
    candidates: &[ItemIdx],
    description: &str,
    rng: &mut R,
) -> Result<ItemIdx> {
    match candidates.choose(rng) {
        Some(&idx) => Ok(idx),
        None => bail!(
            "No {} weapons available to {:?}",
            description,
            eligibility.settings.character_profession
        ),
    }
}

pub fn select_starting_weapons<R: Rng + ?Sized>(
    eligibility: &Eligibility,
    rng: &mut R,
) -> Result<(Option<ItemIdx>, Option<ItemIdx>)> {
    let settings = eligibility.settings;
    let one_handed = proficient_weapons(eligibility, WeaponSlot::Mainhand);
    let two_handed = proficient_weapons(eligibility, WeaponSlot::TwoHanded);

    let mainhand = match settings.starting_mainhand_weapon {
        StartingMainhandWeapon::None => None,
        StartingMainhandWeapon::RandomProficient => {
            let candidates: Vec<ItemIdx> =
                one_handed.iter().chain(two_handed.iter()).copied().collect();
            Some(choose_weapon(eligibility, &candidates, "mainhand", rng)?)
        }
        StartingMainhandWeapon::RandomProficientOneHanded => {
            Some(choose_weapon(eligibility, &one_handed, "one-handed", rng)?)
        }
        StartingMainhandWeapon::RandomProficientTwoHanded => {
            Some(choose_weapon(eligibility, &two_handed, "two-handed", rng)?)
        }
        explicit => match explicit.item_name() {
            Some(name) => Some(resolve_explicit(eligibility, &name)?),
            None => None,
        },
    };

    let is_two_handed = mainhand.is_some_and(|idx| {
        eligibility.catalog.items[idx].kind
            == ItemKind::Weapon {
                slot: WeaponSlot::TwoHanded,
            }
    });
    let offhand = if is_two_handed {
        None
    } else {
        match settings.starting_offhand_weapon {
            StartingOffhandWeapon::None => None,
            StartingOffhandWeapon::RandomProficient => {
                let candidates = proficient_weapons(eligibility, WeaponSlot::Offhand);
                Some(choose_weapon(eligibility, &candidates, "offhand", rng)?)
            }
            explicit => match explicit.item_name() {
                Some(name) => Some(resolve_explicit(eligibility, &name)?),
                None => None,
            },
        }
    };

    let names: Vec<&str> = mainhand
        .iter()
        .chain(offhand.iter())
        .map(|&idx| eligibility.catalog.items[idx].name.as_str())
        .collect();
    info!("Starting weapons: {:?}", names);
    Ok((mainhand, offhand))
}

// Revenants heal through their legends rather than a heal skill slot.
pub fn select_heal_skill<R: Rng + ?Sized>(
    eligibility: &Eligibility,
    rng: &mut R,
) -> Result<Option<ItemIdx>> {
    let settings = eligibility.settings;
    if settings.heal_skill == HealSkillPolicy::Pool {
        return Ok(None);
    }
    let skill_type = if settings.character_profession == Profession::Revenant {
        SkillType::Legend
    } else {
        SkillType::Healing
    };
    let candidates: Vec<ItemIdx> = eligibility
        .catalog
        .items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.kind == ItemKind::Skill { skill_type })
        .filter(|(_, item)| eligibility.is_usable(item, false))
        .map(|(idx, _)| idx)
        .collect();

    if let Some(skill_name) = &settings.heal_skill_name {
        let name = skill_type.item_name(skill_name);
        return match eligibility.catalog.item_idx(&name) {
            Some(idx) if candidates.contains(&idx) => Ok(Some(idx)),
            _ => bail!(
                "Heal skill '{}' is not available to {:?}",
                skill_name,
                settings.character_profession
            ),
        };
    }

    match candidates.choose(rng) {
        Some(&idx) => Ok(Some(idx)),
        None => bail!(
            "No heal skills available to {:?}",
            settings.character_profession
        ),
    }
}

pub fn gear_items(eligibility: &Eligibility) -> Vec<ItemIdx> {
    eligibility
        .catalog
        .items
        .iter()
        .enumerate()
        .filter(|(_, item)| matches!(item.kind, ItemKind::Gear { .. }))
        .map(|(idx, _)| idx)
        .collect()
}

pub fn select_starting_loadout<R: Rng + ?Sized>(
    eligibility: &Eligibility,
    rng: &mut R,
) -> Result<StartingLoadout> {
    let heal_skill = select_heal_skill(eligibility, rng)?;
    let (mainhand, offhand) = select_starting_weapons(eligibility, rng)?;
    Ok(StartingLoadout {
        mainhand,
        offhand,
        heal_skill,
        gear: gear_items(eligibility),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GenerationSettings;
    use gw2rando_game::{Catalog, Race};
    use rand::SeedableRng;

    fn rng() -> rand::rngs::StdRng {
        rand::rngs::StdRng::from_seed([7u8; 32])
    }

    #[test]
    fn test_two_handed_suppresses_offhand() -> Result<()> {
        let catalog = Catalog::load_embedded()?;
        let settings = GenerationSettings {
            character_profession: Profession::Engineer,
            starting_mainhand_weapon: StartingMainhandWeapon::RandomProficientTwoHanded,
            starting_offhand_weapon: StartingOffhandWeapon::RandomProficient,
            ..Default::default()
        };
        let eligibility = Eligibility::new(&catalog, &settings);
        let (mainhand, offhand) = select_starting_weapons(&eligibility, &mut rng())?;
        assert_eq!(mainhand, catalog.item_idx("TwoHanded Rifle"));
        assert_eq!(offhand, None);
        Ok(())
    }

    #[test]
    fn test_one_handed_keeps_offhand() -> Result<()> {
        let catalog = Catalog::load_embedded()?;
        let settings = GenerationSettings {
            character_profession: Profession::Engineer,
            starting_mainhand_weapon: StartingMainhandWeapon::RandomProficientOneHanded,
            starting_offhand_weapon: StartingOffhandWeapon::Shield,
            ..Default::default()
        };
        let eligibility = Eligibility::new(&catalog, &settings);
        let (mainhand, offhand) = select_starting_weapons(&eligibility, &mut rng())?;
        assert_eq!(mainhand, catalog.item_idx("Mainhand Pistol"));
        assert_eq!(offhand, catalog.item_idx("Offhand Shield"));
        Ok(())
    }

    #[test]
    fn test_random_weapons_are_core() -> Result<()> {
        let catalog = Catalog::load_embedded()?;
        let settings = GenerationSettings {
            character_profession: Profession::Engineer,
            storyline: gw2rando_game::Storyline::HeartOfThorns,
            starting_mainhand_weapon: StartingMainhandWeapon::RandomProficientTwoHanded,
            ..Default::default()
        };
        let eligibility = Eligibility::new(&catalog, &settings);
        for seed in 0..20u8 {
            let mut rng = rand::rngs::StdRng::from_seed([seed; 32]);
            let (mainhand, _) = select_starting_weapons(&eligibility, &mut rng)?;
            // The Scrapper hammer is never a starting weapon.
            assert_eq!(mainhand, catalog.item_idx("TwoHanded Rifle"));
        }
        Ok(())
    }

    #[test]
    fn test_unusable_explicit_weapon() -> Result<()> {
        let catalog = Catalog::load_embedded()?;
        let settings = GenerationSettings {
            character_profession: Profession::Engineer,
            starting_mainhand_weapon: StartingMainhandWeapon::Greatsword,
            ..Default::default()
        };
        let eligibility = Eligibility::new(&catalog, &settings);
        assert!(select_starting_weapons(&eligibility, &mut rng()).is_err());
        Ok(())
    }

    #[test]
    fn test_revenant_heal_is_legend() -> Result<()> {
        let catalog = Catalog::load_embedded()?;
        let settings = GenerationSettings {
            character_profession: Profession::Revenant,
            character_race: Race::Human,
            heal_skill: HealSkillPolicy::Starting,
            ..Default::default()
        };
        let eligibility = Eligibility::new(&catalog, &settings);
        let heal = select_heal_skill(&eligibility, &mut rng())?.unwrap();
        assert_eq!(
            catalog.items[heal].kind,
            ItemKind::Skill {
                skill_type: SkillType::Legend
            }
        );
        Ok(())
    }

    #[test]
    fn test_named_heal_skill() -> Result<()> {
        let catalog = Catalog::load_embedded()?;
        let mut settings = GenerationSettings {
            character_profession: Profession::Engineer,
            heal_skill: HealSkillPolicy::Early,
            heal_skill_name: Some("Med Kit".to_string()),
            ..Default::default()
        };
        let eligibility = Eligibility::new(&catalog, &settings);
        let heal = select_heal_skill(&eligibility, &mut rng())?;
        assert_eq!(heal, catalog.item_idx("Med Kit Healing Skill"));

        settings.heal_skill_name = Some("Medic Gyro".to_string());
        let eligibility = Eligibility::new(&catalog, &settings);
        assert!(select_heal_skill(&eligibility, &mut rng()).is_err());
        Ok(())
    }
}
