use crate::{CollectionState, Loadout, SpecLoadout};
use gw2rando_game::{PlayerId, SkillType};

pub fn has_map<S: CollectionState + ?Sized>(state: &S, player: PlayerId, map: &str) -> bool {
    state.has(map, player, 1)
}

// A specialization is filled once one trait from each of its three tiers is held.
pub fn has_spec<S: CollectionState + ?Sized>(
    state: &S,
    player: PlayerId,
    spec: &SpecLoadout,
) -> bool {
    spec.tiers
        .iter()
        .all(|tier| tier.iter().any(|t| state.has(t, player, 1)))
}

pub fn has_elite_spec<S: CollectionState + ?Sized>(
    state: &S,
    player: PlayerId,
    loadout: &Loadout,
    elite_spec: &str,
) -> bool {
    match loadout.elite_spec(elite_spec) {
        Some(spec) => has_spec(state, player, spec),
        None => false,
    }
}

pub fn has_any_trait<S: CollectionState + ?Sized>(
    state: &S,
    player: PlayerId,
    spec: &SpecLoadout,
) -> bool {
    spec.traits().any(|t| state.has(t, player, 1))
}

pub fn has_skill<S: CollectionState + ?Sized>(
    state: &S,
    player: PlayerId,
    loadout: &Loadout,
    skill_type: SkillType,
    count: usize,
    elite_spec: Option<&str>,
) -> bool {
    if count == 0 {
        return true;
    }
    let mut found = 0;
    for skill in loadout.skills.group(skill_type) {
        let slottable = match &skill.elite_spec {
            None => true,
            Some(e) => {
                elite_spec == Some(e.as_str()) && has_elite_spec(state, player, loadout, e)
            }
        };
        if slottable && state.has(&skill.name, player, 1) {
            found += 1;
            if found >= count {
                return true;
            }
        }
    }
    false
}

// Revenant legends stand in for the regular skill bar.
pub fn has_heal_skill<S: CollectionState + ?Sized>(
    state: &S,
    player: PlayerId,
    loadout: &Loadout,
    elite_spec: Option<&str>,
) -> bool {
    has_skill(state, player, loadout, SkillType::Healing, 1, elite_spec)
        || has_skill(state, player, loadout, SkillType::Legend, 1, elite_spec)
}

pub fn has_utility_skills<S: CollectionState + ?Sized>(
    state: &S,
    player: PlayerId,
    loadout: &Loadout,
    elite_spec: Option<&str>,
) -> bool {
    has_skill(state, player, loadout, SkillType::Utility, 3, elite_spec)
        || has_skill(state, player, loadout, SkillType::Legend, 2, elite_spec)
}

pub fn has_elite_skills<S: CollectionState + ?Sized>(
    state: &S,
    player: PlayerId,
    loadout: &Loadout,
    elite_spec: Option<&str>,
) -> bool {
    has_skill(state, player, loadout, SkillType::Elite, 1, elite_spec)
        || has_skill(state, player, loadout, SkillType::Legend, 2, elite_spec)
}

pub fn has_full_spec<S: CollectionState + ?Sized>(
    state: &S,
    player: PlayerId,
    loadout: &Loadout,
    elite_spec: Option<&str>,
) -> bool {
    let core_needed = match elite_spec {
        Some(e) => {
            if !has_elite_spec(state, player, loadout, e) {
                return false;
            }
            2
        }
        None => 3,
    };
    let mut core_filled = 0;
    for spec in &loadout.core_specs {
        if has_spec(state, player, spec) {
            core_filled += 1;
            if core_filled >= core_needed {
                return true;
            }
        }
    }
    false
}

pub fn has_all_gear<S: CollectionState + ?Sized>(
    state: &S,
    player: PlayerId,
    loadout: &Loadout,
) -> bool {
    state.has_all(&loadout.gear, player)
}

// Two full weapon sets: each set needs a mainhand and an offhand, or one two-handed weapon.
pub fn has_all_weapon_slots<S: CollectionState + ?Sized>(
    state: &S,
    player: PlayerId,
    loadout: &Loadout,
    elite_spec: Option<&str>,
) -> bool {
    let count_held = |weapons: &[crate::LoadoutWeapon]| {
        weapons
            .iter()
            .filter(|w| w.usable_with(elite_spec) && state.has(&w.name, player, 1))
            .count()
    };
    let mainhand = count_held(&loadout.weapons.mainhand);
    let offhand = count_held(&loadout.weapons.offhand);
    let two_handed = count_held(&loadout.weapons.two_handed);
    mainhand + two_handed >= 2 && offhand + two_handed >= 2
}

pub fn has_full_build_with<S: CollectionState + ?Sized>(
    state: &S,
    player: PlayerId,
    loadout: &Loadout,
    elite_spec: Option<&str>,
) -> bool {
    has_all_weapon_slots(state, player, loadout, elite_spec)
        && has_heal_skill(state, player, loadout, elite_spec)
        && has_utility_skills(state, player, loadout, elite_spec)
        && has_elite_skills(state, player, loadout, elite_spec)
        && has_full_spec(state, player, loadout, elite_spec)
        && has_all_gear(state, player, loadout)
}

// A build is complete without an elite specialization, or with any elite
// specialization the player has started collecting.
pub fn has_full_build<S: CollectionState + ?Sized>(
    state: &S,
    player: PlayerId,
    loadout: &Loadout,
) -> bool {
    if has_full_build_with(state, player, loadout, None) {
        return true;
    }
    loadout.elite_specs.iter().any(|spec| {
        has_any_trait(state, player, spec)
            && has_full_build_with(state, player, loadout, Some(&spec.name))
    })
}

pub fn has_any_heal_skill<S: CollectionState + ?Sized>(
    state: &S,
    player: PlayerId,
    loadout: &Loadout,
) -> bool {
    if has_heal_skill(state, player, loadout, None) {
        return true;
    }
    loadout.elite_specs.iter().any(|spec| {
        has_any_trait(state, player, spec)
            && has_heal_skill(state, player, loadout, Some(&spec.name))
    })
}
