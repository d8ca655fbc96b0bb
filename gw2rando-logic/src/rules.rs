use crate::helpers::{has_any_heal_skill, has_full_build};
use crate::{CollectionState, Loadout};
use gw2rando_game::PlayerId;
use serde::{Deserialize, Serialize};

// Access rules are plain values so they can be stored on region exits,
// compared in tests and written out with the generated world.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rule {
    Free,
    Never,
    Item { name: String, count: usize },
    AllItems(Vec<String>),
    HealSkill,
    FullBuild,
    And(Vec<Rule>),
    Or(Vec<Rule>),
}

impl Rule {
    pub fn item(name: &str) -> Rule {
        Rule::Item {
            name: name.to_string(),
            count: 1,
        }
    }

    pub fn make_and(rules: Vec<Rule>) -> Rule {
        let mut out_rules: Vec<Rule> = vec![];
        for rule in rules {
            if let Rule::Never = rule {
                return Rule::Never;
            } else if let Rule::Free = rule {
                continue;
            } else if let Rule::AllItems(items) = &rule {
                if items.is_empty() {
                    continue;
                }
                out_rules.push(rule);
            } else if let Rule::And(and_rules) = rule {
                out_rules.extend(and_rules);
            } else {
                out_rules.push(rule);
            }
        }
        match out_rules.len() {
            0 => Rule::Free,
            1 => out_rules.swap_remove(0),
            _ => Rule::And(out_rules),
        }
    }

    pub fn make_or(rules: Vec<Rule>) -> Rule {
        let mut out_rules: Vec<Rule> = vec![];
        for rule in rules {
            if let Rule::Never = rule {
                continue;
            } else if let Rule::Free = rule {
                return Rule::Free;
            } else if let Rule::Or(or_rules) = rule {
                out_rules.extend(or_rules);
            } else {
                out_rules.push(rule);
            }
        }
        match out_rules.len() {
            0 => Rule::Never,
            1 => out_rules.swap_remove(0),
            _ => Rule::Or(out_rules),
        }
    }
}

// Evaluates rules for one player. Rules only ever test for the presence of
// items, so a rule that holds keeps holding as more items are collected.
#[derive(Clone, Copy)]
pub struct Logic<'a> {
    pub player: PlayerId,
    pub loadout: &'a Loadout,
}

impl<'a> Logic<'a> {
    pub fn new(player: PlayerId, loadout: &'a Loadout) -> Self {
        Logic { player, loadout }
    }

    pub fn evaluate<S: CollectionState + ?Sized>(&self, rule: &Rule, state: &S) -> bool {
        match rule {
            Rule::Free => true,
            Rule::Never => false,
            Rule::Item { name, count } => state.has(name, self.player, *count),
            Rule::AllItems(items) => state.has_all(items, self.player),
            Rule::HealSkill => has_any_heal_skill(state, self.player, self.loadout),
            Rule::FullBuild => has_full_build(state, self.player, self.loadout),
            Rule::And(rules) => rules.iter().all(|r| self.evaluate(r, state)),
            Rule::Or(rules) => rules.iter().any(|r| self.evaluate(r, state)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Inventory, SkillLoadout, WeaponLoadout};
    use gw2rando_game::Profession;

    fn empty_loadout() -> Loadout {
        Loadout {
            profession: Profession::Warrior,
            weapons: WeaponLoadout::default(),
            skills: SkillLoadout::default(),
            core_specs: vec![],
            elite_specs: vec![],
            gear: vec![],
            maps: vec![],
        }
    }

    #[test]
    fn test_make_and_simplifies() {
        assert_eq!(Rule::make_and(vec![Rule::Free, Rule::Free]), Rule::Free);
        assert_eq!(
            Rule::make_and(vec![Rule::item("Queensdale"), Rule::Never]),
            Rule::Never
        );
        assert_eq!(
            Rule::make_and(vec![Rule::Free, Rule::AllItems(vec![]), Rule::HealSkill]),
            Rule::HealSkill
        );
        assert_eq!(
            Rule::make_and(vec![
                Rule::make_and(vec![Rule::item("A"), Rule::item("B")]),
                Rule::item("C")
            ]),
            Rule::And(vec![Rule::item("A"), Rule::item("B"), Rule::item("C")])
        );
        assert_eq!(Rule::make_or(vec![Rule::Never, Rule::item("A")]), Rule::item("A"));
        assert_eq!(Rule::make_or(vec![Rule::item("A"), Rule::Free]), Rule::Free);
    }

    #[test]
    fn test_evaluate_items() {
        let loadout = empty_loadout();
        let logic = Logic::new(3, &loadout);
        let mut inventory = Inventory::default();
        let rule = Rule::make_and(vec![
            Rule::item("Queensdale"),
            Rule::Item {
                name: "Mist Fragment".to_string(),
                count: 2,
            },
        ]);
        assert!(!logic.evaluate(&rule, &inventory));
        inventory.collect("Queensdale", 3, 1);
        inventory.collect("Mist Fragment", 3, 1);
        assert!(!logic.evaluate(&rule, &inventory));
        inventory.collect("Mist Fragment", 4, 1);
        assert!(!logic.evaluate(&rule, &inventory));
        inventory.collect("Mist Fragment", 3, 1);
        assert!(logic.evaluate(&rule, &inventory));
    }

    #[test]
    fn test_full_build_needs_a_build() {
        let loadout = empty_loadout();
        let logic = Logic::new(1, &loadout);
        assert!(!logic.evaluate(&Rule::FullBuild, &Inventory::default()));
        assert!(!logic.evaluate(&Rule::HealSkill, &Inventory::default()));
    }
}
