use crate::settings::{GenerationSettings, GroupContent, StorylineItems};
use gw2rando_game::{Catalog, ItemData, ItemKind, MapData, MapType, Profession, Storyline};

// Decides which catalog entries exist for a given set of player options.
pub struct Eligibility<'a> {
    pub catalog: &'a Catalog,
    pub settings: &'a GenerationSettings,
    pub owned_storylines: Vec<Storyline>,
}

impl<'a> Eligibility<'a> {
    pub fn new(catalog: &'a Catalog, settings: &'a GenerationSettings) -> Self {
        Eligibility {
            catalog,
            settings,
            owned_storylines: settings.storyline.owned(),
        }
    }

    pub fn includes_storyline(&self, storyline: Storyline) -> bool {
        if storyline == Storyline::Core {
            return true;
        }
        let selected = self.settings.storyline;
        match self.settings.storyline_items {
            StorylineItems::All => true,
            StorylineItems::Core => false,
            StorylineItems::Storyline => selected.owned().contains(&storyline),
            StorylineItems::StorylinePlus => storyline <= selected,
        }
    }

    pub fn owns_storyline(&self, storyline: Storyline) -> bool {
        self.owned_storylines.contains(&storyline)
    }

    pub fn includes_map_type(&self, map_type: MapType) -> bool {
        if map_type.is_group_content() && self.settings.group_content == GroupContent::None {
            return false;
        }
        if map_type.is_ten_man() && self.settings.group_content != GroupContent::TenMan {
            return false;
        }
        if map_type.is_competitive() && !self.settings.include_competitive {
            return false;
        }
        true
    }

    pub fn includes_map(&self, map: &MapData) -> bool {
        self.includes_map_type(map.map_type)
            && map.storylines.iter().any(|s| self.owns_storyline(*s))
    }

    pub fn is_usable(&self, item: &ItemData, allow_elite_spec: bool) -> bool {
        if let ItemKind::Map { map_idx } = item.kind {
            if !self.includes_map(&self.catalog.maps[map_idx]) {
                return false;
            }
        }

        if let Some(storyline) = item.storyline {
            if !self.includes_storyline(storyline) {
                return false;
            }
        }

        let profession = self.settings.character_profession;
        if !item.specs.is_empty() {
            let has_usable_spec = item.specs.iter().any(|spec| {
                spec.profession == profession
                    && match &spec.elite_spec {
                        None => true,
                        Some(elite_spec) => {
                            allow_elite_spec
                                && self
                                    .catalog
                                    .elite_spec_storylines
                                    .get(elite_spec)
                                    .is_some_and(|s| self.includes_storyline(*s))
                        }
                    }
            });
            if !has_usable_spec {
                return false;
            }
        }

        if let Some(race) = item.race {
            // Revenants cannot slot racial skills.
            if profession == Profession::Revenant || race != self.settings.character_race {
                return false;
            }
        }

        true
    }
}
