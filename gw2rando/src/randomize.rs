pub mod allocate;
pub mod starting_loadout;

use crate::eligibility::Eligibility;
use crate::helpers::random_round;
use crate::regions::{build_regions, RegionGraph};
use crate::settings::GenerationSettings;
use crate::traverse::verify_reachability;
use allocate::LocationAllocator;
use anyhow::{bail, Result};
use gw2rando_game::{
    Catalog, ItemId, ItemIdx, ItemKind, LocationId, LocationKind, PlayerId, MIST_FRAGMENT,
};
use gw2rando_logic::{Inventory, Loadout, Logic, Rule};
use log::info;
use rand::SeedableRng;
use serde::Serialize;
use starting_loadout::select_starting_loadout;

#[derive(Clone, Debug, Serialize)]
pub struct WorldItem {
    pub name: String,
    pub id: ItemId,
    pub player: PlayerId,
}

#[derive(Clone, Debug, Serialize)]
pub struct WorldLocation {
    pub name: String,
    pub id: LocationId,
    pub kind: LocationKind,
}

#[derive(Clone, Debug, Serialize)]
pub struct WorldExit {
    pub to: String,
    pub rule: Rule,
}

#[derive(Clone, Debug, Serialize)]
pub struct WorldRegion {
    pub name: String,
    pub exits: Vec<WorldExit>,
    pub locations: Vec<WorldLocation>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SlotData {
    pub storyline: usize,
    pub mist_fragments_required: usize,
    pub character_race: usize,
    pub character_profession: usize,
}

// Everything the multiworld host needs to run one player's world.
#[derive(Clone, Debug, Serialize)]
pub struct World {
    pub player: PlayerId,
    pub seed: usize,
    pub settings: GenerationSettings,
    pub start_map: String,
    pub regions: Vec<WorldRegion>,
    pub item_pool: Vec<WorldItem>,
    pub precollected: Vec<WorldItem>,
    pub early_items: Vec<String>,
    pub local_items: Vec<String>,
    pub mist_fragments: usize,
    pub completion: Rule,
    pub slot_data: SlotData,
    pub loadout: Loadout,
    #[serde(skip)]
    pub graph: RegionGraph,
}

impl World {
    pub fn logic(&self) -> Logic<'_> {
        Logic::new(self.player, &self.loadout)
    }

    // Every pool item plus every precollected item.
    pub fn full_inventory(&self) -> Inventory {
        let mut inventory = Inventory::default();
        for item in self.item_pool.iter().chain(self.precollected.iter()) {
            inventory.collect(&item.name, self.player, 1);
        }
        inventory
    }
}

pub struct Randomizer<'a> {
    pub catalog: &'a Catalog,
    pub settings: GenerationSettings,
    pub player: PlayerId,
}

impl<'a> Randomizer<'a> {
    pub fn new(catalog: &'a Catalog, settings: &GenerationSettings, player: PlayerId) -> Self {
        let mut settings = settings.clone();
        settings.normalize();
        Randomizer {
            catalog,
            settings,
            player,
        }
    }

    fn world_item(&self, idx: ItemIdx) -> WorldItem {
        let item = &self.catalog.items[idx];
        WorldItem {
            name: item.name.clone(),
            id: item.id,
            player: self.player,
        }
    }

    fn world_regions(&self, graph: &RegionGraph) -> Vec<WorldRegion> {
        graph
            .regions
            .iter()
            .map(|region| WorldRegion {
                name: region.name.clone(),
                exits: region
                    .exits
                    .iter()
                    .map(|exit| WorldExit {
                        to: graph.regions[exit.to].name.clone(),
                        rule: exit.rule.clone(),
                    })
                    .collect(),
                locations: region
                    .locations
                    .iter()
                    .map(|&idx| {
                        let location = &self.catalog.locations[idx];
                        WorldLocation {
                            name: location.name.clone(),
                            id: location.id,
                            kind: location.kind,
                        }
                    })
                    .collect(),
            })
            .collect()
    }

    pub fn randomize(&self, seed: usize) -> Result<World> {
        let mut rng_seed = [0u8; 32];
        rng_seed[..8].copy_from_slice(&(seed as u64).to_le_bytes());
        let mut rng = rand::rngs::StdRng::from_seed(rng_seed);

        let settings = &self.settings;
        let catalog = self.catalog;
        let player = self.player;
        let eligibility = Eligibility::new(catalog, settings);

        let required = settings.mist_fragments_required;
        let extra = random_round(
            &mut rng,
            required as f64 * settings.extra_mist_fragment_percent as f64 / 100.0,
        );
        let mist_fragments = required + extra;

        let starting_loadout = select_starting_loadout(&eligibility, &mut rng)?;
        let loadout = Loadout::new(catalog, settings.character_profession, |item| {
            eligibility.is_usable(item, true)
        });
        let mut graph = build_regions(catalog, &eligibility)?;
        let start_map = &catalog.maps[graph.start_map];
        info!(
            "[player {player}] {:?} {:?}, storyline {:?}, starting in {}",
            settings.character_race, settings.character_profession, settings.storyline, start_map.name
        );

        let mut precollected: Vec<ItemIdx> = vec![start_map.item_idx];
        precollected.extend(starting_loadout.precollected(&eligibility));
        let early_items = starting_loadout.early(&eligibility);

        // Every usable item at its quantity, minus the copies handed out up front.
        let mut pool_counts: Vec<(ItemIdx, usize)> = catalog
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| eligibility.is_usable(item, true))
            .map(|(idx, item)| {
                let quantity = match item.kind {
                    ItemKind::MistFragment => mist_fragments,
                    _ => item.quantity,
                };
                (idx, quantity)
            })
            .collect();
        for &idx in &precollected {
            match pool_counts.iter_mut().find(|(i, _)| *i == idx) {
                Some((_, count)) if *count > 0 => *count -= 1,
                _ => bail!(
                    "Precollected item '{}' is not part of the item pool",
                    catalog.items[idx].name
                ),
            }
        }
        let item_pool: Vec<WorldItem> = pool_counts
            .iter()
            .flat_map(|&(idx, count)| std::iter::repeat(idx).take(count))
            .map(|idx| self.world_item(idx))
            .collect();
        let item_count = item_pool.len();
        info!(
            "[player {player}] {} items in pool, {} precollected, {} mist fragments ({} required)",
            item_count,
            precollected.len(),
            mist_fragments,
            required
        );

        let allocator = LocationAllocator::new(catalog, settings);
        let placed = allocator.allocate(item_count as isize, &graph, &mut rng)?;
        for p in &placed {
            graph.regions[p.region].locations.push(p.location);
        }
        info!(
            "[player {player}] Placed {} locations across {} regions",
            graph.location_count(),
            graph.regions.len()
        );

        let completion = Rule::Item {
            name: MIST_FRAGMENT.to_string(),
            count: required,
        };

        let world = World {
            player,
            seed,
            settings: settings.clone(),
            start_map: start_map.name.clone(),
            regions: self.world_regions(&graph),
            item_pool,
            precollected: precollected.iter().map(|&idx| self.world_item(idx)).collect(),
            early_items: early_items
                .iter()
                .map(|&idx| catalog.items[idx].name.clone())
                .collect(),
            local_items: vec![MIST_FRAGMENT.to_string()],
            mist_fragments,
            completion,
            slot_data: SlotData {
                storyline: settings.storyline as usize,
                mist_fragments_required: required,
                character_race: settings.character_race as usize,
                character_profession: settings.character_profession as usize,
            },
            loadout,
            graph,
        };

        let inventory = world.full_inventory();
        let logic = world.logic();
        verify_reachability(&world.graph, &logic, &inventory)?;
        if !logic.evaluate(&world.completion, &inventory) {
            bail!("Goal is not reachable with every item collected");
        }
        Ok(world)
    }
}
