use crate::regions::{RegionGraph, RegionIdx};
use crate::settings::GenerationSettings;
use anyhow::{bail, Result};
use gw2rando_game::util::sorted_hashmap_iter;
use gw2rando_game::{Catalog, LocationIdx, LocationKind, MapType, Storyline};
use hashbrown::HashMap;
use log::{debug, info};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

// Indexed by `LocationKind as usize`.
const LOCATION_KINDS: [LocationKind; 6] = [
    LocationKind::Achievement,
    LocationKind::Quest,
    LocationKind::Training,
    LocationKind::WorldBoss,
    LocationKind::UniqueItem,
    LocationKind::PointOfInterest,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedLocation {
    pub location: LocationIdx,
    pub region: RegionIdx,
}

// Stamped locations of one kind in one category region, handed out in order.
struct GenericSource<'a> {
    region: RegionIdx,
    locations: &'a [LocationIdx],
    next: usize,
}

// Per-kind supply of locations that have not been placed yet.
enum Supply<'a> {
    Generic(Vec<GenericSource<'a>>),
    Pooled(Vec<PlacedLocation>),
}

impl Supply<'_> {
    fn is_empty(&self) -> bool {
        match self {
            Supply::Generic(sources) => sources.is_empty(),
            Supply::Pooled(pool) => pool.is_empty(),
        }
    }

    fn len(&self) -> usize {
        match self {
            Supply::Generic(sources) => sources.iter().map(|s| s.locations.len() - s.next).sum(),
            Supply::Pooled(pool) => pool.len(),
        }
    }

    fn take<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<PlacedLocation> {
        match self {
            Supply::Generic(sources) => {
                if sources.is_empty() {
                    return None;
                }
                let i = rng.gen_range(0..sources.len());
                let source = &mut sources[i];
                let placed = PlacedLocation {
                    location: source.locations[source.next],
                    region: source.region,
                };
                source.next += 1;
                if source.next >= source.locations.len() {
                    sources.remove(i);
                }
                Some(placed)
            }
            Supply::Pooled(pool) => {
                if pool.is_empty() {
                    return None;
                }
                let i = rng.gen_range(0..pool.len());
                Some(pool.remove(i))
            }
        }
    }
}

pub struct LocationAllocator<'a> {
    pub catalog: &'a Catalog,
    pub settings: &'a GenerationSettings,
}

impl<'a> LocationAllocator<'a> {
    pub fn new(catalog: &'a Catalog, settings: &'a GenerationSettings) -> Self {
        LocationAllocator { catalog, settings }
    }

    fn weight(&self, kind: LocationKind) -> u32 {
        match kind {
            LocationKind::Achievement => self.settings.achievement_weight,
            LocationKind::Quest => self.settings.quest_weight,
            LocationKind::Training => self.settings.training_weight,
            LocationKind::WorldBoss => self.settings.world_boss_weight,
            LocationKind::UniqueItem => self.settings.unique_item_weight,
            LocationKind::PointOfInterest => self.settings.poi_weight,
        }
    }

    // Training and world boss locations have no content behind them yet, so
    // they are never placed regardless of weight.
    fn cap(&self, kind: LocationKind, supply: &Supply) -> usize {
        match kind {
            LocationKind::Achievement => supply.len(),
            LocationKind::Quest => self.settings.max_quests.min(supply.len()),
            LocationKind::Training | LocationKind::WorldBoss => 0,
            LocationKind::UniqueItem | LocationKind::PointOfInterest => supply.len(),
        }
    }

    fn generic_supply(&self, kind: LocationKind, graph: &RegionGraph) -> Supply<'a> {
        let catalog: &'a Catalog = self.catalog;
        let mut sources = vec![];
        for &map_type in kind.valid_map_types() {
            // The core storyline has no story achievements.
            if kind == LocationKind::Achievement
                && map_type == MapType::Story
                && self.settings.storyline == Storyline::Core
            {
                continue;
            }
            let Some(&region) = graph.category_regions.get(&map_type) else {
                continue;
            };
            if let Some(locations) = catalog.generic_locations.get(&(kind, map_type)) {
                if !locations.is_empty() {
                    sources.push(GenericSource {
                        region,
                        locations,
                        next: 0,
                    });
                }
            }
        }
        Supply::Generic(sources)
    }

    // Copies the storyline's pool, keeping only entries whose map made it into the graph.
    fn pooled_supply(
        &self,
        pools: &HashMap<Storyline, Vec<LocationIdx>>,
        graph: &RegionGraph,
    ) -> Supply<'a> {
        let mut pool = vec![];
        for &location in pools.get(&self.settings.storyline).into_iter().flatten() {
            let Some(map_idx) = self.catalog.locations[location].map_idx else {
                continue;
            };
            if let Some(&region) = graph.map_regions.get(&map_idx) {
                pool.push(PlacedLocation { location, region });
            }
        }
        Supply::Pooled(pool)
    }

    pub fn allocate<R: Rng + ?Sized>(
        &self,
        item_count: isize,
        graph: &RegionGraph,
        rng: &mut R,
    ) -> Result<Vec<PlacedLocation>> {
        if item_count <= 0 {
            return Ok(vec![]);
        }
        let item_count = item_count as usize;

        let mut supplies: Vec<Supply> = LOCATION_KINDS
            .iter()
            .map(|&kind| match kind {
                LocationKind::UniqueItem => {
                    self.pooled_supply(&self.catalog.unique_item_pools, graph)
                }
                LocationKind::PointOfInterest => {
                    self.pooled_supply(&self.catalog.poi_pools, graph)
                }
                _ => self.generic_supply(kind, graph),
            })
            .collect();
        let caps: Vec<usize> = LOCATION_KINDS
            .iter()
            .zip(supplies.iter())
            .map(|(&kind, supply)| self.cap(kind, supply))
            .collect();
        let mut placed_counts = vec![0; LOCATION_KINDS.len()];
        let mut out: Vec<PlacedLocation> = Vec::with_capacity(item_count);

        let quest_idx = LocationKind::Quest as usize;
        let min_quests = self.settings.min_quests.min(caps[quest_idx]).min(item_count);
        for _ in 0..min_quests {
            let Some(placed) = supplies[quest_idx].take(rng) else {
                break;
            };
            out.push(placed);
            placed_counts[quest_idx] += 1;
        }

        while out.len() < item_count {
            let weights: Vec<u32> = (0..LOCATION_KINDS.len())
                .map(|i| {
                    if placed_counts[i] >= caps[i] || supplies[i].is_empty() {
                        0
                    } else {
                        self.weight(LOCATION_KINDS[i])
                    }
                })
                .collect();
            if weights.iter().all(|&w| w == 0) {
                bail!(
                    "Ran out of locations after placing {} of {} (storyline {:?})",
                    out.len(),
                    item_count,
                    self.settings.storyline
                );
            }
            let dist = WeightedIndex::new(&weights)?;
            let i = dist.sample(rng);
            let Some(placed) = supplies[i].take(rng) else {
                bail!("No {:?} locations left", LOCATION_KINDS[i]);
            };
            debug!(
                "Placed {:?} location '{}' in region {}",
                LOCATION_KINDS[i], self.catalog.locations[placed.location].name, placed.region
            );
            out.push(placed);
            placed_counts[i] += 1;
        }

        let mut counts_by_kind: HashMap<LocationKind, usize> = HashMap::new();
        for (kind, count) in LOCATION_KINDS.iter().zip(placed_counts.iter()) {
            counts_by_kind.insert(*kind, *count);
        }
        for (kind, count) in sorted_hashmap_iter(&counts_by_kind) {
            info!("Allocated {} {:?} locations", count, kind);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::Eligibility;
    use crate::regions::build_regions;
    use hashbrown::HashSet;
    use rand::SeedableRng;

    fn setup(settings: &GenerationSettings) -> (Catalog, RegionGraph) {
        let catalog = Catalog::load_embedded().unwrap();
        let graph = {
            let eligibility = Eligibility::new(&catalog, settings);
            build_regions(&catalog, &eligibility).unwrap()
        };
        (catalog, graph)
    }

    #[test]
    fn test_allocates_exact_count() {
        let settings = GenerationSettings::default();
        let (catalog, graph) = setup(&settings);
        let allocator = LocationAllocator::new(&catalog, &settings);
        let mut rng = rand::rngs::StdRng::from_seed([3u8; 32]);
        let placed = allocator.allocate(120, &graph, &mut rng).unwrap();
        assert_eq!(placed.len(), 120);
        let unique: HashSet<LocationIdx> = placed.iter().map(|p| p.location).collect();
        assert_eq!(unique.len(), 120);
        for p in &placed {
            let location = &catalog.locations[p.location];
            assert_ne!(location.kind, LocationKind::Training);
            assert_ne!(location.kind, LocationKind::WorldBoss);
            // Max quests defaults to zero.
            assert_ne!(location.kind, LocationKind::Quest);
            if location.kind == LocationKind::Achievement {
                assert_eq!(location.map_type, Some(MapType::OpenWorld));
            }
        }
    }

    #[test]
    fn test_zero_budget() {
        let settings = GenerationSettings::default();
        let (catalog, graph) = setup(&settings);
        let allocator = LocationAllocator::new(&catalog, &settings);
        let mut rng = rand::rngs::StdRng::from_seed([0u8; 32]);
        assert!(allocator.allocate(0, &graph, &mut rng).unwrap().is_empty());
        assert!(allocator.allocate(-4, &graph, &mut rng).unwrap().is_empty());
    }

    #[test]
    fn test_pools_drawn_without_replacement() {
        let settings = GenerationSettings {
            achievement_weight: 0,
            world_boss_weight: 0,
            unique_item_weight: 100,
            poi_weight: 100,
            ..Default::default()
        };
        let (catalog, graph) = setup(&settings);
        let pool_size = catalog.unique_item_pools[&Storyline::Core].len()
            + catalog.poi_pools[&Storyline::Core].len();
        let allocator = LocationAllocator::new(&catalog, &settings);
        let mut rng = rand::rngs::StdRng::from_seed([5u8; 32]);
        let placed = allocator
            .allocate(pool_size as isize, &graph, &mut rng)
            .unwrap();
        let unique: HashSet<LocationIdx> = placed.iter().map(|p| p.location).collect();
        assert_eq!(unique.len(), pool_size);
        for p in &placed {
            let map_idx = catalog.locations[p.location].map_idx.unwrap();
            assert_eq!(graph.map_regions[&map_idx], p.region);
        }

        // One more than the pools hold cannot be satisfied.
        let mut rng = rand::rngs::StdRng::from_seed([5u8; 32]);
        assert!(allocator
            .allocate(pool_size as isize + 1, &graph, &mut rng)
            .is_err());
    }

    #[test]
    fn test_min_quests_placed_first() {
        let mut settings = GenerationSettings {
            storyline: Storyline::Season2,
            quest_weight: 0,
            min_quests: 5,
            max_quests: 3,
            ..Default::default()
        };
        settings.normalize();
        let (catalog, graph) = setup(&settings);
        let allocator = LocationAllocator::new(&catalog, &settings);
        let mut rng = rand::rngs::StdRng::from_seed([9u8; 32]);
        let placed = allocator.allocate(40, &graph, &mut rng).unwrap();
        let quests: Vec<&PlacedLocation> = placed
            .iter()
            .filter(|p| catalog.locations[p.location].kind == LocationKind::Quest)
            .collect();
        assert_eq!(quests.len(), 5);
        let story = graph.category_regions[&MapType::Story];
        assert!(quests.iter().all(|p| p.region == story));
    }
}
