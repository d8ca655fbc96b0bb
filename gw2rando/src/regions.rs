use crate::eligibility::Eligibility;
use anyhow::{bail, Result};
use gw2rando_game::{Catalog, IndexedVec, LocationIdx, MapData, MapIdx, MapType};
use gw2rando_logic::Rule;
use hashbrown::HashMap;
use log::info;
use serde::Serialize;
use strum::IntoEnumIterator;

pub type RegionIdx = usize; // Index into RegionGraph.regions

pub const MENU_REGION: &str = "Menu";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RegionKind {
    Menu,
    Map(MapIdx),
    Category(MapType),
}

#[derive(Clone, Debug, Serialize)]
pub struct Exit {
    pub to: RegionIdx,
    pub rule: Rule,
}

#[derive(Clone, Debug, Serialize)]
pub struct Region {
    pub name: String,
    pub kind: RegionKind,
    pub exits: Vec<Exit>,
    pub locations: Vec<LocationIdx>,
}

#[derive(Clone, Debug, Default)]
pub struct RegionGraph {
    pub regions: Vec<Region>,
    pub region_isv: IndexedVec<String>,
    pub map_regions: HashMap<MapIdx, RegionIdx>,
    pub category_regions: HashMap<MapType, RegionIdx>,
    pub start_map: MapIdx,
    pub start_region: RegionIdx,
}

impl RegionGraph {
    fn add_region(&mut self, name: &str, kind: RegionKind) -> Result<RegionIdx> {
        if self.region_isv.index_by_key.contains_key(name) {
            bail!("duplicate region name '{}'", name);
        }
        let idx = self.region_isv.add(name);
        self.regions.push(Region {
            name: name.to_string(),
            kind,
            exits: vec![],
            locations: vec![],
        });
        Ok(idx)
    }

    fn connect(&mut self, from: RegionIdx, to: RegionIdx, rule: Rule) {
        self.regions[from].exits.push(Exit { to, rule });
    }

    pub fn region_idx(&self, name: &str) -> Option<RegionIdx> {
        self.region_isv.index_by_key.get(name).copied()
    }

    pub fn location_count(&self) -> usize {
        self.regions.iter().map(|r| r.locations.len()).sum()
    }
}

pub fn get_category_rule(map_type: MapType) -> Rule {
    match map_type {
        MapType::OpenWorld | MapType::Pvp => Rule::Free,
        MapType::Story => Rule::HealSkill,
        MapType::Fractal
        | MapType::Dungeon
        | MapType::StrikeMission
        | MapType::Raid
        | MapType::Wvw => Rule::FullBuild,
    }
}

pub fn get_map_rule(map: &MapData) -> Rule {
    Rule::make_and(vec![Rule::item(&map.name), get_category_rule(map.map_type)])
}

// Entering a category region means being able to do that kind of content
// anywhere, so every map of the category is required.
pub fn get_region_rule<'a>(map_type: MapType, maps: impl Iterator<Item = &'a MapData>) -> Rule {
    let map_names: Vec<String> = maps
        .filter(|m| m.map_type == map_type)
        .map(|m| m.name.clone())
        .collect();
    Rule::make_and(vec![
        get_category_rule(map_type),
        Rule::AllItems(map_names),
    ])
}

pub fn build_regions(catalog: &Catalog, eligibility: &Eligibility) -> Result<RegionGraph> {
    let settings = eligibility.settings;
    let mut graph = RegionGraph::default();
    let menu = graph.add_region(MENU_REGION, RegionKind::Menu)?;

    let mut entrances: Vec<(MapIdx, MapIdx)> = vec![];
    for (map_idx, map) in catalog.maps.iter().enumerate() {
        if !eligibility.includes_map(map) {
            continue;
        }
        let region_idx = graph.add_region(&map.name, RegionKind::Map(map_idx))?;
        graph.map_regions.insert(map_idx, region_idx);
        for entrance in &map.entrances {
            if let Some(src_idx) = catalog.map_idx(entrance) {
                entrances.push((src_idx, map_idx));
            }
        }
    }

    let start_map = catalog.maps.iter().enumerate().find(|(map_idx, map)| {
        graph.map_regions.contains_key(map_idx)
            && map.is_start_for(settings.storyline, settings.character_race)
    });
    let Some((start_map, _)) = start_map else {
        bail!(
            "No starting map for storyline {:?} and race {:?}",
            settings.storyline,
            settings.character_race
        );
    };
    let start_region = graph.map_regions[&start_map];
    graph.start_map = start_map;
    graph.start_region = start_region;
    graph.connect(menu, start_region, Rule::Free);

    // Entrances from maps outside the player's storylines are dropped along with those maps.
    for (src_idx, dst_idx) in entrances {
        if let Some(&src_region) = graph.map_regions.get(&src_idx) {
            let dst_region = graph.map_regions[&dst_idx];
            graph.connect(src_region, dst_region, get_map_rule(&catalog.maps[dst_idx]));
        }
    }

    for map_type in MapType::iter() {
        if !eligibility.includes_map_type(map_type) {
            continue;
        }
        let mut graph_maps: Vec<MapIdx> = graph.map_regions.keys().copied().collect();
        graph_maps.sort();
        let rule = get_region_rule(map_type, graph_maps.iter().map(|&i| &catalog.maps[i]));
        let region_idx = graph.add_region(map_type.name(), RegionKind::Category(map_type))?;
        graph.category_regions.insert(map_type, region_idx);
        graph.connect(start_region, region_idx, rule);
    }

    info!(
        "Built {} regions; starting map: {}",
        graph.regions.len(),
        catalog.maps[start_map].name
    );
    Ok(graph)
}
