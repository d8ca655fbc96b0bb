use anyhow::Result;
use gw2rando::randomize::{Randomizer, World};
use gw2rando::settings::{parse_generation_settings, GenerationSettings, GroupContent};
use gw2rando::traverse::get_reachable_regions;
use gw2rando_game::catalog::CatalogSources;
use gw2rando_game::{
    Catalog, ItemKind, LocationKind, Profession, Race, Storyline, BASE_ID, MIST_FRAGMENT,
};
use hashbrown::HashSet;

const PLAYER: usize = 1;

fn generate(catalog: &Catalog, settings: &GenerationSettings, seed: usize) -> Result<World> {
    Randomizer::new(catalog, settings, PLAYER).randomize(seed)
}

fn location_kinds(catalog: &Catalog, world: &World) -> Vec<LocationKind> {
    world
        .graph
        .regions
        .iter()
        .flat_map(|r| r.locations.iter())
        .map(|&idx| catalog.locations[idx].kind)
        .collect()
}

#[test]
fn core_engineer_charr() -> Result<()> {
    let catalog = Catalog::load_embedded()?;
    let settings = parse_generation_settings(
        r#"{
            "character_profession": "engineer",
            "character_race": "charr",
            "storyline": "core",
            "storyline_items": "core",
            "group_content": "none",
            "max_quests": 0
        }"#,
    )?;
    let world = generate(&catalog, &settings, 1234)?;

    assert_eq!(world.start_map, "Plains of Ashford");
    assert_eq!(world.precollected[0].name, "Plains of Ashford");
    assert_eq!(world.local_items, vec![MIST_FRAGMENT.to_string()]);

    let location_count: usize = world.regions.iter().map(|r| r.locations.len()).sum();
    assert_eq!(location_count, world.item_pool.len());

    for item in &world.item_pool {
        let data = &catalog.items[catalog.item_idx(&item.name).unwrap()];
        assert!(data.storyline.is_none() || data.storyline == Some(Storyline::Core));
        if !data.specs.is_empty() {
            assert!(
                data.has_core_spec(Profession::Engineer),
                "{} is not a core Engineer item",
                item.name
            );
        }
        if let Some(race) = data.race {
            assert_eq!(race, Race::Charr);
        }
    }

    let kinds = location_kinds(&catalog, &world);
    assert!(!kinds.contains(&LocationKind::Quest));
    assert!(!kinds.contains(&LocationKind::Training));
    assert!(!kinds.contains(&LocationKind::WorldBoss));
    for region in &world.regions {
        for location in &region.locations {
            assert!(!location.name.starts_with("Story Achievement"));
        }
    }

    // The starting mainhand is a core Engineer weapon held from the start.
    let mainhand = &world.precollected[1];
    let data = &catalog.items[catalog.item_idx(&mainhand.name).unwrap()];
    assert!(matches!(data.kind, ItemKind::Weapon { .. }));
    assert!(data.has_core_spec(Profession::Engineer));
    assert!(!world.item_pool.iter().any(|x| x.name == mainhand.name));

    assert_eq!(Storyline::try_from(world.slot_data.storyline)?, Storyline::Core);
    assert_eq!(Race::try_from(world.slot_data.character_race)?, Race::Charr);
    assert_eq!(
        Profession::try_from(world.slot_data.character_profession)?,
        Profession::Engineer
    );
    Ok(())
}

#[test]
fn season_4_includes_path_of_fire() -> Result<()> {
    let catalog = Catalog::load_embedded()?;
    let settings = parse_generation_settings(
        r#"{
            "character_profession": "engineer",
            "character_race": "human",
            "storyline": "season_4",
            "storyline_items": "storyline"
        }"#,
    )?;
    assert_eq!(settings.storyline, Storyline::Season4);
    let world = generate(&catalog, &settings, 7)?;

    assert_eq!(world.start_map, "Domain of Istan");
    let names: HashSet<&str> = world.item_pool.iter().map(|x| x.name.as_str()).collect();
    assert!(names.contains("Adept 1 Holosmith Trait"));
    assert!(names.contains("Crystal Oasis"));
    assert!(!names.contains("Adept 1 Scrapper Trait"));
    assert!(!names.contains("Adept 1 Mechanist Trait"));
    assert!(!names.contains("Verdant Brink"));
    Ok(())
}

#[test]
fn inverted_quest_range_is_corrected() -> Result<()> {
    let catalog = Catalog::load_embedded()?;
    let settings = GenerationSettings {
        storyline: Storyline::Season2,
        min_quests: 5,
        max_quests: 3,
        ..Default::default()
    };

    let mut normalized = settings.clone();
    let warnings = normalized.normalize();
    assert_eq!(warnings.len(), 1);
    assert_eq!(normalized.max_quests, 5);

    let randomizer = Randomizer::new(&catalog, &settings, PLAYER);
    assert_eq!(randomizer.settings.max_quests, 5);
    let world = randomizer.randomize(99)?;
    let quests = location_kinds(&catalog, &world)
        .into_iter()
        .filter(|&k| k == LocationKind::Quest)
        .count();
    assert_eq!(quests, 5);
    Ok(())
}

#[test]
fn same_seed_same_world() -> Result<()> {
    let catalog = Catalog::load_embedded()?;
    let settings = GenerationSettings {
        storyline: Storyline::PathOfFire,
        storyline_items: gw2rando::settings::StorylineItems::All,
        ..Default::default()
    };
    let world1 = generate(&catalog, &settings, 42)?;
    let world2 = generate(&catalog, &settings, 42)?;
    assert_eq!(
        serde_json::to_string(&world1)?,
        serde_json::to_string(&world2)?
    );
    Ok(())
}

#[test]
fn every_region_reachable_with_all_items() -> Result<()> {
    let catalog = Catalog::load_embedded()?;
    let cases = [
        (Profession::Engineer, Race::Asura, Storyline::Core),
        (Profession::Revenant, Race::Human, Storyline::HeartOfThorns),
        (Profession::Necromancer, Race::Sylvari, Storyline::IcebroodSaga),
        (Profession::Warrior, Race::Norn, Storyline::EndOfDragons),
        (Profession::Mesmer, Race::Charr, Storyline::JanthirWilds),
        (Profession::Thief, Race::Human, Storyline::VisionsOfEternity),
    ];
    for (seed, (profession, race, storyline)) in cases.into_iter().enumerate() {
        let settings = GenerationSettings {
            character_profession: profession,
            character_race: race,
            storyline,
            group_content: GroupContent::TenMan,
            include_competitive: true,
            ..Default::default()
        };
        let world = generate(&catalog, &settings, seed)?;
        let inventory = world.full_inventory();
        let reachable = get_reachable_regions(&world.graph, &world.logic(), &inventory);
        assert!(reachable.iter().all(|&r| r), "{:?} {:?}", profession, storyline);
        assert!(world.logic().evaluate(&world.completion, &inventory));
        assert!(world.mist_fragments >= settings.mist_fragments_required);
    }
    Ok(())
}

#[test]
fn locations_are_unique() -> Result<()> {
    let catalog = Catalog::load_embedded()?;
    let settings = GenerationSettings {
        storyline: Storyline::HeartOfThorns,
        unique_item_weight: 1000,
        poi_weight: 1000,
        ..Default::default()
    };
    let world = generate(&catalog, &settings, 5)?;
    let mut names = HashSet::new();
    let mut ids = HashSet::new();
    for region in &world.regions {
        for location in &region.locations {
            assert!(names.insert(location.name.clone()));
            assert!(ids.insert(location.id));
            assert!(location.id >= BASE_ID);
        }
    }
    assert_eq!(names.len(), world.item_pool.len());
    Ok(())
}

#[test]
fn missing_start_map() -> Result<()> {
    let mut catalog = Catalog::load_embedded()?;
    for map in &mut catalog.maps {
        map.start.retain(|(storyline, _)| *storyline != Storyline::VisionsOfEternity);
    }
    let settings = GenerationSettings {
        storyline: Storyline::VisionsOfEternity,
        ..Default::default()
    };
    let err = generate(&catalog, &settings, 0).unwrap_err();
    assert!(err.to_string().contains("No starting map"));
    Ok(())
}

#[test]
fn empty_weapon_pool() -> Result<()> {
    let catalog = Catalog::from_sources(&CatalogSources {
        weapons: "[]",
        ..CatalogSources::embedded()
    })?;
    let settings = GenerationSettings::default();
    let err = generate(&catalog, &settings, 0).unwrap_err();
    assert!(err.to_string().contains("No mainhand weapons"));
    Ok(())
}

#[test]
fn exhausted_locations() -> Result<()> {
    let catalog = Catalog::load_embedded()?;
    let settings = GenerationSettings {
        achievement_weight: 0,
        unique_item_weight: 0,
        poi_weight: 0,
        ..Default::default()
    };
    let err = generate(&catalog, &settings, 0).unwrap_err();
    assert!(err.to_string().contains("Ran out of locations"));
    Ok(())
}
