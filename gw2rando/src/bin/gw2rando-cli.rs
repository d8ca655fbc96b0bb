use anyhow::{Context, Result};
use clap::Parser;
use gw2rando::randomize::Randomizer;
use gw2rando::settings::parse_generation_settings;
use gw2rando_game::{Catalog, PlayerId};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
struct Args {
    #[arg(long)]
    settings: PathBuf,

    #[arg(long)]
    random_seed: usize,

    #[arg(long, default_value_t = 1)]
    player: PlayerId,

    // Directory holding the content JSON files; the embedded copy is used when absent.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[arg(long)]
    output_world: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();
    let catalog = match &args.data_dir {
        Some(path) => Catalog::load(path)?,
        None => Catalog::load_embedded()?,
    };

    let settings_str = std::fs::read_to_string(&args.settings)
        .with_context(|| format!("Unable to read {}", args.settings.display()))?;
    let settings = parse_generation_settings(&settings_str)
        .with_context(|| format!("Unable to parse {}", args.settings.display()))?;

    let randomizer = Randomizer::new(&catalog, &settings, args.player);
    let world = randomizer.randomize(args.random_seed)?;
    info!(
        "Generated world: {} regions, {} items, {} precollected",
        world.regions.len(),
        world.item_pool.len(),
        world.precollected.len()
    );

    if let Some(output_path) = &args.output_world {
        let world_str = serde_json::to_string_pretty(&world)?;
        std::fs::write(output_path, world_str)
            .with_context(|| format!("Unable to write {}", output_path.display()))?;
        info!("Wrote world to {}", output_path.display());
    }
    Ok(())
}
