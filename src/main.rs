use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};

use ptexbake::bake::Baker;
use ptexbake::cache::FrameRange;
use ptexbake::cli::Args;
use ptexbake::progress::ConsoleProgress;
use ptexbake::raster::RasterBakeEngine;
use ptexbake::settings::Settings;
use ptexbake::store::{FileAttributeStore, assign_initial_map};

fn main() -> Result<()> {
    let args = Args::parse();

    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let default_level = match args.verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();

    info!("ptexbake starting...");
    debug!("Command-line args: {:?}", args);

    let text = std::fs::read_to_string(&args.settings)
        .with_context(|| format!("reading settings {}", args.settings.display()))?;
    let settings: Settings = serde_json::from_str(&text)
        .with_context(|| format!("parsing settings {}", args.settings.display()))?;

    let engine = RasterBakeEngine::new(args.out_dir.join("maps"));
    let mut attrs = FileAttributeStore::new(args.out_dir.join("attrs"));

    if let Some(map_ref) = &args.assign {
        let attribute_id = settings
            .get_str("attribute_id")
            .filter(|s| !s.is_empty())
            .context("--assign requires the 'attribute_id' setting")?;
        assign_initial_map(&mut attrs, attribute_id, map_ref)?;
        info!("assigned initial map '{}' to '{}'", map_ref, attribute_id);
    }

    let range = FrameRange::new(args.start, args.end);
    let mut baker = Baker::new(settings, engine, attrs);
    let mut progress = ConsoleProgress::new();

    baker.convert(range, &mut progress)?;
    progress.finish();

    info!("converted {} frame(s)", range.len());
    Ok(())
}
