use clap::Parser;
use std::path::PathBuf;

/// Bake an animated procedural texture into per-frame artifacts and generate
/// the piecewise map expression selecting the right one per frame.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Settings JSON (collection, description, sequence_node, emitter_node,
    /// attribute_id; optional object_name, resolution, expression_override)
    #[arg(value_name = "SETTINGS")]
    pub settings: PathBuf,

    /// Output root for baked artifacts and attribute scripts
    #[arg(short = 'O', long = "out", value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// First frame of the bake range (inclusive)
    #[arg(long = "start", value_name = "N", default_value_t = 0)]
    pub start: i32,

    /// One past the last frame of the bake range
    #[arg(long = "end", value_name = "N", default_value_t = 1)]
    pub end: i32,

    /// Assign this map reference to the attribute before converting
    /// (satisfies the "map already assigned" precondition on a fresh store)
    #[arg(long = "assign", value_name = "MAPREF")]
    pub assign: Option<String>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}
