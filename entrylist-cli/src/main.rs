use clap::Parser;
use rand::Rng;
use std::path::PathBuf;

use entrylist_core::{generate, EntryListSettings, DEFAULT_BASE_SKINS};

#[derive(Debug, Parser)]
#[command(
    name = "ac-entry-list",
    version,
    about = "Generate an Assetto Corsa entry_list.ini from a driver roster and skin preferences"
)]
struct Args {
    /// Number of slots on the server
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u16).range(1..))]
    slots: u16,

    /// Path to skin preferences (`<user id> <steam guid> <car> <skin>` per line)
    #[arg(short = 's', long)]
    skins: Option<PathBuf>,

    /// Path to human-readable entries; practice grid when omitted
    #[arg(short = 'e', long)]
    entries: Option<PathBuf>,

    /// Path to the JSON list of base content skins per car
    #[arg(short = 'b', long, default_value = DEFAULT_BASE_SKINS)]
    base_skins: PathBuf,

    /// Seed for car and skin draws; random when omitted
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen::<u64>());
    log::info!("using seed {seed}");

    let settings = EntryListSettings {
        slots: usize::from(args.slots),
        entries_path: args.entries,
        preferences_path: args.skins,
        base_skins_path: args.base_skins,
        seed,
    };

    match generate(&settings) {
        Ok(ini) => print!("{ini}"),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}
