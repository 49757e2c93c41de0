use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

pub mod cars;
pub mod grid;
pub mod ini;
pub mod preferences;
pub mod roster;
pub mod skins;

use cars::CarCatalog;
use roster::Entry;
use skins::SkinCatalog;

pub const DEFAULT_BASE_SKINS: &str = "base_skins.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryListSettings {
    pub slots: usize,
    /// Human-readable roster; practice mode when absent.
    pub entries_path: Option<PathBuf>,
    pub preferences_path: Option<PathBuf>,
    pub base_skins_path: PathBuf,
    pub seed: u64,
}

impl EntryListSettings {
    pub fn new(slots: usize, seed: u64) -> Self {
        Self {
            slots,
            entries_path: None,
            preferences_path: None,
            base_skins_path: PathBuf::from(DEFAULT_BASE_SKINS),
            seed,
        }
    }
}

#[derive(Debug, Error)]
pub enum EntryListError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid skin catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("Not a valid entry line: {0}")]
    InvalidRosterLine(String),
    #[error("Not a valid skin preference line: {0}")]
    InvalidPreferenceLine(String),
    #[error("Unknown car nickname: {0}")]
    UnknownCar(String),
    #[error("Skin {skin} is unknown for car {car}")]
    UnknownSkin { car: String, skin: String },
    #[error("skin catalog does not match car list (missing: {missing:?}, unexpected: {unexpected:?})")]
    SkinCatalogMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
    #[error("skin catalog lists no skins for car {0}")]
    EmptySkinList(String),
    #[error("Duplicate race entry: {0}")]
    DuplicateEntry(String),
    #[error("Number of racers ({entries}) more than slots ({slots})")]
    TooManyEntries { entries: usize, slots: usize },
    #[error("invalid INI at line {line}: {reason}")]
    InvalidIni { line: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, EntryListError>;

/// Runs the whole pipeline against the built-in GT3 car list.
pub fn generate(settings: &EntryListSettings) -> Result<String> {
    generate_with(settings, &CarCatalog::gt3()?)
}

/// Reads every input, builds the grid and renders `entry_list.ini` text.
///
/// Nothing is returned unless every validation step passed.
pub fn generate_with(settings: &EntryListSettings, cars: &CarCatalog) -> Result<String> {
    if settings.slots == 0 {
        return Err(EntryListError::Config(
            "slot count must be at least 1".to_string(),
        ));
    }

    let mut rng = StdRng::seed_from_u64(settings.seed);
    let skins = SkinCatalog::load(&settings.base_skins_path, cars)?;

    let mut entries: Vec<Entry> = match &settings.entries_path {
        Some(path) => roster::parse_roster(&fs::read_to_string(path)?, cars)?,
        None => {
            log::info!("no roster given, building a practice grid");
            roster::practice_entries(settings.slots, cars, &mut rng)
        }
    };

    roster::check_unique_roster_ids(&entries)?;

    if let Some(path) = &settings.preferences_path {
        let prefs = preferences::load_preferences(path, cars)?;
        preferences::merge_preferences(&mut entries, &prefs, &skins)?;
    }

    let grid = grid::fill_grid(entries, settings.slots, cars, &skins, &mut rng)?;
    Ok(ini::entry_list_document(&grid).to_string())
}
