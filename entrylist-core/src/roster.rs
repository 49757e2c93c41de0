use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::cars::CarCatalog;
use crate::{EntryListError, Result};

/// Literal nickname meaning "driver hasn't picked a car yet".
const UNDECIDED_CAR: &str = "tbd";

/// One grid slot in the generated entry list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub name: Option<String>,
    /// Forum user id from the human-readable roster.
    pub roster_id: Option<String>,
    /// Steam GUID pinning the slot to one player.
    pub identity_id: Option<String>,
    pub car: Option<String>,
    pub skin: Option<String>,
}

impl Entry {
    pub fn with_car(car: impl Into<String>) -> Self {
        Self {
            car: Some(car.into()),
            ..Self::default()
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.identity_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

fn line_regex() -> &'static Regex {
    static LINE_RE: OnceLock<Regex> = OnceLock::new();
    LINE_RE.get_or_init(|| {
        Regex::new(r"\[USER=(\d+)\](.+)\[/USER\] - ([^\(]+)").expect("roster regex is valid")
    })
}

/// Parses one `[USER=<id>]<name>[/USER] - <car>(...)` line.
pub fn parse_roster_line(line: &str, catalog: &CarCatalog) -> Result<Entry> {
    let matches: Vec<_> = line_regex().captures_iter(line).collect();
    if matches.len() != 1 {
        return Err(EntryListError::InvalidRosterLine(line.trim_end().to_string()));
    }
    let caps = &matches[0];

    let roster_id = caps[1].to_string();
    let name = caps[2].to_string();
    let car_nick = caps[3].trim().to_lowercase();

    let car = if car_nick == UNDECIDED_CAR {
        None
    } else {
        let car = catalog
            .resolve(&car_nick)
            .ok_or_else(|| EntryListError::UnknownCar(car_nick.clone()))?;
        Some(car.to_string())
    };

    Ok(Entry {
        name: Some(name),
        roster_id: Some(roster_id),
        identity_id: None,
        car,
        skin: None,
    })
}

/// Parses a whole roster, skipping blank lines.
pub fn parse_roster(text: &str, catalog: &CarCatalog) -> Result<Vec<Entry>> {
    let entries = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| parse_roster_line(line, catalog))
        .collect::<Result<Vec<_>>>()?;
    log::debug!("parsed {} roster entries", entries.len());
    Ok(entries)
}

/// Fails if two entries share a roster id.
pub fn check_unique_roster_ids(entries: &[Entry]) -> Result<()> {
    let mut seen = HashSet::new();
    for id in entries.iter().filter_map(|e| e.roster_id.as_deref()) {
        if !seen.insert(id) {
            return Err(EntryListError::DuplicateEntry(id.to_string()));
        }
    }
    Ok(())
}

/// Builds a roster for an open practice server: every car in random order,
/// cycling until all slots are taken.
pub fn practice_entries<R: Rng + ?Sized>(
    slots: usize,
    catalog: &CarCatalog,
    rng: &mut R,
) -> Vec<Entry> {
    let biased = catalog.biased_cars();
    // Variety beats bias unless every car can appear with its full weight.
    let mut cars: Vec<&str> = if slots < biased.len() {
        catalog.cars().iter().map(String::as_str).collect()
    } else {
        biased
    };
    cars.shuffle(rng);

    if cars.is_empty() {
        return Vec::new();
    }

    cars.iter()
        .cycle()
        .take(slots)
        .map(|car| Entry::with_car(*car))
        .collect()
}
