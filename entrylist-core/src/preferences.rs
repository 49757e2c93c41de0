use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::cars::CarCatalog;
use crate::roster::Entry;
use crate::skins::SkinCatalog;
use crate::{EntryListError, Result};

/// One row of the skin preference file: a driver's wanted skin for one car.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkinPreference {
    pub roster_id: String,
    pub identity_id: String,
    pub car: String,
    pub skin: String,
}

/// Parses `<roster id> <steam guid> <car nickname> <skin>` rows.
pub fn parse_preferences(text: &str, cars: &CarCatalog) -> Result<Vec<SkinPreference>> {
    let mut prefs = Vec::new();

    for line in text.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let [roster_id, identity_id, car_nick, skin] = fields[..] else {
            return Err(EntryListError::InvalidPreferenceLine(line.to_string()));
        };

        let car = cars
            .resolve(car_nick)
            .ok_or_else(|| EntryListError::UnknownCar(car_nick.to_lowercase()))?;

        prefs.push(SkinPreference {
            roster_id: roster_id.to_string(),
            identity_id: identity_id.to_string(),
            car: car.to_string(),
            skin: skin.to_string(),
        });
    }

    Ok(prefs)
}

pub fn load_preferences(path: &Path, cars: &CarCatalog) -> Result<Vec<SkinPreference>> {
    let data = fs::read_to_string(path)?;
    let prefs = parse_preferences(&data, cars)?;
    log::debug!("read {} skin preferences from {}", prefs.len(), path.display());
    Ok(prefs)
}

/// Applies explicit skin choices to the entries they belong to.
///
/// A preference only applies when the entry ended up in that exact car. When
/// it does, the entry also gets pinned to the player's Steam GUID.
pub fn merge_preferences(
    entries: &mut [Entry],
    prefs: &[SkinPreference],
    skins: &SkinCatalog,
) -> Result<()> {
    let mut by_roster_id: HashMap<&str, HashMap<&str, &str>> = HashMap::new();
    let mut identity_ids: HashMap<&str, &str> = HashMap::new();

    for pref in prefs {
        by_roster_id
            .entry(pref.roster_id.as_str())
            .or_default()
            .insert(pref.car.as_str(), pref.skin.as_str());
        identity_ids.insert(pref.roster_id.as_str(), pref.identity_id.as_str());
    }

    let mut applied = 0usize;
    for entry in entries.iter_mut() {
        let Some(roster_id) = entry.roster_id.as_deref() else {
            continue;
        };
        let Some(car_prefs) = by_roster_id.get(roster_id) else {
            continue;
        };
        let Some(car) = entry.car.as_deref() else {
            continue;
        };
        let Some(&skin) = car_prefs.get(car) else {
            continue;
        };

        if !skins.has_skin(car, skin) {
            return Err(EntryListError::UnknownSkin {
                car: car.to_string(),
                skin: skin.to_string(),
            });
        }

        let identity_id = identity_ids.get(roster_id).map(|id| id.to_string());
        entry.skin = Some(skin.to_string());
        entry.identity_id = identity_id;
        applied += 1;
    }

    log::debug!("applied {applied} skin preferences");
    Ok(())
}
