use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::cars::CarCatalog;
use crate::roster::Entry;
use crate::{EntryListError, Result};

/// Skins shipped with the base game or DLC, per car.
#[derive(Debug, Clone)]
pub struct SkinCatalog {
    skins: BTreeMap<String, Vec<String>>,
}

impl SkinCatalog {
    /// Validates that `skins` covers exactly the cars in `cars`.
    pub fn new(skins: BTreeMap<String, Vec<String>>, cars: &CarCatalog) -> Result<Self> {
        let expected: BTreeSet<&str> = cars.cars().iter().map(String::as_str).collect();
        let present: BTreeSet<&str> = skins.keys().map(String::as_str).collect();

        if expected != present {
            let missing = expected.difference(&present).map(|s| s.to_string()).collect();
            let unexpected = present.difference(&expected).map(|s| s.to_string()).collect();
            return Err(EntryListError::SkinCatalogMismatch {
                missing,
                unexpected,
            });
        }

        if let Some((car, _)) = skins.iter().find(|(_, list)| list.is_empty()) {
            return Err(EntryListError::EmptySkinList(car.clone()));
        }

        Ok(Self { skins })
    }

    pub fn from_json(json: &str, cars: &CarCatalog) -> Result<Self> {
        let skins: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
        Self::new(skins, cars)
    }

    pub fn load(path: &Path, cars: &CarCatalog) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let catalog = Self::from_json(&data, cars)?;
        log::debug!(
            "loaded skins for {} cars from {}",
            catalog.skins.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn skins_for(&self, car: &str) -> &[String] {
        self.skins.get(car).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_skin(&self, car: &str, skin: &str) -> bool {
        self.skins_for(car).iter().any(|s| s == skin)
    }
}

/// Skins not yet handed out during one generation run.
///
/// Seeded from the catalog minus every skin that an entry already requested,
/// then drawn by removal. Once a car runs dry, draws fall back to any skin
/// from the catalog and duplicates become unavoidable.
pub struct SkinPool<'a> {
    catalog: &'a SkinCatalog,
    remaining: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> SkinPool<'a> {
    pub fn new<R: Rng + ?Sized>(catalog: &'a SkinCatalog, entries: &[Entry], rng: &mut R) -> Self {
        let mut requested: HashMap<&str, HashSet<&str>> = HashMap::new();
        for entry in entries {
            if let (Some(car), Some(skin)) = (entry.car.as_deref(), entry.skin.as_deref()) {
                requested.entry(car).or_default().insert(skin);
            }
        }

        let mut remaining = HashMap::new();
        for (car, skins) in &catalog.skins {
            let taken = requested.get(car.as_str());
            let mut free: Vec<&str> = skins
                .iter()
                .map(String::as_str)
                .filter(|s| taken.map_or(true, |t| !t.contains(s)))
                .collect();
            // The catalog may list a skin twice; the pool must not.
            free.sort_unstable();
            free.dedup();
            free.shuffle(rng);
            remaining.insert(car.as_str(), free);
        }

        Self { catalog, remaining }
    }

    #[cfg(test)]
    fn remaining(&self, car: &str) -> usize {
        self.remaining.get(car).map_or(0, Vec::len)
    }

    /// Draws a skin for `car`, avoiding ones already in use where possible.
    pub fn draw<R: Rng + ?Sized>(&mut self, car: &str, rng: &mut R) -> Option<String> {
        if let Some(skin) = self.remaining.get_mut(car).and_then(Vec::pop) {
            return Some(skin.to_string());
        }

        log::warn!("Skins for {car} overlapped");
        self.catalog.skins_for(car).choose(rng).cloned()
    }
}
