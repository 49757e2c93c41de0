use rand::Rng;

use crate::cars::CarCatalog;
use crate::roster::Entry;
use crate::skins::{SkinCatalog, SkinPool};
use crate::{EntryListError, Result};

/// Moves Steam-pinned entries behind all free ones, keeping relative order.
///
/// With N slots, N/2 of them pinned and N/2 + 1 joiners, the server hands one
/// of the pinned slots to a stranger and won't give it back to its owner for
/// a long while. Putting pinned slots last makes that less likely.
pub fn pinned_entries_to_back(entries: Vec<Entry>) -> Vec<Entry> {
    let (pinned, mut free): (Vec<Entry>, Vec<Entry>) =
        entries.into_iter().partition(Entry::is_pinned);
    free.extend(pinned);
    free
}

/// Pads `entries` to `slots`, then assigns a car and a skin to every entry
/// still missing one.
pub fn fill_grid<R: Rng + ?Sized>(
    mut entries: Vec<Entry>,
    slots: usize,
    cars: &CarCatalog,
    skins: &SkinCatalog,
    rng: &mut R,
) -> Result<Vec<Entry>> {
    if entries.len() > slots {
        return Err(EntryListError::TooManyEntries {
            entries: entries.len(),
            slots,
        });
    }

    let padding = slots - entries.len();
    entries.resize_with(slots, Entry::default);
    log::debug!("padded grid with {padding} free entries");

    let mut entries = pinned_entries_to_back(entries);
    let mut pool = SkinPool::new(skins, &entries, rng);

    for entry in entries.iter_mut() {
        let car = match entry.car.take() {
            Some(car) => car,
            None => cars
                .choose_biased(rng)
                .ok_or_else(|| EntryListError::Config("car catalog is empty".to_string()))?
                .to_string(),
        };

        if entry.skin.is_none() {
            let skin = pool
                .draw(&car, rng)
                .ok_or_else(|| EntryListError::EmptySkinList(car.clone()))?;
            entry.skin = Some(skin);
        }

        entry.car = Some(car);
    }

    Ok(entries)
}
