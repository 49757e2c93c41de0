use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use std::collections::{HashMap, HashSet};

use crate::{EntryListError, Result};

/// Weight given to a car in random draws unless it is flagged less popular.
const POPULAR_WEIGHT: u32 = 2;
const LESS_POPULAR_WEIGHT: u32 = 1;

#[derive(Copy, Clone, Debug)]
pub struct CarSpec {
    pub model: &'static str,
    pub nicknames: &'static [&'static str],
    pub less_popular: bool,
}

pub const GT3_CARS: &[CarSpec] = &[
    CarSpec {
        model: "ks_ferrari_488_gt3",
        nicknames: &["Ferrari", "488", "F488"],
        less_popular: false,
    },
    CarSpec {
        model: "ks_audi_r8_lms_2016",
        nicknames: &["Audi", "R8"],
        less_popular: false,
    },
    CarSpec {
        model: "bmw_z4_gt3",
        nicknames: &["BMW", "Bimmer", "Z4"],
        less_popular: false,
    },
    CarSpec {
        model: "ks_glickenhaus_scg003",
        nicknames: &["Glickenhaus", "SCG"],
        less_popular: false,
    },
    CarSpec {
        model: "ks_lamborghini_huracan_gt3",
        nicknames: &["Lambo", "Huracan", "Lamborghini"],
        less_popular: false,
    },
    CarSpec {
        model: "ks_mclaren_650_gt3",
        nicknames: &["650s", "Macca", "McLaren"],
        less_popular: false,
    },
    CarSpec {
        model: "ks_mercedes_amg_gt3",
        nicknames: &["Merc", "Mercedes", "AMG"],
        less_popular: true,
    },
    CarSpec {
        model: "ks_nissan_gtr_gt3",
        nicknames: &["Nissan", "GTR", "GT-R", "Godzilla"],
        less_popular: false,
    },
    CarSpec {
        model: "ks_porsche_911_gt3_r_2016",
        nicknames: &["Porsche", "911"],
        less_popular: false,
    },
];

/// Picks one item with probability proportional to its weight.
///
/// Returns `None` when `items` is empty or every weight is zero.
pub fn weighted_choice<'a, T, R>(items: &'a [(T, u32)], rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    let dist = WeightedIndex::new(items.iter().map(|(_, w)| *w)).ok()?;
    Some(&items[dist.sample(rng)].0)
}

/// Immutable table of the cars a server can run, keyed by user-typed nickname.
#[derive(Debug, Clone)]
pub struct CarCatalog {
    cars: Vec<String>,
    less_popular: HashSet<String>,
    nicknames: HashMap<String, String>,
}

impl CarCatalog {
    /// Builds a catalog, rejecting any name that would point at two cars.
    pub fn from_specs(specs: &[CarSpec]) -> Result<Self> {
        let mut cars = Vec::with_capacity(specs.len());
        let mut less_popular = HashSet::new();
        let mut nicknames: HashMap<String, String> = HashMap::new();

        // Canonical ids go in first so a nickname can never shadow one.
        for spec in specs {
            let previous = nicknames.insert(spec.model.to_lowercase(), spec.model.to_string());
            if let Some(other) = previous {
                return Err(EntryListError::Config(format!(
                    "car id {} clashes with {other}",
                    spec.model
                )));
            }
            cars.push(spec.model.to_string());
            if spec.less_popular {
                less_popular.insert(spec.model.to_string());
            }
        }

        for spec in specs {
            for nick in spec.nicknames {
                let key = nick.to_lowercase();
                match nicknames.get(&key) {
                    Some(car) if car != spec.model => {
                        return Err(EntryListError::Config(format!(
                            "nickname {nick:?} of {} already names {car}",
                            spec.model
                        )));
                    }
                    Some(_) => {}
                    None => {
                        nicknames.insert(key, spec.model.to_string());
                    }
                }
            }
        }

        Ok(Self {
            cars,
            less_popular,
            nicknames,
        })
    }

    /// The GT3 grid used by the league servers.
    pub fn gt3() -> Result<Self> {
        Self::from_specs(GT3_CARS)
    }

    pub fn resolve(&self, nickname: &str) -> Option<&str> {
        if nickname.is_empty() {
            return None;
        }
        self.nicknames
            .get(&nickname.to_lowercase())
            .map(String::as_str)
    }

    pub fn cars(&self) -> &[String] {
        &self.cars
    }

    pub fn contains(&self, car: &str) -> bool {
        self.cars.iter().any(|c| c == car)
    }

    pub fn is_less_popular(&self, car: &str) -> bool {
        self.less_popular.contains(car)
    }

    pub fn weighted_cars(&self) -> Vec<(&str, u32)> {
        self.cars
            .iter()
            .map(|car| {
                let weight = if self.is_less_popular(car) {
                    LESS_POPULAR_WEIGHT
                } else {
                    POPULAR_WEIGHT
                };
                (car.as_str(), weight)
            })
            .collect()
    }

    /// Every car repeated by its weight, in catalog order.
    pub fn biased_cars(&self) -> Vec<&str> {
        self.weighted_cars()
            .into_iter()
            .flat_map(|(car, weight)| std::iter::repeat(car).take(weight as usize))
            .collect()
    }

    pub fn choose_biased<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        weighted_choice(&self.weighted_cars(), rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn resolves_nicknames_case_insensitively() {
        let catalog = CarCatalog::gt3().unwrap();
        assert_eq!(catalog.resolve("FERRARI"), Some("ks_ferrari_488_gt3"));
        assert_eq!(catalog.resolve("godzilla"), Some("ks_nissan_gtr_gt3"));
        assert_eq!(catalog.resolve("gt-r"), Some("ks_nissan_gtr_gt3"));
    }

    #[test]
    fn canonical_ids_resolve_to_themselves() {
        let catalog = CarCatalog::gt3().unwrap();
        for car in catalog.cars() {
            assert_eq!(catalog.resolve(car), Some(car.as_str()));
        }
    }

    #[test]
    fn empty_and_unknown_nicknames_do_not_resolve() {
        let catalog = CarCatalog::gt3().unwrap();
        assert_eq!(catalog.resolve(""), None);
        assert_eq!(catalog.resolve("trabant"), None);
        assert_eq!(catalog.resolve("tbd"), None);
    }

    #[test]
    fn biased_list_doubles_popular_cars() {
        let catalog = CarCatalog::gt3().unwrap();
        let biased = catalog.biased_cars();
        assert_eq!(biased.len(), catalog.cars().len() * 2 - 1);
        assert_eq!(
            biased.iter().filter(|c| **c == "ks_mercedes_amg_gt3").count(),
            1
        );
        assert_eq!(
            biased.iter().filter(|c| **c == "ks_ferrari_488_gt3").count(),
            2
        );
    }

    #[test]
    fn weighted_choice_skips_zero_weights() {
        let mut rng = StdRng::seed_from_u64(7);
        let items = [("never", 0), ("always", 3)];
        for _ in 0..50 {
            assert_eq!(weighted_choice(&items, &mut rng), Some(&"always"));
        }
    }

    #[test]
    fn weighted_choice_on_empty_is_none() {
        let mut rng = StdRng::seed_from_u64(7);
        let items: [(&str, u32); 0] = [];
        assert_eq!(weighted_choice(&items, &mut rng), None);
    }

    #[test]
    fn biased_draw_favours_popular_cars() {
        const SPECS: &[CarSpec] = &[
            CarSpec {
                model: "popular",
                nicknames: &[],
                less_popular: false,
            },
            CarSpec {
                model: "niche",
                nicknames: &[],
                less_popular: true,
            },
        ];
        let catalog = CarCatalog::from_specs(SPECS).unwrap();
        let mut rng = StdRng::seed_from_u64(0xAC);
        let mut popular = 0;
        for _ in 0..3000 {
            if catalog.choose_biased(&mut rng) == Some("popular") {
                popular += 1;
            }
        }
        // Expect roughly two thirds.
        assert!((1800..2200).contains(&popular), "popular drawn {popular} times");
    }

    #[test]
    fn nickname_cannot_shadow_another_car_id() {
        const SPECS: &[CarSpec] = &[
            CarSpec {
                model: "car_x",
                nicknames: &[],
                less_popular: false,
            },
            CarSpec {
                model: "car_y",
                nicknames: &["CAR_X"],
                less_popular: false,
            },
        ];
        let err = CarCatalog::from_specs(SPECS).unwrap_err();
        assert!(matches!(err, EntryListError::Config(msg) if msg.contains("car_x")));
    }

    #[test]
    fn nickname_shared_by_two_cars_is_rejected() {
        const SPECS: &[CarSpec] = &[
            CarSpec {
                model: "car_x",
                nicknames: &["fast"],
                less_popular: false,
            },
            CarSpec {
                model: "car_y",
                nicknames: &["Fast"],
                less_popular: false,
            },
        ];
        assert!(matches!(
            CarCatalog::from_specs(SPECS),
            Err(EntryListError::Config(_))
        ));
    }

    #[test]
    fn case_variants_of_ids_clash() {
        const SPECS: &[CarSpec] = &[
            CarSpec {
                model: "car_x",
                nicknames: &[],
                less_popular: false,
            },
            CarSpec {
                model: "CAR_X",
                nicknames: &[],
                less_popular: false,
            },
        ];
        assert!(CarCatalog::from_specs(SPECS).is_err());
    }

    #[test]
    fn own_id_as_nickname_is_allowed() {
        const SPECS: &[CarSpec] = &[CarSpec {
            model: "car_x",
            nicknames: &["CAR_X", "x"],
            less_popular: false,
        }];
        let catalog = CarCatalog::from_specs(SPECS).unwrap();
        assert_eq!(catalog.resolve("car_x"), Some("car_x"));
        assert_eq!(catalog.resolve("X"), Some("car_x"));
    }
}
