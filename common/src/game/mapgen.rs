//! Map generation (spec.md §4.2): a one-shot procedure run once per game at
//! the `waiting -> active` transition.

use rand::{seq::SliceRandom, Rng, RngCore};

use crate::conf;
use crate::util::{GridSize, Location};

use super::building::{Building, BuildingType};
use super::ids::{BuildingId, MechId, PlanetId, PlayerId};
use super::mech::{next_designation, Mech, MechType};
use super::planet::Planet;

/// A modest baked-in dictionary of planet names, drawn without replacement;
/// overflow falls back to `Planet-N`.
const PLANET_NAMES: &[&str] = &[
    "Aldebaran", "Borealis", "Callisto", "Drakmoor", "Elysium", "Farrow", "Gyr", "Hespera",
    "Icarion", "Jotunn", "Kelvara", "Lyreth", "Mordane", "Nyxara", "Obsidia", "Pyreth", "Quor",
    "Ravenna", "Sarnath", "Tephra", "Umbriel", "Veyron", "Wraithmoor", "Xandril", "Ysolde",
    "Zephyron", "Ashfall", "Brinehold", "Cindravale", "Duskmere", "Emberrun", "Frostgate",
    "Glasswick", "Hollowmere", "Irontide", "Jadewatch", "Kestrelhold", "Lumenfall", "Mirewood",
    "Nightspar", "Oakhollow", "Palisade", "Quietmoor", "Redshale", "Stonebrook", "Thornfield",
    "Underglen", "Vesperfall", "Westreach", "Yewmarsh",
];

pub struct GenerationFailed;

pub struct GeneratedPlanet {
    pub planet: Planet,
    pub buildings: Vec<Building>,
    pub mechs: Vec<Mech>,
}

pub struct GeneratedMap {
    pub grid_size: GridSize,
    pub planets: Vec<GeneratedPlanet>,
}

/// Generate homeworlds for `players` (in order) plus regular planets, per
/// spec.md §4.2's placement rules.
pub fn generate<R: RngCore>(
    grid_size: GridSize,
    players: &[PlayerId],
    rng: &mut R,
) -> Result<GeneratedMap, GenerationFailed> {
    let mut names: Vec<&str> = PLANET_NAMES.to_vec();
    names.shuffle(rng);
    let mut name_iter = names.into_iter();
    let mut next_name = |n: usize| -> String {
        name_iter
            .next()
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("Planet-{}", n))
    };

    let mut planet_id = PlanetId::new(0);
    let mut building_id = BuildingId::new(0);
    let mut mech_id = MechId::new(0);
    let mut homeworld_locs: Vec<Location> = Vec::new();
    let mut all_locs: Vec<Location> = Vec::new();
    let mut generated = Vec::new();

    for (i, &owner) in players.iter().enumerate() {
        let loc = sample_homeworld(grid_size, &homeworld_locs, rng)?;
        homeworld_locs.push(loc);
        all_locs.push(loc);

        planet_id = planet_id.next();
        let mut planet = Planet::new(planet_id, loc, conf::HOMEWORLD_BASE_INCOME, next_name(i));
        planet.homeworld = true;
        planet.owner = Some(owner);
        planet.original_owner = Some(owner);

        building_id = building_id.next();
        let factory = Building::new(building_id, planet_id, BuildingType::Factory);

        let mut mechs = Vec::with_capacity(2);
        for serial in 0..2u64 {
            mech_id = mech_id.next();
            let designation = next_designation(MechType::Light, serial);
            mechs.push(Mech::new(mech_id, owner, MechType::Light, loc, designation));
        }

        generated.push(GeneratedPlanet {
            planet,
            buildings: vec![factory],
            mechs,
        });
    }

    let target_regular = (grid_size.area() as f64 * conf::REGULAR_PLANET_DENSITY) as i64
        - players.len() as i64;
    let target_regular = target_regular.max(0) as usize;
    let max_attempts = conf::MAX_PLANET_ATTEMPTS_FACTOR as usize * target_regular.max(1);

    let mut placed = 0usize;
    let mut attempts = 0usize;
    while placed < target_regular && attempts < max_attempts {
        attempts += 1;
        let loc = Location::new(rng.gen_range(0, grid_size.0), rng.gen_range(0, grid_size.0));
        if all_locs
            .iter()
            .any(|&other| loc.euclidean_distance(other) < conf::MIN_PLANET_SPACING)
        {
            continue;
        }

        all_locs.push(loc);
        planet_id = planet_id.next();
        let income = rng.gen_range(
            conf::REGULAR_PLANET_INCOME_RANGE.0,
            conf::REGULAR_PLANET_INCOME_RANGE.1 + 1,
        );
        let planet = Planet::new(planet_id, loc, income, next_name(players.len() + placed));
        generated.push(GeneratedPlanet {
            planet,
            buildings: Vec::new(),
            mechs: Vec::new(),
        });
        placed += 1;
    }

    Ok(GeneratedMap {
        grid_size,
        planets: generated,
    })
}

fn sample_homeworld<R: RngCore>(
    grid_size: GridSize,
    existing: &[Location],
    rng: &mut R,
) -> Result<Location, GenerationFailed> {
    let margin = (grid_size.0 as f64 * conf::HOMEWORLD_EDGE_MARGIN) as u16;
    let margin = margin.max(1);
    let half = conf::MAX_HOMEWORLD_ATTEMPTS / 2;

    for attempt in 0..conf::MAX_HOMEWORLD_ATTEMPTS {
        let loc = if attempt < half {
            sample_edge(grid_size, margin, rng)
        } else {
            sample_margin_box(grid_size, margin, rng)
        };

        if existing
            .iter()
            .all(|&other| loc.euclidean_distance(other) >= conf::MIN_HOMEWORLD_SPACING)
        {
            return Ok(loc);
        }
    }

    Err(GenerationFailed)
}

fn sample_edge<R: RngCore>(grid_size: GridSize, margin: u16, rng: &mut R) -> Location {
    let max = grid_size.0 - 1;
    match rng.gen_range(0, 4) {
        0 => Location::new(rng.gen_range(0, margin.max(1)), rng.gen_range(0, grid_size.0)),
        1 => Location::new(max - rng.gen_range(0, margin.max(1)), rng.gen_range(0, grid_size.0)),
        2 => Location::new(rng.gen_range(0, grid_size.0), rng.gen_range(0, margin.max(1))),
        _ => Location::new(rng.gen_range(0, grid_size.0), max - rng.gen_range(0, margin.max(1))),
    }
}

fn sample_margin_box<R: RngCore>(grid_size: GridSize, margin: u16, rng: &mut R) -> Location {
    let lo = margin;
    let hi = (grid_size.0.saturating_sub(margin)).max(lo + 1);
    Location::new(rng.gen_range(lo, hi), rng.gen_range(lo, hi))
}
