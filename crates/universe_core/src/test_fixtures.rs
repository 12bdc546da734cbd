//! Shared test fixtures for universe_core and downstream crates.
//!
//! `base_content()` mirrors the shipped defaults (50/30 distance thresholds,
//! 1..=7 planets) with small, fully weighted tables. `system_at` and
//! `planet_in` build hand-placed universes for checker scenarios.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::geometry::{orbit_position, Orbit, Point3};
use crate::placement::roll_properties;
use crate::{
    Constants, Planet, PlanetId, PlanetTypeDef, StarSystem, StarSystemId, StarType, Universe,
    UniverseContent, WeightTable,
};

fn table(entries: &[(&str, f64)]) -> WeightTable {
    entries
        .iter()
        .map(|(name, weight)| ((*name).to_string(), *weight))
        .collect()
}

fn planet_type(weight: f64, terrains: &[(&str, f64)], resources: &[(&str, f64)]) -> PlanetTypeDef {
    PlanetTypeDef {
        weight,
        sizes: table(&[("small", 3.0), ("medium", 5.0), ("large", 2.0)]),
        temperatures: table(&[("cold", 1.0), ("temperate", 2.0), ("hot", 1.0)]),
        atmospheres: table(&[("none", 1.0), ("thin", 2.0), ("breathable", 1.0)]),
        terrains: table(terrains),
        resources: table(resources),
    }
}

/// Default constants with three regular planet types and a zero-weight
/// `exotic` type that must never be rolled.
pub fn base_content() -> UniverseContent {
    UniverseContent {
        content_version: "test".to_string(),
        constants: Constants {
            min_system_distance: 50.0,
            too_close_distance: 30.0,
            max_generation_attempts: 100,
            min_origin_distance: 50.0,
            max_origin_distance: 400.0,
            range_expansion: 200.0,
            min_planets_per_system: 1,
            max_planets_per_system: 7,
            orbit_spacing: 4.0,
            orbit_jitter: 1.5,
            coordinate_tolerance: 0.01,
            exploration_radius: 150.0,
            max_nearby_systems: 5,
            max_resources_per_planet: 3,
            star_type_weights: StarType::ALL.iter().map(|t| (*t, 1.0)).collect(),
        },
        planet_types: BTreeMap::from([
            (
                "terrestrial".to_string(),
                planet_type(
                    5.0,
                    &[("rocky", 2.0), ("oceanic", 1.0)],
                    &[("iron", 3.0), ("water", 2.0), ("silicates", 1.0)],
                ),
            ),
            (
                "gas_giant".to_string(),
                planet_type(
                    3.0,
                    &[("gaseous", 1.0)],
                    &[("hydrogen", 3.0), ("helium", 2.0), ("methane", 1.0)],
                ),
            ),
            (
                "ice".to_string(),
                planet_type(
                    2.0,
                    &[("glacial", 1.0), ("cratered", 1.0)],
                    &[("water", 3.0), ("ammonia", 1.0), ("nitrogen", 1.0)],
                ),
            ),
            (
                "exotic".to_string(),
                planet_type(0.0, &[("crystalline", 1.0)], &[("antimatter", 1.0)]),
            ),
        ]),
    }
}

/// Deterministic RNG seeded with 42.
pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

pub fn orbit(distance: f64, angle_deg: f64, inclination_deg: f64) -> Orbit {
    Orbit {
        distance,
        angle_deg,
        inclination_deg,
    }
}

/// Empty undiscovered yellow dwarf at `position`.
pub fn system_at(
    universe: &mut Universe,
    name: &str,
    position: Point3,
    rng: &mut impl Rng,
) -> StarSystemId {
    let id = StarSystemId(crate::id::next_ulid(rng));
    universe.insert_star_system(StarSystem::new(
        id,
        name.to_string(),
        position,
        StarType::YellowDwarf,
        false,
    ))
}

/// Consistent planet on `orbit` around `system_id`: coordinates derived,
/// property attached, cached count advanced.
pub fn planet_in(
    universe: &mut Universe,
    system_id: &StarSystemId,
    orbit: Orbit,
    rng: &mut impl Rng,
) -> PlanetId {
    let system = &universe.star_systems[system_id];
    let index = universe.planets_in_system(system_id).len();
    let planet = Planet::new(
        PlanetId(crate::id::next_ulid(rng)),
        crate::planet_name(&system.name, index),
        Some(system_id.clone()),
        Some(orbit),
        Some(orbit_position(system.position(), orbit)),
    );
    let property = roll_properties(&base_content(), &planet, rng);
    let id = universe.insert_planet(planet, Some(property));
    if let Some(system) = universe.star_systems.get_mut(system_id) {
        system.planet_count += 1;
    }
    id
}
