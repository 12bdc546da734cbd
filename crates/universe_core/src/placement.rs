//! Planet placement: orbital parameters, derived absolute coordinates, and
//! physical properties drawn from the planet type tables.

use rand::Rng;

use crate::geometry::{orbit_position, Orbit};
use crate::names::planet_name;
use crate::weighted::{weighted_pick, weighted_sample_distinct};
use crate::{
    Constants, Planet, PlanetId, PlanetProperty, PlanetPropertyId, StarSystemId, Universe,
    UniverseContent, WeightTable,
};

const UNKNOWN: &str = "unknown";

/// Add `count` planets to `system_id`, continuing after any planets it
/// already has. Returns the new planet ids, innermost first.
///
/// Each planet is inserted together with its property row, and the system's
/// cached `planet_count` is advanced by the number placed.
pub fn place_planets(
    universe: &mut Universe,
    content: &UniverseContent,
    system_id: &StarSystemId,
    count: u32,
    rng: &mut impl Rng,
) -> Vec<PlanetId> {
    let Some(system) = universe.star_systems.get(system_id) else {
        return Vec::new();
    };
    let origin = system.position();
    let system_name = system.name.clone();
    let first_slot = universe.planets_in_system(system_id).len();

    let mut created = Vec::new();
    for offset in 0..count as usize {
        let slot = first_slot + offset;
        let orbit = random_orbit(slot, &content.constants, rng);
        let planet_id = PlanetId(crate::id::next_ulid(rng));
        let planet = Planet::new(
            planet_id.clone(),
            planet_name(&system_name, slot),
            Some(system_id.clone()),
            Some(orbit),
            Some(orbit_position(origin, orbit)),
        );
        let property = roll_properties(content, &planet, rng);
        universe.insert_planet(planet, Some(property));
        created.push(planet_id);
    }

    if let Some(system) = universe.star_systems.get_mut(system_id) {
        system.planet_count += u32::try_from(created.len()).unwrap_or(u32::MAX);
        system.touch();
    }
    tracing::debug!(system = %system_id, placed = created.len(), "planets placed");
    created
}

/// Orbital parameters for orbit slot `slot` (0-based), already rounded.
///
/// Distance grows with the slot so siblings do not stack on one orbit.
pub fn random_orbit(slot: usize, constants: &Constants, rng: &mut impl Rng) -> Orbit {
    let base = (slot + 1) as f64 * constants.orbit_spacing;
    let jitter = if constants.orbit_jitter > 0.0 {
        rng.gen_range(0.0..constants.orbit_jitter)
    } else {
        0.0
    };
    Orbit {
        distance: base + jitter,
        angle_deg: rng.gen_range(0.0..360.0),
        inclination_deg: rng.gen_range(-90.0..=90.0),
    }
    .rounded()
}

/// Draw a property row for `planet`: type first, then that type's nested
/// tables.
pub fn roll_properties(
    content: &UniverseContent,
    planet: &Planet,
    rng: &mut impl Rng,
) -> PlanetProperty {
    let type_weights = content
        .planet_types
        .iter()
        .map(|(name, def)| (name, &def.weight));
    let picked = weighted_pick(type_weights, rng);
    let def = picked.and_then(|name| content.planet_types.get(name));
    let planet_type = picked.cloned().unwrap_or_else(|| UNKNOWN.to_string());

    let (size, temperature, atmosphere, terrain, resources) = match def {
        Some(def) => {
            let max = content.constants.max_resources_per_planet;
            let resource_count = if max == 0 { 0 } else { rng.gen_range(1..=max) };
            (
                pick_or_unknown(&def.sizes, rng),
                pick_or_unknown(&def.temperatures, rng),
                pick_or_unknown(&def.atmospheres, rng),
                pick_or_unknown(&def.terrains, rng),
                weighted_sample_distinct(&def.resources, resource_count as usize, rng)
                    .into_iter()
                    .cloned()
                    .collect(),
            )
        }
        None => (
            UNKNOWN.to_string(),
            UNKNOWN.to_string(),
            UNKNOWN.to_string(),
            UNKNOWN.to_string(),
            Vec::new(),
        ),
    };

    let description = describe(&planet.name, &planet_type, &size, &atmosphere, &terrain);
    PlanetProperty {
        id: PlanetPropertyId(crate::id::next_ulid(rng)),
        planet_id: planet.id.clone(),
        planet_type,
        size,
        temperature,
        atmosphere,
        terrain,
        resources,
        description,
    }
}

fn pick_or_unknown(table: &WeightTable, rng: &mut impl Rng) -> String {
    weighted_pick(table, rng)
        .cloned()
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn describe(name: &str, planet_type: &str, size: &str, atmosphere: &str, terrain: &str) -> String {
    let planet_type = planet_type.replace('_', " ");
    let terrain = terrain.replace('_', " ");
    let atmosphere = atmosphere.replace('_', " ");
    format!(
        "{name} is a {size} {planet_type} planet with {atmosphere} atmosphere \
         over {terrain} terrain."
    )
}
