//! Gated repairs. Each pass reads the current tables (not the scan's issue
//! list), so passes compose in any order and a rerun finds nothing to do.

use std::collections::HashMap;

use rand::Rng;

use crate::consistency::classify::{
    actual_planet_counts, expected_planet_position, too_close_pairs,
};
use crate::consistency::RepairSummary;
use crate::generator::{
    coordinate_range, create_system, sample_position, GenerateParams, SpacingRules,
};
use crate::geometry::{distance, orbit_position, to_absolute, Orbit, Point3};
use crate::placement::{place_planets, random_orbit, roll_properties};
use crate::{Constants, PlanetId, StarSystem, StarSystemId, Universe, UniverseContent};

/// Detach the outermost planets of systems over the per-system limit. They
/// become orphans for [`rehome_orphans`] to pick up.
pub(super) fn detach_overflow(
    universe: &mut Universe,
    constants: &Constants,
    repairs: &mut RepairSummary,
) {
    let limit = constants.max_planets_per_system as usize;
    for system_id in universe.sorted_system_ids() {
        let overflow: Vec<PlanetId> = universe
            .planets_in_system(&system_id)
            .iter()
            .skip(limit)
            .map(|p| p.id.clone())
            .collect();
        if overflow.is_empty() {
            continue;
        }
        for planet_id in &overflow {
            if let Some(planet) = universe.planets.get_mut(planet_id) {
                planet.star_system_id = None;
                planet.touch();
            }
        }
        universe.set_planet_count(&system_id, constants.max_planets_per_system);
        tracing::info!(system = %system_id, detached = overflow.len(), "overflow planets detached");
        repairs.overflow_detached += overflow.len();
    }
}

/// Attach every orphan to a system with spare capacity, creating a new
/// undiscovered system when none has room.
///
/// An orphan with coordinates goes to the nearest system with room; one
/// without goes to the emptiest. Its orbit is kept when complete.
pub(super) fn rehome_orphans(
    universe: &mut Universe,
    content: &UniverseContent,
    rng: &mut impl Rng,
    repairs: &mut RepairSummary,
) {
    let constants = &content.constants;
    let mut counts = actual_planet_counts(universe);

    for planet_id in universe.orphan_planet_ids() {
        let Some(planet) = universe.planets.get(&planet_id) else {
            continue;
        };
        let last_position = planet.position();
        let kept_orbit = planet.orbit();

        let host = match pick_host(universe, &counts, last_position, constants) {
            Some(host) => host,
            None => {
                let Some(host) = create_host(universe, content, rng) else {
                    tracing::warn!(planet = %planet_id, "no room for a new host system");
                    repairs.orphans_unresolved += 1;
                    continue;
                };
                repairs.systems_created += 1;
                counts.insert(host.clone(), 0);
                host
            }
        };

        let slot = counts.get(&host).copied().unwrap_or(0) as usize;
        let orbit = kept_orbit.unwrap_or_else(|| random_orbit(slot, constants, rng));
        let Some(origin) = universe.star_systems.get(&host).map(StarSystem::position) else {
            continue;
        };
        if let Some(planet) = universe.planets.get_mut(&planet_id) {
            planet.star_system_id = Some(host.clone());
            planet.set_orbit(orbit);
            planet.set_position(orbit_position(origin, orbit));
        }
        let count = counts.entry(host.clone()).or_insert(0);
        *count += 1;
        let count = *count;
        universe.set_planet_count(&host, count);
        tracing::debug!(planet = %planet_id, system = %host, "orphan reassigned");
        repairs.orphans_assigned += 1;
    }
}

fn pick_host(
    universe: &Universe,
    counts: &HashMap<StarSystemId, u32>,
    near: Option<Point3>,
    constants: &Constants,
) -> Option<StarSystemId> {
    let open = universe.system_positions().into_iter().filter(|(id, _)| {
        counts.get(id).copied().unwrap_or(0) < constants.max_planets_per_system
    });
    match near {
        Some(point) => open
            .min_by(|a, b| {
                distance(point, a.1)
                    .total_cmp(&distance(point, b.1))
                    .then_with(|| a.0.cmp(&b.0))
            })
            .map(|(id, _)| id),
        None => open
            .min_by_key(|(id, _)| (counts.get(id).copied().unwrap_or(0), id.clone()))
            .map(|(id, _)| id),
    }
}

/// New empty system placed under the generation rules, or under the looser
/// too-close threshold when the generation rules find nothing.
fn create_host(
    universe: &mut Universe,
    content: &UniverseContent,
    rng: &mut impl Rng,
) -> Option<StarSystemId> {
    let constants = &content.constants;
    let obstacles: Vec<Point3> = universe
        .system_positions()
        .into_iter()
        .map(|(_, p)| p)
        .collect();
    let strict = GenerateParams::from_constants(1, constants).spacing();
    let loose = SpacingRules {
        min_distance: constants.too_close_distance,
        ..strict
    };

    let position = [strict, loose].iter().find_map(|rules| {
        let range = coordinate_range(
            &obstacles,
            rules.min_distance,
            false,
            constants.range_expansion,
            rules.max_origin_distance,
        );
        sample_position(range, rules, &obstacles, rng)
    })?;
    let id = create_system(universe, content, position, false, rng);
    tracing::info!(system = %id, "host system created for orphans");
    Some(id)
}

/// Move one system of every too-close pair.
///
/// Of a pair, the system hosting no home planet moves; if both or neither
/// do, the second of the pair moves. New positions are drawn from a shell
/// around the current one first, then from the whole cube. Planets of a
/// moved system are carried along.
pub(super) fn relocate_crowded_systems(
    universe: &mut Universe,
    constants: &Constants,
    rng: &mut impl Rng,
    repairs: &mut RepairSummary,
) {
    let homes = universe.home_system_ids();
    for (a, b, _) in too_close_pairs(universe, constants.too_close_distance) {
        let (Some(pa), Some(pb)) = (
            universe.star_systems.get(&a).map(StarSystem::position),
            universe.star_systems.get(&b).map(StarSystem::position),
        ) else {
            continue;
        };
        // An earlier move in this pass may already have split the pair.
        if distance(pa, pb) >= constants.too_close_distance {
            continue;
        }
        let mover = if homes.contains(&b) && !homes.contains(&a) {
            a
        } else {
            b
        };

        let obstacles: Vec<Point3> = universe
            .system_positions()
            .into_iter()
            .filter(|(id, _)| *id != mover)
            .map(|(_, p)| p)
            .collect();
        let current = universe.star_systems[&mover].position();
        let Some(position) = relocation_target(current, &obstacles, constants, rng) else {
            tracing::warn!(system = %mover, "no free position to relocate system to");
            repairs.relocations_failed += 1;
            continue;
        };

        universe.move_star_system(&mover, position);
        carry_planets(universe, &mover, position);
        tracing::info!(system = %mover, ?position, "system relocated");
        repairs.systems_relocated += 1;
    }
}

fn relocation_target(
    current: Point3,
    obstacles: &[Point3],
    constants: &Constants,
    rng: &mut impl Rng,
) -> Option<Point3> {
    let rules = GenerateParams::from_constants(1, constants).spacing();
    let shell = rules.min_distance;
    for _ in 0..rules.max_attempts {
        let candidate = to_absolute(
            current,
            rng.gen_range(shell..=shell * 4.0),
            rng.gen_range(0.0..360.0),
            rng.gen_range(-90.0..=90.0),
        )
        .rounded();
        if rules.accepts(candidate, obstacles) {
            return Some(candidate);
        }
    }

    let cube = coordinate_range(
        &[],
        rules.min_distance,
        false,
        constants.range_expansion,
        rules.max_origin_distance,
    );
    let loose = SpacingRules {
        min_distance: constants.too_close_distance,
        ..rules
    };
    sample_position(cube, &rules, obstacles, rng)
        .or_else(|| sample_position(cube, &loose, obstacles, rng))
}

fn carry_planets(universe: &mut Universe, system_id: &StarSystemId, origin: Point3) {
    let ids: Vec<PlanetId> = universe
        .planets_in_system(system_id)
        .iter()
        .map(|p| p.id.clone())
        .collect();
    for id in ids {
        if let Some(planet) = universe.planets.get_mut(&id) {
            if let Some(orbit) = planet.orbit() {
                planet.set_position(orbit_position(origin, orbit));
            }
        }
    }
}

/// Fill in missing orbital parameters. Components that are present are
/// kept; missing ones come from a random orbit for the planet's next slot.
pub(super) fn assign_missing_orbits(
    universe: &mut Universe,
    constants: &Constants,
    rng: &mut impl Rng,
    repairs: &mut RepairSummary,
) {
    for planet_id in universe.sorted_planet_ids() {
        let Some(planet) = universe.planets.get(&planet_id) else {
            continue;
        };
        if planet.has_complete_orbit() {
            continue;
        }
        let slot = match &planet.star_system_id {
            Some(system_id) => universe
                .planets_in_system(system_id)
                .iter()
                .filter(|p| p.has_complete_orbit())
                .count(),
            None => 0,
        };
        let drawn = random_orbit(slot, constants, rng);
        let Some(planet) = universe.planets.get_mut(&planet_id) else {
            continue;
        };
        let orbit = Orbit {
            distance: planet.orbital_distance.unwrap_or(drawn.distance),
            angle_deg: planet.orbital_angle.unwrap_or(drawn.angle_deg),
            inclination_deg: planet.orbital_inclination.unwrap_or(drawn.inclination_deg),
        };
        planet.set_orbit(orbit);
        repairs.orbits_assigned += 1;
    }
}

pub(super) fn attach_missing_properties(
    universe: &mut Universe,
    content: &UniverseContent,
    rng: &mut impl Rng,
    repairs: &mut RepairSummary,
) {
    for planet_id in universe.sorted_planet_ids() {
        if universe.planet_properties.contains_key(&planet_id) {
            continue;
        }
        let Some(planet) = universe.planets.get(&planet_id) else {
            continue;
        };
        let property = roll_properties(content, planet, rng);
        universe.insert_property(property);
        repairs.properties_created += 1;
    }
}

/// Give every system without planets a fresh set.
pub(super) fn fill_empty_systems(
    universe: &mut Universe,
    content: &UniverseContent,
    rng: &mut impl Rng,
    repairs: &mut RepairSummary,
) {
    let counts = actual_planet_counts(universe);
    let c = &content.constants;
    for system_id in universe.sorted_system_ids() {
        if counts.get(&system_id).copied().unwrap_or(0) > 0 {
            continue;
        }
        let count = rng.gen_range(c.min_planets_per_system..=c.max_planets_per_system);
        place_planets(universe, content, &system_id, count, rng);
        repairs.empty_systems_filled += 1;
    }
}

/// Rewrite stored coordinates of attached planets from their orbits.
pub(super) fn recompute_coordinates(universe: &mut Universe, repairs: &mut RepairSummary) {
    let mut updates = Vec::new();
    for planet_id in universe.sorted_planet_ids() {
        let Some((planet, system)) = universe.planet_with_system(&planet_id) else {
            continue;
        };
        let Some(expected) = expected_planet_position(system, planet) else {
            continue;
        };
        if planet.position().is_none_or(|stored| !stored.approx_eq(expected, 0.0)) {
            updates.push((planet_id, expected));
        }
    }
    for (planet_id, position) in updates {
        if let Some(planet) = universe.planets.get_mut(&planet_id) {
            planet.set_position(position);
            repairs.coordinates_fixed += 1;
        }
    }
}

pub(super) fn recompute_planet_counts(universe: &mut Universe, repairs: &mut RepairSummary) {
    let counts = actual_planet_counts(universe);
    for system_id in universe.sorted_system_ids() {
        let actual = counts.get(&system_id).copied().unwrap_or(0);
        if universe.set_planet_count(&system_id, actual) {
            repairs.planet_counts_fixed += 1;
        }
    }
}

/// Clear home planets that no longer exist. Orphaned homes stay linked
/// until the orphan pass reattaches them.
pub(super) fn clear_invalid_home_planets(universe: &mut Universe, repairs: &mut RepairSummary) {
    for user_id in universe.sorted_user_ids() {
        let Some(planet_id) = universe.users[&user_id].home_planet_id.clone() else {
            continue;
        };
        if !universe.planets.contains_key(&planet_id) {
            universe.set_home_planet(&user_id, None);
            tracing::info!(user = %user_id, planet = %planet_id, "invalid home planet cleared");
            repairs.home_planets_cleared += 1;
        }
    }
}
