//! Home planet assignment for newly registered users.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::consistency::actual_planet_counts;
use crate::generator::{generate_systems, GenerateParams};
use crate::placement::place_planets;
use crate::{PlanetId, Universe, UniverseContent, UserId};

#[derive(Debug, thiserror::Error)]
pub enum HomePlanetError {
    #[error("unknown user {0}")]
    UnknownUser(UserId),
    #[error(
        "no room for a home system after {attempts} attempts \
         and no discovered system has spare capacity"
    )]
    NoSpace { attempts: u32 },
}

/// Give `user_id` a home planet and return it.
///
/// A user whose home planet exists and sits in a star system keeps it.
/// Otherwise one discovered system is generated and one of its planets is
/// picked. When no position is free, an extra planet is placed in the
/// emptiest discovered system that still has room.
pub fn assign_home_planet(
    universe: &mut Universe,
    content: &UniverseContent,
    user_id: &UserId,
    rng: &mut impl Rng,
) -> Result<PlanetId, HomePlanetError> {
    let user = universe
        .users
        .get(user_id)
        .ok_or_else(|| HomePlanetError::UnknownUser(user_id.clone()))?;
    if let Some(current) = &user.home_planet_id {
        if universe.planet_with_system(current).is_some() {
            return Ok(current.clone());
        }
    }

    let mut params = GenerateParams::from_constants(1, &content.constants);
    params.discovered = true;
    let outcome = generate_systems(universe, content, &params, rng);

    let planet_id = match outcome.created.first() {
        Some(system_id) => {
            let planets: Vec<PlanetId> = universe
                .planets_in_system(system_id)
                .iter()
                .map(|p| p.id.clone())
                .collect();
            planets.choose(rng).cloned()
        }
        None => place_in_discovered_system(universe, content, rng),
    };
    let planet_id = planet_id.ok_or(HomePlanetError::NoSpace {
        attempts: params.max_attempts,
    })?;

    universe.set_home_planet(user_id, Some(planet_id.clone()));
    tracing::info!(user = %user_id, planet = %planet_id, "home planet assigned");
    Ok(planet_id)
}

fn place_in_discovered_system(
    universe: &mut Universe,
    content: &UniverseContent,
    rng: &mut impl Rng,
) -> Option<PlanetId> {
    let counts = actual_planet_counts(universe);
    let max = content.constants.max_planets_per_system;
    let host = universe
        .sorted_system_ids()
        .into_iter()
        .filter(|id| universe.star_systems[id].discovered)
        .map(|id| (counts.get(&id).copied().unwrap_or(0), id))
        .filter(|(count, _)| *count < max)
        .min()?
        .1;
    tracing::debug!(system = %host, "home generation exhausted, reusing discovered system");
    place_planets(universe, content, &host, 1, rng).into_iter().next()
}
