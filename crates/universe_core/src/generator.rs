//! Star system generation by rejection sampling under a minimum-distance
//! constraint.
//!
//! Every candidate is checked against all systems that existed before the
//! batch and every system accepted earlier in the same batch. The in-batch
//! positions are accumulated in memory rather than re-read from the tables.

use std::collections::HashSet;

use rand::Rng;
use serde::Serialize;

use crate::geometry::{distance, Point3};
use crate::names::unique_system_name;
use crate::placement::place_planets;
use crate::weighted::weighted_pick;
use crate::{Constants, StarSystem, StarSystemId, StarType, Universe, UniverseContent};

#[derive(Debug, Clone)]
pub struct GenerateParams {
    pub count: u32,
    pub min_distance: f64,
    /// Candidate draws per system before that system is given up on.
    pub max_attempts: u32,
    /// Pad the sampling cube by `range_expansion` beyond known space.
    pub expand_range: bool,
    pub min_origin_distance: f64,
    pub max_origin_distance: f64,
    /// Systems left out of the sampling-range extents. They still count as
    /// distance obstacles and are never moved.
    pub exclude: HashSet<StarSystemId>,
    pub discovered: bool,
}

impl GenerateParams {
    /// Undiscovered-pool defaults taken from `constants`.
    pub fn from_constants(count: u32, constants: &Constants) -> Self {
        Self {
            count,
            min_distance: constants.min_system_distance,
            max_attempts: constants.max_generation_attempts,
            expand_range: false,
            min_origin_distance: constants.min_origin_distance,
            max_origin_distance: constants.max_origin_distance,
            exclude: HashSet::new(),
            discovered: false,
        }
    }

    pub fn spacing(&self) -> SpacingRules {
        SpacingRules {
            min_distance: self.min_distance,
            min_origin_distance: self.min_origin_distance,
            max_origin_distance: self.max_origin_distance,
            max_attempts: self.max_attempts,
        }
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct GenerationOutcome {
    pub created: Vec<StarSystemId>,
    /// Systems skipped because no valid position was found.
    pub failed: u32,
    pub planets_created: usize,
}

/// Acceptance rules for a candidate system position.
#[derive(Debug, Clone, Copy)]
pub struct SpacingRules {
    pub min_distance: f64,
    pub min_origin_distance: f64,
    pub max_origin_distance: f64,
    pub max_attempts: u32,
}

impl SpacingRules {
    pub fn accepts(&self, candidate: Point3, obstacles: &[Point3]) -> bool {
        let from_origin = distance(Point3::ORIGIN, candidate);
        if from_origin < self.min_origin_distance || from_origin > self.max_origin_distance {
            return false;
        }
        obstacles
            .iter()
            .all(|o| distance(*o, candidate) >= self.min_distance)
    }
}

/// Cube `[min, max]³` candidate coordinates are drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateRange {
    pub min: f64,
    pub max: f64,
}

/// Sampling cube derived from the extents of `known` positions.
///
/// Known space is padded by twice `min_distance` (plus `range_expansion`
/// when expanding) and clipped to the `±max_origin_distance` cube. With no
/// known positions, or when clipping leaves less than `min_distance` of
/// span, the full cube is used.
pub fn coordinate_range(
    known: &[Point3],
    min_distance: f64,
    expand: bool,
    range_expansion: f64,
    max_origin_distance: f64,
) -> CoordinateRange {
    let full = CoordinateRange {
        min: -max_origin_distance,
        max: max_origin_distance,
    };
    if known.is_empty() {
        return full;
    }

    let axes = || known.iter().flat_map(|p| [p.x, p.y, p.z]);
    let lo = axes().fold(f64::INFINITY, f64::min);
    let hi = axes().fold(f64::NEG_INFINITY, f64::max);
    let mut pad = min_distance * 2.0;
    if expand {
        pad += range_expansion;
    }

    let range = CoordinateRange {
        min: (lo - pad).max(full.min),
        max: (hi + pad).min(full.max),
    };
    if range.max - range.min < min_distance {
        full
    } else {
        range
    }
}

/// Draw up to `rules.max_attempts` candidates uniformly in `range` and
/// return the first one `rules` accepts.
pub fn sample_position(
    range: CoordinateRange,
    rules: &SpacingRules,
    obstacles: &[Point3],
    rng: &mut impl Rng,
) -> Option<Point3> {
    if !range.min.is_finite() || !range.max.is_finite() || range.max <= range.min {
        return None;
    }
    for attempt in 0..rules.max_attempts {
        let candidate = Point3::new(
            rng.gen_range(range.min..range.max),
            rng.gen_range(range.min..range.max),
            rng.gen_range(range.min..range.max),
        )
        .rounded();
        if rules.accepts(candidate, obstacles) {
            tracing::debug!(attempt, ?candidate, "position accepted");
            return Some(candidate);
        }
    }
    None
}

/// Generate `params.count` systems, each with 1..=N planets.
///
/// A system whose position search exhausts `max_attempts` is skipped and
/// counted in `failed`; the batch continues.
pub fn generate_systems(
    universe: &mut Universe,
    content: &UniverseContent,
    params: &GenerateParams,
    rng: &mut impl Rng,
) -> GenerationOutcome {
    let mut obstacles: Vec<Point3> = universe
        .star_systems
        .values()
        .map(StarSystem::position)
        .collect();
    let known: Vec<Point3> = universe
        .star_systems
        .values()
        .filter(|s| !params.exclude.contains(&s.id))
        .map(StarSystem::position)
        .collect();
    let range = coordinate_range(
        &known,
        params.min_distance,
        params.expand_range,
        content.constants.range_expansion,
        params.max_origin_distance,
    );
    let rules = params.spacing();
    let c = &content.constants;

    let mut outcome = GenerationOutcome::default();
    for index in 0..params.count {
        let Some(position) = sample_position(range, &rules, &obstacles, rng) else {
            tracing::warn!(
                index,
                attempts = params.max_attempts,
                "no valid star system position found, skipping"
            );
            outcome.failed += 1;
            continue;
        };
        obstacles.push(position);

        let system_id = create_system(universe, content, position, params.discovered, rng);
        let planet_count = rng.gen_range(c.min_planets_per_system..=c.max_planets_per_system);
        let planets = place_planets(universe, content, &system_id, planet_count, rng);
        outcome.planets_created += planets.len();
        outcome.created.push(system_id);
    }

    tracing::info!(
        created = outcome.created.len(),
        failed = outcome.failed,
        planets = outcome.planets_created,
        "star system generation finished"
    );
    outcome
}

/// Insert an empty system at `position` with a unique name and a weighted
/// star type.
pub fn create_system(
    universe: &mut Universe,
    content: &UniverseContent,
    position: Point3,
    discovered: bool,
    rng: &mut impl Rng,
) -> StarSystemId {
    let name = unique_system_name(universe, rng);
    let star_type = weighted_pick(&content.constants.star_type_weights, rng)
        .copied()
        .unwrap_or(StarType::YellowDwarf);
    let id = StarSystemId(crate::id::next_ulid(rng));
    universe.insert_star_system(StarSystem::new(id, name, position, star_type, discovered))
}
