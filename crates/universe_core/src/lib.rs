//! `universe_core`: star systems, planets and the consistency checker.
//!
//! No IO. All randomness via the passed-in Rng.

pub mod consistency;
mod generator;
pub mod geometry;
mod home_planet;
mod id;
mod names;
mod placement;
mod types;
mod universe;
pub mod weighted;

pub use consistency::{check_universe, CheckOptions, ConsistencyReport, Issue, IssueKind};
pub use generator::{
    coordinate_range, create_system, generate_systems, sample_position, CoordinateRange,
    GenerateParams, GenerationOutcome, SpacingRules,
};
pub use geometry::{distance, orbit_position, round_decimal, to_absolute, Orbit, Point3};
pub use home_planet::{assign_home_planet, HomePlanetError};
pub use id::generate_ulid;
pub use names::{generate_system_name, planet_name, unique_system_name};
pub use placement::{place_planets, random_orbit, roll_properties};
pub use types::*;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

#[cfg(test)]
mod tests;
