use super::*;
use crate::test_fixtures::{base_content, make_rng, orbit, planet_in, system_at};
use rand::Rng;

mod home;
mod scenarios;

// --- Shared test helpers ------------------------------------------------

fn test_content() -> UniverseContent {
    base_content()
}

fn report_only() -> CheckOptions {
    CheckOptions::default()
}

/// Planet with a complete orbit and a property row but no star system and
/// no coordinates.
fn orphan_planet(universe: &mut Universe, name: &str, rng: &mut impl Rng) -> PlanetId {
    let planet = Planet::new(
        PlanetId(format!("orphan-{name}")),
        name.to_string(),
        None,
        Some(orbit(6.0, 45.0, 15.0)),
        None,
    );
    let property = roll_properties(&test_content(), &planet, rng);
    universe.insert_planet(planet, Some(property))
}

/// System at `position` holding `planets` consistent planets.
fn populated_system(
    universe: &mut Universe,
    name: &str,
    position: Point3,
    planets: u32,
    rng: &mut impl Rng,
) -> StarSystemId {
    let id = system_at(universe, name, position, rng);
    for slot in 0..planets {
        let d = 4.0 * f64::from(slot + 1);
        planet_in(universe, &id, orbit(d, 30.0 * f64::from(slot), 10.0), rng);
    }
    id
}

fn assert_clean(universe: &mut Universe, content: &UniverseContent) {
    let mut rng = make_rng();
    let report = check_universe(universe, content, &report_only(), &mut rng);
    assert!(report.is_clean(), "unexpected issues: {:?}", report.issues);
    assert_eq!(report.exit_code(), 0);
}
