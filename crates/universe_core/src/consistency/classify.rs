//! Pure recompute functions and the scan that compares them to stored state.

use std::collections::HashMap;

use crate::consistency::{Issue, IssueKind};
use crate::geometry::{distance, orbit_position, Point3};
use crate::{Constants, Planet, StarSystem, StarSystemId, Universe};

/// Number of planet rows referencing each existing system. Systems with no
/// planets map to 0.
pub fn actual_planet_counts(universe: &Universe) -> HashMap<StarSystemId, u32> {
    let mut counts: HashMap<StarSystemId, u32> = universe
        .star_systems
        .keys()
        .map(|id| (id.clone(), 0))
        .collect();
    for planet in universe.planets.values() {
        if let Some(count) = planet
            .star_system_id
            .as_ref()
            .and_then(|id| counts.get_mut(id))
        {
            *count += 1;
        }
    }
    counts
}

/// Where `planet` should be, given `system`'s position and the planet's
/// orbit. `None` when the orbit is incomplete.
pub fn expected_planet_position(system: &StarSystem, planet: &Planet) -> Option<Point3> {
    Some(orbit_position(system.position(), planet.orbit()?))
}

/// Pairs of systems closer than `threshold`, ordered by id.
pub fn too_close_pairs(
    universe: &Universe,
    threshold: f64,
) -> Vec<(StarSystemId, StarSystemId, f64)> {
    let positions = universe.system_positions();
    let mut pairs = Vec::new();
    for (i, (a, pa)) in positions.iter().enumerate() {
        for (b, pb) in &positions[i + 1..] {
            let d = distance(*pa, *pb);
            if d < threshold {
                pairs.push((a.clone(), b.clone(), d));
            }
        }
    }
    pairs
}

/// Classify every divergence between stored and derived state.
///
/// Issues come out grouped: systems, planets, users, then system pairs,
/// each group ordered by id.
pub fn scan(universe: &Universe, constants: &Constants) -> Vec<Issue> {
    let mut issues = Vec::new();
    scan_systems(universe, constants, &mut issues);
    scan_planets(universe, constants, &mut issues);
    scan_users(universe, &mut issues);
    for (a, b, d) in too_close_pairs(universe, constants.too_close_distance) {
        issues.push(Issue {
            kind: IssueKind::SystemsTooClose,
            subject: format!("{a}/{b}"),
            detail: format!(
                "distance {d:.2} is below {:.2}",
                constants.too_close_distance
            ),
        });
    }
    issues
}

fn scan_systems(universe: &Universe, constants: &Constants, issues: &mut Vec<Issue>) {
    let counts = actual_planet_counts(universe);
    for id in universe.sorted_system_ids() {
        let system = &universe.star_systems[&id];
        let actual = counts.get(&id).copied().unwrap_or(0);
        if system.planet_count != actual {
            issues.push(Issue {
                kind: IssueKind::PlanetCountMismatch,
                subject: id.to_string(),
                detail: format!("stored {} but {actual} planets exist", system.planet_count),
            });
        }
        if actual == 0 {
            issues.push(Issue {
                kind: IssueKind::NoPlanets,
                subject: id.to_string(),
                detail: format!("system '{}' has no planets", system.name),
            });
        } else if actual > constants.max_planets_per_system {
            issues.push(Issue {
                kind: IssueKind::TooManyPlanets,
                subject: id.to_string(),
                detail: format!(
                    "{actual} planets exceeds the limit of {}",
                    constants.max_planets_per_system
                ),
            });
        }
    }
}

fn scan_planets(universe: &Universe, constants: &Constants, issues: &mut Vec<Issue>) {
    for id in universe.sorted_planet_ids() {
        let planet = &universe.planets[&id];
        let subject = id.to_string();

        if !planet.has_complete_orbit() {
            issues.push(Issue {
                kind: IssueKind::MissingOrbitalCoordinates,
                subject: subject.clone(),
                detail: "orbital distance, angle or inclination is null".to_string(),
            });
        }
        if !universe.planet_properties.contains_key(&id) {
            issues.push(Issue {
                kind: IssueKind::MissingProperties,
                subject: subject.clone(),
                detail: "no planet property row".to_string(),
            });
        }

        let system = planet
            .star_system_id
            .as_ref()
            .and_then(|sid| universe.star_systems.get(sid));
        let Some(system) = system else {
            let detail = match &planet.star_system_id {
                Some(sid) => format!("references missing star system {sid}"),
                None => "star_system_id is null".to_string(),
            };
            issues.push(Issue {
                kind: IssueKind::OrphanPlanet,
                subject,
                detail,
            });
            continue;
        };

        let Some(stored) = planet.position() else {
            issues.push(Issue {
                kind: IssueKind::MissingCoordinates,
                subject,
                detail: "x, y or z is null".to_string(),
            });
            continue;
        };
        if let Some(expected) = expected_planet_position(system, planet) {
            if !stored.approx_eq(expected, constants.coordinate_tolerance) {
                issues.push(Issue {
                    kind: IssueKind::CoordinateMismatch,
                    subject,
                    detail: format!(
                        "stored ({:.2}, {:.2}, {:.2}) but orbit gives ({:.2}, {:.2}, {:.2})",
                        stored.x, stored.y, stored.z, expected.x, expected.y, expected.z
                    ),
                });
            }
        }
    }
}

fn scan_users(universe: &Universe, issues: &mut Vec<Issue>) {
    for id in universe.sorted_user_ids() {
        let user = &universe.users[&id];
        let Some(planet_id) = &user.home_planet_id else {
            continue;
        };
        match universe.planets.get(planet_id) {
            None => issues.push(Issue {
                kind: IssueKind::InvalidHomePlanet,
                subject: id.to_string(),
                detail: format!("home planet {planet_id} does not exist"),
            }),
            Some(planet) if universe.is_orphan(planet) => issues.push(Issue {
                kind: IssueKind::HomePlanetNoStarSystem,
                subject: id.to_string(),
                detail: format!("home planet {planet_id} has no star system"),
            }),
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Orbit;
    use crate::test_fixtures::{base_content, make_rng, orbit, planet_in, system_at};

    #[test]
    fn counts_include_empty_systems() {
        let mut universe = Universe::default();
        let mut rng = make_rng();
        let full = system_at(&mut universe, "Full", Point3::new(100.0, 0.0, 0.0), &mut rng);
        let empty = system_at(&mut universe, "Empty", Point3::new(200.0, 0.0, 0.0), &mut rng);
        planet_in(&mut universe, &full, orbit(3.0, 10.0, 0.0), &mut rng);
        planet_in(&mut universe, &full, orbit(6.0, 20.0, 0.0), &mut rng);

        let counts = actual_planet_counts(&universe);
        assert_eq!(counts[&full], 2);
        assert_eq!(counts[&empty], 0);
    }

    #[test]
    fn expected_position_needs_complete_orbit() {
        let mut universe = Universe::default();
        let mut rng = make_rng();
        let sys = system_at(&mut universe, "Sol", Point3::new(100.0, 0.0, 0.0), &mut rng);
        let pid = planet_in(&mut universe, &sys, orbit(5.0, 0.0, 0.0), &mut rng);
        let system = &universe.star_systems[&sys];
        let mut planet = universe.planets[&pid].clone();
        assert_eq!(
            expected_planet_position(system, &planet),
            Some(Point3::new(105.0, 0.0, 0.0))
        );
        planet.orbital_angle = None;
        assert_eq!(expected_planet_position(system, &planet), None);
    }

    #[test]
    fn pairs_report_each_close_pair_once() {
        let mut universe = Universe::default();
        let mut rng = make_rng();
        system_at(&mut universe, "A", Point3::new(100.0, 100.0, 100.0), &mut rng);
        system_at(&mut universe, "B", Point3::new(120.0, 100.0, 100.0), &mut rng);
        system_at(&mut universe, "C", Point3::new(300.0, 100.0, 100.0), &mut rng);
        let pairs = too_close_pairs(&universe, 30.0);
        assert_eq!(pairs.len(), 1);
        assert!((pairs[0].2 - 20.0).abs() < 1e-9);
    }

    #[test]
    fn small_rounding_noise_is_tolerated() {
        let content = base_content();
        let mut universe = Universe::default();
        let mut rng = make_rng();
        let sys = system_at(&mut universe, "Sol", Point3::new(100.0, 0.0, 0.0), &mut rng);
        let pid = planet_in(
            &mut universe,
            &sys,
            Orbit {
                distance: 5.0,
                angle_deg: 0.0,
                inclination_deg: 0.0,
            },
            &mut rng,
        );
        universe.planets.get_mut(&pid).unwrap().x = Some(105.01);
        assert!(scan(&universe, &content.constants).is_empty());

        universe.planets.get_mut(&pid).unwrap().x = Some(105.5);
        let issues = scan(&universe, &content.constants);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::CoordinateMismatch);
    }
}
