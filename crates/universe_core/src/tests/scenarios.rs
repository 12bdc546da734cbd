use super::*;

#[test]
fn test_generate_five_undiscovered_systems() {
    let content = test_content();
    let mut universe = Universe::default();
    let mut rng = make_rng();
    let mut params = GenerateParams::from_constants(5, &content.constants);
    params.min_distance = 50.0;
    params.max_attempts = 50;

    let outcome = generate_systems(&mut universe, &content, &params, &mut rng);

    assert_eq!(outcome.created.len(), 5);
    assert_eq!(universe.star_systems.len(), 5);
    let positions: Vec<Point3> = universe
        .star_systems
        .values()
        .map(StarSystem::position)
        .collect();
    for (i, a) in positions.iter().enumerate() {
        for b in &positions[i + 1..] {
            assert!(distance(*a, *b) >= 50.0, "{a:?} and {b:?} too close");
        }
    }
    for system in universe.star_systems.values() {
        assert!(!system.discovered);
        assert!((1..=7).contains(&system.planet_count));
        assert_eq!(
            system.planet_count as usize,
            universe.planets_in_system(&system.id).len()
        );
    }
    assert_clean(&mut universe, &content);
}

#[test]
fn test_planet_count_mismatch_fixed() {
    let content = test_content();
    let mut universe = Universe::default();
    let mut rng = make_rng();
    let sys = populated_system(&mut universe, "Sol", Point3::new(100.0, 100.0, 100.0), 3, &mut rng);
    universe.star_systems.get_mut(&sys).unwrap().planet_count = 2;

    let report = check_universe(&mut universe, &content, &report_only(), &mut rng);
    assert_eq!(report.exit_code(), 1);
    assert!(report.has(IssueKind::PlanetCountMismatch));
    assert_eq!(universe.star_systems[&sys].planet_count, 2, "report-only must not write");

    let options = CheckOptions {
        fix: true,
        ..CheckOptions::default()
    };
    let fixed = check_universe(&mut universe, &content, &options, &mut rng);
    assert_eq!(fixed.repairs.planet_counts_fixed, 1);
    assert_eq!(universe.star_systems[&sys].planet_count, 3);
    assert_clean(&mut universe, &content);
}

#[test]
fn test_orphan_planet_assigned_to_open_system() {
    let content = test_content();
    let mut universe = Universe::default();
    let mut rng = make_rng();
    let full = populated_system(&mut universe, "Full", Point3::new(100.0, 0.0, 0.0), 7, &mut rng);
    let open = populated_system(&mut universe, "Open", Point3::new(-150.0, 0.0, 0.0), 2, &mut rng);
    let orphan = orphan_planet(&mut universe, "Drifter", &mut rng);

    let report = check_universe(&mut universe, &content, &report_only(), &mut rng);
    assert_eq!(report.exit_code(), 1);
    assert!(report.has(IssueKind::OrphanPlanet));
    assert!(!report.has(IssueKind::MissingCoordinates), "orphans report once");

    let options = CheckOptions {
        fix_orphans: true,
        ..CheckOptions::default()
    };
    check_universe(&mut universe, &content, &options, &mut rng);

    let planet = &universe.planets[&orphan];
    assert_eq!(planet.star_system_id.as_ref(), Some(&open));
    assert!(planet.position().is_some());
    assert_eq!(universe.planets_in_system(&full).len(), 7);
    assert_clean(&mut universe, &content);
}

#[test]
fn test_too_close_systems_separated() {
    let content = test_content();
    let mut universe = Universe::default();
    let mut rng = make_rng();
    let a = populated_system(&mut universe, "A", Point3::new(100.0, 100.0, 100.0), 3, &mut rng);
    let b = populated_system(&mut universe, "B", Point3::new(120.0, 100.0, 100.0), 2, &mut rng);

    let report = check_universe(&mut universe, &content, &report_only(), &mut rng);
    assert_eq!(report.exit_code(), 1);
    assert!(report.has(IssueKind::SystemsTooClose));

    let options = CheckOptions {
        fix_distances: true,
        ..CheckOptions::default()
    };
    let fixed = check_universe(&mut universe, &content, &options, &mut rng);
    assert_eq!(fixed.repairs.systems_relocated, 1);

    let gap = distance(
        universe.star_systems[&a].position(),
        universe.star_systems[&b].position(),
    );
    assert!(gap >= 30.0, "still too close: {gap}");
    for system_id in [&a, &b] {
        let system = &universe.star_systems[system_id];
        for planet in universe.planets_in_system(system_id) {
            let expected = consistency::expected_planet_position(system, planet).unwrap();
            assert_eq!(planet.position(), Some(expected));
        }
    }
    assert_clean(&mut universe, &content);
}

#[test]
fn test_home_planet_without_star_system_reported() {
    let content = test_content();
    let mut universe = Universe::default();
    let mut rng = make_rng();
    populated_system(&mut universe, "Sol", Point3::new(100.0, 0.0, 0.0), 2, &mut rng);
    let orphan = orphan_planet(&mut universe, "Lost", &mut rng);
    let user = universe.insert_user("pilot", &mut rng);
    universe.set_home_planet(&user, Some(orphan));

    let report = check_universe(&mut universe, &content, &report_only(), &mut rng);
    assert_eq!(report.exit_code(), 1);
    assert!(report.has(IssueKind::HomePlanetNoStarSystem));
    assert!(!report.has(IssueKind::InvalidHomePlanet));
    assert_eq!(report.counts.users_with_home_planets, 1);
}
