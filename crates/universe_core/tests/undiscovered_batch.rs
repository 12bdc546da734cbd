//! Integration test: repeated undiscovered batches fill space without
//! breaking spacing, then the checker finds nothing to report.

use universe_core::test_fixtures::{base_content, make_rng};
use universe_core::*;

#[test]
fn repeated_batches_keep_spacing_and_consistency() {
    let content = base_content();
    let mut universe = Universe::default();
    let mut rng = make_rng();

    let mut created = 0;
    for expand in [false, true, false] {
        let mut params = GenerateParams::from_constants(8, &content.constants);
        params.expand_range = expand;
        let outcome = generate_systems(&mut universe, &content, &params, &mut rng);
        created += outcome.created.len();
        assert_eq!(outcome.created.len() + outcome.failed as usize, 8);
    }
    assert_eq!(universe.star_systems.len(), created);
    assert!(created > 8, "space should not saturate this early");

    let positions: Vec<Point3> = universe
        .star_systems
        .values()
        .map(StarSystem::position)
        .collect();
    for (i, a) in positions.iter().enumerate() {
        for b in &positions[i + 1..] {
            assert!(distance(*a, *b) >= content.constants.min_system_distance);
        }
    }

    let report = check_universe(&mut universe, &content, &CheckOptions::default(), &mut rng);
    assert!(report.is_clean(), "{:?}", report.issues);
    assert_eq!(report.counts.star_systems, created);
    assert_eq!(
        report.counts.planets,
        universe.star_systems.values().map(|s| s.planet_count as usize).sum::<usize>()
    );
}

#[test]
fn zero_attempts_creates_nothing() {
    let content = base_content();
    let mut universe = Universe::default();
    let mut rng = make_rng();
    let mut params = GenerateParams::from_constants(3, &content.constants);
    params.max_attempts = 0;

    let outcome = generate_systems(&mut universe, &content, &params, &mut rng);
    assert!(outcome.created.is_empty());
    assert_eq!(outcome.failed, 3);
    assert!(universe.star_systems.is_empty());
}
