use super::*;

#[test]
fn test_registered_users_get_separate_home_systems() {
    let content = test_content();
    let mut universe = Universe::default();
    let mut rng = make_rng();

    let mut homes = Vec::new();
    for name in ["ada", "grace", "linus"] {
        let user = universe.insert_user(name, &mut rng);
        homes.push(assign_home_planet(&mut universe, &content, &user, &mut rng).unwrap());
    }

    let systems: std::collections::HashSet<_> = homes
        .iter()
        .map(|p| universe.planets[p].star_system_id.clone().unwrap())
        .collect();
    assert_eq!(systems.len(), 3);
    assert_eq!(universe.users_with_home_planets(), 3);
    assert_clean(&mut universe, &content);
}

#[test]
fn test_home_systems_respect_undiscovered_pool() {
    let content = test_content();
    let mut universe = Universe::default();
    let mut rng = make_rng();
    let params = GenerateParams::from_constants(6, &content.constants);
    generate_systems(&mut universe, &content, &params, &mut rng);

    let user = universe.insert_user("ada", &mut rng);
    let planet = assign_home_planet(&mut universe, &content, &user, &mut rng).unwrap();
    let (_, home) = universe.planet_with_system(&planet).unwrap();
    let home_position = home.position();
    let home_id = home.id.clone();

    for system in universe.star_systems.values() {
        if system.id != home_id {
            assert!(distance(system.position(), home_position) >= 50.0);
        }
    }
}

#[test]
fn test_nearby_systems_from_home() {
    let content = test_content();
    let mut universe = Universe::default();
    let mut rng = make_rng();
    let home = populated_system(&mut universe, "Home", Point3::new(100.0, 0.0, 0.0), 1, &mut rng);
    let near = populated_system(&mut universe, "Near", Point3::new(160.0, 0.0, 0.0), 1, &mut rng);
    populated_system(&mut universe, "Far", Point3::new(-300.0, 0.0, 0.0), 1, &mut rng);

    let found = universe.nearby_systems(
        universe.star_systems[&home].position(),
        content.constants.exploration_radius,
        content.constants.max_nearby_systems,
    );
    let ids: Vec<_> = found.into_iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec![home, near]);
}
