//! Entity operations over the universe tables: create, update, query, count.

use std::collections::HashSet;

use chrono::Utc;
use rand::Rng;

use crate::geometry::{distance, Point3};
use crate::{
    Planet, PlanetId, PlanetProperty, StarSystem, StarSystemId, Universe, User, UserId,
};

impl Universe {
    // -- star systems --------------------------------------------------------

    pub fn insert_star_system(&mut self, system: StarSystem) -> StarSystemId {
        let id = system.id.clone();
        self.star_systems.insert(id.clone(), system);
        id
    }

    pub fn system_name_taken(&self, name: &str) -> bool {
        self.star_systems.values().any(|s| s.name == name)
    }

    /// System ids in ascending order, for deterministic iteration.
    pub fn sorted_system_ids(&self) -> Vec<StarSystemId> {
        let mut ids: Vec<StarSystemId> = self.star_systems.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Positions of every system, ordered by id.
    pub fn system_positions(&self) -> Vec<(StarSystemId, Point3)> {
        self.sorted_system_ids()
            .into_iter()
            .filter_map(|id| {
                let position = self.star_systems.get(&id)?.position();
                Some((id, position))
            })
            .collect()
    }

    /// Move a system. Its planets' stored coordinates are left for the caller
    /// to recompute.
    pub fn move_star_system(&mut self, id: &StarSystemId, position: Point3) {
        if let Some(system) = self.star_systems.get_mut(id) {
            system.set_position(position);
        }
    }

    /// Overwrite the cached planet count. Returns whether it changed.
    pub fn set_planet_count(&mut self, id: &StarSystemId, count: u32) -> bool {
        let Some(system) = self.star_systems.get_mut(id) else {
            return false;
        };
        if system.planet_count == count {
            return false;
        }
        system.planet_count = count;
        system.touch();
        true
    }

    /// Systems within `radius` of `center`, nearest first, at most `limit`.
    pub fn nearby_systems(
        &self,
        center: Point3,
        radius: f64,
        limit: usize,
    ) -> Vec<(StarSystemId, f64)> {
        let mut nearby: Vec<(StarSystemId, f64)> = self
            .star_systems
            .values()
            .map(|s| (s.id.clone(), distance(center, s.position())))
            .filter(|(_, d)| *d <= radius)
            .collect();
        nearby.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        nearby.truncate(limit);
        nearby
    }

    // -- planets -------------------------------------------------------------

    /// Insert a planet together with its property row.
    pub fn insert_planet(&mut self, planet: Planet, property: Option<PlanetProperty>) -> PlanetId {
        let id = planet.id.clone();
        self.planets.insert(id.clone(), planet);
        if let Some(property) = property {
            self.insert_property(property);
        }
        id
    }

    /// Insert or replace the property row of `property.planet_id`.
    pub fn insert_property(&mut self, property: PlanetProperty) {
        self.planet_properties
            .insert(property.planet_id.clone(), property);
    }

    pub fn sorted_planet_ids(&self) -> Vec<PlanetId> {
        let mut ids: Vec<PlanetId> = self.planets.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Planets referencing `system_id`, innermost orbit first. Planets missing
    /// an orbital distance sort last; ties break on id.
    pub fn planets_in_system(&self, system_id: &StarSystemId) -> Vec<&Planet> {
        let mut planets: Vec<&Planet> = self
            .planets
            .values()
            .filter(|p| p.star_system_id.as_ref() == Some(system_id))
            .collect();
        planets.sort_by(|a, b| {
            let da = a.orbital_distance.unwrap_or(f64::INFINITY);
            let db = b.orbital_distance.unwrap_or(f64::INFINITY);
            da.total_cmp(&db).then_with(|| a.id.cmp(&b.id))
        });
        planets
    }

    /// A planet is orphaned when it references no system or one that does
    /// not exist.
    pub fn is_orphan(&self, planet: &Planet) -> bool {
        planet
            .star_system_id
            .as_ref()
            .is_none_or(|id| !self.star_systems.contains_key(id))
    }

    pub fn orphan_planet_ids(&self) -> Vec<PlanetId> {
        let mut ids: Vec<PlanetId> = self
            .planets
            .values()
            .filter(|p| self.is_orphan(p))
            .map(|p| p.id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Planet and the position of its (existing) system.
    pub fn planet_with_system(&self, planet_id: &PlanetId) -> Option<(&Planet, &StarSystem)> {
        let planet = self.planets.get(planet_id)?;
        let system = self.star_systems.get(planet.star_system_id.as_ref()?)?;
        Some((planet, system))
    }

    // -- users ---------------------------------------------------------------

    pub fn insert_user(&mut self, name: &str, rng: &mut impl Rng) -> UserId {
        let id = UserId(crate::id::next_ulid(rng));
        self.users.insert(
            id.clone(),
            User {
                id: id.clone(),
                name: name.to_string(),
                home_planet_id: None,
                created_at: Utc::now(),
            },
        );
        id
    }

    pub fn sorted_user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.users.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn set_home_planet(&mut self, user_id: &UserId, planet_id: Option<PlanetId>) {
        if let Some(user) = self.users.get_mut(user_id) {
            user.home_planet_id = planet_id;
        }
    }

    pub fn users_with_home_planets(&self) -> usize {
        self.users
            .values()
            .filter(|u| u.home_planet_id.is_some())
            .count()
    }

    /// Systems hosting at least one user's home planet.
    pub fn home_system_ids(&self) -> HashSet<StarSystemId> {
        self.users
            .values()
            .filter_map(|u| u.home_planet_id.as_ref())
            .filter_map(|pid| self.planets.get(pid))
            .filter_map(|p| p.star_system_id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::test_fixtures::{make_rng, orbit, planet_in, system_at};
    use crate::{Point3, Universe};

    #[test]
    fn planets_in_system_sorted_innermost_first() {
        let mut universe = Universe::default();
        let mut rng = make_rng();
        let sys = system_at(&mut universe, "Sol", Point3::new(100.0, 0.0, 0.0), &mut rng);
        let outer = planet_in(&mut universe, &sys, orbit(9.0, 0.0, 0.0), &mut rng);
        let inner = planet_in(&mut universe, &sys, orbit(3.0, 0.0, 0.0), &mut rng);
        let ids: Vec<_> = universe
            .planets_in_system(&sys)
            .iter()
            .map(|p| p.id.clone())
            .collect();
        assert_eq!(ids, vec![inner, outer]);
    }

    #[test]
    fn dangling_system_reference_is_orphan() {
        let mut universe = Universe::default();
        let mut rng = make_rng();
        let sys = system_at(&mut universe, "Sol", Point3::new(100.0, 0.0, 0.0), &mut rng);
        let planet = planet_in(&mut universe, &sys, orbit(3.0, 0.0, 0.0), &mut rng);
        assert!(universe.orphan_planet_ids().is_empty());
        universe.star_systems.remove(&sys);
        assert_eq!(universe.orphan_planet_ids(), vec![planet]);
    }

    #[test]
    fn nearby_systems_nearest_first_and_capped() {
        let mut universe = Universe::default();
        let mut rng = make_rng();
        let near = system_at(&mut universe, "Near", Point3::new(10.0, 0.0, 0.0), &mut rng);
        let mid = system_at(&mut universe, "Mid", Point3::new(20.0, 0.0, 0.0), &mut rng);
        system_at(&mut universe, "Far", Point3::new(30.0, 0.0, 0.0), &mut rng);
        system_at(&mut universe, "Gone", Point3::new(500.0, 0.0, 0.0), &mut rng);

        let found = universe.nearby_systems(Point3::ORIGIN, 100.0, 2);
        let ids: Vec<_> = found.into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![near, mid]);
    }

    #[test]
    fn set_planet_count_reports_change() {
        let mut universe = Universe::default();
        let mut rng = make_rng();
        let sys = system_at(&mut universe, "Sol", Point3::ORIGIN, &mut rng);
        assert!(universe.set_planet_count(&sys, 3));
        assert!(!universe.set_planet_count(&sys, 3));
        assert_eq!(universe.star_systems[&sys].planet_count, 3);
    }
}
