//! Type definitions for `universe_core`.
//!
//! Entity rows, ID newtypes, and the content (configuration) types the
//! generators and the consistency checker read their tunables from.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::{round_decimal, Orbit, Point3};

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

/// `{option: weight}` table for weighted random draws.
pub type WeightTable = BTreeMap<String, f64>;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(StarSystemId);
string_id!(PlanetId);
string_id!(PlanetPropertyId);
string_id!(UserId);

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StarType {
    YellowDwarf,
    RedDwarf,
    OrangeDwarf,
    RedGiant,
    BlueGiant,
    WhiteDwarf,
}

impl StarType {
    pub const ALL: [StarType; 6] = [
        StarType::YellowDwarf,
        StarType::RedDwarf,
        StarType::OrangeDwarf,
        StarType::RedGiant,
        StarType::BlueGiant,
        StarType::WhiteDwarf,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StarType::YellowDwarf => "yellow_dwarf",
            StarType::RedDwarf => "red_dwarf",
            StarType::OrangeDwarf => "orange_dwarf",
            StarType::RedGiant => "red_giant",
            StarType::BlueGiant => "blue_giant",
            StarType::WhiteDwarf => "white_dwarf",
        }
    }
}

impl std::fmt::Display for StarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Entity rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarSystem {
    pub id: StarSystemId,
    /// Unique across the universe.
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub star_type: StarType,
    /// Cached count of planets referencing this system. Rebuilt by the checker.
    pub planet_count: u32,
    pub discovered: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StarSystem {
    pub fn new(
        id: StarSystemId,
        name: String,
        position: Point3,
        star_type: StarType,
        discovered: bool,
    ) -> Self {
        let now = Utc::now();
        let position = position.rounded();
        Self {
            id,
            name,
            x: position.x,
            y: position.y,
            z: position.z,
            star_type,
            planet_count: 0,
            discovered,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn position(&self) -> Point3 {
        Point3::new(self.x, self.y, self.z)
    }

    pub fn set_position(&mut self, position: Point3) {
        let position = position.rounded();
        self.x = position.x;
        self.y = position.y;
        self.z = position.z;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Planet {
    pub id: PlanetId,
    pub name: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    /// `None` marks an orphan awaiting reassignment.
    pub star_system_id: Option<StarSystemId>,
    pub orbital_distance: Option<f64>,
    /// Degrees, 0–360.
    pub orbital_angle: Option<f64>,
    /// Degrees, -90..=90.
    pub orbital_inclination: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Planet {
    pub fn new(
        id: PlanetId,
        name: String,
        star_system_id: Option<StarSystemId>,
        orbit: Option<Orbit>,
        position: Option<Point3>,
    ) -> Self {
        let now = Utc::now();
        let mut planet = Self {
            id,
            name,
            x: None,
            y: None,
            z: None,
            star_system_id,
            orbital_distance: None,
            orbital_angle: None,
            orbital_inclination: None,
            created_at: now,
            updated_at: now,
        };
        if let Some(orbit) = orbit {
            planet.set_orbit(orbit);
        }
        if let Some(position) = position {
            planet.set_position(position);
        }
        planet
    }

    /// Absolute position, or `None` if any axis is missing.
    pub fn position(&self) -> Option<Point3> {
        Some(Point3::new(self.x?, self.y?, self.z?))
    }

    /// Orbital parameters, or `None` if any of the three is missing.
    pub fn orbit(&self) -> Option<Orbit> {
        Some(Orbit {
            distance: self.orbital_distance?,
            angle_deg: self.orbital_angle?,
            inclination_deg: self.orbital_inclination?,
        })
    }

    pub fn has_complete_orbit(&self) -> bool {
        self.orbit().is_some()
    }

    pub fn set_position(&mut self, position: Point3) {
        let position = position.rounded();
        self.x = Some(position.x);
        self.y = Some(position.y);
        self.z = Some(position.z);
        self.touch();
    }

    pub fn set_orbit(&mut self, orbit: Orbit) {
        self.orbital_distance = Some(round_decimal(orbit.distance));
        self.orbital_angle = Some(round_decimal(orbit.angle_deg));
        self.orbital_inclination = Some(round_decimal(orbit.inclination_deg));
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// One-to-one physical description of a planet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanetProperty {
    pub id: PlanetPropertyId,
    pub planet_id: PlanetId,
    pub planet_type: String,
    pub size: String,
    pub temperature: String,
    pub atmosphere: String,
    pub terrain: String,
    pub resources: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub home_planet_id: Option<PlanetId>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseMeta {
    pub schema_version: u32,
}

/// The persisted universe: one table per entity, keyed by id.
///
/// Planet properties are keyed by planet id, which enforces the one-to-one
/// relation the same way a unique index on `planet_id` would.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Universe {
    pub meta: UniverseMeta,
    pub star_systems: HashMap<StarSystemId, StarSystem>,
    pub planets: HashMap<PlanetId, Planet>,
    pub planet_properties: HashMap<PlanetId, PlanetProperty>,
    pub users: HashMap<UserId, User>,
}

impl Default for Universe {
    fn default() -> Self {
        Self {
            meta: UniverseMeta { schema_version: 1 },
            star_systems: HashMap::new(),
            planets: HashMap::new(),
            planet_properties: HashMap::new(),
            users: HashMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseContent {
    pub content_version: String,
    pub constants: Constants,
    pub planet_types: BTreeMap<String, PlanetTypeDef>,
}

/// A planet type and the nested tables its physical properties are drawn from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanetTypeDef {
    pub weight: f64,
    pub sizes: WeightTable,
    pub temperatures: WeightTable,
    pub atmospheres: WeightTable,
    pub terrains: WeightTable,
    pub resources: WeightTable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    /// Minimum pairwise distance enforced when generating systems.
    pub min_system_distance: f64,
    /// Pairwise distance below which the checker reports `systems_too_close`.
    /// Deliberately independent of `min_system_distance`.
    pub too_close_distance: f64,
    pub max_generation_attempts: u32,
    /// Generated systems stay inside this shell around the origin.
    pub min_origin_distance: f64,
    pub max_origin_distance: f64,
    /// Extra padding around known space when `expand_range` is requested.
    pub range_expansion: f64,
    pub min_planets_per_system: u32,
    pub max_planets_per_system: u32,
    /// Orbital distance of slot `i` is `(i + 1) * orbit_spacing + U[0, orbit_jitter)`.
    pub orbit_spacing: f64,
    pub orbit_jitter: f64,
    /// Per-axis tolerance when comparing stored and derived planet coordinates.
    pub coordinate_tolerance: f64,
    pub exploration_radius: f64,
    pub max_nearby_systems: usize,
    pub max_resources_per_planet: u32,
    pub star_type_weights: BTreeMap<StarType, f64>,
}
