//! Content loading, universe persistence and the registration boundary shared
//! by universe_cli and anything else that drives `universe_core`.

use anyhow::{Context, Result};
use rand::Rng;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use universe_core::{
    assign_home_planet, Constants, PlanetTypeDef, Universe, UniverseContent, UserId,
};

#[derive(Deserialize)]
struct PlanetTypesFile {
    content_version: String,
    planet_types: BTreeMap<String, PlanetTypeDef>,
}

/// Validates loaded content, panicking on any authoring error.
///
/// Catches mistakes like: negative weights, a type table where every weight
/// is zero, inverted min/max pairs, or non-positive distance thresholds.
pub fn validate_content(content: &UniverseContent) {
    let c = &content.constants;

    // Distance thresholds.
    for (name, value) in [
        ("min_system_distance", c.min_system_distance),
        ("too_close_distance", c.too_close_distance),
        ("max_origin_distance", c.max_origin_distance),
        ("orbit_spacing", c.orbit_spacing),
    ] {
        assert!(value > 0.0, "constant '{name}' must be positive, got {value}");
    }
    assert!(
        c.min_origin_distance <= c.max_origin_distance,
        "min_origin_distance {} exceeds max_origin_distance {}",
        c.min_origin_distance,
        c.max_origin_distance,
    );
    assert!(
        c.min_planets_per_system <= c.max_planets_per_system,
        "min_planets_per_system {} exceeds max_planets_per_system {}",
        c.min_planets_per_system,
        c.max_planets_per_system,
    );
    assert!(
        c.min_planets_per_system >= 1,
        "min_planets_per_system must be at least 1"
    );
    assert!(
        c.orbit_jitter >= 0.0 && c.coordinate_tolerance >= 0.0,
        "orbit_jitter and coordinate_tolerance must not be negative"
    );

    // Star type weights.
    for (star_type, weight) in &c.star_type_weights {
        assert!(
            *weight >= 0.0,
            "star type '{}' has negative weight {weight}",
            star_type.as_str(),
        );
    }

    // Planet types and their nested tables.
    assert!(
        content.planet_types.values().any(|t| t.weight > 0.0),
        "planet_types has no type with a positive weight"
    );
    for (name, def) in &content.planet_types {
        assert!(def.weight >= 0.0, "planet type '{name}' has negative weight");
        for (table_name, table) in [
            ("sizes", &def.sizes),
            ("temperatures", &def.temperatures),
            ("atmospheres", &def.atmospheres),
            ("terrains", &def.terrains),
            ("resources", &def.resources),
        ] {
            for (option, weight) in table {
                assert!(
                    *weight >= 0.0,
                    "planet type '{name}' {table_name} option '{option}' has negative weight",
                );
            }
        }
    }
}

pub fn load_content(content_dir: &str) -> Result<UniverseContent> {
    let dir = Path::new(content_dir);
    let constants: Constants = serde_json::from_str(
        &std::fs::read_to_string(dir.join("constants.json")).context("reading constants.json")?,
    )
    .context("parsing constants.json")?;
    let types_file: PlanetTypesFile = serde_json::from_str(
        &std::fs::read_to_string(dir.join("planet_types.json"))
            .context("reading planet_types.json")?,
    )
    .context("parsing planet_types.json")?;
    let content = UniverseContent {
        content_version: types_file.content_version,
        constants,
        planet_types: types_file.planet_types,
    };
    validate_content(&content);
    Ok(content)
}

/// Read the universe state file. A missing file is an empty universe.
pub fn load_universe(path: &Path) -> Result<Universe> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no universe file yet, starting empty");
        return Ok(Universe::default());
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading universe file {}", path.display()))?;
    let universe: Universe = serde_json::from_str(&json)
        .with_context(|| format!("parsing universe file {}", path.display()))?;
    tracing::debug!(
        systems = universe.star_systems.len(),
        planets = universe.planets.len(),
        "universe loaded"
    );
    Ok(universe)
}

/// Write the universe state file atomically: temp file, fsync, rename.
pub fn save_universe(universe: &Universe, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(universe).context("serializing universe")?;
    let mut file = std::fs::File::create(&tmp_path)
        .with_context(|| format!("creating {}", tmp_path.display()))?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("replacing universe file {}", path.display()))?;
    Ok(())
}

/// Create a user and try to give them a home planet.
///
/// Registration always succeeds: a failed assignment is logged and the user
/// is left without a home planet for the consistency checker to report.
pub fn register_user(
    universe: &mut Universe,
    content: &UniverseContent,
    name: &str,
    rng: &mut impl Rng,
) -> UserId {
    let user_id = universe.insert_user(name, rng);
    if let Err(err) = assign_home_planet(universe, content, &user_id, rng) {
        tracing::warn!(user = %user_id, error = %err, "home planet assignment failed");
    }
    user_id
}
