//! Universe consistency checker.
//!
//! One pass per invocation: Scan → Classify → (optional) Repair → Report.
//! Stored coordinates and cached planet counts are treated as a cache of
//! values derived from orbits and planet rows; `classify` holds the pure
//! recompute functions and the comparison, `repair` the gated rebuilds.
//! Nothing is kept between runs, and a repair interrupted half-way is picked
//! up again by the next scan.

mod classify;
mod repair;

use std::collections::BTreeMap;

use rand::Rng;
use serde::Serialize;

use crate::{Universe, UniverseContent};

pub use classify::{actual_planet_counts, expected_planet_position, scan, too_close_pairs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    PlanetCountMismatch,
    NoPlanets,
    TooManyPlanets,
    OrphanPlanet,
    MissingCoordinates,
    MissingOrbitalCoordinates,
    MissingProperties,
    CoordinateMismatch,
    InvalidHomePlanet,
    HomePlanetNoStarSystem,
    SystemsTooClose,
}

impl IssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::PlanetCountMismatch => "planet_count_mismatch",
            IssueKind::NoPlanets => "no_planets",
            IssueKind::TooManyPlanets => "too_many_planets",
            IssueKind::OrphanPlanet => "orphan_planet",
            IssueKind::MissingCoordinates => "missing_coordinates",
            IssueKind::MissingOrbitalCoordinates => "missing_orbital_coordinates",
            IssueKind::MissingProperties => "missing_properties",
            IssueKind::CoordinateMismatch => "coordinate_mismatch",
            IssueKind::InvalidHomePlanet => "invalid_home_planet",
            IssueKind::HomePlanetNoStarSystem => "home_planet_no_star_system",
            IssueKind::SystemsTooClose => "systems_too_close",
        }
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding. `subject` is the id of the offending row (both ids joined
/// with `/` for a pair of systems).
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub subject: String,
    pub detail: String,
}

/// Which repairs run. All off means report-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckOptions {
    pub fix: bool,
    pub fix_orphans: bool,
    pub fix_distances: bool,
}

impl CheckOptions {
    pub fn all() -> Self {
        Self {
            fix: true,
            fix_orphans: true,
            fix_distances: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct UniverseCounts {
    pub star_systems: usize,
    pub planets: usize,
    pub users_with_home_planets: usize,
}

impl UniverseCounts {
    pub fn of(universe: &Universe) -> Self {
        Self {
            star_systems: universe.star_systems.len(),
            planets: universe.planets.len(),
            users_with_home_planets: universe.users_with_home_planets(),
        }
    }
}

/// What the repair passes changed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepairSummary {
    pub planet_counts_fixed: usize,
    pub coordinates_fixed: usize,
    pub orbits_assigned: usize,
    pub properties_created: usize,
    pub empty_systems_filled: usize,
    pub home_planets_cleared: usize,
    pub overflow_detached: usize,
    pub orphans_assigned: usize,
    pub systems_created: usize,
    pub orphans_unresolved: usize,
    pub systems_relocated: usize,
    pub relocations_failed: usize,
}

impl RepairSummary {
    /// Non-zero counters as `(label, value)`, in a fixed order.
    pub fn entries(&self) -> Vec<(&'static str, usize)> {
        [
            ("planet_counts_fixed", self.planet_counts_fixed),
            ("coordinates_fixed", self.coordinates_fixed),
            ("orbits_assigned", self.orbits_assigned),
            ("properties_created", self.properties_created),
            ("empty_systems_filled", self.empty_systems_filled),
            ("home_planets_cleared", self.home_planets_cleared),
            ("overflow_detached", self.overflow_detached),
            ("orphans_assigned", self.orphans_assigned),
            ("systems_created", self.systems_created),
            ("orphans_unresolved", self.orphans_unresolved),
            ("systems_relocated", self.systems_relocated),
            ("relocations_failed", self.relocations_failed),
        ]
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsistencyReport {
    /// Table sizes at scan time.
    pub counts: UniverseCounts,
    pub issues: Vec<Issue>,
    pub repairs: RepairSummary,
}

impl ConsistencyReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// 0 when the scan found nothing, 1 otherwise, whatever was repaired.
    pub fn exit_code(&self) -> u8 {
        u8::from(!self.is_clean())
    }

    pub fn counts_by_kind(&self) -> BTreeMap<IssueKind, usize> {
        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.kind).or_default() += 1;
        }
        counts
    }

    pub fn has(&self, kind: IssueKind) -> bool {
        self.issues.iter().any(|i| i.kind == kind)
    }
}

/// Scan the whole universe, then run the repairs `options` enables.
///
/// Repairs run orphans → distances → fix, so the counts and coordinates
/// written last already reflect reassigned planets and moved systems.
pub fn check_universe(
    universe: &mut Universe,
    content: &UniverseContent,
    options: &CheckOptions,
    rng: &mut impl Rng,
) -> ConsistencyReport {
    let counts = UniverseCounts::of(universe);
    let issues = scan(universe, &content.constants);
    tracing::info!(
        systems = counts.star_systems,
        planets = counts.planets,
        issues = issues.len(),
        "consistency scan finished"
    );

    let mut repairs = RepairSummary::default();
    if options.fix_orphans {
        repair::detach_overflow(universe, &content.constants, &mut repairs);
        repair::rehome_orphans(universe, content, rng, &mut repairs);
    }
    if options.fix_distances {
        repair::relocate_crowded_systems(universe, &content.constants, rng, &mut repairs);
    }
    if options.fix {
        repair::assign_missing_orbits(universe, &content.constants, rng, &mut repairs);
        repair::attach_missing_properties(universe, content, rng, &mut repairs);
        repair::fill_empty_systems(universe, content, rng, &mut repairs);
        repair::recompute_coordinates(universe, &mut repairs);
        repair::recompute_planet_counts(universe, &mut repairs);
        repair::clear_invalid_home_planets(universe, &mut repairs);
    }

    ConsistencyReport {
        counts,
        issues,
        repairs,
    }
}
