//! Star system and planet naming.

use rand::Rng;

use crate::Universe;

/// Random draws before falling back to a numbered suffix.
const NAME_RETRIES: u32 = 20;

/// Generate a random catalogue-style system name, e.g. `Tau Vela-482`.
pub fn generate_system_name(rng: &mut impl Rng) -> String {
    let prefix = PREFIXES[rng.gen_range(0..PREFIXES.len())];
    let root = ROOTS[rng.gen_range(0..ROOTS.len())];
    let number: u32 = rng.gen_range(100..1000);
    format!("{prefix} {root}-{number}")
}

/// A system name not used by any system in `universe`.
///
/// Retries random names first; once those are spent, appends an increasing
/// counter to the last draw, which always terminates.
pub fn unique_system_name(universe: &Universe, rng: &mut impl Rng) -> String {
    let mut candidate = generate_system_name(rng);
    for _ in 0..NAME_RETRIES {
        if !universe.system_name_taken(&candidate) {
            return candidate;
        }
        candidate = generate_system_name(rng);
    }
    let base = candidate;
    let mut suffix = 2u32;
    loop {
        let numbered = format!("{base} {suffix}");
        if !universe.system_name_taken(&numbered) {
            return numbered;
        }
        suffix += 1;
    }
}

/// Planet `index` (0-based) of `system_name`, e.g. `Tau Vela-482 III`.
pub fn planet_name(system_name: &str, index: usize) -> String {
    format!("{system_name} {}", roman_numeral(index + 1))
}

fn roman_numeral(mut value: usize) -> String {
    const TABLE: &[(usize, &str)] = &[
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for &(amount, numeral) in TABLE {
        while value >= amount {
            out.push_str(numeral);
            value -= amount;
        }
    }
    out
}

static PREFIXES: &[&str] = &[
    "Alpha", "Beta", "Gamma", "Delta", "Epsilon", "Zeta", "Eta", "Theta", "Iota", "Kappa",
    "Lambda", "Sigma", "Tau", "Upsilon", "Omega", "New", "Far", "Deep",
];

static ROOTS: &[&str] = &[
    "Vela", "Orion", "Lyra", "Cygnus", "Draco", "Hydra", "Carina", "Corvus", "Aquila", "Pavo",
    "Tucana", "Norma", "Ara", "Lupus", "Pyxis", "Fornax", "Sculptor", "Volans", "Kepler",
    "Gliese", "Ross", "Wolf", "Luyten", "Struve", "Lacaille", "Barnard", "Teegarden", "Vega",
    "Altair", "Deneb", "Rigel", "Sirius", "Procyon", "Castor", "Pollux", "Mira",
];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn roman_numerals() {
        assert_eq!(roman_numeral(1), "I");
        assert_eq!(roman_numeral(4), "IV");
        assert_eq!(roman_numeral(7), "VII");
        assert_eq!(roman_numeral(14), "XIV");
    }

    #[test]
    fn planet_names_follow_system() {
        assert_eq!(planet_name("Tau Vela-482", 2), "Tau Vela-482 III");
    }

    #[test]
    fn system_names_are_deterministic_per_seed() {
        let mut rng1 = ChaCha8Rng::seed_from_u64(11);
        let mut rng2 = ChaCha8Rng::seed_from_u64(11);
        assert_eq!(generate_system_name(&mut rng1), generate_system_name(&mut rng2));
    }
}
