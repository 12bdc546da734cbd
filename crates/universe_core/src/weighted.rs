//! Weighted random selection over `{option: weight}` tables.
//!
//! A draw is uniform in `[0, total)` and walks the cumulative weights, so an
//! option with weight 0 is never chosen. Negative and NaN weights count as 0.
//! When no option has a positive weight the draw falls back to a uniform
//! choice; an empty table yields `None`.

use rand::Rng;

/// Pick one key from `table`.
pub fn weighted_pick<'a, K: 'a>(
    table: impl IntoIterator<Item = (&'a K, &'a f64)>,
    rng: &mut impl Rng,
) -> Option<&'a K> {
    let entries: Vec<(&K, f64)> = table
        .into_iter()
        .map(|(key, weight)| (key, weight.max(0.0)))
        .collect();
    pick_from(&entries, rng)
}

/// Pick up to `count` distinct keys from `table`, without replacement.
///
/// Zero-weight keys are only eligible when no key has a positive weight.
pub fn weighted_sample_distinct<'a, K: 'a>(
    table: impl IntoIterator<Item = (&'a K, &'a f64)>,
    count: usize,
    rng: &mut impl Rng,
) -> Vec<&'a K> {
    let all: Vec<(&K, f64)> = table
        .into_iter()
        .map(|(key, weight)| (key, weight.max(0.0)))
        .collect();
    let mut pool: Vec<(&K, f64)> = if all.iter().any(|(_, w)| *w > 0.0) {
        all.into_iter().filter(|(_, w)| *w > 0.0).collect()
    } else {
        all
    };

    let mut picked = Vec::with_capacity(count.min(pool.len()));
    while picked.len() < count && !pool.is_empty() {
        let Some(index) = pick_index(&pool, rng) else {
            break;
        };
        picked.push(pool.swap_remove(index).0);
    }
    picked
}

fn pick_from<'a, K>(entries: &[(&'a K, f64)], rng: &mut impl Rng) -> Option<&'a K> {
    pick_index(entries, rng).map(|index| entries[index].0)
}

fn pick_index<K>(entries: &[(&K, f64)], rng: &mut impl Rng) -> Option<usize> {
    if entries.is_empty() {
        return None;
    }
    let total: f64 = entries.iter().map(|(_, w)| w).sum();
    if total <= 0.0 || !total.is_finite() {
        return Some(rng.gen_range(0..entries.len()));
    }

    let roll = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    for (index, (_, weight)) in entries.iter().enumerate() {
        cumulative += weight;
        if roll < cumulative {
            return Some(index);
        }
    }
    // Float accumulation can leave `roll` a hair past the last bucket.
    entries.iter().rposition(|(_, w)| *w > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::BTreeMap;

    fn table(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries
            .iter()
            .map(|(k, w)| ((*k).to_string(), *w))
            .collect()
    }

    #[test]
    fn zero_weight_never_selected() {
        let weights = table(&[("a", 1.0), ("b", 0.0), ("c", 1.0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..5_000 {
            let pick = weighted_pick(&weights, &mut rng).unwrap();
            assert_ne!(pick, "b");
        }
    }

    #[test]
    fn equal_weights_are_roughly_uniform() {
        let weights = table(&[("a", 1.0), ("b", 1.0), ("c", 1.0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        for _ in 0..1_000 {
            let pick = weighted_pick(&weights, &mut rng).unwrap();
            *counts.entry(pick.clone()).or_default() += 1;
        }
        for key in ["a", "b", "c"] {
            let n = counts.get(key).copied().unwrap_or(0);
            // Expected 333; 5 sigma is roughly ±75.
            assert!((250..=420).contains(&n), "{key} drawn {n} times");
        }
    }

    #[test]
    fn heavier_weight_dominates() {
        let weights = table(&[("common", 9.0), ("rare", 1.0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let common = (0..2_000)
            .filter(|_| weighted_pick(&weights, &mut rng).unwrap() == "common")
            .count();
        assert!(common > 1_650 && common < 1_950, "common drawn {common} times");
    }

    #[test]
    fn all_zero_weights_fall_back_to_uniform() {
        let weights = table(&[("a", 0.0), ("b", 0.0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut seen_a = false;
        let mut seen_b = false;
        for _ in 0..200 {
            match weighted_pick(&weights, &mut rng).unwrap().as_str() {
                "a" => seen_a = true,
                _ => seen_b = true,
            }
        }
        assert!(seen_a && seen_b);
    }

    #[test]
    fn empty_table_yields_none() {
        let weights: BTreeMap<String, f64> = BTreeMap::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert!(weighted_pick(&weights, &mut rng).is_none());
    }

    #[test]
    fn negative_weight_treated_as_zero() {
        let weights = table(&[("a", -5.0), ("b", 1.0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        for _ in 0..500 {
            assert_eq!(weighted_pick(&weights, &mut rng).unwrap(), "b");
        }
    }

    #[test]
    fn distinct_sample_skips_zero_weights_and_repeats() {
        let weights = table(&[("iron", 3.0), ("ice", 0.0), ("gold", 1.0), ("gas", 2.0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let picks = weighted_sample_distinct(&weights, 5, &mut rng);
            assert_eq!(picks.len(), 3);
            assert!(!picks.iter().any(|k| k.as_str() == "ice"));
            let mut sorted: Vec<&String> = picks.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), picks.len());
        }
    }
}
