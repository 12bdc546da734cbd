use chrono::Utc;
use rand::Rng;
use ulid::Ulid;

/// Build a ULID from a millisecond timestamp and 80 bits drawn from `rng`.
pub fn generate_ulid(rng: &mut impl Rng, timestamp_ms: u64) -> Ulid {
    Ulid::from_parts(timestamp_ms, rng.gen())
}

/// ULID stamped with the current wall-clock time.
pub(crate) fn next_ulid(rng: &mut impl Rng) -> String {
    let now_ms = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    generate_ulid(rng, now_ms).to_string()
}
