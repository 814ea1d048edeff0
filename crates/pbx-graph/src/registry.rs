//! Identifier generation and tracking for one project instance.
//!
//! Each [`ProjectGraph`](crate::graph::ProjectGraph) owns its own registry:
//! no state is shared across instances, so independent projects generate
//! independently and tests can supply a fixed seed.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pbx_types::{uuid::GENERATED_UUID_LEN, Uuid};

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Generates unique identifiers and remembers every identifier it has ever
/// seen — generated or assigned — so none is issued twice.
///
/// The known set deliberately outlives object registration: a detached
/// object's uuid, or the uuid of a removed object, stays reserved for the
/// lifetime of the instance.
#[derive(Debug)]
pub struct UuidRegistry {
    known: HashSet<Uuid>,
    rng: StdRng,
}

impl UuidRegistry {
    /// A registry seeded from system entropy.
    pub fn new() -> Self {
        Self {
            known: HashSet::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// A registry with a fixed seed, for reproducible tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            known: HashSet::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate a fresh 24-character uppercase-hexadecimal identifier.
    ///
    /// Retries until the candidate is absent from the known set, then
    /// records it before returning.
    pub fn generate(&mut self) -> Uuid {
        loop {
            let mut s = String::with_capacity(GENERATED_UUID_LEN);
            for _ in 0..GENERATED_UUID_LEN {
                s.push(HEX_UPPER[self.rng.gen_range(0..16)] as char);
            }
            let candidate = Uuid::parse(s).expect("generated uuid is non-empty hex");
            if self.known.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Generate `n` pairwise-distinct, registry-distinct identifiers.
    ///
    /// Collisions are retried per element, so the result always holds
    /// exactly `n` identifiers however large `n` is relative to the known
    /// set.
    pub fn generate_batch(&mut self, n: usize) -> Vec<Uuid> {
        (0..n).map(|_| self.generate()).collect()
    }

    /// Record an externally assigned identifier (e.g. read from a document).
    ///
    /// Returns `false` if it was already known.
    pub fn record(&mut self, uuid: &Uuid) -> bool {
        self.known.insert(uuid.clone())
    }

    /// Returns `true` if the identifier has ever been generated or recorded.
    pub fn is_known(&self, uuid: &Uuid) -> bool {
        self.known.contains(uuid)
    }

    /// Number of identifiers ever generated or recorded.
    pub fn known_count(&self) -> usize {
        self.known.len()
    }
}

impl Default for UuidRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_uuids_are_24_char_uppercase_hex() {
        let mut registry = UuidRegistry::with_seed(7);
        for _ in 0..50 {
            let uuid = registry.generate();
            assert!(uuid.is_generated_form(), "bad uuid {uuid}");
        }
    }

    #[test]
    fn generation_never_repeats() {
        let mut registry = UuidRegistry::with_seed(7);
        let batch = registry.generate_batch(500);
        let distinct: HashSet<&Uuid> = batch.iter().collect();
        assert_eq!(distinct.len(), 500);
        assert_eq!(registry.known_count(), 500);
    }

    #[test]
    fn recorded_uuids_are_reserved() {
        let mut registry = UuidRegistry::with_seed(7);
        let uuid = Uuid::from_static("E5FBB3451635ED35009E96B0");
        assert!(registry.record(&uuid));
        assert!(!registry.record(&uuid));
        assert!(registry.is_known(&uuid));

        let batch = registry.generate_batch(100);
        assert!(!batch.contains(&uuid));
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let a: Vec<Uuid> = UuidRegistry::with_seed(42).generate_batch(10);
        let b: Vec<Uuid> = UuidRegistry::with_seed(42).generate_batch(10);
        assert_eq!(a, b);
    }

    #[test]
    fn different_instances_are_independent() {
        let mut a = UuidRegistry::with_seed(1);
        let mut b = UuidRegistry::with_seed(2);
        // Exhausting one registry does not consume ids from the other.
        a.generate_batch(100);
        assert_eq!(b.known_count(), 0);
        b.generate();
        assert_eq!(b.known_count(), 1);
    }
}
