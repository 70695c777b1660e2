//! Reference Generation
//!
//! Produces human-readable transfer references of the form
//! `TRF-YYYYMMDD-XXXX` (4 random uppercase alphanumerics).
//!
//! References are NOT globally unique by construction; the store's
//! unique reference index is the actual guarantee, and the service
//! regenerates on collision (bounded retries).

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const REFERENCE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const RANDOM_SUFFIX_LEN: usize = 4;

/// Generator for human-readable transfer references.
///
/// Holds its own RNG behind a mutex so the service can share one
/// instance across concurrent requests; seedable for deterministic tests.
pub struct ReferenceGenerator {
    rng: Mutex<StdRng>,
}

impl ReferenceGenerator {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic generator for tests
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Generate a reference for the given instant
    pub fn generate(&self, now: DateTime<Utc>) -> String {
        let mut rng = self.rng.lock().unwrap();
        let suffix: String = (0..RANDOM_SUFFIX_LEN)
            .map(|_| {
                let idx = rng.gen_range(0..REFERENCE_CHARSET.len());
                REFERENCE_CHARSET[idx] as char
            })
            .collect();

        format!("TRF-{}-{}", now.format("%Y%m%d"), suffix)
    }
}

impl Default for ReferenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn is_well_formed(reference: &str) -> bool {
        // ^TRF-\d{8}-[A-Z0-9]{4}$
        let parts: Vec<&str> = reference.split('-').collect();
        parts.len() == 3
            && parts[0] == "TRF"
            && parts[1].len() == 8
            && parts[1].bytes().all(|b| b.is_ascii_digit())
            && parts[2].len() == 4
            && parts[2]
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    }

    #[test]
    fn test_reference_shape() {
        let generator = ReferenceGenerator::new();
        for _ in 0..100 {
            let reference = generator.generate(Utc::now());
            assert!(is_well_formed(&reference), "malformed: {reference}");
        }
    }

    #[test]
    fn test_date_segment() {
        let generator = ReferenceGenerator::with_seed(7);
        let date = Utc.with_ymd_and_hms(2025, 1, 3, 10, 30, 0).unwrap();
        let reference = generator.generate(date);
        assert!(reference.starts_with("TRF-20250103-"));
    }

    #[test]
    fn test_successive_references_differ() {
        // Probabilistic, not guaranteed: collisions are handled by the
        // service's retry loop, but back-to-back duplicates from one RNG
        // stream would indicate a broken generator.
        let generator = ReferenceGenerator::with_seed(42);
        let now = Utc::now();
        let a = generator.generate(now);
        let b = generator.generate(now);
        assert_ne!(a, b);
    }

    #[test]
    fn test_seeded_generator_is_deterministic() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let first = ReferenceGenerator::with_seed(123).generate(now);
        let second = ReferenceGenerator::with_seed(123).generate(now);
        assert_eq!(first, second);
    }
}
