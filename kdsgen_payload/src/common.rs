//! Random material shared by every payload.

use rand::{Rng, distr::Alphanumeric};

/// The number of symbols synthetic payloads are drawn from: `a-z`, `A-Z` and
/// `0-9`.
pub const ALPHABET_LEN: usize = 62;

/// Produce exactly `size` bytes, each drawn uniformly from the alphanumeric
/// alphabet.
pub fn alphanumeric<R>(rng: &mut R, size: usize) -> Vec<u8>
where
    R: Rng + ?Sized,
{
    rng.sample_iter(Alphanumeric).take(size).collect()
}

/// Produce a random v4 UUID in its hyphenated string form.
///
/// The UUID is built from `rng` and not the operating system so that seeded
/// runs are reproducible.
pub fn random_uuid<R>(rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    uuid::Builder::from_random_bytes(rng.random())
        .into_uuid()
        .hyphenated()
        .to_string()
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;
    use rand::{SeedableRng, rngs::SmallRng};
    use std::collections::HashSet;

    use super::{alphanumeric, random_uuid};

    // Payloads are always exactly the requested size.
    proptest! {
        #[test]
        fn alphanumeric_exact_size(seed: u64, size in 0..65_536usize) {
            let mut rng = SmallRng::seed_from_u64(seed);
            let raw = alphanumeric(&mut rng, size);
            prop_assert_eq!(raw.len(), size);
        }
    }

    // Payloads never contain a byte outside the alphabet.
    proptest! {
        #[test]
        fn alphanumeric_in_alphabet(seed: u64, size in 0..4_096usize) {
            let mut rng = SmallRng::seed_from_u64(seed);
            let raw = alphanumeric(&mut rng, size);
            prop_assert!(raw.iter().all(u8::is_ascii_alphanumeric));
        }
    }

    #[test]
    fn alphanumeric_covers_alphabet() {
        let mut rng = SmallRng::seed_from_u64(19_690_716);
        let raw = alphanumeric(&mut rng, 100_000);
        let distinct: HashSet<u8> = raw.into_iter().collect();
        assert_eq!(distinct.len(), super::ALPHABET_LEN);
    }

    #[test]
    fn uuid_is_v4_and_unique() {
        let mut rng = SmallRng::seed_from_u64(0);
        let a = random_uuid(&mut rng);
        let b = random_uuid(&mut rng);
        assert_ne!(a, b);

        let parsed = uuid::Uuid::parse_str(&a).expect("not a uuid");
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn uuid_reproducible_from_seed() {
        let mut left = SmallRng::seed_from_u64(42);
        let mut right = SmallRng::seed_from_u64(42);
        assert_eq!(random_uuid(&mut left), random_uuid(&mut right));
    }
}
