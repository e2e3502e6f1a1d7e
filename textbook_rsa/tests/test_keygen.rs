use num_bigint::BigUint;
use quickcheck::quickcheck;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use textbook_rsa::primality::PrimalityType;
use textbook_rsa::rsa::draw_public_exponent;
use textbook_rsa::{DeriverConfig, KeyDeriver, RsaError, ScanBound};

fn big(v: u32) -> BigUint {
    BigUint::from(v)
}

fn strict_deriver() -> KeyDeriver {
    KeyDeriver::new(
        DeriverConfig::default()
            .with_primality(PrimalityType::MillerRabin)
            .with_confidence(0.999_999)
            .with_max_attempts(1_000),
    )
}

fn is_prime_by_trial_division(n: u32) -> bool {
    n >= 2 && (2..).take_while(|d| d * d <= n).all(|d| n % d != 0)
}

/// Panics as soon as anything asks it for randomness.
struct NoDraws;

impl RngCore for NoDraws {
    fn next_u32(&mut self) -> u32 {
        panic!("random source used")
    }

    fn next_u64(&mut self) -> u64 {
        panic!("random source used")
    }

    fn fill_bytes(&mut self, _dest: &mut [u8]) {
        panic!("random source used")
    }

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
        panic!("random source used")
    }
}

#[test]
fn test_textbook_example() {
    let mut rng = StdRng::seed_from_u64(1);
    let keys = strict_deriver()
        .derive_with_exponent(&big(7), &big(11), &big(7), &mut rng)
        .unwrap();

    assert_eq!(keys.modulus, big(77));
    assert_eq!(keys.totient, big(60));
    assert_eq!(keys.private_exponent, big(43));
    assert!(keys.verify());
}

#[test]
fn test_private_exponent_never_equals_public() {
    // 11 * 11 = 121 ≡ 1 (mod 60), so 11 is skipped and 71 is the next match
    let mut rng = StdRng::seed_from_u64(2);
    let keys = strict_deriver()
        .derive_with_exponent(&big(7), &big(11), &big(11), &mut rng)
        .unwrap();
    assert_eq!(keys.private_exponent, big(71));
}

#[test]
fn test_totient_bound_misses_candidates_above_totient() {
    let mut rng = StdRng::seed_from_u64(3);
    let deriver = KeyDeriver::new(
        DeriverConfig::default()
            .with_confidence(0.999_999)
            .with_scan_bound(ScanBound::Totient),
    );
    let err = deriver
        .derive_with_exponent(&big(7), &big(11), &big(11), &mut rng)
        .unwrap_err();
    assert!(matches!(err, RsaError::KeyDerivationExhausted { attempts: 1 }));
}

#[test]
fn test_scan_returns_smallest_valid_candidate() {
    let mut rng = StdRng::seed_from_u64(4);
    let deriver = strict_deriver();
    let totient = 60u32;
    let bound = 77u32;

    for e in 2..=totient - 2 {
        let expected = (2..bound)
            .find(|&i| is_prime_by_trial_division(i) && i != e && (e * i) % totient == 1)
            .map(big);
        let found = deriver.find_private_exponent(&big(e), &big(totient), &big(bound), &mut rng);
        assert_eq!(found, expected, "public exponent {e}");
    }
}

#[test]
fn test_default_deriver_finds_only_prime_candidates() {
    let deriver = KeyDeriver::default();
    let totient = 3120u32;
    let bound = 3233u32;
    let smallest = |e: u32| {
        (2..bound)
            .find(|&i| is_prime_by_trial_division(i) && i != e && (e * i) % totient == 1)
            .map(big)
    };

    for seed in 0..4 {
        let mut rng = StdRng::seed_from_u64(seed);
        for e in (2 + seed as u32..=totient - 2).step_by(4) {
            let found =
                deriver.find_private_exponent(&big(e), &big(totient), &big(bound), &mut rng);
            assert_eq!(found, smallest(e), "seed {seed}, public exponent {e}");
        }
    }
}

#[test]
fn test_default_deriver_skips_composite_inverse() {
    // 2473 * 217 ≡ 1 (mod 3120), but 217 = 7 * 31 and no prime candidate exists
    let deriver = KeyDeriver::default();
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let found = deriver.find_private_exponent(&big(2473), &big(3120), &big(3233), &mut rng);
        assert_eq!(found, None, "seed {seed}");
    }
}

#[test]
fn test_derived_keys_hold_invariants() {
    let deriver = strict_deriver();
    for (p, q) in [(7u32, 11u32), (61, 53), (17, 23), (101, 113)] {
        for seed in 0..5 {
            let mut rng = StdRng::seed_from_u64(seed);
            let keys = deriver.derive(&big(p), &big(q), &mut rng).unwrap();

            assert_eq!(keys.modulus, big(p * q));
            assert_eq!(keys.totient, big((p - 1) * (q - 1)));
            assert!(keys.verify(), "{keys:?}");
            assert!(keys.public_exponent >= big(2));
            assert!(keys.public_exponent <= &keys.totient - 2u8);
            assert_ne!(keys.public_exponent, keys.private_exponent);
            assert!(keys.private_exponent < keys.modulus);

            let d = u32::try_from(&keys.private_exponent).unwrap();
            assert!(is_prime_by_trial_division(d), "private exponent {d} is not prime");
        }
    }
}

#[test]
fn test_same_seed_same_keys() {
    let deriver = strict_deriver();
    let a = deriver
        .derive(&big(61), &big(53), &mut StdRng::seed_from_u64(42))
        .unwrap();
    let b = deriver
        .derive(&big(61), &big(53), &mut StdRng::seed_from_u64(42))
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_degenerate_totient_fails_without_drawing() {
    let deriver = strict_deriver();
    for (p, q) in [(2u32, 2u32), (2, 3), (3, 2)] {
        let err = deriver.derive(&big(p), &big(q), &mut StdRng::seed_from_u64(0));
        assert!(matches!(err, Err(RsaError::DegenerateTotient { .. })), "{p}, {q}");
    }

    let err = draw_public_exponent(&big(3), &mut NoDraws).unwrap_err();
    assert!(matches!(err, RsaError::DegenerateTotient { .. }));
}

#[test]
fn test_degenerate_totient_never_touches_the_random_source() {
    let mut rng = NoDraws;
    let err = strict_deriver().derive(&big(2), &big(3), &mut rng).unwrap_err();
    assert!(matches!(err, RsaError::DegenerateTotient { .. }));
}

#[test]
fn test_retries_are_bounded() {
    // totient 4 only allows e = 2, which has no inverse modulo 4
    let deriver = KeyDeriver::new(DeriverConfig::default().with_max_attempts(3));
    let err = deriver
        .derive(&big(2), &big(5), &mut StdRng::seed_from_u64(5))
        .unwrap_err();
    assert!(matches!(err, RsaError::KeyDerivationExhausted { attempts: 3 }));
}

#[test]
fn test_zero_attempts_is_invalid() {
    let deriver = KeyDeriver::new(DeriverConfig::default().with_max_attempts(0));
    let err = deriver
        .derive(&big(61), &big(53), &mut StdRng::seed_from_u64(6))
        .unwrap_err();
    assert!(matches!(err, RsaError::InvalidArgument(_)));
}

#[test]
fn test_primes_below_two_are_invalid() {
    let err = strict_deriver()
        .derive(&big(0), &big(53), &mut StdRng::seed_from_u64(7))
        .unwrap_err();
    assert!(matches!(err, RsaError::InvalidArgument(_)));
}

#[test]
fn test_public_exponent_outside_range_is_invalid() {
    let deriver = strict_deriver();
    let mut rng = StdRng::seed_from_u64(8);
    for e in [0u32, 1, 59, 60] {
        let err = deriver
            .derive_with_exponent(&big(7), &big(11), &big(e), &mut rng)
            .unwrap_err();
        assert!(matches!(err, RsaError::InvalidArgument(_)), "public exponent {e}");
    }
}

#[test]
fn test_public_exponent_draws_stay_in_range() {
    let mut rng = StdRng::seed_from_u64(9);
    let totient = big(60);
    let mut seen_low = false;
    let mut seen_high = false;

    for _ in 0..10_000 {
        let e = draw_public_exponent(&totient, &mut rng).unwrap();
        assert!(e >= big(2) && e <= big(58), "drew {e}");
        seen_low |= e == big(2);
        seen_high |= e == big(58);
    }
    assert!(seen_low && seen_high, "range ends never drawn");

    for _ in 0..100 {
        assert_eq!(draw_public_exponent(&big(4), &mut rng).unwrap(), big(2));
    }
}

quickcheck! {
    fn prop_derived_exponents_are_inverse(seed: u64) -> bool {
        let mut rng = StdRng::seed_from_u64(seed);
        let deriver = KeyDeriver::new(DeriverConfig::default().with_max_attempts(1_000));
        let keys = deriver.derive(&big(61), &big(53), &mut rng).unwrap();
        (&keys.public_exponent * &keys.private_exponent) % &keys.totient == big(1)
    }
}
