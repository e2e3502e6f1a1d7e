use crate::primality::miller_rabin::is_strong_probable_prime;
use crate::primality::{MillerRabinTest, PrimalityTest, confidence_to_iterations, trivial_verdict};
use num_bigint::BigUint;
use rand::RngCore;

/// The first twelve primes. Together they expose every composite below
/// [`EXACT_LIMIT`] as a Miller-Rabin witness.
const WITNESSES: [u8; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Smallest strong pseudoprime to all of [`WITNESSES`].
const EXACT_LIMIT: u128 = 318_665_857_834_031_151_167_461;

/// Miller-Rabin with fixed witnesses: exact for `n < 3.18e23`, which covers
/// every value that fits in a `u64`. Larger values fall back to random rounds,
/// as many as the confidence asks for.
pub struct DeterministicTest;

impl PrimalityTest for DeterministicTest {
    fn is_probably_prime(&self, n: &BigUint, confidence: f64, rng: &mut dyn RngCore) -> bool {
        if let Some(verdict) = trivial_verdict(n) {
            return verdict;
        }
        if *n < BigUint::from(EXACT_LIMIT) {
            return WITNESSES
                .iter()
                .map(|&a| BigUint::from(a))
                .take_while(|a| a < n)
                .all(|a| is_strong_probable_prime(n, &a));
        }
        (0..confidence_to_iterations(confidence)).all(|_| self.run_iteration(n, rng))
    }

    fn run_iteration(&self, n: &BigUint, rng: &mut dyn RngCore) -> bool {
        MillerRabinTest.run_iteration(n, rng)
    }
}
