pub(crate) mod deterministic;
pub(crate) mod fermat;
pub(crate) mod miller_rabin;
pub(crate) mod solovay_strassen;
pub use deterministic::DeterministicTest;
pub use fermat::FermatTest;
pub use miller_rabin::MillerRabinTest;
pub use solovay_strassen::SolovayStrassenTest;

use num_bigint::BigUint;
use num_integer::Integer;
use rand::RngCore;

/// Which primality test the key deriver uses for candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimalityType {
    /// Miller-Rabin with fixed witnesses, exact for 64-bit values.
    #[default]
    Deterministic,
    Fermat,
    MillerRabin,
    SolovayStrassen,
}

impl PrimalityType {
    pub fn test(self) -> Box<dyn PrimalityTest> {
        match self {
            PrimalityType::Deterministic => Box::new(DeterministicTest),
            PrimalityType::Fermat => Box::new(FermatTest),
            PrimalityType::MillerRabin => Box::new(MillerRabinTest),
            PrimalityType::SolovayStrassen => Box::new(SolovayStrassenTest),
        }
    }
}

/// Primality test built from repeated rounds.
///
/// The public entry point is fixed; implementors only provide one iteration.
/// Values below 4 and even values are decided before any iteration runs, so
/// `run_iteration` only ever sees odd `n >= 5`.
pub trait PrimalityTest {
    /// Returns true if `n` is prime with at least the given confidence.
    ///
    /// Each iteration is assumed to let a composite through with probability
    /// at most 1/2, which is conservative for Miller-Rabin (at most 1/4).
    fn is_probably_prime(&self, n: &BigUint, confidence: f64, rng: &mut dyn RngCore) -> bool {
        if let Some(verdict) = trivial_verdict(n) {
            return verdict;
        }
        let iterations = confidence_to_iterations(confidence);
        for _ in 0..iterations {
            if !self.run_iteration(n, rng) {
                return false;
            }
        }
        true
    }

    /// One round of the test with a witness drawn from `rng`.
    fn run_iteration(&self, n: &BigUint, rng: &mut dyn RngCore) -> bool;
}

pub(crate) fn trivial_verdict(n: &BigUint) -> Option<bool> {
    if *n < BigUint::from(2u8) {
        return Some(false);
    }
    if *n < BigUint::from(4u8) {
        return Some(true);
    }
    if n.is_even() {
        return Some(false);
    }
    None
}

const MAX_ITERATIONS: u32 = 128;

/// confidence = 1 - (1/2)^k  =>  k = log2(1 / (1 - confidence)), at least one round.
pub fn confidence_to_iterations(confidence: f64) -> u32 {
    if confidence.is_nan() || confidence >= 1.0 {
        return MAX_ITERATIONS;
    }
    let k = (1.0 / (1.0 - confidence)).log2().ceil();
    if k < 1.0 {
        1
    } else {
        (k as u32).min(MAX_ITERATIONS)
    }
}
