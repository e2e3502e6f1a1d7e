use crate::number_theory::mod_pow;
use crate::primality::PrimalityTest;
use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::RngCore;

/// Fermat test: a^(n-1) ≡ 1 (mod n). Carmichael numbers fool it for every coprime witness.
pub struct FermatTest;

impl PrimalityTest for FermatTest {
    fn run_iteration(&self, n: &BigUint, rng: &mut dyn RngCore) -> bool {
        let one = BigUint::one();
        let two = BigUint::from(2u8);
        let n_minus_one = n - &one;

        let a = rng.gen_biguint_range(&two, &n_minus_one);

        mod_pow(&a, &n_minus_one, n) == one
    }
}
