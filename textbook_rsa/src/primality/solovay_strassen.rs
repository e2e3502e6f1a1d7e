use crate::number_theory::{jacobi_symbol, mod_pow};
use crate::primality::PrimalityTest;
use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::RngCore;

/// Solovay-Strassen test: a^((n-1)/2) ≡ (a|n) (mod n).
pub struct SolovayStrassenTest;

impl PrimalityTest for SolovayStrassenTest {
    fn run_iteration(&self, n: &BigUint, rng: &mut dyn RngCore) -> bool {
        let one = BigUint::one();
        let two = BigUint::from(2u8);
        let upper = n - &one;

        let a = rng.gen_biguint_range(&two, &upper);

        let jacobi = jacobi_symbol(&a, n);
        if jacobi == 0 {
            return false;
        }

        let x = mod_pow(&a, &(&upper >> 1), n);

        let expected = if jacobi == -1 { upper } else { one };

        x == expected
    }
}
