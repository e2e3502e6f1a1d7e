use crate::number_theory::mod_pow;
use crate::primality::PrimalityTest;
use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::One;
use rand::RngCore;

/// Miller-Rabin test. A composite survives one round with probability at most 1/4.
pub struct MillerRabinTest;

impl PrimalityTest for MillerRabinTest {
    fn run_iteration(&self, n: &BigUint, rng: &mut dyn RngCore) -> bool {
        let two = BigUint::from(2u8);
        let upper = n - BigUint::one();
        let a = rng.gen_biguint_range(&two, &upper);
        is_strong_probable_prime(n, &a)
    }
}

/// One Miller-Rabin round of odd `n >= 5` against witness `a` in `[2, n - 1)`.
pub(crate) fn is_strong_probable_prime(n: &BigUint, a: &BigUint) -> bool {
    let one = BigUint::one();
    let two = BigUint::from(2u8);
    let upper = n - &one;

    // n - 1 = d * 2^s with d odd
    let mut d = upper.clone();
    let mut s = 0u32;
    while d.is_even() {
        d >>= 1;
        s += 1;
    }

    let mut x = mod_pow(a, &d, n);

    if x == one || x == upper {
        return true;
    }

    for _ in 1..s {
        x = mod_pow(&x, &two, n);

        if x == upper {
            return true;
        }
        if x == one {
            return false;
        }
    }

    false
}
