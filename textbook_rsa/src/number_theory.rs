use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    let mut a = a.clone();
    let mut b = b.clone();
    while !b.is_zero() {
        let r = a % &b;
        a = b;
        b = r;
    }
    a
}

/// Modular exponentiation: base^exponent mod modulus.
///
/// A zero modulus yields zero; callers that must reject it check before calling.
pub fn mod_pow(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> BigUint {
    if modulus.is_zero() {
        return BigUint::zero();
    }
    if modulus.is_one() {
        return BigUint::zero();
    }
    let mut base = base % modulus;
    let mut exp = exponent.clone();
    let mut result = BigUint::one();

    while !exp.is_zero() {
        if exp.is_odd() {
            result = (result * &base) % modulus;
        }
        base = (&base * &base) % modulus;
        exp >>= 1;
    }
    result
}

/// Jacobi symbol (a|n). It is only defined for odd positive n; any other n
/// gives 0.
pub fn jacobi_symbol(a: &BigUint, n: &BigUint) -> i32 {
    if n.is_even() {
        return 0;
    }

    let mut a = a % n;
    let mut n = n.clone();
    let mut result = 1;

    while !a.is_zero() {
        while a.is_even() {
            a >>= 1;
            // n ≡ 3 or 5 (mod 8)
            if n.bit(1) != n.bit(2) {
                result = -result;
            }
        }

        std::mem::swap(&mut a, &mut n);
        // both odd here, so bit 1 set means ≡ 3 (mod 4)
        if a.bit(1) && n.bit(1) {
            result = -result;
        }
        a %= &n;
    }

    if n.is_one() { result } else { 0 }
}
