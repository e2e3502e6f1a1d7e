use crate::error::{Result, RsaError};
use crate::number_theory::mod_pow;
use num_bigint::BigUint;
use num_traits::Zero;

/// Raises every value to `exponent` modulo `modulus`, keeping order and length.
pub fn encrypt(values: &[BigUint], exponent: &BigUint, modulus: &BigUint) -> Result<Vec<BigUint>> {
    apply(values, exponent, modulus)
}

/// Same operation as [`encrypt`]; pass the private exponent.
pub fn decrypt(values: &[BigUint], exponent: &BigUint, modulus: &BigUint) -> Result<Vec<BigUint>> {
    apply(values, exponent, modulus)
}

fn apply(values: &[BigUint], exponent: &BigUint, modulus: &BigUint) -> Result<Vec<BigUint>> {
    if modulus.is_zero() {
        return Err(RsaError::InvalidArgument(
            "modulus must be positive".to_string(),
        ));
    }
    Ok(values
        .iter()
        .map(|value| mod_pow(value, exponent, modulus))
        .collect())
}
