//! Text to integer conversion, one Unicode scalar value per character.

use crate::error::{Result, RsaError};
use num_bigint::BigUint;
use num_traits::ToPrimitive;

pub fn text_to_ints(text: &str) -> Vec<BigUint> {
    text.chars().map(|c| BigUint::from(u32::from(c))).collect()
}

/// Inverse of [`text_to_ints`]. Fails on the first value that is not a
/// Unicode scalar value (above `0x10FFFF` or a surrogate).
pub fn ints_to_text(values: &[BigUint]) -> Result<String> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            value
                .to_u32()
                .and_then(char::from_u32)
                .ok_or_else(|| RsaError::DecodeFailure {
                    index,
                    value: value.clone(),
                })
        })
        .collect()
}
