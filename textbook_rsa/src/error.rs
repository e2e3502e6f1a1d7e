use std::path::PathBuf;

use num_bigint::BigUint;
use thiserror::Error;

/// Everything that can go wrong between loading a record and saving it again.
#[derive(Debug, Error)]
pub enum RsaError {
    #[error("could not open record file {}", path.display())]
    ResourceMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("record file {} is malformed: {reason}", path.display())]
    ResourceMalformed { path: PathBuf, reason: String },

    #[error("could not write record file {}", path.display())]
    ResourceWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No private exponent was found for any of the drawn public exponents.
    #[error("no private exponent found after {attempts} public exponent draw(s)")]
    KeyDerivationExhausted { attempts: u32 },

    #[error("totient {totient} is too small to pick a public exponent from [2, totient - 2]")]
    DegenerateTotient { totient: BigUint },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("value {value} at position {index} is not a valid character code")]
    DecodeFailure { index: usize, value: BigUint },
}

pub type Result<T> = std::result::Result<T, RsaError>;
