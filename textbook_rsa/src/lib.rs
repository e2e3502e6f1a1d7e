//! Textbook RSA over small helper primes.
//!
//! Not secure: no padding, tiny keys, and a private exponent found by linear
//! search. Useful to watch the arithmetic work end to end.

pub mod codec;
pub mod error;
pub mod number_theory;
pub mod pipeline;
pub mod primality;
pub mod record;
pub mod rsa;

pub use error::{Result, RsaError};
pub use pipeline::{Pipeline, Stage};
pub use record::Record;
pub use rsa::{DeriverConfig, KeyDeriver, KeyMaterial, ScanBound};
