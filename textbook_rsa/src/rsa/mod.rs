pub mod cipher;
pub mod keygen;

pub use cipher::{decrypt, encrypt};
pub use keygen::{
    DeriverConfig, KeyDeriver, KeyMaterial, ScanBound, draw_public_exponent, modulus_and_totient,
};
