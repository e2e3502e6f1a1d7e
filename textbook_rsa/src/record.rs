//! JSON load/save of the full key and message record.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RsaError};
use crate::rsa::KeyMaterial;

pub const DEFAULT_INPUT: &str = "inp.json";
pub const DEFAULT_OUTPUT: &str = "out.json";

/// Helper primes, derived keys and every stage of the message.
///
/// Field names on disk follow the `inp.json`/`out.json` layout; absent or zero
/// values are left out when saving.
///
/// `exp_public` holds the public exponent and `exp_private` the private one.
/// Older `out.json` files store them the other way round. Nothing in the
/// values tells the two layouts apart, so such a file loads with the exponents
/// swapped; encryption and decryption still round-trip since the inverse
/// relation is symmetric, but the roles are reversed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(
        rename = "prime_1",
        default,
        skip_serializing_if = "is_absent",
        with = "decimal::option"
    )]
    pub prime1: Option<BigUint>,
    #[serde(
        rename = "prime_2",
        default,
        skip_serializing_if = "is_absent",
        with = "decimal::option"
    )]
    pub prime2: Option<BigUint>,
    #[serde(rename = "p", default, skip_serializing_if = "is_absent", with = "decimal::option")]
    pub modulus: Option<BigUint>,
    #[serde(
        rename = "p_decremented",
        default,
        skip_serializing_if = "is_absent",
        with = "decimal::option"
    )]
    pub totient: Option<BigUint>,
    #[serde(
        rename = "exp_private",
        default,
        skip_serializing_if = "is_absent",
        with = "decimal::option"
    )]
    pub private_exponent: Option<BigUint>,
    #[serde(
        rename = "exp_public",
        default,
        skip_serializing_if = "is_absent",
        with = "decimal::option"
    )]
    pub public_exponent: Option<BigUint>,

    #[serde(rename = "plain_text", default, skip_serializing_if = "String::is_empty")]
    pub plaintext: String,
    #[serde(
        rename = "plain_ints",
        default,
        skip_serializing_if = "Vec::is_empty",
        with = "decimal::vec"
    )]
    pub plaintext_ints: Vec<BigUint>,
    #[serde(
        rename = "cypher",
        default,
        skip_serializing_if = "Vec::is_empty",
        with = "decimal::vec"
    )]
    pub cyphertext: Vec<BigUint>,
    #[serde(
        rename = "decr_ints",
        default,
        skip_serializing_if = "Vec::is_empty",
        with = "decimal::vec"
    )]
    pub decrypted_ints: Vec<BigUint>,
    #[serde(rename = "decr_text", default, skip_serializing_if = "String::is_empty")]
    pub decrypted_text: String,
}

fn is_absent(value: &Option<BigUint>) -> bool {
    value.as_ref().is_none_or(Zero::is_zero)
}

impl Record {
    pub fn new(prime1: BigUint, prime2: BigUint, plaintext: impl Into<String>) -> Self {
        Self {
            prime1: Some(prime1),
            prime2: Some(prime2),
            plaintext: plaintext.into(),
            ..Self::default()
        }
    }

    /// Reads a record from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| RsaError::ResourceMissing {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Found record file: {}", path.display());

        let record = Self::from_reader(BufReader::new(file), path)?;
        log::debug!("Record loaded\n{record:#?}");
        Ok(record)
    }

    /// Parses a record; `origin` only names the source in error messages.
    pub fn from_reader<R: Read>(reader: R, origin: impl AsRef<Path>) -> Result<Self> {
        serde_json::from_reader(reader).map_err(|e| RsaError::ResourceMalformed {
            path: origin.as_ref().to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Tab-indented JSON, the format written by [`Record::save`].
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        // serde_json only ever emits valid UTF-8
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let write_error = |source: std::io::Error| RsaError::ResourceWrite {
            path: PathBuf::from(path),
            source,
        };
        let json = self
            .to_pretty_json()
            .map_err(|e| write_error(std::io::Error::from(e)))?;
        std::fs::write(path, json).map_err(write_error)?;
        log::info!("Saved record to {}", path.display());
        Ok(())
    }

    /// Copies modulus, totient and both exponents into the record.
    pub fn apply_keys(&mut self, keys: &KeyMaterial) {
        self.prime1 = Some(keys.prime1.clone());
        self.prime2 = Some(keys.prime2.clone());
        self.modulus = Some(keys.modulus.clone());
        self.totient = Some(keys.totient.clone());
        self.public_exponent = Some(keys.public_exponent.clone());
        self.private_exponent = Some(keys.private_exponent.clone());
    }

    /// Rebuilds key material from a saved record. Returns `None` if a field is
    /// missing, the stored modulus or totient disagree with the primes, or the
    /// exponents are not inverse to each other.
    pub fn key_material(&self) -> Option<KeyMaterial> {
        let prime1 = self.prime1.clone()?;
        let prime2 = self.prime2.clone()?;
        let (modulus, totient) = crate::rsa::modulus_and_totient(&prime1, &prime2).ok()?;
        if self.modulus.as_ref() != Some(&modulus) || self.totient.as_ref() != Some(&totient) {
            return None;
        }
        let keys = KeyMaterial {
            prime1,
            prime2,
            modulus,
            totient,
            public_exponent: self.public_exponent.clone()?,
            private_exponent: self.private_exponent.clone()?,
        };
        keys.verify().then_some(keys)
    }
}

/// Big integers as JSON numbers when they fit in 64 bits, decimal strings
/// otherwise. Both forms are accepted when reading.
mod decimal {
    use std::fmt;

    use num_bigint::BigUint;
    use num_traits::ToPrimitive;
    use serde::de::{self, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    struct DecimalRef<'a>(&'a BigUint);

    impl Serialize for DecimalRef<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self.0.to_u64() {
                Some(small) => serializer.serialize_u64(small),
                None => serializer.serialize_str(&self.0.to_str_radix(10)),
            }
        }
    }

    struct Decimal(BigUint);

    impl<'de> Deserialize<'de> for Decimal {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(DecimalVisitor).map(Decimal)
        }
    }

    struct DecimalVisitor;

    impl Visitor<'_> for DecimalVisitor {
        type Value = BigUint;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a non-negative integer or a string of decimal digits")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<BigUint, E> {
            Ok(BigUint::from(v))
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<BigUint, E> {
            Ok(BigUint::from(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<BigUint, E> {
            u64::try_from(v)
                .map(BigUint::from)
                .map_err(|_| E::custom(format!("negative value {v} is not supported")))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<BigUint, E> {
            Err(E::custom(format!(
                "{v} is not an integer that fits in 64 bits, write it as a decimal string"
            )))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<BigUint, E> {
            let digits = v.trim();
            if digits.starts_with('-') {
                return Err(E::custom(format!("negative value {digits} is not supported")));
            }
            BigUint::parse_bytes(digits.as_bytes(), 10)
                .ok_or_else(|| E::custom(format!("{digits:?} is not a decimal integer")))
        }
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<BigUint>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => serializer.serialize_some(&DecimalRef(v)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<BigUint>, D::Error> {
            Ok(Option::<Decimal>::deserialize(deserializer)?.map(|d| d.0))
        }
    }

    pub mod vec {
        use super::*;

        pub fn serialize<S: Serializer>(
            values: &[BigUint],
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(values.iter().map(DecimalRef))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<BigUint>, D::Error> {
            Ok(Vec::<Decimal>::deserialize(deserializer)?
                .into_iter()
                .map(|d| d.0)
                .collect())
        }
    }
}
