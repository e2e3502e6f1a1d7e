//! Drives a [`Record`] from helper primes to a decrypted, saved message.

use std::fmt;
use std::path::Path;

use rand::Rng;

use crate::codec::{ints_to_text, text_to_ints};
use crate::error::{Result, RsaError};
use crate::record::Record;
use crate::rsa::{KeyDeriver, KeyMaterial};

/// Linear progression of a pipeline run. The only loop is the retry inside
/// key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Init,
    KeysDerived,
    Encoded,
    Encrypted,
    Decrypted,
    Decoded,
    Persisted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::KeysDerived => "keys derived",
            Stage::Encoded => "encoded",
            Stage::Encrypted => "encrypted",
            Stage::Decrypted => "decrypted",
            Stage::Decoded => "decoded",
            Stage::Persisted => "persisted",
        };
        f.write_str(name)
    }
}

pub struct Pipeline {
    deriver: KeyDeriver,
    stage: Stage,
    keys: Option<KeyMaterial>,
}

impl Pipeline {
    pub fn new(deriver: KeyDeriver) -> Self {
        Self {
            deriver,
            stage: Stage::Init,
            keys: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn keys(&self) -> Option<&KeyMaterial> {
        self.keys.as_ref()
    }

    /// Runs every step up to [`Stage::Decoded`]. Saving is left to
    /// [`Pipeline::persist`] so the caller picks the destination.
    pub fn run<R: Rng>(&mut self, record: &mut Record, rng: &mut R) -> Result<()> {
        self.derive_keys(record, rng)?;
        self.encode(record)?;
        self.encrypt(record)?;
        self.decrypt(record)?;
        self.decode(record)
    }

    pub fn derive_keys<R: Rng>(&mut self, record: &mut Record, rng: &mut R) -> Result<()> {
        self.expect_stage(Stage::Init)?;
        let prime1 = record
            .prime1
            .clone()
            .ok_or_else(|| RsaError::InvalidArgument("record has no prime_1".to_string()))?;
        let prime2 = record
            .prime2
            .clone()
            .ok_or_else(|| RsaError::InvalidArgument("record has no prime_2".to_string()))?;

        let keys = self.deriver.derive(&prime1, &prime2, rng)?;
        record.apply_keys(&keys);
        self.keys = Some(keys);
        self.advance(Stage::KeysDerived);
        Ok(())
    }

    pub fn encode(&mut self, record: &mut Record) -> Result<()> {
        self.expect_stage(Stage::KeysDerived)?;
        let keys = self.current_keys()?;
        let ints = text_to_ints(&record.plaintext);
        for (index, value) in ints.iter().enumerate() {
            if *value >= keys.modulus {
                log::warn!(
                    "code {value} at {index} is not below modulus {}, it will not round-trip",
                    keys.modulus
                );
            }
        }
        record.plaintext_ints = ints;
        self.advance(Stage::Encoded);
        Ok(())
    }

    pub fn encrypt(&mut self, record: &mut Record) -> Result<()> {
        self.expect_stage(Stage::Encoded)?;
        record.cyphertext = self.current_keys()?.encrypt(&record.plaintext_ints)?;
        self.advance(Stage::Encrypted);
        Ok(())
    }

    pub fn decrypt(&mut self, record: &mut Record) -> Result<()> {
        self.expect_stage(Stage::Encrypted)?;
        record.decrypted_ints = self.current_keys()?.decrypt(&record.cyphertext)?;
        self.advance(Stage::Decrypted);
        Ok(())
    }

    pub fn decode(&mut self, record: &mut Record) -> Result<()> {
        self.expect_stage(Stage::Decrypted)?;
        record.decrypted_text = ints_to_text(&record.decrypted_ints)?;
        if record.decrypted_text == record.plaintext {
            log::info!("Decrypted text matches the plain text");
        } else {
            log::warn!(
                "Decrypted text {:?} differs from plain text {:?}",
                record.decrypted_text,
                record.plaintext
            );
        }
        self.advance(Stage::Decoded);
        Ok(())
    }

    pub fn persist(&mut self, record: &Record, path: impl AsRef<Path>) -> Result<()> {
        self.expect_stage(Stage::Decoded)?;
        record.save(path)?;
        self.advance(Stage::Persisted);
        Ok(())
    }

    fn current_keys(&self) -> Result<&KeyMaterial> {
        self.keys
            .as_ref()
            .ok_or_else(|| RsaError::InvalidArgument("keys have not been derived".to_string()))
    }

    fn expect_stage(&self, expected: Stage) -> Result<()> {
        if self.stage != expected {
            return Err(RsaError::InvalidArgument(format!(
                "step needs stage '{expected}', pipeline is at '{}'",
                self.stage
            )));
        }
        Ok(())
    }

    fn advance(&mut self, next: Stage) {
        log::info!("Stage {} -> {}", self.stage, next);
        self.stage = next;
    }
}
