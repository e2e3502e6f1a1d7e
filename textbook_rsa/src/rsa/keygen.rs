use crate::error::{Result, RsaError};
use crate::number_theory::gcd;
use crate::primality::{PrimalityTest, PrimalityType};
use crate::rsa::cipher;
use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::{Rng, RngCore};

/// Upper limit (exclusive) of the private exponent scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanBound {
    /// Scan candidates in `[2, modulus)`. Also finds primes congruent to the
    /// inverse that lie above the totient.
    #[default]
    Modulus,
    /// Scan candidates in `[2, totient)`.
    Totient,
}

/// Knobs for [`KeyDeriver`].
#[derive(Debug, Clone, PartialEq)]
pub struct DeriverConfig {
    /// How many public exponents are drawn before giving up.
    pub max_attempts: u32,
    pub scan_bound: ScanBound,
    pub primality: PrimalityType,
    /// Confidence handed to the primality test. The default test is exact
    /// for 64-bit candidates and only uses it above that.
    pub confidence: f64,
}

impl Default for DeriverConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1_000,
            scan_bound: ScanBound::Modulus,
            primality: PrimalityType::Deterministic,
            confidence: 0.5,
        }
    }
}

impl DeriverConfig {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_scan_bound(mut self, scan_bound: ScanBound) -> Self {
        self.scan_bound = scan_bound;
        self
    }

    pub fn with_primality(mut self, primality: PrimalityType) -> Self {
        self.primality = primality;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }
}

/// Modulus, totient and a matching exponent pair.
///
/// Only [`KeyDeriver`] builds these, and it never hands one out unless
/// `public_exponent * private_exponent ≡ 1 (mod totient)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    pub prime1: BigUint,
    pub prime2: BigUint,
    pub modulus: BigUint,
    pub totient: BigUint,
    pub public_exponent: BigUint,
    pub private_exponent: BigUint,
}

impl KeyMaterial {
    /// Re-checks the modular inverse relation.
    pub fn verify(&self) -> bool {
        (&self.public_exponent * &self.private_exponent) % &self.totient == BigUint::one()
    }

    pub fn encrypt(&self, values: &[BigUint]) -> Result<Vec<BigUint>> {
        cipher::encrypt(values, &self.public_exponent, &self.modulus)
    }

    pub fn decrypt(&self, values: &[BigUint]) -> Result<Vec<BigUint>> {
        cipher::decrypt(values, &self.private_exponent, &self.modulus)
    }
}

/// Computes `(prime1 * prime2, (prime1 - 1) * (prime2 - 1))`.
pub fn modulus_and_totient(prime1: &BigUint, prime2: &BigUint) -> Result<(BigUint, BigUint)> {
    let two = BigUint::from(2u8);
    if *prime1 < two || *prime2 < two {
        return Err(RsaError::InvalidArgument(format!(
            "helper primes must be at least 2, got {prime1} and {prime2}"
        )));
    }
    let one = BigUint::one();
    let modulus = prime1 * prime2;
    let totient = (prime1 - &one) * (prime2 - &one);
    Ok((modulus, totient))
}

fn ensure_exponent_range(totient: &BigUint) -> Result<()> {
    if *totient <= BigUint::from(3u8) {
        return Err(RsaError::DegenerateTotient {
            totient: totient.clone(),
        });
    }
    Ok(())
}

/// Draws a public exponent uniformly from `[2, totient - 2]`.
pub fn draw_public_exponent<R: Rng>(totient: &BigUint, rng: &mut R) -> Result<BigUint> {
    ensure_exponent_range(totient)?;
    let low = BigUint::from(2u8);
    let high = totient - BigUint::one();
    Ok(rng.gen_biguint_range(&low, &high))
}

/// Searches for a private exponent matching randomly drawn public exponents.
pub struct KeyDeriver {
    config: DeriverConfig,
    test: Box<dyn PrimalityTest>,
}

impl Default for KeyDeriver {
    fn default() -> Self {
        Self::new(DeriverConfig::default())
    }
}

impl KeyDeriver {
    pub fn new(config: DeriverConfig) -> Self {
        let test = config.primality.test();
        Self { config, test }
    }

    pub fn config(&self) -> &DeriverConfig {
        &self.config
    }

    /// Derives key material, redrawing the public exponent until a private
    /// exponent is found or `max_attempts` draws have failed.
    pub fn derive<R: Rng>(
        &self,
        prime1: &BigUint,
        prime2: &BigUint,
        rng: &mut R,
    ) -> Result<KeyMaterial> {
        if self.config.max_attempts == 0 {
            return Err(RsaError::InvalidArgument(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        let (modulus, totient) = modulus_and_totient(prime1, prime2)?;
        ensure_exponent_range(&totient)?;
        self.warn_if_composite(prime1, prime2, rng);

        log::info!("Prime1     = {prime1:>3}   -  Prime2     = {prime2:>3}  | {modulus:>4}");
        log::info!(
            "Prime1 - 1 = {:>3}   -  Prime2 - 1 = {:>3}  | {totient:>4}",
            prime1 - 1u8,
            prime2 - 1u8
        );

        for attempt in 1..=self.config.max_attempts {
            let public_exponent = draw_public_exponent(&totient, rng)?;
            log::info!("Attempt {attempt}: public exponent is {public_exponent}");

            match self.scan(&public_exponent, &modulus, &totient, rng) {
                Some(private_exponent) => {
                    return Ok(KeyMaterial {
                        prime1: prime1.clone(),
                        prime2: prime2.clone(),
                        modulus,
                        totient,
                        public_exponent,
                        private_exponent,
                    });
                }
                None => {
                    log::warn!("No private exponent found for public exponent {public_exponent}")
                }
            }
        }

        Err(RsaError::KeyDerivationExhausted {
            attempts: self.config.max_attempts,
        })
    }

    /// One derivation attempt with a caller-chosen public exponent.
    pub fn derive_with_exponent<R: Rng>(
        &self,
        prime1: &BigUint,
        prime2: &BigUint,
        public_exponent: &BigUint,
        rng: &mut R,
    ) -> Result<KeyMaterial> {
        let (modulus, totient) = modulus_and_totient(prime1, prime2)?;
        ensure_exponent_range(&totient)?;
        let low = BigUint::from(2u8);
        let high = &totient - 2u8;
        if *public_exponent < low || *public_exponent > high {
            return Err(RsaError::InvalidArgument(format!(
                "public exponent {public_exponent} outside [2, {high}]"
            )));
        }

        let private_exponent = self
            .scan(public_exponent, &modulus, &totient, rng)
            .ok_or(RsaError::KeyDerivationExhausted { attempts: 1 })?;

        Ok(KeyMaterial {
            prime1: prime1.clone(),
            prime2: prime2.clone(),
            modulus,
            totient,
            public_exponent: public_exponent.clone(),
            private_exponent,
        })
    }

    fn scan<R: Rng>(
        &self,
        public_exponent: &BigUint,
        modulus: &BigUint,
        totient: &BigUint,
        rng: &mut R,
    ) -> Option<BigUint> {
        let bound = match self.config.scan_bound {
            ScanBound::Modulus => modulus,
            ScanBound::Totient => totient,
        };
        self.find_private_exponent(public_exponent, totient, bound, rng)
    }

    /// Returns the smallest prime `i` in `[2, bound)`, `i != public_exponent`,
    /// with `public_exponent * i ≡ 1 (mod totient)`.
    pub fn find_private_exponent<R: Rng>(
        &self,
        public_exponent: &BigUint,
        totient: &BigUint,
        bound: &BigUint,
        rng: &mut R,
    ) -> Option<BigUint> {
        let one = BigUint::one();
        if gcd(public_exponent, totient) != one {
            log::debug!("{public_exponent} and {totient} are not coprime, no inverse exists");
            return None;
        }

        let mut i = BigUint::from(2u8);
        while i < *bound {
            if !self.is_candidate_prime(&i, rng) {
                i += 1u8;
                continue;
            }

            if i == *public_exponent {
                log::debug!("skipping {i}, equal to the public exponent");
                i += 1u8;
                continue;
            }

            let remainder = (public_exponent * &i) % totient;
            if remainder == one {
                log::info!(
                    "{public_exponent:>3} * {i:>3} MOD {totient:>3} = {remainder:>3}  | found"
                );
                return Some(i);
            }
            log::trace!("{public_exponent:>3} * {i:>3} MOD {totient:>3} = {remainder:>3}");
            i += 1u8;
        }
        None
    }

    fn is_candidate_prime<R: Rng>(&self, n: &BigUint, rng: &mut R) -> bool {
        let rng: &mut dyn RngCore = rng;
        self.test.is_probably_prime(n, self.config.confidence, rng)
    }

    fn warn_if_composite<R: Rng>(&self, prime1: &BigUint, prime2: &BigUint, rng: &mut R) {
        for prime in [prime1, prime2] {
            if !self.is_candidate_prime(prime, rng) {
                log::warn!("{prime} does not look prime, the key pair may not round-trip");
            }
        }
    }
}
