use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use textbook_rsa::primality::PrimalityType;
use textbook_rsa::record::{DEFAULT_INPUT, DEFAULT_OUTPUT};
use textbook_rsa::{DeriverConfig, KeyDeriver, Pipeline, Record, ScanBound};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BoundArg {
    Modulus,
    Totient,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PrimalityArg {
    Deterministic,
    Fermat,
    MillerRabin,
    SolovayStrassen,
}

/// Derive a textbook RSA key pair from two helper primes, then encrypt and
/// decrypt the record's plain text with it.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Record holding prime_1, prime_2 and plain_text
    #[arg(default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Where the completed record is written
    #[arg(default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Seed for reproducible public exponent draws; OS entropy if omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Public exponent draws before giving up
    #[arg(long, default_value_t = 1_000)]
    max_attempts: u32,

    /// Upper limit of the private exponent scan
    #[arg(long, value_enum, default_value = "modulus")]
    scan_bound: BoundArg,

    /// Primality test for private exponent candidates
    #[arg(long, value_enum, default_value = "deterministic")]
    primality: PrimalityArg,

    /// Primality confidence for the random-witness tests; 0.5 runs a single round
    #[arg(long, default_value_t = 0.5)]
    confidence: f64,
}

impl Args {
    fn deriver_config(&self) -> DeriverConfig {
        let scan_bound = match self.scan_bound {
            BoundArg::Modulus => ScanBound::Modulus,
            BoundArg::Totient => ScanBound::Totient,
        };
        let primality = match self.primality {
            PrimalityArg::Deterministic => PrimalityType::Deterministic,
            PrimalityArg::Fermat => PrimalityType::Fermat,
            PrimalityArg::MillerRabin => PrimalityType::MillerRabin,
            PrimalityArg::SolovayStrassen => PrimalityType::SolovayStrassen,
        };
        DeriverConfig::default()
            .with_max_attempts(self.max_attempts)
            .with_scan_bound(scan_bound)
            .with_primality(primality)
            .with_confidence(self.confidence)
    }
}

fn run(args: &Args) -> textbook_rsa::Result<()> {
    let mut rng = match args.seed {
        Some(seed) => {
            log::info!("Seeding random source with {seed}");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let mut record = Record::load(&args.input)?;
    let mut pipeline = Pipeline::new(KeyDeriver::new(args.deriver_config()));
    pipeline.run(&mut record, &mut rng)?;
    log::debug!("{record:#?}");
    pipeline.persist(&record, &args.output)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
