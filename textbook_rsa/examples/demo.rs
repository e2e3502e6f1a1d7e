use num_bigint::BigUint;
use rand::SeedableRng;
use rand::rngs::StdRng;
use textbook_rsa::{KeyDeriver, Pipeline, Record};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 1) the textbook pair: 7 * 11 = 77, totient 60, e = 7 gives d = 43
    let deriver = KeyDeriver::default();
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let keys = deriver.derive_with_exponent(
        &BigUint::from(7u8),
        &BigUint::from(11u8),
        &BigUint::from(7u8),
        &mut rng,
    )?;
    println!(
        "n = {}, phi = {}, e = {}, d = {}",
        keys.modulus, keys.totient, keys.public_exponent, keys.private_exponent
    );

    let c = keys.encrypt(&[BigUint::from(72u8)])?;
    let m = keys.decrypt(&c)?;
    println!("72 -> {} -> {}", c[0], m[0]);

    // 2) a whole message with a randomly drawn public exponent
    let mut record = Record::new(BigUint::from(61u8), BigUint::from(53u8), "Hello, RSA!");
    let mut pipeline = Pipeline::new(deriver);
    pipeline.run(&mut record, &mut rng)?;

    let cypher: Vec<String> = record.cyphertext.iter().map(ToString::to_string).collect();
    println!("cypher:    {cypher:?}");
    println!("decrypted: {}", record.decrypted_text);
    println!("{}", record.to_pretty_json()?);

    Ok(())
}
