use std::error::Error;
use clap::Parser;
use num_bigint::{BigUint, ParseBigIntError};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub mod config;
pub mod primality;
pub mod prime_gen;
pub mod keys;
pub mod cipher;

use config::*;
use keys::*;
use cipher::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    Demo,
    Generate,
    Encode,
    Decode,
}

#[macro_export]
macro_rules! rsa_t {
    ($CONFIG: expr, $NAME: ident) => {
#[derive(Debug, Clone, Parser)]
pub struct $NAME {
    #[clap(short, long, value_parser, default_value = $CONFIG.mode.as_str(), help = "Run mode: demo, generate, encode, decode")]
    pub mode: String,
    #[clap(short, long, value_parser, default_value = $CONFIG.prime.as_str(), help = "The fixed prime p")]
    pub prime: String,
    #[clap(long, value_parser, default_value = $CONFIG.q_min.as_str(), help = "Lower bound (inclusive) of the range q is drawn from")]
    pub q_min: String,
    #[clap(long, value_parser, default_value = $CONFIG.q_max.as_str(), help = "Upper bound (exclusive) of the range q is drawn from")]
    pub q_max: String,
    #[clap(short, long, value_parser, default_value = $CONFIG.text.as_str(), help = "Message to encode")]
    pub text: String,
    #[clap(short, long, value_parser, default_value = $CONFIG.key.as_str(), help = "Key `(x, n)' used by encode / decode")]
    pub key: String,
    #[clap(short, long, value_parser, default_value = $CONFIG.input.as_str(), help = "Cipher values `[c1, c2, ...]' to decode")]
    pub input: String,
    #[clap(long, value_parser, default_value = $CONFIG.primality.as_str(), help = "Primality test: trial, miller-rabin")]
    pub primality: String,
    #[clap(short, long, value_parser, default_value_t = $CONFIG.rounds, help = "Miller Rabin calculate rounds")]
    pub rounds: u32,
    #[clap(long, value_parser, default_value_t = $CONFIG.enumerate_max, help = "Widest range that is enumerated instead of probed")]
    pub enumerate_max: u64,
    #[clap(long, value_parser, default_value_t = $CONFIG.tries_max, help = "Max random candidates tried when probing for a prime")]
    pub tries_max: u64,
    #[clap(long, value_parser, default_value_t = $CONFIG.time_max, help = "Max time in mill seconds that trying to generate a prime")]
    pub time_max: i64,
    #[clap(long, value_parser, default_value_t = $CONFIG.retry, help = "Max draws of q (q != p) and of e (gcd(e, phi) = 1)")]
    pub retry: u32,
    #[clap(long, value_parser, help = "Seed the random generator for a reproducible run")]
    pub seed: Option<u64>,
    #[clap(short, long, value_parser, default_value_t = $CONFIG.silent, help = "Disable log output")]
    pub silent: bool,
    #[clap(long, value_parser, default_value_t = $CONFIG.threads, help = "Probe for primes in <THREADS> threads")]
    pub threads: usize,
}
    };
}

rsa_t!(CONFIG_DEF, RSA);

impl RSA {
    pub fn get(&self) -> &RSA {
        self
    }

    fn run_mode(&self) -> Result<RunMode, Box<dyn Error>> {
        match self.mode.as_str() {
            "demo" => Ok(RunMode::Demo),
            "generate" => Ok(RunMode::Generate),
            "encode" => Ok(RunMode::Encode),
            "decode" => Ok(RunMode::Decode),
            _ => Err("Unknown run mode! available: demo(default), generate, encode, decode".into())
        }
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub fn format_ciphertext(values: &[BigUint]) -> String {
        format!("[{}]", values.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(", "))
    }

    pub fn parse_ciphertext(text: &str) -> Result<Vec<BigUint>, ParseBigIntError> {
        let text = text.trim();
        let text = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')).unwrap_or(text).trim();
        if text.is_empty() { return Ok(Vec::new()); }
        // an empty field fails to parse, so `[1,,2]` is an error
        text.split(',')
            .map(|c| c.trim().parse::<BigUint>())
            .collect()
    }

    /// Keypair from the configured `p` and q range.
    pub fn generate(&self, rng: &mut StdRng) -> Result<KeyPair, Box<dyn Error>> {
        let p = self.prime.parse::<BigUint>()?;
        let (q_min, q_max) = (self.q_min.parse::<BigUint>()?, self.q_max.parse::<BigUint>()?);
        Ok(self.generate_keypair(&p, (&q_min, &q_max), rng)?)
    }

    pub fn encode(&self) -> Result<Vec<BigUint>, Box<dyn Error>> {
        let key = self.key.parse::<PublicKey>()?;
        Ok(RSA::encrypt(&self.text, &key)?)
    }

    pub fn decode(&self) -> Result<String, Box<dyn Error>> {
        let key = self.key.parse::<PrivateKey>()?;
        let ciphertext = RSA::parse_ciphertext(&self.input)?;
        Ok(RSA::decrypt(&ciphertext, &key)?)
    }

    pub fn run(&mut self) -> Result<(), Box<dyn Error>> {
        match self.run_mode()? {
            RunMode::Demo => {
                let mut rng = self.rng();
                let keys = self.generate(&mut rng)?;
                println!("\nPublic Key: {}", keys.public());
                println!("Private Key: {}", keys.private());
                println!("\nOriginal Message: {}", self.text);
                let (mut narrator, mut quiet) = (Narrator, Quiet);
                let observer: &mut dyn Observer = match self.silent {
                    true => &mut quiet,
                    false => &mut narrator,
                };
                if !self.silent { println!("\nEncryption process:"); }
                let encrypted = RSA::encrypt_observed(&self.text, keys.public(), observer)?;
                println!("\nEncrypted Message: {}", RSA::format_ciphertext(&encrypted));
                if !self.silent { println!("\nDecryption process:"); }
                let decrypted = RSA::decrypt_observed(&encrypted, keys.private(), observer)?;
                println!("\nDecrypted Message: {}", decrypted);
            }
            RunMode::Generate => {
                let mut rng = self.rng();
                let keys = self.generate(&mut rng)?;
                println!("Public Key: {}", keys.public());
                println!("Private Key: {}", keys.private());
            }
            RunMode::Encode => println!("{}", RSA::format_ciphertext(&self.encode()?)),
            RunMode::Decode => println!("{}", self.decode()?),
        }
        Ok(())
    }
}
