use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use crate::rsa::keys::{PrivateKey, PublicKey};
use crate::RSA;

pub enum CipherError {
    /// Plaintext code point not below the modulus; it could never decrypt back.
    CodePointTooLarge { ch: char, modulus: BigUint },
    CiphertextOutOfRange { value: BigUint, modulus: BigUint },
    InvalidCodePoint(BigUint),
}

impl CipherError {
    fn display(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CipherError::CodePointTooLarge { ch, modulus } =>
                write!(f, "Code point {} of {:?} is not below n = {}", *ch as u32, ch, modulus),
            CipherError::CiphertextOutOfRange { value, modulus } =>
                write!(f, "Cipher value {} is not below n = {}", value, modulus),
            CipherError::InvalidCodePoint(m) => write!(f, "Decrypted value {} is not a character", m),
        }
    }
}

impl Display for CipherError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}

impl Debug for CipherError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}

impl Error for CipherError {}

/// Hook for watching the per-character steps of encode / decode.
pub trait Observer {
    fn encrypted(&mut self, _ch: char, _m: &BigUint, _c: &BigUint, _key: &PublicKey) {}
    fn decrypted(&mut self, _c: &BigUint, _m: &BigUint, _ch: char, _key: &PrivateKey) {}
}

pub struct Quiet;

impl Observer for Quiet {}

/// Prints every step the way the classroom walkthrough reads.
pub struct Narrator;

impl Observer for Narrator {
    fn encrypted(&mut self, ch: char, m: &BigUint, c: &BigUint, key: &PublicKey) {
        println!("char '{}' -> code {} -> (m^e mod n) = {}^{} mod {} = {}", ch, m, m, key.e, key.n, c);
    }

    fn decrypted(&mut self, c: &BigUint, m: &BigUint, ch: char, key: &PrivateKey) {
        println!("cipher {} -> (c^d mod n) = {}^{} mod {} = {} -> char '{}'", c, c, key.d, key.n, m, ch);
    }
}

impl RSA {
    pub fn fast_modular_exponent(mut a: BigUint, mut q: BigUint, n: &BigUint) -> BigUint {
        let mut r: BigUint = BigUint::one() % n;
        a %= n;
        while !q.is_zero() {
            if q.bit(0) { r = (r * &a) % n; }
            q >>= 1;
            a = (&a * &a) % n;
        }
        r
    }

    pub fn encrypt(message: &str, key: &PublicKey) -> Result<Vec<BigUint>, CipherError> {
        RSA::encrypt_observed(message, key, &mut Quiet)
    }

    pub fn decrypt(ciphertext: &[BigUint], key: &PrivateKey) -> Result<String, CipherError> {
        RSA::decrypt_observed(ciphertext, key, &mut Quiet)
    }

    pub fn encrypt_observed(message: &str, key: &PublicKey, observer: &mut dyn Observer) -> Result<Vec<BigUint>, CipherError> {
        message.chars().map(|ch| {
            let m = BigUint::from(ch as u32);
            if m >= key.n {
                return Err(CipherError::CodePointTooLarge { ch, modulus: key.n.clone() });
            }
            let c = RSA::fast_modular_exponent(m.clone(), key.e.clone(), &key.n);
            observer.encrypted(ch, &m, &c, key);
            Ok(c)
        }).collect()
    }

    pub fn decrypt_observed(ciphertext: &[BigUint], key: &PrivateKey, observer: &mut dyn Observer) -> Result<String, CipherError> {
        ciphertext.iter().map(|c| {
            if *c >= key.n {
                return Err(CipherError::CiphertextOutOfRange { value: c.clone(), modulus: key.n.clone() });
            }
            let m = RSA::fast_modular_exponent(c.clone(), key.d.clone(), &key.n);
            let ch = m.to_u32().and_then(char::from_u32)
                .ok_or_else(|| CipherError::InvalidCodePoint(m.clone()))?;
            observer.decrypted(c, &m, ch, key);
            Ok(ch)
        }).collect()
    }
}
