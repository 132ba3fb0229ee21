pub mod key_pair;

pub use key_pair::*;

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use num_bigint::BigUint;
use crate::rsa::prime_gen::PrimeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    pub e: BigUint,
    pub n: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKey {
    pub d: BigUint,
    pub n: BigUint,
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.e, self.n)
    }
}

impl Display for PrivateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.d, self.n)
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (e, n) = parse_pair(s)?;
        Ok(Self { e, n })
    }
}

impl FromStr for PrivateKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (d, n) = parse_pair(s)?;
        Ok(Self { d, n })
    }
}

/// Accepts `(x, n)` as printed by `Display`, or the bare `x, n`.
fn parse_pair(s: &str) -> Result<(BigUint, BigUint), KeyError> {
    let s = s.trim();
    let s = s.strip_prefix('(').and_then(|s| s.strip_suffix(')')).unwrap_or(s);
    let parts = s.split(',').map(|x| x.trim()).collect::<Vec<_>>();
    match parts.as_slice() {
        [x, n] => {
            let x = x.parse::<BigUint>().map_err(|e| KeyError::Parse(format!("`{}': {}", x, e)))?;
            let n = n.parse::<BigUint>().map_err(|e| KeyError::Parse(format!("`{}': {}", n, e)))?;
            Ok((x, n))
        }
        _ => Err(KeyError::Parse(format!("expected `(x, n)', got `{}'", s))),
    }
}

pub enum KeyError {
    Prime(PrimeError),
    NotPrime(BigUint),
    EqualPrimes(BigUint),
    TotientTooSmall(BigUint),
    InvalidExponent { e: BigUint, phi: BigUint },
    NoInverse { e: BigUint, modulus: BigUint },
    RetryExhausted { what: &'static str, tries: u32 },
    Inconsistent { d: BigUint, e: BigUint, phi: BigUint },
    Parse(String),
}

impl KeyError {
    fn display(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyError::Prime(e) => write!(f, "Prime sampling failed: {}", e),
            KeyError::NotPrime(p) => write!(f, "{} is not a prime", p),
            KeyError::EqualPrimes(p) => write!(f, "p and q must differ, both are {}", p),
            KeyError::TotientTooSmall(phi) => write!(f, "phi(n) = {} leaves no exponent in [2, phi)", phi),
            KeyError::InvalidExponent { e, phi } => write!(f, "Exponent {} is outside (1, {})", e, phi),
            KeyError::NoInverse { e, modulus } => write!(f, "Modular inverse of {} mod {} does not exist", e, modulus),
            KeyError::RetryExhausted { what, tries } => write!(f, "Gave up choosing {} after {} tries", what, tries),
            KeyError::Inconsistent { d, e, phi } => write!(f, "(d * e) % phi != 1 for d = {}, e = {}, phi = {}", d, e, phi),
            KeyError::Parse(msg) => write!(f, "Cannot parse key: {}", msg),
        }
    }
}

impl Display for KeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}

impl Debug for KeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}

impl Error for KeyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            KeyError::Prime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PrimeError> for KeyError {
    fn from(e: PrimeError) -> Self {
        KeyError::Prime(e)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use num_bigint::BigUint;
    use crate::rsa::keys::{KeyError, PrivateKey, PublicKey};

    #[test]
    fn parse_keys() -> Result<(), Box<dyn Error>> {
        let public: PublicKey = "(17, 3233)".parse()?;
        assert_eq!(public, PublicKey { e: BigUint::from(17u32), n: BigUint::from(3233u32) });
        let private: PrivateKey = " 2753,3233 ".parse()?;
        assert_eq!(private, PrivateKey { d: BigUint::from(2753u32), n: BigUint::from(3233u32) });
        assert_eq!(public.to_string().parse::<PublicKey>()?, public);
        Ok(())
    }

    #[test]
    fn parse_bad_keys() {
        for text in ["", "17", "(17, 3233, 1)", "(a, 3233)", "(-17, 3233)"] {
            assert!(matches!(text.parse::<PublicKey>(), Err(KeyError::Parse(_))), "accepted `{}'", text);
        }
    }
}
