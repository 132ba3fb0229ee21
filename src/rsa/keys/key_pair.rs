use num::Integer;
use num_bigint::{BigInt, BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::Rng;
use crate::rsa::config::silent;
use crate::rsa::keys::*;
use crate::RSA;

/// A public key and the private key derived with it. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    public: PublicKey,
    private: PrivateKey,
}

impl KeyPair {
    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    pub fn private(&self) -> &PrivateKey {
        &self.private
    }

    /// Builds the keypair for explicit `p`, `q` and `e`. Both primes are
    /// checked by trial division, so keep them to a size that stays cheap.
    pub fn derive(p: &BigUint, q: &BigUint, e: &BigUint) -> Result<KeyPair, KeyError> {
        for x in [p, q] {
            if !RSA::is_prime(x) { return Err(KeyError::NotPrime(x.clone())); }
        }
        KeyPair::assemble(p, q, e)
    }

    /// `derive` minus the primality checks, for primes already vetted by the
    /// configured test.
    fn assemble(p: &BigUint, q: &BigUint, e: &BigUint) -> Result<KeyPair, KeyError> {
        for x in [p, q] {
            if *x < BigUint::from(2u32) { return Err(KeyError::NotPrime(x.clone())); }
        }
        if p == q { return Err(KeyError::EqualPrimes(p.clone())); }
        let n = p * q;
        let phi = RSA::euler(p, q);
        if *e <= BigUint::one() || *e >= phi {
            return Err(KeyError::InvalidExponent { e: e.clone(), phi });
        }
        let d = RSA::mod_inverse(e, &phi)?;
        RSA::check_key_set(&d, e, &phi)?;
        Ok(KeyPair {
            public: PublicKey { e: e.clone(), n: n.clone() },
            private: PrivateKey { d, n },
        })
    }
}

impl RSA {
    pub fn euler(p: &BigUint, q: &BigUint) -> BigUint { (p - 1u32) * (q - 1u32) }

    /// Returns `(g, x, y)` with `a * x + b * y = g = gcd(a, b)`.
    pub fn extended_euclid(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
        if a.is_zero() {
            return (b.clone(), BigInt::zero(), BigInt::one());
        }
        let (g, y, x) = RSA::extended_euclid(&(b % a), a);
        let x = x - (b / a) * &y;
        (g, x, y)
    }

    pub fn mod_inverse(e: &BigUint, phi: &BigUint) -> Result<BigUint, KeyError> {
        let no_inverse = || KeyError::NoInverse { e: e.clone(), modulus: phi.clone() };
        if phi.is_zero() { return Err(no_inverse()); }
        let m = BigInt::from(phi.clone());
        let (g, x, _) = RSA::extended_euclid(&BigInt::from(e.clone()), &m);
        if !g.is_one() { return Err(no_inverse()); }
        x.mod_floor(&m).to_biguint().ok_or_else(no_inverse)
    }

    pub fn check_key_set(d: &BigUint, e: &BigUint, f: &BigUint) -> Result<(), KeyError> {
        let res = (d * e) % f;
        if !silent() {
            println!("(d * e) % f = {} % {} = {}", d * e, f, res);
        }
        match res.is_one() {
            true => Ok(()),
            false => Err(KeyError::Inconsistent { d: d.clone(), e: e.clone(), phi: f.clone() }),
        }
    }

    /// Keypair for the fixed prime `p` and a prime `q` drawn from `q_range`.
    pub fn generate_keypair<R: Rng + ?Sized>(&self, p: &BigUint, q_range: (&BigUint, &BigUint), rng: &mut R) -> Result<KeyPair, KeyError> {
        let primality = self.primality_test()?;
        if !primality.test(p, rng) { return Err(KeyError::NotPrime(p.clone())); }
        let (q_low, q_high) = q_range;
        let mut q = None;
        for _ in 0..self.retry {
            let candidate = self.sample_prime(q_low, q_high, rng)?;
            if candidate != *p {
                q = Some(candidate);
                break;
            }
        }
        let q = q.ok_or(KeyError::RetryExhausted { what: "q != p", tries: self.retry })?;
        if !silent() { println!("Chosen primes:\np = {}, q = {}", p, q); }

        let n = p * &q;
        let phi = RSA::euler(p, &q);
        if !silent() {
            println!("n = p * q = {}", n);
            println!("phi(n) = (p-1)*(q-1) = {}", phi);
        }
        let two = BigUint::from(2u32);
        if phi <= two { return Err(KeyError::TotientTooSmall(phi)); }

        let mut e = None;
        for _ in 0..self.retry {
            let candidate = rng.gen_biguint_range(&two, &phi);
            if candidate.gcd(&phi).is_one() {
                e = Some(candidate);
                break;
            }
        }
        let e = e.ok_or(KeyError::RetryExhausted { what: "e coprime to phi(n)", tries: self.retry })?;
        if !silent() { println!("Chosen e = {} (1 < e < phi and gcd(e, phi)=1)", e); }

        let keys = KeyPair::assemble(p, &q, &e)?;
        if !silent() { println!("Computed d = {} (mod inverse of e mod phi)", keys.private.d); }
        Ok(keys)
    }
}
