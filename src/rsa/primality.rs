use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, ToPrimitive, Zero};
use rand::Rng;
use crate::RSA;

/// How candidates are judged prime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primality {
    /// Exact 6k±1 trial division.
    TrialDivision,
    /// Miller-Rabin with the given number of random witnesses.
    MillerRabin(u32),
}

impl Primality {
    pub fn test<R: Rng + ?Sized>(&self, n: &BigUint, rng: &mut R) -> bool {
        match self {
            Primality::TrialDivision => RSA::is_prime(n),
            Primality::MillerRabin(rounds) => RSA::miller_rabin(n, *rounds, rng),
        }
    }
}

fn is_prime_u64(n: u64) -> bool {
    if n < 2 { return false; }
    if n == 2 || n == 3 { return true; }
    if n % 2 == 0 || n % 3 == 0 { return false; }
    let n = n as u128;
    let mut i: u128 = 5;
    while i * i <= n {
        if n % i == 0 || n % (i + 2) == 0 { return false; }
        i += 6;
    }
    true
}

impl RSA {
    pub fn is_prime(n: &BigUint) -> bool {
        if let Some(small) = n.to_u64() {
            return is_prime_u64(small);
        }
        // past u64 there is nothing below 4 left to special-case
        let (two, three) = (BigUint::from(2u32), BigUint::from(3u32));
        if (n % &two).is_zero() || (n % &three).is_zero() { return false; }
        let mut i = BigUint::from(5u32);
        while &i * &i <= *n {
            if (n % &i).is_zero() || (n % (&i + &two)).is_zero() { return false; }
            i += 6u32;
        }
        true
    }

    pub fn miller_rabin<R: Rng + ?Sized>(n: &BigUint, rounds: u32, rng: &mut R) -> bool {
        let two = BigUint::from(2u32);
        if *n < BigUint::from(4u32) { return *n >= two; }
        if !n.bit(0) { return false; }
        let n1: BigUint = n - 1u32;
        let s = n1.trailing_zeros().unwrap_or(0);
        let d = &n1 >> s;
        'witness: for _ in 0..rounds {
            let a = rng.gen_biguint_range(&two, &n1);
            let mut m = RSA::fast_modular_exponent(a, d.clone(), n);
            if m.is_one() || m == n1 { continue; }
            for _ in 1..s {
                m = (&m * &m) % n;
                if m == n1 { continue 'witness; }
            }
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use num_bigint::BigUint;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use crate::RSA;
    use crate::rsa::primality::Primality;

    fn sieve(limit: usize) -> Vec<bool> {
        let mut flags = vec![true; limit + 1];
        flags[0] = false;
        flags[1] = false;
        let mut i = 2;
        while i * i <= limit {
            if flags[i] {
                let mut j = i * i;
                while j <= limit {
                    flags[j] = false;
                    j += i;
                }
            }
            i += 1;
        }
        flags
    }

    #[test]
    fn trial_division_matches_sieve() {
        let limit = 1_000_000;
        let flags = sieve(limit);
        for (n, expected) in flags.iter().enumerate() {
            assert_eq!(RSA::is_prime(&BigUint::from(n)), *expected, "n = {}", n);
        }
    }

    #[test]
    fn small_edge_cases() {
        for n in [0u32, 1, 4, 6, 9, 25, 49, 121] {
            assert!(!RSA::is_prime(&BigUint::from(n)), "{} is not prime", n);
        }
        for n in [2u32, 3, 5, 7, 61, 53, 1_000_000_007] {
            assert!(RSA::is_prime(&BigUint::from(n)), "{} is prime", n);
        }
    }

    #[test]
    fn past_u64_range() -> Result<(), Box<dyn Error>> {
        // 2^64 + 13 is prime, 2^64 + 1 = 274177 * 67280421310721
        let prime: BigUint = "18446744073709551629".parse()?;
        let composite: BigUint = "18446744073709551617".parse()?;
        assert!(!RSA::is_prime(&composite));
        let mut rng = StdRng::seed_from_u64(7);
        assert!(RSA::miller_rabin(&prime, 20, &mut rng));
        assert!(!RSA::miller_rabin(&composite, 20, &mut rng));
        Ok(())
    }

    #[test]
    fn test_miller_rabin() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let flags = sieve(20_000);
        for (n, expected) in flags.iter().enumerate() {
            let got = RSA::miller_rabin(&BigUint::from(n), 16, &mut rng);
            assert_eq!(got, *expected, "n = {}", n);
        }
    }

    #[test]
    fn primality_dispatch() {
        let mut rng = StdRng::seed_from_u64(1);
        let n = BigUint::from(2_232_232_273u64);
        assert!(Primality::TrialDivision.test(&n, &mut rng));
        assert!(Primality::MillerRabin(10).test(&n, &mut rng));
        let carmichael = BigUint::from(561u32);
        assert!(!Primality::TrialDivision.test(&carmichael, &mut rng));
        assert!(!Primality::MillerRabin(10).test(&carmichael, &mut rng));
    }
}
