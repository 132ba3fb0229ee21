use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use chrono::Local;
use crossbeam_channel::bounded;
use indicatif::{ProgressBar, ProgressStyle};
use num_bigint::{BigUint, RandBigInt};
use num_traits::ToPrimitive;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use crate::rsa::config::silent;
use crate::rsa::primality::Primality;
use crate::RSA;

pub enum PrimeError {
    EmptyRange { start: BigUint, end: BigUint },
    RetryExhausted(u64),
    Timeout(i64),
    UnknownPrimality(String),
    ZeroRounds,
    WorkerLost,
}

impl PrimeError {
    fn display(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimeError::EmptyRange { start, end } => write!(f, "No primes in range [{}, {})", start, end),
            PrimeError::RetryExhausted(tries) => write!(f, "No prime found after {} tries", tries),
            PrimeError::Timeout(time) => write!(f, "Generation timeout after {} ms", time),
            PrimeError::UnknownPrimality(name) =>
                write!(f, "Unknown primality test `{}'! available: trial(default), miller-rabin", name),
            PrimeError::ZeroRounds => write!(f, "Miller Rabin needs at least one round"),
            PrimeError::WorkerLost => write!(f, "Prime generation worker exited without a result"),
        }
    }
}

impl Display for PrimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}

impl Debug for PrimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}

impl Error for PrimeError {}

const PROGRESS_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})";

impl RSA {
    pub fn primality_test(&self) -> Result<Primality, PrimeError> {
        match self.primality.as_str() {
            "trial" => Ok(Primality::TrialDivision),
            // without a witness every odd number passes
            "miller-rabin" if self.rounds == 0 => Err(PrimeError::ZeroRounds),
            "miller-rabin" => Ok(Primality::MillerRabin(self.rounds)),
            other => Err(PrimeError::UnknownPrimality(other.to_string())),
        }
    }

    /// Draws a prime uniformly from `[start, end)`.
    ///
    /// Ranges no wider than `enumerate_max` are enumerated in full, so an
    /// empty range is reported exactly. Wider ranges are probed with random
    /// candidates on `threads` workers, bounded by `tries_max` and `time_max`.
    pub fn sample_prime<R: Rng + ?Sized>(&self, start: &BigUint, end: &BigUint, rng: &mut R) -> Result<BigUint, PrimeError> {
        if start >= end {
            return Err(PrimeError::EmptyRange { start: start.clone(), end: end.clone() });
        }
        let primality = self.primality_test()?;
        if end - start <= BigUint::from(self.enumerate_max) {
            RSA::enumerate_prime(start, end, primality, rng)
        } else {
            self.probe_prime(start, end, primality, rng)
        }
    }

    fn enumerate_prime<R: Rng + ?Sized>(start: &BigUint, end: &BigUint, primality: Primality, rng: &mut R) -> Result<BigUint, PrimeError> {
        let pb = match silent() {
            true => None,
            false => Some(ProgressBar::new((end - start).to_u64().unwrap_or(u64::MAX))),
        };
        if let Some(pb) = &pb {
            if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_TEMPLATE) {
                pb.set_style(style.progress_chars("#>-"));
            }
        }
        let mut primes = Vec::new();
        let mut n = start.clone();
        while &n < end {
            if primality.test(&n, rng) { primes.push(n.clone()); }
            n += 1u32;
            if let Some(pb) = &pb { pb.inc(1); }
        }
        if let Some(pb) = &pb { pb.finish_and_clear(); }
        if !silent() { println!("Found {} primes in [{}, {})", primes.len(), start, end); }
        primes.choose(rng).cloned()
            .ok_or_else(|| PrimeError::EmptyRange { start: start.clone(), end: end.clone() })
    }

    fn probe_prime<R: Rng + ?Sized>(&self, start: &BigUint, end: &BigUint, primality: Primality, rng: &mut R) -> Result<BigUint, PrimeError> {
        let t = self.threads.max(1);
        let share = self.tries_max.saturating_add(t as u64 - 1) / t as u64;
        let stop = Arc::new(AtomicBool::new(false));
        let (tx, rx) = bounded(t);
        let handles = (0..t).map(|_i| {
            let tx = tx.clone();
            let stop = stop.clone();
            let (low, high) = (start.clone(), end.clone());
            let seed: u64 = rng.gen();
            let time_max = self.time_max;
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(seed);
                let res = RSA::probe_one_prime(&low, &high, primality, share, time_max, &stop, &mut rng);
                // the receiver only hangs up once every worker has been joined
                let _ = tx.send(res);
            })
        }).collect::<Vec<_>>();
        drop(tx);
        let mut found = None;
        let mut failure = None;
        for res in rx.iter() {
            match res {
                Ok(Some(prime)) => if found.is_none() {
                    stop.store(true, Ordering::Relaxed);
                    found = Some(prime);
                },
                Ok(None) => {}
                Err(e) => if failure.is_none() { failure = Some(e); },
            }
        }
        for handle in handles {
            if handle.join().is_err() && failure.is_none() { failure = Some(PrimeError::WorkerLost); }
        }
        match (found, failure) {
            (Some(prime), _) => Ok(prime),
            (None, Some(e)) => Err(e),
            (None, None) => Err(PrimeError::WorkerLost),
        }
    }

    /// One worker's share of the probing. `Ok(None)` means another worker won.
    fn probe_one_prime<R: Rng + ?Sized>(low: &BigUint, high: &BigUint, primality: Primality, tries_max: u64, time_max: i64,
                                        stop: &AtomicBool, rng: &mut R) -> Result<Option<BigUint>, PrimeError> {
        let epoch: u64 = 0xf;
        let start = Local::now().timestamp_millis();
        let mut try_times: u64 = 0;
        while try_times < tries_max {
            if stop.load(Ordering::Relaxed) { return Ok(None); }
            for _ in 0..epoch.min(tries_max - try_times) {
                try_times += 1;
                let test = rng.gen_biguint_range(low, high);
                if primality.test(&test, rng) {
                    if !silent() {
                        let time = Local::now().timestamp_millis() - start;
                        println!("Done generation in {} tries after {} ms", try_times, time);
                    }
                    return Ok(Some(test));
                }
            }
            let time = Local::now().timestamp_millis() - start;
            if time > time_max {
                if !silent() { println!("Failed generation in {} tries after {} ms", try_times, time); }
                return Err(PrimeError::Timeout(time));
            }
        }
        Err(PrimeError::RetryExhausted(try_times))
    }
}
