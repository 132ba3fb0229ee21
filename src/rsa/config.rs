use lazy_static::lazy_static;
use mut_static::MutStatic;
use crate::RSA;

lazy_static! {
    pub static ref CONFIG_DEF: RSA = RSA {
        mode: String::from("demo"),
        prime: String::from("1000000007"),
        // the classroom q, 2232232273, lies in this range
        q_min: String::from("2000000000"),
        q_max: String::from("3000000000"),
        text: String::from("HELLO WELCOME TO MIIT.EDU.MM"),
        key: String::new(),
        input: String::new(),
        primality: String::from("trial"),
        rounds: 10,
        enumerate_max: 1_000_000,
        tries_max: 10_000_000,
        time_max: 10_000,
        retry: 1000,
        seed: None,
        silent: false,
        threads: num_cpus::get(),
    };
    pub static ref SILENT: MutStatic<bool> =
        MutStatic::new();
}

/// Unset counts as silent, so library calls stay quiet until `main` decides.
pub fn silent() -> bool {
    SILENT.read().map(|s| *s).unwrap_or(true)
}
