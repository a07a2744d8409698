//! Kernel command-line options consumed by the scheduling core.
//!
//! The outer kernel owns the command line; it parses whatever it cares
//! about and passes the whole string here so the core can pick up the
//! flags that belong to it. Unknown tokens are ignored.

use crate::logger::LogLevel;

/// Boot-time configuration of the scheduling core.
#[derive(Clone, Copy, Debug, Default)]
pub struct KernelOptions {
    /// `-mlfqs`: use the multi-level feedback queue scheduler instead of
    /// strict priority scheduling with donation.
    pub mlfqs: bool,
    /// `-rs=SEED`: seed for the kernel PRNG.
    pub rng_seed: Option<u64>,
    /// `loglevel=LEVEL`: maximum level emitted by the kernel logger.
    pub log_level: Option<LogLevel>,
}

impl KernelOptions {
    /// Parse the scheduler-relevant flags out of a kernel command line.
    pub fn parse(cmdline: &str) -> Self {
        let mut opts = KernelOptions::default();

        for token in cmdline.split_whitespace() {
            if token == "-mlfqs" {
                opts.mlfqs = true;
                continue;
            }

            let Some((key, value)) = token.split_once('=') else {
                continue;
            };

            if key == "-rs" {
                match value.parse::<u64>() {
                    Ok(seed) => opts.rng_seed = Some(seed),
                    Err(_) => crate::kwarn!("ignoring malformed -rs value {:?}", value),
                }
            } else if key.eq_ignore_ascii_case("log") || key.eq_ignore_ascii_case("loglevel") {
                match LogLevel::from_str(value) {
                    Some(level) => opts.log_level = Some(level),
                    None => crate::kwarn!("ignoring unknown log level {:?}", value),
                }
            }
        }

        opts
    }
}
