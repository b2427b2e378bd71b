//! Configuration, logging and pipeline commands for the `defaulter` binary.

pub mod commands;
pub mod config;

use log::LevelFilter;

pub use commands::CommandError;
pub use config::{Config, ConfigError};

/// Map `-v` occurrences to a log level.
pub fn verbosity_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the global logger. `RUST_LOG`, when set, takes precedence.
pub fn init_logging(verbose: u8) {
    let _ = env_logger::Builder::new()
        .filter_level(verbosity_level(verbose))
        .parse_default_env()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_v_raises_the_level() {
        assert_eq!(verbosity_level(0), LevelFilter::Warn);
        assert_eq!(verbosity_level(1), LevelFilter::Info);
        assert_eq!(verbosity_level(2), LevelFilter::Debug);
        assert_eq!(verbosity_level(5), LevelFilter::Trace);
    }
}
