//! Generator and inspector for large synthetic "garbage" payload fixtures.
//!
//! A payload is every character of an [`Alphabet`] repeated the same number of
//! times, either as contiguous runs in alphabet order or randomly shuffled. It is
//! written either as a raw blob (with a companion `testpath.blob`) or wrapped in a
//! minimal HTML page.

pub mod alphabet;
pub mod config;
pub mod error;
pub mod inspect;
pub mod output;
pub mod payload;

pub use alphabet::Alphabet;
pub use config::{parse_size, GeneratorConfig, Layout, Order, Variant};
pub use error::{GarbageError, Result};
pub use inspect::{Expectation, Summary};
pub use output::Report;
pub use payload::Payload;

/// Initialises `env_logger` for a binary.
///
/// `RUST_LOG` takes precedence; otherwise the level is `warn`, raised by each
/// `verbose` step and lowered to `error` when `quiet`.
pub fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    // Ignore a second initialisation attempt.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

/// Builds the payload for `config` and writes its fixture files.
pub fn generate(config: &GeneratorConfig) -> Result<Report> {
    log::info!(
        "generating {} fixture: {} bytes over {} characters",
        config.variant,
        config.size,
        config.alphabet.len()
    );
    let payload = payload::build(config)?;
    output::write_fixtures(config, &payload)
}
