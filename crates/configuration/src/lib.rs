//! # Papertrade Configuration Crate
//!
//! Strongly-typed settings for the simulation core, plus the strategy
//! catalog. Components never load configuration themselves; they are GIVEN
//! their parameter structs, which keeps every engine trivially testable.

use crate::error::ConfigError;
use crate::settings::Config;

// Declare the modules that make up this crate.
pub mod catalog;
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use catalog::{StrategyCatalog, StrategyConfig, StrategyProvider};
pub use settings::{Backtest, Config as Settings, Decision, Simulation};

/// Loads the application configuration from the `config.toml` file.
///
/// This function is the primary entry point for this crate. It reads the
/// configuration file, deserializes it into our strongly-typed `Config`
/// struct, and returns it.
pub fn load_config() -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        // Tells the builder to look for a file named `config.toml`
        .add_source(config::File::with_name("config.toml"))
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;

    Ok(config)
}
