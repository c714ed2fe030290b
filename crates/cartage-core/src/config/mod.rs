//! Cartage configuration
//!
//! Configuration is read from a TOML file (see [`paths::DEFAULT_CONFIG_FILES`])
//! and may be overridden from the command line. Plug-ins and commands each
//! get their own table:
//! - `[plugins.<name>]`: plug-in settings, plus `disabled = true` to turn the
//!   plug-in off for the run
//! - `[commands.<name>]`: free-form command settings

pub mod parser;
pub mod paths;
pub mod schema;

pub use parser::{load, parse_cartage_toml, parse_cartage_toml_str, to_toml};
pub use paths::{DEFAULT_CONFIG_FILES, find_config_file};
pub use schema::{CartageConfig, PluginConfig};
