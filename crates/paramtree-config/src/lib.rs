//! # Paramtree Config
//!
//! Typed configuration for hosts that load parameter trees.
//!
//! A single TOML or JSON file selects how parameter files are loaded, which
//! rank roots a collective build, and how logging and metrics are set up.
//! Environment variables of the form `PARAMTREE__SECTION__KEY` override the
//! file.
//!
//! ```toml
//! [loader]
//! fail_on_existing = false
//! cwd_fallback = true
//!
//! [broadcast]
//! root = 0
//!
//! [telemetry.logging]
//! enabled = true
//! level = "info"
//! format = "pretty"
//!
//! [telemetry.metrics]
//! enabled = false
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use paramtree_config::{ConfigLoader, DEFAULT_ENV_PREFIX};
//! use paramtree_core::ParamTree;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()
//!     .with_optional_file("paramtree.toml")?
//!     .with_env_prefix(DEFAULT_ENV_PREFIX)
//!     .load()?;
//!
//! paramtree_telemetry::init_telemetry(&config.telemetry_config())?;
//!
//! let mut tree = ParamTree::new();
//! tree.root_mut().parse_file("machine.params", config.load_options())?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::*;
pub use loader::*;
pub use schema::*;
