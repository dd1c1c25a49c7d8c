//! # Paramtree
//!
//! **Hierarchical parameter store for simulation input files**
//!
//! - **Scoped lookups**: dotted keys route through namespaces and fall back
//!   to enclosing scopes
//! - **Plain-text input**: `key = value` lines, `set var`, `include` and
//!   `unset` directives
//! - **Typed reads**: integers, booleans, lists and physical quantities with
//!   units
//! - **Collective builds**: one rank reads the files, every other rank
//!   receives the flattened tree
//!
//! ## Quick Start
//!
//! ```
//! use paramtree::prelude::*;
//!
//! let tree: ParamTree = "
//! set var LAT = 100ns
//! node.nic.latency = $LAT
//! node.nic.bandwidth = 10GB/s
//! node.cores = 8
//! "
//! .parse()
//! .unwrap();
//!
//! let node = tree.root().namespace("node").unwrap();
//! assert_eq!(node.get_int("cores").unwrap(), 8);
//!
//! let nic = node.namespace("nic").unwrap();
//! assert!((nic.get_time("latency").unwrap() - 100e-9).abs() < 1e-18);
//! assert!((nic.get_bandwidth("bandwidth").unwrap() - 10e9).abs() < 1.0);
//! ```
//!
//! ## Crates
//!
//! | Crate | Purpose |
//! |-------|---------|
//! | [`core`] | Tree, parser, loader, typed accessors |
//! | [`bcast`] | Broadcast transport and collective build |
//! | [`config`] | TOML/JSON/env configuration |
//! | [`telemetry`] | Logging and Prometheus metrics setup |

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export the parameter tree
pub use paramtree_core as core;

// Re-export the collective build
pub use paramtree_bcast as bcast;

// Re-export configuration
pub use paramtree_config as config;

// Re-export telemetry setup
pub use paramtree_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use paramtree::prelude::*;
///
/// let mut tree = ParamTree::new();
/// tree.root_mut().add("a.b", "1").unwrap();
/// assert_eq!(tree.root().get("a.b").unwrap(), "1");
/// ```
pub mod prelude {
    pub use paramtree_core::{
        AcceptAll, KeywordRegistry, KeywordValidator, LoadOptions, ParamError, ParamResult, ParamSlot, ParamTree,
        Quantity, QuantityKind, Scope, ScopeId, ScopeMut,
    };

    // Re-export the collective build
    pub use paramtree_bcast::{
        parallel_build_params, BroadcastError, BroadcastResult, Broadcaster, LocalBroadcaster, LocalGroup,
        ParallelBuild, SoloBroadcaster,
    };

    // Re-export configuration
    pub use paramtree_config::{ConfigError, ConfigLoader, ParamtreeConfig};

    // Re-export telemetry setup
    pub use paramtree_telemetry::{init_telemetry, TelemetryConfig};
}
