//! # Paramtree Core
//!
//! Hierarchical, namespaced parameter store for simulation configuration.
//!
//! Parameters live in a tree of scopes. Each scope holds raw text entries,
//! child scopes and `set var` variables; dotted keys (`node.nic.bandwidth`)
//! address nested scopes, and lookups that miss in a scope fall back to its
//! ancestors. Values stay text until read, when they are parsed as integers,
//! booleans, lists or unit-bearing quantities (`10ns`, `40Gbps`, `2.1GHz`,
//! `16KiB`).
//!
//! ## Modules
//!
//! - [`tree`] - the scope arena and its read/write views
//! - [`parser`] - classification of single input lines
//! - [`loader`] - file, stream and include handling
//! - [`accessors`] - typed getters
//! - [`print`] - flat and pretty text rendering
//! - [`slot`] - single-entry assignment handle
//! - [`units`] - unit grammars
//! - [`keywords`] - keyword and namespace validation
//!
//! ## Example
//!
//! ```
//! use paramtree_core::{LoadOptions, ParamTree};
//!
//! let mut tree = ParamTree::new();
//! tree.root_mut()
//!     .parse_str(
//!         "set var LINK = 100ns\n\
//!          switch.latency = $LINK\n\
//!          switch.ports = 0 1 2 3\n",
//!         LoadOptions::default(),
//!     )
//!     .unwrap();
//!
//! let switch = tree.root().namespace("switch").unwrap();
//! assert_eq!(switch.get_int_vector("ports").unwrap(), vec![0, 1, 2, 3]);
//! assert!((switch.get_time("latency").unwrap() - 100e-9).abs() < 1e-18);
//!
//! // Missing optional namespaces yield the shared empty scope.
//! let nic = tree.root().optional_namespace("nic").unwrap();
//! assert!(nic.is_sentinel());
//! ```

#![warn(missing_docs)]

pub mod accessors;
pub mod counters;
pub mod error;
pub mod keywords;
pub mod loader;
pub mod parser;
pub mod print;
pub mod slot;
pub mod tree;
pub mod units;

pub use error::{ParamError, ParamResult};
pub use keywords::{AcceptAll, KeywordRegistry, KeywordValidator};
pub use loader::{LoadOptions, MAX_INCLUDE_DEPTH};
pub use parser::{parse_line, Directive};
pub use print::Flatten;
pub use slot::ParamSlot;
pub use tree::{ParamTree, Scope, ScopeId, ScopeMut};
pub use units::{Quantity, QuantityKind};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports() {
        let tree: ParamTree = "a.b = 1".parse().unwrap();
        let scope: Scope<'_> = tree.root();
        let _: ParamResult<&str> = scope.get("a.b");
        let _ = LoadOptions::default();
        let _ = QuantityKind::Time;
    }
}
