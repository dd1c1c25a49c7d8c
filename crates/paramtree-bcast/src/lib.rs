//! # Paramtree Bcast
//!
//! Collective construction of parameter trees.
//!
//! In a multi-rank simulation every rank needs the same parameters, but
//! only one of them should read the input files. [`parallel_build_params`]
//! has the root load the file (with all of its includes), flatten the tree
//! and broadcast the text; every other rank parses what it receives.
//!
//! The transport is abstract ([`Broadcaster`]). [`LocalGroup`] provides an
//! in-process implementation for threads.
//!
//! ## Example
//!
//! ```
//! use std::{fs, thread};
//! use paramtree_bcast::{parallel_build_params, LocalGroup};
//! use paramtree_core::ParamTree;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("machine.params");
//! fs::write(&path, "node.cores = 8\n").unwrap();
//!
//! let trees: Vec<ParamTree> = thread::scope(|s| {
//!     let workers: Vec<_> = LocalGroup::new(3)
//!         .into_iter()
//!         .map(|mut bcast| {
//!             let path = path.clone();
//!             s.spawn(move || {
//!                 let mut tree = ParamTree::new();
//!                 let me = bcast.rank();
//!                 parallel_build_params(&mut tree.root_mut(), me, 3, &path, &mut bcast).unwrap();
//!                 tree
//!             })
//!         })
//!         .collect();
//!     workers.into_iter().map(|w| w.join().unwrap()).collect()
//! });
//!
//! for tree in &trees {
//!     assert_eq!(tree.root().get_int("node.cores").unwrap(), 8);
//! }
//! ```
//!
//! ## Failures
//!
//! An error on one participant is returned to that participant only. The
//! caller is responsible for stopping the rest of the group, e.g. with
//! [`LocalBroadcaster::abort`].

#![warn(missing_docs)]

pub mod broadcaster;
pub mod error;
pub mod local;
pub mod protocol;

pub use broadcaster::{Broadcaster, SoloBroadcaster, LENGTH_PREFIX};
pub use error::{BroadcastError, BroadcastResult};
pub use local::{LocalBroadcaster, LocalGroup};
pub use protocol::{parallel_build_params, ParallelBuild};
