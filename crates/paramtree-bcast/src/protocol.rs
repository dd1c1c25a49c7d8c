//! Collective parameter build.
//!
//! One participant (the root) reads the parameter file, resolving every
//! include, and broadcasts the flattened tree. Every other participant
//! parses the received text, so only the root touches the filesystem.

use std::path::Path;

use metrics::counter;
use paramtree_core::{counters, LoadOptions, ScopeMut};
use tracing::{error, info};

use crate::broadcaster::Broadcaster;
use crate::error::{BroadcastError, BroadcastResult};

/// Settings for a collective build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParallelBuild {
    /// Rank that loads the file.
    pub root: usize,
    /// Options for the root's file load and the peers' parse.
    pub options: LoadOptions,
}

impl ParallelBuild {
    /// Build rooted at rank 0 with default load options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root rank.
    #[must_use]
    pub fn with_root(mut self, root: usize) -> Self {
        self.root = root;
        self
    }

    /// Set the load options.
    #[must_use]
    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the collective build on participant `me` of `nproc`.
    ///
    /// All participants must call this together with the same settings.
    /// Only the root reads `path`; the others ignore it.
    ///
    /// # Errors
    ///
    /// Any load, parse or transport error on this participant is logged and
    /// returned. Other participants are not notified.
    pub fn run<B>(&self, params: &mut ScopeMut<'_>, me: usize, nproc: usize, path: &Path, bcaster: &mut B) -> BroadcastResult<()>
    where
        B: Broadcaster + ?Sized,
    {
        let result = self.build(params, me, nproc, path, bcaster);
        if let Err(err) = &result {
            error!(rank = me, root = self.root, error = %err, "caught error while building parameters");
        }
        result
    }

    fn build<B>(&self, params: &mut ScopeMut<'_>, me: usize, nproc: usize, path: &Path, bcaster: &mut B) -> BroadcastResult<()>
    where
        B: Broadcaster + ?Sized,
    {
        if self.root >= nproc {
            return Err(BroadcastError::transport(format!(
                "root {} outside group of {nproc}",
                self.root
            )));
        }

        if me == self.root {
            params.parse_file(path, self.options)?;
            if nproc > 1 {
                let mut text = params.view().flatten(false);
                let bytes = text.len();
                bcaster.broadcast_string(&mut text, me, self.root)?;
                counter!(counters::BROADCAST_BYTES).increment(bytes as u64);
                info!(rank = me, bytes, peers = nproc - 1, path = %path.display(), "broadcast parameters");
            }
        } else {
            let mut text = String::new();
            bcaster.broadcast_string(&mut text, me, self.root)?;
            params.parse_str(&text, self.options)?;
            info!(rank = me, root = self.root, bytes = text.len(), "received parameters");
        }
        Ok(())
    }
}

/// Run [`ParallelBuild::run`] rooted at rank 0 with default load options.
///
/// # Errors
///
/// See [`ParallelBuild::run`].
pub fn parallel_build_params<B>(params: &mut ScopeMut<'_>, me: usize, nproc: usize, path: &Path, bcaster: &mut B) -> BroadcastResult<()>
where
    B: Broadcaster + ?Sized,
{
    ParallelBuild::new().run(params, me, nproc, path, bcaster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcaster::SoloBroadcaster;
    use paramtree_core::ParamTree;
    use std::fs;

    #[test]
    fn test_single_participant_loads_without_broadcast() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solo.params");
        fs::write(&path, "a.b = 1\n").unwrap();

        let mut tree = ParamTree::new();
        parallel_build_params(&mut tree.root_mut(), 0, 1, &path, &mut SoloBroadcaster).unwrap();
        assert_eq!(tree.root().get("a.b").unwrap(), "1");
    }

    #[test]
    fn test_root_outside_group() {
        let mut tree = ParamTree::new();
        let err = ParallelBuild::new()
            .with_root(3)
            .run(&mut tree.root_mut(), 0, 2, Path::new("unused"), &mut SoloBroadcaster)
            .unwrap_err();
        assert!(matches!(err, BroadcastError::Transport(_)));
    }

    #[test]
    fn test_root_load_error_is_returned() {
        let mut tree = ParamTree::new();
        let err = parallel_build_params(
            &mut tree.root_mut(),
            0,
            1,
            Path::new("/no/such/file.params"),
            &mut SoloBroadcaster,
        )
        .unwrap_err();
        assert!(err.as_param().is_some_and(paramtree_core::ParamError::is_not_found));
    }

    #[test]
    fn test_builder() {
        let build = ParallelBuild::new()
            .with_root(2)
            .with_options(LoadOptions::strict());
        assert_eq!(build.root, 2);
        assert!(build.options.fail_on_existing);
    }
}
