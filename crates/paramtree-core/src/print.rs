//! Text rendering of a scope subtree.
//!
//! Flat form, used for broadcast payloads:
//!
//! ```text
//! top = 1
//! node.cores = 4
//! node.nic.bandwidth = 10GB/s
//! ```
//!
//! Pretty form, for humans:
//!
//! ```text
//! top                       = 1
//! ::node
//!   cores                     = 4
//!   ::nic
//!     bandwidth                 = 10GB/s
//! ```
//!
//! Entries come before child scopes and both are emitted in lexicographic
//! order, so the output is deterministic.

use std::fmt;
use std::io;

use crate::tree::Scope;

const KEY_WIDTH: usize = 25;

/// Display adapter returned by [`Scope::display`].
#[derive(Debug, Clone, Copy)]
pub struct Flatten<'t> {
    scope: Scope<'t>,
    pretty: bool,
}

impl Flatten<'_> {
    fn write_scope(f: &mut fmt::Formatter<'_>, scope: Scope<'_>, pretty: bool, prefix: &str) -> fmt::Result {
        for (key, value) in scope.entries() {
            if pretty {
                writeln!(f, "{prefix}{key:<width$} = {value}", width = KEY_WIDTH)?;
            } else {
                writeln!(f, "{prefix}{key} = {value}")?;
            }
        }

        for (name, child) in scope.namespaces() {
            if pretty {
                writeln!(f, "{prefix}::{name}")?;
                Self::write_scope(f, child, pretty, &format!("{prefix}  "))?;
            } else {
                Self::write_scope(f, child, pretty, &format!("{prefix}{name}."))?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Flatten<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::write_scope(f, self.scope, self.pretty, "")
    }
}

impl<'t> Scope<'t> {
    /// Render this subtree in flat or pretty form.
    pub fn display(&self, pretty: bool) -> Flatten<'t> {
        Flatten {
            scope: *self,
            pretty,
        }
    }

    /// Render this subtree to a string in flat or pretty form.
    ///
    /// Reparsing the flat form into an empty scope reproduces every leaf.
    pub fn flatten(&self, pretty: bool) -> String {
        self.display(pretty).to_string()
    }

    /// Write the flat form to `out`.
    ///
    /// # Errors
    ///
    /// Returns any error raised by `out`.
    pub fn print_params(&self, mut out: impl io::Write) -> io::Result<()> {
        write!(out, "{}", self.display(false))
    }

    /// Write the pretty form to `out`.
    ///
    /// # Errors
    ///
    /// Returns any error raised by `out`.
    pub fn pretty_print_params(&self, mut out: impl io::Write) -> io::Result<()> {
        write!(out, "{}", self.display(true))
    }
}
