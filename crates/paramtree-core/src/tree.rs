//! The namespaced parameter tree.
//!
//! A [`ParamTree`] owns every scope in an arena; parent links are plain
//! [`ScopeId`] handles, so ownership only flows root → children and a scope
//! lives exactly as long as the tree that owns it.
//!
//! Scopes are accessed through two views:
//!
//! - [`Scope`]: a shared, `Copy` view used for every read.
//! - [`ScopeMut`]: an exclusive view used for writes, namespace creation
//!   and parsing.
//!
//! Values are always stored as text. Typed interpretation happens when a
//! value is read (see the accessor methods on [`Scope`]); the only
//! transformation applied at write time is `$variable` substitution.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use metrics::counter;
use tracing::debug;

use crate::counters;
use crate::error::{ParamError, ParamResult};
use crate::keywords::{AcceptAll, KeywordValidator};
use crate::loader::LoadOptions;
use crate::parser::SET_VAR;

/// The shared, never-written tree behind [`ParamTree::sentinel`].
static SENTINEL: OnceLock<ParamTree> = OnceLock::new();

/// Handle to a scope inside a [`ParamTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug, Clone, Default)]
pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) parent: Option<ScopeId>,
    pub(crate) entries: BTreeMap<String, String>,
    pub(crate) children: BTreeMap<String, ScopeId>,
    pub(crate) variables: BTreeMap<String, String>,
}

/// A tree of parameter scopes.
///
/// # Example
///
/// ```
/// use paramtree_core::{LoadOptions, ParamTree};
///
/// let mut tree = ParamTree::new();
/// tree.root_mut()
///     .parse_str("node.cores = 8\nnode.nic.bandwidth = 10GB/s\n", LoadOptions::default())
///     .unwrap();
///
/// let nic = tree.root().namespace("node.nic").unwrap();
/// assert_eq!(nic.get_bandwidth("bandwidth").unwrap(), 10e9);
/// // Lookups fall back to ancestors.
/// assert_eq!(tree.root().namespace("node").unwrap().get_int("cores").unwrap(), 8);
/// ```
#[derive(Debug, Clone)]
pub struct ParamTree {
    nodes: Vec<Node>,
    validator: Arc<dyn KeywordValidator>,
}

impl Default for ParamTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamTree {
    const ROOT: ScopeId = ScopeId(0);

    /// Create an empty tree that accepts every keyword.
    #[must_use]
    pub fn new() -> Self {
        Self::with_validator(AcceptAll)
    }

    /// Create an empty tree whose writes go through `validator`.
    #[must_use]
    pub fn with_validator(validator: impl KeywordValidator + 'static) -> Self {
        Self::with_shared_validator(Arc::new(validator))
    }

    /// Create an empty tree sharing an existing validator.
    #[must_use]
    pub fn with_shared_validator(validator: Arc<dyn KeywordValidator>) -> Self {
        Self {
            nodes: vec![Node::default()],
            validator,
        }
    }

    /// Load a tree from a parameter file with default [`LoadOptions`].
    ///
    /// # Errors
    ///
    /// Returns any error raised while loading the file or its includes.
    pub fn from_file(path: impl AsRef<Path>) -> ParamResult<Self> {
        let mut tree = Self::new();
        tree.root_mut().parse_file(path, LoadOptions::default())?;
        Ok(tree)
    }

    /// Build a tree from dotted key/value pairs, later pairs overriding
    /// earlier ones.
    ///
    /// # Errors
    ///
    /// Returns an error if a key is malformed or a value references an
    /// undefined variable.
    pub fn from_pairs<I, K, V>(pairs: I) -> ParamResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut tree = Self::new();
        {
            let mut root = tree.root_mut();
            for (key, value) in pairs {
                root.add_override(key.as_ref(), value.as_ref())?;
            }
        }
        Ok(tree)
    }

    /// The shared empty scope returned for absent optional namespaces.
    ///
    /// There is one sentinel per process. It has no parent, no entries and no
    /// children, and it cannot be written through.
    pub fn sentinel() -> Scope<'static> {
        Scope {
            tree: SENTINEL.get_or_init(ParamTree::new),
            id: Self::ROOT,
        }
    }

    /// Read view of the root scope.
    pub fn root(&self) -> Scope<'_> {
        Scope {
            tree: self,
            id: Self::ROOT,
        }
    }

    /// Write view of the root scope.
    pub fn root_mut(&mut self) -> ScopeMut<'_> {
        ScopeMut {
            tree: self,
            id: Self::ROOT,
        }
    }

    /// Read view of the scope identified by `id`.
    ///
    /// Returns `None` if `id` does not belong to this tree.
    pub fn scope(&self, id: ScopeId) -> Option<Scope<'_>> {
        (id.0 < self.nodes.len()).then_some(Scope { tree: self, id })
    }

    /// Number of scopes in the tree, including the root.
    pub fn scope_count(&self) -> usize {
        self.nodes.len()
    }

    /// Every leaf parameter keyed by its full dotted path.
    pub fn to_flat_map(&self) -> BTreeMap<String, String> {
        self.root().leaves()
    }

    /// The validator applied to writes and namespace entries.
    pub fn validator(&self) -> &dyn KeywordValidator {
        self.validator.as_ref()
    }

    fn node(&self, id: ScopeId) -> &Node {
        &self.nodes[id.0]
    }

    fn child(&self, id: ScopeId, name: &str) -> Option<ScopeId> {
        self.node(id).children.get(name).copied()
    }

    pub(crate) fn child_or_insert(&mut self, id: ScopeId, name: &str) -> ParamResult<ScopeId> {
        if !is_storable_name(name) {
            return Err(ParamError::invalid_key(name));
        }
        self.validator.validate_namespace(name)?;
        if let Some(child) = self.child(id, name) {
            return Ok(child);
        }

        let child = ScopeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            parent: Some(id),
            ..Node::default()
        });
        self.nodes[id.0].children.insert(name.to_string(), child);
        debug!(namespace = %self.qualified_name(child), "created namespace");
        Ok(child)
    }

    // Split a dotted key into its owning scope and leaf name without
    // creating anything.
    fn route<'k>(&self, id: ScopeId, key: &'k str) -> Option<(ScopeId, &'k str)> {
        let (path, leaf) = match key.rsplit_once('.') {
            Some((path, leaf)) => (Some(path), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return None;
        }

        let mut scope = id;
        if let Some(path) = path {
            for segment in path.split('.') {
                scope = self.child(scope, segment)?;
            }
        }
        Some((scope, leaf))
    }

    // Same as `route`, creating intermediate scopes on demand. Every segment
    // is checked before anything is created.
    pub(crate) fn route_mut<'k>(&mut self, id: ScopeId, key: &'k str) -> ParamResult<(ScopeId, &'k str)> {
        let (path, leaf) = match key.rsplit_once('.') {
            Some((path, leaf)) => (Some(path), leaf),
            None => (None, key),
        };
        if !is_storable_name(leaf) || path.is_some_and(|p| p.split('.').any(|s| !is_storable_name(s))) {
            return Err(ParamError::invalid_key(key));
        }

        let mut scope = id;
        if let Some(path) = path {
            for segment in path.split('.') {
                scope = self.child_or_insert(scope, segment)?;
            }
        }
        Ok((scope, leaf))
    }

    // Resolve `key` in `id`'s subtree, then in each ancestor's.
    fn lookup(&self, id: ScopeId, key: &str) -> Option<&str> {
        let mut current = Some(id);
        while let Some(scope) = current {
            let found = self
                .route(scope, key)
                .and_then(|(owner, leaf)| self.node(owner).entries.get(leaf));
            if let Some(value) = found {
                return Some(value.as_str());
            }
            current = self.node(scope).parent;
        }
        None
    }

    // Replace a leading `$name` with the variable bound in `id`, repeatedly.
    pub(crate) fn substitute(&self, id: ScopeId, value: &str) -> ParamResult<String> {
        let variables = &self.node(id).variables;
        let mut current = value;
        let mut seen: Vec<&str> = Vec::new();

        while let Some(name) = current.strip_prefix('$') {
            let name = name.trim();
            if seen.contains(&name) {
                return Err(ParamError::VariableCycle {
                    name: name.to_string(),
                });
            }
            seen.push(name);
            current = variables
                .get(name)
                .ok_or_else(|| ParamError::undefined_variable(name))?;
        }

        Ok(current.to_string())
    }

    pub(crate) fn write(
        &mut self,
        id: ScopeId,
        key: &str,
        value: &str,
        fail_on_existing: bool,
    ) -> ParamResult<()> {
        let value = self.substitute(id, value)?;
        if !is_storable_value(&value) {
            return Err(ParamError::invalid_value(key, value));
        }
        let (scope, leaf) = self.route_mut(id, key)?;
        self.store(scope, leaf, value, fail_on_existing)
    }

    pub(crate) fn store(
        &mut self,
        scope: ScopeId,
        leaf: &str,
        value: String,
        fail_on_existing: bool,
    ) -> ParamResult<()> {
        if !is_storable_name(leaf) {
            return Err(ParamError::invalid_key(self.qualified_key(scope, leaf)));
        }
        if !is_storable_value(&value) {
            return Err(ParamError::invalid_value(self.qualified_key(scope, leaf), value));
        }
        self.validator.validate_keyword(leaf, &value)?;

        if fail_on_existing && self.node(scope).entries.contains_key(leaf) {
            return Err(ParamError::duplicate_key(self.qualified_key(scope, leaf)));
        }

        debug!(
            key = %self.qualified_key(scope, leaf),
            value = %value,
            "setting parameter"
        );
        self.nodes[scope.0].entries.insert(leaf.to_string(), value);
        counter!(counters::PARAMETERS_WRITTEN).increment(1);
        Ok(())
    }

    pub(crate) fn remove(&mut self, id: ScopeId, key: &str) -> Option<String> {
        let (scope, leaf) = self.route(id, key)?;
        let removed = self.nodes[scope.0].entries.remove(leaf);
        if removed.is_some() {
            debug!(key = %self.qualified_key(scope, leaf), "removed parameter");
        }
        removed
    }

    pub(crate) fn set_variable(&mut self, id: ScopeId, name: &str, value: &str) {
        debug!(name, value, "setting variable");
        self.nodes[id.0]
            .variables
            .insert(name.to_string(), value.to_string());
    }

    pub(crate) fn entry(&self, scope: ScopeId, leaf: &str) -> Option<&str> {
        self.node(scope).entries.get(leaf).map(String::as_str)
    }

    fn qualified_name(&self, id: ScopeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(scope) = current {
            let node = self.node(scope);
            if node.parent.is_some() {
                names.push(node.name.as_str());
            }
            current = node.parent;
        }
        names.reverse();
        names.join(".")
    }

    pub(crate) fn qualified_key(&self, id: ScopeId, leaf: &str) -> String {
        let path = self.qualified_name(id);
        if path.is_empty() {
            leaf.to_string()
        } else {
            format!("{path}.{leaf}")
        }
    }
}

// A key segment must come back unchanged from a flat `path.key = value`
// line: no edge whitespace, no `=` or line break, and nothing the parser
// would read as a comment or a variable definition.
fn is_storable_name(name: &str) -> bool {
    !name.is_empty()
        && name.trim() == name
        && !name.starts_with('#')
        && name != SET_VAR.trim_end()
        && !name.starts_with(SET_VAR)
        && !name.contains(['=', '\n', '\r'])
}

// Values are trimmed on reparse and a leading `$` would be substituted again.
fn is_storable_value(value: &str) -> bool {
    value.trim() == value && !value.starts_with('$') && !value.contains(['\n', '\r'])
}

impl FromStr for ParamTree {
    type Err = ParamError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut tree = Self::new();
        tree.root_mut().parse_str(text, LoadOptions::default())?;
        Ok(tree)
    }
}

/// Read view of one scope.
#[derive(Clone, Copy)]
pub struct Scope<'t> {
    pub(crate) tree: &'t ParamTree,
    pub(crate) id: ScopeId,
}

impl fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("path", &self.path())
            .field("entries", &self.node().entries.len())
            .field("namespaces", &self.node().children.len())
            .finish()
    }
}

impl<'t> Scope<'t> {
    fn node(&self) -> &'t Node {
        self.tree.node(self.id)
    }

    fn at(&self, id: ScopeId) -> Scope<'t> {
        Scope {
            tree: self.tree,
            id,
        }
    }

    /// Handle of this scope within its tree.
    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// Name of this scope; empty for a root.
    pub fn name(&self) -> &'t str {
        &self.node().name
    }

    /// Dotted path from the root to this scope; empty for a root.
    pub fn path(&self) -> String {
        self.tree.qualified_name(self.id)
    }

    /// The enclosing scope, if any.
    pub fn parent(&self) -> Option<Scope<'t>> {
        self.node().parent.map(|id| self.at(id))
    }

    /// The root of the tree this scope belongs to.
    pub fn top_parent(&self) -> Scope<'t> {
        let mut scope = *self;
        while let Some(parent) = scope.parent() {
            scope = parent;
        }
        scope
    }

    /// Whether this is the shared sentinel scope.
    pub fn is_sentinel(&self) -> bool {
        SENTINEL
            .get()
            .is_some_and(|sentinel| std::ptr::eq(sentinel, self.tree))
    }

    /// Whether this scope holds no entries and no namespaces.
    pub fn is_empty(&self) -> bool {
        self.node().entries.is_empty() && self.node().children.is_empty()
    }

    /// Resolve `key` and return its raw value.
    ///
    /// Dotted keys are routed through child scopes without creating any. If
    /// the key is not found below this scope, each ancestor is tried in turn.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::MissingKey`] if no scope in the ancestor chain
    /// holds the key.
    pub fn get(&self, key: &str) -> ParamResult<&'t str> {
        debug!(key, scope = %self.path(), "getting parameter");
        self.tree.lookup(self.id, key).ok_or_else(|| {
            debug!(key, params = %self.flatten(false), "parameter not found in namespace");
            ParamError::missing_key(key)
        })
    }

    /// Resolve `key` like [`get`](Self::get), returning `default` if it is
    /// absent from the whole ancestor chain.
    pub fn get_optional<'a>(&self, key: &str, default: &'a str) -> &'a str
    where
        't: 'a,
    {
        self.lookup(key).unwrap_or(default)
    }

    pub(crate) fn lookup(&self, key: &str) -> Option<&'t str> {
        self.tree.lookup(self.id, key)
    }

    /// Whether `key` is stored in this scope's own entries.
    ///
    /// Unlike [`get`](Self::get), ancestors are never consulted: a key
    /// inherited from a parent scope reports `false` here.
    pub fn has(&self, key: &str) -> bool {
        self.tree
            .route(self.id, key)
            .is_some_and(|(owner, leaf)| self.tree.node(owner).entries.contains_key(leaf))
    }

    /// Enter the child namespace `name` (dotted paths allowed).
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::NamespaceNotFound`] if the namespace does not
    /// exist, or the validator's error if the name is rejected.
    pub fn namespace(&self, name: &str) -> ParamResult<Scope<'t>> {
        let mut scope = self.id;
        for segment in name.split('.') {
            self.tree.validator.validate_namespace(segment)?;
            scope = self
                .tree
                .child(scope, segment)
                .ok_or_else(|| ParamError::namespace_not_found(name))?;
        }
        Ok(self.at(scope))
    }

    /// Enter the child namespace `name`, or the shared sentinel scope if it
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns the validator's error if the name is rejected.
    pub fn optional_namespace(&self, name: &str) -> ParamResult<Scope<'t>> {
        match self.namespace(name) {
            Err(ParamError::NamespaceNotFound { .. }) => Ok(ParamTree::sentinel()),
            other => other,
        }
    }

    /// Whether this scope has a direct child named `name`.
    pub fn has_namespace(&self, name: &str) -> bool {
        self.node().children.contains_key(name)
    }

    /// This scope's own entries, sorted by key.
    pub fn entries(&self) -> impl Iterator<Item = (&'t str, &'t str)> + 't {
        self.node()
            .entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// This scope's direct children, sorted by name.
    pub fn namespaces(&self) -> impl Iterator<Item = (&'t str, Scope<'t>)> + 't {
        let tree = self.tree;
        self.node()
            .children
            .iter()
            .map(move |(name, id)| (name.as_str(), Scope { tree, id: *id }))
    }

    /// The value bound to variable `name` in this scope.
    pub fn variable(&self, name: &str) -> Option<&'t str> {
        self.node().variables.get(name).map(String::as_str)
    }

    /// Every leaf below this scope keyed by its dotted path relative to it.
    pub fn leaves(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        self.collect_leaves("", &mut out);
        out
    }

    fn collect_leaves(&self, prefix: &str, out: &mut BTreeMap<String, String>) {
        for (key, value) in self.entries() {
            out.insert(format!("{prefix}{key}"), value.to_string());
        }
        for (name, child) in self.namespaces() {
            child.collect_leaves(&format!("{prefix}{name}."), out);
        }
    }

    /// Merge this scope's entries and namespaces into `target`.
    ///
    /// Entries overwrite existing ones; namespaces missing from `target`
    /// are created.
    ///
    /// # Errors
    ///
    /// Returns the validator's error if `target`'s tree rejects a name.
    pub fn combine_into(&self, target: &mut ScopeMut<'_>) -> ParamResult<()> {
        for (key, value) in self.entries() {
            target.tree.store(target.id, key, value.to_string(), false)?;
        }
        for (name, child) in self.namespaces() {
            let id = target.tree.child_or_insert(target.id, name)?;
            let mut sub = ScopeMut {
                tree: &mut *target.tree,
                id,
            };
            child.combine_into(&mut sub)?;
        }
        Ok(())
    }
}

/// Write view of one scope.
pub struct ScopeMut<'t> {
    pub(crate) tree: &'t mut ParamTree,
    pub(crate) id: ScopeId,
}

impl fmt::Debug for ScopeMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ScopeMut").field(&self.view()).finish()
    }
}

impl<'t> ScopeMut<'t> {
    /// Read view of this scope.
    pub fn view(&self) -> Scope<'_> {
        Scope {
            tree: self.tree,
            id: self.id,
        }
    }

    /// Turn this write view into a read view for the same lifetime.
    pub fn into_view(self) -> Scope<'t> {
        Scope {
            tree: self.tree,
            id: self.id,
        }
    }

    /// Handle of this scope within its tree.
    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// Store `value` under `key`, failing if the key already exists in its
    /// target scope.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::DuplicateKey`] if the key exists, plus any
    /// error from [`add_with`](Self::add_with).
    pub fn add(&mut self, key: &str, value: &str) -> ParamResult<()> {
        self.add_with(key, value, true)
    }

    /// Store `value` under `key`, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// See [`add_with`](Self::add_with).
    pub fn add_override(&mut self, key: &str, value: &str) -> ParamResult<()> {
        self.add_with(key, value, false)
    }

    /// Store `value` under `key`.
    ///
    /// A leading `$name` in `value` is replaced by the variable bound in
    /// this scope, repeatedly. Dotted keys create intermediate namespaces.
    ///
    /// # Errors
    ///
    /// - [`ParamError::DuplicateKey`] if `fail_on_existing` and the key exists
    /// - [`ParamError::UndefinedVariable`] / [`ParamError::VariableCycle`]
    /// - [`ParamError::InvalidKey`] for empty key segments, or segments with
    ///   edge whitespace, `=`, a line break, or a leading `#` or `set var `
    /// - [`ParamError::InvalidValue`] for values with edge whitespace or a
    ///   line break
    /// - the validator's error if the key or a namespace is rejected
    pub fn add_with(&mut self, key: &str, value: &str, fail_on_existing: bool) -> ParamResult<()> {
        self.tree.write(self.id, key, value, fail_on_existing)
    }

    /// Store an integer under `key`, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// See [`add_with`](Self::add_with).
    pub fn set_int(&mut self, key: &str, value: i64) -> ParamResult<()> {
        self.add_override(key, &value.to_string())
    }

    /// Store a floating-point number under `key`, overwriting any existing
    /// value.
    ///
    /// # Errors
    ///
    /// See [`add_with`](Self::add_with).
    pub fn set_double(&mut self, key: &str, value: f64) -> ParamResult<()> {
        self.add_override(key, &value.to_string())
    }

    /// Store a number followed by `units` (e.g. `"ns"`) under `key`,
    /// overwriting any existing value.
    ///
    /// # Errors
    ///
    /// See [`add_with`](Self::add_with).
    pub fn set_with_units(&mut self, key: &str, value: f64, units: &str) -> ParamResult<()> {
        self.add_override(key, &format!("{value}{units}"))
    }

    /// Copy the value resolved for `from` into `to`.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::MissingKey`] if `from` does not resolve.
    pub fn copy_param(&mut self, from: &str, to: &str) -> ParamResult<()> {
        let value = self.view().get(from)?.to_string();
        self.add_override(to, &value)
    }

    /// Copy `from` into `to` if `from` is stored in this scope.
    ///
    /// # Errors
    ///
    /// See [`add_with`](Self::add_with).
    pub fn copy_optional_param(&mut self, from: &str, to: &str) -> ParamResult<()> {
        if self.view().has(from) {
            self.copy_param(from, to)?;
        }
        Ok(())
    }

    /// Remove `key` from the scope it routes to, returning the old value.
    ///
    /// Ancestors are not searched and a missing key is not an error.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.tree.remove(self.id, key)
    }

    /// Enter the child namespace `name` (dotted paths allowed), creating it
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::InvalidKey`] for malformed segments, or the
    /// validator's error if a name is rejected.
    pub fn namespace_mut(&mut self, name: &str) -> ParamResult<ScopeMut<'_>> {
        if !name.split('.').all(is_storable_name) {
            return Err(ParamError::invalid_key(name));
        }
        let mut scope = self.id;
        for segment in name.split('.') {
            scope = self.tree.child_or_insert(scope, segment)?;
        }
        Ok(ScopeMut {
            tree: &mut *self.tree,
            id: scope,
        })
    }

    /// Bind variable `name` in this scope.
    pub fn set_variable(&mut self, name: &str, value: &str) {
        self.tree.set_variable(self.id, name, value);
    }
}
