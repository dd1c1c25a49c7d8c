//! Single-entry assignment handle.

use std::fmt;

use crate::error::{ParamError, ParamResult};
use crate::tree::{ParamTree, ScopeId, ScopeMut};
use crate::units::{parse_bandwidth, parse_byte_length, parse_frequency, parse_quantity, parse_time, UnitGrammar};

/// Handle to one entry of a scope, obtained with [`ScopeMut::slot`].
///
/// Writes through a slot always overwrite and resolve a leading `$name`
/// against the variables of the scope the slot was taken from. Reads only
/// see the slot's own entry; ancestors are not consulted.
///
/// # Example
///
/// ```
/// use paramtree_core::ParamTree;
///
/// let mut tree = ParamTree::new();
/// let mut root = tree.root_mut();
/// let mut latency = root.slot("nic.latency").unwrap();
/// latency.set_time(100.0, "ns").unwrap();
/// assert_eq!(latency.value(), Some("100ns"));
/// assert!((latency.time().unwrap() - 100e-9).abs() < 1e-18);
/// ```
pub struct ParamSlot<'s> {
    tree: &'s mut ParamTree,
    origin: ScopeId,
    scope: ScopeId,
    leaf: String,
}

impl fmt::Debug for ParamSlot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamSlot")
            .field("key", &self.key())
            .field("value", &self.value())
            .finish()
    }
}

impl ParamSlot<'_> {
    /// Full dotted key of this entry.
    pub fn key(&self) -> String {
        self.tree.qualified_key(self.scope, &self.leaf)
    }

    /// Current raw value, if set.
    pub fn value(&self) -> Option<&str> {
        self.tree.entry(self.scope, &self.leaf)
    }

    /// Store text.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::UndefinedVariable`] for an unbound `$name`,
    /// [`ParamError::InvalidValue`] for text the flat form cannot carry, or
    /// the validator's error if the key is rejected.
    pub fn set(&mut self, value: &str) -> ParamResult<()> {
        let value = self.tree.substitute(self.origin, value)?;
        self.tree.store(self.scope, &self.leaf, value, false)
    }

    /// Store a number followed by arbitrary units.
    ///
    /// # Errors
    ///
    /// See [`set`](Self::set).
    pub fn set_value(&mut self, value: f64, units: &str) -> ParamResult<()> {
        self.set(&format!("{value}{units}"))
    }

    /// Store a time such as `set_time(2.0, "ns")`.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Format`] if `units` is not a time unit.
    pub fn set_time(&mut self, value: f64, units: &str) -> ParamResult<()> {
        self.set_checked(value, units, parse_time, "a time")
    }

    /// Store a bandwidth such as `set_bandwidth(10.0, "GB/s")`.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Format`] if `units` is not a bandwidth unit.
    pub fn set_bandwidth(&mut self, value: f64, units: &str) -> ParamResult<()> {
        self.set_checked(value, units, parse_bandwidth, "a bandwidth")
    }

    /// Store a frequency such as `set_frequency(2.1, "GHz")`.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Format`] if `units` is not a frequency unit.
    pub fn set_frequency(&mut self, value: f64, units: &str) -> ParamResult<()> {
        self.set_checked(value, units, parse_frequency, "a frequency")
    }

    /// Store a byte length such as `set_byte_length(16.0, "KiB")`.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Format`] if `units` is not a byte unit.
    pub fn set_byte_length(&mut self, value: f64, units: &str) -> ParamResult<()> {
        self.set_checked(value, units, parse_byte_length, "a byte length")
    }

    fn set_checked(&mut self, value: f64, units: &str, grammar: UnitGrammar, expected: &'static str) -> ParamResult<()> {
        let text = format!("{value}{units}");
        if grammar(&text).is_none() {
            return Err(ParamError::format(self.key(), text, expected));
        }
        self.set(&text)
    }

    fn read(&self, grammar: UnitGrammar, expected: &'static str) -> ParamResult<f64> {
        let raw = self.value().ok_or_else(|| ParamError::missing_key(self.key()))?;
        grammar(raw).ok_or_else(|| ParamError::format(self.key(), raw, expected))
    }

    /// Read back as seconds.
    ///
    /// # Errors
    ///
    /// [`ParamError::MissingKey`] if unset, [`ParamError::Format`] if the
    /// value is not a time.
    pub fn time(&self) -> ParamResult<f64> {
        self.read(parse_time, "a time")
    }

    /// Read back as bytes per second.
    ///
    /// # Errors
    ///
    /// See [`time`](Self::time).
    pub fn bandwidth(&self) -> ParamResult<f64> {
        self.read(parse_bandwidth, "a bandwidth")
    }

    /// Read back as Hz.
    ///
    /// # Errors
    ///
    /// See [`time`](Self::time).
    pub fn frequency(&self) -> ParamResult<f64> {
        self.read(parse_frequency, "a frequency")
    }

    /// Read back as bytes.
    ///
    /// # Errors
    ///
    /// See [`time`](Self::time).
    pub fn byte_length(&self) -> ParamResult<f64> {
        self.read(parse_byte_length, "a byte length")
    }

    /// Read back as any quantity, normalized to its base unit.
    ///
    /// # Errors
    ///
    /// See [`time`](Self::time).
    pub fn quantity(&self) -> ParamResult<f64> {
        self.read(|raw| parse_quantity(raw).map(|q| q.value), "a quantity")
    }
}

impl ScopeMut<'_> {
    /// Handle to the entry `key`, creating intermediate namespaces.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::InvalidKey`] for malformed segments, or the
    /// validator's error if a namespace is rejected.
    pub fn slot(&mut self, key: &str) -> ParamResult<ParamSlot<'_>> {
        let (scope, leaf) = self.tree.route_mut(self.id, key)?;
        Ok(ParamSlot {
            leaf: leaf.to_string(),
            tree: &mut *self.tree,
            origin: self.id,
            scope,
        })
    }
}
