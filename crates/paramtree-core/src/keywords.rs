//! Keyword and namespace validation.
//!
//! Every write into a [`ParamTree`](crate::ParamTree) passes the leaf key and
//! value through the tree's [`KeywordValidator`], and every namespace entry
//! passes the namespace name through it. The default validator
//! ([`AcceptAll`]) accepts everything; [`KeywordRegistry`] only accepts names
//! that were registered up front.

use std::collections::BTreeSet;
use std::fmt;

use regex::Regex;

use crate::error::{ParamError, ParamResult};

/// Validation hook for parameter names.
pub trait KeywordValidator: fmt::Debug + Send + Sync {
    /// Validate a leaf key and the value about to be stored under it.
    fn validate_keyword(&self, key: &str, value: &str) -> ParamResult<()>;

    /// Validate a namespace name before it is entered or created.
    fn validate_namespace(&self, name: &str) -> ParamResult<()>;
}

/// Validator that accepts every key and namespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl KeywordValidator for AcceptAll {
    fn validate_keyword(&self, _key: &str, _value: &str) -> ParamResult<()> {
        Ok(())
    }

    fn validate_namespace(&self, _name: &str) -> ParamResult<()> {
        Ok(())
    }
}

/// Validator backed by a catalog of known keywords and namespaces.
///
/// Keywords may be registered by exact name or by regular expression.
///
/// # Example
///
/// ```
/// use paramtree_core::{KeywordRegistry, KeywordValidator};
///
/// let registry = KeywordRegistry::new()
///     .with_keyword("latency")
///     .with_pattern(r"^link_\d+$")
///     .unwrap()
///     .with_namespace("node");
///
/// assert!(registry.validate_keyword("latency", "10ns").is_ok());
/// assert!(registry.validate_keyword("link_3", "1GB/s").is_ok());
/// assert!(registry.validate_keyword("lattency", "10ns").is_err());
/// assert!(registry.validate_namespace("switch").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct KeywordRegistry {
    keywords: BTreeSet<String>,
    patterns: Vec<Regex>,
    namespaces: BTreeSet<String>,
}

impl KeywordRegistry {
    /// Create an empty registry. An empty registry rejects everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a keyword by exact name.
    #[must_use]
    pub fn with_keyword(mut self, name: impl Into<String>) -> Self {
        self.keywords.insert(name.into());
        self
    }

    /// Register several keywords by exact name.
    #[must_use]
    pub fn with_keywords<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords.extend(names.into_iter().map(Into::into));
        self
    }

    /// Register every keyword matching a regular expression.
    ///
    /// # Errors
    ///
    /// Returns the regex compilation error if `pattern` is invalid.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.patterns.push(Regex::new(pattern)?);
        Ok(self)
    }

    /// Register a namespace name.
    #[must_use]
    pub fn with_namespace(mut self, name: impl Into<String>) -> Self {
        self.namespaces.insert(name.into());
        self
    }

    /// Whether `key` is a registered keyword.
    pub fn is_keyword(&self, key: &str) -> bool {
        self.keywords.contains(key) || self.patterns.iter().any(|p| p.is_match(key))
    }

    /// Whether `name` is a registered namespace.
    pub fn is_namespace(&self, name: &str) -> bool {
        self.namespaces.contains(name)
    }
}

impl KeywordValidator for KeywordRegistry {
    fn validate_keyword(&self, key: &str, _value: &str) -> ParamResult<()> {
        if self.is_keyword(key) {
            Ok(())
        } else {
            Err(ParamError::rejected(key, "unknown keyword"))
        }
    }

    fn validate_namespace(&self, name: &str) -> ParamResult<()> {
        if self.is_namespace(name) {
            Ok(())
        } else {
            Err(ParamError::rejected(name, "unknown namespace"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_all() {
        assert!(AcceptAll.validate_keyword("anything", "at all").is_ok());
        assert!(AcceptAll.validate_namespace("anywhere").is_ok());
    }

    #[test]
    fn test_registry_exact_and_pattern() {
        let registry = KeywordRegistry::new()
            .with_keywords(["a", "b"])
            .with_pattern(r"^port_\d+$")
            .unwrap();

        assert!(registry.is_keyword("a"));
        assert!(registry.is_keyword("port_12"));
        assert!(!registry.is_keyword("port_x"));
        assert!(!registry.is_keyword("c"));
    }

    #[test]
    fn test_registry_rejection_error() {
        let registry = KeywordRegistry::new().with_namespace("nic");
        assert!(registry.validate_namespace("nic").is_ok());

        let err = registry.validate_keyword("bogus", "1").unwrap_err();
        assert!(matches!(err, ParamError::Rejected { ref name, .. } if name == "bogus"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(KeywordRegistry::new().with_pattern("(").is_err());
    }
}
