//! Parameter error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`ParamError`].
pub type ParamResult<T> = Result<T, ParamError>;

/// Errors raised while building or reading a parameter tree.
#[derive(Error, Debug)]
pub enum ParamError {
    /// An input line matches no recognized directive.
    #[error("invalid input file line of size {len}: {line}")]
    Syntax {
        /// The offending (trimmed) line.
        line: String,
        /// Length of the line in bytes.
        len: usize,
    },

    /// A strict write targeted a key that already exists.
    #[error("key already in params: {key}")]
    DuplicateKey {
        /// The duplicated key, as written.
        key: String,
    },

    /// A required lookup found no value in the scope or any ancestor.
    #[error("could not find parameter {key}")]
    MissingKey {
        /// The key that was requested.
        key: String,
    },

    /// A required namespace lookup targeted a child that does not exist.
    #[error("cannot enter namespace {namespace}, does not exist")]
    NamespaceNotFound {
        /// The namespace that was requested.
        namespace: String,
    },

    /// A `$name` substitution referenced an unbound variable.
    #[error("unknown variable name ${name}")]
    UndefinedVariable {
        /// The variable name, without the leading `$`.
        name: String,
    },

    /// A variable resolves back to itself.
    #[error("variable ${name} refers to itself")]
    VariableCycle {
        /// The variable at which the cycle was detected.
        name: String,
    },

    /// A present value failed to parse as the requested type.
    #[error("param {key} with value {value} is not formatted as {expected}")]
    Format {
        /// The key that was read.
        key: String,
        /// The raw stored value.
        value: String,
        /// Description of the expected shape.
        expected: &'static str,
    },

    /// A key with an empty segment, or a segment the line grammar would
    /// read back differently.
    #[error("invalid parameter key: {key:?}")]
    InvalidKey {
        /// The rejected key.
        key: String,
    },

    /// A value that would not survive the flat text form.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue {
        /// The key being written.
        key: String,
        /// The rejected value.
        value: String,
    },

    /// The keyword validator rejected a key or namespace.
    #[error("{name} rejected: {reason}")]
    Rejected {
        /// The key or namespace name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A parameter file (top-level or include) could not be opened.
    #[error("could not find file {path}")]
    NotFound {
        /// Path that was tried last.
        path: PathBuf,
    },

    /// A parameter file was opened but could not be read.
    #[error("failed to read parameter file {path}")]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Includes nested deeper than the loader allows.
    #[error("include depth {depth} exceeded while loading {path}")]
    IncludeDepth {
        /// The file that would have exceeded the limit.
        path: PathBuf,
        /// The depth reached.
        depth: usize,
    },

    /// An error raised while loading a specific line of a file.
    #[error("{path}:{line_number}: {source}")]
    At {
        /// The file being loaded.
        path: PathBuf,
        /// One-based line number.
        line_number: usize,
        /// The error raised for that line.
        #[source]
        source: Box<ParamError>,
    },
}

impl ParamError {
    /// Create a new syntax error for `line`.
    pub fn syntax(line: impl Into<String>) -> Self {
        let line = line.into();
        Self::Syntax {
            len: line.len(),
            line,
        }
    }

    /// Create a new duplicate key error.
    pub fn duplicate_key(key: impl Into<String>) -> Self {
        Self::DuplicateKey { key: key.into() }
    }

    /// Create a new missing key error.
    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::MissingKey { key: key.into() }
    }

    /// Create a new namespace-not-found error.
    pub fn namespace_not_found(namespace: impl Into<String>) -> Self {
        Self::NamespaceNotFound {
            namespace: namespace.into(),
        }
    }

    /// Create a new undefined variable error.
    pub fn undefined_variable(name: impl Into<String>) -> Self {
        Self::UndefinedVariable { name: name.into() }
    }

    /// Create a new format error.
    pub fn format(key: impl Into<String>, value: impl Into<String>, expected: &'static str) -> Self {
        Self::Format {
            key: key.into(),
            value: value.into(),
            expected,
        }
    }

    /// Create a new invalid key error.
    pub fn invalid_key(key: impl Into<String>) -> Self {
        Self::InvalidKey { key: key.into() }
    }

    /// Create a new invalid value error.
    pub fn invalid_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a new rejection error.
    pub fn rejected(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a new file not found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a new read error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach a file and line location to this error.
    pub fn at(self, path: impl Into<PathBuf>, line_number: usize) -> Self {
        Self::At {
            path: path.into(),
            line_number,
            source: Box::new(self),
        }
    }

    /// The error with all file/line locations stripped.
    ///
    /// Errors raised from inside nested includes are wrapped once per file;
    /// this returns the error that was originally raised.
    pub fn innermost(&self) -> &ParamError {
        match self {
            Self::At { source, .. } => source.innermost(),
            other => other,
        }
    }

    /// Whether this error (ignoring locations) is a file-open failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self.innermost(), Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_reports_length() {
        let err = ParamError::syntax("what is this");
        assert!(err.to_string().contains("size 12"));
        assert!(err.to_string().contains("what is this"));
    }

    #[test]
    fn test_format_error_names_key_and_value() {
        let err = ParamError::format("node.cores", "many", "an integer");
        let msg = err.to_string();
        assert!(msg.contains("node.cores"));
        assert!(msg.contains("many"));
        assert!(msg.contains("an integer"));
    }

    #[test]
    fn test_innermost_unwraps_locations() {
        let err = ParamError::duplicate_key("x")
            .at("inner.params", 3)
            .at("outer.params", 10);
        assert!(err.to_string().starts_with("outer.params:10:"));
        assert!(matches!(err.innermost(), ParamError::DuplicateKey { key } if key == "x"));
    }

    #[test]
    fn test_is_not_found() {
        assert!(ParamError::not_found("/missing").at("main.params", 1).is_not_found());
        assert!(!ParamError::missing_key("k").is_not_found());
    }
}
