//! Line classification for the parameter file grammar.
//!
//! ```text
//! # comment
//! set var NAME = VALUE
//! key.path.to.param = value
//! include relative/or/absolute/path
//! unset key.path.to.param
//! ```
//!
//! Classification is purely syntactic; applying a directive to a tree is the
//! loader's job.

use crate::error::{ParamError, ParamResult};

pub(crate) const SET_VAR: &str = "set var ";
const INCLUDE: &str = "include";
const UNSET: &str = "unset";

/// One classified input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'a> {
    /// Empty after trimming.
    Blank,
    /// Starts with `#`.
    Comment,
    /// `set var NAME = VALUE`.
    SetVariable {
        /// Variable name.
        name: &'a str,
        /// Unsubstituted value.
        value: &'a str,
    },
    /// `key = value`.
    Assign {
        /// Possibly dotted key.
        key: &'a str,
        /// Value, before variable substitution.
        value: &'a str,
    },
    /// `include path`.
    Include {
        /// Path as written.
        path: &'a str,
    },
    /// `unset key`.
    Unset {
        /// Possibly dotted key.
        key: &'a str,
    },
}

/// Classify a single line.
///
/// `set var `, `include` and `unset` are recognized only at the start of the
/// trimmed line; any other line containing `=` is an assignment.
///
/// # Errors
///
/// Returns [`ParamError::Syntax`] for a non-blank line that matches no
/// directive, or a directive with an empty operand.
///
/// # Example
///
/// ```
/// use paramtree_core::{parse_line, Directive};
///
/// assert_eq!(
///     parse_line("  node.cores = 8 ").unwrap(),
///     Directive::Assign { key: "node.cores", value: "8" }
/// );
/// assert!(parse_line("what is this").is_err());
/// ```
pub fn parse_line(line: &str) -> ParamResult<Directive<'_>> {
    let line = line.trim();

    if line.is_empty() {
        return Ok(Directive::Blank);
    }
    if line.starts_with('#') {
        return Ok(Directive::Comment);
    }

    if let Some(rest) = line.strip_prefix(SET_VAR) {
        let (name, value) = rest.split_once('=').ok_or_else(|| ParamError::syntax(line))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ParamError::syntax(line));
        }
        return Ok(Directive::SetVariable {
            name,
            value: value.trim(),
        });
    }

    if let Some((key, value)) = line.split_once('=') {
        let key = key.trim();
        if key.is_empty() {
            return Err(ParamError::syntax(line));
        }
        return Ok(Directive::Assign {
            key,
            value: value.trim(),
        });
    }

    let (head, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(head, rest)| (head, rest.trim()));

    match head {
        INCLUDE if !rest.is_empty() => Ok(Directive::Include { path: rest }),
        UNSET if !rest.is_empty() => Ok(Directive::Unset { key: rest }),
        _ => Err(ParamError::syntax(line)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_comment() {
        assert_eq!(parse_line("").unwrap(), Directive::Blank);
        assert_eq!(parse_line("   \t ").unwrap(), Directive::Blank);
        assert_eq!(parse_line("# a = b").unwrap(), Directive::Comment);
        assert_eq!(parse_line("   #include x").unwrap(), Directive::Comment);
    }

    #[test]
    fn test_set_var() {
        assert_eq!(
            parse_line("set var FOO = 10GB").unwrap(),
            Directive::SetVariable {
                name: "FOO",
                value: "10GB"
            }
        );
        assert!(parse_line("set var FOO").is_err());
        assert!(parse_line("set var = 1").is_err());
    }

    #[test]
    fn test_assignment_splits_on_first_equals() {
        assert_eq!(
            parse_line("a.b = x=y").unwrap(),
            Directive::Assign {
                key: "a.b",
                value: "x=y"
            }
        );
        assert_eq!(
            parse_line("empty =").unwrap(),
            Directive::Assign {
                key: "empty",
                value: ""
            }
        );
        assert!(parse_line("= 4").is_err());
    }

    #[test]
    fn test_include_and_unset() {
        assert_eq!(
            parse_line("include  sub/dir.params  ").unwrap(),
            Directive::Include {
                path: "sub/dir.params"
            }
        );
        assert_eq!(
            parse_line("unset node.cores").unwrap(),
            Directive::Unset { key: "node.cores" }
        );
        assert!(parse_line("include").is_err());
        assert!(parse_line("unset").is_err());
    }

    #[test]
    fn test_directive_words_mid_line_are_assignments() {
        assert_eq!(
            parse_line("note = set var X = 1").unwrap(),
            Directive::Assign {
                key: "note",
                value: "set var X = 1"
            }
        );
        assert_eq!(
            parse_line("why = unset a.b").unwrap(),
            Directive::Assign {
                key: "why",
                value: "unset a.b"
            }
        );
    }

    #[test]
    fn test_syntax_error_names_line() {
        let err = parse_line("  bogus line ").unwrap_err();
        assert!(matches!(
            err,
            ParamError::Syntax { ref line, len } if line == "bogus line" && len == 10
        ));
        assert!(parse_line("includes x").is_err());
    }
}
