//! Typed accessors.
//!
//! Every accessor fetches the raw text through [`Scope::get`] (or the
//! non-raising lookup for optional forms) and parses it on the spot. A
//! present but malformed value is always a [`ParamError::Format`], even for
//! optional accessors.

use crate::error::{ParamError, ParamResult};
use crate::tree::Scope;
use crate::units::{
    parse_bandwidth, parse_bare_number, parse_byte_length, parse_frequency, parse_quantity, parse_time, Quantity,
};

fn parse_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    if digits.starts_with(['+', '-']) {
        return None;
    }

    let magnitude = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) if hex.starts_with(['+', '-']) => return None,
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<i64>().ok()?,
    };

    Some(if negative { -magnitude } else { magnitude })
}

fn parse_int(text: &str) -> Option<i32> {
    parse_integer(text).and_then(|v| i32::try_from(v).ok())
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn parse_bytes(text: &str) -> Option<i64> {
    parse_byte_length(text).map(|v| v.round() as i64)
}

fn parse_list<T>(text: &str, parse: impl Fn(&str) -> Option<T>) -> Option<Vec<T>> {
    text.split_whitespace().map(parse).collect()
}

impl<'t> Scope<'t> {
    fn required<T>(&self, key: &str, expected: &'static str, parse: impl FnOnce(&str) -> Option<T>) -> ParamResult<T> {
        let raw = self.get(key)?;
        parse(raw).ok_or_else(|| ParamError::format(key, raw, expected))
    }

    fn optional<T>(
        &self,
        key: &str,
        default: T,
        expected: &'static str,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> ParamResult<T> {
        match self.lookup(key) {
            Some(raw) => parse(raw).ok_or_else(|| ParamError::format(key, raw, expected)),
            None => Ok(default),
        }
    }

    /// Read a 32-bit integer. Decimal or `0x`-prefixed hexadecimal.
    ///
    /// # Errors
    ///
    /// [`ParamError::MissingKey`] if absent, [`ParamError::Format`] if the
    /// value is not an integer in range.
    pub fn get_int(&self, key: &str) -> ParamResult<i32> {
        self.required(key, "an integer", parse_int)
    }

    /// Read a 32-bit integer or return `default` if absent.
    ///
    /// # Errors
    ///
    /// [`ParamError::Format`] if the value is present but malformed.
    pub fn get_optional_int(&self, key: &str, default: i32) -> ParamResult<i32> {
        self.optional(key, default, "an integer", parse_int)
    }

    /// Read a 64-bit integer.
    ///
    /// # Errors
    ///
    /// See [`get_int`](Self::get_int).
    pub fn get_long(&self, key: &str) -> ParamResult<i64> {
        self.required(key, "a long integer", parse_integer)
    }

    /// Read a 64-bit integer or return `default` if absent.
    ///
    /// # Errors
    ///
    /// See [`get_optional_int`](Self::get_optional_int).
    pub fn get_optional_long(&self, key: &str, default: i64) -> ParamResult<i64> {
        self.optional(key, default, "a long integer", parse_integer)
    }

    /// Read a floating-point number that spans the whole value.
    ///
    /// # Errors
    ///
    /// See [`get_int`](Self::get_int).
    pub fn get_double(&self, key: &str) -> ParamResult<f64> {
        self.required(key, "a double", parse_bare_number)
    }

    /// Read a floating-point number or return `default` if absent.
    ///
    /// # Errors
    ///
    /// See [`get_optional_int`](Self::get_optional_int).
    pub fn get_optional_double(&self, key: &str, default: f64) -> ParamResult<f64> {
        self.optional(key, default, "a double", parse_bare_number)
    }

    /// Read a boolean: exactly `true`/`1` or `false`/`0`.
    ///
    /// # Errors
    ///
    /// See [`get_int`](Self::get_int).
    pub fn get_bool(&self, key: &str) -> ParamResult<bool> {
        self.required(key, "a boolean (true/false/1/0)", parse_bool)
    }

    /// Read a boolean or return `default` if absent.
    ///
    /// # Errors
    ///
    /// See [`get_optional_int`](Self::get_optional_int).
    pub fn get_optional_bool(&self, key: &str, default: bool) -> ParamResult<bool> {
        self.optional(key, default, "a boolean (true/false/1/0)", parse_bool)
    }

    /// Read a time in seconds.
    ///
    /// # Errors
    ///
    /// See [`get_int`](Self::get_int).
    pub fn get_time(&self, key: &str) -> ParamResult<f64> {
        self.required(key, "a time", parse_time)
    }

    /// Read a time in seconds or return `default` if absent.
    ///
    /// # Errors
    ///
    /// See [`get_optional_int`](Self::get_optional_int).
    pub fn get_optional_time(&self, key: &str, default: f64) -> ParamResult<f64> {
        self.optional(key, default, "a time", parse_time)
    }

    /// Read a bandwidth in bytes per second.
    ///
    /// # Errors
    ///
    /// See [`get_int`](Self::get_int).
    pub fn get_bandwidth(&self, key: &str) -> ParamResult<f64> {
        self.required(key, "a bandwidth", parse_bandwidth)
    }

    /// Read a bandwidth in bytes per second or return `default` if absent.
    ///
    /// # Errors
    ///
    /// See [`get_optional_int`](Self::get_optional_int).
    pub fn get_optional_bandwidth(&self, key: &str, default: f64) -> ParamResult<f64> {
        self.optional(key, default, "a bandwidth", parse_bandwidth)
    }

    /// Read a frequency in Hz.
    ///
    /// # Errors
    ///
    /// See [`get_int`](Self::get_int).
    pub fn get_frequency(&self, key: &str) -> ParamResult<f64> {
        self.required(key, "a frequency", parse_frequency)
    }

    /// Read a frequency in Hz or return `default` if absent.
    ///
    /// # Errors
    ///
    /// See [`get_optional_int`](Self::get_optional_int).
    pub fn get_optional_frequency(&self, key: &str, default: f64) -> ParamResult<f64> {
        self.optional(key, default, "a frequency", parse_frequency)
    }

    /// Read a byte length, rounded to whole bytes.
    ///
    /// # Errors
    ///
    /// See [`get_int`](Self::get_int).
    pub fn get_byte_length(&self, key: &str) -> ParamResult<i64> {
        self.required(key, "a byte length", parse_bytes)
    }

    /// Read a byte length or return `default` if absent.
    ///
    /// # Errors
    ///
    /// See [`get_optional_int`](Self::get_optional_int).
    pub fn get_optional_byte_length(&self, key: &str, default: i64) -> ParamResult<i64> {
        self.optional(key, default, "a byte length", parse_bytes)
    }

    /// Read any unit-bearing value, normalized to its base unit.
    ///
    /// Grammars are tried in the order of
    /// [`QUANTITY_GRAMMARS`](crate::units::QUANTITY_GRAMMARS); a bare number
    /// is accepted last.
    ///
    /// # Errors
    ///
    /// See [`get_int`](Self::get_int).
    pub fn get_quantity(&self, key: &str) -> ParamResult<f64> {
        self.get_quantity_kind(key).map(|q| q.value)
    }

    /// Read any unit-bearing value or return `default` if absent.
    ///
    /// # Errors
    ///
    /// See [`get_optional_int`](Self::get_optional_int).
    pub fn get_optional_quantity(&self, key: &str, default: f64) -> ParamResult<f64> {
        self.optional(key, default, "a quantity", |raw| parse_quantity(raw).map(|q| q.value))
    }

    /// Read any unit-bearing value along with the grammar that accepted it.
    ///
    /// # Errors
    ///
    /// See [`get_int`](Self::get_int).
    pub fn get_quantity_kind(&self, key: &str) -> ParamResult<Quantity> {
        self.required(key, "a quantity", parse_quantity)
    }

    /// Read a whitespace-separated list of strings.
    ///
    /// # Errors
    ///
    /// [`ParamError::MissingKey`] if absent.
    pub fn get_vector(&self, key: &str) -> ParamResult<Vec<String>> {
        Ok(self.get(key)?.split_whitespace().map(str::to_string).collect())
    }

    /// Read a whitespace-separated list of doubles.
    ///
    /// # Errors
    ///
    /// See [`get_int`](Self::get_int).
    pub fn get_double_vector(&self, key: &str) -> ParamResult<Vec<f64>> {
        self.required(key, "a list of doubles", |raw| parse_list(raw, parse_bare_number))
    }

    /// Read a whitespace-separated list of integers.
    ///
    /// # Errors
    ///
    /// See [`get_int`](Self::get_int).
    pub fn get_int_vector(&self, key: &str) -> ParamResult<Vec<i32>> {
        self.required(key, "a list of integers", |raw| parse_list(raw, parse_int))
    }

    /// Read a whitespace-separated list of 64-bit integers.
    ///
    /// # Errors
    ///
    /// See [`get_int`](Self::get_int).
    pub fn get_long_vector(&self, key: &str) -> ParamResult<Vec<i64>> {
        self.required(key, "a list of long integers", |raw| parse_list(raw, parse_integer))
    }

    /// Alias of [`get`](Self::get).
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub fn deprecated_param(&self, key: &str) -> ParamResult<&'t str> {
        self.get(key)
    }

    /// Alias of [`get`](Self::get).
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub fn reread_param(&self, key: &str) -> ParamResult<&'t str> {
        self.get(key)
    }

    /// Alias of [`get_optional`](Self::get_optional).
    pub fn deprecated_optional_param<'a>(&self, key: &str, default: &'a str) -> &'a str
    where
        't: 'a,
    {
        self.get_optional(key, default)
    }

    /// Alias of [`get_optional`](Self::get_optional).
    pub fn reread_optional_param<'a>(&self, key: &str, default: &'a str) -> &'a str
    where
        't: 'a,
    {
        self.get_optional(key, default)
    }
}

// Forwarding aliases kept for callers written against the older names.
macro_rules! legacy_aliases {
    ($( $canonical:ident, $optional:ident: $ty:ty => $deprecated:ident, $deprecated_opt:ident, $reread:ident, $reread_opt:ident; )*) => {
        impl Scope<'_> {
            $(
                #[doc = concat!("Alias of [`", stringify!($canonical), "`](Self::", stringify!($canonical), ").")]
                ///
                /// # Errors
                ///
                #[doc = concat!("See [`", stringify!($canonical), "`](Self::", stringify!($canonical), ").")]
                pub fn $deprecated(&self, key: &str) -> ParamResult<$ty> {
                    self.$canonical(key)
                }

                #[doc = concat!("Alias of [`", stringify!($optional), "`](Self::", stringify!($optional), ").")]
                ///
                /// # Errors
                ///
                #[doc = concat!("See [`", stringify!($optional), "`](Self::", stringify!($optional), ").")]
                pub fn $deprecated_opt(&self, key: &str, default: $ty) -> ParamResult<$ty> {
                    self.$optional(key, default)
                }

                #[doc = concat!("Alias of [`", stringify!($canonical), "`](Self::", stringify!($canonical), ").")]
                ///
                /// # Errors
                ///
                #[doc = concat!("See [`", stringify!($canonical), "`](Self::", stringify!($canonical), ").")]
                pub fn $reread(&self, key: &str) -> ParamResult<$ty> {
                    self.$canonical(key)
                }

                #[doc = concat!("Alias of [`", stringify!($optional), "`](Self::", stringify!($optional), ").")]
                ///
                /// # Errors
                ///
                #[doc = concat!("See [`", stringify!($optional), "`](Self::", stringify!($optional), ").")]
                pub fn $reread_opt(&self, key: &str, default: $ty) -> ParamResult<$ty> {
                    self.$optional(key, default)
                }
            )*
        }
    };
}

legacy_aliases! {
    get_int, get_optional_int: i32 =>
        deprecated_int_param, deprecated_optional_int_param, reread_int_param, reread_optional_int_param;
    get_long, get_optional_long: i64 =>
        deprecated_long_param, deprecated_optional_long_param, reread_long_param, reread_optional_long_param;
    get_double, get_optional_double: f64 =>
        deprecated_double_param, deprecated_optional_double_param, reread_double_param, reread_optional_double_param;
    get_bool, get_optional_bool: bool =>
        deprecated_bool_param, deprecated_optional_bool_param, reread_bool_param, reread_optional_bool_param;
    get_time, get_optional_time: f64 =>
        deprecated_time_param, deprecated_optional_time_param, reread_time_param, reread_optional_time_param;
    get_bandwidth, get_optional_bandwidth: f64 =>
        deprecated_bandwidth_param, deprecated_optional_bandwidth_param, reread_bandwidth_param, reread_optional_bandwidth_param;
    get_frequency, get_optional_frequency: f64 =>
        deprecated_freq_param, deprecated_optional_freq_param, reread_freq_param, reread_optional_freq_param;
    get_byte_length, get_optional_byte_length: i64 =>
        deprecated_byte_length_param, deprecated_optional_byte_length_param, reread_byte_length_param, reread_optional_byte_length_param;
    get_quantity, get_optional_quantity: f64 =>
        deprecated_quantity, deprecated_optional_quantity, reread_quantity, reread_optional_quantity;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ParamTree;
    use crate::units::QuantityKind;

    fn tree(pairs: &[(&str, &str)]) -> ParamTree {
        ParamTree::from_pairs(pairs.iter().copied()).unwrap()
    }

    #[test]
    fn test_integers() {
        let t = tree(&[("a", "42"), ("h", "0x1F"), ("n", "-7"), ("big", "5000000000"), ("bad", "12abc")]);
        let root = t.root();

        assert_eq!(root.get_int("a").unwrap(), 42);
        assert_eq!(root.get_int("h").unwrap(), 31);
        assert_eq!(root.get_int("n").unwrap(), -7);
        assert!(matches!(root.get_int("big"), Err(ParamError::Format { .. })));
        assert_eq!(root.get_long("big").unwrap(), 5_000_000_000);
        assert!(matches!(root.get_int("bad"), Err(ParamError::Format { .. })));
        assert!(matches!(root.get_int("missing"), Err(ParamError::MissingKey { .. })));
    }

    #[test]
    fn test_optional_returns_default_only_when_absent() {
        let t = tree(&[("bad", "x")]);
        let root = t.root();

        assert_eq!(root.get_optional_int("missing", 9).unwrap(), 9);
        assert!(matches!(root.get_optional_int("bad", 9), Err(ParamError::Format { .. })));
    }

    #[test]
    fn test_optional_follows_parents() {
        let t = tree(&[("cores", "4"), ("node.x", "1")]);
        let node = t.root().namespace("node").unwrap();
        assert_eq!(node.get_optional_int("cores", 1).unwrap(), 4);
    }

    #[test]
    fn test_doubles_must_span_value() {
        let t = tree(&[("d", "2.5"), ("bad", "2.5 ns")]);
        assert!((t.root().get_double("d").unwrap() - 2.5).abs() < f64::EPSILON);
        let err = t.root().get_double("bad").unwrap_err();
        assert!(matches!(err, ParamError::Format { ref value, .. } if value == "2.5 ns"));
    }

    #[test]
    fn test_bool_strictness() {
        let t = tree(&[("a", "true"), ("b", "1"), ("c", "false"), ("d", "0"), ("e", "yes")]);
        let root = t.root();
        assert!(root.get_bool("a").unwrap());
        assert!(root.get_bool("b").unwrap());
        assert!(!root.get_bool("c").unwrap());
        assert!(!root.get_bool("d").unwrap());
        assert!(matches!(root.get_bool("e"), Err(ParamError::Format { .. })));
    }

    #[test]
    fn test_units() {
        let t = tree(&[("t", "10ns"), ("bw", "10GB/s"), ("f", "2GHz"), ("m", "16KiB"), ("bad", "10")]);
        let root = t.root();
        assert!((root.get_time("t").unwrap() - 10e-9).abs() < 1e-20);
        assert!((root.get_bandwidth("bw").unwrap() - 10e9).abs() < 1.0);
        assert!((root.get_frequency("f").unwrap() - 2e9).abs() < 1.0);
        assert_eq!(root.get_byte_length("m").unwrap(), 16384);
        assert!(matches!(root.get_time("bad"), Err(ParamError::Format { .. })));
        assert!((root.get_optional_time("missing", 1.0).unwrap() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_quantity_prefers_units_over_bare_number() {
        let t = tree(&[("t", "5ns"), ("bare", "5"), ("bad", "5 parsecs")]);
        let root = t.root();

        let q = root.get_quantity_kind("t").unwrap();
        assert_eq!(q.kind, QuantityKind::Time);
        assert!((q.value - 5e-9).abs() < 1e-20);

        assert_eq!(root.get_quantity_kind("bare").unwrap().kind, QuantityKind::Dimensionless);
        assert!(matches!(root.get_quantity("bad"), Err(ParamError::Format { .. })));
    }

    #[test]
    fn test_vectors_drop_empty_tokens() {
        let t = tree(&[("s", "a  b   c"), ("d", "1.5   2"), ("i", "1 2  3"), ("bad", "1 x")]);
        let root = t.root();
        assert_eq!(root.get_vector("s").unwrap(), vec!["a", "b", "c"]);
        assert_eq!(root.get_double_vector("d").unwrap(), vec![1.5, 2.0]);
        assert_eq!(root.get_int_vector("i").unwrap(), vec![1, 2, 3]);
        assert_eq!(root.get_long_vector("i").unwrap(), vec![1, 2, 3]);
        assert!(matches!(root.get_int_vector("bad"), Err(ParamError::Format { .. })));
    }

    #[test]
    fn test_legacy_aliases_forward() {
        let t = tree(&[("n", "3"), ("flag", "1"), ("bw", "1GB/s")]);
        let root = t.root();
        assert_eq!(root.deprecated_int_param("n").unwrap(), root.get_int("n").unwrap());
        assert_eq!(root.reread_optional_int_param("missing", 5).unwrap(), 5);
        assert!(root.reread_bool_param("flag").unwrap());
        assert_eq!(root.deprecated_param("n").unwrap(), "3");
        assert_eq!(root.reread_optional_param("missing", "x"), "x");
        assert!(
            (root.deprecated_bandwidth_param("bw").unwrap() - root.get_bandwidth("bw").unwrap()).abs() < f64::EPSILON
        );
    }

    #[test]
    fn test_parse_integer_rejects_double_sign() {
        assert_eq!(parse_integer("--1"), None);
        assert_eq!(parse_integer("+-1"), None);
        assert_eq!(parse_integer("+12"), Some(12));
        assert_eq!(parse_integer("-0x10"), Some(-16));
    }
}
