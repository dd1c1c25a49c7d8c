//! Unit-suffixed value grammars.
//!
//! Each grammar is a pure function from text to a value normalized to its
//! base unit, or `None` when the text is not in that grammar:
//!
//! | Grammar | Base unit | Suffixes |
//! |---------|-----------|----------|
//! | [`parse_time`] | seconds | `ps`, `ns`, `us`, `ms`, `s`, `sec`, `secs` |
//! | [`parse_bandwidth`] | bytes/s | `B/s`, `KB/s` … `TB/s`, `KiB/s` … `TiB/s`, `bytes/sec`, `bps` … `Tbps`, `b/s` … `Tb/s` |
//! | [`parse_frequency`] | Hz | `Hz`, `KHz`, `kHz`, `MHz`, `GHz` |
//! | [`parse_byte_length`] | bytes | `B`, `KB` … `TB`, `KiB` … `TiB` |
//!
//! Suffixes are case-sensitive and a bare number matches none of them.
//!
//! [`parse_quantity`] tries the grammars in the fixed order of
//! [`QUANTITY_GRAMMARS`] and falls back to a bare number.

use std::fmt;

const TIME_UNITS: &[(&str, f64)] = &[
    ("ps", 1e-12),
    ("ns", 1e-9),
    ("us", 1e-6),
    ("ms", 1e-3),
    ("s", 1.0),
    ("sec", 1.0),
    ("secs", 1.0),
];

const BANDWIDTH_UNITS: &[(&str, f64)] = &[
    ("B/s", 1.0),
    ("bytes/sec", 1.0),
    ("KB/s", 1e3),
    ("MB/s", 1e6),
    ("GB/s", 1e9),
    ("TB/s", 1e12),
    ("KiB/s", 1024.0),
    ("MiB/s", 1_048_576.0),
    ("GiB/s", 1_073_741_824.0),
    ("TiB/s", 1_099_511_627_776.0),
    ("bps", 0.125),
    ("Kbps", 125.0),
    ("Mbps", 125e3),
    ("Gbps", 125e6),
    ("Tbps", 125e9),
    ("b/s", 0.125),
    ("Kb/s", 125.0),
    ("Mb/s", 125e3),
    ("Gb/s", 125e6),
    ("Tb/s", 125e9),
];

const FREQUENCY_UNITS: &[(&str, f64)] = &[
    ("Hz", 1.0),
    ("KHz", 1e3),
    ("kHz", 1e3),
    ("MHz", 1e6),
    ("GHz", 1e9),
];

const BYTE_UNITS: &[(&str, f64)] = &[
    ("B", 1.0),
    ("KB", 1e3),
    ("MB", 1e6),
    ("GB", 1e9),
    ("TB", 1e12),
    ("KiB", 1024.0),
    ("MiB", 1_048_576.0),
    ("GiB", 1_073_741_824.0),
    ("TiB", 1_099_511_627_776.0),
];

/// A grammar turning unit-suffixed text into a base-unit value.
pub type UnitGrammar = fn(&str) -> Option<f64>;

/// What a quantity measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantityKind {
    /// Seconds.
    Time,
    /// Bytes per second.
    Bandwidth,
    /// Hertz.
    Frequency,
    /// Bytes.
    ByteLength,
    /// A bare number without units.
    Dimensionless,
}

impl fmt::Display for QuantityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Time => "time",
            Self::Bandwidth => "bandwidth",
            Self::Frequency => "frequency",
            Self::ByteLength => "byte length",
            Self::Dimensionless => "dimensionless",
        };
        f.write_str(name)
    }
}

/// A value normalized to the base unit of its kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity {
    /// The grammar that accepted the text.
    pub kind: QuantityKind,
    /// The normalized value.
    pub value: f64,
}

/// The grammars [`parse_quantity`] tries, in order. The first match wins.
pub const QUANTITY_GRAMMARS: [(QuantityKind, UnitGrammar); 4] = [
    (QuantityKind::Time, parse_time),
    (QuantityKind::Bandwidth, parse_bandwidth),
    (QuantityKind::Frequency, parse_frequency),
    (QuantityKind::ByteLength, parse_byte_length),
];

/// Parse a time such as `10ns` into seconds.
pub fn parse_time(text: &str) -> Option<f64> {
    parse_with_units(text, TIME_UNITS)
}

/// Parse a bandwidth such as `10GB/s` or `40Gbps` into bytes per second.
pub fn parse_bandwidth(text: &str) -> Option<f64> {
    parse_with_units(text, BANDWIDTH_UNITS)
}

/// Parse a frequency such as `2.1GHz` into Hz.
pub fn parse_frequency(text: &str) -> Option<f64> {
    parse_with_units(text, FREQUENCY_UNITS)
}

/// Parse a byte length such as `16KiB` into bytes.
pub fn parse_byte_length(text: &str) -> Option<f64> {
    parse_with_units(text, BYTE_UNITS)
}

/// Parse a number that spans the whole (trimmed) text.
pub fn parse_bare_number(text: &str) -> Option<f64> {
    text.trim().parse().ok()
}

/// Parse any unit-bearing value, falling back to a bare number.
pub fn parse_quantity(text: &str) -> Option<Quantity> {
    QUANTITY_GRAMMARS
        .iter()
        .find_map(|(kind, grammar)| grammar(text).map(|value| Quantity { kind: *kind, value }))
        .or_else(|| {
            parse_bare_number(text).map(|value| Quantity {
                kind: QuantityKind::Dimensionless,
                value,
            })
        })
}

fn parse_with_units(text: &str, units: &[(&str, f64)]) -> Option<f64> {
    let (number, suffix) = split_number(text.trim())?;
    units
        .iter()
        .find(|(unit, _)| *unit == suffix)
        .map(|(_, scale)| number * scale)
}

// Split a leading decimal number from its (trimmed) unit suffix.
fn split_number(text: &str) -> Option<(f64, &str)> {
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        end += 1;
        let frac_start = end;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
        digits += end - frac_start;
    }

    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    let number = text[..end].parse().ok()?;
    Some((number, text[end..].trim_start()))
}
