//! Names of the counters recorded through the `metrics` facade.
//!
//! Recording is unconditional; without an installed recorder it is a no-op.

/// Parameter files read, includes counted.
pub const FILES_LOADED: &str = "paramtree_files_loaded_total";
/// Input lines processed.
pub const LINES_PARSED: &str = "paramtree_lines_parsed_total";
/// Entries stored.
pub const PARAMETERS_WRITTEN: &str = "paramtree_parameters_written_total";
/// Flattened bytes sent by a broadcast root.
pub const BROADCAST_BYTES: &str = "paramtree_broadcast_bytes_total";

/// Every counter name, in registration order.
pub const ALL: [&str; 4] = [FILES_LOADED, LINES_PARSED, PARAMETERS_WRITTEN, BROADCAST_BYTES];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_names() {
        for name in ALL {
            assert!(name.starts_with("paramtree_"));
            assert!(name.ends_with("_total"));
        }
    }
}
