//! Identifier generation
//!
//! The core requires unique, monotonically distinct identifiers for new
//! records. The source is an injected capability so tests and alternative
//! deployments can supply their own scheme.

use std::collections::HashMap;

/// Source of unique, monotonically distinct identifiers
///
/// `prefix` encodes the entity kind (`I` items, `O` orders, `TR` payments,
/// `B`/`T`/`S` vehicles by type).
pub trait IdSource {
    /// Produce the next identifier for the given prefix
    fn next(&mut self, prefix: &str) -> String;

    /// Record an externally created identifier so future ids never collide
    /// with it
    fn observe(&mut self, id: &str);
}

/// Default id source: per-prefix monotonic counter, `O1001`-style
#[derive(Debug, Default)]
pub struct SequentialIds {
    counters: HashMap<String, u64>,
}

const FIRST_ID: u64 = 1001;

impl SequentialIds {
    /// Create a fresh source
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for SequentialIds {
    fn next(&mut self, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_string()).or_insert(FIRST_ID);
        let id = format!("{}{}", prefix, counter);
        *counter += 1;
        id
    }

    fn observe(&mut self, id: &str) {
        let split = id
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(id.len());
        let (prefix, digits) = id.split_at(split);

        if let Ok(n) = digits.parse::<u64>() {
            let counter = self.counters.entry(prefix.to_string()).or_insert(FIRST_ID);
            if n >= *counter {
                *counter = n + 1;
            }
        }
    }
}
