//! Synthetic dispatch-marker names.
//!
//! Markers become capture-group names inside the combined matcher, which
//! restricts them to `[A-Za-z_][A-Za-z0-9_]*`. Rules whose identifier does
//! not fit (integer ids, names with punctuation or non-ASCII characters)
//! get an alias from an [`OrderedGenerator`] instead.

use rustc_hash::FxHashSet;

/// Default prefix of generated aliases.
pub const DEFAULT_ALIAS_PREFIX: &str = "A";

/// Whether `name` can be used verbatim as a dispatch marker.
pub fn is_valid_marker(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() || first == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Generates `A0`, `A1`, … skipping names that are already taken.
///
/// The counter belongs to the generator, so two compilations never share
/// state.
#[derive(Debug)]
pub struct OrderedGenerator {
    prefix: String,
    next: u32,
}

impl Default for OrderedGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ALIAS_PREFIX)
    }
}

impl OrderedGenerator {
    /// `prefix` must itself start with a letter or underscore.
    pub fn new(prefix: impl Into<String>) -> Self {
        OrderedGenerator {
            prefix: prefix.into(),
            next: 0,
        }
    }

    /// Produce a fresh alias not contained in `taken`.
    pub fn generate(&mut self, taken: &FxHashSet<String>) -> String {
        loop {
            let alias = format!("{}{}", self.prefix, self.next);
            self.next += 1;
            if !taken.contains(&alias) {
                return alias;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_validity() {
        assert!(is_valid_marker("T_NUMBER"));
        assert!(is_valid_marker("_x1"));
        assert!(!is_valid_marker(""));
        assert!(!is_valid_marker("1abc"));
        assert!(!is_valid_marker("T-DASH"));
        assert!(!is_valid_marker("=>"));
        assert!(!is_valid_marker("näme"));
    }

    #[test]
    fn generates_in_order() {
        let mut generator = OrderedGenerator::default();
        let taken = FxHashSet::default();
        assert_eq!(generator.generate(&taken), "A0");
        assert_eq!(generator.generate(&taken), "A1");
    }

    #[test]
    fn skips_taken_names() {
        let mut generator = OrderedGenerator::default();
        let taken: FxHashSet<String> = ["A0", "A2"].iter().map(|s| (*s).to_owned()).collect();
        assert_eq!(generator.generate(&taken), "A1");
        assert_eq!(generator.generate(&taken), "A3");
    }

    #[test]
    fn generators_do_not_share_counters() {
        let taken = FxHashSet::default();
        let mut first = OrderedGenerator::new("X");
        let mut second = OrderedGenerator::new("X");
        assert_eq!(first.generate(&taken), "X0");
        assert_eq!(second.generate(&taken), "X0");
    }
}
