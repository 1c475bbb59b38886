//! Ordered key index with exact, prefix and anchored-regex lookup.
//!
//! Keys are kept in one sorted array (code-point order, which is byte order for
//! UTF-8), each mapped to the locations of every record carrying that key.
//!
//! # Lookup
//!
//! ```text
//! get("犬小")   index: [犬 → A] [犬小屋 → B] [猫 → C]
//!   1. binary search "犬小"         → absent, insertion point 1
//!   2. shorter: "犬" present        → A
//!   3. longer: scan from 1 while key starts with "犬小" → ["犬小屋"]
//! ```
//!
//! # Performance
//!
//! | Operation | Cost |
//! |-----------|------|
//! | exact | O(log n) |
//! | shorter | O(k log n), k = query length in characters |
//! | longer | O(log n + m), m = matches |
//! | regex | O(n), explicit opt-in |

use crate::types::{LexiconError, Location, Result};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

/// Result of an exact/prefix lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrefixMatch {
    /// Locations of the query key, if present
    pub exact: Option<Vec<Location>>,
    /// Locations of the longest present proper prefix, when the query is absent
    pub shorter: Option<Vec<Location>>,
    /// Present keys extending the query, ascending, query itself excluded
    pub longer: Vec<String>,
}

/// Sorted key → locations index.
#[derive(Debug, Clone, Default)]
pub struct OrderedKeyIndex {
    entries: Vec<(String, Vec<Location>)>,
}

impl OrderedKeyIndex {
    /// Build the index from an unordered key map.
    ///
    /// Location lists keep their insertion order.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let mut keys = HashMap::new();
    /// keys.entry("犬".to_string()).or_default().push(Location::new(0, 120));
    /// let index = OrderedKeyIndex::from_map(keys);
    /// ```
    pub fn from_map(map: HashMap<String, Vec<Location>>) -> Self {
        let mut entries: Vec<_> = map.into_iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        Self { entries }
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index has no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Locations recorded for an exact key.
    pub fn locations(&self, key: &str) -> Option<&[Location]> {
        self.search(key)
            .ok()
            .map(|i| self.entries[i].1.as_slice())
    }

    /// Exact/prefix lookup.
    ///
    /// # Arguments
    ///
    /// * `key` - Query key
    ///
    /// # Returns
    ///
    /// - `exact`: locations of `key` if present
    /// - `shorter`: if `key` is absent, locations of its longest present proper
    ///   prefix (truncating one character at a time)
    /// - `longer`: every present key that starts with `key`, excluding `key`
    ///
    /// An empty key yields an empty result.
    pub fn get(&self, key: &str) -> PrefixMatch {
        let mut result = PrefixMatch::default();
        if key.is_empty() {
            return result;
        }

        let start = match self.search(key) {
            Ok(i) => {
                result.exact = Some(self.entries[i].1.clone());
                i + 1
            }
            Err(insertion) => {
                result.shorter = self.longest_present_prefix(key);
                insertion
            }
        };

        result.longer = self.entries[start..]
            .iter()
            .take_while(|(candidate, _)| candidate.starts_with(key))
            .map(|(candidate, _)| candidate.clone())
            .collect();

        result
    }

    /// Anchored regex lookup over every key.
    ///
    /// The pattern must match at the start of a key; it need not consume it.
    ///
    /// # Errors
    ///
    /// Returns `LexiconError::InvalidInput` if the pattern does not compile
    pub fn regex_search(&self, pattern: &str) -> Result<Vec<String>> {
        let anchored = Regex::new(&format!("^(?:{})", pattern))
            .map_err(|e| LexiconError::invalid_input(format!("invalid pattern {:?}: {}", pattern, e)))?;

        Ok(self
            .keys()
            .filter(|key| anchored.is_match(key))
            .map(str::to_string)
            .collect())
    }

    fn search(&self, key: &str) -> std::result::Result<usize, usize> {
        self.entries
            .binary_search_by(|(candidate, _)| candidate.as_str().cmp(key))
    }

    fn longest_present_prefix(&self, key: &str) -> Option<Vec<Location>> {
        key.char_indices()
            .rev()
            .map(|(boundary, _)| &key[..boundary])
            .filter(|prefix| !prefix.is_empty())
            .find_map(|prefix| self.locations(prefix))
            .map(<[Location]>::to_vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(n: u64) -> Location {
        Location::new(n * 100, 100)
    }

    fn index(keys: &[(&str, u64)]) -> OrderedKeyIndex {
        let mut map: HashMap<String, Vec<Location>> = HashMap::new();
        for (key, n) in keys {
            map.entry(key.to_string()).or_default().push(loc(*n));
        }
        OrderedKeyIndex::from_map(map)
    }

    #[test]
    fn test_exact_with_longer() {
        let idx = index(&[("犬", 0), ("犬小屋", 1)]);
        let result = idx.get("犬");

        assert_eq!(result.exact, Some(vec![loc(0)]));
        assert_eq!(result.shorter, None);
        assert_eq!(result.longer, vec!["犬小屋"]);
    }

    #[test]
    fn test_absent_with_shorter_and_longer() {
        let idx = index(&[("犬", 0), ("犬小屋", 1)]);
        let result = idx.get("犬小");

        assert_eq!(result.exact, None);
        assert_eq!(result.shorter, Some(vec![loc(0)]));
        assert_eq!(result.longer, vec!["犬小屋"]);
    }

    #[test]
    fn test_shorter_picks_longest_prefix() {
        let idx = index(&[("a", 0), ("abc", 1), ("abcd", 2)]);
        let result = idx.get("abcxyz");

        assert_eq!(result.shorter, Some(vec![loc(1)]));
        assert!(result.longer.is_empty());
    }

    #[test]
    fn test_longer_stops_at_first_non_prefix() {
        let idx = index(&[("ab", 0), ("abc", 1), ("abd", 2), ("ac", 3), ("b", 4)]);
        assert_eq!(idx.get("ab").longer, vec!["abc", "abd"]);
        assert_eq!(idx.get("a").longer, vec!["ab", "abc", "abd", "ac"]);
    }

    #[test]
    fn test_empty_key() {
        let idx = index(&[("犬", 0)]);
        assert_eq!(idx.get(""), PrefixMatch::default());
    }

    #[test]
    fn test_nothing_found() {
        let idx = index(&[("犬", 0)]);
        assert_eq!(idx.get("猫"), PrefixMatch::default());
    }

    #[test]
    fn test_shared_key_keeps_all_locations() {
        let idx = index(&[("かける", 0), ("かける", 1), ("かける", 2)]);
        assert_eq!(idx.get("かける").exact, Some(vec![loc(0), loc(1), loc(2)]));
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn test_regex_search_is_anchored() {
        let idx = index(&[("犬", 0), ("子犬", 1), ("犬小屋", 2)]);

        assert_eq!(idx.regex_search("犬").unwrap(), vec!["犬", "犬小屋"]);
        assert_eq!(idx.regex_search(".犬").unwrap(), vec!["子犬"]);
        assert_eq!(idx.regex_search("子|犬小").unwrap(), vec!["子犬", "犬小屋"]);
    }

    #[test]
    fn test_regex_search_invalid_pattern() {
        let idx = index(&[("犬", 0)]);
        assert!(matches!(
            idx.regex_search("(").unwrap_err(),
            LexiconError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_keys_sorted_by_code_point() {
        let idx = index(&[("ん", 0), ("あ", 1), ("ア", 2), ("a", 3)]);
        let keys: Vec<_> = idx.keys().collect();
        assert_eq!(keys, vec!["a", "あ", "ん", "ア"]);
    }
}
