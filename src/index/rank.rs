//! Frequency ranking shared by the parts and similarity indices.

use crate::types::{Ranked, UNRANKED};
use std::collections::HashMap;

/// Source of character frequency ranks.
///
/// Implemented by the character database; a plain map works for tests and for
/// callers that precompute ranks.
pub trait RankSource {
    /// Frequency rank of a character, `None` if unranked.
    fn rank(&self, literal: &str) -> Option<u32>;
}

/// Rank source that ranks nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRanks;

impl RankSource for NoRanks {
    fn rank(&self, _literal: &str) -> Option<u32> {
        None
    }
}

impl RankSource for HashMap<String, u32> {
    fn rank(&self, literal: &str) -> Option<u32> {
        self.get(literal).copied()
    }
}

impl<T: RankSource + ?Sized> RankSource for &T {
    fn rank(&self, literal: &str) -> Option<u32> {
        (**self).rank(literal)
    }
}

/// Pair literals with their ranks and sort ascending.
///
/// Unranked literals get [`UNRANKED`]. The sort is stable, so equal ranks keep
/// the order the literals were given in.
pub fn rank_sorted<'a, I>(literals: I, ranks: &dyn RankSource) -> Vec<Ranked>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut ranked: Vec<Ranked> = literals
        .into_iter()
        .map(|literal| Ranked {
            literal: literal.to_string(),
            rank: ranks.rank(literal).unwrap_or(UNRANKED),
        })
        .collect();

    ranked.sort_by_key(|r| r.rank);
    ranked
}
