//! In-memory indices built once at startup and read concurrently afterwards.

pub mod ordered;
pub mod parts;
pub mod rank;
pub mod similars;

pub use ordered::{OrderedKeyIndex, PrefixMatch};
pub use parts::{PartsEntry, PartsIndex, MAX_GROUP_DEPTH};
pub use rank::{rank_sorted, NoRanks, RankSource};
pub use similars::SimilarsIndex;
