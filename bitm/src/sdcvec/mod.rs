//! Append-only building blocks for variable-length integer codecs: a packed bit buffer
//! and a rank/select bit vector that samples incrementally as bits are appended, rather
//! than being built once from a complete bit vector like [`super::RankSelect101111`].

mod buffer;
mod rankselect;

pub use buffer::BitBuffer;
pub use rankselect::{RankSelectVec, RANK_SAMPLE_BITS, SELECT_SAMPLE_ONES};
