use std::{fmt::Display, str::FromStr};

use thiserror::Error;

/// Largest index a move may name; playlists hold at most 10 000 entries.
pub const MAX_POSITION: usize = 10_000;

/// A single drag-and-drop gesture: take the entry at `src` and put it
/// back so that it ends up at `dst`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub src: usize,
    pub dst: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid move {input:?}: expected \"<src>-<dst>\" with indices up to {max}", max = MAX_POSITION)]
pub struct InvalidMove {
    pub input: String,
}

impl Move {
    pub fn new(src: usize, dst: usize) -> Self {
        Self { src, dst }
    }

    /// Position to pass as `insert_before` to the remote range-move.
    ///
    /// The remote inserts before an entry of the list as it was prior to the
    /// move, so moving forward has to aim one slot past `dst`.
    pub fn insert_before(&self) -> usize {
        if self.dst > self.src {
            self.dst.saturating_add(1)
        } else {
            self.dst
        }
    }

    /// Parses every move of a batch, failing on the first malformed one.
    pub fn parse_batch<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<Move>, InvalidMove> {
        inputs.iter().map(|s| s.as_ref().parse()).collect()
    }
}

impl FromStr for Move {
    type Err = InvalidMove;

    /// parses `"<src>-<dst>"`, the format emitted by the sortable list
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidMove {
            input: s.to_string(),
        };
        let (src, dst) = s.trim().split_once('-').ok_or_else(invalid)?;
        let src = src.parse::<usize>().map_err(|_| invalid())?;
        let dst = dst.parse::<usize>().map_err(|_| invalid())?;
        if src > MAX_POSITION || dst > MAX_POSITION {
            return Err(invalid());
        }
        Ok(Self { src, dst })
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.src, self.dst)
    }
}
