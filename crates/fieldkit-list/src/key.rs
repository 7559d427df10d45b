//! Identity keys for list entries

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a list entry, independent of its position
///
/// Issued by the owning list from a monotonic counter when the entry is
/// inserted; a list never issues the same key twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemKey(u64);

impl ItemKey {
    /// Raw counter value
    #[inline]
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k{}", self.0)
    }
}

/// Issues [`ItemKey`]s for one list
#[derive(Debug, Clone, Default)]
pub(crate) struct KeyIssuer {
    next: u64,
}

impl KeyIssuer {
    pub(crate) fn issue(&mut self) -> ItemKey {
        self.next += 1;
        ItemKey(self.next)
    }
}
