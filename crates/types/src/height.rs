use core::fmt;

use serde::{Deserialize, Serialize};

/// Position of a block in a node's canonical chain, starting at 0.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Height(u64);

impl Height {
    pub const ZERO: Self = Self(0);

    pub const fn new(height: u64) -> Self {
        Self(height)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    pub const fn increment(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Signed number of blocks between `earlier` and `self`.
    ///
    /// Negative only when a node went backwards, which callers treat as an anomaly.
    pub fn delta_since(&self, earlier: Height) -> i128 {
        i128::from(self.0) - i128::from(earlier.0)
    }
}

impl From<u64> for Height {
    fn from(height: u64) -> Self {
        Self(height)
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Height({})", self.0)
    }
}
