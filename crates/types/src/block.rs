use serde::{Deserialize, Serialize};

use crate::{aliases::BlockHash, height::Height};

/// The part of a block the harness cares about.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockHeader {
    pub number: Height,
    pub hash: BlockHash,
}
