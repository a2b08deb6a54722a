use core::fmt;

use serde::{Deserialize, Serialize};

use crate::{aliases::BlockHash, height::Height, node::NodeName};

/// How the fetched hashes relate to each other.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Agreement {
    /// At most one node could be compared. Consistent by convention only.
    Degenerate { compared: usize },
    /// Two or more nodes reported the same hash.
    Agreed { compared: usize },
    /// At least two nodes reported different hashes.
    Diverged,
}

/// Why a node took no part in a hash comparison.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Exclusion {
    Offline,
    /// The node answered but has not reached the requested height.
    BlockNotFound,
    /// The node was online but the block fetch failed.
    Failed(String),
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offline => f.write_str("OFFLINE"),
            Self::BlockNotFound => f.write_str("Block not found"),
            Self::Failed(reason) => write!(f, "Failed to get block: {reason}"),
        }
    }
}

/// Outcome of comparing the block hashes reported for one height.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyVerdict {
    pub height: Height,
    /// Hashes used to reach the verdict, in registry order.
    pub hashes: Vec<(NodeName, BlockHash)>,
    pub excluded: Vec<(NodeName, Exclusion)>,
    pub agreement: Agreement,
}

impl ConsistencyVerdict {
    pub fn evaluate(
        height: Height,
        hashes: Vec<(NodeName, BlockHash)>,
        excluded: Vec<(NodeName, Exclusion)>,
    ) -> Self {
        let compared = hashes.len();
        let agreement = match hashes.split_first() {
            Some(((_, reference), rest)) if rest.iter().any(|(_, h)| h != reference) => {
                Agreement::Diverged
            }
            _ if compared < 2 => Agreement::Degenerate { compared },
            _ => Agreement::Agreed { compared },
        };
        Self { height, hashes, excluded, agreement }
    }

    /// `true` unless two compared nodes disagree. Degenerate verdicts count as consistent.
    pub fn is_consistent(&self) -> bool {
        !matches!(self.agreement, Agreement::Diverged)
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self.agreement, Agreement::Degenerate { .. })
    }

    pub fn hash_of(&self, name: &NodeName) -> Option<BlockHash> {
        self.hashes.iter().find(|(n, _)| n == name).map(|(_, h)| *h)
    }
}

impl fmt::Display for ConsistencyVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.agreement {
            Agreement::Agreed { compared } => {
                write!(f, "block #{} consistent across {compared} nodes", self.height)
            }
            Agreement::Degenerate { compared: 0 } => {
                write!(f, "block #{}: no node could be compared", self.height)
            }
            Agreement::Degenerate { .. } => {
                write!(f, "block #{}: only one node could be compared", self.height)
            }
            Agreement::Diverged => write!(f, "block #{}: hash inconsistency detected", self.height),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::B256;

    use super::*;

    fn hash(byte: u8) -> BlockHash {
        B256::repeat_byte(byte)
    }

    #[test]
    fn zero_and_one_node_are_degenerate_successes() {
        let empty = ConsistencyVerdict::evaluate(Height::new(7), vec![], vec![]);
        assert_eq!(empty.agreement, Agreement::Degenerate { compared: 0 });
        assert!(empty.is_consistent());

        let single = ConsistencyVerdict::evaluate(
            Height::new(7),
            vec![("node1".into(), hash(1))],
            vec![("node3".into(), Exclusion::Offline)],
        );
        assert_eq!(single.agreement, Agreement::Degenerate { compared: 1 });
        assert!(single.is_consistent());
    }

    #[test]
    fn any_disagreement_diverges() {
        let verdict = ConsistencyVerdict::evaluate(
            Height::new(7),
            vec![("node1".into(), hash(1)), ("node2".into(), hash(1)), ("node3".into(), hash(2))],
            vec![],
        );
        assert_eq!(verdict.agreement, Agreement::Diverged);
        assert!(!verdict.is_consistent());
    }

    #[test]
    fn matching_hashes_agree() {
        let verdict = ConsistencyVerdict::evaluate(
            Height::new(7),
            vec![("node1".into(), hash(3)), ("node2".into(), hash(3))],
            vec![],
        );
        assert_eq!(verdict.agreement, Agreement::Agreed { compared: 2 });
        assert!(!verdict.is_degenerate());
    }
}
