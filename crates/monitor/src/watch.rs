use std::collections::{BTreeMap, HashMap};

use faultline_types::{
    Agreement, ConsistencyVerdict, Height, NodeName, SyncSnapshot, aliases::BlockHash,
};

/// Something a later read contradicted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Anomaly {
    /// A node reported a lower height than it did before.
    HeightRegressed { node: NodeName, previous: Height, current: Height },
    /// The hash at an already agreed height changed.
    HashChanged { node: NodeName, height: Height, agreed: BlockHash, reported: BlockHash },
}

/// Remembers what the cluster already agreed on, and flags regressions.
///
/// Flags are informational. Synchronization and consistency results are not altered.
#[derive(Debug, Default)]
pub struct ChainWatch {
    max_heights: HashMap<NodeName, Height>,
    agreed_hashes: BTreeMap<Height, BlockHash>,
}

impl ChainWatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe_snapshot(&mut self, snapshot: &SyncSnapshot) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();
        for (node, height) in snapshot.available() {
            match self.max_heights.get_mut(node) {
                Some(max) if height < *max => anomalies.push(Anomaly::HeightRegressed {
                    node: node.clone(),
                    previous: *max,
                    current: height,
                }),
                Some(max) => *max = height,
                None => {
                    self.max_heights.insert(node.clone(), height);
                }
            }
        }
        anomalies
    }

    /// Checks `verdict` against earlier agreement. Only a verdict where at least two nodes
    /// agreed becomes the reference for its height; a lone node may be on a fork.
    pub fn observe_verdict(&mut self, verdict: &ConsistencyVerdict) -> Vec<Anomaly> {
        let Some(agreed) = self.agreed_hashes.get(&verdict.height).copied() else {
            if matches!(verdict.agreement, Agreement::Agreed { .. }) &&
                let Some((_, hash)) = verdict.hashes.first()
            {
                self.agreed_hashes.insert(verdict.height, *hash);
            }
            return Vec::new();
        };

        verdict
            .hashes
            .iter()
            .filter(|(_, hash)| *hash != agreed)
            .map(|(node, hash)| Anomaly::HashChanged {
                node: node.clone(),
                height: verdict.height,
                agreed,
                reported: *hash,
            })
            .collect()
    }

    pub fn agreed_hash(&self, height: Height) -> Option<BlockHash> {
        self.agreed_hashes.get(&height).copied()
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::B256;
    use faultline_types::HeightReading;

    use super::*;

    #[test]
    fn height_regression_is_flagged_once_per_observation() {
        let mut watch = ChainWatch::new();
        let first = SyncSnapshot::new().with("node1", HeightReading::Available(Height::new(10)));
        let second = SyncSnapshot::new().with("node1", HeightReading::Available(Height::new(8)));

        assert!(watch.observe_snapshot(&first).is_empty());
        assert_eq!(
            watch.observe_snapshot(&second),
            vec![Anomaly::HeightRegressed {
                node: "node1".into(),
                previous: Height::new(10),
                current: Height::new(8),
            }]
        );
    }

    #[test]
    fn offline_readings_are_not_regressions() {
        let mut watch = ChainWatch::new();
        watch.observe_snapshot(
            &SyncSnapshot::new().with("node3", HeightReading::Available(Height::new(10))),
        );
        let offline = SyncSnapshot::new().with("node3", HeightReading::Unavailable);
        assert!(watch.observe_snapshot(&offline).is_empty());
    }

    #[test]
    fn changed_hash_at_agreed_height_is_flagged() {
        let mut watch = ChainWatch::new();
        let height = Height::new(42);
        let agreed = ConsistencyVerdict::evaluate(
            height,
            vec![("node1".into(), B256::repeat_byte(1)), ("node2".into(), B256::repeat_byte(1))],
            vec![],
        );
        assert!(watch.observe_verdict(&agreed).is_empty());
        assert_eq!(watch.agreed_hash(height), Some(B256::repeat_byte(1)));

        let later = ConsistencyVerdict::evaluate(
            height,
            vec![("node3".into(), B256::repeat_byte(9))],
            vec![],
        );
        let anomalies = watch.observe_verdict(&later);
        assert_eq!(anomalies.len(), 1);
        assert!(matches!(
            &anomalies[0],
            Anomaly::HashChanged { node, .. } if node.as_str() == "node3"
        ));
    }

    #[test]
    fn lone_hash_is_never_taken_as_agreement() {
        let mut watch = ChainWatch::new();
        let height = Height::new(42);
        let forked = ConsistencyVerdict::evaluate(
            height,
            vec![("node3".into(), B256::repeat_byte(9))],
            vec![],
        );
        assert!(watch.observe_verdict(&forked).is_empty());
        assert_eq!(watch.agreed_hash(height), None);

        let honest = ConsistencyVerdict::evaluate(
            height,
            vec![("node1".into(), B256::repeat_byte(1)), ("node2".into(), B256::repeat_byte(1))],
            vec![],
        );
        assert!(watch.observe_verdict(&honest).is_empty());
        assert_eq!(watch.agreed_hash(height), Some(B256::repeat_byte(1)));
    }
}
