use core::fmt;

use serde::{Deserialize, Serialize};

use crate::{height::Height, node::NodeName};

/// Result of a single liveness probe. Never cached beyond the probe's caller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LivenessStatus {
    Online,
    Offline,
}

impl LivenessStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }
}

impl fmt::Display for LivenessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => f.write_str("ONLINE"),
            Self::Offline => f.write_str("OFFLINE"),
        }
    }
}

/// Height of one node within a [`SyncSnapshot`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeightReading {
    Available(Height),
    /// Offline, or the height fetch failed after a positive probe.
    Unavailable,
}

impl HeightReading {
    pub fn height(&self) -> Option<Height> {
        match self {
            Self::Available(height) => Some(*height),
            Self::Unavailable => None,
        }
    }
}

impl fmt::Display for HeightReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(height) => write!(f, "Block #{height}"),
            Self::Unavailable => f.write_str("OFFLINE"),
        }
    }
}

/// Heights of every registered node, in registry order. Each node is probed once; reads
/// across nodes are not simultaneous.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSnapshot {
    readings: Vec<(NodeName, HeightReading)>,
}

impl SyncSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the reading of `name`, replacing any earlier reading for the same node.
    pub fn record(&mut self, name: NodeName, reading: HeightReading) {
        match self.readings.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = reading,
            None => self.readings.push((name, reading)),
        }
    }

    pub fn with(mut self, name: impl Into<NodeName>, reading: HeightReading) -> Self {
        self.record(name.into(), reading);
        self
    }

    pub fn get(&self, name: &NodeName) -> Option<HeightReading> {
        self.readings.iter().find(|(n, _)| n == name).map(|(_, r)| *r)
    }

    pub fn height_of(&self, name: &NodeName) -> Option<Height> {
        self.get(name).and_then(|r| r.height())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeName, &HeightReading)> {
        self.readings.iter().map(|(n, r)| (n, r))
    }

    /// Heights of the nodes that produced one, in registry order.
    pub fn available(&self) -> impl Iterator<Item = (&NodeName, Height)> {
        self.readings.iter().filter_map(|(n, r)| r.height().map(|h| (n, h)))
    }

    pub fn available_count(&self) -> usize {
        self.available().count()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Greatest available height, if any node reported one.
    pub fn max_height(&self) -> Option<Height> {
        self.available().map(|(_, h)| h).max()
    }
}
