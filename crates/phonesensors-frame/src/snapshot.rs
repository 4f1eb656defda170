use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::channel::SensorChannel;
use crate::sensor::SensorKind;

/// All sensor channels produced from one batch of lines.
///
/// Every [`SensorKind`] has exactly one channel, in [`SensorKind::ALL`] order,
/// whether or not the batch carried samples for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    channels: [SensorChannel; SensorKind::COUNT],
}

impl Snapshot {
    /// Create a snapshot with `n` unset rows in every channel.
    pub fn new(n: usize) -> Self {
        Self {
            channels: SensorKind::ALL.map(|kind| SensorChannel::new(n, kind)),
        }
    }

    /// A snapshot with every channel empty.
    pub fn empty() -> Self {
        Self::new(0)
    }

    /// Compact every channel independently.
    ///
    /// Channels usually end up with different lengths, since a batch row can
    /// carry one sensor and not another.
    pub fn compact(&mut self) {
        for channel in &mut self.channels {
            channel.compact();
        }
    }

    /// Append every channel of `other` onto the matching channel here.
    pub fn append(&mut self, other: Snapshot) {
        for (mine, theirs) in self.channels.iter_mut().zip(other.channels) {
            mine.append(theirs);
        }
    }

    pub fn channel(&self, kind: SensorKind) -> &SensorChannel {
        &self.channels[kind.index()]
    }

    pub fn channel_mut(&mut self, kind: SensorKind) -> &mut SensorChannel {
        &mut self.channels[kind.index()]
    }

    /// Iterate over all channels, empty ones included.
    pub fn iter(&self) -> impl Iterator<Item = &SensorChannel> {
        self.channels.iter()
    }

    /// Iterate over channels that hold at least one row.
    pub fn sources(&self) -> impl Iterator<Item = &SensorChannel> {
        self.channels.iter().filter(|channel| !channel.is_empty())
    }

    /// Returns true if no channel holds a row.
    pub fn is_empty(&self) -> bool {
        self.channels.iter().all(SensorChannel::is_empty)
    }

    /// Total rows across all channels.
    pub fn total_samples(&self) -> usize {
        self.channels.iter().map(SensorChannel::len).sum()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a SensorChannel;
    type IntoIter = std::slice::Iter<'a, SensorChannel>;

    fn into_iter(self) -> Self::IntoIter {
        self.channels.iter()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.sources().count();
        if count == 0 {
            return f.write_str("Empty snapshot.");
        }

        write!(f, "Snapshot with {count} data source(s):")?;
        for channel in self.sources() {
            write!(f, "\n{channel}")?;
        }
        Ok(())
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.channels.len()))?;
        for channel in &self.channels {
            map.serialize_entry(channel.source().name(), channel)?;
        }
        map.end()
    }
}
