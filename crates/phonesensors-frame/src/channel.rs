use std::fmt;

use serde::Serialize;

use crate::sensor::SensorKind;

/// Width of a vector sample.
pub const VECTOR_DIMS: usize = 3;

/// Number of values shown in a channel summary.
const PREVIEW_LEN: usize = 2;

/// One sample value: a scalar or a fixed-width vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reading {
    Scalar(f64),
    Vector([f64; VECTOR_DIMS]),
}

impl Reading {
    /// Number of columns this reading occupies.
    pub fn dims(&self) -> usize {
        match self {
            Reading::Scalar(_) => 1,
            Reading::Vector(v) => v.len(),
        }
    }

    /// The reading's columns.
    pub fn as_slice(&self) -> &[f64] {
        match self {
            Reading::Scalar(v) => std::slice::from_ref(v),
            Reading::Vector(v) => v,
        }
    }
}

impl From<f64> for Reading {
    fn from(value: f64) -> Self {
        Reading::Scalar(value)
    }
}

impl From<[f64; VECTOR_DIMS]> for Reading {
    fn from(value: [f64; VECTOR_DIMS]) -> Self {
        Reading::Vector(value)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Scalar(v) => write!(f, "{v}"),
            Reading::Vector([x, y, z]) => write!(f, "[{x}, {y}, {z}]"),
        }
    }
}

/// Columnar time series for a single sensor kind.
///
/// Values and timestamps are parallel sequences of equal length; row `i` of
/// both describes the same sample. A freshly created channel has every row
/// unset. After [`compact`](Self::compact) only rows with a value remain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorChannel {
    source: SensorKind,
    values: Vec<Option<Reading>>,
    timestamps: Vec<Option<f64>>,
}

impl SensorChannel {
    /// Allocate `capacity` unset rows for `source`.
    ///
    /// The row width is the kind's dimensionality.
    pub fn new(capacity: usize, source: SensorKind) -> Self {
        Self {
            source,
            values: vec![None; capacity],
            timestamps: vec![None; capacity],
        }
    }

    /// Overwrite row `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range, if `value` does not have this
    /// channel's width, or if `value` holds a non-finite number.
    pub fn set(&mut self, value: Option<Reading>, timestamp: Option<f64>, index: usize) {
        assert!(
            index < self.values.len(),
            "row {index} out of range for {} channel with {} rows",
            self.source,
            self.values.len()
        );
        if let Some(reading) = &value {
            assert_eq!(
                reading.dims(),
                self.dims(),
                "{} expects {}-column samples",
                self.source,
                self.dims()
            );
            assert!(
                reading.as_slice().iter().all(|v| v.is_finite()),
                "{} samples must be finite, got {reading}",
                self.source
            );
        }
        self.values[index] = value;
        self.timestamps[index] = timestamp;
    }

    /// Drop every row without a value.
    ///
    /// Timestamps stay aligned with their values. Running it again changes
    /// nothing.
    pub fn compact(&mut self) {
        let (values, timestamps): (Vec<_>, Vec<_>) = self
            .values
            .drain(..)
            .zip(self.timestamps.drain(..))
            .filter(|(value, _)| value.is_some())
            .unzip();
        self.values = values;
        self.timestamps = timestamps;
    }

    /// Append the rows of another channel of the same kind.
    ///
    /// # Panics
    ///
    /// Panics if `other` holds a different sensor kind.
    pub fn append(&mut self, mut other: SensorChannel) {
        assert_eq!(
            self.source, other.source,
            "cannot append {} rows to a {} channel",
            other.source, self.source
        );
        self.values.append(&mut other.values);
        self.timestamps.append(&mut other.timestamps);
    }

    /// The sensor kind this channel holds.
    pub fn source(&self) -> SensorKind {
        self.source
    }

    /// Columns per sample.
    pub fn dims(&self) -> usize {
        self.source.dims()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the channel has no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Option<Reading>] {
        &self.values
    }

    pub fn timestamps(&self) -> &[Option<f64>] {
        &self.timestamps
    }

    /// True when there is at least one row and every row carries a timestamp.
    pub fn has_timestamps(&self) -> bool {
        !self.is_empty()
            && self.timestamps.len() == self.values.len()
            && self.timestamps.iter().all(Option::is_some)
    }

    /// Iterate over `(value, timestamp)` rows.
    pub fn iter(&self) -> impl Iterator<Item = (Option<Reading>, Option<f64>)> + '_ {
        self.values
            .iter()
            .copied()
            .zip(self.timestamps.iter().copied())
    }
}

impl fmt::Display for SensorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "{} - empty", self.source);
        }

        let ts = if self.has_timestamps() {
            "with timestamps"
        } else {
            "without timestamps"
        };
        write!(f, "{} - {} element(s) {ts} - [", self.source, self.len())?;
        for (i, value) in self.values.iter().take(PREVIEW_LEN).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match value {
                Some(reading) => write!(f, "{reading}")?,
                None => f.write_str("-")?,
            }
        }
        if self.len() > PREVIEW_LEN {
            f.write_str(", ...")?;
        }
        f.write_str("]")
    }
}
