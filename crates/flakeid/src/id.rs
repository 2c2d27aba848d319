use core::fmt;

use crate::{BitLayout, ConfigError, Result};

/// The node a fixed-layout generator is running on.
///
/// Both IDs are assigned externally (there is no coordination between nodes)
/// and are validated once against a [`BitLayout`]. A `NodeIdentity` can only
/// be obtained through [`NodeIdentity::new`], so a generator holding one never
/// needs to re-check it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeIdentity {
    worker_id: u64,
    datacenter_id: u64,
}

impl NodeIdentity {
    /// Validates a worker/datacenter pair against `layout`.
    ///
    /// The inputs are signed so that values read from configuration can be
    /// rejected as-is instead of wrapping.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::WorkerIdOutOfRange`] or
    /// [`ConfigError::DatacenterIdOutOfRange`] when an ID is negative or larger
    /// than its field allows.
    ///
    /// # Example
    ///
    /// ```
    /// use flakeid::{BitLayout, NodeIdentity};
    ///
    /// assert!(NodeIdentity::new(&BitLayout::CLASSIC, 31, 0).is_ok());
    /// assert!(NodeIdentity::new(&BitLayout::CLASSIC, 32, 0).is_err());
    /// assert!(NodeIdentity::new(&BitLayout::CLASSIC, 0, -1).is_err());
    /// ```
    pub fn new(layout: &BitLayout, worker_id: i64, datacenter_id: i64) -> Result<Self> {
        let max = layout.max_worker_id();
        let worker_id = u64::try_from(worker_id)
            .ok()
            .filter(|id| *id <= max)
            .ok_or(ConfigError::WorkerIdOutOfRange {
                value: worker_id,
                max,
            })?;

        let max = layout.max_datacenter_id();
        let datacenter_id = u64::try_from(datacenter_id)
            .ok()
            .filter(|id| *id <= max)
            .ok_or(ConfigError::DatacenterIdOutOfRange {
                value: datacenter_id,
                max,
            })?;

        Ok(Self {
            worker_id,
            datacenter_id,
        })
    }

    /// Checks that both IDs still fit `layout`.
    ///
    /// An identity validated against a wider layout would otherwise be masked
    /// down on composition and collide with another node's IDs.
    ///
    /// # Errors
    ///
    /// Same as [`NodeIdentity::new`].
    pub fn check(&self, layout: &BitLayout) -> Result<()> {
        let max = layout.max_worker_id();
        if self.worker_id > max {
            return Err(ConfigError::WorkerIdOutOfRange {
                value: i64::try_from(self.worker_id).unwrap_or(i64::MAX),
                max,
            }
            .into());
        }
        let max = layout.max_datacenter_id();
        if self.datacenter_id > max {
            return Err(ConfigError::DatacenterIdOutOfRange {
                value: i64::try_from(self.datacenter_id).unwrap_or(i64::MAX),
                max,
            }
            .into());
        }
        Ok(())
    }

    pub const fn worker_id(&self) -> u64 {
        self.worker_id
    }

    pub const fn datacenter_id(&self) -> u64 {
        self.datacenter_id
    }
}

/// The fields of a fixed-layout Snowflake ID.
///
/// `timestamp` is the delta since the layout's epoch, not an absolute time.
///
/// # Example
///
/// ```
/// use flakeid::{BitLayout, SnowflakeParts};
///
/// let parts = SnowflakeParts {
///     timestamp: 1000,
///     datacenter_id: 3,
///     worker_id: 2,
///     sequence: 1,
/// };
/// let id = parts.compose(&BitLayout::CLASSIC);
/// assert_eq!(SnowflakeParts::decode(id, &BitLayout::CLASSIC), parts);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnowflakeParts {
    pub timestamp: u64,
    pub datacenter_id: u64,
    pub worker_id: u64,
    pub sequence: u64,
}

impl SnowflakeParts {
    /// Packs the fields into a single ID. Each field is masked to its width.
    pub const fn compose(&self, layout: &BitLayout) -> u64 {
        ((self.timestamp & layout.max_timestamp()) << layout.timestamp_shift())
            | ((self.datacenter_id & layout.max_datacenter_id()) << layout.datacenter_shift())
            | ((self.worker_id & layout.max_worker_id()) << layout.worker_shift())
            | (self.sequence & layout.sequence_mask())
    }

    /// Splits an ID issued under `layout` back into its fields.
    pub const fn decode(id: u64, layout: &BitLayout) -> Self {
        Self {
            timestamp: (id >> layout.timestamp_shift()) & layout.max_timestamp(),
            datacenter_id: (id >> layout.datacenter_shift()) & layout.max_datacenter_id(),
            worker_id: (id >> layout.worker_shift()) & layout.max_worker_id(),
            sequence: id & layout.sequence_mask(),
        }
    }

    /// The absolute issue time in milliseconds since the Unix epoch.
    pub const fn unix_millis(&self, layout: &BitLayout) -> u64 {
        self.timestamp + layout.epoch_ms()
    }
}

impl fmt::Display for SnowflakeParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ts={} dc={} worker={} seq={}",
            self.timestamp, self.datacenter_id, self.worker_id, self.sequence
        )
    }
}

/// Number of binary digits needed to write `value`.
///
/// Zero is written as the single digit `0`, so its length is 1 rather than 0.
/// The compact packing depends on this: a zero time delta still reserves one
/// low bit below the sequence.
pub const fn bit_length(value: u64) -> u32 {
    if value == 0 {
        1
    } else {
        u64::BITS - value.leading_zeros()
    }
}

/// The fields packed into a compact sequence.
///
/// Unlike [`SnowflakeParts`], the split point is not static: the sequence sits
/// directly above the time delta, shifted by the time delta's own
/// [`bit_length`]. As time passes the delta gains bits and the sequence moves
/// up with it, so the split must be recomputed for every value.
///
/// ```text
///  raw = sequence << bit_length(time_delta) | time_delta
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompactParts {
    pub sequence: u64,
    pub time_delta: u64,
}

impl CompactParts {
    /// Packs the fields, or returns `None` if the sequence does not fit in the
    /// bits left above the time delta.
    pub const fn pack(&self) -> Option<u64> {
        let shift = bit_length(self.time_delta);
        if shift >= u64::BITS || self.sequence > (u64::MAX >> shift) {
            return None;
        }
        Some((self.sequence << shift) | self.time_delta)
    }

    /// Splits a packed value whose time delta is `delta_bits` wide.
    ///
    /// The raw value alone does not say where the time delta ends, so the
    /// caller has to know its bit length (for instance from the issue time).
    pub const fn unpack(raw: u64, delta_bits: u32) -> Self {
        if delta_bits >= u64::BITS {
            return Self {
                sequence: 0,
                time_delta: raw,
            };
        }
        Self {
            sequence: raw >> delta_bits,
            time_delta: raw & ((1 << delta_bits) - 1),
        }
    }
}
