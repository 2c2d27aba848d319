#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    BitLayout, NodeIdentity, Result, SnowflakeParts, TimeSource,
    generator::{SharedState, Tick},
};

/// A Snowflake generator with a fixed bit layout and an externally assigned
/// node identity.
///
/// Every ID packs, from the most significant bit down: one unused bit, the
/// milliseconds since the layout's epoch, the datacenter ID, the worker ID and
/// a per-millisecond sequence (see [`BitLayout`]).
///
/// ## Features
/// - ✅ Thread-safe: one mutex serializes each call end to end
/// - ✅ Unique per instance, and across nodes as long as no two nodes share a
///   worker/datacenter pair
/// - ✅ Fails fast on clock rollback instead of reusing a timestamp
///
/// ## See Also
/// - [`CompactSequenceGenerator`]
///
/// [`CompactSequenceGenerator`]: crate::CompactSequenceGenerator
pub struct FixedLayoutGenerator<T>
where
    T: TimeSource,
{
    pub(crate) layout: BitLayout,
    pub(crate) node: NodeIdentity,
    pub(crate) state: SharedState,
    pub(crate) time: T,
}

impl<T> FixedLayoutGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator using [`BitLayout::CLASSIC`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if either ID is negative or
    /// does not fit in its 5-bit field. No generator exists afterwards, so no
    /// ID can be handed out under a bad identity.
    ///
    /// # Example
    /// ```
    /// use flakeid::{FixedLayoutGenerator, SystemClock};
    ///
    /// let generator = FixedLayoutGenerator::new(1, 1, SystemClock).unwrap();
    /// let id = generator.next_id().unwrap();
    /// assert_eq!(generator.decode(id).worker_id, 1);
    ///
    /// assert!(FixedLayoutGenerator::new(32, 1, SystemClock).is_err());
    /// ```
    ///
    /// [`Error::InvalidConfiguration`]: crate::Error::InvalidConfiguration
    pub fn new(worker_id: i64, datacenter_id: i64, time: T) -> Result<Self> {
        Self::with_layout(BitLayout::CLASSIC, worker_id, datacenter_id, time)
    }

    /// Creates a generator with a custom layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if either ID does not fit
    /// `layout`.
    ///
    /// [`Error::InvalidConfiguration`]: crate::Error::InvalidConfiguration
    pub fn with_layout(
        layout: BitLayout,
        worker_id: i64,
        datacenter_id: i64,
        time: T,
    ) -> Result<Self> {
        let node = NodeIdentity::new(&layout, worker_id, datacenter_id)?;
        Self::from_identity(layout, node, time)
    }

    /// Creates a generator from an existing identity.
    ///
    /// The identity is checked again against `layout`, since it may have been
    /// validated against a wider one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if either ID does not fit
    /// `layout`.
    ///
    /// [`Error::InvalidConfiguration`]: crate::Error::InvalidConfiguration
    pub fn from_identity(layout: BitLayout, node: NodeIdentity, time: T) -> Result<Self> {
        node.check(&layout)?;
        Ok(Self {
            layout,
            node,
            state: SharedState::new(),
            time,
        })
    }

    /// Generates the next ID.
    ///
    /// Within one millisecond the sequence counts up; once it wraps, the call
    /// spins until the clock ticks over and continues at sequence zero. The
    /// caller never sees that wait as an error.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRolledBack`] if the clock reads earlier than the last
    ///   issued timestamp. The state is untouched and no ID is returned.
    /// - [`Error::ClockBeforeEpoch`] / [`Error::TimestampOverflow`] if the
    ///   clock falls outside the layout's time range.
    /// - `Error::LockPoisoned` if another caller panicked mid-call (std mutex
    ///   only).
    ///
    /// [`Error::ClockRolledBack`]: crate::Error::ClockRolledBack
    /// [`Error::ClockBeforeEpoch`]: crate::Error::ClockBeforeEpoch
    /// [`Error::TimestampOverflow`]: crate::Error::TimestampOverflow
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Result<u64> {
        let mut state = self.state.lock()?;
        let Tick {
            time_delta,
            sequence,
        } = state.advance(&self.time, &self.layout)?;

        let parts = SnowflakeParts {
            timestamp: time_delta,
            datacenter_id: self.node.datacenter_id(),
            worker_id: self.node.worker_id(),
            sequence,
        };
        Ok(parts.compose(&self.layout))
    }

    /// Splits an ID issued by this generator into its fields.
    pub const fn decode(&self, id: u64) -> SnowflakeParts {
        SnowflakeParts::decode(id, &self.layout)
    }

    pub const fn layout(&self) -> &BitLayout {
        &self.layout
    }

    pub const fn node(&self) -> &NodeIdentity {
        &self.node
    }
}
