#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    BitLayout, CompactParts, Error, Result, SequenceSource, TimeSource,
    generator::{SharedState, Tick},
    reverse_digits,
};

/// A node-identifier-free generator that returns opaque decimal strings.
///
/// Each call packs the milliseconds since the epoch and a per-millisecond
/// sequence as `sequence << bit_length(time_delta) | time_delta` (see
/// [`CompactParts`]), then reverses the decimal digits of the result.
///
/// ## Limitations
/// - ⚠️ Unique **per instance only**. There is no worker or datacenter field,
///   so two generators on different nodes can return the same string.
/// - ⚠️ The digit reversal only makes consecutive values look less
///   sequential. It is not a security property.
/// - ⚠️ The returned strings are not ordered and must never be compared with
///   IDs from [`FixedLayoutGenerator`].
///
/// ## Features
/// - ✅ Thread-safe: one mutex serializes each call end to end
/// - ✅ Same clock rules as [`FixedLayoutGenerator`]: rollback fails the call,
///   sequence exhaustion spins into the next millisecond
///
/// [`FixedLayoutGenerator`]: crate::FixedLayoutGenerator
pub struct CompactSequenceGenerator<T>
where
    T: TimeSource,
{
    pub(crate) layout: BitLayout,
    pub(crate) state: SharedState,
    pub(crate) time: T,
}

impl<T> CompactSequenceGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator using [`BitLayout::COMPACT`].
    ///
    /// # Example
    /// ```
    /// use flakeid::{CompactSequenceGenerator, SystemClock};
    ///
    /// let generator = CompactSequenceGenerator::new(SystemClock);
    /// let sequence = generator.next_sequence().unwrap();
    /// assert!(sequence.chars().all(|c| c.is_ascii_digit()));
    /// ```
    pub fn new(time: T) -> Self {
        Self::with_layout(BitLayout::COMPACT, time)
    }

    /// Creates a generator with a custom layout. Only the sequence width and
    /// epoch are used; node fields are ignored.
    pub fn with_layout(layout: BitLayout, time: T) -> Self {
        Self {
            layout,
            state: SharedState::new(),
            time,
        }
    }

    /// Generates the next digit-reversed sequence string.
    ///
    /// The shift that places the sequence is recomputed on every call from
    /// the current time delta, so the split point moves as the delta grows.
    ///
    /// # Errors
    ///
    /// Same as [`FixedLayoutGenerator::next_id`].
    ///
    /// [`FixedLayoutGenerator::next_id`]: crate::FixedLayoutGenerator::next_id
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_sequence(&self) -> Result<String> {
        let mut state = self.state.lock()?;
        let Tick {
            time_delta,
            sequence,
        } = state.advance(&self.time, &self.layout)?;

        let raw = CompactParts {
            sequence,
            time_delta,
        }
        .pack()
        .ok_or(Error::TimestampOverflow {
            time_delta,
            max: self.layout.max_timestamp(),
        })?;
        Ok(reverse_digits(&raw.to_string()))
    }

    /// Generates the next plain compact ID, `time_delta << sequence_bits |
    /// sequence`, without digit reversal.
    ///
    /// Shares its clock and counter with [`Self::next_sequence`], so the two
    /// never hand out the same `(time_delta, sequence)` pair.
    ///
    /// # Errors
    ///
    /// Same as [`FixedLayoutGenerator::next_id`].
    ///
    /// [`FixedLayoutGenerator::next_id`]: crate::FixedLayoutGenerator::next_id
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Result<u64> {
        let mut state = self.state.lock()?;
        let Tick {
            time_delta,
            sequence,
        } = state.advance(&self.time, &self.layout)?;
        Ok((time_delta << self.layout.sequence_bits()) | sequence)
    }

    pub const fn layout(&self) -> &BitLayout {
        &self.layout
    }
}

impl<T> SequenceSource for CompactSequenceGenerator<T>
where
    T: TimeSource,
{
    fn next_sequence(&self) -> Result<String> {
        self.next_sequence()
    }
}
