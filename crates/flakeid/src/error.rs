/// A result type whose error defaults to the crate-wide [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `flakeid` can emit.
///
/// Errors are always returned synchronously from the call that hit them. The
/// generators never retry, never log and never hand out a partially built ID;
/// the caller decides whether to retry, alert or fail the surrounding request.
///
/// Sequence exhaustion within a single millisecond is **not** an error. It is
/// absorbed by spinning into the next millisecond (see
/// [`wait_for_next_millisecond`]).
///
/// [`wait_for_next_millisecond`]: crate::wait_for_next_millisecond
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The generator could not be constructed from the supplied node identity
    /// or bit layout. Raised only at construction time.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    /// The clock reported a time earlier than the last issued timestamp.
    ///
    /// Generation is refused because reusing a past timestamp could collide
    /// with IDs that were already handed out. The generator state is left
    /// untouched.
    #[error("clock moved backwards, refusing to generate an id for {drift_ms} milliseconds")]
    ClockRolledBack {
        /// How far behind the last issued timestamp the clock is.
        drift_ms: u64,
    },

    /// The clock reported a time earlier than the layout's epoch.
    #[error("clock reading {now_ms} is before the configured epoch {epoch_ms}")]
    ClockBeforeEpoch { now_ms: u64, epoch_ms: u64 },

    /// The elapsed time since the epoch no longer fits in the timestamp field.
    #[error("time delta {time_delta} exceeds the layout maximum {max}")]
    TimestampOverflow { time_delta: u64, max: u64 },

    /// A compact sequence could not be decoded because it is not a decimal
    /// string of a 64-bit value.
    #[error("malformed compact sequence `{text}`")]
    MalformedSequence { text: String },

    /// The operation failed because the lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is not available.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,
}

/// Reasons a generator refuses to be built.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("worker id {value} must be between 0 and {max}")]
    WorkerIdOutOfRange { value: i64, max: u64 },

    #[error("datacenter id {value} must be between 0 and {max}")]
    DatacenterIdOutOfRange { value: i64, max: u64 },

    /// The node and sequence fields leave no room for a timestamp in the 63
    /// usable bits.
    #[error("layout uses {used} of 63 bits and leaves no timestamp bits")]
    LayoutTooWide { used: u32 },

    /// A layout needs at least one sequence bit.
    #[error("layout must reserve at least one sequence bit")]
    EmptySequence,
}

#[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
