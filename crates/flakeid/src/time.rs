use std::time::{SystemTime, UNIX_EPOCH};

/// Reference instant for all default layouts: Monday, January 1, 2018
/// 00:00:00 UTC+8, in milliseconds since the Unix epoch.
pub const TWEPOCH: u64 = 1_514_736_000_000;

/// A source of wall-clock milliseconds since the Unix epoch.
///
/// Generators subtract their layout's epoch from this reading themselves, so a
/// time source only has to report absolute time. Tests plug in fixed or
/// scripted clocks to drive the rollback and overflow paths.
///
/// # Example
///
/// ```
/// use flakeid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since 1970-01-01 UTC.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

/// The system wall clock.
///
/// This clock can move backwards (NTP slews, manual adjustments). Generators
/// detect that and fail the call with [`Error::ClockRolledBack`] instead of
/// reusing a timestamp.
///
/// [`Error::ClockRolledBack`]: crate::Error::ClockRolledBack
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        // A clock set before 1970 reads as 0, which every epoch check rejects.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as u64)
    }
}

/// Spins until `time` reports a millisecond strictly greater than `last`, and
/// returns that reading.
///
/// This is a tight busy loop with no sleep or backoff. It is only entered when
/// a generator exhausts its sequence inside one millisecond, so the expected
/// wait is a fraction of a millisecond. On a clock with several milliseconds
/// per tick it pegs a core for the whole tick.
pub fn wait_for_next_millisecond<T>(time: &T, last: u64) -> u64
where
    T: TimeSource + ?Sized,
{
    let mut now = time.current_millis();
    while now <= last {
        core::hint::spin_loop();
        now = time.current_millis();
    }
    now
}
