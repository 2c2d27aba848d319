use core::cmp::Ordering;

use crate::{
    BitLayout, Error, Result, TimeSource,
    generator::{Mutex, MutexGuard},
    wait_for_next_millisecond,
};

/// The time delta and sequence a single generation call settled on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Tick {
    pub(crate) time_delta: u64,
    pub(crate) sequence: u64,
}

/// Per-instance clock and counter state.
///
/// `last_timestamp` is `None` until the first ID is issued. It only ever
/// holds absolute milliseconds that were handed out, and never moves
/// backwards.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct GeneratorState {
    pub(crate) last_timestamp: Option<u64>,
    pub(crate) sequence: u64,
}

impl GeneratorState {
    /// Reads the clock and moves the state to the next `(timestamp,
    /// sequence)` pair.
    ///
    /// The next pair is computed first and only committed once every check
    /// has passed, so a failed call leaves the state exactly as it was.
    pub(crate) fn advance<T>(&mut self, time: &T, layout: &BitLayout) -> Result<Tick>
    where
        T: TimeSource + ?Sized,
    {
        let now = time.current_millis();

        let (now, sequence) = match self.last_timestamp.map(|last| (now.cmp(&last), last)) {
            Some((Ordering::Less, last)) => return Err(Self::cold_clock_behind(now, last)),
            Some((Ordering::Equal, last)) => {
                let sequence = (self.sequence + 1) & layout.sequence_mask();
                if sequence == 0 {
                    (wait_for_next_millisecond(time, last), sequence)
                } else {
                    (now, sequence)
                }
            }
            Some((Ordering::Greater, _)) | None => (now, 0),
        };

        let epoch_ms = layout.epoch_ms();
        let time_delta = now.checked_sub(epoch_ms).ok_or(Error::ClockBeforeEpoch {
            now_ms: now,
            epoch_ms,
        })?;
        let max = layout.max_timestamp();
        if time_delta > max {
            return Err(Error::TimestampOverflow { time_delta, max });
        }

        self.last_timestamp = Some(now);
        self.sequence = sequence;
        Ok(Tick {
            time_delta,
            sequence,
        })
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(now: u64, last: u64) -> Error {
        Error::ClockRolledBack {
            drift_ms: last - now,
        }
    }
}

/// The mutex every generation call runs under.
///
/// The lock is held for the whole read-modify-write, clock read and overflow
/// spin included: two callers must never observe the same clock reading
/// against the same `last_timestamp`.
pub(crate) struct SharedState {
    #[cfg(feature = "cache-padded")]
    inner: crossbeam_utils::CachePadded<Mutex<GeneratorState>>,
    #[cfg(not(feature = "cache-padded"))]
    inner: Mutex<GeneratorState>,
}

impl SharedState {
    pub(crate) fn new() -> Self {
        Self {
            #[cfg(feature = "cache-padded")]
            inner: crossbeam_utils::CachePadded::new(Mutex::new(GeneratorState::default())),
            #[cfg(not(feature = "cache-padded"))]
            inner: Mutex::new(GeneratorState::default()),
        }
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, GeneratorState>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.inner.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.inner.lock()?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

    struct SetTime(AtomicU64);

    impl TimeSource for SetTime {
        fn current_millis(&self) -> u64 {
            self.0.load(AtomicOrdering::Relaxed)
        }
    }

    fn layout() -> BitLayout {
        BitLayout::CLASSIC.with_epoch(1_000)
    }

    #[test]
    fn first_call_starts_at_sequence_zero() {
        let time = SetTime(AtomicU64::new(1_042));
        let mut state = GeneratorState::default();
        let tick = state.advance(&time, &layout()).unwrap();
        assert_eq!(
            tick,
            Tick {
                time_delta: 42,
                sequence: 0
            }
        );
        assert_eq!(state.last_timestamp, Some(1_042));
    }

    #[test]
    fn same_millisecond_increments_and_new_millisecond_resets() {
        let time = SetTime(AtomicU64::new(1_042));
        let mut state = GeneratorState::default();
        state.advance(&time, &layout()).unwrap();
        assert_eq!(state.advance(&time, &layout()).unwrap().sequence, 1);
        assert_eq!(state.advance(&time, &layout()).unwrap().sequence, 2);

        time.0.store(1_050, AtomicOrdering::Relaxed);
        let tick = state.advance(&time, &layout()).unwrap();
        assert_eq!(tick.sequence, 0);
        assert_eq!(tick.time_delta, 50);
    }

    #[test]
    fn rollback_fails_without_mutating() {
        let time = SetTime(AtomicU64::new(1_042));
        let mut state = GeneratorState::default();
        state.advance(&time, &layout()).unwrap();
        state.advance(&time, &layout()).unwrap();
        let before = state;

        time.0.store(1_040, AtomicOrdering::Relaxed);
        assert_eq!(
            state.advance(&time, &layout()),
            Err(Error::ClockRolledBack { drift_ms: 2 })
        );
        assert_eq!(state, before);
    }

    #[test]
    fn clock_before_epoch_fails_without_mutating() {
        let time = SetTime(AtomicU64::new(999));
        let mut state = GeneratorState::default();
        assert_eq!(
            state.advance(&time, &layout()),
            Err(Error::ClockBeforeEpoch {
                now_ms: 999,
                epoch_ms: 1_000
            })
        );
        assert_eq!(state, GeneratorState::default());
    }

    #[test]
    fn overflowing_delta_fails_without_mutating() {
        let layout = BitLayout::new(20, 20, 22, 0).unwrap();
        let time = SetTime(AtomicU64::new(2));
        let mut state = GeneratorState::default();
        assert_eq!(
            state.advance(&time, &layout),
            Err(Error::TimestampOverflow {
                time_delta: 2,
                max: 1
            })
        );
        assert_eq!(state, GeneratorState::default());
    }

    #[test]
    fn shared_state_starts_empty() {
        let shared = SharedState::new();
        assert_eq!(*shared.lock().unwrap(), GeneratorState::default());
    }
}
