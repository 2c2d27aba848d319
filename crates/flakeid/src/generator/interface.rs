use std::sync::Arc;

use crate::Result;

/// Anything that can hand out opaque, per-instance unique sequence strings.
///
/// [`BusinessNoBuilder`] only needs this much from a generator, which keeps
/// it independent of the concrete packing scheme.
///
/// [`BusinessNoBuilder`]: crate::BusinessNoBuilder
pub trait SequenceSource {
    /// Generates the next sequence string.
    ///
    /// # Errors
    ///
    /// Implementations surface their generation errors unchanged, for example
    /// [`Error::ClockRolledBack`](crate::Error::ClockRolledBack).
    fn next_sequence(&self) -> Result<String>;
}

impl<S: SequenceSource + ?Sized> SequenceSource for &S {
    fn next_sequence(&self) -> Result<String> {
        (**self).next_sequence()
    }
}

impl<S: SequenceSource + ?Sized> SequenceSource for Arc<S> {
    fn next_sequence(&self) -> Result<String> {
        (**self).next_sequence()
    }
}
