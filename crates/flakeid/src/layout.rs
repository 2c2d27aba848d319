use crate::{ConfigError, Result, TWEPOCH};

/// Number of bits a generated ID may use. The most significant bit of the
/// 64-bit word is left unset so IDs stay positive as signed integers.
pub const USABLE_BITS: u32 = 63;

/// The bit widths and epoch that define how a generator packs its IDs.
///
/// A layout is fixed for the lifetime of a generator. Changing it invalidates
/// the comparability of every ID issued before the change.
///
/// Fields are packed most significant first:
///
/// ```text
///  +--------------+-------------------+-------------------+---------------+-----------------+
///  | reserved (1) | timestamp (rest)  | datacenter (dc)   | worker (wk)   | sequence (seq)  |
///  +--------------+-------------------+-------------------+---------------+-----------------+
///  |<----------- MSB ------------------------ 64 bits ----------------------------- LSB --->|
/// ```
///
/// Deserialized layouts go through [`BitLayout::new`] and are rejected the
/// same way.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "LayoutFields"))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitLayout {
    worker_bits: u32,
    datacenter_bits: u32,
    sequence_bits: u32,
    epoch_ms: u64,
}

impl BitLayout {
    /// 41 timestamp bits, 5 datacenter bits, 5 worker bits, 12 sequence bits.
    pub const CLASSIC: Self = Self::from_parts(5, 5, 12, TWEPOCH);

    /// 41 timestamp bits, 6 datacenter bits, 4 worker bits, 12 sequence bits.
    pub const WIDE_DATACENTER: Self = Self::from_parts(4, 6, 12, TWEPOCH);

    /// No node fields: only a time delta and 12 sequence bits.
    pub const COMPACT: Self = Self::from_parts(0, 0, 12, TWEPOCH);

    const fn from_parts(
        worker_bits: u32,
        datacenter_bits: u32,
        sequence_bits: u32,
        epoch_ms: u64,
    ) -> Self {
        Self {
            worker_bits,
            datacenter_bits,
            sequence_bits,
            epoch_ms,
        }
    }

    /// Builds a custom layout.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmptySequence`] if `sequence_bits` is zero.
    /// - [`ConfigError::LayoutTooWide`] if the node and sequence fields leave
    ///   no timestamp bit in the 63 usable bits.
    pub fn new(
        worker_bits: u32,
        datacenter_bits: u32,
        sequence_bits: u32,
        epoch_ms: u64,
    ) -> Result<Self> {
        if sequence_bits == 0 {
            return Err(ConfigError::EmptySequence.into());
        }
        let used = worker_bits
            .saturating_add(datacenter_bits)
            .saturating_add(sequence_bits);
        if used >= USABLE_BITS {
            return Err(ConfigError::LayoutTooWide { used }.into());
        }
        Ok(Self::from_parts(
            worker_bits,
            datacenter_bits,
            sequence_bits,
            epoch_ms,
        ))
    }

    /// Returns a copy of this layout anchored at a different epoch.
    #[must_use]
    pub const fn with_epoch(self, epoch_ms: u64) -> Self {
        Self { epoch_ms, ..self }
    }

    pub const fn worker_bits(&self) -> u32 {
        self.worker_bits
    }

    pub const fn datacenter_bits(&self) -> u32 {
        self.datacenter_bits
    }

    pub const fn sequence_bits(&self) -> u32 {
        self.sequence_bits
    }

    /// The reference instant subtracted from every clock reading.
    pub const fn epoch_ms(&self) -> u64 {
        self.epoch_ms
    }

    /// Bits left for the time delta once node and sequence fields are placed.
    pub const fn timestamp_bits(&self) -> u32 {
        USABLE_BITS - self.worker_bits - self.datacenter_bits - self.sequence_bits
    }

    pub const fn max_worker_id(&self) -> u64 {
        mask(self.worker_bits)
    }

    pub const fn max_datacenter_id(&self) -> u64 {
        mask(self.datacenter_bits)
    }

    /// Largest sequence value; the counter wraps to zero after it.
    pub const fn sequence_mask(&self) -> u64 {
        mask(self.sequence_bits)
    }

    /// Largest time delta (milliseconds since the epoch) the layout can hold.
    pub const fn max_timestamp(&self) -> u64 {
        mask(self.timestamp_bits())
    }

    pub const fn worker_shift(&self) -> u32 {
        self.sequence_bits
    }

    pub const fn datacenter_shift(&self) -> u32 {
        self.sequence_bits + self.worker_bits
    }

    pub const fn timestamp_shift(&self) -> u32 {
        self.sequence_bits + self.worker_bits + self.datacenter_bits
    }
}

impl Default for BitLayout {
    fn default() -> Self {
        Self::CLASSIC
    }
}

/// Unchecked wire form of a [`BitLayout`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct LayoutFields {
    worker_bits: u32,
    datacenter_bits: u32,
    sequence_bits: u32,
    epoch_ms: u64,
}

#[cfg(feature = "serde")]
impl TryFrom<LayoutFields> for BitLayout {
    type Error = crate::Error;

    fn try_from(fields: LayoutFields) -> Result<Self> {
        Self::new(
            fields.worker_bits,
            fields.datacenter_bits,
            fields.sequence_bits,
            fields.epoch_ms,
        )
    }
}

const fn mask(bits: u32) -> u64 {
    if bits == 0 { 0 } else { u64::MAX >> (64 - bits) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn classic_layout_matches_twitter_widths() {
        let layout = BitLayout::CLASSIC;
        assert_eq!(layout.timestamp_bits(), 41);
        assert_eq!(layout.max_worker_id(), 31);
        assert_eq!(layout.max_datacenter_id(), 31);
        assert_eq!(layout.sequence_mask(), 4095);
        assert_eq!(layout.worker_shift(), 12);
        assert_eq!(layout.datacenter_shift(), 17);
        assert_eq!(layout.timestamp_shift(), 22);
    }

    #[test]
    fn wide_datacenter_layout() {
        let layout = BitLayout::WIDE_DATACENTER;
        assert_eq!(layout.max_worker_id(), 15);
        assert_eq!(layout.max_datacenter_id(), 63);
        assert_eq!(layout.datacenter_shift(), 16);
        assert_eq!(layout.timestamp_shift(), 22);
    }

    #[test]
    fn compact_layout_has_no_node_fields() {
        let layout = BitLayout::COMPACT;
        assert_eq!(layout.max_worker_id(), 0);
        assert_eq!(layout.max_datacenter_id(), 0);
        assert_eq!(layout.timestamp_bits(), 51);
        assert_eq!(layout.timestamp_shift(), 12);
    }

    #[test]
    fn rejects_layouts_without_timestamp_room() {
        assert_eq!(
            BitLayout::new(20, 20, 23, TWEPOCH),
            Err(Error::InvalidConfiguration(ConfigError::LayoutTooWide {
                used: 63
            }))
        );
        assert_eq!(
            BitLayout::new(5, 5, 0, TWEPOCH),
            Err(Error::InvalidConfiguration(ConfigError::EmptySequence))
        );
        let layout = BitLayout::new(20, 20, 22, 0).unwrap();
        assert_eq!(layout.timestamp_bits(), 1);
        assert_eq!(layout.max_timestamp(), 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_validates_widths() {
        let layout: BitLayout = serde_json::from_str(
            r#"{"worker_bits":4,"datacenter_bits":6,"sequence_bits":12,"epoch_ms":1514736000000}"#,
        )
        .unwrap();
        assert_eq!(layout, BitLayout::WIDE_DATACENTER);

        let too_wide = serde_json::from_str::<BitLayout>(
            r#"{"worker_bits":40,"datacenter_bits":40,"sequence_bits":12,"epoch_ms":0}"#,
        );
        let err = too_wide.unwrap_err().to_string();
        assert!(err.contains("leaves no timestamp bits"), "{err}");

        let no_sequence = serde_json::from_str::<BitLayout>(
            r#"{"worker_bits":5,"datacenter_bits":5,"sequence_bits":0,"epoch_ms":0}"#,
        );
        assert!(no_sequence.is_err());
    }

    #[test]
    fn with_epoch_only_moves_the_epoch() {
        let layout = BitLayout::CLASSIC.with_epoch(42);
        assert_eq!(layout.epoch_ms(), 42);
        assert_eq!(layout.sequence_mask(), BitLayout::CLASSIC.sequence_mask());
    }
}
