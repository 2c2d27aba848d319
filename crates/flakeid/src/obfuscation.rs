//! Digit reversal for compact sequences.
//!
//! Reversing the decimal text of a packed value moves the fast-changing low
//! digits to the front, so consecutive sequences no longer look consecutive.
//! This is purely cosmetic. It is trivially undone with the same function and
//! gives **no** security or unpredictability guarantee; do not rely on it to
//! hide issue order or volume from anyone who cares to look.

use crate::{CompactParts, Error, Result};

/// Reverses the characters of `digits`.
///
/// Applying it twice returns the original text. Leading zeros are not
/// possible in the input (it is the decimal text of an integer), but trailing
/// zeros of the input become leading zeros of the output and are kept.
///
/// # Example
///
/// ```
/// use flakeid::reverse_digits;
///
/// assert_eq!(reverse_digits("12340"), "04321");
/// assert_eq!(reverse_digits(&reverse_digits("987")), "987");
/// ```
pub fn reverse_digits(digits: &str) -> String {
    digits.chars().rev().collect()
}

/// Recovers the parts of a compact sequence returned by
/// [`CompactSequenceGenerator::next_sequence`], given the bit length of its
/// time delta.
///
/// # Errors
///
/// Returns [`Error::MalformedSequence`] if `text` is not the reversed decimal
/// text of a `u64`.
///
/// [`CompactSequenceGenerator::next_sequence`]: crate::CompactSequenceGenerator::next_sequence
pub fn decode_sequence(text: &str, delta_bits: u32) -> Result<CompactParts> {
    let malformed = || Error::MalformedSequence {
        text: text.to_owned(),
    };
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let raw = reverse_digits(text)
        .parse::<u64>()
        .map_err(|_| malformed())?;
    Ok(CompactParts::unpack(raw, delta_bits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversal_is_an_involution() {
        for text in ["0", "7", "10", "4096", "9223372036854775807"] {
            assert_eq!(reverse_digits(&reverse_digits(text)), text);
        }
    }

    #[test]
    fn trailing_zeros_survive_as_leading_zeros() {
        assert_eq!(reverse_digits("1200"), "0021");
        let parts = decode_sequence("0021", 11).unwrap();
        assert_eq!(parts.pack(), Some(1200));
    }

    #[test]
    fn decode_rejects_non_digits() {
        assert_eq!(
            decode_sequence("12a", 4),
            Err(Error::MalformedSequence {
                text: "12a".to_owned()
            })
        );
        assert!(decode_sequence("", 4).is_err());
        assert!(decode_sequence("21+", 4).is_err());
    }
}
