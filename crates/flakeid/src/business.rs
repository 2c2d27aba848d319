use core::fmt;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Result, SequenceSource};

/// The kinds of business serial numbers handed out to services.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BusinessKind {
    Order,
    Trade,
    Refund,
}

impl BusinessKind {
    /// The single-digit tag historically reserved for this kind.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Order => "1",
            Self::Trade => "9",
            Self::Refund => "8",
        }
    }
}

impl fmt::Display for BusinessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Order => "order",
            Self::Trade => "trade",
            Self::Refund => "refund",
        })
    }
}

/// Whether the named `create_*_no` helpers put the kind's prefix in front.
///
/// Deployed services issue order and refund numbers **without** their
/// prefixes, so [`PrefixPolicy::Omit`] is the default. Switching to
/// [`PrefixPolicy::Apply`] changes the shape of every number issued
/// afterwards.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PrefixPolicy {
    #[default]
    Omit,
    Apply,
}

/// Builds business serial numbers (order numbers, refund numbers, ...) on top
/// of a [`SequenceSource`].
///
/// A number is `prefix + sequence + shard_tag`, where the prefix and the shard
/// tag are each dropped when empty. The shard tag names the physical table
/// shard the record lives in, so a number alone is enough to route a lookup.
///
/// # Example
///
/// ```
/// use flakeid::{BusinessNoBuilder, CompactSequenceGenerator, SystemClock};
///
/// let builder = BusinessNoBuilder::new(CompactSequenceGenerator::new(SystemClock));
/// let order_no = builder.create_order_no("03").unwrap();
/// assert!(order_no.ends_with("03"));
/// ```
pub struct BusinessNoBuilder<S> {
    source: S,
    prefixes: PrefixPolicy,
}

impl<S> BusinessNoBuilder<S>
where
    S: SequenceSource,
{
    /// Creates a builder that omits kind prefixes.
    pub fn new(source: S) -> Self {
        Self::with_prefix_policy(source, PrefixPolicy::default())
    }

    pub fn with_prefix_policy(source: S, prefixes: PrefixPolicy) -> Self {
        Self { source, prefixes }
    }

    /// Draws one sequence and wraps it with `prefix` and `shard_tag`.
    ///
    /// Neither part is required: `create_business_no(None, "")` returns the
    /// bare sequence.
    ///
    /// # Errors
    ///
    /// Returns whatever the underlying source fails with. Nothing is built
    /// from a failed draw.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn create_business_no(&self, prefix: Option<&str>, shard_tag: &str) -> Result<String> {
        let sequence = self.source.next_sequence()?;
        let prefix = prefix.unwrap_or_default();

        let mut number = String::with_capacity(prefix.len() + sequence.len() + shard_tag.len());
        number.push_str(prefix);
        number.push_str(&sequence);
        number.push_str(shard_tag);
        Ok(number)
    }

    /// Creates a number for `kind`, applying its prefix according to the
    /// builder's [`PrefixPolicy`].
    ///
    /// # Errors
    ///
    /// See [`Self::create_business_no`].
    pub fn create(&self, kind: BusinessKind, shard_tag: &str) -> Result<String> {
        let prefix = match self.prefixes {
            PrefixPolicy::Omit => None,
            PrefixPolicy::Apply => Some(kind.prefix()),
        };
        self.create_business_no(prefix, shard_tag)
    }

    /// # Errors
    ///
    /// See [`Self::create_business_no`].
    pub fn create_order_no(&self, shard_tag: &str) -> Result<String> {
        self.create(BusinessKind::Order, shard_tag)
    }

    /// # Errors
    ///
    /// See [`Self::create_business_no`].
    pub fn create_refund_no(&self, shard_tag: &str) -> Result<String> {
        self.create(BusinessKind::Refund, shard_tag)
    }

    /// # Errors
    ///
    /// See [`Self::create_business_no`].
    pub fn create_trade_no(&self, shard_tag: &str) -> Result<String> {
        self.create(BusinessKind::Trade, shard_tag)
    }

    pub const fn prefix_policy(&self) -> PrefixPolicy {
        self.prefixes
    }

    pub const fn source(&self) -> &S {
        &self.source
    }
}
