use crate::server::config::ServerConfig;
use flakeid::{BusinessNoBuilder, CompactSequenceGenerator, FixedLayoutGenerator, SystemClock};
use std::{sync::Arc, time::Duration};

/// Clock used by every generator in the service.
pub type Clock = SystemClock;

/// Business numbers are built on a compact generator of their own.
pub type NumberBuilder = BusinessNoBuilder<CompactSequenceGenerator<Clock>>;

/// Shared handler state: one generator of each kind for the whole process.
///
/// Each generator serializes its callers internally, so the state is shared
/// behind an `Arc` without any extra locking.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    ids: FixedLayoutGenerator<Clock>,
    numbers: NumberBuilder,
    bench_window: Duration,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> flakeid::Result<Self> {
        let ids = FixedLayoutGenerator::from_identity(config.layout, config.node, SystemClock)?;
        let numbers = BusinessNoBuilder::with_prefix_policy(
            CompactSequenceGenerator::new(SystemClock),
            config.prefixes,
        );
        Ok(Self {
            inner: Arc::new(Inner {
                ids,
                numbers,
                bench_window: config.bench_window,
            }),
        })
    }

    pub fn ids(&self) -> &FixedLayoutGenerator<Clock> {
        &self.inner.ids
    }

    pub fn numbers(&self) -> &NumberBuilder {
        &self.inner.numbers
    }

    pub fn sequences(&self) -> &CompactSequenceGenerator<Clock> {
        self.inner.numbers.source()
    }

    pub fn bench_window(&self) -> Duration {
        self.inner.bench_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flakeid::{BitLayout, ConfigError, NodeIdentity, PrefixPolicy};

    #[test]
    fn identity_must_fit_the_configured_layout() {
        let config = ServerConfig {
            layout: BitLayout::CLASSIC,
            node: NodeIdentity::new(&BitLayout::WIDE_DATACENTER, 0, 63).unwrap(),
            server_addr: "127.0.0.1:0".to_owned(),
            bench_window: Duration::from_millis(20),
            prefixes: PrefixPolicy::Omit,
        };
        assert!(matches!(
            AppState::new(&config),
            Err(flakeid::Error::InvalidConfiguration(
                ConfigError::DatacenterIdOutOfRange { .. }
            ))
        ));
    }
}
