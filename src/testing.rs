//! Helpers for testing the protocol implementation.
//!
//! This module is only compiled when `test` is enabled.
use std::sync::atomic::{AtomicU64, Ordering};

use crate::codec::IdGenerator;

/// Initialize tracing with a subscriber and some reasonable defaults suitable
/// for enabling log output in tests.
///
/// This is idempotent; it can be called from multiple tests in multiple
/// threads but will only initialize tracing once.
pub fn init_test_logging() {
    use std::sync::OnceLock;

    const DEFAULT_LOG_FILTER: &str = "debug";
    static INIT_LOGGING: OnceLock<()> = OnceLock::new();

    INIT_LOGGING.get_or_init(|| {
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
            .with_test_writer()
            .try_init()
            .unwrap()
    });
}

/// Deterministic id source: 1, 2, 3, ...
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}
