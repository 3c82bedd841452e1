//! Test harness over the in-memory collaborators.
//!
//! Every test gets fresh mocks; tracing is installed once per test binary.
//! Run tests with: RUST_LOG=debug cargo test -- --nocapture

use sourcing_core::kernel::{
    MockCandidateSource, MockMatchStore, MockSignalSource, ServerDeps, TestDependencies,
};
use std::sync::Once;

static TRACING: Once = Once::new();

pub(super) fn init_tracing() {
    TRACING.call_once(|| {
        // Uses try_init() to avoid panicking if another binary installed one.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Mocks plus the ServerDeps wired to them.
pub struct TestHarness {
    pub mocks: TestDependencies,
    pub deps: ServerDeps,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_mocks(TestDependencies::new())
    }

    pub fn with_mocks(mocks: TestDependencies) -> Self {
        init_tracing();
        let deps = mocks.server_deps();
        Self { mocks, deps }
    }

    /// Harness over a catalog and an otherwise empty store
    pub fn with_catalog(candidates: MockCandidateSource) -> Self {
        Self::with_mocks(TestDependencies::new().mock_candidates(candidates))
    }

    pub fn with_catalog_and_store(candidates: MockCandidateSource, store: MockMatchStore) -> Self {
        Self::with_mocks(
            TestDependencies::new()
                .mock_candidates(candidates)
                .mock_store(store),
        )
    }

    pub fn with_signals(signals: MockSignalSource) -> Self {
        Self::with_mocks(TestDependencies::new().mock_signals(signals))
    }
}
