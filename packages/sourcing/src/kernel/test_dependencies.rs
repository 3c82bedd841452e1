// TestDependencies - mock implementations for testing
//
// In-memory collaborators that can be injected into ServerDeps for tests,
// with switches for simulating outages and failed writes.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{BaseCandidateSource, BaseMatchStore, BaseSignalSource, ServerDeps};
use crate::common::RequirementId;
use crate::config::{DEFAULT_RECOMMENDATION_LIMIT, DEFAULT_SIGNAL_WINDOW_DAYS};
use crate::domains::intake::models::{IntakeStatus, NewRequirement, Requirement};
use crate::domains::matching::ProductMatch;
use crate::domains::products::models::{Product, ProductStatus, RobotCategory};
use crate::domains::recommendations::engine::RecommendationEngine;
use crate::domains::recommendations::models::SignalSnapshot;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// =============================================================================
// Mock Candidate Source
// =============================================================================

pub struct MockCandidateSource {
    products: Mutex<Vec<Product>>,
    unavailable: AtomicBool,
    calls: Mutex<Vec<Option<RobotCategory>>>,
}

impl MockCandidateSource {
    pub fn new() -> Self {
        Self {
            products: Mutex::new(Vec::new()),
            unavailable: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_products(self, products: Vec<Product>) -> Self {
        lock(&self.products).extend(products);
        self
    }

    /// Every load fails as if the catalog database were unreachable
    pub fn unavailable(self) -> Self {
        self.unavailable.store(true, Ordering::SeqCst);
        self
    }

    /// Category filters requested so far
    pub fn calls(&self) -> Vec<Option<RobotCategory>> {
        lock(&self.calls).clone()
    }
}

impl Default for MockCandidateSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseCandidateSource for MockCandidateSource {
    async fn eligible_candidates(&self, category: Option<RobotCategory>) -> Result<Vec<Product>> {
        lock(&self.calls).push(category);
        if self.unavailable.load(Ordering::SeqCst) {
            bail!("Mock catalog unavailable");
        }
        let mut products: Vec<Product> = lock(&self.products)
            .iter()
            .filter(|p| p.status == ProductStatus::Published)
            .filter(|p| category.map_or(true, |c| p.category == c))
            .cloned()
            .collect();
        products.sort_by_key(|p| p.id);
        Ok(products)
    }
}

// =============================================================================
// Mock Match Store
// =============================================================================

/// In-memory store with transactional `record_matches`.
///
/// Writes are staged and only applied once every insert succeeded, so an
/// injected failure leaves no trace.
pub struct MockMatchStore {
    requirements: Mutex<BTreeMap<RequirementId, Requirement>>,
    matches: Mutex<BTreeMap<RequirementId, Vec<ProductMatch>>>,
    fail_after_inserts: Mutex<Option<usize>>,
    unavailable: AtomicBool,
    attempted_inserts: AtomicUsize,
}

impl MockMatchStore {
    pub fn new() -> Self {
        Self {
            requirements: Mutex::new(BTreeMap::new()),
            matches: Mutex::new(BTreeMap::new()),
            fail_after_inserts: Mutex::new(None),
            unavailable: AtomicBool::new(false),
            attempted_inserts: AtomicUsize::new(0),
        }
    }

    /// Seed a stored requirement
    pub fn with_requirement(self, requirement: Requirement) -> Self {
        lock(&self.requirements).insert(requirement.id, requirement);
        self
    }

    /// The next `record_matches` fails after `n` inserts went through.
    /// When the run has `n` or fewer matches the commit itself fails.
    pub fn fail_after_inserts(self, n: usize) -> Self {
        *lock(&self.fail_after_inserts) = Some(n);
        self
    }

    /// Reads fail as if the database were unreachable
    pub fn unavailable(self) -> Self {
        self.unavailable.store(true, Ordering::SeqCst);
        self
    }

    /// Clear an injected write failure
    pub fn heal(&self) {
        *lock(&self.fail_after_inserts) = None;
    }

    /// Every stored requirement, oldest id first
    pub fn requirements(&self) -> Vec<Requirement> {
        lock(&self.requirements).values().cloned().collect()
    }

    pub fn requirement(&self, id: RequirementId) -> Option<Requirement> {
        lock(&self.requirements).get(&id).cloned()
    }

    pub fn stored_matches(&self, id: RequirementId) -> Vec<ProductMatch> {
        lock(&self.matches).get(&id).cloned().unwrap_or_default()
    }

    /// Inserts attempted across all runs, including rolled-back ones
    pub fn attempted_inserts(&self) -> usize {
        self.attempted_inserts.load(Ordering::SeqCst)
    }
}

impl Default for MockMatchStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseMatchStore for MockMatchStore {
    async fn create_requirement(&self, new: NewRequirement) -> Result<Requirement> {
        let requirement = Requirement::pending(new);
        lock(&self.requirements).insert(requirement.id, requirement.clone());
        Ok(requirement)
    }

    async fn find_requirement(&self, id: RequirementId) -> Result<Option<Requirement>> {
        if self.unavailable.load(Ordering::SeqCst) {
            bail!("Mock store unavailable");
        }
        Ok(lock(&self.requirements).get(&id).cloned())
    }

    async fn record_matches(
        &self,
        requirement_id: RequirementId,
        matches: &[ProductMatch],
    ) -> Result<usize> {
        let mut requirements = lock(&self.requirements);
        let Some(requirement) = requirements.get_mut(&requirement_id) else {
            bail!("Requirement {} does not exist", requirement_id);
        };
        if requirement.status != IntakeStatus::Pending {
            bail!("Requirement {} is not pending", requirement_id);
        }

        let fail_after = *lock(&self.fail_after_inserts);
        let mut staged = Vec::with_capacity(matches.len());
        for m in matches {
            if fail_after == Some(staged.len()) {
                bail!("Simulated insert failure after {} matches", staged.len());
            }
            self.attempted_inserts.fetch_add(1, Ordering::SeqCst);
            staged.push(m.clone());
        }
        if fail_after.is_some() {
            bail!("Simulated commit failure");
        }

        let written = staged.len();
        requirement.status = IntakeStatus::Matched;
        requirement.matched_at = Some(chrono::Utc::now());
        lock(&self.matches).insert(requirement_id, staged);
        Ok(written)
    }

    async fn matches_for_requirement(&self, id: RequirementId) -> Result<Vec<ProductMatch>> {
        if self.unavailable.load(Ordering::SeqCst) {
            bail!("Mock store unavailable");
        }
        let mut matches = self.stored_matches(id);
        matches.sort_by_key(|m| m.rank);
        Ok(matches)
    }
}

// =============================================================================
// Mock Signal Source
// =============================================================================

pub struct MockSignalSource {
    snapshot: Mutex<SignalSnapshot>,
    unavailable: AtomicBool,
    loads: AtomicUsize,
}

impl MockSignalSource {
    pub fn new() -> Self {
        Self {
            snapshot: Mutex::new(SignalSnapshot::default()),
            unavailable: AtomicBool::new(false),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn with_snapshot(self, snapshot: SignalSnapshot) -> Self {
        *lock(&self.snapshot) = snapshot;
        self
    }

    /// Every load fails as if the event store were unreachable
    pub fn unavailable(self) -> Self {
        self.unavailable.store(true, Ordering::SeqCst);
        self
    }

    /// Number of snapshot loads so far
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl Default for MockSignalSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseSignalSource for MockSignalSource {
    async fn load_snapshot(&self, _window_days: i64) -> Result<SignalSnapshot> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            bail!("Mock signal source unavailable");
        }
        Ok(lock(&self.snapshot).clone())
    }
}

// =============================================================================
// Test Dependencies Builder
// =============================================================================

pub struct TestDependencies {
    pub candidates: Arc<MockCandidateSource>,
    pub match_store: Arc<MockMatchStore>,
    pub signals: Arc<MockSignalSource>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            candidates: Arc::new(MockCandidateSource::new()),
            match_store: Arc::new(MockMatchStore::new()),
            signals: Arc::new(MockSignalSource::new()),
        }
    }

    /// Set a mock candidate source
    pub fn mock_candidates(mut self, candidates: MockCandidateSource) -> Self {
        self.candidates = Arc::new(candidates);
        self
    }

    /// Set a mock match store
    pub fn mock_store(mut self, store: MockMatchStore) -> Self {
        self.match_store = Arc::new(store);
        self
    }

    /// Set a mock signal source
    pub fn mock_signals(mut self, signals: MockSignalSource) -> Self {
        self.signals = Arc::new(signals);
        self
    }

    /// Build ServerDeps sharing these mocks, so tests can inspect them after
    /// the call.
    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps {
            candidates: self.candidates.clone(),
            match_store: self.match_store.clone(),
            signals: self.signals.clone(),
            recommendation_engine: RecommendationEngine::default(),
            signal_window_days: DEFAULT_SIGNAL_WINDOW_DAYS,
            default_recommendation_limit: DEFAULT_RECOMMENDATION_LIMIT,
        }
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
