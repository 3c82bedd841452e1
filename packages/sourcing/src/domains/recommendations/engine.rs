//! Recommendation engine
//!
//! Ranks catalog products for one buyer from a [`SignalSnapshot`]. The
//! snapshot is only read, and "now" is `snapshot.as_of`, so a call has no
//! side effects and repeats exactly over the same snapshot.
//!
//! When the chosen strategy yields fewer than `limit` products the list is
//! topped up from trending, then from catalog order. Backfilled items are
//! flagged with `fallback = true`.

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::common::utils::scoring::{jaccard, recency_decay, round_to};
use crate::common::{ProductId, UserId};
use crate::domains::products::models::{Product, RobotCategory};
use crate::domains::recommendations::algorithm::RecommendationAlgorithm;
use crate::domains::recommendations::models::{
    Interaction, InteractionKind, Recommendation, RecommendationQuery, SignalSnapshot,
};

pub const DEFAULT_HALF_LIFE_DAYS: f64 = 14.0;

/// Strategy weights for [`RecommendationAlgorithm::Blended`]. Sum to 1.0.
const BLEND: [(RecommendationAlgorithm, f64); 4] = [
    (RecommendationAlgorithm::BrowsingHistory, 0.35),
    (RecommendationAlgorithm::SimilarBuyers, 0.25),
    (RecommendationAlgorithm::IndustryPeers, 0.20),
    (RecommendationAlgorithm::Trending, 0.20),
];

/// Weight of the buyer's own events on a product, relative to their
/// affinity for its category.
const DIRECT_INTEREST_WEIGHT: f64 = 0.5;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// A product with its normalized strategy score.
#[derive(Debug, Clone, PartialEq)]
struct Scored {
    product_id: ProductId,
    score: f64,
    reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationEngine {
    half_life_days: f64,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(DEFAULT_HALF_LIFE_DAYS)
    }
}

impl RecommendationEngine {
    pub fn new(half_life_days: f64) -> Self {
        Self { half_life_days }
    }

    pub fn recommend(
        &self,
        query: &RecommendationQuery,
        snapshot: &SignalSnapshot,
    ) -> Vec<Recommendation> {
        let signals = Signals::new(snapshot, self.half_life_days);
        let mut picked = Picker::new(query);

        picked.extend(signals.run(query.algorithm, query), Some(query.algorithm), false);

        if !picked.is_full() && query.algorithm != RecommendationAlgorithm::Trending {
            picked.extend(
                signals.trending(),
                Some(RecommendationAlgorithm::Trending),
                true,
            );
        }

        if !picked.is_full() {
            let catalog_order = signals.catalog.keys().map(|id| Scored {
                product_id: *id,
                score: 0.0,
                reason: "Available in the catalog".to_string(),
            });
            picked.extend(catalog_order, None, true);
        }

        let results = picked.finish();
        debug!(
            algorithm = %query.algorithm,
            limit = query.limit,
            returned = results.len(),
            fallbacks = results.iter().filter(|r| r.fallback).count(),
            "Ranked recommendations"
        );
        results
    }
}

/// Collects results up to the limit, skipping excluded and repeated ids.
struct Picker<'q> {
    query: &'q RecommendationQuery,
    taken: BTreeSet<ProductId>,
    results: Vec<Recommendation>,
}

impl<'q> Picker<'q> {
    fn new(query: &'q RecommendationQuery) -> Self {
        Self {
            query,
            taken: BTreeSet::new(),
            results: Vec::with_capacity(query.limit),
        }
    }

    fn is_full(&self) -> bool {
        self.results.len() >= self.query.limit
    }

    fn extend(
        &mut self,
        ranked: impl IntoIterator<Item = Scored>,
        algorithm: Option<RecommendationAlgorithm>,
        fallback: bool,
    ) {
        for item in ranked {
            if self.is_full() {
                return;
            }
            if self.query.exclude.contains(&item.product_id) || !self.taken.insert(item.product_id)
            {
                continue;
            }
            self.results.push(Recommendation {
                product_id: item.product_id,
                score: round_to(item.score, 4),
                reason: item.reason,
                algorithm,
                fallback,
            });
        }
    }

    fn finish(self) -> Vec<Recommendation> {
        self.results
    }
}

/// Snapshot indexed for scoring.
struct Signals<'a> {
    snapshot: &'a SignalSnapshot,
    catalog: BTreeMap<ProductId, &'a Product>,
    half_life_days: f64,
}

impl<'a> Signals<'a> {
    fn new(snapshot: &'a SignalSnapshot, half_life_days: f64) -> Self {
        Self {
            snapshot,
            catalog: snapshot.catalog.iter().map(|p| (p.id, p)).collect(),
            half_life_days,
        }
    }

    /// Events on eligible products, with their recency-decayed weight.
    fn events(&self) -> impl Iterator<Item = (&'a Interaction, &'a Product, f64)> + '_ {
        self.snapshot.interactions.iter().filter_map(move |event| {
            let product = *self.catalog.get(&event.product_id)?;
            let age_ms = (self.snapshot.as_of - event.occurred_at).num_milliseconds();
            let age_days = age_ms as f64 / MILLIS_PER_DAY;
            let weight = event.kind.weight() * recency_decay(age_days, self.half_life_days);
            Some((event, product, weight))
        })
    }

    fn run(&self, algorithm: RecommendationAlgorithm, query: &RecommendationQuery) -> Vec<Scored> {
        match algorithm {
            RecommendationAlgorithm::Blended => self.blended(query),
            RecommendationAlgorithm::BrowsingHistory => self.browsing_history(query.user_id),
            RecommendationAlgorithm::IndustryPeers => self.industry_peers(query),
            RecommendationAlgorithm::Trending => self.trending(),
            RecommendationAlgorithm::SimilarBuyers => self.similar_buyers(query.user_id),
        }
    }

    /// Category affinity from the buyer's own events. Products the buyer
    /// already ordered are not suggested again.
    fn browsing_history(&self, user_id: UserId) -> Vec<Scored> {
        let mut affinity: BTreeMap<RobotCategory, f64> = BTreeMap::new();
        let mut direct: BTreeMap<ProductId, f64> = BTreeMap::new();
        let mut ordered: BTreeSet<ProductId> = BTreeSet::new();

        for (event, product, weight) in self.events().filter(|(e, _, _)| e.user_id == user_id) {
            *affinity.entry(product.category).or_default() += weight;
            *direct.entry(product.id).or_default() += weight;
            if event.kind == InteractionKind::Order {
                ordered.insert(product.id);
            }
        }

        let raw: BTreeMap<ProductId, f64> = self
            .catalog
            .values()
            .filter(|product| !ordered.contains(&product.id))
            .filter_map(|product| {
                let category_weight = affinity.get(&product.category)?;
                let own = direct.get(&product.id).copied().unwrap_or(0.0);
                Some((product.id, category_weight + DIRECT_INTEREST_WEIGHT * own))
            })
            .collect();

        self.rank(raw, |product| {
            format!(
                "Based on your interest in {} robots",
                product.category.as_str().replace('_', "-")
            )
        })
    }

    /// Interactions of other organizations in the caller's industry.
    fn industry_peers(&self, query: &RecommendationQuery) -> Vec<Scored> {
        let industries = &self.snapshot.industries;
        let Some(industry) = industries.get(&query.organization_id) else {
            return Vec::new();
        };

        let mut raw: BTreeMap<ProductId, f64> = BTreeMap::new();
        for (event, product, weight) in self.events() {
            if event.organization_id == query.organization_id {
                continue;
            }
            if industries.get(&event.organization_id) == Some(industry) {
                *raw.entry(product.id).or_default() += weight;
            }
        }

        self.rank(raw, |_| format!("Popular with other {} buyers", industry))
    }

    /// Decayed interaction weight across the whole marketplace.
    fn trending(&self) -> Vec<Scored> {
        let mut raw: BTreeMap<ProductId, f64> = BTreeMap::new();
        for (_, product, weight) in self.events() {
            *raw.entry(product.id).or_default() += weight;
        }
        self.rank(raw, |_| "Trending across the marketplace".to_string())
    }

    /// Products engaged with by buyers whose product sets overlap the
    /// caller's, weighted by Jaccard similarity.
    fn similar_buyers(&self, user_id: UserId) -> Vec<Scored> {
        let mut per_user: BTreeMap<UserId, BTreeMap<ProductId, f64>> = BTreeMap::new();
        for (event, product, weight) in self.events() {
            *per_user
                .entry(event.user_id)
                .or_default()
                .entry(product.id)
                .or_default() += weight;
        }

        let Some(mine) = per_user.get(&user_id) else {
            return Vec::new();
        };
        let mine: BTreeSet<ProductId> = mine.keys().copied().collect();

        let mut raw: BTreeMap<ProductId, f64> = BTreeMap::new();
        for (other, weights) in &per_user {
            if *other == user_id {
                continue;
            }
            let theirs: BTreeSet<ProductId> = weights.keys().copied().collect();
            let similarity = jaccard(&mine, &theirs);
            if similarity <= 0.0 {
                continue;
            }
            for (product_id, weight) in weights {
                if !mine.contains(product_id) {
                    *raw.entry(*product_id).or_default() += similarity * weight;
                }
            }
        }

        self.rank(raw, |_| {
            "Buyers with similar interests also engaged with this".to_string()
        })
    }

    /// Weighted mix of the normalized strategy scores. Each item keeps the
    /// reason of the strategy that contributed most to it.
    fn blended(&self, query: &RecommendationQuery) -> Vec<Scored> {
        let mut raw: BTreeMap<ProductId, f64> = BTreeMap::new();
        let mut reasons: BTreeMap<ProductId, (f64, String)> = BTreeMap::new();

        for (algorithm, weight) in BLEND {
            for item in self.run(algorithm, query) {
                let contribution = weight * item.score;
                *raw.entry(item.product_id).or_default() += contribution;
                let best = reasons
                    .entry(item.product_id)
                    .or_insert_with(|| (f64::NEG_INFINITY, String::new()));
                if contribution > best.0 {
                    *best = (contribution, item.reason);
                }
            }
        }

        self.rank(raw, |product| {
            reasons
                .get(&product.id)
                .map(|(_, reason)| reason.clone())
                .unwrap_or_default()
        })
    }

    /// Drop non-positive scores, normalize by the maximum and order by score
    /// descending, then product id ascending.
    fn rank(
        &self,
        raw: BTreeMap<ProductId, f64>,
        reason: impl Fn(&Product) -> String,
    ) -> Vec<Scored> {
        let max = raw
            .values()
            .copied()
            .filter(|s| s.is_finite())
            .fold(0.0_f64, f64::max);
        if max <= 0.0 {
            return Vec::new();
        }

        let mut ranked: Vec<Scored> = raw
            .into_iter()
            .filter(|(_, score)| score.is_finite() && *score > 0.0)
            .filter_map(|(product_id, score)| {
                let product = self.catalog.get(&product_id).copied()?;
                Some(Scored {
                    product_id,
                    score: score / max,
                    reason: reason(product),
                })
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.product_id.cmp(&b.product_id))
        });
        ranked
    }
}
