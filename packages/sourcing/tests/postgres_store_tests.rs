//! The sqlx collaborators against a real Postgres.

mod common;

use crate::common::*;
use sourcing_core::common::{CoreError, OrganizationId, ProductId};
use sourcing_core::domains::intake::activities::{get_matches, submit_requirement};
use sourcing_core::domains::intake::{normalize_requirement, IntakeStatus, RequirementInput};
use sourcing_core::domains::matching::{match_candidates, ProductMatch};
use sourcing_core::domains::products::models::{Product, ProductStatus, RobotCategory};
use test_context::test_context;

fn buyer_org() -> OrganizationId {
    OrganizationId::parse(BUYER_ORG).unwrap()
}

fn payload_input(payload_kg: f64) -> RequirementInput {
    let mut input = requirement_input("six_axis");
    input.payload_kg = Some(payload_kg);
    input
}

async fn seed_arms(ctx: &PgHarness) -> Vec<Product> {
    ctx.seed_organization(buyer_org(), Some("Packaging"))
        .await
        .unwrap();
    let arms = vec![
        six_axis_arm(1, 10.0, 30_000),
        six_axis_arm(2, 50.0, 70_000),
        six_axis_arm(3, 8.0, 25_000),
    ];
    for arm in &arms {
        ctx.seed_product(arm).await.unwrap();
    }
    arms
}

#[test_context(PgHarness)]
#[tokio::test]
async fn eligible_candidates_skip_drafts_deleted_and_other_categories(ctx: &PgHarness) {
    let published = six_axis_arm(1, 10.0, 30_000);
    let scara = listing(2, RobotCategory::Scara);
    let mut draft = six_axis_arm(3, 10.0, 30_000);
    draft.status = ProductStatus::Draft;
    let deleted = six_axis_arm(4, 10.0, 30_000);
    for product in [&published, &scara, &draft, &deleted] {
        ctx.seed_product(product).await.unwrap();
    }
    sqlx::query("UPDATE products SET deleted_at = NOW() WHERE id = $1")
        .bind(deleted.id)
        .execute(&ctx.pool)
        .await
        .unwrap();

    let six_axis = ctx
        .deps
        .candidates
        .eligible_candidates(Some(RobotCategory::SixAxis))
        .await
        .unwrap();
    assert_eq!(six_axis, vec![published.clone()]);

    let any: Vec<ProductId> = ctx
        .deps
        .candidates
        .eligible_candidates(None)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(any, vec![published.id, scara.id]);
}

#[test_context(PgHarness)]
#[tokio::test]
async fn stored_requirement_reads_back_unchanged(ctx: &PgHarness) {
    ctx.seed_organization(buyer_org(), None).await.unwrap();
    let mut input = payload_input(12.5);
    input.ip_rating = Some("ip67".into());
    input.max_lead_time_days = Some(45);
    input.specs = Some(serde_json::json!({ "io": { "digital": 16 } }));
    let new = normalize_requirement(input).unwrap();
    let criteria = new.criteria.clone();

    let created = ctx.deps.match_store.create_requirement(new).await.unwrap();
    let found = ctx
        .deps
        .match_store
        .find_requirement(created.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(found.criteria, criteria);
    assert_eq!(found.status, IntakeStatus::Pending);
    assert!(found.matched_at.is_none());
}

#[test_context(PgHarness)]
#[tokio::test]
async fn submission_persists_the_ranked_run(ctx: &PgHarness) {
    seed_arms(ctx).await;

    let outcome = submit_requirement(payload_input(10.0), &ctx.deps)
        .await
        .unwrap();

    let ranked: Vec<(ProductId, i32)> = outcome
        .matches
        .iter()
        .map(|m| (m.result.product_id, m.rank))
        .collect();
    assert_eq!(ranked[0], (product_id(1), 1));
    assert_eq!(ranked.len(), 3);

    let stored = ctx
        .deps
        .match_store
        .find_requirement(outcome.requirement.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, IntakeStatus::Matched);
    assert!(stored.matched_at.is_some());
    assert_eq!(outcome.requirement.matched_at, stored.matched_at);

    let listed: Vec<(ProductId, i32)> =
        get_matches(&outcome.requirement.id.to_string(), &ctx.deps)
            .await
            .unwrap()
            .iter()
            .map(|m| (m.result.product_id, m.rank))
            .collect();
    assert_eq!(listed, ranked);
}

#[test_context(PgHarness)]
#[tokio::test]
async fn failing_insert_rolls_back_status_and_rows(ctx: &PgHarness) {
    let arms = seed_arms(ctx).await;
    let new = normalize_requirement(payload_input(10.0)).unwrap();
    let requirement = ctx.deps.match_store.create_requirement(new).await.unwrap();

    let results = match_candidates(&requirement.criteria, &arms).unwrap();
    let mut matches = ProductMatch::from_results(requirement.id, results.clone());
    // Third insert collides with the first primary key
    matches[2].id = matches[0].id;

    let err = ctx
        .deps
        .match_store
        .record_matches(requirement.id, &matches)
        .await;
    assert!(err.is_err());

    let after = ctx
        .deps
        .match_store
        .find_requirement(requirement.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.status, IntakeStatus::Pending);
    assert!(after.matched_at.is_none());
    assert_eq!(ctx.count_matches().await.unwrap(), 0);

    // The pending requirement can still be matched afterwards
    let retry = ProductMatch::from_results(requirement.id, results);
    let written = ctx
        .deps
        .match_store
        .record_matches(requirement.id, &retry)
        .await
        .unwrap();
    assert_eq!(written, 3);
    assert_eq!(ctx.count_matches().await.unwrap(), 3);
}

#[test_context(PgHarness)]
#[tokio::test]
async fn matched_requirement_refuses_a_second_run(ctx: &PgHarness) {
    let arms = seed_arms(ctx).await;
    let outcome = submit_requirement(payload_input(10.0), &ctx.deps)
        .await
        .unwrap();

    let results = match_candidates(&outcome.requirement.criteria, &arms).unwrap();
    let again = ProductMatch::from_results(outcome.requirement.id, results);

    assert!(ctx
        .deps
        .match_store
        .record_matches(outcome.requirement.id, &again)
        .await
        .is_err());
    assert_eq!(ctx.count_matches().await.unwrap(), 3);
}

#[test_context(PgHarness)]
#[tokio::test]
async fn malformed_listing_fails_the_run_and_keeps_it_pending(ctx: &PgHarness) {
    seed_arms(ctx).await;
    ctx.seed_product_with_category(&listing(9, RobotCategory::Delta), "hexapod")
        .await
        .unwrap();

    let err = submit_requirement(requirement_input("any"), &ctx.deps)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::DataUnavailable(_)));
    assert!(err.is_retryable());
    let status: String = sqlx::query_scalar("SELECT status FROM requirements")
        .fetch_one(&ctx.pool)
        .await
        .unwrap();
    assert_eq!(status, "pending");
    assert_eq!(ctx.count_matches().await.unwrap(), 0);
}

#[test_context(PgHarness)]
#[tokio::test]
async fn snapshot_loads_the_trailing_window(ctx: &PgHarness) {
    let arms = seed_arms(ctx).await;
    let peer = org_id(2);
    ctx.seed_organization(peer, Some("  Automotive ")).await.unwrap();

    for (org, product, kind, days_ago) in [
        (buyer_org(), arms[0].id, "view", 1),
        (peer, arms[1].id, "order", 5),
        (peer, arms[2].id, "quote", 40),
    ] {
        sqlx::query(
            r#"
            INSERT INTO interaction_events (
                id, user_id, organization_id, product_id, kind, occurred_at
            )
            VALUES ($1, $2, $3, $4, $5, NOW() - make_interval(days => $6))
            "#,
        )
        .bind(uuid::Uuid::new_v4())
        .bind(user_id(1))
        .bind(org)
        .bind(product)
        .bind(kind)
        .bind(days_ago)
        .execute(&ctx.pool)
        .await
        .unwrap();
    }

    let snapshot = ctx.deps.signals.load_snapshot(30).await.unwrap();

    assert_eq!(snapshot.catalog.len(), 3);
    let seen: Vec<ProductId> = snapshot.interactions.iter().map(|i| i.product_id).collect();
    assert_eq!(seen, vec![arms[1].id, arms[0].id]);
    assert_eq!(snapshot.industries.get(&peer).map(String::as_str), Some("automotive"));
    assert_eq!(
        snapshot.industries.get(&buyer_org()).map(String::as_str),
        Some("packaging")
    );
}
