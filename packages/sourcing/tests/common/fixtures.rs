//! Test fixtures for creating test data.
//!
//! Ids are derived from small integers so orderings are predictable.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use sourcing_core::common::{OrganizationId, ProductId, SupplierId, UserId};
use sourcing_core::domains::intake::RequirementInput;
use sourcing_core::domains::products::models::{PriceRange, Product, RobotCategory};
use sourcing_core::domains::recommendations::models::{
    Interaction, InteractionKind, SignalSnapshot,
};
use std::collections::BTreeMap;
use uuid::Uuid;

pub const BUYER_ORG: &str = "0190f7d2-6a4e-7c1a-9b3e-2f4d5c6b7a80";
pub const BUYER_USER: &str = "0190f7d2-6a4e-7c1a-9b3e-2f4d5c6b7a81";

pub fn product_id(n: u128) -> ProductId {
    ProductId::from_uuid(Uuid::from_u128(n))
}

pub fn user_id(n: u128) -> UserId {
    UserId::from_uuid(Uuid::from_u128(10_000 + n))
}

pub fn org_id(n: u128) -> OrganizationId {
    OrganizationId::from_uuid(Uuid::from_u128(20_000 + n))
}

pub fn supplier_id(n: u128) -> SupplierId {
    SupplierId::from_uuid(Uuid::from_u128(30_000 + n))
}

/// Bare listing with only identity and category
pub fn listing(n: u128, category: RobotCategory) -> Product {
    Product::builder()
        .id(product_id(n))
        .supplier_id(supplier_id(n % 3))
        .sku(format!("SKU-{n:04}"))
        .title(format!("Robot {n}"))
        .category(category)
        .build()
}

/// Six-axis arm with the usual capability fields filled in
pub fn six_axis_arm(n: u128, payload_kg: f64, price: i64) -> Product {
    Product::builder()
        .id(product_id(n))
        .supplier_id(supplier_id(n % 3))
        .sku(format!("ARM-{n:04}"))
        .title(format!("Six-axis arm {n}"))
        .category(RobotCategory::SixAxis)
        .payload_kg(payload_kg)
        .reach_mm(1400.0)
        .repeatability_mm(0.03)
        .ip_rating("IP67")
        .price(PriceRange::single(Decimal::from(price)))
        .lead_time_days(28)
        .warranty_months(24)
        .build()
}

/// Minimal valid intake input
pub fn requirement_input(category: &str) -> RequirementInput {
    RequirementInput {
        organization_id: Some(BUYER_ORG.to_string()),
        submitted_by: Some(BUYER_USER.to_string()),
        category: Some(category.to_string()),
        ..Default::default()
    }
}

pub fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
}

pub fn interaction(
    user: u128,
    org: u128,
    product: u128,
    kind: InteractionKind,
    days_ago: i64,
) -> Interaction {
    Interaction {
        user_id: user_id(user),
        organization_id: org_id(org),
        product_id: product_id(product),
        kind,
        occurred_at: as_of() - Duration::days(days_ago),
    }
}

pub fn snapshot(catalog: Vec<Product>, interactions: Vec<Interaction>) -> SignalSnapshot {
    SignalSnapshot {
        catalog,
        interactions,
        industries: BTreeMap::new(),
        as_of: as_of(),
    }
}

/// `count` listings cycling through every category
pub fn mixed_catalog(count: u128) -> Vec<Product> {
    let categories = [
        RobotCategory::SixAxis,
        RobotCategory::Scara,
        RobotCategory::Delta,
        RobotCategory::Cartesian,
        RobotCategory::Collaborative,
        RobotCategory::Palletizing,
    ];
    (1..=count)
        .map(|n| listing(n, categories[(n as usize) % categories.len()]))
        .collect()
}
