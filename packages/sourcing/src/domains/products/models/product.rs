use anyhow::{Context, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::BTreeMap;
use tracing::warn;
use typed_builder::TypedBuilder;

use crate::common::{ProductId, SupplierId, ValidationError};

/// Robot families listed in the catalog.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RobotCategory {
    SixAxis,
    Scara,
    Delta,
    Cartesian,
    Collaborative,
    Palletizing,
}

impl RobotCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RobotCategory::SixAxis => "six_axis",
            RobotCategory::Scara => "scara",
            RobotCategory::Delta => "delta",
            RobotCategory::Cartesian => "cartesian",
            RobotCategory::Collaborative => "collaborative",
            RobotCategory::Palletizing => "palletizing",
        }
    }
}

impl std::fmt::Display for RobotCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RobotCategory {
    type Err = ValidationError;

    /// Accepts `SixAxis`, `six_axis`, `six-axis`, `SCARA`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "sixaxis" | "6axis" | "articulated" => Ok(RobotCategory::SixAxis),
            "scara" => Ok(RobotCategory::Scara),
            "delta" => Ok(RobotCategory::Delta),
            "cartesian" | "gantry" => Ok(RobotCategory::Cartesian),
            "collaborative" | "cobot" => Ok(RobotCategory::Collaborative),
            "palletizing" | "palletiser" | "palletizer" => Ok(RobotCategory::Palletizing),
            _ => Err(ValidationError::UnknownCategory(s.to_string())),
        }
    }
}

/// Product publication status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductStatus::Draft => write!(f, "draft"),
            ProductStatus::Published => write!(f, "published"),
            ProductStatus::Archived => write!(f, "archived"),
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "draft" => Ok(ProductStatus::Draft),
            "published" => Ok(ProductStatus::Published),
            "archived" => Ok(ProductStatus::Archived),
            _ => Err(anyhow::anyhow!("Invalid product status: {}", s)),
        }
    }
}

/// Inclusive price band in the listing currency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceRange {
    /// Builds a band, swapping the bounds if they arrive reversed.
    pub fn new(min: Decimal, max: Decimal) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn single(price: Decimal) -> Self {
        Self {
            min: price,
            max: price,
        }
    }

    /// Band from optional bounds; one bound alone is a fixed price.
    pub fn from_bounds(min: Option<Decimal>, max: Option<Decimal>) -> Option<Self> {
        match (min, max) {
            (Some(min), Some(max)) => Some(Self::new(min, max)),
            (Some(price), None) | (None, Some(price)) => Some(Self::single(price)),
            (None, None) => None,
        }
    }

    pub fn min_f64(&self) -> f64 {
        self.min.to_f64().unwrap_or(0.0)
    }

    pub fn max_f64(&self) -> f64 {
        self.max.to_f64().unwrap_or(f64::MAX)
    }
}

/// Supplier catalog listing, as consumed by matching and recommendations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct Product {
    #[builder(default = ProductId::new())]
    pub id: ProductId,
    #[builder(default = SupplierId::new())]
    pub supplier_id: SupplierId,
    #[builder(default)]
    pub sku: String,
    #[builder(default)]
    pub title: String,
    pub category: RobotCategory,

    // Capabilities
    #[builder(default, setter(strip_option))]
    pub payload_kg: Option<f64>,
    #[builder(default, setter(strip_option))]
    pub reach_mm: Option<f64>,
    #[builder(default, setter(strip_option))]
    pub repeatability_mm: Option<f64>,
    #[builder(default, setter(strip_option))]
    pub speed_mps: Option<f64>,
    #[builder(default, setter(strip_option))]
    pub ip_rating: Option<String>,
    #[builder(default, setter(strip_option))]
    pub controller: Option<String>,
    #[builder(default)]
    pub specs: BTreeMap<String, String>,

    // Commercial
    #[builder(default, setter(strip_option))]
    pub price: Option<PriceRange>,
    #[builder(default = "USD".to_string())]
    pub currency: String,
    #[builder(default, setter(strip_option))]
    pub lead_time_days: Option<i32>,

    // Service
    #[builder(default, setter(strip_option))]
    pub warranty_months: Option<i32>,
    #[builder(default, setter(strip_option))]
    pub includes_installation: Option<bool>,
    #[builder(default, setter(strip_option))]
    pub support_tier: Option<String>,

    #[builder(default = ProductStatus::Published)]
    pub status: ProductStatus,
}

/// Raw `products` row. Category and status are free text in the table and
/// are validated when converting into [`Product`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: ProductId,
    pub supplier_id: SupplierId,
    pub sku: String,
    pub title: String,
    pub category: String,
    pub payload_kg: Option<f64>,
    pub reach_mm: Option<f64>,
    pub repeatability_mm: Option<f64>,
    pub speed_mps: Option<f64>,
    pub ip_rating: Option<String>,
    pub controller: Option<String>,
    pub specs: Json<BTreeMap<String, String>>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub currency: String,
    pub lead_time_days: Option<i32>,
    pub warranty_months: Option<i32>,
    pub includes_installation: Option<bool>,
    pub support_tier: Option<String>,
    pub status: String,
}

impl TryFrom<ProductRow> for Product {
    type Error = anyhow::Error;

    fn try_from(row: ProductRow) -> Result<Self> {
        let category: RobotCategory = row
            .category
            .parse()
            .with_context(|| format!("Product {} has an invalid category", row.id))?;
        let status: ProductStatus = row.status.parse()?;

        Ok(Product {
            id: row.id,
            supplier_id: row.supplier_id,
            sku: row.sku,
            title: row.title,
            category,
            payload_kg: row.payload_kg,
            reach_mm: row.reach_mm,
            repeatability_mm: row.repeatability_mm,
            speed_mps: row.speed_mps,
            ip_rating: row.ip_rating,
            controller: row.controller,
            specs: row.specs.0,
            price: PriceRange::from_bounds(row.price_min, row.price_max),
            currency: row.currency,
            lead_time_days: row.lead_time_days,
            warranty_months: row.warranty_months,
            includes_installation: row.includes_installation,
            support_tier: row.support_tier,
            status,
        })
    }
}

const PRODUCT_COLUMNS: &str = r#"
    id, supplier_id, sku, title, category,
    payload_kg, reach_mm, repeatability_mm, speed_mps,
    ip_rating, controller, specs,
    price_min, price_max, currency, lead_time_days,
    warranty_months, includes_installation, support_tier, status
"#;

impl Product {
    /// Published, non-deleted products, optionally restricted to a category.
    ///
    /// A row that fails validation fails the whole load; callers never see
    /// a partial catalog.
    pub async fn find_eligible(
        category: Option<RobotCategory>,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let query = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE status = 'published'
              AND deleted_at IS NULL
              AND ($1::text IS NULL OR category = $1)
            ORDER BY id
            "#
        );
        let rows = sqlx::query_as::<_, ProductRow>(&query)
            .bind(category.map(|c| c.as_str()))
            .fetch_all(pool)
            .await?;

        rows_into_products(rows)
    }
}

fn rows_into_products(rows: Vec<ProductRow>) -> Result<Vec<Product>> {
    rows.into_iter()
        .map(|row| {
            let id = row.id;
            Product::try_from(row).inspect_err(|e| {
                warn!(product_id = %id, error = %e, "Malformed catalog row");
            })
        })
        .collect::<Result<Vec<_>>>()
        .context("Catalog contains a malformed listing")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parsing_is_lenient_about_spelling() {
        assert_eq!("SixAxis".parse::<RobotCategory>().unwrap(), RobotCategory::SixAxis);
        assert_eq!("six-axis".parse::<RobotCategory>().unwrap(), RobotCategory::SixAxis);
        assert_eq!("SCARA".parse::<RobotCategory>().unwrap(), RobotCategory::Scara);
        assert_eq!("Cobot".parse::<RobotCategory>().unwrap(), RobotCategory::Collaborative);
    }

    #[test]
    fn unknown_category_is_a_validation_error() {
        let err = "hexapod".parse::<RobotCategory>().unwrap_err();
        assert_eq!(err, ValidationError::UnknownCategory("hexapod".to_string()));
    }

    #[test]
    fn category_round_trips_through_storage_name() {
        for category in [
            RobotCategory::SixAxis,
            RobotCategory::Scara,
            RobotCategory::Delta,
            RobotCategory::Cartesian,
            RobotCategory::Collaborative,
            RobotCategory::Palletizing,
        ] {
            assert_eq!(category.as_str().parse::<RobotCategory>().unwrap(), category);
        }
    }

    #[test]
    fn price_range_from_single_bound_is_fixed_price() {
        let range = PriceRange::from_bounds(None, Some(Decimal::from(42_000))).unwrap();
        assert_eq!(range.min, range.max);
        assert!(PriceRange::from_bounds(None, None).is_none());
    }

    #[test]
    fn price_range_swaps_reversed_bounds() {
        let range = PriceRange::new(Decimal::from(9), Decimal::from(3));
        assert_eq!(range.min, Decimal::from(3));
        assert_eq!(range.max, Decimal::from(9));
    }

    #[test]
    fn row_with_unknown_category_fails_the_load() {
        let row = ProductRow {
            id: ProductId::new(),
            supplier_id: SupplierId::new(),
            sku: "X-1".into(),
            title: "Mystery arm".into(),
            category: "hexapod".into(),
            payload_kg: None,
            reach_mm: None,
            repeatability_mm: None,
            speed_mps: None,
            ip_rating: None,
            controller: None,
            specs: Json(BTreeMap::new()),
            price_min: None,
            price_max: None,
            currency: "USD".into(),
            lead_time_days: None,
            warranty_months: None,
            includes_installation: None,
            support_tier: None,
            status: "published".into(),
        };
        let mut good = row.clone();
        good.category = "delta".into();

        let bad_id = row.id;

        let err = rows_into_products(vec![good.clone(), row]).unwrap_err();
        assert!(format!("{:#}", err).contains(&bad_id.to_string()));

        let products = rows_into_products(vec![good]).unwrap();
        assert_eq!(products[0].category, RobotCategory::Delta);
    }

    #[test]
    fn builder_defaults_to_published() {
        let product = Product::builder()
            .category(RobotCategory::Scara)
            .payload_kg(6.0)
            .build();
        assert_eq!(product.status, ProductStatus::Published);
        assert_eq!(product.currency, "USD");
        assert_eq!(product.payload_kg, Some(6.0));
    }
}
