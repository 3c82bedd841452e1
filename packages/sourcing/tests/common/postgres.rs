//! Harness over a real Postgres for exercising the sqlx collaborators.
//!
//! One container is started per test binary and reused. Each harness gets its
//! own freshly migrated database, so tests never see each other's rows.

use anyhow::{Context, Result};
use sourcing_core::common::{OrganizationId, SupplierId};
use sourcing_core::domains::products::models::Product;
use sourcing_core::kernel::{PgStore, ServerDeps};
use sourcing_core::Config;
use sqlx::types::Json;
use sqlx::PgPool;
use std::sync::Arc;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use super::harness::init_tracing;

/// Container shared by every test in the binary.
struct SharedPostgres {
    base_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_POSTGRES: OnceCell<SharedPostgres> = OnceCell::const_new();

impl SharedPostgres {
    async fn init() -> Result<Self> {
        init_tracing();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let host = postgres.get_host().await?;
        let port = postgres.get_host_port_ipv4(5432).await?;

        Ok(Self {
            base_url: format!("postgresql://postgres:postgres@{}:{}", host, port),
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_POSTGRES
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared Postgres container")
            })
            .await
    }
}

/// A migrated, empty database plus the Pg collaborators wired to it.
///
/// ```ignore
/// #[test_context(PgHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &PgHarness) { /* ... */ }
/// ```
pub struct PgHarness {
    pub pool: PgPool,
    pub deps: ServerDeps,
}

impl AsyncTestContext for PgHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create Postgres harness")
    }

    async fn teardown(self) {
        self.pool.close().await;
    }
}

impl PgHarness {
    pub async fn new() -> Result<Self> {
        let shared = SharedPostgres::get().await;

        let admin = PgPool::connect(&format!("{}/postgres", shared.base_url))
            .await
            .context("Failed to connect to the admin database")?;
        let database = format!("sourcing_{}", Uuid::new_v4().simple());
        sqlx::raw_sql(&format!("CREATE DATABASE {}", database))
            .execute(&admin)
            .await
            .context("Failed to create test database")?;
        admin.close().await;

        let pool = PgPool::connect(&format!("{}/{}", shared.base_url, database))
            .await
            .context("Failed to connect to test database")?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        let config = Config {
            database_url: String::new(),
            database_max_connections: 5,
            signal_window_days: sourcing_core::DEFAULT_SIGNAL_WINDOW_DAYS,
            recommendation_default_limit: sourcing_core::DEFAULT_RECOMMENDATION_LIMIT,
        };
        let store = Arc::new(PgStore::new(pool.clone()));
        let deps = ServerDeps::new(store.clone(), store.clone(), store, &config);

        Ok(Self { pool, deps })
    }

    pub async fn seed_organization(
        &self,
        id: OrganizationId,
        industry: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO organizations (id, name, industry)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(format!("Organization {}", id))
        .bind(industry)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert a listing, creating its supplier organization if needed.
    pub async fn seed_product(&self, product: &Product) -> Result<()> {
        self.seed_organization(supplier_org(product.supplier_id), None)
            .await?;
        self.insert_product_row(product, product.category.as_str())
            .await
    }

    /// Insert a listing whose stored category is arbitrary text.
    pub async fn seed_product_with_category(
        &self,
        product: &Product,
        category: &str,
    ) -> Result<()> {
        self.seed_organization(supplier_org(product.supplier_id), None)
            .await?;
        self.insert_product_row(product, category).await
    }

    async fn insert_product_row(&self, product: &Product, category: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, supplier_id, sku, title, category,
                payload_kg, reach_mm, repeatability_mm, speed_mps,
                ip_rating, controller, specs,
                price_min, price_max, currency, lead_time_days,
                warranty_months, includes_installation, support_tier, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            "#,
        )
        .bind(product.id)
        .bind(product.supplier_id)
        .bind(&product.sku)
        .bind(&product.title)
        .bind(category)
        .bind(product.payload_kg)
        .bind(product.reach_mm)
        .bind(product.repeatability_mm)
        .bind(product.speed_mps)
        .bind(&product.ip_rating)
        .bind(&product.controller)
        .bind(Json(&product.specs))
        .bind(product.price.map(|p| p.min))
        .bind(product.price.map(|p| p.max))
        .bind(&product.currency)
        .bind(product.lead_time_days)
        .bind(product.warranty_months)
        .bind(product.includes_installation)
        .bind(&product.support_tier)
        .bind(product.status.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn count_matches(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM product_matches")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Suppliers are organizations; the listing only carries the typed id.
pub fn supplier_org(id: SupplierId) -> OrganizationId {
    OrganizationId::from_uuid(id.into_uuid())
}
