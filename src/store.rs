//! SQLite-backed product price store.

use crate::amazon::PriceQuote;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

const CREATE_PRODUCT_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS product (
        product_id  INTEGER PRIMARY KEY AUTOINCREMENT,
        asin        TEXT NOT NULL UNIQUE,
        price       REAL NULL,
        currency    VARCHAR(12) NULL,
        name        TEXT NULL,
        description VARCHAR(255) NULL
    )
"#;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("product {asin} was written concurrently")]
    Conflict { asin: String },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// One row of the `product` table.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ProductRecord {
    pub product_id: i64,
    pub asin: String,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Handle to the product table. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ProductStore {
    pool: SqlitePool,
}

impl ProductStore {
    /// Opens (creating if missing) the database file and its table.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new().filename(path).create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|source| StoreError::Open { path: path.display().to_string(), source })?;

        info!("Opened product store at {}", path.display());
        Self::with_pool(pool).await
    }

    /// Opens a private in-memory database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        // Every in-memory connection is its own database, so pin the pool to one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|source| StoreError::Open { path: ":memory:".to_string(), source })?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::query(CREATE_PRODUCT_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// Stores the latest price for an ASIN, updating the existing row if any.
    pub async fn upsert(&self, asin: &str, quote: &PriceQuote) -> Result<ProductRecord, StoreError> {
        let existing = self.get(asin).await?;

        let result = if existing.is_some() {
            debug!("Updating price for {}", asin);
            sqlx::query("UPDATE product SET price = ?, currency = ? WHERE asin = ?")
                .bind(quote.price)
                .bind(&quote.currency)
                .bind(asin)
                .execute(&self.pool)
                .await
        } else {
            debug!("Inserting product {}", asin);
            sqlx::query(
                "INSERT INTO product (asin, price, currency, name, description) \
                 VALUES (?, ?, ?, NULL, NULL)",
            )
            .bind(asin)
            .bind(quote.price)
            .bind(&quote.currency)
            .execute(&self.pool)
            .await
        };

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(StoreError::Conflict { asin: asin.to_string() });
            }
            Err(e) => return Err(e.into()),
        }

        self.get(asin).await?.ok_or_else(|| StoreError::Database(sqlx::Error::RowNotFound))
    }

    /// Returns the stored record for an ASIN.
    pub async fn get(&self, asin: &str) -> Result<Option<ProductRecord>, StoreError> {
        let record = sqlx::query_as::<_, ProductRecord>(
            "SELECT product_id, asin, price, currency, name, description \
             FROM product WHERE asin = ?",
        )
        .bind(asin)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Returns the number of stored products.
    pub async fn count(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Closes the pool, waiting for connections to finish.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
impl ProductStore {
    /// Installs a trigger that writes the row for a new ASIN just before
    /// `upsert` inserts it, as a concurrent writer would after the existence
    /// check.
    pub(crate) async fn race_next_insert(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TRIGGER IF NOT EXISTS racing_writer BEFORE INSERT ON product \
             WHEN NOT EXISTS (SELECT 1 FROM product WHERE asin = NEW.asin) \
             BEGIN INSERT INTO product (asin, price) VALUES (NEW.asin, 0.0); END",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
