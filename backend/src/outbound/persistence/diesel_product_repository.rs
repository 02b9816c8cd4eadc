//! PostgreSQL-backed `ProductRepository` using Diesel.
//!
//! `save` is a single `INSERT ... ON CONFLICT (id) DO UPDATE ... RETURNING`,
//! so a product is created or replaced atomically and the stored row is read
//! back in the same round trip.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use tracing::{debug, warn};

use crate::domain::ProductRecord;
use crate::domain::ports::{ProductRepository, ProductRepositoryError};

use super::models::{ProductRow, ProductUpsert};
use super::pool::{DbPool, PoolError};
use super::schema::productos;

/// Diesel-backed implementation of the [`ProductRepository`] port.
#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProductRepositoryError {
    ProductRepositoryError::connection(error.message())
}

fn map_diesel_error(error: diesel::result::Error) -> ProductRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            debug!(message = info.message(), "database connection closed");
            ProductRepositoryError::connection("database connection error")
        }
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
            ProductRepositoryError::query("database error")
        }
        other => {
            debug!(error = %other, "diesel operation failed");
            ProductRepositoryError::query("database query error")
        }
    }
}

/// Rows written by other tools may break domain rules; those are surfaced
/// as query errors rather than silently dropped.
fn row_to_product(row: ProductRow) -> Result<ProductRecord, ProductRepositoryError> {
    let ProductRow {
        id,
        title,
        price,
        thumbnail,
    } = row;
    ProductRecord::try_new(Some(id), title, price, thumbnail).map_err(|err| {
        warn!(product_id = id, error = %err, "stored product violates catalogue rules");
        ProductRepositoryError::query(format!("stored product {id} is invalid: {err}"))
    })
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn list_all(&self) -> Result<Vec<ProductRecord>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ProductRow> = productos::table
            .select(ProductRow::as_select())
            .order(productos::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_product).collect()
    }

    async fn save(&self, product: ProductRecord) -> Result<ProductRecord, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = ProductUpsert {
            id: product.id(),
            title: product.title(),
            price: product.price(),
            thumbnail: product.thumbnail(),
        };
        let stored: ProductRow = diesel::insert_into(productos::table)
            .values(&row)
            .on_conflict(productos::id)
            .do_update()
            .set((
                productos::title.eq(excluded(productos::title)),
                productos::price.eq(excluded(productos::price)),
                productos::thumbnail.eq(excluded(productos::thumbnail)),
            ))
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_product(stored)
    }
}
