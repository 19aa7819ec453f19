//! Product catalog queries

use sqlx::SqlitePool;
use pim_common::Result;

use crate::models::ProductRecord;

/// Load catalog products for a reconciliation scan.
///
/// The scan deliberately sees the whole catalog by default, archived rows
/// included; pass `include_archived = false` to apply the same exclusion the
/// inventory listing uses. Rows come back in stable id order so repeated
/// scans produce identical reports.
pub async fn load_products(pool: &SqlitePool, include_archived: bool) -> Result<Vec<ProductRecord>> {
    let sql = if include_archived {
        "SELECT id, sku, photo_id, name_en, name_es, name, category, image
         FROM products ORDER BY id"
    } else {
        "SELECT id, sku, photo_id, name_en, name_es, name, category, image
         FROM products WHERE archived = 0 ORDER BY id"
    };

    type ProductRow = (
        String,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
    );

    let rows: Vec<ProductRow> = sqlx::query_as(sql).fetch_all(pool).await?;

    tracing::debug!(
        count = rows.len(),
        include_archived,
        "Loaded products for reconciliation"
    );

    Ok(rows
        .into_iter()
        .map(
            |(id, sku, photo_id, name_en, name_es, name, category, image)| ProductRecord {
                id,
                sku,
                photo_id,
                name_en,
                name_es,
                name,
                category,
                image,
            },
        )
        .collect())
}

/// Insert or replace a product row
pub async fn upsert_product(
    pool: &SqlitePool,
    product: &ProductRecord,
    archived: bool,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO products
            (id, sku, photo_id, name_en, name_es, name, category, image, archived)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&product.id)
    .bind(&product.sku)
    .bind(&product.photo_id)
    .bind(&product.name_en)
    .bind(&product.name_es)
    .bind(&product.name)
    .bind(&product.category)
    .bind(&product.image)
    .bind(archived as i64)
    .execute(pool)
    .await?;

    tracing::debug!(id = %product.id, "Upserted product");

    Ok(())
}
