use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::changes::{ChangeFeed, ChangeKind, TrackedTable};
use crate::core::error::{AppError, Result};
use crate::features::products::dtos::{
    ProductFormDto, ProductListQuery, ProductResponseDto, SetCompatibilitiesDto,
};
use crate::features::products::models::Product;

const PRODUCT_COLUMNS: &str = r#"
    id, name, brand, description, price_label, image_url, datasheet_url,
    available, accessories, category_id,
    weight_class, engine_power, operating_weight, bucket_capacity,
    max_digging_depth, max_dumping_height, transport_width,
    fuel_tank_capacity, hydraulic_flow,
    created_at, updated_at
"#;

/// Service for catalog items and their compatibility links
pub struct ProductService {
    pool: PgPool,
    changes: Arc<ChangeFeed>,
}

impl ProductService {
    pub fn new(pool: PgPool, changes: Arc<ChangeFeed>) -> Self {
        Self { pool, changes }
    }

    /// Public catalog listing with optional flag/category filters
    pub async fn list(&self, query: &ProductListQuery) -> Result<Vec<ProductResponseDto>> {
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE ($1::boolean IS NULL OR accessories = $1)
              AND ($2::boolean IS NULL OR available = $2)
              AND ($3::uuid IS NULL OR category_id = $3)
            ORDER BY created_at DESC
            LIMIT $4
            "#
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(query.accessories)
            .bind(query.available)
            .bind(query.category_id)
            .bind(query.limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list products: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(products.into_iter().map(|p| p.into()).collect())
    }

    /// Full catalog load for the admin products view. Filtering happens
    /// in memory over the wholesale load, mirroring the console behavior.
    pub async fn list_admin(&self, search: Option<&str>) -> Result<Vec<ProductResponseDto>> {
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            ORDER BY created_at DESC
            "#
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list products: {:?}", e);
                AppError::Database(e)
            })?;

        let filtered = match search {
            Some(term) if !term.trim().is_empty() => products
                .into_iter()
                .filter(|p| matches_search(p, term))
                .collect(),
            _ => products,
        };

        Ok(filtered.into_iter().map(|p| p.into()).collect())
    }

    /// Get a single product
    pub async fn get(&self, id: Uuid) -> Result<ProductResponseDto> {
        let product = self.fetch(id).await?;
        Ok(product.into())
    }

    /// Create a catalog item
    pub async fn create(&self, dto: ProductFormDto) -> Result<ProductResponseDto> {
        let sql = format!(
            r#"
            INSERT INTO products (
                name, brand, description, price_label, image_url, datasheet_url,
                available, accessories, category_id,
                weight_class, engine_power, operating_weight, bucket_capacity,
                max_digging_depth, max_dumping_height, transport_width,
                fuel_tank_capacity, hydraulic_flow
            ) VALUES (
                $1, $2, $3, $4, $5, $6,
                $7, $8, $9,
                $10, $11, $12, $13,
                $14, $15, $16,
                $17, $18
            )
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(&dto.name)
            .bind(&dto.brand)
            .bind(&dto.description)
            .bind(&dto.price_label)
            .bind(&dto.image_url)
            .bind(&dto.datasheet_url)
            .bind(dto.available)
            .bind(dto.accessories)
            .bind(dto.category_id)
            .bind(&dto.weight_class)
            .bind(&dto.engine_power)
            .bind(&dto.operating_weight)
            .bind(&dto.bucket_capacity)
            .bind(&dto.max_digging_depth)
            .bind(&dto.max_dumping_height)
            .bind(&dto.transport_width)
            .bind(&dto.fuel_tank_capacity)
            .bind(&dto.hydraulic_flow)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create product: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Product created: id={}, name={}", product.id, product.name);
        self.changes
            .publish(TrackedTable::Products, ChangeKind::Insert, product.id);

        Ok(product.into())
    }

    /// Full update of a catalog item (the admin form covers every attribute)
    pub async fn update(&self, id: Uuid, dto: ProductFormDto) -> Result<ProductResponseDto> {
        let sql = format!(
            r#"
            UPDATE products SET
                name = $1, brand = $2, description = $3, price_label = $4,
                image_url = $5, datasheet_url = $6,
                available = $7, accessories = $8, category_id = $9,
                weight_class = $10, engine_power = $11, operating_weight = $12,
                bucket_capacity = $13, max_digging_depth = $14,
                max_dumping_height = $15, transport_width = $16,
                fuel_tank_capacity = $17, hydraulic_flow = $18,
                updated_at = now()
            WHERE id = $19
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(&dto.name)
            .bind(&dto.brand)
            .bind(&dto.description)
            .bind(&dto.price_label)
            .bind(&dto.image_url)
            .bind(&dto.datasheet_url)
            .bind(dto.available)
            .bind(dto.accessories)
            .bind(dto.category_id)
            .bind(&dto.weight_class)
            .bind(&dto.engine_power)
            .bind(&dto.operating_weight)
            .bind(&dto.bucket_capacity)
            .bind(&dto.max_digging_depth)
            .bind(&dto.max_dumping_height)
            .bind(&dto.transport_width)
            .bind(&dto.fuel_tank_capacity)
            .bind(&dto.hydraulic_flow)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update product: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        self.changes
            .publish(TrackedTable::Products, ChangeKind::Update, product.id);

        Ok(product.into())
    }

    /// Delete a catalog item (compatibility links cascade)
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query(r#"DELETE FROM products WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete product: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product not found".to_string()));
        }

        tracing::info!("Product deleted: id={}", id);
        self.changes
            .publish(TrackedTable::Products, ChangeKind::Delete, id);

        Ok(())
    }

    /// Compatible items for a product: machines when the product is an
    /// accessory, accessories when it is a machine.
    pub async fn list_compatible(&self, id: Uuid) -> Result<Vec<ProductResponseDto>> {
        let product = self.fetch(id).await?;

        let sql = if product.accessories {
            format!(
                r#"
                SELECT {PRODUCT_COLUMNS}
                FROM products
                WHERE id IN (
                    SELECT product_id FROM accessories_products WHERE accessory_id = $1
                )
                ORDER BY name
                "#
            )
        } else {
            format!(
                r#"
                SELECT {PRODUCT_COLUMNS}
                FROM products
                WHERE id IN (
                    SELECT accessory_id FROM accessories_products WHERE product_id = $1
                )
                ORDER BY name
                "#
            )
        };

        let items = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list compatible items: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(items.into_iter().map(|p| p.into()).collect())
    }

    /// Replace the compatibility link set of a product
    pub async fn set_compatibilities(&self, id: Uuid, dto: SetCompatibilitiesDto) -> Result<()> {
        let product = self.fetch(id).await?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let (delete_sql, link_column_first) = if product.accessories {
            (r#"DELETE FROM accessories_products WHERE accessory_id = $1"#, true)
        } else {
            (r#"DELETE FROM accessories_products WHERE product_id = $1"#, false)
        };

        sqlx::query(delete_sql)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to clear compatibility links: {:?}", e);
                AppError::Database(e)
            })?;

        for other in &dto.product_ids {
            let (accessory_id, product_id) = if link_column_first {
                (id, *other)
            } else {
                (*other, id)
            };

            sqlx::query(
                r#"
                INSERT INTO accessories_products (accessory_id, product_id)
                VALUES ($1, $2)
                ON CONFLICT (accessory_id, product_id) DO NOTHING
                "#,
            )
            .bind(accessory_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert compatibility link: {:?}", e);
                AppError::Database(e)
            })?;
        }

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit compatibility links: {:?}", e);
            AppError::Database(e)
        })?;

        self.changes
            .publish(TrackedTable::Products, ChangeKind::Update, id);

        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Product> {
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE id = $1
            "#
        );

        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch product: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }
}

/// Case-insensitive free-text match over name, brand and description
pub fn matches_search(product: &Product, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    let haystacks = [
        Some(product.name.as_str()),
        product.brand.as_deref(),
        product.description.as_deref(),
    ];

    haystacks
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(name: &str, brand: Option<&str>, description: Option<&str>) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            brand: brand.map(String::from),
            description: description.map(String::from),
            price_label: None,
            image_url: None,
            datasheet_url: None,
            available: true,
            accessories: false,
            category_id: None,
            weight_class: None,
            engine_power: None,
            operating_weight: None,
            bucket_capacity: None,
            max_digging_depth: None,
            max_dumping_height: None,
            transport_width: None,
            fuel_tank_capacity: None,
            hydraulic_flow: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn search_is_case_insensitive() {
        let p = product("Pelle compacte TB320", Some("Takeuchi"), None);
        assert!(matches_search(&p, "takeuchi"));
        assert!(matches_search(&p, "TB320"));
        assert!(matches_search(&p, "PELLE"));
    }

    #[test]
    fn search_covers_name_brand_and_description() {
        let p = product(
            "Godet 600mm",
            Some("Klac"),
            Some("Godet de curage pour mini-pelle"),
        );
        assert!(matches_search(&p, "godet"));
        assert!(matches_search(&p, "klac"));
        assert!(matches_search(&p, "curage"));
        assert!(!matches_search(&p, "takeuchi"));
    }

    #[test]
    fn search_ignores_missing_fields() {
        let p = product("Dumper", None, None);
        assert!(matches_search(&p, "dumper"));
        assert!(!matches_search(&p, "takeuchi"));
    }

    #[test]
    fn blank_search_matches_everything() {
        let p = product("Dumper", None, None);
        assert!(matches_search(&p, ""));
        assert!(matches_search(&p, "   "));
    }
}
