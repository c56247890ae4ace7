use anyhow::{Context, Result};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use crate::error::CatalogError;
use crate::model::{Drink, Id, Ingredient, Variant, VariantIngredient};
use crate::store::traits::{DrinkStore, IngredientStore, VariantStore};

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Translate driver errors into the catalog taxonomy: unique violations
/// become conflicts, foreign-key violations become referential-integrity
/// failures, everything else is internal.
fn map_db_err(err: sqlx::Error, what: &str) -> CatalogError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some("23505") => return CatalogError::Conflict(format!("{} already exists", what)),
            Some("23503") => {
                return CatalogError::ReferentialIntegrity(format!(
                    "{} references a record that does not exist",
                    what
                ))
            }
            _ => {}
        }
    }
    CatalogError::Internal(anyhow::Error::new(err).context(format!("{} query failed", what)))
}

fn row_to_ingredient(row: &PgRow) -> Ingredient {
    Ingredient {
        id: row.get("id"),
        name: row.get("name"),
        price: row.get("price"),
        content_size: row.get("content_size"),
        unit: row.get("unit"),
        created_at: row.get("created_at"),
    }
}

fn row_to_drink(row: &PgRow) -> Drink {
    Drink {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        created_at: row.get("created_at"),
    }
}

fn row_to_variant(row: &PgRow) -> Variant {
    Variant {
        id: row.get("id"),
        drink_id: row.get("drink_id"),
        name: row.get("name"),
        size_oz: row.get("size_oz"),
        profit: row.get("profit"),
        created_at: row.get("created_at"),
    }
}

#[async_trait::async_trait]
impl IngredientStore for PostgresStore {
    async fn get_ingredient(&self, id: &Id) -> Result<Option<Ingredient>, CatalogError> {
        let row = sqlx::query(
            "SELECT id, name, price, content_size, unit, created_at FROM ingredients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "Ingredient"))?;

        Ok(row.as_ref().map(row_to_ingredient))
    }

    async fn list_ingredients(&self) -> Result<Vec<Ingredient>, CatalogError> {
        let rows = sqlx::query(
            "SELECT id, name, price, content_size, unit, created_at FROM ingredients ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "Ingredient"))?;

        Ok(rows.iter().map(row_to_ingredient).collect())
    }

    async fn find_ingredient_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Ingredient>, CatalogError> {
        let row = sqlx::query(
            "SELECT id, name, price, content_size, unit, created_at FROM ingredients WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "Ingredient"))?;

        Ok(row.as_ref().map(row_to_ingredient))
    }

    async fn insert_ingredient(&self, ingredient: Ingredient) -> Result<(), CatalogError> {
        sqlx::query(
            "INSERT INTO ingredients (id, name, price, content_size, unit, created_at) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&ingredient.id)
        .bind(&ingredient.name)
        .bind(ingredient.price)
        .bind(ingredient.content_size)
        .bind(&ingredient.unit)
        .bind(&ingredient.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "Ingredient"))?;

        Ok(())
    }

    async fn update_ingredient(&self, ingredient: Ingredient) -> Result<(), CatalogError> {
        let result = sqlx::query(
            "UPDATE ingredients SET name = $2, price = $3, content_size = $4, unit = $5 WHERE id = $1",
        )
        .bind(&ingredient.id)
        .bind(&ingredient.name)
        .bind(ingredient.price)
        .bind(ingredient.content_size)
        .bind(&ingredient.unit)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "Ingredient"))?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::not_found("Ingredient not found"));
        }
        Ok(())
    }

    async fn delete_ingredient(&self, id: &Id) -> Result<bool, CatalogError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_err(e, "Ingredient"))?;

        sqlx::query("DELETE FROM variant_ingredients WHERE ingredient_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_err(e, "Variant link"))?;

        let result = sqlx::query("DELETE FROM ingredients WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_err(e, "Ingredient"))?;

        tx.commit().await.map_err(|e| map_db_err(e, "Ingredient"))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl DrinkStore for PostgresStore {
    async fn get_drink(&self, id: &Id) -> Result<Option<Drink>, CatalogError> {
        let row = sqlx::query("SELECT id, name, description, created_at FROM drinks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "Drink"))?;

        Ok(row.as_ref().map(row_to_drink))
    }

    async fn list_drinks(&self) -> Result<Vec<Drink>, CatalogError> {
        let rows =
            sqlx::query("SELECT id, name, description, created_at FROM drinks ORDER BY created_at, id")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| map_db_err(e, "Drink"))?;

        Ok(rows.iter().map(row_to_drink).collect())
    }

    async fn find_drink_by_name(&self, name: &str) -> Result<Option<Drink>, CatalogError> {
        let row =
            sqlx::query("SELECT id, name, description, created_at FROM drinks WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_db_err(e, "Drink"))?;

        Ok(row.as_ref().map(row_to_drink))
    }

    async fn insert_drink(&self, drink: Drink) -> Result<(), CatalogError> {
        sqlx::query("INSERT INTO drinks (id, name, description, created_at) VALUES ($1, $2, $3, $4)")
            .bind(&drink.id)
            .bind(&drink.name)
            .bind(&drink.description)
            .bind(&drink.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "Drink"))?;

        Ok(())
    }

    async fn update_drink(&self, drink: Drink) -> Result<(), CatalogError> {
        let result = sqlx::query("UPDATE drinks SET name = $2, description = $3 WHERE id = $1")
            .bind(&drink.id)
            .bind(&drink.name)
            .bind(&drink.description)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "Drink"))?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::not_found("Drink not found"));
        }
        Ok(())
    }

    async fn delete_drink(&self, id: &Id) -> Result<bool, CatalogError> {
        let mut tx = self.pool.begin().await.map_err(|e| map_db_err(e, "Drink"))?;

        sqlx::query(
            "DELETE FROM variant_ingredients WHERE variant_id IN (SELECT id FROM drink_variants WHERE drink_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_err(e, "Variant link"))?;

        sqlx::query("DELETE FROM drink_variants WHERE drink_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_err(e, "Variant"))?;

        let result = sqlx::query("DELETE FROM drinks WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_err(e, "Drink"))?;

        tx.commit().await.map_err(|e| map_db_err(e, "Drink"))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl VariantStore for PostgresStore {
    async fn get_variant(&self, id: &Id) -> Result<Option<Variant>, CatalogError> {
        let row = sqlx::query(
            "SELECT id, drink_id, name, size_oz, profit, created_at FROM drink_variants WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "Variant"))?;

        Ok(row.as_ref().map(row_to_variant))
    }

    async fn list_variants_for_drink(&self, drink_id: &Id) -> Result<Vec<Variant>, CatalogError> {
        let rows = sqlx::query(
            "SELECT id, drink_id, name, size_oz, profit, created_at FROM drink_variants WHERE drink_id = $1 ORDER BY created_at, id",
        )
        .bind(drink_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "Variant"))?;

        Ok(rows.iter().map(row_to_variant).collect())
    }

    async fn list_variant_ingredients(
        &self,
        variant_id: &Id,
    ) -> Result<Vec<VariantIngredient>, CatalogError> {
        let rows = sqlx::query(
            "SELECT variant_id, ingredient_id, quantity FROM variant_ingredients WHERE variant_id = $1",
        )
        .bind(variant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "Variant link"))?;

        Ok(rows
            .iter()
            .map(|row| VariantIngredient {
                variant_id: row.get("variant_id"),
                ingredient_id: row.get("ingredient_id"),
                quantity: row.get("quantity"),
            })
            .collect())
    }

    async fn insert_variant(
        &self,
        variant: Variant,
        links: Vec<VariantIngredient>,
    ) -> Result<(), CatalogError> {
        let mut tx = self.pool.begin().await.map_err(|e| map_db_err(e, "Variant"))?;

        sqlx::query(
            "INSERT INTO drink_variants (id, drink_id, name, size_oz, profit, created_at) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&variant.id)
        .bind(&variant.drink_id)
        .bind(&variant.name)
        .bind(variant.size_oz)
        .bind(variant.profit)
        .bind(&variant.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_err(e, "Variant"))?;

        insert_links(&mut tx, &links).await?;

        tx.commit().await.map_err(|e| map_db_err(e, "Variant"))?;
        Ok(())
    }

    async fn replace_variant(
        &self,
        variant: Variant,
        links: Vec<VariantIngredient>,
    ) -> Result<(), CatalogError> {
        let mut tx = self.pool.begin().await.map_err(|e| map_db_err(e, "Variant"))?;

        let result = sqlx::query(
            "UPDATE drink_variants SET name = $2, size_oz = $3, profit = $4 WHERE id = $1",
        )
        .bind(&variant.id)
        .bind(&variant.name)
        .bind(variant.size_oz)
        .bind(variant.profit)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_err(e, "Variant"))?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::not_found("Variant not found"));
        }

        sqlx::query("DELETE FROM variant_ingredients WHERE variant_id = $1")
            .bind(&variant.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_err(e, "Variant link"))?;

        insert_links(&mut tx, &links).await?;

        tx.commit().await.map_err(|e| map_db_err(e, "Variant"))?;
        Ok(())
    }
}

async fn insert_links(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    links: &[VariantIngredient],
) -> Result<(), CatalogError> {
    for link in links {
        sqlx::query(
            "INSERT INTO variant_ingredients (variant_id, ingredient_id, quantity) VALUES ($1, $2, $3)",
        )
        .bind(&link.variant_id)
        .bind(&link.ingredient_id)
        .bind(link.quantity)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_db_err(e, "Variant link"))?;
    }
    Ok(())
}
