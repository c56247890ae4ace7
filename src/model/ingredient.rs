use crate::error::CatalogError;
use crate::model::{generate_id, Id};
use serde::{Deserialize, Serialize};

/// A purchasable raw material: one package costs `price` and contains
/// `content_size` of `unit` (e.g. 1000 ml of milk). The per-unit price is
/// derived at read time and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: Id,
    pub name: String,
    pub price: f64,
    pub content_size: f64,
    pub unit: String,
    pub created_at: String, // ISO 8601 timestamp
}

impl Ingredient {
    pub fn new(name: String, price: f64, content_size: f64, unit: String) -> Self {
        Self {
            id: generate_id(),
            name,
            price,
            content_size,
            unit,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Wire payload for creating an ingredient. Fields are optional so that a
/// missing field surfaces as a validation error rather than a
/// deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIngredientRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub content_size: Option<f64>,
    pub unit: Option<String>,
}

impl CreateIngredientRequest {
    pub fn into_parts(self) -> Result<(String, f64, f64, String), CatalogError> {
        let (Some(name), Some(price), Some(content_size), Some(unit)) =
            (self.name, self.price, self.content_size, self.unit)
        else {
            return Err(CatalogError::validation(
                "name, price, contentSize, unit are required",
            ));
        };
        if name.trim().is_empty() {
            return Err(CatalogError::validation("name must not be empty"));
        }
        if !price.is_finite() || price < 0.0 {
            return Err(CatalogError::validation("price must be a non-negative number"));
        }
        if !content_size.is_finite() {
            return Err(CatalogError::validation("contentSize must be a number"));
        }
        Ok((name, price, content_size, unit))
    }
}

/// Wire payload for updating an ingredient; omitted fields keep their
/// current values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIngredientRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub content_size: Option<f64>,
    pub unit: Option<String>,
}

impl UpdateIngredientRequest {
    pub fn apply_to(self, mut ingredient: Ingredient) -> Result<Ingredient, CatalogError> {
        if let Some(name) = self.name {
            if name.trim().is_empty() {
                return Err(CatalogError::validation("name must not be empty"));
            }
            ingredient.name = name;
        }
        if let Some(price) = self.price {
            if !price.is_finite() || price < 0.0 {
                return Err(CatalogError::validation("price must be a non-negative number"));
            }
            ingredient.price = price;
        }
        if let Some(content_size) = self.content_size {
            if !content_size.is_finite() {
                return Err(CatalogError::validation("contentSize must be a number"));
            }
            ingredient.content_size = content_size;
        }
        if let Some(unit) = self.unit {
            ingredient.unit = unit;
        }
        Ok(ingredient)
    }
}
