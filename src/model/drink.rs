use crate::error::CatalogError;
use crate::model::{generate_id, Id};
use serde::{Deserialize, Serialize};

/// A named product offering. A drink owns its variants; deleting a drink
/// removes its variants and their ingredient links in one atomic unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drink {
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String, // ISO 8601 timestamp
}

impl Drink {
    pub fn new(name: String, description: Option<String>) -> Self {
        Self {
            id: generate_id(),
            name,
            description,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDrinkRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CreateDrinkRequest {
    pub fn into_parts(self) -> Result<(String, Option<String>), CatalogError> {
        let Some(name) = self.name else {
            return Err(CatalogError::validation("name is required"));
        };
        if name.trim().is_empty() {
            return Err(CatalogError::validation("name must not be empty"));
        }
        Ok((name, self.description))
    }
}

/// Omitted fields keep their current values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDrinkRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl UpdateDrinkRequest {
    pub fn apply_to(self, mut drink: Drink) -> Result<Drink, CatalogError> {
        if let Some(name) = self.name {
            if name.trim().is_empty() {
                return Err(CatalogError::validation("name must not be empty"));
            }
            drink.name = name;
        }
        if let Some(description) = self.description {
            drink.description = Some(description);
        }
        Ok(drink)
    }
}
