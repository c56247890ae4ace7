use crate::error::CatalogError;
use crate::model::{generate_id, Id};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A specific recipe/size instance of a drink (e.g. "Medium 16oz").
/// Pricing fields are derived on read and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: Id,
    pub drink_id: Id,
    pub name: String,
    pub size_oz: Option<f64>,
    pub profit: f64,
    pub created_at: String, // ISO 8601 timestamp
}

impl Variant {
    pub fn new(drink_id: Id, name: String, size_oz: Option<f64>, profit: f64) -> Self {
        Self {
            id: generate_id(),
            drink_id,
            name,
            size_oz,
            profit,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Links one variant to one ingredient with a quantity in the
/// ingredient's unit. At most one link per (variant, ingredient); link
/// sets are always written as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantIngredient {
    pub variant_id: Id,
    pub ingredient_id: Id,
    pub quantity: f64,
}

/// Request-side (ingredient, quantity) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientQuantity {
    pub ingredient_id: Id,
    pub quantity: f64,
}

/// How clone quantities are scaled relative to the base variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ScaleMode {
    /// Caller-supplied multiplier.
    Factor(f64),
    /// Derived from the requested serving size: `size_oz / base.size_oz`.
    /// Collapses to 1 when the base has no usable size.
    BySize(f64),
    /// Unscaled copy.
    Exact,
}

/// Validated, tagged creation request. The flat wire payload is converted
/// into exactly one of these modes before any persistence happens.
#[derive(Debug, Clone, PartialEq)]
pub enum VariantSpec {
    Scratch {
        size_oz: Option<f64>,
        profit: Option<f64>,
        ingredients: Vec<IngredientQuantity>,
    },
    Clone {
        base_variant_id: Id,
        scaling: ScaleMode,
        size_oz: Option<f64>,
        profit: Option<f64>,
    },
}

/// Flat wire payload for `POST /drinks/:drink_id/variants`, matching the
/// original backend's request shape.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVariantRequest {
    pub name: Option<String>,
    pub size_oz: Option<f64>,
    pub profit: Option<f64>,
    pub ingredients: Option<Vec<IngredientQuantity>>,
    pub base_variant_id: Option<Id>,
    pub scale_factor: Option<f64>,
}

impl CreateVariantRequest {
    /// Validate the payload and pick a single creation mode.
    pub fn into_spec(self) -> Result<(String, VariantSpec), CatalogError> {
        let Some(name) = self.name else {
            return Err(CatalogError::validation("name is required"));
        };
        if name.trim().is_empty() {
            return Err(CatalogError::validation("name must not be empty"));
        }
        validate_numeric_field("sizeOz", self.size_oz)?;
        validate_numeric_field("profit", self.profit)?;

        let spec = match self.base_variant_id {
            Some(base_variant_id) => {
                if self.ingredients.is_some() {
                    return Err(CatalogError::validation(
                        "ingredients cannot be combined with baseVariantId",
                    ));
                }
                let scaling = match (self.scale_factor, self.size_oz) {
                    (Some(factor), _) => {
                        if !factor.is_finite() || factor < 0.0 {
                            return Err(CatalogError::validation(
                                "scaleFactor must be a non-negative number",
                            ));
                        }
                        ScaleMode::Factor(factor)
                    }
                    (None, Some(size_oz)) => ScaleMode::BySize(size_oz),
                    (None, None) => ScaleMode::Exact,
                };
                VariantSpec::Clone {
                    base_variant_id,
                    scaling,
                    size_oz: self.size_oz,
                    profit: self.profit,
                }
            }
            None => {
                if self.scale_factor.is_some() {
                    return Err(CatalogError::validation(
                        "scaleFactor requires baseVariantId",
                    ));
                }
                VariantSpec::Scratch {
                    size_oz: self.size_oz,
                    profit: self.profit,
                    ingredients: validate_ingredient_list(self.ingredients.unwrap_or_default())?,
                }
            }
        };
        Ok((name, spec))
    }
}

/// Flat wire payload for `PUT /variants/:id`. The ingredient list is a
/// full replacement: an omitted list clears the recipe.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVariantRequest {
    pub name: Option<String>,
    pub size_oz: Option<f64>,
    pub profit: Option<f64>,
    pub ingredients: Option<Vec<IngredientQuantity>>,
}

impl UpdateVariantRequest {
    pub fn apply_to(
        self,
        mut variant: Variant,
    ) -> Result<(Variant, Vec<IngredientQuantity>), CatalogError> {
        if let Some(name) = self.name {
            if name.trim().is_empty() {
                return Err(CatalogError::validation("name must not be empty"));
            }
            variant.name = name;
        }
        validate_numeric_field("sizeOz", self.size_oz)?;
        validate_numeric_field("profit", self.profit)?;

        if self.size_oz.is_some() {
            variant.size_oz = self.size_oz;
        }
        if let Some(profit) = self.profit {
            variant.profit = profit;
        }
        let ingredients = validate_ingredient_list(self.ingredients.unwrap_or_default())?;
        Ok((variant, ingredients))
    }
}

fn validate_numeric_field(field: &str, value: Option<f64>) -> Result<(), CatalogError> {
    match value {
        Some(v) if !v.is_finite() => Err(CatalogError::Validation(format!(
            "{} must be a finite number",
            field
        ))),
        _ => Ok(()),
    }
}

/// Quantities must be finite and non-negative, and an ingredient may
/// appear at most once per list.
pub fn validate_ingredient_list(
    ingredients: Vec<IngredientQuantity>,
) -> Result<Vec<IngredientQuantity>, CatalogError> {
    for entry in &ingredients {
        if !entry.quantity.is_finite() || entry.quantity < 0.0 {
            return Err(CatalogError::Validation(format!(
                "quantity for ingredient {} must be a non-negative number",
                entry.ingredient_id
            )));
        }
    }
    if let Some(dup) = ingredients
        .iter()
        .map(|entry| &entry.ingredient_id)
        .duplicates()
        .next()
    {
        return Err(CatalogError::Validation(format!(
            "ingredient {} appears more than once",
            dup
        )));
    }
    Ok(ingredients)
}
