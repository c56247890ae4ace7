use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::CatalogError;
use crate::logic::compose::{compose_variant, links_for, resolve_ingredients};
use crate::logic::pricing::{unit_price, variant_pricing, ResolvedLine};
use crate::model::{
    CreateDrinkRequest, CreateIngredientRequest, CreateVariantRequest, Drink, Id, Ingredient,
    UpdateDrinkRequest, UpdateIngredientRequest, UpdateVariantRequest, Variant,
};
use crate::store::traits::CatalogStore;

pub type AppState<S> = Arc<S>;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Ingredient enriched with its derived per-unit price.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientResponse {
    pub id: Id,
    pub name: String,
    pub price: f64,
    pub content_size: f64,
    pub unit: String,
    pub created_at: String,
    pub unit_price: f64,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        let unit_price = unit_price(ingredient.price, ingredient.content_size);
        Self {
            id: ingredient.id,
            name: ingredient.name,
            price: ingredient.price,
            content_size: ingredient.content_size,
            unit: ingredient.unit,
            created_at: ingredient.created_at,
            unit_price,
        }
    }
}

/// One resolved recipe line: the link quantity plus the ingredient's
/// identity and derived costs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantIngredientLine {
    pub id: Id,
    pub ingredient_id: Id,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub unit_price: f64,
    pub cost: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantResponse {
    pub id: Id,
    pub drink_id: Id,
    pub name: String,
    pub size_oz: Option<f64>,
    pub profit: f64,
    pub base_cost: f64,
    pub final_price: f64,
    pub ingredients: Vec<VariantIngredientLine>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrinkResponse {
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
    pub variants: Vec<VariantResponse>,
}

#[derive(Debug, Serialize)]
pub struct DrinkInfoResponse {
    pub name: String,
}

/// Project a variant and its resolved lines into the priced wire shape.
/// Pricing is recomputed here on every read; it is never persisted.
fn priced_variant(variant: Variant, lines: Vec<ResolvedLine>) -> VariantResponse {
    let pricing = variant_pricing(variant.profit, &lines);
    let ingredients = lines
        .into_iter()
        .map(|line| {
            let unit_price = line.unit_price();
            let cost = line.cost();
            VariantIngredientLine {
                id: line.ingredient.id.clone(),
                ingredient_id: line.ingredient.id,
                name: line.ingredient.name,
                quantity: line.quantity,
                unit: line.ingredient.unit,
                unit_price,
                cost,
            }
        })
        .collect();
    VariantResponse {
        id: variant.id,
        drink_id: variant.drink_id,
        name: variant.name,
        size_oz: variant.size_oz,
        profit: variant.profit,
        base_cost: pricing.base_cost,
        final_price: pricing.final_price,
        ingredients,
    }
}

async fn variant_response<S: CatalogStore>(
    store: &S,
    variant: Variant,
) -> Result<VariantResponse, CatalogError> {
    let links = store.list_variant_ingredients(&variant.id).await?;
    let lines = resolve_ingredients(store, &links).await?;
    Ok(priced_variant(variant, lines))
}

async fn drink_response<S: CatalogStore>(
    store: &S,
    drink: Drink,
) -> Result<DrinkResponse, CatalogError> {
    let mut variants = Vec::new();
    for variant in store.list_variants_for_drink(&drink.id).await? {
        variants.push(variant_response(store, variant).await?);
    }
    Ok(DrinkResponse {
        id: drink.id,
        name: drink.name,
        description: drink.description,
        variants,
    })
}

/* --------------------- Ingredient CRUD -------------------- */

pub async fn create_ingredient<S: CatalogStore>(
    State(store): State<AppState<S>>,
    Json(request): Json<CreateIngredientRequest>,
) -> Result<Json<IngredientResponse>, CatalogError> {
    let (name, price, content_size, unit) = request.into_parts()?;
    if store.find_ingredient_by_name(&name).await?.is_some() {
        return Err(CatalogError::conflict("Ingredient already exists"));
    }
    let ingredient = Ingredient::new(name, price, content_size, unit);
    store.insert_ingredient(ingredient.clone()).await?;
    Ok(Json(ingredient.into()))
}

pub async fn list_ingredients<S: CatalogStore>(
    State(store): State<AppState<S>>,
) -> Result<Json<Vec<IngredientResponse>>, CatalogError> {
    let ingredients = store.list_ingredients().await?;
    Ok(Json(ingredients.into_iter().map(Into::into).collect()))
}

pub async fn get_ingredient<S: CatalogStore>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> Result<Json<IngredientResponse>, CatalogError> {
    let Some(ingredient) = store.get_ingredient(&id).await? else {
        return Err(CatalogError::not_found("Ingredient not found"));
    };
    Ok(Json(ingredient.into()))
}

pub async fn update_ingredient<S: CatalogStore>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
    Json(request): Json<UpdateIngredientRequest>,
) -> Result<Json<IngredientResponse>, CatalogError> {
    let Some(existing) = store.get_ingredient(&id).await? else {
        return Err(CatalogError::not_found("Ingredient not found"));
    };
    let updated = request.apply_to(existing)?;
    if let Some(other) = store.find_ingredient_by_name(&updated.name).await? {
        if other.id != id {
            return Err(CatalogError::conflict("Ingredient already exists"));
        }
    }
    store.update_ingredient(updated.clone()).await?;
    Ok(Json(updated.into()))
}

pub async fn delete_ingredient<S: CatalogStore>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> Result<Json<MessageResponse>, CatalogError> {
    if !store.delete_ingredient(&id).await? {
        return Err(CatalogError::not_found("Ingredient not found"));
    }
    Ok(Json(MessageResponse {
        message: "Ingredient deleted".to_string(),
    }))
}

/* ----------------------- Drink CRUD ----------------------- */

pub async fn create_drink<S: CatalogStore>(
    State(store): State<AppState<S>>,
    Json(request): Json<CreateDrinkRequest>,
) -> Result<Json<Drink>, CatalogError> {
    let (name, description) = request.into_parts()?;
    if store.find_drink_by_name(&name).await?.is_some() {
        return Err(CatalogError::conflict("Drink already exists"));
    }
    let drink = Drink::new(name, description);
    store.insert_drink(drink.clone()).await?;
    Ok(Json(drink))
}

pub async fn list_drinks<S: CatalogStore>(
    State(store): State<AppState<S>>,
) -> Result<Json<Vec<DrinkResponse>>, CatalogError> {
    let mut result = Vec::new();
    for drink in store.list_drinks().await? {
        result.push(drink_response(&*store, drink).await?);
    }
    Ok(Json(result))
}

/// Lightweight menu listing: drink names only.
pub async fn drinks_info<S: CatalogStore>(
    State(store): State<AppState<S>>,
) -> Result<Json<Vec<DrinkInfoResponse>>, CatalogError> {
    let drinks = store.list_drinks().await?;
    Ok(Json(
        drinks
            .into_iter()
            .map(|drink| DrinkInfoResponse { name: drink.name })
            .collect(),
    ))
}

pub async fn get_drink<S: CatalogStore>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> Result<Json<DrinkResponse>, CatalogError> {
    let Some(drink) = store.get_drink(&id).await? else {
        return Err(CatalogError::not_found("Drink not found"));
    };
    Ok(Json(drink_response(&*store, drink).await?))
}

pub async fn update_drink<S: CatalogStore>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
    Json(request): Json<UpdateDrinkRequest>,
) -> Result<Json<Drink>, CatalogError> {
    let Some(existing) = store.get_drink(&id).await? else {
        return Err(CatalogError::not_found("Drink not found"));
    };
    let updated = request.apply_to(existing)?;
    if let Some(other) = store.find_drink_by_name(&updated.name).await? {
        if other.id != id {
            return Err(CatalogError::conflict("Drink already exists"));
        }
    }
    store.update_drink(updated.clone()).await?;
    Ok(Json(updated))
}

pub async fn delete_drink<S: CatalogStore>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> Result<Json<MessageResponse>, CatalogError> {
    if !store.delete_drink(&id).await? {
        return Err(CatalogError::not_found("Drink not found"));
    }
    Ok(Json(MessageResponse {
        message: "Drink deleted".to_string(),
    }))
}

/* ---------------------- Variant CRUD ---------------------- */

/// Create a variant under a drink: from scratch, cloned with an explicit
/// scale factor, or cloned auto-scaled by serving size. The response
/// carries the recipe priced from the just-persisted state.
pub async fn create_variant<S: CatalogStore>(
    State(store): State<AppState<S>>,
    Path(drink_id): Path<Id>,
    Json(request): Json<CreateVariantRequest>,
) -> Result<Json<VariantResponse>, CatalogError> {
    let (name, spec) = request.into_spec()?;
    let composed = compose_variant(&*store, &drink_id, name, spec).await?;
    store
        .insert_variant(composed.variant.clone(), composed.links)
        .await?;
    Ok(Json(variant_response(&*store, composed.variant).await?))
}

/// Full-replace update: the prior ingredient link set is discarded and
/// replaced by the supplied list in one atomic write.
pub async fn update_variant<S: CatalogStore>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
    Json(request): Json<UpdateVariantRequest>,
) -> Result<Json<VariantResponse>, CatalogError> {
    let Some(existing) = store.get_variant(&id).await? else {
        return Err(CatalogError::not_found("Variant not found"));
    };
    let (variant, ingredients) = request.apply_to(existing)?;
    let links = links_for(&variant, &ingredients);
    store.replace_variant(variant.clone(), links).await?;
    Ok(Json(variant_response(&*store, variant).await?))
}
