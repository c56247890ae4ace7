use crate::error::CatalogError;
use crate::model::{Drink, Id, Ingredient, Variant, VariantIngredient};

/// Keyed CRUD over ingredients. Deletes cascade to variant links in the
/// same atomic unit.
#[async_trait::async_trait]
pub trait IngredientStore: Send + Sync {
    async fn get_ingredient(&self, id: &Id) -> Result<Option<Ingredient>, CatalogError>;
    async fn list_ingredients(&self) -> Result<Vec<Ingredient>, CatalogError>;
    async fn find_ingredient_by_name(&self, name: &str)
        -> Result<Option<Ingredient>, CatalogError>;
    async fn insert_ingredient(&self, ingredient: Ingredient) -> Result<(), CatalogError>;
    async fn update_ingredient(&self, ingredient: Ingredient) -> Result<(), CatalogError>;
    /// Remove the ingredient and every variant link referencing it.
    /// Returns false when the id is unknown.
    async fn delete_ingredient(&self, id: &Id) -> Result<bool, CatalogError>;
}

/// Keyed CRUD over drinks. Deletes cascade to the drink's variants and
/// their links in the same atomic unit.
#[async_trait::async_trait]
pub trait DrinkStore: Send + Sync {
    async fn get_drink(&self, id: &Id) -> Result<Option<Drink>, CatalogError>;
    async fn list_drinks(&self) -> Result<Vec<Drink>, CatalogError>;
    async fn find_drink_by_name(&self, name: &str) -> Result<Option<Drink>, CatalogError>;
    async fn insert_drink(&self, drink: Drink) -> Result<(), CatalogError>;
    async fn update_drink(&self, drink: Drink) -> Result<(), CatalogError>;
    async fn delete_drink(&self, id: &Id) -> Result<bool, CatalogError>;
}

/// Variants and their ingredient link sets. Link sets are written whole:
/// an insert or replace carries the variant row and all of its links in
/// one atomic write, and a link against an unknown ingredient fails the
/// whole write with a referential-integrity error.
#[async_trait::async_trait]
pub trait VariantStore: Send + Sync {
    async fn get_variant(&self, id: &Id) -> Result<Option<Variant>, CatalogError>;
    async fn list_variants_for_drink(&self, drink_id: &Id) -> Result<Vec<Variant>, CatalogError>;
    async fn list_variant_ingredients(
        &self,
        variant_id: &Id,
    ) -> Result<Vec<VariantIngredient>, CatalogError>;
    async fn insert_variant(
        &self,
        variant: Variant,
        links: Vec<VariantIngredient>,
    ) -> Result<(), CatalogError>;
    /// Full-replace update: overwrite the variant row and discard the
    /// entire prior link set in favor of `links`.
    async fn replace_variant(
        &self,
        variant: Variant,
        links: Vec<VariantIngredient>,
    ) -> Result<(), CatalogError>;
}

pub trait CatalogStore: IngredientStore + DrinkStore + VariantStore + Send + Sync {}

impl<T: IngredientStore + DrinkStore + VariantStore + Send + Sync> CatalogStore for T {}
