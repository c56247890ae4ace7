use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::error::CatalogError;
use crate::model::{Drink, Id, Ingredient, Variant, VariantIngredient};
use crate::store::traits::{DrinkStore, IngredientStore, VariantStore};

/// An entity plus its insertion rank. Listings sort by rank, so order is
/// stable even for entities created within the same timestamp instant,
/// and updates keep an entity's position.
#[derive(Debug)]
struct Stored<T> {
    seq: u64,
    item: T,
}

#[derive(Debug, Default)]
struct CatalogState {
    next_seq: u64,
    ingredients: HashMap<Id, Stored<Ingredient>>,
    drinks: HashMap<Id, Stored<Drink>>,
    variants: HashMap<Id, Stored<Variant>>,
    /// Link sets keyed by variant id; each set is written whole.
    links: HashMap<Id, Vec<VariantIngredient>>,
}

impl CatalogState {
    fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

/// In-memory catalog store. All state sits behind a single RwLock, so
/// every write (including cascades and full link-set replacement) is one
/// atomic unit: concurrent readers observe either the pre-state or the
/// post-state, never an intermediate orphaned state.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<CatalogState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn in_insertion_order<T>(entries: impl Iterator<Item = (u64, T)>) -> Vec<T> {
    let mut entries: Vec<(u64, T)> = entries.collect();
    entries.sort_by_key(|(seq, _)| *seq);
    entries.into_iter().map(|(_, item)| item).collect()
}

#[async_trait::async_trait]
impl IngredientStore for MemoryStore {
    async fn get_ingredient(&self, id: &Id) -> Result<Option<Ingredient>, CatalogError> {
        let state = self.state.read().await;
        Ok(state.ingredients.get(id).map(|stored| stored.item.clone()))
    }

    async fn list_ingredients(&self) -> Result<Vec<Ingredient>, CatalogError> {
        let state = self.state.read().await;
        Ok(in_insertion_order(
            state
                .ingredients
                .values()
                .map(|stored| (stored.seq, stored.item.clone())),
        ))
    }

    async fn find_ingredient_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Ingredient>, CatalogError> {
        let state = self.state.read().await;
        Ok(state
            .ingredients
            .values()
            .find(|stored| stored.item.name == name)
            .map(|stored| stored.item.clone()))
    }

    async fn insert_ingredient(&self, ingredient: Ingredient) -> Result<(), CatalogError> {
        let mut state = self.state.write().await;
        if state
            .ingredients
            .values()
            .any(|stored| stored.item.name == ingredient.name)
        {
            return Err(CatalogError::conflict("Ingredient already exists"));
        }
        let seq = state.next_seq();
        state.ingredients.insert(
            ingredient.id.clone(),
            Stored {
                seq,
                item: ingredient,
            },
        );
        Ok(())
    }

    async fn update_ingredient(&self, ingredient: Ingredient) -> Result<(), CatalogError> {
        let mut state = self.state.write().await;
        let Some(seq) = state.ingredients.get(&ingredient.id).map(|stored| stored.seq) else {
            return Err(CatalogError::not_found("Ingredient not found"));
        };
        if state
            .ingredients
            .values()
            .any(|stored| stored.item.name == ingredient.name && stored.item.id != ingredient.id)
        {
            return Err(CatalogError::conflict("Ingredient already exists"));
        }
        state.ingredients.insert(
            ingredient.id.clone(),
            Stored {
                seq,
                item: ingredient,
            },
        );
        Ok(())
    }

    async fn delete_ingredient(&self, id: &Id) -> Result<bool, CatalogError> {
        let mut state = self.state.write().await;
        if state.ingredients.remove(id).is_none() {
            return Ok(false);
        }
        for links in state.links.values_mut() {
            links.retain(|link| &link.ingredient_id != id);
        }
        Ok(true)
    }
}

#[async_trait::async_trait]
impl DrinkStore for MemoryStore {
    async fn get_drink(&self, id: &Id) -> Result<Option<Drink>, CatalogError> {
        let state = self.state.read().await;
        Ok(state.drinks.get(id).map(|stored| stored.item.clone()))
    }

    async fn list_drinks(&self) -> Result<Vec<Drink>, CatalogError> {
        let state = self.state.read().await;
        Ok(in_insertion_order(
            state
                .drinks
                .values()
                .map(|stored| (stored.seq, stored.item.clone())),
        ))
    }

    async fn find_drink_by_name(&self, name: &str) -> Result<Option<Drink>, CatalogError> {
        let state = self.state.read().await;
        Ok(state
            .drinks
            .values()
            .find(|stored| stored.item.name == name)
            .map(|stored| stored.item.clone()))
    }

    async fn insert_drink(&self, drink: Drink) -> Result<(), CatalogError> {
        let mut state = self.state.write().await;
        if state
            .drinks
            .values()
            .any(|stored| stored.item.name == drink.name)
        {
            return Err(CatalogError::conflict("Drink already exists"));
        }
        let seq = state.next_seq();
        state.drinks.insert(drink.id.clone(), Stored { seq, item: drink });
        Ok(())
    }

    async fn update_drink(&self, drink: Drink) -> Result<(), CatalogError> {
        let mut state = self.state.write().await;
        let Some(seq) = state.drinks.get(&drink.id).map(|stored| stored.seq) else {
            return Err(CatalogError::not_found("Drink not found"));
        };
        if state
            .drinks
            .values()
            .any(|stored| stored.item.name == drink.name && stored.item.id != drink.id)
        {
            return Err(CatalogError::conflict("Drink already exists"));
        }
        state.drinks.insert(drink.id.clone(), Stored { seq, item: drink });
        Ok(())
    }

    async fn delete_drink(&self, id: &Id) -> Result<bool, CatalogError> {
        let mut state = self.state.write().await;
        if state.drinks.remove(id).is_none() {
            return Ok(false);
        }
        let variant_ids: Vec<Id> = state
            .variants
            .values()
            .filter(|stored| &stored.item.drink_id == id)
            .map(|stored| stored.item.id.clone())
            .collect();
        for variant_id in variant_ids {
            state.variants.remove(&variant_id);
            state.links.remove(&variant_id);
        }
        Ok(true)
    }
}

#[async_trait::async_trait]
impl VariantStore for MemoryStore {
    async fn get_variant(&self, id: &Id) -> Result<Option<Variant>, CatalogError> {
        let state = self.state.read().await;
        Ok(state.variants.get(id).map(|stored| stored.item.clone()))
    }

    async fn list_variants_for_drink(&self, drink_id: &Id) -> Result<Vec<Variant>, CatalogError> {
        let state = self.state.read().await;
        Ok(in_insertion_order(
            state
                .variants
                .values()
                .filter(|stored| &stored.item.drink_id == drink_id)
                .map(|stored| (stored.seq, stored.item.clone())),
        ))
    }

    async fn list_variant_ingredients(
        &self,
        variant_id: &Id,
    ) -> Result<Vec<VariantIngredient>, CatalogError> {
        let state = self.state.read().await;
        Ok(state.links.get(variant_id).cloned().unwrap_or_default())
    }

    async fn insert_variant(
        &self,
        variant: Variant,
        links: Vec<VariantIngredient>,
    ) -> Result<(), CatalogError> {
        let mut state = self.state.write().await;
        check_link_integrity(&state, &variant, &links)?;
        let seq = state.next_seq();
        state.links.insert(variant.id.clone(), links);
        state
            .variants
            .insert(variant.id.clone(), Stored { seq, item: variant });
        Ok(())
    }

    async fn replace_variant(
        &self,
        variant: Variant,
        links: Vec<VariantIngredient>,
    ) -> Result<(), CatalogError> {
        let mut state = self.state.write().await;
        let Some(seq) = state.variants.get(&variant.id).map(|stored| stored.seq) else {
            return Err(CatalogError::not_found("Variant not found"));
        };
        check_link_integrity(&state, &variant, &links)?;
        state.links.insert(variant.id.clone(), links);
        state
            .variants
            .insert(variant.id.clone(), Stored { seq, item: variant });
        Ok(())
    }
}

/// All foreign ids are verified before anything is touched, so a failed
/// write leaves the state exactly as it was.
fn check_link_integrity(
    state: &CatalogState,
    variant: &Variant,
    links: &[VariantIngredient],
) -> Result<(), CatalogError> {
    if !state.drinks.contains_key(&variant.drink_id) {
        return Err(CatalogError::ReferentialIntegrity(format!(
            "drink {} does not exist",
            variant.drink_id
        )));
    }
    for link in links {
        if !state.ingredients.contains_key(&link.ingredient_id) {
            return Err(CatalogError::ReferentialIntegrity(format!(
                "ingredient {} does not exist",
                link.ingredient_id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn drink_with_variants(
        store: &MemoryStore,
        variant_count: usize,
        links_per_variant: usize,
    ) -> (Id, Vec<Id>) {
        let mut ingredient_ids = Vec::new();
        for i in 0..links_per_variant {
            let ingredient = Ingredient::new(format!("Ingredient {}", i), 10.0, 100.0, "g".to_string());
            ingredient_ids.push(ingredient.id.clone());
            store.insert_ingredient(ingredient).await.unwrap();
        }

        let drink = Drink::new("Mocha".to_string(), None);
        let drink_id = drink.id.clone();
        store.insert_drink(drink).await.unwrap();

        let mut variant_ids = Vec::new();
        for v in 0..variant_count {
            let variant = Variant::new(drink_id.clone(), format!("Size {}", v), Some(12.0), 0.5);
            variant_ids.push(variant.id.clone());
            let links = ingredient_ids
                .iter()
                .map(|ingredient_id| VariantIngredient {
                    variant_id: variant.id.clone(),
                    ingredient_id: ingredient_id.clone(),
                    quantity: 5.0,
                })
                .collect();
            store.insert_variant(variant, links).await.unwrap();
        }
        (drink_id, variant_ids)
    }

    #[tokio::test]
    async fn deleting_a_drink_removes_variants_and_links() {
        let store = MemoryStore::new();
        let (drink_id, variant_ids) = drink_with_variants(&store, 2, 3).await;

        assert!(store.delete_drink(&drink_id).await.unwrap());

        assert!(store.get_drink(&drink_id).await.unwrap().is_none());
        for variant_id in &variant_ids {
            assert!(store.get_variant(variant_id).await.unwrap().is_none());
            assert!(store
                .list_variant_ingredients(variant_id)
                .await
                .unwrap()
                .is_empty());
        }
    }

    #[tokio::test]
    async fn deleting_an_ingredient_removes_its_links_only() {
        let store = MemoryStore::new();
        let (_, variant_ids) = drink_with_variants(&store, 1, 2).await;
        let victim = store.list_ingredients().await.unwrap().remove(0);

        assert!(store.delete_ingredient(&victim.id).await.unwrap());

        let remaining = store.list_variant_ingredients(&variant_ids[0]).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_ne!(remaining[0].ingredient_id, victim.id);
    }

    #[tokio::test]
    async fn duplicate_ingredient_name_is_a_conflict() {
        let store = MemoryStore::new();
        let original = Ingredient::new("Espresso Shot".to_string(), 12.0, 40.0, "shot".to_string());
        let original_id = original.id.clone();
        store.insert_ingredient(original).await.unwrap();

        let duplicate = Ingredient::new("Espresso Shot".to_string(), 9.0, 30.0, "shot".to_string());
        let err = store.insert_ingredient(duplicate).await.unwrap_err();
        assert!(matches!(err, CatalogError::Conflict(_)));

        // The existing record is unchanged.
        let kept = store.get_ingredient(&original_id).await.unwrap().unwrap();
        assert_eq!(kept.price, 12.0);
    }

    #[tokio::test]
    async fn replace_variant_discards_the_prior_link_set() {
        let store = MemoryStore::new();
        let (_, variant_ids) = drink_with_variants(&store, 1, 3).await;
        let variant = store.get_variant(&variant_ids[0]).await.unwrap().unwrap();
        let keep = store.list_ingredients().await.unwrap().remove(0);

        let new_links = vec![VariantIngredient {
            variant_id: variant.id.clone(),
            ingredient_id: keep.id.clone(),
            quantity: 42.0,
        }];
        store.replace_variant(variant.clone(), new_links).await.unwrap();

        let links = store.list_variant_ingredients(&variant.id).await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].ingredient_id, keep.id);
        assert_eq!(links[0].quantity, 42.0);
    }

    #[tokio::test]
    async fn link_against_unknown_ingredient_fails_whole_write() {
        let store = MemoryStore::new();
        let drink = Drink::new("Flat White".to_string(), None);
        let drink_id = drink.id.clone();
        store.insert_drink(drink).await.unwrap();

        let variant = Variant::new(drink_id, "Small".to_string(), Some(8.0), 0.0);
        let variant_id = variant.id.clone();
        let links = vec![VariantIngredient {
            variant_id: variant_id.clone(),
            ingredient_id: "missing".to_string(),
            quantity: 1.0,
        }];
        let err = store.insert_variant(variant, links).await.unwrap_err();
        assert!(matches!(err, CatalogError::ReferentialIntegrity(_)));

        // No partial write: the variant row was not persisted either.
        assert!(store.get_variant(&variant_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn listing_keeps_insertion_order_for_identical_timestamps() {
        let store = MemoryStore::new();
        let now = chrono::Utc::now().to_rfc3339();
        for name in ["First", "Second", "Third", "Fourth"] {
            let mut ingredient = Ingredient::new(name.to_string(), 1.0, 1.0, "g".to_string());
            ingredient.created_at = now.clone();
            store.insert_ingredient(ingredient).await.unwrap();
        }

        let names: Vec<String> = store
            .list_ingredients()
            .await
            .unwrap()
            .into_iter()
            .map(|ingredient| ingredient.name)
            .collect();
        assert_eq!(names, ["First", "Second", "Third", "Fourth"]);
    }

    #[tokio::test]
    async fn updating_an_entity_keeps_its_listing_position() {
        let store = MemoryStore::new();
        let first = Ingredient::new("Beans".to_string(), 10.0, 100.0, "g".to_string());
        let second = Ingredient::new("Milk".to_string(), 2.0, 1000.0, "ml".to_string());
        store.insert_ingredient(first.clone()).await.unwrap();
        store.insert_ingredient(second).await.unwrap();

        let mut renamed = first;
        renamed.name = "Roasted Beans".to_string();
        store.update_ingredient(renamed).await.unwrap();

        let names: Vec<String> = store
            .list_ingredients()
            .await
            .unwrap()
            .into_iter()
            .map(|ingredient| ingredient.name)
            .collect();
        assert_eq!(names, ["Roasted Beans", "Milk"]);
    }
}
