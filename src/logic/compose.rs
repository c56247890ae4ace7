use crate::error::CatalogError;
use crate::logic::pricing::ResolvedLine;
use crate::model::{Id, IngredientQuantity, ScaleMode, Variant, VariantIngredient, VariantSpec};
use crate::store::traits::{CatalogStore, IngredientStore};

/// The persisted shape of a composed variant: the variant row plus its
/// whole ingredient link set. The pair is handed to the store as one
/// atomic write.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedVariant {
    pub variant: Variant,
    pub links: Vec<VariantIngredient>,
}

/// Multiplier applied to the base variant's quantities when cloning.
///
/// An explicit factor always wins. Size-derived scaling needs a usable
/// base size; when the base variant has none (absent or zero), the
/// factor collapses to 1 and the recipe is copied unchanged.
pub fn clone_scale_factor(scaling: &ScaleMode, base_size_oz: Option<f64>) -> f64 {
    match scaling {
        ScaleMode::Factor(factor) => *factor,
        ScaleMode::BySize(size_oz) => match base_size_oz {
            Some(base) if base != 0.0 => size_oz / base,
            _ => 1.0,
        },
        ScaleMode::Exact => 1.0,
    }
}

/// Build the persisted shape of a new variant under `drink_id`, choosing
/// among the three creation modes. Reads the base variant (clone modes)
/// but performs no writes.
pub async fn compose_variant<S: CatalogStore>(
    store: &S,
    drink_id: &Id,
    name: String,
    spec: VariantSpec,
) -> Result<ComposedVariant, CatalogError> {
    if store.get_drink(drink_id).await?.is_none() {
        return Err(CatalogError::not_found("Drink not found"));
    }

    match spec {
        VariantSpec::Scratch {
            size_oz,
            profit,
            ingredients,
        } => {
            let variant = Variant::new(drink_id.clone(), name, size_oz, profit.unwrap_or(0.0));
            let links = links_for(&variant, &ingredients);
            Ok(ComposedVariant { variant, links })
        }
        VariantSpec::Clone {
            base_variant_id,
            scaling,
            size_oz,
            profit,
        } => {
            let Some(base) = store.get_variant(&base_variant_id).await? else {
                return Err(CatalogError::not_found("Base variant not found"));
            };
            let factor = clone_scale_factor(&scaling, base.size_oz);

            let variant = Variant::new(
                drink_id.clone(),
                name,
                size_oz.or(base.size_oz),
                profit.unwrap_or(base.profit),
            );
            let links = store
                .list_variant_ingredients(&base.id)
                .await?
                .into_iter()
                .map(|link| VariantIngredient {
                    variant_id: variant.id.clone(),
                    ingredient_id: link.ingredient_id,
                    quantity: link.quantity * factor,
                })
                .collect();
            Ok(ComposedVariant { variant, links })
        }
    }
}

pub fn links_for(variant: &Variant, ingredients: &[IngredientQuantity]) -> Vec<VariantIngredient> {
    ingredients
        .iter()
        .map(|entry| VariantIngredient {
            variant_id: variant.id.clone(),
            ingredient_id: entry.ingredient_id.clone(),
            quantity: entry.quantity,
        })
        .collect()
}

/// Resolve a variant's links against the catalog for pricing. A link
/// whose ingredient no longer exists is a referential-integrity failure;
/// the store's write discipline should make that unreachable.
pub async fn resolve_ingredients<S: IngredientStore + ?Sized>(
    store: &S,
    links: &[VariantIngredient],
) -> Result<Vec<ResolvedLine>, CatalogError> {
    let mut lines = Vec::with_capacity(links.len());
    for link in links {
        let Some(ingredient) = store.get_ingredient(&link.ingredient_id).await? else {
            return Err(CatalogError::ReferentialIntegrity(format!(
                "ingredient {} referenced by variant {} does not exist",
                link.ingredient_id, link.variant_id
            )));
        };
        lines.push(ResolvedLine {
            ingredient,
            quantity: link.quantity,
        });
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Drink, Ingredient};
    use crate::store::memory::MemoryStore;
    use crate::store::traits::{DrinkStore, VariantStore};
    use std::collections::HashMap;

    #[test]
    fn explicit_factor_wins() {
        assert_eq!(clone_scale_factor(&ScaleMode::Factor(2.5), Some(16.0)), 2.5);
        assert_eq!(clone_scale_factor(&ScaleMode::Factor(0.0), None), 0.0);
    }

    #[test]
    fn size_derived_factor_divides_by_base_size() {
        assert_eq!(
            clone_scale_factor(&ScaleMode::BySize(22.0), Some(16.0)),
            22.0 / 16.0
        );
    }

    #[test]
    fn size_derived_factor_collapses_without_base_size() {
        assert_eq!(clone_scale_factor(&ScaleMode::BySize(22.0), None), 1.0);
        assert_eq!(clone_scale_factor(&ScaleMode::BySize(22.0), Some(0.0)), 1.0);
    }

    #[test]
    fn exact_clone_keeps_quantities() {
        assert_eq!(clone_scale_factor(&ScaleMode::Exact, Some(16.0)), 1.0);
    }

    async fn seeded_store() -> (MemoryStore, Id, Variant) {
        let store = MemoryStore::new();
        let espresso = Ingredient::new("Espresso Shot".to_string(), 12.0, 40.0, "shot".to_string());
        let milk = Ingredient::new("Whole Milk".to_string(), 2.0, 1000.0, "ml".to_string());
        let espresso_id = espresso.id.clone();
        let milk_id = milk.id.clone();
        store.insert_ingredient(espresso).await.unwrap();
        store.insert_ingredient(milk).await.unwrap();

        let drink = Drink::new("Latte".to_string(), None);
        let drink_id = drink.id.clone();
        store.insert_drink(drink).await.unwrap();

        let base = Variant::new(drink_id.clone(), "Medium".to_string(), Some(16.0), 1.0);
        let links = vec![
            VariantIngredient {
                variant_id: base.id.clone(),
                ingredient_id: espresso_id,
                quantity: 2.0,
            },
            VariantIngredient {
                variant_id: base.id.clone(),
                ingredient_id: milk_id,
                quantity: 10.0,
            },
        ];
        store.insert_variant(base.clone(), links).await.unwrap();
        (store, drink_id, base)
    }

    #[tokio::test]
    async fn clone_with_factor_scales_every_quantity() {
        let (store, drink_id, base) = seeded_store().await;
        let composed = compose_variant(
            &store,
            &drink_id,
            "Double".to_string(),
            VariantSpec::Clone {
                base_variant_id: base.id.clone(),
                scaling: ScaleMode::Factor(2.0),
                size_oz: None,
                profit: None,
            },
        )
        .await
        .unwrap();

        let base_links: HashMap<_, _> = store
            .list_variant_ingredients(&base.id)
            .await
            .unwrap()
            .into_iter()
            .map(|link| (link.ingredient_id, link.quantity))
            .collect();
        assert_eq!(composed.links.len(), base_links.len());
        for link in &composed.links {
            assert_eq!(link.quantity, base_links[&link.ingredient_id] * 2.0);
        }
        // Size and profit are inherited from the base.
        assert_eq!(composed.variant.size_oz, Some(16.0));
        assert_eq!(composed.variant.profit, 1.0);
    }

    #[tokio::test]
    async fn clone_by_size_uses_size_ratio() {
        let (store, drink_id, base) = seeded_store().await;
        let composed = compose_variant(
            &store,
            &drink_id,
            "Large".to_string(),
            VariantSpec::Clone {
                base_variant_id: base.id.clone(),
                scaling: ScaleMode::BySize(22.0),
                size_oz: Some(22.0),
                profit: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(composed.variant.size_oz, Some(22.0));
        // Base quantity 10 at 16oz scaled to 22oz: 10 * (22/16) = 13.75.
        assert!(composed
            .links
            .iter()
            .any(|link| (link.quantity - 13.75).abs() < 1e-9));
    }

    #[tokio::test]
    async fn default_clone_copies_quantities_unchanged() {
        let (store, drink_id, base) = seeded_store().await;
        let composed = compose_variant(
            &store,
            &drink_id,
            "Copy".to_string(),
            VariantSpec::Clone {
                base_variant_id: base.id.clone(),
                scaling: ScaleMode::Exact,
                size_oz: None,
                profit: None,
            },
        )
        .await
        .unwrap();

        let mut base_quantities: Vec<f64> = store
            .list_variant_ingredients(&base.id)
            .await
            .unwrap()
            .into_iter()
            .map(|link| link.quantity)
            .collect();
        let mut cloned: Vec<f64> = composed.links.iter().map(|link| link.quantity).collect();
        base_quantities.sort_by(f64::total_cmp);
        cloned.sort_by(f64::total_cmp);
        assert_eq!(base_quantities, cloned);
    }

    #[tokio::test]
    async fn unknown_base_variant_is_not_found() {
        let (store, drink_id, _) = seeded_store().await;
        let err = compose_variant(
            &store,
            &drink_id,
            "Ghost".to_string(),
            VariantSpec::Clone {
                base_variant_id: "missing".to_string(),
                scaling: ScaleMode::Exact,
                size_oz: None,
                profit: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn unknown_drink_is_not_found() {
        let (store, _, _) = seeded_store().await;
        let err = compose_variant(
            &store,
            &"missing".to_string(),
            "Orphan".to_string(),
            VariantSpec::Scratch {
                size_oz: None,
                profit: None,
                ingredients: vec![],
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }
}
