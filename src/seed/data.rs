use crate::error::CatalogError;
use crate::logic::compose::links_for;
use crate::model::{Drink, Ingredient, IngredientQuantity, Variant};
use crate::store::traits::CatalogStore;

/// Load a small demonstration catalog: a few purchasable ingredients and
/// two drinks with sized variants. Skipped when the catalog already has
/// drinks, so repeated startups stay idempotent.
pub async fn load_seed_data<S: CatalogStore>(store: &S) -> Result<(), CatalogError> {
    if !store.list_drinks().await?.is_empty() {
        log::info!("catalog not empty, skipping seed data");
        return Ok(());
    }

    let espresso = Ingredient::new("Espresso Beans".to_string(), 18.0, 1000.0, "g".to_string());
    let milk = Ingredient::new("Whole Milk".to_string(), 1.2, 1000.0, "ml".to_string());
    let vanilla = Ingredient::new("Vanilla Syrup".to_string(), 6.5, 750.0, "ml".to_string());
    let cup = Ingredient::new("Paper Cup".to_string(), 12.0, 100.0, "pcs".to_string());

    for ingredient in [&espresso, &milk, &vanilla, &cup] {
        store.insert_ingredient(ingredient.clone()).await?;
    }

    let latte = Drink::new(
        "Latte".to_string(),
        Some("Espresso with steamed milk".to_string()),
    );
    store.insert_drink(latte.clone()).await?;

    let medium = Variant::new(latte.id.clone(), "Medium".to_string(), Some(16.0), 1.5);
    let medium_recipe = vec![
        IngredientQuantity {
            ingredient_id: espresso.id.clone(),
            quantity: 18.0,
        },
        IngredientQuantity {
            ingredient_id: milk.id.clone(),
            quantity: 300.0,
        },
        IngredientQuantity {
            ingredient_id: cup.id.clone(),
            quantity: 1.0,
        },
    ];
    let links = links_for(&medium, &medium_recipe);
    store.insert_variant(medium.clone(), links).await?;

    // Large is the medium recipe scaled to 22oz: factor 22/16.
    let factor = 22.0 / 16.0;
    let large = Variant::new(latte.id.clone(), "Large".to_string(), Some(22.0), 1.8);
    let large_recipe: Vec<IngredientQuantity> = medium_recipe
        .iter()
        .map(|entry| IngredientQuantity {
            ingredient_id: entry.ingredient_id.clone(),
            quantity: entry.quantity * factor,
        })
        .collect();
    let links = links_for(&large, &large_recipe);
    store.insert_variant(large, links).await?;

    let vanilla_latte = Drink::new(
        "Vanilla Latte".to_string(),
        Some("Latte with vanilla syrup".to_string()),
    );
    store.insert_drink(vanilla_latte.clone()).await?;

    let vanilla_medium = Variant::new(
        vanilla_latte.id.clone(),
        "Medium".to_string(),
        Some(16.0),
        1.7,
    );
    let recipe = vec![
        IngredientQuantity {
            ingredient_id: espresso.id.clone(),
            quantity: 18.0,
        },
        IngredientQuantity {
            ingredient_id: milk.id.clone(),
            quantity: 280.0,
        },
        IngredientQuantity {
            ingredient_id: vanilla.id.clone(),
            quantity: 20.0,
        },
        IngredientQuantity {
            ingredient_id: cup.id.clone(),
            quantity: 1.0,
        },
    ];
    let links = links_for(&vanilla_medium, &recipe);
    store.insert_variant(vanilla_medium, links).await?;

    log::info!("seed catalog loaded: 4 ingredients, 2 drinks, 3 variants");
    Ok(())
}
