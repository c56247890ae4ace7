use crate::model::Ingredient;
use serde::Serialize;

/// Cost of one unit of an ingredient, derived from its bulk package
/// price. A missing or non-positive package size yields 0 ("price
/// unknown"), never an error.
pub fn unit_price(price: f64, content_size: f64) -> f64 {
    if content_size <= 0.0 {
        return 0.0;
    }
    price / content_size
}

/// A variant ingredient link resolved against the catalog: the full
/// ingredient record plus the quantity used by the recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLine {
    pub ingredient: Ingredient,
    pub quantity: f64,
}

impl ResolvedLine {
    pub fn unit_price(&self) -> f64 {
        unit_price(self.ingredient.price, self.ingredient.content_size)
    }

    pub fn cost(&self) -> f64 {
        self.quantity * self.unit_price()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantPricing {
    pub base_cost: f64,
    pub final_price: f64,
}

/// Fold a variant's resolved ingredient lines into its pricing. An empty
/// recipe costs 0; the final price adds the variant's profit margin.
/// Pure and deterministic: identical inputs always produce identical
/// outputs.
pub fn variant_pricing(profit: f64, lines: &[ResolvedLine]) -> VariantPricing {
    let base_cost = lines.iter().map(ResolvedLine::cost).sum::<f64>();
    VariantPricing {
        base_cost,
        final_price: base_cost + profit,
    }
}
