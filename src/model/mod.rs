pub mod common;
pub mod drink;
pub mod ingredient;
pub mod variant;

pub use common::*;
pub use drink::*;
pub use ingredient::*;
pub use variant::*;
