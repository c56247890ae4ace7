pub mod compose;
pub mod pricing;

pub use compose::*;
pub use pricing::*;
