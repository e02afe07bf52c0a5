mod category;

pub use category::{Category, CategoryDependents};
