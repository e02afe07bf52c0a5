mod subcategory_repository;

pub use subcategory_repository::{PgSubcategoryRepository, SubcategoryRepository};
