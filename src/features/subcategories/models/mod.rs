mod subcategory;

pub use subcategory::{NewSubcategory, Subcategory, SubcategoryChanges, SubcategoryFilter};
