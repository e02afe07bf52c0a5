pub mod categories;
pub mod dashboard;
pub mod pages;
pub mod products;
pub mod subcategories;
