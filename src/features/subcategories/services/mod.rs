mod subcategory_service;

pub use subcategory_service::SubcategoryService;
