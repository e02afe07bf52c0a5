pub mod subcategory_handler;

pub use subcategory_handler::*;
