pub mod subcategory_dto;

pub use subcategory_dto::{
    CreateSubcategoryDto, ListSubcategoriesQuery, SubcategoryResponseDto, UpdateSubcategoryDto,
};
