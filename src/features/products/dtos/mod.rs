pub mod product_dto;

pub use product_dto::{
    CreateProductInput, ImageUpload, ProductForm, ProductFormSchema, ProductResponseDto,
    UpdateProductInput,
};
