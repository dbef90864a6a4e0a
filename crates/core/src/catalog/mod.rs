mod product;
mod requests;

pub use product::{Product, ProductDetails};
pub use requests::{CreateProductRequest, UpdateProductRequest};
