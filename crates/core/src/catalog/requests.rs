//! Request payloads for the catalog endpoints.

use serde::Deserialize;

use crate::serde::deserialize_optional_string;

/// Payload for creating a new product.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub rate: f64,
}

/// Payload for updating a product (full replace of the provided fields).
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub description: Option<String>,
    #[serde(default)]
    pub rate: Option<f64>,
}

impl UpdateProductRequest {
    /// Applies the update onto an existing product.
    pub fn apply_to(self, product: &mut crate::catalog::Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(rate) = self.rate {
            product.rate = rate;
        }
        product.audit.touch(product.audit.updated_by);
    }
}
