mod error;
mod keys;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{entity_key, locale_key};
pub use serialization::{deserialize_dto, serialize_dto, SerializationError};
pub use traits::Cache;
