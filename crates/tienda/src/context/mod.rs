//! Request-scoped context: tenant, locale, and request id.

mod extractor;
mod types;

pub use types::{RequestContext, RequestId};
