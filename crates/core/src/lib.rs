//! Core domain types and contracts for the tienda project.
//!
//! This crate is free of I/O: it defines the entity model, the tenant
//! context, the repository and cache error taxonomies, cache key
//! derivation, and the request/DTO types shared between the server and
//! its tests. Concrete storage and cache backends live in the `tienda`
//! server crate.

pub mod cache;
pub mod catalog;
pub mod entity;
pub mod identity;
pub mod serde;
pub mod storage;
pub mod tenant;
