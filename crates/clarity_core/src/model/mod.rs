//! Entity model: kinds, the root-tag catalog, lazy handles and typed values.
//!
//! # Responsibility
//! - Name every entity kind and its wire identity.
//! - Provide the lazy `Entity` handle all field access goes through.
//!
//! # Invariants
//! - An entity's document is the only source of truth for its fields.
//!
//! # See also
//! - `crate::descriptor` for field tables and accessors.

pub mod catalog;
pub mod entity;
pub mod kind;
pub mod values;
