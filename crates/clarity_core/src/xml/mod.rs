//! XML document wrapper.
//!
//! # Responsibility
//! - Hold one entity's document as an owned, mutable element tree.
//! - Parse server bodies and serialize trees back with correct namespaces.
//!
//! # Invariants
//! - Element identity is namespace URI + local name; prefixes never matter
//!   for lookup or equality.
//! - Serialization declares every used namespace exactly once on the root.

mod element;
mod parse;
mod write;

pub use element::{elements_equal, Element, QName};
pub use parse::parse_document;
pub use write::{to_bytes, to_string};
