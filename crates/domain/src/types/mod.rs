//! # DigiSheet Domain Types
//!
//! Value types shared by both sheet archetypes.
//!
//! ## Design Principles
//!
//! 1. **Pure data types** - No I/O, no async, no side effects
//! 2. **Lenient input** - Sheet documents never fail to load over one bad leaf
//! 3. **Serializable** - All types derive Serialize/Deserialize

// Input coercion
mod field_value;
pub use field_value::FieldValue;

// Numeric sheet leaves
mod number_field;
pub use number_field::{NumberField, LEAF_LIMIT};

pub(crate) mod lenient;
