//! Record model, coercion table, normalization and the strict writer
//!
//! Input from forms and import files arrives as [`RawRecord`]s, goes through
//! the [`FieldNormalizer`] against the entity's coercion table and comes out
//! as a [`CanonicalRecord`]. The [`RecordWriter`] is the strict path used by
//! manual form entry.

pub mod model;
pub mod normalize;
pub mod schema;
pub mod value;
pub mod writer;

pub use model::{CanonicalRecord, NewOrder, NewRepresentative, Order, SalesRepresentative};
pub use normalize::{Coercion, FieldNormalizer};
pub use schema::{Entity, FieldKind, FieldSpec};
pub use value::{FieldValue, RawRecord, RawValue, StoredValue};
pub use writer::{RecordWriter, ReferencePolicy};

/// Storage format of date columns
pub const DATE_FORMAT: &str = "%Y-%m-%d";
