//! Features Module - Raw record to model input
//!
//! The only place categorical/numeric input is encoded. REST, the web form
//! and the trainer all go through [`align`].

pub mod aligner;
pub mod layout;
pub mod record;
pub mod vector;


// Re-export common types
pub use aligner::{align, FeatureAligner};
pub use layout::{FieldKind, LayoutInfo, LayoutMismatchError, ReferenceSchema, SchemaField};
pub use record::{RawRecord, RawValue};
pub use vector::AlignedVector;
