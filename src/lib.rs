//! Batch generator for filled PDF contract forms.
//!
//! Takes a boat purchase contract template with named AcroForm widgets and
//! produces any number of copies with the fields populated from randomly
//! generated, German-looking data. Each output document is independent; a
//! failure on one document never stops the rest of the batch.

pub mod error;
pub mod filler;
pub mod rules;

pub use error::FillError;
pub use filler::{BatchReport, FieldDescriptor, FieldKind, FormFiller};
pub use rules::{FieldRule, FormRecord, FIELD_RULES};
