//! Per-command wire layouts. Readers pull from a [`ReadableLogChannel`] and writers mirror
//! them byte for byte into a [`bytes::BufMut`].
//!
//! [`ReadableLogChannel`]: crate::channel::ReadableLogChannel

pub mod dynamic;
pub mod entity;
pub mod index;
pub mod property;
pub mod schema;
pub mod token;

pub use dynamic::{read_dynamic_record, read_dynamic_records};
pub use property::read_property_block;
pub use schema::schema_rule_records;
