//! Before/after images of store records as they appear in log commands.

pub mod dynamic;
pub mod neostore;
pub mod node;
pub mod property;
pub mod relationship;
pub mod token;

pub use dynamic::DynamicRecord;
pub use neostore::NeoStoreRecord;
pub use node::{NodeLabels, NodeRecord};
pub use property::{PropertyBlock, PropertyOwner, PropertyRecord, PropertyType, PropertyValue};
pub use relationship::{RelationshipGroupRecord, RelationshipRecord};
pub use token::{
    LabelTokenRecord, PropertyKeyTokenRecord, RelationshipTypeTokenRecord, TokenRecord,
};

use crate::error::{TxLogError, TxLogResult};

pub const NOT_IN_USE: u8 = 0;
pub const IN_USE: u8 = 1;
/// Dynamic records: set on the first record of a chain.
pub const FIRST_IN_CHAIN: u8 = 0x2;
/// Property records: set when the owner is a relationship.
pub const REL_PROPERTY: u8 = 0x2;

pub const NO_NEXT_BLOCK: i64 = -1;
pub const NO_NEXT_RELATIONSHIP: i64 = -1;
pub const NO_PREV_RELATIONSHIP: i64 = -1;
pub const NO_NEXT_PROPERTY: i64 = -1;
pub const NO_PREVIOUS_PROPERTY: i64 = -1;
pub const NO_LABELS_FIELD: i64 = 0;

/// Inclusive upper bound of dynamic record ids (36 bits).
pub const MAX_DYNAMIC_RECORD_ID: i64 = (1 << 36) - 1;
/// Exclusive upper bound of a dynamic record payload length.
pub const MAX_DYNAMIC_RECORD_LENGTH: i32 = (1 << 24) - 1;

/// Parses a strict in-use byte: exactly `IN_USE` or `NOT_IN_USE`.
pub fn parse_in_use(flag: u8) -> TxLogResult<bool> {
    match flag {
        IN_USE => Ok(true),
        NOT_IN_USE => Ok(false),
        other => Err(TxLogError::IllegalInUseFlag(other)),
    }
}

pub fn in_use_byte(in_use: bool) -> u8 {
    if in_use {
        IN_USE
    } else {
        NOT_IN_USE
    }
}
