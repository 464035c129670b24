//! Legacy (explicit) index commands.
//!
//! Every command but the define command starts with a 3-byte header:
//!
//! ```text
//! byte 0: [ccc vvv e l]  c = command kind, v = value type, e = entity type, l = entity id is a long
//! byte 1: [. E . . S . . .] | index name id in the low 6 bits
//!         E = end node is a long (0x40), S = start node is a long (0x08)
//! byte 2: key id
//! ```
//!
//! The start-node flag shares bit 3 with the index name id; both writers and readers have
//! always treated the byte that way, so it is reproduced as-is.

use std::collections::HashMap;

use crate::error::{TxLogError, TxLogResult};

pub const VALUE_TYPE_NULL: u8 = 0;
pub const VALUE_TYPE_SHORT: u8 = 1;
pub const VALUE_TYPE_INT: u8 = 2;
pub const VALUE_TYPE_LONG: u8 = 3;
pub const VALUE_TYPE_FLOAT: u8 = 4;
pub const VALUE_TYPE_DOUBLE: u8 = 5;
pub const VALUE_TYPE_STRING: u8 = 6;

pub(crate) const START_NODE_NEEDS_LONG_BIT: u8 = 0x08;
pub(crate) const END_NODE_NEEDS_LONG_BIT: u8 = 0x40;
pub(crate) const INDEX_NAME_ID_MASK: u8 = 0x3F;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[repr(u8)]
pub enum IndexEntityType {
    Node = 0,
    Relationship = 1,
}

impl IndexEntityType {
    pub fn from_bit(bit: u8) -> Self {
        if bit & 1 == 0 {
            IndexEntityType::Node
        } else {
            IndexEntityType::Relationship
        }
    }
}

/// Kind code carried in the top three bits of header byte 0. Readers ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum IndexCommandKind {
    Define = 0,
    Add = 1,
    AddRelationship = 2,
    Remove = 3,
    Delete = 4,
    Create = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexCommandHeader {
    pub value_type: u8,
    pub entity_type: u8,
    pub entity_id_needs_long: bool,
    pub index_name_id: u8,
    pub start_node_needs_long: bool,
    pub end_node_needs_long: bool,
    pub key_id: u8,
}

impl IndexCommandHeader {
    pub fn unpack(bytes: [u8; 3]) -> Self {
        Self {
            value_type: (bytes[0] & 0x1C) >> 2,
            entity_type: (bytes[0] & 0x2) >> 1,
            entity_id_needs_long: bytes[0] & 0x1 > 0,
            index_name_id: bytes[1] & INDEX_NAME_ID_MASK,
            start_node_needs_long: bytes[1] & START_NODE_NEEDS_LONG_BIT > 0,
            end_node_needs_long: bytes[1] & END_NODE_NEEDS_LONG_BIT > 0,
            key_id: bytes[2],
        }
    }

    pub fn pack(&self, kind: IndexCommandKind) -> [u8; 3] {
        let byte0 = ((kind as u8) << 5)
            | ((self.value_type & 0x7) << 2)
            | ((self.entity_type & 0x1) << 1)
            | self.entity_id_needs_long as u8;
        let mut byte1 = self.index_name_id & INDEX_NAME_ID_MASK;
        if self.start_node_needs_long {
            byte1 |= START_NODE_NEEDS_LONG_BIT;
        }
        if self.end_node_needs_long {
            byte1 |= END_NODE_NEEDS_LONG_BIT;
        }
        [byte0, byte1, self.key_id]
    }

    pub fn entity(&self) -> IndexEntityType {
        IndexEntityType::from_bit(self.entity_type)
    }
}

/// Ids that fit an i32 are written in 4 bytes.
pub fn needs_long(value: i64) -> bool {
    i32::try_from(value).is_err()
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndexValue {
    Null,
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

impl IndexValue {
    pub fn value_type(&self) -> u8 {
        match self {
            IndexValue::Null => VALUE_TYPE_NULL,
            IndexValue::Short(_) => VALUE_TYPE_SHORT,
            IndexValue::Int(_) => VALUE_TYPE_INT,
            IndexValue::Long(_) => VALUE_TYPE_LONG,
            IndexValue::Float(_) => VALUE_TYPE_FLOAT,
            IndexValue::Double(_) => VALUE_TYPE_DOUBLE,
            IndexValue::String(_) => VALUE_TYPE_STRING,
        }
    }

    pub fn check_value_type(value_type: u8) -> TxLogResult<u8> {
        if value_type > VALUE_TYPE_STRING {
            return Err(TxLogError::UnknownValueType(value_type));
        }
        Ok(value_type)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexAddNodeCommand {
    pub index_name_id: u8,
    pub entity_id: i64,
    pub key_id: u8,
    pub value: IndexValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexAddRelationshipCommand {
    pub index_name_id: u8,
    pub entity_id: i64,
    pub key_id: u8,
    pub value: IndexValue,
    pub start_node: i64,
    pub end_node: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexRemoveCommand {
    pub index_name_id: u8,
    pub entity_type: IndexEntityType,
    pub entity_id: i64,
    pub key_id: u8,
    pub value: IndexValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDeleteCommand {
    pub index_name_id: u8,
    pub entity_type: IndexEntityType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexCreateCommand {
    pub index_name_id: u8,
    pub entity_type: IndexEntityType,
    pub config: HashMap<String, String>,
}

/// Intern tables later index commands refer to by id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexDefineCommand {
    pub index_names: HashMap<String, u8>,
    pub keys: HashMap<String, u8>,
}

impl IndexDefineCommand {
    pub fn index_name(&self, id: u8) -> Option<&str> {
        reverse_lookup(&self.index_names, id)
    }

    pub fn key(&self, id: u8) -> Option<&str> {
        reverse_lookup(&self.keys, id)
    }
}

fn reverse_lookup(map: &HashMap<String, u8>, id: u8) -> Option<&str> {
    map.iter()
        .find(|(_, v)| **v == id)
        .map(|(k, _)| k.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_bits_sit_where_the_log_expects_them() {
        let header = IndexCommandHeader::unpack([0b101_010_1_1, 0b0100_0101, 0xFE]);
        assert_eq!(header.value_type, VALUE_TYPE_INT);
        assert_eq!(header.entity_type, 1);
        assert!(header.entity_id_needs_long);
        assert_eq!(header.index_name_id, 5);
        assert!(!header.start_node_needs_long);
        assert!(header.end_node_needs_long);
        assert_eq!(header.key_id, 0xFE);
        assert_eq!(header.entity(), IndexEntityType::Relationship);
    }

    #[test]
    fn start_node_flag_shares_bit_three_with_name_id() {
        let header = IndexCommandHeader {
            index_name_id: 8,
            ..Default::default()
        };
        let unpacked = IndexCommandHeader::unpack(header.pack(IndexCommandKind::Add));
        assert!(unpacked.start_node_needs_long);
        assert_eq!(unpacked.index_name_id, 8);
    }

    #[test]
    fn pack_then_unpack_keeps_fields() {
        let header = IndexCommandHeader {
            value_type: VALUE_TYPE_STRING,
            entity_type: 0,
            entity_id_needs_long: false,
            index_name_id: 0x31,
            start_node_needs_long: false,
            end_node_needs_long: true,
            key_id: 7,
        };
        let bytes = header.pack(IndexCommandKind::Remove);
        assert_eq!(bytes[0] >> 5, IndexCommandKind::Remove as u8);
        assert_eq!(IndexCommandHeader::unpack(bytes), header);
    }

    #[test]
    fn needs_long_boundaries() {
        assert!(!needs_long(i32::MAX as i64));
        assert!(!needs_long(i32::MIN as i64));
        assert!(needs_long(i32::MAX as i64 + 1));
    }

    #[test]
    fn define_command_reverse_lookup() {
        let mut define = IndexDefineCommand::default();
        define.index_names.insert("users".to_string(), 0);
        define.keys.insert("email".to_string(), 3);
        assert_eq!(define.index_name(0), Some("users"));
        assert_eq!(define.key(3), Some("email"));
        assert_eq!(define.key(4), None);
    }
}
