use derive_with::With;

use crate::error::{TxLogError, TxLogResult};
use crate::record::{DynamicRecord, NO_NEXT_PROPERTY, NO_PREVIOUS_PROPERTY};

/// Largest number of 64-bit words one property block may span.
pub const MAX_BLOCKS_PER_PROPERTY: usize = 4;

const KEY_MASK: u64 = 0xFF_FFFF;
const TYPE_MASK: u64 = 0x0F00_0000;
const TYPE_SHIFT: u32 = 24;
const VALUE_SHIFT: u32 = 28;
const LONG_INLINE_BIT: u64 = 0x1000_0000;

const SHORT_STRING_HEADER_BITS: u64 = 24 + 4 + 5 + 6;
const SHORT_ARRAY_HEADER_BITS: u64 = 24 + 4 + 4 + 6 + 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[repr(u8)]
pub enum PropertyType {
    Bool = 1,
    Byte = 2,
    Short = 3,
    Char = 4,
    Int = 5,
    Long = 6,
    Float = 7,
    Double = 8,
    String = 9,
    Array = 10,
    ShortString = 11,
    ShortArray = 12,
}

impl TryFrom<u8> for PropertyType {
    type Error = TxLogError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PropertyType::Bool),
            2 => Ok(PropertyType::Byte),
            3 => Ok(PropertyType::Short),
            4 => Ok(PropertyType::Char),
            5 => Ok(PropertyType::Int),
            6 => Ok(PropertyType::Long),
            7 => Ok(PropertyType::Float),
            8 => Ok(PropertyType::Double),
            9 => Ok(PropertyType::String),
            10 => Ok(PropertyType::Array),
            11 => Ok(PropertyType::ShortString),
            12 => Ok(PropertyType::ShortArray),
            other => Err(TxLogError::UnknownPropertyType(other)),
        }
    }
}

impl PropertyType {
    pub fn of_block(first_word: i64) -> TxLogResult<Self> {
        let raw = ((first_word as u64 & TYPE_MASK) >> TYPE_SHIFT) as u8;
        PropertyType::try_from(raw)
    }

    /// Number of words a block of this type occupies, derived from its first word.
    pub fn block_count(self, first_word: i64) -> TxLogResult<usize> {
        let word = first_word as u64;
        let count = match self {
            PropertyType::Long => {
                if word & LONG_INLINE_BIT != 0 {
                    1
                } else {
                    2
                }
            }
            PropertyType::Double => 2,
            PropertyType::ShortString => {
                let encoding = ((word & 0x1_F000_0000) >> 28) as u8;
                let length = (word & 0x7E_0000_0000) >> 33;
                let bits = short_string_bits_per_char(encoding).ok_or_else(|| {
                    TxLogError::InvalidPropertyBlock(format!(
                        "unknown short string encoding {}",
                        encoding
                    ))
                })?;
                words_for_bits(SHORT_STRING_HEADER_BITS + length * bits)
            }
            PropertyType::ShortArray => {
                let length = (word & 0x3F_0000_0000) >> 32;
                let bits = (word & 0x7C0_0000_0000) >> 38;
                words_for_bits(SHORT_ARRAY_HEADER_BITS + length * bits)
            }
            _ => 1,
        };
        if count > MAX_BLOCKS_PER_PROPERTY {
            return Err(TxLogError::InvalidPropertyBlock(format!(
                "{} blocks exceed the {} word limit for type {}",
                count, MAX_BLOCKS_PER_PROPERTY, self
            )));
        }
        Ok(count)
    }
}

fn words_for_bits(bits: u64) -> usize {
    (((bits - 1) >> 6) + 1) as usize
}

fn short_string_bits_per_char(encoding: u8) -> Option<u64> {
    match encoding {
        0 | 10 => Some(8),
        1 | 2 => Some(4),
        3..=5 => Some(5),
        6..=8 => Some(6),
        9 => Some(7),
        _ => None,
    }
}

/// Values that live entirely inside a block's words.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Byte(i8),
    Short(i16),
    Char(u16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, With)]
pub struct PropertyBlock {
    pub value_blocks: Vec<i64>,
    /// Overflow chain for long strings and arrays.
    pub value_records: Vec<DynamicRecord>,
}

impl PropertyBlock {
    pub fn key_index_id(&self) -> i32 {
        self.first_word().map_or(-1, |w| (w as u64 & KEY_MASK) as i32)
    }

    pub fn property_type(&self) -> TxLogResult<PropertyType> {
        let word = self.first_word().ok_or_else(|| {
            TxLogError::InvalidPropertyBlock("block has no value words".to_string())
        })?;
        PropertyType::of_block(word)
    }

    /// Size of the block on the wire, in bytes.
    pub fn size(&self) -> usize {
        self.value_blocks.len() * 8
    }

    fn first_word(&self) -> Option<i64> {
        self.value_blocks.first().copied()
    }

    fn header(key: i32, ty: PropertyType) -> u64 {
        (key as u64 & KEY_MASK) | ((ty as u64) << TYPE_SHIFT)
    }

    /// Builds the block for an inline value.
    pub fn inline(key: i32, value: PropertyValue) -> Self {
        let payload = |ty: PropertyType, bits: u64| {
            (Self::header(key, ty) | (bits << VALUE_SHIFT)) as i64
        };
        let value_blocks = match value {
            PropertyValue::Bool(v) => vec![payload(PropertyType::Bool, v as u64)],
            PropertyValue::Byte(v) => vec![payload(PropertyType::Byte, v as u8 as u64)],
            PropertyValue::Short(v) => vec![payload(PropertyType::Short, v as u16 as u64)],
            PropertyValue::Char(v) => vec![payload(PropertyType::Char, v as u64)],
            PropertyValue::Int(v) => vec![payload(PropertyType::Int, v as u32 as u64)],
            PropertyValue::Float(v) => vec![payload(PropertyType::Float, v.to_bits() as u64)],
            PropertyValue::Long(v) if (0..1i64 << 35).contains(&v) => {
                vec![(Self::header(key, PropertyType::Long) | LONG_INLINE_BIT | ((v as u64) << 29))
                    as i64]
            }
            PropertyValue::Long(v) => vec![Self::header(key, PropertyType::Long) as i64, v],
            PropertyValue::Double(v) => vec![
                Self::header(key, PropertyType::Double) as i64,
                v.to_bits() as i64,
            ],
        };
        Self {
            value_blocks,
            value_records: Vec::new(),
        }
    }

    /// Builds a string or array block pointing at its overflow chain.
    pub fn dynamic(key: i32, ty: PropertyType, records: Vec<DynamicRecord>) -> Self {
        let first = records.first().map_or(0, |r| r.id as u64);
        Self {
            value_blocks: vec![(Self::header(key, ty) | (first << VALUE_SHIFT)) as i64],
            value_records: records,
        }
    }

    pub fn inline_value(&self) -> Option<PropertyValue> {
        let word = self.first_word()? as u64;
        let single = word >> VALUE_SHIFT;
        let value = match self.property_type().ok()? {
            PropertyType::Bool => PropertyValue::Bool(single & 1 != 0),
            PropertyType::Byte => PropertyValue::Byte(single as u8 as i8),
            PropertyType::Short => PropertyValue::Short(single as u16 as i16),
            PropertyType::Char => PropertyValue::Char(single as u16),
            PropertyType::Int => PropertyValue::Int(single as u32 as i32),
            PropertyType::Float => PropertyValue::Float(f32::from_bits(single as u32)),
            PropertyType::Long if word & LONG_INLINE_BIT != 0 => {
                PropertyValue::Long((word >> 29) as i64)
            }
            PropertyType::Long => PropertyValue::Long(*self.value_blocks.get(1)?),
            PropertyType::Double => {
                PropertyValue::Double(f64::from_bits(*self.value_blocks.get(1)? as u64))
            }
            _ => return None,
        };
        Some(value)
    }
}

/// The entity a property record hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropertyOwner {
    #[default]
    None,
    Node(i64),
    Relationship(i64),
}

impl PropertyOwner {
    pub fn primitive_id(&self) -> i64 {
        match self {
            PropertyOwner::None => -1,
            PropertyOwner::Node(id) | PropertyOwner::Relationship(id) => *id,
        }
    }

    pub fn is_relationship(&self) -> bool {
        matches!(self, PropertyOwner::Relationship(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, With)]
pub struct PropertyRecord {
    pub id: i64,
    pub in_use: bool,
    pub owner: PropertyOwner,
    pub prev_prop: i64,
    pub next_prop: i64,
    pub blocks: Vec<PropertyBlock>,
    pub deleted_records: Vec<DynamicRecord>,
}

impl PropertyRecord {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            in_use: false,
            owner: PropertyOwner::None,
            prev_prop: NO_PREVIOUS_PROPERTY,
            next_prop: NO_NEXT_PROPERTY,
            blocks: Vec::new(),
            deleted_records: Vec::new(),
        }
    }

    /// A record holding at least one block is in use.
    pub fn add_property_block(&mut self, block: PropertyBlock) {
        self.blocks.push(block);
        self.in_use = true;
    }

    pub fn add_deleted_record(&mut self, record: DynamicRecord) {
        self.deleted_records.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_values_decode_back() {
        let values = [
            PropertyValue::Bool(true),
            PropertyValue::Byte(-3),
            PropertyValue::Short(-1200),
            PropertyValue::Char(0x263a),
            PropertyValue::Int(i32::MIN),
            PropertyValue::Long(42),
            PropertyValue::Long(-42),
            PropertyValue::Long(i64::MAX),
            PropertyValue::Float(2.5),
            PropertyValue::Double(-1.0e300),
        ];
        for value in values {
            let block = PropertyBlock::inline(513, value);
            assert_eq!(block.key_index_id(), 513);
            assert_eq!(block.inline_value(), Some(value));
        }
    }

    #[test]
    fn long_uses_second_word_only_when_it_must() {
        let small = PropertyBlock::inline(1, PropertyValue::Long(7));
        let big = PropertyBlock::inline(1, PropertyValue::Long(1 << 40));
        let ty = PropertyType::Long;
        assert_eq!(ty.block_count(small.value_blocks[0]).unwrap(), 1);
        assert_eq!(small.value_blocks.len(), 1);
        assert_eq!(ty.block_count(big.value_blocks[0]).unwrap(), 2);
        assert_eq!(big.value_blocks.len(), 2);
    }

    #[test]
    fn unknown_type_nibble_is_rejected() {
        let word = 13i64 << 24;
        assert!(matches!(
            PropertyType::of_block(word),
            Err(TxLogError::UnknownPropertyType(13))
        ));
        assert!(matches!(
            PropertyType::of_block(0),
            Err(TxLogError::UnknownPropertyType(0))
        ));
    }

    #[test]
    fn short_string_length_drives_block_count() {
        let word = |encoding: u64, length: u64| {
            ((PropertyType::ShortString as u64) << 24 | encoding << 28 | length << 33) as i64
        };
        let ty = PropertyType::ShortString;
        // utf8: 39 header bits + 3 * 8
        assert_eq!(ty.block_count(word(0, 3)).unwrap(), 1);
        assert_eq!(ty.block_count(word(0, 4)).unwrap(), 2);
        // numerical: 4 bits per char
        assert_eq!(ty.block_count(word(1, 6)).unwrap(), 1);
        assert_eq!(ty.block_count(word(1, 7)).unwrap(), 2);
        // 63 latin1 chars would need 9 words
        assert!(ty.block_count(word(10, 63)).is_err());
        assert!(ty.block_count(word(20, 1)).is_err());
    }

    #[test]
    fn short_array_counts_header_and_items() {
        let word = |length: u64, bits: u64| {
            ((PropertyType::ShortArray as u64) << 24 | length << 32 | bits << 38) as i64
        };
        let ty = PropertyType::ShortArray;
        assert_eq!(ty.block_count(word(3, 7)).unwrap(), 1);
        assert_eq!(ty.block_count(word(3, 8)).unwrap(), 2);
        assert_eq!(ty.block_count(word(10, 20)).unwrap(), 4);
    }

    #[test]
    fn adding_a_block_marks_record_in_use() {
        let mut record = PropertyRecord::new(5);
        assert!(!record.in_use);
        record.add_property_block(PropertyBlock::inline(0, PropertyValue::Int(1)));
        assert!(record.in_use);
    }

    #[test]
    fn owner_primitive_ids() {
        assert_eq!(PropertyOwner::None.primitive_id(), -1);
        assert_eq!(PropertyOwner::Node(9).primitive_id(), 9);
        assert!(PropertyOwner::Relationship(9).is_relationship());
    }
}
