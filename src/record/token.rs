use derive_with::With;

use crate::record::DynamicRecord;

/// Shared shape of label, relationship-type and property-key tokens.
#[derive(Debug, Clone, PartialEq, Eq, With)]
pub struct TokenRecord {
    pub id: i32,
    pub in_use: bool,
    pub name_id: i32,
    pub name_records: Vec<DynamicRecord>,
}

impl TokenRecord {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            in_use: false,
            name_id: -1,
            name_records: Vec::new(),
        }
    }

    pub fn add_name_record(&mut self, record: DynamicRecord) {
        self.name_records.push(record);
    }

    /// The token name spelled out by the in-use part of the name chain.
    pub fn name(&self) -> Option<String> {
        let mut bytes = Vec::new();
        DynamicRecord::concat_data(self.name_records.iter().filter(|r| r.in_use), &mut bytes);
        if bytes.is_empty() {
            return None;
        }
        String::from_utf8(bytes).ok()
    }
}

pub type LabelTokenRecord = TokenRecord;
pub type RelationshipTypeTokenRecord = TokenRecord;

#[derive(Debug, Clone, PartialEq, Eq, With)]
pub struct PropertyKeyTokenRecord {
    pub token: TokenRecord,
    pub property_count: i32,
}

impl PropertyKeyTokenRecord {
    pub fn new(id: i32) -> Self {
        Self {
            token: TokenRecord::new(id),
            property_count: 0,
        }
    }
}
