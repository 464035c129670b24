use derive_with::With;

use crate::record::NO_NEXT_BLOCK;

/// One block of an overflow chain (long strings, arrays, label sets, schema rules, token names).
#[derive(Debug, Clone, PartialEq, Eq, With)]
pub struct DynamicRecord {
    pub id: i64,
    pub record_type: i32,
    pub in_use: bool,
    /// Only meaningful while in use.
    pub start_record: bool,
    pub next_block: i64,
    pub data: Vec<u8>,
    pub created: bool,
}

impl DynamicRecord {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            record_type: 0,
            in_use: false,
            start_record: true,
            next_block: NO_NEXT_BLOCK,
            data: Vec::new(),
            created: false,
        }
    }

    pub fn set_created(&mut self) {
        self.created = true;
    }

    pub fn has_next(&self) -> bool {
        self.next_block != NO_NEXT_BLOCK
    }

    /// Concatenates chain payloads in order into `scratch`, which is cleared first.
    pub fn concat_data<'a>(
        records: impl IntoIterator<Item = &'a DynamicRecord>,
        scratch: &mut Vec<u8>,
    ) {
        scratch.clear();
        for record in records {
            scratch.extend_from_slice(&record.data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_follows_chain_order() {
        let chain = vec![
            DynamicRecord::new(1)
                .with_in_use(true)
                .with_next_block(2)
                .with_data(b"hello ".to_vec()),
            DynamicRecord::new(2)
                .with_in_use(true)
                .with_start_record(false)
                .with_data(b"world".to_vec()),
        ];
        let mut scratch = vec![9u8; 3];
        DynamicRecord::concat_data(&chain, &mut scratch);
        assert_eq!(scratch, b"hello world");
        assert!(chain[0].has_next());
        assert!(!chain[1].has_next());
    }
}
