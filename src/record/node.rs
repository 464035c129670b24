use derive_with::With;

use crate::record::{DynamicRecord, NO_LABELS_FIELD, NO_NEXT_PROPERTY, NO_NEXT_RELATIONSHIP};

const LABEL_FIELD_DYNAMIC_BIT: i64 = 0x80_0000_0000;
const LABEL_FIELD_COUNT_MASK: i64 = 0x70_0000_0000;
const LABEL_FIELD_PAYLOAD_MASK: i64 = 0x0F_FFFF_FFFF;
const LABEL_FIELD_PAYLOAD_BITS: u32 = 36;

#[derive(Debug, Clone, PartialEq, Eq, With)]
pub struct NodeRecord {
    pub id: i64,
    pub in_use: bool,
    pub dense: bool,
    pub next_rel: i64,
    pub next_prop: i64,
    pub label_field: i64,
    /// Overflow label chain, present when `label_field` points into the label store.
    pub dynamic_label_records: Vec<DynamicRecord>,
    pub created: bool,
}

/// Labels as encoded in a node's label field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeLabels {
    Inline(Vec<i64>),
    Dynamic { first_record: i64 },
}

impl NodeRecord {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            in_use: false,
            dense: false,
            next_rel: NO_NEXT_RELATIONSHIP,
            next_prop: NO_NEXT_PROPERTY,
            label_field: NO_LABELS_FIELD,
            dynamic_label_records: Vec::new(),
            created: false,
        }
    }

    pub fn set_created(&mut self) {
        self.created = true;
    }

    pub fn labels(&self) -> NodeLabels {
        let field = self.label_field;
        if field & LABEL_FIELD_DYNAMIC_BIT != 0 {
            return NodeLabels::Dynamic {
                first_record: field & LABEL_FIELD_PAYLOAD_MASK,
            };
        }
        let count = ((field & LABEL_FIELD_COUNT_MASK) >> LABEL_FIELD_PAYLOAD_BITS) as u32;
        if count == 0 {
            return NodeLabels::Inline(Vec::new());
        }
        let bits = LABEL_FIELD_PAYLOAD_BITS / count;
        let mask = (1i64 << bits) - 1;
        let labels = (0..count)
            .map(|i| (field >> (i * bits)) & mask)
            .collect();
        NodeLabels::Inline(labels)
    }

    /// Packs label ids into an inline label field. Returns `None` when they do not fit.
    pub fn inline_label_field(labels: &[i64]) -> Option<i64> {
        let count = labels.len() as u32;
        if count == 0 {
            return Some(NO_LABELS_FIELD);
        }
        if count > 7 {
            return None;
        }
        let bits = LABEL_FIELD_PAYLOAD_BITS / count;
        let mut field = (count as i64) << LABEL_FIELD_PAYLOAD_BITS;
        for (i, label) in labels.iter().enumerate() {
            if *label < 0 || *label >= (1i64 << bits) {
                return None;
            }
            field |= label << (i as u32 * bits);
        }
        Some(field)
    }

    pub fn dynamic_label_field(first_record: i64) -> i64 {
        LABEL_FIELD_DYNAMIC_BIT | (first_record & LABEL_FIELD_PAYLOAD_MASK)
    }
}
