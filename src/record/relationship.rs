use derive_with::With;

use crate::record::{NO_NEXT_PROPERTY, NO_NEXT_RELATIONSHIP, NO_PREV_RELATIONSHIP};

#[derive(Debug, Clone, PartialEq, Eq, With)]
pub struct RelationshipRecord {
    pub id: i64,
    pub in_use: bool,
    pub first_node: i64,
    pub second_node: i64,
    pub rel_type: i32,
    pub first_prev_rel: i64,
    pub first_next_rel: i64,
    pub second_prev_rel: i64,
    pub second_next_rel: i64,
    pub next_prop: i64,
    pub first_in_first_chain: bool,
    pub first_in_second_chain: bool,
}

impl RelationshipRecord {
    pub fn new(id: i64, first_node: i64, second_node: i64, rel_type: i32) -> Self {
        Self {
            id,
            in_use: false,
            first_node,
            second_node,
            rel_type,
            first_prev_rel: NO_PREV_RELATIONSHIP,
            first_next_rel: NO_NEXT_RELATIONSHIP,
            second_prev_rel: NO_PREV_RELATIONSHIP,
            second_next_rel: NO_NEXT_RELATIONSHIP,
            next_prop: NO_NEXT_PROPERTY,
            first_in_first_chain: true,
            first_in_second_chain: true,
        }
    }

    /// Shape of a relationship that is not in use: every pointer collapses to -1.
    pub fn not_in_use(id: i64) -> Self {
        Self::new(id, -1, -1, -1)
    }

    pub(crate) fn chain_flags(&self) -> u8 {
        (self.first_in_first_chain as u8) | ((self.first_in_second_chain as u8) << 1)
    }
}

#[derive(derive_new::new, Debug, Clone, PartialEq, Eq, With)]
pub struct RelationshipGroupRecord {
    pub id: i64,
    pub rel_type: i32,
    #[new(default)]
    pub in_use: bool,
    #[new(value = "-1")]
    pub next: i64,
    #[new(value = "-1")]
    pub first_out: i64,
    #[new(value = "-1")]
    pub first_in: i64,
    #[new(value = "-1")]
    pub first_loop: i64,
    #[new(value = "-1")]
    pub owning_node: i64,
}
