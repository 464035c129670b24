use crate::record::NO_NEXT_PROPERTY;

/// Global store metadata anchor; carries the head of the graph-level property chain.
#[derive(derive_new::new, Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeoStoreRecord {
    pub next_prop: i64,
}

impl Default for NeoStoreRecord {
    fn default() -> Self {
        Self::new(NO_NEXT_PROPERTY)
    }
}
