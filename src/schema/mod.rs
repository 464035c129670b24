//! Schema rules rebuilt from the concatenated bytes of a dynamic record chain.
//!
//! Layout (big-endian):
//!
//! ```text
//! label_id: i32 | kind: u8 | body
//!   index / constraint index: provider_key: str | provider_version: str
//!                             | key_count: i16 | key_count * i64 | [owning_constraint: i64]
//!   uniqueness constraint:    key_count: u8 | key_count * i64 | owned_index: i64
//! str = length: i32 | utf-8 bytes
//! ```

use bytes::{Buf, BufMut};

use crate::error::{TxLogError, TxLogResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[repr(u8)]
pub enum SchemaRuleKind {
    IndexRule = 1,
    ConstraintIndexRule = 2,
    UniquenessConstraint = 3,
}

impl TryFrom<u8> for SchemaRuleKind {
    type Error = TxLogError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SchemaRuleKind::IndexRule),
            2 => Ok(SchemaRuleKind::ConstraintIndexRule),
            3 => Ok(SchemaRuleKind::UniquenessConstraint),
            other => Err(malformed(format!("unknown schema rule kind {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexProviderDescriptor {
    pub key: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRule {
    pub id: i64,
    pub label: i32,
    pub property_key: i32,
    pub provider: IndexProviderDescriptor,
    /// Set for constraint indexes once the owning constraint exists.
    pub owning_constraint: Option<i64>,
    pub constraint_index: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniquenessConstraintRule {
    pub id: i64,
    pub label: i32,
    pub property_keys: Vec<i32>,
    pub owned_index: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaRule {
    Index(IndexRule),
    UniquenessConstraint(UniquenessConstraintRule),
}

fn malformed(message: String) -> TxLogError {
    TxLogError::MalformedSchemaRule(message)
}

fn need(buf: &[u8], len: usize, what: &str) -> TxLogResult<()> {
    if buf.remaining() < len {
        return Err(malformed(format!(
            "{} needs {} bytes, {} left",
            what,
            len,
            buf.remaining()
        )));
    }
    Ok(())
}

fn read_string(buf: &mut &[u8], what: &str) -> TxLogResult<String> {
    need(buf, 4, what)?;
    let len = buf.get_i32();
    let len = usize::try_from(len).map_err(|_| malformed(format!("{} has length {}", what, len)))?;
    need(buf, len, what)?;
    let bytes = buf.copy_to_bytes(len).to_vec();
    String::from_utf8(bytes).map_err(|e| malformed(format!("{} is not utf-8: {}", what, e)))
}

fn read_token_id(buf: &mut &[u8]) -> TxLogResult<i32> {
    need(buf, 8, "property key")?;
    let id = buf.get_i64();
    i32::try_from(id).map_err(|_| malformed(format!("property key {} out of range", id)))
}

fn put_string(buf: &mut impl BufMut, value: &str) {
    buf.put_i32(value.len() as i32);
    buf.put_slice(value.as_bytes());
}

impl SchemaRule {
    pub fn id(&self) -> i64 {
        match self {
            SchemaRule::Index(rule) => rule.id,
            SchemaRule::UniquenessConstraint(rule) => rule.id,
        }
    }

    pub fn label(&self) -> i32 {
        match self {
            SchemaRule::Index(rule) => rule.label,
            SchemaRule::UniquenessConstraint(rule) => rule.label,
        }
    }

    pub fn kind(&self) -> SchemaRuleKind {
        match self {
            SchemaRule::Index(rule) if rule.constraint_index => {
                SchemaRuleKind::ConstraintIndexRule
            }
            SchemaRule::Index(_) => SchemaRuleKind::IndexRule,
            SchemaRule::UniquenessConstraint(_) => SchemaRuleKind::UniquenessConstraint,
        }
    }

    /// Rebuilds a rule; `id` is the id of the first record in the chain.
    pub fn deserialize(id: i64, mut bytes: &[u8]) -> TxLogResult<SchemaRule> {
        let buf = &mut bytes;
        need(buf, 5, "rule header")?;
        let label = buf.get_i32();
        let kind = SchemaRuleKind::try_from(buf.get_u8())?;
        match kind {
            SchemaRuleKind::IndexRule | SchemaRuleKind::ConstraintIndexRule => {
                let key = read_string(buf, "provider key")?;
                let version = read_string(buf, "provider version")?;
                need(buf, 2, "property key count")?;
                let count = buf.get_i16();
                if count != 1 {
                    return Err(malformed(format!(
                        "index rule {} has {} property keys",
                        id, count
                    )));
                }
                let property_key = read_token_id(buf)?;
                let constraint_index = kind == SchemaRuleKind::ConstraintIndexRule;
                let owning_constraint = if constraint_index && buf.remaining() >= 8 {
                    Some(buf.get_i64()).filter(|owner| *owner != -1)
                } else {
                    None
                };
                Ok(SchemaRule::Index(IndexRule {
                    id,
                    label,
                    property_key,
                    provider: IndexProviderDescriptor { key, version },
                    owning_constraint,
                    constraint_index,
                }))
            }
            SchemaRuleKind::UniquenessConstraint => {
                need(buf, 1, "property key count")?;
                let count = buf.get_u8();
                let property_keys = (0..count)
                    .map(|_| read_token_id(buf))
                    .collect::<TxLogResult<Vec<_>>>()?;
                need(buf, 8, "owned index")?;
                let owned_index = buf.get_i64();
                Ok(SchemaRule::UniquenessConstraint(UniquenessConstraintRule {
                    id,
                    label,
                    property_keys,
                    owned_index,
                }))
            }
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.put_i32(self.label());
        buf.put_u8(self.kind() as u8);
        match self {
            SchemaRule::Index(rule) => {
                put_string(&mut buf, &rule.provider.key);
                put_string(&mut buf, &rule.provider.version);
                buf.put_i16(1);
                buf.put_i64(rule.property_key as i64);
                if rule.constraint_index {
                    buf.put_i64(rule.owning_constraint.unwrap_or(-1));
                }
            }
            SchemaRule::UniquenessConstraint(rule) => {
                buf.put_u8(rule.property_keys.len() as u8);
                for key in &rule.property_keys {
                    buf.put_i64(*key as i64);
                }
                buf.put_i64(rule.owned_index);
            }
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_rule(constraint_index: bool, owning_constraint: Option<i64>) -> SchemaRule {
        SchemaRule::Index(IndexRule {
            id: 12,
            label: 3,
            property_key: 8,
            provider: IndexProviderDescriptor {
                key: "lucene".to_string(),
                version: "1.0".to_string(),
            },
            owning_constraint,
            constraint_index,
        })
    }

    #[test]
    fn index_rules_survive_serialization() {
        for rule in [
            index_rule(false, None),
            index_rule(true, None),
            index_rule(true, Some(30)),
        ] {
            let bytes = rule.serialize();
            assert_eq!(SchemaRule::deserialize(12, &bytes).unwrap(), rule);
        }
    }

    #[test]
    fn uniqueness_constraint_survives_serialization() {
        let rule = SchemaRule::UniquenessConstraint(UniquenessConstraintRule {
            id: 40,
            label: 2,
            property_keys: vec![5, 6],
            owned_index: 39,
        });
        let bytes = rule.serialize();
        assert_eq!(SchemaRule::deserialize(40, &bytes).unwrap(), rule);
        assert_eq!(rule.kind(), SchemaRuleKind::UniquenessConstraint);
    }

    #[test]
    fn constraint_index_without_owner_bytes_has_no_owner() {
        let mut bytes = index_rule(true, Some(30)).serialize();
        bytes.truncate(bytes.len() - 8);
        match SchemaRule::deserialize(12, &bytes).unwrap() {
            SchemaRule::Index(rule) => assert_eq!(rule.owning_constraint, None),
            other => panic!("unexpected rule: {:?}", other),
        }
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            SchemaRule::deserialize(1, &[0, 0, 0, 1, 9]),
            Err(TxLogError::MalformedSchemaRule(_))
        ));
        assert!(matches!(
            SchemaRule::deserialize(1, &[0, 0]),
            Err(TxLogError::MalformedSchemaRule(_))
        ));
        let mut truncated = index_rule(false, None).serialize();
        truncated.pop();
        assert!(matches!(
            SchemaRule::deserialize(12, &truncated),
            Err(TxLogError::MalformedSchemaRule(_))
        ));
    }
}
