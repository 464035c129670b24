use bytes::BufMut;
use log::warn;

use crate::channel::ReadableLogChannel;
use crate::command::codec::dynamic::{read_dynamic_records, write_dynamic_records};
use crate::command::SchemaRuleCommand;
use crate::error::TxLogResult;
use crate::record::DynamicRecord;
use crate::schema::SchemaRule;

// nr_before(4) + before records + nr_after(4) + after records + created(1)
pub fn read_schema_rule_command<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
    scratch_capacity: usize,
) -> TxLogResult<SchemaRuleCommand> {
    let before = read_dynamic_records(channel)?;
    let mut after = read_dynamic_records(channel)?;
    let created = channel.get_u8()?;
    if created == 1 {
        for record in after.iter_mut() {
            record.set_created();
        }
    }
    let source = if after.first().is_some_and(|r| r.in_use) {
        &after
    } else {
        &before
    };
    let rule = rebuild_rule(source, scratch_capacity);
    Ok(SchemaRuleCommand {
        before,
        after,
        rule,
    })
}

/// A chain whose bytes are not a known rule still yields a command, just without a rule.
fn rebuild_rule(records: &[DynamicRecord], scratch_capacity: usize) -> Option<SchemaRule> {
    let first = records.first()?;
    let mut scratch = Vec::with_capacity(scratch_capacity);
    DynamicRecord::concat_data(records, &mut scratch);
    match SchemaRule::deserialize(first.id, &scratch) {
        Ok(rule) => Some(rule),
        Err(e) => {
            warn!("schema rule {} could not be rebuilt: {}", first.id, e);
            None
        }
    }
}

pub fn write_schema_rule_command(buf: &mut impl BufMut, command: &SchemaRuleCommand) {
    write_dynamic_records(buf, &command.before);
    write_dynamic_records(buf, &command.after);
    let created = command.after.first().is_some_and(|r| r.created);
    buf.put_u8(created as u8);
}

/// Splits serialized rule bytes over a chain of in-use records starting at `first_id`.
pub fn schema_rule_records(
    rule: &SchemaRule,
    first_id: i64,
    block_size: usize,
) -> Vec<DynamicRecord> {
    let bytes = rule.serialize();
    let chunks: Vec<&[u8]> = bytes.chunks(block_size.max(1)).collect();
    let last = chunks.len().saturating_sub(1);
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let id = first_id + i as i64;
            DynamicRecord::new(id)
                .with_in_use(true)
                .with_start_record(i == 0)
                .with_next_block(if i == last { -1 } else { id + 1 })
                .with_data(chunk.to_vec())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::InMemoryLogChannel;
    use crate::config::DEFAULT_SCHEMA_SCRATCH_CAPACITY;
    use crate::error::TxLogError;
    use crate::schema::UniquenessConstraintRule;

    fn constraint(id: i64) -> SchemaRule {
        SchemaRule::UniquenessConstraint(UniquenessConstraintRule {
            id,
            label: 4,
            property_keys: vec![1, 2, 3],
            owned_index: 17,
        })
    }

    fn read(buf: Vec<u8>) -> TxLogResult<SchemaRuleCommand> {
        read_schema_rule_command(
            &mut InMemoryLogChannel::new(buf),
            DEFAULT_SCHEMA_SCRATCH_CAPACITY,
        )
    }

    #[test]
    fn created_rule_is_rebuilt_from_after_chain() {
        let mut after = schema_rule_records(&constraint(20), 20, 10);
        assert!(after.len() > 1);
        for record in after.iter_mut() {
            record.set_created();
        }
        let command = SchemaRuleCommand {
            before: Vec::new(),
            after,
            rule: Some(constraint(20)),
        };
        let mut buf = Vec::new();
        write_schema_rule_command(&mut buf, &command);
        let decoded = read(buf).unwrap();
        assert_eq!(decoded, command);
        assert!(decoded.after.iter().all(|r| r.created));
    }

    #[test]
    fn created_flag_zero_leaves_records_untouched() {
        let command = SchemaRuleCommand {
            before: schema_rule_records(&constraint(20), 20, 64),
            after: schema_rule_records(&constraint(20), 20, 64),
            rule: Some(constraint(20)),
        };
        let mut buf = Vec::new();
        write_schema_rule_command(&mut buf, &command);
        assert_eq!(*buf.last().unwrap(), 0);
        let decoded = read(buf).unwrap();
        assert!(decoded.after.iter().all(|r| !r.created));
    }

    #[test]
    fn dropped_rule_is_rebuilt_from_before_chain() {
        let before = schema_rule_records(&constraint(9), 9, 64);
        let after = vec![DynamicRecord::new(9)];
        let mut buf = Vec::new();
        write_dynamic_records(&mut buf, &before);
        write_dynamic_records(&mut buf, &after);
        buf.put_u8(0);
        let decoded = read(buf).unwrap();
        assert_eq!(decoded.rule, Some(constraint(9)));
        assert_eq!(decoded.after, after);
    }

    #[test]
    fn garbage_chain_gives_command_without_rule() {
        let after = vec![DynamicRecord::new(3)
            .with_in_use(true)
            .with_data(vec![0, 0, 0, 1, 0xEE, 1, 2])];
        let mut buf = Vec::new();
        write_dynamic_records(&mut buf, &[]);
        write_dynamic_records(&mut buf, &after);
        buf.put_u8(1);
        let decoded = read(buf).unwrap();
        assert_eq!(decoded.rule, None);
        assert_eq!(decoded.after.len(), 1);
        assert!(decoded.after[0].created);
    }

    #[test]
    fn empty_sets_have_no_rule() {
        let mut buf = Vec::new();
        write_dynamic_records(&mut buf, &[]);
        write_dynamic_records(&mut buf, &[]);
        buf.put_u8(0);
        let decoded = read(buf).unwrap();
        assert!(decoded.before.is_empty() && decoded.after.is_empty());
        assert_eq!(decoded.rule, None);
    }

    #[test]
    fn missing_created_byte_is_truncation() {
        let mut buf = Vec::new();
        write_dynamic_records(&mut buf, &[]);
        write_dynamic_records(&mut buf, &schema_rule_records(&constraint(1), 1, 64));
        assert!(matches!(read(buf), Err(TxLogError::ReadPastEnd)));
    }
}
