use bytes::BufMut;

use crate::channel::ReadableLogChannel;
use crate::command::codec::dynamic::{read_dynamic_records, write_dynamic_records};
use crate::command::NodeCommand;
use crate::error::TxLogResult;
use crate::record::{
    in_use_byte, parse_in_use, NeoStoreRecord, NodeRecord, RelationshipGroupRecord,
    RelationshipRecord,
};

// in_use(1) [+ dense(1) + next_rel(8) + next_prop(8) + labels(8) + dynamic label records]
pub fn read_node_record<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
    id: i64,
) -> TxLogResult<NodeRecord> {
    let in_use = parse_in_use(channel.get_u8()?)?;
    let mut record = NodeRecord::new(id);
    record.in_use = in_use;
    if in_use {
        record.dense = channel.get_u8()? == 1;
        record.next_rel = channel.get_i64()?;
        record.next_prop = channel.get_i64()?;
        record.label_field = channel.get_i64()?;
        record.dynamic_label_records = read_dynamic_records(channel)?;
    }
    Ok(record)
}

pub fn read_node_command<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
) -> TxLogResult<NodeCommand> {
    let id = channel.get_i64()?;
    let before = read_node_record(channel, id)?;
    let mut after = read_node_record(channel, id)?;
    if !before.in_use && after.in_use {
        after.set_created();
    }
    Ok(NodeCommand { before, after })
}

pub fn write_node_record(buf: &mut impl BufMut, record: &NodeRecord) {
    buf.put_u8(in_use_byte(record.in_use));
    if record.in_use {
        buf.put_u8(record.dense as u8);
        buf.put_i64(record.next_rel);
        buf.put_i64(record.next_prop);
        buf.put_i64(record.label_field);
        write_dynamic_records(buf, &record.dynamic_label_records);
    }
}

pub fn write_node_command(buf: &mut impl BufMut, command: &NodeCommand) {
    buf.put_i64(command.after.id);
    write_node_record(buf, &command.before);
    write_node_record(buf, &command.after);
}

// id(8) + in_use(1) [+ first_node(8) + second_node(8) + type(4) + 4 chain pointers(8 each)
// + next_prop(8) + chain flags(1)]
pub fn read_relationship_record<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
) -> TxLogResult<RelationshipRecord> {
    let id = channel.get_i64()?;
    let in_use = parse_in_use(channel.get_u8()?)?;
    if !in_use {
        return Ok(RelationshipRecord::not_in_use(id));
    }
    let first_node = channel.get_i64()?;
    let second_node = channel.get_i64()?;
    let rel_type = channel.get_i32()?;
    let mut record = RelationshipRecord::new(id, first_node, second_node, rel_type);
    record.in_use = true;
    record.first_prev_rel = channel.get_i64()?;
    record.first_next_rel = channel.get_i64()?;
    record.second_prev_rel = channel.get_i64()?;
    record.second_next_rel = channel.get_i64()?;
    record.next_prop = channel.get_i64()?;
    let flags = channel.get_u8()?;
    record.first_in_first_chain = flags & 0x1 > 0;
    record.first_in_second_chain = flags & 0x2 > 0;
    Ok(record)
}

pub fn write_relationship_record(buf: &mut impl BufMut, record: &RelationshipRecord) {
    buf.put_i64(record.id);
    buf.put_u8(in_use_byte(record.in_use));
    if record.in_use {
        buf.put_i64(record.first_node);
        buf.put_i64(record.second_node);
        buf.put_i32(record.rel_type);
        buf.put_i64(record.first_prev_rel);
        buf.put_i64(record.first_next_rel);
        buf.put_i64(record.second_prev_rel);
        buf.put_i64(record.second_next_rel);
        buf.put_i64(record.next_prop);
        buf.put_u8(record.chain_flags());
    }
}

// id(8) + in_use(1) + type(2) + next(8) + first_out(8) + first_in(8) + first_loop(8) + owner(8)
pub fn read_relationship_group_record<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
) -> TxLogResult<RelationshipGroupRecord> {
    let id = channel.get_i64()?;
    let in_use = parse_in_use(channel.get_u8()?)?;
    let rel_type = channel.get_i16()? as i32;
    let mut record = RelationshipGroupRecord::new(id, rel_type);
    record.in_use = in_use;
    record.next = channel.get_i64()?;
    record.first_out = channel.get_i64()?;
    record.first_in = channel.get_i64()?;
    record.first_loop = channel.get_i64()?;
    record.owning_node = channel.get_i64()?;
    Ok(record)
}

pub fn write_relationship_group_record(buf: &mut impl BufMut, record: &RelationshipGroupRecord) {
    buf.put_i64(record.id);
    buf.put_u8(in_use_byte(record.in_use));
    buf.put_i16(record.rel_type as i16);
    buf.put_i64(record.next);
    buf.put_i64(record.first_out);
    buf.put_i64(record.first_in);
    buf.put_i64(record.first_loop);
    buf.put_i64(record.owning_node);
}

pub fn read_neostore_record<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
) -> TxLogResult<NeoStoreRecord> {
    Ok(NeoStoreRecord::new(channel.get_i64()?))
}

pub fn write_neostore_record(buf: &mut impl BufMut, record: &NeoStoreRecord) {
    buf.put_i64(record.next_prop);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::InMemoryLogChannel;
    use crate::error::TxLogError;
    use crate::record::{DynamicRecord, NO_NEXT_PROPERTY, NO_NEXT_RELATIONSHIP};

    #[test]
    fn not_in_use_node_is_one_byte() {
        let mut channel = InMemoryLogChannel::new(vec![0u8]);
        let record = read_node_record(&mut channel, 3).unwrap();
        assert_eq!(record, NodeRecord::new(3));
        assert_eq!(record.next_rel, NO_NEXT_RELATIONSHIP);
        assert_eq!(record.next_prop, NO_NEXT_PROPERTY);
    }

    #[test]
    fn node_with_label_overflow_roundtrip() {
        let after = NodeRecord::new(8)
            .with_in_use(true)
            .with_dense(true)
            .with_next_rel(100)
            .with_next_prop(200)
            .with_label_field(NodeRecord::dynamic_label_field(31))
            .with_dynamic_label_records(vec![DynamicRecord::new(31)
                .with_in_use(true)
                .with_data(vec![1, 2, 3, 4])]);
        let command = NodeCommand {
            before: after.clone(),
            after,
        };
        let mut buf = Vec::new();
        write_node_command(&mut buf, &command);
        let decoded = read_node_command(&mut InMemoryLogChannel::new(buf)).unwrap();
        assert_eq!(decoded, command);
        assert!(!decoded.after.created);
    }

    #[test]
    fn node_in_use_flag_is_strict() {
        let mut buf = Vec::new();
        buf.put_i64(1);
        buf.put_u8(3);
        assert!(matches!(
            read_node_command(&mut InMemoryLogChannel::new(buf)),
            Err(TxLogError::IllegalInUseFlag(3))
        ));
    }

    #[test]
    fn relationship_not_in_use_collapses_to_sentinels() {
        let mut buf = Vec::new();
        buf.put_i64(77);
        buf.put_u8(0);
        let record = read_relationship_record(&mut InMemoryLogChannel::new(buf)).unwrap();
        assert!(!record.in_use);
        assert_eq!((record.first_node, record.second_node, record.rel_type), (-1, -1, -1));
        assert_eq!(record.next_prop, NO_NEXT_PROPERTY);
    }

    #[test]
    fn relationship_chain_flags_decode_independently() {
        for (first, second) in [(true, false), (false, true), (false, false), (true, true)] {
            let record = RelationshipRecord::new(5, 1, 2, 9)
                .with_in_use(true)
                .with_first_prev_rel(10)
                .with_second_next_rel(11)
                .with_first_in_first_chain(first)
                .with_first_in_second_chain(second);
            let mut buf = Vec::new();
            write_relationship_record(&mut buf, &record);
            let decoded = read_relationship_record(&mut InMemoryLogChannel::new(buf)).unwrap();
            assert_eq!(decoded, record);
        }
    }

    #[test]
    fn relationship_group_reads_all_fields_even_when_unused() {
        let record = RelationshipGroupRecord::new(12, -3)
            .with_next(13)
            .with_first_out(1)
            .with_first_in(2)
            .with_first_loop(3)
            .with_owning_node(40);
        let mut buf = Vec::new();
        write_relationship_group_record(&mut buf, &record);
        assert_eq!(buf.len(), 8 + 1 + 2 + 5 * 8);
        let decoded = read_relationship_group_record(&mut InMemoryLogChannel::new(buf)).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn relationship_group_in_use_flag_is_strict() {
        let mut buf = Vec::new();
        buf.put_i64(1);
        buf.put_u8(0x81);
        assert!(matches!(
            read_relationship_group_record(&mut InMemoryLogChannel::new(buf)),
            Err(TxLogError::IllegalInUseFlag(0x81))
        ));
    }
}
