use bytes::BufMut;

use crate::channel::ReadableLogChannel;
use crate::command::codec::dynamic::{read_dynamic_records, write_dynamic_records};
use crate::command::PropertyCommand;
use crate::error::{TxLogError, TxLogResult};
use crate::record::{
    PropertyBlock, PropertyOwner, PropertyRecord, PropertyType, IN_USE, REL_PROPERTY,
};

// size_in_bytes(1) + size/8 value words(8 each) + value records
pub fn read_property_block<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
) -> TxLogResult<PropertyBlock> {
    let block_size = channel.get_i8()?;
    if block_size <= 0 || block_size % 8 != 0 {
        return Err(TxLogError::InvalidPropertyBlock(format!(
            "{} is not a valid block size value",
            block_size
        )));
    }
    let word_count = (block_size / 8) as usize;
    let mut value_blocks = Vec::with_capacity(word_count);
    for _ in 0..word_count {
        value_blocks.push(channel.get_i64()?);
    }
    let ty = PropertyType::of_block(value_blocks[0])?;
    let expected = ty.block_count(value_blocks[0])?;
    if expected != word_count {
        return Err(TxLogError::InvalidPropertyBlock(format!(
            "{} is not a valid number of blocks for type {} (expected {})",
            word_count, ty, expected
        )));
    }
    // overflow records of an after image are always freshly allocated
    let mut value_records = read_dynamic_records(channel)?;
    for record in value_records.iter_mut() {
        record.set_created();
    }
    Ok(PropertyBlock {
        value_blocks,
        value_records,
    })
}

// in_use(1) + next_prop(8) + prev_prop(8) + owner(8) + nr_blocks(1) + blocks + deleted records
pub fn read_property_record<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
    id: i64,
) -> TxLogResult<PropertyRecord> {
    let mut record = PropertyRecord::new(id);
    let flag = channel.get_u8()?;
    record.next_prop = channel.get_i64()?;
    record.prev_prop = channel.get_i64()?;
    let in_use = flag & IN_USE == IN_USE;
    let rel_property = flag & REL_PROPERTY == REL_PROPERTY;
    let primitive_id = channel.get_i64()?;
    record.owner = match primitive_id {
        -1 => PropertyOwner::None,
        id if rel_property => PropertyOwner::Relationship(id),
        id => PropertyOwner::Node(id),
    };
    let nr_blocks = channel.get_i8()?;
    if nr_blocks < 0 {
        return Err(TxLogError::InvalidPropertyBlock(format!(
            "negative property block count {}",
            nr_blocks
        )));
    }
    for _ in 0..nr_blocks {
        record.add_property_block(read_property_block(channel)?);
    }
    for deleted in read_dynamic_records(channel)? {
        record.add_deleted_record(deleted);
    }
    if in_use != record.in_use {
        return Err(TxLogError::Internal(format!(
            "in use was read as {} but property record {} has {} blocks",
            in_use,
            id,
            record.blocks.len()
        )));
    }
    Ok(record)
}

pub fn read_property_command<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
) -> TxLogResult<PropertyCommand> {
    let id = channel.get_i64()?;
    let before = read_property_record(channel, id)?;
    let after = read_property_record(channel, id)?;
    Ok(PropertyCommand { before, after })
}

pub fn write_property_block(buf: &mut impl BufMut, block: &PropertyBlock) {
    buf.put_u8(block.size() as u8);
    for word in &block.value_blocks {
        buf.put_i64(*word);
    }
    write_dynamic_records(buf, &block.value_records);
}

pub fn write_property_record(buf: &mut impl BufMut, record: &PropertyRecord) {
    let mut flag = if record.in_use { IN_USE } else { 0 };
    if record.owner.is_relationship() {
        flag |= REL_PROPERTY;
    }
    buf.put_u8(flag);
    buf.put_i64(record.next_prop);
    buf.put_i64(record.prev_prop);
    buf.put_i64(record.owner.primitive_id());
    buf.put_u8(record.blocks.len() as u8);
    for block in &record.blocks {
        write_property_block(buf, block);
    }
    write_dynamic_records(buf, &record.deleted_records);
}

pub fn write_property_command(buf: &mut impl BufMut, command: &PropertyCommand) {
    buf.put_i64(command.after.id);
    write_property_record(buf, &command.before);
    write_property_record(buf, &command.after);
}
