use std::collections::HashMap;

use bytes::BufMut;

use crate::channel::ReadableLogChannel;
use crate::error::{TxLogError, TxLogResult};
use crate::index::{
    needs_long, IndexAddNodeCommand, IndexAddRelationshipCommand, IndexCommandHeader,
    IndexCommandKind, IndexCreateCommand, IndexDefineCommand, IndexDeleteCommand,
    IndexEntityType, IndexRemoveCommand, IndexValue, INDEX_NAME_ID_MASK,
    START_NODE_NEEDS_LONG_BIT, VALUE_TYPE_DOUBLE, VALUE_TYPE_FLOAT, VALUE_TYPE_INT,
    VALUE_TYPE_LONG, VALUE_TYPE_NULL, VALUE_TYPE_SHORT, VALUE_TYPE_STRING,
};
use crate::utils::io_primitives::{
    read_2b_length_and_string, read_2b_map, read_3b_length_and_string,
    write_2b_length_and_string, write_2b_map, write_3b_length_and_string,
};

pub fn read_index_command_header<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
) -> TxLogResult<IndexCommandHeader> {
    let mut bytes = [0u8; 3];
    channel.read_exact(&mut bytes)?;
    Ok(IndexCommandHeader::unpack(bytes))
}

fn read_id<C: ReadableLogChannel + ?Sized>(channel: &mut C, long: bool) -> TxLogResult<i64> {
    if long {
        channel.get_i64()
    } else {
        Ok(channel.get_i32()? as i64)
    }
}

pub fn read_index_value<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
    value_type: u8,
) -> TxLogResult<IndexValue> {
    let value = match IndexValue::check_value_type(value_type)? {
        VALUE_TYPE_NULL => IndexValue::Null,
        VALUE_TYPE_SHORT => IndexValue::Short(channel.get_i16()?),
        VALUE_TYPE_INT => IndexValue::Int(channel.get_i32()?),
        VALUE_TYPE_LONG => IndexValue::Long(channel.get_i64()?),
        VALUE_TYPE_FLOAT => IndexValue::Float(channel.get_f32()?),
        VALUE_TYPE_DOUBLE => IndexValue::Double(channel.get_f64()?),
        VALUE_TYPE_STRING => IndexValue::String(read_3b_length_and_string(channel)?),
        other => return Err(TxLogError::UnknownValueType(other)),
    };
    Ok(value)
}

// header(3) + entity id(4|8) + value
pub fn read_index_add_node_command<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
) -> TxLogResult<IndexAddNodeCommand> {
    let header = read_index_command_header(channel)?;
    let entity_id = read_id(channel, header.entity_id_needs_long)?;
    let value = read_index_value(channel, header.value_type)?;
    Ok(IndexAddNodeCommand {
        index_name_id: header.index_name_id,
        entity_id,
        key_id: header.key_id,
        value,
    })
}

// header(3) + entity id(4|8) + value + start node(4|8) + end node(4|8)
pub fn read_index_add_relationship_command<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
) -> TxLogResult<IndexAddRelationshipCommand> {
    let header = read_index_command_header(channel)?;
    let entity_id = read_id(channel, header.entity_id_needs_long)?;
    let value = read_index_value(channel, header.value_type)?;
    let start_node = read_id(channel, header.start_node_needs_long)?;
    let end_node = read_id(channel, header.end_node_needs_long)?;
    Ok(IndexAddRelationshipCommand {
        index_name_id: header.index_name_id,
        entity_id,
        key_id: header.key_id,
        value,
        start_node,
        end_node,
    })
}

pub fn read_index_remove_command<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
) -> TxLogResult<IndexRemoveCommand> {
    let header = read_index_command_header(channel)?;
    let entity_id = read_id(channel, header.entity_id_needs_long)?;
    let value = read_index_value(channel, header.value_type)?;
    Ok(IndexRemoveCommand {
        index_name_id: header.index_name_id,
        entity_type: header.entity(),
        entity_id,
        key_id: header.key_id,
        value,
    })
}

pub fn read_index_delete_command<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
) -> TxLogResult<IndexDeleteCommand> {
    let header = read_index_command_header(channel)?;
    Ok(IndexDeleteCommand {
        index_name_id: header.index_name_id,
        entity_type: header.entity(),
    })
}

pub fn read_index_create_command<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
) -> TxLogResult<IndexCreateCommand> {
    let header = read_index_command_header(channel)?;
    let config = read_2b_map(channel)?;
    Ok(IndexCreateCommand {
        index_name_id: header.index_name_id,
        entity_type: header.entity(),
        config,
    })
}

/// nr_entries(1) + nr_entries * (name(2b string) + id(1))
fn read_id_map<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
) -> TxLogResult<HashMap<String, u8>> {
    let size = channel.get_u8()?;
    let mut map = HashMap::with_capacity(size as usize);
    for _ in 0..size {
        let name = read_2b_length_and_string(channel)?;
        let id = channel.get_u8()?;
        map.insert(name, id);
    }
    Ok(map)
}

// header(3, unused) + index name map + key map
pub fn read_index_define_command<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
) -> TxLogResult<IndexDefineCommand> {
    read_index_command_header(channel)?;
    let index_names = read_id_map(channel)?;
    let keys = read_id_map(channel)?;
    Ok(IndexDefineCommand { index_names, keys })
}

fn checked_name_id(index_name_id: u8) -> TxLogResult<u8> {
    if index_name_id & !INDEX_NAME_ID_MASK != 0 {
        return Err(TxLogError::Internal(format!(
            "index name id {} does not fit in 6 bits",
            index_name_id
        )));
    }
    Ok(index_name_id)
}

fn write_id(buf: &mut impl BufMut, id: i64, long: bool) {
    if long {
        buf.put_i64(id);
    } else {
        buf.put_i32(id as i32);
    }
}

pub fn write_index_value(buf: &mut impl BufMut, value: &IndexValue) -> TxLogResult<()> {
    match value {
        IndexValue::Null => {}
        IndexValue::Short(v) => buf.put_i16(*v),
        IndexValue::Int(v) => buf.put_i32(*v),
        IndexValue::Long(v) => buf.put_i64(*v),
        IndexValue::Float(v) => buf.put_f32(*v),
        IndexValue::Double(v) => buf.put_f64(*v),
        IndexValue::String(v) => write_3b_length_and_string(buf, v)?,
    }
    Ok(())
}

fn entry_header(
    index_name_id: u8,
    entity_type: IndexEntityType,
    entity_id: i64,
    key_id: u8,
    value: &IndexValue,
) -> TxLogResult<IndexCommandHeader> {
    Ok(IndexCommandHeader {
        value_type: value.value_type(),
        entity_type: entity_type as u8,
        entity_id_needs_long: needs_long(entity_id),
        index_name_id: checked_name_id(index_name_id)?,
        key_id,
        ..Default::default()
    })
}

pub fn write_index_add_node_command(
    buf: &mut impl BufMut,
    command: &IndexAddNodeCommand,
) -> TxLogResult<()> {
    let header = entry_header(
        command.index_name_id,
        IndexEntityType::Node,
        command.entity_id,
        command.key_id,
        &command.value,
    )?;
    buf.put_slice(&header.pack(IndexCommandKind::Add));
    write_id(buf, command.entity_id, header.entity_id_needs_long);
    write_index_value(buf, &command.value)
}

pub fn write_index_add_relationship_command(
    buf: &mut impl BufMut,
    command: &IndexAddRelationshipCommand,
) -> TxLogResult<()> {
    let mut header = entry_header(
        command.index_name_id,
        IndexEntityType::Relationship,
        command.entity_id,
        command.key_id,
        &command.value,
    )?;
    // the start-node flag is bit 3 of the name id: a set bit forces a long start node,
    // and a clear bit cannot carry one
    let name_id_bit = header.index_name_id & START_NODE_NEEDS_LONG_BIT != 0;
    if needs_long(command.start_node) && !name_id_bit {
        return Err(TxLogError::Internal(format!(
            "start node {} needs 8 bytes but index name id {} has bit 3 clear",
            command.start_node, command.index_name_id
        )));
    }
    header.start_node_needs_long = name_id_bit;
    header.end_node_needs_long = needs_long(command.end_node);
    buf.put_slice(&header.pack(IndexCommandKind::AddRelationship));
    write_id(buf, command.entity_id, header.entity_id_needs_long);
    write_index_value(buf, &command.value)?;
    write_id(buf, command.start_node, header.start_node_needs_long);
    write_id(buf, command.end_node, header.end_node_needs_long);
    Ok(())
}

pub fn write_index_remove_command(
    buf: &mut impl BufMut,
    command: &IndexRemoveCommand,
) -> TxLogResult<()> {
    let header = entry_header(
        command.index_name_id,
        command.entity_type,
        command.entity_id,
        command.key_id,
        &command.value,
    )?;
    buf.put_slice(&header.pack(IndexCommandKind::Remove));
    write_id(buf, command.entity_id, header.entity_id_needs_long);
    write_index_value(buf, &command.value)
}

pub fn write_index_delete_command(
    buf: &mut impl BufMut,
    command: &IndexDeleteCommand,
) -> TxLogResult<()> {
    let header = IndexCommandHeader {
        entity_type: command.entity_type as u8,
        index_name_id: checked_name_id(command.index_name_id)?,
        ..Default::default()
    };
    buf.put_slice(&header.pack(IndexCommandKind::Delete));
    Ok(())
}

pub fn write_index_create_command(
    buf: &mut impl BufMut,
    command: &IndexCreateCommand,
) -> TxLogResult<()> {
    let header = IndexCommandHeader {
        entity_type: command.entity_type as u8,
        index_name_id: checked_name_id(command.index_name_id)?,
        ..Default::default()
    };
    buf.put_slice(&header.pack(IndexCommandKind::Create));
    write_2b_map(buf, &command.config)
}

fn write_id_map(buf: &mut impl BufMut, map: &HashMap<String, u8>) -> TxLogResult<()> {
    let size = u8::try_from(map.len()).map_err(|_| {
        TxLogError::Internal(format!("{} names do not fit a define command", map.len()))
    })?;
    buf.put_u8(size);
    for (name, id) in map {
        write_2b_length_and_string(buf, name)?;
        buf.put_u8(*id);
    }
    Ok(())
}

pub fn write_index_define_command(
    buf: &mut impl BufMut,
    command: &IndexDefineCommand,
) -> TxLogResult<()> {
    buf.put_slice(&IndexCommandHeader::default().pack(IndexCommandKind::Define));
    write_id_map(buf, &command.index_names)?;
    write_id_map(buf, &command.keys)
}
