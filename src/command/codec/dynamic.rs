use bytes::BufMut;

use crate::channel::ReadableLogChannel;
use crate::error::{TxLogError, TxLogResult};
use crate::record::{
    DynamicRecord, FIRST_IN_CHAIN, IN_USE, MAX_DYNAMIC_RECORD_ID, MAX_DYNAMIC_RECORD_LENGTH,
    NO_NEXT_BLOCK,
};

// id(8) + type(4) + in_use(1) [+ nr_of_bytes(4) + next_block(8) + data]
pub fn read_dynamic_record<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
) -> TxLogResult<DynamicRecord> {
    let id = channel.get_i64()?;
    if !(0..=MAX_DYNAMIC_RECORD_ID).contains(&id) {
        return Err(TxLogError::InvalidDynamicRecord(format!(
            "{} is not a valid dynamic record id",
            id
        )));
    }
    let record_type = channel.get_i32()?;
    let flag = channel.get_u8()?;
    let mut record = DynamicRecord::new(id);
    record.record_type = record_type;
    record.in_use = flag & IN_USE != 0;
    if !record.in_use {
        return Ok(record);
    }
    record.start_record = flag & FIRST_IN_CHAIN != 0;
    let nr_of_bytes = channel.get_i32()?;
    if !(0..MAX_DYNAMIC_RECORD_LENGTH).contains(&nr_of_bytes) {
        return Err(TxLogError::InvalidDynamicRecord(format!(
            "{} is not valid for a number of bytes field of dynamic record {}",
            nr_of_bytes, id
        )));
    }
    let next_block = channel.get_i64()?;
    if next_block != NO_NEXT_BLOCK && !(0..=MAX_DYNAMIC_RECORD_ID).contains(&next_block) {
        return Err(TxLogError::InvalidDynamicRecord(format!(
            "{} is not valid for a next record field of dynamic record {}",
            next_block, id
        )));
    }
    record.next_block = next_block;
    record.data = channel.get_bytes(nr_of_bytes as usize)?;
    Ok(record)
}

/// Reads a count-prefixed run of dynamic records. Each call site decides where they go.
pub fn read_dynamic_records<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
) -> TxLogResult<Vec<DynamicRecord>> {
    let count = channel.get_i32()?;
    if count < 0 {
        return Err(TxLogError::InvalidDynamicRecord(format!(
            "negative dynamic record count {}",
            count
        )));
    }
    let mut records = Vec::new();
    for _ in 0..count {
        records.push(read_dynamic_record(channel)?);
    }
    Ok(records)
}

pub fn write_dynamic_record(buf: &mut impl BufMut, record: &DynamicRecord) {
    buf.put_i64(record.id);
    buf.put_i32(record.record_type);
    if !record.in_use {
        buf.put_u8(0);
        return;
    }
    let mut flag = IN_USE;
    if record.start_record {
        flag |= FIRST_IN_CHAIN;
    }
    buf.put_u8(flag);
    buf.put_i32(record.data.len() as i32);
    buf.put_i64(record.next_block);
    buf.put_slice(&record.data);
}

pub fn write_dynamic_records(buf: &mut impl BufMut, records: &[DynamicRecord]) {
    buf.put_i32(records.len() as i32);
    for record in records {
        write_dynamic_record(buf, record);
    }
}
