//! Length-prefixed strings and maps shared by the index commands.

use std::collections::HashMap;

use bytes::BufMut;

use crate::channel::ReadableLogChannel;
use crate::error::{TxLogError, TxLogResult};

pub const MAX_3B_LENGTH: usize = (1 << 24) - 1;

pub fn read_string<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
    len: usize,
) -> TxLogResult<String> {
    let bytes = channel.get_bytes(len)?;
    Ok(String::from_utf8(bytes)?)
}

pub fn read_2b_length_and_string<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
) -> TxLogResult<String> {
    let len = channel.get_u16()? as usize;
    read_string(channel, len)
}

/// 24-bit length: a big-endian short holding the low 16 bits, then the high byte.
pub fn read_3b_length_and_string<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
) -> TxLogResult<String> {
    let low = channel.get_u16()? as usize;
    let high = channel.get_u8()? as usize;
    read_string(channel, (high << 16) | low)
}

pub fn read_2b_map<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
) -> TxLogResult<HashMap<String, String>> {
    let size = channel.get_u16()?;
    let mut map = HashMap::with_capacity(size as usize);
    for _ in 0..size {
        let key = read_2b_length_and_string(channel)?;
        let value = read_2b_length_and_string(channel)?;
        map.insert(key, value);
    }
    Ok(map)
}

pub fn write_2b_length_and_string(buf: &mut impl BufMut, value: &str) -> TxLogResult<()> {
    let len = u16::try_from(value.len()).map_err(|_| {
        TxLogError::Internal(format!(
            "string of {} bytes does not fit a 2-byte length",
            value.len()
        ))
    })?;
    buf.put_u16(len);
    buf.put_slice(value.as_bytes());
    Ok(())
}

pub fn write_3b_length_and_string(buf: &mut impl BufMut, value: &str) -> TxLogResult<()> {
    let len = value.len();
    if len > MAX_3B_LENGTH {
        return Err(TxLogError::Internal(format!(
            "string of {} bytes does not fit a 3-byte length",
            len
        )));
    }
    buf.put_u16((len & 0xffff) as u16);
    buf.put_u8((len >> 16) as u8);
    buf.put_slice(value.as_bytes());
    Ok(())
}

pub fn write_2b_map(buf: &mut impl BufMut, map: &HashMap<String, String>) -> TxLogResult<()> {
    let size = u16::try_from(map.len()).map_err(|_| {
        TxLogError::Internal(format!("map of {} entries is too large", map.len()))
    })?;
    buf.put_u16(size);
    for (key, value) in map {
        write_2b_length_and_string(buf, key)?;
        write_2b_length_and_string(buf, value)?;
    }
    Ok(())
}
