use bytes::BufMut;

use crate::channel::ReadableLogChannel;
use crate::command::codec::dynamic::{read_dynamic_records, write_dynamic_records};
use crate::error::TxLogResult;
use crate::record::{in_use_byte, parse_in_use, PropertyKeyTokenRecord, TokenRecord};

// id(4) + in_use(1) + name_id(4) + nr_name_records(4) + name records
pub fn read_token_record<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
) -> TxLogResult<TokenRecord> {
    let id = channel.get_i32()?;
    let in_use = parse_in_use(channel.get_u8()?)?;
    let mut record = TokenRecord::new(id);
    record.in_use = in_use;
    record.name_id = channel.get_i32()?;
    record.name_records = read_dynamic_records(channel)?;
    Ok(record)
}

// id(4) + in_use(1) + property_count(4) + name_id(4) + nr_name_records(4) + name records
pub fn read_property_key_token_record<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
) -> TxLogResult<PropertyKeyTokenRecord> {
    let id = channel.get_i32()?;
    let in_use = parse_in_use(channel.get_u8()?)?;
    let mut record = PropertyKeyTokenRecord::new(id);
    record.token.in_use = in_use;
    record.property_count = channel.get_i32()?;
    record.token.name_id = channel.get_i32()?;
    for name_record in read_dynamic_records(channel)? {
        record.token.add_name_record(name_record);
    }
    Ok(record)
}

pub fn write_token_record(buf: &mut impl BufMut, record: &TokenRecord) {
    buf.put_i32(record.id);
    buf.put_u8(in_use_byte(record.in_use));
    buf.put_i32(record.name_id);
    write_dynamic_records(buf, &record.name_records);
}

pub fn write_property_key_token_record(buf: &mut impl BufMut, record: &PropertyKeyTokenRecord) {
    buf.put_i32(record.token.id);
    buf.put_u8(in_use_byte(record.token.in_use));
    buf.put_i32(record.property_count);
    buf.put_i32(record.token.name_id);
    write_dynamic_records(buf, &record.token.name_records);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::InMemoryLogChannel;
    use crate::error::TxLogError;
    use crate::record::DynamicRecord;

    fn name_chain(name: &str) -> Vec<DynamicRecord> {
        vec![DynamicRecord::new(20)
            .with_in_use(true)
            .with_data(name.as_bytes().to_vec())]
    }

    #[test]
    fn label_token_roundtrip() {
        let record = TokenRecord::new(7)
            .with_in_use(true)
            .with_name_id(20)
            .with_name_records(name_chain("Person"));
        let mut buf = Vec::new();
        write_token_record(&mut buf, &record);
        let decoded = read_token_record(&mut InMemoryLogChannel::new(buf)).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(decoded.name().as_deref(), Some("Person"));
    }

    #[test]
    fn property_key_token_reads_count_before_name_id() {
        let mut record = PropertyKeyTokenRecord::new(2).with_property_count(1234);
        record.token = record
            .token
            .with_in_use(true)
            .with_name_id(20)
            .with_name_records(name_chain("since"));
        let mut buf = Vec::new();
        write_property_key_token_record(&mut buf, &record);
        assert_eq!(&buf[5..9], &1234i32.to_be_bytes());
        let decoded = read_property_key_token_record(&mut InMemoryLogChannel::new(buf)).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn token_in_use_flag_is_strict() {
        let mut buf = Vec::new();
        buf.put_i32(1);
        buf.put_u8(2);
        assert!(matches!(
            read_token_record(&mut InMemoryLogChannel::new(buf)),
            Err(TxLogError::IllegalInUseFlag(2))
        ));
    }

    #[test]
    fn truncated_name_chain_fails_whole_record() {
        let record = TokenRecord::new(7)
            .with_in_use(true)
            .with_name_records(name_chain("Person"));
        let mut buf = Vec::new();
        write_token_record(&mut buf, &record);
        buf.truncate(buf.len() - 2);
        assert!(read_token_record(&mut InMemoryLogChannel::new(buf))
            .unwrap_err()
            .is_read_past_end());
    }
}
