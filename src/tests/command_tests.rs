use std::io::Cursor;

use bytes::BufMut;

use crate::channel::{InMemoryLogChannel, PhysicalLogChannel};
use crate::command::{Command, CommandReader, CommandType, CommandWriter};
use crate::error::TxLogError;
use crate::record::{NeoStoreRecord, NodeLabels};
use crate::tests::fixtures::{created_node, every_command, index_rule};

fn encode(command: &Command) -> Vec<u8> {
    let mut buf = Vec::new();
    CommandWriter::write(command, &mut buf).unwrap();
    buf
}

#[test]
fn node_created_when_before_not_in_use() {
    let mut buf = Vec::new();
    buf.put_u8(CommandType::Node as u8);
    buf.put_i64(7);
    buf.put_u8(0);
    buf.put_u8(1);
    buf.put_u8(0);
    buf.put_i64(3);
    buf.put_i64(4);
    buf.put_i64(0);
    buf.put_i32(0);

    let command = CommandReader::default()
        .read(&mut InMemoryLogChannel::new(buf))
        .unwrap()
        .unwrap();
    let Command::Node(node) = command else {
        panic!("expected a node command, got {:?}", command);
    };
    assert!(!node.before.in_use);
    assert!(node.after.in_use);
    assert!(node.after.created);
    assert_eq!(node.after.next_rel, 3);
    assert_eq!(node.after.next_prop, 4);
}

#[test]
fn every_command_kind_reads_back() {
    let commands = every_command();
    let data = CommandWriter::write_all(&commands).unwrap();
    let mut channel = InMemoryLogChannel::new(data);
    let decoded: Vec<Command> = CommandReader::default()
        .commands(&mut channel)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(decoded, commands);
    assert_eq!(channel.remaining(), 0);
}

#[test]
fn every_strict_prefix_is_a_truncated_tail() {
    let reader = CommandReader::default();
    for command in every_command() {
        let data = encode(&command);
        for len in 0..data.len() {
            let mut channel = InMemoryLogChannel::new(data[..len].to_vec());
            let result = reader.read(&mut channel);
            assert!(
                matches!(result, Ok(None)),
                "{} cut at {} of {} gave {:?}",
                command.command_type(),
                len,
                data.len(),
                result
            );
        }
    }
}

#[test]
fn truncated_tail_after_complete_commands() {
    let mut data = encode(&Command::NeoStore(NeoStoreRecord::new(1)));
    let second = encode(&Command::Node(created_node()));
    data.extend_from_slice(&second[..second.len() - 1]);

    let reader = CommandReader::default();
    let mut channel = InMemoryLogChannel::new(data);
    assert_eq!(
        reader.read(&mut channel).unwrap(),
        Some(Command::NeoStore(NeoStoreRecord::new(1)))
    );
    assert_eq!(reader.read(&mut channel).unwrap(), None);
}

#[test]
fn zero_padding_before_a_tag_is_skipped() {
    let mut data = vec![0u8; 5];
    data.extend(encode(&Command::NeoStore(NeoStoreRecord::new(17))));
    let command = CommandReader::default()
        .read(&mut InMemoryLogChannel::new(data))
        .unwrap();
    assert_eq!(command, Some(Command::NeoStore(NeoStoreRecord::new(17))));
}

#[test]
fn all_zero_channel_is_empty() {
    let reader = CommandReader::default();
    assert_eq!(reader.read(&mut InMemoryLogChannel::new(vec![0u8; 64])).unwrap(), None);
    assert_eq!(reader.read(&mut InMemoryLogChannel::new(Vec::new())).unwrap(), None);
}

#[test]
fn unknown_tag_is_fatal() {
    for tag in [16u8, 0x7F, 0xFF] {
        let err = CommandReader::default()
            .read(&mut InMemoryLogChannel::new(vec![tag, 1, 2, 3]))
            .unwrap_err();
        assert!(matches!(err, TxLogError::UnknownCommandType(t) if t == tag));
        assert!(err.is_corruption());
    }
}

#[test]
fn corruption_inside_a_command_is_not_a_tail() {
    let mut data = vec![CommandType::Relationship as u8];
    data.put_i64(1);
    data.put_u8(5);
    let err = CommandReader::default()
        .read(&mut InMemoryLogChannel::new(data))
        .unwrap_err();
    assert!(matches!(err, TxLogError::IllegalInUseFlag(5)));
}

#[test]
fn iterator_yields_fatal_error_once() {
    let mut data = encode(&Command::NeoStore(NeoStoreRecord::new(1)));
    data.push(0xEE);
    data.extend(encode(&Command::NeoStore(NeoStoreRecord::new(2))));
    let mut channel = InMemoryLogChannel::new(data);
    let mut iter = CommandReader::default().commands(&mut channel);
    assert!(matches!(iter.next(), Some(Ok(Command::NeoStore(_)))));
    assert!(matches!(
        iter.next(),
        Some(Err(TxLogError::UnknownCommandType(0xEE)))
    ));
    assert!(iter.next().is_none());
    assert!(iter.next().is_none());
}

#[test]
fn physical_channel_streams_the_same_commands() {
    let commands = every_command();
    let data = CommandWriter::write_all(&commands).unwrap();
    let mut channel = PhysicalLogChannel::new(Cursor::new(data));
    let decoded: Vec<Command> = CommandReader::default()
        .commands(&mut channel)
        .map(|result| result.unwrap())
        .collect();
    assert_eq!(decoded, commands);
}

#[test]
fn decoded_commands_expose_record_details() {
    let commands = every_command();
    let data = CommandWriter::write_all(&commands).unwrap();
    let mut channel = InMemoryLogChannel::new(data);
    for command in CommandReader::default().commands(&mut channel) {
        match command.unwrap() {
            Command::Node(cmd) => {
                assert_eq!(cmd.after.labels(), NodeLabels::Inline(vec![1, 2]));
            }
            Command::LabelToken(record) => assert_eq!(record.name().as_deref(), Some("Person")),
            Command::SchemaRule(cmd) => assert_eq!(cmd.rule, Some(index_rule())),
            Command::IndexDefine(cmd) => assert_eq!(cmd.index_name(0), Some("myindex")),
            Command::Property(cmd) => {
                let blocks = &cmd.after.blocks;
                assert_eq!(blocks.len(), 2);
                assert!(blocks[1].value_records.iter().all(|r| r.created));
                assert!(cmd.after.deleted_records.iter().all(|r| !r.created));
            }
            _ => {}
        }
    }
}
