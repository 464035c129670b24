use std::fmt;

use bytes::Bytes;

use crate::channel::{InMemoryLogChannel, ReadableLogChannel};
use crate::command::reader::Entry;
use crate::command::{Command, CommandReader, CommandType};
use crate::error::TxLogError;

/// How a log stopped yielding commands.
#[derive(Debug)]
pub enum LogEnd {
    /// Every byte was consumed, allowing for trailing zero padding.
    Clean,
    /// The entry starting at `offset` was cut short.
    TruncatedTail {
        offset: u64,
        command_type: CommandType,
    },
    Corrupted {
        offset: u64,
        error: TxLogError,
    },
    /// The command limit was hit with the log not yet drained.
    Limited { offset: u64 },
}

impl fmt::Display for LogEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEnd::Clean => write!(f, "clean"),
            LogEnd::TruncatedTail {
                offset,
                command_type,
            } => write!(f, "truncated {} command at offset {}", command_type, offset),
            LogEnd::Corrupted { offset, error } => {
                write!(f, "corruption at offset {}: {}", offset, error)
            }
            LogEnd::Limited { offset } => write!(f, "stopped at limit, offset {}", offset),
        }
    }
}

impl LogEnd {
    pub fn is_clean(&self) -> bool {
        matches!(self, LogEnd::Clean)
    }

    pub fn is_corrupted(&self) -> bool {
        matches!(self, LogEnd::Corrupted { .. })
    }
}

#[derive(Debug)]
pub struct LogScan {
    pub commands: Vec<Command>,
    pub end: LogEnd,
}

/// Decodes a channel to its end, stopping at `limit` commands when given.
pub fn scan_channel<C: ReadableLogChannel + ?Sized>(
    reader: &CommandReader,
    channel: &mut C,
    limit: Option<usize>,
) -> LogScan {
    let mut commands = Vec::new();
    loop {
        let offset = channel.offset();
        if limit.is_some_and(|limit| commands.len() >= limit) {
            return LogScan {
                commands,
                end: LogEnd::Limited { offset },
            };
        }
        let end = match reader.read_entry(channel) {
            Ok(Entry::Command(command)) => {
                commands.push(command);
                continue;
            }
            Ok(Entry::EndOfLog) => LogEnd::Clean,
            Ok(Entry::Truncated(command_type)) => LogEnd::TruncatedTail {
                offset,
                command_type,
            },
            Err(error) => LogEnd::Corrupted { offset, error },
        };
        return LogScan { commands, end };
    }
}

/// [`scan_channel`] over a log already loaded into memory.
pub fn scan_log(reader: &CommandReader, data: impl Into<Bytes>, limit: Option<usize>) -> LogScan {
    let mut channel = InMemoryLogChannel::new(data);
    scan_channel(reader, &mut channel, limit)
}
