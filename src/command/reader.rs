use crate::channel::ReadableLogChannel;
use crate::command::codec::{entity, index, property, schema, token};
use crate::command::{Command, CommandIter, CommandType};
use crate::config::LogReaderConfig;
use crate::error::{TxLogError, TxLogResult};

#[derive(Debug)]
pub(crate) enum Entry {
    Command(Command),
    /// Nothing but zero padding was left.
    EndOfLog,
    Truncated(CommandType),
}

/// Decodes one command per call from a log channel.
///
/// A channel that runs dry anywhere inside an entry yields `Ok(None)`: that entry is the
/// unflushed tail of the log and the caller should stop replaying. Everything else that
/// goes wrong is a real error.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandReader {
    config: LogReaderConfig,
}

impl CommandReader {
    pub fn new(config: LogReaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LogReaderConfig {
        &self.config
    }

    pub fn read<C: ReadableLogChannel + ?Sized>(
        &self,
        channel: &mut C,
    ) -> TxLogResult<Option<Command>> {
        match self.read_entry(channel)? {
            Entry::Command(command) => Ok(Some(command)),
            Entry::EndOfLog | Entry::Truncated(_) => Ok(None),
        }
    }

    /// Like [`CommandReader::read`], but tells a drained channel apart from a cut-short entry.
    pub(crate) fn read_entry<C: ReadableLogChannel + ?Sized>(
        &self,
        channel: &mut C,
    ) -> TxLogResult<Entry> {
        let command_type = match read_command_type(channel) {
            Ok(command_type) => command_type,
            Err(TxLogError::ReadPastEnd) => {
                log::debug!("reached the end of the log channel");
                return Ok(Entry::EndOfLog);
            }
            Err(e) => return Err(e),
        };
        match self.read_command(command_type, channel) {
            Ok(Some(command)) => Ok(Entry::Command(command)),
            Ok(None) => Ok(Entry::EndOfLog),
            Err(TxLogError::ReadPastEnd) => {
                log::debug!("{} command is cut short, treating it as the tail", command_type);
                Ok(Entry::Truncated(command_type))
            }
            Err(e) => Err(e),
        }
    }

    pub fn commands<'a, C: ReadableLogChannel + ?Sized>(
        &self,
        channel: &'a mut C,
    ) -> CommandIter<'a, C> {
        CommandIter::new(*self, channel)
    }

    fn read_command<C: ReadableLogChannel + ?Sized>(
        &self,
        command_type: CommandType,
        channel: &mut C,
    ) -> TxLogResult<Option<Command>> {
        let command = match command_type {
            CommandType::None => return Ok(None),
            CommandType::Node => Command::Node(entity::read_node_command(channel)?),
            CommandType::Property => Command::Property(property::read_property_command(channel)?),
            CommandType::Relationship => {
                Command::Relationship(entity::read_relationship_record(channel)?)
            }
            CommandType::RelationshipTypeToken => {
                Command::RelationshipTypeToken(token::read_token_record(channel)?)
            }
            CommandType::PropertyKeyToken => {
                Command::PropertyKeyToken(token::read_property_key_token_record(channel)?)
            }
            CommandType::NeoStore => Command::NeoStore(entity::read_neostore_record(channel)?),
            CommandType::SchemaRule => Command::SchemaRule(schema::read_schema_rule_command(
                channel,
                self.config.schema_scratch_capacity,
            )?),
            CommandType::LabelToken => Command::LabelToken(token::read_token_record(channel)?),
            CommandType::RelationshipGroup => {
                Command::RelationshipGroup(entity::read_relationship_group_record(channel)?)
            }
            CommandType::IndexDefine => {
                Command::IndexDefine(index::read_index_define_command(channel)?)
            }
            CommandType::IndexAddNode => {
                Command::IndexAddNode(index::read_index_add_node_command(channel)?)
            }
            CommandType::IndexAddRelationship => {
                Command::IndexAddRelationship(index::read_index_add_relationship_command(channel)?)
            }
            CommandType::IndexRemove => {
                Command::IndexRemove(index::read_index_remove_command(channel)?)
            }
            CommandType::IndexDelete => {
                Command::IndexDelete(index::read_index_delete_command(channel)?)
            }
            CommandType::IndexCreate => {
                Command::IndexCreate(index::read_index_create_command(channel)?)
            }
        };
        Ok(Some(command))
    }
}

/// Skips zero padding and returns the first real tag.
fn read_command_type<C: ReadableLogChannel + ?Sized>(
    channel: &mut C,
) -> TxLogResult<CommandType> {
    let mut tag = channel.get_u8()?;
    let mut padding = 0usize;
    while tag == 0 {
        padding += 1;
        tag = channel.get_u8()?;
    }
    if padding > 0 {
        log::trace!("skipped {} padding bytes", padding);
    }
    let command_type = CommandType::try_from(tag)?;
    log::trace!("reading {} command", command_type);
    Ok(command_type)
}
