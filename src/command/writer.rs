use bytes::BufMut;

use crate::command::codec::{entity, index, property, schema, token};
use crate::command::Command;
use crate::error::TxLogResult;

/// Encodes commands in the layout [`CommandReader`](crate::command::CommandReader) decodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandWriter;

impl CommandWriter {
    pub fn write(command: &Command, buf: &mut impl BufMut) -> TxLogResult<()> {
        buf.put_u8(command.command_type() as u8);
        match command {
            Command::Node(cmd) => entity::write_node_command(buf, cmd),
            Command::Relationship(record) => entity::write_relationship_record(buf, record),
            Command::RelationshipGroup(record) => {
                entity::write_relationship_group_record(buf, record)
            }
            Command::Property(cmd) => property::write_property_command(buf, cmd),
            Command::PropertyKeyToken(record) => {
                token::write_property_key_token_record(buf, record)
            }
            Command::RelationshipTypeToken(record) | Command::LabelToken(record) => {
                token::write_token_record(buf, record)
            }
            Command::NeoStore(record) => entity::write_neostore_record(buf, record),
            Command::SchemaRule(cmd) => schema::write_schema_rule_command(buf, cmd),
            Command::IndexDefine(cmd) => index::write_index_define_command(buf, cmd)?,
            Command::IndexAddNode(cmd) => index::write_index_add_node_command(buf, cmd)?,
            Command::IndexAddRelationship(cmd) => {
                index::write_index_add_relationship_command(buf, cmd)?
            }
            Command::IndexRemove(cmd) => index::write_index_remove_command(buf, cmd)?,
            Command::IndexDelete(cmd) => index::write_index_delete_command(buf, cmd)?,
            Command::IndexCreate(cmd) => index::write_index_create_command(buf, cmd)?,
        }
        Ok(())
    }

    /// Encodes a batch back to back into a fresh buffer.
    pub fn write_all<'a>(commands: impl IntoIterator<Item = &'a Command>) -> TxLogResult<Vec<u8>> {
        let mut buf = Vec::new();
        for command in commands {
            Self::write(command, &mut buf)?;
        }
        Ok(buf)
    }
}
