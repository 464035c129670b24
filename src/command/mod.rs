//! Log commands: one decoded log entry per storage-record mutation.

pub mod codec;
mod iter;
mod reader;
mod scan;
mod writer;

pub use iter::CommandIter;
pub use reader::CommandReader;
pub use scan::{scan_channel, scan_log, LogEnd, LogScan};
pub use writer::CommandWriter;

use std::fmt;

use crate::error::TxLogError;
use crate::index::{
    IndexAddNodeCommand, IndexAddRelationshipCommand, IndexCreateCommand, IndexDeleteCommand,
    IndexDefineCommand, IndexRemoveCommand,
};
use crate::record::{
    DynamicRecord, LabelTokenRecord, NeoStoreRecord, NodeRecord, PropertyKeyTokenRecord,
    PropertyRecord, RelationshipGroupRecord, RelationshipRecord, RelationshipTypeTokenRecord,
};
use crate::schema::SchemaRule;

/// Leading tag byte of every log command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[repr(u8)]
pub enum CommandType {
    None = 0,
    Node = 1,
    Property = 2,
    Relationship = 3,
    RelationshipTypeToken = 4,
    PropertyKeyToken = 5,
    NeoStore = 6,
    SchemaRule = 7,
    LabelToken = 8,
    RelationshipGroup = 9,
    IndexDefine = 10,
    IndexAddNode = 11,
    IndexAddRelationship = 12,
    IndexRemove = 13,
    IndexDelete = 14,
    IndexCreate = 15,
}

impl TryFrom<u8> for CommandType {
    type Error = TxLogError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CommandType::None),
            1 => Ok(CommandType::Node),
            2 => Ok(CommandType::Property),
            3 => Ok(CommandType::Relationship),
            4 => Ok(CommandType::RelationshipTypeToken),
            5 => Ok(CommandType::PropertyKeyToken),
            6 => Ok(CommandType::NeoStore),
            7 => Ok(CommandType::SchemaRule),
            8 => Ok(CommandType::LabelToken),
            9 => Ok(CommandType::RelationshipGroup),
            10 => Ok(CommandType::IndexDefine),
            11 => Ok(CommandType::IndexAddNode),
            12 => Ok(CommandType::IndexAddRelationship),
            13 => Ok(CommandType::IndexRemove),
            14 => Ok(CommandType::IndexDelete),
            15 => Ok(CommandType::IndexCreate),
            other => Err(TxLogError::UnknownCommandType(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeCommand {
    pub before: NodeRecord,
    pub after: NodeRecord,
}

impl NodeCommand {
    pub fn key(&self) -> i64 {
        self.after.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyCommand {
    pub before: PropertyRecord,
    pub after: PropertyRecord,
}

impl PropertyCommand {
    pub fn key(&self) -> i64 {
        self.after.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRuleCommand {
    pub before: Vec<DynamicRecord>,
    pub after: Vec<DynamicRecord>,
    /// `None` when the chain bytes do not form a known rule.
    pub rule: Option<SchemaRule>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Node(NodeCommand),
    Relationship(RelationshipRecord),
    RelationshipGroup(RelationshipGroupRecord),
    Property(PropertyCommand),
    PropertyKeyToken(PropertyKeyTokenRecord),
    RelationshipTypeToken(RelationshipTypeTokenRecord),
    LabelToken(LabelTokenRecord),
    NeoStore(NeoStoreRecord),
    SchemaRule(SchemaRuleCommand),
    IndexDefine(IndexDefineCommand),
    IndexAddNode(IndexAddNodeCommand),
    IndexAddRelationship(IndexAddRelationshipCommand),
    IndexRemove(IndexRemoveCommand),
    IndexDelete(IndexDeleteCommand),
    IndexCreate(IndexCreateCommand),
}

impl Command {
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Node(_) => CommandType::Node,
            Command::Relationship(_) => CommandType::Relationship,
            Command::RelationshipGroup(_) => CommandType::RelationshipGroup,
            Command::Property(_) => CommandType::Property,
            Command::PropertyKeyToken(_) => CommandType::PropertyKeyToken,
            Command::RelationshipTypeToken(_) => CommandType::RelationshipTypeToken,
            Command::LabelToken(_) => CommandType::LabelToken,
            Command::NeoStore(_) => CommandType::NeoStore,
            Command::SchemaRule(_) => CommandType::SchemaRule,
            Command::IndexDefine(_) => CommandType::IndexDefine,
            Command::IndexAddNode(_) => CommandType::IndexAddNode,
            Command::IndexAddRelationship(_) => CommandType::IndexAddRelationship,
            Command::IndexRemove(_) => CommandType::IndexRemove,
            Command::IndexDelete(_) => CommandType::IndexDelete,
            Command::IndexCreate(_) => CommandType::IndexCreate,
        }
    }

    /// Id of the record a store command touches. Index commands have none.
    pub fn key(&self) -> Option<i64> {
        match self {
            Command::Node(cmd) => Some(cmd.key()),
            Command::Relationship(record) => Some(record.id),
            Command::RelationshipGroup(record) => Some(record.id),
            Command::Property(cmd) => Some(cmd.key()),
            Command::PropertyKeyToken(record) => Some(record.token.id as i64),
            Command::RelationshipTypeToken(record) | Command::LabelToken(record) => {
                Some(record.id as i64)
            }
            Command::NeoStore(_) => Some(0),
            Command::SchemaRule(cmd) => cmd
                .after
                .first()
                .or_else(|| cmd.before.first())
                .map(|record| record.id),
            _ => None,
        }
    }
}

fn in_use_label(in_use: bool) -> &'static str {
    if in_use {
        "in use"
    } else {
        "not in use"
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Node(cmd) => write!(
                f,
                "node {}: {} -> {}{}",
                cmd.key(),
                in_use_label(cmd.before.in_use),
                in_use_label(cmd.after.in_use),
                if cmd.after.created { " (created)" } else { "" }
            ),
            Command::Relationship(record) => write!(
                f,
                "relationship {} ({}) {} -[{}]-> {}",
                record.id,
                in_use_label(record.in_use),
                record.first_node,
                record.rel_type,
                record.second_node
            ),
            Command::RelationshipGroup(record) => write!(
                f,
                "relationship group {} type {} owner {}",
                record.id, record.rel_type, record.owning_node
            ),
            Command::Property(cmd) => write!(
                f,
                "property {}: {} -> {} blocks, owner {:?}",
                cmd.key(),
                cmd.before.blocks.len(),
                cmd.after.blocks.len(),
                cmd.after.owner
            ),
            Command::PropertyKeyToken(record) => write!(
                f,
                "property key {} {:?} ({} properties)",
                record.token.id,
                record.token.name().unwrap_or_default(),
                record.property_count
            ),
            Command::RelationshipTypeToken(record) => write!(
                f,
                "relationship type {} {:?}",
                record.id,
                record.name().unwrap_or_default()
            ),
            Command::LabelToken(record) => write!(
                f,
                "label {} {:?}",
                record.id,
                record.name().unwrap_or_default()
            ),
            Command::NeoStore(record) => write!(f, "neostore next_prop {}", record.next_prop),
            Command::SchemaRule(cmd) => match &cmd.rule {
                Some(rule) => write!(
                    f,
                    "schema rule {} {} on label {}",
                    rule.id(),
                    rule.kind(),
                    rule.label()
                ),
                None => write!(
                    f,
                    "schema rule without rule ({} before, {} after records)",
                    cmd.before.len(),
                    cmd.after.len()
                ),
            },
            Command::IndexDefine(cmd) => write!(
                f,
                "index define {} names, {} keys",
                cmd.index_names.len(),
                cmd.keys.len()
            ),
            Command::IndexAddNode(cmd) => write!(
                f,
                "index {} add node {} key {} = {:?}",
                cmd.index_name_id, cmd.entity_id, cmd.key_id, cmd.value
            ),
            Command::IndexAddRelationship(cmd) => write!(
                f,
                "index {} add relationship {} ({} -> {}) key {} = {:?}",
                cmd.index_name_id,
                cmd.entity_id,
                cmd.start_node,
                cmd.end_node,
                cmd.key_id,
                cmd.value
            ),
            Command::IndexRemove(cmd) => write!(
                f,
                "index {} remove {} {} key {} = {:?}",
                cmd.index_name_id, cmd.entity_type, cmd.entity_id, cmd.key_id, cmd.value
            ),
            Command::IndexDelete(cmd) => {
                write!(f, "index {} delete ({})", cmd.index_name_id, cmd.entity_type)
            }
            Command::IndexCreate(cmd) => write!(
                f,
                "index {} create ({}) {:?}",
                cmd.index_name_id, cmd.entity_type, cmd.config
            ),
        }
    }
}
