//! Decoder for a graph store's write-ahead transaction log.
//!
//! A log is a flat run of commands, each a one-byte type tag followed by the
//! before and after images of the storage records it touched. [`CommandReader`]
//! turns a [`ReadableLogChannel`] back into [`Command`]s and tells a truncated
//! tail apart from corruption; [`CommandWriter`] produces the same layout.
//!
//! [`CommandReader`]: command::CommandReader
//! [`CommandWriter`]: command::CommandWriter
//! [`Command`]: command::Command
//! [`ReadableLogChannel`]: channel::ReadableLogChannel

pub mod channel;
pub mod command;
pub mod config;
pub mod error;
pub mod index;
pub mod record;
pub mod schema;
pub mod utils;

#[cfg(test)]
mod tests;
